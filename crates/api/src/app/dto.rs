use serde::Deserialize;

use scoreline_core::{
    ConventionName, DomainError, DomainResult, EventName, HeldDate, PlayerId, PlayerName, Score,
};
use scoreline_tournament::{Convention, EventId, EventRecord, Match, NewEvent, Player, RankingEntry};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterConventionRequest {
    pub name: String,
    /// `YYYY-MM-DD`; today when omitted.
    pub held_date: Option<String>,
}

impl RegisterConventionRequest {
    pub fn parse(self) -> DomainResult<(ConventionName, Option<HeldDate>)> {
        let name = ConventionName::new(self.name)?;
        let held_date = self.held_date.as_deref().map(HeldDate::parse).transpose()?;
        Ok((name, held_date))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterPlayerRequest {
    pub name: String,
}

impl RegisterPlayerRequest {
    pub fn parse(self) -> DomainResult<PlayerName> {
        PlayerName::new(self.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterMatchRequest {
    pub home_player_id: String,
    pub away_player_id: String,
    pub home_score: i64,
    pub away_score: i64,
}

pub struct MatchInput {
    pub home_player_id: PlayerId,
    pub away_player_id: PlayerId,
    pub home_score: Score,
    pub away_score: Score,
}

impl RegisterMatchRequest {
    pub fn parse(self) -> DomainResult<MatchInput> {
        Ok(MatchInput {
            home_player_id: self.home_player_id.parse()?,
            away_player_id: self.away_player_id.parse()?,
            home_score: Score::new(self.home_score)?,
            away_score: Score::new(self.away_score)?,
        })
    }
}

/// One element of a scorer / assist batch, also the MOM body.
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub player_id: String,
    pub name: String,
}

impl EventRequest {
    pub fn parse(self) -> DomainResult<NewEvent> {
        Ok(NewEvent::new(self.player_id.parse()?, EventName::new(self.name)?))
    }
}

/// Parse every element, reporting all bad elements at once.
pub fn parse_event_batch(batch: Vec<EventRequest>) -> DomainResult<Vec<NewEvent>> {
    let mut events = Vec::with_capacity(batch.len());
    let mut problems = Vec::new();
    for (index, item) in batch.into_iter().enumerate() {
        match item.parse() {
            Ok(e) => events.push(e),
            Err(e) => problems.push(format!("[{index}] {e}")),
        }
    }
    if problems.is_empty() {
        Ok(events)
    } else {
        Err(DomainError::validation(problems.join("; ")))
    }
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub convention_id: Option<String>,
    pub player_id: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn convention_to_json(c: &Convention) -> serde_json::Value {
    serde_json::json!({
        "id": c.id_typed().to_string(),
        "name": c.name().as_str(),
        "held_date": c.held_date().to_string(),
    })
}

pub fn player_to_json(p: &Player) -> serde_json::Value {
    let s = p.stats();
    serde_json::json!({
        "id": p.id_typed().to_string(),
        "convention_id": p.convention_id().to_string(),
        "name": p.name().as_str(),
        "points": s.points.value(),
        "wins": s.wins.value(),
        "draws": s.draws.value(),
        "losses": s.losses.value(),
        "goals": s.goals.value(),
        "concede": s.concede.value(),
        "goal_difference": s.goal_difference(),
    })
}

pub fn match_to_json(m: &Match) -> serde_json::Value {
    serde_json::json!({
        "id": m.id_typed().to_string(),
        "convention_id": m.convention_id().to_string(),
        "home_player_id": m.home_player_id().to_string(),
        "away_player_id": m.away_player_id().to_string(),
        "home_score": m.home_score().value(),
        "away_score": m.away_score().value(),
        "match_date": m.match_date().to_rfc3339(),
        "outcome": m.outcome(),
    })
}

pub fn event_to_json(e: &EventRecord) -> serde_json::Value {
    serde_json::json!({
        "id": e.id().to_string(),
        "kind": e.kind(),
        "name": e.name().as_str(),
        "match_id": e.match_id().to_string(),
        "player_id": e.player_id().to_string(),
    })
}

pub fn registered_event_to_json(id: EventId, event: &NewEvent) -> serde_json::Value {
    serde_json::json!({
        "id": id.to_string(),
        "name": event.name.as_str(),
        "player_id": event.player_id.to_string(),
    })
}

pub fn ranking_to_json(entries: &[RankingEntry]) -> serde_json::Value {
    serde_json::Value::Array(
        entries
            .iter()
            .map(|r| {
                serde_json::json!({
                    "player_id": r.player_id.to_string(),
                    "player_name": r.player_name.as_str(),
                    "name": r.event_name.as_str(),
                    "count": r.count.value(),
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_parse_reports_every_bad_element() {
        let batch = vec![
            EventRequest { player_id: "not-a-uuid".into(), name: "A".into() },
            EventRequest { player_id: PlayerId::new().to_string(), name: "ok".into() },
            EventRequest { player_id: PlayerId::new().to_string(), name: "  ".into() },
        ];
        let err = parse_event_batch(batch).unwrap_err().to_string();
        assert!(err.contains("[0]"));
        assert!(err.contains("[2]"));
        assert!(!err.contains("[1]"));
    }

    #[test]
    fn negative_score_is_rejected() {
        let req = RegisterMatchRequest {
            home_player_id: PlayerId::new().to_string(),
            away_player_id: PlayerId::new().to_string(),
            home_score: -1,
            away_score: 0,
        };
        assert!(matches!(req.parse(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn held_date_must_be_a_real_day() {
        let req = RegisterConventionRequest {
            name: "Cup".into(),
            held_date: Some("2023-02-30".into()),
        };
        assert!(req.parse().is_err());
    }
}
