//! Match result ledger.
//!
//! Pure functions that turn a recorded match into standings updates and
//! decide whether a batch of scorer / assist / MOM records is admissible for
//! that match. Nothing here touches storage; the service layer loads the
//! inputs and persists the outputs inside one session.

use serde::{Deserialize, Serialize};

use scoreline_core::{DomainError, DomainResult, EventName, PlayerId};

use crate::event::{EventRecord, NewEvent};
use crate::player::Player;
use crate::r#match::{Match, Side};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

pub fn determine_outcome(m: &Match) -> Outcome {
    let (home, away) = (m.home_score().value(), m.away_score().value());
    match home.cmp(&away) {
        core::cmp::Ordering::Greater => Outcome::Home,
        core::cmp::Ordering::Less => Outcome::Away,
        core::cmp::Ordering::Equal => Outcome::Draw,
    }
}

/// Updated snapshots of both participants after a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub home: Player,
    pub away: Player,
}

/// Apply `m` to the standings of its two players.
///
/// The caller is responsible for passing the players whose ids match
/// `m.home_player_id()` / `m.away_player_id()`.
pub fn apply_match_result(m: &Match, home: &Player, away: &Player) -> MatchResult {
    let (home, away) = match determine_outcome(m) {
        Outcome::Home => (home.record_win(), away.record_loss()),
        Outcome::Away => (home.record_loss(), away.record_win()),
        Outcome::Draw => (home.record_draw(), away.record_draw()),
    };

    MatchResult {
        home: home.add_goals(m.home_score()).add_concede(m.away_score()),
        away: away.add_goals(m.away_score()).add_concede(m.home_score()),
    }
}

/// Per-side event counts after a batch has been accepted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TeamTally {
    pub home: u32,
    pub away: u32,
}

impl TeamTally {
    fn bump(&mut self, side: Side) {
        match side {
            Side::Home => self.home = self.home.saturating_add(1),
            Side::Away => self.away = self.away.saturating_add(1),
        }
    }
}

/// Check a batch of scorer or assist submissions against a match.
///
/// Every submitted player must have played in `m`. Existing and new records
/// are summed per side and each side's total may not exceed that side's
/// score. Returns the combined tally on success; on failure nothing from the
/// batch is admissible.
pub fn validate_event_batch(
    m: &Match,
    events: &[NewEvent],
    existing: &[EventRecord],
) -> DomainResult<TeamTally> {
    let mut tally = TeamTally::default();

    for record in existing {
        if let Some(side) = m.side_of(record.player_id()) {
            tally.bump(side);
        }
    }

    for event in events {
        let side = m.side_of(event.player_id).ok_or_else(|| {
            DomainError::bad_request("player did not participate in this match")
        })?;
        tally.bump(side);
    }

    if tally.home > m.home_score().value() {
        return Err(DomainError::bad_request(
            "home team event count exceeds home score",
        ));
    }
    if tally.away > m.away_score().value() {
        return Err(DomainError::bad_request(
            "away team event count exceeds away score",
        ));
    }

    Ok(tally)
}

/// Man-of-the-match state of a single match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MomState {
    Unset,
    Set { player_id: PlayerId, name: EventName },
}

impl MomState {
    pub fn from_record(record: Option<&EventRecord>) -> Self {
        match record {
            Some(r) => MomState::Set {
                player_id: r.player_id(),
                name: r.name().clone(),
            },
            None => MomState::Unset,
        }
    }

    /// `Unset -> Set`. The state is terminal once set.
    pub fn register(&self, m: &Match, event: &NewEvent) -> DomainResult<MomState> {
        if let MomState::Set { .. } = self {
            return Err(DomainError::bad_request(
                "man of the match is already registered for this match",
            ));
        }
        if m.side_of(event.player_id).is_none() {
            return Err(DomainError::bad_request(
                "player did not participate in this match",
            ));
        }
        Ok(MomState::Set {
            player_id: event.player_id,
            name: event.name.clone(),
        })
    }

    pub fn current(&self) -> DomainResult<(PlayerId, &EventName)> {
        match self {
            MomState::Set { player_id, name } => Ok((*player_id, name)),
            MomState::Unset => Err(DomainError::not_found("man of the match")),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, MomState::Set { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use chrono::Utc;
    use proptest::prelude::*;
    use scoreline_core::{ConventionId, PlayerName, Score, Wins};

    struct Fixture {
        home: Player,
        away: Player,
    }

    fn fixture() -> Fixture {
        let conv = ConventionId::new();
        Fixture {
            home: Player::register(conv, PlayerName::new("Home").unwrap()),
            away: Player::register(conv, PlayerName::new("Away").unwrap()),
        }
    }

    fn play(f: &Fixture, home_score: u32, away_score: u32) -> Match {
        Match::record(
            f.home.convention_id(),
            f.home.id_typed(),
            f.away.id_typed(),
            Score::from(home_score),
            Score::from(away_score),
            Utc::now(),
        )
        .unwrap()
    }

    fn goal(player_id: PlayerId) -> NewEvent {
        NewEvent::new(player_id, EventName::new("Haaland").unwrap())
    }

    #[test]
    fn home_win_one_nil() {
        let f = fixture();
        let m = play(&f, 1, 0);
        assert_eq!(determine_outcome(&m), Outcome::Home);

        let r = apply_match_result(&m, &f.home, &f.away);
        assert_eq!(r.home.stats().points.value(), 3);
        assert_eq!(r.home.stats().wins.value(), 1);
        assert_eq!(r.home.stats().goals.value(), 1);
        assert_eq!(r.home.stats().concede.value(), 0);
        assert_eq!(r.away.stats().points.value(), 0);
        assert_eq!(r.away.stats().losses.value(), 1);
        assert_eq!(r.away.stats().goals.value(), 0);
        assert_eq!(r.away.stats().concede.value(), 1);
    }

    #[test]
    fn away_win_credits_away_player() {
        let f = fixture();
        let r = apply_match_result(&play(&f, 0, 3), &f.home, &f.away);
        assert_eq!(r.away.stats().points.value(), 3);
        assert_eq!(r.home.stats().losses.value(), 1);
        assert_eq!(r.home.stats().concede.value(), 3);
    }

    #[test]
    fn draw_two_all() {
        let f = fixture();
        let m = play(&f, 2, 2);
        assert_eq!(determine_outcome(&m), Outcome::Draw);

        let r = apply_match_result(&m, &f.home, &f.away);
        for p in [&r.home, &r.away] {
            assert_eq!(p.stats().points.value(), 1);
            assert_eq!(p.stats().draws.value(), 1);
            assert_eq!(p.stats().goals.value(), 2);
            assert_eq!(p.stats().concede.value(), 2);
        }
    }

    #[test]
    fn batch_exceeding_home_score_is_rejected() {
        let f = fixture();
        let m = play(&f, 2, 0);
        let batch = vec![goal(f.home.id_typed()); 3];

        let err = validate_event_batch(&m, &batch, &[]).unwrap_err();
        assert_eq!(
            err,
            DomainError::bad_request("home team event count exceeds home score")
        );
    }

    #[test]
    fn batch_exactly_at_score_is_accepted() {
        let f = fixture();
        let m = play(&f, 2, 1);
        let batch = vec![
            goal(f.home.id_typed()),
            goal(f.home.id_typed()),
            goal(f.away.id_typed()),
        ];
        let tally = validate_event_batch(&m, &batch, &[]).unwrap();
        assert_eq!(tally, TeamTally { home: 2, away: 1 });
    }

    #[test]
    fn existing_records_count_against_ceiling() {
        let f = fixture();
        let m = play(&f, 3, 0);
        let existing: Vec<_> = (0..2)
            .map(|_| EventRecord::attribute(EventKind::Scorer, m.id_typed(), goal(f.home.id_typed())))
            .collect();

        assert!(validate_event_batch(&m, &[goal(f.home.id_typed())], &existing).is_ok());
        let err = validate_event_batch(
            &m,
            &[goal(f.home.id_typed()), goal(f.home.id_typed())],
            &existing,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[test]
    fn away_ceiling_is_checked_separately() {
        let f = fixture();
        let m = play(&f, 5, 0);
        let err = validate_event_batch(&m, &[goal(f.away.id_typed())], &[]).unwrap_err();
        assert_eq!(
            err,
            DomainError::bad_request("away team event count exceeds away score")
        );
    }

    #[test]
    fn non_participant_is_rejected_regardless_of_counts() {
        let f = fixture();
        let m = play(&f, 9, 9);
        let err = validate_event_batch(&m, &[goal(PlayerId::new())], &[]).unwrap_err();
        assert_eq!(
            err,
            DomainError::bad_request("player did not participate in this match")
        );
    }

    #[test]
    fn mom_is_set_once() {
        let f = fixture();
        let m = play(&f, 1, 1);

        let unset = MomState::Unset;
        assert!(unset.current().unwrap_err().is_not_found());

        let set = unset.register(&m, &goal(f.away.id_typed())).unwrap();
        assert_eq!(set.current().unwrap().0, f.away.id_typed());

        let err = set.register(&m, &goal(f.home.id_typed())).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn mom_requires_participant() {
        let f = fixture();
        let m = play(&f, 0, 0);
        let err = MomState::Unset.register(&m, &goal(PlayerId::new())).unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    proptest! {
        #[test]
        fn outcome_is_consistent_with_scores(h in 0u32..50, a in 0u32..50) {
            let f = fixture();
            let outcome = determine_outcome(&play(&f, h, a));
            let expected = if h > a { Outcome::Home } else if a > h { Outcome::Away } else { Outcome::Draw };
            prop_assert_eq!(outcome, expected);
        }

        #[test]
        fn standings_stay_consistent_across_a_season(
            results in proptest::collection::vec((0u32..10, 0u32..10), 0..30)
        ) {
            let f = fixture();
            let (mut home, mut away) = (f.home.clone(), f.away.clone());
            let (mut scored, mut conceded) = (0u32, 0u32);

            for (h, a) in results {
                let m = play(&f, h, a);
                let r = apply_match_result(&m, &home, &away);
                // deterministic
                prop_assert_eq!(&r, &apply_match_result(&m, &home, &away));
                home = r.home;
                away = r.away;
                scored += h;
                conceded += a;
            }

            prop_assert!(home.stats().is_consistent());
            prop_assert!(away.stats().is_consistent());
            prop_assert_eq!(home.stats().matches_played(), away.stats().matches_played());
            prop_assert_eq!(home.stats().wins, Wins::from(away.stats().losses.value()));
            prop_assert_eq!(home.stats().goals.value(), scored);
            prop_assert_eq!(away.stats().concede.value(), scored);
            prop_assert_eq!(home.stats().concede.value(), conceded);
        }

        #[test]
        fn batch_within_ceiling_is_always_accepted(h in 0u32..8, a in 0u32..8, take_h in 0u32..8, take_a in 0u32..8) {
            let f = fixture();
            let m = play(&f, h, a);
            let mut batch = vec![goal(f.home.id_typed()); take_h as usize];
            batch.extend(vec![goal(f.away.id_typed()); take_a as usize]);

            let result = validate_event_batch(&m, &batch, &[]);
            prop_assert_eq!(result.is_ok(), take_h <= h && take_a <= a);
        }
    }

}
