use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scoreline_core::{ConventionId, DomainError, DomainResult, Entity, MatchId, PlayerId, Score};

use crate::ledger::{determine_outcome, Outcome};

/// Which side of a match a player played on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// A finished match between two players of the same convention.
///
/// Scores are fixed at registration; corrections are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    id: MatchId,
    convention_id: ConventionId,
    home_player_id: PlayerId,
    away_player_id: PlayerId,
    home_score: Score,
    away_score: Score,
    match_date: DateTime<Utc>,
}

impl Match {
    /// Record a new match result.
    ///
    /// A player cannot play against themselves.
    pub fn record(
        convention_id: ConventionId,
        home_player_id: PlayerId,
        away_player_id: PlayerId,
        home_score: Score,
        away_score: Score,
        match_date: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if home_player_id == away_player_id {
            return Err(DomainError::bad_request(
                "home and away player must be different players",
            ));
        }
        Ok(Self {
            id: MatchId::new(),
            convention_id,
            home_player_id,
            away_player_id,
            home_score,
            away_score,
            match_date,
        })
    }

    /// Rehydrate a stored match.
    pub fn from_parts(
        id: MatchId,
        convention_id: ConventionId,
        home_player_id: PlayerId,
        away_player_id: PlayerId,
        home_score: Score,
        away_score: Score,
        match_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            convention_id,
            home_player_id,
            away_player_id,
            home_score,
            away_score,
            match_date,
        }
    }

    pub fn id_typed(&self) -> MatchId {
        self.id
    }

    pub fn convention_id(&self) -> ConventionId {
        self.convention_id
    }

    pub fn home_player_id(&self) -> PlayerId {
        self.home_player_id
    }

    pub fn away_player_id(&self) -> PlayerId {
        self.away_player_id
    }

    pub fn home_score(&self) -> Score {
        self.home_score
    }

    pub fn away_score(&self) -> Score {
        self.away_score
    }

    pub fn match_date(&self) -> DateTime<Utc> {
        self.match_date
    }

    pub fn outcome(&self) -> Outcome {
        determine_outcome(self)
    }

    pub fn belongs_to(&self, convention_id: ConventionId) -> bool {
        self.convention_id == convention_id
    }

    /// The side `player_id` played on, or `None` if they did not take part.
    pub fn side_of(&self, player_id: PlayerId) -> Option<Side> {
        if player_id == self.home_player_id {
            Some(Side::Home)
        } else if player_id == self.away_player_id {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn score_of(&self, side: Side) -> Score {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }
}

impl Entity for Match {
    type Id = MatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
