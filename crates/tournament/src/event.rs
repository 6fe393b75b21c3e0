//! Scorer / assist / man-of-the-match attribution records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scoreline_core::{AssistId, DomainError, EventName, MatchId, MomId, PlayerId, ScorerId};

/// Role of an attribution record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Scorer,
    Assist,
    Mom,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Scorer, EventKind::Assist, EventKind::Mom];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Scorer => "scorer",
            EventKind::Assist => "assist",
            EventKind::Mom => "mom",
        }
    }

    /// Scorer and assist records attribute one of the side's goals, so their
    /// per-side count is capped by that side's score. MOM is capped at one.
    pub fn is_bounded_by_score(self) -> bool {
        matches!(self, EventKind::Scorer | EventKind::Assist)
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scorer" | "scorers" => Ok(EventKind::Scorer),
            "assist" | "assists" => Ok(EventKind::Assist),
            "mom" | "moms" => Ok(EventKind::Mom),
            other => Err(DomainError::validation(format!("unknown event kind '{other}'"))),
        }
    }
}

/// Identifier of an attribution record, tagged with its role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventId {
    Scorer(ScorerId),
    Assist(AssistId),
    Mom(MomId),
}

impl EventId {
    pub fn generate(kind: EventKind) -> Self {
        match kind {
            EventKind::Scorer => EventId::Scorer(ScorerId::new()),
            EventKind::Assist => EventId::Assist(AssistId::new()),
            EventKind::Mom => EventId::Mom(MomId::new()),
        }
    }

    pub fn from_uuid(kind: EventKind, uuid: Uuid) -> Self {
        match kind {
            EventKind::Scorer => EventId::Scorer(ScorerId::from_uuid(uuid)),
            EventKind::Assist => EventId::Assist(AssistId::from_uuid(uuid)),
            EventKind::Mom => EventId::Mom(MomId::from_uuid(uuid)),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            EventId::Scorer(_) => EventKind::Scorer,
            EventId::Assist(_) => EventKind::Assist,
            EventId::Mom(_) => EventKind::Mom,
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        match self {
            EventId::Scorer(id) => id.as_uuid(),
            EventId::Assist(id) => id.as_uuid(),
            EventId::Mom(id) => id.as_uuid(),
        }
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self.as_uuid(), f)
    }
}

/// A submitted attribution that has not been validated or stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub player_id: PlayerId,
    pub name: EventName,
}

impl NewEvent {
    pub fn new(player_id: PlayerId, name: EventName) -> Self {
        Self { player_id, name }
    }
}

/// A stored attribution. Insert-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    id: EventId,
    name: EventName,
    match_id: MatchId,
    player_id: PlayerId,
}

impl EventRecord {
    /// Turn a validated submission into a record with a fresh id.
    pub fn attribute(kind: EventKind, match_id: MatchId, event: NewEvent) -> Self {
        Self {
            id: EventId::generate(kind),
            name: event.name,
            match_id,
            player_id: event.player_id,
        }
    }

    /// Rehydrate a stored record.
    pub fn from_parts(id: EventId, name: EventName, match_id: MatchId, player_id: PlayerId) -> Self {
        Self {
            id,
            name,
            match_id,
            player_id,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.id.kind()
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }
}
