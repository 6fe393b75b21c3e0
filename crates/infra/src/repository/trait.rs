use thiserror::Error;

use scoreline_core::{ConventionId, MatchId, PlayerId};
use scoreline_tournament::{Convention, EventKind, EventRecord, Match, Player, RankingEntry};

/// Storage-level failure.
///
/// Opaque to callers above the service layer; domain outcomes such as
/// "not found" are expressed with `Option` return values instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait::async_trait]
pub trait ConventionRepository: Send {
    async fn find_by_id(&mut self, id: ConventionId) -> StoreResult<Option<Convention>>;

    async fn save(&mut self, convention: &Convention) -> StoreResult<()>;

    /// All conventions, oldest registration first.
    async fn find_all(&mut self) -> StoreResult<Vec<Convention>>;
}

#[async_trait::async_trait]
pub trait PlayerRepository: Send {
    async fn find_by_id(&mut self, id: PlayerId) -> StoreResult<Option<Player>>;

    /// Insert-or-update.
    async fn save(&mut self, player: &Player) -> StoreResult<()>;

    /// Players of one convention in standings order.
    async fn find_by_convention(&mut self, convention_id: ConventionId) -> StoreResult<Vec<Player>>;
}

#[async_trait::async_trait]
pub trait MatchRepository: Send {
    async fn find_by_id(&mut self, id: MatchId) -> StoreResult<Option<Match>>;

    /// Like `find_by_id`, but the match stays locked against concurrent
    /// sessions until this session ends.
    async fn find_by_id_for_update(&mut self, id: MatchId) -> StoreResult<Option<Match>>;

    async fn save(&mut self, m: &Match) -> StoreResult<()>;

    /// Matches of one convention ordered by match date.
    async fn find_all_by_convention(&mut self, convention_id: ConventionId) -> StoreResult<Vec<Match>>;
}

/// Scorer / assist / MOM records, one table per [`EventKind`].
#[async_trait::async_trait]
pub trait EventRepository: Send {
    async fn find_by_match(&mut self, kind: EventKind, match_id: MatchId) -> StoreResult<Vec<EventRecord>>;

    /// Insert every record or none of them.
    async fn save_batch(&mut self, kind: EventKind, records: &[EventRecord]) -> StoreResult<()>;

    async fn aggregate_by_convention(
        &mut self,
        kind: EventKind,
        convention_id: ConventionId,
    ) -> StoreResult<Vec<RankingEntry>>;

    async fn aggregate_by_player(
        &mut self,
        kind: EventKind,
        player_id: PlayerId,
    ) -> StoreResult<Vec<RankingEntry>>;
}

/// A transactional handle over every repository.
///
/// Nothing written through a session is visible to other sessions until
/// [`Session::commit`]. Dropping a session without committing discards its
/// writes.
#[async_trait::async_trait]
pub trait Session:
    ConventionRepository + PlayerRepository + MatchRepository + EventRepository + Sized
{
    fn conventions(&mut self) -> &mut dyn ConventionRepository {
        self
    }

    fn players(&mut self) -> &mut dyn PlayerRepository {
        self
    }

    fn matches(&mut self) -> &mut dyn MatchRepository {
        self
    }

    fn events(&mut self) -> &mut dyn EventRepository {
        self
    }

    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}

/// Opens sessions against a store.
#[async_trait::async_trait]
pub trait UnitOfWork: Send + Sync {
    type Session: Session + 'static;

    async fn begin(&self) -> StoreResult<Self::Session>;
}
