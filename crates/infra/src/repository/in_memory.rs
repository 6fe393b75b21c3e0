use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use scoreline_core::{ConventionId, MatchId, PlayerId};
use scoreline_tournament::{
    sort_standings, tally, Convention, EventKind, EventRecord, Match, Player,
    RankingEntry,
};

use super::r#trait::{
    ConventionRepository, EventRepository, MatchRepository, PlayerRepository, Session, StoreError,
    StoreResult, UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    conventions: BTreeMap<ConventionId, Convention>,
    players: HashMap<PlayerId, Player>,
    matches: HashMap<MatchId, Match>,
    events: HashMap<EventKind, Vec<EventRecord>>,
}

impl Tables {
    fn records(&self, kind: EventKind) -> &[EventRecord] {
        self.events.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn player_name(&self, player_id: PlayerId) -> Option<scoreline_core::PlayerName> {
        self.players.get(&player_id).map(|p| p.name().clone())
    }
}

/// In-memory store.
///
/// Intended for tests/dev. Sessions are fully serialized: `begin` waits for
/// the previous session to end, and each session works on a private copy of
/// the tables that replaces the shared copy on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UnitOfWork for InMemoryStore {
    type Session = InMemorySession;

    async fn begin(&self) -> StoreResult<Self::Session> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemorySession { guard, working })
    }
}

/// Session over [`InMemoryStore`]. Holds the store lock until it ends.
pub struct InMemorySession {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait::async_trait]
impl ConventionRepository for InMemorySession {
    async fn find_by_id(&mut self, id: ConventionId) -> StoreResult<Option<Convention>> {
        Ok(self.working.conventions.get(&id).cloned())
    }

    async fn save(&mut self, convention: &Convention) -> StoreResult<()> {
        self.working
            .conventions
            .insert(convention.id_typed(), convention.clone());
        Ok(())
    }

    async fn find_all(&mut self) -> StoreResult<Vec<Convention>> {
        // UUIDv7 keys sort by creation time.
        Ok(self.working.conventions.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl PlayerRepository for InMemorySession {
    async fn find_by_id(&mut self, id: PlayerId) -> StoreResult<Option<Player>> {
        Ok(self.working.players.get(&id).cloned())
    }

    async fn save(&mut self, player: &Player) -> StoreResult<()> {
        self.working.players.insert(player.id_typed(), player.clone());
        Ok(())
    }

    async fn find_by_convention(&mut self, convention_id: ConventionId) -> StoreResult<Vec<Player>> {
        let mut players: Vec<Player> = self
            .working
            .players
            .values()
            .filter(|p| p.belongs_to(convention_id))
            .cloned()
            .collect();
        sort_standings(&mut players);
        Ok(players)
    }
}

#[async_trait::async_trait]
impl MatchRepository for InMemorySession {
    async fn find_by_id(&mut self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.working.matches.get(&id).cloned())
    }

    async fn find_by_id_for_update(&mut self, id: MatchId) -> StoreResult<Option<Match>> {
        // The session already holds the store-wide lock.
        MatchRepository::find_by_id(self, id).await
    }

    async fn save(&mut self, m: &Match) -> StoreResult<()> {
        // Same referential rules as the Postgres schema.
        let tables = &self.working;
        if !tables.conventions.contains_key(&m.convention_id()) {
            return Err(StoreError::Backend(format!(
                "match {} references unknown convention {}",
                m.id_typed(),
                m.convention_id()
            )));
        }
        for player_id in [m.home_player_id(), m.away_player_id()] {
            if !tables.players.contains_key(&player_id) {
                return Err(StoreError::Backend(format!(
                    "match {} references unknown player {player_id}",
                    m.id_typed()
                )));
            }
        }
        self.working.matches.insert(m.id_typed(), m.clone());
        Ok(())
    }

    async fn find_all_by_convention(&mut self, convention_id: ConventionId) -> StoreResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .working
            .matches
            .values()
            .filter(|m| m.belongs_to(convention_id))
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.match_date(), m.id_typed()));
        Ok(matches)
    }
}

#[async_trait::async_trait]
impl EventRepository for InMemorySession {
    async fn find_by_match(&mut self, kind: EventKind, match_id: MatchId) -> StoreResult<Vec<EventRecord>> {
        Ok(self
            .working
            .records(kind)
            .iter()
            .filter(|r| r.match_id() == match_id)
            .cloned()
            .collect())
    }

    async fn save_batch(&mut self, kind: EventKind, records: &[EventRecord]) -> StoreResult<()> {
        self.working
            .events
            .entry(kind)
            .or_default()
            .extend(records.iter().cloned());
        Ok(())
    }

    async fn aggregate_by_convention(
        &mut self,
        kind: EventKind,
        convention_id: ConventionId,
    ) -> StoreResult<Vec<RankingEntry>> {
        let tables = &self.working;
        let in_convention = tables.records(kind).iter().filter(|r| {
            tables
                .matches
                .get(&r.match_id())
                .is_some_and(|m| m.belongs_to(convention_id))
        });
        Ok(tally(in_convention, |id| tables.player_name(id)))
    }

    async fn aggregate_by_player(
        &mut self,
        kind: EventKind,
        player_id: PlayerId,
    ) -> StoreResult<Vec<RankingEntry>> {
        let tables = &self.working;
        let by_player = tables
            .records(kind)
            .iter()
            .filter(|r| r.player_id() == player_id);
        Ok(tally(by_player, |id| tables.player_name(id)))
    }
}

#[async_trait::async_trait]
impl Session for InMemorySession {
    async fn commit(self) -> StoreResult<()> {
        let InMemorySession { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}
