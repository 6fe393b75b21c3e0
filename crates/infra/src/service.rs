//! Tournament use cases.
//!
//! Every public method of [`TournamentService`] is one unit of work: it
//! opens a [`Session`], runs its steps against that session and commits.
//! Any error rolls the whole unit back.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use scoreline_core::{
    ConventionId, ConventionName, DomainError, EventName, HeldDate, MatchId, PlayerId, PlayerName,
    Score,
};
use scoreline_tournament::{
    apply_match_result, validate_event_batch, Convention, EventId, EventKind, EventRecord, Match,
    MomState, NewEvent, Player, RankingEntry, RankingScope,
};

use crate::repository::{Session, StoreError, UnitOfWork};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::NotFound(what) => ServiceError::NotFound(what),
            DomainError::BadRequest(msg) => ServiceError::BadRequest(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Application service over a [`UnitOfWork`].
#[derive(Debug, Clone)]
pub struct TournamentService<U> {
    uow: U,
}

impl<U: UnitOfWork> TournamentService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    pub fn store(&self) -> &U {
        &self.uow
    }

    async fn finish<T: Send>(
        &self,
        operation: &'static str,
        session: U::Session,
        result: ServiceResult<T>,
    ) -> ServiceResult<T> {
        match result {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(err) => {
                warn!(operation, error = %err, "rolling back unit of work");
                if let Err(rollback_err) = session.rollback().await {
                    error!(operation, error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    #[instrument(skip(self, name), fields(name = %name.as_str()), err)]
    pub async fn register_convention(
        &self,
        name: ConventionName,
        held_date: Option<HeldDate>,
    ) -> ServiceResult<ConventionId> {
        let convention = Convention::register(name, held_date);
        let mut session = self.uow.begin().await?;
        let result = session
            .conventions()
            .save(&convention)
            .await
            .map(|()| convention.id_typed())
            .map_err(ServiceError::from);
        let id = self.finish("register_convention", session, result).await?;
        info!(convention_id = %id, held_date = %convention.held_date(), "convention registered");
        Ok(id)
    }

    #[instrument(skip(self, name), fields(convention_id = %convention_id), err)]
    pub async fn register_player(
        &self,
        convention_id: ConventionId,
        name: PlayerName,
    ) -> ServiceResult<PlayerId> {
        let mut session = self.uow.begin().await?;
        let result = register_player_in(&mut session, convention_id, name).await;
        let id = self.finish("register_player", session, result).await?;
        info!(player_id = %id, "player registered");
        Ok(id)
    }

    #[instrument(skip(self), err)]
    pub async fn register_match(
        &self,
        convention_id: ConventionId,
        home_player_id: PlayerId,
        away_player_id: PlayerId,
        home_score: Score,
        away_score: Score,
    ) -> ServiceResult<MatchId> {
        let mut session = self.uow.begin().await?;
        let result = register_match_in(
            &mut session,
            convention_id,
            home_player_id,
            away_player_id,
            home_score,
            away_score,
        )
        .await;
        let id = self.finish("register_match", session, result).await?;
        info!(match_id = %id, "match registered and standings updated");
        Ok(id)
    }

    /// Register a batch of scorer or assist records for one match.
    #[instrument(skip(self, events), fields(event_count = events.len()), err)]
    pub async fn register_events(
        &self,
        kind: EventKind,
        convention_id: ConventionId,
        match_id: MatchId,
        events: Vec<NewEvent>,
    ) -> ServiceResult<Vec<EventId>> {
        if !kind.is_bounded_by_score() {
            return Err(ServiceError::BadRequest(format!(
                "{kind} records are registered one at a time"
            )));
        }
        let mut session = self.uow.begin().await?;
        let result = register_events_in(&mut session, kind, convention_id, match_id, events).await;
        let ids = self.finish("register_events", session, result).await?;
        info!(kind = %kind, match_id = %match_id, registered = ids.len(), "events registered");
        Ok(ids)
    }

    #[instrument(skip(self, name), err)]
    pub async fn register_mom(
        &self,
        convention_id: ConventionId,
        match_id: MatchId,
        player_id: PlayerId,
        name: EventName,
    ) -> ServiceResult<EventId> {
        let mut session = self.uow.begin().await?;
        let result = register_mom_in(
            &mut session,
            convention_id,
            match_id,
            NewEvent::new(player_id, name),
        )
        .await;
        let id = self.finish("register_mom", session, result).await?;
        info!(match_id = %match_id, mom_id = %id, "man of the match registered");
        Ok(id)
    }

    /// Players of a convention in league-table order.
    #[instrument(skip(self), err)]
    pub async fn get_standings(&self, convention_id: ConventionId) -> ServiceResult<Vec<Player>> {
        let mut session = self.uow.begin().await?;
        let result: ServiceResult<_> = async {
            require_convention(&mut session, convention_id).await?;
            Ok(session.players().find_by_convention(convention_id).await?)
        }
        .await;
        self.finish("get_standings", session, result).await
    }

    #[instrument(skip(self), err)]
    pub async fn get_ranking(
        &self,
        kind: EventKind,
        scope: RankingScope,
    ) -> ServiceResult<Vec<RankingEntry>> {
        let mut session = self.uow.begin().await?;
        let result: ServiceResult<_> = async {
            match scope {
                RankingScope::Convention(convention_id) => {
                    require_convention(&mut session, convention_id).await?;
                    Ok(session
                        .events()
                        .aggregate_by_convention(kind, convention_id)
                        .await?)
                }
                RankingScope::Player(player_id) => {
                    if session.players().find_by_id(player_id).await?.is_none() {
                        return Err(not_found("player", player_id));
                    }
                    Ok(session.events().aggregate_by_player(kind, player_id).await?)
                }
            }
        }
        .await;
        self.finish("get_ranking", session, result).await
    }

    pub async fn list_conventions(&self) -> ServiceResult<Vec<Convention>> {
        let mut session = self.uow.begin().await?;
        let result = session
            .conventions()
            .find_all()
            .await
            .map_err(ServiceError::from);
        self.finish("list_conventions", session, result).await
    }

    pub async fn get_convention(&self, convention_id: ConventionId) -> ServiceResult<Convention> {
        let mut session = self.uow.begin().await?;
        let result = require_convention(&mut session, convention_id).await;
        self.finish("get_convention", session, result).await
    }

    pub async fn get_player(
        &self,
        convention_id: ConventionId,
        player_id: PlayerId,
    ) -> ServiceResult<Player> {
        let mut session = self.uow.begin().await?;
        let result: ServiceResult<_> = async {
            require_convention(&mut session, convention_id).await?;
            require_player(&mut session, convention_id, player_id).await
        }
        .await;
        self.finish("get_player", session, result).await
    }

    /// Matches of a convention ordered by match date.
    pub async fn list_matches(&self, convention_id: ConventionId) -> ServiceResult<Vec<Match>> {
        let mut session = self.uow.begin().await?;
        let result: ServiceResult<_> = async {
            require_convention(&mut session, convention_id).await?;
            Ok(session.matches().find_all_by_convention(convention_id).await?)
        }
        .await;
        self.finish("list_matches", session, result).await
    }

    pub async fn get_match(
        &self,
        convention_id: ConventionId,
        match_id: MatchId,
    ) -> ServiceResult<Match> {
        let mut session = self.uow.begin().await?;
        let result: ServiceResult<_> = async {
            require_convention(&mut session, convention_id).await?;
            require_match(&mut session, convention_id, match_id, false).await
        }
        .await;
        self.finish("get_match", session, result).await
    }

    pub async fn list_events(
        &self,
        kind: EventKind,
        convention_id: ConventionId,
        match_id: MatchId,
    ) -> ServiceResult<Vec<EventRecord>> {
        let mut session = self.uow.begin().await?;
        let result: ServiceResult<_> = async {
            require_convention(&mut session, convention_id).await?;
            require_match(&mut session, convention_id, match_id, false).await?;
            Ok(session.events().find_by_match(kind, match_id).await?)
        }
        .await;
        self.finish("list_events", session, result).await
    }

    /// The man of the match, `NotFound` until one is registered.
    pub async fn get_mom(
        &self,
        convention_id: ConventionId,
        match_id: MatchId,
    ) -> ServiceResult<EventRecord> {
        let mut session = self.uow.begin().await?;
        let result: ServiceResult<_> = async {
            require_convention(&mut session, convention_id).await?;
            require_match(&mut session, convention_id, match_id, false).await?;
            let mut records = session.events().find_by_match(EventKind::Mom, match_id).await?;
            MomState::from_record(records.first()).current()?;
            Ok(records.swap_remove(0))
        }
        .await;
        self.finish("get_mom", session, result).await
    }
}

// Unit-of-work steps. Each runs inside the caller's session.

fn not_found(resource: &str, id: impl core::fmt::Display) -> ServiceError {
    DomainError::not_found(format!("{resource} id {id}")).into()
}

async fn require_convention<S: Session>(
    session: &mut S,
    convention_id: ConventionId,
) -> ServiceResult<Convention> {
    session
        .conventions()
        .find_by_id(convention_id)
        .await?
        .ok_or_else(|| not_found("convention", convention_id))
}

async fn require_player<S: Session>(
    session: &mut S,
    convention_id: ConventionId,
    player_id: PlayerId,
) -> ServiceResult<Player> {
    session
        .players()
        .find_by_id(player_id)
        .await?
        .filter(|p| p.belongs_to(convention_id))
        .ok_or_else(|| not_found("player", player_id))
}

async fn require_match<S: Session>(
    session: &mut S,
    convention_id: ConventionId,
    match_id: MatchId,
    for_update: bool,
) -> ServiceResult<Match> {
    let found = if for_update {
        session.matches().find_by_id_for_update(match_id).await?
    } else {
        session.matches().find_by_id(match_id).await?
    };
    found
        .filter(|m| m.belongs_to(convention_id))
        .ok_or_else(|| not_found("match", match_id))
}

async fn register_player_in<S: Session>(
    session: &mut S,
    convention_id: ConventionId,
    name: PlayerName,
) -> ServiceResult<PlayerId> {
    require_convention(session, convention_id).await?;
    let player = Player::register(convention_id, name);
    session.players().save(&player).await?;
    Ok(player.id_typed())
}

async fn register_match_in<S: Session>(
    session: &mut S,
    convention_id: ConventionId,
    home_player_id: PlayerId,
    away_player_id: PlayerId,
    home_score: Score,
    away_score: Score,
) -> ServiceResult<MatchId> {
    require_convention(session, convention_id).await?;

    let m = Match::record(
        convention_id,
        home_player_id,
        away_player_id,
        home_score,
        away_score,
        Utc::now(),
    )?;

    // Both players must exist before the match row references them.
    let home = require_player(session, convention_id, home_player_id).await?;
    let away = require_player(session, convention_id, away_player_id).await?;

    session.matches().save(&m).await?;

    let result = apply_match_result(&m, &home, &away);
    session.players().save(&result.home).await?;
    session.players().save(&result.away).await?;

    Ok(m.id_typed())
}

async fn register_events_in<S: Session>(
    session: &mut S,
    kind: EventKind,
    convention_id: ConventionId,
    match_id: MatchId,
    events: Vec<NewEvent>,
) -> ServiceResult<Vec<EventId>> {
    require_convention(session, convention_id).await?;
    let m = require_match(session, convention_id, match_id, true).await?;

    let existing = session.events().find_by_match(kind, match_id).await?;
    validate_event_batch(&m, &events, &existing)?;

    let records: Vec<EventRecord> = events
        .into_iter()
        .map(|e| EventRecord::attribute(kind, match_id, e))
        .collect();
    session.events().save_batch(kind, &records).await?;

    Ok(records.iter().map(EventRecord::id).collect())
}

async fn register_mom_in<S: Session>(
    session: &mut S,
    convention_id: ConventionId,
    match_id: MatchId,
    event: NewEvent,
) -> ServiceResult<EventId> {
    require_convention(session, convention_id).await?;
    let m = require_match(session, convention_id, match_id, true).await?;

    let existing = session.events().find_by_match(EventKind::Mom, match_id).await?;
    MomState::from_record(existing.first()).register(&m, &event)?;

    let record = EventRecord::attribute(EventKind::Mom, match_id, event);
    session
        .events()
        .save_batch(EventKind::Mom, std::slice::from_ref(&record))
        .await?;
    Ok(record.id())
}
