//! Postgres-backed store.
//!
//! One sqlx transaction per [`PgSession`]. Scorer, assist and MOM records
//! live in separate tables with identical shape; [`EventKind`] picks the
//! table.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |
//!
//! Rows that fail domain validation on the way out map to `Corrupt`.

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};
use uuid::Uuid;

use scoreline_core::{
    ConventionId, ConventionName, DomainError, EventName, HeldDate, MatchId, PlayerId, PlayerName,
};
use scoreline_tournament::{
    sort_ranking, Convention, EventId, EventKind, EventRecord, Match, Player, PlayerStats,
    RankingEntry,
};

use super::r#trait::{
    ConventionRepository, EventRepository, MatchRepository, PlayerRepository, Session, StoreError,
    StoreResult, UnitOfWork,
};

const SCHEMA: &str = include_str!("../../migrations/0001_tournament.sql");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn apply_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UnitOfWork for PostgresStore {
    type Session = PgSession;

    async fn begin(&self) -> StoreResult<Self::Session> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(PgSession { tx })
    }
}

pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl ConventionRepository for PgSession {
    #[instrument(skip(self), fields(convention_id = %id), err)]
    async fn find_by_id(&mut self, id: ConventionId) -> StoreResult<Option<Convention>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, held_date
            FROM conventions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_convention", e))?;

        row.as_ref().map(convention_from_row).transpose()
    }

    #[instrument(skip(self, convention), fields(convention_id = %convention.id_typed()), err)]
    async fn save(&mut self, convention: &Convention) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conventions (id, name, held_date)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(convention.id_typed().as_uuid())
        .bind(convention.name().as_str())
        .bind(convention.held_date().date())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_convention", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(row_count = tracing::field::Empty), err)]
    async fn find_all(&mut self) -> StoreResult<Vec<Convention>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, held_date
            FROM conventions
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_conventions", e))?;

        Span::current().record("row_count", rows.len());
        rows.iter().map(convention_from_row).collect()
    }
}

#[async_trait::async_trait]
impl PlayerRepository for PgSession {
    #[instrument(skip(self), fields(player_id = %id), err)]
    async fn find_by_id(&mut self, id: PlayerId) -> StoreResult<Option<Player>> {
        let row = sqlx::query(
            r#"
            SELECT id, convention_id, name, points, wins, draws, losses, goals, concede
            FROM players
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_player", e))?;

        row.as_ref().map(player_from_row).transpose()
    }

    #[instrument(skip(self, player), fields(player_id = %player.id_typed()), err)]
    async fn save(&mut self, player: &Player) -> StoreResult<()> {
        let stats = player.stats();
        sqlx::query(
            r#"
            INSERT INTO players (id, convention_id, name, points, wins, draws, losses, goals, concede)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id)
            DO UPDATE SET
                points = EXCLUDED.points,
                wins = EXCLUDED.wins,
                draws = EXCLUDED.draws,
                losses = EXCLUDED.losses,
                goals = EXCLUDED.goals,
                concede = EXCLUDED.concede
            "#,
        )
        .bind(player.id_typed().as_uuid())
        .bind(player.convention_id().as_uuid())
        .bind(player.name().as_str())
        .bind(i64::from(stats.points))
        .bind(i64::from(stats.wins))
        .bind(i64::from(stats.draws))
        .bind(i64::from(stats.losses))
        .bind(i64::from(stats.goals))
        .bind(i64::from(stats.concede))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_player", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(convention_id = %convention_id), err)]
    async fn find_by_convention(&mut self, convention_id: ConventionId) -> StoreResult<Vec<Player>> {
        let rows = sqlx::query(
            r#"
            SELECT id, convention_id, name, points, wins, draws, losses, goals, concede
            FROM players
            WHERE convention_id = $1
            ORDER BY points DESC, (goals - concede) DESC, goals DESC, name ASC, id ASC
            "#,
        )
        .bind(convention_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_players", e))?;

        rows.iter().map(player_from_row).collect()
    }
}

#[async_trait::async_trait]
impl MatchRepository for PgSession {
    #[instrument(skip(self), fields(match_id = %id), err)]
    async fn find_by_id(&mut self, id: MatchId) -> StoreResult<Option<Match>> {
        let row = sqlx::query(
            r#"
            SELECT id, convention_id, home_player_id, away_player_id, home_score, away_score, match_date
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_match", e))?;

        row.as_ref().map(match_from_row).transpose()
    }

    #[instrument(skip(self), fields(match_id = %id), err)]
    async fn find_by_id_for_update(&mut self, id: MatchId) -> StoreResult<Option<Match>> {
        let row = sqlx::query(
            r#"
            SELECT id, convention_id, home_player_id, away_player_id, home_score, away_score, match_date
            FROM matches
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_match", e))?;

        row.as_ref().map(match_from_row).transpose()
    }

    #[instrument(skip(self, m), fields(match_id = %m.id_typed()), err)]
    async fn save(&mut self, m: &Match) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO matches (id, convention_id, home_player_id, away_player_id, home_score, away_score, match_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(m.id_typed().as_uuid())
        .bind(m.convention_id().as_uuid())
        .bind(m.home_player_id().as_uuid())
        .bind(m.away_player_id().as_uuid())
        .bind(i64::from(m.home_score()))
        .bind(i64::from(m.away_score()))
        .bind(m.match_date())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_match", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(convention_id = %convention_id), err)]
    async fn find_all_by_convention(&mut self, convention_id: ConventionId) -> StoreResult<Vec<Match>> {
        let rows = sqlx::query(
            r#"
            SELECT id, convention_id, home_player_id, away_player_id, home_score, away_score, match_date
            FROM matches
            WHERE convention_id = $1
            ORDER BY match_date ASC, id ASC
            "#,
        )
        .bind(convention_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_matches", e))?;

        rows.iter().map(match_from_row).collect()
    }
}

#[async_trait::async_trait]
impl EventRepository for PgSession {
    #[instrument(skip(self), fields(kind = %kind, match_id = %match_id), err)]
    async fn find_by_match(&mut self, kind: EventKind, match_id: MatchId) -> StoreResult<Vec<EventRecord>> {
        let sql = format!(
            "SELECT id, name, match_id, player_id FROM {} WHERE match_id = $1 ORDER BY created_at ASC, id ASC",
            event_table(kind)
        );
        let rows = sqlx::query(&sql)
            .bind(match_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("find_events", e))?;

        rows.iter().map(|row| event_from_row(kind, row)).collect()
    }

    #[instrument(skip(self, records), fields(kind = %kind, record_count = records.len()), err)]
    async fn save_batch(&mut self, kind: EventKind, records: &[EventRecord]) -> StoreResult<()> {
        let sql = format!(
            "INSERT INTO {} (id, name, match_id, player_id) VALUES ($1, $2, $3, $4)",
            event_table(kind)
        );
        for record in records {
            sqlx::query(&sql)
                .bind(record.id().as_uuid())
                .bind(record.name().as_str())
                .bind(record.match_id().as_uuid())
                .bind(record.player_id().as_uuid())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_sqlx_error("insert_event", e))?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(kind = %kind, convention_id = %convention_id, row_count = tracing::field::Empty), err)]
    async fn aggregate_by_convention(
        &mut self,
        kind: EventKind,
        convention_id: ConventionId,
    ) -> StoreResult<Vec<RankingEntry>> {
        let sql = format!(
            r#"
            SELECT e.player_id, p.name AS player_name, e.name AS event_name, COUNT(*) AS count
            FROM {} e
            JOIN matches m ON m.id = e.match_id
            JOIN players p ON p.id = e.player_id
            WHERE m.convention_id = $1
            GROUP BY e.player_id, p.name, e.name
            "#,
            event_table(kind)
        );
        let rows = sqlx::query(&sql)
            .bind(convention_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("aggregate_by_convention", e))?;

        ranking_from_rows(&rows)
    }

    #[instrument(skip(self), fields(kind = %kind, player_id = %player_id, row_count = tracing::field::Empty), err)]
    async fn aggregate_by_player(
        &mut self,
        kind: EventKind,
        player_id: PlayerId,
    ) -> StoreResult<Vec<RankingEntry>> {
        let sql = format!(
            r#"
            SELECT e.player_id, p.name AS player_name, e.name AS event_name, COUNT(*) AS count
            FROM {} e
            JOIN players p ON p.id = e.player_id
            WHERE e.player_id = $1
            GROUP BY e.player_id, p.name, e.name
            "#,
            event_table(kind)
        );
        let rows = sqlx::query(&sql)
            .bind(player_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("aggregate_by_player", e))?;

        ranking_from_rows(&rows)
    }
}

#[async_trait::async_trait]
impl Session for PgSession {
    async fn commit(self) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

fn event_table(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Scorer => "scorers",
        EventKind::Assist => "assists",
        EventKind::Mom => "moms",
    }
}

// Row decoding

fn column<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Corrupt(format!("failed to read {name}: {e}")))
}

fn counter<T>(row: &PgRow, name: &str) -> StoreResult<T>
where
    T: TryFrom<i64, Error = DomainError>,
{
    let raw: i64 = column(row, name)?;
    T::try_from(raw).map_err(|e| corrupt(name, e))
}

fn corrupt(name: &str, err: DomainError) -> StoreError {
    StoreError::Corrupt(format!("{name}: {err}"))
}

fn convention_from_row(row: &PgRow) -> StoreResult<Convention> {
    let id: Uuid = column(row, "id")?;
    let name: String = column(row, "name")?;
    let held_date: chrono::NaiveDate = column(row, "held_date")?;

    Ok(Convention::from_parts(
        ConventionId::from_uuid(id),
        ConventionName::new(name).map_err(|e| corrupt("name", e))?,
        HeldDate::from_date(held_date),
    ))
}

fn player_from_row(row: &PgRow) -> StoreResult<Player> {
    let id: Uuid = column(row, "id")?;
    let convention_id: Uuid = column(row, "convention_id")?;
    let name: String = column(row, "name")?;
    let stats = PlayerStats {
        points: counter(row, "points")?,
        wins: counter(row, "wins")?,
        draws: counter(row, "draws")?,
        losses: counter(row, "losses")?,
        goals: counter(row, "goals")?,
        concede: counter(row, "concede")?,
    };

    Ok(Player::from_parts(
        PlayerId::from_uuid(id),
        ConventionId::from_uuid(convention_id),
        PlayerName::new(name).map_err(|e| corrupt("name", e))?,
        stats,
    ))
}

fn match_from_row(row: &PgRow) -> StoreResult<Match> {
    let id: Uuid = column(row, "id")?;
    let convention_id: Uuid = column(row, "convention_id")?;
    let home: Uuid = column(row, "home_player_id")?;
    let away: Uuid = column(row, "away_player_id")?;
    let match_date: chrono::DateTime<chrono::Utc> = column(row, "match_date")?;

    Ok(Match::from_parts(
        MatchId::from_uuid(id),
        ConventionId::from_uuid(convention_id),
        PlayerId::from_uuid(home),
        PlayerId::from_uuid(away),
        counter(row, "home_score")?,
        counter(row, "away_score")?,
        match_date,
    ))
}

fn event_from_row(kind: EventKind, row: &PgRow) -> StoreResult<EventRecord> {
    let id: Uuid = column(row, "id")?;
    let name: String = column(row, "name")?;
    let match_id: Uuid = column(row, "match_id")?;
    let player_id: Uuid = column(row, "player_id")?;

    Ok(EventRecord::from_parts(
        EventId::from_uuid(kind, id),
        EventName::new(name).map_err(|e| corrupt("name", e))?,
        MatchId::from_uuid(match_id),
        PlayerId::from_uuid(player_id),
    ))
}

fn ranking_from_rows(rows: &[PgRow]) -> StoreResult<Vec<RankingEntry>> {
    let mut entries = rows
        .iter()
        .map(|row| {
            let player_id: Uuid = column(row, "player_id")?;
            let player_name: String = column(row, "player_name")?;
            let event_name: String = column(row, "event_name")?;
            Ok(RankingEntry {
                player_id: PlayerId::from_uuid(player_id),
                player_name: PlayerName::new(player_name).map_err(|e| corrupt("player_name", e))?,
                event_name: EventName::new(event_name).map_err(|e| corrupt("event_name", e))?,
                count: counter(row, "count")?,
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    sort_ranking(&mut entries);
    Span::current().record("row_count", entries.len());
    Ok(entries)
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Backend(format!("sqlx error in {}: {}", operation, other)),
    }
}
