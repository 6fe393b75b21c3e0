//! Service wiring: picks the store backing [`TournamentService`].

use anyhow::Context;

use scoreline_infra::{AppConfig, InMemoryStore, PostgresStore, TournamentService};

/// The tournament service over whichever store the process was configured
/// with. Handlers go through [`with_service!`](crate::with_service).
#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory(TournamentService<InMemoryStore>),
    Persistent(TournamentService<PostgresStore>),
}

impl AppServices {
    pub fn in_memory() -> Self {
        AppServices::InMemory(TournamentService::new(InMemoryStore::new()))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            AppServices::InMemory(_) => "in_memory",
            AppServices::Persistent(_) => "postgres",
        }
    }
}

/// Run `$body` with `$svc` bound to the concrete service.
#[macro_export]
macro_rules! with_service {
    ($services:expr, $svc:ident => $body:expr) => {
        match $services {
            $crate::app::services::AppServices::InMemory($svc) => $body,
            $crate::app::services::AppServices::Persistent($svc) => $body,
        }
    };
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory store");
        return Ok(AppServices::in_memory());
    };

    let store = PostgresStore::connect(database_url, config.db_max_connections)
        .await
        .context("failed to connect to Postgres")?;
    store
        .apply_schema()
        .await
        .context("failed to apply database schema")?;

    tracing::info!(max_connections = config.db_max_connections, "using postgres store");
    Ok(AppServices::Persistent(TournamentService::new(store)))
}
