//! Infrastructure layer: repositories, stores, use-case service and config.

pub mod config;
pub mod repository;
pub mod service;


pub use config::{AppConfig, ConfigError};
pub use repository::{InMemoryStore, PostgresStore, StoreError, UnitOfWork};
pub use service::{ServiceError, ServiceResult, TournamentService};
