//! Repository boundary.
//!
//! Async repository traits over the tournament entities, a transactional
//! [`Session`] that bundles them, and the two stores that implement them.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemorySession, InMemoryStore};
pub use postgres::{PgSession, PostgresStore};
pub use r#trait::{
    ConventionRepository, EventRepository, MatchRepository, PlayerRepository, Session, StoreError,
    StoreResult, UnitOfWork,
};
