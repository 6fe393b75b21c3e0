//! `scoreline-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, validated value objects and the domain error model.

pub mod entity;
pub mod error;
pub mod id;
pub mod label;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AssistId, ConventionId, MatchId, MomId, PlayerId, ScorerId};
pub use label::{ConventionName, EventName, HeldDate, PlayerName};
pub use value_object::{
    Concede, Draws, EventCount, Goals, Losses, Points, Score, ValueObject, Wins, DRAW_POINTS,
    WIN_POINTS,
};
