//! `scoreline-tournament`: tournament domain.
//!
//! Entities (convention, player, match, attribution records), the match
//! result ledger and the ranking aggregator. Pure domain, no I/O.

pub mod convention;
pub mod event;
pub mod ledger;
pub mod r#match;
pub mod player;
pub mod ranking;

pub use convention::Convention;
pub use event::{EventId, EventKind, EventRecord, NewEvent};
pub use ledger::{
    apply_match_result, determine_outcome, validate_event_batch, MatchResult, MomState, Outcome,
    TeamTally,
};
pub use player::{sort_standings, Player, PlayerStats};
pub use r#match::{Match, Side};
pub use ranking::{sort_ranking, tally, RankingEntry, RankingScope};
