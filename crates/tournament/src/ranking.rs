//! Scorer / assist / MOM leaderboards.

use std::collections::BTreeMap;

use serde::Serialize;

use scoreline_core::{ConventionId, DomainError, DomainResult, EventCount, EventName, PlayerId, PlayerName};

use crate::event::EventRecord;

/// One row of a leaderboard: how many times `player_id` was credited under
/// `event_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub player_id: PlayerId,
    pub player_name: PlayerName,
    pub event_name: EventName,
    pub count: EventCount,
}

/// What a leaderboard is restricted to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RankingScope {
    Convention(ConventionId),
    Player(PlayerId),
}

impl RankingScope {
    /// Exactly one selector must be present.
    pub fn from_selectors(
        convention_id: Option<ConventionId>,
        player_id: Option<PlayerId>,
    ) -> DomainResult<Self> {
        match (convention_id, player_id) {
            (Some(c), None) => Ok(RankingScope::Convention(c)),
            (None, Some(p)) => Ok(RankingScope::Player(p)),
            (Some(_), Some(_)) => Err(DomainError::bad_request(
                "specify either convention_id or player_id, not both",
            )),
            (None, None) => Err(DomainError::bad_request(
                "one of convention_id or player_id is required",
            )),
        }
    }
}

/// Group `records` by (player, event name) and count them.
///
/// Records whose player cannot be resolved by `player_name` are skipped.
/// The result is sorted with [`sort_ranking`].
pub fn tally<'a, I, F>(records: I, player_name: F) -> Vec<RankingEntry>
where
    I: IntoIterator<Item = &'a EventRecord>,
    F: Fn(PlayerId) -> Option<PlayerName>,
{
    let mut counts: BTreeMap<(PlayerId, EventName), u32> = BTreeMap::new();
    for record in records {
        *counts
            .entry((record.player_id(), record.name().clone()))
            .or_default() += 1;
    }

    let mut entries: Vec<RankingEntry> = counts
        .into_iter()
        .filter_map(|((player_id, event_name), count)| {
            player_name(player_id).map(|player_name| RankingEntry {
                player_id,
                player_name,
                event_name,
                count: EventCount::from(count),
            })
        })
        .collect();

    sort_ranking(&mut entries);
    entries
}

/// Count descending; ties by player name, event name, then player id.
pub fn sort_ranking(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.player_name.cmp(&b.player_name))
            .then_with(|| a.event_name.cmp(&b.event_name))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}
