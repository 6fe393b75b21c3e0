use scoreline_core::{
    Concede, ConventionId, Draws, Entity, Goals, Losses, PlayerId, PlayerName, Points, Score, Wins,
};

/// Cumulative standings counters of one player.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub points: Points,
    pub wins: Wins,
    pub draws: Draws,
    pub losses: Losses,
    pub goals: Goals,
    pub concede: Concede,
}

impl PlayerStats {
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals) - i64::from(self.concede)
    }

    /// `points == 3 * wins + draws`, the relationship the `record_*` methods keep.
    pub fn is_consistent(&self) -> bool {
        let expected = u64::from(self.wins.value()) * u64::from(scoreline_core::WIN_POINTS)
            + u64::from(self.draws.value()) * u64::from(scoreline_core::DRAW_POINTS);
        u64::from(self.points.value()) == expected
    }

    pub fn matches_played(&self) -> u32 {
        self.wins
            .value()
            .saturating_add(self.draws.value())
            .saturating_add(self.losses.value())
    }
}

/// A participant registered to one convention.
///
/// Stats only change through the `record_*` / `add_*` methods, each of which
/// returns a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    convention_id: ConventionId,
    name: PlayerName,
    stats: PlayerStats,
}

impl Player {
    /// Register a new player with every counter at zero.
    pub fn register(convention_id: ConventionId, name: PlayerName) -> Self {
        Self {
            id: PlayerId::new(),
            convention_id,
            name,
            stats: PlayerStats::default(),
        }
    }

    /// Rehydrate a stored player.
    pub fn from_parts(
        id: PlayerId,
        convention_id: ConventionId,
        name: PlayerName,
        stats: PlayerStats,
    ) -> Self {
        Self {
            id,
            convention_id,
            name,
            stats,
        }
    }

    pub fn id_typed(&self) -> PlayerId {
        self.id
    }

    pub fn convention_id(&self) -> ConventionId {
        self.convention_id
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn belongs_to(&self, convention_id: ConventionId) -> bool {
        self.convention_id == convention_id
    }

    #[must_use]
    pub fn record_win(&self) -> Self {
        self.with_stats(PlayerStats {
            points: self.stats.points.add_win(),
            wins: self.stats.wins.increment(),
            ..self.stats
        })
    }

    #[must_use]
    pub fn record_draw(&self) -> Self {
        self.with_stats(PlayerStats {
            points: self.stats.points.add_draw(),
            draws: self.stats.draws.increment(),
            ..self.stats
        })
    }

    #[must_use]
    pub fn record_loss(&self) -> Self {
        self.with_stats(PlayerStats {
            losses: self.stats.losses.increment(),
            ..self.stats
        })
    }

    #[must_use]
    pub fn add_goals(&self, scored: Score) -> Self {
        self.with_stats(PlayerStats {
            goals: self.stats.goals.add(scored.value()),
            ..self.stats
        })
    }

    #[must_use]
    pub fn add_concede(&self, conceded: Score) -> Self {
        self.with_stats(PlayerStats {
            concede: self.stats.concede.add(conceded.value()),
            ..self.stats
        })
    }

    fn with_stats(&self, stats: PlayerStats) -> Self {
        Self {
            stats,
            ..self.clone()
        }
    }
}

impl Entity for Player {
    type Id = PlayerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// League table order: points, goal difference, goals (all descending), then
/// name and id ascending.
pub fn sort_standings(players: &mut [Player]) {
    players.sort_by(|a, b| {
        let (sa, sb) = (a.stats(), b.stats());
        sb.points
            .cmp(&sa.points)
            .then_with(|| sb.goal_difference().cmp(&sa.goal_difference()))
            .then_with(|| sb.goals.cmp(&sa.goals))
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.id_typed().cmp(&b.id_typed()))
    });
}
