//! Value objects: equality by value, not identity.
//!
//! Every counter in the ledger is a non-negative integer wrapped in its own
//! type so a `Goals` can never be passed where `Points` is expected.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one: `points.add_win()` returns a fresh `Points`, leaving the
/// original untouched.
///
/// ```ignore
/// let before = Wins::ZERO;
/// let after = before.increment();
/// assert_eq!(before.value(), 0);
/// assert_eq!(after.value(), 1);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

macro_rules! counter_value_object {
    ($(#[$meta:meta])* $t:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $t(u32);

        impl $t {
            pub const ZERO: Self = Self(0);

            /// Validate an externally supplied integer (request body, database row).
            pub fn new(value: i64) -> DomainResult<Self> {
                if value < 0 {
                    return Err(DomainError::validation(concat!($label, " cannot be negative")));
                }
                u32::try_from(value)
                    .map(Self)
                    .map_err(|_| DomainError::validation(concat!($label, " is out of range")))
            }

            pub fn value(self) -> u32 {
                self.0
            }

            pub fn increment(self) -> Self {
                Self(self.0.saturating_add(1))
            }

            pub fn add(self, amount: u32) -> Self {
                Self(self.0.saturating_add(amount))
            }
        }

        impl ValueObject for $t {}

        impl TryFrom<i64> for $t {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                i64::from(value.0)
            }
        }

        impl From<u32> for $t {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

counter_value_object!(
    /// Goals one side scored in a single match.
    Score,
    "score"
);
counter_value_object!(
    /// League points (3 per win, 1 per draw).
    Points,
    "points"
);
counter_value_object!(Wins, "wins");
counter_value_object!(Draws, "draws");
counter_value_object!(Losses, "losses");
counter_value_object!(
    /// Cumulative goals scored across matches.
    Goals,
    "goals"
);
counter_value_object!(
    /// Cumulative goals conceded across matches.
    Concede,
    "concede"
);
counter_value_object!(
    /// Number of times a (player, name) pair appears in a leaderboard.
    EventCount,
    "event count"
);

/// Points awarded for a win.
pub const WIN_POINTS: u32 = 3;
/// Points awarded for a draw.
pub const DRAW_POINTS: u32 = 1;

impl Points {
    pub fn add_win(self) -> Self {
        self.add(WIN_POINTS)
    }

    pub fn add_draw(self) -> Self {
        self.add(DRAW_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn negative_counters_are_rejected() {
        let err = Score::new(-1).unwrap_err();
        assert_eq!(err, DomainError::validation("score cannot be negative"));
        assert!(Points::new(-3).is_err());
        assert!(Concede::new(-10).is_err());
    }

    #[test]
    fn oversized_counters_are_rejected() {
        assert!(Goals::new(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn points_award_win_and_draw() {
        let p = Points::ZERO.add_win().add_draw();
        assert_eq!(p.value(), 4);
    }

    #[test]
    fn increment_returns_a_new_value() {
        let before = Wins::ZERO;
        let after = before.increment();
        assert_eq!(before.value(), 0);
        assert_eq!(after.value(), 1);
    }

    #[test]
    fn deserializing_a_negative_number_fails() {
        assert!(serde_json::from_str::<Score>("-2").is_err());
        assert_eq!(serde_json::from_str::<Score>("2").unwrap().value(), 2);
        assert_eq!(serde_json::to_string(&Draws::from(7)).unwrap(), "7");
    }

    proptest! {
        #[test]
        fn non_negative_inputs_round_trip_through_i64(v in 0i64..=i64::from(u32::MAX)) {
            let s = Score::new(v).unwrap();
            prop_assert_eq!(i64::from(s), v);
        }

        #[test]
        fn add_never_decreases(start in 0u32..1_000_000, amount in 0u32..1_000_000) {
            let g = Goals::from(start);
            prop_assert!(g.add(amount) >= g);
        }
    }
}
