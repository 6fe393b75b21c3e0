//! Validated free-text labels and calendar dates.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

macro_rules! label_value_object {
    ($(#[$meta:meta])* $t:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $t(String);

        impl $t {
            /// Surrounding whitespace is trimmed; an empty result is rejected.
            pub fn new(value: impl Into<String>) -> DomainResult<Self> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(concat!($label, " cannot be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ValueObject for $t {}

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

label_value_object!(ConventionName, "convention name");
label_value_object!(PlayerName, "player name");
label_value_object!(
    /// Real-world name attached to a scorer/assist/MOM record.
    ///
    /// Not a player reference: one player entry can log many named scorers.
    EventName,
    "event name"
);

/// Date a convention is held on, `YYYY-MM-DD`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HeldDate(NaiveDate);

impl HeldDate {
    const FORMAT: &'static str = "%Y-%m-%d";

    /// Parse a strict ISO calendar date. `2024-02-30` and `2024-2-1` are rejected.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let date = NaiveDate::parse_from_str(value, Self::FORMAT)
            .map_err(|e| DomainError::validation(format!("invalid date '{value}': {e}")))?;
        // chrono accepts unpadded fields; require the canonical spelling.
        if date.format(Self::FORMAT).to_string() != value {
            return Err(DomainError::validation(format!(
                "invalid date '{value}': expected YYYY-MM-DD"
            )));
        }
        Ok(Self(date))
    }

    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl ValueObject for HeldDate {}

impl TryFrom<String> for HeldDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HeldDate> for String {
    fn from(value: HeldDate) -> Self {
        value.to_string()
    }
}

impl core::fmt::Display for HeldDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        let name = PlayerName::new("  Taro ").unwrap();
        assert_eq!(name.as_str(), "Taro");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(ConventionName::new("   ").is_err());
        assert!(EventName::new("").is_err());
    }

    #[test]
    fn held_date_accepts_iso_dates() {
        let d = HeldDate::parse("2024-03-09").unwrap();
        assert_eq!(d.to_string(), "2024-03-09");
    }

    #[test]
    fn held_date_rejects_impossible_and_unpadded_dates() {
        assert!(HeldDate::parse("2024-02-30").is_err());
        assert!(HeldDate::parse("2024-2-1").is_err());
        assert!(HeldDate::parse("09/03/2024").is_err());
        assert!(HeldDate::parse("").is_err());
    }
}
