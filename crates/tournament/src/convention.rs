use scoreline_core::{ConventionId, ConventionName, Entity, HeldDate};

/// A tournament / league grouping players and matches.
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convention {
    id: ConventionId,
    name: ConventionName,
    held_date: HeldDate,
}

impl Convention {
    /// Register a new convention. Without an explicit date it is held today (UTC).
    pub fn register(name: ConventionName, held_date: Option<HeldDate>) -> Self {
        Self {
            id: ConventionId::new(),
            name,
            held_date: held_date.unwrap_or_else(HeldDate::today),
        }
    }

    /// Rehydrate a stored convention.
    pub fn from_parts(id: ConventionId, name: ConventionName, held_date: HeldDate) -> Self {
        Self {
            id,
            name,
            held_date,
        }
    }

    pub fn id_typed(&self) -> ConventionId {
        self.id
    }

    pub fn name(&self) -> &ConventionName {
        &self.name
    }

    pub fn held_date(&self) -> HeldDate {
        self.held_date
    }
}

impl Entity for Convention {
    type Id = ConventionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_defaults_held_date_to_today() {
        let c = Convention::register(ConventionName::new("Spring Cup").unwrap(), None);
        assert_eq!(c.held_date(), HeldDate::today());
        assert_eq!(c.name().as_str(), "Spring Cup");
    }

    #[test]
    fn register_keeps_explicit_held_date() {
        let date = HeldDate::parse("2025-05-04").unwrap();
        let c = Convention::register(ConventionName::new("Golden Week").unwrap(), Some(date));
        assert_eq!(c.held_date(), date);
    }
}
