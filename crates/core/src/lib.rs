#![forbid(unsafe_code)]

pub mod schedule;

pub mod ids {
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct OwnerId(String);

    impl OwnerId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
            let value = value.into();
            validate_owner_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum OwnerIdError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    fn validate_owner_id(value: &str) -> Result<(), OwnerIdError> {
        if value.is_empty() {
            return Err(OwnerIdError::Empty);
        }
        if value.len() > 128 {
            return Err(OwnerIdError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(OwnerIdError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(OwnerIdError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '/' | '-') {
                continue;
            }
            return Err(OwnerIdError::InvalidChar { ch, index });
        }
        Ok(())
    }
}

pub mod model {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum QuestStatus {
        Backlog,
        Active,
        Completed,
        Abandoned,
    }

    impl QuestStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                QuestStatus::Backlog => "BACKLOG",
                QuestStatus::Active => "ACTIVE",
                QuestStatus::Completed => "COMPLETED",
                QuestStatus::Abandoned => "ABANDONED",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "BACKLOG" => Some(QuestStatus::Backlog),
                "ACTIVE" => Some(QuestStatus::Active),
                "COMPLETED" => Some(QuestStatus::Completed),
                "ABANDONED" => Some(QuestStatus::Abandoned),
                _ => None,
            }
        }

        pub fn is_terminal(self) -> bool {
            matches!(self, QuestStatus::Completed | QuestStatus::Abandoned)
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum EpicStatus {
        Active,
        Completed,
        Archived,
    }

    impl EpicStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                EpicStatus::Active => "ACTIVE",
                EpicStatus::Completed => "COMPLETED",
                EpicStatus::Archived => "ARCHIVED",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "ACTIVE" => Some(EpicStatus::Active),
                "COMPLETED" => Some(EpicStatus::Completed),
                "ARCHIVED" => Some(EpicStatus::Archived),
                _ => None,
            }
        }
    }

    /// Closed set of entities a captured inbox item can be converted into.
    /// Each variant carries the full payload needed to construct the target,
    /// so triage never needs a second round-trip.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum TriageTarget {
        Quest {
            title: String,
            description: Option<String>,
            energy: i64,
            epic_id: Option<String>,
        },
        Note {
            title: String,
            body: String,
        },
        Item {
            name: String,
            quantity: i64,
        },
        SourceDocument {
            title: String,
            url: Option<String>,
            body: Option<String>,
        },
    }

    impl TriageTarget {
        pub fn kind(&self) -> &'static str {
            match self {
                TriageTarget::Quest { .. } => "quest",
                TriageTarget::Note { .. } => "note",
                TriageTarget::Item { .. } => "item",
                TriageTarget::SourceDocument { .. } => "source_document",
            }
        }
    }
}

pub mod validate {
    pub const TITLE_MAX_CHARS: usize = 200;
    pub const ENERGY_MIN: i64 = 1;
    pub const ENERGY_MAX: i64 = 5;
    pub const BUDGET_MIN: i64 = 1;
    pub const BUDGET_MAX: i64 = 10;
    pub const TIME_OF_DAY_MAX_MIN: i64 = 1439;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ValidationError {
        TitleBlank,
        TitleTooLong,
        EnergyOutOfRange,
        BudgetOutOfRange,
        OrdinalNegative,
        ContentBlank,
        QuantityNotPositive,
        TimeOfDayOutOfRange,
    }

    impl ValidationError {
        pub fn message(self) -> &'static str {
            match self {
                ValidationError::TitleBlank => "title must not be blank",
                ValidationError::TitleTooLong => "title must be at most 200 characters",
                ValidationError::EnergyOutOfRange => "energy must be between 1 and 5",
                ValidationError::BudgetOutOfRange => "budget must be between 1 and 10",
                ValidationError::OrdinalNegative => "order must be non-negative",
                ValidationError::ContentBlank => "content must not be blank",
                ValidationError::QuantityNotPositive => "quantity must be at least 1",
                ValidationError::TimeOfDayOutOfRange => {
                    "time of day must be between 0 and 1439 minutes"
                }
            }
        }
    }

    pub fn title(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::TitleBlank);
        }
        if value.chars().count() > TITLE_MAX_CHARS {
            return Err(ValidationError::TitleTooLong);
        }
        Ok(())
    }

    pub fn energy(value: i64) -> Result<(), ValidationError> {
        if !(ENERGY_MIN..=ENERGY_MAX).contains(&value) {
            return Err(ValidationError::EnergyOutOfRange);
        }
        Ok(())
    }

    pub fn budget(value: i64) -> Result<(), ValidationError> {
        if !(BUDGET_MIN..=BUDGET_MAX).contains(&value) {
            return Err(ValidationError::BudgetOutOfRange);
        }
        Ok(())
    }

    pub fn ordinal(value: i64) -> Result<(), ValidationError> {
        if value < 0 {
            return Err(ValidationError::OrdinalNegative);
        }
        Ok(())
    }

    pub fn content(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::ContentBlank);
        }
        Ok(())
    }

    pub fn quantity(value: i64) -> Result<(), ValidationError> {
        if value < 1 {
            return Err(ValidationError::QuantityNotPositive);
        }
        Ok(())
    }

    pub fn time_of_day(value: i64) -> Result<(), ValidationError> {
        if !(0..=TIME_OF_DAY_MAX_MIN).contains(&value) {
            return Err(ValidationError::TimeOfDayOutOfRange);
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn title_limits() {
            assert_eq!(title("Ship it"), Ok(()));
            assert_eq!(title("   "), Err(ValidationError::TitleBlank));
            let long = "x".repeat(201);
            assert_eq!(title(&long), Err(ValidationError::TitleTooLong));
            let exactly = "x".repeat(200);
            assert_eq!(title(&exactly), Ok(()));
        }

        #[test]
        fn energy_bounds() {
            assert_eq!(energy(0), Err(ValidationError::EnergyOutOfRange));
            assert_eq!(energy(1), Ok(()));
            assert_eq!(energy(5), Ok(()));
            assert_eq!(energy(6), Err(ValidationError::EnergyOutOfRange));
        }

        #[test]
        fn budget_bounds() {
            assert_eq!(budget(0), Err(ValidationError::BudgetOutOfRange));
            assert_eq!(budget(1), Ok(()));
            assert_eq!(budget(10), Ok(()));
            assert_eq!(budget(11), Err(ValidationError::BudgetOutOfRange));
        }
    }
}
