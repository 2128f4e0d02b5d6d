#![forbid(unsafe_code)]

use super::DayWindow;

/// Budget for one calendar day. `spent` is derived at read time from
/// completed quests; it is never a column in the schema.
#[derive(Clone, Debug)]
pub struct EnergyBudgetRow {
    pub date: String,
    pub budget: i64,
    pub spent: i64,
    /// Whether a budget record is actually persisted for this date.
    pub stored: bool,
}

#[derive(Clone, Debug)]
pub struct StoredBudgetRow {
    pub date: String,
    pub budget: i64,
}

#[derive(Clone, Debug)]
pub struct EnergyGetRequest {
    pub date: String,
    pub window: DayWindow,
}

#[derive(Clone, Debug)]
pub struct EnergySetRequest {
    pub date: String,
    pub budget: i64,
}
