#![forbid(unsafe_code)]

/// Routine creation input; the first due instant is derived from the
/// schedule at creation time rather than supplied by the caller.
#[derive(Clone, Debug)]
pub struct RoutineDraft {
    pub name: String,
    pub description: Option<String>,
    /// Canonical recurrence encoding, e.g. `daily` or `weekly:mon`.
    pub schedule: String,
    /// Minutes after local midnight; defaults to midnight.
    pub time_of_day_min: Option<i64>,
    pub energy: i64,
    pub initiative_ref: Option<String>,
}
