#![forbid(unsafe_code)]

#[derive(Clone, Debug)]
pub struct RoutineRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub schedule: String,
    pub time_of_day_min: Option<i64>,
    pub energy: i64,
    pub initiative_ref: Option<String>,
    pub active: bool,
    pub next_due_ms: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub deleted_at_ms: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct RoutineCreateRequest {
    pub name: String,
    pub description: Option<String>,
    /// Canonical recurrence encoding, e.g. `daily` or `weekly:mon`.
    pub schedule: String,
    pub time_of_day_min: Option<i64>,
    pub energy: i64,
    pub initiative_ref: Option<String>,
    pub next_due_ms: i64,
}

#[derive(Clone, Debug, Default)]
pub struct RoutineEditRequest {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub schedule: Option<String>,
    pub time_of_day_min: Option<Option<i64>>,
    pub energy: Option<i64>,
    pub initiative_ref: Option<Option<String>>,
}

#[derive(Clone, Debug)]
pub struct SpawnQuestRequest {
    pub routine_id: String,
    /// The due instant this spawn materializes; the idempotency key together
    /// with the routine id.
    pub occurrence_ms: i64,
}
