#![forbid(unsafe_code)]

#[derive(Clone, Debug)]
pub struct QuestRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub energy: i64,
    pub status: String,
    pub epic_id: Option<String>,
    pub routine_id: Option<String>,
    pub routine_occurrence_ms: Option<i64>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub started_at_ms: Option<i64>,
    pub completed_at_ms: Option<i64>,
    pub deleted_at_ms: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct QuestCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub energy: i64,
    pub epic_id: Option<String>,
}

/// Outer `Option` = "leave unchanged"; inner `Option` = "clear the field".
#[derive(Clone, Debug, Default)]
pub struct QuestEditRequest {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub energy: Option<i64>,
    pub epic_id: Option<Option<String>>,
}

/// UTC instant range `[start_ms, end_ms)` covering one owner-local calendar
/// day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DayWindow {
    pub fn contains(self, ts_ms: i64) -> bool {
        ts_ms >= self.start_ms && ts_ms < self.end_ms
    }
}
