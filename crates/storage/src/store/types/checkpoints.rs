#![forbid(unsafe_code)]

#[derive(Clone, Debug)]
pub struct CheckpointRow {
    pub id: String,
    pub quest_id: String,
    pub title: String,
    pub completed: bool,
    pub ordinal: i64,
    pub completed_at_ms: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct CheckpointAddRequest {
    pub quest_id: String,
    pub title: String,
    /// Sparse values are fine (0, 10, 20, ...); defaults to max + 1.
    pub ordinal: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct CheckpointEditRequest {
    pub id: String,
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub ordinal: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct CheckpointReorderRequest {
    pub quest_id: String,
    /// Must list every checkpoint of the quest exactly once.
    pub ordered_ids: Vec<String>,
}
