#![forbid(unsafe_code)]

#[derive(Clone, Debug)]
pub struct EpicRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub initiative_ref: Option<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub completed_at_ms: Option<i64>,
    pub deleted_at_ms: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct EpicCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub initiative_ref: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct EpicEditRequest {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub initiative_ref: Option<Option<String>>,
}
