#![forbid(unsafe_code)]

use ql_core::model::TriageTarget;

#[derive(Clone, Debug)]
pub struct InboxItemRow {
    pub id: String,
    pub content: String,
    pub source: String,
    pub attachments: Vec<String>,
    pub created_at_ms: i64,
    pub deleted_at_ms: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct CaptureRequest {
    pub content: String,
    pub source: String,
    pub attachments: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct TriageRequest {
    pub inbox_item_id: String,
    pub target: TriageTarget,
}

#[derive(Clone, Debug)]
pub struct TriageOutcome {
    /// Id of the newly created entity (not the inbox item).
    pub entity_id: String,
    pub kind: &'static str,
}
