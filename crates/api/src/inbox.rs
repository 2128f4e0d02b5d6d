#![forbid(unsafe_code)]

use crate::views::inbox_item_view;
use crate::{Api, ApiError, CaptureRequest, InboxItemView, TriageTarget, TriageView};
use ql_storage::TriageRequest;

impl Api {
    pub fn capture(&self, owner: &str, request: CaptureRequest) -> Result<InboxItemView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.capture_inbox_item(&owner, request)?;
        Ok(inbox_item_view(row))
    }

    pub fn get_inbox_item(&self, owner: &str, id: &str) -> Result<InboxItemView, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        match store.get_inbox_item(&owner, id)? {
            Some(row) => Ok(inbox_item_view(row)),
            None => Err(ApiError::NotFound),
        }
    }

    pub fn list_inbox(
        &self,
        owner: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InboxItemView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.list_inbox_items(&owner, limit, offset)?;
        Ok(rows.into_iter().map(inbox_item_view).collect())
    }

    /// Converts a captured item into exactly one typed entity; returns the
    /// new entity's id, never the inbox item's.
    pub fn triage(
        &self,
        owner: &str,
        inbox_item_id: &str,
        target: TriageTarget,
    ) -> Result<TriageView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let outcome = store.triage_inbox_item(
            &owner,
            TriageRequest {
                inbox_item_id: inbox_item_id.to_string(),
                target,
            },
        )?;
        Ok(TriageView {
            entity_id: outcome.entity_id,
            kind: outcome.kind.to_string(),
        })
    }
}
