#![forbid(unsafe_code)]

use crate::views::checkpoint_view;
use crate::{
    Api, ApiError, CheckpointAddRequest, CheckpointEditRequest, CheckpointReorderRequest,
    CheckpointView,
};

impl Api {
    pub fn list_checkpoints(
        &self,
        owner: &str,
        quest_id: &str,
    ) -> Result<Vec<CheckpointView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.list_checkpoints(&owner, quest_id)?;
        Ok(rows.into_iter().map(checkpoint_view).collect())
    }

    pub fn add_checkpoint(
        &self,
        owner: &str,
        request: CheckpointAddRequest,
    ) -> Result<CheckpointView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.add_checkpoint(&owner, request)?;
        Ok(checkpoint_view(row))
    }

    pub fn update_checkpoint(
        &self,
        owner: &str,
        request: CheckpointEditRequest,
    ) -> Result<CheckpointView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.edit_checkpoint(&owner, request)?;
        Ok(checkpoint_view(row))
    }

    pub fn delete_checkpoint(&self, owner: &str, id: &str) -> Result<(), ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        store.delete_checkpoint(&owner, id)?;
        Ok(())
    }

    pub fn reorder_checkpoints(
        &self,
        owner: &str,
        request: CheckpointReorderRequest,
    ) -> Result<Vec<CheckpointView>, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let rows = store.reorder_checkpoints(&owner, request)?;
        Ok(rows.into_iter().map(checkpoint_view).collect())
    }
}
