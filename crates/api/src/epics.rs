#![forbid(unsafe_code)]

use crate::views::epic_view;
use crate::{Api, ApiError, EpicCreateRequest, EpicEditRequest, EpicView};
use ql_core::model::EpicStatus;

impl Api {
    pub fn create_epic(
        &self,
        owner: &str,
        request: EpicCreateRequest,
    ) -> Result<EpicView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.create_epic(&owner, request)?;
        Ok(epic_view(&owner, row))
    }

    pub fn get_epic(&self, owner: &str, id: &str) -> Result<EpicView, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        match store.get_epic(&owner, id)? {
            Some(row) => Ok(epic_view(&owner, row)),
            None => Err(ApiError::NotFound),
        }
    }

    pub fn list_epics(
        &self,
        owner: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EpicView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.list_epics(&owner, limit, offset)?;
        Ok(rows.into_iter().map(|r| epic_view(&owner, r)).collect())
    }

    pub fn update_epic(&self, owner: &str, request: EpicEditRequest) -> Result<EpicView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.edit_epic(&owner, request)?;
        Ok(epic_view(&owner, row))
    }

    pub fn set_epic_status(
        &self,
        owner: &str,
        id: &str,
        status: &str,
    ) -> Result<EpicView, ApiError> {
        let status = EpicStatus::parse(status)
            .ok_or_else(|| ApiError::Validation("unrecognized epic status".to_string()))?;
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.set_epic_status(&owner, id, status)?;
        Ok(epic_view(&owner, row))
    }

    pub fn delete_epic(&self, owner: &str, id: &str) -> Result<(), ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        store.soft_delete_epic(&owner, id)?;
        Ok(())
    }
}
