#![forbid(unsafe_code)]

use crate::views::quest_view;
use crate::{Api, ApiError, QuestCreateRequest, QuestEditRequest, QuestView};
use ql_core::model::QuestStatus;

impl Api {
    pub fn create_quest(
        &self,
        owner: &str,
        request: QuestCreateRequest,
    ) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.create_quest(&owner, request)?;
        Ok(quest_view(&owner, row))
    }

    pub fn update_quest(
        &self,
        owner: &str,
        request: QuestEditRequest,
    ) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.edit_quest(&owner, request)?;
        Ok(quest_view(&owner, row))
    }

    pub fn delete_quest(&self, owner: &str, id: &str) -> Result<(), ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        store.soft_delete_quest(&owner, id)?;
        Ok(())
    }

    pub fn restore_quest(&self, owner: &str, id: &str) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.restore_quest(&owner, id)?;
        Ok(quest_view(&owner, row))
    }

    pub fn get_quest(&self, owner: &str, id: &str) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        match store.get_quest(&owner, id)? {
            Some(row) => Ok(quest_view(&owner, row)),
            None => Err(ApiError::NotFound),
        }
    }

    pub fn list_quests(
        &self,
        owner: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<QuestView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.list_quests(&owner, limit, offset)?;
        Ok(rows.into_iter().map(|r| quest_view(&owner, r)).collect())
    }

    pub fn quests_by_status(&self, owner: &str, status: &str) -> Result<Vec<QuestView>, ApiError> {
        let status = QuestStatus::parse(status)
            .ok_or_else(|| ApiError::Validation("unrecognized quest status".to_string()))?;
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.quests_by_status(&owner, status)?;
        Ok(rows.into_iter().map(|r| quest_view(&owner, r)).collect())
    }

    pub fn active_quest(&self, owner: &str) -> Result<Option<QuestView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        Ok(store.active_quest(&owner)?.map(|r| quest_view(&owner, r)))
    }

    pub fn today_quests(&self, owner: &str, date: &str) -> Result<Vec<QuestView>, ApiError> {
        let window = self.day_window(date)?;
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.today_quests(&owner, window)?;
        Ok(rows.into_iter().map(|r| quest_view(&owner, r)).collect())
    }

    pub fn start_quest(&self, owner: &str, id: &str) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.start_quest(&owner, id)?;
        Ok(quest_view(&owner, row))
    }

    pub fn complete_quest(&self, owner: &str, id: &str) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.complete_quest(&owner, id)?;
        Ok(quest_view(&owner, row))
    }

    pub fn abandon_quest(&self, owner: &str, id: &str) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.abandon_quest(&owner, id)?;
        Ok(quest_view(&owner, row))
    }

    pub fn backlog_quest(&self, owner: &str, id: &str) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.backlog_quest(&owner, id)?;
        Ok(quest_view(&owner, row))
    }
}
