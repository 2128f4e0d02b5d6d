#![forbid(unsafe_code)]

use super::super::*;
use crate::store::epics::epic_exists;
use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use ql_core::validate;
use rusqlite::params;
use serde_json::json;

impl SqliteStore {
    pub fn create_quest(
        &mut self,
        owner: &OwnerId,
        request: QuestCreateRequest,
    ) -> Result<QuestRow, StoreError> {
        validate::title(&request.title)?;
        validate::energy(request.energy)?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if let Some(epic_id) = request.epic_id.as_deref()
            && !epic_exists(&tx, owner, epic_id)?
        {
            return Err(StoreError::UnknownId);
        }

        let id = new_id();
        tx.execute(
            r#"
            INSERT INTO quests(owner, id, title, description, energy, status,
                               epic_id, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                owner.as_str(),
                id,
                request.title,
                request.description,
                request.energy,
                QuestStatus::Backlog.as_str(),
                request.epic_id,
                now_ms,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id.as_str()),
            "quest.created",
            &json!({ "id": id, "status": QuestStatus::Backlog.as_str() }),
        )?;

        tx.commit()?;

        Ok(QuestRow {
            id,
            title: request.title,
            description: request.description,
            energy: request.energy,
            status: QuestStatus::Backlog.as_str().to_string(),
            epic_id: request.epic_id,
            routine_id: None,
            routine_occurrence_ms: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            started_at_ms: None,
            completed_at_ms: None,
            deleted_at_ms: None,
        })
    }
}
