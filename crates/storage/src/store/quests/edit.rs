#![forbid(unsafe_code)]

use super::super::*;
use super::{WIP_LIMIT, active_quest_count, parse_status, quest_by_id};
use crate::store::epics::epic_exists;
use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use ql_core::validate;
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use serde_json::json;

impl SqliteStore {
    pub fn edit_quest(
        &mut self,
        owner: &OwnerId,
        request: QuestEditRequest,
    ) -> Result<QuestRow, StoreError> {
        let QuestEditRequest {
            id,
            title,
            description,
            energy,
            epic_id,
        } = request;

        if title.is_none() && description.is_none() && energy.is_none() && epic_id.is_none() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        if let Some(title) = title.as_deref() {
            validate::title(title)?;
        }
        if let Some(energy) = energy {
            validate::energy(energy)?;
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut quest) = quest_by_id(&tx, owner, &id)? else {
            return Err(StoreError::UnknownId);
        };

        if let Some(Some(epic_id)) = epic_id.as_ref()
            && !epic_exists(&tx, owner, epic_id)?
        {
            return Err(StoreError::UnknownId);
        }

        quest.title = title.unwrap_or(quest.title);
        quest.description = description.unwrap_or(quest.description);
        quest.energy = energy.unwrap_or(quest.energy);
        quest.epic_id = epic_id.unwrap_or(quest.epic_id);
        quest.updated_at_ms = now_ms;

        tx.execute(
            r#"
            UPDATE quests
            SET title = ?3, description = ?4, energy = ?5, epic_id = ?6, updated_at_ms = ?7
            WHERE owner = ?1 AND id = ?2
            "#,
            params![
                owner.as_str(),
                id,
                quest.title,
                quest.description,
                quest.energy,
                quest.epic_id,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id.as_str()),
            "quest.updated",
            &json!({ "id": id }),
        )?;

        tx.commit()?;
        Ok(quest)
    }

    pub fn soft_delete_quest(&mut self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if quest_by_id(&tx, owner, id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        tx.execute(
            r#"
            UPDATE quests
            SET deleted_at_ms = ?3, updated_at_ms = ?3
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "quest.deleted",
            &json!({ "id": id }),
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Clears the soft-delete stamp. Restoring a quest that was deleted
    /// while `Active` re-enters the WIP check: if the slot has been taken
    /// since, the restore fails rather than silently produce two active
    /// quests.
    pub fn restore_quest(&mut self, owner: &OwnerId, id: &str) -> Result<QuestRow, StoreError> {
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(live) = quest_by_id(&tx, owner, id)? {
            // Already live; restore is a retryable no-op.
            tx.commit()?;
            return Ok(live);
        }

        let row = tx
            .query_row(
                &format!(
                    "SELECT {} FROM quests \
                     WHERE owner = ?1 AND id = ?2 AND deleted_at_ms IS NOT NULL",
                    super::QUEST_COLUMNS
                ),
                params![owner.as_str(), id],
                super::quest_from_row,
            )
            .optional()?;
        let Some(mut quest) = row else {
            return Err(StoreError::UnknownId);
        };

        if parse_status(&quest.status)? == QuestStatus::Active {
            let current = active_quest_count(&tx, owner, Some(id))?;
            if current >= WIP_LIMIT {
                return Err(StoreError::WipLimitExceeded {
                    current,
                    limit: WIP_LIMIT,
                });
            }
        }

        tx.execute(
            r#"
            UPDATE quests
            SET deleted_at_ms = NULL, updated_at_ms = ?3
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "quest.restored",
            &json!({ "id": id }),
        )?;

        tx.commit()?;

        quest.deleted_at_ms = None;
        quest.updated_at_ms = now_ms;
        Ok(quest)
    }
}
