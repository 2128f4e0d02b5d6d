#![forbid(unsafe_code)]

use super::super::*;
use super::{WIP_LIMIT, active_quest_count, parse_status, quest_by_id};
use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use rusqlite::{TransactionBehavior, params};
use serde_json::json;

impl SqliteStore {
    /// The only transition with a cross-record invariant: WIP=1. The
    /// IMMEDIATE transaction takes the write lock before the guarded read,
    /// so two racing starts serialize and the loser observes the winner's
    /// committed active quest.
    pub fn start_quest(&mut self, owner: &OwnerId, id: &str) -> Result<QuestRow, StoreError> {
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(mut quest) = quest_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };
        let status = parse_status(&quest.status)?;
        if status.is_terminal() {
            return Err(StoreError::InvalidInput("quest is already closed"));
        }
        if status == QuestStatus::Active {
            // Retried start of the quest that already holds the slot.
            return Ok(quest);
        }

        let current = active_quest_count(&tx, owner, Some(id))?;
        if current >= WIP_LIMIT {
            return Err(StoreError::WipLimitExceeded {
                current,
                limit: WIP_LIMIT,
            });
        }

        tx.execute(
            r#"
            UPDATE quests
            SET status = ?3, started_at_ms = ?4, updated_at_ms = ?4
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, QuestStatus::Active.as_str(), now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "quest.started",
            &json!({ "id": id }),
        )?;

        tx.commit()?;

        quest.status = QuestStatus::Active.as_str().to_string();
        quest.started_at_ms = Some(now_ms);
        quest.updated_at_ms = now_ms;
        Ok(quest)
    }

    /// Completion writes only the quest row; the day's spent figure is
    /// derived from completions at read time, so there is nothing else to
    /// roll back or double-count on retry.
    pub fn complete_quest(&mut self, owner: &OwnerId, id: &str) -> Result<QuestRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut quest) = quest_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };
        let status = parse_status(&quest.status)?;
        if status == QuestStatus::Completed {
            return Err(StoreError::InvalidInput("quest is already completed"));
        }
        if status.is_terminal() {
            return Err(StoreError::InvalidInput("quest is already closed"));
        }

        tx.execute(
            r#"
            UPDATE quests
            SET status = ?3, completed_at_ms = ?4, updated_at_ms = ?4
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, QuestStatus::Completed.as_str(), now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "quest.completed",
            &json!({ "id": id, "energy": quest.energy }),
        )?;

        tx.commit()?;

        quest.status = QuestStatus::Completed.as_str().to_string();
        quest.completed_at_ms = Some(now_ms);
        quest.updated_at_ms = now_ms;
        Ok(quest)
    }

    pub fn abandon_quest(&mut self, owner: &OwnerId, id: &str) -> Result<QuestRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut quest) = quest_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };
        if parse_status(&quest.status)?.is_terminal() {
            return Err(StoreError::InvalidInput("quest is already closed"));
        }

        tx.execute(
            r#"
            UPDATE quests
            SET status = ?3, updated_at_ms = ?4
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, QuestStatus::Abandoned.as_str(), now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "quest.abandoned",
            &json!({ "id": id }),
        )?;

        tx.commit()?;

        quest.status = QuestStatus::Abandoned.as_str().to_string();
        quest.updated_at_ms = now_ms;
        Ok(quest)
    }

    /// Returns the quest to the backlog and frees the WIP slot. The
    /// started-at stamp is cleared; a later start stamps it fresh.
    pub fn backlog_quest(&mut self, owner: &OwnerId, id: &str) -> Result<QuestRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut quest) = quest_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };
        if parse_status(&quest.status)?.is_terminal() {
            return Err(StoreError::InvalidInput("quest is already closed"));
        }

        tx.execute(
            r#"
            UPDATE quests
            SET status = ?3, started_at_ms = NULL, updated_at_ms = ?4
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, QuestStatus::Backlog.as_str(), now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "quest.backlog",
            &json!({ "id": id }),
        )?;

        tx.commit()?;

        quest.status = QuestStatus::Backlog.as_str().to_string();
        quest.started_at_ms = None;
        quest.updated_at_ms = now_ms;
        Ok(quest)
    }
}
