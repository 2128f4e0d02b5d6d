#![forbid(unsafe_code)]

use super::super::*;
use super::{QUEST_COLUMNS, quest_by_id, quest_from_row};
use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use rusqlite::params;

impl SqliteStore {
    pub fn get_quest(&self, owner: &OwnerId, id: &str) -> Result<Option<QuestRow>, StoreError> {
        quest_by_id(&self.conn, owner, id)
    }

    pub fn list_quests(
        &self,
        owner: &OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<QuestRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests \
             WHERE owner = ?1 AND deleted_at_ms IS NULL \
             ORDER BY created_at_ms ASC, id ASC \
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(
            params![owner.as_str(), limit as i64, offset as i64],
            quest_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn quests_by_status(
        &self,
        owner: &OwnerId,
        status: QuestStatus,
    ) -> Result<Vec<QuestRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests \
             WHERE owner = ?1 AND status = ?2 AND deleted_at_ms IS NULL \
             ORDER BY created_at_ms ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![owner.as_str(), status.as_str()], quest_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn active_quest(&self, owner: &OwnerId) -> Result<Option<QuestRow>, StoreError> {
        let mut active = self.quests_by_status(owner, QuestStatus::Active)?;
        Ok(active.drain(..).next())
    }

    /// Quests relevant to one calendar day: currently active, created within
    /// the window, or completed within the window.
    pub fn today_quests(
        &self,
        owner: &OwnerId,
        window: DayWindow,
    ) -> Result<Vec<QuestRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests \
             WHERE owner = ?1 AND deleted_at_ms IS NULL \
               AND (status = ?2 \
                    OR (created_at_ms >= ?3 AND created_at_ms < ?4) \
                    OR (completed_at_ms IS NOT NULL \
                        AND completed_at_ms >= ?3 AND completed_at_ms < ?4)) \
             ORDER BY created_at_ms ASC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![
                owner.as_str(),
                QuestStatus::Active.as_str(),
                window.start_ms,
                window.end_ms
            ],
            quest_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn quests_completed_in(
        &self,
        owner: &OwnerId,
        window: DayWindow,
    ) -> Result<Vec<QuestRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests \
             WHERE owner = ?1 AND status = ?2 AND deleted_at_ms IS NULL \
               AND completed_at_ms >= ?3 AND completed_at_ms < ?4 \
             ORDER BY completed_at_ms ASC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![
                owner.as_str(),
                QuestStatus::Completed.as_str(),
                window.start_ms,
                window.end_ms
            ],
            quest_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Routine-spawned quests whose occurrence falls within the window.
    pub fn quests_spawned_in(
        &self,
        owner: &OwnerId,
        window: DayWindow,
    ) -> Result<Vec<QuestRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests \
             WHERE owner = ?1 AND routine_id IS NOT NULL AND deleted_at_ms IS NULL \
               AND routine_occurrence_ms >= ?2 AND routine_occurrence_ms < ?3 \
             ORDER BY routine_occurrence_ms ASC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![owner.as_str(), window.start_ms, window.end_ms],
            quest_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
