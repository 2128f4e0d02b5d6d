#![forbid(unsafe_code)]

mod create;
mod edit;
mod get;
mod status;

use super::{QuestRow, StoreError};
use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use rusqlite::{Connection, OptionalExtension, params};

pub(crate) const WIP_LIMIT: i64 = 1;

pub(crate) const QUEST_COLUMNS: &str = "id, title, description, energy, status, epic_id, \
     routine_id, routine_occurrence_ms, created_at_ms, updated_at_ms, \
     started_at_ms, completed_at_ms, deleted_at_ms";

pub(crate) fn quest_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestRow> {
    Ok(QuestRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        energy: row.get(3)?,
        status: row.get(4)?,
        epic_id: row.get(5)?,
        routine_id: row.get(6)?,
        routine_occurrence_ms: row.get(7)?,
        created_at_ms: row.get(8)?,
        updated_at_ms: row.get(9)?,
        started_at_ms: row.get(10)?,
        completed_at_ms: row.get(11)?,
        deleted_at_ms: row.get(12)?,
    })
}

/// Point read of a live (non-deleted) quest. `Transaction` derefs to
/// `Connection`, so this works inside and outside transactions.
pub(crate) fn quest_by_id(
    conn: &Connection,
    owner: &OwnerId,
    id: &str,
) -> Result<Option<QuestRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {QUEST_COLUMNS} FROM quests \
                 WHERE owner = ?1 AND id = ?2 AND deleted_at_ms IS NULL"
            ),
            params![owner.as_str(), id],
            quest_from_row,
        )
        .optional()?)
}

pub(crate) fn active_quest_count(
    conn: &Connection,
    owner: &OwnerId,
    excluding_id: Option<&str>,
) -> Result<i64, StoreError> {
    let count = match excluding_id {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM quests \
             WHERE owner = ?1 AND status = ?2 AND deleted_at_ms IS NULL AND id != ?3",
            params![owner.as_str(), QuestStatus::Active.as_str(), id],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM quests \
             WHERE owner = ?1 AND status = ?2 AND deleted_at_ms IS NULL",
            params![owner.as_str(), QuestStatus::Active.as_str()],
            |row| row.get(0),
        )?,
    };
    Ok(count)
}

pub(crate) fn parse_status(raw: &str) -> Result<QuestStatus, StoreError> {
    QuestStatus::parse(raw).ok_or(StoreError::InvalidInput("unrecognized quest status"))
}
