#![forbid(unsafe_code)]

use super::*;
use ql_core::ids::OwnerId;
use ql_core::model::EpicStatus;
use ql_core::validate;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::json;

const EPIC_COLUMNS: &str = "id, title, description, status, initiative_ref, \
     created_at_ms, updated_at_ms, completed_at_ms, deleted_at_ms";

fn epic_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EpicRow> {
    Ok(EpicRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        initiative_ref: row.get(4)?,
        created_at_ms: row.get(5)?,
        updated_at_ms: row.get(6)?,
        completed_at_ms: row.get(7)?,
        deleted_at_ms: row.get(8)?,
    })
}

fn epic_by_id(
    conn: &Connection,
    owner: &OwnerId,
    id: &str,
) -> Result<Option<EpicRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {EPIC_COLUMNS} FROM epics \
                 WHERE owner = ?1 AND id = ?2 AND deleted_at_ms IS NULL"
            ),
            params![owner.as_str(), id],
            epic_from_row,
        )
        .optional()?)
}

pub(crate) fn epic_exists(
    conn: &Connection,
    owner: &OwnerId,
    id: &str,
) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM epics WHERE owner = ?1 AND id = ?2 AND deleted_at_ms IS NULL",
            params![owner.as_str(), id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

impl SqliteStore {
    pub fn create_epic(
        &mut self,
        owner: &OwnerId,
        request: EpicCreateRequest,
    ) -> Result<EpicRow, StoreError> {
        validate::title(&request.title)?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let id = new_id();
        tx.execute(
            r#"
            INSERT INTO epics(owner, id, title, description, status, initiative_ref,
                              created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                owner.as_str(),
                id,
                request.title,
                request.description,
                EpicStatus::Active.as_str(),
                request.initiative_ref,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id.as_str()),
            "epic.created",
            &json!({ "id": id }),
        )?;

        tx.commit()?;

        Ok(EpicRow {
            id,
            title: request.title,
            description: request.description,
            status: EpicStatus::Active.as_str().to_string(),
            initiative_ref: request.initiative_ref,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            completed_at_ms: None,
            deleted_at_ms: None,
        })
    }

    pub fn get_epic(&self, owner: &OwnerId, id: &str) -> Result<Option<EpicRow>, StoreError> {
        epic_by_id(&self.conn, owner, id)
    }

    pub fn list_epics(
        &self,
        owner: &OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EpicRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EPIC_COLUMNS} FROM epics \
             WHERE owner = ?1 AND deleted_at_ms IS NULL \
             ORDER BY created_at_ms ASC, id ASC \
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(
            params![owner.as_str(), limit as i64, offset as i64],
            epic_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn edit_epic(
        &mut self,
        owner: &OwnerId,
        request: EpicEditRequest,
    ) -> Result<EpicRow, StoreError> {
        let EpicEditRequest {
            id,
            title,
            description,
            initiative_ref,
        } = request;

        if title.is_none() && description.is_none() && initiative_ref.is_none() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        if let Some(title) = title.as_deref() {
            validate::title(title)?;
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut epic) = epic_by_id(&tx, owner, &id)? else {
            return Err(StoreError::UnknownId);
        };

        epic.title = title.unwrap_or(epic.title);
        epic.description = description.unwrap_or(epic.description);
        epic.initiative_ref = initiative_ref.unwrap_or(epic.initiative_ref);
        epic.updated_at_ms = now_ms;

        tx.execute(
            r#"
            UPDATE epics
            SET title = ?3, description = ?4, initiative_ref = ?5, updated_at_ms = ?6
            WHERE owner = ?1 AND id = ?2
            "#,
            params![
                owner.as_str(),
                id,
                epic.title,
                epic.description,
                epic.initiative_ref,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id.as_str()),
            "epic.updated",
            &json!({ "id": id }),
        )?;

        tx.commit()?;
        Ok(epic)
    }

    pub fn set_epic_status(
        &mut self,
        owner: &OwnerId,
        id: &str,
        status: EpicStatus,
    ) -> Result<EpicRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut epic) = epic_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };

        epic.status = status.as_str().to_string();
        epic.completed_at_ms = match status {
            EpicStatus::Completed => Some(now_ms),
            EpicStatus::Active => None,
            EpicStatus::Archived => epic.completed_at_ms,
        };
        epic.updated_at_ms = now_ms;

        tx.execute(
            r#"
            UPDATE epics
            SET status = ?3, completed_at_ms = ?4, updated_at_ms = ?5
            WHERE owner = ?1 AND id = ?2
            "#,
            params![
                owner.as_str(),
                id,
                epic.status,
                epic.completed_at_ms,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "epic.status",
            &json!({ "id": id, "status": epic.status }),
        )?;

        tx.commit()?;
        Ok(epic)
    }

    /// Quests keep their `epic_id` after the epic is gone; they only lose
    /// the grouping, never the data.
    pub fn soft_delete_epic(&mut self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if epic_by_id(&tx, owner, id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        tx.execute(
            r#"
            UPDATE epics
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
            "epic.deleted",
            &json!({ "id": id }),
        )?;

        tx.commit()?;
        Ok(())
    }
}
