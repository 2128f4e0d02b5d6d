#![forbid(unsafe_code)]

use super::quests::quest_by_id;
use super::*;
use ql_core::ids::OwnerId;
use ql_core::validate;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::json;
use std::collections::BTreeSet;

const CHECKPOINT_COLUMNS: &str = "id, quest_id, title, completed, ordinal, completed_at_ms";

fn checkpoint_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckpointRow> {
    Ok(CheckpointRow {
        id: row.get(0)?,
        quest_id: row.get(1)?,
        title: row.get(2)?,
        completed: row.get::<_, i64>(3)? != 0,
        ordinal: row.get(4)?,
        completed_at_ms: row.get(5)?,
    })
}

fn checkpoint_by_id(
    conn: &Connection,
    owner: &OwnerId,
    id: &str,
) -> Result<Option<CheckpointRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {CHECKPOINT_COLUMNS} FROM checkpoints WHERE owner = ?1 AND id = ?2"),
            params![owner.as_str(), id],
            checkpoint_from_row,
        )
        .optional()?)
}

impl SqliteStore {
    pub fn list_checkpoints(
        &self,
        owner: &OwnerId,
        quest_id: &str,
    ) -> Result<Vec<CheckpointRow>, StoreError> {
        if quest_by_id(&self.conn, owner, quest_id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHECKPOINT_COLUMNS} FROM checkpoints \
             WHERE owner = ?1 AND quest_id = ?2 \
             ORDER BY ordinal ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![owner.as_str(), quest_id], checkpoint_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_checkpoint(
        &mut self,
        owner: &OwnerId,
        request: CheckpointAddRequest,
    ) -> Result<CheckpointRow, StoreError> {
        validate::title(&request.title)?;
        if let Some(ordinal) = request.ordinal {
            validate::ordinal(ordinal)?;
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if quest_by_id(&tx, owner, &request.quest_id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        let ordinal = match request.ordinal {
            Some(ordinal) => ordinal,
            None => tx.query_row(
                "SELECT COALESCE(MAX(ordinal) + 1, 0) FROM checkpoints \
                 WHERE owner = ?1 AND quest_id = ?2",
                params![owner.as_str(), request.quest_id],
                |row| row.get(0),
            )?,
        };

        let id = new_id();
        tx.execute(
            r#"
            INSERT INTO checkpoints(owner, id, quest_id, title, completed, ordinal)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
            params![owner.as_str(), id, request.quest_id, request.title, ordinal],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(request.quest_id.as_str()),
            "checkpoint.added",
            &json!({ "id": id, "quest_id": request.quest_id, "ordinal": ordinal }),
        )?;

        tx.commit()?;

        Ok(CheckpointRow {
            id,
            quest_id: request.quest_id,
            title: request.title,
            completed: false,
            ordinal,
            completed_at_ms: None,
        })
    }

    pub fn edit_checkpoint(
        &mut self,
        owner: &OwnerId,
        request: CheckpointEditRequest,
    ) -> Result<CheckpointRow, StoreError> {
        let CheckpointEditRequest {
            id,
            title,
            completed,
            ordinal,
        } = request;

        if title.is_none() && completed.is_none() && ordinal.is_none() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        if let Some(title) = title.as_deref() {
            validate::title(title)?;
        }
        if let Some(ordinal) = ordinal {
            validate::ordinal(ordinal)?;
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut checkpoint) = checkpoint_by_id(&tx, owner, &id)? else {
            return Err(StoreError::UnknownId);
        };
        if quest_by_id(&tx, owner, &checkpoint.quest_id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        checkpoint.title = title.unwrap_or(checkpoint.title);
        checkpoint.ordinal = ordinal.unwrap_or(checkpoint.ordinal);
        if let Some(completed) = completed {
            checkpoint.completed = completed;
            checkpoint.completed_at_ms = if completed { Some(now_ms) } else { None };
        }

        tx.execute(
            r#"
            UPDATE checkpoints
            SET title = ?3, completed = ?4, ordinal = ?5, completed_at_ms = ?6
            WHERE owner = ?1 AND id = ?2
            "#,
            params![
                owner.as_str(),
                id,
                checkpoint.title,
                if checkpoint.completed { 1i64 } else { 0i64 },
                checkpoint.ordinal,
                checkpoint.completed_at_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(checkpoint.quest_id.as_str()),
            "checkpoint.updated",
            &json!({ "id": id, "quest_id": checkpoint.quest_id }),
        )?;

        tx.commit()?;
        Ok(checkpoint)
    }

    pub fn delete_checkpoint(&mut self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(checkpoint) = checkpoint_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };
        if quest_by_id(&tx, owner, &checkpoint.quest_id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        tx.execute(
            "DELETE FROM checkpoints WHERE owner = ?1 AND id = ?2",
            params![owner.as_str(), id],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(checkpoint.quest_id.as_str()),
            "checkpoint.deleted",
            &json!({ "id": id, "quest_id": checkpoint.quest_id }),
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Rewrites every checkpoint's ordinal to its positional index in
    /// `ordered_ids`. The list must cover the quest's checkpoints exactly:
    /// a partial list would silently leave stale ordinals behind, so it is
    /// rejected instead.
    pub fn reorder_checkpoints(
        &mut self,
        owner: &OwnerId,
        request: CheckpointReorderRequest,
    ) -> Result<Vec<CheckpointRow>, StoreError> {
        let CheckpointReorderRequest {
            quest_id,
            ordered_ids,
        } = request;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if quest_by_id(&tx, owner, &quest_id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        let existing: BTreeSet<String> = {
            let mut stmt = tx.prepare(
                "SELECT id FROM checkpoints WHERE owner = ?1 AND quest_id = ?2",
            )?;
            let rows = stmt.query_map(params![owner.as_str(), quest_id], |row| {
                row.get::<_, String>(0)
            })?;
            rows.collect::<Result<BTreeSet<_>, _>>()?
        };

        let mut seen = BTreeSet::new();
        for id in &ordered_ids {
            if !existing.contains(id) {
                return Err(StoreError::InvalidInput(
                    "reorder list references a checkpoint not on this quest",
                ));
            }
            if !seen.insert(id.clone()) {
                return Err(StoreError::InvalidInput(
                    "reorder list repeats a checkpoint id",
                ));
            }
        }
        if seen.len() != existing.len() {
            return Err(StoreError::InvalidInput(
                "reorder list must include every checkpoint of the quest",
            ));
        }

        for (position, id) in ordered_ids.iter().enumerate() {
            tx.execute(
                "UPDATE checkpoints SET ordinal = ?3 WHERE owner = ?1 AND id = ?2",
                params![owner.as_str(), id, position as i64],
            )?;
        }

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(quest_id.as_str()),
            "checkpoint.reordered",
            &json!({ "quest_id": quest_id, "count": ordered_ids.len() }),
        )?;

        tx.commit()?;

        self.list_checkpoints(owner, &quest_id)
    }
}
