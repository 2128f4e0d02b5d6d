#![forbid(unsafe_code)]

use super::epics::epic_exists;
use super::*;
use ql_core::ids::OwnerId;
use ql_core::model::{QuestStatus, TriageTarget};
use ql_core::validate;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use serde_json::json;

const INBOX_COLUMNS: &str = "id, content, source, attachments_json, created_at_ms, deleted_at_ms";

fn inbox_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(InboxItemRow, String)> {
    let attachments_json: String = row.get(3)?;
    Ok((
        InboxItemRow {
            id: row.get(0)?,
            content: row.get(1)?,
            source: row.get(2)?,
            attachments: Vec::new(),
            created_at_ms: row.get(4)?,
            deleted_at_ms: row.get(5)?,
        },
        attachments_json,
    ))
}

fn decode_attachments(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw).map_err(|_| StoreError::InvalidInput("corrupt attachments payload"))
}

fn inbox_item_by_id(
    conn: &Connection,
    owner: &OwnerId,
    id: &str,
) -> Result<Option<InboxItemRow>, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {INBOX_COLUMNS} FROM inbox_items WHERE owner = ?1 AND id = ?2"),
            params![owner.as_str(), id],
            inbox_from_row,
        )
        .optional()?;
    match row {
        None => Ok(None),
        Some((mut item, attachments_json)) => {
            item.attachments = decode_attachments(&attachments_json)?;
            Ok(Some(item))
        }
    }
}

/// Creates the triage target inside the caller's transaction and returns its
/// id. Validation failures abort the whole triage, leaving the inbox item
/// untouched.
fn create_target_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    target: &TriageTarget,
    now_ms: i64,
) -> Result<String, StoreError> {
    let id = new_id();
    match target {
        TriageTarget::Quest {
            title,
            description,
            energy,
            epic_id,
        } => {
            validate::title(title)?;
            validate::energy(*energy)?;
            if let Some(epic_id) = epic_id.as_deref()
                && !epic_exists(tx, owner, epic_id)?
            {
                return Err(StoreError::UnknownId);
            }
            tx.execute(
                r#"
                INSERT INTO quests(owner, id, title, description, energy, status,
                                   epic_id, created_at_ms, updated_at_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                "#,
                params![
                    owner.as_str(),
                    id,
                    title,
                    description,
                    energy,
                    QuestStatus::Backlog.as_str(),
                    epic_id,
                    now_ms
                ],
            )?;
        }
        TriageTarget::Note { title, body } => {
            validate::title(title)?;
            validate::content(body)?;
            tx.execute(
                r#"
                INSERT INTO notes(owner, id, title, body, created_at_ms)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![owner.as_str(), id, title, body, now_ms],
            )?;
        }
        TriageTarget::Item { name, quantity } => {
            validate::title(name)?;
            validate::quantity(*quantity)?;
            tx.execute(
                r#"
                INSERT INTO items(owner, id, name, quantity, created_at_ms)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![owner.as_str(), id, name, quantity, now_ms],
            )?;
        }
        TriageTarget::SourceDocument { title, url, body } => {
            validate::title(title)?;
            tx.execute(
                r#"
                INSERT INTO source_documents(owner, id, title, url, body, created_at_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![owner.as_str(), id, title, url, body, now_ms],
            )?;
        }
    }
    Ok(id)
}

impl SqliteStore {
    pub fn capture_inbox_item(
        &mut self,
        owner: &OwnerId,
        request: CaptureRequest,
    ) -> Result<InboxItemRow, StoreError> {
        validate::content(&request.content)?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let id = new_id();
        let attachments_json = serde_json::Value::from(request.attachments.clone()).to_string();
        tx.execute(
            r#"
            INSERT INTO inbox_items(owner, id, content, source, attachments_json, created_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                owner.as_str(),
                id,
                request.content,
                request.source,
                attachments_json,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id.as_str()),
            "inbox.captured",
            &json!({ "id": id, "source": request.source }),
        )?;

        tx.commit()?;

        Ok(InboxItemRow {
            id,
            content: request.content,
            source: request.source,
            attachments: request.attachments,
            created_at_ms: now_ms,
            deleted_at_ms: None,
        })
    }

    pub fn get_inbox_item(
        &self,
        owner: &OwnerId,
        id: &str,
    ) -> Result<Option<InboxItemRow>, StoreError> {
        match inbox_item_by_id(&self.conn, owner, id)? {
            Some(item) if item.deleted_at_ms.is_none() => Ok(Some(item)),
            _ => Ok(None),
        }
    }

    /// Pending (untriaged) items, newest capture first.
    pub fn list_inbox_items(
        &self,
        owner: &OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InboxItemRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INBOX_COLUMNS} FROM inbox_items \
             WHERE owner = ?1 AND deleted_at_ms IS NULL \
             ORDER BY created_at_ms DESC, id DESC \
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(
            params![owner.as_str(), limit as i64, offset as i64],
            inbox_from_row,
        )?;

        let mut out = Vec::new();
        for row in rows {
            let (mut item, attachments_json) = row?;
            item.attachments = decode_attachments(&attachments_json)?;
            out.push(item);
        }
        Ok(out)
    }

    /// Converts a captured item into exactly one typed entity and retires
    /// the capture record, atomically: after commit either both the new
    /// entity and the soft-deleted inbox item are visible, or neither is.
    pub fn triage_inbox_item(
        &mut self,
        owner: &OwnerId,
        request: TriageRequest,
    ) -> Result<TriageOutcome, StoreError> {
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let item = inbox_item_by_id(&tx, owner, &request.inbox_item_id)?;
        let Some(item) = item else {
            return Err(StoreError::UnknownId);
        };
        if item.deleted_at_ms.is_some() {
            return Err(StoreError::UnknownId);
        }

        let entity_id = create_target_tx(&tx, owner, &request.target, now_ms)?;

        tx.execute(
            "UPDATE inbox_items SET deleted_at_ms = ?3 WHERE owner = ?1 AND id = ?2",
            params![owner.as_str(), item.id, now_ms],
        )?;

        let kind = request.target.kind();
        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(item.id.as_str()),
            "inbox.triaged",
            &json!({ "inbox_item_id": item.id, "kind": kind, "entity_id": entity_id }),
        )?;

        tx.commit()?;

        Ok(TriageOutcome { entity_id, kind })
    }
}
