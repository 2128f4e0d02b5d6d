#![forbid(unsafe_code)]

use super::*;
use ql_core::ids::OwnerId;
use rusqlite::params;

impl SqliteStore {
    pub fn list_events(
        &self,
        owner: &OwnerId,
        since_seq: i64,
        limit: usize,
    ) -> Result<Vec<EventRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT seq, ts_ms, entity_id, type, payload_json
            FROM events
            WHERE owner = ?1 AND seq > ?2
            ORDER BY seq ASC
            LIMIT ?3
            "#,
        )?;
        let rows = stmt.query_map(params![owner.as_str(), since_seq, limit as i64], |row| {
            Ok(EventRow {
                seq: row.get(0)?,
                ts_ms: row.get(1)?,
                entity_id: row.get(2)?,
                event_type: row.get(3)?,
                payload_json: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
