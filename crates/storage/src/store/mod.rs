#![forbid(unsafe_code)]

mod checkpoints;
mod energy;
mod epics;
mod error;
mod events;
mod inbox;
mod quests;
mod routines;
mod types;

pub use energy::DEFAULT_BUDGET;
pub use error::StoreError;
pub use types::*;

use ql_core::ids::OwnerId;
use rusqlite::{Connection, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "questline.db";
const SCHEMA_VERSION: &str = "v1";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let store = Self { conn, storage_dir };
        store.migrate()?;
        Ok(store)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;

            CREATE TABLE IF NOT EXISTS meta (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS quests (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              title TEXT NOT NULL,
              description TEXT,
              energy INTEGER NOT NULL,
              status TEXT NOT NULL,
              epic_id TEXT,
              routine_id TEXT,
              routine_occurrence_ms INTEGER,
              created_at_ms INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              started_at_ms INTEGER,
              completed_at_ms INTEGER,
              deleted_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE INDEX IF NOT EXISTS idx_quests_owner_status
              ON quests(owner, status);
            CREATE INDEX IF NOT EXISTS idx_quests_owner_completed
              ON quests(owner, completed_at_ms);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_quests_spawn_occurrence
              ON quests(owner, routine_id, routine_occurrence_ms)
              WHERE routine_id IS NOT NULL;

            CREATE TABLE IF NOT EXISTS checkpoints (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              quest_id TEXT NOT NULL,
              title TEXT NOT NULL,
              completed INTEGER NOT NULL DEFAULT 0,
              ordinal INTEGER NOT NULL,
              completed_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE INDEX IF NOT EXISTS idx_checkpoints_owner_quest
              ON checkpoints(owner, quest_id, ordinal);

            CREATE TABLE IF NOT EXISTS epics (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              title TEXT NOT NULL,
              description TEXT,
              status TEXT NOT NULL,
              initiative_ref TEXT,
              created_at_ms INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              completed_at_ms INTEGER,
              deleted_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE TABLE IF NOT EXISTS energy_budgets (
              owner TEXT NOT NULL,
              date TEXT NOT NULL,
              budget INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              PRIMARY KEY (owner, date)
            );

            CREATE TABLE IF NOT EXISTS routines (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              name TEXT NOT NULL,
              description TEXT,
              schedule TEXT NOT NULL,
              time_of_day_min INTEGER,
              energy INTEGER NOT NULL,
              initiative_ref TEXT,
              active INTEGER NOT NULL DEFAULT 1,
              next_due_ms INTEGER NOT NULL,
              created_at_ms INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              deleted_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE INDEX IF NOT EXISTS idx_routines_owner_due
              ON routines(owner, active, next_due_ms);

            CREATE TABLE IF NOT EXISTS inbox_items (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              content TEXT NOT NULL,
              source TEXT NOT NULL,
              attachments_json TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              deleted_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE TABLE IF NOT EXISTS notes (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              title TEXT NOT NULL,
              body TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              deleted_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE TABLE IF NOT EXISTS items (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              name TEXT NOT NULL,
              quantity INTEGER NOT NULL,
              created_at_ms INTEGER NOT NULL,
              deleted_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE TABLE IF NOT EXISTS source_documents (
              owner TEXT NOT NULL,
              id TEXT NOT NULL,
              title TEXT NOT NULL,
              url TEXT,
              body TEXT,
              created_at_ms INTEGER NOT NULL,
              deleted_at_ms INTEGER,
              PRIMARY KEY (owner, id)
            );

            CREATE TABLE IF NOT EXISTS events (
              seq INTEGER PRIMARY KEY AUTOINCREMENT,
              owner TEXT NOT NULL,
              ts_ms INTEGER NOT NULL,
              entity_id TEXT,
              type TEXT NOT NULL,
              payload_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_owner_seq
              ON events(owner, seq);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
            params!["schema_version", SCHEMA_VERSION],
        )?;
        Ok(())
    }
}

fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}

fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

fn insert_event_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    ts_ms: i64,
    entity_id: Option<&str>,
    event_type: &str,
    payload: &serde_json::Value,
) -> Result<EventRow, StoreError> {
    let payload_json = payload.to_string();
    tx.execute(
        r#"
        INSERT INTO events(owner, ts_ms, entity_id, type, payload_json)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![owner.as_str(), ts_ms, entity_id, event_type, payload_json],
    )?;
    Ok(EventRow {
        seq: tx.last_insert_rowid(),
        ts_ms,
        entity_id: entity_id.map(str::to_string),
        event_type: event_type.to_string(),
        payload_json,
    })
}
