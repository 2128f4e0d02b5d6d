#![forbid(unsafe_code)]

mod checkpoints;
mod energy;
mod epics;
mod error;
mod inbox;
mod input;
mod quests;
mod routines;
mod timefmt;
mod today;
mod views;

pub use error::ApiError;
pub use input::RoutineDraft;
pub use timefmt::{now_ms_i64, ts_ms_to_rfc3339};
pub use views::*;

// The request vocabulary of the storage layer is the request vocabulary of
// the surface; transports build these directly.
pub use ql_core::model::TriageTarget;
pub use ql_storage::{
    CaptureRequest, CheckpointAddRequest, CheckpointEditRequest, CheckpointReorderRequest,
    EpicCreateRequest, EpicEditRequest, QuestCreateRequest, QuestEditRequest, RoutineEditRequest,
};

use ql_core::ids::OwnerId;
use ql_core::schedule::CivilDate;
use ql_storage::{DayWindow, SqliteStore};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, Default)]
pub struct ApiConfig {
    /// Fixed UTC offset of the owner's calendar, in minutes. Day windows for
    /// energy accounting and the Today view are computed in this frame.
    pub utc_offset_minutes: i32,
}

/// The cohesive, transport-agnostic surface over the guidance core. One
/// instance per store; callers share it freely across threads.
pub struct Api {
    store: Mutex<SqliteStore>,
    config: ApiConfig,
}

impl Api {
    pub fn open(storage_dir: impl AsRef<Path>, config: ApiConfig) -> Result<Self, ApiError> {
        let store = SqliteStore::open(storage_dir)?;
        Ok(Self {
            store: Mutex::new(store),
            config,
        })
    }

    pub fn config(&self) -> ApiConfig {
        self.config
    }

    fn store(&self) -> Result<MutexGuard<'_, SqliteStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Storage("store mutex poisoned".to_string()))
    }

    fn utc_offset_min(&self) -> i64 {
        i64::from(self.config.utc_offset_minutes)
    }

    fn owner(&self, owner: &str) -> Result<OwnerId, ApiError> {
        OwnerId::try_new(owner).map_err(|_| ApiError::Validation("invalid owner id".to_string()))
    }

    fn day_window(&self, date: &str) -> Result<DayWindow, ApiError> {
        let date = CivilDate::parse(date)
            .map_err(|_| ApiError::Validation("date must be YYYY-MM-DD".to_string()))?;
        let (start_ms, end_ms) = date.day_window_ms(self.utc_offset_min());
        Ok(DayWindow { start_ms, end_ms })
    }

    pub fn list_events(
        &self,
        owner: &str,
        since_seq: i64,
        limit: usize,
    ) -> Result<Vec<EventView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.list_events(&owner, since_seq, limit)?;
        Ok(rows.into_iter().map(views::event_view).collect())
    }
}
