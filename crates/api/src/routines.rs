#![forbid(unsafe_code)]

use crate::input::RoutineDraft;
use crate::timefmt::now_ms_i64;
use crate::views::{quest_view, routine_view};
use crate::{Api, ApiError, QuestView, RoutineEditRequest, RoutineView};
use ql_core::schedule::Recurrence;
use ql_storage::{RoutineCreateRequest, SpawnQuestRequest};

impl Api {
    pub fn create_routine(&self, owner: &str, draft: RoutineDraft) -> Result<RoutineView, ApiError> {
        let recurrence = Recurrence::parse(&draft.schedule)
            .map_err(|_| ApiError::Validation("unrecognized schedule".to_string()))?;
        let time_of_day = draft.time_of_day_min.unwrap_or(0);
        let next_due_ms =
            recurrence.next_occurrence(now_ms_i64(), time_of_day, self.utc_offset_min());

        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.create_routine(
            &owner,
            RoutineCreateRequest {
                name: draft.name,
                description: draft.description,
                schedule: draft.schedule,
                time_of_day_min: draft.time_of_day_min,
                energy: draft.energy,
                initiative_ref: draft.initiative_ref,
                next_due_ms,
            },
        )?;
        Ok(routine_view(&owner, row))
    }

    pub fn get_routine(&self, owner: &str, id: &str) -> Result<RoutineView, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        match store.get_routine(&owner, id)? {
            Some(row) => Ok(routine_view(&owner, row)),
            None => Err(ApiError::NotFound),
        }
    }

    pub fn list_routines(
        &self,
        owner: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RoutineView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.list_routines(&owner, limit, offset)?;
        Ok(rows.into_iter().map(|r| routine_view(&owner, r)).collect())
    }

    pub fn update_routine(
        &self,
        owner: &str,
        request: RoutineEditRequest,
    ) -> Result<RoutineView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.edit_routine(&owner, request)?;
        Ok(routine_view(&owner, row))
    }

    pub fn set_routine_active(
        &self,
        owner: &str,
        id: &str,
        active: bool,
    ) -> Result<RoutineView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.set_routine_active(&owner, id, active)?;
        Ok(routine_view(&owner, row))
    }

    pub fn delete_routine(&self, owner: &str, id: &str) -> Result<(), ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        store.soft_delete_routine(&owner, id)?;
        Ok(())
    }

    pub fn update_next_due(
        &self,
        owner: &str,
        id: &str,
        next_due_ms: i64,
    ) -> Result<RoutineView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.update_next_due(&owner, id, next_due_ms)?;
        Ok(routine_view(&owner, row))
    }

    pub fn spawn_quest(
        &self,
        owner: &str,
        routine_id: &str,
        occurrence_ms: i64,
    ) -> Result<QuestView, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        let row = store.spawn_quest(
            &owner,
            SpawnQuestRequest {
                routine_id: routine_id.to_string(),
                occurrence_ms,
            },
        )?;
        Ok(quest_view(&owner, row))
    }

    pub fn due_routines(&self, owner: &str, before_ms: i64) -> Result<Vec<RoutineView>, ApiError> {
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let rows = store.due_routines(&owner, before_ms)?;
        Ok(rows.into_iter().map(|r| routine_view(&owner, r)).collect())
    }

    /// Scheduling driver: materialize every due routine and advance its next
    /// due instant. Safe to re-run after a crash at any point; the spawn is
    /// keyed by occurrence, so the retried pass converges on the same quests.
    pub fn run_due_routines(&self, owner: &str, now_ms: i64) -> Result<Vec<QuestView>, ApiError> {
        let owner = self.owner(owner)?;
        let mut store = self.store()?;

        let due = store.due_routines(&owner, now_ms)?;
        let mut spawned = Vec::with_capacity(due.len());
        for routine in due {
            let recurrence = Recurrence::parse(&routine.schedule)
                .map_err(|_| ApiError::Validation("unrecognized schedule".to_string()))?;

            let occurrence_ms = routine.next_due_ms;
            let quest = store.spawn_quest(
                &owner,
                SpawnQuestRequest {
                    routine_id: routine.id.clone(),
                    occurrence_ms,
                },
            )?;

            let next_due_ms = recurrence.next_occurrence(
                occurrence_ms,
                routine.time_of_day_min.unwrap_or(0),
                self.utc_offset_min(),
            );
            store.update_next_due(&owner, &routine.id, next_due_ms)?;

            spawned.push(quest_view(&owner, quest));
        }
        Ok(spawned)
    }
}
