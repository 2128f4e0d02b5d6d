#![forbid(unsafe_code)]

use crate::views::{energy_view, quest_view};
use crate::{Api, ApiError, TodayView};
use ql_core::model::QuestStatus;
use ql_storage::EnergyGetRequest;

impl Api {
    /// Composes the day's dashboard purely from reads: budget, the active
    /// quest, startable backlog, routine instances due today, and the day's
    /// completions.
    pub fn today(&self, owner: &str, date: &str) -> Result<TodayView, ApiError> {
        let window = self.day_window(date)?;
        let owner = self.owner(owner)?;
        let store = self.store()?;

        let budget = store.energy_get(
            &owner,
            EnergyGetRequest {
                date: date.to_string(),
                window,
            },
        )?;
        let active_quest = store.active_quest(&owner)?;
        let backlog = store.quests_by_status(&owner, QuestStatus::Backlog)?;
        let routine_spawned = store.quests_spawned_in(&owner, window)?;
        let completed = store.quests_completed_in(&owner, window)?;

        Ok(TodayView {
            date: date.to_string(),
            budget: energy_view(budget),
            active_quest: active_quest.map(|r| quest_view(&owner, r)),
            backlog: backlog.into_iter().map(|r| quest_view(&owner, r)).collect(),
            routine_spawned: routine_spawned
                .into_iter()
                .map(|r| quest_view(&owner, r))
                .collect(),
            completed: completed
                .into_iter()
                .map(|r| quest_view(&owner, r))
                .collect(),
        })
    }
}
