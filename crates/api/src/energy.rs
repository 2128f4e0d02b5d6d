#![forbid(unsafe_code)]

use crate::views::energy_view;
use crate::{Api, ApiError, EnergyBudgetView};
use ql_storage::{EnergyGetRequest, EnergySetRequest};

impl Api {
    pub fn get_energy_budget(
        &self,
        owner: &str,
        date: &str,
    ) -> Result<EnergyBudgetView, ApiError> {
        let window = self.day_window(date)?;
        let owner = self.owner(owner)?;
        let store = self.store()?;
        let row = store.energy_get(
            &owner,
            EnergyGetRequest {
                date: date.to_string(),
                window,
            },
        )?;
        Ok(energy_view(row))
    }

    pub fn set_energy_budget(
        &self,
        owner: &str,
        date: &str,
        budget: i64,
    ) -> Result<EnergyBudgetView, ApiError> {
        let window = self.day_window(date)?;
        let owner = self.owner(owner)?;
        let mut store = self.store()?;
        store.energy_set(
            &owner,
            EnergySetRequest {
                date: date.to_string(),
                budget,
            },
        )?;
        let row = store.energy_get(
            &owner,
            EnergyGetRequest {
                date: date.to_string(),
                window,
            },
        )?;
        Ok(energy_view(row))
    }
}
