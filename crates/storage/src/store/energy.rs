#![forbid(unsafe_code)]

use super::*;
use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use ql_core::validate;
use rusqlite::{OptionalExtension, params};
use serde_json::json;

pub const DEFAULT_BUDGET: i64 = 5;

impl SqliteStore {
    /// Reads never create state: a date without a stored record gets the
    /// default budget, and `spent` is always summed fresh from completions
    /// in the window.
    pub fn energy_get(
        &self,
        owner: &OwnerId,
        request: EnergyGetRequest,
    ) -> Result<EnergyBudgetRow, StoreError> {
        let stored: Option<i64> = self
            .conn
            .query_row(
                "SELECT budget FROM energy_budgets WHERE owner = ?1 AND date = ?2",
                params![owner.as_str(), request.date],
                |row| row.get(0),
            )
            .optional()?;

        let spent: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(energy), 0) FROM quests \
             WHERE owner = ?1 AND status = ?2 AND deleted_at_ms IS NULL \
               AND completed_at_ms >= ?3 AND completed_at_ms < ?4",
            params![
                owner.as_str(),
                QuestStatus::Completed.as_str(),
                request.window.start_ms,
                request.window.end_ms
            ],
            |row| row.get(0),
        )?;

        Ok(EnergyBudgetRow {
            date: request.date,
            budget: stored.unwrap_or(DEFAULT_BUDGET),
            spent,
            stored: stored.is_some(),
        })
    }

    /// Upserts only the budget column. There is no spent column to clobber.
    pub fn energy_set(
        &mut self,
        owner: &OwnerId,
        request: EnergySetRequest,
    ) -> Result<StoredBudgetRow, StoreError> {
        validate::budget(request.budget)?;
        ql_core::schedule::CivilDate::parse(&request.date)
            .map_err(|_| StoreError::InvalidInput("date must be YYYY-MM-DD"))?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO energy_budgets(owner, date, budget, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(owner, date) DO UPDATE
              SET budget = excluded.budget, updated_at_ms = excluded.updated_at_ms
            "#,
            params![owner.as_str(), request.date, request.budget, now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            None,
            "energy.budget_set",
            &json!({ "date": request.date, "budget": request.budget }),
        )?;

        tx.commit()?;

        Ok(StoredBudgetRow {
            date: request.date,
            budget: request.budget,
        })
    }

    pub fn energy_list(&self, owner: &OwnerId) -> Result<Vec<StoredBudgetRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, budget FROM energy_budgets WHERE owner = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![owner.as_str()], |row| {
            Ok(StoredBudgetRow {
                date: row.get(0)?,
                budget: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
