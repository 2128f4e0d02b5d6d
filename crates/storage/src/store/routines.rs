#![forbid(unsafe_code)]

use super::quests::{QUEST_COLUMNS, quest_from_row};
use super::*;
use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use ql_core::schedule::Recurrence;
use ql_core::validate;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::json;

const ROUTINE_COLUMNS: &str = "id, name, description, schedule, time_of_day_min, energy, \
     initiative_ref, active, next_due_ms, created_at_ms, updated_at_ms, deleted_at_ms";

fn routine_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoutineRow> {
    Ok(RoutineRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        schedule: row.get(3)?,
        time_of_day_min: row.get(4)?,
        energy: row.get(5)?,
        initiative_ref: row.get(6)?,
        active: row.get::<_, i64>(7)? != 0,
        next_due_ms: row.get(8)?,
        created_at_ms: row.get(9)?,
        updated_at_ms: row.get(10)?,
        deleted_at_ms: row.get(11)?,
    })
}

fn routine_by_id(
    conn: &Connection,
    owner: &OwnerId,
    id: &str,
) -> Result<Option<RoutineRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {ROUTINE_COLUMNS} FROM routines \
                 WHERE owner = ?1 AND id = ?2 AND deleted_at_ms IS NULL"
            ),
            params![owner.as_str(), id],
            routine_from_row,
        )
        .optional()?)
}

fn validate_schedule(raw: &str) -> Result<(), StoreError> {
    Recurrence::parse(raw).map_err(|_| StoreError::InvalidInput("unrecognized schedule"))?;
    Ok(())
}

impl SqliteStore {
    pub fn create_routine(
        &mut self,
        owner: &OwnerId,
        request: RoutineCreateRequest,
    ) -> Result<RoutineRow, StoreError> {
        validate::title(&request.name)?;
        validate::energy(request.energy)?;
        validate_schedule(&request.schedule)?;
        if let Some(tod) = request.time_of_day_min {
            validate::time_of_day(tod)?;
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let id = new_id();
        tx.execute(
            r#"
            INSERT INTO routines(owner, id, name, description, schedule, time_of_day_min,
                                 energy, initiative_ref, active, next_due_ms,
                                 created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?10, ?10)
            "#,
            params![
                owner.as_str(),
                id,
                request.name,
                request.description,
                request.schedule,
                request.time_of_day_min,
                request.energy,
                request.initiative_ref,
                request.next_due_ms,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id.as_str()),
            "routine.created",
            &json!({ "id": id, "next_due_ms": request.next_due_ms }),
        )?;

        tx.commit()?;

        Ok(RoutineRow {
            id,
            name: request.name,
            description: request.description,
            schedule: request.schedule,
            time_of_day_min: request.time_of_day_min,
            energy: request.energy,
            initiative_ref: request.initiative_ref,
            active: true,
            next_due_ms: request.next_due_ms,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            deleted_at_ms: None,
        })
    }

    pub fn get_routine(&self, owner: &OwnerId, id: &str) -> Result<Option<RoutineRow>, StoreError> {
        routine_by_id(&self.conn, owner, id)
    }

    pub fn list_routines(
        &self,
        owner: &OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RoutineRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ROUTINE_COLUMNS} FROM routines \
             WHERE owner = ?1 AND deleted_at_ms IS NULL \
             ORDER BY created_at_ms ASC, id ASC \
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(
            params![owner.as_str(), limit as i64, offset as i64],
            routine_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn edit_routine(
        &mut self,
        owner: &OwnerId,
        request: RoutineEditRequest,
    ) -> Result<RoutineRow, StoreError> {
        let RoutineEditRequest {
            id,
            name,
            description,
            schedule,
            time_of_day_min,
            energy,
            initiative_ref,
        } = request;

        if name.is_none()
            && description.is_none()
            && schedule.is_none()
            && time_of_day_min.is_none()
            && energy.is_none()
            && initiative_ref.is_none()
        {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        if let Some(name) = name.as_deref() {
            validate::title(name)?;
        }
        if let Some(schedule) = schedule.as_deref() {
            validate_schedule(schedule)?;
        }
        if let Some(Some(tod)) = time_of_day_min {
            validate::time_of_day(tod)?;
        }
        if let Some(energy) = energy {
            validate::energy(energy)?;
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut routine) = routine_by_id(&tx, owner, &id)? else {
            return Err(StoreError::UnknownId);
        };

        routine.name = name.unwrap_or(routine.name);
        routine.description = description.unwrap_or(routine.description);
        routine.schedule = schedule.unwrap_or(routine.schedule);
        routine.time_of_day_min = time_of_day_min.unwrap_or(routine.time_of_day_min);
        routine.energy = energy.unwrap_or(routine.energy);
        routine.initiative_ref = initiative_ref.unwrap_or(routine.initiative_ref);
        routine.updated_at_ms = now_ms;

        tx.execute(
            r#"
            UPDATE routines
            SET name = ?3, description = ?4, schedule = ?5, time_of_day_min = ?6,
                energy = ?7, initiative_ref = ?8, updated_at_ms = ?9
            WHERE owner = ?1 AND id = ?2
            "#,
            params![
                owner.as_str(),
                id,
                routine.name,
                routine.description,
                routine.schedule,
                routine.time_of_day_min,
                routine.energy,
                routine.initiative_ref,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id.as_str()),
            "routine.updated",
            &json!({ "id": id }),
        )?;

        tx.commit()?;
        Ok(routine)
    }

    pub fn set_routine_active(
        &mut self,
        owner: &OwnerId,
        id: &str,
        active: bool,
    ) -> Result<RoutineRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut routine) = routine_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };

        tx.execute(
            r#"
            UPDATE routines
            SET active = ?3, updated_at_ms = ?4
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, if active { 1i64 } else { 0i64 }, now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "routine.active",
            &json!({ "id": id, "active": active }),
        )?;

        tx.commit()?;

        routine.active = active;
        routine.updated_at_ms = now_ms;
        Ok(routine)
    }

    pub fn update_next_due(
        &mut self,
        owner: &OwnerId,
        id: &str,
        next_due_ms: i64,
    ) -> Result<RoutineRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(mut routine) = routine_by_id(&tx, owner, id)? else {
            return Err(StoreError::UnknownId);
        };

        tx.execute(
            r#"
            UPDATE routines
            SET next_due_ms = ?3, updated_at_ms = ?4
            WHERE owner = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, next_due_ms, now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner,
            now_ms,
            Some(id),
            "routine.next_due",
            &json!({ "id": id, "next_due_ms": next_due_ms }),
        )?;

        tx.commit()?;

        routine.next_due_ms = next_due_ms;
        routine.updated_at_ms = now_ms;
        Ok(routine)
    }

    pub fn soft_delete_routine(&mut self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if routine_by_id(&tx, owner, id)?.is_none() {
            return Err(StoreError::UnknownId);
        }

        tx.execute(
            r#"
            UPDATE routines
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
            "routine.deleted",
            &json!({ "id": id }),
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Active, non-deleted routines due at or before the instant, soonest
    /// first. Stateless: recomputed from the store on every call so multiple
    /// scheduler instances cannot drift.
    pub fn due_routines(
        &self,
        owner: &OwnerId,
        before_ms: i64,
    ) -> Result<Vec<RoutineRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ROUTINE_COLUMNS} FROM routines \
             WHERE owner = ?1 AND active = 1 AND deleted_at_ms IS NULL \
               AND next_due_ms <= ?2 \
             ORDER BY next_due_ms ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![owner.as_str(), before_ms], routine_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Materializes one occurrence of a routine as a backlog quest.
    /// Idempotent per `(routine, occurrence)`: the unique spawn index turns
    /// a duplicate insert into a no-op and the already-spawned quest is
    /// returned, so a crashed driver can safely re-run.
    pub fn spawn_quest(
        &mut self,
        owner: &OwnerId,
        request: SpawnQuestRequest,
    ) -> Result<QuestRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let Some(routine) = routine_by_id(&tx, owner, &request.routine_id)? else {
            return Err(StoreError::UnknownId);
        };
        if !routine.active {
            return Err(StoreError::InvalidInput("routine is not active"));
        }

        let id = new_id();
        let inserted = tx.execute(
            r#"
            INSERT OR IGNORE INTO quests(owner, id, title, description, energy, status,
                                         routine_id, routine_occurrence_ms,
                                         created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                owner.as_str(),
                id,
                routine.name,
                routine.description,
                routine.energy,
                QuestStatus::Backlog.as_str(),
                routine.id,
                request.occurrence_ms,
                now_ms
            ],
        )?;

        if inserted > 0 {
            insert_event_tx(
                &tx,
                owner,
                now_ms,
                Some(id.as_str()),
                "routine.spawned",
                &json!({
                    "routine_id": routine.id,
                    "quest_id": id,
                    "occurrence_ms": request.occurrence_ms
                }),
            )?;
        }

        let spawned = tx
            .query_row(
                &format!(
                    "SELECT {QUEST_COLUMNS} FROM quests \
                     WHERE owner = ?1 AND routine_id = ?2 AND routine_occurrence_ms = ?3"
                ),
                params![owner.as_str(), routine.id, request.occurrence_ms],
                quest_from_row,
            )
            .optional()?;

        tx.commit()?;

        spawned.ok_or(StoreError::InvalidInput("spawned quest row missing"))
    }
}
