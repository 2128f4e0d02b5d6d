#![forbid(unsafe_code)]

use crate::timefmt::ts_ms_to_rfc3339;
use ql_core::ids::OwnerId;
use ql_storage::{
    CheckpointRow, EnergyBudgetRow, EpicRow, EventRow, InboxItemRow, QuestRow, RoutineRow,
};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct QuestView {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub energy: i64,
    pub status: String,
    pub epic_id: Option<String>,
    pub routine_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckpointView {
    pub id: String,
    pub quest_id: String,
    pub title: String,
    pub completed: bool,
    pub order: i64,
    pub completed_at: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EpicView {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub initiative_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnergyBudgetView {
    pub date: String,
    pub budget: i64,
    pub spent: i64,
    pub remaining: i64,
    pub is_over_budget: bool,
    pub percent_used: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoutineView {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub schedule: String,
    pub time_of_day_min: Option<i64>,
    pub energy: i64,
    pub initiative_ref: Option<String>,
    pub active: bool,
    pub next_due: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct InboxItemView {
    pub id: String,
    pub content: String,
    pub source: String,
    pub attachments: Vec<String>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TriageView {
    pub entity_id: String,
    pub kind: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct EventView {
    pub event_id: String,
    pub ts: String,
    pub entity_id: Option<String>,
    pub event_type: String,
    pub payload_json: String,
}

/// Read-only aggregate for one calendar day.
#[derive(Clone, Debug, Serialize)]
pub struct TodayView {
    pub date: String,
    pub budget: EnergyBudgetView,
    pub active_quest: Option<QuestView>,
    pub backlog: Vec<QuestView>,
    pub routine_spawned: Vec<QuestView>,
    pub completed: Vec<QuestView>,
}

pub(crate) fn quest_view(owner: &OwnerId, row: QuestRow) -> QuestView {
    QuestView {
        id: row.id,
        owner: owner.as_str().to_string(),
        title: row.title,
        description: row.description,
        energy: row.energy,
        status: row.status,
        epic_id: row.epic_id,
        routine_id: row.routine_id,
        created_at: ts_ms_to_rfc3339(row.created_at_ms),
        updated_at: ts_ms_to_rfc3339(row.updated_at_ms),
        started_at: row.started_at_ms.map(ts_ms_to_rfc3339),
        completed_at: row.completed_at_ms.map(ts_ms_to_rfc3339),
    }
}

pub(crate) fn checkpoint_view(row: CheckpointRow) -> CheckpointView {
    CheckpointView {
        id: row.id,
        quest_id: row.quest_id,
        title: row.title,
        completed: row.completed,
        order: row.ordinal,
        completed_at: row.completed_at_ms.map(ts_ms_to_rfc3339),
    }
}

pub(crate) fn epic_view(owner: &OwnerId, row: EpicRow) -> EpicView {
    EpicView {
        id: row.id,
        owner: owner.as_str().to_string(),
        title: row.title,
        description: row.description,
        status: row.status,
        initiative_ref: row.initiative_ref,
        created_at: ts_ms_to_rfc3339(row.created_at_ms),
        updated_at: ts_ms_to_rfc3339(row.updated_at_ms),
        completed_at: row.completed_at_ms.map(ts_ms_to_rfc3339),
    }
}

pub(crate) fn energy_view(row: EnergyBudgetRow) -> EnergyBudgetView {
    let remaining = row.budget - row.spent;
    let percent_used = if row.budget > 0 {
        row.spent as f64 / row.budget as f64
    } else {
        0.0
    };
    EnergyBudgetView {
        date: row.date,
        budget: row.budget,
        spent: row.spent,
        remaining,
        is_over_budget: row.spent > row.budget,
        percent_used,
    }
}

pub(crate) fn routine_view(owner: &OwnerId, row: RoutineRow) -> RoutineView {
    RoutineView {
        id: row.id,
        owner: owner.as_str().to_string(),
        name: row.name,
        description: row.description,
        schedule: row.schedule,
        time_of_day_min: row.time_of_day_min,
        energy: row.energy,
        initiative_ref: row.initiative_ref,
        active: row.active,
        next_due: ts_ms_to_rfc3339(row.next_due_ms),
        created_at: ts_ms_to_rfc3339(row.created_at_ms),
        updated_at: ts_ms_to_rfc3339(row.updated_at_ms),
    }
}

pub(crate) fn inbox_item_view(row: InboxItemRow) -> InboxItemView {
    InboxItemView {
        id: row.id,
        content: row.content,
        source: row.source,
        attachments: row.attachments,
        created_at: ts_ms_to_rfc3339(row.created_at_ms),
    }
}

pub(crate) fn event_view(row: EventRow) -> EventView {
    EventView {
        event_id: row.event_id(),
        ts: ts_ms_to_rfc3339(row.ts_ms),
        entity_id: row.entity_id,
        event_type: row.event_type,
        payload_json: row.payload_json,
    }
}
