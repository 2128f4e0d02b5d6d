#![forbid(unsafe_code)]

use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use ql_storage::{RoutineCreateRequest, SpawnQuestRequest, SqliteStore, StoreError};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("ql_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn owner() -> OwnerId {
    OwnerId::try_new("owner_routines").expect("owner id")
}

fn routine(name: &str, next_due_ms: i64) -> RoutineCreateRequest {
    RoutineCreateRequest {
        name: name.to_string(),
        description: Some("template description".to_string()),
        schedule: "daily".to_string(),
        time_of_day_min: Some(9 * 60),
        energy: 2,
        initiative_ref: None,
        next_due_ms,
    }
}

#[test]
fn unrecognized_schedule_is_rejected() {
    let mut store = SqliteStore::open(temp_dir("unrecognized_schedule")).expect("open");
    let owner = owner();

    let err = store
        .create_routine(
            &owner,
            RoutineCreateRequest {
                schedule: "hourly".to_string(),
                ..routine("Bad schedule", 0)
            },
        )
        .expect_err("unknown schedule must fail");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn due_scan_filters_and_orders_by_next_due() {
    let mut store = SqliteStore::open(temp_dir("due_scan_orders")).expect("open");
    let owner = owner();

    let late = store.create_routine(&owner, routine("Late", 3_000)).expect("create");
    let early = store.create_routine(&owner, routine("Early", 1_000)).expect("create");
    let middle = store.create_routine(&owner, routine("Middle", 2_000)).expect("create");
    let future = store.create_routine(&owner, routine("Future", 9_000)).expect("create");

    let due = store.due_routines(&owner, 3_000).expect("due scan");
    let ids: Vec<&str> = due.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![early.id.as_str(), middle.id.as_str(), late.id.as_str()]);
    assert!(!ids.contains(&future.id.as_str()));
}

#[test]
fn inactive_and_deleted_routines_are_never_due() {
    let mut store = SqliteStore::open(temp_dir("inactive_never_due")).expect("open");
    let owner = owner();

    let paused = store.create_routine(&owner, routine("Paused", 1_000)).expect("create");
    store
        .set_routine_active(&owner, &paused.id, false)
        .expect("deactivate");

    let gone = store.create_routine(&owner, routine("Gone", 1_000)).expect("create");
    store.soft_delete_routine(&owner, &gone.id).expect("soft delete");

    let due = store.due_routines(&owner, i64::MAX).expect("due scan");
    assert!(due.is_empty(), "paused and deleted routines must not be due");
}

#[test]
fn spawn_copies_the_template_and_backrefs_the_routine() {
    let mut store = SqliteStore::open(temp_dir("spawn_copies_template")).expect("open");
    let owner = owner();

    let r = store.create_routine(&owner, routine("Water the plants", 1_000)).expect("create");
    let quest = store
        .spawn_quest(
            &owner,
            SpawnQuestRequest {
                routine_id: r.id.clone(),
                occurrence_ms: 1_000,
            },
        )
        .expect("spawn");

    assert_eq!(quest.title, "Water the plants");
    assert_eq!(quest.description.as_deref(), Some("template description"));
    assert_eq!(quest.energy, 2);
    assert_eq!(quest.status, QuestStatus::Backlog.as_str());
    assert_eq!(quest.routine_id.as_deref(), Some(r.id.as_str()));
    assert_eq!(quest.routine_occurrence_ms, Some(1_000));
}

#[test]
fn spawn_is_idempotent_per_occurrence() {
    let mut store = SqliteStore::open(temp_dir("spawn_idempotent")).expect("open");
    let owner = owner();

    let r = store.create_routine(&owner, routine("Daily review", 1_000)).expect("create");

    let first = store
        .spawn_quest(
            &owner,
            SpawnQuestRequest {
                routine_id: r.id.clone(),
                occurrence_ms: 1_000,
            },
        )
        .expect("first spawn");
    let second = store
        .spawn_quest(
            &owner,
            SpawnQuestRequest {
                routine_id: r.id.clone(),
                occurrence_ms: 1_000,
            },
        )
        .expect("replayed spawn");
    assert_eq!(first.id, second.id, "replay must return the same quest");

    let listed = store.list_quests(&owner, 10, 0).expect("list quests");
    assert_eq!(listed.len(), 1);

    // A different occurrence is a different quest.
    let next = store
        .spawn_quest(
            &owner,
            SpawnQuestRequest {
                routine_id: r.id.clone(),
                occurrence_ms: 2_000,
            },
        )
        .expect("next occurrence");
    assert_ne!(first.id, next.id);
}

#[test]
fn spawn_requires_a_live_active_routine() {
    let mut store = SqliteStore::open(temp_dir("spawn_requires_active")).expect("open");
    let owner = owner();

    match store.spawn_quest(
        &owner,
        SpawnQuestRequest {
            routine_id: "no-such-routine".to_string(),
            occurrence_ms: 1_000,
        },
    ) {
        Err(StoreError::UnknownId) => {}
        other => panic!("expected UnknownId, got {other:?}"),
    }

    let r = store.create_routine(&owner, routine("Paused", 1_000)).expect("create");
    store
        .set_routine_active(&owner, &r.id, false)
        .expect("deactivate");
    match store.spawn_quest(
        &owner,
        SpawnQuestRequest {
            routine_id: r.id.clone(),
            occurrence_ms: 1_000,
        },
    ) {
        Err(StoreError::InvalidInput(_)) => {}
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn update_next_due_moves_the_routine_out_of_the_scan() {
    let mut store = SqliteStore::open(temp_dir("update_next_due")).expect("open");
    let owner = owner();

    let r = store.create_routine(&owner, routine("Advance me", 1_000)).expect("create");
    assert_eq!(store.due_routines(&owner, 1_000).expect("due").len(), 1);

    let advanced = store
        .update_next_due(&owner, &r.id, 5_000)
        .expect("advance next due");
    assert_eq!(advanced.next_due_ms, 5_000);
    assert!(store.due_routines(&owner, 1_000).expect("due").is_empty());
}
