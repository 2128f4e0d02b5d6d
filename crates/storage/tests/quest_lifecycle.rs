#![forbid(unsafe_code)]

use ql_core::ids::OwnerId;
use ql_core::model::QuestStatus;
use ql_storage::{QuestCreateRequest, QuestEditRequest, SqliteStore, StoreError};
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
    OwnerId::try_new("owner_lifecycle").expect("owner id")
}

fn quest(title: &str, energy: i64) -> QuestCreateRequest {
    QuestCreateRequest {
        title: title.to_string(),
        description: None,
        energy,
        epic_id: None,
    }
}

#[test]
fn created_quest_lands_in_backlog() {
    let mut store = SqliteStore::open(temp_dir("created_quest_lands_in_backlog")).expect("open");
    let owner = owner();

    let created = store
        .create_quest(&owner, quest("Write the launch note", 2))
        .expect("create quest");

    assert_eq!(created.status, QuestStatus::Backlog.as_str());
    assert_eq!(created.energy, 2);
    assert!(created.started_at_ms.is_none());
    assert!(created.completed_at_ms.is_none());

    let fetched = store
        .get_quest(&owner, &created.id)
        .expect("get quest")
        .expect("quest exists");
    assert_eq!(fetched.title, "Write the launch note");
}

#[test]
fn title_and_energy_validation_persist_nothing() {
    let mut store = SqliteStore::open(temp_dir("title_and_energy_validation")).expect("open");
    let owner = owner();

    let long_title = "x".repeat(201);
    let err = store
        .create_quest(&owner, quest(&long_title, 2))
        .expect_err("201-char title must fail");
    assert!(matches!(err, StoreError::InvalidInput(_)));

    for energy in [0, 6] {
        let err = store
            .create_quest(&owner, quest("Valid title", energy))
            .expect_err("out-of-range energy must fail");
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    let listed = store.list_quests(&owner, 10, 0).expect("list quests");
    assert!(listed.is_empty(), "rejected creates must not persist");
}

#[test]
fn start_stamps_and_enforces_wip_limit() {
    let mut store = SqliteStore::open(temp_dir("start_enforces_wip_limit")).expect("open");
    let owner = owner();

    let first = store.create_quest(&owner, quest("First", 1)).expect("create");
    let second = store.create_quest(&owner, quest("Second", 1)).expect("create");

    let started = store.start_quest(&owner, &first.id).expect("start first");
    assert_eq!(started.status, QuestStatus::Active.as_str());
    assert!(started.started_at_ms.is_some());

    let err = store
        .start_quest(&owner, &second.id)
        .expect_err("second start must hit the wip limit");
    match err {
        StoreError::WipLimitExceeded { current, limit } => {
            assert_eq!(current, 1);
            assert_eq!(limit, 1);
        }
        other => panic!("expected WipLimitExceeded, got {other:?}"),
    }

    // Neither quest's status moved.
    let first_now = store
        .get_quest(&owner, &first.id)
        .expect("get")
        .expect("exists");
    let second_now = store
        .get_quest(&owner, &second.id)
        .expect("get")
        .expect("exists");
    assert_eq!(first_now.status, QuestStatus::Active.as_str());
    assert_eq!(second_now.status, QuestStatus::Backlog.as_str());
}

#[test]
fn restarting_the_active_quest_is_a_no_op() {
    let mut store = SqliteStore::open(temp_dir("restart_active_quest")).expect("open");
    let owner = owner();

    let q = store.create_quest(&owner, quest("Only one", 1)).expect("create");
    let started = store.start_quest(&owner, &q.id).expect("start");
    let again = store.start_quest(&owner, &q.id).expect("retried start");
    assert_eq!(again.status, QuestStatus::Active.as_str());
    assert_eq!(again.started_at_ms, started.started_at_ms);
}

#[test]
fn backlog_frees_the_wip_slot() {
    let mut store = SqliteStore::open(temp_dir("backlog_frees_slot")).expect("open");
    let owner = owner();

    let first = store.create_quest(&owner, quest("First", 1)).expect("create");
    let second = store.create_quest(&owner, quest("Second", 1)).expect("create");

    store.start_quest(&owner, &first.id).expect("start first");
    let parked = store.backlog_quest(&owner, &first.id).expect("backlog first");
    assert_eq!(parked.status, QuestStatus::Backlog.as_str());
    assert!(parked.started_at_ms.is_none());

    store
        .start_quest(&owner, &second.id)
        .expect("slot freed, second starts");
}

#[test]
fn complete_stamps_and_rejects_double_completion() {
    let mut store = SqliteStore::open(temp_dir("complete_rejects_double")).expect("open");
    let owner = owner();

    let q = store.create_quest(&owner, quest("Finish me", 3)).expect("create");
    store.start_quest(&owner, &q.id).expect("start");

    let done = store.complete_quest(&owner, &q.id).expect("complete");
    assert_eq!(done.status, QuestStatus::Completed.as_str());
    assert!(done.completed_at_ms.is_some());

    let err = store
        .complete_quest(&owner, &q.id)
        .expect_err("second completion must fail");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn complete_works_straight_from_backlog() {
    let mut store = SqliteStore::open(temp_dir("complete_from_backlog")).expect("open");
    let owner = owner();

    let q = store.create_quest(&owner, quest("Quick win", 1)).expect("create");
    let done = store.complete_quest(&owner, &q.id).expect("complete");
    assert_eq!(done.status, QuestStatus::Completed.as_str());
}

#[test]
fn abandon_is_terminal() {
    let mut store = SqliteStore::open(temp_dir("abandon_is_terminal")).expect("open");
    let owner = owner();

    let q = store.create_quest(&owner, quest("Dead end", 1)).expect("create");
    store.abandon_quest(&owner, &q.id).expect("abandon");

    let err = store
        .start_quest(&owner, &q.id)
        .expect_err("closed quest cannot start");
    assert!(matches!(err, StoreError::InvalidInput(_)));
    let err = store
        .backlog_quest(&owner, &q.id)
        .expect_err("closed quest cannot return to backlog");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn transitions_on_missing_or_deleted_quests_are_unknown_id() {
    let mut store = SqliteStore::open(temp_dir("transitions_unknown_id")).expect("open");
    let owner = owner();

    for result in [
        store.start_quest(&owner, "no-such-id"),
        store.complete_quest(&owner, "no-such-id"),
        store.abandon_quest(&owner, "no-such-id"),
        store.backlog_quest(&owner, "no-such-id"),
    ] {
        match result {
            Err(StoreError::UnknownId) => {}
            other => panic!("expected UnknownId, got {other:?}"),
        }
    }

    let q = store.create_quest(&owner, quest("Soon gone", 1)).expect("create");
    store.soft_delete_quest(&owner, &q.id).expect("soft delete");
    match store.start_quest(&owner, &q.id) {
        Err(StoreError::UnknownId) => {}
        other => panic!("expected UnknownId for deleted quest, got {other:?}"),
    }
}

#[test]
fn soft_delete_hides_and_restore_revives() {
    let mut store = SqliteStore::open(temp_dir("soft_delete_restore")).expect("open");
    let owner = owner();

    let q = store.create_quest(&owner, quest("Here and gone", 1)).expect("create");
    store.soft_delete_quest(&owner, &q.id).expect("soft delete");

    assert!(store.get_quest(&owner, &q.id).expect("get").is_none());
    assert!(store.list_quests(&owner, 10, 0).expect("list").is_empty());

    let restored = store.restore_quest(&owner, &q.id).expect("restore");
    assert_eq!(restored.id, q.id);
    assert!(restored.deleted_at_ms.is_none());
    assert!(store.get_quest(&owner, &q.id).expect("get").is_some());
}

#[test]
fn restore_of_deleted_active_quest_respects_wip_limit() {
    let mut store = SqliteStore::open(temp_dir("restore_respects_wip")).expect("open");
    let owner = owner();

    let first = store.create_quest(&owner, quest("First", 1)).expect("create");
    let second = store.create_quest(&owner, quest("Second", 1)).expect("create");

    store.start_quest(&owner, &first.id).expect("start first");
    store.soft_delete_quest(&owner, &first.id).expect("delete active");
    store.start_quest(&owner, &second.id).expect("slot freed");

    let err = store
        .restore_quest(&owner, &first.id)
        .expect_err("restore would produce two active quests");
    match err {
        StoreError::WipLimitExceeded { current, limit } => {
            assert_eq!(current, 1);
            assert_eq!(limit, 1);
        }
        other => panic!("expected WipLimitExceeded, got {other:?}"),
    }
}

#[test]
fn edit_updates_fields_and_rejects_empty_patch() {
    let mut store = SqliteStore::open(temp_dir("edit_updates_fields")).expect("open");
    let owner = owner();

    let q = store.create_quest(&owner, quest("Old title", 1)).expect("create");

    let edited = store
        .edit_quest(
            &owner,
            QuestEditRequest {
                id: q.id.clone(),
                title: Some("New title".to_string()),
                description: Some(Some("with context".to_string())),
                energy: Some(4),
                epic_id: None,
            },
        )
        .expect("edit");
    assert_eq!(edited.title, "New title");
    assert_eq!(edited.description.as_deref(), Some("with context"));
    assert_eq!(edited.energy, 4);

    let err = store
        .edit_quest(
            &owner,
            QuestEditRequest {
                id: q.id.clone(),
                ..Default::default()
            },
        )
        .expect_err("empty patch must fail");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn owners_do_not_share_a_wip_slot() {
    let mut store = SqliteStore::open(temp_dir("owners_isolated")).expect("open");
    let alice = OwnerId::try_new("alice").expect("owner id");
    let bob = OwnerId::try_new("bob").expect("owner id");

    let a = store.create_quest(&alice, quest("Alice's quest", 1)).expect("create");
    let b = store.create_quest(&bob, quest("Bob's quest", 1)).expect("create");

    store.start_quest(&alice, &a.id).expect("alice starts");
    store.start_quest(&bob, &b.id).expect("bob starts independently");

    assert!(store.get_quest(&alice, &b.id).expect("get").is_none());
    assert_eq!(
        store
            .quests_by_status(&alice, QuestStatus::Active)
            .expect("active for alice")
            .len(),
        1
    );
}
