#![forbid(unsafe_code)]

use ql_api::{
    Api, ApiConfig, ApiError, CaptureRequest, CheckpointAddRequest, CheckpointReorderRequest,
    QuestCreateRequest, TriageTarget,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("ql_api_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn api(test_name: &str) -> Api {
    Api::open(temp_dir(test_name), ApiConfig::default()).expect("open api")
}

const OWNER: &str = "owner_api";

fn quest(title: &str, energy: i64) -> QuestCreateRequest {
    QuestCreateRequest {
        title: title.to_string(),
        description: None,
        energy,
        epic_id: None,
    }
}

#[test]
fn views_carry_rfc3339_timestamps_and_opaque_ids() {
    let api = api("views_rfc3339");

    let view = api
        .create_quest(OWNER, quest("Timestamped", 2))
        .expect("create quest");

    assert_eq!(view.owner, OWNER);
    assert_eq!(view.id.len(), 26, "ids are 26-char ulids");
    assert!(view.created_at.contains('T'), "{}", view.created_at);
    assert!(view.created_at.ends_with('Z'), "{}", view.created_at);
    assert!(view.started_at.is_none());

    let started = api.start_quest(OWNER, &view.id).expect("start");
    let started_at = started.started_at.expect("started stamp");
    assert!(started_at.contains('T') && started_at.ends_with('Z'));
}

#[test]
fn unknown_ids_surface_as_not_found() {
    let api = api("unknown_not_found");

    match api.get_quest(OWNER, "no-such-quest") {
        Err(ApiError::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    match api.start_quest(OWNER, "no-such-quest") {
        Err(ApiError::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn wip_rejection_carries_counts_for_the_client_flow() {
    let api = api("wip_counts");

    let first = api.create_quest(OWNER, quest("First", 1)).expect("create");
    let second = api.create_quest(OWNER, quest("Second", 1)).expect("create");
    api.start_quest(OWNER, &first.id).expect("start first");

    let err = api
        .start_quest(OWNER, &second.id)
        .expect_err("second start must fail");
    match &err {
        ApiError::WipLimitExceeded { current, limit } => {
            assert_eq!(*current, 1);
            assert_eq!(*limit, 1);
        }
        other => panic!("expected WipLimitExceeded, got {other:?}"),
    }

    assert_eq!(err.kind(), "wip_limit_exceeded");
    let body = err.to_body();
    assert_eq!(body["error"], "wip_limit_exceeded");
    assert_eq!(body["current"], 1);
    assert_eq!(body["limit"], 1);
}

#[test]
fn validation_short_circuits_with_messages() {
    let api = api("validation_messages");

    let err = api
        .create_quest(OWNER, quest("Too strong", 6))
        .expect_err("energy 6 must fail");
    match &err {
        ApiError::Validation(message) => assert!(message.contains("energy")),
        other => panic!("expected Validation, got {other:?}"),
    }

    match api.quests_by_status(OWNER, "SNOOZING") {
        Err(ApiError::Validation(_)) => {}
        other => panic!("expected Validation, got {other:?}"),
    }

    match api.get_quest("", "anything") {
        Err(ApiError::Validation(_)) => {}
        other => panic!("expected Validation for bad owner, got {other:?}"),
    }

    match api.get_energy_budget(OWNER, "08/07/2026") {
        Err(ApiError::Validation(_)) => {}
        other => panic!("expected Validation for bad date, got {other:?}"),
    }
}

#[test]
fn energy_view_derives_remaining_and_over_budget() {
    let api = api("energy_derived_fields");

    let a = api.create_quest(OWNER, quest("Heavy", 3)).expect("create");
    let b = api.create_quest(OWNER, quest("Heavier", 2)).expect("create");
    let done = api.complete_quest(OWNER, &a.id).expect("complete");
    api.complete_quest(OWNER, &b.id).expect("complete");

    // The completion stamp's date prefix is the UTC calendar day.
    let completed_at = done.completed_at.expect("completion stamp");
    let date = &completed_at[0..10];

    let view = api
        .set_energy_budget(OWNER, date, 4)
        .expect("set budget to 4");
    assert_eq!(view.budget, 4);
    assert_eq!(view.spent, 5);
    assert_eq!(view.remaining, -1);
    assert!(view.is_over_budget);
    assert!((view.percent_used - 1.25).abs() < f64::EPSILON);

    let exact = api.set_energy_budget(OWNER, date, 5).expect("set budget to 5");
    assert_eq!(exact.remaining, 0);
    assert!(!exact.is_over_budget);
}

#[test]
fn checkpoint_reorder_round_trips_through_the_surface() {
    let api = api("checkpoint_reorder");

    let parent = api.create_quest(OWNER, quest("Parent", 2)).expect("create");
    let mut ids = Vec::new();
    for title in ["One", "Two", "Three"] {
        let cp = api
            .add_checkpoint(
                OWNER,
                CheckpointAddRequest {
                    quest_id: parent.id.clone(),
                    title: title.to_string(),
                    ordinal: None,
                },
            )
            .expect("add checkpoint");
        ids.push(cp.id);
    }

    let reordered = api
        .reorder_checkpoints(
            OWNER,
            CheckpointReorderRequest {
                quest_id: parent.id.clone(),
                ordered_ids: vec![ids[2].clone(), ids[0].clone(), ids[1].clone()],
            },
        )
        .expect("reorder");
    let orders: Vec<i64> = reordered.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(reordered[0].id, ids[2]);
}

#[test]
fn triage_produces_the_new_entitys_id() {
    let api = api("triage_new_entity_id");

    let item = api
        .capture(
            OWNER,
            CaptureRequest {
                content: "look into that library".to_string(),
                source: "browser".to_string(),
                attachments: Vec::new(),
            },
        )
        .expect("capture");

    let outcome = api
        .triage(
            OWNER,
            &item.id,
            TriageTarget::Note {
                title: "That library".to_string(),
                body: "looked promising".to_string(),
            },
        )
        .expect("triage");
    assert_eq!(outcome.kind, "note");
    assert_ne!(outcome.entity_id, item.id);

    match api.get_inbox_item(OWNER, &item.id) {
        Err(ApiError::NotFound) => {}
        other => panic!("expected NotFound after triage, got {other:?}"),
    }

    match api.triage(
        OWNER,
        &item.id,
        TriageTarget::Item {
            name: "anything".to_string(),
            quantity: 1,
        },
    ) {
        Err(ApiError::NotFound) => {}
        other => panic!("expected NotFound for retired item, got {other:?}"),
    }
}

#[test]
fn events_journal_the_mutations_in_order() {
    let api = api("events_journal");

    let q = api.create_quest(OWNER, quest("Journaled", 1)).expect("create");
    api.start_quest(OWNER, &q.id).expect("start");
    api.complete_quest(OWNER, &q.id).expect("complete");

    let events = api.list_events(OWNER, 0, 10).expect("list events");
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["quest.created", "quest.started", "quest.completed"]);
    assert!(events[0].event_id.starts_with("evt_"));
}
