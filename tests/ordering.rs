//! Reindexer behavior over flat task collections.

use tasklane::ordering::position::{decode_completed, encode_completed, encode_sequential};
use tasklane::ordering::reindex::{reindex, sort_completed, PositionAssignment};
use tasklane::ordering::{OrderingError, SortMode};
use tasklane::task;
use uuid::Uuid;

fn model(list: Uuid, parent: Option<Uuid>, title: &str, position: &str) -> task::Model {
    task::Model {
        uuid: Uuid::new_v4(),
        remote_id: None,
        title: title.to_string(),
        notes: None,
        due_date: None,
        is_completed: false,
        completed_ms: None,
        updated_ms: 0,
        position: position.to_string(),
        list_uuid: list,
        parent_uuid: parent,
        remote_parent_id: None,
    }
}

fn completed(list: Uuid, title: &str, completed_ms: i64) -> task::Model {
    let mut task = model(list, None, title, "");
    task.is_completed = true;
    task.completed_ms = Some(completed_ms);
    task
}

fn position_of(assignments: &[PositionAssignment], uuid: Uuid) -> &str {
    &assignments
        .iter()
        .find(|a| a.uuid == uuid)
        .expect("assignment for task")
        .position
}

#[test]
fn manual_mode_compacts_preserving_input_order() {
    let list = Uuid::new_v4();
    let tasks = vec![
        model(list, None, "a", "00000000000000000003"),
        model(list, None, "b", "00000000000000000007"),
        model(list, None, "c", "00000000000000000019"),
    ];

    let assignments = reindex(&tasks, SortMode::Manual);

    assert_eq!(assignments.len(), 3);
    assert_eq!(position_of(&assignments, tasks[0].uuid), "00000000000000000000");
    assert_eq!(position_of(&assignments, tasks[1].uuid), "00000000000000000001");
    assert_eq!(position_of(&assignments, tasks[2].uuid), "00000000000000000002");
}

#[test]
fn reindex_is_idempotent() {
    let list = Uuid::new_v4();
    let mut tasks = vec![
        model(list, None, "a", "00000000000000000004"),
        model(list, None, "b", "00000000000000000009"),
        completed(list, "c", 1_730_217_252_000),
    ];

    let first = reindex(&tasks, SortMode::Manual);
    for task in &mut tasks {
        task.position = position_of(&first, task.uuid).to_string();
    }
    let second = reindex(&tasks, SortMode::Manual);

    assert_eq!(first, second);
}

#[test]
fn completed_tasks_sort_after_incomplete_ones() {
    let list = Uuid::new_v4();
    let tasks = vec![
        completed(list, "done", 1_730_217_252_000),
        model(list, None, "open", "00000000000000000005"),
    ];

    let assignments = reindex(&tasks, SortMode::Manual);

    let open = position_of(&assignments, tasks[1].uuid);
    let done = position_of(&assignments, tasks[0].uuid);
    assert!(open < done, "{open} should sort before {done}");
    assert!(done.starts_with("09"));
}

#[test]
fn completed_tasks_order_by_recency() {
    let list = Uuid::new_v4();
    let older = completed(list, "older", 1_000_000_000_000);
    let newer = completed(list, "newer", 2_000_000_000_000);
    let tasks = vec![older.clone(), newer.clone()];

    let assignments = reindex(&tasks, SortMode::Manual);

    let newer_pos = position_of(&assignments, newer.uuid);
    let older_pos = position_of(&assignments, older.uuid);
    assert!(newer_pos < older_pos, "most recent completion sorts first");
    assert_eq!(decode_completed(newer_pos), Some(2_000_000_000_000));
    assert_eq!(decode_completed(older_pos), Some(1_000_000_000_000));
}

#[test]
fn completed_position_matches_codec() {
    let list = Uuid::new_v4();
    let task = completed(list, "done", 1_730_217_252_000);

    let assignments = reindex(&[task.clone()], SortMode::Manual);

    assert_eq!(
        position_of(&assignments, task.uuid),
        encode_completed(1_730_217_252_000)
    );
    assert_eq!(position_of(&assignments, task.uuid), "09999998269782747999");
}

#[test]
fn due_date_mode_sorts_undated_last() {
    let list = Uuid::new_v4();
    let mut due_late = model(list, None, "late", "00000000000000000000");
    due_late.due_date = Some("2026-09-20".to_string());
    let mut due_soon = model(list, None, "soon", "00000000000000000001");
    due_soon.due_date = Some("2026-09-01".to_string());
    let undated = model(list, None, "undated", "00000000000000000002");

    let tasks = vec![due_late.clone(), undated.clone(), due_soon.clone()];
    let assignments = reindex(&tasks, SortMode::DueDate);

    assert_eq!(position_of(&assignments, due_soon.uuid), "00000000000000000000");
    assert_eq!(position_of(&assignments, due_late.uuid), "00000000000000000001");
    assert_eq!(position_of(&assignments, undated.uuid), "00000000000000000002");
}

#[test]
fn due_date_ties_keep_manual_order() {
    let list = Uuid::new_v4();
    let mut first = model(list, None, "first", "00000000000000000000");
    first.due_date = Some("2026-09-01".to_string());
    let mut second = model(list, None, "second", "00000000000000000001");
    second.due_date = Some("2026-09-01".to_string());

    let assignments = reindex(&[first.clone(), second.clone()], SortMode::DueDate);

    assert_eq!(position_of(&assignments, first.uuid), "00000000000000000000");
    assert_eq!(position_of(&assignments, second.uuid), "00000000000000000001");
}

#[test]
fn title_mode_is_case_insensitive_with_lowercase_first_on_ties() {
    let list = Uuid::new_v4();
    let t1_upper = model(list, None, "T1", "00000000000000000000");
    let t2_lower = model(list, None, "t2", "00000000000000000001");
    let t1_lower = model(list, None, "t1", "00000000000000000002");
    let t2_upper = model(list, None, "T2", "00000000000000000003");

    let tasks = vec![
        t1_upper.clone(),
        t2_lower.clone(),
        t1_lower.clone(),
        t2_upper.clone(),
    ];
    let assignments = reindex(&tasks, SortMode::Title);

    // t1 < T1 < t2 < T2
    assert_eq!(position_of(&assignments, t1_lower.uuid), "00000000000000000000");
    assert_eq!(position_of(&assignments, t1_upper.uuid), "00000000000000000001");
    assert_eq!(position_of(&assignments, t2_lower.uuid), "00000000000000000002");
    assert_eq!(position_of(&assignments, t2_upper.uuid), "00000000000000000003");
}

#[test]
fn scopes_are_reindexed_independently() {
    let list_a = Uuid::new_v4();
    let list_b = Uuid::new_v4();
    let parent = Uuid::new_v4();
    let tasks = vec![
        model(list_a, None, "a-root", "00000000000000000008"),
        model(list_b, None, "b-root", "00000000000000000003"),
        model(list_a, Some(parent), "a-child", "00000000000000000005"),
    ];

    let assignments = reindex(&tasks, SortMode::Manual);

    // Each scope restarts at index zero.
    for task in &tasks {
        assert_eq!(position_of(&assignments, task.uuid), encode_sequential(0));
    }
}

#[test]
fn sort_completed_rejects_incomplete_input() {
    let list = Uuid::new_v4();
    let open = model(list, None, "open", "00000000000000000000");
    let tasks = vec![completed(list, "done", 1_000), open.clone()];

    let result = sort_completed(&tasks);

    match result {
        Err(OrderingError::IncompleteTask(uuid)) => assert_eq!(uuid, open.uuid),
        other => panic!("expected IncompleteTask error, got {other:?}"),
    }
}

#[test]
fn sort_completed_orders_by_recency() {
    let list = Uuid::new_v4();
    let older = completed(list, "older", 1_000);
    let newer = completed(list, "newer", 2_000);

    let assignments = sort_completed(&[older.clone(), newer.clone()]).unwrap();

    assert!(position_of(&assignments, newer.uuid) < position_of(&assignments, older.uuid));
}
