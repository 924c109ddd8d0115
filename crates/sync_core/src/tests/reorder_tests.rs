use super::*;
use chrono::{TimeZone, Utc};
use shared::domain::{Priority, Task, TaskList};

fn board_task(id: &str, status: TaskStatus, position: i64) -> Task {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    Task {
        id: TaskId::new(id),
        title: format!("task {id}"),
        description: None,
        status,
        priority: Priority::Medium,
        due_date: None,
        created_at: now,
        updated_at: now,
        project_id: None,
        list_id: None,
        position,
    }
}

fn column(id: &str, project: &str, position: i64) -> TaskList {
    TaskList {
        id: ListId::new(id),
        name: format!("list {id}"),
        project_id: ProjectId::new(project),
        position,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

fn seeded_store() -> EntityStore {
    let mut store = EntityStore::new();
    store.upsert_task(board_task("t-1", TaskStatus::Todo, 0));
    store
}

#[test]
fn drop_on_same_position_is_a_no_op() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    let outcome = coordinator
        .drop_at(
            &mut store,
            DropTarget {
                destination: Destination::Status(TaskStatus::Todo),
                position: 0,
            },
        )
        .expect("drop");

    assert_eq!(outcome, DropOutcome::Unchanged);
    assert!(coordinator.is_idle());
    let task = store.task(&TaskId::new("t-1")).expect("present");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.position, 0);
}

#[test]
fn cross_status_drop_applies_optimistically_and_emits_command() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    let outcome = coordinator
        .drop_at(
            &mut store,
            DropTarget {
                destination: Destination::Status(TaskStatus::InProgress),
                position: 1,
            },
        )
        .expect("drop");

    let DropOutcome::Command(request) = outcome else {
        panic!("expected a command");
    };
    assert_eq!(
        request,
        ReorderRequest {
            task_id: TaskId::new("t-1"),
            new_list_id: None,
            new_status: Some(TaskStatus::InProgress),
            new_position: 1,
        }
    );

    // Optimistic placement is visible before any server round trip.
    let task = store.task(&TaskId::new("t-1")).expect("present");
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.position, 1);
    assert!(!coordinator.is_idle());
}

#[test]
fn dropping_into_a_list_adopts_the_lists_project() {
    let mut store = seeded_store();
    store.upsert_list(column("l-1", "p-1", 0));
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    let outcome = coordinator
        .drop_at(
            &mut store,
            DropTarget {
                destination: Destination::List(ListId::new("l-1")),
                position: 0,
            },
        )
        .expect("drop");

    let DropOutcome::Command(request) = outcome else {
        panic!("expected a command");
    };
    assert_eq!(request.new_list_id, Some(ListId::new("l-1")));
    assert_eq!(request.new_status, None);

    let task = store.task(&TaskId::new("t-1")).expect("present");
    assert_eq!(task.list_id, Some(ListId::new("l-1")));
    assert_eq!(task.project_id, Some(ProjectId::new("p-1")));
}

#[test]
fn failed_commit_reverts_to_the_origin_snapshot() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    coordinator
        .drop_at(
            &mut store,
            DropTarget {
                destination: Destination::Status(TaskStatus::InProgress),
                position: 1,
            },
        )
        .expect("drop");

    let outcome = coordinator.fail(&mut store).expect("fail");

    assert_eq!(outcome, RevertOutcome::Reverted);
    assert!(coordinator.is_idle());
    let task = store.task(&TaskId::new("t-1")).expect("present");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.position, 0);
}

#[test]
fn intervening_write_supersedes_the_revert() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    coordinator
        .drop_at(
            &mut store,
            DropTarget {
                destination: Destination::Status(TaskStatus::InProgress),
                position: 1,
            },
        )
        .expect("drop");

    // Another client moved the task while our command was in flight.
    store.upsert_task(board_task("t-1", TaskStatus::Done, 3));

    let outcome = coordinator.fail(&mut store).expect("fail");

    assert_eq!(outcome, RevertOutcome::Superseded);
    let task = store.task(&TaskId::new("t-1")).expect("present");
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.position, 3);
}

#[test]
fn deletion_mid_flight_also_supersedes_the_revert() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    coordinator
        .drop_at(
            &mut store,
            DropTarget {
                destination: Destination::Status(TaskStatus::InProgress),
                position: 1,
            },
        )
        .expect("drop");

    store.remove_task(&TaskId::new("t-1"));

    let outcome = coordinator.fail(&mut store).expect("fail");
    assert_eq!(outcome, RevertOutcome::Superseded);
    assert!(store.task(&TaskId::new("t-1")).is_none());
}

#[test]
fn confirm_finishes_the_gesture_and_keeps_optimistic_state() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    coordinator
        .drop_at(
            &mut store,
            DropTarget {
                destination: Destination::Status(TaskStatus::Done),
                position: 0,
            },
        )
        .expect("drop");
    coordinator.confirm().expect("confirm");

    assert!(coordinator.is_idle());
    assert_eq!(
        store.task(&TaskId::new("t-1")).expect("present").status,
        TaskStatus::Done
    );
}

#[test]
fn gesture_misuse_is_rejected() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    assert_eq!(
        coordinator.begin(&store, &TaskId::new("missing")),
        Err(ReorderError::UnknownTask(TaskId::new("missing")))
    );
    assert_eq!(
        coordinator.drop_at(
            &mut store,
            DropTarget {
                destination: Destination::Status(TaskStatus::Done),
                position: 0,
            },
        ),
        Err(ReorderError::NoGesture)
    );
    assert_eq!(coordinator.confirm(), Err(ReorderError::NoGesture));

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    assert_eq!(
        coordinator.begin(&store, &TaskId::new("t-1")),
        Err(ReorderError::GestureInProgress)
    );
}

#[test]
fn cancel_abandons_the_drag_without_touching_the_store() {
    let mut store = seeded_store();
    let mut coordinator = ReorderCoordinator::new();

    coordinator.begin(&store, &TaskId::new("t-1")).expect("begin");
    coordinator.cancel();

    assert!(coordinator.is_idle());
    let task = store.task(&TaskId::new("t-1")).expect("present");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.position, 0);
}
