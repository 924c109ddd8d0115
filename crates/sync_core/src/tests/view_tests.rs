use super::*;
use chrono::{TimeZone, Utc};
use shared::domain::{ListId, Priority, TaskId};

fn status_task(id: &str, status: TaskStatus, position: i64) -> Task {
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

fn list_task(id: &str, project: &str, list: &str, position: i64) -> Task {
    let mut task = status_task(id, TaskStatus::Todo, position);
    task.project_id = Some(ProjectId::new(project));
    task.list_id = Some(ListId::new(list));
    task
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

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn by_status_partitions_every_projectless_task_exactly_once() {
    let mut store = EntityStore::new();
    store.upsert_task(status_task("t-1", TaskStatus::Todo, 0));
    store.upsert_task(status_task("t-2", TaskStatus::InProgress, 0));
    store.upsert_task(status_task("t-3", TaskStatus::Done, 0));
    store.upsert_task(status_task("t-4", TaskStatus::Todo, 1));

    let board = by_status(&store);
    let total = board.todo.len() + board.in_progress.len() + board.done.len();
    assert_eq!(total, 4);
    assert_eq!(ids(&board.todo), vec!["t-1", "t-4"]);
    assert_eq!(ids(&board.in_progress), vec!["t-2"]);
    assert_eq!(ids(&board.done), vec!["t-3"]);
}

#[test]
fn by_status_excludes_project_tasks() {
    let mut store = EntityStore::new();
    store.upsert_task(status_task("t-global", TaskStatus::Todo, 0));
    store.upsert_task(list_task("t-project", "p-1", "l-1", 0));

    let board = by_status(&store);
    assert_eq!(ids(&board.todo), vec!["t-global"]);
    assert!(board.in_progress.is_empty());
    assert!(board.done.is_empty());
}

#[test]
fn columns_order_by_position_with_id_tiebreak() {
    let mut store = EntityStore::new();
    // Inserted out of order, with a position tie between t-b and t-a.
    store.upsert_task(status_task("t-b", TaskStatus::Todo, 1));
    store.upsert_task(status_task("t-c", TaskStatus::Todo, 2));
    store.upsert_task(status_task("t-a", TaskStatus::Todo, 1));
    store.upsert_task(status_task("t-z", TaskStatus::Todo, 0));

    let board = by_status(&store);
    assert_eq!(ids(&board.todo), vec!["t-z", "t-a", "t-b", "t-c"]);
}

#[test]
fn by_list_returns_ordered_lists_with_their_tasks() {
    let mut store = EntityStore::new();
    let project_id = ProjectId::new("p-1");
    store.upsert_list(column("l-doing", "p-1", 1));
    store.upsert_list(column("l-todo", "p-1", 0));
    store.upsert_task(list_task("t-2", "p-1", "l-todo", 1));
    store.upsert_task(list_task("t-1", "p-1", "l-todo", 0));
    store.upsert_task(list_task("t-3", "p-1", "l-doing", 0));

    let columns = by_list(&store, &project_id);
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].list.id, ListId::new("l-todo"));
    assert_eq!(ids(&columns[0].tasks), vec!["t-1", "t-2"]);
    assert_eq!(columns[1].list.id, ListId::new("l-doing"));
    assert_eq!(ids(&columns[1].tasks), vec!["t-3"]);
}

#[test]
fn by_list_never_leaks_tasks_of_other_projects() {
    let mut store = EntityStore::new();
    store.upsert_list(column("l-1", "p-1", 0));
    store.upsert_list(column("l-2", "p-2", 0));
    store.upsert_task(list_task("t-mine", "p-1", "l-1", 0));
    store.upsert_task(list_task("t-other", "p-2", "l-2", 0));

    let columns = by_list(&store, &ProjectId::new("p-1"));
    assert_eq!(columns.len(), 1);
    assert_eq!(ids(&columns[0].tasks), vec!["t-mine"]);
}

#[test]
fn views_are_recomputed_from_current_store_state() {
    let mut store = EntityStore::new();
    store.upsert_task(status_task("t-1", TaskStatus::Todo, 0));
    assert_eq!(by_status(&store).todo.len(), 1);

    let mut moved = status_task("t-1", TaskStatus::Done, 0);
    moved.updated_at = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
    store.upsert_task(moved);

    // Read-after-write: the next call reflects the mutation.
    let board = by_status(&store);
    assert!(board.todo.is_empty());
    assert_eq!(ids(&board.done), vec!["t-1"]);
}
