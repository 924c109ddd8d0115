use shared::domain::{ProjectId, Task, TaskList, TaskStatus};

use crate::store::EntityStore;

/// The three status columns of the global board. Only tasks without a
/// project id appear here; project tasks live on their project's lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusBoard {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl StatusBoard {
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }
}

/// One kanban column of a project board with its ordered tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ListColumn {
    pub list: TaskList,
    pub tasks: Vec<Task>,
}

fn sort_tasks(tasks: &mut Vec<Task>) {
    tasks.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
}

/// Groups project-less tasks by status, each column ordered by position
/// ascending with ties broken by id. Recomputed from scratch on every call;
/// there is no cached state to go stale.
pub fn by_status(store: &EntityStore) -> StatusBoard {
    let mut board = StatusBoard::default();
    for task in store.tasks().filter(|task| task.project_id.is_none()) {
        let column = match task.status {
            TaskStatus::Todo => &mut board.todo,
            TaskStatus::InProgress => &mut board.in_progress,
            TaskStatus::Done => &mut board.done,
        };
        column.push(task.clone());
    }
    sort_tasks(&mut board.todo);
    sort_tasks(&mut board.in_progress);
    sort_tasks(&mut board.done);
    board
}

/// Groups the project's tasks by list. Lists come back ordered by their own
/// position (ties by id), each carrying the tasks whose list id matches,
/// ordered the same way. Tasks of other projects never appear.
pub fn by_list(store: &EntityStore, project_id: &ProjectId) -> Vec<ListColumn> {
    let mut lists: Vec<TaskList> = store
        .lists()
        .filter(|list| list.project_id == *project_id)
        .cloned()
        .collect();
    lists.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));

    lists
        .into_iter()
        .map(|list| {
            let mut tasks: Vec<Task> = store
                .tasks()
                .filter(|task| {
                    task.project_id.as_ref() == Some(project_id)
                        && task.list_id.as_ref() == Some(&list.id)
                })
                .cloned()
                .collect();
            sort_tasks(&mut tasks);
            ListColumn { list, tasks }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
