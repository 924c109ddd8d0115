use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ListId, Priority, Project, ProjectColor, ProjectId, Task, TaskId, TaskList, TaskStatus,
};

/// Server-push message delivered over the duplex channel. The wire shape is
/// a flat JSON object tagged by `type`, e.g.
/// `{"type": "task_created", "task": {...}}`. Tags the client does not
/// recognize decode to `Unknown` and are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    TaskCreated { task: Task },
    TaskUpdated { task: Task },
    TaskMoved { task: Task },
    TaskDeleted { task_id: TaskId },
    ProjectCreated { project: Project },
    ProjectDeleted { project_id: ProjectId },
    ListCreated { list: TaskList },
    #[serde(other)]
    Unknown,
}

/// Payload-free event tag, used to register dispatcher listeners by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskDeleted,
    ProjectCreated,
    ProjectDeleted,
    ListCreated,
    Unknown,
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::TaskCreated { .. } => EventKind::TaskCreated,
            ServerEvent::TaskUpdated { .. } => EventKind::TaskUpdated,
            ServerEvent::TaskMoved { .. } => EventKind::TaskMoved,
            ServerEvent::TaskDeleted { .. } => EventKind::TaskDeleted,
            ServerEvent::ProjectCreated { .. } => EventKind::ProjectCreated,
            ServerEvent::ProjectDeleted { .. } => EventKind::ProjectDeleted,
            ServerEvent::ListCreated { .. } => EventKind::ListCreated,
            ServerEvent::Unknown => EventKind::Unknown,
        }
    }
}

/// Body for `POST /api/tasks`. The server assigns id, timestamps, and the
/// position at the end of the destination partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ListId>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: Priority::default(),
            due_date: None,
            project_id: None,
            list_id: None,
        }
    }
}

/// Body for `PUT /api/tasks/{id}`; absent fields are left untouched by the
/// server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ListId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub color: ProjectColor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewList {
    pub name: String,
}

/// Body for `POST /api/tasks/reorder`. Exactly one of `new_list_id` /
/// `new_status` names the destination partition; `new_position` is the
/// task's intended rank within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_list_id: Option<ListId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_status: Option<TaskStatus>,
    pub new_position: i64,
}

/// Response of `GET /api/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub in_progress_tasks: u64,
    pub pending_tasks: u64,
    pub total_projects: u64,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
