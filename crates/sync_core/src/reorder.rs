use shared::domain::{ListId, ProjectId, TaskId, TaskStatus};
use shared::protocol::ReorderRequest;
use thiserror::Error;

use crate::store::EntityStore;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReorderError {
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    #[error("a drag gesture is already in progress")]
    GestureInProgress,
    #[error("no drag gesture in progress")]
    NoGesture,
}

/// Destination partition of a drop: a status column of the global board, or
/// a list on a project board.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Status(TaskStatus),
    List(ListId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub destination: Destination,
    /// Intended rank within the destination's ordered sequence.
    pub position: i64,
}

/// Last server-confirmed placement of the dragged task, captured when the
/// gesture began; the revert target if the commit fails.
#[derive(Debug, Clone, PartialEq)]
struct DragOrigin {
    task_id: TaskId,
    status: TaskStatus,
    project_id: Option<ProjectId>,
    list_id: Option<ListId>,
    position: i64,
}

#[derive(Debug, Default)]
enum DragPhase {
    #[default]
    Idle,
    Dragging {
        origin: DragOrigin,
    },
    Committing {
        origin: DragOrigin,
        optimistic_revision: u64,
    },
}

#[derive(Debug, PartialEq)]
pub enum DropOutcome {
    /// Dropped back onto the same partition and position: no command, no
    /// state change.
    Unchanged,
    /// The store was updated optimistically; send this command and then
    /// call `confirm` or `fail`.
    Command(ReorderRequest),
}

#[derive(Debug, PartialEq)]
pub enum RevertOutcome {
    /// The optimistic placement was rolled back to the drag origin.
    Reverted,
    /// A newer write (push event or deletion) touched the task after the
    /// optimistic apply; that state wins and nothing is rolled back.
    Superseded,
}

/// Explicit state machine for one drag-and-drop gesture:
/// `Idle -> Dragging -> Committing -> Idle`.
#[derive(Debug, Default)]
pub struct ReorderCoordinator {
    phase: DragPhase,
}

impl ReorderCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    /// `Idle -> Dragging`: snapshots the task's current partition and
    /// position. No network activity.
    pub fn begin(&mut self, store: &EntityStore, task_id: &TaskId) -> Result<(), ReorderError> {
        if !self.is_idle() {
            return Err(ReorderError::GestureInProgress);
        }
        let task = store
            .task(task_id)
            .ok_or_else(|| ReorderError::UnknownTask(task_id.clone()))?;
        self.phase = DragPhase::Dragging {
            origin: DragOrigin {
                task_id: task.id.clone(),
                status: task.status,
                project_id: task.project_id.clone(),
                list_id: task.list_id.clone(),
                position: task.position,
            },
        };
        Ok(())
    }

    /// Abandons an in-progress drag without touching the store.
    pub fn cancel(&mut self) {
        if matches!(self.phase, DragPhase::Dragging { .. }) {
            self.phase = DragPhase::Idle;
        }
    }

    /// `Dragging -> Committing` (or straight back to `Idle` when the drop
    /// changes nothing). On a real move the store is updated optimistically
    /// and the command to send is returned.
    pub fn drop_at(
        &mut self,
        store: &mut EntityStore,
        target: DropTarget,
    ) -> Result<DropOutcome, ReorderError> {
        let origin = match std::mem::take(&mut self.phase) {
            DragPhase::Dragging { origin } => origin,
            phase => {
                self.phase = phase;
                return Err(ReorderError::NoGesture);
            }
        };

        let unchanged = match &target.destination {
            Destination::Status(status) => {
                origin.status == *status
                    && origin.list_id.is_none()
                    && origin.position == target.position
            }
            Destination::List(list_id) => {
                origin.list_id.as_ref() == Some(list_id) && origin.position == target.position
            }
        };
        if unchanged {
            return Ok(DropOutcome::Unchanged);
        }

        let Some(task) = store.task(&origin.task_id) else {
            // Deleted mid-gesture; there is nothing left to move.
            return Err(ReorderError::UnknownTask(origin.task_id));
        };
        let mut moved = task.clone();
        moved.position = target.position;
        let request = match &target.destination {
            Destination::Status(status) => {
                moved.status = *status;
                ReorderRequest {
                    task_id: origin.task_id.clone(),
                    new_list_id: None,
                    new_status: Some(*status),
                    new_position: target.position,
                }
            }
            Destination::List(list_id) => {
                moved.list_id = Some(list_id.clone());
                // A task inside a list belongs to that list's project.
                if let Some(list) = store.list(list_id) {
                    moved.project_id = Some(list.project_id.clone());
                }
                ReorderRequest {
                    task_id: origin.task_id.clone(),
                    new_list_id: Some(list_id.clone()),
                    new_status: None,
                    new_position: target.position,
                }
            }
        };

        let optimistic_revision = store.upsert_task(moved);
        self.phase = DragPhase::Committing {
            origin,
            optimistic_revision,
        };
        Ok(DropOutcome::Command(request))
    }

    /// `Committing -> Idle` on server acknowledgement. The optimistic
    /// placement stands; the authoritative echo arrives through the normal
    /// upsert path and supersedes it.
    pub fn confirm(&mut self) -> Result<(), ReorderError> {
        match std::mem::take(&mut self.phase) {
            DragPhase::Committing { .. } => Ok(()),
            phase => {
                self.phase = phase;
                Err(ReorderError::NoGesture)
            }
        }
    }

    /// `Committing -> Idle` on command failure. Reverts the optimistic
    /// placement to the drag origin unless a newer write already superseded
    /// it, in which case the newer state wins.
    pub fn fail(&mut self, store: &mut EntityStore) -> Result<RevertOutcome, ReorderError> {
        let (origin, optimistic_revision) = match std::mem::take(&mut self.phase) {
            DragPhase::Committing {
                origin,
                optimistic_revision,
            } => (origin, optimistic_revision),
            phase => {
                self.phase = phase;
                return Err(ReorderError::NoGesture);
            }
        };

        if store.task_revision(&origin.task_id) != Some(optimistic_revision) {
            return Ok(RevertOutcome::Superseded);
        }

        let Some(task) = store.task(&origin.task_id) else {
            return Ok(RevertOutcome::Superseded);
        };
        let mut reverted = task.clone();
        reverted.status = origin.status;
        reverted.project_id = origin.project_id;
        reverted.list_id = origin.list_id;
        reverted.position = origin.position;
        store.upsert_task(reverted);
        Ok(RevertOutcome::Reverted)
    }
}

#[cfg(test)]
#[path = "tests/reorder_tests.rs"]
mod tests;
