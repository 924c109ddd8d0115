use std::collections::HashMap;

use shared::protocol::{EventKind, ServerEvent};
use tracing::debug;

use crate::store::EntityStore;

pub type Listener = Box<dyn Fn(&ServerEvent) + Send + Sync>;

/// Fans parsed push events out to the store and to listeners registered by
/// event kind. Dispatch is synchronous and strictly in arrival order: no
/// reordering, coalescing, or deduplication happens here, even for events
/// touching the same entity id.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<EventKind, Vec<Listener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }

    /// Applies the event's lifecycle rule to the store, then notifies every
    /// listener registered for its kind. Unknown kinds are a no-op.
    pub fn dispatch(&self, store: &mut EntityStore, event: &ServerEvent) {
        match event {
            ServerEvent::TaskCreated { task }
            | ServerEvent::TaskUpdated { task }
            | ServerEvent::TaskMoved { task } => {
                store.upsert_task(task.clone());
            }
            ServerEvent::TaskDeleted { task_id } => {
                store.remove_task(task_id);
            }
            ServerEvent::ProjectCreated { project } => {
                store.upsert_project(project.clone());
            }
            ServerEvent::ProjectDeleted { project_id } => {
                store.remove_project(project_id);
            }
            ServerEvent::ListCreated { list } => {
                store.upsert_list(list.clone());
            }
            ServerEvent::Unknown => {
                debug!("ignoring unrecognized push event kind");
            }
        }

        if let Some(listeners) = self.listeners.get(&event.kind()) {
            for listener in listeners {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
