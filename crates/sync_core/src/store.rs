use shared::domain::{ListId, Project, ProjectId, Task, TaskId, TaskList};

struct Slot<T> {
    value: T,
    revision: u64,
}

/// In-memory source-of-truth mirror for one client. Owns the authoritative
/// in-process copies of tasks, projects, and lists; every other component
/// reads from or writes through it.
///
/// Writes are last-writer-wins by arrival order: an upsert replaces the
/// stored entity wholesale, regardless of timestamps. Each write stamps the
/// entity with a store-wide revision so that in-flight optimistic writes can
/// later tell whether a newer write superseded them. Iteration order is
/// insertion order of first appearance.
#[derive(Default)]
pub struct EntityStore {
    revision: u64,
    tasks: Vec<Slot<Task>>,
    projects: Vec<Slot<Project>>,
    lists: Vec<Slot<TaskList>>,
}

fn upsert_slot<T>(slots: &mut Vec<Slot<T>>, revision: u64, value: T, matches: impl Fn(&T) -> bool) {
    match slots.iter_mut().find(|slot| matches(&slot.value)) {
        Some(slot) => {
            slot.value = value;
            slot.revision = revision;
        }
        None => slots.push(Slot { value, revision }),
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    /// Insert or wholesale-replace a task. Returns the revision stamped on
    /// this write.
    pub fn upsert_task(&mut self, task: Task) -> u64 {
        let revision = self.next_revision();
        let id = task.id.clone();
        upsert_slot(&mut self.tasks, revision, task, |t| t.id == id);
        revision
    }

    pub fn upsert_project(&mut self, project: Project) -> u64 {
        let revision = self.next_revision();
        let id = project.id.clone();
        upsert_slot(&mut self.projects, revision, project, |p| p.id == id);
        revision
    }

    pub fn upsert_list(&mut self, list: TaskList) -> u64 {
        let revision = self.next_revision();
        let id = list.id.clone();
        upsert_slot(&mut self.lists, revision, list, |l| l.id == id);
        revision
    }

    /// Idempotent: removing an absent id is a no-op.
    pub fn remove_task(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|slot| slot.value.id != *id);
        self.tasks.len() != before
    }

    pub fn remove_list(&mut self, id: &ListId) -> bool {
        let before = self.lists.len();
        self.lists.retain(|slot| slot.value.id != *id);
        self.lists.len() != before
    }

    /// Removes the project and cascades to every list and task it owns.
    pub fn remove_project(&mut self, id: &ProjectId) -> bool {
        self.tasks
            .retain(|slot| slot.value.project_id.as_ref() != Some(id));
        self.lists.retain(|slot| slot.value.project_id != *id);
        let before = self.projects.len();
        self.projects.retain(|slot| slot.value.id != *id);
        self.projects.len() != before
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|slot| slot.value.id == *id)
            .map(|slot| &slot.value)
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects
            .iter()
            .find(|slot| slot.value.id == *id)
            .map(|slot| &slot.value)
    }

    pub fn list(&self, id: &ListId) -> Option<&TaskList> {
        self.lists
            .iter()
            .find(|slot| slot.value.id == *id)
            .map(|slot| &slot.value)
    }

    /// Revision of the last write to this task, or `None` if it is gone.
    pub fn task_revision(&self, id: &TaskId) -> Option<u64> {
        self.tasks
            .iter()
            .find(|slot| slot.value.id == *id)
            .map(|slot| slot.revision)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().map(|slot| &slot.value)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().map(|slot| &slot.value)
    }

    pub fn lists(&self) -> impl Iterator<Item = &TaskList> {
        self.lists.iter().map(|slot| &slot.value)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
