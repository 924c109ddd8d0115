use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Project, ProjectId, Task, TaskId, TaskList},
    protocol::{EventKind, NewList, NewProject, NewTask, ServerEvent, Stats, TaskPatch},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

pub mod api;
pub mod dispatcher;
pub mod error;
pub mod reorder;
pub mod store;
pub mod transport;
pub mod view;

pub use api::ApiClient;
pub use dispatcher::{EventDispatcher, Listener};
pub use error::SyncError;
pub use reorder::{Destination, DropOutcome, DropTarget, ReorderCoordinator, RevertOutcome};
pub use store::EntityStore;
pub use transport::{PushStream, PushTransport, WebSocketTransport};
pub use view::{ListColumn, StatusBoard};

/// Fixed delay between reconnection attempts. No backoff, no retry cap: a
/// broken network degrades to eventual reconnection within this window.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// What the rendering collaborator observes: every applied push event, plus
/// recoverable failures worth showing the user.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Push(ServerEvent),
    Error(String),
}

struct SyncState {
    store: EntityStore,
    dispatcher: EventDispatcher,
    coordinator: ReorderCoordinator,
    live: bool,
}

/// The synchronization engine: one client process's view of the shared
/// board, kept consistent with the server through the request/response API
/// and the receive-only push channel.
///
/// All mutable state sits behind one mutex, so mutation is serialized on a
/// single logical thread of control: push events apply strictly in arrival
/// order, and a command's optimistic effect is fully visible before its
/// response is awaited.
pub struct SyncClient {
    api: ApiClient,
    transport: Arc<dyn PushTransport>,
    push_url: String,
    inner: Mutex<SyncState>,
    reader: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ClientEvent>,
}

impl SyncClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn PushTransport>,
    ) -> Result<Arc<Self>, SyncError> {
        let base_url = base_url.into();
        let push_url = transport::push_url(&base_url)?;
        let (events, _) = broadcast::channel(1024);
        Ok(Arc::new(Self {
            api: ApiClient::new(base_url),
            transport,
            push_url,
            inner: Mutex::new(SyncState {
                store: EntityStore::new(),
                dispatcher: EventDispatcher::new(),
                coordinator: ReorderCoordinator::new(),
                live: false,
            }),
            reader: Mutex::new(None),
            events,
        }))
    }

    pub fn with_websocket(base_url: impl Into<String>) -> Result<Arc<Self>, SyncError> {
        Self::new(base_url, Arc::new(WebSocketTransport))
    }

    /// Starts the push read loop. One logical connection per client: if the
    /// loop is already live this is a no-op, so concurrent callers share the
    /// same connection instead of opening their own.
    pub async fn open(self: &Arc<Self>) {
        {
            let mut guard = self.inner.lock().await;
            if guard.live {
                return;
            }
            guard.live = true;
        }
        let client = Arc::clone(self);
        let handle = tokio::spawn(async move { client.read_loop().await });
        *self.reader.lock().await = Some(handle);
    }

    /// Stops the read loop and drops the connection.
    pub async fn close(&self) {
        if let Some(handle) = self.reader.lock().await.take() {
            handle.abort();
        }
        self.inner.lock().await.live = false;
    }

    async fn read_loop(self: Arc<Self>) {
        loop {
            match self.transport.open(&self.push_url).await {
                Ok(mut stream) => {
                    info!(url = %self.push_url, "push channel connected");
                    while let Some(frame) = stream.next_text().await {
                        match frame {
                            Ok(text) => self.apply_frame(&text).await,
                            Err(err) => {
                                warn!("push channel receive failed: {err}");
                                break;
                            }
                        }
                    }
                    info!("push channel closed, scheduling reconnect");
                }
                Err(err) => warn!("push channel connect failed: {err}"),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    async fn apply_frame(&self, text: &str) {
        // Malformed payloads are dropped without closing the connection.
        let event = match serde_json::from_str::<ServerEvent>(text) {
            Ok(event) => event,
            Err(err) => {
                warn!("dropping malformed push payload: {err}");
                return;
            }
        };
        self.apply_push(event).await;
    }

    /// Applies one push event as if it had arrived over the connection:
    /// store mutation first, then rebroadcast to subscribers.
    pub async fn apply_push(&self, event: ServerEvent) {
        {
            let mut guard = self.inner.lock().await;
            let SyncState {
                store, dispatcher, ..
            } = &mut *guard;
            dispatcher.dispatch(store, &event);
        }
        let _ = self.events.send(ClientEvent::Push(event));
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Registers a dispatcher listener for one event kind. Listeners run
    /// synchronously, after the store mutation, in registration order.
    pub async fn register_listener(&self, kind: EventKind, listener: Listener) {
        self.inner.lock().await.dispatcher.register(kind, listener);
    }

    // --- request/response commands; each leaves the store consistent ---

    pub async fn refresh_tasks(
        &self,
        project_id: Option<&ProjectId>,
    ) -> Result<Vec<Task>, SyncError> {
        let tasks = self.api.list_tasks(project_id).await?;
        let mut guard = self.inner.lock().await;
        for task in &tasks {
            guard.store.upsert_task(task.clone());
        }
        Ok(tasks)
    }

    pub async fn create_task(&self, task: NewTask) -> Result<Task, SyncError> {
        let created = self.api.create_task(&task).await?;
        self.inner.lock().await.store.upsert_task(created.clone());
        Ok(created)
    }

    pub async fn update_task(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, SyncError> {
        let updated = self.api.update_task(id, &patch).await?;
        self.inner.lock().await.store.upsert_task(updated.clone());
        Ok(updated)
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), SyncError> {
        self.api.delete_task(id).await?;
        self.inner.lock().await.store.remove_task(id);
        Ok(())
    }

    pub async fn refresh_projects(&self) -> Result<Vec<Project>, SyncError> {
        let projects = self.api.list_projects().await?;
        let mut guard = self.inner.lock().await;
        for project in &projects {
            guard.store.upsert_project(project.clone());
        }
        Ok(projects)
    }

    pub async fn create_project(&self, project: NewProject) -> Result<Project, SyncError> {
        let created = self.api.create_project(&project).await?;
        self.inner
            .lock()
            .await
            .store
            .upsert_project(created.clone());
        Ok(created)
    }

    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), SyncError> {
        self.api.delete_project(id).await?;
        // Cascades locally to the project's lists and tasks.
        self.inner.lock().await.store.remove_project(id);
        Ok(())
    }

    pub async fn refresh_lists(&self, project_id: &ProjectId) -> Result<Vec<TaskList>, SyncError> {
        let lists = self.api.project_lists(project_id).await?;
        let mut guard = self.inner.lock().await;
        for list in &lists {
            guard.store.upsert_list(list.clone());
        }
        Ok(lists)
    }

    pub async fn create_list(
        &self,
        project_id: &ProjectId,
        list: NewList,
    ) -> Result<TaskList, SyncError> {
        let created = self.api.create_list(project_id, &list).await?;
        self.inner.lock().await.store.upsert_list(created.clone());
        Ok(created)
    }

    pub async fn stats(&self) -> Result<Stats, SyncError> {
        self.api.stats().await
    }

    // --- drag-and-drop ---

    pub async fn begin_drag(&self, task_id: &TaskId) -> Result<(), SyncError> {
        let mut guard = self.inner.lock().await;
        let SyncState {
            store, coordinator, ..
        } = &mut *guard;
        coordinator.begin(store, task_id)?;
        Ok(())
    }

    pub async fn cancel_drag(&self) {
        self.inner.lock().await.coordinator.cancel();
    }

    /// Completes a drag gesture. The optimistic move is applied before the
    /// command is awaited, so the caller's next view read already reflects
    /// it; on failure the placement reverts unless a push event superseded
    /// it in the meantime.
    pub async fn drop_task(&self, target: DropTarget) -> Result<(), SyncError> {
        let request = {
            let mut guard = self.inner.lock().await;
            let SyncState {
                store, coordinator, ..
            } = &mut *guard;
            match coordinator.drop_at(store, target)? {
                DropOutcome::Unchanged => return Ok(()),
                DropOutcome::Command(request) => request,
            }
        };

        match self.api.reorder(&request).await {
            Ok(()) => {
                let mut guard = self.inner.lock().await;
                let _ = guard.coordinator.confirm();
                Ok(())
            }
            Err(err) => {
                {
                    let mut guard = self.inner.lock().await;
                    let SyncState {
                        store, coordinator, ..
                    } = &mut *guard;
                    match coordinator.fail(store) {
                        Ok(RevertOutcome::Reverted) => {
                            info!(task_id = %request.task_id, "reorder failed, optimistic move reverted")
                        }
                        Ok(RevertOutcome::Superseded) => {
                            info!(task_id = %request.task_id, "reorder failed, newer state kept")
                        }
                        Err(_) => {}
                    }
                }
                let _ = self
                    .events
                    .send(ClientEvent::Error(format!("reorder command failed: {err}")));
                Err(err)
            }
        }
    }

    // --- derived views, recomputed per call ---

    pub async fn by_status(&self) -> StatusBoard {
        view::by_status(&self.inner.lock().await.store)
    }

    pub async fn by_list(&self, project_id: &ProjectId) -> Vec<ListColumn> {
        view::by_list(&self.inner.lock().await.store, project_id)
    }

    pub async fn task(&self, id: &TaskId) -> Option<Task> {
        self.inner.lock().await.store.task(id).cloned()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
