pub mod commands;
pub mod errors;
pub mod form;
pub mod helpers;
pub mod storage;
pub mod suggest;
pub mod types;

use crate::shared::errors::StorageError;
use errors::TasksError;
use storage::ListsPersistence;
use types::{NewTask, Task, TaskList, TaskPatch, TasksData};

/// In-memory list collection mirrored to a persistence port after every
/// successful mutation. Memory stays authoritative when a save fails.
pub struct TasksStore {
    data: TasksData,
    persistence: Box<dyn ListsPersistence>,
    persist_error: Option<String>,
}

impl TasksStore {
    /// Loads the stored collection. On first run, when nothing was ever
    /// saved, the default list is seeded and persisted. A saved empty
    /// collection stays empty.
    pub fn open(persistence: Box<dyn ListsPersistence>) -> Result<Self, StorageError> {
        let snapshot = persistence.load_snapshot()?;
        let first_run = snapshot.is_none();
        let mut store = Self {
            data: TasksData::new(snapshot.unwrap_or_default()),
            persistence,
            persist_error: None,
        };

        if first_run {
            let list = commands::default_list();
            tracing::info!(target: "tasks", list_id = %list.id, "Seeding default list");
            store.data.lists.push(list);
            store.persist();
        }

        tracing::info!(
            target: "tasks",
            "Tasks store initialized: {} lists, {} tasks",
            store.data.lists.len(),
            store.task_count()
        );
        Ok(store)
    }

    pub fn lists(&self) -> &[TaskList] {
        &self.data.lists
    }

    pub fn data(&self) -> &TasksData {
        &self.data
    }

    pub fn list(&self, id: &str) -> Result<&TaskList, TasksError> {
        helpers::find_list(&self.data, id).ok_or_else(|| TasksError::list_not_found(id))
    }

    pub fn task(&self, id: &str) -> Result<&Task, TasksError> {
        helpers::find_task(&self.data, id).ok_or_else(|| TasksError::task_not_found(id))
    }

    pub fn task_count(&self) -> usize {
        self.data.lists.iter().map(|l| l.tasks.len()).sum()
    }

    /// Open tasks of a list, in arrival order.
    pub fn pending_tasks(&self, list_id: &str) -> Result<Vec<&Task>, TasksError> {
        Ok(self.list(list_id)?.tasks.iter().filter(|t| !t.completed).collect())
    }

    /// Finished tasks of a list, in arrival order.
    pub fn completed_tasks(&self, list_id: &str) -> Result<Vec<&Task>, TasksError> {
        Ok(self.list(list_id)?.tasks.iter().filter(|t| t.completed).collect())
    }

    pub fn create_list(&mut self, name: &str) -> Result<TaskList, TasksError> {
        self.apply(|data| commands::list_create(data, name))
    }

    pub fn rename_list(&mut self, id: &str, name: &str) -> Result<(), TasksError> {
        self.apply(|data| commands::list_rename(data, id, name))
    }

    /// Destructive. Callers confirm with the user first.
    pub fn delete_list(&mut self, id: &str) -> Result<TaskList, TasksError> {
        self.apply(|data| commands::list_delete(data, id))
    }

    pub fn create_task(&mut self, list_id: &str, input: NewTask) -> Result<Task, TasksError> {
        self.apply(|data| commands::task_create(data, list_id, input))
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task, TasksError> {
        self.apply(|data| commands::task_update(data, id, patch))
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<bool, TasksError> {
        self.apply(|data| commands::task_toggle_complete(data, id))
    }

    /// Destructive. Callers confirm with the user first.
    pub fn delete_task(&mut self, id: &str) -> Result<Task, TasksError> {
        self.apply(|data| commands::task_delete(data, id))
    }

    pub fn add_tag(&mut self, task_id: &str, tag: &str) -> Result<bool, TasksError> {
        self.apply(|data| commands::task_add_tag(data, task_id, tag))
    }

    pub fn remove_tag(&mut self, task_id: &str, tag: &str) -> Result<bool, TasksError> {
        self.apply(|data| commands::task_remove_tag(data, task_id, tag))
    }

    /// Last save failure, if the most recent save did not succeed. Reading
    /// it clears it.
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.persist_error.take()
    }

    fn apply<T>(
        &mut self,
        command: impl FnOnce(&mut TasksData) -> Result<T, TasksError>,
    ) -> Result<T, TasksError> {
        match command(&mut self.data) {
            Ok(value) => {
                self.persist();
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(target: "tasks", "Mutation rejected: {}", e);
                Err(e)
            }
        }
    }

    fn persist(&mut self) {
        match self.persistence.save(&self.data.lists) {
            Ok(()) => self.persist_error = None,
            Err(e) => {
                tracing::warn!(target: "tasks::storage", "Failed to save lists: {}", e);
                self.persist_error = Some(e.to_string());
            }
        }
    }
}
