use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use study_core::model::Task;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Backing store for the task list.
///
/// The list is read and written as a whole: callers load a snapshot, change
/// it, and hand the full list back.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Load every task in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a record cannot be decoded.
    async fn load_tasks(&self) -> Result<Vec<Task>, StorageError>;

    /// Replace the stored list with `tasks`, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for duplicate ids, or other storage errors.
    async fn replace_tasks(&self, tasks: &[Task]) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

pub(crate) fn ensure_unique_ids(tasks: &[Task]) -> Result<(), StorageError> {
    let mut seen = std::collections::HashSet::with_capacity(tasks.len());
    if tasks.iter().all(|task| seen.insert(task.id())) {
        Ok(())
    } else {
        Err(StorageError::Conflict)
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        let guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn replace_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        ensure_unique_ids(tasks)?;
        let mut guard = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = tasks.to_vec();
        Ok(())
    }
}

/// Bundles repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub tasks: Arc<dyn TaskRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let tasks: Arc<dyn TaskRepository> = Arc::new(InMemoryRepository::new());
        Self { tasks }
    }
}
