//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{Task, TaskId, TaskStatus, WorkItem},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::tenancy::CompanyName;

/// Thread-safe in-memory task repository with one partition per company.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<CompanyName, CompanyPartition>>>,
}

/// Tasks of one company, remembering insertion order.
#[derive(Debug, Default)]
struct CompanyPartition {
    tasks: HashMap<TaskId, Task>,
    insertion_order: Vec<TaskId>,
}

impl CompanyPartition {
    fn ordered(&self) -> impl Iterator<Item = &Task> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.tasks.get(id))
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> TaskRepositoryResult<RwLockReadGuard<'_, HashMap<CompanyName, CompanyPartition>>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(
        &self,
    ) -> TaskRepositoryResult<RwLockWriteGuard<'_, HashMap<CompanyName, CompanyPartition>>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn collect_matching(
        &self,
        company: &CompanyName,
        predicate: impl Fn(&Task) -> bool,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .get(company)
            .map(|partition| {
                partition
                    .ordered()
                    .filter(|task| predicate(*task))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, company: &CompanyName, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let partition = state.entry(company.clone()).or_default();
        if partition.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        partition.insertion_order.push(task.id());
        partition.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, company: &CompanyName, task: &Task) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let stored = state
            .get_mut(company)
            .and_then(|partition| partition.tasks.get_mut(&task.id()))
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        if stored.version() != task.version() {
            return Err(TaskRepositoryError::VersionConflict {
                task_id: task.id(),
                expected: task.version(),
            });
        }

        let next_version = task.version() + 1;
        let mut persisted = task.clone();
        persisted.mark_persisted(next_version);
        *stored = persisted;
        Ok(next_version)
    }

    async fn find_by_id(
        &self,
        company: &CompanyName,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .get(company)
            .and_then(|partition| partition.tasks.get(&id))
            .cloned())
    }

    async fn find_by_status(
        &self,
        company: &CompanyName,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.collect_matching(company, |task| task.status() == status)
    }

    async fn find_by_names(
        &self,
        company: &CompanyName,
        names: &[String],
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.collect_matching(company, |task| {
            names.iter().any(|name| name.as_str() == task.name())
        })
    }

    async fn find_all(&self, company: &CompanyName) -> TaskRepositoryResult<Vec<Task>> {
        self.collect_matching(company, |_| true)
    }
}
