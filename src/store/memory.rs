//! In-process store used when no database is configured, and by the test suites.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{CreateTaskRequest, Page, Task, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_task_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user and every task they own.
    pub async fn remove_user(&self, username: &str) -> Option<User> {
        let mut tables = self.tables.write().await;
        let user = tables.users.remove(username)?;
        tables.tasks.retain(|_, task| task.user_id != user.id);
        Some(user)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.tables.read().await.users.contains_key(username))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(username) {
            return Err(AppError::DuplicateUsername);
        }
        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Task>, AppError> {
        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        Ok(self
            .tables
            .read()
            .await
            .tasks
            .values()
            .filter(|task| task.user_id == owner_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert(&self, owner_id: i64, task: CreateTaskRequest) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        tables.last_task_id += 1;
        let task = Task {
            id: tables.last_task_id,
            user_id: owner_id,
            title: task.title,
            is_completed: false,
            is_expired: false,
            created_time: Utc::now().naive_utc(),
            deadline: task.deadline,
            context: task.context,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn save(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        stored.title = task.title.clone();
        stored.is_completed = task.is_completed;
        stored.is_expired = task.is_expired;
        stored.deadline = task.deadline;
        stored.context = task.context.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .tasks
            .get(&id)
            .map_or(false, |task| task.user_id == owner_id);
        if !owned {
            return Ok(0);
        }
        tables.tasks.remove(&id);
        Ok(1)
    }
}
