//! Persistence seams for users and tasks.
//!
//! Handlers and the authentication service only see these traits. Each operation is
//! expected to be atomic on its own; nothing here spans more than one row.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{CreateTaskRequest, Page, Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Inserts a new user. Fails with `AppError::DuplicateUsername` if the name is taken.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short name of the backing storage, reported by `/health`.
    fn backend(&self) -> &'static str;

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError>;

    /// Tasks owned by `owner_id` in ascending id order, windowed by `page`.
    async fn find_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Task>, AppError>;

    async fn insert(&self, owner_id: i64, task: CreateTaskRequest) -> Result<Task, AppError>;

    /// Persists the mutable fields of an existing task and returns the stored row.
    async fn save(&self, task: &Task) -> Result<Task, AppError>;

    /// Deletes the task if `owner_id` owns it. Returns the number of rows removed.
    async fn delete(&self, id: i64, owner_id: i64) -> Result<u64, AppError>;
}
