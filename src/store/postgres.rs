use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{CreateTaskRequest, Page, Task, User};

const TASK_COLUMNS: &str =
    "id, user_id, title, is_completed, is_expired, created_time, deadline, context";

/// Postgres-backed store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        // A concurrent sign-up for the same name surfaces as a unique violation,
        // which `From<sqlx::Error>` turns into `DuplicateUsername`.
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn insert(&self, owner_id: i64, task: CreateTaskRequest) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (user_id, title, deadline, context) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .bind(task.title)
        .bind(task.deadline)
        .bind(task.context)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn save(&self, task: &Task) -> Result<Task, AppError> {
        // user_id and created_time are not in the SET list.
        let saved = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET title = $1, is_completed = $2, is_expired = $3, deadline = $4, \
             context = $5 WHERE id = $6 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(task.is_completed)
        .bind(task.is_expired)
        .bind(task.deadline)
        .bind(&task.context)
        .bind(task.id)
        .fetch_optional(&self.pool)
        .await?;
        saved.ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
