use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

const DEFAULT_RANGE_FROM: i64 = 1;
const DEFAULT_RANGE_TO: i64 = 10;

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier.
    pub id: i64,
    /// Owner of the task. Fixed at creation.
    pub user_id: i64,
    pub title: String,
    pub is_completed: bool,
    pub is_expired: bool,
    /// Set once by the store when the task is inserted.
    pub created_time: NaiveDateTime,
    pub deadline: Option<NaiveDateTime>,
    pub context: Option<String>,
}

/// Payload for `POST /user/new-task`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// ISO-8601 local timestamp, e.g. `2023-12-05T01:16:30`.
    pub deadline: Option<NaiveDateTime>,
    #[validate(length(max = 1000))]
    pub context: Option<String>,
}

/// Sparse update for `PATCH /user/edit-task/{id}`.
///
/// Absent fields leave the task untouched and unknown keys are ignored. The two flags
/// accept either JSON booleans or their string spelling; a string other than `"true"`
/// (any case) reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_expired: Option<bool>,
    pub deadline: Option<NaiveDateTime>,
    #[validate(length(max = 1000))]
    pub context: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TaskUpdate::default()
    }

    /// Copies every present field onto `task`. Identity, owner and creation time are never touched.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
        }
        if let Some(is_expired) = self.is_expired {
            task.is_expired = is_expired;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = Some(deadline);
        }
        if let Some(context) = self.context {
            task.context = Some(context);
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<BoolOrString>::deserialize(deserializer)?;
    Ok(value.map(|value| match value {
        BoolOrString::Bool(flag) => flag,
        BoolOrString::Text(text) => text.eq_ignore_ascii_case("true"),
    }))
}

/// Query parameters for `GET /user/tasks`: a 1-indexed, inclusive `from..=to` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TaskRange {
    #[serde(default = "default_range_from")]
    pub from: i64,
    #[serde(default = "default_range_to")]
    pub to: i64,
}

fn default_range_from() -> i64 {
    DEFAULT_RANGE_FROM
}

fn default_range_to() -> i64 {
    DEFAULT_RANGE_TO
}

impl Default for TaskRange {
    fn default() -> Self {
        Self {
            from: DEFAULT_RANGE_FROM,
            to: DEFAULT_RANGE_TO,
        }
    }
}

/// Offset/limit pair handed to the task store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl TaskRange {
    /// Converts the window into an offset/limit page, rejecting non-positive or reversed bounds.
    pub fn page(&self) -> Result<Page, AppError> {
        if self.from <= 0 || self.to <= 0 || self.from > self.to {
            return Err(AppError::InvalidRange);
        }
        Ok(Page {
            offset: self.from - 1,
            limit: self.to - self.from + 1,
        })
    }
}
