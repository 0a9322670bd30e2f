use serde::Serialize;
use sqlx::FromRow;

/// A registered account.
///
/// The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}
