pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod session;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::CurrentIdentity;
pub use middleware::IdentityFilter;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use session::{Authority, Identity, Session};
pub use token::{Claims, TokenCodec, TokenError};

lazy_static! {
    // Letters, digits, underscores, dots and hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap();
}

/// Body of `POST /auth/sign-up` and `POST /auth/sign-in`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Between 1 and 64 characters: letters, digits, underscores, dots or hyphens.
    /// Compared case-sensitively.
    #[validate(
        length(min = 1, max = 64),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may contain letters, digits, underscores, dots or hyphens"
        )
    )]
    pub username: String,
    /// Between 1 and 128 characters.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
