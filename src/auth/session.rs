//! Request-scoped identity.
//!
//! A `Session` is stored in the request extensions by `IdentityFilter` and lives exactly
//! as long as the request. Nothing here is shared between requests.

use actix_web::HttpMessage;

use crate::models::User;

/// Capabilities granted to an identity. Every account carries the implicit `User` authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authority {
    User,
}

/// A verified user, as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    authorities: Vec<Authority>,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            authorities: vec![Authority::User],
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity::new(user.username.clone())
    }
}

/// Outcome of identity resolution for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// Reads the session attached to a request, `Anonymous` if none was attached.
    pub fn of<R: HttpMessage>(req: &R) -> Session {
        req.extensions().get::<Session>().cloned().unwrap_or_default()
    }

    /// Replaces the session attached to a request.
    pub fn install<R: HttpMessage>(self, req: &R) {
        req.extensions_mut().insert(self);
    }
}
