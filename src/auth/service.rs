//! Credential verification, account creation and identity lookup.

use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::auth::session::Identity;
use crate::auth::token::TokenCodec;
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenCodec) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Creates an account. The caller is not signed in afterwards.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<User, AppError> {
        if self.users.exists_by_username(username).await? {
            log::info!("sign-up rejected, username {:?} is taken", username);
            return Err(AppError::DuplicateUsername);
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self.users.insert(username, &password_hash).await?;
        log::info!("registered user {} ({:?})", user.id, user.username);
        Ok(user)
    }

    /// Checks a username/password pair.
    ///
    /// Every failure is reported as `AppError::BadCredentials`, whether the user is
    /// unknown, the password is wrong, or the stored hash cannot be read.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_decoy(password);
                return Err(AppError::BadCredentials);
            }
        };

        match self.hasher.verify(password, &user.password_hash) {
            Ok(true) => Ok(Identity::from(&user)),
            Ok(false) => Err(AppError::BadCredentials),
            Err(e) => {
                log::error!("stored hash for user {} is unusable: {}", user.id, e);
                Err(AppError::BadCredentials)
            }
        }
    }

    /// Authenticates and mints a session token.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Identity, String), AppError> {
        let identity = self.authenticate(username, password).await?;
        let token = self.tokens.issue(&identity)?;
        log::debug!("issued session token for {:?}", identity.username());
        Ok((identity, token))
    }

    /// Builds the identity for a username taken from a verified token.
    pub async fn load_identity(&self, username: &str) -> Result<Identity, AppError> {
        self.users
            .find_by_username(username)
            .await?
            .map(|user| Identity::from(&user))
            .ok_or_else(|| AppError::UsernameNotFound(format!("User {} not found", username)))
    }

    /// Fetches the stored account behind an authenticated identity.
    pub async fn resolve_user(&self, identity: &Identity) -> Result<User, AppError> {
        self.users
            .find_by_username(identity.username())
            .await?
            .ok_or_else(|| AppError::UsernameNotFound("User not found".into()))
    }
}
