use crate::error::AppError;
use bcrypt::{hash, verify};

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

/// bcrypt hashing with a fixed cost.
///
/// Holds a decoy digest at the same cost so a sign-in for an unknown username can burn
/// the same amount of work as a wrong password.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    decoy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let decoy_hash = hash_password(DECOY_PASSWORD, cost)?;
        Ok(Self { cost, decoy_hash })
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_password(password, self.cost)
    }

    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        verify_password(password, hashed_password)
    }

    /// Runs a verification whose result is thrown away.
    pub fn verify_decoy(&self, password: &str) {
        let _ = verify(password, &self.decoy_hash);
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}
