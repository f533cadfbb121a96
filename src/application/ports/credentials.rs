//! Local credential store port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::auth::{StoredUser, UserType};

/// Credential store errors
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("Failed to read credentials: {0}")]
    ReadError(String),

    #[error("Failed to write credentials: {0}")]
    WriteError(String),

    #[error("Failed to parse credentials: {0}")]
    ParseError(String),

    #[error("User already exists: {0}")]
    AlreadyExists(String),
}

/// Port for an explicitly injected user store.
///
/// Loaded once at startup, then queried per login attempt.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load users from backing storage, replacing the in-memory set
    async fn load(&self) -> Result<usize, CredentialError>;

    /// Look up a user by email and password
    fn verify(&self, email: &str, password: &str) -> Option<StoredUser>;

    /// Add a user and persist the store
    async fn register(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<(), CredentialError>;
}
