//! Login, registration and password reset

use thiserror::Error;
use tracing::info;

use crate::domain::auth::{validate_email, Registration, Session, UserType};
use crate::domain::error::RegistrationError;

use super::ports::{ApiError, AuthApi, CredentialError, CredentialStore, PasswordResetTicket};

/// Errors from the account use cases
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Authentication request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Credential store error: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Invalid registration: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No local credential store configured")]
    NoCredentialStore,

    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Not logged in. Run 'interview-capture login <email>' first")]
    NotLoggedIn,

    #[error("This action requires a {required} account (logged in as {actual})")]
    Forbidden { required: UserType, actual: UserType },
}

/// Account operations against the backend, or against an injected
/// local user store
pub struct LoginUseCase<A, C>
where
    A: AuthApi,
    C: CredentialStore,
{
    api: A,
    credentials: Option<C>,
}

impl<A, C> LoginUseCase<A, C>
where
    A: AuthApi,
    C: CredentialStore,
{
    /// Create a use case that only logs in remotely
    pub fn new(api: A) -> Self {
        Self {
            api,
            credentials: None,
        }
    }

    /// Create a use case with a local credential store
    pub fn with_credentials(api: A, credentials: C) -> Self {
        Self {
            api,
            credentials: Some(credentials),
        }
    }

    /// Exchange email and password for a bearer-token session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let session = self.api.login(email, password).await?;
        info!(email = %session.email, user_type = %session.user_type, "Logged in");
        Ok(session)
    }

    /// Check credentials against the local store; the session has no token
    pub fn login_local(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let store = self.credentials.as_ref().ok_or(AuthError::NoCredentialStore)?;
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = store
            .verify(email, password)
            .ok_or(AuthError::InvalidCredentials)?;
        info!(email = %user.email, user_type = %user.user_type, "Verified local credentials");
        Ok(Session {
            token: None,
            email: user.email,
            user_type: user.user_type,
        })
    }

    /// Add a user to the local store
    pub async fn register_local(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<(), AuthError> {
        let store = self.credentials.as_ref().ok_or(AuthError::NoCredentialStore)?;
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        store.register(email.trim(), password, user_type).await?;
        Ok(())
    }

    /// Create a backend account; returns the server's confirmation
    pub async fn register_remote(&self, registration: &Registration) -> Result<String, AuthError> {
        registration.validate()?;
        let message = self.api.register(registration).await?;
        info!(
            email = registration.email.trim(),
            user_type = %registration.user_type(),
            "Registered account"
        );
        Ok(message)
    }

    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<PasswordResetTicket, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        validate_email(email)?;

        let ticket = self.api.request_password_reset(email).await?;
        info!(email, token_issued = ticket.reset_token.is_some(), "Password reset requested");
        Ok(ticket)
    }

    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<String, AuthError> {
        let reset_token = reset_token.trim();
        if reset_token.is_empty() {
            return Err(AuthError::MissingField("token"));
        }
        if new_password.is_empty() {
            return Err(AuthError::MissingField("new_password"));
        }

        let message = self.api.reset_password(reset_token, new_password).await?;
        info!("Password reset");
        Ok(message)
    }
}

/// Client-side role guard
pub fn require_role(actual: Option<UserType>, required: UserType) -> Result<(), AuthError> {
    match actual {
        None => Err(AuthError::NotLoggedIn),
        Some(actual) if actual != required => Err(AuthError::Forbidden { required, actual }),
        Some(_) => Ok(()),
    }
}
