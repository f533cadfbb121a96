//! Backend API port interfaces

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::domain::auth::{Registration, Session};
use crate::domain::capture::SubmissionPayload;
use crate::domain::interview::{
    AnswerReview, Application, ApplicationFilters, ApplicationStatus, JobFilters, JobPosting,
    NewJobPosting, PersonalityScores, QuestionSet,
};

/// API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Invalid or expired token. Please log in again.")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result of a successful application submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReceipt {
    pub message: Option<String>,
    pub application_id: Option<String>,
    pub answers: Vec<AnswerReview>,
    pub average_scores: Option<PersonalityScores>,
}

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub email: String,
    pub user_type: String,
}

/// Outcome of a password reset request.
///
/// The backend hands the token back directly instead of emailing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetTicket {
    pub message: String,
    pub reset_token: Option<String>,
}

/// Port for job postings and application submission
#[async_trait]
pub trait JobApi: Send + Sync {
    /// List jobs matching `filters`
    async fn list_jobs(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, ApiError>;

    /// Fetch one job by id
    async fn fetch_job(&self, job_id: &str) -> Result<JobPosting, ApiError>;

    /// Fetch the ordered interview questions for a job
    async fn fetch_questions(&self, job_id: &str) -> Result<QuestionSet, ApiError>;

    /// Bookmark a job for the current candidate
    async fn save_job(&self, job_id: &str, token: &str) -> Result<String, ApiError>;

    /// Create a posting (recruiters only). Returns the new job id.
    async fn create_job(&self, job: &NewJobPosting, token: &str) -> Result<String, ApiError>;

    /// Submit all answers as one multipart request
    async fn submit_application(
        &self,
        job_id: &str,
        token: &str,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, ApiError>;
}

/// Port for reviewing submitted applications
#[async_trait]
pub trait ApplicationApi: Send + Sync {
    async fn job_applications(
        &self,
        job_id: &str,
        filters: &ApplicationFilters,
        token: &str,
    ) -> Result<Vec<Application>, ApiError>;

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        token: &str,
    ) -> Result<String, ApiError>;

    async fn request_revaluation(
        &self,
        application_id: &str,
        token: &str,
    ) -> Result<String, ApiError>;

    async fn candidate_applications(&self, token: &str) -> Result<Vec<Application>, ApiError>;

    /// Download a stored answer video
    async fn fetch_video(&self, filename: &str, token: &str) -> Result<Bytes, ApiError>;
}

/// Port for backend authentication
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError>;

    async fn profile(&self, token: &str) -> Result<Profile, ApiError>;

    /// Create an account. Returns the backend's confirmation message.
    async fn register(&self, registration: &Registration) -> Result<String, ApiError>;

    async fn request_password_reset(&self, email: &str) -> Result<PasswordResetTicket, ApiError>;

    /// Set a new password using a token from `request_password_reset`
    async fn reset_password(&self, reset_token: &str, new_password: &str)
        -> Result<String, ApiError>;
}
