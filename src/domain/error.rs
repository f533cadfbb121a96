//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an unknown application status is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid status: \"{input}\". Valid statuses are: {valid}")]
pub struct InvalidStatusError {
    pub input: String,
    pub valid: &'static str,
}

/// Error when an unknown user type is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid user type: \"{input}\". Valid user types are: candidate, recruiter")]
pub struct InvalidUserTypeError {
    pub input: String,
}

/// Error when a job posting or question set fails validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("A job needs at least one interview question")]
    EmptyQuestionSet,

    #[error("Question {index} has no text")]
    EmptyQuestion { index: usize },

    #[error("Question {index} must have a time limit greater than zero")]
    ZeroTimeLimit { index: usize },
}

/// Error when an account registration fails validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address: \"{0}\"")]
    InvalidEmail(String),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
