//! User roles, stored credentials and login sessions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidUserTypeError;

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Candidate,
    Recruiter,
}

impl UserType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Recruiter => "recruiter",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserType {
    type Err = InvalidUserTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "candidate" => Ok(Self::Candidate),
            "recruiter" => Ok(Self::Recruiter),
            _ => Err(InvalidUserTypeError {
                input: s.to_string(),
            }),
        }
    }
}

/// A user record from a local credentials file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub user_type: UserType,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token; absent for local-only logins
    pub token: Option<String>,
    pub email: String,
    pub user_type: UserType,
}

impl Session {
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
