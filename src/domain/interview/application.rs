//! Submitted application entities (recruiter review side)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidStatusError;

/// Big Five personality scores produced by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityScores {
    pub extraversion: f64,
    pub neuroticism: f64,
    pub agreeableness: f64,
    pub conscientiousness: f64,
    pub openness: f64,
}

impl PersonalityScores {
    /// Trait name and score pairs in display order
    pub fn traits(&self) -> [(&'static str, f64); 5] {
        [
            ("Extraversion", self.extraversion),
            ("Neuroticism", self.neuroticism),
            ("Agreeableness", self.agreeableness),
            ("Conscientiousness", self.conscientiousness),
            ("Openness", self.openness),
        ]
    }
}

/// One scored answer within an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerReview {
    pub question_index: usize,
    pub video_url: String,
    #[serde(default)]
    pub personality_scores: PersonalityScores,
}

impl AnswerReview {
    /// The stored video's file name (last path segment of `video_url`)
    pub fn video_filename(&self) -> &str {
        self.video_url
            .rsplit('/')
            .next()
            .unwrap_or(self.video_url.as_str())
    }
}

/// Recruiter decision on an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    /// Wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shortlisted => "shortlisted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = InvalidStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "shortlisted" => Ok(Self::Shortlisted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(InvalidStatusError {
                input: s.to_string(),
                valid: "pending, shortlisted, rejected",
            }),
        }
    }
}

/// State of a candidate's revaluation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevaluationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RevaluationStatus {
    /// Wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RevaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevaluationStatus {
    type Err = InvalidStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(InvalidStatusError {
                input: s.to_string(),
                valid: "pending, approved, rejected",
            }),
        }
    }
}

/// A submitted application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,
    pub job_id: String,
    pub candidate_id: String,
    #[serde(default)]
    pub answers: Vec<AnswerReview>,
    #[serde(default)]
    pub average_scores: PersonalityScores,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub revaluation_requested: bool,
    #[serde(default)]
    pub revaluation_status: Option<RevaluationStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Query filters for a job's applications
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilters {
    pub status: Option<ApplicationStatus>,
    pub revaluation_status: Option<RevaluationStatus>,
}

impl ApplicationFilters {
    /// Query string pairs for the set filters
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        if let Some(revaluation) = self.revaluation_status {
            query.push(("revaluation_status", revaluation.to_string()));
        }
        query
    }
}
