//! Job posting entities

use serde::{Deserialize, Serialize};

use super::question::{Question, QuestionSet};
use crate::domain::error::JobValidationError;

/// Default job type used by the posting form
pub const DEFAULT_JOB_TYPE: &str = "Full-time";

/// A job posting as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recruiter_id: Option<String>,
}

impl JobPosting {
    /// The posting's questions as an ordered set
    pub fn question_set(&self) -> Result<QuestionSet, JobValidationError> {
        QuestionSet::new(self.questions.clone())
    }
}

/// Query filters for listing jobs. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilters {
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub company_name: Option<String>,
    pub recruiter_id: Option<String>,
}

impl JobFilters {
    /// Query string pairs for the set filters
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        [
            ("location", &self.location),
            ("job_type", &self.job_type),
            ("company_name", &self.company_name),
            ("recruiter_id", &self.recruiter_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }
}

/// Recruiter-side payload for creating a job posting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJobPosting {
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub questions: Vec<Question>,
    pub requirements: Vec<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    pub job_type: String,
}

impl NewJobPosting {
    /// Validate the required fields before sending
    pub fn validate(&self) -> Result<(), JobValidationError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("company_name", &self.company_name),
            ("location", &self.location),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(JobValidationError::MissingField(name));
            }
        }

        if self.questions.is_empty() {
            return Err(JobValidationError::EmptyQuestionSet);
        }

        for (index, question) in self.questions.iter().enumerate() {
            if question.text().trim().is_empty() {
                return Err(JobValidationError::EmptyQuestion { index });
            }
            if question.time_limit_seconds() == 0 {
                return Err(JobValidationError::ZeroTimeLimit { index });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting() -> NewJobPosting {
        NewJobPosting {
            title: "Backend Engineer".into(),
            description: "Build APIs".into(),
            company_name: "Acme".into(),
            questions: vec![Question::new("Introduce yourself", 60)],
            requirements: vec!["Rust".into()],
            location: "Remote".into(),
            salary_range: None,
            job_type: DEFAULT_JOB_TYPE.into(),
        }
    }

    #[test]
    fn valid_posting_passes() {
        assert!(posting().validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let job = NewJobPosting {
            title: "  ".into(),
            ..posting()
        };
        assert_eq!(
            job.validate().unwrap_err(),
            JobValidationError::MissingField("title")
        );
    }

    #[test]
    fn questions_are_required() {
        let job = NewJobPosting {
            questions: vec![],
            ..posting()
        };
        assert_eq!(
            job.validate().unwrap_err(),
            JobValidationError::EmptyQuestionSet
        );
    }

    #[test]
    fn zero_time_limit_is_rejected() {
        let job = NewJobPosting {
            questions: vec![Question::new("ok", 30), Question::new("bad", 0)],
            ..posting()
        };
        assert_eq!(
            job.validate().unwrap_err(),
            JobValidationError::ZeroTimeLimit { index: 1 }
        );
    }

    #[test]
    fn filters_only_emit_set_values() {
        let filters = JobFilters {
            location: Some("Remote".into()),
            company_name: Some("Acme".into()),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("location", "Remote".to_string()),
                ("company_name", "Acme".to_string())
            ]
        );
        assert!(JobFilters::default().to_query().is_empty());
    }

    #[test]
    fn posting_deserializes_with_missing_optionals() {
        let job: JobPosting = serde_json::from_str(
            r#"{"_id": "j1", "title": "Dev", "questions": [{"question_text": "Hi", "time_limit": 30}]}"#,
        )
        .unwrap();
        assert_eq!(job.id, "j1");
        assert_eq!(job.question_set().unwrap().len(), 1);
        assert!(job.salary_range.is_none());
    }
}
