//! HTTP client for the interview backend

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::envelope::{decode_envelope, AuthContext, Envelope};
use crate::application::ports::{
    ApiError, ApplicationApi, AuthApi, JobApi, PasswordResetTicket, Profile, SubmissionReceipt,
};
use crate::domain::auth::{AccountProfile, Registration, Session, UserType};
use crate::domain::capture::SubmissionPayload;
use crate::domain::config::DEFAULT_API_URL;
use crate::domain::interview::{
    AnswerReview, Application, ApplicationFilters, ApplicationStatus, JobFilters, JobPosting,
    NewJobPosting, PersonalityScores, QuestionSet,
};

// Request bodies

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// `POST /register/{candidate,recruiter}`; role fields are flattened in
#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    skills: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    experience: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a str>,
}

impl<'a> From<&'a Registration> for RegisterRequest<'a> {
    fn from(registration: &'a Registration) -> Self {
        let mut request = Self {
            username: registration.username.trim(),
            email: registration.email.trim(),
            password: &registration.password,
            skills: None,
            experience: None,
            company_name: None,
            position: None,
        };
        match &registration.profile {
            AccountProfile::Candidate { skills, experience } => {
                request.skills = Some(skills.as_slice());
                request.experience = experience.as_deref();
            }
            AccountProfile::Recruiter {
                company_name,
                position,
            } => {
                request.company_name = Some(company_name.as_str());
                request.position = Some(position.as_str());
            }
        }
        request
    }
}

#[derive(Debug, Serialize)]
struct ResetRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusUpdateRequest {
    status: ApplicationStatus,
}

// Response bodies (fields next to `success`/`message`)

#[derive(Debug, Deserialize)]
struct JobsBody {
    #[serde(default)]
    jobs: Vec<JobPosting>,
}

#[derive(Debug, Deserialize)]
struct CreatedJobBody {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct ApplicationsBody {
    #[serde(default)]
    applications: Vec<Application>,
}

#[derive(Debug, Deserialize)]
struct SubmissionBody {
    #[serde(default)]
    application_id: Option<String>,
    #[serde(default)]
    answers: Vec<AnswerReview>,
    #[serde(default)]
    average_scores: Option<PersonalityScores>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: String,
    user_type: String,
}

#[derive(Debug, Deserialize)]
struct ResetTicketBody {
    #[serde(default)]
    reset_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileBody {
    email: String,
    user_type: String,
}

/// reqwest-backed implementation of the backend ports
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for HttpApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl HttpApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://host:5000/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    async fn envelope(response: Response, context: AuthContext) -> Result<Envelope, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode_envelope(status, &text, context)
    }

    async fn get_authorized(&self, path: &str, token: &str) -> Result<Envelope, ApiError> {
        let request = self.client.get(self.url(path)).bearer_auth(token);
        let response = Self::send(request).await?;
        Self::envelope(response, AuthContext::Bearer).await
    }

    async fn post_public<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Envelope, ApiError> {
        let request = self.client.post(self.url(path)).json(body);
        let response = Self::send(request).await?;
        Self::envelope(response, AuthContext::Login).await
    }

    async fn post_authorized(&self, path: &str, token: &str) -> Result<Envelope, ApiError> {
        let request = self.client.post(self.url(path)).bearer_auth(token);
        let response = Self::send(request).await?;
        Self::envelope(response, AuthContext::Bearer).await
    }

    /// Build the multipart form, one `video_{i}` part per answer
    fn build_form(payload: &SubmissionPayload) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (field, artifact) in payload.fields() {
            let part = Part::stream_with_length(
                artifact.data().clone(),
                artifact.size_bytes() as u64,
            )
            .file_name(artifact.filename().to_string())
            .mime_str(artifact.mime_type().as_str())
            .map_err(|e| ApiError::Parse(format!("invalid content type: {}", e)))?;
            form = form.part(field, part);
        }
        Ok(form)
    }
}

#[async_trait]
impl JobApi for HttpApiClient {
    async fn list_jobs(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, ApiError> {
        let request = self.client.get(self.url("jobs")).query(&filters.to_query());
        let response = Self::send(request).await?;
        let body: JobsBody = Self::envelope(response, AuthContext::Bearer)
            .await?
            .into_body()?;
        Ok(body.jobs)
    }

    async fn fetch_job(&self, job_id: &str) -> Result<JobPosting, ApiError> {
        self.list_jobs(&JobFilters::default())
            .await?
            .into_iter()
            .find(|job| job.id == job_id)
            .ok_or_else(|| ApiError::NotFound(format!("job {}", job_id)))
    }

    async fn fetch_questions(&self, job_id: &str) -> Result<QuestionSet, ApiError> {
        let job = self.fetch_job(job_id).await?;
        job.question_set().map_err(|_| {
            ApiError::Rejected(format!("Job {} has no interview questions", job_id))
        })
    }

    async fn save_job(&self, job_id: &str, token: &str) -> Result<String, ApiError> {
        let envelope = self
            .post_authorized(&format!("jobs/{}/save", job_id), token)
            .await?;
        Ok(envelope.message_or("Job saved successfully"))
    }

    async fn create_job(&self, job: &NewJobPosting, token: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url("jobs"))
            .bearer_auth(token)
            .json(job);
        let response = Self::send(request).await?;
        let body: CreatedJobBody = Self::envelope(response, AuthContext::Bearer)
            .await?
            .into_body()?;
        Ok(body.job_id)
    }

    async fn submit_application(
        &self,
        job_id: &str,
        token: &str,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, ApiError> {
        let form = Self::build_form(payload)?;

        tracing::debug!(
            job_id,
            answers = payload.len(),
            bytes = payload.total_bytes(),
            "uploading application"
        );

        let request = self
            .client
            .post(self.url(&format!("jobs/{}/apply", job_id)))
            .bearer_auth(token)
            .multipart(form);
        let response = Self::send(request).await?;
        let envelope = Self::envelope(response, AuthContext::Bearer).await?;
        let message = envelope.message.clone();
        let body: SubmissionBody = envelope.into_body()?;

        Ok(SubmissionReceipt {
            message,
            application_id: body.application_id,
            answers: body.answers,
            average_scores: body.average_scores,
        })
    }
}

#[async_trait]
impl ApplicationApi for HttpApiClient {
    async fn job_applications(
        &self,
        job_id: &str,
        filters: &ApplicationFilters,
        token: &str,
    ) -> Result<Vec<Application>, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("jobs/{}/applications", job_id)))
            .bearer_auth(token)
            .query(&filters.to_query());
        let response = Self::send(request).await?;
        let body: ApplicationsBody = Self::envelope(response, AuthContext::Bearer)
            .await?
            .into_body()?;
        Ok(body.applications)
    }

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        token: &str,
    ) -> Result<String, ApiError> {
        let request = self
            .client
            .put(self.url(&format!("applications/{}/status", application_id)))
            .bearer_auth(token)
            .json(&StatusUpdateRequest { status });
        let response = Self::send(request).await?;
        let envelope = Self::envelope(response, AuthContext::Bearer).await?;
        Ok(envelope.message_or("Application status updated"))
    }

    async fn request_revaluation(
        &self,
        application_id: &str,
        token: &str,
    ) -> Result<String, ApiError> {
        let envelope = self
            .post_authorized(&format!("applications/{}/revaluate", application_id), token)
            .await?;
        Ok(envelope.message_or("Revaluation requested"))
    }

    async fn candidate_applications(&self, token: &str) -> Result<Vec<Application>, ApiError> {
        let body: ApplicationsBody = self
            .get_authorized("candidate/applications", token)
            .await?
            .into_body()?;
        Ok(body.applications)
    }

    async fn fetch_video(&self, filename: &str, token: &str) -> Result<Bytes, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("videos/{}", filename)))
            .bearer_auth(token);
        let response = Self::send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match decode_envelope(status, &text, AuthContext::Bearer) {
                Err(e) => e,
                Ok(_) => ApiError::Server {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = self
            .client
            .post(self.url("login"))
            .json(&LoginRequest { email, password });
        let response = Self::send(request).await?;
        let body: LoginBody = Self::envelope(response, AuthContext::Login)
            .await?
            .into_body()?;

        let user_type: UserType = body
            .user_type
            .parse()
            .map_err(|e: crate::domain::error::InvalidUserTypeError| {
                ApiError::Parse(e.to_string())
            })?;

        Ok(Session {
            token: Some(body.token),
            email: email.to_string(),
            user_type,
        })
    }

    async fn profile(&self, token: &str) -> Result<Profile, ApiError> {
        let body: ProfileBody = self.get_authorized("profile", token).await?.into_body()?;
        Ok(Profile {
            email: body.email,
            user_type: body.user_type,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        let user_type = registration.user_type();
        let envelope = self
            .post_public(
                &format!("register/{}", user_type),
                &RegisterRequest::from(registration),
            )
            .await?;
        tracing::debug!(email = registration.email.trim(), %user_type, "account registered");
        Ok(envelope.message_or("Registered successfully"))
    }

    async fn request_password_reset(&self, email: &str) -> Result<PasswordResetTicket, ApiError> {
        let envelope = self
            .post_public("request-password-reset", &ResetRequest { email: email.trim() })
            .await?;
        let message = envelope.message_or("Password reset token generated");
        let body: ResetTicketBody = envelope.into_body()?;
        Ok(PasswordResetTicket {
            message,
            reset_token: body.reset_token.filter(|t| !t.is_empty()),
        })
    }

    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<String, ApiError> {
        let envelope = self
            .post_public(
                "reset-password",
                &ResetPasswordRequest {
                    token: reset_token.trim(),
                    new_password,
                },
            )
            .await?;
        Ok(envelope.message_or("Password reset successful"))
    }
}
