//! Job command handlers

use crate::application::ports::JobApi;
use crate::domain::auth::UserType;
use crate::domain::config::AppConfig;
use crate::domain::interview::{JobFilters, NewJobPosting, Question};
use crate::domain::recording::DEFAULT_TIME_LIMIT_SECS;

use super::app::{ensure_role, session_token, CommandError};
use super::args::{CreateJobArgs, JobsAction};
use super::presenter::Presenter;

/// Handle `jobs` subcommands
pub async fn handle_jobs_command<A: JobApi>(
    action: JobsAction,
    api: &A,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    match action {
        JobsAction::List {
            location,
            job_type,
            company_name,
            recruiter_id,
        } => {
            let filters = JobFilters {
                location,
                job_type,
                company_name,
                recruiter_id,
            };
            let jobs = api.list_jobs(&filters).await?;
            if jobs.is_empty() {
                presenter.info("No job postings found");
            }
            for job in &jobs {
                presenter.job_line(job);
            }
            Ok(())
        }
        JobsAction::Show { job_id } => {
            let job = api.fetch_job(&job_id).await?;
            presenter.job_details(&job);
            Ok(())
        }
        JobsAction::Save { job_id } => {
            ensure_role(config, UserType::Candidate)?;
            let token = session_token(config)?;
            let message = api.save_job(&job_id, token).await?;
            presenter.success(&message);
            Ok(())
        }
        JobsAction::Create(args) => {
            ensure_role(config, UserType::Recruiter)?;
            let token = session_token(config)?;
            let posting = new_posting(args)?;

            presenter.start_spinner("Creating job posting...");
            match api.create_job(&posting, token).await {
                Ok(job_id) => {
                    presenter.spinner_success("Job posting created");
                    presenter.output(&job_id);
                    Ok(())
                }
                Err(e) => {
                    presenter.spinner_fail("Could not create the job posting");
                    Err(e.into())
                }
            }
        }
    }
}

/// Build and validate a posting; time limits pair with questions by position
pub fn new_posting(args: CreateJobArgs) -> Result<NewJobPosting, CommandError> {
    if args.time_limits.len() > args.questions.len() {
        return Err(CommandError::Usage(format!(
            "{} time limits given for {} questions",
            args.time_limits.len(),
            args.questions.len()
        )));
    }

    let questions = args
        .questions
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let seconds = args
                .time_limits
                .get(i)
                .map_or(DEFAULT_TIME_LIMIT_SECS, |d| d.as_secs());
            Question::new(text.trim(), u32::try_from(seconds).unwrap_or(u32::MAX))
        })
        .collect();

    let posting = NewJobPosting {
        title: args.title,
        description: args.description,
        company_name: args.company_name,
        questions,
        requirements: args
            .requirements
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect(),
        location: args.location,
        salary_range: args.salary_range.filter(|s| !s.trim().is_empty()),
        job_type: args.job_type,
    };
    posting.validate()?;
    Ok(posting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::Duration;

    fn args() -> CreateJobArgs {
        CreateJobArgs {
            title: "Engineer".into(),
            description: "Build things".into(),
            company_name: "Acme".into(),
            location: "Remote".into(),
            questions: vec!["Tell us about yourself".into(), "Why us?".into()],
            time_limits: vec![Duration::from_secs(90)],
            requirements: vec!["Rust".into(), " ".into()],
            salary_range: Some(String::new()),
            job_type: "Contract".into(),
        }
    }

    #[test]
    fn time_limits_pair_by_position() {
        let posting = new_posting(args()).unwrap();
        assert_eq!(posting.questions[0].time_limit_seconds(), 90);
        assert_eq!(posting.questions[1].time_limit_seconds(), 60);
        assert_eq!(posting.requirements, vec!["Rust".to_string()]);
        assert!(posting.salary_range.is_none());
        assert_eq!(posting.job_type, "Contract");
    }

    #[test]
    fn too_many_time_limits_is_usage_error() {
        let mut args = args();
        args.time_limits = vec![Duration::from_secs(1); 3];
        assert!(matches!(new_posting(args), Err(CommandError::Usage(_))));
    }

    #[test]
    fn blank_question_is_rejected() {
        let mut args = args();
        args.questions[1] = "   ".into();
        assert!(matches!(
            new_posting(args),
            Err(CommandError::Validation(_))
        ));
    }
}
