//! Application review command handlers

use std::path::{Path, PathBuf};

use crate::application::ports::ApplicationApi;
use crate::domain::auth::UserType;
use crate::domain::config::AppConfig;
use crate::domain::interview::ApplicationFilters;

use super::app::{ensure_role, session_token, CommandError};
use super::args::ApplicationsAction;
use super::presenter::{human_size, Presenter};

/// Handle `applications` subcommands
pub async fn handle_applications_command<A: ApplicationApi>(
    action: ApplicationsAction,
    api: &A,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    let token = session_token(config)?;

    match action {
        ApplicationsAction::List {
            job_id,
            status,
            revaluation_status,
        } => {
            ensure_role(config, UserType::Recruiter)?;
            let filters = ApplicationFilters {
                status,
                revaluation_status,
            };
            let applications = api.job_applications(&job_id, &filters, token).await?;
            if applications.is_empty() {
                presenter.info("No applications found");
            }
            for application in &applications {
                presenter.application(application);
            }
        }
        ApplicationsAction::Mine => {
            ensure_role(config, UserType::Candidate)?;
            let applications = api.candidate_applications(token).await?;
            if applications.is_empty() {
                presenter.info("You have not applied to any jobs yet");
            }
            for application in &applications {
                presenter.application(application);
            }
        }
        ApplicationsAction::Status {
            application_id,
            status,
        } => {
            ensure_role(config, UserType::Recruiter)?;
            let message = api
                .update_application_status(&application_id, status, token)
                .await?;
            presenter.success(&message);
        }
        ApplicationsAction::Revaluate { application_id } => {
            ensure_role(config, UserType::Candidate)?;
            let message = api.request_revaluation(&application_id, token).await?;
            presenter.success(&message);
        }
        ApplicationsAction::Download { filename, output } => {
            let name = video_name(&filename)
                .ok_or_else(|| CommandError::Usage(format!("Invalid video name: {}", filename)))?;
            let target = output.unwrap_or_else(|| PathBuf::from(name));

            presenter.start_spinner(&format!("Downloading {}...", name));
            let data = match api.fetch_video(name, token).await {
                Ok(data) => data,
                Err(e) => {
                    presenter.spinner_fail("Download failed");
                    return Err(e.into());
                }
            };
            if let Err(e) = tokio::fs::write(&target, &data).await {
                presenter.spinner_fail("Download failed");
                return Err(CommandError::Io(format!("{}: {}", target.display(), e)));
            }
            presenter.spinner_success(&format!(
                "Saved {} to {}",
                human_size(data.len()),
                target.display()
            ));
        }
    }

    Ok(())
}

/// File name of a stored video; accepts a bare name or a `/api/videos/<name>` URL
fn video_name(input: &str) -> Option<&str> {
    let name = Path::new(input.trim()).file_name()?.to_str()?;
    if name.is_empty() || name == ".." {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_name_strips_url_path() {
        assert_eq!(video_name("answer_0.webm"), Some("answer_0.webm"));
        assert_eq!(
            video_name("/api/videos/abc_answer_1.mp4"),
            Some("abc_answer_1.mp4")
        );
        assert_eq!(video_name(""), None);
        assert_eq!(video_name(".."), None);
    }
}
