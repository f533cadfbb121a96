//! Shared command plumbing and the interactive application session

use std::env;
use std::path::Path;

use thiserror::Error;
use tokio::io::AsyncBufRead;

use crate::application::ports::{ApiError, ConfigStore, JobApi};
use crate::application::{
    require_role, AuthError, CaptureController, CaptureError, CaptureOptions, RecordingPolicy,
    SubmitError, UploadedVideo,
};
use crate::domain::auth::UserType;
use crate::domain::capture::{SlotState, VideoMimeType};
use crate::domain::config::AppConfig;
use crate::domain::error::{ConfigError, JobValidationError};
use crate::infrastructure::{
    FfmpegDeviceProvider, FfprobeProbe, HttpApiClient, TempFilePreviewStore, XdgConfigStore,
};

use super::args::{ApplyArgs, UploadSpec};
use super::presenter::{human_size, Presenter};
use super::prompt::LineReader;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment overrides
pub const ENV_API_URL: &str = "INTERVIEW_API_URL";
pub const ENV_AUTH_TOKEN: &str = "INTERVIEW_AUTH_TOKEN";

/// Errors surfaced by command handlers
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("Invalid job posting: {0}")]
    Validation(#[from] JobValidationError),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Usage(String),

    #[error("Input closed before the session finished")]
    Aborted,

    #[error("Interrupted")]
    Interrupted,
}

impl CommandError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) | Self::Validation(_) => EXIT_USAGE_ERROR,
            Self::Config(ConfigError::ValidationError { .. }) => EXIT_USAGE_ERROR,
            Self::Auth(AuthError::Registration(_) | AuthError::MissingField(_)) => {
                EXIT_USAGE_ERROR
            }
            _ => EXIT_ERROR,
        }
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %store.path().display(), error = %e, "ignoring unreadable config");
            AppConfig::empty()
        }
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

fn env_config() -> AppConfig {
    AppConfig {
        api_url: env::var(ENV_API_URL).ok().filter(|s| !s.is_empty()),
        auth_token: env::var(ENV_AUTH_TOKEN).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    }
}

/// Backend client for the configured API URL
pub fn api_client(config: &AppConfig) -> HttpApiClient {
    HttpApiClient::new(config.api_url_or_default())
}

/// The stored bearer token, or `NotLoggedIn`
pub fn session_token(config: &AppConfig) -> Result<&str, CommandError> {
    config
        .auth_token()
        .ok_or(CommandError::Auth(AuthError::NotLoggedIn))
}

/// Client-side role check. Without a stored role the backend decides.
pub fn ensure_role(config: &AppConfig, required: UserType) -> Result<(), CommandError> {
    match config.user_type() {
        Some(actual) => Ok(require_role(Some(actual), required)?),
        None => Ok(()),
    }
}

/// Controller options from config and the `apply` flags
pub fn capture_options(config: &AppConfig, no_time_limit: bool) -> CaptureOptions {
    CaptureOptions {
        policy: if config.concurrent_recording_or_default() {
            RecordingPolicy::Concurrent
        } else {
            RecordingPolicy::Exclusive
        },
        enforce_time_limit: config.enforce_time_limit_or_default() && !no_time_limit,
        capture: config.capture_config(),
        ..Default::default()
    }
}

/// Read an `--upload` file; the declared type comes from its extension
pub async fn load_upload(path: &Path) -> Result<UploadedVideo, CommandError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| CommandError::Io(format!("{}: {}", path.display(), e)))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(VideoMimeType::from_extension)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(UploadedVideo::new(data, content_type, filename))
}

type LiveController =
    CaptureController<FfmpegDeviceProvider, FfprobeProbe, TempFilePreviewStore, HttpApiClient>;

/// Run an interactive application session for one job
pub async fn run_apply(
    args: ApplyArgs,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    ensure_role(config, UserType::Candidate)?;
    let token = session_token(config)?.to_string();
    let api = api_client(config);

    presenter.start_spinner("Loading interview questions...");
    let job = match api.fetch_job(&args.job_id).await {
        Ok(job) => job,
        Err(e) => {
            presenter.spinner_fail("Could not load the job");
            return Err(e.into());
        }
    };
    let questions = match job.question_set() {
        Ok(questions) => questions,
        Err(e) => {
            presenter.spinner_fail("This job has no interview questions");
            return Err(e.into());
        }
    };
    presenter.spinner_success(&format!(
        "{} at {} ({} questions)",
        job.title,
        job.company_name,
        questions.len()
    ));

    let shutdown = ShutdownSignal::new();
    shutdown
        .setup()
        .await
        .map_err(|e| CommandError::Io(format!("Failed to setup signal handler: {}", e)))?;

    let controller = CaptureController::new(
        questions,
        FfmpegDeviceProvider::with_devices(config.camera_device(), config.audio_device()),
        FfprobeProbe::new(),
        TempFilePreviewStore::new(),
        api,
        capture_options(config, args.no_time_limit),
    );

    let mut input = LineReader::stdin();
    let result = interview(&controller, &args, &token, &mut input, &shutdown, presenter).await;
    if result.is_err() {
        presenter.stop_spinner();
        controller.teardown();
    }
    result
}

async fn interview<R: AsyncBufRead + Unpin>(
    controller: &LiveController,
    args: &ApplyArgs,
    token: &str,
    input: &mut LineReader<R>,
    shutdown: &ShutdownSignal,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    for upload in &args.uploads {
        attach_upload(controller, upload, presenter).await;
    }

    for index in 0..controller.len() {
        answer_question(controller, index, input, shutdown, presenter).await?;
    }

    eprintln!();
    presenter.slots(&controller.snapshot());
    presenter.prompt("Press Enter to submit your application, or type 'q' to quit:");
    if is_quit(&input.read(shutdown).await?) {
        return Err(CommandError::Aborted);
    }

    submit(controller, &args.job_id, token, input, shutdown, presenter).await
}

async fn attach_upload(controller: &LiveController, upload: &UploadSpec, presenter: &Presenter) {
    let result = match load_upload(&upload.path).await {
        Ok(video) => controller
            .upload_existing(upload.index, video)
            .await
            .map_err(CommandError::from),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => presenter.success(&format!(
            "Answer {} uploaded from {}",
            upload.index + 1,
            upload.path.display()
        )),
        Err(e) => presenter.warn(&format!(
            "Could not use {} for answer {}: {}",
            upload.path.display(),
            upload.index + 1,
            e
        )),
    }
}

async fn answer_question<R: AsyncBufRead + Unpin>(
    controller: &LiveController,
    index: usize,
    input: &mut LineReader<R>,
    shutdown: &ShutdownSignal,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    presenter.question(index, controller.len(), &controller.questions()[index]);

    loop {
        match controller.slot_state(index) {
            Some(SlotState::Ready) => {
                presenter.prompt("Press Enter to keep this answer, or type 'r' to retake:");
                let line = input.read(shutdown).await?;
                if line.trim().eq_ignore_ascii_case("r") {
                    controller.retake(index)?;
                    continue;
                }
                return Ok(());
            }
            Some(SlotState::Error) => {
                presenter.prompt("Press Enter to retake, or type 'q' to quit:");
                if is_quit(&input.read(shutdown).await?) {
                    return Err(CommandError::Aborted);
                }
                controller.retake(index)?;
                continue;
            }
            _ => {}
        }

        presenter.prompt("Press Enter to start recording:");
        input.read(shutdown).await?;

        if let Err(e) = controller.begin_capture(index).await {
            presenter.error(&e.to_string());
            if matches!(
                e,
                CaptureError::PermissionDenied(_) | CaptureError::DeviceUnavailable(_)
            ) {
                presenter.info("Check that a camera and microphone are connected and accessible");
            }
            continue;
        }

        presenter.start_recording(&format!("Recording answer {}. Press Enter to stop", index + 1));
        let stop = async {
            tokio::select! {
                _ = input.next_line() => {}
                _ = shutdown.wait() => {}
            }
        };
        let stopped_by_time_limit = controller.await_stop(index, stop).await;
        presenter.stop_spinner();

        if shutdown.is_shutdown() {
            return Err(CommandError::Interrupted);
        }
        if stopped_by_time_limit {
            presenter.info("Time limit reached, recording stopped");
        }

        presenter.start_spinner("Checking recording...");
        let ended = controller.end_capture(index).await;
        presenter.stop_spinner();

        let snapshot = controller.snapshot().into_iter().nth(index);
        match (ended, snapshot) {
            (Ok(SlotState::Ready), Some(slot)) => {
                presenter.success(&format!(
                    "Answer {} recorded ({})",
                    index + 1,
                    human_size(slot.size_bytes.unwrap_or_default())
                ));
                if let Some(preview) = slot.preview {
                    presenter.info(&format!("Preview: {}", preview));
                }
            }
            (Ok(_), Some(slot)) => presenter.error(
                slot.failure
                    .as_deref()
                    .unwrap_or("Recording failed, please retry"),
            ),
            (Ok(_), None) => {}
            (Err(e), _) => presenter.error(&e.to_string()),
        }
    }
}

async fn submit<R: AsyncBufRead + Unpin>(
    controller: &LiveController,
    job_id: &str,
    token: &str,
    input: &mut LineReader<R>,
    shutdown: &ShutdownSignal,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    loop {
        presenter.start_spinner("Submitting application...");
        let result = tokio::select! {
            result = controller.submit(job_id, token) => result,
            _ = shutdown.wait() => {
                presenter.spinner_fail("Submission interrupted");
                return Err(CommandError::Interrupted);
            }
        };

        match result {
            Ok(receipt) => {
                let message = receipt
                    .message
                    .clone()
                    .unwrap_or_else(|| "Application submitted".to_string());
                presenter.spinner_success(&message);
                presenter.receipt(&receipt);
                return Ok(());
            }
            Err(e) => {
                presenter.spinner_fail(&e.to_string());
                if !matches!(&e, SubmitError::Api(api) if api.is_retryable()) {
                    return Err(e.into());
                }
                presenter.prompt("Press Enter to retry, or type 'q' to quit:");
                if is_quit(&input.read(shutdown).await?) {
                    return Err(e.into());
                }
            }
        }
    }
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "q" | "quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_usage_errors() {
        assert_eq!(CommandError::Usage("bad".into()).exit_code(), EXIT_USAGE_ERROR);
        assert_eq!(
            CommandError::Validation(JobValidationError::EmptyQuestionSet).exit_code(),
            EXIT_USAGE_ERROR
        );
        assert_eq!(CommandError::Interrupted.exit_code(), EXIT_ERROR);
        assert_eq!(
            CommandError::Api(ApiError::Unauthorized).exit_code(),
            EXIT_ERROR
        );
    }

    #[test]
    fn session_token_requires_login() {
        let config = AppConfig::defaults();
        assert!(matches!(
            session_token(&config),
            Err(CommandError::Auth(AuthError::NotLoggedIn))
        ));

        let config = AppConfig {
            auth_token: Some("t".into()),
            ..AppConfig::defaults()
        };
        assert_eq!(session_token(&config).unwrap(), "t");
    }

    #[test]
    fn ensure_role_checks_stored_role_only() {
        let unknown = AppConfig::empty();
        assert!(ensure_role(&unknown, UserType::Recruiter).is_ok());

        let candidate = AppConfig {
            user_type: Some("candidate".into()),
            ..Default::default()
        };
        assert!(ensure_role(&candidate, UserType::Candidate).is_ok());
        assert!(matches!(
            ensure_role(&candidate, UserType::Recruiter),
            Err(CommandError::Auth(AuthError::Forbidden { .. }))
        ));
    }

    #[test]
    fn capture_options_follow_config_and_flags() {
        let config = AppConfig {
            concurrent_recording: Some(true),
            ..AppConfig::defaults()
        };
        let options = capture_options(&config, false);
        assert_eq!(options.policy, RecordingPolicy::Concurrent);
        assert!(options.enforce_time_limit);

        let options = capture_options(&AppConfig::defaults(), true);
        assert_eq!(options.policy, RecordingPolicy::Exclusive);
        assert!(!options.enforce_time_limit);
    }

    #[tokio::test]
    async fn load_upload_infers_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer.mov");
        std::fs::write(&path, b"data").unwrap();

        let upload = load_upload(&path).await.unwrap();
        assert_eq!(upload.content_type, "video/quicktime");
        assert_eq!(upload.filename, "answer.mov");
        assert_eq!(upload.data.as_ref(), b"data");

        let other = dir.path().join("notes.txt");
        std::fs::write(&other, b"text").unwrap();
        assert_eq!(
            load_upload(&other).await.unwrap().content_type,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn load_upload_missing_file() {
        let err = load_upload(Path::new("/nonexistent/answer.webm"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Io(_)));
    }

    #[test]
    fn quit_words() {
        assert!(is_quit("q"));
        assert!(is_quit(" Quit "));
        assert!(!is_quit(""));
        assert!(!is_quit("r"));
    }
}
