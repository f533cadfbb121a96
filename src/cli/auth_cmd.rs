//! Login, registration, password reset and session commands

use std::path::PathBuf;

use tokio::io::AsyncBufRead;

use crate::application::ports::{AuthApi, ConfigStore, CredentialStore};
use crate::application::{AuthError, LoginUseCase};
use crate::domain::auth::{username_from_email, AccountProfile, Registration, Session, UserType};
use crate::domain::config::AppConfig;
use crate::infrastructure::JsonCredentialStore;

use super::app::CommandError;
use super::args::{LoginArgs, PasswordAction, RegisterArgs};
use super::presenter::Presenter;
use super::prompt::LineReader;
use super::signals::ShutdownSignal;

/// Log in remotely (or against a local users file) and persist the session
pub async fn handle_login<A, S, R>(
    args: LoginArgs,
    api: A,
    store: &S,
    input: &mut LineReader<R>,
    presenter: &mut Presenter,
) -> Result<Session, CommandError>
where
    A: AuthApi,
    S: ConfigStore,
    R: AsyncBufRead + Unpin,
{
    let password = password_or_prompt(args.password, "Password:", input, presenter).await?;

    let session = match args.local {
        Some(path) => {
            let credentials = load_credentials(path).await?;
            LoginUseCase::with_credentials(api, credentials).login_local(&args.email, &password)?
        }
        None => {
            presenter.start_spinner("Logging in...");
            let use_case: LoginUseCase<A, JsonCredentialStore> = LoginUseCase::new(api);
            match use_case.login(&args.email, &password).await {
                Ok(session) => {
                    presenter.stop_spinner();
                    session
                }
                Err(e) => {
                    presenter.spinner_fail("Login failed");
                    return Err(e.into());
                }
            }
        }
    };

    let mut config = store.load().await?;
    store_session(&mut config, &session);
    store.save(&config).await?;

    if session.has_token() {
        presenter.success(&format!(
            "Logged in as {} ({})",
            session.email, session.user_type
        ));
    } else {
        presenter.success(&format!(
            "Verified {} ({}) against local credentials",
            session.email, session.user_type
        ));
        presenter.warn("Local sessions have no token; backend commands will need a real login");
    }
    Ok(session)
}

/// Create a backend account, or add a user to a local users file
pub async fn handle_register<A, R>(
    args: RegisterArgs,
    api: A,
    config: &AppConfig,
    input: &mut LineReader<R>,
    presenter: &mut Presenter,
) -> Result<(), CommandError>
where
    A: AuthApi,
    R: AsyncBufRead + Unpin,
{
    let Some(local) = args.local.clone() else {
        return register_remote(args, api, input, presenter).await;
    };

    let path = local
        .or_else(|| config.credentials_path())
        .ok_or(CommandError::Auth(AuthError::NoCredentialStore))?;
    let password = password_or_prompt(args.password, "Password:", input, presenter).await?;

    let credentials = load_credentials(path.clone()).await?;
    LoginUseCase::with_credentials(api, credentials)
        .register_local(&args.email, &password, args.user_type)
        .await?;

    presenter.success(&format!(
        "Registered {} ({}) in {}",
        args.email.trim(),
        args.user_type,
        path.display()
    ));
    Ok(())
}

async fn register_remote<A, R>(
    args: RegisterArgs,
    api: A,
    input: &mut LineReader<R>,
    presenter: &mut Presenter,
) -> Result<(), CommandError>
where
    A: AuthApi,
    R: AsyncBufRead + Unpin,
{
    let password = password_or_prompt(args.password, "Password:", input, presenter).await?;
    let profile = match args.user_type {
        UserType::Candidate => AccountProfile::Candidate {
            skills: args
                .skills
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            experience: args.experience,
        },
        UserType::Recruiter => AccountProfile::Recruiter {
            company_name: args.company_name.unwrap_or_default(),
            position: args.position,
        },
    };
    let registration = Registration {
        username: args
            .username
            .unwrap_or_else(|| username_from_email(&args.email)),
        email: args.email.trim().to_string(),
        password,
        profile,
    };

    let use_case: LoginUseCase<A, JsonCredentialStore> = LoginUseCase::new(api);
    presenter.start_spinner("Registering...");
    match use_case.register_remote(&registration).await {
        Ok(message) => {
            presenter.stop_spinner();
            presenter.success(&message);
            presenter.info(&format!(
                "Run 'interview-capture login {}' to start a session",
                registration.email
            ));
            Ok(())
        }
        Err(e) => {
            presenter.spinner_fail("Registration failed");
            Err(e.into())
        }
    }
}

/// Request a reset token or set a new password with one
pub async fn handle_password_command<A, R>(
    action: PasswordAction,
    api: A,
    input: &mut LineReader<R>,
    presenter: &mut Presenter,
) -> Result<(), CommandError>
where
    A: AuthApi,
    R: AsyncBufRead + Unpin,
{
    let use_case: LoginUseCase<A, JsonCredentialStore> = LoginUseCase::new(api);
    match action {
        PasswordAction::RequestReset { email } => {
            let ticket = use_case.request_password_reset(&email).await?;
            presenter.success(&ticket.message);
            if let Some(token) = &ticket.reset_token {
                presenter.key_value("reset_token", token);
                presenter.info(&format!(
                    "Run 'interview-capture password reset {}' to choose a new password",
                    token
                ));
            }
        }
        PasswordAction::Reset {
            token,
            new_password,
        } => {
            let new_password =
                password_or_prompt(new_password, "New password:", input, presenter).await?;
            let message = use_case.reset_password(&token, &new_password).await?;
            presenter.success(&message);
        }
    }
    Ok(())
}

/// Forget the stored session
pub async fn handle_logout<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
) -> Result<(), CommandError> {
    let mut config = store.load().await?;
    let had_session = config.auth_token.is_some() || config.email.is_some();
    clear_session(&mut config);
    store.save(&config).await?;

    if had_session {
        presenter.success("Logged out");
    } else {
        presenter.info("No stored session");
    }
    Ok(())
}

/// Show who the stored session belongs to, checking the token with the backend
pub async fn handle_whoami<A: AuthApi>(
    api: &A,
    config: &AppConfig,
    presenter: &Presenter,
) -> Result<(), CommandError> {
    match config.auth_token() {
        Some(token) => {
            let profile = api.profile(token).await?;
            presenter.key_value("email", &profile.email);
            presenter.key_value("user_type", &profile.user_type);
        }
        None => {
            let email = config
                .email
                .as_deref()
                .ok_or(CommandError::Auth(AuthError::NotLoggedIn))?;
            presenter.key_value("email", email);
            presenter.key_value(
                "user_type",
                config.user_type.as_deref().unwrap_or("(not set)"),
            );
            presenter.info("Local session (no token)");
        }
    }
    Ok(())
}

async fn load_credentials(path: PathBuf) -> Result<JsonCredentialStore, CommandError> {
    let store = JsonCredentialStore::new(path);
    store.load().await.map_err(AuthError::from)?;
    Ok(store)
}

async fn password_or_prompt<R: AsyncBufRead + Unpin>(
    password: Option<String>,
    label: &str,
    input: &mut LineReader<R>,
    presenter: &Presenter,
) -> Result<String, CommandError> {
    if let Some(password) = password {
        return Ok(password);
    }
    presenter.prompt(label);
    let shutdown = ShutdownSignal::new();
    input.read(&shutdown).await
}

fn store_session(config: &mut AppConfig, session: &Session) {
    config.auth_token = session.token.clone();
    config.email = Some(session.email.clone());
    config.user_type = Some(session.user_type.to_string());
}

fn clear_session(config: &mut AppConfig) {
    config.auth_token = None;
    config.email = None;
    config.user_type = None;
}
