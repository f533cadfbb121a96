//! Interview Capture CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interview_capture::cli::{
    app::{api_client, load_merged_config, run_apply, CommandError, EXIT_ERROR},
    applications_cmd::handle_applications_command,
    args::{Cli, Commands},
    auth_cmd::{
        handle_login, handle_logout, handle_password_command, handle_register, handle_whoami,
    },
    config_cmd::handle_config_command,
    jobs_cmd::handle_jobs_command,
    presenter::Presenter,
    prompt::LineReader,
};
use interview_capture::domain::config::AppConfig;
use interview_capture::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_capture=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut presenter = Presenter::new();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting");

    // Config commands work on the file alone
    let command = match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            return match handle_config_command(action, &store, &presenter).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    presenter.error(&e.to_string());
                    ExitCode::from(CommandError::from(e).exit_code())
                }
            };
        }
        other => other,
    };

    let cli_config = AppConfig {
        api_url: cli.api_url,
        ..Default::default()
    };
    let config = load_merged_config(cli_config).await;
    let api = api_client(&config);
    let store = XdgConfigStore::new();

    let result = match command {
        Commands::Jobs { action } => {
            handle_jobs_command(action, &api, &config, &mut presenter).await
        }
        Commands::Apply(args) => run_apply(args, &config, &mut presenter).await,
        Commands::Applications { action } => {
            handle_applications_command(action, &api, &config, &mut presenter).await
        }
        Commands::Login(args) => {
            let mut input = LineReader::stdin();
            handle_login(args, api, &store, &mut input, &mut presenter)
                .await
                .map(|_| ())
        }
        Commands::Register(args) => {
            let mut input = LineReader::stdin();
            handle_register(args, api, &config, &mut input, &mut presenter).await
        }
        Commands::Password { action } => {
            let mut input = LineReader::stdin();
            handle_password_command(action, api, &mut input, &mut presenter).await
        }
        Commands::Logout => handle_logout(&store, &presenter).await,
        Commands::Whoami => handle_whoami(&api, &config, &presenter).await,
        Commands::Config { .. } => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Interrupted) => {
            presenter.warn("Interrupted, recording discarded");
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
