//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! and the command handlers.

pub mod app;
pub mod applications_cmd;
pub mod args;
pub mod auth_cmd;
pub mod config_cmd;
pub mod jobs_cmd;
pub mod presenter;
pub mod prompt;
pub mod signals;

// Re-export commonly used types
pub use app::{run_apply, CommandError, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction};
pub use presenter::Presenter;
