//! CLI argument definitions using Clap

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::domain::auth::{UserType, DEFAULT_RECRUITER_POSITION};
use crate::domain::interview::{ApplicationStatus, RevaluationStatus, DEFAULT_JOB_TYPE};
use crate::domain::recording::Duration;

/// Interview Capture - record and submit video interview answers
#[derive(Parser, Debug)]
#[command(name = "interview-capture")]
#[command(version)]
#[command(about = "Record video interview answers and submit job applications")]
#[command(long_about = None)]
pub struct Cli {
    /// Backend API base URL (overrides config)
    #[arg(long, global = true, value_name = "URL", env = "INTERVIEW_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse, save and create job postings
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },
    /// Record (or upload) one answer per question and apply to a job
    Apply(ApplyArgs),
    /// Review submitted applications
    Applications {
        #[command(subcommand)]
        action: ApplicationsAction,
    },
    /// Log in and store the session token
    Login(LoginArgs),
    /// Create an account on the backend (or in a local users file)
    Register(RegisterArgs),
    /// Reset a forgotten password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
    /// Forget the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Job actions
#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// List job postings
    List {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        job_type: Option<String>,
        #[arg(long = "company")]
        company_name: Option<String>,
        #[arg(long = "recruiter")]
        recruiter_id: Option<String>,
    },
    /// Show one job and its interview questions
    Show {
        job_id: String,
    },
    /// Save a job to your list (candidates)
    Save {
        job_id: String,
    },
    /// Create a job posting (recruiters)
    Create(CreateJobArgs),
}

/// Fields of a new job posting
#[derive(Args, Debug)]
pub struct CreateJobArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long = "company")]
    pub company_name: String,
    #[arg(long)]
    pub location: String,
    /// Interview question (repeat for each question, in order)
    #[arg(long = "question", value_name = "TEXT", required = true)]
    pub questions: Vec<String>,
    /// Time limit per question, matched by position (e.g. 90, 2m, 1m30s)
    #[arg(long = "time-limit", value_name = "TIME")]
    pub time_limits: Vec<Duration>,
    /// Requirement (repeatable)
    #[arg(long = "requirement", value_name = "TEXT")]
    pub requirements: Vec<String>,
    #[arg(long)]
    pub salary_range: Option<String>,
    #[arg(long, default_value = DEFAULT_JOB_TYPE)]
    pub job_type: String,
}

/// Options for an interactive application session
#[derive(Args, Debug)]
pub struct ApplyArgs {
    pub job_id: String,
    /// Use an existing video file for a question (1-based), e.g. 2=answer.mp4
    #[arg(long = "upload", value_name = "N=PATH")]
    pub uploads: Vec<UploadSpec>,
    /// Do not stop recordings at the question's time limit
    #[arg(long)]
    pub no_time_limit: bool,
}

/// Application review actions
#[derive(Subcommand, Debug)]
pub enum ApplicationsAction {
    /// List applications for a job (recruiters)
    List {
        job_id: String,
        #[arg(long)]
        status: Option<ApplicationStatus>,
        #[arg(long)]
        revaluation_status: Option<RevaluationStatus>,
    },
    /// List your own applications (candidates)
    Mine,
    /// Set an application's status (recruiters)
    Status {
        application_id: String,
        /// pending, shortlisted or rejected
        status: ApplicationStatus,
    },
    /// Ask for an application to be re-evaluated (candidates)
    Revaluate {
        application_id: String,
    },
    /// Download a stored answer video
    Download {
        filename: String,
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Login options
#[derive(Args, Debug)]
pub struct LoginArgs {
    pub email: String,
    /// Password (prompted when omitted)
    #[arg(long, env = "INTERVIEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Verify against a local users file instead of the backend
    #[arg(long, value_name = "USERS_JSON")]
    pub local: Option<PathBuf>,
}

/// Registration options. Accounts are created on the backend unless
/// `--local` is given.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    pub email: String,
    #[arg(long, env = "INTERVIEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long, default_value_t = UserType::Candidate)]
    pub user_type: UserType,
    /// Display name (defaults to the part of the email before '@')
    #[arg(long)]
    pub username: Option<String>,
    /// Candidate skill (repeatable or comma-separated)
    #[arg(long = "skill", value_name = "SKILL", value_delimiter = ',')]
    pub skills: Vec<String>,
    /// Candidate experience summary
    #[arg(long)]
    pub experience: Option<String>,
    /// Recruiter's company (required for recruiters)
    #[arg(long = "company", value_name = "NAME")]
    pub company_name: Option<String>,
    /// Recruiter's position
    #[arg(long, default_value = DEFAULT_RECRUITER_POSITION)]
    pub position: String,
    /// Add the user to a local users file instead (defaults to the
    /// configured credentials_path)
    #[arg(long, value_name = "USERS_JSON", num_args = 0..=1)]
    pub local: Option<Option<PathBuf>>,
}

/// Password reset actions
#[derive(Subcommand, Debug)]
pub enum PasswordAction {
    /// Ask the backend for a reset token
    RequestReset {
        email: String,
    },
    /// Set a new password with a reset token
    Reset {
        token: String,
        /// New password (prompted when omitted)
        #[arg(long, env = "INTERVIEW_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// `N=PATH` pair from `--upload`; `index` is zero-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSpec {
    pub index: usize,
    pub path: PathBuf,
}

impl FromStr for UploadSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected N=PATH, got \"{}\"", s))?;
        let number: usize = number
            .trim()
            .parse()
            .map_err(|_| format!("invalid question number \"{}\"", number))?;
        if number == 0 {
            return Err("question numbers start at 1".to_string());
        }
        if path.trim().is_empty() {
            return Err("missing file path".to_string());
        }
        Ok(Self {
            index: number - 1,
            path: PathBuf::from(path.trim()),
        })
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_url",
    "auth_token",
    "user_type",
    "email",
    "enforce_time_limit",
    "concurrent_recording",
    "credentials_path",
    "capture.width",
    "capture.height",
    "capture.video_bitrate",
    "capture.sample_rate",
    "capture.camera_device",
    "capture.audio_device",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
