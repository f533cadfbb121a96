//! CLI presenter for output formatting

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::SubmissionReceipt;
use crate::application::SlotSnapshot;
use crate::domain::capture::SlotState;
use crate::domain::interview::{Application, JobPosting, PersonalityScores, Question};

const SPINNER_TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    fn spinner_with_template(&mut self, message: &str, template: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars(SPINNER_TICKS)
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        self.spinner_with_template(message, "{spinner:.cyan} {msg}");
    }

    /// Start a recording spinner that shows elapsed time
    pub fn start_recording(&mut self, message: &str) {
        self.spinner_with_template(message, "{spinner:.red} {msg} [{elapsed_precise}]");
    }

    pub fn is_spinner_active(&self) -> bool {
        self.is_spinner_active.load(Ordering::SeqCst)
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print an inline prompt to stderr
    pub fn prompt(&self, message: &str) {
        eprint!("{} {} ", "?".magenta(), message);
        let _ = io::stderr().flush();
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Heading for one interview question
    pub fn question(&self, index: usize, total: usize, question: &Question) {
        let limit = question
            .time_limit()
            .map(|d| format!(" (time limit {})", d.as_clock()))
            .unwrap_or_default();
        eprintln!();
        eprintln!("{}", format!("Question {}/{}{}", index + 1, total, limit).bold());
        eprintln!("  {}", question.text());
    }

    /// One line per answer slot
    pub fn slots(&self, snapshots: &[SlotSnapshot]) {
        for slot in snapshots {
            eprintln!("  {}", format_slot(slot));
        }
    }

    /// Summary line for a job posting
    pub fn job_line(&self, job: &JobPosting) {
        println!(
            "{}  {} · {} · {}",
            job.id.dimmed(),
            job.title.bold(),
            job.company_name,
            job.location
        );
    }

    /// Full job posting with its questions
    pub fn job_details(&self, job: &JobPosting) {
        println!("{}", job.title.bold());
        self.key_value("id", &job.id);
        self.key_value("company", &job.company_name);
        self.key_value("location", &job.location);
        if let Some(job_type) = &job.job_type {
            self.key_value("type", job_type);
        }
        if let Some(salary) = &job.salary_range {
            self.key_value("salary", salary);
        }
        if !job.description.is_empty() {
            println!();
            println!("{}", job.description);
        }
        if !job.requirements.is_empty() {
            println!();
            println!("{}", "Requirements".underline());
            for requirement in &job.requirements {
                println!("  - {}", requirement);
            }
        }
        println!();
        println!("{}", "Interview questions".underline());
        for (i, question) in job.questions.iter().enumerate() {
            let limit = question
                .time_limit()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "no limit".to_string());
            println!("  {}. {} ({})", i + 1, question.text(), limit);
        }
    }

    /// Summary of a submitted application
    pub fn application(&self, application: &Application) {
        let revaluation = match (application.revaluation_requested, application.revaluation_status) {
            (true, Some(status)) => format!(" · revaluation {}", status),
            (true, None) => " · revaluation requested".to_string(),
            _ => String::new(),
        };
        println!(
            "{}  job {} · {} · {}{}",
            application.id.dimmed(),
            application.job_id,
            application.candidate_id,
            application.status.as_str().bold(),
            revaluation
        );
        println!("    {}", format_scores(&application.average_scores));
        for answer in &application.answers {
            println!(
                "    answer {}: {}",
                answer.question_index + 1,
                answer.video_filename()
            );
        }
    }

    /// Result of a successful submission
    pub fn receipt(&self, receipt: &SubmissionReceipt) {
        if let Some(id) = &receipt.application_id {
            self.key_value("application", id);
        }
        if let Some(scores) = &receipt.average_scores {
            self.key_value("average scores", &format_scores(scores));
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a slot as `1. ready  answer_0.webm (1.2 MB)`
pub fn format_slot(slot: &SlotSnapshot) -> String {
    let state = match slot.state {
        SlotState::Ready => slot.state.as_str().green(),
        SlotState::Error => slot.state.as_str().red(),
        SlotState::Recording | SlotState::Requesting => slot.state.as_str().yellow(),
        SlotState::Empty => slot.state.as_str().dimmed(),
    };
    let mut line = format!("{}. {}", slot.index + 1, state);
    if let Some(filename) = &slot.filename {
        line.push_str(&format!("  {}", filename));
    }
    if let Some(size) = slot.size_bytes {
        line.push_str(&format!(" ({})", human_size(size)));
    }
    if let Some(failure) = &slot.failure {
        line.push_str(&format!("  {}", failure));
    }
    line
}

/// Render personality scores on one line
pub fn format_scores(scores: &PersonalityScores) -> String {
    scores
        .traits()
        .iter()
        .map(|(name, value)| format!("{} {:.2}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Byte count in B/KB/MB
pub fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
