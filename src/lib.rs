//! Interview Capture - video interview answers from the command line
//!
//! This crate records one video answer per interview question (or accepts
//! pre-recorded files), validates each answer, and submits them as a single
//! job application to the recruitment backend. Recruiters can review the
//! resulting applications.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Answer slots, artifacts, questions, jobs and errors
//! - **Application**: The capture controller, login use case and port traits
//! - **Infrastructure**: Adapters (FFmpeg capture, ffprobe, HTTP API, config files)
//! - **CLI**: Argument parsing, prompts, output and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
