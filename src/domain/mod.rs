//! Domain layer - Core business logic
//!
//! Contains value objects, state machines, and domain errors.
//! This layer has no dependencies on external systems.

pub mod auth;
pub mod capture;
pub mod config;
pub mod error;
pub mod interview;
pub mod recording;

// Re-export common types
pub use auth::{Session, UserType};
pub use capture::{RecordingSlot, SlotState, VideoArtifact, VideoMimeType};
pub use config::AppConfig;
pub use error::*;
pub use interview::{JobPosting, Question, QuestionSet};
pub use recording::Duration;
