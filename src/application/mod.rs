//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod auth;
pub mod capture;
pub mod ports;

// Re-export use cases
pub use auth::{require_role, AuthError, LoginUseCase};
pub use capture::{
    CaptureController, CaptureError, CaptureOptions, RecordedAnswer, RecordingPolicy,
    SlotSnapshot, SubmitError, UploadedVideo,
};
