//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod api;
pub mod config;
pub mod credentials;
pub mod media_device;
pub mod media_probe;
pub mod preview;

// Re-export common types
pub use api::{
    ApiError, ApplicationApi, AuthApi, JobApi, PasswordResetTicket, Profile, SubmissionReceipt,
};
pub use config::ConfigStore;
pub use credentials::{CredentialError, CredentialStore};
pub use media_device::{ChunkSink, DeviceError, MediaDeviceProvider, MediaStream};
pub use media_probe::{MediaProbe, ProbeError};
pub use preview::{PreviewError, PreviewStore};
