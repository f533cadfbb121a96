//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like FFmpeg, the interview backend, etc.

pub mod api;
pub mod config;
pub mod credentials;
pub mod recording;

// Re-export adapters
pub use api::HttpApiClient;
pub use config::XdgConfigStore;
pub use credentials::JsonCredentialStore;
pub use recording::{
    CaptureDevices, FfmpegDeviceProvider, FfmpegStream, FfprobeProbe, TempFilePreviewStore,
};
