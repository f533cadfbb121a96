//! Media probe port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::{VideoArtifact, VideoDimensions};

/// Probe errors
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("No video stream found")]
    NoVideoStream,

    #[error("Failed to decode media: {0}")]
    DecodeFailed(String),

    #[error("Probe tool not available: {0}")]
    Unavailable(String),
}

/// Port for decoding a video's spatial dimensions
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Decode `artifact` far enough to read its frame geometry.
    async fn dimensions(&self, artifact: &VideoArtifact) -> Result<VideoDimensions, ProbeError>;
}
