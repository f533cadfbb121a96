//! Preview store port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::{PreviewUrl, VideoArtifact};

/// Preview errors
#[derive(Debug, Clone, Error)]
pub enum PreviewError {
    #[error("Failed to create preview: {0}")]
    CreateFailed(String),
}

/// Port for ephemeral, locally playable copies of artifacts
#[async_trait]
pub trait PreviewStore: Send + Sync {
    /// Create a preview reference for `artifact`
    async fn create(&self, artifact: &VideoArtifact) -> Result<PreviewUrl, PreviewError>;

    /// Invalidate a preview reference. Unknown references are ignored.
    fn revoke(&self, preview: &PreviewUrl);
}
