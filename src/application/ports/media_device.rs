//! Media capture device port interfaces

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::domain::capture::{CaptureConfig, VideoMimeType};

/// Capture device errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("Camera or microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Encoding not supported by the device: {0}")]
    UnsupportedEncoding(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Callback receiving encoded chunks.
/// Parameters: (chunk, is_final)
pub type ChunkSink = Arc<dyn Fn(Bytes, bool) + Send + Sync>;

/// Port for acquiring camera + microphone streams
#[async_trait]
pub trait MediaDeviceProvider: Send + Sync {
    /// Acquire a live stream matching `config`.
    ///
    /// Suspends while access is being granted. The returned stream is
    /// exclusively owned by the caller until released.
    async fn request_stream(
        &self,
        config: &CaptureConfig,
    ) -> Result<Box<dyn MediaStream>, DeviceError>;

    /// Whether the device can encode to `mime_type`
    fn is_type_supported(&self, mime_type: &VideoMimeType) -> bool;
}

/// A live camera + microphone stream
#[async_trait]
pub trait MediaStream: Send {
    /// Start encoding, delivering chunks to `on_chunk` every `flush_interval`.
    /// Chunks for one stream are delivered strictly in order.
    fn encode_incrementally(
        &mut self,
        mime_type: &VideoMimeType,
        flush_interval: StdDuration,
        on_chunk: ChunkSink,
    ) -> Result<(), DeviceError>;

    /// Stop encoding. Returns once the final chunk has been delivered.
    async fn finish(&mut self) -> Result<(), DeviceError>;

    /// Stop all hardware tracks. Safe to call more than once.
    fn release(&mut self);

    /// Whether hardware tracks are still running
    fn is_live(&self) -> bool;
}
