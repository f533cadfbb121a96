//! Capture domain module: slots, artifacts, encodings and buffers

mod artifact;
mod capture_config;
mod chunk_buffer;
mod encoding;
mod payload;
mod slot;

pub use artifact::{PreviewUrl, VideoArtifact, VideoDimensions, VideoMimeType};
pub use capture_config::{
    AudioConstraints, CaptureConfig, FacingMode, VideoConstraints, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_HEIGHT, DEFAULT_MAX_BUFFER_BYTES, DEFAULT_SAMPLE_RATE, DEFAULT_VIDEO_BITRATE,
    DEFAULT_WIDTH,
};
pub use chunk_buffer::{ChunkBuffer, ChunkBufferError};
pub use encoding::EncodingPreference;
pub use payload::{answer_field_name, SubmissionPayload};
pub use slot::{Discarded, InvalidSlotTransition, RecordingSlot, SlotState};
