//! Fixed capture configuration

use std::fmt;
use std::time::Duration as StdDuration;

/// Default capture width in pixels
pub const DEFAULT_WIDTH: u32 = 640;
/// Default capture height in pixels
pub const DEFAULT_HEIGHT: u32 = 480;
/// Default video bitrate (1 Mbps)
pub const DEFAULT_VIDEO_BITRATE: u32 = 1_000_000;
/// Default audio sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Encoded chunks are flushed from the device at this interval
pub const DEFAULT_FLUSH_INTERVAL: StdDuration = StdDuration::from_secs(1);
/// Upper bound on buffered bytes for one recording (512 MiB)
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 512 * 1024 * 1024;

/// Which camera to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

impl FacingMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Video track constraints. Width and height are exact, not ideal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_mode: FacingMode,
    pub bitrate: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            facing_mode: FacingMode::User,
            bitrate: DEFAULT_VIDEO_BITRATE,
        }
    }
}

/// Audio track constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub sample_rate: u32,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Configuration requested from the device for every answer, so all
/// recordings share the same geometry and audio processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
    pub flush_interval: StdDuration,
    pub max_buffer_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            video: VideoConstraints::default(),
            audio: AudioConstraints::default(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
        }
    }
}

impl CaptureConfig {
    /// Override the frame geometry
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.video.width = width;
        self.video.height = height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_policy() {
        let config = CaptureConfig::default();
        assert_eq!(config.video.width, 640);
        assert_eq!(config.video.height, 480);
        assert_eq!(config.video.facing_mode, FacingMode::User);
        assert!(config.audio.echo_cancellation);
        assert!(config.audio.noise_suppression);
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.flush_interval, StdDuration::from_secs(1));
    }

    #[test]
    fn with_resolution_overrides_geometry_only() {
        let config = CaptureConfig::default().with_resolution(1280, 720);
        assert_eq!(config.video.width, 1280);
        assert_eq!(config.video.height, 720);
        assert_eq!(config.video.bitrate, DEFAULT_VIDEO_BITRATE);
    }
}
