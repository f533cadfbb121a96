//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::auth::UserType;
use crate::domain::capture::{
    CaptureConfig, DEFAULT_HEIGHT, DEFAULT_SAMPLE_RATE, DEFAULT_VIDEO_BITRATE, DEFAULT_WIDTH,
};

/// Backend base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Capture device settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub video_bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub camera_device: Option<String>,
    pub audio_device: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub auth_token: Option<String>,
    pub user_type: Option<String>,
    pub email: Option<String>,
    pub enforce_time_limit: Option<bool>,
    pub concurrent_recording: Option<bool>,
    pub credentials_path: Option<String>,
    pub capture: Option<CaptureSettings>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            auth_token: None,
            user_type: None,
            email: None,
            enforce_time_limit: Some(true),
            concurrent_recording: Some(false),
            credentials_path: None,
            capture: Some(CaptureSettings {
                width: Some(DEFAULT_WIDTH),
                height: Some(DEFAULT_HEIGHT),
                video_bitrate: Some(DEFAULT_VIDEO_BITRATE),
                sample_rate: Some(DEFAULT_SAMPLE_RATE),
                camera_device: None,
                audio_device: None,
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            auth_token: other.auth_token.or(self.auth_token),
            user_type: other.user_type.or(self.user_type),
            email: other.email.or(self.email),
            enforce_time_limit: other.enforce_time_limit.or(self.enforce_time_limit),
            concurrent_recording: other.concurrent_recording.or(self.concurrent_recording),
            credentials_path: other.credentials_path.or(self.credentials_path),
            capture: Self::merge_capture(self.capture, other.capture),
        }
    }

    fn merge_capture(
        base: Option<CaptureSettings>,
        other: Option<CaptureSettings>,
    ) -> Option<CaptureSettings> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CaptureSettings {
                width: o.width.or(b.width),
                height: o.height.or(b.height),
                video_bitrate: o.video_bitrate.or(b.video_bitrate),
                sample_rate: o.sample_rate.or(b.sample_rate),
                camera_device: o.camera_device.or(b.camera_device),
                audio_device: o.audio_device.or(b.audio_device),
            }),
        }
    }

    /// Backend base URL without a trailing slash
    pub fn api_url_or_default(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    /// Stored bearer token, if any
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().filter(|s| !s.is_empty())
    }

    /// Parsed user type, or None if not set/invalid
    pub fn user_type(&self) -> Option<UserType> {
        self.user_type.as_ref().and_then(|s| s.parse().ok())
    }

    /// Get time limit enforcement, or true if not set
    pub fn enforce_time_limit_or_default(&self) -> bool {
        self.enforce_time_limit.unwrap_or(true)
    }

    /// Get concurrent recording setting, or false if not set
    pub fn concurrent_recording_or_default(&self) -> bool {
        self.concurrent_recording.unwrap_or(false)
    }

    /// Local credentials file, if configured
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.credentials_path.as_ref().map(PathBuf::from)
    }

    /// Camera device override
    pub fn camera_device(&self) -> Option<&str> {
        self.capture.as_ref().and_then(|c| c.camera_device.as_deref())
    }

    /// Microphone device override
    pub fn audio_device(&self) -> Option<&str> {
        self.capture.as_ref().and_then(|c| c.audio_device.as_deref())
    }

    /// Build the capture configuration, falling back to fixed defaults
    pub fn capture_config(&self) -> CaptureConfig {
        let mut config = CaptureConfig::default();
        if let Some(capture) = &self.capture {
            config.video.width = capture.width.filter(|w| *w > 0).unwrap_or(DEFAULT_WIDTH);
            config.video.height = capture.height.filter(|h| *h > 0).unwrap_or(DEFAULT_HEIGHT);
            config.video.bitrate = capture
                .video_bitrate
                .filter(|b| *b > 0)
                .unwrap_or(DEFAULT_VIDEO_BITRATE);
            config.audio.sample_rate = capture
                .sample_rate
                .filter(|r| *r > 0)
                .unwrap_or(DEFAULT_SAMPLE_RATE);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.api_url_or_default(), "http://localhost:5000/api");
        assert!(config.auth_token.is_none());
        assert_eq!(config.enforce_time_limit, Some(true));
        assert_eq!(config.concurrent_recording, Some(false));
        let capture = config.capture.as_ref().unwrap();
        assert_eq!(capture.width, Some(640));
        assert_eq!(capture.height, Some(480));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.api_url.is_none());
        assert!(config.auth_token.is_none());
        assert!(config.capture.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            api_url: Some("http://base/api".to_string()),
            auth_token: Some("base-token".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            api_url: Some("http://other/api".to_string()),
            auth_token: None,
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.api_url_or_default(), "http://other/api");
        assert_eq!(merged.auth_token(), Some("base-token"));
    }

    #[test]
    fn merge_capture_sections() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            capture: Some(CaptureSettings {
                width: Some(1280),
                camera_device: Some("/dev/video2".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        let capture = merged.capture_config();
        assert_eq!(capture.video.width, 1280);
        assert_eq!(capture.video.height, 480);
        assert_eq!(merged.camera_device(), Some("/dev/video2"));
    }

    #[test]
    fn api_url_trims_trailing_slash() {
        let config = AppConfig {
            api_url: Some("http://example.com/api/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_url_or_default(), "http://example.com/api");
    }

    #[test]
    fn boolean_defaults() {
        let config = AppConfig::empty();
        assert!(config.enforce_time_limit_or_default());
        assert!(!config.concurrent_recording_or_default());
    }

    #[test]
    fn user_type_ignores_invalid() {
        let config = AppConfig {
            user_type: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(config.user_type().is_none());
    }

    #[test]
    fn capture_config_ignores_zero_dimensions() {
        let config = AppConfig {
            capture: Some(CaptureSettings {
                width: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.capture_config().video.width, 640);
    }

    #[test]
    fn empty_token_is_treated_as_absent() {
        let config = AppConfig {
            auth_token: Some(String::new()),
            ..Default::default()
        };
        assert!(config.auth_token().is_none());
    }
}
