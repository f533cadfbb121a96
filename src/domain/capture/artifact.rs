//! Video artifact value objects

use std::fmt;

use bytes::Bytes;

/// Video container/codec types handled by the capture workflow
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VideoMimeType {
    WebmVp8,
    WebmVp9,
    Webm,
    Mp4,
    QuickTime,
    Matroska,
    /// Any other `video/*` type, kept verbatim (uploads only)
    Other(String),
}

impl VideoMimeType {
    /// Full MIME type string, including codec parameters
    pub fn as_str(&self) -> &str {
        match self {
            Self::WebmVp8 => "video/webm;codecs=vp8",
            Self::WebmVp9 => "video/webm;codecs=vp9",
            Self::Webm => "video/webm",
            Self::Mp4 => "video/mp4",
            Self::QuickTime => "video/quicktime",
            Self::Matroska => "video/x-matroska",
            Self::Other(s) => s.as_str(),
        }
    }

    /// MIME type without parameters, e.g. `video/webm`
    pub fn essence(&self) -> &str {
        self.as_str()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// File extension for the container
    pub fn extension(&self) -> &str {
        match self {
            Self::WebmVp8 | Self::WebmVp9 | Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::QuickTime => "mov",
            Self::Matroska => "mkv",
            Self::Other(s) => s
                .split(';')
                .next()
                .and_then(|essence| essence.trim().strip_prefix("video/"))
                .filter(|sub| !sub.is_empty())
                .unwrap_or("bin"),
        }
    }

    /// Parse a declared content type. Only `video/*` types are accepted.
    pub fn parse(content_type: &str) -> Option<Self> {
        let normalized: String = content_type
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let essence = normalized.split(';').next().unwrap_or_default();

        let subtype = essence.strip_prefix("video/")?;
        if subtype.is_empty() {
            return None;
        }

        let parsed = match normalized.as_str() {
            "video/webm;codecs=vp8" | "video/webm;codecs=vp8,opus" => Self::WebmVp8,
            "video/webm;codecs=vp9" | "video/webm;codecs=vp9,opus" => Self::WebmVp9,
            "video/webm" => Self::Webm,
            "video/mp4" => Self::Mp4,
            "video/quicktime" => Self::QuickTime,
            "video/x-matroska" => Self::Matroska,
            _ => Self::Other(normalized),
        };
        Some(parsed)
    }

    /// Guess a type from a file extension (for uploads without a declared type)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "webm" => Some(Self::Webm),
            "mp4" | "m4v" => Some(Self::Mp4),
            "mov" => Some(Self::QuickTime),
            "mkv" => Some(Self::Matroska),
            "avi" => Some(Self::Other("video/x-msvideo".to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for VideoMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spatial dimensions of a decoded video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero-frame and corrupt recordings decode to 0x0
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for VideoDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A finalized recorded or uploaded answer, ready for submission.
/// Never mutated after construction; cloning shares the byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    data: Bytes,
    mime_type: VideoMimeType,
    filename: String,
}

impl VideoArtifact {
    /// Create an artifact from encoded bytes
    pub fn new(data: impl Into<Bytes>, mime_type: VideoMimeType, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type,
            filename: filename.into(),
        }
    }

    /// Suggested file name for a recorded answer, e.g. `answer_0.webm`
    pub fn recorded_filename(index: usize, mime_type: &VideoMimeType) -> String {
        format!("answer_{}.{}", index, mime_type.extension())
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn mime_type(&self) -> &VideoMimeType {
        &self.mime_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

/// Ephemeral local reference to a previewable copy of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
