//! FFprobe-based media probe adapter

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::application::ports::{MediaProbe, ProbeError};
use crate::domain::capture::{VideoArtifact, VideoDimensions};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    codec_name: Option<String>,
}

/// Reads video geometry by running `ffprobe` on a temp copy of the artifact
pub struct FfprobeProbe;

impl FfprobeProbe {
    pub fn new() -> Self {
        Self
    }

    /// Extract the first video stream's dimensions from ffprobe JSON
    fn parse_dimensions(json: &[u8]) -> Result<VideoDimensions, ProbeError> {
        let output: ProbeOutput = serde_json::from_slice(json)
            .map_err(|e| ProbeError::DecodeFailed(format!("unexpected ffprobe output: {}", e)))?;

        let stream = output
            .streams
            .into_iter()
            .next()
            .ok_or(ProbeError::NoVideoStream)?;

        debug!(codec = ?stream.codec_name, "Probed video stream");
        Ok(VideoDimensions::new(
            stream.width.unwrap_or(0),
            stream.height.unwrap_or(0),
        ))
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn dimensions(&self, artifact: &VideoArtifact) -> Result<VideoDimensions, ProbeError> {
        let file = tempfile::Builder::new()
            .prefix("interview-probe-")
            .suffix(&format!(".{}", artifact.mime_type().extension()))
            .tempfile()
            .map_err(|e| ProbeError::DecodeFailed(format!("temp file: {}", e)))?;

        tokio::fs::write(file.path(), artifact.data())
            .await
            .map_err(|e| ProbeError::DecodeFailed(format!("temp file: {}", e)))?;

        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
                "-select_streams",
                "v:0",
            ])
            .arg(file.path())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::Unavailable("ffprobe not found in PATH".to_string())
                } else {
                    ProbeError::Unavailable(e.to_string())
                }
            })?;

        if !output.status.success() && output.stdout.is_empty() {
            return Err(ProbeError::DecodeFailed(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        Self::parse_dimensions(&output.stdout)
    }
}
