//! FFmpeg-based camera + microphone capture adapter

use std::process::Stdio;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bytes::BytesMut;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, warn};

use crate::application::ports::{ChunkSink, DeviceError, MediaDeviceProvider, MediaStream};
use crate::domain::capture::{CaptureConfig, FacingMode, VideoMimeType};

/// Size of each read from the encoder's stdout
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// How long to wait for FFmpeg to flush its trailer after SIGINT
const FINISH_TIMEOUT: StdDuration = StdDuration::from_secs(10);

const CAPTURE_FRAMERATE: &str = "30";

#[cfg(target_os = "linux")]
const DEFAULT_CAMERA: &str = "/dev/video0";
#[cfg(target_os = "linux")]
const DEFAULT_MICROPHONE: &str = "default";

#[cfg(target_os = "macos")]
const DEFAULT_CAMERA: &str = "0";
#[cfg(target_os = "macos")]
const DEFAULT_MICROPHONE: &str = "0";

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const DEFAULT_CAMERA: &str = "Integrated Camera";
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const DEFAULT_MICROPHONE: &str = "Microphone";

/// Capture devices handed to FFmpeg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevices {
    pub camera: String,
    pub microphone: String,
}

impl Default for CaptureDevices {
    fn default() -> Self {
        Self {
            camera: DEFAULT_CAMERA.to_string(),
            microphone: DEFAULT_MICROPHONE.to_string(),
        }
    }
}

/// Media device provider backed by an `ffmpeg` child process
pub struct FfmpegDeviceProvider {
    devices: CaptureDevices,
}

impl FfmpegDeviceProvider {
    /// Create a provider using the platform's default devices
    pub fn new() -> Self {
        Self {
            devices: CaptureDevices::default(),
        }
    }

    /// Override the camera and/or microphone
    pub fn with_devices(camera: Option<&str>, microphone: Option<&str>) -> Self {
        let defaults = CaptureDevices::default();
        Self {
            devices: CaptureDevices {
                camera: camera.map(str::to_string).unwrap_or(defaults.camera),
                microphone: microphone.map(str::to_string).unwrap_or(defaults.microphone),
            },
        }
    }

    pub fn devices(&self) -> &CaptureDevices {
        &self.devices
    }

    /// Verify the camera node exists and is readable
    #[cfg(target_os = "linux")]
    async fn check_camera(&self) -> Result<(), DeviceError> {
        match tokio::fs::File::open(&self.devices.camera).await {
            Ok(_) => Ok(()),
            Err(e) => Err(map_open_error(&self.devices.camera, e)),
        }
    }

    #[cfg(not(target_os = "linux"))]
    async fn check_camera(&self) -> Result<(), DeviceError> {
        Ok(())
    }
}

impl Default for FfmpegDeviceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
fn map_open_error(path: &str, err: std::io::Error) -> DeviceError {
    match err.kind() {
        std::io::ErrorKind::NotFound => {
            DeviceError::DeviceUnavailable(format!("no camera at {}", path))
        }
        std::io::ErrorKind::PermissionDenied => {
            DeviceError::PermissionDenied(format!("cannot open {}", path))
        }
        _ => DeviceError::DeviceUnavailable(format!("{}: {}", path, err)),
    }
}

#[async_trait]
impl MediaDeviceProvider for FfmpegDeviceProvider {
    async fn request_stream(
        &self,
        config: &CaptureConfig,
    ) -> Result<Box<dyn MediaStream>, DeviceError> {
        self.check_camera().await?;
        debug!(
            camera = %self.devices.camera,
            microphone = %self.devices.microphone,
            width = config.video.width,
            height = config.video.height,
            "Capture device available"
        );

        Ok(Box::new(FfmpegStream {
            devices: self.devices.clone(),
            config: config.clone(),
            child: None,
            reader: None,
            released: false,
        }))
    }

    fn is_type_supported(&self, mime_type: &VideoMimeType) -> bool {
        matches!(
            mime_type,
            VideoMimeType::WebmVp8 | VideoMimeType::WebmVp9 | VideoMimeType::Webm | VideoMimeType::Mp4
        )
    }
}

/// A capture session: one FFmpeg process encoding to stdout
pub struct FfmpegStream {
    devices: CaptureDevices,
    config: CaptureConfig,
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
    released: bool,
}

impl FfmpegStream {
    /// Build FFmpeg args for capturing into `mime_type` on stdout
    fn build_ffmpeg_args(
        devices: &CaptureDevices,
        config: &CaptureConfig,
        mime_type: &VideoMimeType,
    ) -> Result<Vec<String>, DeviceError> {
        let unapplied = Self::unapplied_constraints(config);
        if !unapplied.is_empty() {
            debug!(
                ?unapplied,
                facing_mode = %config.video.facing_mode,
                "Constraints not applied by the ffmpeg backend"
            );
        }

        let size = format!("{}x{}", config.video.width, config.video.height);
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-nostdin"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        args.extend(Self::input_args(devices, &size));

        // Exact geometry regardless of what the driver negotiated
        args.extend([
            "-vf".to_string(),
            format!(
                "scale={}:{}",
                config.video.width, config.video.height
            ),
        ]);

        if config.audio.noise_suppression {
            args.extend(["-af".to_string(), "afftdn".to_string()]);
        }
        args.extend([
            "-ar".to_string(),
            config.audio.sample_rate.to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-b:v".to_string(),
            config.video.bitrate.to_string(),
        ]);

        let codec_args: &[&str] = match mime_type {
            VideoMimeType::WebmVp8 | VideoMimeType::Webm => &[
                "-c:v", "libvpx", "-deadline", "realtime", "-cpu-used", "8", "-c:a", "libvorbis",
                "-f", "webm",
            ],
            VideoMimeType::WebmVp9 => &[
                "-c:v", "libvpx-vp9", "-deadline", "realtime", "-cpu-used", "8", "-row-mt", "1",
                "-c:a", "libvorbis", "-f", "webm",
            ],
            VideoMimeType::Mp4 => &[
                "-c:v", "libx264", "-preset", "ultrafast", "-tune", "zerolatency", "-pix_fmt",
                "yuv420p", "-c:a", "aac", "-movflags", "frag_keyframe+empty_moov", "-f", "mp4",
            ],
            other => {
                return Err(DeviceError::UnsupportedEncoding(other.to_string()));
            }
        };
        args.extend(codec_args.iter().map(|s| s.to_string()));
        args.push("pipe:1".to_string());

        Ok(args)
    }

    /// Constraints ffmpeg has no equivalent for. The camera is chosen by
    /// device path rather than facing mode, and there is no echo canceller.
    fn unapplied_constraints(config: &CaptureConfig) -> Vec<&'static str> {
        let mut unapplied = Vec::new();
        if config.video.facing_mode != FacingMode::User {
            unapplied.push("facing_mode");
        }
        if config.audio.echo_cancellation {
            unapplied.push("echo_cancellation");
        }
        unapplied
    }

    #[cfg(target_os = "linux")]
    fn input_args(devices: &CaptureDevices, size: &str) -> Vec<String> {
        vec![
            "-f".to_string(),
            "v4l2".to_string(),
            "-framerate".to_string(),
            CAPTURE_FRAMERATE.to_string(),
            "-video_size".to_string(),
            size.to_string(),
            "-i".to_string(),
            devices.camera.clone(),
            "-f".to_string(),
            "pulse".to_string(),
            "-i".to_string(),
            devices.microphone.clone(),
        ]
    }

    #[cfg(target_os = "macos")]
    fn input_args(devices: &CaptureDevices, size: &str) -> Vec<String> {
        vec![
            "-f".to_string(),
            "avfoundation".to_string(),
            "-framerate".to_string(),
            CAPTURE_FRAMERATE.to_string(),
            "-video_size".to_string(),
            size.to_string(),
            "-i".to_string(),
            format!("{}:{}", devices.camera, devices.microphone),
        ]
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn input_args(devices: &CaptureDevices, size: &str) -> Vec<String> {
        vec![
            "-f".to_string(),
            "dshow".to_string(),
            "-framerate".to_string(),
            CAPTURE_FRAMERATE.to_string(),
            "-video_size".to_string(),
            size.to_string(),
            "-i".to_string(),
            format!("video={}:audio={}", devices.camera, devices.microphone),
        ]
    }

    /// Spawn FFmpeg process
    fn spawn_ffmpeg(args: &[String]) -> Result<Child, DeviceError> {
        Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DeviceError::DeviceUnavailable("ffmpeg not found in PATH".to_string())
                } else {
                    DeviceError::EncodingFailed(e.to_string())
                }
            })
    }

    /// Ask FFmpeg to stop so it writes the container trailer
    #[cfg(unix)]
    fn request_stop(child: &mut Child) {
        if let Some(id) = child.id() {
            if let Err(e) = signal::kill(Pid::from_raw(id as i32), Signal::SIGINT) {
                warn!(error = %e, "Failed to signal encoder");
            }
        }
    }

    #[cfg(not(unix))]
    fn request_stop(child: &mut Child) {
        if let Err(e) = child.start_kill() {
            warn!(error = %e, "Failed to stop encoder");
        }
    }
}

/// Forward encoder output to `sink` every `flush_interval`,
/// then the tail with `is_final = true` at end of stream.
async fn forward_chunks(mut stdout: ChildStdout, flush_interval: StdDuration, sink: ChunkSink) {
    let mut pending = BytesMut::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut ticker = interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            read = stdout.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => pending.extend_from_slice(&buf[..n]),
                Err(e) => {
                    warn!(error = %e, "Failed reading encoder output");
                    break;
                }
            },
            _ = ticker.tick() => {
                if !pending.is_empty() {
                    sink(pending.split().freeze(), false);
                }
            }
        }
    }

    sink(pending.split().freeze(), true);
}

#[async_trait]
impl MediaStream for FfmpegStream {
    fn encode_incrementally(
        &mut self,
        mime_type: &VideoMimeType,
        flush_interval: StdDuration,
        on_chunk: ChunkSink,
    ) -> Result<(), DeviceError> {
        if self.released {
            return Err(DeviceError::DeviceUnavailable(
                "stream already released".to_string(),
            ));
        }
        if self.child.is_some() {
            return Err(DeviceError::EncodingFailed(
                "encoding already in progress".to_string(),
            ));
        }

        let args = Self::build_ffmpeg_args(&self.devices, &self.config, mime_type)?;
        let mut child = Self::spawn_ffmpeg(&args)?;
        let stdout = child.stdout.take().ok_or_else(|| {
            DeviceError::EncodingFailed("encoder has no output pipe".to_string())
        })?;

        self.reader = Some(tokio::spawn(forward_chunks(stdout, flush_interval, on_chunk)));
        self.child = Some(child);
        debug!(mime = %mime_type, "Encoder started");
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), DeviceError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        Self::request_stop(&mut child);
        match timeout(FINISH_TIMEOUT, child.wait()).await {
            Ok(Ok(status)) => debug!(%status, "Encoder exited"),
            Ok(Err(e)) => {
                return Err(DeviceError::EncodingFailed(format!(
                    "waiting for encoder: {}",
                    e
                )))
            }
            Err(_) => {
                warn!("Encoder did not stop in time; killing it");
                if let Err(e) = child.start_kill() {
                    warn!(error = %e, "Failed to kill encoder");
                }
            }
        }

        if let Some(reader) = self.reader.take() {
            reader
                .await
                .map_err(|e| DeviceError::EncodingFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "Encoder already exited");
            }
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        debug!(camera = %self.devices.camera, "Capture device released");
    }

    fn is_live(&self) -> bool {
        !self.released
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webm_args_request_fixed_geometry_and_vp8() {
        let args = FfmpegStream::build_ffmpeg_args(
            &CaptureDevices::default(),
            &CaptureConfig::default(),
            &VideoMimeType::WebmVp8,
        )
        .unwrap();

        assert!(args.windows(2).any(|w| w[0] == "-video_size" && w[1] == "640x480"));
        assert!(args.windows(2).any(|w| w[0] == "-vf" && w[1] == "scale=640:480"));
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libvpx"));
        assert!(args.windows(2).any(|w| w[0] == "-ar" && w[1] == "44100"));
        assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "1000000"));
        assert!(args.contains(&"afftdn".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[test]
    fn mp4_args_are_fragmented() {
        let args = FfmpegStream::build_ffmpeg_args(
            &CaptureDevices::default(),
            &CaptureConfig::default(),
            &VideoMimeType::Mp4,
        )
        .unwrap();
        assert!(args.contains(&"frag_keyframe+empty_moov".to_string()));
    }

    #[test]
    fn noise_suppression_can_be_disabled() {
        let mut config = CaptureConfig::default();
        config.audio.noise_suppression = false;
        let args = FfmpegStream::build_ffmpeg_args(
            &CaptureDevices::default(),
            &config,
            &VideoMimeType::Webm,
        )
        .unwrap();
        assert!(!args.contains(&"afftdn".to_string()));
    }

    #[test]
    fn facing_mode_and_echo_cancellation_are_reported_not_applied() {
        let defaults = CaptureConfig::default();
        assert_eq!(
            FfmpegStream::unapplied_constraints(&defaults),
            vec!["echo_cancellation"]
        );

        let mut config = CaptureConfig::default();
        config.video.facing_mode = FacingMode::Environment;
        config.audio.echo_cancellation = false;
        assert_eq!(
            FfmpegStream::unapplied_constraints(&config),
            vec!["facing_mode"]
        );

        let build = |config: &CaptureConfig| {
            FfmpegStream::build_ffmpeg_args(&CaptureDevices::default(), config, &VideoMimeType::Webm)
                .unwrap()
        };
        assert_eq!(build(&defaults), build(&config));
    }

    #[test]
    fn unsupported_encoding_is_rejected() {
        let result = FfmpegStream::build_ffmpeg_args(
            &CaptureDevices::default(),
            &CaptureConfig::default(),
            &VideoMimeType::QuickTime,
        );
        assert!(matches!(result, Err(DeviceError::UnsupportedEncoding(_))));
    }

    #[test]
    fn supported_types() {
        let provider = FfmpegDeviceProvider::new();
        assert!(provider.is_type_supported(&VideoMimeType::WebmVp8));
        assert!(provider.is_type_supported(&VideoMimeType::Mp4));
        assert!(!provider.is_type_supported(&VideoMimeType::QuickTime));
    }

    #[test]
    fn device_overrides() {
        let provider = FfmpegDeviceProvider::with_devices(Some("/dev/video2"), None);
        assert_eq!(provider.devices().camera, "/dev/video2");
        assert_eq!(provider.devices().microphone, DEFAULT_MICROPHONE);
    }

    #[tokio::test]
    #[cfg(target_os = "linux")]
    async fn missing_camera_is_unavailable() {
        let provider =
            FfmpegDeviceProvider::with_devices(Some("/dev/does-not-exist-video9"), None);
        let result = provider.request_stream(&CaptureConfig::default()).await;
        assert!(matches!(result, Err(DeviceError::DeviceUnavailable(_))));
    }

    #[tokio::test]
    async fn finish_without_encoding_is_noop() {
        let mut stream = FfmpegStream {
            devices: CaptureDevices::default(),
            config: CaptureConfig::default(),
            child: None,
            reader: None,
            released: false,
        };
        stream.finish().await.unwrap();
        stream.release();
        stream.release();
        assert!(!stream.is_live());
    }
}
