//! Recording infrastructure module
//!
//! Camera + microphone capture through FFmpeg, dimension probing through
//! ffprobe, and temp-file previews of finished answers.

mod ffmpeg;
mod ffprobe;
mod preview;

pub use ffmpeg::{CaptureDevices, FfmpegDeviceProvider, FfmpegStream};
pub use ffprobe::FfprobeProbe;
pub use preview::TempFilePreviewStore;
