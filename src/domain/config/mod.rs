//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, CaptureSettings, DEFAULT_API_URL};
