//! Recording time domain module

mod duration;

pub use duration::{Duration, DEFAULT_TIME_LIMIT_SECS};
