//! Per-question recording slot state machine

use std::fmt;
use thiserror::Error;

use super::artifact::{PreviewUrl, VideoArtifact};

/// Recording slot states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotState {
    #[default]
    Empty,
    Requesting,
    Recording,
    Ready,
    Error,
}

impl SlotState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Requesting => "requesting",
            Self::Recording => "recording",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }

    /// Whether the slot holds (or is acquiring) the capture device
    pub const fn holds_device(&self) -> bool {
        matches!(self, Self::Requesting | Self::Recording)
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid slot transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transition on answer {index}: cannot {action} while {current_state}")]
pub struct InvalidSlotTransition {
    pub index: usize,
    pub current_state: SlotState,
    pub action: &'static str,
}

/// Resources released when a slot is cleared
#[derive(Debug, Default)]
pub struct Discarded {
    pub artifact: Option<VideoArtifact>,
    pub preview: Option<PreviewUrl>,
}

/// One question's answer slot.
///
/// State machine:
///   EMPTY | ERROR -> REQUESTING (begin_request)
///   REQUESTING -> RECORDING (start_recording)
///   REQUESTING | RECORDING -> ERROR (fail)
///   RECORDING -> READY (complete)
///   EMPTY | ERROR -> READY (accept_upload)
///   READY | ERROR -> EMPTY (reset)
///   any -> EMPTY (clear)
#[derive(Debug, Clone)]
pub struct RecordingSlot {
    index: usize,
    state: SlotState,
    artifact: Option<VideoArtifact>,
    preview: Option<PreviewUrl>,
    failure: Option<String>,
}

impl RecordingSlot {
    /// Create an empty slot for question `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            state: SlotState::Empty,
            artifact: None,
            preview: None,
            failure: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// The finalized answer; present only when ready
    pub fn artifact(&self) -> Option<&VideoArtifact> {
        self.artifact.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewUrl> {
        self.preview.as_ref()
    }

    /// Human-readable reason; present only in the error state
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.state == SlotState::Ready
    }

    pub fn is_recording(&self) -> bool {
        self.state == SlotState::Recording
    }

    fn invalid(&self, action: &'static str) -> InvalidSlotTransition {
        InvalidSlotTransition {
            index: self.index,
            current_state: self.state,
            action,
        }
    }

    /// Transition from EMPTY or ERROR to REQUESTING
    pub fn begin_request(&mut self) -> Result<(), InvalidSlotTransition> {
        match self.state {
            SlotState::Empty | SlotState::Error => {
                self.failure = None;
                self.state = SlotState::Requesting;
                Ok(())
            }
            _ => Err(self.invalid("start recording")),
        }
    }

    /// Transition from REQUESTING to RECORDING
    pub fn start_recording(&mut self) -> Result<(), InvalidSlotTransition> {
        if self.state != SlotState::Requesting {
            return Err(self.invalid("begin capturing"));
        }
        self.state = SlotState::Recording;
        Ok(())
    }

    /// Transition from RECORDING to READY with a validated artifact
    pub fn complete(
        &mut self,
        artifact: VideoArtifact,
        preview: Option<PreviewUrl>,
    ) -> Result<(), InvalidSlotTransition> {
        if self.state != SlotState::Recording {
            return Err(self.invalid("finish recording"));
        }
        self.artifact = Some(artifact);
        self.preview = preview;
        self.state = SlotState::Ready;
        Ok(())
    }

    /// Transition from EMPTY or ERROR to READY with an uploaded file
    pub fn accept_upload(
        &mut self,
        artifact: VideoArtifact,
        preview: Option<PreviewUrl>,
    ) -> Result<(), InvalidSlotTransition> {
        match self.state {
            SlotState::Empty | SlotState::Error => {
                self.failure = None;
                self.artifact = Some(artifact);
                self.preview = preview;
                self.state = SlotState::Ready;
                Ok(())
            }
            _ => Err(self.invalid("accept an upload")),
        }
    }

    /// Transition from REQUESTING or RECORDING to ERROR
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), InvalidSlotTransition> {
        if !self.state.holds_device() {
            return Err(self.invalid("fail"));
        }
        self.artifact = None;
        self.preview = None;
        self.failure = Some(reason.into());
        self.state = SlotState::Error;
        Ok(())
    }

    /// Transition from READY or ERROR back to EMPTY (retake)
    pub fn reset(&mut self) -> Result<Discarded, InvalidSlotTransition> {
        match self.state {
            SlotState::Ready | SlotState::Error => Ok(self.clear()),
            _ => Err(self.invalid("retake")),
        }
    }

    /// Unconditionally return to EMPTY, handing back held resources
    pub fn clear(&mut self) -> Discarded {
        self.state = SlotState::Empty;
        self.failure = None;
        Discarded {
            artifact: self.artifact.take(),
            preview: self.preview.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::VideoMimeType;

    fn artifact() -> VideoArtifact {
        VideoArtifact::new(vec![1, 2, 3], VideoMimeType::WebmVp8, "answer_0.webm")
    }

    #[test]
    fn new_slot_is_empty() {
        let slot = RecordingSlot::new(3);
        assert_eq!(slot.index(), 3);
        assert_eq!(slot.state(), SlotState::Empty);
        assert!(slot.artifact().is_none());
        assert!(slot.failure().is_none());
    }

    #[test]
    fn full_recording_cycle() {
        let mut slot = RecordingSlot::new(0);
        slot.begin_request().unwrap();
        assert_eq!(slot.state(), SlotState::Requesting);
        slot.start_recording().unwrap();
        assert!(slot.is_recording());
        slot.complete(artifact(), Some(PreviewUrl::new("file:///tmp/p")))
            .unwrap();
        assert!(slot.is_ready());
        assert_eq!(slot.artifact().unwrap().filename(), "answer_0.webm");
    }

    #[test]
    fn cannot_start_while_recording() {
        let mut slot = RecordingSlot::new(1);
        slot.begin_request().unwrap();
        slot.start_recording().unwrap();

        let err = slot.begin_request().unwrap_err();
        assert_eq!(err.current_state, SlotState::Recording);
        assert_eq!(err.index, 1);
    }

    #[test]
    fn fail_records_reason_and_drops_artifact() {
        let mut slot = RecordingSlot::new(0);
        slot.begin_request().unwrap();
        slot.fail("Permission denied").unwrap();
        assert_eq!(slot.state(), SlotState::Error);
        assert_eq!(slot.failure(), Some("Permission denied"));
        assert!(slot.artifact().is_none());
    }

    #[test]
    fn fail_from_empty_is_invalid() {
        let mut slot = RecordingSlot::new(0);
        assert!(slot.fail("nope").is_err());
    }

    #[test]
    fn error_slot_can_retry() {
        let mut slot = RecordingSlot::new(0);
        slot.begin_request().unwrap();
        slot.fail("busy").unwrap();
        slot.begin_request().unwrap();
        assert_eq!(slot.state(), SlotState::Requesting);
        assert!(slot.failure().is_none());
    }

    #[test]
    fn reset_returns_resources() {
        let mut slot = RecordingSlot::new(0);
        slot.accept_upload(artifact(), Some(PreviewUrl::new("file:///tmp/x")))
            .unwrap();

        let discarded = slot.reset().unwrap();
        assert!(discarded.artifact.is_some());
        assert_eq!(discarded.preview, Some(PreviewUrl::new("file:///tmp/x")));
        assert_eq!(slot.state(), SlotState::Empty);
        assert!(slot.artifact().is_none());
        assert!(slot.preview().is_none());
    }

    #[test]
    fn reset_from_empty_is_invalid() {
        let mut slot = RecordingSlot::new(0);
        let err = slot.reset().unwrap_err();
        assert_eq!(err.action, "retake");
    }

    #[test]
    fn upload_cannot_replace_ready_answer() {
        let mut slot = RecordingSlot::new(0);
        slot.accept_upload(artifact(), None).unwrap();
        assert!(slot.accept_upload(artifact(), None).is_err());
    }

    #[test]
    fn holds_device_states() {
        assert!(SlotState::Requesting.holds_device());
        assert!(SlotState::Recording.holds_device());
        assert!(!SlotState::Ready.holds_device());
        assert!(!SlotState::Empty.holds_device());
    }

    #[test]
    fn error_display() {
        let err = InvalidSlotTransition {
            index: 2,
            current_state: SlotState::Ready,
            action: "start recording",
        };
        let msg = err.to_string();
        assert!(msg.contains("answer 2"));
        assert!(msg.contains("ready"));
    }
}
