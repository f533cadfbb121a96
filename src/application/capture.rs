//! Video answer capture use case
//!
//! Owns one [`RecordingSlot`] per interview question and drives each slot
//! through its lifecycle against the media device, probe and preview ports.
//! All operations take `&self`; slot state lives behind a mutex that is
//! never held across an await, so the controller can be shared through an
//! `Arc` with a time-limit task or a signal handler.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::capture::{
    CaptureConfig, ChunkBuffer, EncodingPreference, InvalidSlotTransition, PreviewUrl,
    RecordingSlot, SlotState, SubmissionPayload, VideoArtifact, VideoDimensions, VideoMimeType,
};
use crate::domain::interview::{Question, QuestionSet};

use super::ports::{
    ApiError, ChunkSink, DeviceError, JobApi, MediaDeviceProvider, MediaProbe, MediaStream,
    PreviewStore, SubmissionReceipt,
};

/// Failure reason shown on a slot whose recording failed validation
pub const INVALID_RECORDING_MESSAGE: &str = "Invalid recording, please retry";

/// Errors from capture operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Camera or microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Capture failed: {0}")]
    Device(DeviceError),

    #[error("No supported recording format is available on this device")]
    NoSupportedEncoding,

    #[error("Invalid recording, please retry ({0})")]
    InvalidRecording(String),

    #[error("Unsupported file type \"{0}\". Please upload a video file")]
    UnsupportedUploadType(String),

    #[error("Answer {} is still recording; stop it before recording answer {}", .active + 1, .requested + 1)]
    ConcurrentRecordingConflict { active: usize, requested: usize },

    #[error("Answer {} does not exist (this interview has {count} questions)", .index + 1)]
    SlotOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    InvalidTransition(#[from] InvalidSlotTransition),

    #[error("Recording exceeded the {limit} byte buffer limit")]
    BufferOverflow { limit: usize },

    #[error("Capture session has ended")]
    TornDown,

    #[error("Answers cannot change while the application is being submitted")]
    SubmissionInProgress,

    #[error("Answer {} changed while the operation was in progress", .0 + 1)]
    Stale(usize),
}

impl From<DeviceError> for CaptureError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            DeviceError::DeviceUnavailable(msg) => Self::DeviceUnavailable(msg),
            other => Self::Device(other),
        }
    }
}

/// Errors from submitting the finished answers
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    InProgress,

    #[error("Answers missing for questions: {}", question_numbers(.missing))]
    Incomplete { missing: Vec<usize> },

    #[error("Submission failed: {0}")]
    Api(#[from] ApiError),

    #[error("Capture session has ended")]
    TornDown,
}

fn question_numbers(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| (i + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether more than one slot may hold the capture device at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingPolicy {
    /// At most one slot requesting or recording at any time
    #[default]
    Exclusive,
    /// Independent slots may record simultaneously (multi-camera setups)
    Concurrent,
}

/// Controller settings
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub policy: RecordingPolicy,
    /// Auto-stop recordings when the question's time limit elapses
    pub enforce_time_limit: bool,
    pub encodings: EncodingPreference,
    pub capture: CaptureConfig,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            policy: RecordingPolicy::Exclusive,
            enforce_time_limit: true,
            encodings: EncodingPreference::default(),
            capture: CaptureConfig::default(),
        }
    }
}

/// A pre-recorded file supplied instead of a live capture
#[derive(Debug, Clone)]
pub struct UploadedVideo {
    pub data: Bytes,
    /// Declared content type, e.g. `video/mp4`
    pub content_type: String,
    /// Original file name, kept for submission
    pub filename: String,
}

impl UploadedVideo {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }
}

/// Read-only view of one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub index: usize,
    pub state: SlotState,
    pub failure: Option<String>,
    pub preview: Option<PreviewUrl>,
    pub filename: Option<String>,
    pub size_bytes: Option<usize>,
}

/// Outcome of [`CaptureController::record_answer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedAnswer {
    pub state: SlotState,
    pub stopped_by_time_limit: bool,
}

/// A live stream owned by a recording slot. Dropping it releases the device.
struct ActiveCapture {
    stream: Box<dyn MediaStream>,
    buffer: Arc<Mutex<ChunkBuffer>>,
    mime_type: VideoMimeType,
}

impl ActiveCapture {
    fn take_buffer(&self) -> ChunkBuffer {
        std::mem::replace(&mut *self.buffer.lock(), ChunkBuffer::new(0))
    }
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        self.stream.release();
    }
}

struct SlotEntry {
    slot: RecordingSlot,
    /// Bumped on every ownership change; async completions from an older
    /// generation are discarded.
    generation: u64,
    capture: Option<ActiveCapture>,
}

/// Resets the in-flight flag when a submission finishes or is dropped
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-question capture controller
pub struct CaptureController<D, P, S, A>
where
    D: MediaDeviceProvider,
    P: MediaProbe,
    S: PreviewStore,
    A: JobApi,
{
    questions: QuestionSet,
    device: D,
    probe: P,
    previews: S,
    api: A,
    options: CaptureOptions,
    slots: Mutex<Vec<SlotEntry>>,
    submitting: AtomicBool,
    torn_down: AtomicBool,
}

impl<D, P, S, A> CaptureController<D, P, S, A>
where
    D: MediaDeviceProvider,
    P: MediaProbe,
    S: PreviewStore,
    A: JobApi,
{
    /// Create a controller with one empty slot per question
    pub fn new(
        questions: QuestionSet,
        device: D,
        probe: P,
        previews: S,
        api: A,
        options: CaptureOptions,
    ) -> Self {
        let slots = (0..questions.len())
            .map(|index| SlotEntry {
                slot: RecordingSlot::new(index),
                generation: 0,
                capture: None,
            })
            .collect();

        Self {
            questions,
            device,
            probe,
            previews,
            api,
            options,
            slots: Mutex::new(slots),
            submitting: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Current state of slot `index`
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.lock().get(index).map(|e| e.slot.state())
    }

    /// Snapshot of every slot, in question order
    pub fn snapshot(&self) -> Vec<SlotSnapshot> {
        self.slots
            .lock()
            .iter()
            .map(|entry| SlotSnapshot {
                index: entry.slot.index(),
                state: entry.slot.state(),
                failure: entry.slot.failure().map(str::to_string),
                preview: entry.slot.preview().cloned(),
                filename: entry.slot.artifact().map(|a| a.filename().to_string()),
                size_bytes: entry.slot.artifact().map(VideoArtifact::size_bytes),
            })
            .collect()
    }

    /// Index of the slot currently recording, if any
    pub fn active_recording(&self) -> Option<usize> {
        self.slots
            .lock()
            .iter()
            .find(|e| e.slot.is_recording())
            .map(|e| e.slot.index())
    }

    /// Whether every slot holds a ready answer
    pub fn is_complete(&self) -> bool {
        self.slots.lock().iter().all(|e| e.slot.is_ready())
    }

    fn ensure_live(&self) -> Result<(), CaptureError> {
        if self.is_torn_down() {
            return Err(CaptureError::TornDown);
        }
        Ok(())
    }

    /// Slots may only change while the session is live and no submission
    /// is in flight. Called with the slot lock held.
    fn ensure_mutable(&self) -> Result<(), CaptureError> {
        self.ensure_live()?;
        if self.is_submitting() {
            return Err(CaptureError::SubmissionInProgress);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), CaptureError> {
        let count = self.questions.len();
        if index >= count {
            return Err(CaptureError::SlotOutOfRange { index, count });
        }
        Ok(())
    }

    /// Start recording an answer for question `index`.
    ///
    /// Suspends while the device grants access. On failure the slot moves
    /// to the error state with a readable reason and no stream is kept.
    pub async fn begin_capture(&self, index: usize) -> Result<(), CaptureError> {
        self.check_index(index)?;

        let generation = {
            let mut slots = self.slots.lock();
            self.ensure_mutable()?;

            if self.options.policy == RecordingPolicy::Exclusive {
                if let Some(active) = slots
                    .iter()
                    .find(|e| e.slot.index() != index && e.slot.state().holds_device())
                {
                    return Err(CaptureError::ConcurrentRecordingConflict {
                        active: active.slot.index(),
                        requested: index,
                    });
                }
            }

            let entry = &mut slots[index];
            entry.slot.begin_request()?;
            entry.generation += 1;
            entry.generation
        };
        debug!(slot = index, "Requesting capture device");

        let Some(mime_type) = self
            .options
            .encodings
            .negotiate(|m| self.device.is_type_supported(m))
        else {
            self.fail_slot(index, generation, "No supported recording format");
            return Err(CaptureError::NoSupportedEncoding);
        };

        let mut stream = match self.device.request_stream(&self.options.capture).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(slot = index, error = %e, "Capture device request failed");
                self.fail_slot(index, generation, &e.to_string());
                return Err(e.into());
            }
        };

        let buffer = Arc::new(Mutex::new(ChunkBuffer::new(
            self.options.capture.max_buffer_bytes,
        )));
        let sink_buffer = Arc::clone(&buffer);
        let sink: ChunkSink = Arc::new(move |chunk: Bytes, is_final: bool| {
            let len = chunk.len();
            if let Err(e) = sink_buffer.lock().push(chunk, is_final) {
                warn!(slot = index, bytes = len, error = %e, "Dropped encoded chunk");
            }
        });

        if let Err(e) =
            stream.encode_incrementally(&mime_type, self.options.capture.flush_interval, sink)
        {
            stream.release();
            warn!(slot = index, error = %e, "Failed to start encoder");
            self.fail_slot(index, generation, &e.to_string());
            return Err(e.into());
        }

        let capture = ActiveCapture {
            stream,
            buffer,
            mime_type: mime_type.clone(),
        };

        let mut slots = self.slots.lock();
        if self.is_torn_down() {
            debug!(slot = index, "Releasing stream granted after teardown");
            return Err(CaptureError::TornDown);
        }
        let entry = &mut slots[index];
        if entry.generation != generation {
            debug!(slot = index, "Releasing stream granted to a stale request");
            return Err(CaptureError::Stale(index));
        }
        entry.slot.start_recording()?;
        entry.capture = Some(capture);

        info!(slot = index, mime = %mime_type, "Recording started");
        Ok(())
    }

    /// Stop recording question `index` and validate the result.
    ///
    /// A no-op returning the current state unless the slot is recording;
    /// a second call while the first is finalizing is also a no-op.
    pub async fn end_capture(&self, index: usize) -> Result<SlotState, CaptureError> {
        self.check_index(index)?;

        let (mut capture, generation) = {
            let mut slots = self.slots.lock();
            let entry = &mut slots[index];
            if !entry.slot.is_recording() {
                return Ok(entry.slot.state());
            }
            match entry.capture.take() {
                Some(capture) => (capture, entry.generation),
                None => {
                    debug!(slot = index, "Recording already finalizing");
                    return Ok(SlotState::Recording);
                }
            }
        };

        let finished = capture.stream.finish().await;
        capture.stream.release();
        let mime_type = capture.mime_type.clone();
        let buffer = capture.take_buffer();
        drop(capture);
        debug!(slot = index, chunks = buffer.chunk_count(), "Capture device released");

        if let Err(e) = finished {
            warn!(slot = index, error = %e, "Encoder did not finish cleanly");
            self.fail_slot(index, generation, &e.to_string());
            return Err(e.into());
        }

        let data = match buffer.into_bytes() {
            Ok(data) => data,
            Err(e) => {
                warn!(slot = index, error = %e, "Discarding recording");
                self.fail_slot(index, generation, &e.to_string());
                return Err(CaptureError::BufferOverflow {
                    limit: self.options.capture.max_buffer_bytes,
                });
            }
        };

        let filename = VideoArtifact::recorded_filename(index, &mime_type);
        let artifact = VideoArtifact::new(data, mime_type, filename);

        if let Err(reason) = self.validate(&artifact).await {
            warn!(slot = index, %reason, "Rejected recording");
            self.fail_slot(index, generation, INVALID_RECORDING_MESSAGE);
            return Err(CaptureError::InvalidRecording(reason));
        }

        let size = artifact.human_readable_size();
        let preview = self.create_preview(index, &artifact).await;

        let committed = {
            let mut slots = self.slots.lock();
            let entry = &mut slots[index];
            if self.is_torn_down() {
                Err(CaptureError::TornDown)
            } else if entry.generation != generation {
                Err(CaptureError::Stale(index))
            } else {
                entry
                    .slot
                    .complete(artifact, preview.clone())
                    .map_err(CaptureError::from)
            }
        };

        if let Err(e) = committed {
            if let Some(preview) = &preview {
                self.previews.revoke(preview);
            }
            return Err(e);
        }

        info!(slot = index, %size, "Answer recorded");
        Ok(SlotState::Ready)
    }

    /// Use a pre-recorded file as the answer for question `index`.
    ///
    /// The slot must be empty or failed; retake a ready answer first.
    /// The file is validated like a recording and kept as-is.
    pub async fn upload_existing(
        &self,
        index: usize,
        upload: UploadedVideo,
    ) -> Result<(), CaptureError> {
        self.check_index(index)?;

        let Some(mime_type) = VideoMimeType::parse(&upload.content_type) else {
            return Err(CaptureError::UnsupportedUploadType(upload.content_type));
        };

        let generation = {
            let mut slots = self.slots.lock();
            self.ensure_mutable()?;
            let entry = &mut slots[index];
            match entry.slot.state() {
                SlotState::Empty | SlotState::Error => {}
                current_state => {
                    return Err(InvalidSlotTransition {
                        index,
                        current_state,
                        action: "accept an upload",
                    }
                    .into());
                }
            }
            entry.generation += 1;
            entry.generation
        };

        let artifact = VideoArtifact::new(upload.data, mime_type, upload.filename);

        if let Err(reason) = self.validate(&artifact).await {
            warn!(slot = index, file = artifact.filename(), %reason, "Rejected upload");
            let mut slots = self.slots.lock();
            let entry = &mut slots[index];
            if entry.generation == generation {
                entry.slot.clear();
            }
            return Err(CaptureError::InvalidRecording(reason));
        }

        let filename = artifact.filename().to_string();
        let preview = self.create_preview(index, &artifact).await;

        let committed = {
            let mut slots = self.slots.lock();
            let entry = &mut slots[index];
            if let Err(e) = self.ensure_mutable() {
                Err(e)
            } else if entry.generation != generation {
                Err(CaptureError::Stale(index))
            } else {
                entry
                    .slot
                    .accept_upload(artifact, preview.clone())
                    .map_err(CaptureError::from)
            }
        };

        if let Err(e) = committed {
            if let Some(preview) = &preview {
                self.previews.revoke(preview);
            }
            return Err(e);
        }

        info!(slot = index, file = %filename, "Upload accepted");
        Ok(())
    }

    /// Discard the answer for question `index` and return it to empty.
    /// Valid from ready or error; other slots are unaffected.
    /// Refused while a submission is in flight.
    pub fn retake(&self, index: usize) -> Result<(), CaptureError> {
        self.check_index(index)?;

        let discarded = {
            let mut slots = self.slots.lock();
            self.ensure_mutable()?;
            let entry = &mut slots[index];
            let discarded = entry.slot.reset()?;
            entry.generation += 1;
            discarded
        };

        if let Some(preview) = discarded.preview {
            self.previews.revoke(&preview);
        }
        info!(slot = index, "Answer discarded for retake");
        Ok(())
    }

    /// Wait for `stop`, or for the question's time limit when enforced.
    /// Returns true when the time limit ended the wait.
    pub async fn await_stop<F>(&self, index: usize, stop: F) -> bool
    where
        F: Future<Output = ()>,
    {
        let limit = if self.options.enforce_time_limit {
            self.questions.get(index).and_then(Question::time_limit)
        } else {
            None
        };

        match limit {
            Some(limit) => {
                tokio::select! {
                    _ = stop => false,
                    _ = tokio::time::sleep(limit.as_std()) => {
                        info!(slot = index, limit = %limit, "Time limit reached");
                        true
                    }
                }
            }
            None => {
                stop.await;
                false
            }
        }
    }

    /// Record one answer: start, wait for `stop` or the time limit, finish.
    pub async fn record_answer<F>(&self, index: usize, stop: F) -> Result<RecordedAnswer, CaptureError>
    where
        F: Future<Output = ()>,
    {
        self.begin_capture(index).await?;
        let stopped_by_time_limit = self.await_stop(index, stop).await;
        let state = self.end_capture(index).await?;
        Ok(RecordedAnswer {
            state,
            stopped_by_time_limit,
        })
    }

    /// Ordered payload of every answer; fails unless all slots are ready
    pub fn build_payload(&self) -> Result<SubmissionPayload, SubmitError> {
        let slots = self.slots.lock();
        let missing: Vec<usize> = slots
            .iter()
            .filter(|e| !e.slot.is_ready())
            .map(|e| e.slot.index())
            .collect();
        if !missing.is_empty() {
            return Err(SubmitError::Incomplete { missing });
        }

        let artifacts = slots
            .iter()
            .filter_map(|e| e.slot.artifact().cloned())
            .collect();
        Ok(SubmissionPayload::new(artifacts))
    }

    /// Submit every answer to `job_id` as one request.
    ///
    /// On success the session ends: slots are destroyed and previews revoked.
    /// On failure nothing changes, so the call can simply be retried.
    /// Answers are frozen until the request completes.
    pub async fn submit(&self, job_id: &str, token: &str) -> Result<SubmissionReceipt, SubmitError> {
        if self.is_torn_down() {
            return Err(SubmitError::TornDown);
        }
        {
            // Raised under the slot lock so no mutation can slip in between
            // the flag and the payload snapshot.
            let _slots = self.slots.lock();
            if self
                .submitting
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(SubmitError::InProgress);
            }
        }
        let _guard = SubmitGuard(&self.submitting);

        let payload = self.build_payload()?;
        info!(
            job_id,
            answers = payload.len(),
            bytes = payload.total_bytes(),
            "Submitting application"
        );

        let receipt = match self.api.submit_application(job_id, token, &payload).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(job_id, error = %e, "Submission failed");
                return Err(e.into());
            }
        };

        info!(job_id, application_id = ?receipt.application_id, "Application submitted");
        self.teardown();
        Ok(receipt)
    }

    /// End the session: release every live stream (even mid-recording)
    /// and revoke every preview. Later operations fail with `TornDown`.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }

        let (captures, previews) = {
            let mut slots = self.slots.lock();
            let mut captures = Vec::new();
            let mut previews = Vec::new();
            for entry in slots.iter_mut() {
                entry.generation += 1;
                if let Some(capture) = entry.capture.take() {
                    captures.push(capture);
                }
                if let Some(preview) = entry.slot.clear().preview {
                    previews.push(preview);
                }
            }
            (captures, previews)
        };

        let released = captures.len();
        drop(captures);
        for preview in &previews {
            self.previews.revoke(preview);
        }
        debug!(
            streams = released,
            previews = previews.len(),
            "Capture session torn down"
        );
    }

    fn fail_slot(&self, index: usize, generation: u64, reason: &str) {
        let stale_capture = {
            let mut slots = self.slots.lock();
            let Some(entry) = slots.get_mut(index) else {
                return;
            };
            if entry.generation != generation || !entry.slot.state().holds_device() {
                return;
            }
            if entry.slot.fail(reason).is_ok() {
                debug!(slot = index, reason, "Slot failed");
            }
            entry.capture.take()
        };
        drop(stale_capture);
    }

    async fn validate(&self, artifact: &VideoArtifact) -> Result<VideoDimensions, String> {
        if artifact.is_empty() {
            return Err("recording contains no data".to_string());
        }
        let dimensions = self
            .probe
            .dimensions(artifact)
            .await
            .map_err(|e| e.to_string())?;
        if !dimensions.is_valid() {
            return Err(format!("decoded dimensions are {}", dimensions));
        }
        Ok(dimensions)
    }

    async fn create_preview(&self, index: usize, artifact: &VideoArtifact) -> Option<PreviewUrl> {
        match self.previews.create(artifact).await {
            Ok(preview) => Some(preview),
            Err(e) => {
                warn!(slot = index, error = %e, "Preview unavailable");
                None
            }
        }
    }
}

impl<D, P, S, A> Drop for CaptureController<D, P, S, A>
where
    D: MediaDeviceProvider,
    P: MediaProbe,
    S: PreviewStore,
    A: JobApi,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
