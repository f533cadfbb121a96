//! Ordered submission payload

use super::artifact::VideoArtifact;

/// Multipart field name for answer `index`
pub fn answer_field_name(index: usize) -> String {
    format!("video_{}", index)
}

/// The ordered answers of one application, one per question.
/// Built fresh at submit time from ready slots and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    artifacts: Vec<VideoArtifact>,
}

impl SubmissionPayload {
    pub fn new(artifacts: Vec<VideoArtifact>) -> Self {
        Self { artifacts }
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn artifacts(&self) -> &[VideoArtifact] {
        &self.artifacts
    }

    /// `(field name, artifact)` pairs in question order
    pub fn fields(&self) -> impl Iterator<Item = (String, &VideoArtifact)> {
        self.artifacts
            .iter()
            .enumerate()
            .map(|(i, artifact)| (answer_field_name(i), artifact))
    }

    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(VideoArtifact::size_bytes).sum()
    }
}
