//! Temp-file preview store adapter

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::application::ports::{PreviewError, PreviewStore};
use crate::domain::capture::{PreviewUrl, VideoArtifact};

/// Writes each preview to its own temp file and hands out `file://` URLs.
/// Remaining files are removed when the store is dropped.
pub struct TempFilePreviewStore {
    dir: PathBuf,
    live: Mutex<HashMap<PreviewUrl, PathBuf>>,
}

impl TempFilePreviewStore {
    /// Store previews in the system temp directory
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    /// Store previews in `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Local path behind a live preview
    pub fn path_of(&self, preview: &PreviewUrl) -> Option<PathBuf> {
        self.live.lock().get(preview).cloned()
    }

    /// Number of previews not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    fn remove(path: &PathBuf) {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove preview");
            }
        }
    }
}

impl Default for TempFilePreviewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreviewStore for TempFilePreviewStore {
    async fn create(&self, artifact: &VideoArtifact) -> Result<PreviewUrl, PreviewError> {
        let file = tempfile::Builder::new()
            .prefix("interview-preview-")
            .suffix(&format!(".{}", artifact.mime_type().extension()))
            .tempfile_in(&self.dir)
            .map_err(|e| PreviewError::CreateFailed(e.to_string()))?;

        let (_, path) = file
            .keep()
            .map_err(|e| PreviewError::CreateFailed(e.to_string()))?;

        if let Err(e) = tokio::fs::write(&path, artifact.data()).await {
            Self::remove(&path);
            return Err(PreviewError::CreateFailed(e.to_string()));
        }

        let url = PreviewUrl::new(format!("file://{}", path.display()));
        debug!(preview = %url, bytes = artifact.size_bytes(), "Preview created");
        self.live.lock().insert(url.clone(), path);
        Ok(url)
    }

    fn revoke(&self, preview: &PreviewUrl) {
        let path = self.live.lock().remove(preview);
        if let Some(path) = path {
            Self::remove(&path);
            debug!(preview = %preview, "Preview revoked");
        }
    }
}

impl Drop for TempFilePreviewStore {
    fn drop(&mut self) {
        for (_, path) in self.live.get_mut().drain() {
            Self::remove(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::VideoMimeType;

    fn artifact() -> VideoArtifact {
        VideoArtifact::new(vec![7u8; 16], VideoMimeType::WebmVp8, "answer_0.webm")
    }

    #[tokio::test]
    async fn create_writes_file_and_revoke_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFilePreviewStore::in_dir(dir.path());

        let url = store.create(&artifact()).await.unwrap();
        assert!(url.as_str().starts_with("file://"));
        assert!(url.as_str().ends_with(".webm"));

        let path = store.path_of(&url).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![7u8; 16]);

        store.revoke(&url);
        assert!(!path.exists());
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn each_preview_is_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFilePreviewStore::in_dir(dir.path());

        let a = store.create(&artifact()).await.unwrap();
        let b = store.create(&artifact()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn drop_removes_remaining_previews() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let store = TempFilePreviewStore::in_dir(dir.path());
            let url = store.create(&artifact()).await.unwrap();
            store.path_of(&url).unwrap()
        };
        assert!(!path.exists());
    }

    #[test]
    fn revoke_unknown_is_ignored() {
        let store = TempFilePreviewStore::new();
        store.revoke(&PreviewUrl::new("file:///nowhere"));
    }
}
