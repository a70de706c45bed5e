//! Snapshot types for the upload lifecycle.

use anyhow::{Context, Result};
use bytes::Bytes;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Discrete lifecycle phase of the transfer controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Transferring,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Where a candidate's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Bytes),
}

/// A file offered for upload. Carries just enough metadata to validate
/// before any bytes move.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub source: FileSource,
}

impl FileCandidate {
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type: mime_for_extension(path),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: &str, mime_type: &str, bytes: Bytes) -> Self {
        Self {
            name: name.to_string(),
            size: bytes.len() as u64,
            mime_type: mime_type.to_string(),
            source: FileSource::Bytes(bytes),
        }
    }
}

/// Declared type mirrors what a browser would report for the extension.
fn mime_for_extension(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// The extracted frame, exclusively owned by the succeeded state.
///
/// Holds the JPEG bytes in memory and stages an on-disk copy on demand for
/// share handlers. The staged file is removed when the handle is dropped,
/// so replacing or resetting the state releases the resource.
pub struct FrameHandle {
    bytes: Bytes,
    staged: Mutex<Option<NamedTempFile>>,
}

impl FrameHandle {
    pub fn new(bytes: Bytes) -> Self {
        Self {
            bytes,
            staged: Mutex::new(None),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes the frame to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("Failed to save frame to {}", path.display()))
    }

    /// Stages the frame as a named temp file for share handlers and returns
    /// its path. Repeated calls reuse the same file.
    pub fn materialize(&self) -> Result<PathBuf> {
        let mut staged = self.staged.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(file) = staged.as_ref() {
            return Ok(file.path().to_path_buf());
        }

        let mut file = tempfile::Builder::new()
            .prefix("last-snap-")
            .suffix(".jpg")
            .tempfile()
            .context("Failed to stage frame for sharing")?;
        file.write_all(&self.bytes)
            .context("Failed to write staged frame")?;

        let path = file.path().to_path_buf();
        *staged = Some(file);
        Ok(path)
    }
}

impl fmt::Debug for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHandle")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Cloneable snapshot published to observers after every mutation.
///
/// Outside `Idle`/`Validating`/`Transferring`, exactly one of `result` and
/// `error_message` is present.
#[derive(Debug, Clone, Default)]
pub struct TransferState {
    pub phase: Phase,
    pub source_file: Option<FileCandidate>,
    /// 0-100, monotone non-decreasing while `Transferring`.
    pub progress_percent: u8,
    pub result: Option<Arc<FrameHandle>>,
    pub error_message: Option<String>,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_succeeded_and_failed_are_terminal() {
        assert!(!Phase::Idle.is_terminal());
        assert!(!Phase::Validating.is_terminal());
        assert!(!Phase::Transferring.is_terminal());
        assert!(Phase::Succeeded.is_terminal());
        assert!(Phase::Failed.is_terminal());
    }

    #[test]
    fn mime_follows_extension_case_insensitively() {
        assert_eq!(mime_for_extension(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_for_extension(Path::new("clip.MP4")), "video/mp4");
        assert_eq!(mime_for_extension(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(
            mime_for_extension(Path::new("noext")),
            "application/octet-stream"
        );
    }

    #[test]
    fn candidate_from_bytes_reports_length_as_size() {
        let candidate =
            FileCandidate::from_bytes("clip.mp4", "video/mp4", Bytes::from_static(b"abcd"));
        assert_eq!(candidate.size, 4);
        assert_eq!(candidate.name, "clip.mp4");
    }

    #[test]
    fn frame_handle_saves_and_stages_same_bytes() {
        let handle = FrameHandle::new(Bytes::from_static(b"\xFF\xD8fakejpeg"));
        let dir = tempfile::tempdir().expect("temp dir");

        let out = dir.path().join("frame.jpg");
        handle.save_to(&out).expect("save");
        assert_eq!(
            std::fs::read(&out).expect("read back"),
            handle.bytes().as_ref()
        );

        let staged = handle.materialize().expect("materialize");
        assert_eq!(
            std::fs::read(&staged).expect("read staged"),
            handle.bytes().as_ref()
        );
        // Same staged file on repeat calls.
        assert_eq!(handle.materialize().expect("materialize again"), staged);
    }

    #[test]
    fn staged_file_is_removed_on_drop() {
        let handle = FrameHandle::new(Bytes::from_static(b"bytes"));
        let staged = handle.materialize().expect("materialize");
        assert!(staged.exists());
        drop(handle);
        assert!(!staged.exists());
    }

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = TransferState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.source_file.is_none());
        assert_eq!(state.progress_percent, 0);
        assert!(state.result.is_none());
        assert!(state.error_message.is_none());
    }
}
