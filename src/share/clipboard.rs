//! Clipboard copy with a command-line fallback.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::Result;

/// Clipboard backend seam; mocked in tests.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via arboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| anyhow::anyhow!("Clipboard unavailable: {e}"))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text)
            .map_err(|e| anyhow::anyhow!("Clipboard write failed: {e}"))
    }
}

/// Copy helpers probed in order when arboard is unavailable (headless
/// sessions, denied Wayland access).
const COPY_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

fn copy_via_command(text: &str) -> bool {
    for (program, args) in COPY_COMMANDS {
        let child = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = child else { continue };

        let wrote = child
            .stdin
            .take()
            .map(|mut stdin| stdin.write_all(text.as_bytes()).is_ok())
            .unwrap_or(false);

        if wrote && matches!(child.wait(), Ok(status) if status.success()) {
            tracing::debug!("copied via {program}");
            return true;
        }
    }
    false
}

/// Outcome surfaced as a transient status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

impl CopyOutcome {
    pub fn status_text(&self) -> &'static str {
        match self {
            CopyOutcome::Copied => "Copied!",
            CopyOutcome::Failed => "Copy failed",
        }
    }
}

/// Copies the page address to the clipboard, falling back to an external
/// copy command when the system clipboard is unavailable. Never errors;
/// the caller displays the outcome and moves on.
pub fn copy_page_link(page_url: &str) -> CopyOutcome {
    if page_url.is_empty() {
        return CopyOutcome::Failed;
    }

    match SystemClipboard::new().and_then(|mut c| c.set_text(page_url)) {
        Ok(()) => CopyOutcome::Copied,
        Err(err) => {
            tracing::debug!("system clipboard unavailable: {err}");
            if copy_via_command(page_url) {
                CopyOutcome::Copied
            } else {
                CopyOutcome::Failed
            }
        }
    }
}
