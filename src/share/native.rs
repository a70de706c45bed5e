//! Native share with runtime capability probing.
//!
//! Availability depends on what handlers the current session exposes, and
//! that can change underneath a long-lived process, so capabilities are
//! probed on every call and never cached.

use std::process::{Command, Stdio};

use crate::transfer::state::FrameHandle;

/// What the running environment can share right now.
///
/// `detect()` is the single probe point; the share functions below consume
/// a fresh detection per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareCapabilities {
    pub can_share: bool,
    pub can_share_files: bool,
    backend: Option<Backend>,
}

impl ShareCapabilities {
    pub fn detect() -> Self {
        match find_backend() {
            Some(backend) => Self {
                can_share: true,
                can_share_files: backend.accepts_files,
                backend: Some(backend),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Backend {
    program: &'static str,
    accepts_files: bool,
}

/// Platform share handlers, probed in order. `xdg-open` takes URLs only;
/// handing it a bare file path opens a viewer, not a share dialog.
const BACKENDS: &[Backend] = &[
    Backend {
        program: "termux-share",
        accepts_files: true,
    },
    Backend {
        program: "open",
        accepts_files: true,
    },
    Backend {
        program: "xdg-open",
        accepts_files: false,
    },
];

fn find_backend() -> Option<Backend> {
    BACKENDS.iter().copied().find(|b| on_path(b.program))
}

fn on_path(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
}

fn run_quiet(program: &str, arg: &std::ffi::OsStr) {
    let outcome = Command::new(program)
        .arg(arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    // A dismissed dialog or failed handler is a silent no-op.
    if let Err(err) = outcome {
        tracing::debug!("share handler {program} failed: {err}");
    }
}

/// Hands the page address to the platform share handler, if one exists.
pub fn share_link(page_url: &str) {
    let caps = ShareCapabilities::detect();
    let Some(backend) = caps.backend else {
        tracing::debug!("no share handler on PATH");
        return;
    };
    run_quiet(backend.program, std::ffi::OsStr::new(page_url));
}

/// Shares the extracted frame as a named file when the platform supports
/// file payloads, otherwise falls back to sharing the page link. Always
/// best-effort; no failure reaches the caller.
pub fn share_result_image(frame: &FrameHandle, page_url: &str) {
    let caps = ShareCapabilities::detect();
    let Some(backend) = caps.backend else {
        tracing::debug!("no share handler on PATH");
        return;
    };

    if caps.can_share_files {
        match frame.materialize() {
            Ok(path) => {
                run_quiet(backend.program, path.as_os_str());
                return;
            }
            Err(err) => tracing::debug!("could not stage frame for sharing: {err}"),
        }
    }

    share_link(page_url);
}
