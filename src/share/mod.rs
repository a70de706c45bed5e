//! Post-result distribution: clipboard copy, native share, share links.
//!
//! Everything here is best-effort by contract. Clipboard denial, a missing
//! share handler, or a dismissed share dialog never propagate as errors of
//! the transfer lifecycle; callers get a soft outcome at most.

pub mod clipboard;
pub mod links;
pub mod native;
pub mod status;

pub use clipboard::{copy_page_link, Clipboard, CopyOutcome, SystemClipboard};
pub use links::ShareLinks;
pub use native::{share_link, share_result_image, ShareCapabilities};
pub use status::StatusLine;
