//! Deterministic share links for third-party targets.
//!
//! Plain URL templates parameterized by the page address; no capability
//! detection and no network calls, so they are always renderable.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::consts::SHARE_TEXT;

/// Matches `encodeURIComponent`: unreserved marks stay literal.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Precomputed outbound share targets for a page address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub x: String,
    pub facebook: String,
    pub whatsapp: String,
    pub telegram: String,
    pub linkedin: String,
    pub email: String,
}

impl ShareLinks {
    pub fn for_page(page_url: &str) -> Self {
        let u = encode(page_url);
        let text = encode(SHARE_TEXT);

        Self {
            x: format!("https://twitter.com/intent/tweet?url={u}&text={text}"),
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={u}"),
            whatsapp: format!("https://wa.me/?text={u}"),
            telegram: format!("https://t.me/share/url?url={u}&text={text}"),
            linkedin: format!("https://www.linkedin.com/sharing/share-offsite/?url={u}"),
            email: format!("mailto:?subject={}&body={u}", encode("LastSnap")),
        }
    }

    /// Stable (label, url) pairs for rendering.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("X", &self.x),
            ("Facebook", &self.facebook),
            ("WhatsApp", &self.whatsapp),
            ("Telegram", &self.telegram),
            ("LinkedIn", &self.linkedin),
            ("Email", &self.email),
        ]
    }
}
