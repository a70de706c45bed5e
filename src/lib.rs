pub mod common;
pub mod errors;
pub mod output;
pub mod share;
pub mod transfer;

// Fixed strings shared by the controller, the transports, and the CLI.
pub mod consts {
    /// The single accepted upload type.
    pub const ACCEPTED_MIME: &str = "video/mp4";
    /// Multipart field name the extraction service expects.
    pub const UPLOAD_FIELD: &str = "video";
    /// Path of the extraction endpoint, relative to the configured base URL.
    pub const EXTRACT_PATH: &str = "/extract-frame";
    /// Default filename for the saved frame.
    pub const RESULT_FILENAME: &str = "last-snap.jpg";
    /// Descriptive text attached to outbound share links.
    pub const SHARE_TEXT: &str = "LastSnap - capture the final frame";
}
