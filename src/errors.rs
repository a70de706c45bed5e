//! Error taxonomy for the transfer lifecycle.
//!
//! The variants exist for diagnostics only. Every one of them collapses
//! into `Phase::Failed` with a human-readable message; consumers never see
//! the taxonomy itself.

use thiserror::Error;

/// Why a transfer ended in `Phase::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Wrong file type. Rejected before any bytes move.
    #[error("unsupported media type: {0}")]
    Validation(String),

    /// No response from the service at all.
    #[error("transport failure: {0}")]
    Network(String),

    /// The service answered with a non-2xx status (or an unusable body).
    #[error("service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// User-initiated abort.
    #[error("cancelled by user")]
    Cancelled,
}

impl TransferError {
    /// The message surfaced through `TransferState::error_message`.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Only MP4 files are supported".into(),
            Self::Network(_) => "Network error occurred".into(),
            Self::Service { message, .. } => message.clone(),
            Self::Cancelled => "Upload cancelled".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TransferError;

    #[test]
    fn validation_maps_to_fixed_user_message() {
        let err = TransferError::Validation("video/quicktime".into());
        assert_eq!(err.user_message(), "Only MP4 files are supported");
    }

    #[test]
    fn service_error_surfaces_its_own_message() {
        let err = TransferError::Service {
            status: 500,
            message: "decode failed".into(),
        };
        assert_eq!(err.user_message(), "decode failed");
        assert_eq!(err.to_string(), "service error (status 500): decode failed");
    }

    #[test]
    fn cancellation_has_fixed_user_message() {
        assert_eq!(TransferError::Cancelled.user_message(), "Upload cancelled");
    }
}
