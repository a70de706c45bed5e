//! Upload lifecycle: state machine, transports, result handling.

pub mod controller;
pub mod state;
pub mod transport;

pub use controller::TransferController;
pub use state::{FileCandidate, FileSource, FrameHandle, Phase, TransferState};
pub use transport::{EventSink, HttpTransport, TransferEvent, Transport};
