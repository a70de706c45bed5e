use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use lastsnap::errors::TransferError;
use lastsnap::transfer::{EventSink, FileCandidate, TransferEvent, Transport};

/// One scripted transport step.
#[derive(Clone)]
pub enum MockStep {
    Progress(u8),
    Wait(Duration),
    Complete(Bytes),
    Fail(TransferError),
}

/// Replays a fixed step sequence. Deliberately ignores the cancellation
/// token so tests can prove that events arriving after a terminal state
/// are discarded by the controller.
pub struct MockTransport {
    script: Vec<MockStep>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(script: Vec<MockStep>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    /// Progress updates followed by a successful completion.
    pub fn succeed_with(payload: &[u8], progress: &[u8]) -> Arc<Self> {
        let mut script: Vec<MockStep> =
            progress.iter().map(|p| MockStep::Progress(*p)).collect();
        script.push(MockStep::Complete(Bytes::copy_from_slice(payload)));
        Self::new(script)
    }

    pub fn fail_with(err: TransferError) -> Arc<Self> {
        Self::new(vec![MockStep::Fail(err)])
    }

    /// How many times `send` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        _candidate: FileCandidate,
        events: EventSink,
        _cancel: CancellationToken,
    ) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for step in self.script.clone() {
            match step {
                MockStep::Wait(duration) => tokio::time::sleep(duration).await,
                MockStep::Progress(pct) => {
                    let _ = events.send(TransferEvent::Progress(pct));
                }
                MockStep::Complete(body) => {
                    let _ = events.send(TransferEvent::Completed(body));
                }
                MockStep::Fail(err) => {
                    let _ = events.send(TransferEvent::Failed(err));
                }
            }
        }
    }
}
