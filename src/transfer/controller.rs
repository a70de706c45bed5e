//! The upload lifecycle state machine.
//!
//! Drives one transfer at a time from `Idle` to a terminal phase. All
//! mutation happens behind a single lock and every change is published as
//! a cloned snapshot through a watch channel, so observers never see an
//! intermediate state.
//!
//! Policy: a `submit` while a transfer is in flight is ignored. The intake
//! surface disappears during an active transfer, so a second submission is
//! a stray event rather than an intent to replace.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::consts::ACCEPTED_MIME;
use crate::errors::TransferError;
use crate::transfer::state::{FileCandidate, FrameHandle, Phase, TransferState};
use crate::transfer::transport::{TransferEvent, Transport};

struct Inner {
    state: TransferState,
    /// Bumped on every new transfer and on reset; events tagged with an
    /// older generation are discarded.
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Owns `TransferState` and exposes submit/cancel/reset plus observation.
///
/// Cheap to clone; clones share the same state machine. Errors never
/// escape this boundary: consumers observe only `phase` and
/// `error_message`.
#[derive(Clone)]
pub struct TransferController {
    transport: Arc<dyn Transport>,
    inner: Arc<Mutex<Inner>>,
    state_tx: watch::Sender<TransferState>,
}

impl TransferController {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (state_tx, _) = watch::channel(TransferState::default());
        Self {
            transport,
            inner: Arc::new(Mutex::new(Inner {
                state: TransferState::default(),
                generation: 0,
                cancel: None,
            })),
            state_tx,
        }
    }

    /// Watch channel carrying a snapshot per state change.
    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state_tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> TransferState {
        self.state_tx.borrow().clone()
    }

    /// Validates the candidate and starts the transfer.
    ///
    /// A wrong media type fails immediately without touching the network.
    /// On acceptance the state passes through `Validating` into
    /// `Transferring` before this returns; the upload itself runs on a
    /// spawned task. Must be called from within a tokio runtime.
    pub fn submit(&self, candidate: FileCandidate) {
        let (generation, cancel) = {
            let mut inner = self.lock();

            if inner.state.phase == Phase::Transferring {
                tracing::debug!(file = %candidate.name, "submit ignored: transfer in flight");
                return;
            }

            if candidate.mime_type != ACCEPTED_MIME {
                let err = TransferError::Validation(candidate.mime_type.clone());
                tracing::warn!(file = %candidate.name, "rejected: {err}");
                inner.generation += 1;
                inner.state = TransferState {
                    phase: Phase::Failed,
                    source_file: Some(candidate),
                    progress_percent: 0,
                    result: None,
                    error_message: Some(err.user_message()),
                };
                inner.cancel = None;
                self.publish(&inner);
                return;
            }

            tracing::info!(file = %candidate.name, size = candidate.size, "starting transfer");

            // Replacing the snapshot drops any previously held frame.
            inner.generation += 1;
            inner.state = TransferState {
                phase: Phase::Validating,
                source_file: Some(candidate.clone()),
                ..TransferState::default()
            };
            self.publish(&inner);

            inner.state.phase = Phase::Transferring;
            self.publish(&inner);

            let cancel = CancellationToken::new();
            inner.cancel = Some(cancel.clone());
            (inner.generation, cancel)
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let transport = self.transport.clone();
        tokio::spawn(async move {
            transport.send(candidate, events_tx, cancel).await;
        });
        self.spawn_event_loop(generation, events_rx);
    }

    /// Aborts the in-flight transfer. Idempotent; a no-op outside
    /// `Transferring`.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if inner.state.phase != Phase::Transferring {
            return;
        }

        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }

        tracing::info!("upload cancelled by user");
        inner.state.phase = Phase::Failed;
        inner.state.error_message = Some(TransferError::Cancelled.user_message());
        inner.state.result = None;
        self.publish(&inner);
    }

    /// Returns to `Idle` from a terminal phase, releasing the result.
    /// A no-op elsewhere.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if !inner.state.phase.is_terminal() {
            return;
        }

        inner.generation += 1;
        inner.state = TransferState::default();
        inner.cancel = None;
        self.publish(&inner);
    }

    /// Waits for the current transfer to reach `Succeeded` or `Failed` and
    /// returns that snapshot.
    pub async fn wait_terminal(&self) -> TransferState {
        let mut rx = self.subscribe();
        loop {
            {
                let state = rx.borrow_and_update().clone();
                if state.is_terminal() {
                    return state;
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    fn spawn_event_loop(
        &self,
        generation: u64,
        mut events: mpsc::UnboundedReceiver<TransferEvent>,
    ) {
        let inner = self.inner.clone();
        let state_tx = self.state_tx.clone();

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let mut guard = inner.lock().unwrap_or_else(|e| e.into_inner());

                // Terminal state is authoritative; anything arriving after
                // it (or from a superseded transfer) is stale.
                if guard.generation != generation || guard.state.phase.is_terminal() {
                    tracing::debug!("discarding stale transfer event");
                    continue;
                }

                match event {
                    TransferEvent::Progress(pct) => {
                        guard.state.progress_percent =
                            guard.state.progress_percent.max(pct.min(100));
                    }
                    TransferEvent::Completed(body) => {
                        tracing::info!(len = body.len(), "frame extracted");
                        guard.state.progress_percent = 100;
                        guard.state.phase = Phase::Succeeded;
                        guard.state.result = Some(Arc::new(FrameHandle::new(body)));
                        guard.state.error_message = None;
                        guard.cancel = None;
                    }
                    TransferEvent::Failed(err) => {
                        tracing::warn!("transfer failed: {err}");
                        guard.state.phase = Phase::Failed;
                        guard.state.error_message = Some(err.user_message());
                        guard.state.result = None;
                        guard.cancel = None;
                    }
                }

                let _ = state_tx.send(guard.state.clone());
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, inner: &Inner) {
        let _ = self.state_tx.send(inner.state.clone());
    }
}
