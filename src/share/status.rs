//! Transient status text that clears itself after a fixed interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Self-clearing one-line status, observed through a watch channel.
///
/// A newer `flash` supersedes the pending clear of an older one.
#[derive(Clone)]
pub struct StatusLine {
    tx: watch::Sender<String>,
    seq: Arc<AtomicU64>,
}

impl StatusLine {
    /// How long a flashed message stays visible.
    pub const CLEAR_AFTER: Duration = Duration::from_millis(1600);

    pub fn new() -> Self {
        let (tx, _) = watch::channel(String::new());
        Self {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Waits until the current message has cleared. Returns immediately
    /// when nothing is showing.
    pub async fn wait_clear(&self) {
        let mut rx = self.subscribe();
        loop {
            if rx.borrow_and_update().is_empty() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Shows `text` and schedules its removal. Must be called from within
    /// a tokio runtime.
    pub fn flash(&self, text: &str) {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.tx.send(text.to_string());

        let tx = self.tx.clone();
        let seq = self.seq.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Self::CLEAR_AFTER).await;
            // Only clear if no newer flash replaced this one.
            if seq.load(Ordering::SeqCst) == ticket {
                let _ = tx.send(String::new());
            }
        });
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn flash_clears_after_the_interval() {
        let status = StatusLine::new();
        status.flash("Copied!");
        assert_eq!(status.current(), "Copied!");

        tokio::time::sleep(StatusLine::CLEAR_AFTER + Duration::from_millis(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(status.current(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn wait_clear_returns_once_the_flash_expires() {
        use crate::share::clipboard::CopyOutcome;

        let status = StatusLine::new();
        status.flash(CopyOutcome::Copied.status_text());
        assert_eq!(status.current(), "Copied!");

        status.wait_clear().await;
        assert_eq!(status.current(), "");
    }

    #[tokio::test]
    async fn wait_clear_is_immediate_when_nothing_is_showing() {
        let status = StatusLine::new();
        status.wait_clear().await;
        assert_eq!(status.current(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn newer_flash_survives_older_clear_timer() {
        let status = StatusLine::new();
        status.flash("Copied!");

        tokio::time::sleep(Duration::from_millis(800)).await;
        status.flash("Copy failed");

        // The first flash's timer fires now but must not clear the newer text.
        tokio::time::sleep(Duration::from_millis(900)).await;
        tokio::task::yield_now().await;
        assert_eq!(status.current(), "Copy failed");

        tokio::time::sleep(StatusLine::CLEAR_AFTER).await;
        tokio::task::yield_now().await;
        assert_eq!(status.current(), "");
    }
}
