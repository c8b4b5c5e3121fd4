/// Background view counter
///
/// Page views enqueue a bump on a bounded channel and return immediately.
/// One worker task drains the channel, coalesces everything pending into a
/// single increment and writes it to the store. Store failures are logged
/// and dropped; they never reach the request that caused the bump.
///
/// When the channel is full the bump is added to an overflow tally instead
/// of being queued, and the worker is woken to fold the tally into a flush.
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::db::PostStore;

/// Maximum queued bumps folded into one flush
const MAX_COALESCED_BUMPS: u64 = 4096;

/// Bumps that did not fit in the channel
#[derive(Default)]
struct Overflow {
    pending: AtomicU64,
    wake: Notify,
}

impl Overflow {
    fn record(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        // A stored permit survives until the worker next waits, so a bump
        // recorded after the worker's last take is never stranded.
        self.wake.notify_one();
    }

    fn take(&self) -> u64 {
        self.pending.swap(0, Ordering::AcqRel)
    }
}

/// Cheap, cloneable handle for bumping the view counter
#[derive(Clone)]
pub struct ViewCounter {
    sender: mpsc::Sender<()>,
    overflow: Arc<Overflow>,
}

impl ViewCounter {
    /// Start the worker and return a handle to it.
    ///
    /// The worker stops once every `ViewCounter` clone is dropped, after
    /// flushing whatever is still pending.
    pub fn spawn(store: Arc<dyn PostStore>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let overflow = Arc::new(Overflow::default());
        let handle = tokio::spawn(run_worker(store, receiver, overflow.clone()));
        (Self { sender, overflow }, handle)
    }

    /// Record one page view without waiting for the store.
    pub fn bump(&self) {
        match self.sender.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                self.overflow.record();
                debug!("View counter queue full, merging bump into next flush");
            }
            Err(TrySendError::Closed(())) => {
                warn!("View counter worker stopped, dropping bump");
            }
        }
    }
}

async fn run_worker(
    store: Arc<dyn PostStore>,
    mut receiver: mpsc::Receiver<()>,
    overflow: Arc<Overflow>,
) {
    info!("View counter worker started");

    loop {
        let mut pending: u64 = tokio::select! {
            received = receiver.recv() => match received {
                Some(()) => 1,
                None => break,
            },
            _ = overflow.wake.notified() => 0,
        };

        while pending < MAX_COALESCED_BUMPS && receiver.try_recv().is_ok() {
            pending += 1;
        }
        pending += overflow.take();

        if pending > 0 {
            flush(store.as_ref(), pending).await;
        }
    }

    let remaining = overflow.take();
    if remaining > 0 {
        flush(store.as_ref(), remaining).await;
    }

    info!("View counter worker stopped (channel closed)");
}

async fn flush(store: &dyn PostStore, pending: u64) {
    let delta = i64::try_from(pending).unwrap_or(i64::MAX);

    match AssertUnwindSafe(store.increment_view_counter(delta))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => debug!(delta, "View counter updated"),
        Ok(Err(e)) => error!(error = %e, lost_views = delta, "View counter update failed"),
        Err(_) => error!(lost_views = delta, "View counter update panicked"),
    }
}
