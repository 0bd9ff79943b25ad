//! The "current snapshot" slot and cycle bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mempool_types::{current_timestamp_ms, Snapshot};
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::CycleError;

/// Receiver side of the published-snapshot channel.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<Snapshot>>>;

/// Lifecycle of a poller.
///
/// `Failed` only describes the most recent cycle; a snapshot published
/// earlier stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerStatus {
    /// No cycle has completed yet.
    Uninitialized,
    /// A cycle is in flight.
    Refreshing,
    /// The last cycle published a snapshot.
    Ready,
    /// The last cycle failed.
    Failed,
}

/// The most recent cycle failure.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleFailure {
    pub error: CycleError,
    /// Unix timestamp in milliseconds when the failure was recorded.
    pub at_ms: u64,
}

/// Single-writer, multi-reader slot holding the last good snapshot.
///
/// Publishing replaces the `Arc` in one step, so a reader sees either the
/// previous snapshot or the new one, never a mix.
#[derive(Debug)]
pub(crate) struct SnapshotSlot {
    current: watch::Sender<Option<Arc<Snapshot>>>,
    sequence: AtomicU64,
    last_error: RwLock<Option<CycleFailure>>,
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            sequence: AtomicU64::new(0),
            last_error: RwLock::new(None),
        }
    }
}

impl SnapshotSlot {
    /// Stamp the next sequence number on `snapshot` and make it current.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let snapshot = Arc::new(snapshot.with_sequence(sequence));

        *self.last_error.write() = None;
        self.current.send_replace(Some(snapshot.clone()));
        snapshot
    }

    /// Remember a failed cycle without touching the current snapshot.
    pub fn record_failure(&self, error: CycleError) {
        *self.last_error.write() = Some(CycleFailure {
            error,
            at_ms: current_timestamp_ms(),
        });
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.current.subscribe()
    }

    pub fn last_error(&self) -> Option<CycleFailure> {
        self.last_error.read().clone()
    }

    pub fn status(&self, refreshing: bool) -> PollerStatus {
        if refreshing {
            PollerStatus::Refreshing
        } else if self.last_error.read().is_some() {
            PollerStatus::Failed
        } else if self.current.borrow().is_some() {
            PollerStatus::Ready
        } else {
            PollerStatus::Uninitialized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mempool_client::ClientError;
    use mempool_types::{Block, Fees};

    fn snapshot(height: u64) -> Snapshot {
        Snapshot::builder()
            .fees(Fees::default())
            .mempool(Default::default())
            .tip_hash("00aa")
            .latest_block(Block {
                id: Some("00aa".into()),
                height: Some(height),
                ..Default::default()
            })
            .difficulty_adjustment(Default::default())
            .hashrate(Default::default())
            .reward_stats(Default::default())
            .prices(Default::default())
            .build()
            .unwrap()
    }

    #[test]
    fn publish_assigns_increasing_sequence() {
        let slot = SnapshotSlot::default();
        assert_eq!(slot.publish(snapshot(1)).sequence, 1);
        assert_eq!(slot.publish(snapshot(2)).sequence, 2);
        assert_eq!(slot.current().unwrap().tip_height, 2);
    }

    #[test]
    fn failure_keeps_current_snapshot() {
        let slot = SnapshotSlot::default();
        let published = slot.publish(snapshot(7));

        slot.record_failure(CycleError::Batch(ClientError::Connection("down".into())));

        let current = slot.current().unwrap();
        assert!(Arc::ptr_eq(&current, &published));
        assert!(slot.last_error().is_some());
        assert_eq!(slot.status(false), PollerStatus::Failed);
    }

    #[test]
    fn publish_clears_last_error() {
        let slot = SnapshotSlot::default();
        slot.record_failure(CycleError::Batch(ClientError::Connection("down".into())));
        slot.publish(snapshot(1));

        assert!(slot.last_error().is_none());
        assert_eq!(slot.status(false), PollerStatus::Ready);
    }

    #[test]
    fn status_transitions() {
        let slot = SnapshotSlot::default();
        assert_eq!(slot.status(false), PollerStatus::Uninitialized);
        assert_eq!(slot.status(true), PollerStatus::Refreshing);
        slot.publish(snapshot(1));
        assert_eq!(slot.status(false), PollerStatus::Ready);
    }

    #[test]
    fn subscribers_see_published_snapshot() {
        let slot = SnapshotSlot::default();
        let mut rx = slot.subscribe();
        assert!(rx.borrow().is_none());

        slot.publish(snapshot(3));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().tip_height, 3);
    }
}
