//! Sensor handle for reading a projected value.

use crate::projection::{Attributes, SensorKey, SensorValue};
use crate::state::SnapshotReceiver;

/// A read handle for one projected value.
///
/// This is the primary interface for presentation code. Obtain a sensor by
/// calling `Poller::sensor()`; it reads whatever snapshot is current at the
/// time of the call and keeps working (serving the last published snapshot)
/// after the poller is gone.
///
/// # Example
///
/// ```rust,no_run
/// use mempool_poller::{Poller, SensorKey};
///
/// # async fn run(poller: Poller) {
/// let mut fee = poller.sensor(SensorKey::FastestFee);
/// while fee.changed().await {
///     println!("{}: {:?} {}", fee.key().name(), fee.value(), fee.key().unit().unwrap_or(""));
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Sensor {
    key: SensorKey,
    receiver: SnapshotReceiver,
}

impl Sensor {
    pub(crate) fn new(key: SensorKey, receiver: SnapshotReceiver) -> Self {
        Self { key, receiver }
    }

    pub fn key(&self) -> SensorKey {
        self.key
    }

    /// Current value, or `None` if there is no snapshot or the field is absent.
    pub fn value(&self) -> Option<SensorValue> {
        self.key.value_of(self.receiver.borrow().as_deref())
    }

    /// Extra attributes for keys that carry them.
    pub fn attributes(&self) -> Option<Attributes> {
        let snapshot = self.receiver.borrow();
        self.key.attributes(snapshot.as_deref()?)
    }

    /// Sequence number of the snapshot this sensor currently reads.
    pub fn sequence(&self) -> Option<u64> {
        self.receiver.borrow().as_ref().map(|s| s.sequence)
    }

    /// Wait for the next publish.
    ///
    /// Returns `false` once the poller has been dropped and no further
    /// snapshots can arrive.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}
