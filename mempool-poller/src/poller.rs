//! The polling coordinator.

use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared, WeakShared};
use mempool_client::MempoolApi;
use mempool_types::Snapshot;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cycle::run_cycle;
use crate::handle::Sensor;
use crate::output::Output;
use crate::projection::SensorKey;
use crate::state::{CycleFailure, PollerStatus, SnapshotReceiver, SnapshotSlot};
use crate::CycleError;

/// Default time between the end of one cycle and the start of the next.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

type CycleResult = Result<Arc<Snapshot>, CycleError>;
type SharedCycle = Shared<BoxFuture<'static, CycleResult>>;

/// Owns the current snapshot and runs aggregation cycles.
///
/// At most one cycle runs at a time: a refresh requested while another is in
/// flight joins it and receives the same result. A failed cycle leaves the
/// previously published snapshot in place.
///
/// Cloning is cheap; clones share the same state.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use mempool_client::MempoolClient;
/// use mempool_poller::{Poller, SensorKey};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = MempoolClient::builder().build()?;
///     let poller = Poller::builder(Arc::new(client))
///         .interval(Duration::from_secs(60))
///         .build();
///
///     // Nothing is usable until the first cycle succeeds
///     poller.bootstrap().await?;
///
///     // Refresh in the background every 60 seconds
///     let _handle = poller.start();
///
///     let height = poller.sensor(SensorKey::BlockHeight);
///     println!("height: {:?}", height.value());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Poller {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn MempoolApi>,
    slot: SnapshotSlot,
    outputs: Vec<Output>,
    interval: Duration,
    in_flight: Mutex<Option<WeakShared<BoxFuture<'static, CycleResult>>>>,
}

impl Poller {
    /// Create a builder for a poller over `api`.
    pub fn builder(api: Arc<dyn MempoolApi>) -> PollerBuilder {
        PollerBuilder::new(api)
    }

    /// Run the first cycle.
    ///
    /// Unlike scheduled refreshes, a failure here is returned to the caller
    /// so setup can be aborted.
    pub async fn bootstrap(&self) -> CycleResult {
        let snapshot = self.refresh().await?;
        info!(tip_height = snapshot.tip_height, "poller ready");
        Ok(snapshot)
    }

    /// Run a cycle now and wait for its result, joining one already in flight.
    pub async fn refresh(&self) -> CycleResult {
        let cycle = {
            let mut in_flight = self.inner.in_flight.lock();
            match in_flight.as_ref().and_then(WeakShared::upgrade) {
                Some(cycle) => {
                    debug!("joining in-flight cycle");
                    cycle
                }
                None => {
                    let cycle: SharedCycle = Inner::cycle(self.inner.clone()).boxed().shared();
                    *in_flight = cycle.downgrade();
                    cycle
                }
            }
        };
        cycle.await
    }

    /// The last successfully published snapshot, if any.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.inner.slot.current()
    }

    /// Watch for published snapshots.
    ///
    /// The receiver is notified after every successful publish, never on
    /// failure, and stays readable after the poller is dropped.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.inner.slot.subscribe()
    }

    /// A read handle projecting one value out of the current snapshot.
    pub fn sensor(&self, key: SensorKey) -> Sensor {
        Sensor::new(key, self.subscribe())
    }

    /// The most recent cycle failure, cleared by the next successful publish.
    pub fn last_error(&self) -> Option<CycleFailure> {
        self.inner.slot.last_error()
    }

    pub fn status(&self) -> PollerStatus {
        let refreshing = self
            .inner
            .in_flight
            .lock()
            .as_ref()
            .and_then(WeakShared::upgrade)
            .is_some();
        self.inner.slot.status(refreshing)
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Start refreshing in the background.
    ///
    /// Each cycle starts one interval after the previous one finished. The
    /// task ends when the returned handle is stopped or dropped, or when the
    /// last `Poller` clone is dropped.
    pub fn start(&self) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let inner = Arc::downgrade(&self.inner);
        let interval = self.inner.interval;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                let Some(poller) = upgrade(&inner) else {
                    break;
                };
                // Failures are recorded by the cycle; the next tick retries.
                let _ = poller.refresh().await;
            }
            debug!("scheduler stopped");
        });

        PollerHandle { stop_tx }
    }
}

fn upgrade(inner: &Weak<Inner>) -> Option<Poller> {
    inner.upgrade().map(|inner| Poller { inner })
}

impl Inner {
    async fn cycle(self: Arc<Self>) -> CycleResult {
        debug!("cycle started");
        let result = run_cycle(self.api.as_ref()).await;

        let outcome = match result {
            Ok(snapshot) => {
                let snapshot = self.slot.publish(snapshot);
                info!(
                    sequence = snapshot.sequence,
                    tip_height = snapshot.tip_height,
                    "snapshot published"
                );
                for output in &self.outputs {
                    if let Err(err) = output.emit(&snapshot).await {
                        warn!(?output, error = %err, "output failed");
                    }
                }
                Ok(snapshot)
            }
            Err(err) => {
                match self.slot.current() {
                    Some(stale) => warn!(
                        error = %err,
                        sequence = stale.sequence,
                        "refresh failed, keeping previous snapshot"
                    ),
                    None => warn!(error = %err, "refresh failed, no snapshot available"),
                }
                self.slot.record_failure(err.clone());
                Err(err)
            }
        };

        *self.in_flight.lock() = None;
        debug!("cycle finished");
        outcome
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("interval", &self.inner.interval)
            .field("outputs", &self.inner.outputs)
            .field("sequence", &self.current().map(|s| s.sequence))
            .finish()
    }
}

/// Builder for configuring a Poller.
pub struct PollerBuilder {
    api: Arc<dyn MempoolApi>,
    outputs: Vec<Output>,
    interval: Option<Duration>,
}

impl PollerBuilder {
    /// Create a new builder.
    pub fn new(api: Arc<dyn MempoolApi>) -> Self {
        Self {
            api,
            outputs: Vec::new(),
            interval: None,
        }
    }

    /// Add an output notified after each publish.
    ///
    /// Multiple outputs can be added; each snapshot is emitted to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the refresh interval.
    ///
    /// Defaults to 300 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Build the poller.
    pub fn build(self) -> Poller {
        Poller {
            inner: Arc::new(Inner {
                api: self.api,
                slot: SnapshotSlot::default(),
                outputs: self.outputs,
                interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
                in_flight: Mutex::new(None),
            }),
        }
    }
}

/// Handle for controlling background refresh.
///
/// Drop this handle to stop refreshing, or call `stop()` explicitly.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
}

impl PollerHandle {
    /// Stop background refresh. A cycle already in flight may still finish.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}
