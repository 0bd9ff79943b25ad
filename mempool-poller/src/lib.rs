//! # mempool-poller
//!
//! Periodically polls a mempool.space compatible API, aggregates the results
//! of each cycle into one immutable [`Snapshot`], and exposes it to any number
//! of readers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mempool_poller::{setup, Output, SensorKey, Settings};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Validate the endpoint, run the first cycle, then refresh every minute
//!     let monitor = setup(Settings {
//!         base_url: "https://mempool.space".into(),
//!         interval: Duration::from_secs(60),
//!         outputs: vec![Output::file("snapshot.json")],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//!     let mut height = monitor.poller().sensor(SensorKey::BlockHeight);
//!     while height.changed().await {
//!         println!("height: {:?}", height.value());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Cycle
//!
//! Fees, mempool, tip hash, difficulty adjustment, hashrate, reward stats and
//! prices are fetched concurrently. Once all of them succeed, the block named
//! by the tip hash is fetched. Any failure discards the whole cycle.
//!
//! ## Guarantees
//!
//! - **All or nothing**: partial snapshots are never published
//! - **Stale but available**: a failed cycle keeps the previous snapshot
//! - **One cycle at a time**: concurrent refresh requests share the in-flight cycle
//! - **Atomic publish**: readers see the old snapshot or the new one, never a mix

mod cycle;
mod error;
mod handle;
mod output;
mod poller;
pub mod projection;
mod setup;
mod state;

pub use cycle::run_cycle;
pub use error::{CycleError, SetupError};
pub use handle::Sensor;
pub use output::{Output, SnapshotCallback};
pub use poller::{Poller, PollerBuilder, PollerHandle, DEFAULT_INTERVAL};
pub use projection::{project_all, Attributes, SensorKey, SensorValue};
pub use setup::{setup, validate, Monitor, Settings};
pub use state::{CycleFailure, PollerStatus, SnapshotReceiver};

// Re-export types for convenience
pub use mempool_client::{
    BaseUrl, ClientError, MempoolApi, MempoolClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use mempool_types::Snapshot;
