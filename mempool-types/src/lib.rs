//! # mempool-types
//!
//! Core types for aggregated blockchain-network statistics. A [`Snapshot`] is
//! the single, immutable result of one polling cycle against a mempool.space
//! compatible API: fee rates, mempool state, the chain tip and its block,
//! difficulty adjustment, hashrate, reward statistics and prices.
//!
//! ## Design Goals
//!
//! - **All or nothing**: a snapshot can only be built when every sub-record is present
//! - **Lenient fields**: upstream numbers that arrive as strings (or not at all)
//!   decode to `None` instead of failing the whole payload
//! - **Versioned schema**: snapshots carry a schema version and a publish sequence
//!
//! ## Example
//!
//! ```rust
//! use mempool_types::{Block, Fees, Snapshot};
//!
//! let block: Block = serde_json::from_str(r#"{"id": "00ab", "height": 840000}"#).unwrap();
//! let fees: Fees = serde_json::from_str(r#"{"fastestFee": 12, "hourFee": "7"}"#).unwrap();
//! assert_eq!(fees.hour_fee, Some(7.0));
//!
//! let snapshot = Snapshot::builder()
//!     .fees(fees)
//!     .mempool(Default::default())
//!     .tip_hash("00ab")
//!     .latest_block(block)
//!     .difficulty_adjustment(Default::default())
//!     .hashrate(Default::default())
//!     .reward_stats(Default::default())
//!     .prices(Default::default())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(snapshot.tip_height, 840000);
//! ```

pub mod lenient;
mod records;
mod snapshot;
mod version;

pub use records::*;
pub use snapshot::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of trailing blocks covered by the reward statistics.
pub const REWARD_WINDOW_BLOCKS: u64 = 144;
