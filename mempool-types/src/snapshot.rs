//! Snapshot - one consistent, aggregated view of the network.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Block, DifficultyAdjustment, Fees, Hashrate, MempoolStats, Prices, RewardStats, SchemaVersion,
};

/// The aggregated result of a single polling cycle.
///
/// A snapshot is either fully populated or it does not exist: the only way to
/// obtain one is [`SnapshotBuilder::build`], which refuses to produce a value
/// while any sub-record is missing or while the block does not match the tip
/// hash it was fetched for.
///
/// # Example
///
/// ```rust
/// use mempool_types::{Block, Snapshot};
///
/// let result = Snapshot::builder()
///     .tip_hash("00ff")
///     .latest_block(Block { id: Some("00ff".into()), height: Some(1), ..Default::default() })
///     .build();
///
/// // fees, mempool, ... were never set
/// assert!(result.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// Publish sequence number. Zero until the snapshot is published.
    pub sequence: u64,

    /// Unix timestamp in milliseconds when the producing cycle completed.
    pub fetched_at_ms: u64,

    pub fees: Fees,
    pub mempool: MempoolStats,

    /// Chain head at cycle start.
    pub tip_hash: String,

    /// Height of the chain head, taken from `latest_block`.
    pub tip_height: u64,

    /// The block identified by `tip_hash`.
    pub latest_block: Block,

    pub difficulty_adjustment: DifficultyAdjustment,
    pub hashrate: Hashrate,
    pub reward_stats: RewardStats,

    /// Prices keyed by currency code, without the payload's `time` entry.
    pub price: Prices,
}

impl Snapshot {
    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Return a copy stamped with a publish sequence number.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// Reasons a [`SnapshotBuilder`] refuses to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncompleteSnapshot {
    /// A sub-record was never provided.
    Missing(&'static str),
    /// The block carries no height, so the tip height cannot be derived.
    MissingHeight,
    /// The block id differs from the tip hash it was requested by.
    TipMismatch { tip_hash: String, block_id: String },
}

impl fmt::Display for IncompleteSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(part) => write!(f, "snapshot is missing `{}`", part),
            Self::MissingHeight => write!(f, "latest block has no height"),
            Self::TipMismatch { tip_hash, block_id } => write!(
                f,
                "latest block {} does not match tip hash {}",
                block_id, tip_hash
            ),
        }
    }
}

impl std::error::Error for IncompleteSnapshot {}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    fetched_at_ms: Option<u64>,
    fees: Option<Fees>,
    mempool: Option<MempoolStats>,
    tip_hash: Option<String>,
    latest_block: Option<Block>,
    difficulty_adjustment: Option<DifficultyAdjustment>,
    hashrate: Option<Hashrate>,
    reward_stats: Option<RewardStats>,
    price: Option<Prices>,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific completion timestamp (milliseconds since Unix epoch).
    pub fn fetched_at_ms(mut self, ts: u64) -> Self {
        self.fetched_at_ms = Some(ts);
        self
    }

    pub fn fees(mut self, fees: Fees) -> Self {
        self.fees = Some(fees);
        self
    }

    pub fn mempool(mut self, mempool: MempoolStats) -> Self {
        self.mempool = Some(mempool);
        self
    }

    pub fn tip_hash(mut self, tip_hash: impl Into<String>) -> Self {
        self.tip_hash = Some(tip_hash.into());
        self
    }

    pub fn latest_block(mut self, block: Block) -> Self {
        self.latest_block = Some(block);
        self
    }

    pub fn difficulty_adjustment(mut self, adjustment: DifficultyAdjustment) -> Self {
        self.difficulty_adjustment = Some(adjustment);
        self
    }

    pub fn hashrate(mut self, hashrate: Hashrate) -> Self {
        self.hashrate = Some(hashrate);
        self
    }

    pub fn reward_stats(mut self, stats: RewardStats) -> Self {
        self.reward_stats = Some(stats);
        self
    }

    pub fn prices(mut self, prices: Prices) -> Self {
        self.price = Some(prices);
        self
    }

    /// Build the snapshot.
    ///
    /// The tip height is derived from the block's own height field.
    pub fn build(self) -> Result<Snapshot, IncompleteSnapshot> {
        let tip_hash = self.tip_hash.ok_or(IncompleteSnapshot::Missing("tip_hash"))?;
        let latest_block = self
            .latest_block
            .ok_or(IncompleteSnapshot::Missing("latest_block"))?;

        if let Some(block_id) = latest_block.id.as_deref() {
            if block_id != tip_hash {
                return Err(IncompleteSnapshot::TipMismatch {
                    tip_hash,
                    block_id: block_id.to_string(),
                });
            }
        }
        let tip_height = latest_block.height.ok_or(IncompleteSnapshot::MissingHeight)?;

        Ok(Snapshot {
            version: SchemaVersion::current(),
            sequence: 0,
            fetched_at_ms: self.fetched_at_ms.unwrap_or_else(current_timestamp_ms),
            fees: self.fees.ok_or(IncompleteSnapshot::Missing("fees"))?,
            mempool: self.mempool.ok_or(IncompleteSnapshot::Missing("mempool"))?,
            tip_hash,
            tip_height,
            latest_block,
            difficulty_adjustment: self
                .difficulty_adjustment
                .ok_or(IncompleteSnapshot::Missing("difficulty_adjustment"))?,
            hashrate: self.hashrate.ok_or(IncompleteSnapshot::Missing("hashrate"))?,
            reward_stats: self
                .reward_stats
                .ok_or(IncompleteSnapshot::Missing("reward_stats"))?,
            price: self.price.ok_or(IncompleteSnapshot::Missing("price"))?,
        })
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, height: u64) -> Block {
        Block {
            id: Some(id.to_string()),
            height: Some(height),
            ..Default::default()
        }
    }

    fn complete() -> SnapshotBuilder {
        Snapshot::builder()
            .fetched_at_ms(1_703_160_000_000)
            .fees(Fees::default())
            .mempool(MempoolStats::default())
            .tip_hash("00aa")
            .latest_block(block("00aa", 840_000))
            .difficulty_adjustment(DifficultyAdjustment::default())
            .hashrate(Hashrate::default())
            .reward_stats(RewardStats::default())
            .prices(Prices::default())
    }

    #[test]
    fn test_snapshot_builder() {
        let snapshot = complete().build().unwrap();

        assert_eq!(snapshot.tip_height, 840_000);
        assert_eq!(snapshot.fetched_at_ms, 1_703_160_000_000);
        assert_eq!(snapshot.sequence, 0);
        assert_eq!(snapshot.version, SchemaVersion::current());
    }

    #[test]
    fn missing_part_is_rejected() {
        let result = Snapshot::builder()
            .tip_hash("00aa")
            .latest_block(block("00aa", 1))
            .fees(Fees::default())
            .build();

        assert_eq!(result, Err(IncompleteSnapshot::Missing("mempool")));
    }

    #[test]
    fn block_must_match_tip_hash() {
        let result = complete().latest_block(block("00bb", 1)).build();
        assert!(matches!(result, Err(IncompleteSnapshot::TipMismatch { .. })));
    }

    #[test]
    fn block_without_height_is_rejected() {
        let result = complete()
            .latest_block(Block {
                id: Some("00aa".into()),
                ..Default::default()
            })
            .build();
        assert_eq!(result, Err(IncompleteSnapshot::MissingHeight));
    }

    #[test]
    fn with_sequence_stamps_copy() {
        let snapshot = complete().build().unwrap().with_sequence(42);
        assert_eq!(snapshot.sequence, 42);
    }

    #[test]
    fn test_serde_roundtrip() {
        let snapshot = complete().build().unwrap().with_sequence(3);
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, parsed);
    }
}
