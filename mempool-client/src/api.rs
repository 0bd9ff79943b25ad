//! The API capability consumed by the poller.

use async_trait::async_trait;
use serde_json::{Map, Value};

use mempool_types::{Block, DifficultyAdjustment, Fees, Hashrate, MempoolStats, RewardStats};

use crate::ClientError;

/// One operation per logical resource of a mempool.space compatible API.
///
/// [`MempoolClient`](crate::MempoolClient) implements this over HTTP. The
/// poller only depends on the trait, so tests and alternative transports can
/// supply their own implementation.
///
/// Implementations must not cache, retry or rate limit: every call is exactly
/// one request, and its failure is terminal for that call.
#[async_trait]
pub trait MempoolApi: Send + Sync {
    /// Backend description, used to validate an endpoint before polling it.
    async fn backend_info(&self) -> Result<Value, ClientError>;

    /// Recommended fee rates.
    async fn recommended_fees(&self) -> Result<Fees, ClientError>;

    /// Mempool transaction count and size.
    async fn mempool(&self) -> Result<MempoolStats, ClientError>;

    /// Height of the current chain head.
    async fn tip_height(&self) -> Result<u64, ClientError>;

    /// Hash of the current chain head.
    async fn tip_hash(&self) -> Result<String, ClientError>;

    /// Block details by hash.
    async fn block(&self, hash: &str) -> Result<Block, ClientError>;

    /// Difficulty retarget progress.
    async fn difficulty_adjustment(&self) -> Result<DifficultyAdjustment, ClientError>;

    /// Network hashrate and difficulty.
    async fn hashrate(&self) -> Result<Hashrate, ClientError>;

    /// Mining totals over the last 144 blocks.
    async fn reward_stats(&self) -> Result<RewardStats, ClientError>;

    /// Raw price payload: currency codes plus a `time` entry.
    async fn prices(&self) -> Result<Map<String, Value>, ClientError>;
}
