//! One aggregation cycle: fan out, fetch the tip block, assemble.

use mempool_client::MempoolApi;
use mempool_types::{Prices, Snapshot};
use tracing::debug;

use crate::CycleError;

/// Run a single cycle against `api`.
///
/// The independent resources are requested concurrently. The first failure
/// aborts the cycle and the block is never requested. Otherwise the block
/// named by the fetched tip hash is requested, and the snapshot is built with
/// the tip height taken from that block (the dedicated tip-height endpoint is
/// not called). Any failure discards everything fetched so far.
pub async fn run_cycle<A>(api: &A) -> Result<Snapshot, CycleError>
where
    A: MempoolApi + ?Sized,
{
    let (fees, mempool, tip_hash, difficulty, hashrate, reward_stats, price_payload) = tokio::try_join!(
        api.recommended_fees(),
        api.mempool(),
        api.tip_hash(),
        api.difficulty_adjustment(),
        api.hashrate(),
        api.reward_stats(),
        api.prices(),
    )
    .map_err(CycleError::Batch)?;

    debug!(%tip_hash, "batch complete, fetching tip block");

    let latest_block = api
        .block(&tip_hash)
        .await
        .map_err(CycleError::LatestBlock)?;

    Snapshot::builder()
        .fees(fees)
        .mempool(mempool)
        .tip_hash(tip_hash)
        .latest_block(latest_block)
        .difficulty_adjustment(difficulty)
        .hashrate(hashrate)
        .reward_stats(reward_stats)
        .prices(Prices::from_payload(&price_payload))
        .build()
        .map_err(CycleError::Inconsistent)
}
