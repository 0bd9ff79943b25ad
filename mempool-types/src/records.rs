//! Sub-records that make up a snapshot, one per upstream resource.
//!
//! Field names follow the upstream JSON, which mixes camelCase and snake_case.
//! Every scalar is optional and decoded through [`crate::lenient`], so a
//! missing or mistyped field shows up as `None` rather than rejecting the
//! payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Recommended fee rates in sat/vB for the five fee classes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fees {
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub fastest_fee: Option<f64>,

    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub half_hour_fee: Option<f64>,

    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub hour_fee: Option<f64>,

    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub economy_fee: Option<f64>,

    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub minimum_fee: Option<f64>,
}

/// Pending transaction statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MempoolStats {
    /// Number of unconfirmed transactions.
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Total virtual size of the mempool in vB.
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub vsize: Option<u64>,

    /// Sum of fees in satoshis.
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub total_fee: Option<u64>,
}

/// A block as returned by the block-by-hash endpoint.
///
/// Unlike most resources, block fields are snake_case upstream; only the
/// nested `extras` use camelCase.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Block hash.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    /// Block header time (Unix seconds).
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub tx_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,

    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub extras: Option<BlockExtras>,
}

impl Block {
    /// The pool credited with mining this block, if the backend reports one.
    pub fn pool(&self) -> Option<&PoolInfo> {
        self.extras.as_ref()?.pool.as_ref()
    }
}

/// Backend-specific block extras (mempool.space "extras" object).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExtras {
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolInfo>,

    /// Coinbase reward in satoshis.
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub reward: Option<u64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub total_fees: Option<u64>,
}

/// Mining pool attribution for a block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Alias list reported by the backend.
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Option::is_none")]
    pub miner_names: Option<Vec<String>>,
}

/// Progress towards the next difficulty retarget.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAdjustment {
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<f64>,

    /// Estimated change at the next retarget, in percent.
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub difficulty_change: Option<f64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub remaining_blocks: Option<u64>,

    /// Milliseconds until the estimated retarget.
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<u64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub estimated_retarget_date: Option<u64>,
}

/// Current network hashrate and difficulty, in raw units.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hashrate {
    /// Hashes per second.
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub current_hashrate: Option<f64>,

    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub current_difficulty: Option<f64>,
}

/// Aggregate mining totals over the trailing reward window.
///
/// The upstream API sends the totals as decimal strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardStats {
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub start_block: Option<u64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub end_block: Option<u64>,

    /// Total reward in satoshis.
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub total_reward: Option<u64>,

    /// Total fees in satoshis.
    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub total_fee: Option<u64>,

    #[serde(default, deserialize_with = "lenient::u64", skip_serializing_if = "Option::is_none")]
    pub total_tx: Option<u64>,
}

/// Currency code to price mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prices(pub BTreeMap<String, f64>);

impl Prices {
    /// Key of the non-currency timestamp entry in the raw price payload.
    pub const TIME_KEY: &'static str = "time";

    /// Build the currency mapping from a raw `/api/v1/prices` payload.
    ///
    /// The `time` entry is dropped, as is any entry whose value is not numeric.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self(
            payload
                .iter()
                .filter(|(code, _)| code.as_str() != Self::TIME_KEY)
                .filter_map(|(code, value)| {
                    lenient::value_as_f64(value).map(|price| (code.clone(), price))
                })
                .collect(),
        )
    }

    /// Price for a currency code.
    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    /// Price in US dollars.
    pub fn usd(&self) -> Option<f64> {
        self.get("USD")
    }

    /// Iterate over all currencies.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_payload_drops_time_key() {
        let payload = json!({"time": 123, "USD": 50000, "EUR": 45000});
        let prices = Prices::from_payload(payload.as_object().unwrap());

        assert_eq!(prices.len(), 2);
        assert_eq!(prices.usd(), Some(50000.0));
        assert_eq!(prices.get("EUR"), Some(45000.0));
        assert_eq!(prices.get("time"), None);
    }

    #[test]
    fn price_payload_skips_non_numeric_entries() {
        let payload = json!({"time": 123, "USD": "64000.5", "GBP": null, "XAU": {"oz": 1}});
        let prices = Prices::from_payload(payload.as_object().unwrap());

        assert_eq!(prices.len(), 1);
        assert_eq!(prices.usd(), Some(64000.5));
        assert_eq!(prices.get("GBP"), None);
        assert_eq!(prices.get("XAU"), None);
    }

    #[test]
    fn reward_stats_accept_string_totals() {
        let stats: RewardStats = serde_json::from_value(json!({
            "startBlock": 839857,
            "endBlock": 840000,
            "totalReward": "90312500000",
            "totalFee": "14400000000",
            "totalTx": "3000"
        }))
        .unwrap();

        assert_eq!(stats.total_reward, Some(90_312_500_000));
        assert_eq!(stats.total_fee, Some(14_400_000_000));
        assert_eq!(stats.total_tx, Some(3000));
    }

    #[test]
    fn mistyped_fields_decode_to_none() {
        let fees: Fees = serde_json::from_value(json!({
            "fastestFee": "fast",
            "halfHourFee": null,
            "hourFee": 4
        }))
        .unwrap();

        assert_eq!(fees.fastest_fee, None);
        assert_eq!(fees.half_hour_fee, None);
        assert_eq!(fees.hour_fee, Some(4.0));
        assert_eq!(fees.minimum_fee, None);
    }

    #[test]
    fn block_pool_attribution() {
        let block: Block = serde_json::from_value(json!({
            "id": "0000abc",
            "height": 840000,
            "extras": {
                "pool": {"id": 111, "name": "Foundry USA", "slug": "foundryusa", "minerNames": ["Foundry", 7]}
            }
        }))
        .unwrap();

        let pool = block.pool().unwrap();
        assert_eq!(pool.name.as_deref(), Some("Foundry USA"));
        assert_eq!(pool.slug.as_deref(), Some("foundryusa"));
        assert_eq!(pool.miner_names, Some(vec!["Foundry".to_string()]));
    }

    #[test]
    fn non_object_extras_are_ignored() {
        let block: Block =
            serde_json::from_value(json!({"height": 1, "extras": "n/a"})).unwrap();
        assert_eq!(block.extras, None);
        assert!(block.pool().is_none());
    }
}
