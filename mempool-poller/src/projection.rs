//! Named scalar values derived from a snapshot.
//!
//! Every [`SensorKey`] maps to a pure extraction function over [`Snapshot`].
//! Lookups never fail: an absent snapshot or a missing field yields `None`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use mempool_types::{Snapshot, REWARD_WINDOW_BLOCKS};
use serde::Serialize;
use serde_json::Value;

const HASHES_PER_EXAHASH: f64 = 1e18;
const SATS_PER_BTC: f64 = 1e8;

/// A projected value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl SensorValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SensorValue::Integer(v) => Some(*v as f64),
            SensorValue::Float(v) => Some(*v),
            SensorValue::Text(_) => None,
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Integer(v) => write!(f, "{}", v),
            SensorValue::Float(v) => write!(f, "{}", v),
            SensorValue::Text(v) => f.write_str(v),
        }
    }
}

/// Extra attributes attached to some values (pool slug, other currencies).
pub type Attributes = BTreeMap<String, Value>;

/// The closed set of values a snapshot can be projected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorKey {
    FastestFee,
    HalfHourFee,
    HourFee,
    EconomyFee,
    MinimumFee,
    MempoolTxCount,
    MempoolSize,
    BlockHeight,
    DifficultyProgress,
    DifficultyChange,
    RemainingBlocks,
    NetworkHashrate,
    NetworkDifficulty,
    TotalMinersReward,
    AvgBlockFees,
    AvgTxFee,
    LatestBlockMiner,
    BtcPrice,
}

impl SensorKey {
    pub const ALL: [SensorKey; 18] = [
        SensorKey::FastestFee,
        SensorKey::HalfHourFee,
        SensorKey::HourFee,
        SensorKey::EconomyFee,
        SensorKey::MinimumFee,
        SensorKey::MempoolTxCount,
        SensorKey::MempoolSize,
        SensorKey::BlockHeight,
        SensorKey::DifficultyProgress,
        SensorKey::DifficultyChange,
        SensorKey::RemainingBlocks,
        SensorKey::NetworkHashrate,
        SensorKey::NetworkDifficulty,
        SensorKey::TotalMinersReward,
        SensorKey::AvgBlockFees,
        SensorKey::AvgTxFee,
        SensorKey::LatestBlockMiner,
        SensorKey::BtcPrice,
    ];

    /// Stable snake_case identifier.
    pub fn id(self) -> &'static str {
        match self {
            SensorKey::FastestFee => "fastest_fee",
            SensorKey::HalfHourFee => "half_hour_fee",
            SensorKey::HourFee => "hour_fee",
            SensorKey::EconomyFee => "economy_fee",
            SensorKey::MinimumFee => "minimum_fee",
            SensorKey::MempoolTxCount => "mempool_tx_count",
            SensorKey::MempoolSize => "mempool_size",
            SensorKey::BlockHeight => "block_height",
            SensorKey::DifficultyProgress => "difficulty_progress",
            SensorKey::DifficultyChange => "difficulty_change",
            SensorKey::RemainingBlocks => "remaining_blocks",
            SensorKey::NetworkHashrate => "network_hashrate",
            SensorKey::NetworkDifficulty => "network_difficulty",
            SensorKey::TotalMinersReward => "total_miners_reward",
            SensorKey::AvgBlockFees => "avg_block_fees",
            SensorKey::AvgTxFee => "avg_tx_fee",
            SensorKey::LatestBlockMiner => "latest_block_miner",
            SensorKey::BtcPrice => "btc_price",
        }
    }

    /// Human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            SensorKey::FastestFee => "Fastest fee",
            SensorKey::HalfHourFee => "Half hour fee",
            SensorKey::HourFee => "Hour fee",
            SensorKey::EconomyFee => "Economy fee",
            SensorKey::MinimumFee => "Minimum fee",
            SensorKey::MempoolTxCount => "Mempool TX count",
            SensorKey::MempoolSize => "Mempool size",
            SensorKey::BlockHeight => "Block height",
            SensorKey::DifficultyProgress => "Difficulty adjustment progress",
            SensorKey::DifficultyChange => "Difficulty adjustment estimate",
            SensorKey::RemainingBlocks => "Difficulty adjustment remaining blocks",
            SensorKey::NetworkHashrate => "Network hashrate",
            SensorKey::NetworkDifficulty => "Network difficulty",
            SensorKey::TotalMinersReward => "Total miners reward (144 blocks)",
            SensorKey::AvgBlockFees => "Avg block fees (144 blocks)",
            SensorKey::AvgTxFee => "Avg TX fee (144 blocks)",
            SensorKey::LatestBlockMiner => "Latest block miner",
            SensorKey::BtcPrice => "BTC price",
        }
    }

    /// Unit of measurement, if the value has one.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            SensorKey::FastestFee
            | SensorKey::HalfHourFee
            | SensorKey::HourFee
            | SensorKey::EconomyFee
            | SensorKey::MinimumFee => Some("sat/vB"),
            SensorKey::MempoolTxCount => Some("transactions"),
            SensorKey::MempoolSize => Some("vB"),
            SensorKey::DifficultyProgress | SensorKey::DifficultyChange => Some("%"),
            SensorKey::RemainingBlocks => Some("blocks"),
            SensorKey::NetworkHashrate => Some("EH/s"),
            SensorKey::TotalMinersReward | SensorKey::AvgBlockFees => Some("BTC"),
            SensorKey::AvgTxFee => Some("sats"),
            SensorKey::BtcPrice => Some("USD"),
            SensorKey::BlockHeight
            | SensorKey::NetworkDifficulty
            | SensorKey::LatestBlockMiner => None,
        }
    }

    /// Project this key from a snapshot.
    pub fn value(self, snapshot: &Snapshot) -> Option<SensorValue> {
        use SensorValue::{Float, Integer, Text};

        let fees = &snapshot.fees;
        let rewards = &snapshot.reward_stats;

        match self {
            SensorKey::FastestFee => fees.fastest_fee.map(Float),
            SensorKey::HalfHourFee => fees.half_hour_fee.map(Float),
            SensorKey::HourFee => fees.hour_fee.map(Float),
            SensorKey::EconomyFee => fees.economy_fee.map(Float),
            SensorKey::MinimumFee => fees.minimum_fee.map(Float),
            SensorKey::MempoolTxCount => snapshot.mempool.count.map(Integer),
            SensorKey::MempoolSize => snapshot.mempool.vsize.map(Integer),
            SensorKey::BlockHeight => Some(Integer(snapshot.tip_height)),
            SensorKey::DifficultyProgress => {
                snapshot.difficulty_adjustment.progress_percent.map(Float)
            }
            SensorKey::DifficultyChange => {
                snapshot.difficulty_adjustment.difficulty_change.map(Float)
            }
            SensorKey::RemainingBlocks => {
                snapshot.difficulty_adjustment.remaining_blocks.map(Integer)
            }
            SensorKey::NetworkHashrate => snapshot
                .hashrate
                .current_hashrate
                .map(|h| Float(round_to(h / HASHES_PER_EXAHASH, 2))),
            SensorKey::NetworkDifficulty => snapshot.hashrate.current_difficulty.map(Float),
            SensorKey::TotalMinersReward => rewards
                .total_reward
                .map(|r| Float(round_to(r as f64 / SATS_PER_BTC, 4))),
            SensorKey::AvgBlockFees => rewards.total_fee.map(|fee| {
                Float(round_to(
                    fee as f64 / REWARD_WINDOW_BLOCKS as f64 / SATS_PER_BTC,
                    8,
                ))
            }),
            SensorKey::AvgTxFee => {
                let fee = rewards.total_fee?;
                let txs = rewards.total_tx?.max(1);
                Some(Integer((fee as f64 / txs as f64).round_ties_even() as u64))
            }
            SensorKey::LatestBlockMiner => snapshot
                .latest_block
                .pool()
                .and_then(|pool| pool.name.clone())
                .map(Text),
            SensorKey::BtcPrice => snapshot.price.usd().map(Float),
        }
    }

    /// Project this key from an optional snapshot.
    pub fn value_of(self, snapshot: Option<&Snapshot>) -> Option<SensorValue> {
        snapshot.and_then(|s| self.value(s))
    }

    /// Extra attributes for this key, if it has any.
    ///
    /// - `LatestBlockMiner`: `slug` and `miner_names` of the pool
    /// - `BtcPrice`: every non-USD price keyed by lower-cased currency code
    pub fn attributes(self, snapshot: &Snapshot) -> Option<Attributes> {
        match self {
            SensorKey::LatestBlockMiner => {
                let pool = snapshot.latest_block.pool()?;
                let mut attrs = Attributes::new();
                attrs.insert("slug".into(), option_to_value(pool.slug.clone()));
                attrs.insert("miner_names".into(), option_to_value(pool.miner_names.clone()));
                Some(attrs)
            }
            SensorKey::BtcPrice => Some(
                snapshot
                    .price
                    .iter()
                    .filter(|(code, _)| code.as_str() != "USD")
                    .map(|(code, price)| (code.to_lowercase(), Value::from(*price)))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when parsing an unknown sensor id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensor `{0}`")]
pub struct UnknownSensor(pub String);

impl FromStr for SensorKey {
    type Err = UnknownSensor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKey::ALL
            .into_iter()
            .find(|key| key.id() == s)
            .ok_or_else(|| UnknownSensor(s.to_string()))
    }
}

/// Every key paired with its projected value.
pub fn project_all(snapshot: Option<&Snapshot>) -> Vec<(SensorKey, Option<SensorValue>)> {
    SensorKey::ALL
        .into_iter()
        .map(|key| (key, key.value_of(snapshot)))
        .collect()
}

/// Round to `decimals` places, ties to even on the exact binary value.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

fn option_to_value<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}
