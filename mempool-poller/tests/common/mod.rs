//! Scripted in-memory API for driving cycles in tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mempool_client::{ClientError, MempoolApi};
use mempool_types::{Block, DifficultyAdjustment, Fees, Hashrate, MempoolStats, RewardStats};
use serde_json::{json, Map, Value};

/// Resource names used to script failures and count calls.
pub const FEES: &str = "fees";
pub const MEMPOOL: &str = "mempool";
pub const TIP_HEIGHT: &str = "tip_height";
pub const TIP_HASH: &str = "tip_hash";
pub const BLOCK: &str = "block";
pub const DIFFICULTY: &str = "difficulty";
pub const HASHRATE: &str = "hashrate";
pub const REWARDS: &str = "rewards";
pub const PRICES: &str = "prices";
pub const BACKEND_INFO: &str = "backend_info";

pub struct FakeApi {
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<&'static str, ClientError>>,
    tip: Mutex<(String, u64)>,
    block_id: Mutex<Option<String>>,
    fastest_fee: Mutex<f64>,
    delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            tip: Mutex::new((
                "00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054".into(),
                840_000,
            )),
            block_id: Mutex::new(None),
            fastest_fee: Mutex::new(21.0),
            delay: Mutex::new(Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make `resource` fail until healed.
    pub fn fail(&self, resource: &'static str, err: ClientError) {
        self.failures.lock().unwrap().insert(resource, err);
    }

    pub fn heal(&self, resource: &'static str) {
        self.failures.lock().unwrap().remove(resource);
    }

    pub fn set_tip(&self, hash: &str, height: u64) {
        *self.tip.lock().unwrap() = (hash.to_string(), height);
    }

    /// Return a block whose id differs from the requested hash.
    pub fn set_block_id(&self, id: &str) {
        *self.block_id.lock().unwrap() = Some(id.to_string());
    }

    pub fn set_fastest_fee(&self, fee: f64) {
        *self.fastest_fee.lock().unwrap() = fee;
    }

    /// Delay every batch call by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self, resource: &str) -> usize {
        self.calls.lock().unwrap().get(resource).copied().unwrap_or(0)
    }

    /// Number of cycles started (every cycle requests fees exactly once).
    pub fn cycles(&self) -> usize {
        self.calls(FEES)
    }

    /// Highest number of fee requests that were ever outstanding at once.
    pub fn max_concurrent_cycles(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, resource: &'static str) -> Result<(), ClientError> {
        *self.calls.lock().unwrap().entry(resource).or_insert(0) += 1;

        let delay = *self.delay.lock().unwrap();
        if resource == FEES {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        }
        if !delay.is_zero() && resource != BLOCK {
            tokio::time::sleep(delay).await;
        }
        if resource == FEES {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        match self.failures.lock().unwrap().get(resource) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture decodes")
}

#[async_trait]
impl MempoolApi for FakeApi {
    async fn backend_info(&self) -> Result<Value, ClientError> {
        self.enter(BACKEND_INFO).await?;
        Ok(json!({"hostname": "fake", "version": "3.0.0", "backend": "esplora"}))
    }

    async fn recommended_fees(&self) -> Result<Fees, ClientError> {
        self.enter(FEES).await?;
        let fastest = *self.fastest_fee.lock().unwrap();
        Ok(decode(json!({
            "fastestFee": fastest, "halfHourFee": 18, "hourFee": 15, "economyFee": 8, "minimumFee": 4
        })))
    }

    async fn mempool(&self) -> Result<MempoolStats, ClientError> {
        self.enter(MEMPOOL).await?;
        Ok(decode(json!({"count": 52000, "vsize": 31000000, "total_fee": 0})))
    }

    async fn tip_height(&self) -> Result<u64, ClientError> {
        self.enter(TIP_HEIGHT).await?;
        // Deliberately different from the block height.
        Ok(1)
    }

    async fn tip_hash(&self) -> Result<String, ClientError> {
        self.enter(TIP_HASH).await?;
        Ok(self.tip.lock().unwrap().0.clone())
    }

    async fn block(&self, hash: &str) -> Result<Block, ClientError> {
        self.enter(BLOCK).await?;
        let (tip_hash, height) = self.tip.lock().unwrap().clone();
        assert_eq!(hash, tip_hash, "block requested for the fetched tip hash");
        let id = self
            .block_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| hash.to_string());
        Ok(decode(json!({
            "id": id,
            "height": height,
            "tx_count": 3100,
            "extras": {"pool": {"id": 111, "name": "Foundry USA", "slug": "foundryusa", "minerNames": ["Foundry"]}}
        })))
    }

    async fn difficulty_adjustment(&self) -> Result<DifficultyAdjustment, ClientError> {
        self.enter(DIFFICULTY).await?;
        Ok(decode(json!({
            "progressPercent": 41.5, "difficultyChange": -1.25, "remainingBlocks": 1180
        })))
    }

    async fn hashrate(&self) -> Result<Hashrate, ClientError> {
        self.enter(HASHRATE).await?;
        Ok(decode(json!({"currentHashrate": 5.5e20, "currentDifficulty": 83148355189239.77})))
    }

    async fn reward_stats(&self) -> Result<RewardStats, ClientError> {
        self.enter(REWARDS).await?;
        Ok(decode(json!({
            "startBlock": 839857, "endBlock": 840000,
            "totalReward": "90312500000", "totalFee": "14400000000", "totalTx": "3000"
        })))
    }

    async fn prices(&self) -> Result<Map<String, Value>, ClientError> {
        self.enter(PRICES).await?;
        Ok(decode(json!({"time": 123, "USD": 50000, "EUR": 45000})))
    }
}

pub fn connection_error() -> ClientError {
    ClientError::Connection("connection refused".into())
}

pub fn server_error() -> ClientError {
    ClientError::Response {
        status: 502,
        url: "http://fake/api".into(),
    }
}
