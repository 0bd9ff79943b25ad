//! # mempool-client
//!
//! Typed async access to a mempool.space compatible statistics API.
//!
//! The crate exposes the [`MempoolApi`] capability (one method per resource)
//! and [`MempoolClient`], its reqwest-backed implementation. Every call is a
//! single request with no caching or retries; failures are classified into
//! [`ClientError::Connection`], [`ClientError::Response`] and
//! [`ClientError::Unexpected`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mempool_client::{BaseUrl, MempoolApi, MempoolClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let base_url = BaseUrl::parse("https://mempool.space/")?;
//!     let client = MempoolClient::builder().base_url(base_url).build()?;
//!
//!     let hash = client.tip_hash().await?;
//!     let block = client.block(&hash).await?;
//!     println!("tip {} at height {:?}", hash, block.height);
//!     Ok(())
//! }
//! ```

mod api;
mod base_url;
mod client;
pub mod error;

pub use api::MempoolApi;
pub use base_url::{BaseUrl, DEFAULT_BASE_URL};
pub use client::{MempoolClient, MempoolClientBuilder, DEFAULT_TIMEOUT};
pub use error::{ClientError, InvalidBaseUrl};

// Re-export types for convenience
pub use mempool_types::{
    Block, DifficultyAdjustment, Fees, Hashrate, MempoolStats, PoolInfo, RewardStats,
};
