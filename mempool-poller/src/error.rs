//! Error types for cycles and setup.

use mempool_client::{ClientError, InvalidBaseUrl};
use mempool_types::IncompleteSnapshot;
use thiserror::Error;

/// Why a cycle produced no snapshot.
///
/// Any failure aborts the whole cycle; nothing fetched during it is kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleError {
    /// One of the concurrent, independent calls failed.
    #[error("Error fetching mempool data: {0}")]
    Batch(ClientError),

    /// The tip-hash dependent block fetch failed.
    #[error("Error fetching latest block: {0}")]
    LatestBlock(ClientError),

    /// All calls succeeded but the results do not form a consistent snapshot.
    #[error("Inconsistent data: {0}")]
    Inconsistent(IncompleteSnapshot),
}

impl CycleError {
    /// The underlying API failure, if the cycle failed on a call.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            CycleError::Batch(err) | CycleError::LatestBlock(err) => Some(err),
            CycleError::Inconsistent(_) => None,
        }
    }
}

/// Errors that prevent a monitor from becoming ready.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidBaseUrl),

    #[error("Failed to create API client: {0}")]
    Client(ClientError),

    /// The backend-info probe failed.
    #[error("Cannot connect to {url}: {source}")]
    Validation { url: String, source: ClientError },

    /// The first refresh failed; the monitor never became ready.
    #[error("Initial refresh failed: {0}")]
    Bootstrap(CycleError),
}
