//! Listeners notified after every successful publish.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use mempool_types::Snapshot;
use tokio::sync::mpsc;

/// Callback invoked with each published snapshot.
pub type SnapshotCallback = Arc<dyn Fn(&Arc<Snapshot>) + Send + Sync>;

/// Destination for published snapshots.
///
/// Outputs are best effort: a failing output is logged and never affects the
/// snapshot that was published.
pub enum Output {
    /// Write each snapshot to a JSON file.
    ///
    /// The file is overwritten with each snapshot.
    File(PathBuf),

    /// Send snapshots through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<Arc<Snapshot>>),

    /// Call a function with each snapshot.
    Callback(SnapshotCallback),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mempool_poller::Output;
    ///
    /// let output = Output::file("snapshot.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mempool_poller::Output;
    ///
    /// let (output, mut rx) = Output::channel(4);
    ///
    /// // Later, receive snapshots
    /// // while let Some(snapshot) = rx.recv().await {
    /// //     println!("height {}", snapshot.tip_height);
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Arc<Snapshot>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Create a callback output.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Arc<Snapshot>) + Send + Sync + 'static,
    {
        Output::Callback(Arc::new(f))
    }

    /// Emit a snapshot to this output.
    pub(crate) async fn emit(&self, snapshot: &Arc<Snapshot>) -> std::io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(snapshot.as_ref())?;
                tokio::fs::write(path, json).await?;
            }
            Output::Channel(tx) => {
                // Don't block the poller on a slow reader
                let _ = tx.try_send(snapshot.clone());
            }
            Output::Callback(f) => f(snapshot),
        }
        Ok(())
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::File(path) => f.debug_tuple("File").field(path).finish(),
            Output::Channel(_) => f.write_str("Channel"),
            Output::Callback(_) => f.write_str("Callback"),
        }
    }
}
