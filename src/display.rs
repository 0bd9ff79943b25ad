//! Plain-text rendering of projected values.

use std::fmt::Write as _;
use std::future::Future;
use std::io::{self, Write};

use mempool_poller::{project_all, Snapshot, SnapshotReceiver};

const MISSING: &str = "-";

/// Render every sensor as one `id  value unit` line.
pub fn render_table(snapshot: Option<&Snapshot>) -> String {
    let mut out = String::new();

    match snapshot {
        Some(snapshot) => {
            let miner = snapshot
                .latest_block
                .pool()
                .and_then(|pool| pool.name.as_deref())
                .unwrap_or("unknown miner");
            let _ = writeln!(
                out,
                "# snapshot {} at block {} ({})",
                snapshot.sequence, snapshot.tip_height, miner
            );
        }
        None => out.push_str("# no snapshot yet\n"),
    }

    for (key, value) in project_all(snapshot) {
        let value = value
            .map(|v| v.to_string())
            .unwrap_or_else(|| MISSING.to_string());
        let unit = key.unit().unwrap_or("");
        let _ = writeln!(out, "{:<22} {:>24} {}", key.id(), value, unit);
    }

    out
}

/// Print the table after every publish until `shutdown` resolves or the
/// poller goes away. Returns the number of tables printed.
///
/// The snapshot already in `rx` counts as unseen and is printed first.
pub async fn print_updates<W, F>(
    mut rx: SnapshotReceiver,
    shutdown: F,
    mut out: W,
) -> io::Result<u64>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut printed = 0;
    tokio::pin!(shutdown);

    loop {
        let snapshot = rx.borrow_and_update().clone();
        if let Some(snapshot) = snapshot {
            writeln!(out, "{}", render_table(Some(&snapshot)))?;
            out.flush()?;
            printed += 1;
        }

        tokio::select! {
            _ = &mut shutdown => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    Ok(printed)
}
