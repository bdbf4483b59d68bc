//! Snapshot replay feed
//!
//! Drives the bot store from a JSON-lines file of recorded snapshots, one
//! snapshot per line, so the dashboard can be exercised without a live bot.
//! Captured log lines in the store are preserved across replayed snapshots.

use std::path::Path;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use super::snapshot::BusinessSnapshot;
use super::state::BotStore;
use crate::error::Result;

/// Parse one recorded snapshot
pub fn parse_snapshot_line(line: &str) -> Result<BusinessSnapshot> {
    Ok(serde_json::from_str(line)?)
}

/// Parse a JSON-lines document into snapshots.
///
/// Blank lines are skipped. Malformed lines are reported with their line
/// number and skipped, so one bad record does not end the replay.
pub fn parse_snapshots(content: &str) -> Vec<BusinessSnapshot> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match parse_snapshot_line(line) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(
                    event_type = "REPLAY_PARSE_ERROR",
                    line = idx + 1,
                    error = %e,
                    "Skipping malformed snapshot line"
                );
                None
            }
        })
        .collect()
}

/// Publish one replayed snapshot into the store
pub fn apply_snapshot(store: &BotStore, mut snapshot: BusinessSnapshot) {
    store.update(|current| {
        std::mem::swap(&mut snapshot.logs, &mut current.logs);
        *current = snapshot;
    });
}

/// Replay task: publishes each snapshot, then waits `interval`.
///
/// Ends after the last snapshot or on shutdown signal.
pub async fn replay_task(
    store: std::sync::Arc<BotStore>,
    path: &Path,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let content = tokio::fs::read_to_string(path).await?;
    let snapshots = parse_snapshots(&content);

    info!(
        event_type = "REPLAY_STARTED",
        path = %path.display(),
        count = snapshots.len(),
        "Replaying recorded snapshots"
    );

    for snapshot in snapshots {
        apply_snapshot(&store, snapshot);

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_rx.recv() => {
                info!("Replay stopped by shutdown signal");
                return Ok(());
            }
        }
    }

    info!(event_type = "REPLAY_FINISHED", "Replay reached end of file");
    Ok(())
}
