//! Dashboard constants and environment overrides
//!
//! Hard limits live here as `const`s. Values that operators may tune are
//! exposed as functions reading an environment variable with a default.

use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Render Loop
// =============================================================================

/// Hard ceiling for the render loop frame rate.
///
/// Terminals gain nothing visible above this and the output pipe starts
/// to back up; a higher value is a fatal configuration error.
pub const MAX_FPS: u32 = 14;

/// Default render loop frame rate
pub const DEFAULT_FPS: u32 = 10;

// =============================================================================
// Frame Geometry
// =============================================================================

/// Default frame width in columns
pub const DEFAULT_WIDTH: u16 = 140;

/// Default frame height in rows
pub const DEFAULT_HEIGHT: u16 = 40;

/// Smallest frame the composer can lay out without clipping every panel
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 24;

// =============================================================================
// Views
// =============================================================================

/// Columns of the trade history table; the cursor's x bound is `len - 1`
pub const TRADE_TABLE_COLUMNS: [&str; 8] = [
    "Time", "Side", "Route", "In", "Out", "Exp. %", "Profit", "Status",
];

/// Block explorer used by the "open wallet" binding
pub const DEFAULT_EXPLORER_URL_BASE: &str = "https://solscan.io/address/";

/// Log lines kept in memory for the logs screen
pub const DEFAULT_LOG_CAPACITY: usize = 100;

// =============================================================================
// Environment Overrides
// =============================================================================

/// Path of the optional dashboard YAML file (default: `dashboard.yaml`)
///
/// Environment variable: `DASHBOARD_CONFIG`
pub fn config_path() -> PathBuf {
    std::env::var("DASHBOARD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("dashboard.yaml"))
}

/// JSON-lines file of recorded snapshots to replay into the bot store
///
/// Environment variable: `DASHBOARD_REPLAY`
pub fn replay_path() -> Option<PathBuf> {
    std::env::var("DASHBOARD_REPLAY")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Delay between replayed snapshots (default: 1000ms)
///
/// Environment variable: `DASHBOARD_REPLAY_INTERVAL_MS`
pub fn replay_interval() -> Duration {
    let ms = std::env::var("DASHBOARD_REPLAY_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);
    Duration::from_millis(ms)
}
