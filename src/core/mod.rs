//! Core module - the bot-side collaborators the dashboard reads from
//!
//! # Module Architecture
//!
//! This module uses **explicit re-exports** instead of glob exports
//! (`pub use module::*`) to keep the public API visible in one place.
//!
//! ## Usage
//! ```ignore
//! use crate::core::{BotStore, BusinessSnapshot, SnapshotProvider};
//! ```

pub mod commands;
pub mod replay;
pub mod snapshot;
pub mod state;

// Explicit re-exports for snapshot module
pub use snapshot::{
    Balance, BotCommand, BotStatus, BusinessSnapshot, ChartSeries, LogEntry, TradeRecord,
    WalletInfo,
};

// Explicit re-exports for state module
pub use state::{BotStore, SharedBotStore, SnapshotProvider};

// Explicit re-exports for replay module
pub use replay::{apply_snapshot, parse_snapshot_line, parse_snapshots, replay_task};

// Explicit re-exports for commands module
pub use commands::command_task;
