//! HFT Dashboard
//!
//! Render-and-input core of the trading bot terminal dashboard:
//! - UI state store and screen state machine
//! - Keyboard dispatcher with runtime key bindings
//! - Fixed-rate render loop (fps ceiling 14) with a mini mode
//! - Deterministic view composition

pub mod config;
pub mod core;
pub mod error;
pub mod tui;

pub use error::AppError;
