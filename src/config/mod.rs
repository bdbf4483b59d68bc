//! Configuration module for dashboard settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`DashboardConfig`)
//! - YAML loading with environment overrides (`load_config`)
//! - Logging initialization (`init_logging`)
//! - Dashboard constants with environment variable overrides

pub mod constants;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::DashboardConfig;

// Re-export loader functions
pub use loader::{apply_env_overrides, load_config, load_config_from_str};

// Re-export logging
pub use logging::{init_logging, log_startup_error, LoggingConfig};
