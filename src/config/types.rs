//! Configuration types for the dashboard
//!
//! Loaded from an optional YAML file, overridden by environment variables,
//! then validated once at startup. A configuration that fails validation
//! never reaches the render loop.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AppError;

use super::constants::{
    DEFAULT_EXPLORER_URL_BASE, DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_LOG_CAPACITY, DEFAULT_WIDTH,
    MAX_FPS, MIN_HEIGHT, MIN_WIDTH,
};

/// Root dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Clear the terminal before each full frame
    pub allow_clear_console: bool,
    /// Render loop frame rate (1..=14)
    pub fps: u32,
    /// Frame width in columns
    pub width: u16,
    /// Frame height in rows
    pub height: u16,
    /// Prefix joined with the wallet address by the explorer binding
    pub explorer_url_base: String,
    /// Log lines kept for the logs screen
    pub log_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            allow_clear_console: true,
            fps: DEFAULT_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            explorer_url_base: DEFAULT_EXPLORER_URL_BASE.to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl DashboardConfig {
    /// Validate configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        if self.fps > MAX_FPS {
            return Err(AppError::Config(format!(
                "FPS cannot be higher than {}, this is useless and can cause performance issues (got {})",
                MAX_FPS, self.fps
            )));
        }

        if self.fps == 0 {
            return Err(AppError::Config("fps must be at least 1".to_string()));
        }

        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(AppError::Config(format!(
                "frame must be at least {}x{} (got {}x{})",
                MIN_WIDTH, MIN_HEIGHT, self.width, self.height
            )));
        }

        if !self.explorer_url_base.starts_with("http://")
            && !self.explorer_url_base.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "explorer_url_base must be an http(s) URL (got '{}')",
                self.explorer_url_base
            )));
        }

        if self.log_capacity == 0 {
            return Err(AppError::Config("log_capacity must be > 0".to_string()));
        }

        Ok(())
    }

    /// Render loop period derived from `fps`
    ///
    /// Callers must validate first; an fps of zero is clamped to one frame
    /// per second here to keep the division total.
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

// ============================================================================
// Tests
// ============================================================================
