//! Configuration loader for YAML files
//!
//! The dashboard file is optional: a missing file yields the defaults.
//! Environment overrides are applied after parsing and before validation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;

use super::types::DashboardConfig;

/// Load configuration from a YAML file
///
/// This function:
/// 1. Falls back to defaults when the file does not exist
/// 2. Parses the YAML content
/// 3. Applies `DASHBOARD_*` environment overrides
/// 4. Validates the configuration rules
pub fn load_config(path: &Path) -> Result<DashboardConfig, AppError> {
    let mut config = if path.exists() {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).map_err(|e| {
            AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e))
        })?
    } else {
        DashboardConfig::default()
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
///
/// Environment overrides are not applied.
pub fn load_config_from_str(yaml_content: &str) -> Result<DashboardConfig, AppError> {
    let config: DashboardConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

/// Apply `DASHBOARD_FPS` and `DASHBOARD_ALLOW_CLEAR_CONSOLE` overrides
///
/// Unparseable values are configuration errors rather than silently
/// ignored, since they would otherwise mask a fatal fps setting.
pub fn apply_env_overrides(config: &mut DashboardConfig) -> Result<(), AppError> {
    if let Ok(raw) = std::env::var("DASHBOARD_FPS") {
        config.fps = raw.trim().parse().map_err(|_| {
            AppError::Config(format!("DASHBOARD_FPS must be a positive integer (got '{}')", raw))
        })?;
    }

    if let Ok(raw) = std::env::var("DASHBOARD_ALLOW_CLEAR_CONSOLE") {
        config.allow_clear_console = match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(AppError::Config(format!(
                    "DASHBOARD_ALLOW_CLEAR_CONSOLE must be a boolean (got '{}')",
                    raw
                )))
            }
        };
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG_YAML: &str = r#"
allow_clear_console: false
fps: 12
width: 120
height: 36
explorer_url_base: "https://solscan.io/address/"
log_capacity: 50
"#;

    fn clear_env() {
        std::env::remove_var("DASHBOARD_FPS");
        std::env::remove_var("DASHBOARD_ALLOW_CLEAR_CONSOLE");
    }

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(VALID_CONFIG_YAML).unwrap();
        assert!(!config.allow_clear_console);
        assert_eq!(config.fps, 12);
        assert_eq!(config.width, 120);
        assert_eq!(config.log_capacity, 50);
    }

    #[test]
    fn test_load_config_from_str_invalid_yaml() {
        let result = load_config_from_str("fps: [12");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_load_config_from_str_fps_above_ceiling() {
        let result = load_config_from_str("fps: 15\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("FPS cannot be higher than 14"));
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file_uses_defaults() {
        clear_env();
        let config = load_config(Path::new("/nonexistent/path/dashboard.yaml")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_config_from_file_valid() {
        clear_env();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_CONFIG_YAML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.fps, 12);
        assert!(!config.allow_clear_console);
    }

    #[test]
    #[serial]
    fn test_load_config_from_file_invalid_yaml() {
        clear_env();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"fps: [yaml").unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    #[serial]
    fn test_env_fps_override_is_validated() {
        clear_env();
        std::env::set_var("DASHBOARD_FPS", "15");
        let result = load_config(Path::new("/nonexistent/dashboard.yaml"));
        clear_env();

        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("FPS cannot be higher than 14"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_applied() {
        clear_env();
        std::env::set_var("DASHBOARD_FPS", "4");
        std::env::set_var("DASHBOARD_ALLOW_CLEAR_CONSOLE", "off");

        let mut config = DashboardConfig::default();
        let result = apply_env_overrides(&mut config);
        clear_env();

        assert!(result.is_ok());
        assert_eq!(config.fps, 4);
        assert!(!config.allow_clear_console);
    }

    #[test]
    #[serial]
    fn test_env_override_garbage_fails() {
        clear_env();
        std::env::set_var("DASHBOARD_ALLOW_CLEAR_CONSOLE", "maybe");

        let mut config = DashboardConfig::default();
        let result = apply_env_overrides(&mut config);
        clear_env();

        assert!(result.unwrap_err().to_string().contains("DASHBOARD_ALLOW_CLEAR_CONSOLE"));
    }
}
