// src/config.rs

//! Configuration for the virtual screen and the demo driver.
//!
//! Deserialized from a JSON file. Every section and field has a default, so
//! a partial file (or no file at all) yields a usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "VMS_CONFIG";

/// Root of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Virtual screen geometry and presentation settings.
    pub screen: ScreenConfig,
    /// Settings for the bundled demo binary.
    pub demo: DemoConfig,
}

/// Virtual screen geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    /// Width in virtual pixels. Must be a multiple of 8.
    pub width: usize,
    /// Height in virtual pixels. Must be a multiple of 8.
    pub height: usize,
    /// Real pixels per virtual pixel, per axis.
    pub px_size: usize,
    /// Upper bound on the wait for the first expose event.
    /// Absent means wait indefinitely.
    pub expose_timeout_ms: Option<u64>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            width: 64,
            height: 32,
            px_size: 10,
            expose_timeout_ms: None,
        }
    }
}

impl ScreenConfig {
    pub fn expose_timeout(&self) -> Option<Duration> {
        self.expose_timeout_ms.map(Duration::from_millis)
    }
}

/// Demo animation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of frames to animate before exiting.
    pub frames: u32,
    /// Delay between frames in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            frames: 120,
            frame_interval_ms: 33,
        }
    }
}

impl Config {
    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse configuration JSON")
    }

    /// Loads the file named by `VMS_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.screen.expose_timeout(), None);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config =
            Config::from_json(r#"{ "screen": { "px_size": 4, "expose_timeout_ms": 250 } }"#)
                .unwrap();
        assert_eq!(config.screen.width, 64);
        assert_eq!(config.screen.height, 32);
        assert_eq!(config.screen.px_size, 4);
        assert_eq!(
            config.screen.expose_timeout(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.demo, DemoConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json("{ screen: ").is_err());
    }

    #[test]
    fn load_reads_a_file_and_reports_missing_ones() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("vms-config-test-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "demo": { "frames": 3 } }"#).unwrap();
        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.demo.frames, 3);
        assert_eq!(config.demo.frame_interval_ms, 33);

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
