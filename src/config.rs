//! Configuration file support for pagetrim
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./pagetrim.toml` - current directory
//! 3. `~/.config/pagetrim/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [margin]
//! color = "#ffffff"
//! tolerance = 20
//!
//! [defaults]
//! tolerance = 10
//! batch_tolerance = 150
//!
//! [batch]
//! threads = 4
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::batch::BatchOptions;
use crate::margin::{
    RgbColor, Tolerance, TrimOptions, DEFAULT_BATCH_TOLERANCE, DEFAULT_TOLERANCE,
};

/// Local configuration file name
pub const LOCAL_CONFIG_FILE: &str = "pagetrim.toml";

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Margin color in the file or on the command line is malformed
    #[error("Invalid margin color '{0}'")]
    InvalidColor(String),
}

/// Margin settings applied to every image
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MarginConfig {
    /// Explicit margin color (`#RRGGBB`)
    #[serde(default)]
    pub color: Option<String>,

    /// Explicit tolerance, overriding both defaults
    #[serde(default)]
    pub tolerance: Option<u8>,
}

/// Default tolerances when none is given explicitly
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Single-image default (`detect`)
    #[serde(default)]
    pub tolerance: Option<u8>,

    /// Batch default (`trim`)
    #[serde(default)]
    pub batch_tolerance: Option<u8>,
}

/// Batch execution settings
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Number of worker threads
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub margin: MarginConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./pagetrim.toml`
    /// 2. `~/.config/pagetrim/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// A configured margin color must be valid hex; a file that parses as
    /// TOML but names a bad color is rejected as a whole.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.margin_color()?;
        Ok(config)
    }

    /// Get config file search paths
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("pagetrim").join("config.toml"));
        }

        paths
    }

    /// Tolerance for the batch `trim` command
    pub fn batch_tolerance(&self) -> Tolerance {
        Tolerance(
            self.margin
                .tolerance
                .or(self.defaults.batch_tolerance)
                .unwrap_or(DEFAULT_BATCH_TOLERANCE),
        )
    }

    /// Tolerance for single-image commands
    pub fn single_tolerance(&self) -> Tolerance {
        Tolerance(
            self.margin
                .tolerance
                .or(self.defaults.tolerance)
                .unwrap_or(DEFAULT_TOLERANCE),
        )
    }

    /// Parsed margin color, if one is configured
    pub fn margin_color(&self) -> Result<Option<RgbColor>, ConfigError> {
        parse_color(self.margin.color.as_deref())
    }

    /// Build batch options, CLI values taking precedence
    pub fn batch_options(&self, cli: &CliOverrides) -> Result<BatchOptions, ConfigError> {
        let trim = TrimOptions {
            margin_color: self.merged_color(cli)?,
            tolerance: cli.tolerance.map(Tolerance).unwrap_or(self.batch_tolerance()),
            dry_run: cli.dry_run,
        };

        Ok(BatchOptions {
            trim,
            threads: cli.threads.or(self.batch.threads),
        })
    }

    /// Build single-image options, CLI values taking precedence
    pub fn single_options(&self, cli: &CliOverrides) -> Result<TrimOptions, ConfigError> {
        Ok(TrimOptions {
            margin_color: self.merged_color(cli)?,
            tolerance: cli.tolerance.map(Tolerance).unwrap_or(self.single_tolerance()),
            dry_run: cli.dry_run,
        })
    }

    fn merged_color(&self, cli: &CliOverrides) -> Result<Option<RgbColor>, ConfigError> {
        match cli.margin_color.as_deref() {
            Some(hex) => parse_color(Some(hex)),
            None => self.margin_color(),
        }
    }
}

fn parse_color(hex: Option<&str>) -> Result<Option<RgbColor>, ConfigError> {
    hex.map(|s| {
        s.parse::<RgbColor>()
            .map_err(|_| ConfigError::InvalidColor(s.to_string()))
    })
    .transpose()
}

/// CLI override values for merging with config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub margin_color: Option<String>,
    pub tolerance: Option<u8>,
    pub threads: Option<usize>,
    pub dry_run: bool,
}
