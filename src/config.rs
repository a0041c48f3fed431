//! Configuration for result classification and tooltip layout
//!
//! The p-value threshold is fixed at 0.05 (see `classify::SIGNIFICANCE_THRESHOLD`).
//! Everything else that shapes a verdict or a popup lives here and can be
//! loaded from a TOML file:
//!
//! ```toml
//! [classifier]
//! chance_to_win_threshold = 0.95
//! negligible_effect = 0.001
//! min_users = 150
//!
//! [tooltip]
//! width = 400.0
//! height = 400.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rules the classifier applies on top of the upstream statistics
///
/// # Example
/// ```
/// use abverdict::config::ClassifierConfig;
///
/// let config = ClassifierConfig::default();
/// assert_eq!(config.chance_to_win_threshold, 0.95);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Bayesian decision band: a result is significant when chance to win is
    /// above this value or below `1 - threshold`.
    pub chance_to_win_threshold: f64,

    /// Relative lifts with a smaller magnitude than this are a draw even when
    /// significant.
    pub negligible_effect: f64,

    /// Minimum users in both the baseline and the variation before a result
    /// is considered to have enough data.
    pub min_users: u64,

    /// Minimum collection window in days. `None` disables the duration check.
    pub min_duration_days: Option<f64>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            chance_to_win_threshold: 0.95,
            negligible_effect: 0.001,
            min_users: 150,
            min_duration_days: None,
        }
    }
}

impl ClassifierConfig {
    /// Tighter decision band and larger sample requirement
    pub fn strict() -> Self {
        Self {
            chance_to_win_threshold: 0.99,
            negligible_effect: 0.005,
            min_users: 500,
            min_duration_days: Some(7.0),
        }
    }

    /// Looser band, useful when peeking at early results
    pub fn permissive() -> Self {
        Self {
            chance_to_win_threshold: 0.90,
            negligible_effect: 0.0,
            min_users: 50,
            min_duration_days: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.5..1.0).contains(&self.chance_to_win_threshold) {
            return Err(ConfigError::Invalid {
                field: "chance_to_win_threshold",
                reason: format!("must be in [0.5, 1), got {}", self.chance_to_win_threshold),
            });
        }

        if !self.negligible_effect.is_finite() || self.negligible_effect < 0.0 {
            return Err(ConfigError::Invalid {
                field: "negligible_effect",
                reason: format!("must be non-negative, got {}", self.negligible_effect),
            });
        }

        if let Some(days) = self.min_duration_days {
            if !days.is_finite() || days < 0.0 {
                return Err(ConfigError::Invalid {
                    field: "min_duration_days",
                    reason: format!("must be non-negative, got {}", days),
                });
            }
        }

        Ok(())
    }
}

/// Popup footprint used for layout estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Preferred popup width, clamped to the viewport at placement time
    pub width: f64,
    /// Estimated popup height for over/under decisions. Rendered height may differ.
    pub height: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
        }
    }
}

impl TooltipConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "tooltip.width",
                reason: format!("must be positive, got {}", self.width),
            });
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "tooltip.height",
                reason: format!("must be positive, got {}", self.height),
            });
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerdictConfig {
    pub classifier: ClassifierConfig,
    pub tooltip: TooltipConfig,
}

impl VerdictConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: VerdictConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classifier.validate()?;
        self.tooltip.validate()
    }
}
