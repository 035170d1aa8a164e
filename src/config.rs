//! Configuration loading and validation.
//!
//! Loads `u-allot.toml` with environment variable overrides. Every section
//! is optional; missing values take their defaults.
//!
//! ```toml
//! [model]
//! path = "data/model.json"
//!
//! [model.readiness]
//! initial_backoff_ms = 100
//! max_backoff_ms = 2000
//! multiplier = 2.0
//! deadline_ms = 10000
//!
//! [cost]
//! low = 0.25
//! medium = 1.25
//! high = 2.5
//!
//! [training]
//! n_estimators = 100
//! max_depth = 7
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::allocation::CostModel;
use crate::error::{AllotError, Result};
use crate::store::ReadinessPolicy;
use crate::training::TrainingConfig;

/// Environment variable overriding `model.path`.
pub const MODEL_PATH_ENV: &str = "U_ALLOT_MODEL_PATH";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "u-allot.toml";

/// The root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllotConfig {
    /// Model artifact location and readiness policy
    #[serde(default)]
    pub model: ModelConfig,

    /// Cost per effort class
    #[serde(default)]
    pub cost: CostModel,

    /// Trainer hyperparameters
    #[serde(default)]
    pub training: TrainingConfig,
}

/// `[model]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Artifact file location
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// How long requests wait for a model
    #[serde(default)]
    pub readiness: ReadinessPolicy,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("data/model.json")
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            readiness: ReadinessPolicy::default(),
        }
    }
}

impl AllotConfig {
    /// Loads configuration from `path`, then applies environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without environment overrides.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| AllotError::Config {
            message: format!("invalid TOML: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AllotError::Config {
            message: format!("cannot serialize config: {e}"),
        })
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        if self.model.path.as_os_str().is_empty() {
            return Err(AllotError::Config {
                message: "model.path must not be empty".into(),
            });
        }
        self.model.readiness.validate()?;
        self.cost.validate()?;
        self.training.validate()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(MODEL_PATH_ENV).filter(|p| !p.is_empty()) {
            self.model.path = PathBuf::from(path);
        }
    }
}
