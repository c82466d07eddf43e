//! Configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::caret::mapper::CoordinateMapper;
use crate::display::DisplayConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("display {index} has non-positive scale factor {scale}")]
    InvalidScale { index: usize, scale: f64 },
    #[error("display {index} has empty bounds")]
    EmptyBounds { index: usize },
    #[error("edge clearance must be non-negative, got {0}")]
    NegativeClearance(f64),
    #[error("model name is empty")]
    EmptyModel,
}

/// Generative-AI client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key. `GEMINI_API_KEY` / `GOOGLE_API_KEY` take precedence.
    pub api_key: Option<String>,

    pub model: String,

    pub api_base_url: String,

    /// Language the critique and rewrite are produced in
    pub output_language: String,

    /// Network timeout. None = wait as long as the service takes.
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            output_language: "Korean".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl LlmConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .chain(self.api_key.clone())
            .find(|key| !key.trim().is_empty())
    }
}

/// Caret watcher process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            command: "powershell.exe".to_string(),
            args: vec![
                "-NoProfile".to_string(),
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
                "resources/tracker.ps1".to_string(),
            ],
        }
    }
}

/// Text insertion helper. `{pid}` and `{text}` are substituted per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InserterConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for InserterConfig {
    fn default() -> Self {
        Self {
            command: "powershell.exe".to_string(),
            args: vec![
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
                "resources/inserter.ps1".to_string(),
                "-ProcessId".to_string(),
                "{pid}".to_string(),
                "-Text".to_string(),
                "{text}".to_string(),
            ],
        }
    }
}

/// Widget placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Logical px kept free at the right/bottom display edge
    pub edge_clearance: f64,

    /// Horizontal gap between caret and widget
    pub widget_offset_x: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            edge_clearance: CoordinateMapper::DEFAULT_EDGE_CLEARANCE,
            widget_offset_x: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    pub llm: LlmConfig,
    pub tracker: TrackerConfig,
    pub inserter: InserterConfig,
    pub overlay: OverlayConfig,
    pub displays: Vec<DisplayConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            llm: LlmConfig::default(),
            tracker: TrackerConfig::default(),
            inserter: InserterConfig::default(),
            overlay: OverlayConfig::default(),
            displays: vec![DisplayConfig::default()],
        }
    }
}

impl AppConfig {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;

            let mut config: AppConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            config.config_path = path.to_path_buf();
            config
        } else {
            let config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save().context("Failed to save default config")?;
            config
        };

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, display) in self.displays.iter().enumerate() {
            if !(display.scale_factor.is_finite() && display.scale_factor > 0.0) {
                return Err(ConfigError::InvalidScale {
                    index,
                    scale: display.scale_factor,
                });
            }
            if display.width <= 0.0 || display.height <= 0.0 {
                return Err(ConfigError::EmptyBounds { index });
            }
        }
        if self.overlay.edge_clearance < 0.0 {
            return Err(ConfigError::NegativeClearance(self.overlay.edge_clearance));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptly")
            .join("config.toml")
    }
}
