use serde::{Deserialize, Serialize};

use crate::core::Language;

pub const DEFAULT_CACHE_CAPACITY: usize = 64;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Root configuration structure, read from `.codeprint.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CodeprintConfig {
    /// Detector settings
    #[serde(default)]
    pub detection: Option<DetectionConfig>,

    /// Output formatting
    #[serde(default)]
    pub output: Option<OutputConfig>,

    /// Result cache and debounce settings
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

impl CodeprintConfig {
    pub fn detection(&self) -> DetectionConfig {
        self.detection.clone().unwrap_or_default()
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }

    pub fn cache(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionConfig {
    /// Language reported when no pattern scores
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Build the IR through language adapters; `false` forces the legacy
    /// complexity heuristics
    #[serde(default = "default_true")]
    pub use_adapters: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            use_adapters: true,
        }
    }
}

impl DetectionConfig {
    pub fn fallback_language(&self) -> Language {
        Language::from_id(&self.default_language)
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The record as JSON
    #[default]
    Json,
    /// Colored human-readable overview
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cached characterizations before the oldest is evicted
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Quiet period before a changed input is re-analyzed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CACHE_CAPACITY,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

fn default_language() -> String {
    Language::JavaScript.id().to_string()
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
