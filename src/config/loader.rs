use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::{CacheConfig, CodeprintConfig, DetectionConfig};
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".codeprint.toml";
const MAX_TRAVERSAL_DEPTH: usize = 10;

pub(crate) fn read_config_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse TOML and replace invalid values with their defaults.
pub fn parse_and_validate_config(contents: &str) -> Result<CodeprintConfig> {
    let mut config = toml::from_str::<CodeprintConfig>(contents)?;

    if let Some(detection) = config.detection.as_mut() {
        if detection.fallback_language().is_unknown() {
            log::warn!(
                "Unknown default_language '{}'. Using {}.",
                detection.default_language,
                DetectionConfig::default().default_language
            );
            detection.default_language = DetectionConfig::default().default_language;
        }
    }

    if let Some(cache) = config.cache.as_mut() {
        if cache.capacity == 0 {
            log::warn!(
                "Cache capacity must be positive. Using {}.",
                CacheConfig::default().capacity
            );
            cache.capacity = CacheConfig::default().capacity;
        }
    }

    Ok(config)
}

pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<CodeprintConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!(
                "Failed to parse {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            None
        }
    }
}

/// Only real read failures are logged; a missing file is the normal case.
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// `start` and its ancestors, nearest first, at most `max_depth` entries.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and up to nine ancestors for `.codeprint.toml`.
pub fn load_config_from_dir(start: PathBuf) -> CodeprintConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            CodeprintConfig::default()
        })
}

pub fn load_config() -> CodeprintConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from_dir(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            CodeprintConfig::default()
        }
    }
}

/// Load an explicitly named config file. Unlike the directory search, a
/// missing or unparsable file is an error here.
pub fn load_config_file(path: &Path) -> Result<CodeprintConfig> {
    let contents = read_config_file(path).map_err(|e| {
        Error::configuration(format!("cannot read config: {e}"), Some(path.to_path_buf()))
    })?;
    parse_and_validate_config(&contents).map_err(|e| match e {
        Error::Toml(inner) => Error::configuration(inner.to_string(), Some(path.to_path_buf())),
        other => other,
    })
}

/// Contents written by `codeprint init`.
pub fn default_config_toml() -> String {
    let defaults = CodeprintConfig {
        detection: Some(DetectionConfig::default()),
        output: Some(Default::default()),
        cache: Some(CacheConfig::default()),
    };
    toml::to_string_pretty(&defaults).unwrap_or_default()
}
