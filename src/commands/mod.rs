//! CLI command implementations.
//!
//! - **analyze**: characterize one snippet from a file or stdin
//! - **compare**: validate a translation against its source
//! - **init**: write a default `.codeprint.toml`

pub mod analyze;
pub mod compare;
pub mod init;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::cli::STDIN_MARKER;
use crate::config::{load_config, load_config_file, CodeprintConfig};

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use compare::{handle_compare, CompareConfig};
pub use init::init_config;

/// An explicit `--config` must load; otherwise search upward from the
/// current directory.
pub fn resolve_config(explicit: Option<&Path>) -> Result<CodeprintConfig> {
    match explicit {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(load_config()),
    }
}

pub fn read_input(input: &str) -> Result<String> {
    if input == STDIN_MARKER {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        read_file(Path::new(input))
    }
}

pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
