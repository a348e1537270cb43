use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{read_file, resolve_config};
use crate::config::OutputFormat;
use crate::formatting::{render_validation, ColorMode, Painter};
use crate::pipeline::Characterizer;

pub struct CompareConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub format: Option<OutputFormat>,
    pub config: Option<PathBuf>,
}

/// Prints the validation and fails when the translation is invalid.
pub fn handle_compare(config: CompareConfig) -> Result<()> {
    let settings = resolve_config(config.config.as_deref())?;
    let source = read_file(&config.source)?;
    let target = read_file(&config.target)?;

    let characterizer = Characterizer::from_config(&settings.detection());
    let validation = characterizer
        .compare(&source, &target)
        .context("Failed to compare snippets")?;
    let Some(validation) = validation else {
        anyhow::bail!("Both SOURCE and TARGET must contain code");
    };

    let output = settings.output();
    match config.format.unwrap_or(output.format) {
        OutputFormat::Json if output.pretty => {
            println!("{}", serde_json::to_string_pretty(&validation)?)
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&validation)?),
        OutputFormat::Summary => {
            print!(
                "{}",
                render_validation(&validation, Painter::new(ColorMode::from_env()))
            )
        }
    }

    if !validation.is_valid {
        anyhow::bail!(
            "Translation check failed: {}",
            validation
                .failures()
                .map(|check| check.field.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
