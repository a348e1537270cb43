use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{read_input, resolve_config};
use crate::characterization::CodeCharacterization;
use crate::config::{OutputConfig, OutputFormat};
use crate::formatting::{render_summary, ColorMode, Painter};
use crate::pipeline::Characterizer;

pub struct AnalyzeConfig {
    pub input: String,
    pub format: Option<OutputFormat>,
    pub config: Option<PathBuf>,
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    let settings = resolve_config(config.config.as_deref())?;
    let source = read_input(&config.input)?;

    let characterizer = Characterizer::from_config(&settings.detection());
    let record = characterizer
        .characterize_labeled(&config.input, &source)
        .with_context(|| format!("Failed to characterize {}", config.input))?;

    let mut output = settings.output();
    if let Some(format) = config.format {
        output.format = format;
    }
    let painter = Painter::new(ColorMode::from_env());
    print!("{}", render_record(record.as_ref(), &output, painter)?);
    Ok(())
}

/// Empty input renders as JSON `null` or a one-line notice.
pub fn render_record(
    record: Option<&CodeCharacterization>,
    output: &OutputConfig,
    painter: Painter,
) -> Result<String> {
    match output.format {
        OutputFormat::Json => {
            let json = if output.pretty {
                serde_json::to_string_pretty(&record)?
            } else {
                serde_json::to_string(&record)?
            };
            Ok(format!("{json}\n"))
        }
        OutputFormat::Summary => Ok(match record {
            Some(record) => render_summary(record, painter),
            None => format!("{}\n", painter.dim("No code to characterize.")),
        }),
    }
}
