use anyhow::Result;
use clap::Parser;
use codeprint::cli::{Cli, Commands};
use codeprint::commands::{self, AnalyzeConfig, CompareConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Analyze {
            input,
            format,
            config,
        } => commands::handle_analyze(AnalyzeConfig {
            input,
            format,
            config,
        }),
        Commands::Compare {
            source,
            target,
            format,
            config,
        } => commands::handle_compare(CompareConfig {
            source,
            target,
            format,
            config,
        }),
        Commands::Init { force } => commands::init_config(force),
    }
}

/// `RUST_LOG` wins over `-v`. Logs go to stderr so stdout stays parseable.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
