use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

/// Input path meaning "read from stdin".
pub const STDIN_MARKER: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "codeprint")]
#[command(
    about = "Characterize a source snippet: language, libraries, paradigm, code type and complexity",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Characterize one snippet
    Analyze {
        /// File to analyze, or `-` for stdin
        input: String,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Configuration file (skips the directory search)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check that TARGET is a faithful translation of SOURCE
    Compare {
        /// Original snippet
        source: PathBuf,

        /// Translated snippet
        target: PathBuf,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Configuration file (skips the directory search)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default .codeprint.toml in the current directory
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// `EnvFilter` directive for the requested verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "codeprint=info",
            2 => "codeprint=debug",
            _ => "codeprint=trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_with_format() {
        let cli = Cli::try_parse_from(["codeprint", "analyze", "-", "--format", "summary"]).unwrap();
        match cli.command {
            Commands::Analyze {
                input,
                format,
                config,
            } => {
                assert_eq!(input, STDIN_MARKER);
                assert_eq!(format, Some(OutputFormat::Summary));
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_compare() {
        let cli = Cli::try_parse_from(["codeprint", "-vv", "compare", "a.py", "b.js"]).unwrap();
        assert_eq!(cli.log_directive(), "codeprint=debug");
        assert!(matches!(
            cli.command,
            Commands::Compare { ref source, ref target, format: None, .. }
                if source == &PathBuf::from("a.py") && target == &PathBuf::from("b.js")
        ));
    }

    #[test]
    fn test_parse_init_force() {
        let cli = Cli::try_parse_from(["codeprint", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
        assert_eq!(cli.log_directive(), "warn");
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["codeprint", "analyze", "x.py", "--format", "xml"]).is_err());
    }
}
