use crate::config::input::{InputDocument, DEFAULT_INPUT_FILE};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "racecard-relay")]
#[command(about = "Run the rpscrape scraper and republish its JSON output")]
pub struct CliArgs {
    /// TOML config file (defaults to ./relay.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON input document with `command` and `date`
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Scraper script to run, overrides the input document
    #[arg(long)]
    pub command: Option<String>,

    /// Date argument passed to the script, overrides the input document
    #[arg(long)]
    pub date: Option<String>,

    /// Override storage.local_dir from config
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage for each phase")]
    pub monitor: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> InputDocument {
        InputDocument {
            command: self.command.clone(),
            date: self.date.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = CliArgs::parse_from([
            "racecard-relay",
            "--command",
            "racedays",
            "--date",
            "2025-03-01",
            "--monitor",
        ]);
        assert!(args.monitor);
        assert_eq!(args.input, PathBuf::from(DEFAULT_INPUT_FILE));
        assert_eq!(
            args.overrides(),
            InputDocument {
                command: Some("racedays".to_string()),
                date: Some("2025-03-01".to_string()),
            }
        );
    }
}
