use clap::Parser;
use anyhow::Result;
use std::path::PathBuf;
use log::debug;

/// Application bootstrap core
#[derive(Parser, Debug)]
#[command(name = "bootcore")]
#[command(about = "Bootstrap the application and dispatch the configured command unit")]
#[command(version)]
pub struct Args {
    /// Application root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Verbose output (FINE level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (SEVERE level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (FINEST level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    /// Directory holding unit descriptors
    #[arg(long, value_name = "DIR")]
    pub commands_dir: Option<PathBuf>,

    /// Run directive overriding the configured one, e.g. "echo hello"
    #[arg(long, value_name = "DIRECTIVE")]
    pub run: Option<String>,

    /// List available command units and exit
    #[arg(long)]
    pub list_commands: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        crate::logging::parse_log_level(level)?;
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if args.run.is_some() && args.list_commands {
        return Err(anyhow::anyhow!("--run cannot be combined with --list-commands"));
    }

    Ok(())
}
