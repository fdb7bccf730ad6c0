use clap::Parser;
use std::path::PathBuf;

/// Reads the next three weeks of calendar events aloud.
#[derive(Parser, Debug)]
#[command(name = "jarvis", version, about)]
pub struct CliArgs {
    /// Path to the TOML settings file (default: config/jarvis.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// IANA timezone used as local time, overrides TIMEZONE.
    #[arg(short = 't', long = "timezone")]
    pub timezone: Option<String>,

    /// Print the events without speaking them.
    #[arg(long = "print-only")]
    pub print_only: bool,

    /// Log filter, e.g. "debug" or "jarvis_calendar=trace".
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}
