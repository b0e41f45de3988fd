use crate::reports::ReportKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily crypto digest for a Telegram channel", long_about = None)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "config/settings.toml")]
    pub config: PathBuf,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Publish reports to the channel once and exit
    #[arg(long)]
    pub once: bool,

    /// With --once, publish only this report
    #[arg(long, requires = "once")]
    pub report: Option<ReportKind>,
}
