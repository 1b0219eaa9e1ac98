use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Command-line arguments of the ideaboard binary
#[derive(Parser, Debug)]
#[clap(
    name = "ideaboard",
    version,
    about = "Plan LinkedIn post ideas: pipeline, metrics and CSV import/export"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// CSV file to load into the session at startup
    #[clap(short, long, value_parser)]
    pub import: Option<PathBuf>,

    /// Read session commands from this file instead of standard input
    #[clap(short, long, value_parser)]
    pub script: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[clap(short, long)]
    pub yes: bool,
}

/// A single line typed into the session
#[derive(Parser, Debug)]
#[clap(no_binary_name = true, disable_version_flag = true)]
pub struct SessionLine {
    #[clap(subcommand)]
    pub command: Commands,
}
