//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Single-request header bidding demand adapter
#[derive(Parser, Debug)]
#[command(name = "slotbid")]
#[command(version, about)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the targeting and price outputs for a raw price
    Bucket(BucketArgs),

    /// Request demand for a set of slots
    Retrieve(RetrieveArgs),

    /// Inspect configuration files
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigPathArg),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
}

#[derive(clap::Args, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file
    #[arg(default_value = "slotbid.toml")]
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct BucketArgs {
    /// Raw price as returned by the endpoint (number or sentinel)
    pub price: String,

    /// Configuration file providing bucket settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RetrieveArgs {
    /// Slot to request, as `<slot_id>=<placement_key>`; repeatable
    #[arg(short, long = "slot", value_name = "SLOT=KEY", required = true, value_parser = parse_slot)]
    pub slots: Vec<(String, String)>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Session id attached to events
    #[arg(long, default_value = "cli")]
    pub session: String,
}

fn parse_slot(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((slot, key)) if !slot.trim().is_empty() && !key.trim().is_empty() => {
            Ok((slot.trim().to_string(), key.trim().to_string()))
        }
        _ => Err(format!("expected <slot_id>=<placement_key>, got '{value}'")),
    }
}
