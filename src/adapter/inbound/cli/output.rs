//! CLI output formatting.
//!
//! Human-readable output by default, one JSON document per command with
//! `--json`, nothing with `--quiet`.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};

use super::command::ColorChoice;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Verbosity level (0 = normal, 1+ = increasingly verbose).
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Force colors on or off, or leave detection to the terminal.
pub fn apply_color(choice: &ColorChoice) {
    match choice {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

/// Number of `-v` flags given.
#[must_use]
pub fn verbosity() -> u8 {
    read_config().verbose
}

fn suppressed() -> bool {
    let config = read_config();
    config.json || config.quiet
}

/// Print a section header.
pub fn section(title: &str) {
    if suppressed() {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if suppressed() {
        return;
    }
    println!(
        "  {} {}",
        format!("{label:<14}").if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    if suppressed() {
        return;
    }
    println!(
        "  {} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    );
}

/// Print a note line.
pub fn note(message: &str) {
    if suppressed() {
        return;
    }
    println!("  {}", message.if_supports_color(Stream::Stdout, |t| t.dimmed()));
}

/// Print a block of preformatted text, such as a table.
pub fn lines(content: &str) {
    if suppressed() {
        return;
    }
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Print a JSON document on stdout. Only in JSON mode.
pub fn json_output(value: serde_json::Value) {
    if is_json() {
        println!("{value}");
    }
}
