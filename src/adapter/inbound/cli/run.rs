//! Command dispatch.

use std::path::Path;

use super::command::{Cli, Commands, ConfigCommand};
use super::{bucket, config, output, retrieve};
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Load `path`, or the defaults when no file is given, and start logging from
/// its `[logging]` section with the global flags applied on top.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.logging = config
        .logging
        .with_overrides(output::verbosity(), output::is_json());
    config.init_logging();
    Ok(config)
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    output::apply_color(&cli.color);

    match cli.command {
        Commands::Bucket(args) => bucket::execute(&args),
        Commands::Retrieve(args) => retrieve::execute(&args).await,
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args.path),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.path),
    }
}
