//! Blueprints CLI entry point: parse flags, set up logging, run.

use blueprints_cli::{CliError, cli, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);
    ui::set_quiet(args.quiet);

    let result = blueprints_cli::run(&args).await;

    if let Err(CliError::Config(err)) = &result {
        if err.is_blueprint_error() {
            ui::error("Error in loading blueprints");
        }
    }

    result.map_err(error::cli_error_to_miette)
}
