//! Stackpack CLI entry point.
//!
//! Parses arguments, sets up logging and colors, then hands over to
//! [`stackpack_cli::run`].

use clap::Parser;
use miette::Result;
use stackpack_cli::{cli, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    stackpack_cli::run(args, None)
        .await
        .map_err(error::cli_error_to_miette)
}
