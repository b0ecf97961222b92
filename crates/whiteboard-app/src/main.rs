//! Command-line entry point.

use clap::Parser;
use whiteboard_app::Cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Running {:?}", cli.command);
    whiteboard_app::run(cli)
}
