mod cli;
mod logging;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;

use crate::cli::{handle_command, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(logging::level_for(cli.verbose, cli.log_level.as_deref()));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    handle_command(cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}
