use anyhow::Result;

mod cli;
mod commands;
mod enums;
mod terminal;

use cli::Cli;

fn main() -> Result<()> {
    Cli::run()
}
