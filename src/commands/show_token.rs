use anyhow::Result;
use std::io::{stdout, Write};

use super::unlock_token::{load_token, unlock_token};
use crate::cli::TokenArgs;

pub fn show_token(args: &TokenArgs, show_seed: bool) -> Result<()> {
    let mut ctx = load_token(args, false)?;
    unlock_token(&mut ctx, args, false)?;

    let stdout = stdout();
    let mut stdout = stdout.lock();

    for (key, value) in ctx.info_lines() {
        // anything seed related needs --seed
        if !show_seed && key.to_ascii_lowercase().contains("seed") {
            continue;
        }
        writeln!(stdout, "{:<24}: {}", key, value)?;
    }
    stdout.flush()?;

    Ok(())
}
