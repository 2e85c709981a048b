use anyhow::{anyhow, Result};
use std::io::{stdout, Write};

use super::unlock_token::{adjusted_time, current_token, load_token, unlock_token};
use crate::cli::TokenArgs;

const EXPIRY_WARNING_DAYS: i64 = 14;

pub fn show_tokencode(args: &TokenArgs) -> Result<()> {
    let mut ctx = load_token(args, false)?;
    let unlocked = unlock_token(&mut ctx, args, true)?;

    let token = current_token(&ctx)?;
    let when = adjusted_time(args, token.interval())?;
    let days_left = token.days_until_expiry(when);
    if days_left < 0 && !args.force {
        Err(anyhow!("token has expired; use --force to override"))?;
    }

    let code = ctx.compute_tokencode(when, unlocked.pin.as_deref())?;

    let stdout = stdout();
    let mut stdout = stdout.lock();
    stdout.write_all(code.as_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;

    if days_left < EXPIRY_WARNING_DAYS && !args.force {
        let plural = if days_left == 1 { "" } else { "s" };
        eprintln!("warning: token expires in {} day{}", days_left, plural);
    }

    Ok(())
}
