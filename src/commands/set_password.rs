use anyhow::{anyhow, Result};

use stoken::Pin;

use super::unlock_token::{current_token, load_token, request_new_password, save_token, unlock_token};
use crate::cli::TokenArgs;

/// Re-encrypts the token under a new password.
///
/// Tokens from the rcfile are saved back to it, others are printed.
pub fn set_password(args: &TokenArgs, new_password: Option<&str>) -> Result<()> {
    let mut ctx = load_token(args, false)?;
    unlock_token(&mut ctx, args, false)?;

    let password = request_new_password(new_password)?;
    let token = current_token(&ctx)?;
    let token_string = token.encode(password.as_deref(), None, 2, false)?;

    if !args.uses_rcfile() {
        println!("{}", token_string);
        return Ok(());
    }

    let pin = token.pin().map(Pin::as_str);
    save_token(args.rcfile.as_deref(), token_string, pin, password.as_deref())
        .map_err(|err| anyhow!("can't set password: {}", err))
}
