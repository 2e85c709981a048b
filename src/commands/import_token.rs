use anyhow::Result;

use super::unlock_token::{load_token, request_new_password, save_token, unlock_token};
use crate::cli::{ReencodeArgs, TokenArgs};

/// Re-encodes the selected token as a version 2 string and stores it in the rcfile.
pub fn import_token(args: &TokenArgs, reencode: &ReencodeArgs) -> Result<()> {
    let mut ctx = load_token(args, true)?;
    let unlocked = unlock_token(&mut ctx, args, false)?;

    let password = if reencode.keep_password {
        unlocked.password
    } else {
        request_new_password(reencode.new_password.as_deref())?
    };

    let token = ctx.encrypt_seed(password.as_deref(), reencode.new_devid.as_deref())?;
    save_token(args.rcfile.as_deref(), token, None, password.as_deref())?;

    println!("Token imported");
    Ok(())
}
