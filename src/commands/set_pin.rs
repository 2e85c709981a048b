use anyhow::{anyhow, Result};

use stoken::pin::pin_format_ok;

use super::unlock_token::{current_token, load_token, save_token, unlock_token};
use crate::cli::TokenArgs;
use crate::terminal::read_secret;

/// Saves a new PIN next to the rcfile token. An empty PIN removes it.
pub fn set_pin(args: &TokenArgs, new_pin: Option<&str>) -> Result<()> {
    if !args.uses_rcfile() {
        Err(anyhow!("setpin only operates on the rcfile token"))?;
    }

    let mut ctx = load_token(args, false)?;
    let unlocked = unlock_token(&mut ctx, args, false)?;

    let pin = match new_pin {
        Some(pin) => {
            pin_format_ok(pin).map_err(|_| anyhow!("invalid --new-pin format"))?;
            pin.to_owned()
        }
        None => {
            let pin = read_secret("Enter new PIN: ")?;
            if !pin.is_empty() {
                pin_format_ok(&pin)?;
            }
            let confirm = read_secret("Confirm new PIN: ")?;
            if pin != confirm {
                Err(anyhow!("PINs do not match"))?;
            }
            pin
        }
    };

    let password = unlocked.password.as_deref();
    let token = current_token(&ctx)?.encode(password, None, 2, false)?;
    let pin = Some(pin.as_str()).filter(|p| !p.is_empty());
    save_token(args.rcfile.as_deref(), token, pin, password)
        .map_err(|err| anyhow!("can't set PIN: {}", err))
}
