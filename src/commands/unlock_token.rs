use anyhow::{anyhow, Result};
use chrono::Utc;
use std::path::Path;
use tracing::debug;

use stoken::constants::MAX_PASS;
use stoken::pin::{encrypt_pin, pin_format_ok};
use stoken::{find_guid, guid_list, Pin, Token, TokenConfig, TokenContext, TokenError};

use crate::cli::TokenArgs;
use crate::terminal::{read_line, read_secret};

const ATTEMPTS: usize = 3;

/// Credentials gathered while unlocking a token.
pub struct Unlocked {
    pub password: Option<String>,
    pub pin: Option<String>,
}

/// Loads the token named on the command line, or the rcfile token.
pub fn load_token(args: &TokenArgs, importing: bool) -> Result<TokenContext> {
    let mut ctx = TokenContext::new();

    if let Some(token) = &args.token {
        ctx.import_string(token)
            .map_err(|err| anyhow!("--token string is garbled: {}", err))?;
    } else if let Some(file) = &args.file {
        ctx.import_file(file).map_err(|err| match err {
            TokenError::MultipleTokens => {
                anyhow!("multiple tokens found; split them into separate files")
            }
            err => anyhow!("no valid token in file '{}': {}", file.display(), err),
        })?;
    } else if args.random {
        ctx.set_token(Token::random()?);
    } else if importing {
        Err(anyhow!("please specify --file, --token, or --random"))?;
    } else {
        ctx.import_rcfile(args.rcfile.as_deref()).map_err(|err| {
            debug!(%err, "no usable rcfile token");
            anyhow!("no token present. Use 'stoken import' to add one.")
        })?;
    }

    if importing && !args.force && TokenConfig::read(args.rcfile.as_deref()).is_ok() {
        Err(anyhow!("token already exists; use --force to overwrite it"))?;
    }

    Ok(ctx)
}

pub fn current_token(ctx: &TokenContext) -> Result<&Token> {
    ctx.token().ok_or(anyhow!("no token present"))
}

/// Prompts for whatever the token needs and decrypts its seed.
pub fn unlock_token(ctx: &mut TokenContext, args: &TokenArgs, get_pin: bool) -> Result<Unlocked> {
    let devid = if ctx.devid_required() {
        Some(request_devid(ctx, args)?)
    } else {
        None
    };

    let password = if ctx.pass_required() {
        Some(request_password(ctx, args, devid.as_deref())?)
    } else {
        try_decrypt(ctx, None, devid.as_deref())
            .map_err(|err| anyhow!("can't decrypt token: {}", err))?;
        None
    };

    // --pin always overrides a PIN saved in the rcfile
    let token_uses_pin = ctx.token().is_some_and(Token::pin_required);
    let pin = if get_pin && token_uses_pin && (ctx.pin_required() || args.pin.is_some()) {
        Some(request_pin(args)?)
    } else {
        None
    };

    Ok(Unlocked { password, pin })
}

fn try_decrypt(ctx: &mut TokenContext, pass: Option<&str>, devid: Option<&str>) -> stoken::Result<()> {
    match ctx.decrypt_seed(pass, devid) {
        Err(TokenError::EncryptedPin) => {
            eprintln!("warning: can't decrypt PIN");
            let mut token = ctx.token().cloned().ok_or(TokenError::NoToken)?;
            token.set_enc_pin(None);
            ctx.set_token(token);
            ctx.decrypt_seed(pass, devid)
        }
        result => result,
    }
}

fn request_devid(ctx: &TokenContext, args: &TokenArgs) -> Result<String> {
    if let Some(devid) = &args.devid {
        // a class tag such as "iphone" stands for its GUID
        let devid = find_guid(devid).map_or(devid.as_str(), |class| class.guid);
        if ctx.check_devid(devid) {
            return Ok(devid.to_owned());
        }
        eprintln!("warning: --devid parameter is incorrect");
    } else if let Some(class) = guid_list().iter().find(|g| ctx.check_devid(g.guid)) {
        println!("Using class GUID for {}; use --devid to override", class.long_name);
        return Ok(class.guid.to_owned());
    }

    println!("This token is bound to a specific device.");
    for _ in 0..ATTEMPTS {
        let devid = read_line("Enter device ID from the RSA 'About' screen: ")?;
        if ctx.check_devid(&devid) {
            return Ok(devid);
        }
        println!("Device ID does not match the token.");
    }
    Err(anyhow!("invalid device ID"))
}

fn request_password(ctx: &mut TokenContext, args: &TokenArgs, devid: Option<&str>) -> Result<String> {
    if let Some(pass) = &args.password {
        match try_decrypt(ctx, Some(pass), devid) {
            Ok(()) => return Ok(pass.clone()),
            Err(TokenError::DecryptFailed | TokenError::BadPassword) => {
                eprintln!("warning: --password parameter is incorrect")
            }
            Err(err) => Err(anyhow!("can't decrypt token: {}", err))?,
        }
    }

    for _ in 0..ATTEMPTS {
        let pass = read_secret("Enter password to decrypt token: ")?;
        match try_decrypt(ctx, Some(&pass), devid) {
            Ok(()) => return Ok(pass),
            Err(TokenError::DecryptFailed | TokenError::BadPassword | TokenError::MissingPassword) => {
                eprintln!("Bad password.")
            }
            Err(err) => Err(anyhow!("can't decrypt token: {}", err))?,
        }
    }
    Err(anyhow!("invalid password"))
}

fn request_pin(args: &TokenArgs) -> Result<String> {
    if let Some(pin) = &args.pin {
        match pin_format_ok(pin) {
            Ok(()) => return Ok(pin.clone()),
            Err(TokenError::PinLength) => eprintln!("warning: bad --pin argument length, ignoring"),
            Err(_) => eprintln!("warning: --pin argument is not numeric, ignoring"),
        }
    }

    for _ in 0..ATTEMPTS {
        let pin = read_secret("Enter PIN: ")?;
        match pin_format_ok(&pin) {
            Ok(()) => return Ok(pin),
            Err(err) => eprintln!("{}. Use '0000' for no PIN.", err),
        }
    }
    Err(anyhow!("invalid PIN"))
}

/// New password from `--new-password` or a confirmed prompt; empty means none.
pub fn request_new_password(new_password: Option<&str>) -> Result<Option<String>> {
    let pass = match new_password {
        Some(pass) => pass.to_owned(),
        None => {
            let pass = read_secret("Enter new password: ")?;
            let confirm = read_secret("Confirm new password: ")?;
            if pass != confirm {
                Err(anyhow!("passwords do not match"))?;
            }
            pass
        }
    };

    if pass.len() > MAX_PASS {
        Err(anyhow!("new password is too long"))?;
    }
    Ok(Some(pass).filter(|p| !p.is_empty()))
}

/// Time to compute the tokencode for, honouring `--next` and `--use-time`.
pub fn adjusted_time(args: &TokenArgs, interval: u32) -> Result<i64> {
    let now = Utc::now().timestamp();
    if args.next {
        return Ok(now + i64::from(interval));
    }

    match args.use_time.as_deref() {
        None => Ok(now),
        Some(value) => parse_use_time(value, now).ok_or(anyhow!("invalid --use-time argument")),
    }
}

fn parse_use_time(value: &str, now: i64) -> Option<i64> {
    if let Some(offset) = value.strip_prefix('+') {
        now.checked_add(offset.parse().ok()?)
    } else if let Some(offset) = value.strip_prefix('-') {
        now.checked_sub(offset.parse().ok()?)
    } else {
        value.parse().ok()
    }
}

/// Writes a token string and PIN to the rcfile, encrypting the PIN when a
/// password protects the token.
pub fn save_token(rcfile: Option<&Path>, token: String, pin: Option<&str>, password: Option<&str>) -> Result<()> {
    let pin = match (pin, password) {
        (Some(pin), Some(pass)) => Some(encrypt_pin(&Pin::parse(pin)?, pass)?),
        (Some(pin), None) => Some(pin.to_owned()),
        (None, _) => None,
    };

    TokenConfig::new(token, pin)
        .write(rcfile)
        .map_err(|err| anyhow!("rcfile: error writing new token: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_time_forms() {
        assert_eq!(parse_use_time("+30", 1000), Some(1030));
        assert_eq!(parse_use_time("-30", 1000), Some(970));
        assert_eq!(parse_use_time("1700000000", 1000), Some(1_700_000_000));
        assert_eq!(parse_use_time("soon", 1000), None);
        assert_eq!(parse_use_time("+", 1000), None);
    }

    #[test]
    fn saved_pin_is_encrypted_with_the_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stokenrc");

        save_token(Some(&path), "token".into(), Some("1234"), Some("pw")).unwrap();
        let config = TokenConfig::read(Some(&path)).unwrap();
        let enc = config.pin.unwrap();
        assert_eq!(enc.len(), 64);
        assert_eq!(stoken::pin::decrypt_pin(&enc, "pw").unwrap().as_str(), "1234");

        save_token(Some(&path), "token".into(), Some("1234"), None).unwrap();
        let config = TokenConfig::read(Some(&path)).unwrap();
        assert_eq!(config.pin.as_deref(), Some("1234"));
    }
}
