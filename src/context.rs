use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, TokenError};
use crate::parsers::parse_token_file;
use crate::pin::{decrypt_pin, pin_format_ok, Pin};
use crate::types::{PinRange, Seed, Token, TokenConfig, TokenInfo};

/// Owns at most one imported token and its decrypted seed.
///
/// Every fallible operation either succeeds completely or leaves the
/// context as it was.
#[derive(Debug, Default)]
pub struct TokenContext {
    token: Option<Token>,
}

impl TokenContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    fn loaded(&self) -> Result<&Token> {
        self.token.as_ref().ok_or(TokenError::NoToken)
    }

    /// Replaces the current token with one built elsewhere.
    pub fn set_token(&mut self, token: Token) {
        self.token = Some(token);
    }

    /// Loads the token and saved PIN from the rc file, `~/.stokenrc` by default.
    pub fn import_rcfile(&mut self, path: Option<&Path>) -> Result<()> {
        let config = TokenConfig::read(path)?;
        let mut token = Token::decode(&config.token)?;

        if let Some(pin) = config.pin {
            if token.pass_required() {
                token.set_enc_pin(Some(pin));
            } else {
                match Pin::parse(&pin) {
                    Ok(pin) => token.set_pin(Some(pin)),
                    // the token stays usable; setpin can replace the PIN
                    Err(err) => warn!(%err, "rcfile: ignoring invalid PIN"),
                }
            }
        }

        debug!(serial = %token.serial, "imported token from rcfile");
        self.token = Some(token);
        Ok(())
    }

    pub fn import_file(&mut self, path: &Path) -> Result<()> {
        let token = parse_token_file(path)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn import_string(&mut self, token_string: &str) -> Result<()> {
        let token = Token::decode(token_string)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn info(&self) -> Option<TokenInfo> {
        self.token.as_ref().map(Token::info)
    }

    pub fn info_lines(&self) -> Vec<(&'static str, String)> {
        self.token.as_ref().map(Token::details).unwrap_or_default()
    }

    pub fn pin_range(&self) -> PinRange {
        PinRange::default()
    }

    /// True when a PIN must still be supplied; a PIN saved in the rc file counts.
    pub fn pin_required(&self) -> bool {
        self.token.as_ref().is_some_and(|t| {
            t.pin().is_none() && t.enc_pin().is_none() && t.pin_required()
        })
    }

    pub fn pass_required(&self) -> bool {
        self.token.as_ref().is_some_and(Token::pass_required)
    }

    pub fn devid_required(&self) -> bool {
        self.token.as_ref().is_some_and(Token::devid_required)
    }

    pub fn check_pin(&self, pin: &str) -> bool {
        let range = self.pin_range();
        (range.min..=range.max).contains(&pin.len()) && pin_format_ok(pin).is_ok()
    }

    pub fn check_devid(&self, devid: &str) -> bool {
        self.token.as_ref().is_some_and(|t| t.check_devid(devid))
    }

    /// Decrypts the seed, and the saved PIN if there is one.
    pub fn decrypt_seed(&mut self, pass: Option<&str>, devid: Option<&str>) -> Result<()> {
        let mut staged = self.loaded()?.clone();
        staged.decrypt_seed(pass, devid)?;

        if let Some(enc_pin) = staged.enc_pin() {
            let pin = decrypt_pin(enc_pin, pass.unwrap_or_default())?;
            staged.set_pin(Some(pin));
        }

        self.token = Some(staged);
        Ok(())
    }

    /// Version 2 token string holding the loaded seed under new credentials.
    pub fn encrypt_seed(&self, pass: Option<&str>, devid: Option<&str>) -> Result<String> {
        self.loaded()?.encode(pass, devid, 2, false)
    }

    pub fn compute_tokencode(&self, when: i64, pin: Option<&str>) -> Result<String> {
        self.loaded()?.compute_tokencode(when, pin)
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.token.as_ref().and_then(Token::seed)
    }
}
