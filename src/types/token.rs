use chrono::{DateTime, Utc};
use tracing::debug;

use crate::constants::{
    AES_KEY_SIZE, MAX_PASS, MAX_TIME_T, SECURID_EPOCH, SECURID_MAX_DATE, SERIAL_CHARS,
};
use crate::crypto::{aes128_ecb_encrypt, random_bytes};
use crate::error::{Result, TokenError};
use crate::exporters::{encode_ctf_token, encode_sdtid_token, encode_v3_token, issue_sdtid_token};
use crate::parsers::{
    ctf_devid_matches, decrypt_ctf_seed, decrypt_sdtid_seed, decrypt_v3_seed, generate_key_hash,
    parse_token_string, v3_devid_matches, SdtidRecord, V3Record,
};
use crate::pin::Pin;
use crate::tokencode;

use super::{Seed, TokenFlags, TokenInfo};

const DAY_SECS: i64 = 24 * 60 * 60;

/// Format-specific data kept around for seed decryption.
#[derive(Clone, Debug)]
pub(crate) enum TokenRecord {
    Ctf,
    V3(Box<V3Record>),
    Sdtid(Box<SdtidRecord>),
}

/// One software token, decoded from any supported record format.
#[derive(Clone, Debug)]
pub struct Token {
    pub version: u8,
    pub serial: String,
    pub flags: TokenFlags,
    /// Days since 2000/01/01.
    pub exp_date: u16,
    pub is_smartphone: bool,
    pub(crate) enc_seed: Option<[u8; AES_KEY_SIZE]>,
    pub(crate) dec_seed_hash: u16,
    pub(crate) device_id_hash: u16,
    pub(crate) seed: Option<Seed>,
    pub(crate) pin: Option<Pin>,
    pub(crate) enc_pin: Option<String>,
    pub(crate) record: TokenRecord,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn today() -> i64 {
    (Utc::now().timestamp() - SECURID_EPOCH) / DAY_SECS
}

impl Token {
    pub fn decode(input: &str) -> Result<Token> {
        parse_token_string(input)
    }

    /// Builds a v2 token around an already known seed.
    pub fn from_seed(serial: &str, seed: Seed, flags: TokenFlags, exp_date: u16) -> Result<Token> {
        if serial.len() != SERIAL_CHARS || !serial.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenError::BadLength);
        }

        let mut token = Token {
            version: 2,
            serial: serial.to_owned(),
            flags,
            exp_date,
            is_smartphone: false,
            enc_seed: None,
            dec_seed_hash: seed.short_hash(),
            device_id_hash: 0,
            seed: None,
            pin: None,
            enc_pin: None,
            record: TokenRecord::Ctf,
        };
        let (key_hash, device_id_hash) = generate_key_hash(&token, None, None)?;
        token.enc_seed = Some(aes128_ecb_encrypt(&key_hash, seed.as_bytes()));
        token.device_id_hash = device_id_hash;
        token.seed = Some(seed);
        Ok(token)
    }

    /// Fresh unprotected token: random seed and serial, 8 digits, 60 second
    /// interval, PIN mode 3, expiring two months or more from today.
    pub fn random() -> Result<Token> {
        let seed = Seed::random()?;
        let rand: [u8; 16] = random_bytes()?;

        let serial: String = rand[..SERIAL_CHARS]
            .iter()
            .map(|b| char::from(b'0' + b % 10))
            .collect();

        let mut flags = TokenFlags::TIME_DERIVED | TokenFlags::KEY_128BIT;
        flags.set_digits(8);
        flags.set_pin_mode(3);
        flags.set_interval(60);

        let exp_date = today() + 60 + i64::from(rand[12] & 0x0f) * 30;
        let exp_date = u16::try_from(exp_date).unwrap_or(SECURID_MAX_DATE);
        Token::from_seed(&serial, seed, flags, exp_date)
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    pub fn has_seed(&self) -> bool {
        self.seed.is_some()
    }

    pub fn pin(&self) -> Option<&Pin> {
        self.pin.as_ref()
    }

    pub fn set_pin(&mut self, pin: Option<Pin>) {
        self.pin = pin;
    }

    pub fn enc_pin(&self) -> Option<&str> {
        self.enc_pin.as_deref()
    }

    pub fn set_enc_pin(&mut self, enc_pin: Option<String>) {
        self.enc_pin = enc_pin;
    }

    pub fn interval(&self) -> u32 {
        self.flags.interval()
    }

    pub fn pin_required(&self) -> bool {
        self.flags.pin_mode() >= 2
    }

    pub fn pass_required(&self) -> bool {
        self.flags.contains(TokenFlags::PASSWORD_PROTECTED)
    }

    pub fn devid_required(&self) -> bool {
        self.flags.contains(TokenFlags::DEVID_PROTECTED)
    }

    /// Unix time the token expires.
    pub fn unix_exp_date(&self) -> i64 {
        // v3 expiration dates are encrypted, so skip expiry checks until then
        if self.version == 3 && self.exp_date == 0 {
            return MAX_TIME_T;
        }
        if self.exp_date > SECURID_MAX_DATE {
            return MAX_TIME_T;
        }
        SECURID_EPOCH + (i64::from(self.exp_date) + 1) * DAY_SECS
    }

    /// Whole days of validity left at `now`, allowing 12 hours of grace.
    pub fn days_until_expiry(&self, now: i64) -> i64 {
        (self.unix_exp_date() + DAY_SECS / 2 - now) / DAY_SECS
    }

    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            serial: self.serial.clone(),
            exp_date: self.unix_exp_date(),
            interval: self.interval(),
            token_version: self.version,
            uses_pin: self.pin_required(),
        }
    }

    /// Recovers the seed. On failure the token is left exactly as it was.
    pub fn decrypt_seed(&mut self, pass: Option<&str>, devid: Option<&str>) -> Result<()> {
        let pass = if self.pass_required() {
            let pass = non_empty(pass).ok_or(TokenError::MissingPassword)?;
            if pass.len() > MAX_PASS {
                return Err(TokenError::BadPassword);
            }
            Some(pass)
        } else {
            None
        };
        let devid = if self.devid_required() {
            Some(non_empty(devid).ok_or(TokenError::MissingDeviceId)?)
        } else {
            None
        };

        let mut staged = self.clone();
        staged.seed = None;
        let result = match staged.record {
            TokenRecord::Ctf => decrypt_ctf_seed(&mut staged, pass, devid),
            TokenRecord::V3(_) => decrypt_v3_seed(&mut staged, pass, devid),
            TokenRecord::Sdtid(_) => decrypt_sdtid_seed(&mut staged, pass, devid),
        };
        if let Err(err) = result {
            debug!(%err, "seed decryption failed");
            return Err(err);
        }

        *self = staged;
        Ok(())
    }

    /// Checks a device ID against the record without touching any state.
    pub fn check_devid(&self, devid: &str) -> bool {
        match self.record {
            TokenRecord::Ctf => ctf_devid_matches(self, devid),
            TokenRecord::V3(_) => v3_devid_matches(self, devid),
            // sdtid seeds are never bound to a device
            TokenRecord::Sdtid(_) => true,
        }
    }

    /// Re-encodes the decrypted seed as a version 2 or version 3 string.
    ///
    /// An empty password or device ID means "not protected by it".
    pub fn encode(
        &self,
        pass: Option<&str>,
        devid: Option<&str>,
        version: u8,
        smartphone: bool,
    ) -> Result<String> {
        let seed = self.seed.as_ref().ok_or(TokenError::SeedNotLoaded)?;
        let pass = non_empty(pass);
        let devid = non_empty(devid);

        let mut staged = self.clone();
        staged.version = 2;
        staged.is_smartphone = smartphone;
        staged.flags.set(TokenFlags::PASSWORD_PROTECTED, pass.is_some());
        staged.flags.set(TokenFlags::DEVID_PROTECTED, devid.is_some());

        match version {
            3 => encode_v3_token(&staged, seed, pass, devid),
            _ => encode_ctf_token(&staged, seed, pass, devid),
        }
    }

    /// Writes the token as an sdtid XML file, taking any values `template`
    /// (a skeleton sdtid document) provides over the token's own.
    pub fn encode_sdtid(
        &self,
        template: Option<&str>,
        pass: Option<&str>,
        devid: Option<&str>,
    ) -> Result<String> {
        let seed = self.seed.as_ref().ok_or(TokenError::SeedNotLoaded)?;
        encode_sdtid_token(self, seed, template, non_empty(pass), non_empty(devid))
    }

    /// Generates a brand new sdtid file with a random seed.
    pub fn issue_sdtid(
        template: Option<&str>,
        pass: Option<&str>,
        devid: Option<&str>,
    ) -> Result<String> {
        issue_sdtid_token(template, non_empty(pass), non_empty(devid))
    }

    /// Computes the tokencode for `when`.
    ///
    /// PIN-mode 2/3 tokens use `pin` if given, otherwise the stored PIN.
    pub fn compute_tokencode(&self, when: i64, pin: Option<&str>) -> Result<String> {
        let seed = self.seed.as_ref().ok_or(TokenError::SeedNotLoaded)?;

        let pin = if self.pin_required() {
            match non_empty(pin) {
                Some(pin) => Some(Pin::parse(pin)?),
                None => Some(self.pin.clone().ok_or(TokenError::PinRequired)?),
            }
        } else {
            None
        };

        tokencode::compute_tokencode(self, seed, when, pin.as_ref())
    }

    /// Human-readable attribute list.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let yes_no = |flag| String::from(if self.flags.contains(flag) { "yes" } else { "no" });
        let hex = |bytes: &[u8]| {
            bytes
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut lines = vec![("Serial number", self.serial.clone())];
        if let Some(seed) = &self.seed {
            lines.push(("Decrypted seed", seed.to_hex()));
        }
        if let Some(enc_seed) = &self.enc_seed {
            lines.push(("Encrypted seed", hex(&enc_seed[..])));
            lines.push(("Encrypted w/password", yes_no(TokenFlags::PASSWORD_PROTECTED)));
            lines.push(("Encrypted w/devid", yes_no(TokenFlags::DEVID_PROTECTED)));
        }

        let exp = DateTime::<Utc>::from_timestamp(self.unix_exp_date(), 0)
            .map(|d| d.format("%Y/%m/%d").to_string())
            .unwrap_or_default();
        lines.push(("Expiration date", exp));
        let key_bits = if self.flags.contains(TokenFlags::KEY_128BIT) { "128" } else { "64" };
        lines.push(("Key length", key_bits.to_owned()));
        lines.push(("Tokencode digits", self.flags.digits().to_string()));
        lines.push(("PIN mode", self.flags.pin_mode().to_string()));
        let seconds = match self.flags.interval_code() {
            0 => "30",
            1 => "60",
            _ => "unknown",
        };
        lines.push(("Seconds per tokencode", seconds.to_owned()));
        lines.push(("App-derived", yes_no(TokenFlags::APP_DERIVED)));
        lines.push(("Feature bit 4", yes_no(TokenFlags::FEATURE_4)));
        lines.push(("Time-derived", yes_no(TokenFlags::TIME_DERIVED)));
        lines.push(("Feature bit 6", yes_no(TokenFlags::FEATURE_6)));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_tokens_are_usable() {
        let token = Token::random().unwrap();
        assert_eq!(token.serial.len(), SERIAL_CHARS);
        assert_eq!(token.flags.digits(), 8);
        assert_eq!(token.interval(), 60);
        assert!(token.pin_required());
        assert!(!token.pass_required());
        assert!(token.days_until_expiry(Utc::now().timestamp()) >= 59);
    }

    #[test]
    fn expiration_dates() {
        let mut token = Token::random().unwrap();
        token.exp_date = 0;
        assert_eq!(token.unix_exp_date(), SECURID_EPOCH + DAY_SECS);
        token.exp_date = SECURID_MAX_DATE + 1;
        assert_eq!(token.unix_exp_date(), MAX_TIME_T);

        token.exp_date = 10;
        let exp = token.unix_exp_date();
        assert_eq!(token.days_until_expiry(exp), 0);
        assert_eq!(token.days_until_expiry(exp - 3 * DAY_SECS), 3);
    }

    #[test]
    fn missing_credentials_are_reported_before_decrypting() {
        let seed = Seed::from_bytes([9; 16]);
        let token = Token::from_seed("123412341234", seed, TokenFlags::default(), 100).unwrap();
        let encoded = token.encode(Some("pw"), Some("abc123"), 2, false).unwrap();

        let mut imported = Token::decode(&encoded).unwrap();
        assert!(matches!(
            imported.decrypt_seed(None, Some("abc123")),
            Err(TokenError::MissingPassword)
        ));
        assert!(matches!(
            imported.decrypt_seed(Some("pw"), Some("")),
            Err(TokenError::MissingDeviceId)
        ));
        assert!(matches!(
            imported.decrypt_seed(Some("pw"), Some("def456")),
            Err(TokenError::BadDeviceId)
        ));
        assert!(!imported.has_seed());

        imported.decrypt_seed(Some("pw"), Some("abc123")).unwrap();
        assert_eq!(imported.seed().unwrap().as_bytes(), &[9; 16]);
    }

    #[test]
    fn devid_checks_do_not_decrypt() {
        let seed = Seed::from_bytes([1; 16]);
        let token = Token::from_seed("123412341234", seed, TokenFlags::default(), 100).unwrap();
        let encoded = token.encode(Some("pw"), Some("CAFE"), 2, false).unwrap();
        let imported = Token::decode(&encoded).unwrap();

        assert!(imported.check_devid("cafe"));
        assert!(!imported.check_devid("BEEF"));
        assert!(!imported.check_devid(""));
        assert!(!imported.has_seed());

        let unbound = Token::decode(&token.encode(None, None, 2, false).unwrap()).unwrap();
        assert!(unbound.check_devid("anything"));
    }

    #[test]
    fn pin_is_only_needed_in_pin_modes() {
        let mut token = Token::random().unwrap();
        assert!(matches!(
            token.compute_tokencode(0, None),
            Err(TokenError::PinRequired)
        ));
        assert!(token.compute_tokencode(0, Some("12")).is_err());
        let with_pin = token.compute_tokencode(0, Some("1234")).unwrap();

        token.set_pin(Some(Pin::parse("1234").unwrap()));
        assert_eq!(token.compute_tokencode(0, None).unwrap(), with_pin);

        token.flags.set_pin_mode(0);
        assert_ne!(token.compute_tokencode(0, Some("1234")).unwrap(), with_pin);
    }

    #[test]
    fn details_list() {
        let token = Token::random().unwrap();
        let details = token.details();
        let keys: Vec<_> = details.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys[0], "Serial number");
        assert!(keys.contains(&"Decrypted seed"));
        assert!(keys.contains(&"Encrypted w/password"));
        assert_eq!(keys.last(), Some(&"Feature bit 6"));
        let digits = details.iter().find(|(k, _)| *k == "Tokencode digits").unwrap();
        assert_eq!(digits.1, "8");
    }
}
