use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;
use zeroize::Zeroizing;

use crate::constants::{
    AES_KEY_SIZE, MAX_PASS, SECURID_EPOCH_DAYS, SECURID_MAX_DATE, SECURID_V3_DAY,
    SERIAL_CHARS, SHA256_HASH_SIZE, V3_BASE64_MAX_CHARS, V3_DEVID_CHARS, V3_NONCE_BYTES,
    V3_RECORD_BYTES,
};
use crate::crypto::{aes256_cbc_decrypt, ct_eq, hmac_sha256, pbkdf2_sha256, sha256};
use crate::error::{Result, TokenError};
use crate::types::{Seed, Token, TokenFlags, TokenRecord};

const KEY_SALT_MAC: [u8; 16] = [
    0xd0, 0x14, 0x43, 0x3c, 0x6d, 0x17, 0x9f, 0xeb, 0xda, 0x09, 0xab, 0xfc, 0x32, 0x49, 0x63, 0x4c,
];
const KEY_SALT_PAYLOAD: [u8; 16] = [
    0x3b, 0xaf, 0xff, 0x4d, 0x91, 0x8d, 0x89, 0xb6, 0x81, 0x60, 0xde, 0x44, 0x4e, 0x05, 0xc0, 0xdd,
];
const PBKDF2_ROUNDS: u32 = 1000;

pub(crate) const V3_PAYLOAD_BYTES: usize = 0xb0;
pub(crate) const V3_ADDPIN_OFF: u8 = 0x1f;
pub(crate) const V3_ADDPIN_ON: u8 = 0x21;

/// Byte offsets inside the 291-byte v3 record.
pub(crate) mod record {
    pub const VERSION: usize = 0;
    pub const PASSWORD_LOCKED: usize = 1;
    pub const DEVID_LOCKED: usize = 2;
    pub const NONCE_DEVID_HASH: usize = 3;
    pub const NONCE_DEVID_PASS_HASH: usize = 35;
    pub const NONCE: usize = 67;
    pub const ENC_PAYLOAD: usize = 83;
    pub const MAC: usize = 259;
}

/// Byte offsets inside the decrypted 176-byte payload.
pub(crate) mod payload {
    pub const SERIAL: usize = 0;
    pub const SEED: usize = 16;
    pub const UNK0: usize = 32;
    pub const MODE: usize = 34;
    pub const DIGITS: usize = 35;
    pub const ADDPIN: usize = 36;
    pub const INTERVAL: usize = 37;
    pub const EXP_DATE: usize = 48;
    pub const PADDING: usize = 160;
}

#[derive(Clone, Debug)]
pub(crate) struct V3Record {
    pub bytes: [u8; V3_RECORD_BYTES],
}

pub(crate) enum V3Key {
    Mac,
    Payload,
}

impl V3Record {
    pub fn zeroed() -> Self {
        V3Record {
            bytes: [0; V3_RECORD_BYTES],
        }
    }

    pub fn nonce(&self) -> [u8; V3_NONCE_BYTES] {
        let mut nonce = [0u8; V3_NONCE_BYTES];
        nonce.copy_from_slice(&self.bytes[record::NONCE..record::NONCE + V3_NONCE_BYTES]);
        nonce
    }

    pub fn field(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    pub fn compute_hmac(&self, pass: Option<&str>, devid: &str) -> Result<[u8; SHA256_HASH_SIZE]> {
        let key = derive_key(pass, devid, &self.nonce(), V3Key::Mac);
        hmac_sha256(&key[..], &self.bytes[..record::MAC])
    }
}

/// PBKDF2 over every second byte of `pass ‖ devid ‖ salt ‖ nonce`.
pub(crate) fn derive_key(
    pass: Option<&str>,
    devid: &str,
    nonce: &[u8; V3_NONCE_BYTES],
    which: V3Key,
) -> Zeroizing<[u8; SHA256_HASH_SIZE]> {
    let pass = pass.unwrap_or_default().as_bytes();
    let mut buf0 = Zeroizing::new(vec![0u8; pass.len() + V3_DEVID_CHARS + 16 + V3_NONCE_BYTES]);

    buf0[..pass.len()].copy_from_slice(pass);
    let devid = &devid.as_bytes()[..devid.len().min(V3_DEVID_CHARS)];
    let mut pos = pass.len();
    buf0[pos..pos + devid.len()].copy_from_slice(devid);
    pos += V3_DEVID_CHARS;
    let salt = match which {
        V3Key::Mac => &KEY_SALT_MAC,
        V3Key::Payload => &KEY_SALT_PAYLOAD,
    };
    buf0[pos..pos + 16].copy_from_slice(salt);
    pos += 16;
    buf0[pos..pos + V3_NONCE_BYTES].copy_from_slice(nonce);

    let buf1: Zeroizing<Vec<u8>> = Zeroizing::new(buf0.iter().skip(1).step_by(2).copied().collect());
    Zeroizing::new(pbkdf2_sha256(&buf1, nonce, PBKDF2_ROUNDS))
}

/// SHA-256 of the nonce, the zero padded device ID and the password.
pub(crate) fn compute_hash(
    pass: Option<&str>,
    devid: &str,
    nonce: &[u8; V3_NONCE_BYTES],
) -> [u8; SHA256_HASH_SIZE] {
    let pass = pass.unwrap_or_default().as_bytes();
    let pass = &pass[..pass.len().min(MAX_PASS)];
    let mut buf = Zeroizing::new(vec![0u8; V3_NONCE_BYTES + V3_DEVID_CHARS + pass.len()]);

    buf[..V3_NONCE_BYTES].copy_from_slice(nonce);
    let devid = &devid.as_bytes()[..devid.len().min(V3_DEVID_CHARS)];
    buf[V3_NONCE_BYTES..V3_NONCE_BYTES + devid.len()].copy_from_slice(devid);
    buf[V3_NONCE_BYTES + V3_DEVID_CHARS..].copy_from_slice(pass);
    sha256(&buf)
}

/// Keeps alphanumerics only, upper-cased, at most 48 of them.
pub(crate) fn scrub_devid(devid: Option<&str>) -> String {
    devid
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(V3_DEVID_CHARS)
        .collect()
}

fn url_decode(input: &str) -> Result<String> {
    let decoded = urlencoding::decode(input).map_err(|_| TokenError::BadLength)?;
    if decoded.len() > V3_BASE64_MAX_CHARS {
        return Err(TokenError::BadLength);
    }
    Ok(decoded.into_owned())
}

fn parse_date(raw: &[u8]) -> u16 {
    let ticks = raw.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    let days = (ticks / SECURID_V3_DAY) as i64 - SECURID_EPOCH_DAYS;
    match u16::try_from(days) {
        Ok(days) if days <= SECURID_MAX_DATE => days,
        _ => SECURID_MAX_DATE,
    }
}

pub(crate) fn encode_date(days: u16) -> [u8; 5] {
    let ticks = (u64::from(days) + SECURID_EPOCH_DAYS as u64) * SECURID_V3_DAY;
    let be = ticks.to_be_bytes();
    let mut out = [0u8; 5];
    out.copy_from_slice(&be[3..]);
    out
}

pub(crate) fn decode_v3_token(input: &str) -> Result<Token> {
    let decoded = url_decode(input)?;

    let raw = STANDARD
        .decode(decoded.as_bytes())
        .map_err(|_| TokenError::UnrecognizedFormat)?;
    if raw.len() != V3_RECORD_BYTES || raw[record::VERSION] != 0x03 {
        debug!(len = raw.len(), "not a v3 record");
        return Err(TokenError::UnrecognizedFormat);
    }

    let mut v3 = V3Record::zeroed();
    v3.bytes.copy_from_slice(&raw);

    // the remaining flags are only known after the payload is decrypted
    let mut flags = TokenFlags::default();
    flags.set(
        TokenFlags::PASSWORD_PROTECTED,
        v3.bytes[record::PASSWORD_LOCKED] != 0,
    );
    flags.set(TokenFlags::DEVID_PROTECTED, v3.bytes[record::DEVID_LOCKED] != 0);

    Ok(Token {
        version: 3,
        serial: String::new(),
        flags,
        exp_date: 0,
        is_smartphone: false,
        enc_seed: None,
        dec_seed_hash: 0,
        device_id_hash: 0,
        seed: None,
        pin: None,
        enc_pin: None,
        record: TokenRecord::V3(Box::new(v3)),
    })
}

pub(crate) fn decrypt_v3_seed(
    token: &mut Token,
    pass: Option<&str>,
    devid: Option<&str>,
) -> Result<()> {
    let TokenRecord::V3(v3) = &token.record else {
        return Err(TokenError::TokenVersion);
    };
    let devid = scrub_devid(devid);
    let nonce = v3.nonce();

    let hash = compute_hash(None, &devid, &nonce);
    if !ct_eq(&hash, v3.field(record::NONCE_DEVID_HASH, SHA256_HASH_SIZE)) {
        return Err(TokenError::BadDeviceId);
    }

    let hash = compute_hash(pass, &devid, &nonce);
    if !ct_eq(&hash, v3.field(record::NONCE_DEVID_PASS_HASH, SHA256_HASH_SIZE)) {
        return Err(TokenError::DecryptFailed);
    }

    let mac = v3.compute_hmac(pass, &devid)?;
    if !ct_eq(&mac, v3.field(record::MAC, SHA256_HASH_SIZE)) {
        return Err(TokenError::ChecksumFailed);
    }

    let key = derive_key(pass, &devid, &nonce, V3Key::Payload);
    let mut plain = Zeroizing::new([0u8; V3_PAYLOAD_BYTES]);
    plain.copy_from_slice(v3.field(record::ENC_PAYLOAD, V3_PAYLOAD_BYTES));
    aes256_cbc_decrypt(&key, &nonce, &mut plain[..])?;

    let serial_field = &plain[payload::SERIAL..payload::SERIAL + 16];
    let serial_len = serial_field.iter().position(|&b| b == 0).unwrap_or(16);
    if serial_len != SERIAL_CHARS {
        return Err(TokenError::DecryptFailed);
    }
    let serial = String::from_utf8_lossy(&serial_field[..SERIAL_CHARS]).into_owned();

    let mut seed = [0u8; AES_KEY_SIZE];
    seed.copy_from_slice(&plain[payload::SEED..payload::SEED + AES_KEY_SIZE]);
    let seed = Seed::from_bytes(seed);

    let mut flags = token.flags | TokenFlags::TIME_DERIVED | TokenFlags::KEY_128BIT;
    flags.set(TokenFlags::FEATURE_4, plain[payload::MODE] != 0);
    flags.set_digits(usize::from(plain[payload::DIGITS]));
    if plain[payload::ADDPIN] != V3_ADDPIN_OFF {
        flags.set_pin_mode(2);
    }
    flags.set_interval(u32::from(plain[payload::INTERVAL]));

    token.exp_date = parse_date(&plain[payload::EXP_DATE..payload::EXP_DATE + 5]);
    token.serial = serial;
    token.flags = flags;
    token.seed = Some(seed);
    Ok(())
}

pub(crate) fn v3_devid_matches(token: &Token, devid: &str) -> bool {
    let TokenRecord::V3(v3) = &token.record else {
        return false;
    };
    if !token.flags.contains(TokenFlags::DEVID_PROTECTED) {
        return true;
    }
    let hash = compute_hash(None, &scrub_devid(Some(devid)), &v3.nonce());
    ct_eq(&hash, v3.field(record::NONCE_DEVID_HASH, SHA256_HASH_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devid_scrubbing() {
        assert_eq!(scrub_devid(Some("ab-12:cd ef")), "AB12CDEF");
        assert_eq!(scrub_devid(None), "");
        assert_eq!(scrub_devid(Some(&"z".repeat(60))).len(), V3_DEVID_CHARS);
    }

    #[test]
    fn date_ticks() {
        let encoded = encode_date(5000);
        assert_eq!(parse_date(&encoded), 5000);
        assert_eq!(parse_date(&[0xff; 5]), SECURID_MAX_DATE);
        // before 2000 wraps around to the latest date
        assert_eq!(parse_date(&[0; 5]), SECURID_MAX_DATE);
    }

    #[test]
    fn url_decoding() {
        assert_eq!(url_decode("AB%2Bcd%2F%3D").unwrap(), "AB+cd/=");
        // escapes that don't decode to UTF-8 can't be base64
        assert!(matches!(url_decode("AB%FF%FE"), Err(TokenError::BadLength)));
        let long = "A".repeat(V3_BASE64_MAX_CHARS + 1);
        assert!(matches!(url_decode(&long), Err(TokenError::BadLength)));
        let escaped = "%41".repeat(V3_BASE64_MAX_CHARS);
        assert_eq!(url_decode(&escaped).unwrap().len(), V3_BASE64_MAX_CHARS);
    }

    #[test]
    fn keys_depend_on_every_input() {
        let nonce = [1u8; 16];
        let base = derive_key(Some("pw"), "DEV", &nonce, V3Key::Mac);
        assert_ne!(*base, *derive_key(Some("pw"), "DEV", &nonce, V3Key::Payload));
        assert_ne!(*base, *derive_key(Some("pw"), "DEV", &[2u8; 16], V3Key::Mac));
        assert_ne!(
            compute_hash(None, "DEV", &nonce),
            compute_hash(Some("pw"), "DEV", &nonce)
        );
    }

    #[test]
    fn rejects_wrong_record_version() {
        let mut raw = [0u8; V3_RECORD_BYTES];
        raw[0] = 0x02;
        let text = STANDARD.encode(raw);
        assert!(matches!(
            decode_v3_token(&text),
            Err(TokenError::UnrecognizedFormat)
        ));
    }
}
