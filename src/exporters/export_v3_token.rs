use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::Zeroizing;

use crate::constants::{AES_KEY_SIZE, SHA256_HASH_SIZE, V3_NONCE_BYTES};
use crate::crypto::{aes256_cbc_encrypt, copy_truncated, random_bytes};
use crate::error::Result;
use crate::parsers::{
    scrub_devid, v3_compute_hash, v3_derive_key, v3_encode_date, v3_payload, v3_record, V3Key,
    V3Record, V3_ADDPIN_OFF, V3_ADDPIN_ON, V3_PAYLOAD_BYTES,
};
use crate::types::{Seed, Token, TokenFlags};

/// Encodes a URL-safe v3 token string under a fresh random nonce.
pub(crate) fn encode_v3_token(
    token: &Token,
    seed: &Seed,
    pass: Option<&str>,
    devid: Option<&str>,
) -> Result<String> {
    let mut plain = Zeroizing::new([0u8; V3_PAYLOAD_BYTES]);
    copy_truncated(&mut plain[v3_payload::SERIAL..v3_payload::SEED], token.serial.as_bytes());
    plain[v3_payload::SEED..v3_payload::SEED + AES_KEY_SIZE].copy_from_slice(seed.as_bytes());
    plain[v3_payload::UNK0] = 1;
    plain[v3_payload::UNK0 + 1] = 1;
    plain[v3_payload::MODE] = u8::from(token.flags.contains(TokenFlags::FEATURE_4));
    plain[v3_payload::DIGITS] = token.flags.digits() as u8;
    plain[v3_payload::ADDPIN] = if token.flags.pin_mode() & 0x2 != 0 {
        V3_ADDPIN_ON
    } else {
        V3_ADDPIN_OFF
    };
    plain[v3_payload::INTERVAL] = token.flags.interval() as u8;
    plain[v3_payload::EXP_DATE..v3_payload::EXP_DATE + 5]
        .copy_from_slice(&v3_encode_date(token.exp_date));
    plain[v3_payload::PADDING..].fill(0x10);

    let nonce: [u8; V3_NONCE_BYTES] = random_bytes()?;
    let mut v3 = V3Record::zeroed();
    v3.bytes[v3_record::VERSION] = 3;
    v3.bytes[v3_record::PASSWORD_LOCKED] = u8::from(pass.is_some());
    v3.bytes[v3_record::DEVID_LOCKED] = u8::from(devid.is_some());
    v3.bytes[v3_record::NONCE..v3_record::NONCE + V3_NONCE_BYTES].copy_from_slice(&nonce);

    let devid = scrub_devid(devid);
    let key = v3_derive_key(pass, &devid, &nonce, V3Key::Payload);
    aes256_cbc_encrypt(&key, &nonce, &mut plain[..])?;
    v3.bytes[v3_record::ENC_PAYLOAD..v3_record::ENC_PAYLOAD + V3_PAYLOAD_BYTES]
        .copy_from_slice(&plain[..]);

    let devid_hash = v3_compute_hash(None, &devid, &nonce);
    v3.bytes[v3_record::NONCE_DEVID_HASH..v3_record::NONCE_DEVID_HASH + SHA256_HASH_SIZE]
        .copy_from_slice(&devid_hash);
    let pass_hash = v3_compute_hash(pass, &devid, &nonce);
    v3.bytes[v3_record::NONCE_DEVID_PASS_HASH..v3_record::NONCE_DEVID_PASS_HASH + SHA256_HASH_SIZE]
        .copy_from_slice(&pass_hash);
    let mac = v3.compute_hmac(pass, &devid)?;
    v3.bytes[v3_record::MAC..].copy_from_slice(&mac);

    let raw = STANDARD.encode(v3.bytes);
    Ok(urlencoding::encode(&raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{decode_v3_token, decrypt_v3_seed};
    use crate::TokenError;

    fn sample_token() -> (Token, Seed) {
        let seed = Seed::from_bytes([0x3c; 16]);
        let mut flags = TokenFlags::TIME_DERIVED | TokenFlags::KEY_128BIT;
        flags.set_digits(8);
        flags.set_pin_mode(2);
        flags.set_interval(60);
        let token = Token::from_seed("000111222333", seed.clone(), flags, 9000).unwrap();
        (token, seed)
    }

    #[test]
    fn output_is_url_safe() {
        let (token, seed) = sample_token();
        let out = encode_v3_token(&token, &seed, Some("pw"), None).unwrap();
        assert!(out.starts_with('A'));
        assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '%'));
    }

    #[test]
    fn unbound_token_accepts_any_devid() {
        let (token, seed) = sample_token();
        let out = encode_v3_token(&token, &seed, None, None).unwrap();
        let decoded = decode_v3_token(&out).unwrap();

        assert!(!decoded.devid_required());
        assert!(decoded.check_devid("ABC"));
        assert!(decoded.check_devid(""));
    }

    #[test]
    fn bound_token_checks_devid() {
        let (token, seed) = sample_token();
        let out = encode_v3_token(&token, &seed, None, Some("ab:cd:ef")).unwrap();
        let decoded = decode_v3_token(&out).unwrap();

        assert!(decoded.check_devid("ABCDEF"));
        assert!(!decoded.check_devid("ABC"));
    }

    #[test]
    fn decrypts_with_matching_credentials() {
        let (token, seed) = sample_token();
        let out = encode_v3_token(&token, &seed, Some("pw"), Some("ab:cd:ef")).unwrap();

        let mut decoded = decode_v3_token(&out).unwrap();
        assert!(decoded.pass_required());
        assert!(decoded.devid_required());

        assert!(matches!(
            decrypt_v3_seed(&mut decoded.clone(), Some("pw"), Some("other")),
            Err(TokenError::BadDeviceId)
        ));
        assert!(matches!(
            decrypt_v3_seed(&mut decoded.clone(), Some("nope"), Some("ABCDEF")),
            Err(TokenError::DecryptFailed)
        ));

        decrypt_v3_seed(&mut decoded, Some("pw"), Some("ABCDEF")).unwrap();
        assert_eq!(decoded.serial, "000111222333");
        assert_eq!(decoded.exp_date, 9000);
        assert_eq!(decoded.flags.digits(), 8);
        assert_eq!(decoded.flags.pin_mode(), 2);
        assert_eq!(decoded.flags.interval(), 60);
        assert_eq!(decoded.seed.as_ref(), Some(&seed));
    }

    #[test]
    fn tampered_record_fails_mac() {
        let (token, seed) = sample_token();
        let out = encode_v3_token(&token, &seed, None, None).unwrap();
        let raw = STANDARD
            .decode(urlencoding::decode(&out).unwrap().as_bytes())
            .unwrap();
        let mut raw: [u8; 0x123] = raw.try_into().unwrap();
        raw[v3_record::ENC_PAYLOAD] ^= 1;
        let tampered = urlencoding::encode(&STANDARD.encode(raw)).into_owned();

        let mut decoded = decode_v3_token(&tampered).unwrap();
        assert!(matches!(
            decrypt_v3_seed(&mut decoded, None, None),
            Err(TokenError::ChecksumFailed)
        ));
    }
}
