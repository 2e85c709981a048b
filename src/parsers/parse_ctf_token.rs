use tracing::debug;
use zeroize::Zeroizing;

use crate::constants::{
    AES_BLOCK_SIZE, BINENC_BITS, BINENC_OFS, CHECKSUM_BITS, CHECKSUM_CHARS, DEVID_CHARS,
    MAGIC_LEN, MAX_PASS, MAX_TOKEN_BITS, MAX_TOKEN_CHARS, MIN_TOKEN_CHARS, SERIAL_CHARS,
    TOKEN_BITS_PER_CHAR, VER_CHARS,
};
use crate::crypto::{aes128_ecb_decrypt, ct_eq, securid_mac, securid_shortmac};
use crate::error::{Result, TokenError};
use crate::types::{Seed, Token, TokenFlags, TokenRecord};

const KEY_MAGIC: [u8; MAGIC_LEN] = [0xd8, 0xf5, 0x32, 0x53, 0x82, 0x89];

/// Scratch space for the packed binary part of a CTF string.
pub(crate) type CtfBits = [u8; MAX_TOKEN_BITS / 8 + 2];

/// Unpacks 3 bits per decimal digit, most significant first.
pub(crate) fn numinput_to_bits(input: &[u8], out: &mut [u8], n_bits: usize) {
    out.fill(0);

    let mut bitpos: i32 = 13;
    let mut o = 0;
    for &c in input.iter().take(n_bits / TOKEN_BITS_PER_CHAR) {
        let decoded = (u16::from(c.wrapping_sub(b'0')) & 0x07) << bitpos;
        out[o] |= (decoded >> 8) as u8;
        out[o + 1] |= (decoded & 0xff) as u8;

        bitpos -= TOKEN_BITS_PER_CHAR as i32;
        if bitpos < 0 {
            bitpos += 8;
            o += 1;
        }
    }
}

pub(crate) fn bits_to_numoutput(input: &[u8], out: &mut String, n_bits: usize) {
    let mut bitpos: i32 = 13;
    let mut i = 0;
    for _ in 0..n_bits / TOKEN_BITS_PER_CHAR {
        let binary = (u16::from(input[i]) << 8) | u16::from(input[i + 1]);
        out.push(char::from(((binary >> bitpos) & 0x07) as u8 + b'0'));

        bitpos -= TOKEN_BITS_PER_CHAR as i32;
        if bitpos < 0 {
            bitpos += 8;
            i += 1;
        }
    }
}

pub(crate) fn get_bits(input: &[u8], start: usize, n_bits: usize) -> u32 {
    let mut out = 0u32;
    let mut idx = start / 8;
    let mut bit = start % 8;

    for _ in 0..n_bits {
        out <<= 1;
        if (input[idx] << bit) & 0x80 != 0 {
            out |= 1;
        }
        bit += 1;
        if bit == 8 {
            bit = 0;
            idx += 1;
        }
    }
    out
}

pub(crate) fn set_bits(out: &mut [u8], start: usize, n_bits: usize, val: u32) {
    let mut idx = start / 8;
    let mut bit = start % 8;
    let mut val = val << (32 - n_bits);

    for _ in 0..n_bits {
        if val & (1 << 31) != 0 {
            out[idx] |= 1 << (7 - bit);
        } else {
            out[idx] &= !(1 << (7 - bit));
        }
        val <<= 1;
        bit += 1;
        if bit == 8 {
            bit = 0;
            idx += 1;
        }
    }
}

/// Returns the seed encryption key and the 15-bit device ID hash.
///
/// Only the first 32 device ID characters count (40 for smartphone
/// records). v1 records drop digits from the device ID, later versions
/// drop anything that isn't hex.
pub(crate) fn generate_key_hash(
    token: &Token,
    pass: Option<&str>,
    devid: Option<&str>,
) -> Result<(Zeroizing<[u8; AES_BLOCK_SIZE]>, u16)> {
    let devid_len = if token.is_smartphone { DEVID_CHARS } else { 32 };
    let mut key = Zeroizing::new(Vec::with_capacity(MAX_PASS + DEVID_CHARS + MAGIC_LEN));

    if let Some(pass) = pass {
        if pass.len() > MAX_PASS {
            return Err(TokenError::BadPassword);
        }
        key.extend_from_slice(pass.as_bytes());
    }

    let mut devid_buf = [0u8; DEVID_CHARS];
    let mut devid_used = 0;
    if let Some(devid) = devid {
        for c in devid.bytes().take(devid_len) {
            if (token.version == 1 && c.is_ascii_digit())
                || (token.version >= 2 && !c.is_ascii_hexdigit())
            {
                continue;
            }
            devid_buf[devid_used] = c.to_ascii_uppercase();
            devid_used += 1;
        }
    }
    let device_id_hash = securid_shortmac(&devid_buf[..devid_len]);

    key.extend_from_slice(&devid_buf[..devid_used]);
    key.extend_from_slice(&KEY_MAGIC);

    Ok((Zeroizing::new(securid_mac(&key)), device_id_hash))
}

pub(crate) fn decode_ctf_token(input: &str) -> Result<Token> {
    let input = input.as_bytes();
    let len = input.len();

    if !(MIN_TOKEN_CHARS..=MAX_TOKEN_CHARS).contains(&len) {
        return Err(TokenError::BadLength);
    }
    if !input.iter().all(u8::is_ascii_digit) {
        return Err(TokenError::UnrecognizedFormat);
    }

    // the last 5 digits checksum the rest of the string
    let mut d: CtfBits = [0; MAX_TOKEN_BITS / 8 + 2];
    numinput_to_bits(&input[len - CHECKSUM_CHARS..], &mut d, CHECKSUM_BITS);
    let token_mac = get_bits(&d, 0, CHECKSUM_BITS) as u16;
    let computed_mac = securid_shortmac(&input[..len - CHECKSUM_CHARS]);
    if token_mac != computed_mac {
        debug!("CTF checksum mismatch");
        return Err(TokenError::ChecksumFailed);
    }

    let serial = String::from_utf8_lossy(&input[VER_CHARS..VER_CHARS + SERIAL_CHARS]).into_owned();

    numinput_to_bits(&input[BINENC_OFS..], &mut d, BINENC_BITS);
    let mut enc_seed = [0u8; AES_BLOCK_SIZE];
    enc_seed.copy_from_slice(&d[..AES_BLOCK_SIZE]);

    Ok(Token {
        version: input[0] - b'0',
        serial,
        flags: TokenFlags(get_bits(&d, 128, 16) as u16),
        exp_date: get_bits(&d, 144, 14) as u16,
        is_smartphone: false,
        enc_seed: Some(enc_seed),
        dec_seed_hash: get_bits(&d, 159, 15) as u16,
        device_id_hash: get_bits(&d, 174, 15) as u16,
        seed: None,
        pin: None,
        enc_pin: None,
        record: TokenRecord::Ctf,
    })
}

pub(crate) fn decrypt_ctf_seed(
    token: &mut Token,
    pass: Option<&str>,
    devid: Option<&str>,
) -> Result<()> {
    let enc_seed = token.enc_seed.ok_or(TokenError::SeedNotLoaded)?;
    let (key_hash, device_id_hash) = generate_key_hash(token, pass, devid)?;

    if token.flags.contains(TokenFlags::DEVID_PROTECTED)
        && !ct_eq(&device_id_hash.to_be_bytes(), &token.device_id_hash.to_be_bytes())
    {
        return Err(TokenError::BadDeviceId);
    }

    let seed = Seed::from_bytes(aes128_ecb_decrypt(&key_hash, &enc_seed));
    if !ct_eq(&seed.short_hash().to_be_bytes(), &token.dec_seed_hash.to_be_bytes()) {
        return Err(TokenError::DecryptFailed);
    }

    token.seed = Some(seed);
    Ok(())
}

pub(crate) fn ctf_devid_matches(token: &Token, devid: &str) -> bool {
    if !token.flags.contains(TokenFlags::DEVID_PROTECTED) {
        return true;
    }
    if devid.is_empty() {
        return false;
    }
    match generate_key_hash(token, None, Some(devid)) {
        Ok((_, hash)) => hash == token.device_id_hash,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_helpers_agree() {
        let mut d: CtfBits = [0; MAX_TOKEN_BITS / 8 + 2];
        set_bits(&mut d, 3, 15, 0x5a5a);
        set_bits(&mut d, 128, 16, 0xbeef);
        assert_eq!(get_bits(&d, 3, 15), 0x5a5a & 0x7fff);
        assert_eq!(get_bits(&d, 128, 16), 0xbeef);
        assert_eq!(get_bits(&d, 0, 3), 0);
    }

    #[test]
    fn digits_carry_three_bits_each() {
        let mut d = [0u8; 4];
        numinput_to_bits(b"76543", &mut d, 15);
        assert_eq!(get_bits(&d, 0, 15), 0b111_110_101_100_011);

        let mut out = String::new();
        bits_to_numoutput(&d, &mut out, 15);
        assert_eq!(out, "76543");
    }

    #[test]
    fn digits_above_seven_fold_into_three_bits() {
        let mut d = [0u8; 4];
        numinput_to_bits(b"89", &mut d, 6);
        assert_eq!(get_bits(&d, 0, 6), 0b000_001);
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(matches!(decode_ctf_token("2123"), Err(TokenError::BadLength)));
        let long = "2".repeat(MAX_TOKEN_CHARS + 1);
        assert!(matches!(decode_ctf_token(&long), Err(TokenError::BadLength)));
    }

    #[test]
    fn device_id_filtering() {
        let mut token = decode_sample();
        token.version = 2;
        let (_, upper) = generate_key_hash(&token, None, Some("ABCDEF0123")).unwrap();
        let (_, mixed) = generate_key_hash(&token, None, Some("ab-cd-ef-01-23")).unwrap();
        assert_eq!(upper, mixed);

        token.version = 1;
        let (_, no_digits) = generate_key_hash(&token, None, Some("ABCDEF")).unwrap();
        let (_, with_digits) = generate_key_hash(&token, None, Some("A1B2C3D4E5F6")).unwrap();
        assert_eq!(no_digits, with_digits);
    }

    #[test]
    fn long_passwords_are_refused() {
        let token = decode_sample();
        let pass = "x".repeat(MAX_PASS + 1);
        assert!(matches!(
            generate_key_hash(&token, Some(&pass), None),
            Err(TokenError::BadPassword)
        ));
    }

    fn decode_sample() -> Token {
        let seed = Seed::from_bytes([0x11; 16]);
        let token = Token::from_seed("000123456789", seed, TokenFlags::default(), 1000).unwrap();
        let encoded = token.encode(None, None, 2, false).unwrap();
        decode_ctf_token(&encoded).unwrap()
    }
}
