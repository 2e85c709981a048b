use crate::constants::{
    AES_KEY_SIZE, BINENC_BITS, CHECKSUM_BITS, CHECKSUM_OFS, MAX_TOKEN_BITS, MAX_TOKEN_CHARS,
};
use crate::crypto::{aes128_ecb_encrypt, securid_shortmac};
use crate::error::Result;
use crate::parsers::{bits_to_numoutput, generate_key_hash, set_bits, CtfBits};
use crate::types::{Seed, Token};

/// Encodes a version 2 numeric token string.
pub(crate) fn encode_ctf_token(
    token: &Token,
    seed: &Seed,
    pass: Option<&str>,
    devid: Option<&str>,
) -> Result<String> {
    let (key_hash, device_id_hash) = generate_key_hash(token, pass, devid)?;

    let mut d: CtfBits = [0; MAX_TOKEN_BITS / 8 + 2];
    let enc_seed = aes128_ecb_encrypt(&key_hash, seed.as_bytes());
    d[..AES_KEY_SIZE].copy_from_slice(&enc_seed);

    set_bits(&mut d, 128, 16, u32::from(token.flags.bits()));
    set_bits(&mut d, 144, 14, u32::from(token.exp_date));
    set_bits(&mut d, 159, 15, u32::from(seed.short_hash()));
    set_bits(&mut d, 174, 15, u32::from(device_id_hash));

    let mut out = String::with_capacity(MAX_TOKEN_CHARS);
    out.push('2');
    out.push_str(&token.serial);
    bits_to_numoutput(&d, &mut out, BINENC_BITS);
    debug_assert_eq!(out.len(), CHECKSUM_OFS);

    set_bits(&mut d, 0, 15, u32::from(securid_shortmac(out.as_bytes())));
    bits_to_numoutput(&d, &mut out, CHECKSUM_BITS);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MIN_TOKEN_CHARS;
    use crate::parsers::decode_ctf_token;
    use crate::types::TokenFlags;

    #[test]
    fn fields_survive_decoding() {
        let mut flags = TokenFlags::TIME_DERIVED | TokenFlags::KEY_128BIT;
        flags.set_digits(6);
        flags.set_interval(30);
        let seed = Seed::from_bytes(*b"fedcba9876543210");
        let token = Token::from_seed("555000111222", seed.clone(), flags, 7777).unwrap();

        let out = encode_ctf_token(&token, &seed, None, None).unwrap();
        assert_eq!(out.len(), MIN_TOKEN_CHARS);
        assert!(out.starts_with("2555000111222"));

        let decoded = decode_ctf_token(&out).unwrap();
        assert_eq!(decoded.version, 2);
        assert_eq!(decoded.flags, flags);
        assert_eq!(decoded.exp_date, 7777);
        assert_eq!(decoded.dec_seed_hash, seed.short_hash());
    }
}
