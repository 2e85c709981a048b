use tracing::debug;

use super::{decode_ctf_token, decode_sdtid_token, decode_v3_token};
use crate::constants::{BUFLEN, V3_BASE64_MIN_CHARS};
use crate::error::{Result, TokenError};
use crate::types::Token;

const SMARTPHONE_PREFIXES: [&str; 3] = [
    "com.rsa.securid.iphone://ctf",
    "com.rsa.securid://ctf",
    "http://127.0.0.1/securid/ctf",
];

/// Decodes a bare token string: numeric CTF (v1/v2) or base64 v3.
pub fn decode_token(input: &str) -> Result<Token> {
    match input.as_bytes().first() {
        Some(b'1' | b'2') => decode_ctf_token(input),
        // v3 records begin with a 0x03 byte, which always encodes to 'A'
        Some(b'A') if input.len() >= V3_BASE64_MIN_CHARS => decode_v3_token(input),
        _ => Err(TokenError::TokenVersion),
    }
}

/// Finds and decodes a token in free-form text: a raw token string, a
/// smartphone import URL, or an sdtid XML document.
pub fn parse_token_string(input: &str) -> Result<Token> {
    // ASCII lowercasing keeps byte offsets intact
    let lower = input.to_ascii_lowercase();

    let start = if let Some(pos) = lower.find("ctfdata=3d") {
        // broken quoted-printable input
        pos + 10
    } else if let Some(pos) = lower.find("ctfdata=") {
        pos + 8
    } else if let Some(pos) = lower.find("<?xml ") {
        debug!("decoding sdtid token");
        return decode_sdtid_token(&input[pos..]);
    } else if input.starts_with(|c: char| c.is_ascii_digit()) {
        0
    } else {
        return Err(TokenError::UnrecognizedFormat);
    };

    let rest = &input[start..];
    let mut body = String::new();
    match rest.as_bytes().first() {
        Some(b'1' | b'2') => {
            for c in rest.chars() {
                if body.len() >= BUFLEN - 1 {
                    return Err(TokenError::BadLength);
                }
                if c.is_ascii_digit() {
                    body.push(c);
                } else if c != '-' {
                    break;
                }
            }
        }
        Some(b'A') => {
            for c in rest.chars().take_while(|c| !c.is_whitespace()) {
                if body.len() >= BUFLEN - 1 {
                    return Err(TokenError::BadLength);
                }
                body.push(c);
            }
        }
        _ => return Err(TokenError::UnrecognizedFormat),
    }

    let mut token = decode_token(&body)?;
    token.is_smartphone = SMARTPHONE_PREFIXES.iter().any(|p| input.starts_with(p));
    debug!(version = token.version, smartphone = token.is_smartphone, "decoded token");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Seed, TokenFlags};

    fn sample() -> String {
        let token = Token::from_seed(
            "987654321012",
            Seed::from_bytes([0x5c; 16]),
            TokenFlags::TIME_DERIVED,
            4000,
        )
        .unwrap();
        token.encode(None, None, 2, false).unwrap()
    }

    #[test]
    fn raw_and_dashed_forms() {
        let raw = sample();
        assert_eq!(parse_token_string(&raw).unwrap().serial, "987654321012");

        let dashed = raw
            .as_bytes()
            .chunks(5)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("-");
        assert_eq!(parse_token_string(&dashed).unwrap().serial, "987654321012");
    }

    #[test]
    fn smartphone_urls() {
        let raw = sample();
        let token =
            parse_token_string(&format!("com.rsa.securid.iphone://ctf?ctfData={raw}")).unwrap();
        assert!(token.is_smartphone);

        let token = parse_token_string(&format!("see CTFDATA=3D{raw}&foo")).unwrap();
        assert!(!token.is_smartphone);
        assert_eq!(token.serial, "987654321012");
    }

    #[test]
    fn unrecognized_input() {
        assert!(matches!(
            parse_token_string("hello world"),
            Err(TokenError::UnrecognizedFormat)
        ));
        assert!(matches!(
            parse_token_string("ctfData=xyz"),
            Err(TokenError::UnrecognizedFormat)
        ));
        assert!(matches!(parse_token_string("3123"), Err(TokenError::UnrecognizedFormat)));
    }

    #[test]
    fn short_base64_is_not_v3() {
        assert!(matches!(decode_token("AAAA"), Err(TokenError::TokenVersion)));
        assert!(matches!(decode_token(""), Err(TokenError::TokenVersion)));
    }
}
