use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::constants::{AES_BLOCK_SIZE, MAX_PIN, MIN_PIN};
use crate::crypto::{aes128_ecb_decrypt, aes128_ecb_encrypt, random_bytes, securid_mac, xor_block};
use crate::error::{Result, TokenError};

/// Validated numeric PIN.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Pin(String);

impl Pin {
    pub fn parse(pin: &str) -> Result<Self> {
        pin_format_ok(pin)?;
        Ok(Pin(pin.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn digits(&self) -> impl DoubleEndedIterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b - b'0')
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(<redacted>)")
    }
}

pub fn pin_format_ok(pin: &str) -> Result<()> {
    if pin.len() < MIN_PIN || pin.len() > MAX_PIN {
        return Err(TokenError::PinLength);
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::PinNotNumeric);
    }
    Ok(())
}

/// Encrypts a PIN for storage next to a password protected token.
///
/// The output is the hex encoded IV followed by the hex encoded ciphertext.
pub fn encrypt_pin(pin: &Pin, password: &str) -> Result<String> {
    let mut buf = Zeroizing::new([0u8; AES_BLOCK_SIZE]);
    buf[..pin.0.len()].copy_from_slice(pin.0.as_bytes());
    buf[AES_BLOCK_SIZE - 1] = pin.0.len() as u8;

    let iv: [u8; AES_BLOCK_SIZE] = random_bytes()?;
    xor_block(&mut buf, &iv);

    let key = Zeroizing::new(securid_mac(password.as_bytes()));
    let enc = aes128_ecb_encrypt(&key, &buf);

    Ok(format!("{}{}", hex::encode(iv), hex::encode(enc)))
}

pub fn decrypt_pin(enc_pin: &str, password: &str) -> Result<Pin> {
    if enc_pin.len() != AES_BLOCK_SIZE * 4 {
        return Err(TokenError::BadLength);
    }
    let raw = hex::decode(enc_pin).map_err(|_| TokenError::EncryptedPin)?;
    let (iv, enc) = raw.split_at(AES_BLOCK_SIZE);
    let iv: [u8; AES_BLOCK_SIZE] = iv.try_into().map_err(|_| TokenError::BadLength)?;
    let enc: [u8; AES_BLOCK_SIZE] = enc.try_into().map_err(|_| TokenError::BadLength)?;

    let key = Zeroizing::new(securid_mac(password.as_bytes()));
    let mut buf = Zeroizing::new(aes128_ecb_decrypt(&key, &enc));
    xor_block(&mut buf, &iv);

    let len = buf.iter().position(|&b| b == 0).unwrap_or(AES_BLOCK_SIZE);
    if buf[AES_BLOCK_SIZE - 2] != 0 || buf[AES_BLOCK_SIZE - 1] as usize != len {
        return Err(TokenError::EncryptedPin);
    }
    let pin = std::str::from_utf8(&buf[..len]).map_err(|_| TokenError::EncryptedPin)?;
    Pin::parse(pin).map_err(|_| TokenError::EncryptedPin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_rules() {
        assert!(Pin::parse("1234").is_ok());
        assert!(Pin::parse("12345678").is_ok());
        assert!(matches!(Pin::parse("123"), Err(TokenError::PinLength)));
        assert!(matches!(Pin::parse("123456789"), Err(TokenError::PinLength)));
        assert!(matches!(Pin::parse("12a4"), Err(TokenError::PinNotNumeric)));
    }

    #[test]
    fn encrypted_pin_needs_the_same_password() {
        let pin = Pin::parse("90210").unwrap();
        let enc = encrypt_pin(&pin, "hunter2").unwrap();
        assert_eq!(enc.len(), 64);
        assert_eq!(decrypt_pin(&enc, "hunter2").unwrap(), pin);
        // a wrong password almost surely garbles the length byte
        assert!(decrypt_pin(&enc, "hunter3").is_err());
    }

    #[test]
    fn encrypted_pin_uses_a_fresh_iv() {
        let pin = Pin::parse("1111").unwrap();
        assert_ne!(
            encrypt_pin(&pin, "pw").unwrap(),
            encrypt_pin(&pin, "pw").unwrap()
        );
    }

    #[test]
    fn malformed_encrypted_pin() {
        assert!(matches!(decrypt_pin("abcd", "pw"), Err(TokenError::BadLength)));
        assert!(decrypt_pin(&"zz".repeat(32), "pw").is_err());
    }
}
