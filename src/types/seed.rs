use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::AES_KEY_SIZE;
use crate::crypto::{ct_eq, random_bytes, securid_shortmac};
use crate::error::Result;

/// Raw token seed. Wiped from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; AES_KEY_SIZE]);

impl Seed {
    pub fn from_bytes(bytes: [u8; AES_KEY_SIZE]) -> Self {
        Seed(bytes)
    }

    pub fn random() -> Result<Self> {
        Ok(Seed(random_bytes()?))
    }

    pub fn as_bytes(&self) -> &[u8; AES_KEY_SIZE] {
        &self.0
    }

    /// 15-bit hash stored alongside the encrypted seed in CTF records.
    pub(crate) fn short_hash(&self) -> u16 {
        securid_shortmac(&self.0)
    }

    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.0, &other.0)
    }
}

impl Eq for Seed {}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_seed() {
        let seed = Seed::from_bytes([0xab; 16]);
        let printed = format!("{seed:?}");
        assert!(!printed.contains("ab"));
        assert!(!printed.contains("171"));
    }

    #[test]
    fn hex_is_space_separated() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0x0f;
        bytes[15] = 0xa0;
        let hex = Seed::from_bytes(bytes).to_hex();
        assert!(hex.starts_with("0f 00"));
        assert!(hex.ends_with("00 a0"));
    }
}
