use crate::constants::{MAX_PIN, MIN_PIN};

/// Summary of a loaded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub serial: String,
    /// Unix time the token stops working.
    pub exp_date: i64,
    pub interval: u32,
    pub token_version: u8,
    pub uses_pin: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinRange {
    pub min: usize,
    pub max: usize,
}

impl Default for PinRange {
    fn default() -> Self {
        PinRange {
            min: MIN_PIN,
            max: MAX_PIN,
        }
    }
}
