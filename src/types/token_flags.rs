use std::ops::BitOr;

/// Feature bits packed into CTF records.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenFlags(pub u16);

impl TokenFlags {
    pub const KEY_128BIT: TokenFlags = TokenFlags(1 << 14);
    pub const PASSWORD_PROTECTED: TokenFlags = TokenFlags(1 << 13);
    pub const DEVID_PROTECTED: TokenFlags = TokenFlags(1 << 12);
    pub const APP_DERIVED: TokenFlags = TokenFlags(1 << 11);
    pub const FEATURE_4: TokenFlags = TokenFlags(1 << 10);
    pub const TIME_DERIVED: TokenFlags = TokenFlags(1 << 9);
    pub const FEATURE_6: TokenFlags = TokenFlags(1 << 5);

    const DIGIT_SHIFT: u16 = 6;
    const DIGIT_MASK: u16 = 0x7 << Self::DIGIT_SHIFT;
    const PINMODE_SHIFT: u16 = 3;
    const PINMODE_MASK: u16 = 0x3 << Self::PINMODE_SHIFT;
    const NUMSECONDS_MASK: u16 = 0x3;

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, other: TokenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: TokenFlags, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    /// Tokencode length, 1 to 8.
    pub fn digits(self) -> usize {
        (((self.0 & Self::DIGIT_MASK) >> Self::DIGIT_SHIFT) + 1) as usize
    }

    pub fn set_digits(&mut self, digits: usize) {
        let field = (digits.clamp(1, 8) - 1) as u16;
        self.0 = (self.0 & !Self::DIGIT_MASK) | (field << Self::DIGIT_SHIFT);
    }

    /// 0/1: no PIN, 2/3: PIN digits are added to the tokencode.
    pub fn pin_mode(self) -> u8 {
        ((self.0 & Self::PINMODE_MASK) >> Self::PINMODE_SHIFT) as u8
    }

    pub fn set_pin_mode(&mut self, mode: u8) {
        let field = (mode & 0x3) as u16;
        self.0 = (self.0 & !Self::PINMODE_MASK) | (field << Self::PINMODE_SHIFT);
    }

    pub fn interval_code(self) -> u8 {
        (self.0 & Self::NUMSECONDS_MASK) as u8
    }

    pub fn interval(self) -> u32 {
        match self.interval_code() {
            0 => 30,
            _ => 60,
        }
    }

    pub fn set_interval(&mut self, seconds: u32) {
        let field = u16::from(seconds == 60);
        self.0 = (self.0 & !Self::NUMSECONDS_MASK) | field;
    }
}

impl BitOr for TokenFlags {
    type Output = TokenFlags;

    fn bitor(self, rhs: TokenFlags) -> TokenFlags {
        TokenFlags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_fields() {
        // digits=8, pin mode 3, 60 seconds, time-derived, 128-bit
        let flags = TokenFlags(0x43d9);
        assert_eq!(flags.digits(), 8);
        assert_eq!(flags.pin_mode(), 3);
        assert_eq!(flags.interval(), 60);
        assert!(flags.contains(TokenFlags::TIME_DERIVED));
        assert!(flags.contains(TokenFlags::KEY_128BIT));
        assert!(!flags.contains(TokenFlags::PASSWORD_PROTECTED));
    }

    #[test]
    fn setters_leave_other_bits_alone() {
        let mut flags = TokenFlags::PASSWORD_PROTECTED | TokenFlags::FEATURE_6;
        flags.set_digits(6);
        flags.set_pin_mode(2);
        flags.set_interval(30);
        assert_eq!(flags.digits(), 6);
        assert_eq!(flags.pin_mode(), 2);
        assert_eq!(flags.interval(), 30);
        assert!(flags.contains(TokenFlags::PASSWORD_PROTECTED | TokenFlags::FEATURE_6));

        flags.set(TokenFlags::PASSWORD_PROTECTED, false);
        assert!(!flags.contains(TokenFlags::PASSWORD_PROTECTED));
    }
}
