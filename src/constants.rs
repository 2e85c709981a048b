pub const AES_BLOCK_SIZE: usize = 16;
pub const AES_KEY_SIZE: usize = 16;
pub const SHA256_HASH_SIZE: usize = 32;

pub const MIN_PIN: usize = 4;
pub const MAX_PIN: usize = 8;
pub const MAX_PASS: usize = 40;
pub const MAGIC_LEN: usize = 6;

pub const VER_CHARS: usize = 1;
pub const SERIAL_CHARS: usize = 12;
pub const TOKEN_BITS_PER_CHAR: usize = 3;

pub const CHECKSUM_BITS: usize = 15;
pub const CHECKSUM_CHARS: usize = CHECKSUM_BITS / TOKEN_BITS_PER_CHAR;

pub const BINENC_BITS: usize = 189;
pub const BINENC_CHARS: usize = BINENC_BITS / TOKEN_BITS_PER_CHAR;
pub const BINENC_OFS: usize = VER_CHARS + SERIAL_CHARS;
pub const CHECKSUM_OFS: usize = BINENC_OFS + BINENC_CHARS;

pub const DEVID_CHARS: usize = 40;

pub const MIN_TOKEN_BITS: usize = 189;
pub const MAX_TOKEN_BITS: usize = 255;
pub const MAX_TOKEN_CHARS: usize = MAX_TOKEN_BITS / TOKEN_BITS_PER_CHAR;
pub const MIN_TOKEN_CHARS: usize =
    MIN_TOKEN_BITS / TOKEN_BITS_PER_CHAR + SERIAL_CHARS + VER_CHARS + CHECKSUM_CHARS;

pub const V3_DEVID_CHARS: usize = 48;
pub const V3_NONCE_BYTES: usize = 16;
/// Decoded size of a v3 record.
pub const V3_RECORD_BYTES: usize = 0x123;
/// Longest base64 text a v3 record can produce.
pub const V3_BASE64_MAX_CHARS: usize = 4 * (V3_RECORD_BYTES + 2) / 3;
pub const V3_BASE64_MIN_CHARS: usize = V3_RECORD_BYTES * 4 / 3;

/// Unix time of 2000/01/01 00:00:00 UTC.
pub const SECURID_EPOCH: i64 = 946_684_800;
pub const SECURID_EPOCH_DAYS: i64 = SECURID_EPOCH / (24 * 60 * 60);
/// v3 tokens count 337500 ticks per day since 1970/01/01.
pub const SECURID_V3_DAY: u64 = 337_500;

/// Expiration dates are clamped so they never pass January 2038.
pub const MAX_TIME_T: i64 = 0x7fff_ffff;
pub const SECURID_MAX_SECS: i64 = MAX_TIME_T - SECURID_EPOCH;
pub const SECURID_MAX_DATE: u16 = (SECURID_MAX_SECS / (24 * 60 * 60) - 1) as u16;

pub const BUFLEN: usize = 2048;

pub const RC_NAME: &str = ".stokenrc";
pub const RC_VERSION: u32 = 1;
