use chrono::{DateTime, Datelike, Timelike, Utc};
use zeroize::Zeroizing;

use crate::constants::{AES_KEY_SIZE, SERIAL_CHARS};
use crate::crypto::aes128_ecb_encrypt;
use crate::error::{Result, TokenError};
use crate::pin::Pin;
use crate::types::{Seed, Token};

fn bcd_write(out: &mut [u8], mut val: u32) {
    for byte in out.iter_mut().rev() {
        *byte = (val % 10) as u8;
        val /= 10;
        *byte |= ((val % 10) as u8) << 4;
        val /= 10;
    }
}

fn key_from_time(bcd_time: &[u8], serial_bcd: &[u8; 4]) -> [u8; AES_KEY_SIZE] {
    let mut key = [0xaa; AES_KEY_SIZE];
    key[..bcd_time.len()].copy_from_slice(bcd_time);
    key[8..12].copy_from_slice(serial_bcd);
    key[12..].fill(0xbb);
    key
}

/// Digits 4..12 of the serial number, packed two per byte.
fn serial_bcd(serial: &str) -> Result<[u8; 4]> {
    let serial = serial.as_bytes();
    if serial.len() != SERIAL_CHARS {
        return Err(TokenError::BadLength);
    }
    let mut out = [0u8; 4];
    for (byte, pair) in out.iter_mut().zip(serial[4..].chunks(2)) {
        *byte = (pair[0].wrapping_sub(b'0') << 4) | pair[1].wrapping_sub(b'0');
    }
    Ok(out)
}

/// Computes the tokencode shown at unix time `when`.
///
/// PIN digits, when given, are added to the code digit-wise modulo 10
/// starting from the rightmost digit.
pub fn compute_tokencode(token: &Token, seed: &Seed, when: i64, pin: Option<&Pin>) -> Result<String> {
    let gmt = DateTime::<Utc>::from_timestamp(when, 0).ok_or(TokenError::TimeOutOfRange(when))?;
    let year = u32::try_from(gmt.year()).map_err(|_| TokenError::TimeOutOfRange(when))?;
    let is_30 = token.interval() == 30;
    let minute_mask = if is_30 { !0x01 } else { !0x03 };

    let mut bcd_time = [0u8; 8];
    bcd_write(&mut bcd_time[0..2], year);
    bcd_write(&mut bcd_time[2..3], gmt.month());
    bcd_write(&mut bcd_time[3..4], gmt.day());
    bcd_write(&mut bcd_time[4..5], gmt.hour());
    bcd_write(&mut bcd_time[5..6], gmt.minute() & minute_mask);

    let serial = serial_bcd(&token.serial)?;
    let mut key0 = Zeroizing::new(aes128_ecb_encrypt(
        seed.as_bytes(),
        &key_from_time(&bcd_time[..2], &serial),
    ));
    let mut key1 = Zeroizing::new(aes128_ecb_encrypt(&key0, &key_from_time(&bcd_time[..3], &serial)));
    *key0 = aes128_ecb_encrypt(&key1, &key_from_time(&bcd_time[..4], &serial));
    *key1 = aes128_ecb_encrypt(&key0, &key_from_time(&bcd_time[..5], &serial));
    *key0 = aes128_ecb_encrypt(&key1, &key_from_time(&bcd_time[..8], &serial));

    // key0 now holds 4 consecutive tokencodes
    let idx = if is_30 {
        ((gmt.minute() & 0x01) << 3) | (u32::from(gmt.second() >= 30) << 2)
    } else {
        (gmt.minute() & 0x03) << 2
    };
    let idx = idx as usize;
    let mut code = u32::from_be_bytes([key0[idx], key0[idx + 1], key0[idx + 2], key0[idx + 3]]);

    let pin_digits: Vec<u8> = pin.map(|p| p.digits().rev().collect()).unwrap_or_default();
    let mut out = vec![b'0'; token.flags.digits()];
    for (i, slot) in out.iter_mut().rev().enumerate() {
        let mut c = (code % 10) as u8;
        code /= 10;
        if let Some(p) = pin_digits.get(i) {
            c += p;
        }
        *slot = b'0' + c % 10;
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Splits a tokencode into two halves for display, e.g. "1234 5678".
pub fn format_tokencode(tokencode: &str) -> String {
    let mid = tokencode.len() / 2;
    let mut out = String::with_capacity(tokencode.len() + 1);
    for (i, c) in tokencode.chars().enumerate() {
        if i == mid {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
