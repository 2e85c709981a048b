use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac_array;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::constants::SHA256_HASH_SIZE;
use crate::error::{Result, TokenError};

type HmacSha256 = Hmac<Sha256>;

pub(crate) fn sha256(data: &[u8]) -> [u8; SHA256_HASH_SIZE] {
    Sha256::digest(data).into()
}

pub(crate) fn hmac_sha256(key: &[u8], msg: &[u8]) -> Result<[u8; SHA256_HASH_SIZE]> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| TokenError::BadLength)?;
    mac.update(msg);
    Ok(mac.finalize().into_bytes().into())
}

pub(crate) fn pbkdf2_sha256(password: &[u8], salt: &[u8], rounds: u32) -> [u8; SHA256_HASH_SIZE] {
    pbkdf2_hmac_array::<Sha256, SHA256_HASH_SIZE>(password, salt, rounds)
}

/// Comparison whose timing does not depend on where the inputs differ.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
