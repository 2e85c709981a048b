mod block_cipher;
mod digests;
mod securid_mac;

use rand_core::{OsRng, RngCore};

use crate::error::Result;

pub(crate) use block_cipher::{
    aes128_ecb_decrypt, aes128_ecb_encrypt, aes256_cbc_decrypt, aes256_cbc_encrypt,
};
pub(crate) use digests::{ct_eq, hmac_sha256, pbkdf2_sha256, sha256};
pub(crate) use securid_mac::{cbc_hash, securid_mac, securid_shortmac, xor_block};

pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    OsRng.try_fill_bytes(&mut out)?;
    Ok(out)
}

/// Copies as much of `src` as fits; the tail of `dst` is left as it was.
pub(crate) fn copy_truncated(dst: &mut [u8], src: &[u8]) {
    let len = src.len().min(dst.len());
    dst[..len].copy_from_slice(&src[..len]);
}
