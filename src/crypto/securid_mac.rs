use super::aes128_ecb_encrypt;
use crate::constants::{AES_BLOCK_SIZE, AES_KEY_SIZE};

pub(crate) fn xor_block(out: &mut [u8; AES_BLOCK_SIZE], input: &[u8; AES_BLOCK_SIZE]) {
    out.iter_mut().zip(input).for_each(|(o, i)| *o ^= i);
}

/// One Matyas-Meyer-Oseas step: the data block is the AES key.
fn encrypt_then_xor(key: &[u8; AES_KEY_SIZE], work: &mut [u8; AES_BLOCK_SIZE]) {
    let enc = aes128_ecb_encrypt(key, work);
    xor_block(work, &enc);
}

fn to_block(chunk: &[u8]) -> [u8; AES_BLOCK_SIZE] {
    let mut block = [0u8; AES_BLOCK_SIZE];
    block[..chunk.len()].copy_from_slice(chunk);
    block
}

/// AES-based hash used for token checksums, seed hashes and key derivation.
pub(crate) fn securid_mac(input: &[u8]) -> [u8; AES_BLOCK_SIZE] {
    let mut work = [0xffu8; AES_BLOCK_SIZE];
    let mut pad = [0u8; AES_BLOCK_SIZE];

    // big-endian bit length, right aligned
    let mut bits = input.len() * 8;
    let mut p = AES_BLOCK_SIZE;
    while bits > 0 && p > 0 {
        p -= 1;
        pad[p] = bits as u8;
        bits >>= 8;
    }

    let mut rest = input;
    let mut odd = false;
    while rest.len() > AES_KEY_SIZE {
        encrypt_then_xor(&to_block(&rest[..AES_KEY_SIZE]), &mut work);
        rest = &rest[AES_KEY_SIZE..];
        odd = !odd;
    }

    encrypt_then_xor(&to_block(rest), &mut work);

    // an extra block of zeroes for certain input lengths
    if odd {
        encrypt_then_xor(&[0u8; AES_BLOCK_SIZE], &mut work);
    }

    encrypt_then_xor(&pad, &mut work);

    let mut out = work;
    encrypt_then_xor(&work, &mut out);
    out
}

/// 15-bit truncation of [`securid_mac`].
pub(crate) fn securid_shortmac(input: &[u8]) -> u16 {
    let hash = securid_mac(input);
    ((hash[0] as u16) << 7) | ((hash[1] as u16) >> 1)
}

/// CBC-MAC with an explicit IV; the final partial block is zero padded.
pub(crate) fn cbc_hash(
    key: &[u8; AES_KEY_SIZE],
    iv: &[u8; AES_BLOCK_SIZE],
    data: &[u8],
) -> [u8; AES_BLOCK_SIZE] {
    let mut result = *iv;
    for chunk in data.chunks(AES_BLOCK_SIZE) {
        xor_block(&mut result, &to_block(chunk));
        result = aes128_ecb_encrypt(key, &result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortmac_fits_in_15_bits() {
        for input in [&b""[..], b"1", b"0123456789abcdef0123", &[0xffu8; 77]] {
            assert!(securid_shortmac(input) < 0x8000);
        }
    }

    #[test]
    fn mac_depends_on_length_padding() {
        // identical leading bytes, different lengths
        assert_ne!(securid_mac(&[0u8; 16]), securid_mac(&[0u8; 15]));
        assert_ne!(securid_mac(&[0u8; 32]), securid_mac(&[0u8; 33]));
    }

    #[test]
    fn cbc_hash_of_nothing_is_the_iv() {
        let iv = [3u8; 16];
        assert_eq!(cbc_hash(&[1u8; 16], &iv, &[]), iv);
    }

    #[test]
    fn cbc_hash_zero_pads_the_last_block() {
        let key = [5u8; 16];
        let iv = [0u8; 16];
        let mut padded = [0u8; 32];
        padded[..20].copy_from_slice(&[0xaau8; 20]);
        assert_eq!(cbc_hash(&key, &iv, &[0xaau8; 20]), cbc_hash(&key, &iv, &padded));
    }
}
