use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::constants::AES_BLOCK_SIZE;
use crate::error::{Result, TokenError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub(crate) fn aes128_ecb_encrypt(
    key: &[u8; AES_BLOCK_SIZE],
    input: &[u8; AES_BLOCK_SIZE],
) -> [u8; AES_BLOCK_SIZE] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut block = GenericArray::clone_from_slice(input);
    cipher.encrypt_block(&mut block);

    let mut out = [0u8; AES_BLOCK_SIZE];
    out.copy_from_slice(&block);
    out
}

pub(crate) fn aes128_ecb_decrypt(
    key: &[u8; AES_BLOCK_SIZE],
    input: &[u8; AES_BLOCK_SIZE],
) -> [u8; AES_BLOCK_SIZE] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut block = GenericArray::clone_from_slice(input);
    cipher.decrypt_block(&mut block);

    let mut out = [0u8; AES_BLOCK_SIZE];
    out.copy_from_slice(&block);
    out
}

/// Encrypts `data` in place; its length must be a multiple of the block size.
pub(crate) fn aes256_cbc_encrypt(key: &[u8; 32], iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
    let len = data.len();
    Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| TokenError::BadLength)?
        .encrypt_padded_mut::<NoPadding>(data, len)
        .map_err(|_| TokenError::BadLength)?;
    Ok(())
}

/// Decrypts `data` in place; its length must be a multiple of the block size.
pub(crate) fn aes256_cbc_decrypt(key: &[u8; 32], iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
    Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| TokenError::BadLength)?
        .decrypt_padded_mut::<NoPadding>(data)
        .map_err(|_| TokenError::BadLength)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecb_round_trip() {
        let key = [0x42u8; 16];
        let block = *b"0123456789abcdef";
        let enc = aes128_ecb_encrypt(&key, &block);
        assert_ne!(enc, block);
        assert_eq!(aes128_ecb_decrypt(&key, &enc), block);
    }

    #[test]
    fn aes128_matches_fips197_vector() {
        let key: [u8; 16] = hex::decode("000102030405060708090a0b0c0d0e0f")
            .unwrap()
            .try_into()
            .unwrap();
        let plain: [u8; 16] = hex::decode("00112233445566778899aabbccddeeff")
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(
            hex::encode(aes128_ecb_encrypt(&key, &plain)),
            "69c4e0d86a7b0430d8cdb78070b4c55a"
        );
    }

    #[test]
    fn cbc_round_trip_and_rejects_partial_blocks() {
        let key = [7u8; 32];
        let iv = [9u8; 16];
        let mut data = [0x5au8; 48];
        aes256_cbc_encrypt(&key, &iv, &mut data).unwrap();
        assert_ne!(data, [0x5au8; 48]);
        aes256_cbc_decrypt(&key, &iv, &mut data).unwrap();
        assert_eq!(data, [0x5au8; 48]);

        let mut odd = [0u8; 20];
        assert!(aes256_cbc_decrypt(&key, &iv, &mut odd).is_err());
    }
}
