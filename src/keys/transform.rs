use crate::constants::TRANSFORMED_KEY_SIZE;
use crate::{Error, Result};
use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// The stretched master key, ready to be used as a symmetric key.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct TransformedKey([u8; TRANSFORMED_KEY_SIZE]);

impl TransformedKey {
    pub fn from_bytes(bytes: [u8; TRANSFORMED_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TRANSFORMED_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for TransformedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformedKey(<redacted>)")
    }
}

/// Strategy that stretches a raw composite key into a `TransformedKey`.
///
/// Implementations must be deterministic in `(raw_key, seed, rounds)`, must cost work
/// proportional to `rounds`, and must always produce `TRANSFORMED_KEY_SIZE` bytes.
/// Input they cannot handle is reported as an error, never padded or truncated.
pub trait KeyTransform: Send + Sync {
    fn transform(&self, raw_key: &[u8], seed: &[u8], rounds: u64) -> Result<TransformedKey>;
}

/// The AES key derivation function.
///
/// AES-256 keyed with the 32-byte seed encrypts both 16-byte halves of the raw key
/// `rounds` times; the result is hashed with SHA-256.
#[derive(Clone, Copy, Debug, Default)]
pub struct AesKdf;

impl KeyTransform for AesKdf {
    fn transform(&self, raw_key: &[u8], seed: &[u8], rounds: u64) -> Result<TransformedKey> {
        if raw_key.len() != TRANSFORMED_KEY_SIZE {
            return Err(Error::KeyDerivation(format!(
                "raw key must be {TRANSFORMED_KEY_SIZE} bytes, got {}",
                raw_key.len()
            )));
        }
        if rounds == 0 {
            return Err(Error::InvalidTransformRounds(rounds));
        }
        let cipher = Aes256::new_from_slice(seed).map_err(|_| {
            Error::KeyDerivation(format!(
                "transform seed must be 32 bytes, got {}",
                seed.len()
            ))
        })?;

        let mut buffer = Zeroizing::new([0u8; TRANSFORMED_KEY_SIZE]);
        buffer.copy_from_slice(raw_key);
        {
            let (left, right) = buffer.split_at_mut(16);
            let left = GenericArray::from_mut_slice(left);
            let right = GenericArray::from_mut_slice(right);
            for _ in 0..rounds {
                cipher.encrypt_block(left);
                cipher.encrypt_block(right);
            }
        }

        let digest = Sha256::digest(&buffer[..]);
        Ok(TransformedKey(digest.into()))
    }
}
