use super::{Key, RawKey};
use crate::Result;
use crate::constants::TRANSFORMED_KEY_SIZE;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use zeroize::Zeroizing;

/// A key read from a key file.
///
/// The file content is interpreted the way existing key files expect:
/// * exactly 32 bytes are used as the raw key,
/// * exactly 64 hexadecimal characters are decoded into the raw key,
/// * anything else is hashed with SHA-256.
#[derive(Clone)]
pub struct FileKey {
    raw: RawKey,
}

impl FileKey {
    /// Builds the key from the content of a key file.
    pub fn from_bytes(content: &[u8]) -> Self {
        let raw = if content.len() == TRANSFORMED_KEY_SIZE {
            let mut raw = Zeroizing::new([0u8; TRANSFORMED_KEY_SIZE]);
            raw.copy_from_slice(content);
            raw
        } else if let Some(decoded) = decode_hex_key(content) {
            decoded
        } else {
            Zeroizing::new(Sha256::digest(content).into())
        };
        Self { raw }
    }

    /// Reads and interprets a key file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = Zeroizing::new(std::fs::read(path)?);
        Ok(Self::from_bytes(&content))
    }
}

fn decode_hex_key(content: &[u8]) -> Option<RawKey> {
    if content.len() != TRANSFORMED_KEY_SIZE * 2 {
        return None;
    }
    let mut raw = Zeroizing::new([0u8; TRANSFORMED_KEY_SIZE]);
    for (byte, pair) in raw.iter_mut().zip(content.chunks_exact(2)) {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        *byte = (hi * 16 + lo) as u8;
    }
    Some(raw)
}

impl Key for FileKey {
    fn raw_key(&self) -> RawKey {
        self.raw.clone()
    }
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FileKey(<redacted>)")
    }
}
