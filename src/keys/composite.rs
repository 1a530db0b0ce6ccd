use super::{Key, RawKey};
use crate::constants::TRANSFORMED_KEY_SIZE;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// The combination of all key sources protecting a database.
///
/// The raw composite key is the SHA-256 hash of the component raw keys concatenated in
/// the order they were added, so the order of `add_key` calls matters.
#[derive(Clone, Default)]
pub struct CompositeKey {
    keys: Vec<RawKey>,
}

impl CompositeKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for the common password-only case.
    pub fn from_password(password: &str) -> Self {
        let mut key = Self::new();
        key.add_key(&super::PasswordKey::new(password));
        key
    }

    pub fn add_key(&mut self, key: &dyn Key) {
        self.keys.push(key.raw_key());
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Drops all component keys.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

impl Key for CompositeKey {
    fn raw_key(&self) -> RawKey {
        let mut hasher = Sha256::new();
        for key in &self.keys {
            hasher.update(&key[..]);
        }
        let mut raw = Zeroizing::new([0u8; TRANSFORMED_KEY_SIZE]);
        raw.copy_from_slice(&hasher.finalize());
        raw
    }
}

impl fmt::Debug for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeKey")
            .field("keys", &self.keys.len())
            .finish()
    }
}
