use super::{Key, RawKey};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// A key derived from a password.
///
/// Only the SHA-256 hash of the UTF-8 password is kept.
#[derive(Clone)]
pub struct PasswordKey {
    raw: RawKey,
}

impl PasswordKey {
    pub fn new(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        Self {
            raw: Zeroizing::new(digest.into()),
        }
    }
}

impl Key for PasswordKey {
    fn raw_key(&self) -> RawKey {
        self.raw.clone()
    }
}

impl fmt::Debug for PasswordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordKey(<redacted>)")
    }
}
