//!
//! Key material and master-key derivation.
//!
//! Every user-supplied key source (password, key file) implements `Key` and reduces to a
//! fixed-size raw key. A `CompositeKey` combines them, and a `KeyTransform` stretches the
//! composite raw key with a seed and a configurable number of rounds into the
//! `TransformedKey` the payload is encrypted with.
//!
//! All raw key buffers are wiped from memory when dropped.

use crate::constants::TRANSFORMED_KEY_SIZE;
use zeroize::Zeroizing;

mod composite;
mod file;
mod password;
mod transform;

pub use composite::CompositeKey;
pub use file::FileKey;
pub use password::PasswordKey;
pub use transform::{AesKdf, KeyTransform, TransformedKey};

/// A fixed-size raw key, zeroized on drop.
pub type RawKey = Zeroizing<[u8; TRANSFORMED_KEY_SIZE]>;

/// A single source of key material.
pub trait Key {
    /// The raw key this source contributes to a composite key.
    fn raw_key(&self) -> RawKey;
}
