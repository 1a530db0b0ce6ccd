//! Constants used throughout the keepcore library.
//!
//! This module provides central definitions for the default key-derivation work factor,
//! the sizes of key material and the identifiers of the ciphers the database knows about.

use uuid::Uuid;

/// Default number of key transform rounds for a new database.
pub const DEFAULT_TRANSFORM_ROUNDS: u64 = 50_000;

/// Size in bytes of a freshly generated transform seed.
pub const TRANSFORM_SEED_SIZE: usize = 32;

/// Size in bytes of a raw composite key and of a transformed master key.
pub const TRANSFORMED_KEY_SIZE: usize = 32;

/// AES-256 in CBC mode, the default payload cipher.
pub const CIPHER_AES256: Uuid = Uuid::from_u128(0x31c1f2e6_bf71_4350_be58_05216afc5aff);

/// Twofish in CBC mode.
pub const CIPHER_TWOFISH: Uuid = Uuid::from_u128(0xad68f29f_576f_4bb9_a36a_d47af965346c);

/// Ciphers a transformed key may be derived for.
pub const SUPPORTED_CIPHERS: &[Uuid] = &[CIPHER_AES256, CIPHER_TWOFISH];
