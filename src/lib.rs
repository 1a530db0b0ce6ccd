//!
//! keepcore: the in-memory model and master-key derivation layer of an encrypted credential store.
//!
//! ## Core Concepts
//!
//! * **Groups (`group::Group`)**: Containers forming a rooted tree. A group owns its child groups and entries.
//! * **Entries (`entry::Entry`)**: Leaf nodes holding the credential fields.
//! * **Database (`database::Database`)**: The aggregate root. It owns the root group, the `metadata::Metadata`,
//!   the list of deleted objects (tombstones) and the cryptographic parameters, and it resolves
//!   groups and entries by their `Uuid`.
//! * **Events (`event::DatabaseEvent`)**: Notifications emitted before and after every tree mutation
//!   performed through the `Database` API.
//! * **Keys (`keys`)**: Composite keys built from passwords and key files, and the pluggable
//!   `keys::KeyTransform` that stretches them into the transformed master key.
//! * **Async tasks (`async_task`)**: Running expensive work, such as key derivation, on a worker
//!   without stalling the caller's event loop.

pub mod async_task;
pub mod compression;
pub mod constants;
pub mod database;
pub mod entry;
pub mod event;
pub mod group;
pub mod keys;
pub mod metadata;
pub mod time_info;

pub use compression::CompressionAlgorithm;
pub use database::{CryptoParameters, Database, DeletedObject};
pub use entry::{Entry, EntryData};
pub use group::{Group, GroupData};
pub use metadata::Metadata;
/// Re-export the identifier type used for every group and entry.
pub use uuid::Uuid;

/// Result type used throughout the keepcore library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the keepcore library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Group not found: {0}")]
    GroupNotFound(Uuid),

    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Database has no root group")]
    NoRootGroup,

    /// The same UUID appears twice in the tree. This is a caller bug and the
    /// offending operation is rejected without touching the database.
    #[error("Duplicate UUID in tree: {0}")]
    DuplicateUuid(Uuid),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A persisted compression ordinal that this version does not know.
    #[error("Unknown compression algorithm: {0}")]
    UnknownCompressionAlgorithm(u32),

    #[error("Unsupported cipher: {0}")]
    UnsupportedCipher(Uuid),

    #[error("Invalid transform rounds: {0}")]
    InvalidTransformRounds(u64),

    /// The key transform rejected its input.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// A background task panicked or was cancelled before producing a result.
    #[error("Background task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
