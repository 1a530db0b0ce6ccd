//!
//! The `Database` aggregate root.
//!
//! A `Database` owns the root `Group` of the credential tree, the `Metadata`, the list of
//! `DeletedObject` tombstones and the cryptographic parameters from which the transformed
//! master key is derived. It is the single source of truth read by the persistence layer
//! and observed by UI models.
//!
//! It is not internally synchronized: all mutators take `&mut self`, so one owner drives it.

use crate::async_task;
use crate::compression::CompressionAlgorithm;
use crate::constants::{
    CIPHER_AES256, DEFAULT_TRANSFORM_ROUNDS, SUPPORTED_CIPHERS, TRANSFORM_SEED_SIZE,
};
use crate::entry::{Entry, EntryData};
use crate::event::{DatabaseEvent, ObserverId, Observers};
use crate::group::{Group, GroupData, NodeKind};
use crate::keys::{AesKdf, CompositeKey, Key, KeyTransform, TransformedKey};
use crate::metadata::Metadata;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A tombstone recording that a group or entry was permanently deleted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedObject {
    pub uuid: Uuid,
    pub deletion_time: DateTime<Utc>,
}

impl DeletedObject {
    pub fn new(uuid: Uuid, deletion_time: DateTime<Utc>) -> Self {
        Self {
            uuid,
            deletion_time,
        }
    }

    /// A tombstone stamped with the current time.
    pub fn now(uuid: Uuid) -> Self {
        Self::new(uuid, Utc::now())
    }
}

/// The persisted parameters needed to re-derive the transformed master key.
///
/// A persistence layer stores these, never the transformed key itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CryptoParameters {
    pub cipher: Uuid,
    pub compression_algo: CompressionAlgorithm,
    pub transform_seed: Vec<u8>,
    pub transform_rounds: u64,
}

/// The parameters the cached key was derived with.
#[derive(Clone)]
struct DerivedKey {
    key: TransformedKey,
    cipher: Uuid,
    seed: Vec<u8>,
    rounds: u64,
}

/// The in-memory model of one credential database.
pub struct Database {
    root: Option<Group>,
    metadata: Metadata,
    deleted_objects: Vec<DeletedObject>,
    /// Every UUID in the current tree.
    index: HashMap<Uuid, NodeKind>,
    observers: Observers,

    cipher: Uuid,
    compression_algo: CompressionAlgorithm,
    transform_seed: Vec<u8>,
    transform_rounds: u64,
    derived: Option<DerivedKey>,
    key_transform: Arc<dyn KeyTransform>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("root", &self.root.as_ref().map(Group::uuid))
            .field("nodes", &self.index.len())
            .field("deleted_objects", &self.deleted_objects.len())
            .field("observers", &self.observers.len())
            .field("cipher", &self.cipher)
            .field("compression_algo", &self.compression_algo)
            .field("transform_rounds", &self.transform_rounds)
            .field("has_key", &self.derived.is_some())
            .finish()
    }
}

impl Database {
    /// Creates an empty database: no root group, default metadata and parameters, no key.
    pub fn new() -> Self {
        Self {
            root: None,
            metadata: Metadata::default(),
            deleted_objects: Vec::new(),
            index: HashMap::new(),
            observers: Observers::default(),
            cipher: CIPHER_AES256,
            compression_algo: CompressionAlgorithm::default(),
            transform_seed: Vec::new(),
            transform_rounds: DEFAULT_TRANSFORM_ROUNDS,
            derived: None,
            key_transform: Arc::new(AesKdf),
        }
    }

    /// Replaces the strategy used by `set_key*`. The cached key is left as it is.
    pub fn set_key_transform(&mut self, transform: Arc<dyn KeyTransform>) {
        self.key_transform = transform;
    }

    pub fn root_group(&self) -> Option<&Group> {
        self.root.as_ref()
    }

    /// Installs `group` as the root group and hands the previous root back to the caller.
    ///
    /// **Warning:** this emits no events. Observers keep whatever state they built from the
    /// previous tree until the caller explicitly refreshes them. The previous root is
    /// returned, not dropped, so disposing of it is also up to the caller.
    ///
    /// Parent links in `group` are re-linked, so a freshly deserialized tree is accepted.
    /// A tree containing a UUID twice is rejected and the database is left unchanged.
    pub fn set_root_group(&mut self, mut group: Group) -> Result<Option<Group>> {
        if let Some(duplicate) = group.find_duplicate_uuid() {
            tracing::error!(uuid = %duplicate, "refusing root group with duplicate UUID");
            return Err(Error::DuplicateUuid(duplicate));
        }
        group.set_parent(None);
        group.relink_parents();
        self.index = group.uuids().into_iter().collect();
        tracing::debug!(
            root = %group.uuid(),
            nodes = self.index.len(),
            "root group replaced without notification"
        );
        Ok(self.root.replace(group))
    }

    /// Detaches the root group without installing a replacement.
    ///
    /// Like `set_root_group`, this emits no events.
    pub fn take_root_group(&mut self) -> Option<Group> {
        self.index.clear();
        self.root.take()
    }

    /// Finds a group anywhere in the tree by UUID.
    pub fn resolve_group(&self, uuid: &Uuid) -> Option<&Group> {
        self.root.as_ref()?.find_group(uuid)
    }

    /// Finds an entry anywhere in the tree by UUID.
    pub fn resolve_entry(&self, uuid: &Uuid) -> Option<&Entry> {
        self.root.as_ref()?.find_entry(uuid)
    }

    /// Whether `uuid` names a group or entry currently in the tree.
    pub fn contains_uuid(&self, uuid: &Uuid) -> bool {
        self.index.contains_key(uuid)
    }

    /// Registers an observer for tree mutation events.
    pub fn subscribe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&DatabaseEvent<'_>) + Send + 'static,
    {
        let id = self.observers.subscribe(callback);
        tracing::debug!(?id, "observer subscribed");
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Appends `group` (with its subtree) to the children of `parent`.
    pub fn add_group(&mut self, parent: &Uuid, group: Group) -> Result<()> {
        let index = self.resolve_group(parent).map_or(0, |p| p.children().len());
        self.insert_group(parent, index, group)
    }

    /// Inserts `group` (with its subtree) as child number `index` of `parent`.
    ///
    /// Emits `GroupAboutToAdd` before and `GroupAdded` after the insertion.
    pub fn insert_group(&mut self, parent: &Uuid, index: usize, mut group: Group) -> Result<()> {
        self.check_new_subtree(&group)?;
        let root = self.root.as_mut().ok_or(Error::NoRootGroup)?;
        let target = root
            .find_group_mut(parent)
            .ok_or(Error::GroupNotFound(*parent))?;
        if index > target.children().len() {
            return Err(Error::InvalidOperation(format!(
                "group index {index} out of range (group has {} children)",
                target.children().len()
            )));
        }

        group.relink_parents();
        let uuids = group.uuids();
        self.observers.notify(&DatabaseEvent::GroupAboutToAdd {
            group: &group,
            parent: *parent,
            index,
        });
        target.insert_child(index, group)?;
        self.index.extend(uuids);
        self.observers.notify(&DatabaseEvent::GroupAdded);
        Ok(())
    }

    /// Removes a group and its whole subtree and returns it to the caller.
    ///
    /// No tombstone is recorded; callers that delete permanently add one with
    /// `add_deleted_object`. The root group cannot be removed this way.
    pub fn remove_group(&mut self, uuid: &Uuid) -> Result<Group> {
        let root = self.root.as_mut().ok_or(Error::NoRootGroup)?;
        if root.uuid() == *uuid {
            return Err(Error::InvalidOperation(
                "the root group can only be replaced with set_root_group".to_string(),
            ));
        }
        let group = root.find_group(uuid).ok_or(Error::GroupNotFound(*uuid))?;
        let parent = group.parent().ok_or_else(|| {
            Error::InvalidOperation(format!("group {uuid} has no parent link"))
        })?;
        self.observers
            .notify(&DatabaseEvent::GroupAboutToRemove { group });

        let removed = root
            .find_group_mut(&parent)
            .and_then(|p| p.take_child(uuid))
            .ok_or(Error::GroupNotFound(*uuid))?;
        for (uuid, _) in removed.uuids() {
            self.index.remove(&uuid);
        }
        self.observers.notify(&DatabaseEvent::GroupRemoved);
        Ok(removed)
    }

    /// Changes the display attributes of a group in place and bumps its modification time.
    pub fn update_group<F>(&mut self, uuid: &Uuid, f: F) -> Result<()>
    where
        F: FnOnce(&mut GroupData),
    {
        let root = self.root.as_mut().ok_or(Error::NoRootGroup)?;
        let group = root
            .find_group_mut(uuid)
            .ok_or(Error::GroupNotFound(*uuid))?;
        self.observers
            .notify(&DatabaseEvent::GroupDataAboutToChange { group: &*group });
        let data = group.data_mut();
        f(data);
        data.times.touch();
        self.observers.notify(&DatabaseEvent::GroupDataChanged);
        Ok(())
    }

    /// Appends `entry` to the entries of `group`.
    ///
    /// Emits `EntryAboutToAdd` before and `EntryAdded` after the insertion.
    pub fn add_entry(&mut self, group: &Uuid, entry: Entry) -> Result<()> {
        if self.index.contains_key(&entry.uuid()) {
            tracing::error!(uuid = %entry.uuid(), "refusing entry with duplicate UUID");
            return Err(Error::DuplicateUuid(entry.uuid()));
        }
        let root = self.root.as_mut().ok_or(Error::NoRootGroup)?;
        let target = root
            .find_group_mut(group)
            .ok_or(Error::GroupNotFound(*group))?;

        let uuid = entry.uuid();
        self.observers.notify(&DatabaseEvent::EntryAboutToAdd {
            entry: &entry,
            group: *group,
            index: target.entries().len(),
        });
        target.add_entry(entry);
        self.index.insert(uuid, NodeKind::Entry);
        self.observers.notify(&DatabaseEvent::EntryAdded);
        Ok(())
    }

    /// Removes an entry and returns it to the caller. No tombstone is recorded.
    pub fn remove_entry(&mut self, uuid: &Uuid) -> Result<Entry> {
        let root = self.root.as_mut().ok_or(Error::NoRootGroup)?;
        let entry = root.find_entry(uuid).ok_or(Error::EntryNotFound(*uuid))?;
        let parent = entry.parent().ok_or_else(|| {
            Error::InvalidOperation(format!("entry {uuid} has no parent link"))
        })?;
        self.observers
            .notify(&DatabaseEvent::EntryAboutToRemove { entry });

        let removed = root
            .find_group_mut(&parent)
            .and_then(|p| p.take_entry(uuid))
            .ok_or(Error::EntryNotFound(*uuid))?;
        self.index.remove(uuid);
        self.observers.notify(&DatabaseEvent::EntryRemoved);
        Ok(removed)
    }

    /// Changes the fields of an entry in place and bumps its modification time.
    pub fn update_entry<F>(&mut self, uuid: &Uuid, f: F) -> Result<()>
    where
        F: FnOnce(&mut EntryData),
    {
        let root = self.root.as_mut().ok_or(Error::NoRootGroup)?;
        let entry = root
            .find_entry_mut(uuid)
            .ok_or(Error::EntryNotFound(*uuid))?;
        self.observers
            .notify(&DatabaseEvent::EntryDataAboutToChange { entry: &*entry });
        let data = entry.data_mut();
        f(data);
        data.times.touch();
        self.observers.notify(&DatabaseEvent::EntryDataChanged);
        Ok(())
    }

    /// Rejects a subtree that repeats a UUID internally or collides with the tree.
    fn check_new_subtree(&self, group: &Group) -> Result<()> {
        let duplicate = group.find_duplicate_uuid().or_else(|| {
            group
                .uuids()
                .into_iter()
                .map(|(uuid, _)| uuid)
                .find(|uuid| self.index.contains_key(uuid))
        });
        match duplicate {
            Some(uuid) => {
                tracing::error!(%uuid, "refusing group with duplicate UUID");
                Err(Error::DuplicateUuid(uuid))
            }
            None => Ok(()),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Replaces the metadata as a whole and returns the previous value.
    pub fn set_metadata(&mut self, metadata: Metadata) -> Metadata {
        std::mem::replace(&mut self.metadata, metadata)
    }

    /// Tombstones in the order they were added.
    pub fn deleted_objects(&self) -> &[DeletedObject] {
        &self.deleted_objects
    }

    /// Appends a tombstone. Duplicates are kept; interpreting them is up to merge logic.
    pub fn add_deleted_object(&mut self, deleted: DeletedObject) {
        self.deleted_objects.push(deleted);
    }

    pub fn cipher(&self) -> Uuid {
        self.cipher
    }

    pub fn compression_algo(&self) -> CompressionAlgorithm {
        self.compression_algo
    }

    pub fn transform_seed(&self) -> &[u8] {
        &self.transform_seed
    }

    pub fn transform_rounds(&self) -> u64 {
        self.transform_rounds
    }

    /// The key produced by the most recent successful `set_key*` call.
    pub fn transformed_master_key(&self) -> Option<&TransformedKey> {
        self.derived.as_ref().map(|derived| &derived.key)
    }

    /// Whether the cached key was derived with the current cipher, seed and rounds.
    ///
    /// The parameter setters never re-derive, so this turns `false` once the cipher or the
    /// rounds change and stays so until the next `set_key*` call.
    pub fn is_transformed_key_current(&self) -> bool {
        self.derived.as_ref().is_some_and(|derived| {
            derived.cipher == self.cipher
                && derived.seed == self.transform_seed
                && derived.rounds == self.transform_rounds
        })
    }

    /// Sets the payload cipher. Does not re-derive the key.
    pub fn set_cipher(&mut self, cipher: Uuid) {
        self.cipher = cipher;
    }

    /// Sets the payload compression. Does not re-derive the key.
    pub fn set_compression_algo(&mut self, algo: CompressionAlgorithm) {
        self.compression_algo = algo;
    }

    /// Sets the key transform work factor. Does not re-derive the key.
    pub fn set_transform_rounds(&mut self, rounds: u64) -> Result<()> {
        if rounds == 0 {
            return Err(Error::InvalidTransformRounds(rounds));
        }
        self.transform_rounds = rounds;
        Ok(())
    }

    /// The parameters a persistence layer stores for this database.
    pub fn crypto_parameters(&self) -> CryptoParameters {
        CryptoParameters {
            cipher: self.cipher,
            compression_algo: self.compression_algo,
            transform_seed: self.transform_seed.clone(),
            transform_rounds: self.transform_rounds,
        }
    }

    /// Installs loaded parameters and derives the key from them.
    ///
    /// Either every parameter is installed and the key derived, or nothing changes.
    pub fn apply_crypto_parameters(
        &mut self,
        params: &CryptoParameters,
        key: &CompositeKey,
    ) -> Result<()> {
        if params.transform_rounds == 0 {
            return Err(Error::InvalidTransformRounds(params.transform_rounds));
        }
        let derived = self.derive(
            key,
            params.cipher,
            params.transform_seed.clone(),
            params.transform_rounds,
        )?;
        self.compression_algo = params.compression_algo;
        self.install(derived);
        Ok(())
    }

    /// Sets the database key with a freshly generated random transform seed.
    pub fn set_key(&mut self, key: &CompositeKey) -> Result<()> {
        self.set_key_with_seed(key, &generate_transform_seed())
    }

    /// Sets the database key using the given transform seed.
    ///
    /// On failure the seed and the cached key keep their previous values.
    pub fn set_key_with_seed(&mut self, key: &CompositeKey, seed: &[u8]) -> Result<()> {
        let derived = self.derive(key, self.cipher, seed.to_vec(), self.transform_rounds)?;
        self.install(derived);
        Ok(())
    }

    /// Like `set_key`, but runs the derivation on a worker.
    ///
    /// The database stays exclusively borrowed until the derivation finishes, so the tree
    /// cannot change while it is in flight.
    pub async fn set_key_async(&mut self, key: CompositeKey) -> Result<()> {
        self.set_key_with_seed_async(key, generate_transform_seed())
            .await
    }

    /// Like `set_key_with_seed`, but runs the derivation on a worker.
    pub async fn set_key_with_seed_async(
        &mut self,
        key: CompositeKey,
        seed: Vec<u8>,
    ) -> Result<()> {
        let cipher = self.cipher;
        let rounds = self.transform_rounds;
        let transform = Arc::clone(&self.key_transform);
        let derived = async_task::run_and_wait_for_future(move || {
            derive_with(transform.as_ref(), &key, cipher, seed, rounds)
        })
        .await??;
        self.install(derived);
        Ok(())
    }

    fn derive(
        &self,
        key: &CompositeKey,
        cipher: Uuid,
        seed: Vec<u8>,
        rounds: u64,
    ) -> Result<DerivedKey> {
        derive_with(self.key_transform.as_ref(), key, cipher, seed, rounds)
    }

    fn install(&mut self, derived: DerivedKey) {
        self.cipher = derived.cipher;
        self.transform_seed = derived.seed.clone();
        self.transform_rounds = derived.rounds;
        self.derived = Some(derived);
    }
}

fn derive_with(
    transform: &dyn KeyTransform,
    key: &CompositeKey,
    cipher: Uuid,
    seed: Vec<u8>,
    rounds: u64,
) -> Result<DerivedKey> {
    if !SUPPORTED_CIPHERS.contains(&cipher) {
        tracing::warn!(%cipher, "key derivation rejected: unsupported cipher");
        return Err(Error::UnsupportedCipher(cipher));
    }
    tracing::debug!(rounds, seed_len = seed.len(), "deriving transformed master key");
    let raw = key.raw_key();
    let transformed = transform
        .transform(&raw[..], &seed, rounds)
        .inspect_err(|e| tracing::warn!(error = %e, "key derivation failed"))?;
    tracing::debug!(rounds, "transformed master key derived");
    Ok(DerivedKey {
        key: transformed,
        cipher,
        seed,
        rounds,
    })
}

fn generate_transform_seed() -> Vec<u8> {
    let mut seed = vec![0u8; TRANSFORM_SEED_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    seed
}
