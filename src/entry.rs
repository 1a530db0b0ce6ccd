//!
//! Defines the leaf node of the credential tree (`Entry`) and its user-editable fields (`EntryData`).
//!
//! An `Entry` is identified by a `Uuid` that stays stable across save/load cycles and is
//! owned exclusively by its parent `Group`. The parent is referenced by UUID only, so the
//! back-reference never keeps the parent alive.

use crate::time_info::TimeInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// The credential fields of an entry.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryData {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub icon_number: u32,
    /// UUID of a custom icon stored in the database metadata.
    pub custom_icon: Option<Uuid>,
    /// Additional user-defined string fields, keyed by name.
    pub attributes: BTreeMap<String, String>,
    pub times: TimeInfo,
}

impl fmt::Debug for EntryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryData")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("icon_number", &self.icon_number)
            .field("custom_icon", &self.custom_icon)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("times", &self.times)
            .finish()
    }
}

/// A single credential record.
///
/// # Example
///
/// ```
/// # use keepcore::entry::{Entry, EntryData};
/// let entry = Entry::new(EntryData {
///     title: "mail".to_string(),
///     username: "alice".to_string(),
///     ..Default::default()
/// });
/// assert_eq!(entry.data().title, "mail");
/// assert!(entry.parent().is_none());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    uuid: Uuid,
    data: EntryData,
    /// Re-linked by the owning group; never persisted.
    #[serde(skip)]
    parent: Option<Uuid>,
}

impl Entry {
    /// Creates a detached entry with a fresh random UUID.
    pub fn new(data: EntryData) -> Self {
        Self::with_uuid(Uuid::new_v4(), data)
    }

    /// Creates a detached entry with a known UUID, e.g. when loading a database.
    pub fn with_uuid(uuid: Uuid, data: EntryData) -> Self {
        Self {
            uuid,
            data,
            parent: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn data(&self) -> &EntryData {
        &self.data
    }

    /// Mutable access to the fields.
    ///
    /// Only reachable through an owned or detached entry. Entries inside a
    /// `Database` are changed with `Database::update_entry` so that observers are notified.
    pub fn data_mut(&mut self) -> &mut EntryData {
        &mut self.data
    }

    /// UUID of the group holding this entry, if it is attached to one.
    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Uuid>) {
        self.parent = parent;
    }
}
