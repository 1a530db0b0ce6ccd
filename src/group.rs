//!
//! Defines the container node of the credential tree (`Group`).
//!
//! A `Group` exclusively owns its ordered child groups and entries. Ownership always flows
//! from parent to child; the back-reference from a child to its parent is the parent's
//! `Uuid`, which never extends the parent's lifetime.
//!
//! Detached groups (not yet installed in a `Database`) can be built freely with the
//! `add_*`/`insert_*`/`take_*` methods. Once a tree is handed to a `Database`, it is only
//! mutated through the database so that the UUID index stays consistent and observers
//! are notified.

use crate::entry::Entry;
use crate::time_info::TimeInfo;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Kind of node a UUID refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Entry,
}

/// Display attributes of a group.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupData {
    pub name: String,
    pub notes: String,
    pub icon_number: u32,
    /// UUID of a custom icon stored in the database metadata.
    pub custom_icon: Option<Uuid>,
    /// Whether a tree view should show the group expanded.
    pub is_expanded: bool,
    pub times: TimeInfo,
}

impl GroupData {
    /// Group data with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A node of the credential tree holding child groups and entries.
///
/// # Example
///
/// ```
/// # use keepcore::group::{Group, GroupData};
/// # use keepcore::entry::{Entry, EntryData};
/// let mut root = Group::new(GroupData::named("Root"));
/// let mut mail = Group::new(GroupData::named("Mail"));
/// mail.add_entry(Entry::new(EntryData::default()));
/// let mail_id = mail.uuid();
/// root.add_child(mail);
///
/// let found = root.find_group(&mail_id).unwrap();
/// assert_eq!(found.parent(), Some(root.uuid()));
/// assert_eq!(found.entries().len(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    uuid: Uuid,
    data: GroupData,
    children: Vec<Group>,
    entries: Vec<Entry>,
    /// Re-linked by the owner; never persisted.
    #[serde(skip)]
    parent: Option<Uuid>,
}

impl Group {
    /// Creates a detached, empty group with a fresh random UUID.
    pub fn new(data: GroupData) -> Self {
        Self::with_uuid(Uuid::new_v4(), data)
    }

    /// Creates a detached, empty group with a known UUID, e.g. when loading a database.
    pub fn with_uuid(uuid: Uuid, data: GroupData) -> Self {
        Self {
            uuid,
            data,
            children: Vec::new(),
            entries: Vec::new(),
            parent: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn data(&self) -> &GroupData {
        &self.data
    }

    /// Mutable access to the display attributes of a detached group.
    pub fn data_mut(&mut self) -> &mut GroupData {
        &mut self.data
    }

    /// UUID of the parent group, `None` for a root or detached group.
    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Uuid>) {
        self.parent = parent;
    }

    /// Direct child groups in order.
    pub fn children(&self) -> &[Group] {
        &self.children
    }

    /// Direct entries in order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Appends a child group and points its parent link at this group.
    pub fn add_child(&mut self, mut group: Group) {
        group.set_parent(Some(self.uuid));
        self.children.push(group);
    }

    /// Inserts a child group at `index`, which may equal the current child count.
    pub fn insert_child(&mut self, index: usize, mut group: Group) -> Result<()> {
        if index > self.children.len() {
            return Err(Error::InvalidOperation(format!(
                "group index {index} out of range (group has {} children)",
                self.children.len()
            )));
        }
        group.set_parent(Some(self.uuid));
        self.children.insert(index, group);
        Ok(())
    }

    /// Appends an entry and points its parent link at this group.
    pub fn add_entry(&mut self, mut entry: Entry) {
        entry.set_parent(Some(self.uuid));
        self.entries.push(entry);
    }

    /// Inserts an entry at `index`, which may equal the current entry count.
    pub fn insert_entry(&mut self, index: usize, mut entry: Entry) -> Result<()> {
        if index > self.entries.len() {
            return Err(Error::InvalidOperation(format!(
                "entry index {index} out of range (group has {} entries)",
                self.entries.len()
            )));
        }
        entry.set_parent(Some(self.uuid));
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Detaches the direct child group with the given UUID.
    pub fn take_child(&mut self, uuid: &Uuid) -> Option<Group> {
        let pos = self.children.iter().position(|g| g.uuid == *uuid)?;
        let mut group = self.children.remove(pos);
        group.set_parent(None);
        Some(group)
    }

    /// Detaches the direct entry with the given UUID.
    pub fn take_entry(&mut self, uuid: &Uuid) -> Option<Entry> {
        let pos = self.entries.iter().position(|e| e.uuid() == *uuid)?;
        let mut entry = self.entries.remove(pos);
        entry.set_parent(None);
        Some(entry)
    }

    /// Depth-first search for a group, this group included.
    ///
    /// The walk is pre-order and the first match wins.
    pub fn find_group(&self, uuid: &Uuid) -> Option<&Group> {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            if group.uuid == *uuid {
                return Some(group);
            }
            stack.extend(group.children.iter().rev());
        }
        None
    }

    pub(crate) fn find_group_mut(&mut self, uuid: &Uuid) -> Option<&mut Group> {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            if group.uuid == *uuid {
                return Some(group);
            }
            stack.extend(group.children.iter_mut().rev());
        }
        None
    }

    /// Depth-first search for an entry anywhere below this group.
    pub fn find_entry(&self, uuid: &Uuid) -> Option<&Entry> {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            if let Some(entry) = group.entries.iter().find(|e| e.uuid() == *uuid) {
                return Some(entry);
            }
            stack.extend(group.children.iter().rev());
        }
        None
    }

    pub(crate) fn find_entry_mut(&mut self, uuid: &Uuid) -> Option<&mut Entry> {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            if let Some(pos) = group.entries.iter().position(|e| e.uuid() == *uuid) {
                return Some(&mut group.entries[pos]);
            }
            stack.extend(group.children.iter_mut().rev());
        }
        None
    }

    /// All groups of this subtree in depth-first pre-order, this group first.
    pub fn groups_recursive(&self) -> Vec<&Group> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            out.push(group);
            stack.extend(group.children.iter().rev());
        }
        out
    }

    /// All entries of this subtree, grouped by their owner in depth-first pre-order.
    pub fn entries_recursive(&self) -> Vec<&Entry> {
        self.groups_recursive()
            .into_iter()
            .flat_map(|group| group.entries.iter())
            .collect()
    }

    /// Every UUID in this subtree with the kind of node it names.
    pub fn uuids(&self) -> Vec<(Uuid, NodeKind)> {
        let mut out = Vec::new();
        for group in self.groups_recursive() {
            out.push((group.uuid, NodeKind::Group));
            out.extend(group.entries.iter().map(|e| (e.uuid(), NodeKind::Entry)));
        }
        out
    }

    /// The first UUID that occurs more than once in this subtree, if any.
    pub fn find_duplicate_uuid(&self) -> Option<Uuid> {
        let mut seen = HashSet::new();
        self.uuids()
            .into_iter()
            .map(|(uuid, _)| uuid)
            .find(|uuid| !seen.insert(*uuid))
    }

    /// Points every parent link below this group at its actual owner.
    ///
    /// Needed after deserialization, where parent links are not stored.
    pub(crate) fn relink_parents(&mut self) {
        let mut stack = vec![self];
        while let Some(group) = stack.pop() {
            let uuid = group.uuid;
            for entry in &mut group.entries {
                entry.set_parent(Some(uuid));
            }
            for child in &mut group.children {
                child.set_parent(Some(uuid));
            }
            stack.extend(group.children.iter_mut());
        }
    }
}
