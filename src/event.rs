//!
//! Notifications emitted around tree mutations.
//!
//! Every mutation performed through the `Database` API is bracketed by a pair of events:
//! an "about to" event carrying the affected node, emitted before anything changes, and a
//! payload-free completion event emitted afterwards. Observers such as tree-view models use
//! the first to prepare and the second to commit their own state.
//!
//! `Database::set_root_group` is the single exception and emits nothing.

use crate::entry::Entry;
use crate::group::Group;
use uuid::Uuid;

/// A notification about a change to the database tree.
#[derive(Debug)]
pub enum DatabaseEvent<'a> {
    /// `group` is about to be inserted into `parent` at `index`.
    GroupAboutToAdd {
        group: &'a Group,
        parent: Uuid,
        index: usize,
    },
    GroupAdded,
    /// `group` and its whole subtree are about to be removed.
    GroupAboutToRemove { group: &'a Group },
    GroupRemoved,
    GroupDataAboutToChange { group: &'a Group },
    GroupDataChanged,
    /// `entry` is about to be inserted into `group` at `index`.
    EntryAboutToAdd {
        entry: &'a Entry,
        group: Uuid,
        index: usize,
    },
    EntryAdded,
    EntryAboutToRemove { entry: &'a Entry },
    EntryRemoved,
    EntryDataAboutToChange { entry: &'a Entry },
    EntryDataChanged,
}

/// Handle returned by `Database::subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback = Box<dyn FnMut(&DatabaseEvent<'_>) + Send>;

/// Registered observers, invoked synchronously in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    callbacks: Vec<(ObserverId, Callback)>,
}

impl Observers {
    pub(crate) fn subscribe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&DatabaseEvent<'_>) + Send + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub(crate) fn notify(&mut self, event: &DatabaseEvent<'_>) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }
}
