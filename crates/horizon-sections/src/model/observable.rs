//! Observable ordered collection.
//!
//! `ObservableVec<T>` is the data-layer side of synchronization: a vector
//! guarded by a lock that emits exactly one [`ChangeNotification`] per
//! mutation. Notifications are emitted after the mutation is applied and the
//! write lock is released, so observers may read the collection from inside
//! their slot.
//!
//! Both levels of a sectioned view can be backed by it: an
//! `ObservableVec<T>` per group, and an `ObservableVec<Group<T>>` for the
//! groups themselves.

use parking_lot::RwLock;
use std::ops::Range;
use std::sync::Arc;

use horizon_sections_core::Signal;

use super::identity::Identity;
use super::notification::ChangeNotification;
use super::traits::IndexedSource;

/// A vector that reports its mutations.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_sections::model::{ChangeAction, ObservableVec};
///
/// let fruits = Arc::new(ObservableVec::new(vec!["apple", "pear"]));
/// fruits.changes().connect(|change| {
///     assert_eq!(change.action(), ChangeAction::Add);
///     assert_eq!(change.new_start(), Some(2));
/// });
/// fruits.push("plum");
/// assert_eq!(fruits.len(), 3);
/// ```
pub struct ObservableVec<T> {
    items: RwLock<Vec<T>>,
    changes: Arc<Signal<ChangeNotification<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableVec<T> {
    /// Creates a collection holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            changes: Arc::new(Signal::new()),
        }
    }

    /// Creates an empty collection.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The signal every mutation is reported on.
    pub fn changes(&self) -> &Arc<Signal<ChangeNotification<T>>> {
        &self.changes
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns a clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Returns a copy of all items.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Read-only access to the items.
    pub fn items(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.items.read()
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let row = {
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.changes
            .emit(ChangeNotification::added(vec![item], Some(row)));
    }

    /// Inserts an item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&self, index: usize, item: T) {
        self.insert_many(index, vec![item]);
    }

    /// Inserts `new_items` starting at `index`. Does nothing for an empty batch.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_many(&self, index: usize, new_items: Vec<T>) {
        if new_items.is_empty() {
            return;
        }
        {
            let mut items = self.items.write();
            items.splice(index..index, new_items.iter().cloned());
        }
        self.changes
            .emit(ChangeNotification::added(new_items, Some(index)));
    }

    /// Removes and returns the item at `index`, or `None` if out of bounds.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.write();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.changes
            .emit(ChangeNotification::removed(vec![removed.clone()], Some(index)));
        Some(removed)
    }

    /// Removes the items in `range`, clamped to the current length.
    pub fn remove_range(&self, range: Range<usize>) -> Vec<T> {
        let (start, removed) = {
            let mut items = self.items.write();
            let end = range.end.min(items.len());
            let start = range.start.min(end);
            (start, items.drain(start..end).collect::<Vec<_>>())
        };
        if !removed.is_empty() {
            self.changes
                .emit(ChangeNotification::removed(removed.clone(), Some(start)));
        }
        removed
    }

    /// Replaces the item at `index`, returning the old one.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let old = {
            let mut items = self.items.write();
            let slot = items.get_mut(index)?;
            std::mem::replace(slot, item.clone())
        };
        self.changes.emit(ChangeNotification::replaced(
            vec![item],
            vec![old.clone()],
            Some(index),
        ));
        Some(old)
    }

    /// Replaces `count` items starting at `start` with `new_items`.
    ///
    /// The replacement may be shorter or longer than the replaced run.
    /// Returns `None` without notifying if the run is out of bounds.
    pub fn replace_range(&self, start: usize, count: usize, new_items: Vec<T>) -> Option<Vec<T>> {
        let old = {
            let mut items = self.items.write();
            if start.checked_add(count)? > items.len() {
                return None;
            }
            items
                .splice(start..start + count, new_items.iter().cloned())
                .collect::<Vec<_>>()
        };
        self.changes.emit(ChangeNotification::replaced(
            new_items,
            old.clone(),
            Some(start),
        ));
        Some(old)
    }

    /// Provides mutable access to an item and reports it as replaced.
    pub fn modify<F, R>(&self, index: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let (result, old, new) = {
            let mut items = self.items.write();
            let slot = items.get_mut(index)?;
            let old = slot.clone();
            let result = f(&mut *slot);
            (result, old, slot.clone())
        };
        self.changes
            .emit(ChangeNotification::replaced(vec![new], vec![old], Some(index)));
        Some(result)
    }

    /// Moves the item at `from` so that it ends up at `to`.
    ///
    /// Returns `false` without notifying if either position is out of bounds.
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        self.move_range(from, 1, to)
    }

    /// Moves `count` items starting at `from` so that they start at `to`
    /// afterwards.
    ///
    /// Returns `false` without notifying if the run does not fit at either end.
    pub fn move_range(&self, from: usize, count: usize, to: usize) -> bool {
        let moved = {
            let mut items = self.items.write();
            let len = items.len();
            let fits = |start: usize| start.checked_add(count).is_some_and(|end| end <= len);
            if count == 0 || !fits(from) || !fits(to) {
                return false;
            }
            let moved: Vec<T> = items.drain(from..from + count).collect();
            items.splice(to..to, moved.iter().cloned());
            moved
        };
        self.changes
            .emit(ChangeNotification::moved(moved, Some(from), Some(to)));
        true
    }

    /// Replaces all items and reports a reset.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items;
        self.changes.emit(ChangeNotification::reset());
    }

    /// Removes all items and reports a reset.
    pub fn clear(&self) {
        self.items.write().clear();
        self.changes.emit(ChangeNotification::reset());
    }
}

impl<T> IndexedSource<T> for ObservableVec<T>
where
    T: Clone + Identity + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        ObservableVec::len(self)
    }

    fn get(&self, index: usize) -> Option<T> {
        ObservableVec::get(self, index)
    }

    fn position(&self, item: &T) -> Option<usize> {
        self.items
            .read()
            .iter()
            .position(|candidate| candidate.same_identity(item))
    }
}
