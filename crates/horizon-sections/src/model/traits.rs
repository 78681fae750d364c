//! Access capabilities a collection can offer.
//!
//! Groups come in two shapes:
//!
//! - [`IndexedSource`]: positional access, O(1) count and item-at.
//! - [`SequentialSource`]: forward-only enumeration. Count, item-at and
//!   index-of all walk the sequence.
//!
//! [`GroupAccessor`](super::GroupAccessor) wraps one or the other.

use std::collections::{BTreeSet, LinkedList, VecDeque};
use std::ops::ControlFlow;

use super::identity::Identity;

/// A collection with positional access.
pub trait IndexedSource<T>: Send + Sync {
    /// Number of items.
    fn len(&self) -> usize;

    /// Returns `true` if there are no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at `index`, if in bounds.
    fn get(&self, index: usize) -> Option<T>;

    /// Position of the item with the same identity as `item`.
    ///
    /// The default scans with [`get`](Self::get). Implementations holding
    /// their items in memory should override it.
    fn position(&self, item: &T) -> Option<usize>
    where
        T: Identity,
    {
        (0..self.len()).find(|&index| {
            self.get(index)
                .is_some_and(|candidate| candidate.same_identity(item))
        })
    }
}

/// A collection that can only be walked front to back.
pub trait SequentialSource<T>: Send + Sync {
    /// Call `visit` for each item in order until it returns `Break`.
    fn visit(&self, visit: &mut dyn FnMut(&T) -> ControlFlow<()>);
}

impl<T: Clone + Identity + Send + Sync> IndexedSource<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).cloned()
    }

    fn position(&self, item: &T) -> Option<usize> {
        self.iter().position(|candidate| candidate.same_identity(item))
    }
}

impl<T: Clone + Identity + Send + Sync> IndexedSource<T> for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<T> {
        VecDeque::get(self, index).cloned()
    }

    fn position(&self, item: &T) -> Option<usize> {
        self.iter().position(|candidate| candidate.same_identity(item))
    }
}

impl<T: Send + Sync> SequentialSource<T> for LinkedList<T> {
    fn visit(&self, visit: &mut dyn FnMut(&T) -> ControlFlow<()>) {
        for item in self {
            if visit(item).is_break() {
                break;
            }
        }
    }
}

impl<T: Send + Sync> SequentialSource<T> for BTreeSet<T> {
    fn visit(&self, visit: &mut dyn FnMut(&T) -> ControlFlow<()>) {
        for item in self {
            if visit(item).is_break() {
                break;
            }
        }
    }
}
