//! Uniform read access over groups.
//!
//! A [`GroupAccessor`] hides whether a collection supports positional access
//! or can only be enumerated. The variant is chosen once, when the source is
//! wrapped, and never re-inspected per call.
//!
//! A [`Collection`] pairs an accessor with the collection's change signal, if
//! it has one. The same type describes a single group ([`Group<T>`]) and the
//! top-level collection of groups ([`GroupCollection<T>`]).

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use horizon_sections_core::Signal;

use super::identity::Identity;
use super::notification::ChangeNotification;
use super::observable::ObservableVec;
use super::traits::{IndexedSource, SequentialSource};

/// Change signal shared between a collection and its observers.
pub type ChangeSignal<T> = Arc<Signal<ChangeNotification<T>>>;

/// Read access to a collection, by position or by enumeration.
pub enum GroupAccessor<T> {
    /// Random-access collection.
    Indexed(Arc<dyn IndexedSource<T>>),
    /// Forward-only collection.
    Sequential(Arc<dyn SequentialSource<T>>),
}

impl<T> Clone for GroupAccessor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Indexed(source) => Self::Indexed(source.clone()),
            Self::Sequential(source) => Self::Sequential(source.clone()),
        }
    }
}

impl<T: Clone + Identity> GroupAccessor<T> {
    /// Number of items. O(n) for sequential sources.
    pub fn count(&self) -> usize {
        match self {
            Self::Indexed(source) => source.len(),
            Self::Sequential(source) => {
                let mut count = 0;
                source.visit(&mut |_| {
                    count += 1;
                    ControlFlow::Continue(())
                });
                count
            }
        }
    }

    /// The item at `index`. O(index) for sequential sources.
    pub fn item_at(&self, index: usize) -> Option<T> {
        match self {
            Self::Indexed(source) => source.get(index),
            Self::Sequential(source) => {
                let mut remaining = index;
                let mut found = None;
                source.visit(&mut |item| {
                    if remaining == 0 {
                        found = Some(item.clone());
                        ControlFlow::Break(())
                    } else {
                        remaining -= 1;
                        ControlFlow::Continue(())
                    }
                });
                found
            }
        }
    }

    /// Position of the item with the same identity as `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        match self {
            Self::Indexed(source) => source.position(item),
            Self::Sequential(source) => {
                let mut index = 0;
                let mut found = None;
                source.visit(&mut |candidate| {
                    if candidate.same_identity(item) {
                        found = Some(index);
                        ControlFlow::Break(())
                    } else {
                        index += 1;
                        ControlFlow::Continue(())
                    }
                });
                found
            }
        }
    }

    /// Every item, in order.
    pub fn snapshot(&self) -> Vec<T> {
        match self {
            Self::Indexed(source) => (0..source.len()).filter_map(|i| source.get(i)).collect(),
            Self::Sequential(source) => {
                let mut items = Vec::new();
                source.visit(&mut |item| {
                    items.push(item.clone());
                    ControlFlow::Continue(())
                });
                items
            }
        }
    }

    /// Returns `true` if the accessor supports positional access.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed(_))
    }

    fn source_addr(&self) -> *const () {
        match self {
            Self::Indexed(source) => Arc::as_ptr(source) as *const (),
            Self::Sequential(source) => Arc::as_ptr(source) as *const (),
        }
    }
}

/// A collection plus its optional change notification capability.
pub struct Collection<T> {
    accessor: GroupAccessor<T>,
    changes: Option<ChangeSignal<T>>,
}

/// A group: one section's worth of items.
pub type Group<T> = Collection<T>;

/// The top-level ordered collection of groups.
pub type GroupCollection<T> = Collection<Group<T>>;

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl<T: Clone + Identity + Send + Sync + 'static> Collection<T> {
    /// Wrap an observable vector. The result is indexed and observable.
    pub fn observable(list: &Arc<ObservableVec<T>>) -> Self {
        Self {
            accessor: GroupAccessor::Indexed(list.clone()),
            changes: Some(list.changes().clone()),
        }
    }

    /// Wrap a static collection of items.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::indexed(Arc::new(items))
    }
}

impl<T: Clone + Identity + 'static> Collection<T> {
    /// Wrap a random-access source with no change notification.
    pub fn indexed(source: Arc<dyn IndexedSource<T>>) -> Self {
        Self {
            accessor: GroupAccessor::Indexed(source),
            changes: None,
        }
    }

    /// Wrap a forward-only source with no change notification.
    pub fn sequential(source: Arc<dyn SequentialSource<T>>) -> Self {
        Self {
            accessor: GroupAccessor::Sequential(source),
            changes: None,
        }
    }

    /// Attach a change signal to this collection.
    pub fn with_changes(mut self, changes: ChangeSignal<T>) -> Self {
        self.changes = Some(changes);
        self
    }

    /// The accessor variant chosen for this collection.
    pub fn accessor(&self) -> &GroupAccessor<T> {
        &self.accessor
    }

    /// The change signal, if the collection is observable.
    pub fn changes(&self) -> Option<&ChangeSignal<T>> {
        self.changes.as_ref()
    }

    /// Returns `true` if the collection reports its own changes.
    pub fn is_observable(&self) -> bool {
        self.changes.is_some()
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.accessor.count()
    }

    /// The item at `index`.
    pub fn item_at(&self, index: usize) -> Option<T> {
        self.accessor.item_at(index)
    }

    /// Position of `item` by identity.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.accessor.index_of(item)
    }

    /// Copy of every item, in order.
    pub fn snapshot(&self) -> Vec<T> {
        self.accessor.snapshot()
    }
}

impl<T: Clone + Identity + 'static> Identity for Collection<T> {
    fn same_identity(&self, other: &Self) -> bool {
        std::ptr::eq(self.accessor.source_addr(), other.accessor.source_addr())
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.accessor {
            GroupAccessor::Indexed(_) => "indexed",
            GroupAccessor::Sequential(_) => "sequential",
        };
        f.debug_struct("Collection")
            .field("access", &kind)
            .field("observable", &self.changes.is_some())
            .finish()
    }
}

/// Location of an item within a sectioned collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemPosition {
    /// Section (group) index.
    pub section: usize,
    /// Item index within the section.
    pub item: usize,
}

impl ItemPosition {
    /// Creates a position.
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl<T: Clone + Identity + 'static> Collection<Group<T>> {
    /// Locate `item` across all groups. The first match in section order wins.
    pub fn position_of(&self, item: &T) -> Option<ItemPosition> {
        let mut section = 0;
        let mut found = None;
        let mut visit_group = |group: &Group<T>| {
            if let Some(index) = group.index_of(item) {
                found = Some(ItemPosition::new(section, index));
                ControlFlow::Break(())
            } else {
                section += 1;
                ControlFlow::Continue(())
            }
        };

        match &self.accessor {
            GroupAccessor::Indexed(groups) => {
                for index in 0..groups.len() {
                    if let Some(group) = groups.get(index) {
                        if visit_group(&group).is_break() {
                            break;
                        }
                    }
                }
            }
            GroupAccessor::Sequential(groups) => groups.visit(&mut visit_group),
        }
        found
    }

    /// Total number of items over all groups.
    pub fn total_item_count(&self) -> usize {
        let mut total = 0;
        match &self.accessor {
            GroupAccessor::Indexed(groups) => {
                for index in 0..groups.len() {
                    total += groups.get(index).map_or(0, |group| group.count());
                }
            }
            GroupAccessor::Sequential(groups) => groups.visit(&mut |group| {
                total += group.count();
                ControlFlow::Continue(())
            }),
        }
        total
    }
}
