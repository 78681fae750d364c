//! Per-group subscription tracking.
//!
//! The registry holds one [`GroupTracking`] per group, index-aligned with the
//! view's sections. Any change to the group collection's shape can shift
//! every later section, so the registry is never renumbered in place: it is
//! torn down and rebuilt from the current collection.
//!
//! Item-level changes raised by an observable group are marshaled through the
//! serialization queue and delivered to an [`ItemSync`] with the group's
//! section. Each subscription remembers the registry generation it was
//! created in. A change that is processed after a newer rebuild looks the
//! group up again by identity, and is dropped if the group is gone. Item
//! changes raised before a full reload of the view are already shown by it
//! and are skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use horizon_sections_core::logging::{PerfSpan, span_names, targets};
use horizon_sections_core::{SerialQueue, Subscription};

use crate::model::{ChangeNotification, Group, GroupCollection, Identity};

use super::item_sync::ItemSync;

/// State shared with in-flight item deliveries.
#[derive(Debug, Default)]
struct RegistryState {
    generation: AtomicU64,
    disposed: AtomicBool,
    item_raised: AtomicU64,
    item_reloaded_through: AtomicU64,
}

/// One group's entry in the registry.
pub struct GroupTracking<T: 'static> {
    section: usize,
    group: Group<T>,
    subscription: Option<Subscription<ChangeNotification<T>>>,
}

impl<T: 'static> GroupTracking<T> {
    /// The section this group occupied when the registry was built.
    pub fn section(&self) -> usize {
        self.section
    }

    /// The tracked group.
    pub fn group(&self) -> &Group<T> {
        &self.group
    }

    /// Returns `true` if the group's own changes are being observed.
    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_connected)
    }
}

impl<T: 'static> std::fmt::Debug for GroupTracking<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupTracking")
            .field("section", &self.section)
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}

/// Index-aligned list of [`GroupTracking`] entries.
///
/// Mutated only on the serialization context.
pub struct GroupSubscriptionRegistry<T: 'static> {
    trackings: Vec<GroupTracking<T>>,
    state: Arc<RegistryState>,
}

impl<T> Default for GroupSubscriptionRegistry<T>
where
    T: Clone + Identity + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GroupSubscriptionRegistry<T>
where
    T: Clone + Identity + Send + Sync + 'static,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            trackings: Vec::new(),
            state: Arc::new(RegistryState::default()),
        }
    }

    /// Drop every tracking and recreate the list from `groups`.
    ///
    /// Observable groups get a subscription that forwards their changes to
    /// `item_sync` through `queue`. Static groups get an entry without one.
    /// Does nothing once the registry is disposed.
    pub fn rebuild(
        &mut self,
        groups: &GroupCollection<T>,
        queue: &Arc<SerialQueue>,
        item_sync: &Arc<dyn ItemSync<T>>,
    ) {
        if self.is_disposed() {
            tracing::trace!(target: targets::REGISTRY, "rebuild skipped, registry disposed");
            return;
        }

        let _perf = PerfSpan::new(span_names::REBUILD);
        let generation = self.state.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let released = self.trackings.len();
        self.trackings.clear();

        let trackings: Vec<GroupTracking<T>> = groups
            .snapshot()
            .into_iter()
            .enumerate()
            .map(|(section, group)| {
                let subscription = group.changes().map(|changes| {
                    let forward = Forwarder {
                        state: self.state.clone(),
                        generation,
                        section,
                        group: group.clone(),
                        groups: groups.clone(),
                        queue: queue.clone(),
                        item_sync: item_sync.clone(),
                    };
                    changes.subscribe(move |change: &ChangeNotification<T>| forward.forward(change))
                });
                GroupTracking {
                    section,
                    group,
                    subscription,
                }
            })
            .collect();

        self.trackings = trackings;
        tracing::trace!(
            target: targets::REGISTRY,
            generation,
            released,
            tracked = self.trackings.len(),
            subscribed = self.subscription_count(),
            "registry rebuilt"
        );
    }

    /// The section recorded for `group`, matched by identity.
    pub fn section_of(&self, group: &Group<T>) -> Option<usize> {
        self.trackings
            .iter()
            .find(|t| t.group.same_identity(group))
            .map(|t| t.section)
    }
}

impl<T: 'static> GroupSubscriptionRegistry<T> {
    /// Release every subscription. Later rebuilds are ignored.
    ///
    /// Calling this more than once is a no-op.
    pub fn dispose(&mut self) {
        if self.state.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.state.generation.fetch_add(1, Ordering::AcqRel);
        let released = self.trackings.len();
        self.trackings.clear();
        tracing::trace!(target: targets::REGISTRY, released, "registry disposed");
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.state.disposed.load(Ordering::Acquire)
    }

    /// Record that the view is about to be reloaded from the live collection.
    ///
    /// Item changes raised so far and still waiting in the queue are dropped
    /// when they come up.
    pub fn mark_full_reload(&self) {
        let raised = self.state.item_raised.load(Ordering::Acquire);
        self.state
            .item_reloaded_through
            .fetch_max(raised, Ordering::AcqRel);
        tracing::trace!(target: targets::REGISTRY, through = raised, "item changes covered by full reload");
    }

    /// Number of tracked groups.
    pub fn tracking_count(&self) -> usize {
        self.trackings.len()
    }

    /// Number of tracked groups with a live subscription.
    pub fn subscription_count(&self) -> usize {
        self.trackings.iter().filter(|t| t.is_subscribed()).count()
    }

    /// Incremented on every rebuild and on dispose.
    pub fn generation(&self) -> u64 {
        self.state.generation.load(Ordering::Acquire)
    }

    /// The current entries, in section order.
    pub fn trackings(&self) -> &[GroupTracking<T>] {
        &self.trackings
    }
}

impl<T: 'static> std::fmt::Debug for GroupSubscriptionRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupSubscriptionRegistry")
            .field("trackings", &self.trackings)
            .field("generation", &self.state.generation.load(Ordering::Relaxed))
            .finish()
    }
}

/// Captured by a group subscription; marshals each change onto the queue.
struct Forwarder<T: 'static> {
    state: Arc<RegistryState>,
    generation: u64,
    section: usize,
    group: Group<T>,
    groups: GroupCollection<T>,
    queue: Arc<SerialQueue>,
    item_sync: Arc<dyn ItemSync<T>>,
}

impl<T> Forwarder<T>
where
    T: Clone + Identity + Send + Sync + 'static,
{
    fn forward(&self, change: &ChangeNotification<T>) {
        let delivery = Delivery {
            seq: self.state.item_raised.fetch_add(1, Ordering::AcqRel) + 1,
            state: self.state.clone(),
            generation: self.generation,
            section: self.section,
            group: self.group.clone(),
            groups: self.groups.clone(),
            item_sync: self.item_sync.clone(),
            change: change.clone(),
        };
        if let Err(err) = self.queue.invoke(move || delivery.run()) {
            tracing::debug!(target: targets::REGISTRY, %err, "item change not delivered");
        }
    }
}

struct Delivery<T: 'static> {
    seq: u64,
    state: Arc<RegistryState>,
    generation: u64,
    section: usize,
    group: Group<T>,
    groups: GroupCollection<T>,
    item_sync: Arc<dyn ItemSync<T>>,
    change: ChangeNotification<T>,
}

impl<T> Delivery<T>
where
    T: Clone + Identity + 'static,
{
    fn run(self) {
        if self.state.disposed.load(Ordering::Acquire) {
            return;
        }
        if self.seq <= self.state.item_reloaded_through.load(Ordering::Acquire) {
            tracing::trace!(
                target: targets::REGISTRY,
                seq = self.seq,
                action = ?self.change.action(),
                "item change already shown by a full reload"
            );
            return;
        }

        let section = if self.state.generation.load(Ordering::Acquire) == self.generation {
            Some(self.section)
        } else {
            self.groups.index_of(&self.group)
        };

        match section {
            Some(section) => self.item_sync.items_changed(section, &self.change),
            None => tracing::trace!(
                target: targets::REGISTRY,
                action = ?self.change.action(),
                "group no longer present, item change dropped"
            ),
        }
    }
}
