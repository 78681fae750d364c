//! The section synchronizer.
//!
//! A [`SectionSynchronizer`] observes a [`GroupCollection`] and keeps a
//! sectioned [`ViewSink`] in step with it. Every change is marshaled onto the
//! synchronizer's [`SerialQueue`], translated into exactly one
//! [`ViewUpdatePlan`], and applied there, in the order the changes were
//! raised.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_sections::{Collection, ObservableVec, SectionSynchronizer};
//!
//! let groups = Arc::new(ObservableVec::new(vec![Collection::from_vec(vec![1, 2, 3])]));
//! let sync = SectionSynchronizer::builder(Collection::observable(&groups), view.clone())
//!     .build()?;
//!
//! // Changes raised on the view thread are applied before this returns.
//! groups.push(Collection::from_vec(vec![4]));
//! assert_eq!(sync.group_count(), 2);
//! ```
//!
//! # Threading
//!
//! The synchronizer must be built on the view's thread unless a queue bound
//! to that thread is supplied. Changes raised elsewhere wait in the queue
//! until the view thread calls [`SectionSynchronizer::process_pending`] (or
//! drains the queue itself). Read accessors such as
//! [`item_at`](SectionSynchronizer::item_at) read the live collection and
//! are meant to be called on the view thread too.
//!
//! Disposal while a notification is being processed on another thread is
//! not supported.
//!
//! # Queued changes
//!
//! The translator reads the live collection, which already reflects every
//! change raised so far. A change processed while later ones are still
//! queued therefore becomes a full reload. The queued changes that reload
//! already covers still produce their own plan, also a full reload, since
//! replaying them incrementally would apply them twice.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use horizon_sections_core::logging::{PerfSpan, span_names, targets};
use horizon_sections_core::{Dispatched, SerialQueue, Signal, Subscription};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::model::{ChangeNotification, Group, GroupCollection, Identity, ItemPosition};
use crate::view::{ViewSink, ViewState, ViewUpdatePlan};

use super::item_sync::{ItemSync, SectionReload};
use super::registry::GroupSubscriptionRegistry;
use super::translator::ChangeTranslator;

/// Keeps a sectioned view synchronized with a collection of groups.
pub struct SectionSynchronizer<T: 'static> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: 'static> {
    groups: GroupCollection<T>,
    sink: Arc<dyn ViewSink>,
    registry: Mutex<GroupSubscriptionRegistry<T>>,
    translator: ChangeTranslator,
    queue: Arc<SerialQueue>,
    owns_queue: bool,
    item_sync: Arc<dyn ItemSync<T>>,
    subscription: Mutex<Option<Subscription<ChangeNotification<Group<T>>>>>,
    disposed: AtomicBool,
    /// Sequence number of the last group change handed to the queue.
    raised: AtomicU64,
    /// The view shows every change up to this sequence number.
    reloaded_through: AtomicU64,
    config: SyncConfig,
    plan_applied: Signal<ViewUpdatePlan>,
}

impl<T> SectionSynchronizer<T>
where
    T: Clone + Identity + Send + Sync + 'static,
{
    /// Start building a synchronizer for `groups` shown by `sink`.
    pub fn builder(
        groups: GroupCollection<T>,
        sink: Arc<dyn ViewSink>,
    ) -> SectionSynchronizerBuilder<T> {
        SectionSynchronizerBuilder::new(groups, sink)
    }

    /// Create a synchronizer with default settings.
    pub fn new(groups: GroupCollection<T>, sink: Arc<dyn ViewSink>) -> Result<Self> {
        Self::builder(groups, sink).build()
    }

    /// The item at `index` in `section`.
    pub fn item_at(&self, section: usize, index: usize) -> Option<T> {
        self.inner.groups.item_at(section)?.item_at(index)
    }

    /// Number of groups, which is the number of sections.
    pub fn group_count(&self) -> usize {
        self.inner.groups.count()
    }

    /// Number of items across all groups.
    pub fn item_count(&self) -> usize {
        self.inner.groups.total_item_count()
    }

    /// Where `item` is shown. The first match in section order wins.
    pub fn position_of(&self, item: &T) -> Option<ItemPosition> {
        self.inner.groups.position_of(item)
    }

    /// The group shown at `section`.
    pub fn group_at(&self, section: usize) -> Option<Group<T>> {
        self.inner.groups.item_at(section)
    }

    /// The observed collection.
    pub fn groups(&self) -> &GroupCollection<T> {
        &self.inner.groups
    }

    /// Handle a change of the group collection.
    ///
    /// On the view thread with nothing queued the change is applied before
    /// this returns. Otherwise it is queued behind earlier changes.
    pub fn on_change(&self, change: ChangeNotification<Group<T>>) -> Result<Dispatched> {
        Inner::dispatch(&self.inner, change)
    }

    /// Handle a change described by host-style raw values.
    ///
    /// Negative positions mean "unknown".
    ///
    /// # Panics
    ///
    /// Panics if `action_code` is not one of the five change kinds.
    pub fn on_raw_change(
        &self,
        action_code: i32,
        new_items: Vec<Group<T>>,
        old_items: Vec<Group<T>>,
        new_start: isize,
        old_start: isize,
    ) -> Result<Dispatched> {
        let change =
            match ChangeNotification::from_raw(action_code, new_items, old_items, new_start, old_start) {
                Ok(change) => change,
                Err(SyncError::UnknownAction(code)) => unknown_action(code),
                Err(err) => return Err(err),
            };
        self.on_change(change)
    }

    /// Run every change waiting in the queue. Must be called on the view thread.
    pub fn process_pending(&self) -> usize {
        self.inner.queue.process_pending()
    }

    /// Stop observing the collection and release every group subscription.
    ///
    /// Calling this more than once is a no-op.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Number of group trackings. Matches the view's section count after
    /// every applied change.
    pub fn tracking_count(&self) -> usize {
        self.inner.registry.lock().tracking_count()
    }

    /// Registry generation, incremented by every rebuild.
    pub fn generation(&self) -> u64 {
        self.inner.registry.lock().generation()
    }

    /// The queue changes are serialized through.
    pub fn queue(&self) -> &Arc<SerialQueue> {
        &self.inner.queue
    }

    /// Emitted on the view thread after each plan is applied.
    pub fn plan_applied(&self) -> &Signal<ViewUpdatePlan> {
        &self.inner.plan_applied
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }
}

impl<T: 'static> Drop for SectionSynchronizer<T> {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl<T: 'static> std::fmt::Debug for SectionSynchronizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionSynchronizer")
            .field("name", &self.inner.config.name)
            .field("queue", &self.inner.queue)
            .field("disposed", &self.inner.disposed.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T: 'static> Inner<T> {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(subscription) = self.subscription.lock().take() {
            // The collection may already be gone.
            let _ = subscription.disconnect();
        }
        self.registry.lock().dispose();
        let discarded = if self.owns_queue { self.queue.close() } else { 0 };
        tracing::debug!(target: targets::SYNC, name = %self.config.name, discarded, "synchronizer disposed");
    }
}

impl<T> Inner<T>
where
    T: Clone + Identity + Send + Sync + 'static,
{
    fn dispatch(this: &Arc<Self>, change: ChangeNotification<Group<T>>) -> Result<Dispatched> {
        if this.disposed.load(Ordering::Acquire) {
            return Err(SyncError::Disposed);
        }
        let seq = this.raised.fetch_add(1, Ordering::AcqRel) + 1;
        let inner = Arc::clone(this);
        Ok(this.queue.invoke(move || inner.process(change, seq))?)
    }

    fn process(&self, change: ChangeNotification<Group<T>>, seq: u64) {
        if self.disposed.load(Ordering::Acquire) {
            tracing::trace!(target: targets::SYNC, name = %self.config.name, "disposed, change ignored");
            return;
        }

        self.queue
            .affinity()
            .debug_assert_same_thread_with_msg("SectionSynchronizer processed a change off its view thread");

        let _perf = PerfSpan::new(span_names::NOTIFICATION);
        let pending = self.raised.load(Ordering::Acquire) - seq;
        let plan = if pending > 0 {
            tracing::debug!(
                target: targets::SYNC,
                name = %self.config.name,
                pending,
                "collection changed again before this change was applied, falling back to full reload"
            );
            ViewUpdatePlan::FullReload
        } else if seq <= self.reloaded_through.load(Ordering::Acquire) {
            tracing::debug!(
                target: targets::SYNC,
                name = %self.config.name,
                seq,
                "change already shown by an earlier full reload, reloading again"
            );
            ViewUpdatePlan::FullReload
        } else {
            let view = ViewState::capture(self.sink.as_ref());
            self.translator.translate(&change, view, &self.groups)
        };
        tracing::debug!(
            target: targets::SYNC,
            name = %self.config.name,
            seq,
            action = ?change.action(),
            %plan,
            "applying change"
        );

        if plan.is_full_reload() {
            if self.config.yield_before_reload {
                std::thread::yield_now();
            }
            // Everything raised before this point is in the collection the
            // reload reads.
            let covered = self.raised.load(Ordering::Acquire);
            let mut registry = self.registry.lock();
            registry.mark_full_reload();
            registry.rebuild(&self.groups, &self.queue, &self.item_sync);
            drop(registry);
            plan.apply(self.sink.as_ref());
            self.reloaded_through.fetch_max(covered, Ordering::AcqRel);
        } else {
            self.rebuild_registry();
            plan.apply(self.sink.as_ref());
        }
        self.plan_applied.emit(plan);
    }

    fn rebuild_registry(&self) {
        self.registry
            .lock()
            .rebuild(&self.groups, &self.queue, &self.item_sync);
    }
}

#[cold]
#[inline(never)]
fn unknown_action(code: i32) -> ! {
    panic!(
        "CHANGE CONTRACT VIOLATION: unknown collection change action code {code}. \
         Valid codes are 0 (Add), 1 (Remove), 2 (Replace), 3 (Move) and 4 (Reset)."
    );
}

/// Builder for [`SectionSynchronizer`].
pub struct SectionSynchronizerBuilder<T: 'static> {
    groups: GroupCollection<T>,
    sink: Arc<dyn ViewSink>,
    config: SyncConfig,
    item_sync: Option<Arc<dyn ItemSync<T>>>,
    queue: Option<Arc<SerialQueue>>,
}

impl<T> SectionSynchronizerBuilder<T>
where
    T: Clone + Identity + Send + Sync + 'static,
{
    fn new(groups: GroupCollection<T>, sink: Arc<dyn ViewSink>) -> Self {
        Self {
            groups,
            sink,
            config: SyncConfig::default(),
            item_sync: None,
            queue: None,
        }
    }

    /// Use `config` instead of the defaults.
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Receive each observable group's own item changes.
    ///
    /// Defaults to reloading the group's section.
    pub fn item_sync(mut self, item_sync: Arc<dyn ItemSync<T>>) -> Self {
        self.item_sync = Some(item_sync);
        self
    }

    /// Serialize through an existing queue instead of creating one on the
    /// calling thread. A supplied queue is not closed on dispose.
    pub fn queue(mut self, queue: Arc<SerialQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Validate the configuration, subscribe, and build the initial registry.
    pub fn build(self) -> Result<SectionSynchronizer<T>> {
        self.config.validate()?;

        let owns_queue = self.queue.is_none();
        let queue = self
            .queue
            .unwrap_or_else(|| Arc::new(SerialQueue::new(self.config.name.clone())));
        queue.set_warn_threshold(self.config.queue_warn_threshold);

        let item_sync: Arc<dyn ItemSync<T>> = match self.item_sync {
            Some(item_sync) => item_sync,
            None => Arc::new(SectionReload::new(self.sink.clone())),
        };

        let inner = Arc::new(Inner {
            translator: ChangeTranslator::from_config(&self.config),
            groups: self.groups,
            sink: self.sink,
            registry: Mutex::new(GroupSubscriptionRegistry::new()),
            queue,
            owns_queue,
            item_sync,
            subscription: Mutex::new(None),
            disposed: AtomicBool::new(false),
            raised: AtomicU64::new(0),
            reloaded_through: AtomicU64::new(0),
            config: self.config,
            plan_applied: Signal::new(),
        });

        inner.rebuild_registry();

        if let Some(changes) = inner.groups.changes() {
            let weak: Weak<Inner<T>> = Arc::downgrade(&inner);
            let subscription = changes.subscribe(move |change: &ChangeNotification<Group<T>>| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Err(err) = Inner::dispatch(&inner, change.clone()) {
                    tracing::debug!(target: targets::SYNC, %err, "group change not dispatched");
                }
            });
            *inner.subscription.lock() = Some(subscription);
        }

        tracing::debug!(
            target: targets::SYNC,
            name = %inner.config.name,
            groups = inner.registry.lock().tracking_count(),
            observable = inner.groups.is_observable(),
            "synchronizer created"
        );
        Ok(SectionSynchronizer { inner })
    }
}

static_assertions::assert_impl_all!(SectionSynchronizer<u32>: Send, Sync);
