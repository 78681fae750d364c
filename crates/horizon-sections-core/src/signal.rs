//! Signal/slot primitive for change notification.
//!
//! Observable collections own a [`Signal`] and emit one value per mutation.
//! Consumers either keep the returned [`ConnectionId`] or, more commonly,
//! hold a [`Subscription`] that disconnects when dropped.
//!
//! Slots are invoked synchronously on the emitting thread. Anything that must
//! run on a particular thread marshals itself (see [`crate::SerialQueue`]).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sections_core::Signal;
//!
//! let changed = Arc::new(Signal::<usize>::new());
//! let subscription = changed.subscribe(|len| println!("now {len} items"));
//!
//! changed.emit(3);
//! drop(subscription);
//! assert_eq!(changed.connection_count(), 0);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

struct Connection<Args> {
    order: u64,
    slot: Slot<Args>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// Emission snapshots the connected slots and releases the connection lock
/// before invoking them, so a slot may connect or disconnect (including
/// itself) without deadlocking.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    next_order: AtomicU64,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            next_order: AtomicU64::new(0),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let order = self.next_order.fetch_add(1, Ordering::Relaxed);
        self.connections.lock().insert(Connection {
            order,
            slot: Arc::new(slot),
        })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every connected slot in connection order.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        // Slot keys are reused after a disconnect, so order by connection sequence.
        let mut ordered: Vec<(u64, Slot<Args>)> = self
            .connections
            .lock()
            .values()
            .map(|connection| (connection.order, connection.slot.clone()))
            .collect();
        ordered.sort_unstable_by_key(|(order, _)| *order);
        tracing::trace!(target: targets::SIGNAL, connection_count = ordered.len(), "emitting signal");

        for (_, slot) in ordered {
            slot(&args);
        }
    }

    /// Connect a slot and return a [`Subscription`] that disconnects on drop.
    ///
    /// The subscription only holds a weak reference, so it never keeps the
    /// signal alive.
    pub fn subscribe<F>(self: &Arc<Self>, slot: F) -> Subscription<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        Subscription {
            signal: Arc::downgrade(self),
            id,
        }
    }
}

/// RAII handle for a connection created by [`Signal::subscribe`].
pub struct Subscription<Args: 'static> {
    signal: Weak<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: 'static> Subscription<Args> {
    /// The connection this subscription owns.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` while the connection is still registered on a live signal.
    pub fn is_connected(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|signal| signal.connections.lock().contains_key(self.id))
    }

    /// Disconnect now, reporting why if the connection was already gone.
    pub fn disconnect(mut self) -> Result<(), SignalError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), SignalError> {
        let signal = std::mem::take(&mut self.signal)
            .upgrade()
            .ok_or(SignalError::SignalDropped)?;
        if signal.disconnect(self.id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection)
        }
    }
}

impl<Args: 'static> Drop for Subscription<Args> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

impl<Args: 'static> std::fmt::Debug for Subscription<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

static_assertions::assert_impl_all!(Signal<Vec<String>>: Send, Sync);
static_assertions::assert_impl_all!(Subscription<Vec<String>>: Send, Sync);
