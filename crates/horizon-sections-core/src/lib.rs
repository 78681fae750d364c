//! Core runtime for Horizon Sections.
//!
//! This crate provides the building blocks the section synchronizer is
//! assembled from, with no knowledge of groups or views:
//!
//! - **Signals**: [`Signal`] and the RAII [`Subscription`] handle
//! - **Serial dispatch**: [`SerialQueue`], a FIFO queue bound to one thread
//! - **Thread affinity**: [`thread_check::ThreadAffinity`]
//! - **Logging**: tracing targets, span names and [`PerfSpan`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sections_core::{SerialQueue, Signal};
//!
//! let queue = Arc::new(SerialQueue::new("view"));
//! let changed = Arc::new(Signal::<u32>::new());
//!
//! let q = queue.clone();
//! let _subscription = changed.subscribe(move |&value| {
//!     q.invoke(move || println!("handled {value} on the view thread")).unwrap();
//! });
//!
//! changed.emit(7);
//! ```

pub mod dispatch;
mod error;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use dispatch::{Dispatched, SerialQueue, TaskId};
pub use error::{DispatchError, Result, SignalError};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal, Subscription};
