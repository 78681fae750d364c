//! Horizon Sections - sectioned view synchronization.
//!
//! Mirrors an observable collection of groups onto a sectioned view: each
//! group is one section, each item one row. Every change the collection
//! raises is translated into a single view operation (insert, delete,
//! reload or move sections) and applied on the view's thread in the order
//! the changes were raised. When a change cannot be applied safely in
//! place, the view is reloaded from scratch.
//!
//! # Modules
//!
//! - [`model`]: group accessors, change notifications, `ObservableVec`
//! - [`view`]: the `ViewSink`/`ItemSink` contracts and `ViewUpdatePlan`
//! - [`sync`]: translation, group tracking and `SectionSynchronizer`
//! - [`config`]: `SyncConfig`, loadable from TOML
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_sections::{Collection, ObservableVec, SectionSynchronizer};
//!
//! let groups = Arc::new(ObservableVec::new(vec![
//!     Collection::from_vec(vec!["a", "b"]),
//!     Collection::from_vec(vec!["c"]),
//! ]));
//! let sync = SectionSynchronizer::new(Collection::observable(&groups), my_view)?;
//!
//! groups.push(Collection::from_vec(vec!["d"])); // inserts section 2
//! ```

pub mod config;
mod error;
pub mod model;
pub mod sync;
pub mod view;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use model::{
    ChangeAction, ChangeNotification, Collection, Group, GroupAccessor, GroupCollection, Identity,
    ItemPosition, ObservableVec,
};
pub use sync::{
    ChangeTranslator, GroupSubscriptionRegistry, ItemSync, RowSync, SectionSynchronizer,
    SectionSynchronizerBuilder,
};
pub use view::{ItemSink, ViewSink, ViewState, ViewUpdatePlan};

pub use horizon_sections_core::{Dispatched, SerialQueue};
