//! Change translation, group tracking and the synchronizer.

mod item_sync;
mod registry;
mod synchronizer;
mod translator;

pub use item_sync::{ItemSync, RowSync, SectionReload};
pub use registry::{GroupSubscriptionRegistry, GroupTracking};
pub use synchronizer::{SectionSynchronizer, SectionSynchronizerBuilder};
pub use translator::ChangeTranslator;
