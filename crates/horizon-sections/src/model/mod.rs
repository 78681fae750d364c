//! Data-side types for sectioned synchronization.
//!
//! The data layer hands the synchronizer an ordered collection of groups.
//! Each group is an ordered collection of items, mapped one-to-one onto a
//! view section. Either level may report its own mutations.
//!
//! # Core Types
//!
//! - `ChangeNotification`: one atomic mutation, in data terms
//! - `GroupAccessor`: count / item-at / index-of over indexed or enumerable sources
//! - `Collection`, `Group`, `GroupCollection`: a source plus its optional change signal
//! - `ObservableVec`: a vector that emits a notification per mutation
//! - `Identity`: identity equality used by index-of lookups
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sections::model::{Collection, GroupCollection, ItemPosition, ObservableVec};
//!
//! let fruit = Arc::new(ObservableVec::new(vec!["apple", "pear"]));
//! let veg = Collection::from_vec(vec!["leek"]);
//! let groups: GroupCollection<&str> =
//!     Collection::from_vec(vec![Collection::observable(&fruit), veg]);
//!
//! assert_eq!(groups.count(), 2);
//! assert_eq!(groups.position_of(&"leek"), Some(ItemPosition::new(1, 0)));
//! ```

mod accessor;
mod identity;
mod notification;
mod observable;
mod traits;

pub use accessor::{ChangeSignal, Collection, Group, GroupAccessor, GroupCollection, ItemPosition};
pub use identity::Identity;
pub use notification::{ChangeAction, ChangeNotification};
pub use observable::ObservableVec;
pub use traits::{IndexedSource, SequentialSource};
