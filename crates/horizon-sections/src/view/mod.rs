//! View-side contracts and update plans.

mod plan;
mod sink;

pub use plan::ViewUpdatePlan;
pub use sink::{ItemSink, ViewSink, ViewState};
