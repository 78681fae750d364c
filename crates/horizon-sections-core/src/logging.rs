//! Logging facilities for Horizon Sections.
//!
//! Horizon Sections uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_sections=debug,horizon_sections_core=info")
//!     .init();
//! ```
//!
//! The [`targets`] constants can be used in filter directives to enable a
//! single subsystem.

/// Span names used for tracing.
pub mod span_names {
    /// Processing of one change notification on the serialization context.
    pub const NOTIFICATION: &str = "horizon_sections::notification";
    /// A full rebuild of the group tracking registry.
    pub const REBUILD: &str = "horizon_sections::rebuild";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_sections_core";
    /// Serial dispatch queue target.
    pub const DISPATCH: &str = "horizon_sections_core::dispatch";
    /// Signal/slot target.
    pub const SIGNAL: &str = "horizon_sections_core::signal";
    /// Notification-to-plan translation target.
    pub const TRANSLATOR: &str = "horizon_sections::translator";
    /// Group tracking registry target.
    pub const REGISTRY: &str = "horizon_sections::registry";
    /// Synchronizer lifecycle and dispatch target.
    pub const SYNC: &str = "horizon_sections::sync";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time the handling of a single notification.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_sections::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Debug-level log on the dispatch target.
#[macro_export]
macro_rules! sections_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_sections_core::dispatch", $($arg)*)
    };
}

/// Warn-level log on the dispatch target.
#[macro_export]
macro_rules! sections_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_sections_core::dispatch", $($arg)*)
    };
}
