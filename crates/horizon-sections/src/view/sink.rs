//! Contracts the host view implements.
//!
//! All ranges are half-open, 0-based and contiguous. Every method is called
//! on the view's serialization context only.

use std::ops::Range;

/// A sectioned view, at section granularity.
pub trait ViewSink: Send + Sync {
    /// Insert new sections occupying `sections`.
    fn insert_sections(&self, sections: Range<usize>);

    /// Delete the sections in `sections`.
    fn delete_sections(&self, sections: Range<usize>);

    /// Re-read the sections in `sections` from the data source.
    fn reload_sections(&self, sections: Range<usize>);

    /// Move one section, with the host's move animation.
    fn move_section(&self, from: usize, to: usize);

    /// Discard everything and re-read the whole data source.
    fn reload_all(&self);

    /// Drop any cached layout. Called right after [`reload_all`](Self::reload_all).
    fn invalidate_layout(&self) {}

    /// Number of sections the view currently shows.
    fn section_count(&self) -> usize;

    /// Whether the view has completed its initial layout pass.
    fn is_attached_and_laid_out(&self) -> bool;

    /// Whether at least one cell is currently realized.
    fn has_visible_content(&self) -> bool;
}

/// A sectioned view, at item granularity within one section.
///
/// Used by [`RowSync`](crate::sync::RowSync) to mirror a single group's own
/// changes.
pub trait ItemSink: Send + Sync {
    /// Insert rows `rows` into `section`.
    fn insert_items(&self, section: usize, rows: Range<usize>);

    /// Delete rows `rows` from `section`.
    fn delete_items(&self, section: usize, rows: Range<usize>);

    /// Re-read rows `rows` of `section`.
    fn reload_items(&self, section: usize, rows: Range<usize>);

    /// Move one row within `section`.
    fn move_item(&self, section: usize, from: usize, to: usize);

    /// Re-read every row of `section`.
    fn reload_section(&self, section: usize);
}

/// Snapshot of a view's introspection, taken before translating a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    /// The view has completed its initial layout pass.
    pub attached: bool,
    /// Sections currently shown.
    pub section_count: usize,
    /// At least one cell is realized.
    pub has_visible_content: bool,
}

impl ViewState {
    /// Read the current state of `sink`.
    pub fn capture(sink: &dyn ViewSink) -> Self {
        Self {
            attached: sink.is_attached_and_laid_out(),
            section_count: sink.section_count(),
            has_visible_content: sink.has_visible_content(),
        }
    }

    /// A view that can take incremental section updates.
    pub fn ready(section_count: usize) -> Self {
        Self {
            attached: true,
            section_count,
            has_visible_content: true,
        }
    }

    /// Why incremental updates are unsafe right now, if they are.
    pub fn unsafe_reason(&self, require_visible_content: bool) -> Option<&'static str> {
        if !self.attached {
            Some("view not attached or not laid out")
        } else if self.section_count == 0 {
            Some("view has no sections")
        } else if require_visible_content && !self.has_visible_content {
            Some("view has no visible cells")
        } else {
            None
        }
    }

    /// Returns `true` if incremental section updates are safe.
    pub fn is_incrementally_mutable(&self, require_visible_content: bool) -> bool {
        self.unsafe_reason(require_visible_content).is_none()
    }
}
