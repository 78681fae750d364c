//! View update plans.

use std::fmt;
use std::ops::Range;

use super::sink::ViewSink;

/// The single view operation chosen for one change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdatePlan {
    /// Insert new sections.
    InsertSections(Range<usize>),
    /// Delete sections.
    DeleteSections(Range<usize>),
    /// Reload sections in place.
    ReloadSections(Range<usize>),
    /// Move one section.
    MoveSection {
        /// Section index before the move.
        from: usize,
        /// Section index after the move.
        to: usize,
    },
    /// Discard all positional assumptions and reload everything.
    FullReload,
}

impl ViewUpdatePlan {
    /// Perform the plan against `sink`.
    pub fn apply(&self, sink: &dyn ViewSink) {
        match self {
            Self::InsertSections(sections) => sink.insert_sections(sections.clone()),
            Self::DeleteSections(sections) => sink.delete_sections(sections.clone()),
            Self::ReloadSections(sections) => sink.reload_sections(sections.clone()),
            Self::MoveSection { from, to } => sink.move_section(*from, *to),
            Self::FullReload => {
                sink.reload_all();
                sink.invalidate_layout();
            }
        }
    }

    /// Returns `true` for [`ViewUpdatePlan::FullReload`].
    pub fn is_full_reload(&self) -> bool {
        matches!(self, Self::FullReload)
    }

    /// The contiguous span of sections the plan touches, if bounded.
    pub fn affected_sections(&self) -> Option<Range<usize>> {
        match self {
            Self::InsertSections(sections)
            | Self::DeleteSections(sections)
            | Self::ReloadSections(sections) => Some(sections.clone()),
            Self::MoveSection { from, to } => Some(*from.min(to)..*from.max(to) + 1),
            Self::FullReload => None,
        }
    }

    /// Short name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsertSections(_) => "insert_sections",
            Self::DeleteSections(_) => "delete_sections",
            Self::ReloadSections(_) => "reload_sections",
            Self::MoveSection { .. } => "move_section",
            Self::FullReload => "full_reload",
        }
    }
}

impl fmt::Display for ViewUpdatePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertSections(r) => write!(f, "insert sections [{}, {})", r.start, r.end),
            Self::DeleteSections(r) => write!(f, "delete sections [{}, {})", r.start, r.end),
            Self::ReloadSections(r) => write!(f, "reload sections [{}, {})", r.start, r.end),
            Self::MoveSection { from, to } => write!(f, "move section {from} -> {to}"),
            Self::FullReload => write!(f, "full reload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CallLog(Mutex<Vec<String>>);

    impl ViewSink for CallLog {
        fn insert_sections(&self, s: Range<usize>) {
            self.0.lock().push(format!("insert {s:?}"));
        }
        fn delete_sections(&self, s: Range<usize>) {
            self.0.lock().push(format!("delete {s:?}"));
        }
        fn reload_sections(&self, s: Range<usize>) {
            self.0.lock().push(format!("reload {s:?}"));
        }
        fn move_section(&self, from: usize, to: usize) {
            self.0.lock().push(format!("move {from}->{to}"));
        }
        fn reload_all(&self) {
            self.0.lock().push("reload_all".into());
        }
        fn invalidate_layout(&self) {
            self.0.lock().push("invalidate".into());
        }
        fn section_count(&self) -> usize {
            0
        }
        fn is_attached_and_laid_out(&self) -> bool {
            true
        }
        fn has_visible_content(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_apply_dispatches_to_sink() {
        let sink = CallLog::default();
        ViewUpdatePlan::InsertSections(2..3).apply(&sink);
        ViewUpdatePlan::MoveSection { from: 4, to: 1 }.apply(&sink);
        ViewUpdatePlan::FullReload.apply(&sink);

        assert_eq!(
            *sink.0.lock(),
            vec!["insert 2..3", "move 4->1", "reload_all", "invalidate"]
        );
    }

    #[test]
    fn test_affected_sections() {
        assert_eq!(
            ViewUpdatePlan::MoveSection { from: 5, to: 2 }.affected_sections(),
            Some(2..6)
        );
        assert_eq!(ViewUpdatePlan::FullReload.affected_sections(), None);
        assert!(ViewUpdatePlan::FullReload.is_full_reload());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ViewUpdatePlan::ReloadSections(1..4).to_string(),
            "reload sections [1, 4)"
        );
        assert_eq!(ViewUpdatePlan::FullReload.kind(), "full_reload");
    }
}
