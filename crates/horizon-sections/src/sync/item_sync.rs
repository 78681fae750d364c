//! Item-level mirroring for a single group.
//!
//! Section-level changes are handled by the synchronizer itself. Changes a
//! group raises about its own items are handed to an [`ItemSync`] together
//! with the section the group currently occupies.

use std::sync::Arc;

use crate::model::{ChangeAction, ChangeNotification};
use crate::view::{ItemSink, ViewSink};

/// Receives the item-level changes of tracked groups.
///
/// Called on the serialization context, in the order each group raised its
/// changes.
pub trait ItemSync<T>: Send + Sync {
    /// The group shown at `section` raised `change`.
    fn items_changed(&self, section: usize, change: &ChangeNotification<T>);
}

impl<T, F> ItemSync<T> for F
where
    F: Fn(usize, &ChangeNotification<T>) + Send + Sync,
{
    fn items_changed(&self, section: usize, change: &ChangeNotification<T>) {
        self(section, change)
    }
}

/// Applies item-level changes to an [`ItemSink`] as row operations.
///
/// Changes without enough positional detail reload the whole section.
pub struct RowSync<S: ?Sized> {
    sink: Arc<S>,
}

impl<S: ItemSink + ?Sized> RowSync<S> {
    /// Create a row mapper over `sink`.
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// The wrapped sink.
    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }
}

impl<T, S: ItemSink + ?Sized> ItemSync<T> for RowSync<S> {
    fn items_changed(&self, section: usize, change: &ChangeNotification<T>) {
        let added = change.new_items().len();
        let removed = change.old_items().len();

        match (change.action(), change.old_start(), change.new_start()) {
            (ChangeAction::Add, _, Some(start)) if added > 0 => {
                self.sink.insert_items(section, start..start + added);
            }
            (ChangeAction::Remove, Some(start), _) if removed > 0 => {
                self.sink.delete_items(section, start..start + removed);
            }
            (ChangeAction::Replace, _, Some(start)) if added > 0 && added == removed => {
                self.sink.reload_items(section, start..start + added);
            }
            (ChangeAction::Move, Some(from), Some(to)) if added == 1 => {
                self.sink.move_item(section, from, to);
            }
            (ChangeAction::Move, Some(from), Some(to)) if added > 1 => {
                self.sink
                    .reload_items(section, from.min(to)..from.max(to) + added);
            }
            _ => self.sink.reload_section(section),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for RowSync<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowSync").finish_non_exhaustive()
    }
}

/// Reloads a group's whole section on any item change.
///
/// Used when no other [`ItemSync`] is configured. Changes that arrive
/// before the view is laid out, or for a section it does not show, are
/// skipped; the view reads fresh data when it catches up.
pub struct SectionReload {
    sink: Arc<dyn ViewSink>,
}

impl SectionReload {
    /// Create a section reloader over `sink`.
    pub fn new(sink: Arc<dyn ViewSink>) -> Self {
        Self { sink }
    }
}

impl<T> ItemSync<T> for SectionReload {
    fn items_changed(&self, section: usize, _change: &ChangeNotification<T>) {
        if self.sink.is_attached_and_laid_out() && section < self.sink.section_count() {
            self.sink.reload_sections(section..section + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::ops::Range;

    #[derive(Default)]
    struct RowLog(Mutex<Vec<String>>);

    impl ItemSink for RowLog {
        fn insert_items(&self, section: usize, rows: Range<usize>) {
            self.0.lock().push(format!("insert {section}:{rows:?}"));
        }
        fn delete_items(&self, section: usize, rows: Range<usize>) {
            self.0.lock().push(format!("delete {section}:{rows:?}"));
        }
        fn reload_items(&self, section: usize, rows: Range<usize>) {
            self.0.lock().push(format!("reload {section}:{rows:?}"));
        }
        fn move_item(&self, section: usize, from: usize, to: usize) {
            self.0.lock().push(format!("move {section}:{from}->{to}"));
        }
        fn reload_section(&self, section: usize) {
            self.0.lock().push(format!("reload {section}"));
        }
    }

    #[test]
    fn test_row_mapping() {
        let log = Arc::new(RowLog::default());
        let rows = RowSync::new(log.clone());

        rows.items_changed(1, &ChangeNotification::added(vec!['a', 'b'], Some(2)));
        rows.items_changed(1, &ChangeNotification::removed(vec!['a'], Some(0)));
        rows.items_changed(0, &ChangeNotification::replaced(vec!['x'], vec!['y'], Some(4)));
        rows.items_changed(0, &ChangeNotification::moved(vec!['m'], Some(3), Some(1)));
        rows.items_changed(2, &ChangeNotification::moved(vec!['m', 'n'], Some(0), Some(3)));

        assert_eq!(
            *log.0.lock(),
            vec![
                "insert 1:2..4",
                "delete 1:0..1",
                "reload 0:4..5",
                "move 0:3->1",
                "reload 2:0..5",
            ]
        );
    }

    #[test]
    fn test_row_mapping_falls_back_to_section_reload() {
        let log = Arc::new(RowLog::default());
        let rows = RowSync::new(log.clone());

        rows.items_changed(0, &ChangeNotification::<char>::reset());
        rows.items_changed(1, &ChangeNotification::removed(vec!['a'], None));
        rows.items_changed(2, &ChangeNotification::replaced(vec!['a'], vec![], Some(0)));

        assert_eq!(*log.0.lock(), vec!["reload 0", "reload 1", "reload 2"]);
    }

    #[test]
    fn test_closure_item_sync() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            move |section: usize, change: &ChangeNotification<u8>| {
                seen.lock().push((section, change.action()));
            }
        };
        sink.items_changed(3, &ChangeNotification::added(vec![1], Some(0)));
        assert_eq!(*seen.lock(), vec![(3, ChangeAction::Add)]);
    }
}
