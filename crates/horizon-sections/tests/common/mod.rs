//! Shared test view that mirrors the model the way a real sectioned view would.
#![allow(dead_code)]

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use horizon_sections::{Group, GroupCollection, Identity, ItemSink, ViewSink};

/// A view that keeps its own list of sections and re-reads groups from the
/// model only when told to.
pub struct MirrorView {
    model: GroupCollection<u32>,
    sections: Mutex<Vec<Group<u32>>>,
    attached: AtomicBool,
    visible: AtomicBool,
    calls: Mutex<Vec<String>>,
    rows: Mutex<Vec<String>>,
}

impl MirrorView {
    /// A laid-out view showing the model's current groups.
    pub fn new(model: &GroupCollection<u32>) -> Arc<Self> {
        Arc::new(Self {
            sections: Mutex::new(model.snapshot()),
            model: model.clone(),
            attached: AtomicBool::new(true),
            visible: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
            rows: Mutex::new(Vec::new()),
        })
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }

    /// Whether the view shows exactly the model's groups, in order.
    pub fn matches_model(&self) -> bool {
        let sections = self.sections.lock();
        let groups = self.model.snapshot();
        sections.len() == groups.len()
            && sections
                .iter()
                .zip(groups.iter())
                .all(|(shown, actual)| shown.same_identity(actual))
    }

    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn take_rows(&self) -> Vec<String> {
        std::mem::take(&mut *self.rows.lock())
    }

    fn group(&self, section: usize) -> Group<u32> {
        self.model
            .item_at(section)
            .expect("view asked for a section the model does not have")
    }
}

impl ViewSink for MirrorView {
    fn insert_sections(&self, range: Range<usize>) {
        self.calls.lock().push(format!("insert {range:?}"));
        let mut sections = self.sections.lock();
        for section in range {
            sections.insert(section, self.group(section));
        }
    }

    fn delete_sections(&self, range: Range<usize>) {
        self.calls.lock().push(format!("delete {range:?}"));
        self.sections.lock().drain(range);
    }

    fn reload_sections(&self, range: Range<usize>) {
        self.calls.lock().push(format!("reload {range:?}"));
        let mut sections = self.sections.lock();
        for section in range {
            sections[section] = self.group(section);
        }
    }

    fn move_section(&self, from: usize, to: usize) {
        self.calls.lock().push(format!("move {from}->{to}"));
        let mut sections = self.sections.lock();
        let group = sections.remove(from);
        sections.insert(to, group);
    }

    fn reload_all(&self) {
        self.calls.lock().push("reload_all".into());
        *self.sections.lock() = self.model.snapshot();
    }

    fn invalidate_layout(&self) {
        self.calls.lock().push("invalidate".into());
    }

    fn section_count(&self) -> usize {
        self.sections.lock().len()
    }

    fn is_attached_and_laid_out(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn has_visible_content(&self) -> bool {
        self.visible.load(Ordering::SeqCst) && !self.sections.lock().is_empty()
    }
}

impl ItemSink for MirrorView {
    fn insert_items(&self, section: usize, rows: Range<usize>) {
        self.rows.lock().push(format!("insert {section}:{rows:?}"));
    }

    fn delete_items(&self, section: usize, rows: Range<usize>) {
        self.rows.lock().push(format!("delete {section}:{rows:?}"));
    }

    fn reload_items(&self, section: usize, rows: Range<usize>) {
        self.rows.lock().push(format!("reload {section}:{rows:?}"));
    }

    fn move_item(&self, section: usize, from: usize, to: usize) {
        self.rows.lock().push(format!("move {section}:{from}->{to}"));
    }

    fn reload_section(&self, section: usize) {
        self.rows.lock().push(format!("reload {section}"));
    }
}

/// Opt into log output with `RUST_LOG=horizon_sections=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
