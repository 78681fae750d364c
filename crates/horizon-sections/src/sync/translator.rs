//! Translation of group-collection changes into view update plans.
//!
//! The translator is a pure function of the notification, the view state
//! captured just before the change is applied, and the group collection in
//! its post-change state. It never touches the view itself.
//!
//! | Change                  | Plan                                          |
//! |-------------------------|-----------------------------------------------|
//! | Add                     | `InsertSections(start..start + n)`            |
//! | Remove, start known     | `DeleteSections(start..start + n)`            |
//! | Replace, equal sizes    | `ReloadSections(start..start + n)`            |
//! | Replace, unequal sizes  | `FullReload`                                  |
//! | Move, one item          | `MoveSection { from, to }`                    |
//! | Move, `n` items         | `ReloadSections(min..max + n)`                |
//! | Reset                   | `FullReload`                                  |
//!
//! Any change arriving while the view is not safely mutable, and any change
//! whose positions cannot be resolved, becomes `FullReload`. So does a change
//! whose size delta does not carry the view's section count to the
//! collection's current count: the view and the collection are out of step,
//! and no incremental update can be trusted.

use horizon_sections_core::logging::targets;

use crate::config::SyncConfig;
use crate::model::{ChangeAction, ChangeNotification, Group, GroupCollection, Identity};
use crate::view::{ViewState, ViewUpdatePlan};

/// Maps one group-collection change to one view update plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeTranslator {
    require_visible_content: bool,
}

impl Default for ChangeTranslator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ChangeTranslator {
    /// Create a translator. When `require_visible_content` is set, a view
    /// without realized cells only receives full reloads.
    pub fn new(require_visible_content: bool) -> Self {
        Self {
            require_visible_content,
        }
    }

    /// Create a translator from synchronizer settings.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.require_visible_content)
    }

    /// Whether an empty viewport forces a full reload.
    pub fn require_visible_content(&self) -> bool {
        self.require_visible_content
    }

    /// Choose the plan for `change`.
    ///
    /// `view` is the state before the change is applied to the view, and
    /// `groups` is the collection after the change.
    pub fn translate<T>(
        &self,
        change: &ChangeNotification<Group<T>>,
        view: ViewState,
        groups: &GroupCollection<T>,
    ) -> ViewUpdatePlan
    where
        T: Clone + Identity + 'static,
    {
        if let Some(reason) = view.unsafe_reason(self.require_visible_content) {
            return degrade(change.action(), reason);
        }

        let shown = view.section_count;
        if change.action() != ChangeAction::Reset {
            let (added, removed) = section_delta(change);
            if shown + added != groups.count() + removed {
                return degrade(change.action(), "view and collection out of step");
            }
        }

        match change.action() {
            ChangeAction::Add => {
                let count = change.new_items().len();
                if count == 0 {
                    return degrade(ChangeAction::Add, "no items");
                }
                let Some(start) = resolve_new_start(change, groups) else {
                    return degrade(ChangeAction::Add, "unknown position");
                };
                if start > shown {
                    return degrade(ChangeAction::Add, "position beyond shown sections");
                }
                ViewUpdatePlan::InsertSections(start..start + count)
            }
            ChangeAction::Remove => {
                let count = change.old_items().len();
                if count == 0 {
                    return degrade(ChangeAction::Remove, "no items");
                }
                let Some(start) = change.old_start() else {
                    return degrade(ChangeAction::Remove, "unknown position");
                };
                if start + count > shown {
                    return degrade(ChangeAction::Remove, "range beyond shown sections");
                }
                ViewUpdatePlan::DeleteSections(start..start + count)
            }
            ChangeAction::Replace => {
                let count = change.new_items().len();
                if count != change.old_items().len() {
                    return degrade(ChangeAction::Replace, "item counts differ");
                }
                if count == 0 {
                    return degrade(ChangeAction::Replace, "no items");
                }
                let Some(start) = resolve_new_start(change, groups).or(change.old_start()) else {
                    return degrade(ChangeAction::Replace, "unknown position");
                };
                if start + count > shown {
                    return degrade(ChangeAction::Replace, "range beyond shown sections");
                }
                ViewUpdatePlan::ReloadSections(start..start + count)
            }
            ChangeAction::Move => {
                let count = change.new_items().len();
                if count == 0 {
                    return degrade(ChangeAction::Move, "no items");
                }
                let (Some(from), Some(to)) = (change.old_start(), resolve_new_start(change, groups))
                else {
                    return degrade(ChangeAction::Move, "unknown position");
                };
                let end = from.max(to) + count;
                if end > shown {
                    return degrade(ChangeAction::Move, "range beyond shown sections");
                }
                if count == 1 {
                    ViewUpdatePlan::MoveSection { from, to }
                } else {
                    ViewUpdatePlan::ReloadSections(from.min(to)..end)
                }
            }
            ChangeAction::Reset => ViewUpdatePlan::FullReload,
        }
    }
}

/// The reported new start, or the post-change position of the first new item.
fn resolve_new_start<T>(
    change: &ChangeNotification<Group<T>>,
    groups: &GroupCollection<T>,
) -> Option<usize>
where
    T: Clone + Identity + 'static,
{
    change
        .new_start()
        .or_else(|| change.new_items().first().and_then(|group| groups.index_of(group)))
}

/// Sections the change adds to and removes from the view.
fn section_delta<T>(change: &ChangeNotification<Group<T>>) -> (usize, usize) {
    match change.action() {
        ChangeAction::Add => (change.new_items().len(), 0),
        ChangeAction::Remove => (0, change.old_items().len()),
        ChangeAction::Replace => (change.new_items().len(), change.old_items().len()),
        ChangeAction::Move | ChangeAction::Reset => (0, 0),
    }
}

fn degrade(action: ChangeAction, reason: &'static str) -> ViewUpdatePlan {
    tracing::debug!(target: targets::TRANSLATOR, ?action, reason, "falling back to full reload");
    ViewUpdatePlan::FullReload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Collection;

    fn group(items: &[u32]) -> Group<u32> {
        Collection::from_vec(items.to_vec())
    }

    fn collection(groups: &[Group<u32>]) -> GroupCollection<u32> {
        Collection::from_vec(groups.to_vec())
    }

    #[test]
    fn test_add_with_known_position() {
        let (g0, g1, g2) = (group(&[1, 2, 3]), group(&[4, 5]), group(&[6]));
        let after = collection(&[g0, g1, g2.clone()]);
        let plan = ChangeTranslator::default().translate(
            &ChangeNotification::added(vec![g2], Some(2)),
            ViewState::ready(2),
            &after,
        );
        assert_eq!(plan, ViewUpdatePlan::InsertSections(2..3));
    }

    #[test]
    fn test_add_resolves_position_by_identity() {
        let (g0, g1) = (group(&[1]), group(&[2]));
        let after = collection(&[g1.clone(), g0]);
        let plan = ChangeTranslator::default().translate(
            &ChangeNotification::added(vec![g1], None),
            ViewState::ready(1),
            &after,
        );
        assert_eq!(plan, ViewUpdatePlan::InsertSections(0..1));
    }

    #[test]
    fn test_add_of_unknown_group_degrades() {
        let after = collection(&[group(&[1]), group(&[2])]);
        let plan = ChangeTranslator::default().translate(
            &ChangeNotification::added(vec![group(&[9])], None),
            ViewState::ready(1),
            &after,
        );
        assert!(plan.is_full_reload());
    }

    #[test]
    fn test_view_behind_collection_degrades() {
        // The collection already holds a later push the view has not seen.
        let (g0, g1, g2) = (group(&[1]), group(&[2]), group(&[3]));
        let after = collection(&[g0, g1.clone(), g2]);
        let translator = ChangeTranslator::default();

        let plan = translator.translate(
            &ChangeNotification::added(vec![g1.clone()], Some(1)),
            ViewState::ready(1),
            &after,
        );
        assert!(plan.is_full_reload());

        // A cleared collection cannot host an earlier push.
        let plan = translator.translate(
            &ChangeNotification::added(vec![g1], Some(1)),
            ViewState::ready(1),
            &collection(&[]),
        );
        assert!(plan.is_full_reload());

        let plan = translator.translate(
            &ChangeNotification::removed(vec![group(&[4])], Some(0)),
            ViewState::ready(3),
            &after,
        );
        assert!(plan.is_full_reload());
    }

    #[test]
    fn test_remove_requires_position() {
        let g0 = group(&[1]);
        let after = collection(&[g0.clone()]);
        let translator = ChangeTranslator::default();

        let plan = translator.translate(
            &ChangeNotification::removed(vec![group(&[2])], Some(1)),
            ViewState::ready(2),
            &after,
        );
        assert_eq!(plan, ViewUpdatePlan::DeleteSections(1..2));

        let plan = translator.translate(
            &ChangeNotification::removed(vec![group(&[2])], None),
            ViewState::ready(2),
            &after,
        );
        assert!(plan.is_full_reload());
    }

    #[test]
    fn test_replace_sizes() {
        let (g0, g1) = (group(&[1]), group(&[2]));
        let after = collection(&[g0.clone(), g1.clone()]);
        let translator = ChangeTranslator::default();

        let plan = translator.translate(
            &ChangeNotification::replaced(vec![g1.clone()], vec![group(&[7])], Some(1)),
            ViewState::ready(2),
            &after,
        );
        assert_eq!(plan, ViewUpdatePlan::ReloadSections(1..2));

        let plan = translator.translate(
            &ChangeNotification::replaced(vec![g0, g1], vec![group(&[7])], Some(0)),
            ViewState::ready(1),
            &after,
        );
        assert!(plan.is_full_reload());
    }

    #[test]
    fn test_move_single_and_multi() {
        let groups: Vec<Group<u32>> = (0..5).map(|n| group(&[n])).collect();
        let after = collection(&groups);
        let translator = ChangeTranslator::default();

        let plan = translator.translate(
            &ChangeNotification::moved(vec![groups[3].clone()], Some(0), Some(3)),
            ViewState::ready(5),
            &after,
        );
        assert_eq!(plan, ViewUpdatePlan::MoveSection { from: 0, to: 3 });

        let plan = translator.translate(
            &ChangeNotification::moved(groups[1..3].to_vec(), Some(3), Some(1)),
            ViewState::ready(5),
            &after,
        );
        assert_eq!(plan, ViewUpdatePlan::ReloadSections(1..5));

        let plan = translator.translate(
            &ChangeNotification::moved(vec![groups[0].clone()], None, Some(0)),
            ViewState::ready(5),
            &after,
        );
        assert!(plan.is_full_reload());
    }

    #[test]
    fn test_reset_always_reloads() {
        let after = collection(&[group(&[1])]);
        let plan = ChangeTranslator::default().translate(
            &ChangeNotification::reset(),
            ViewState::ready(1),
            &after,
        );
        assert_eq!(plan, ViewUpdatePlan::FullReload);
    }

    #[test]
    fn test_guard_forces_full_reload() {
        let g0 = group(&[1]);
        let after = collection(&[g0.clone()]);
        let change = ChangeNotification::replaced(vec![g0], vec![group(&[2])], Some(0));
        let invisible = ViewState {
            has_visible_content: false,
            ..ViewState::ready(1)
        };

        assert!(ChangeTranslator::new(true)
            .translate(&change, invisible, &after)
            .is_full_reload());
        assert_eq!(
            ChangeTranslator::new(false).translate(&change, invisible, &after),
            ViewUpdatePlan::ReloadSections(0..1)
        );

        let detached = ViewState {
            attached: false,
            ..ViewState::ready(1)
        };
        assert!(ChangeTranslator::new(false)
            .translate(&change, detached, &after)
            .is_full_reload());
    }
}
