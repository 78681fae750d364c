//! Change notifications raised by observable collections.
//!
//! A [`ChangeNotification`] describes one atomic mutation in data terms: what
//! happened, which items were involved, and (when the source knows it) where.
//! Positions are optional. Sources that cannot report a position leave it as
//! `None`, and consumers must not guess.

use crate::error::{Result, SyncError};

/// The kind of mutation a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Items were inserted.
    Add,
    /// Items were removed.
    Remove,
    /// Items were replaced in place.
    Replace,
    /// Items were moved to another position.
    Move,
    /// The collection changed so much that every assumption is void.
    Reset,
}

impl ChangeAction {
    /// Decode a numeric action code (0 = Add, 1 = Remove, 2 = Replace,
    /// 3 = Move, 4 = Reset).
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Add),
            1 => Ok(Self::Remove),
            2 => Ok(Self::Replace),
            3 => Ok(Self::Move),
            4 => Ok(Self::Reset),
            other => Err(SyncError::UnknownAction(other)),
        }
    }

    /// The numeric code for this action.
    pub fn code(self) -> i32 {
        match self {
            Self::Add => 0,
            Self::Remove => 1,
            Self::Replace => 2,
            Self::Move => 3,
            Self::Reset => 4,
        }
    }
}

impl TryFrom<i32> for ChangeAction {
    type Error = SyncError;

    fn try_from(code: i32) -> Result<Self> {
        Self::from_code(code)
    }
}

/// One atomic mutation of an observed collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeNotification<T> {
    action: ChangeAction,
    new_items: Vec<T>,
    old_items: Vec<T>,
    new_start: Option<usize>,
    old_start: Option<usize>,
}

impl<T> ChangeNotification<T> {
    /// `items` were inserted starting at `start`.
    pub fn added(items: Vec<T>, start: Option<usize>) -> Self {
        Self {
            action: ChangeAction::Add,
            new_items: items,
            old_items: Vec::new(),
            new_start: start,
            old_start: None,
        }
    }

    /// `items` were removed from `start`.
    pub fn removed(items: Vec<T>, start: Option<usize>) -> Self {
        Self {
            action: ChangeAction::Remove,
            new_items: Vec::new(),
            old_items: items,
            new_start: None,
            old_start: start,
        }
    }

    /// `old_items` at `start` were replaced by `new_items`.
    pub fn replaced(new_items: Vec<T>, old_items: Vec<T>, start: Option<usize>) -> Self {
        Self {
            action: ChangeAction::Replace,
            new_items,
            old_items,
            new_start: start,
            old_start: start,
        }
    }

    /// `items` moved from `old_start` to `new_start`.
    pub fn moved(items: Vec<T>, old_start: Option<usize>, new_start: Option<usize>) -> Self
    where
        T: Clone,
    {
        Self {
            action: ChangeAction::Move,
            old_items: items.clone(),
            new_items: items,
            new_start,
            old_start,
        }
    }

    /// The collection was reset.
    pub fn reset() -> Self {
        Self {
            action: ChangeAction::Reset,
            new_items: Vec::new(),
            old_items: Vec::new(),
            new_start: None,
            old_start: None,
        }
    }

    /// Build a notification from host-style raw values.
    ///
    /// Negative positions mean "unknown". Fails for unknown action codes.
    pub fn from_raw(
        action_code: i32,
        new_items: Vec<T>,
        old_items: Vec<T>,
        new_start: isize,
        old_start: isize,
    ) -> Result<Self> {
        Ok(Self {
            action: ChangeAction::from_code(action_code)?,
            new_items,
            old_items,
            new_start: usize::try_from(new_start).ok(),
            old_start: usize::try_from(old_start).ok(),
        })
    }

    /// The kind of mutation.
    pub fn action(&self) -> ChangeAction {
        self.action
    }

    /// Items present after the change.
    pub fn new_items(&self) -> &[T] {
        &self.new_items
    }

    /// Items present before the change.
    pub fn old_items(&self) -> &[T] {
        &self.old_items
    }

    /// Position of the first new item, if known.
    pub fn new_start(&self) -> Option<usize> {
        self.new_start
    }

    /// Position of the first old item, if known.
    pub fn old_start(&self) -> Option<usize> {
        self.old_start
    }

    /// Host-style new start (`-1` when unknown).
    pub fn new_starting_index(&self) -> isize {
        self.new_start.map_or(-1, |start| start as isize)
    }

    /// Host-style old start (`-1` when unknown).
    pub fn old_starting_index(&self) -> isize {
        self.old_start.map_or(-1, |start| start as isize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes() {
        for action in [
            ChangeAction::Add,
            ChangeAction::Remove,
            ChangeAction::Replace,
            ChangeAction::Move,
            ChangeAction::Reset,
        ] {
            assert_eq!(ChangeAction::from_code(action.code()).unwrap(), action);
        }
        assert!(matches!(
            ChangeAction::try_from(17),
            Err(SyncError::UnknownAction(17))
        ));
    }

    #[test]
    fn test_from_raw_maps_negative_positions_to_unknown() {
        let change = ChangeNotification::from_raw(1, vec![], vec!["a"], -1, -1).unwrap();
        assert_eq!(change.action(), ChangeAction::Remove);
        assert_eq!(change.old_start(), None);
        assert_eq!(change.old_starting_index(), -1);

        let change = ChangeNotification::from_raw(0, vec!["a"], vec![], 4, -1).unwrap();
        assert_eq!(change.new_start(), Some(4));
        assert_eq!(change.new_starting_index(), 4);
    }

    #[test]
    fn test_from_raw_rejects_unknown_action() {
        let result = ChangeNotification::<u32>::from_raw(5, vec![], vec![], 0, 0);
        assert!(matches!(result, Err(SyncError::UnknownAction(5))));
    }

    #[test]
    fn test_moved_carries_items_on_both_sides() {
        let change = ChangeNotification::moved(vec![1, 2], Some(0), Some(3));
        assert_eq!(change.new_items(), &[1, 2]);
        assert_eq!(change.old_items(), &[1, 2]);
        assert_eq!(change.old_start(), Some(0));
        assert_eq!(change.new_start(), Some(3));
    }
}
