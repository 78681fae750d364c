//! Identity comparison for items and groups.
//!
//! Index-of lookups locate *the* item, not an equal one. Shared handles
//! (`Arc<T>`) therefore compare by address. Plain values have no identity
//! beyond their value and compare with `==`.

use std::sync::Arc;

/// Identity equality used by index-of lookups.
pub trait Identity {
    /// Returns `true` if `self` and `other` denote the same item.
    fn same_identity(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    #[inline]
    fn same_identity(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(self), Arc::as_ptr(other))
    }
}

macro_rules! value_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                #[inline]
                fn same_identity(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_identity!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String,
    &'static str,
);
