//! Per-field dirty sets for committed/deferred state pairs

use std::fmt;
use std::marker::PhantomData;

/// A field that can be tracked in a `DirtySet`
pub trait DirtyField: Copy {
    /// Bit position, below 64
    fn bit(self) -> u32;
}

/// Declare a field enum usable with `DirtySet`
#[macro_export]
macro_rules! dirty_fields {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        $vis enum $name {
            $($variant),*
        }

        impl $crate::dirty::DirtyField for $name {
            #[inline]
            fn bit(self) -> u32 {
                self as u32
            }
        }
    };
}

/// Fixed-size bitset of fields whose deferred value differs from the committed one
pub struct DirtySet<F> {
    bits: u64,
    _field: PhantomData<F>,
}

impl<F: DirtyField> DirtySet<F> {
    pub const fn new() -> Self {
        Self {
            bits: 0,
            _field: PhantomData,
        }
    }

    /// Set or clear `field`
    #[inline]
    pub fn assign(&mut self, field: F, dirty: bool) {
        let mask = 1u64 << field.bit();
        if dirty {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
    }

    #[inline]
    pub fn insert(&mut self, field: F) {
        self.assign(field, true);
    }

    #[inline]
    pub fn contains(&self, field: F) -> bool {
        self.bits & (1u64 << field.bit()) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// True if any of `fields` is set
    pub fn contains_any(&self, fields: &[F]) -> bool {
        fields.iter().any(|&f| self.contains(f))
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Number of dirty fields
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }
}

impl<F: DirtyField> Default for DirtySet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Clone for DirtySet<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for DirtySet<F> {}

impl<F> PartialEq for DirtySet<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<F> Eq for DirtySet<F> {}

impl<F> fmt::Debug for DirtySet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirtySet({:#x})", self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::dirty_fields! {
        enum Field { A, B, C }
    }

    #[test]
    fn test_assign_and_clear() {
        let mut set = DirtySet::<Field>::new();
        assert!(set.is_empty());
        set.assign(Field::B, true);
        assert!(set.contains(Field::B));
        assert!(!set.contains(Field::A));
        assert!(set.contains_any(&[Field::A, Field::B]));
        set.insert(Field::C);
        assert_eq!(set.len(), 2);
        set.assign(Field::B, false);
        assert!(!set.contains(Field::B));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_structural_equality() {
        let mut a = DirtySet::<Field>::new();
        let mut b = DirtySet::<Field>::default();
        assert_eq!(a, b);
        a.insert(Field::A);
        assert_ne!(a, b);
        b.insert(Field::A);
        assert_eq!(a, b);
    }
}
