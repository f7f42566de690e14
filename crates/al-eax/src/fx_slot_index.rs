//! Optional FX-slot index (0..4)

use crate::error::{EaxError, EaxResult};
use crate::guids::{EAX40_FX_SLOT_IDS, EAX50_FX_SLOT_IDS};
use al_core::Guid;

/// Number of FX slots per context
pub const EAX_MAX_FX_SLOTS: usize = 4;

/// An FX-slot index that may be empty ("no slot")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FxSlotIndex(Option<usize>);

impl FxSlotIndex {
    pub const NONE: Self = Self(None);

    /// Index from a raw number; fails if out of range
    pub fn new(index: usize) -> EaxResult<Self> {
        if index < EAX_MAX_FX_SLOTS {
            Ok(Self(Some(index)))
        } else {
            Err(EaxError::Index(format!("FX slot index {index} out of range")))
        }
    }

    /// Resolve an FX-slot GUID (v4 or v5); anything else is empty
    pub fn from_guid(guid: &Guid) -> Self {
        let position = EAX40_FX_SLOT_IDS
            .iter()
            .position(|id| id == guid)
            .or_else(|| EAX50_FX_SLOT_IDS.iter().position(|id| id == guid));
        Self(position)
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn value(&self) -> Option<usize> {
        self.0
    }

    /// Index or an `Index` error
    pub fn get(&self) -> EaxResult<usize> {
        self.0
            .ok_or_else(|| EaxError::Index("FX slot index has no value".into()))
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }
}

impl From<usize> for FxSlotIndex {
    /// Out-of-range values become empty
    fn from(index: usize) -> Self {
        Self((index < EAX_MAX_FX_SLOTS).then_some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guids::*;

    #[test]
    fn test_from_guid() {
        assert_eq!(FxSlotIndex::from_guid(&EAXPROPERTYID_EAX40_FX_SLOT2).value(), Some(2));
        assert_eq!(FxSlotIndex::from_guid(&EAXPROPERTYID_EAX50_FX_SLOT3).value(), Some(3));
        assert!(!FxSlotIndex::from_guid(&EAX_NULL_GUID).has_value());
        assert!(!FxSlotIndex::from_guid(&EAX_PRIMARY_FX_SLOT_ID).has_value());
    }

    #[test]
    fn test_bounds() {
        assert!(FxSlotIndex::new(3).is_ok());
        assert!(FxSlotIndex::new(4).is_err());
        assert!(!FxSlotIndex::from(7).has_value());
        assert!(matches!(FxSlotIndex::NONE.get(), Err(EaxError::Index(_))));
    }
}
