//! Range validation shared by every property owner

use crate::error::{EaxError, EaxResult};
use std::fmt::Display;

/// Fail with a validation error naming `owner`/`field` unless `min <= value <= max`.
///
/// NaN never passes.
pub fn validate_range<T>(owner: &'static str, field: &'static str, value: T, min: T, max: T) -> EaxResult<()>
where
    T: PartialOrd + Display + Copy,
{
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(EaxError::validation(
            owner,
            field,
            format!("value {value} out of range [{min}, {max}]"),
        ))
    }
}

/// Fail unless `flags` only uses bits outside `reserved`
pub fn validate_flags(owner: &'static str, field: &'static str, flags: u32, reserved: u32) -> EaxResult<()> {
    if flags & reserved == 0 {
        Ok(())
    } else {
        Err(EaxError::validation(
            owner,
            field,
            format!("flags {flags:#x} use reserved bits {reserved:#x}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        assert!(validate_range("Echo", "Delay", 0.1_f32, 0.002, 0.207).is_ok());
        assert!(validate_range("Echo", "Delay", 0.002_f32, 0.002, 0.207).is_ok());
        assert!(validate_range("Echo", "Delay", 0.3_f32, 0.002, 0.207).is_err());
        assert!(validate_range("Echo", "Delay", f32::NAN, 0.002, 0.207).is_err());
        assert!(validate_range("Source", "Direct", -10_001, -10_000, 1_000).is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = validate_range("Chorus", "Phase", 200, -180, 180).unwrap_err();
        match err {
            EaxError::Validation { owner, field, .. } => {
                assert_eq!(owner, "Chorus");
                assert_eq!(field, "Phase");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_flags() {
        assert!(validate_flags("Source", "Flags", 0x7, 0xFFFF_FFF8).is_ok());
        assert!(validate_flags("Source", "Flags", 0x8, 0xFFFF_FFF8).is_err());
        assert!(validate_flags("Source", "Flags", 0x8, 0xFFFF_FFF0).is_ok());
    }
}
