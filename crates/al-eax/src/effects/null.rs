//! Null effect: the slot holds no effect

use crate::backend::{EffectId, EfxBackend, EfxEffectType};
use crate::call::PropertyCall;
use crate::error::{EaxError, EaxResult};

#[derive(Debug)]
pub struct NullEffect {
    effect: EffectId,
}

impl NullEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Null)?;
        Ok(Self { effect })
    }

    #[inline]
    pub fn effect_id(&self) -> EffectId {
        self.effect
    }

    /// Only property id 0 is accepted; there is nothing to get or set
    pub fn dispatch(&mut self, call: &mut PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            0 => Ok(()),
            id => Err(EaxError::protocol(format!("No effect loaded (property id {id})"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    #[test]
    fn test_only_none_accepted() {
        let mut backend = RecordingBackend::new();
        let mut effect = NullEffect::new(&mut backend).unwrap();
        let mut buf = [0u8; 4];
        assert!(effect.dispatch(&mut effect_get(0, &mut buf)).is_ok());
        assert!(effect.dispatch(&mut effect_set(2, &mut buf, false)).is_err());
        assert!(effect.dispatch(&mut effect_get(1, &mut buf)).is_err());
    }
}
