//! Pitch shifter effect

use super::{set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "PitchShifter";

pub const EAXPITCHSHIFTER_NONE: u32 = 0;
pub const EAXPITCHSHIFTER_ALLPARAMETERS: u32 = 1;
pub const EAXPITCHSHIFTER_COARSETUNE: u32 = 2;
pub const EAXPITCHSHIFTER_FINETUNE: u32 = 3;

pub const EAXPITCHSHIFTER_MINCOARSETUNE: i32 = -12;
pub const EAXPITCHSHIFTER_MAXCOARSETUNE: i32 = 12;
pub const EAXPITCHSHIFTER_DEFAULTCOARSETUNE: i32 = 12;

pub const EAXPITCHSHIFTER_MINFINETUNE: i32 = -50;
pub const EAXPITCHSHIFTER_MAXFINETUNE: i32 = 50;
pub const EAXPITCHSHIFTER_DEFAULTFINETUNE: i32 = 0;

const AL_PITCH_SHIFTER_MIN_COARSETUNE: i32 = -12;
const AL_PITCH_SHIFTER_MAX_COARSETUNE: i32 = 12;
const AL_PITCH_SHIFTER_MIN_FINETUNE: i32 = -50;
const AL_PITCH_SHIFTER_MAX_FINETUNE: i32 = 50;

/// EAX pitchshifter properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PitchShifterProperties {
    /// Semitones
    pub coarse_tune: i32,
    /// Cents
    pub fine_tune: i32,
}

impl Default for PitchShifterProperties {
    fn default() -> Self {
        Self {
            coarse_tune: EAXPITCHSHIFTER_DEFAULTCOARSETUNE,
            fine_tune: EAXPITCHSHIFTER_DEFAULTFINETUNE,
        }
    }
}

crate::dirty_fields! {
    enum PitchShifterField {
        CoarseTune,
        FineTune,
    }
}

#[derive(Debug)]
pub struct PitchShifterEffect {
    effect: EffectId,
    eax: PitchShifterProperties,
    eax_d: PitchShifterProperties,
    dirty: DirtySet<PitchShifterField>,
}

impl PitchShifterEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::PitchShifter)?;
        let this = Self {
            effect,
            eax: PitchShifterProperties::default(),
            eax_d: PitchShifterProperties::default(),
            dirty: DirtySet::new(),
        };
        this.set_efx_all(backend)?;
        Ok(this)
    }

    #[inline]
    pub fn effect_id(&self) -> EffectId {
        self.effect
    }

    /// Committed properties
    pub fn properties(&self) -> &PitchShifterProperties {
        &self.eax
    }

    pub fn dispatch(
        &mut self,
        call: &mut PropertyCall<'_>,
        backend: &mut dyn EfxBackend,
        slot: EffectSlotId,
    ) -> EaxResult<()> {
        if call.is_get() {
            return self.get(call);
        }
        self.set(call)?;
        if !call.is_deferred() {
            self.apply_deferred(backend, slot)?;
        }
        Ok(())
    }

    fn get(&self, call: &mut PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXPITCHSHIFTER_NONE => Ok(()),
            EAXPITCHSHIFTER_ALLPARAMETERS => call.set_value(&self.eax),
            EAXPITCHSHIFTER_COARSETUNE => call.set_value(&self.eax.coarse_tune),
            EAXPITCHSHIFTER_FINETUNE => call.set_value(&self.eax.fine_tune),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXPITCHSHIFTER_NONE => Ok(()),
            EAXPITCHSHIFTER_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXPITCHSHIFTER_COARSETUNE => self.defer_coarse_tune(call.get_value()?),
            EAXPITCHSHIFTER_FINETUNE => self.defer_fine_tune(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_coarse_tune(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "CoarseTune", value, EAXPITCHSHIFTER_MINCOARSETUNE, EAXPITCHSHIFTER_MAXCOARSETUNE)
    }

    fn validate_fine_tune(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "FineTune", value, EAXPITCHSHIFTER_MINFINETUNE, EAXPITCHSHIFTER_MAXFINETUNE)
    }

    fn validate_all(props: &PitchShifterProperties) -> EaxResult<()> {
        Self::validate_coarse_tune(props.coarse_tune)?;
        Self::validate_fine_tune(props.fine_tune)?;
        Ok(())
    }

    fn defer_coarse_tune(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_coarse_tune(value)?;
        self.eax_d.coarse_tune = value;
        self.dirty.assign(PitchShifterField::CoarseTune, self.eax.coarse_tune != self.eax_d.coarse_tune);
        Ok(())
    }

    fn defer_fine_tune(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_fine_tune(value)?;
        self.eax_d.fine_tune = value;
        self.dirty.assign(PitchShifterField::FineTune, self.eax.fine_tune != self.eax_d.fine_tune);
        Ok(())
    }

    fn defer_all(&mut self, props: &PitchShifterProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_coarse_tune(props.coarse_tune)?;
        self.defer_fine_tune(props.fine_tune)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(PitchShifterField::CoarseTune) {
            self.set_efx_coarse_tune(backend)?;
        }

        if self.dirty.contains(PitchShifterField::FineTune) {
            self.set_efx_fine_tune(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_coarse_tune(backend)?;
        self.set_efx_fine_tune(backend)?;
        Ok(())
    }

    fn set_efx_coarse_tune(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::PitchShifterCoarseTune,
            self.eax.coarse_tune,
            AL_PITCH_SHIFTER_MIN_COARSETUNE,
            AL_PITCH_SHIFTER_MAX_COARSETUNE,
        )
    }

    fn set_efx_fine_tune(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::PitchShifterFineTune,
            self.eax.fine_tune,
            AL_PITCH_SHIFTER_MIN_FINETUNE,
            AL_PITCH_SHIFTER_MAX_FINETUNE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, PitchShifterEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = PitchShifterEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut PitchShifterEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> PitchShifterProperties {
        let mut buf = [0u8; size_of::<PitchShifterProperties>()];
        effect.dispatch(&mut effect_get(EAXPITCHSHIFTER_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), PitchShifterProperties::default());
    }

    #[test]
    fn test_set_coarse_tune_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&-5_i32).to_vec();
        effect.dispatch(&mut effect_set(EAXPITCHSHIFTER_COARSETUNE, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().coarse_tune, -5_i32);
        assert_eq!(backend.slot_param(slot, EfxParam::PitchShifterCoarseTune), Some(EfxValue::Int(-5)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&-5_i32).to_vec();
        effect.dispatch(&mut effect_set(EAXPITCHSHIFTER_COARSETUNE, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).coarse_tune, EAXPITCHSHIFTER_DEFAULTCOARSETUNE);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).coarse_tune, -5_i32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&13_i32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXPITCHSHIFTER_COARSETUNE, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().coarse_tune, EAXPITCHSHIFTER_DEFAULTCOARSETUNE);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = PitchShifterProperties {
            coarse_tune: -5_i32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXPITCHSHIFTER_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
