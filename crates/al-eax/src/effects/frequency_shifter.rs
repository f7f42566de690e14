//! Frequency shifter effect

use super::{set_efx_float, set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "FrequencyShifter";

pub const EAXFREQUENCYSHIFTER_NONE: u32 = 0;
pub const EAXFREQUENCYSHIFTER_ALLPARAMETERS: u32 = 1;
pub const EAXFREQUENCYSHIFTER_FREQUENCY: u32 = 2;
pub const EAXFREQUENCYSHIFTER_LEFTDIRECTION: u32 = 3;
pub const EAXFREQUENCYSHIFTER_RIGHTDIRECTION: u32 = 4;

pub const EAX_FREQUENCYSHIFTER_DOWN: u32 = 0;
pub const EAX_FREQUENCYSHIFTER_UP: u32 = 1;
pub const EAX_FREQUENCYSHIFTER_OFF: u32 = 2;

pub const EAXFREQUENCYSHIFTER_MINFREQUENCY: f32 = 0.0;
pub const EAXFREQUENCYSHIFTER_MAXFREQUENCY: f32 = 24000.0;
pub const EAXFREQUENCYSHIFTER_DEFAULTFREQUENCY: f32 = 0.0;

pub const EAXFREQUENCYSHIFTER_MINLEFTDIRECTION: u32 = 0;
pub const EAXFREQUENCYSHIFTER_MAXLEFTDIRECTION: u32 = 2;
pub const EAXFREQUENCYSHIFTER_DEFAULTLEFTDIRECTION: u32 = EAX_FREQUENCYSHIFTER_DOWN;

pub const EAXFREQUENCYSHIFTER_MINRIGHTDIRECTION: u32 = 0;
pub const EAXFREQUENCYSHIFTER_MAXRIGHTDIRECTION: u32 = 2;
pub const EAXFREQUENCYSHIFTER_DEFAULTRIGHTDIRECTION: u32 = EAX_FREQUENCYSHIFTER_DOWN;

const AL_FREQUENCY_SHIFTER_MIN_FREQUENCY: f32 = 0.0;
const AL_FREQUENCY_SHIFTER_MAX_FREQUENCY: f32 = 24000.0;
const AL_FREQUENCY_SHIFTER_MIN_LEFTDIRECTION: i32 = 0;
const AL_FREQUENCY_SHIFTER_MAX_LEFTDIRECTION: i32 = 2;
const AL_FREQUENCY_SHIFTER_MIN_RIGHTDIRECTION: i32 = 0;
const AL_FREQUENCY_SHIFTER_MAX_RIGHTDIRECTION: i32 = 2;

/// EAX frequencyshifter properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrequencyShifterProperties {
    /// Shift amount, Hz
    pub frequency: f32,
    /// Shift direction for the left channel
    pub left_direction: u32,
    /// Shift direction for the right channel
    pub right_direction: u32,
}

impl Default for FrequencyShifterProperties {
    fn default() -> Self {
        Self {
            frequency: EAXFREQUENCYSHIFTER_DEFAULTFREQUENCY,
            left_direction: EAXFREQUENCYSHIFTER_DEFAULTLEFTDIRECTION,
            right_direction: EAXFREQUENCYSHIFTER_DEFAULTRIGHTDIRECTION,
        }
    }
}

crate::dirty_fields! {
    enum FrequencyShifterField {
        Frequency,
        LeftDirection,
        RightDirection,
    }
}

#[derive(Debug)]
pub struct FrequencyShifterEffect {
    effect: EffectId,
    eax: FrequencyShifterProperties,
    eax_d: FrequencyShifterProperties,
    dirty: DirtySet<FrequencyShifterField>,
}

impl FrequencyShifterEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::FrequencyShifter)?;
        let this = Self {
            effect,
            eax: FrequencyShifterProperties::default(),
            eax_d: FrequencyShifterProperties::default(),
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
    pub fn properties(&self) -> &FrequencyShifterProperties {
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
            EAXFREQUENCYSHIFTER_NONE => Ok(()),
            EAXFREQUENCYSHIFTER_ALLPARAMETERS => call.set_value(&self.eax),
            EAXFREQUENCYSHIFTER_FREQUENCY => call.set_value(&self.eax.frequency),
            EAXFREQUENCYSHIFTER_LEFTDIRECTION => call.set_value(&self.eax.left_direction),
            EAXFREQUENCYSHIFTER_RIGHTDIRECTION => call.set_value(&self.eax.right_direction),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXFREQUENCYSHIFTER_NONE => Ok(()),
            EAXFREQUENCYSHIFTER_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXFREQUENCYSHIFTER_FREQUENCY => self.defer_frequency(call.get_value()?),
            EAXFREQUENCYSHIFTER_LEFTDIRECTION => self.defer_left_direction(call.get_value()?),
            EAXFREQUENCYSHIFTER_RIGHTDIRECTION => self.defer_right_direction(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_frequency(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Frequency", value, EAXFREQUENCYSHIFTER_MINFREQUENCY, EAXFREQUENCYSHIFTER_MAXFREQUENCY)
    }

    fn validate_left_direction(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "LeftDirection", value, EAXFREQUENCYSHIFTER_MINLEFTDIRECTION, EAXFREQUENCYSHIFTER_MAXLEFTDIRECTION)
    }

    fn validate_right_direction(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "RightDirection", value, EAXFREQUENCYSHIFTER_MINRIGHTDIRECTION, EAXFREQUENCYSHIFTER_MAXRIGHTDIRECTION)
    }

    fn validate_all(props: &FrequencyShifterProperties) -> EaxResult<()> {
        Self::validate_frequency(props.frequency)?;
        Self::validate_left_direction(props.left_direction)?;
        Self::validate_right_direction(props.right_direction)?;
        Ok(())
    }

    fn defer_frequency(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_frequency(value)?;
        self.eax_d.frequency = value;
        self.dirty.assign(FrequencyShifterField::Frequency, self.eax.frequency != self.eax_d.frequency);
        Ok(())
    }

    fn defer_left_direction(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_left_direction(value)?;
        self.eax_d.left_direction = value;
        self.dirty.assign(FrequencyShifterField::LeftDirection, self.eax.left_direction != self.eax_d.left_direction);
        Ok(())
    }

    fn defer_right_direction(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_right_direction(value)?;
        self.eax_d.right_direction = value;
        self.dirty.assign(FrequencyShifterField::RightDirection, self.eax.right_direction != self.eax_d.right_direction);
        Ok(())
    }

    fn defer_all(&mut self, props: &FrequencyShifterProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_frequency(props.frequency)?;
        self.defer_left_direction(props.left_direction)?;
        self.defer_right_direction(props.right_direction)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(FrequencyShifterField::Frequency) {
            self.set_efx_frequency(backend)?;
        }

        if self.dirty.contains(FrequencyShifterField::LeftDirection) {
            self.set_efx_left_direction(backend)?;
        }

        if self.dirty.contains(FrequencyShifterField::RightDirection) {
            self.set_efx_right_direction(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_frequency(backend)?;
        self.set_efx_left_direction(backend)?;
        self.set_efx_right_direction(backend)?;
        Ok(())
    }

    fn set_efx_frequency(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::FrequencyShifterFrequency,
            self.eax.frequency,
            AL_FREQUENCY_SHIFTER_MIN_FREQUENCY,
            AL_FREQUENCY_SHIFTER_MAX_FREQUENCY,
        )
    }

    fn set_efx_left_direction(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::FrequencyShifterLeftDirection,
            self.eax.left_direction as i32,
            AL_FREQUENCY_SHIFTER_MIN_LEFTDIRECTION,
            AL_FREQUENCY_SHIFTER_MAX_LEFTDIRECTION,
        )
    }

    fn set_efx_right_direction(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::FrequencyShifterRightDirection,
            self.eax.right_direction as i32,
            AL_FREQUENCY_SHIFTER_MIN_RIGHTDIRECTION,
            AL_FREQUENCY_SHIFTER_MAX_RIGHTDIRECTION,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, FrequencyShifterEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = FrequencyShifterEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut FrequencyShifterEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> FrequencyShifterProperties {
        let mut buf = [0u8; size_of::<FrequencyShifterProperties>()];
        effect.dispatch(&mut effect_get(EAXFREQUENCYSHIFTER_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), FrequencyShifterProperties::default());
    }

    #[test]
    fn test_set_frequency_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&440.0_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXFREQUENCYSHIFTER_FREQUENCY, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().frequency, 440.0_f32);
        assert_eq!(backend.slot_param(slot, EfxParam::FrequencyShifterFrequency), Some(EfxValue::Float(440.0)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&440.0_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXFREQUENCYSHIFTER_FREQUENCY, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).frequency, EAXFREQUENCYSHIFTER_DEFAULTFREQUENCY);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).frequency, 440.0_f32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&25000.0_f32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXFREQUENCYSHIFTER_FREQUENCY, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().frequency, EAXFREQUENCYSHIFTER_DEFAULTFREQUENCY);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = FrequencyShifterProperties {
            frequency: 440.0_f32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXFREQUENCYSHIFTER_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
