//! Ring modulator effect

use super::{set_efx_float, set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "RingModulator";

pub const EAXRINGMODULATOR_NONE: u32 = 0;
pub const EAXRINGMODULATOR_ALLPARAMETERS: u32 = 1;
pub const EAXRINGMODULATOR_FREQUENCY: u32 = 2;
pub const EAXRINGMODULATOR_HIGHPASSCUTOFF: u32 = 3;
pub const EAXRINGMODULATOR_WAVEFORM: u32 = 4;

pub const EAX_RINGMODULATOR_SINUSOID: u32 = 0;
pub const EAX_RINGMODULATOR_SAWTOOTH: u32 = 1;
pub const EAX_RINGMODULATOR_SQUARE: u32 = 2;

pub const EAXRINGMODULATOR_MINFREQUENCY: f32 = 0.0;
pub const EAXRINGMODULATOR_MAXFREQUENCY: f32 = 8000.0;
pub const EAXRINGMODULATOR_DEFAULTFREQUENCY: f32 = 440.0;

pub const EAXRINGMODULATOR_MINHIGHPASSCUTOFF: f32 = 0.0;
pub const EAXRINGMODULATOR_MAXHIGHPASSCUTOFF: f32 = 24000.0;
pub const EAXRINGMODULATOR_DEFAULTHIGHPASSCUTOFF: f32 = 800.0;

pub const EAXRINGMODULATOR_MINWAVEFORM: u32 = 0;
pub const EAXRINGMODULATOR_MAXWAVEFORM: u32 = 2;
pub const EAXRINGMODULATOR_DEFAULTWAVEFORM: u32 = EAX_RINGMODULATOR_SINUSOID;

const AL_RING_MODULATOR_MIN_FREQUENCY: f32 = 0.0;
const AL_RING_MODULATOR_MAX_FREQUENCY: f32 = 8000.0;
const AL_RING_MODULATOR_MIN_HIGHPASSCUTOFF: f32 = 0.0;
const AL_RING_MODULATOR_MAX_HIGHPASSCUTOFF: f32 = 24000.0;
const AL_RING_MODULATOR_MIN_WAVEFORM: i32 = 0;
const AL_RING_MODULATOR_MAX_WAVEFORM: i32 = 2;

/// EAX ringmodulator properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RingModulatorProperties {
    pub frequency: f32,
    pub high_pass_cutoff: f32,
    pub waveform: u32,
}

impl Default for RingModulatorProperties {
    fn default() -> Self {
        Self {
            frequency: EAXRINGMODULATOR_DEFAULTFREQUENCY,
            high_pass_cutoff: EAXRINGMODULATOR_DEFAULTHIGHPASSCUTOFF,
            waveform: EAXRINGMODULATOR_DEFAULTWAVEFORM,
        }
    }
}

crate::dirty_fields! {
    enum RingModulatorField {
        Frequency,
        HighPassCutoff,
        Waveform,
    }
}

#[derive(Debug)]
pub struct RingModulatorEffect {
    effect: EffectId,
    eax: RingModulatorProperties,
    eax_d: RingModulatorProperties,
    dirty: DirtySet<RingModulatorField>,
}

impl RingModulatorEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::RingModulator)?;
        let this = Self {
            effect,
            eax: RingModulatorProperties::default(),
            eax_d: RingModulatorProperties::default(),
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
    pub fn properties(&self) -> &RingModulatorProperties {
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
            EAXRINGMODULATOR_NONE => Ok(()),
            EAXRINGMODULATOR_ALLPARAMETERS => call.set_value(&self.eax),
            EAXRINGMODULATOR_FREQUENCY => call.set_value(&self.eax.frequency),
            EAXRINGMODULATOR_HIGHPASSCUTOFF => call.set_value(&self.eax.high_pass_cutoff),
            EAXRINGMODULATOR_WAVEFORM => call.set_value(&self.eax.waveform),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXRINGMODULATOR_NONE => Ok(()),
            EAXRINGMODULATOR_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXRINGMODULATOR_FREQUENCY => self.defer_frequency(call.get_value()?),
            EAXRINGMODULATOR_HIGHPASSCUTOFF => self.defer_high_pass_cutoff(call.get_value()?),
            EAXRINGMODULATOR_WAVEFORM => self.defer_waveform(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_frequency(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Frequency", value, EAXRINGMODULATOR_MINFREQUENCY, EAXRINGMODULATOR_MAXFREQUENCY)
    }

    fn validate_high_pass_cutoff(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "HighPassCutoff", value, EAXRINGMODULATOR_MINHIGHPASSCUTOFF, EAXRINGMODULATOR_MAXHIGHPASSCUTOFF)
    }

    fn validate_waveform(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "Waveform", value, EAXRINGMODULATOR_MINWAVEFORM, EAXRINGMODULATOR_MAXWAVEFORM)
    }

    fn validate_all(props: &RingModulatorProperties) -> EaxResult<()> {
        Self::validate_frequency(props.frequency)?;
        Self::validate_high_pass_cutoff(props.high_pass_cutoff)?;
        Self::validate_waveform(props.waveform)?;
        Ok(())
    }

    fn defer_frequency(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_frequency(value)?;
        self.eax_d.frequency = value;
        self.dirty.assign(RingModulatorField::Frequency, self.eax.frequency != self.eax_d.frequency);
        Ok(())
    }

    fn defer_high_pass_cutoff(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_high_pass_cutoff(value)?;
        self.eax_d.high_pass_cutoff = value;
        self.dirty.assign(RingModulatorField::HighPassCutoff, self.eax.high_pass_cutoff != self.eax_d.high_pass_cutoff);
        Ok(())
    }

    fn defer_waveform(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_waveform(value)?;
        self.eax_d.waveform = value;
        self.dirty.assign(RingModulatorField::Waveform, self.eax.waveform != self.eax_d.waveform);
        Ok(())
    }

    fn defer_all(&mut self, props: &RingModulatorProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_frequency(props.frequency)?;
        self.defer_high_pass_cutoff(props.high_pass_cutoff)?;
        self.defer_waveform(props.waveform)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(RingModulatorField::Frequency) {
            self.set_efx_frequency(backend)?;
        }

        if self.dirty.contains(RingModulatorField::HighPassCutoff) {
            self.set_efx_high_pass_cutoff(backend)?;
        }

        if self.dirty.contains(RingModulatorField::Waveform) {
            self.set_efx_waveform(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_frequency(backend)?;
        self.set_efx_high_pass_cutoff(backend)?;
        self.set_efx_waveform(backend)?;
        Ok(())
    }

    fn set_efx_frequency(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::RingModulatorFrequency,
            self.eax.frequency,
            AL_RING_MODULATOR_MIN_FREQUENCY,
            AL_RING_MODULATOR_MAX_FREQUENCY,
        )
    }

    fn set_efx_high_pass_cutoff(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::RingModulatorHighpassCutoff,
            self.eax.high_pass_cutoff,
            AL_RING_MODULATOR_MIN_HIGHPASSCUTOFF,
            AL_RING_MODULATOR_MAX_HIGHPASSCUTOFF,
        )
    }

    fn set_efx_waveform(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::RingModulatorWaveform,
            self.eax.waveform as i32,
            AL_RING_MODULATOR_MIN_WAVEFORM,
            AL_RING_MODULATOR_MAX_WAVEFORM,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, RingModulatorEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = RingModulatorEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut RingModulatorEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> RingModulatorProperties {
        let mut buf = [0u8; size_of::<RingModulatorProperties>()];
        effect.dispatch(&mut effect_get(EAXRINGMODULATOR_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), RingModulatorProperties::default());
    }

    #[test]
    fn test_set_frequency_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&1000.0_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXRINGMODULATOR_FREQUENCY, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().frequency, 1000.0_f32);
        assert_eq!(backend.slot_param(slot, EfxParam::RingModulatorFrequency), Some(EfxValue::Float(1000.0)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&1000.0_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXRINGMODULATOR_FREQUENCY, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).frequency, EAXRINGMODULATOR_DEFAULTFREQUENCY);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).frequency, 1000.0_f32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&9000.0_f32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXRINGMODULATOR_FREQUENCY, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().frequency, EAXRINGMODULATOR_DEFAULTFREQUENCY);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = RingModulatorProperties {
            frequency: 1000.0_f32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXRINGMODULATOR_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
