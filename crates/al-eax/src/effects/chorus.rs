//! Chorus effect
//!
//! Straight unit mapping: every EAX field has a native counterpart with
//! the same units, only the delay range differs.

use super::{set_efx_float, set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "Chorus";

pub const EAXCHORUS_NONE: u32 = 0;
pub const EAXCHORUS_ALLPARAMETERS: u32 = 1;
pub const EAXCHORUS_WAVEFORM: u32 = 2;
pub const EAXCHORUS_PHASE: u32 = 3;
pub const EAXCHORUS_RATE: u32 = 4;
pub const EAXCHORUS_DEPTH: u32 = 5;
pub const EAXCHORUS_FEEDBACK: u32 = 6;
pub const EAXCHORUS_DELAY: u32 = 7;

pub const EAX_CHORUS_SINUSOID: u32 = 0;
pub const EAX_CHORUS_TRIANGLE: u32 = 1;

pub const EAXCHORUS_MINWAVEFORM: u32 = 0;
pub const EAXCHORUS_MAXWAVEFORM: u32 = 1;
pub const EAXCHORUS_DEFAULTWAVEFORM: u32 = EAX_CHORUS_TRIANGLE;

pub const EAXCHORUS_MINPHASE: i32 = -180;
pub const EAXCHORUS_MAXPHASE: i32 = 180;
pub const EAXCHORUS_DEFAULTPHASE: i32 = 90;

pub const EAXCHORUS_MINRATE: f32 = 0.0;
pub const EAXCHORUS_MAXRATE: f32 = 10.0;
pub const EAXCHORUS_DEFAULTRATE: f32 = 1.1;

pub const EAXCHORUS_MINDEPTH: f32 = 0.0;
pub const EAXCHORUS_MAXDEPTH: f32 = 1.0;
pub const EAXCHORUS_DEFAULTDEPTH: f32 = 0.1;

pub const EAXCHORUS_MINFEEDBACK: f32 = -1.0;
pub const EAXCHORUS_MAXFEEDBACK: f32 = 1.0;
pub const EAXCHORUS_DEFAULTFEEDBACK: f32 = 0.25;

pub const EAXCHORUS_MINDELAY: f32 = 0.0002;
pub const EAXCHORUS_MAXDELAY: f32 = 0.016;
pub const EAXCHORUS_DEFAULTDELAY: f32 = 0.016;

const AL_CHORUS_MIN_WAVEFORM: i32 = 0;
const AL_CHORUS_MAX_WAVEFORM: i32 = 1;
const AL_CHORUS_MIN_PHASE: i32 = -180;
const AL_CHORUS_MAX_PHASE: i32 = 180;
const AL_CHORUS_MIN_RATE: f32 = 0.0;
const AL_CHORUS_MAX_RATE: f32 = 10.0;
const AL_CHORUS_MIN_DEPTH: f32 = 0.0;
const AL_CHORUS_MAX_DEPTH: f32 = 1.0;
const AL_CHORUS_MIN_FEEDBACK: f32 = -1.0;
const AL_CHORUS_MAX_FEEDBACK: f32 = 1.0;
const AL_CHORUS_MIN_DELAY: f32 = 0.0;
const AL_CHORUS_MAX_DELAY: f32 = 0.016;

/// EAX chorus properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ChorusProperties {
    /// LFO waveform (sinusoid or triangle)
    pub waveform: u32,
    /// LFO phase difference between channels, degrees
    pub phase: i32,
    /// LFO rate, Hz
    pub rate: f32,
    /// Modulation depth
    pub depth: f32,
    /// Feedback amount
    pub feedback: f32,
    /// Average delay, seconds
    pub delay: f32,
}

impl Default for ChorusProperties {
    fn default() -> Self {
        Self {
            waveform: EAXCHORUS_DEFAULTWAVEFORM,
            phase: EAXCHORUS_DEFAULTPHASE,
            rate: EAXCHORUS_DEFAULTRATE,
            depth: EAXCHORUS_DEFAULTDEPTH,
            feedback: EAXCHORUS_DEFAULTFEEDBACK,
            delay: EAXCHORUS_DEFAULTDELAY,
        }
    }
}

crate::dirty_fields! {
    enum ChorusField {
        Waveform,
        Phase,
        Rate,
        Depth,
        Feedback,
        Delay,
    }
}

#[derive(Debug)]
pub struct ChorusEffect {
    effect: EffectId,
    eax: ChorusProperties,
    eax_d: ChorusProperties,
    dirty: DirtySet<ChorusField>,
}

impl ChorusEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Chorus)?;
        let this = Self {
            effect,
            eax: ChorusProperties::default(),
            eax_d: ChorusProperties::default(),
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
    pub fn properties(&self) -> &ChorusProperties {
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
            EAXCHORUS_NONE => Ok(()),
            EAXCHORUS_ALLPARAMETERS => call.set_value(&self.eax),
            EAXCHORUS_WAVEFORM => call.set_value(&self.eax.waveform),
            EAXCHORUS_PHASE => call.set_value(&self.eax.phase),
            EAXCHORUS_RATE => call.set_value(&self.eax.rate),
            EAXCHORUS_DEPTH => call.set_value(&self.eax.depth),
            EAXCHORUS_FEEDBACK => call.set_value(&self.eax.feedback),
            EAXCHORUS_DELAY => call.set_value(&self.eax.delay),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXCHORUS_NONE => Ok(()),
            EAXCHORUS_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXCHORUS_WAVEFORM => self.defer_waveform(call.get_value()?),
            EAXCHORUS_PHASE => self.defer_phase(call.get_value()?),
            EAXCHORUS_RATE => self.defer_rate(call.get_value()?),
            EAXCHORUS_DEPTH => self.defer_depth(call.get_value()?),
            EAXCHORUS_FEEDBACK => self.defer_feedback(call.get_value()?),
            EAXCHORUS_DELAY => self.defer_delay(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_waveform(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "Waveform", value, EAXCHORUS_MINWAVEFORM, EAXCHORUS_MAXWAVEFORM)
    }

    fn validate_phase(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Phase", value, EAXCHORUS_MINPHASE, EAXCHORUS_MAXPHASE)
    }

    fn validate_rate(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Rate", value, EAXCHORUS_MINRATE, EAXCHORUS_MAXRATE)
    }

    fn validate_depth(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Depth", value, EAXCHORUS_MINDEPTH, EAXCHORUS_MAXDEPTH)
    }

    fn validate_feedback(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Feedback", value, EAXCHORUS_MINFEEDBACK, EAXCHORUS_MAXFEEDBACK)
    }

    fn validate_delay(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Delay", value, EAXCHORUS_MINDELAY, EAXCHORUS_MAXDELAY)
    }

    fn validate_all(props: &ChorusProperties) -> EaxResult<()> {
        Self::validate_waveform(props.waveform)?;
        Self::validate_phase(props.phase)?;
        Self::validate_rate(props.rate)?;
        Self::validate_depth(props.depth)?;
        Self::validate_feedback(props.feedback)?;
        Self::validate_delay(props.delay)?;
        Ok(())
    }

    fn defer_waveform(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_waveform(value)?;
        self.eax_d.waveform = value;
        self.dirty.assign(ChorusField::Waveform, self.eax.waveform != self.eax_d.waveform);
        Ok(())
    }

    fn defer_phase(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_phase(value)?;
        self.eax_d.phase = value;
        self.dirty.assign(ChorusField::Phase, self.eax.phase != self.eax_d.phase);
        Ok(())
    }

    fn defer_rate(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_rate(value)?;
        self.eax_d.rate = value;
        self.dirty.assign(ChorusField::Rate, self.eax.rate != self.eax_d.rate);
        Ok(())
    }

    fn defer_depth(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_depth(value)?;
        self.eax_d.depth = value;
        self.dirty.assign(ChorusField::Depth, self.eax.depth != self.eax_d.depth);
        Ok(())
    }

    fn defer_feedback(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_feedback(value)?;
        self.eax_d.feedback = value;
        self.dirty.assign(ChorusField::Feedback, self.eax.feedback != self.eax_d.feedback);
        Ok(())
    }

    fn defer_delay(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_delay(value)?;
        self.eax_d.delay = value;
        self.dirty.assign(ChorusField::Delay, self.eax.delay != self.eax_d.delay);
        Ok(())
    }

    fn defer_all(&mut self, props: &ChorusProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_waveform(props.waveform)?;
        self.defer_phase(props.phase)?;
        self.defer_rate(props.rate)?;
        self.defer_depth(props.depth)?;
        self.defer_feedback(props.feedback)?;
        self.defer_delay(props.delay)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(ChorusField::Waveform) {
            self.set_efx_waveform(backend)?;
        }

        if self.dirty.contains(ChorusField::Phase) {
            self.set_efx_phase(backend)?;
        }

        if self.dirty.contains(ChorusField::Rate) {
            self.set_efx_rate(backend)?;
        }

        if self.dirty.contains(ChorusField::Depth) {
            self.set_efx_depth(backend)?;
        }

        if self.dirty.contains(ChorusField::Feedback) {
            self.set_efx_feedback(backend)?;
        }

        if self.dirty.contains(ChorusField::Delay) {
            self.set_efx_delay(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_waveform(backend)?;
        self.set_efx_phase(backend)?;
        self.set_efx_rate(backend)?;
        self.set_efx_depth(backend)?;
        self.set_efx_feedback(backend)?;
        self.set_efx_delay(backend)?;
        Ok(())
    }

    fn set_efx_waveform(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::ChorusWaveform,
            self.eax.waveform as i32,
            AL_CHORUS_MIN_WAVEFORM,
            AL_CHORUS_MAX_WAVEFORM,
        )
    }

    fn set_efx_phase(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::ChorusPhase,
            self.eax.phase,
            AL_CHORUS_MIN_PHASE,
            AL_CHORUS_MAX_PHASE,
        )
    }

    fn set_efx_rate(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::ChorusRate,
            self.eax.rate,
            AL_CHORUS_MIN_RATE,
            AL_CHORUS_MAX_RATE,
        )
    }

    fn set_efx_depth(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::ChorusDepth,
            self.eax.depth,
            AL_CHORUS_MIN_DEPTH,
            AL_CHORUS_MAX_DEPTH,
        )
    }

    fn set_efx_feedback(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::ChorusFeedback,
            self.eax.feedback,
            AL_CHORUS_MIN_FEEDBACK,
            AL_CHORUS_MAX_FEEDBACK,
        )
    }

    fn set_efx_delay(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::ChorusDelay,
            self.eax.delay,
            AL_CHORUS_MIN_DELAY,
            AL_CHORUS_MAX_DELAY,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, ChorusEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = ChorusEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut ChorusEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> ChorusProperties {
        let mut buf = [0u8; size_of::<ChorusProperties>()];
        effect.dispatch(&mut effect_get(EAXCHORUS_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), ChorusProperties::default());
    }

    #[test]
    fn test_set_rate_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&2.5_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXCHORUS_RATE, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().rate, 2.5_f32);
        assert_eq!(backend.slot_param(slot, EfxParam::ChorusRate), Some(EfxValue::Float(2.5)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&2.5_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXCHORUS_RATE, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).rate, EAXCHORUS_DEFAULTRATE);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).rate, 2.5_f32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&11.0_f32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXCHORUS_RATE, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().rate, EAXCHORUS_DEFAULTRATE);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = ChorusProperties {
            rate: 2.5_f32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXCHORUS_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
