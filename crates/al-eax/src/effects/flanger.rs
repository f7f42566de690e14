//! Flanger effect

use super::{set_efx_float, set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "Flanger";

pub const EAXFLANGER_NONE: u32 = 0;
pub const EAXFLANGER_ALLPARAMETERS: u32 = 1;
pub const EAXFLANGER_WAVEFORM: u32 = 2;
pub const EAXFLANGER_PHASE: u32 = 3;
pub const EAXFLANGER_RATE: u32 = 4;
pub const EAXFLANGER_DEPTH: u32 = 5;
pub const EAXFLANGER_FEEDBACK: u32 = 6;
pub const EAXFLANGER_DELAY: u32 = 7;

pub const EAX_FLANGER_SINUSOID: u32 = 0;
pub const EAX_FLANGER_TRIANGLE: u32 = 1;

pub const EAXFLANGER_MINWAVEFORM: u32 = 0;
pub const EAXFLANGER_MAXWAVEFORM: u32 = 1;
pub const EAXFLANGER_DEFAULTWAVEFORM: u32 = EAX_FLANGER_TRIANGLE;

pub const EAXFLANGER_MINPHASE: i32 = -180;
pub const EAXFLANGER_MAXPHASE: i32 = 180;
pub const EAXFLANGER_DEFAULTPHASE: i32 = 0;

pub const EAXFLANGER_MINRATE: f32 = 0.0;
pub const EAXFLANGER_MAXRATE: f32 = 10.0;
pub const EAXFLANGER_DEFAULTRATE: f32 = 0.27;

pub const EAXFLANGER_MINDEPTH: f32 = 0.0;
pub const EAXFLANGER_MAXDEPTH: f32 = 1.0;
pub const EAXFLANGER_DEFAULTDEPTH: f32 = 1.0;

pub const EAXFLANGER_MINFEEDBACK: f32 = -1.0;
pub const EAXFLANGER_MAXFEEDBACK: f32 = 1.0;
pub const EAXFLANGER_DEFAULTFEEDBACK: f32 = -0.5;

pub const EAXFLANGER_MINDELAY: f32 = 0.0002;
pub const EAXFLANGER_MAXDELAY: f32 = 0.004;
pub const EAXFLANGER_DEFAULTDELAY: f32 = 0.002;

const AL_FLANGER_MIN_WAVEFORM: i32 = 0;
const AL_FLANGER_MAX_WAVEFORM: i32 = 1;
const AL_FLANGER_MIN_PHASE: i32 = -180;
const AL_FLANGER_MAX_PHASE: i32 = 180;
const AL_FLANGER_MIN_RATE: f32 = 0.0;
const AL_FLANGER_MAX_RATE: f32 = 10.0;
const AL_FLANGER_MIN_DEPTH: f32 = 0.0;
const AL_FLANGER_MAX_DEPTH: f32 = 1.0;
const AL_FLANGER_MIN_FEEDBACK: f32 = -1.0;
const AL_FLANGER_MAX_FEEDBACK: f32 = 1.0;
const AL_FLANGER_MIN_DELAY: f32 = 0.0;
const AL_FLANGER_MAX_DELAY: f32 = 0.004;

/// EAX flanger properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FlangerProperties {
    pub waveform: u32,
    pub phase: i32,
    pub rate: f32,
    pub depth: f32,
    pub feedback: f32,
    pub delay: f32,
}

impl Default for FlangerProperties {
    fn default() -> Self {
        Self {
            waveform: EAXFLANGER_DEFAULTWAVEFORM,
            phase: EAXFLANGER_DEFAULTPHASE,
            rate: EAXFLANGER_DEFAULTRATE,
            depth: EAXFLANGER_DEFAULTDEPTH,
            feedback: EAXFLANGER_DEFAULTFEEDBACK,
            delay: EAXFLANGER_DEFAULTDELAY,
        }
    }
}

crate::dirty_fields! {
    enum FlangerField {
        Waveform,
        Phase,
        Rate,
        Depth,
        Feedback,
        Delay,
    }
}

#[derive(Debug)]
pub struct FlangerEffect {
    effect: EffectId,
    eax: FlangerProperties,
    eax_d: FlangerProperties,
    dirty: DirtySet<FlangerField>,
}

impl FlangerEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Flanger)?;
        let this = Self {
            effect,
            eax: FlangerProperties::default(),
            eax_d: FlangerProperties::default(),
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
    pub fn properties(&self) -> &FlangerProperties {
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
            EAXFLANGER_NONE => Ok(()),
            EAXFLANGER_ALLPARAMETERS => call.set_value(&self.eax),
            EAXFLANGER_WAVEFORM => call.set_value(&self.eax.waveform),
            EAXFLANGER_PHASE => call.set_value(&self.eax.phase),
            EAXFLANGER_RATE => call.set_value(&self.eax.rate),
            EAXFLANGER_DEPTH => call.set_value(&self.eax.depth),
            EAXFLANGER_FEEDBACK => call.set_value(&self.eax.feedback),
            EAXFLANGER_DELAY => call.set_value(&self.eax.delay),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXFLANGER_NONE => Ok(()),
            EAXFLANGER_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXFLANGER_WAVEFORM => self.defer_waveform(call.get_value()?),
            EAXFLANGER_PHASE => self.defer_phase(call.get_value()?),
            EAXFLANGER_RATE => self.defer_rate(call.get_value()?),
            EAXFLANGER_DEPTH => self.defer_depth(call.get_value()?),
            EAXFLANGER_FEEDBACK => self.defer_feedback(call.get_value()?),
            EAXFLANGER_DELAY => self.defer_delay(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_waveform(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "Waveform", value, EAXFLANGER_MINWAVEFORM, EAXFLANGER_MAXWAVEFORM)
    }

    fn validate_phase(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Phase", value, EAXFLANGER_MINPHASE, EAXFLANGER_MAXPHASE)
    }

    fn validate_rate(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Rate", value, EAXFLANGER_MINRATE, EAXFLANGER_MAXRATE)
    }

    fn validate_depth(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Depth", value, EAXFLANGER_MINDEPTH, EAXFLANGER_MAXDEPTH)
    }

    fn validate_feedback(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Feedback", value, EAXFLANGER_MINFEEDBACK, EAXFLANGER_MAXFEEDBACK)
    }

    fn validate_delay(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Delay", value, EAXFLANGER_MINDELAY, EAXFLANGER_MAXDELAY)
    }

    fn validate_all(props: &FlangerProperties) -> EaxResult<()> {
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
        self.dirty.assign(FlangerField::Waveform, self.eax.waveform != self.eax_d.waveform);
        Ok(())
    }

    fn defer_phase(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_phase(value)?;
        self.eax_d.phase = value;
        self.dirty.assign(FlangerField::Phase, self.eax.phase != self.eax_d.phase);
        Ok(())
    }

    fn defer_rate(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_rate(value)?;
        self.eax_d.rate = value;
        self.dirty.assign(FlangerField::Rate, self.eax.rate != self.eax_d.rate);
        Ok(())
    }

    fn defer_depth(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_depth(value)?;
        self.eax_d.depth = value;
        self.dirty.assign(FlangerField::Depth, self.eax.depth != self.eax_d.depth);
        Ok(())
    }

    fn defer_feedback(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_feedback(value)?;
        self.eax_d.feedback = value;
        self.dirty.assign(FlangerField::Feedback, self.eax.feedback != self.eax_d.feedback);
        Ok(())
    }

    fn defer_delay(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_delay(value)?;
        self.eax_d.delay = value;
        self.dirty.assign(FlangerField::Delay, self.eax.delay != self.eax_d.delay);
        Ok(())
    }

    fn defer_all(&mut self, props: &FlangerProperties) -> EaxResult<()> {
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

        if self.dirty.contains(FlangerField::Waveform) {
            self.set_efx_waveform(backend)?;
        }

        if self.dirty.contains(FlangerField::Phase) {
            self.set_efx_phase(backend)?;
        }

        if self.dirty.contains(FlangerField::Rate) {
            self.set_efx_rate(backend)?;
        }

        if self.dirty.contains(FlangerField::Depth) {
            self.set_efx_depth(backend)?;
        }

        if self.dirty.contains(FlangerField::Feedback) {
            self.set_efx_feedback(backend)?;
        }

        if self.dirty.contains(FlangerField::Delay) {
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
            EfxParam::FlangerWaveform,
            self.eax.waveform as i32,
            AL_FLANGER_MIN_WAVEFORM,
            AL_FLANGER_MAX_WAVEFORM,
        )
    }

    fn set_efx_phase(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::FlangerPhase,
            self.eax.phase,
            AL_FLANGER_MIN_PHASE,
            AL_FLANGER_MAX_PHASE,
        )
    }

    fn set_efx_rate(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::FlangerRate,
            self.eax.rate,
            AL_FLANGER_MIN_RATE,
            AL_FLANGER_MAX_RATE,
        )
    }

    fn set_efx_depth(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::FlangerDepth,
            self.eax.depth,
            AL_FLANGER_MIN_DEPTH,
            AL_FLANGER_MAX_DEPTH,
        )
    }

    fn set_efx_feedback(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::FlangerFeedback,
            self.eax.feedback,
            AL_FLANGER_MIN_FEEDBACK,
            AL_FLANGER_MAX_FEEDBACK,
        )
    }

    fn set_efx_delay(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::FlangerDelay,
            self.eax.delay,
            AL_FLANGER_MIN_DELAY,
            AL_FLANGER_MAX_DELAY,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, FlangerEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = FlangerEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut FlangerEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> FlangerProperties {
        let mut buf = [0u8; size_of::<FlangerProperties>()];
        effect.dispatch(&mut effect_get(EAXFLANGER_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), FlangerProperties::default());
    }

    #[test]
    fn test_set_feedback_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0.5_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXFLANGER_FEEDBACK, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().feedback, 0.5_f32);
        assert_eq!(backend.slot_param(slot, EfxParam::FlangerFeedback), Some(EfxValue::Float(0.5)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0.5_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXFLANGER_FEEDBACK, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).feedback, EAXFLANGER_DEFAULTFEEDBACK);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).feedback, 0.5_f32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&-1.5_f32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXFLANGER_FEEDBACK, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().feedback, EAXFLANGER_DEFAULTFEEDBACK);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = FlangerProperties {
            feedback: 0.5_f32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXFLANGER_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
