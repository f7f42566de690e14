//! Echo effect

use super::{set_efx_float, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "Echo";

pub const EAXECHO_NONE: u32 = 0;
pub const EAXECHO_ALLPARAMETERS: u32 = 1;
pub const EAXECHO_DELAY: u32 = 2;
pub const EAXECHO_LRDELAY: u32 = 3;
pub const EAXECHO_DAMPING: u32 = 4;
pub const EAXECHO_FEEDBACK: u32 = 5;
pub const EAXECHO_SPREAD: u32 = 6;

pub const EAXECHO_MINDELAY: f32 = 0.002;
pub const EAXECHO_MAXDELAY: f32 = 0.207;
pub const EAXECHO_DEFAULTDELAY: f32 = 0.1;

pub const EAXECHO_MINLRDELAY: f32 = 0.0;
pub const EAXECHO_MAXLRDELAY: f32 = 0.404;
pub const EAXECHO_DEFAULTLRDELAY: f32 = 0.1;

pub const EAXECHO_MINDAMPING: f32 = 0.0;
pub const EAXECHO_MAXDAMPING: f32 = 0.99;
pub const EAXECHO_DEFAULTDAMPING: f32 = 0.5;

pub const EAXECHO_MINFEEDBACK: f32 = 0.0;
pub const EAXECHO_MAXFEEDBACK: f32 = 1.0;
pub const EAXECHO_DEFAULTFEEDBACK: f32 = 0.5;

pub const EAXECHO_MINSPREAD: f32 = -1.0;
pub const EAXECHO_MAXSPREAD: f32 = 1.0;
pub const EAXECHO_DEFAULTSPREAD: f32 = -1.0;

const AL_ECHO_MIN_DELAY: f32 = 0.0;
const AL_ECHO_MAX_DELAY: f32 = 0.207;
const AL_ECHO_MIN_LRDELAY: f32 = 0.0;
const AL_ECHO_MAX_LRDELAY: f32 = 0.404;
const AL_ECHO_MIN_DAMPING: f32 = 0.0;
const AL_ECHO_MAX_DAMPING: f32 = 0.99;
const AL_ECHO_MIN_FEEDBACK: f32 = 0.0;
const AL_ECHO_MAX_FEEDBACK: f32 = 1.0;
const AL_ECHO_MIN_SPREAD: f32 = -1.0;
const AL_ECHO_MAX_SPREAD: f32 = 1.0;

/// EAX echo properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EchoProperties {
    /// First tap delay, seconds
    pub delay: f32,
    /// Second tap delay relative to the first
    pub lr_delay: f32,
    pub damping: f32,
    pub feedback: f32,
    /// Stereo spread of the taps
    pub spread: f32,
}

impl Default for EchoProperties {
    fn default() -> Self {
        Self {
            delay: EAXECHO_DEFAULTDELAY,
            lr_delay: EAXECHO_DEFAULTLRDELAY,
            damping: EAXECHO_DEFAULTDAMPING,
            feedback: EAXECHO_DEFAULTFEEDBACK,
            spread: EAXECHO_DEFAULTSPREAD,
        }
    }
}

crate::dirty_fields! {
    enum EchoField {
        Delay,
        LrDelay,
        Damping,
        Feedback,
        Spread,
    }
}

#[derive(Debug)]
pub struct EchoEffect {
    effect: EffectId,
    eax: EchoProperties,
    eax_d: EchoProperties,
    dirty: DirtySet<EchoField>,
}

impl EchoEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Echo)?;
        let this = Self {
            effect,
            eax: EchoProperties::default(),
            eax_d: EchoProperties::default(),
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
    pub fn properties(&self) -> &EchoProperties {
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
            EAXECHO_NONE => Ok(()),
            EAXECHO_ALLPARAMETERS => call.set_value(&self.eax),
            EAXECHO_DELAY => call.set_value(&self.eax.delay),
            EAXECHO_LRDELAY => call.set_value(&self.eax.lr_delay),
            EAXECHO_DAMPING => call.set_value(&self.eax.damping),
            EAXECHO_FEEDBACK => call.set_value(&self.eax.feedback),
            EAXECHO_SPREAD => call.set_value(&self.eax.spread),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXECHO_NONE => Ok(()),
            EAXECHO_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXECHO_DELAY => self.defer_delay(call.get_value()?),
            EAXECHO_LRDELAY => self.defer_lr_delay(call.get_value()?),
            EAXECHO_DAMPING => self.defer_damping(call.get_value()?),
            EAXECHO_FEEDBACK => self.defer_feedback(call.get_value()?),
            EAXECHO_SPREAD => self.defer_spread(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_delay(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Delay", value, EAXECHO_MINDELAY, EAXECHO_MAXDELAY)
    }

    fn validate_lr_delay(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "LrDelay", value, EAXECHO_MINLRDELAY, EAXECHO_MAXLRDELAY)
    }

    fn validate_damping(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Damping", value, EAXECHO_MINDAMPING, EAXECHO_MAXDAMPING)
    }

    fn validate_feedback(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Feedback", value, EAXECHO_MINFEEDBACK, EAXECHO_MAXFEEDBACK)
    }

    fn validate_spread(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Spread", value, EAXECHO_MINSPREAD, EAXECHO_MAXSPREAD)
    }

    fn validate_all(props: &EchoProperties) -> EaxResult<()> {
        Self::validate_delay(props.delay)?;
        Self::validate_lr_delay(props.lr_delay)?;
        Self::validate_damping(props.damping)?;
        Self::validate_feedback(props.feedback)?;
        Self::validate_spread(props.spread)?;
        Ok(())
    }

    fn defer_delay(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_delay(value)?;
        self.eax_d.delay = value;
        self.dirty.assign(EchoField::Delay, self.eax.delay != self.eax_d.delay);
        Ok(())
    }

    fn defer_lr_delay(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_lr_delay(value)?;
        self.eax_d.lr_delay = value;
        self.dirty.assign(EchoField::LrDelay, self.eax.lr_delay != self.eax_d.lr_delay);
        Ok(())
    }

    fn defer_damping(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_damping(value)?;
        self.eax_d.damping = value;
        self.dirty.assign(EchoField::Damping, self.eax.damping != self.eax_d.damping);
        Ok(())
    }

    fn defer_feedback(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_feedback(value)?;
        self.eax_d.feedback = value;
        self.dirty.assign(EchoField::Feedback, self.eax.feedback != self.eax_d.feedback);
        Ok(())
    }

    fn defer_spread(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_spread(value)?;
        self.eax_d.spread = value;
        self.dirty.assign(EchoField::Spread, self.eax.spread != self.eax_d.spread);
        Ok(())
    }

    fn defer_all(&mut self, props: &EchoProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_delay(props.delay)?;
        self.defer_lr_delay(props.lr_delay)?;
        self.defer_damping(props.damping)?;
        self.defer_feedback(props.feedback)?;
        self.defer_spread(props.spread)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(EchoField::Delay) {
            self.set_efx_delay(backend)?;
        }

        if self.dirty.contains(EchoField::LrDelay) {
            self.set_efx_lr_delay(backend)?;
        }

        if self.dirty.contains(EchoField::Damping) {
            self.set_efx_damping(backend)?;
        }

        if self.dirty.contains(EchoField::Feedback) {
            self.set_efx_feedback(backend)?;
        }

        if self.dirty.contains(EchoField::Spread) {
            self.set_efx_spread(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_delay(backend)?;
        self.set_efx_lr_delay(backend)?;
        self.set_efx_damping(backend)?;
        self.set_efx_feedback(backend)?;
        self.set_efx_spread(backend)?;
        Ok(())
    }

    fn set_efx_delay(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EchoDelay,
            self.eax.delay,
            AL_ECHO_MIN_DELAY,
            AL_ECHO_MAX_DELAY,
        )
    }

    fn set_efx_lr_delay(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EchoLrDelay,
            self.eax.lr_delay,
            AL_ECHO_MIN_LRDELAY,
            AL_ECHO_MAX_LRDELAY,
        )
    }

    fn set_efx_damping(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EchoDamping,
            self.eax.damping,
            AL_ECHO_MIN_DAMPING,
            AL_ECHO_MAX_DAMPING,
        )
    }

    fn set_efx_feedback(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EchoFeedback,
            self.eax.feedback,
            AL_ECHO_MIN_FEEDBACK,
            AL_ECHO_MAX_FEEDBACK,
        )
    }

    fn set_efx_spread(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EchoSpread,
            self.eax.spread,
            AL_ECHO_MIN_SPREAD,
            AL_ECHO_MAX_SPREAD,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, EchoEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = EchoEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut EchoEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> EchoProperties {
        let mut buf = [0u8; size_of::<EchoProperties>()];
        effect.dispatch(&mut effect_get(EAXECHO_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), EchoProperties::default());
    }

    #[test]
    fn test_set_damping_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0.25_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXECHO_DAMPING, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().damping, 0.25_f32);
        assert_eq!(backend.slot_param(slot, EfxParam::EchoDamping), Some(EfxValue::Float(0.25)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0.25_f32).to_vec();
        effect.dispatch(&mut effect_set(EAXECHO_DAMPING, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).damping, EAXECHO_DEFAULTDAMPING);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).damping, 0.25_f32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&1.0_f32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXECHO_DAMPING, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().damping, EAXECHO_DEFAULTDAMPING);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = EchoProperties {
            damping: 0.25_f32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXECHO_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
