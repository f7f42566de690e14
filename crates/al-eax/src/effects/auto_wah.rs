//! Auto-wah effect
//!
//! Resonance and peak level are millibels on the EAX side and linear
//! gains natively.

use super::{set_efx_float, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use al_core::level_mb_to_gain;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "AutoWah";

pub const EAXAUTOWAH_NONE: u32 = 0;
pub const EAXAUTOWAH_ALLPARAMETERS: u32 = 1;
pub const EAXAUTOWAH_ATTACKTIME: u32 = 2;
pub const EAXAUTOWAH_RELEASETIME: u32 = 3;
pub const EAXAUTOWAH_RESONANCE: u32 = 4;
pub const EAXAUTOWAH_PEAKLEVEL: u32 = 5;

pub const EAXAUTOWAH_MINATTACKTIME: f32 = 0.0001;
pub const EAXAUTOWAH_MAXATTACKTIME: f32 = 1.0;
pub const EAXAUTOWAH_DEFAULTATTACKTIME: f32 = 0.06;

pub const EAXAUTOWAH_MINRELEASETIME: f32 = 0.0001;
pub const EAXAUTOWAH_MAXRELEASETIME: f32 = 1.0;
pub const EAXAUTOWAH_DEFAULTRELEASETIME: f32 = 0.06;

pub const EAXAUTOWAH_MINRESONANCE: i32 = 600;
pub const EAXAUTOWAH_MAXRESONANCE: i32 = 6000;
pub const EAXAUTOWAH_DEFAULTRESONANCE: i32 = 6000;

pub const EAXAUTOWAH_MINPEAKLEVEL: i32 = -9000;
pub const EAXAUTOWAH_MAXPEAKLEVEL: i32 = 9000;
pub const EAXAUTOWAH_DEFAULTPEAKLEVEL: i32 = 2100;

const AL_AUTOWAH_MIN_ATTACKTIME: f32 = 0.0001;
const AL_AUTOWAH_MAX_ATTACKTIME: f32 = 1.0;
const AL_AUTOWAH_MIN_RELEASETIME: f32 = 0.0001;
const AL_AUTOWAH_MAX_RELEASETIME: f32 = 1.0;
const AL_AUTOWAH_MIN_RESONANCE: f32 = 2.0;
const AL_AUTOWAH_MAX_RESONANCE: f32 = 1000.0;
const AL_AUTOWAH_MIN_PEAKLEVEL: f32 = 0.00003;
const AL_AUTOWAH_MAX_PEAKLEVEL: f32 = 31621.0;

/// EAX auto-wah properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AutoWahProperties {
    /// Envelope attack, seconds
    pub attack_time: f32,
    /// Envelope release, seconds
    pub release_time: f32,
    /// Filter resonance, millibels
    pub resonance: i32,
    /// Filter peak level, millibels
    pub peak_level: i32,
}

impl Default for AutoWahProperties {
    fn default() -> Self {
        Self {
            attack_time: EAXAUTOWAH_DEFAULTATTACKTIME,
            release_time: EAXAUTOWAH_DEFAULTRELEASETIME,
            resonance: EAXAUTOWAH_DEFAULTRESONANCE,
            peak_level: EAXAUTOWAH_DEFAULTPEAKLEVEL,
        }
    }
}

crate::dirty_fields! {
    enum AutoWahField {
        AttackTime,
        ReleaseTime,
        Resonance,
        PeakLevel,
    }
}

#[derive(Debug)]
pub struct AutoWahEffect {
    effect: EffectId,
    eax: AutoWahProperties,
    eax_d: AutoWahProperties,
    dirty: DirtySet<AutoWahField>,
}

impl AutoWahEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Autowah)?;
        let this = Self {
            effect,
            eax: AutoWahProperties::default(),
            eax_d: AutoWahProperties::default(),
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
    pub fn properties(&self) -> &AutoWahProperties {
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
            EAXAUTOWAH_NONE => Ok(()),
            EAXAUTOWAH_ALLPARAMETERS => call.set_value(&self.eax),
            EAXAUTOWAH_ATTACKTIME => call.set_value(&self.eax.attack_time),
            EAXAUTOWAH_RELEASETIME => call.set_value(&self.eax.release_time),
            EAXAUTOWAH_RESONANCE => call.set_value(&self.eax.resonance),
            EAXAUTOWAH_PEAKLEVEL => call.set_value(&self.eax.peak_level),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXAUTOWAH_NONE => Ok(()),
            EAXAUTOWAH_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXAUTOWAH_ATTACKTIME => self.defer_attack_time(call.get_value()?),
            EAXAUTOWAH_RELEASETIME => self.defer_release_time(call.get_value()?),
            EAXAUTOWAH_RESONANCE => self.defer_resonance(call.get_value()?),
            EAXAUTOWAH_PEAKLEVEL => self.defer_peak_level(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_attack_time(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "AttackTime", value, EAXAUTOWAH_MINATTACKTIME, EAXAUTOWAH_MAXATTACKTIME)
    }

    fn validate_release_time(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "ReleaseTime", value, EAXAUTOWAH_MINRELEASETIME, EAXAUTOWAH_MAXRELEASETIME)
    }

    fn validate_resonance(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Resonance", value, EAXAUTOWAH_MINRESONANCE, EAXAUTOWAH_MAXRESONANCE)
    }

    fn validate_peak_level(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "PeakLevel", value, EAXAUTOWAH_MINPEAKLEVEL, EAXAUTOWAH_MAXPEAKLEVEL)
    }

    fn validate_all(props: &AutoWahProperties) -> EaxResult<()> {
        Self::validate_attack_time(props.attack_time)?;
        Self::validate_release_time(props.release_time)?;
        Self::validate_resonance(props.resonance)?;
        Self::validate_peak_level(props.peak_level)?;
        Ok(())
    }

    fn defer_attack_time(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_attack_time(value)?;
        self.eax_d.attack_time = value;
        self.dirty.assign(AutoWahField::AttackTime, self.eax.attack_time != self.eax_d.attack_time);
        Ok(())
    }

    fn defer_release_time(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_release_time(value)?;
        self.eax_d.release_time = value;
        self.dirty.assign(AutoWahField::ReleaseTime, self.eax.release_time != self.eax_d.release_time);
        Ok(())
    }

    fn defer_resonance(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_resonance(value)?;
        self.eax_d.resonance = value;
        self.dirty.assign(AutoWahField::Resonance, self.eax.resonance != self.eax_d.resonance);
        Ok(())
    }

    fn defer_peak_level(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_peak_level(value)?;
        self.eax_d.peak_level = value;
        self.dirty.assign(AutoWahField::PeakLevel, self.eax.peak_level != self.eax_d.peak_level);
        Ok(())
    }

    fn defer_all(&mut self, props: &AutoWahProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_attack_time(props.attack_time)?;
        self.defer_release_time(props.release_time)?;
        self.defer_resonance(props.resonance)?;
        self.defer_peak_level(props.peak_level)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(AutoWahField::AttackTime) {
            self.set_efx_attack_time(backend)?;
        }

        if self.dirty.contains(AutoWahField::ReleaseTime) {
            self.set_efx_release_time(backend)?;
        }

        if self.dirty.contains(AutoWahField::Resonance) {
            self.set_efx_resonance(backend)?;
        }

        if self.dirty.contains(AutoWahField::PeakLevel) {
            self.set_efx_peak_level(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_attack_time(backend)?;
        self.set_efx_release_time(backend)?;
        self.set_efx_resonance(backend)?;
        self.set_efx_peak_level(backend)?;
        Ok(())
    }

    fn set_efx_attack_time(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::AutowahAttackTime,
            self.eax.attack_time,
            AL_AUTOWAH_MIN_ATTACKTIME,
            AL_AUTOWAH_MAX_ATTACKTIME,
        )
    }

    fn set_efx_release_time(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::AutowahReleaseTime,
            self.eax.release_time,
            AL_AUTOWAH_MIN_RELEASETIME,
            AL_AUTOWAH_MAX_RELEASETIME,
        )
    }

    fn set_efx_resonance(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::AutowahResonance,
            level_mb_to_gain(self.eax.resonance as f32),
            AL_AUTOWAH_MIN_RESONANCE,
            AL_AUTOWAH_MAX_RESONANCE,
        )
    }

    fn set_efx_peak_level(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::AutowahPeakGain,
            level_mb_to_gain(self.eax.peak_level as f32),
            AL_AUTOWAH_MIN_PEAKLEVEL,
            AL_AUTOWAH_MAX_PEAKLEVEL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, AutoWahEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = AutoWahEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut AutoWahEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> AutoWahProperties {
        let mut buf = [0u8; size_of::<AutoWahProperties>()];
        effect.dispatch(&mut effect_get(EAXAUTOWAH_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), AutoWahProperties::default());
    }

    #[test]
    fn test_set_peak_level_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0_i32).to_vec();
        effect.dispatch(&mut effect_set(EAXAUTOWAH_PEAKLEVEL, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().peak_level, 0_i32);
        assert_eq!(backend.slot_param(slot, EfxParam::AutowahPeakGain), Some(EfxValue::Float(1.0)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0_i32).to_vec();
        effect.dispatch(&mut effect_set(EAXAUTOWAH_PEAKLEVEL, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).peak_level, EAXAUTOWAH_DEFAULTPEAKLEVEL);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).peak_level, 0_i32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&9001_i32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXAUTOWAH_PEAKLEVEL, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().peak_level, EAXAUTOWAH_DEFAULTPEAKLEVEL);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = AutoWahProperties {
            peak_level: 0_i32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXAUTOWAH_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
