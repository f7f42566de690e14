//! Four-band equalizer
//!
//! Band gains arrive in millibels and go out as linear gains.

use super::{set_efx_float, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use al_core::level_mb_to_gain;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "Equalizer";

pub const EAXEQUALIZER_NONE: u32 = 0;
pub const EAXEQUALIZER_ALLPARAMETERS: u32 = 1;
pub const EAXEQUALIZER_LOWGAIN: u32 = 2;
pub const EAXEQUALIZER_LOWCUTOFF: u32 = 3;
pub const EAXEQUALIZER_MID1GAIN: u32 = 4;
pub const EAXEQUALIZER_MID1CENTER: u32 = 5;
pub const EAXEQUALIZER_MID1WIDTH: u32 = 6;
pub const EAXEQUALIZER_MID2GAIN: u32 = 7;
pub const EAXEQUALIZER_MID2CENTER: u32 = 8;
pub const EAXEQUALIZER_MID2WIDTH: u32 = 9;
pub const EAXEQUALIZER_HIGHGAIN: u32 = 10;
pub const EAXEQUALIZER_HIGHCUTOFF: u32 = 11;

pub const EAXEQUALIZER_MINLOWGAIN: i32 = -1800;
pub const EAXEQUALIZER_MAXLOWGAIN: i32 = 1800;
pub const EAXEQUALIZER_DEFAULTLOWGAIN: i32 = 0;

pub const EAXEQUALIZER_MINLOWCUTOFF: f32 = 50.0;
pub const EAXEQUALIZER_MAXLOWCUTOFF: f32 = 800.0;
pub const EAXEQUALIZER_DEFAULTLOWCUTOFF: f32 = 200.0;

pub const EAXEQUALIZER_MINMID1GAIN: i32 = -1800;
pub const EAXEQUALIZER_MAXMID1GAIN: i32 = 1800;
pub const EAXEQUALIZER_DEFAULTMID1GAIN: i32 = 0;

pub const EAXEQUALIZER_MINMID1CENTER: f32 = 200.0;
pub const EAXEQUALIZER_MAXMID1CENTER: f32 = 3000.0;
pub const EAXEQUALIZER_DEFAULTMID1CENTER: f32 = 500.0;

pub const EAXEQUALIZER_MINMID1WIDTH: f32 = 0.01;
pub const EAXEQUALIZER_MAXMID1WIDTH: f32 = 1.0;
pub const EAXEQUALIZER_DEFAULTMID1WIDTH: f32 = 1.0;

pub const EAXEQUALIZER_MINMID2GAIN: i32 = -1800;
pub const EAXEQUALIZER_MAXMID2GAIN: i32 = 1800;
pub const EAXEQUALIZER_DEFAULTMID2GAIN: i32 = 0;

pub const EAXEQUALIZER_MINMID2CENTER: f32 = 1000.0;
pub const EAXEQUALIZER_MAXMID2CENTER: f32 = 8000.0;
pub const EAXEQUALIZER_DEFAULTMID2CENTER: f32 = 3000.0;

pub const EAXEQUALIZER_MINMID2WIDTH: f32 = 0.01;
pub const EAXEQUALIZER_MAXMID2WIDTH: f32 = 1.0;
pub const EAXEQUALIZER_DEFAULTMID2WIDTH: f32 = 1.0;

pub const EAXEQUALIZER_MINHIGHGAIN: i32 = -1800;
pub const EAXEQUALIZER_MAXHIGHGAIN: i32 = 1800;
pub const EAXEQUALIZER_DEFAULTHIGHGAIN: i32 = 0;

pub const EAXEQUALIZER_MINHIGHCUTOFF: f32 = 4000.0;
pub const EAXEQUALIZER_MAXHIGHCUTOFF: f32 = 16000.0;
pub const EAXEQUALIZER_DEFAULTHIGHCUTOFF: f32 = 6000.0;

const AL_EQUALIZER_MIN_LOWGAIN: f32 = 0.126;
const AL_EQUALIZER_MAX_LOWGAIN: f32 = 7.943;
const AL_EQUALIZER_MIN_LOWCUTOFF: f32 = 50.0;
const AL_EQUALIZER_MAX_LOWCUTOFF: f32 = 800.0;
const AL_EQUALIZER_MIN_MID1GAIN: f32 = 0.126;
const AL_EQUALIZER_MAX_MID1GAIN: f32 = 7.943;
const AL_EQUALIZER_MIN_MID1CENTER: f32 = 200.0;
const AL_EQUALIZER_MAX_MID1CENTER: f32 = 3000.0;
const AL_EQUALIZER_MIN_MID1WIDTH: f32 = 0.01;
const AL_EQUALIZER_MAX_MID1WIDTH: f32 = 1.0;
const AL_EQUALIZER_MIN_MID2GAIN: f32 = 0.126;
const AL_EQUALIZER_MAX_MID2GAIN: f32 = 7.943;
const AL_EQUALIZER_MIN_MID2CENTER: f32 = 1000.0;
const AL_EQUALIZER_MAX_MID2CENTER: f32 = 8000.0;
const AL_EQUALIZER_MIN_MID2WIDTH: f32 = 0.01;
const AL_EQUALIZER_MAX_MID2WIDTH: f32 = 1.0;
const AL_EQUALIZER_MIN_HIGHGAIN: f32 = 0.126;
const AL_EQUALIZER_MAX_HIGHGAIN: f32 = 7.943;
const AL_EQUALIZER_MIN_HIGHCUTOFF: f32 = 4000.0;
const AL_EQUALIZER_MAX_HIGHCUTOFF: f32 = 16000.0;

/// EAX equalizer properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EqualizerProperties {
    pub low_gain: i32,
    pub low_cutoff: f32,
    pub mid1_gain: i32,
    pub mid1_center: f32,
    pub mid1_width: f32,
    pub mid2_gain: i32,
    pub mid2_center: f32,
    pub mid2_width: f32,
    pub high_gain: i32,
    pub high_cutoff: f32,
}

impl Default for EqualizerProperties {
    fn default() -> Self {
        Self {
            low_gain: EAXEQUALIZER_DEFAULTLOWGAIN,
            low_cutoff: EAXEQUALIZER_DEFAULTLOWCUTOFF,
            mid1_gain: EAXEQUALIZER_DEFAULTMID1GAIN,
            mid1_center: EAXEQUALIZER_DEFAULTMID1CENTER,
            mid1_width: EAXEQUALIZER_DEFAULTMID1WIDTH,
            mid2_gain: EAXEQUALIZER_DEFAULTMID2GAIN,
            mid2_center: EAXEQUALIZER_DEFAULTMID2CENTER,
            mid2_width: EAXEQUALIZER_DEFAULTMID2WIDTH,
            high_gain: EAXEQUALIZER_DEFAULTHIGHGAIN,
            high_cutoff: EAXEQUALIZER_DEFAULTHIGHCUTOFF,
        }
    }
}

crate::dirty_fields! {
    enum EqualizerField {
        LowGain,
        LowCutoff,
        Mid1Gain,
        Mid1Center,
        Mid1Width,
        Mid2Gain,
        Mid2Center,
        Mid2Width,
        HighGain,
        HighCutoff,
    }
}

#[derive(Debug)]
pub struct EqualizerEffect {
    effect: EffectId,
    eax: EqualizerProperties,
    eax_d: EqualizerProperties,
    dirty: DirtySet<EqualizerField>,
}

impl EqualizerEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Equalizer)?;
        let this = Self {
            effect,
            eax: EqualizerProperties::default(),
            eax_d: EqualizerProperties::default(),
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
    pub fn properties(&self) -> &EqualizerProperties {
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
            EAXEQUALIZER_NONE => Ok(()),
            EAXEQUALIZER_ALLPARAMETERS => call.set_value(&self.eax),
            EAXEQUALIZER_LOWGAIN => call.set_value(&self.eax.low_gain),
            EAXEQUALIZER_LOWCUTOFF => call.set_value(&self.eax.low_cutoff),
            EAXEQUALIZER_MID1GAIN => call.set_value(&self.eax.mid1_gain),
            EAXEQUALIZER_MID1CENTER => call.set_value(&self.eax.mid1_center),
            EAXEQUALIZER_MID1WIDTH => call.set_value(&self.eax.mid1_width),
            EAXEQUALIZER_MID2GAIN => call.set_value(&self.eax.mid2_gain),
            EAXEQUALIZER_MID2CENTER => call.set_value(&self.eax.mid2_center),
            EAXEQUALIZER_MID2WIDTH => call.set_value(&self.eax.mid2_width),
            EAXEQUALIZER_HIGHGAIN => call.set_value(&self.eax.high_gain),
            EAXEQUALIZER_HIGHCUTOFF => call.set_value(&self.eax.high_cutoff),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXEQUALIZER_NONE => Ok(()),
            EAXEQUALIZER_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXEQUALIZER_LOWGAIN => self.defer_low_gain(call.get_value()?),
            EAXEQUALIZER_LOWCUTOFF => self.defer_low_cutoff(call.get_value()?),
            EAXEQUALIZER_MID1GAIN => self.defer_mid1_gain(call.get_value()?),
            EAXEQUALIZER_MID1CENTER => self.defer_mid1_center(call.get_value()?),
            EAXEQUALIZER_MID1WIDTH => self.defer_mid1_width(call.get_value()?),
            EAXEQUALIZER_MID2GAIN => self.defer_mid2_gain(call.get_value()?),
            EAXEQUALIZER_MID2CENTER => self.defer_mid2_center(call.get_value()?),
            EAXEQUALIZER_MID2WIDTH => self.defer_mid2_width(call.get_value()?),
            EAXEQUALIZER_HIGHGAIN => self.defer_high_gain(call.get_value()?),
            EAXEQUALIZER_HIGHCUTOFF => self.defer_high_cutoff(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_low_gain(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "LowGain", value, EAXEQUALIZER_MINLOWGAIN, EAXEQUALIZER_MAXLOWGAIN)
    }

    fn validate_low_cutoff(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "LowCutoff", value, EAXEQUALIZER_MINLOWCUTOFF, EAXEQUALIZER_MAXLOWCUTOFF)
    }

    fn validate_mid1_gain(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Mid1Gain", value, EAXEQUALIZER_MINMID1GAIN, EAXEQUALIZER_MAXMID1GAIN)
    }

    fn validate_mid1_center(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Mid1Center", value, EAXEQUALIZER_MINMID1CENTER, EAXEQUALIZER_MAXMID1CENTER)
    }

    fn validate_mid1_width(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Mid1Width", value, EAXEQUALIZER_MINMID1WIDTH, EAXEQUALIZER_MAXMID1WIDTH)
    }

    fn validate_mid2_gain(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Mid2Gain", value, EAXEQUALIZER_MINMID2GAIN, EAXEQUALIZER_MAXMID2GAIN)
    }

    fn validate_mid2_center(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Mid2Center", value, EAXEQUALIZER_MINMID2CENTER, EAXEQUALIZER_MAXMID2CENTER)
    }

    fn validate_mid2_width(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Mid2Width", value, EAXEQUALIZER_MINMID2WIDTH, EAXEQUALIZER_MAXMID2WIDTH)
    }

    fn validate_high_gain(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "HighGain", value, EAXEQUALIZER_MINHIGHGAIN, EAXEQUALIZER_MAXHIGHGAIN)
    }

    fn validate_high_cutoff(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "HighCutoff", value, EAXEQUALIZER_MINHIGHCUTOFF, EAXEQUALIZER_MAXHIGHCUTOFF)
    }

    fn validate_all(props: &EqualizerProperties) -> EaxResult<()> {
        Self::validate_low_gain(props.low_gain)?;
        Self::validate_low_cutoff(props.low_cutoff)?;
        Self::validate_mid1_gain(props.mid1_gain)?;
        Self::validate_mid1_center(props.mid1_center)?;
        Self::validate_mid1_width(props.mid1_width)?;
        Self::validate_mid2_gain(props.mid2_gain)?;
        Self::validate_mid2_center(props.mid2_center)?;
        Self::validate_mid2_width(props.mid2_width)?;
        Self::validate_high_gain(props.high_gain)?;
        Self::validate_high_cutoff(props.high_cutoff)?;
        Ok(())
    }

    fn defer_low_gain(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_low_gain(value)?;
        self.eax_d.low_gain = value;
        self.dirty.assign(EqualizerField::LowGain, self.eax.low_gain != self.eax_d.low_gain);
        Ok(())
    }

    fn defer_low_cutoff(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_low_cutoff(value)?;
        self.eax_d.low_cutoff = value;
        self.dirty.assign(EqualizerField::LowCutoff, self.eax.low_cutoff != self.eax_d.low_cutoff);
        Ok(())
    }

    fn defer_mid1_gain(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_mid1_gain(value)?;
        self.eax_d.mid1_gain = value;
        self.dirty.assign(EqualizerField::Mid1Gain, self.eax.mid1_gain != self.eax_d.mid1_gain);
        Ok(())
    }

    fn defer_mid1_center(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_mid1_center(value)?;
        self.eax_d.mid1_center = value;
        self.dirty.assign(EqualizerField::Mid1Center, self.eax.mid1_center != self.eax_d.mid1_center);
        Ok(())
    }

    fn defer_mid1_width(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_mid1_width(value)?;
        self.eax_d.mid1_width = value;
        self.dirty.assign(EqualizerField::Mid1Width, self.eax.mid1_width != self.eax_d.mid1_width);
        Ok(())
    }

    fn defer_mid2_gain(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_mid2_gain(value)?;
        self.eax_d.mid2_gain = value;
        self.dirty.assign(EqualizerField::Mid2Gain, self.eax.mid2_gain != self.eax_d.mid2_gain);
        Ok(())
    }

    fn defer_mid2_center(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_mid2_center(value)?;
        self.eax_d.mid2_center = value;
        self.dirty.assign(EqualizerField::Mid2Center, self.eax.mid2_center != self.eax_d.mid2_center);
        Ok(())
    }

    fn defer_mid2_width(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_mid2_width(value)?;
        self.eax_d.mid2_width = value;
        self.dirty.assign(EqualizerField::Mid2Width, self.eax.mid2_width != self.eax_d.mid2_width);
        Ok(())
    }

    fn defer_high_gain(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_high_gain(value)?;
        self.eax_d.high_gain = value;
        self.dirty.assign(EqualizerField::HighGain, self.eax.high_gain != self.eax_d.high_gain);
        Ok(())
    }

    fn defer_high_cutoff(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_high_cutoff(value)?;
        self.eax_d.high_cutoff = value;
        self.dirty.assign(EqualizerField::HighCutoff, self.eax.high_cutoff != self.eax_d.high_cutoff);
        Ok(())
    }

    fn defer_all(&mut self, props: &EqualizerProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_low_gain(props.low_gain)?;
        self.defer_low_cutoff(props.low_cutoff)?;
        self.defer_mid1_gain(props.mid1_gain)?;
        self.defer_mid1_center(props.mid1_center)?;
        self.defer_mid1_width(props.mid1_width)?;
        self.defer_mid2_gain(props.mid2_gain)?;
        self.defer_mid2_center(props.mid2_center)?;
        self.defer_mid2_width(props.mid2_width)?;
        self.defer_high_gain(props.high_gain)?;
        self.defer_high_cutoff(props.high_cutoff)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(EqualizerField::LowGain) {
            self.set_efx_low_gain(backend)?;
        }

        if self.dirty.contains(EqualizerField::LowCutoff) {
            self.set_efx_low_cutoff(backend)?;
        }

        if self.dirty.contains(EqualizerField::Mid1Gain) {
            self.set_efx_mid1_gain(backend)?;
        }

        if self.dirty.contains(EqualizerField::Mid1Center) {
            self.set_efx_mid1_center(backend)?;
        }

        if self.dirty.contains(EqualizerField::Mid1Width) {
            self.set_efx_mid1_width(backend)?;
        }

        if self.dirty.contains(EqualizerField::Mid2Gain) {
            self.set_efx_mid2_gain(backend)?;
        }

        if self.dirty.contains(EqualizerField::Mid2Center) {
            self.set_efx_mid2_center(backend)?;
        }

        if self.dirty.contains(EqualizerField::Mid2Width) {
            self.set_efx_mid2_width(backend)?;
        }

        if self.dirty.contains(EqualizerField::HighGain) {
            self.set_efx_high_gain(backend)?;
        }

        if self.dirty.contains(EqualizerField::HighCutoff) {
            self.set_efx_high_cutoff(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_low_gain(backend)?;
        self.set_efx_low_cutoff(backend)?;
        self.set_efx_mid1_gain(backend)?;
        self.set_efx_mid1_center(backend)?;
        self.set_efx_mid1_width(backend)?;
        self.set_efx_mid2_gain(backend)?;
        self.set_efx_mid2_center(backend)?;
        self.set_efx_mid2_width(backend)?;
        self.set_efx_high_gain(backend)?;
        self.set_efx_high_cutoff(backend)?;
        Ok(())
    }

    fn set_efx_low_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerLowGain,
            level_mb_to_gain(self.eax.low_gain as f32),
            AL_EQUALIZER_MIN_LOWGAIN,
            AL_EQUALIZER_MAX_LOWGAIN,
        )
    }

    fn set_efx_low_cutoff(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerLowCutoff,
            self.eax.low_cutoff,
            AL_EQUALIZER_MIN_LOWCUTOFF,
            AL_EQUALIZER_MAX_LOWCUTOFF,
        )
    }

    fn set_efx_mid1_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerMid1Gain,
            level_mb_to_gain(self.eax.mid1_gain as f32),
            AL_EQUALIZER_MIN_MID1GAIN,
            AL_EQUALIZER_MAX_MID1GAIN,
        )
    }

    fn set_efx_mid1_center(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerMid1Center,
            self.eax.mid1_center,
            AL_EQUALIZER_MIN_MID1CENTER,
            AL_EQUALIZER_MAX_MID1CENTER,
        )
    }

    fn set_efx_mid1_width(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerMid1Width,
            self.eax.mid1_width,
            AL_EQUALIZER_MIN_MID1WIDTH,
            AL_EQUALIZER_MAX_MID1WIDTH,
        )
    }

    fn set_efx_mid2_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerMid2Gain,
            level_mb_to_gain(self.eax.mid2_gain as f32),
            AL_EQUALIZER_MIN_MID2GAIN,
            AL_EQUALIZER_MAX_MID2GAIN,
        )
    }

    fn set_efx_mid2_center(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerMid2Center,
            self.eax.mid2_center,
            AL_EQUALIZER_MIN_MID2CENTER,
            AL_EQUALIZER_MAX_MID2CENTER,
        )
    }

    fn set_efx_mid2_width(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerMid2Width,
            self.eax.mid2_width,
            AL_EQUALIZER_MIN_MID2WIDTH,
            AL_EQUALIZER_MAX_MID2WIDTH,
        )
    }

    fn set_efx_high_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerHighGain,
            level_mb_to_gain(self.eax.high_gain as f32),
            AL_EQUALIZER_MIN_HIGHGAIN,
            AL_EQUALIZER_MAX_HIGHGAIN,
        )
    }

    fn set_efx_high_cutoff(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::EqualizerHighCutoff,
            self.eax.high_cutoff,
            AL_EQUALIZER_MIN_HIGHCUTOFF,
            AL_EQUALIZER_MAX_HIGHCUTOFF,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, EqualizerEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = EqualizerEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut EqualizerEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> EqualizerProperties {
        let mut buf = [0u8; size_of::<EqualizerProperties>()];
        effect.dispatch(&mut effect_get(EAXEQUALIZER_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), EqualizerProperties::default());
    }

    #[test]
    fn test_set_mid1_gain_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&600_i32).to_vec();
        effect.dispatch(&mut effect_set(EAXEQUALIZER_MID1GAIN, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().mid1_gain, 600_i32);
        assert_eq!(backend.slot_param(slot, EfxParam::EqualizerMid1Gain), Some(EfxValue::Float(level_mb_to_gain(600.0))));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&600_i32).to_vec();
        effect.dispatch(&mut effect_set(EAXEQUALIZER_MID1GAIN, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).mid1_gain, EAXEQUALIZER_DEFAULTMID1GAIN);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).mid1_gain, 600_i32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&1900_i32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXEQUALIZER_MID1GAIN, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().mid1_gain, EAXEQUALIZER_DEFAULTMID1GAIN);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = EqualizerProperties {
            mid1_gain: 600_i32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXEQUALIZER_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
