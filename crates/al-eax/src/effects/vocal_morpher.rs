//! Vocal morpher effect
//!
//! Phonemes are indices 0..=29 (A, E, I, O, U, AA, AE, ... Z).

use super::{set_efx_float, set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "VocalMorpher";

pub const EAXVOCALMORPHER_NONE: u32 = 0;
pub const EAXVOCALMORPHER_ALLPARAMETERS: u32 = 1;
pub const EAXVOCALMORPHER_PHONEMEA: u32 = 2;
pub const EAXVOCALMORPHER_PHONEMEACOARSETUNING: u32 = 3;
pub const EAXVOCALMORPHER_PHONEMEB: u32 = 4;
pub const EAXVOCALMORPHER_PHONEMEBCOARSETUNING: u32 = 5;
pub const EAXVOCALMORPHER_WAVEFORM: u32 = 6;
pub const EAXVOCALMORPHER_RATE: u32 = 7;

pub const EAX_VOCALMORPHER_SINUSOID: u32 = 0;
pub const EAX_VOCALMORPHER_TRIANGLE: u32 = 1;
pub const EAX_VOCALMORPHER_SAWTOOTH: u32 = 2;

pub const EAXVOCALMORPHER_MINPHONEMEA: u32 = 0;
pub const EAXVOCALMORPHER_MAXPHONEMEA: u32 = 29;
pub const EAXVOCALMORPHER_DEFAULTPHONEMEA: u32 = 0;

pub const EAXVOCALMORPHER_MINPHONEMEACOARSETUNING: i32 = -24;
pub const EAXVOCALMORPHER_MAXPHONEMEACOARSETUNING: i32 = 24;
pub const EAXVOCALMORPHER_DEFAULTPHONEMEACOARSETUNING: i32 = 0;

pub const EAXVOCALMORPHER_MINPHONEMEB: u32 = 0;
pub const EAXVOCALMORPHER_MAXPHONEMEB: u32 = 29;
pub const EAXVOCALMORPHER_DEFAULTPHONEMEB: u32 = 10;

pub const EAXVOCALMORPHER_MINPHONEMEBCOARSETUNING: i32 = -24;
pub const EAXVOCALMORPHER_MAXPHONEMEBCOARSETUNING: i32 = 24;
pub const EAXVOCALMORPHER_DEFAULTPHONEMEBCOARSETUNING: i32 = 0;

pub const EAXVOCALMORPHER_MINWAVEFORM: u32 = 0;
pub const EAXVOCALMORPHER_MAXWAVEFORM: u32 = 2;
pub const EAXVOCALMORPHER_DEFAULTWAVEFORM: u32 = EAX_VOCALMORPHER_SINUSOID;

pub const EAXVOCALMORPHER_MINRATE: f32 = 0.0;
pub const EAXVOCALMORPHER_MAXRATE: f32 = 10.0;
pub const EAXVOCALMORPHER_DEFAULTRATE: f32 = 1.41;

const AL_VOCAL_MORPHER_MIN_PHONEMEA: i32 = 0;
const AL_VOCAL_MORPHER_MAX_PHONEMEA: i32 = 29;
const AL_VOCAL_MORPHER_MIN_PHONEMEACOARSETUNING: i32 = -24;
const AL_VOCAL_MORPHER_MAX_PHONEMEACOARSETUNING: i32 = 24;
const AL_VOCAL_MORPHER_MIN_PHONEMEB: i32 = 0;
const AL_VOCAL_MORPHER_MAX_PHONEMEB: i32 = 29;
const AL_VOCAL_MORPHER_MIN_PHONEMEBCOARSETUNING: i32 = -24;
const AL_VOCAL_MORPHER_MAX_PHONEMEBCOARSETUNING: i32 = 24;
const AL_VOCAL_MORPHER_MIN_WAVEFORM: i32 = 0;
const AL_VOCAL_MORPHER_MAX_WAVEFORM: i32 = 2;
const AL_VOCAL_MORPHER_MIN_RATE: f32 = 0.0;
const AL_VOCAL_MORPHER_MAX_RATE: f32 = 10.0;

/// EAX vocalmorpher properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VocalMorpherProperties {
    pub phoneme_a: u32,
    pub phoneme_a_coarse_tuning: i32,
    pub phoneme_b: u32,
    pub phoneme_b_coarse_tuning: i32,
    pub waveform: u32,
    pub rate: f32,
}

impl Default for VocalMorpherProperties {
    fn default() -> Self {
        Self {
            phoneme_a: EAXVOCALMORPHER_DEFAULTPHONEMEA,
            phoneme_a_coarse_tuning: EAXVOCALMORPHER_DEFAULTPHONEMEACOARSETUNING,
            phoneme_b: EAXVOCALMORPHER_DEFAULTPHONEMEB,
            phoneme_b_coarse_tuning: EAXVOCALMORPHER_DEFAULTPHONEMEBCOARSETUNING,
            waveform: EAXVOCALMORPHER_DEFAULTWAVEFORM,
            rate: EAXVOCALMORPHER_DEFAULTRATE,
        }
    }
}

crate::dirty_fields! {
    enum VocalMorpherField {
        PhonemeA,
        PhonemeACoarseTuning,
        PhonemeB,
        PhonemeBCoarseTuning,
        Waveform,
        Rate,
    }
}

#[derive(Debug)]
pub struct VocalMorpherEffect {
    effect: EffectId,
    eax: VocalMorpherProperties,
    eax_d: VocalMorpherProperties,
    dirty: DirtySet<VocalMorpherField>,
}

impl VocalMorpherEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::VocalMorpher)?;
        let this = Self {
            effect,
            eax: VocalMorpherProperties::default(),
            eax_d: VocalMorpherProperties::default(),
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
    pub fn properties(&self) -> &VocalMorpherProperties {
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
            EAXVOCALMORPHER_NONE => Ok(()),
            EAXVOCALMORPHER_ALLPARAMETERS => call.set_value(&self.eax),
            EAXVOCALMORPHER_PHONEMEA => call.set_value(&self.eax.phoneme_a),
            EAXVOCALMORPHER_PHONEMEACOARSETUNING => call.set_value(&self.eax.phoneme_a_coarse_tuning),
            EAXVOCALMORPHER_PHONEMEB => call.set_value(&self.eax.phoneme_b),
            EAXVOCALMORPHER_PHONEMEBCOARSETUNING => call.set_value(&self.eax.phoneme_b_coarse_tuning),
            EAXVOCALMORPHER_WAVEFORM => call.set_value(&self.eax.waveform),
            EAXVOCALMORPHER_RATE => call.set_value(&self.eax.rate),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXVOCALMORPHER_NONE => Ok(()),
            EAXVOCALMORPHER_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXVOCALMORPHER_PHONEMEA => self.defer_phoneme_a(call.get_value()?),
            EAXVOCALMORPHER_PHONEMEACOARSETUNING => self.defer_phoneme_a_coarse_tuning(call.get_value()?),
            EAXVOCALMORPHER_PHONEMEB => self.defer_phoneme_b(call.get_value()?),
            EAXVOCALMORPHER_PHONEMEBCOARSETUNING => self.defer_phoneme_b_coarse_tuning(call.get_value()?),
            EAXVOCALMORPHER_WAVEFORM => self.defer_waveform(call.get_value()?),
            EAXVOCALMORPHER_RATE => self.defer_rate(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_phoneme_a(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "PhonemeA", value, EAXVOCALMORPHER_MINPHONEMEA, EAXVOCALMORPHER_MAXPHONEMEA)
    }

    fn validate_phoneme_a_coarse_tuning(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "PhonemeACoarseTuning", value, EAXVOCALMORPHER_MINPHONEMEACOARSETUNING, EAXVOCALMORPHER_MAXPHONEMEACOARSETUNING)
    }

    fn validate_phoneme_b(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "PhonemeB", value, EAXVOCALMORPHER_MINPHONEMEB, EAXVOCALMORPHER_MAXPHONEMEB)
    }

    fn validate_phoneme_b_coarse_tuning(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "PhonemeBCoarseTuning", value, EAXVOCALMORPHER_MINPHONEMEBCOARSETUNING, EAXVOCALMORPHER_MAXPHONEMEBCOARSETUNING)
    }

    fn validate_waveform(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "Waveform", value, EAXVOCALMORPHER_MINWAVEFORM, EAXVOCALMORPHER_MAXWAVEFORM)
    }

    fn validate_rate(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Rate", value, EAXVOCALMORPHER_MINRATE, EAXVOCALMORPHER_MAXRATE)
    }

    fn validate_all(props: &VocalMorpherProperties) -> EaxResult<()> {
        Self::validate_phoneme_a(props.phoneme_a)?;
        Self::validate_phoneme_a_coarse_tuning(props.phoneme_a_coarse_tuning)?;
        Self::validate_phoneme_b(props.phoneme_b)?;
        Self::validate_phoneme_b_coarse_tuning(props.phoneme_b_coarse_tuning)?;
        Self::validate_waveform(props.waveform)?;
        Self::validate_rate(props.rate)?;
        Ok(())
    }

    fn defer_phoneme_a(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_phoneme_a(value)?;
        self.eax_d.phoneme_a = value;
        self.dirty.assign(VocalMorpherField::PhonemeA, self.eax.phoneme_a != self.eax_d.phoneme_a);
        Ok(())
    }

    fn defer_phoneme_a_coarse_tuning(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_phoneme_a_coarse_tuning(value)?;
        self.eax_d.phoneme_a_coarse_tuning = value;
        self.dirty.assign(VocalMorpherField::PhonemeACoarseTuning, self.eax.phoneme_a_coarse_tuning != self.eax_d.phoneme_a_coarse_tuning);
        Ok(())
    }

    fn defer_phoneme_b(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_phoneme_b(value)?;
        self.eax_d.phoneme_b = value;
        self.dirty.assign(VocalMorpherField::PhonemeB, self.eax.phoneme_b != self.eax_d.phoneme_b);
        Ok(())
    }

    fn defer_phoneme_b_coarse_tuning(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_phoneme_b_coarse_tuning(value)?;
        self.eax_d.phoneme_b_coarse_tuning = value;
        self.dirty.assign(VocalMorpherField::PhonemeBCoarseTuning, self.eax.phoneme_b_coarse_tuning != self.eax_d.phoneme_b_coarse_tuning);
        Ok(())
    }

    fn defer_waveform(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_waveform(value)?;
        self.eax_d.waveform = value;
        self.dirty.assign(VocalMorpherField::Waveform, self.eax.waveform != self.eax_d.waveform);
        Ok(())
    }

    fn defer_rate(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_rate(value)?;
        self.eax_d.rate = value;
        self.dirty.assign(VocalMorpherField::Rate, self.eax.rate != self.eax_d.rate);
        Ok(())
    }

    fn defer_all(&mut self, props: &VocalMorpherProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_phoneme_a(props.phoneme_a)?;
        self.defer_phoneme_a_coarse_tuning(props.phoneme_a_coarse_tuning)?;
        self.defer_phoneme_b(props.phoneme_b)?;
        self.defer_phoneme_b_coarse_tuning(props.phoneme_b_coarse_tuning)?;
        self.defer_waveform(props.waveform)?;
        self.defer_rate(props.rate)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(VocalMorpherField::PhonemeA) {
            self.set_efx_phoneme_a(backend)?;
        }

        if self.dirty.contains(VocalMorpherField::PhonemeACoarseTuning) {
            self.set_efx_phoneme_a_coarse_tuning(backend)?;
        }

        if self.dirty.contains(VocalMorpherField::PhonemeB) {
            self.set_efx_phoneme_b(backend)?;
        }

        if self.dirty.contains(VocalMorpherField::PhonemeBCoarseTuning) {
            self.set_efx_phoneme_b_coarse_tuning(backend)?;
        }

        if self.dirty.contains(VocalMorpherField::Waveform) {
            self.set_efx_waveform(backend)?;
        }

        if self.dirty.contains(VocalMorpherField::Rate) {
            self.set_efx_rate(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_phoneme_a(backend)?;
        self.set_efx_phoneme_a_coarse_tuning(backend)?;
        self.set_efx_phoneme_b(backend)?;
        self.set_efx_phoneme_b_coarse_tuning(backend)?;
        self.set_efx_waveform(backend)?;
        self.set_efx_rate(backend)?;
        Ok(())
    }

    fn set_efx_phoneme_a(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::VocalMorpherPhonemeA,
            self.eax.phoneme_a as i32,
            AL_VOCAL_MORPHER_MIN_PHONEMEA,
            AL_VOCAL_MORPHER_MAX_PHONEMEA,
        )
    }

    fn set_efx_phoneme_a_coarse_tuning(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::VocalMorpherPhonemeACoarseTuning,
            self.eax.phoneme_a_coarse_tuning,
            AL_VOCAL_MORPHER_MIN_PHONEMEACOARSETUNING,
            AL_VOCAL_MORPHER_MAX_PHONEMEACOARSETUNING,
        )
    }

    fn set_efx_phoneme_b(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::VocalMorpherPhonemeB,
            self.eax.phoneme_b as i32,
            AL_VOCAL_MORPHER_MIN_PHONEMEB,
            AL_VOCAL_MORPHER_MAX_PHONEMEB,
        )
    }

    fn set_efx_phoneme_b_coarse_tuning(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::VocalMorpherPhonemeBCoarseTuning,
            self.eax.phoneme_b_coarse_tuning,
            AL_VOCAL_MORPHER_MIN_PHONEMEBCOARSETUNING,
            AL_VOCAL_MORPHER_MAX_PHONEMEBCOARSETUNING,
        )
    }

    fn set_efx_waveform(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::VocalMorpherWaveform,
            self.eax.waveform as i32,
            AL_VOCAL_MORPHER_MIN_WAVEFORM,
            AL_VOCAL_MORPHER_MAX_WAVEFORM,
        )
    }

    fn set_efx_rate(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::VocalMorpherRate,
            self.eax.rate,
            AL_VOCAL_MORPHER_MIN_RATE,
            AL_VOCAL_MORPHER_MAX_RATE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, VocalMorpherEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = VocalMorpherEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut VocalMorpherEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> VocalMorpherProperties {
        let mut buf = [0u8; size_of::<VocalMorpherProperties>()];
        effect.dispatch(&mut effect_get(EAXVOCALMORPHER_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), VocalMorpherProperties::default());
    }

    #[test]
    fn test_set_phoneme_b_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&20_u32).to_vec();
        effect.dispatch(&mut effect_set(EAXVOCALMORPHER_PHONEMEB, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().phoneme_b, 20_u32);
        assert_eq!(backend.slot_param(slot, EfxParam::VocalMorpherPhonemeB), Some(EfxValue::Int(20)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&20_u32).to_vec();
        effect.dispatch(&mut effect_set(EAXVOCALMORPHER_PHONEMEB, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).phoneme_b, EAXVOCALMORPHER_DEFAULTPHONEMEB);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).phoneme_b, 20_u32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&30_u32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXVOCALMORPHER_PHONEMEB, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().phoneme_b, EAXVOCALMORPHER_DEFAULTPHONEMEB);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = VocalMorpherProperties {
            phoneme_b: 20_u32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXVOCALMORPHER_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
