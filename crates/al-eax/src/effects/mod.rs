//! EAX effect handlers
//!
//! One handler per effect type. Each keeps a committed and a deferred copy
//! of its EAX property struct plus a per-field dirty set, validates incoming
//! values against the EAX ranges, and converts committed values into native
//! effect parameters clamped to the native ranges.

pub mod auto_wah;
pub mod chorus;
pub mod compressor;
pub mod distortion;
pub mod echo;
pub mod equalizer;
pub mod flanger;
pub mod frequency_shifter;
pub mod null;
pub mod pitch_shifter;
pub mod reverb;
pub mod reverb_presets;
pub mod ring_modulator;
pub mod vocal_morpher;

pub use auto_wah::AutoWahEffect;
pub use chorus::ChorusEffect;
pub use compressor::CompressorEffect;
pub use distortion::DistortionEffect;
pub use echo::EchoEffect;
pub use equalizer::EqualizerEffect;
pub use flanger::FlangerEffect;
pub use frequency_shifter::FrequencyShifterEffect;
pub use null::NullEffect;
pub use pitch_shifter::PitchShifterEffect;
pub use reverb::ReverbEffect;
pub use ring_modulator::RingModulatorEffect;
pub use vocal_morpher::VocalMorpherEffect;

use crate::backend::{EffectId, EfxBackend, EfxParam, EfxValue};
use crate::call::PropertyCall;
use crate::error::{EaxError, EaxResult};
use crate::backend::EffectSlotId;
use crate::guids::*;
use al_core::{Guid, clamp_f32};

/// EAX effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectType {
    Null,
    AutoWah,
    Chorus,
    Compressor,
    Distortion,
    Echo,
    Equalizer,
    Flanger,
    FrequencyShifter,
    PitchShifter,
    Reverb,
    RingModulator,
    VocalMorpher,
}

impl EffectType {
    pub const COUNT: usize = 13;

    pub const ALL: [EffectType; Self::COUNT] = [
        Self::Null,
        Self::AutoWah,
        Self::Chorus,
        Self::Compressor,
        Self::Distortion,
        Self::Echo,
        Self::Equalizer,
        Self::Flanger,
        Self::FrequencyShifter,
        Self::PitchShifter,
        Self::Reverb,
        Self::RingModulator,
        Self::VocalMorpher,
    ];

    /// Effect type for a load-effect GUID; the null GUID selects `Null`
    pub fn from_guid(guid: &Guid) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.guid() == *guid)
    }

    pub fn guid(self) -> Guid {
        match self {
            Self::Null => EAX_NULL_GUID,
            Self::AutoWah => EAX_AUTOWAH_EFFECT,
            Self::Chorus => EAX_CHORUS_EFFECT,
            Self::Compressor => EAX_AGCCOMPRESSOR_EFFECT,
            Self::Distortion => EAX_DISTORTION_EFFECT,
            Self::Echo => EAX_ECHO_EFFECT,
            Self::Equalizer => EAX_EQUALIZER_EFFECT,
            Self::Flanger => EAX_FLANGER_EFFECT,
            Self::FrequencyShifter => EAX_FREQUENCYSHIFTER_EFFECT,
            Self::PitchShifter => EAX_PITCHSHIFTER_EFFECT,
            Self::Reverb => EAX_REVERB_EFFECT,
            Self::RingModulator => EAX_RINGMODULATOR_EFFECT,
            Self::VocalMorpher => EAX_VOCALMORPHER_EFFECT,
        }
    }

    /// Position in `ALL`
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::AutoWah => "AutoWah",
            Self::Chorus => "Chorus",
            Self::Compressor => "Compressor",
            Self::Distortion => "Distortion",
            Self::Echo => "Echo",
            Self::Equalizer => "Equalizer",
            Self::Flanger => "Flanger",
            Self::FrequencyShifter => "FrequencyShifter",
            Self::PitchShifter => "PitchShifter",
            Self::Reverb => "Reverb",
            Self::RingModulator => "RingModulator",
            Self::VocalMorpher => "VocalMorpher",
        }
    }
}

/// The active effect of an FX slot
#[derive(Debug)]
pub enum EffectHandler {
    Null(NullEffect),
    AutoWah(AutoWahEffect),
    Chorus(ChorusEffect),
    Compressor(CompressorEffect),
    Distortion(DistortionEffect),
    Echo(EchoEffect),
    Equalizer(EqualizerEffect),
    Flanger(FlangerEffect),
    FrequencyShifter(FrequencyShifterEffect),
    PitchShifter(PitchShifterEffect),
    Reverb(ReverbEffect),
    RingModulator(RingModulatorEffect),
    VocalMorpher(VocalMorpherEffect),
}

impl EffectHandler {
    /// Create the native effect for `effect_type` with its EAX defaults applied
    pub fn new(effect_type: EffectType, backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let handler = match effect_type {
            EffectType::Null => Self::Null(NullEffect::new(backend)?),
            EffectType::AutoWah => Self::AutoWah(AutoWahEffect::new(backend)?),
            EffectType::Chorus => Self::Chorus(ChorusEffect::new(backend)?),
            EffectType::Compressor => Self::Compressor(CompressorEffect::new(backend)?),
            EffectType::Distortion => Self::Distortion(DistortionEffect::new(backend)?),
            EffectType::Echo => Self::Echo(EchoEffect::new(backend)?),
            EffectType::Equalizer => Self::Equalizer(EqualizerEffect::new(backend)?),
            EffectType::Flanger => Self::Flanger(FlangerEffect::new(backend)?),
            EffectType::FrequencyShifter => Self::FrequencyShifter(FrequencyShifterEffect::new(backend)?),
            EffectType::PitchShifter => Self::PitchShifter(PitchShifterEffect::new(backend)?),
            EffectType::Reverb => Self::Reverb(ReverbEffect::new(backend)?),
            EffectType::RingModulator => Self::RingModulator(RingModulatorEffect::new(backend)?),
            EffectType::VocalMorpher => Self::VocalMorpher(VocalMorpherEffect::new(backend)?),
        };
        Ok(handler)
    }

    pub fn effect_type(&self) -> EffectType {
        match self {
            Self::Null(_) => EffectType::Null,
            Self::AutoWah(_) => EffectType::AutoWah,
            Self::Chorus(_) => EffectType::Chorus,
            Self::Compressor(_) => EffectType::Compressor,
            Self::Distortion(_) => EffectType::Distortion,
            Self::Echo(_) => EffectType::Echo,
            Self::Equalizer(_) => EffectType::Equalizer,
            Self::Flanger(_) => EffectType::Flanger,
            Self::FrequencyShifter(_) => EffectType::FrequencyShifter,
            Self::PitchShifter(_) => EffectType::PitchShifter,
            Self::Reverb(_) => EffectType::Reverb,
            Self::RingModulator(_) => EffectType::RingModulator,
            Self::VocalMorpher(_) => EffectType::VocalMorpher,
        }
    }

    /// Native effect owned by this handler
    pub fn effect_id(&self) -> EffectId {
        match self {
            Self::Null(e) => e.effect_id(),
            Self::AutoWah(e) => e.effect_id(),
            Self::Chorus(e) => e.effect_id(),
            Self::Compressor(e) => e.effect_id(),
            Self::Distortion(e) => e.effect_id(),
            Self::Echo(e) => e.effect_id(),
            Self::Equalizer(e) => e.effect_id(),
            Self::Flanger(e) => e.effect_id(),
            Self::FrequencyShifter(e) => e.effect_id(),
            Self::PitchShifter(e) => e.effect_id(),
            Self::Reverb(e) => e.effect_id(),
            Self::RingModulator(e) => e.effect_id(),
            Self::VocalMorpher(e) => e.effect_id(),
        }
    }

    /// Bind the native effect to `slot`
    pub fn load(&self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        backend.set_slot_effect(slot, self.effect_id())
    }

    /// Get or set an effect property
    pub fn dispatch(
        &mut self,
        call: &mut PropertyCall<'_>,
        backend: &mut dyn EfxBackend,
        slot: EffectSlotId,
    ) -> EaxResult<()> {
        match self {
            Self::Null(e) => e.dispatch(call),
            Self::AutoWah(e) => e.dispatch(call, backend, slot),
            Self::Chorus(e) => e.dispatch(call, backend, slot),
            Self::Compressor(e) => e.dispatch(call, backend, slot),
            Self::Distortion(e) => e.dispatch(call, backend, slot),
            Self::Echo(e) => e.dispatch(call, backend, slot),
            Self::Equalizer(e) => e.dispatch(call, backend, slot),
            Self::Flanger(e) => e.dispatch(call, backend, slot),
            Self::FrequencyShifter(e) => e.dispatch(call, backend, slot),
            Self::PitchShifter(e) => e.dispatch(call, backend, slot),
            Self::Reverb(e) => e.dispatch(call, backend, slot),
            Self::RingModulator(e) => e.dispatch(call, backend, slot),
            Self::VocalMorpher(e) => e.dispatch(call, backend, slot),
        }
    }

    /// Commit staged values
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        match self {
            Self::Null(_) => Ok(()),
            Self::AutoWah(e) => e.apply_deferred(backend, slot),
            Self::Chorus(e) => e.apply_deferred(backend, slot),
            Self::Compressor(e) => e.apply_deferred(backend, slot),
            Self::Distortion(e) => e.apply_deferred(backend, slot),
            Self::Echo(e) => e.apply_deferred(backend, slot),
            Self::Equalizer(e) => e.apply_deferred(backend, slot),
            Self::Flanger(e) => e.apply_deferred(backend, slot),
            Self::FrequencyShifter(e) => e.apply_deferred(backend, slot),
            Self::PitchShifter(e) => e.apply_deferred(backend, slot),
            Self::Reverb(e) => e.apply_deferred(backend, slot),
            Self::RingModulator(e) => e.apply_deferred(backend, slot),
            Self::VocalMorpher(e) => e.apply_deferred(backend, slot),
        }
    }

    /// Release the native effect
    pub fn release(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        backend.delete_effect(self.effect_id())
    }
}

/// Error for a property id the effect does not know
pub(crate) fn unsupported_property(owner: &str, property_id: u32) -> EaxError {
    EaxError::protocol(format!("Unsupported {owner} property id {property_id}"))
}

/// Set a float parameter clamped to the native range
pub(crate) fn set_efx_float(
    backend: &mut dyn EfxBackend,
    effect: EffectId,
    param: EfxParam,
    value: f32,
    min: f32,
    max: f32,
) -> EaxResult<()> {
    backend.set_effect_param(effect, param, EfxValue::Float(clamp_f32(value, min, max)))
}

/// Set an integer parameter clamped to the native range
pub(crate) fn set_efx_int(
    backend: &mut dyn EfxBackend,
    effect: EffectId,
    param: EfxParam,
    value: i32,
    min: i32,
    max: i32,
) -> EaxResult<()> {
    backend.set_effect_param(effect, param, EfxValue::Int(value.clamp(min, max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBackend;

    #[test]
    fn test_guid_table() {
        assert_eq!(EffectType::from_guid(&EAX_NULL_GUID), Some(EffectType::Null));
        assert_eq!(EffectType::from_guid(&EAX_REVERB_EFFECT), Some(EffectType::Reverb));
        assert_eq!(EffectType::from_guid(&EAX_AGCCOMPRESSOR_EFFECT), Some(EffectType::Compressor));
        assert_eq!(EffectType::from_guid(&EAXPROPERTYID_EAX40_SOURCE), None);
        for (i, t) in EffectType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn test_every_handler_constructs() {
        let mut backend = RecordingBackend::new();
        for t in EffectType::ALL {
            let handler = EffectHandler::new(t, &mut backend).unwrap();
            assert_eq!(handler.effect_type(), t);
            assert!(backend.effect(handler.effect_id()).is_some());
        }
    }
}
