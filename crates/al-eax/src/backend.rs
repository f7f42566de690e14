//! Native effects backend
//!
//! The EAX layer never renders audio itself. It drives an EFX-style object
//! API (auxiliary effect slots, effects, low-pass filters, sources) through
//! the `EfxBackend` trait.

use crate::error::EaxResult;

/// Native auxiliary effect slot handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectSlotId(pub u32);

/// Native effect handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u32);

/// Native filter handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(pub u32);

/// Native source handle, also the `target_name` of source calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// Native effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EfxEffectType {
    Null,
    EaxReverb,
    Chorus,
    Distortion,
    Echo,
    Flanger,
    FrequencyShifter,
    VocalMorpher,
    PitchShifter,
    RingModulator,
    Autowah,
    Compressor,
    Equalizer,
}

/// Native effect parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EfxParam {
    // EAX reverb
    ReverbDensity,
    ReverbDiffusion,
    ReverbGain,
    ReverbGainHF,
    ReverbGainLF,
    ReverbDecayTime,
    ReverbDecayHFRatio,
    ReverbDecayLFRatio,
    ReverbReflectionsGain,
    ReverbReflectionsDelay,
    ReverbReflectionsPan,
    ReverbLateReverbGain,
    ReverbLateReverbDelay,
    ReverbLateReverbPan,
    ReverbEchoTime,
    ReverbEchoDepth,
    ReverbModulationTime,
    ReverbModulationDepth,
    ReverbAirAbsorptionGainHF,
    ReverbHFReference,
    ReverbLFReference,
    ReverbRoomRolloffFactor,
    ReverbDecayHFLimit,

    // Chorus
    ChorusWaveform,
    ChorusPhase,
    ChorusRate,
    ChorusDepth,
    ChorusFeedback,
    ChorusDelay,

    // Flanger
    FlangerWaveform,
    FlangerPhase,
    FlangerRate,
    FlangerDepth,
    FlangerFeedback,
    FlangerDelay,

    // Distortion
    DistortionEdge,
    DistortionGain,
    DistortionLowpassCutoff,
    DistortionEqCenter,
    DistortionEqBandwidth,

    // Echo
    EchoDelay,
    EchoLrDelay,
    EchoDamping,
    EchoFeedback,
    EchoSpread,

    // Equalizer
    EqualizerLowGain,
    EqualizerLowCutoff,
    EqualizerMid1Gain,
    EqualizerMid1Center,
    EqualizerMid1Width,
    EqualizerMid2Gain,
    EqualizerMid2Center,
    EqualizerMid2Width,
    EqualizerHighGain,
    EqualizerHighCutoff,

    // Frequency shifter
    FrequencyShifterFrequency,
    FrequencyShifterLeftDirection,
    FrequencyShifterRightDirection,

    // Pitch shifter
    PitchShifterCoarseTune,
    PitchShifterFineTune,

    // Ring modulator
    RingModulatorFrequency,
    RingModulatorHighpassCutoff,
    RingModulatorWaveform,

    // Vocal morpher
    VocalMorpherPhonemeA,
    VocalMorpherPhonemeACoarseTuning,
    VocalMorpherPhonemeB,
    VocalMorpherPhonemeBCoarseTuning,
    VocalMorpherWaveform,
    VocalMorpherRate,

    // Auto-wah
    AutowahAttackTime,
    AutowahReleaseTime,
    AutowahResonance,
    AutowahPeakGain,

    // Compressor
    CompressorOnOff,
}

/// Value carried by a native parameter call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EfxValue {
    Int(i32),
    Float(f32),
    Vector([f32; 3]),
}

impl EfxValue {
    /// Float payload, if any
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Integer payload, if any
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }
}

/// Float source parameters driven by EAX source state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceParam {
    ConeOuterGainHF,
    DopplerFactor,
    RolloffFactor,
    RoomRolloffFactor,
    AirAbsorptionFactor,
}

/// Boolean source parameters driven by EAX source flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFlag {
    DirectFilterGainHFAuto,
    AuxSendFilterGainAuto,
    AuxSendFilterGainHFAuto,
}

/// What the native implementation supports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EfxCaps {
    /// Effects extension present
    pub efx: bool,
    /// Auxiliary sends per source
    pub max_aux_sends: usize,
    /// Low-pass filter type supported
    pub lowpass_filter: bool,
    /// EAX reverb effect type supported
    pub eax_reverb: bool,
    /// Filter gains above 1.0 allowed
    pub filter_gain_ex: bool,
}

impl Default for EfxCaps {
    fn default() -> Self {
        Self {
            efx: true,
            max_aux_sends: 4,
            lowpass_filter: true,
            eax_reverb: true,
            filter_gain_ex: false,
        }
    }
}

/// Native object API the EAX layer drives
pub trait EfxBackend {
    /// Capabilities of the underlying implementation
    fn caps(&self) -> EfxCaps;

    fn create_effect_slot(&mut self) -> EaxResult<EffectSlotId>;
    fn delete_effect_slot(&mut self, slot: EffectSlotId) -> EaxResult<()>;

    fn create_effect(&mut self, effect_type: EfxEffectType) -> EaxResult<EffectId>;
    fn delete_effect(&mut self, effect: EffectId) -> EaxResult<()>;

    fn create_lowpass_filter(&mut self) -> EaxResult<FilterId>;
    fn delete_filter(&mut self, filter: FilterId) -> EaxResult<()>;

    fn set_effect_param(&mut self, effect: EffectId, param: EfxParam, value: EfxValue) -> EaxResult<()>;

    /// Bind (copy) an effect's current parameters into a slot
    fn set_slot_effect(&mut self, slot: EffectSlotId, effect: EffectId) -> EaxResult<()>;
    fn set_slot_gain(&mut self, slot: EffectSlotId, gain: f32) -> EaxResult<()>;
    fn set_slot_send_auto(&mut self, slot: EffectSlotId, send_auto: bool) -> EaxResult<()>;

    fn set_lowpass(&mut self, filter: FilterId, gain: f32, gain_hf: f32) -> EaxResult<()>;

    /// Attach (copy) a filter's current parameters to a source's direct path
    fn set_source_direct_filter(&mut self, source: SourceId, filter: FilterId) -> EaxResult<()>;

    /// Route a source send to a slot through a filter, or detach it with `None`
    fn set_source_send(
        &mut self,
        source: SourceId,
        send_index: usize,
        target: Option<(EffectSlotId, FilterId)>,
    ) -> EaxResult<()>;

    fn set_source_param(&mut self, source: SourceId, param: SourceParam, value: f32) -> EaxResult<()>;
    fn set_source_flag(&mut self, source: SourceId, flag: SourceFlag, value: bool) -> EaxResult<()>;

    fn set_listener_meters_per_unit(&mut self, meters_per_unit: f32) -> EaxResult<()>;
}
