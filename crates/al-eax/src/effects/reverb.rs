//! EAX reverb
//!
//! The listener environment. Besides the per-field validate/defer/apply
//! path shared by every effect it has two cross-field behaviors:
//!
//! - setting `ENVIRONMENT` replaces every field with one of 26 presets
//! - setting `ENVIRONMENTSIZE` rescales decay, reflections, reverb level,
//!   delays, echo and modulation time, each gated by a scale flag
//!
//! EAX 2.0 listener calls arrive here with their ids already remapped; only
//! the `ALLPARAMETERS` layout differs.

use super::reverb_presets::{EAX_ENVIRONMENT_COUNT, EAXREVERB_PRESETS};
use super::{set_efx_float, set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam, EfxValue};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::{validate_flags, validate_range};
use al_core::{gain_to_level_mb, level_mb_to_gain};
use bytemuck::{Pod, Zeroable};
use serde::Serialize;

const OWNER: &str = "Reverb";

pub const EAXREVERB_NONE: u32 = 0;
pub const EAXREVERB_ALLPARAMETERS: u32 = 1;
pub const EAXREVERB_ENVIRONMENT: u32 = 2;
pub const EAXREVERB_ENVIRONMENTSIZE: u32 = 3;
pub const EAXREVERB_ENVIRONMENTDIFFUSION: u32 = 4;
pub const EAXREVERB_ROOM: u32 = 5;
pub const EAXREVERB_ROOMHF: u32 = 6;
pub const EAXREVERB_ROOMLF: u32 = 7;
pub const EAXREVERB_DECAYTIME: u32 = 8;
pub const EAXREVERB_DECAYHFRATIO: u32 = 9;
pub const EAXREVERB_DECAYLFRATIO: u32 = 10;
pub const EAXREVERB_REFLECTIONS: u32 = 11;
pub const EAXREVERB_REFLECTIONSDELAY: u32 = 12;
pub const EAXREVERB_REFLECTIONSPAN: u32 = 13;
pub const EAXREVERB_REVERB: u32 = 14;
pub const EAXREVERB_REVERBDELAY: u32 = 15;
pub const EAXREVERB_REVERBPAN: u32 = 16;
pub const EAXREVERB_ECHOTIME: u32 = 17;
pub const EAXREVERB_ECHODEPTH: u32 = 18;
pub const EAXREVERB_MODULATIONTIME: u32 = 19;
pub const EAXREVERB_MODULATIONDEPTH: u32 = 20;
pub const EAXREVERB_AIRABSORPTIONHF: u32 = 21;
pub const EAXREVERB_HFREFERENCE: u32 = 22;
pub const EAXREVERB_LFREFERENCE: u32 = 23;
pub const EAXREVERB_ROOMROLLOFFFACTOR: u32 = 24;
pub const EAXREVERB_FLAGS: u32 = 25;

// Scale flags
pub const EAXREVERBFLAGS_DECAYTIMESCALE: u32 = 0x01;
pub const EAXREVERBFLAGS_REFLECTIONSSCALE: u32 = 0x02;
pub const EAXREVERBFLAGS_REFLECTIONSDELAYSCALE: u32 = 0x04;
pub const EAXREVERBFLAGS_REVERBSCALE: u32 = 0x08;
pub const EAXREVERBFLAGS_REVERBDELAYSCALE: u32 = 0x10;
pub const EAXREVERBFLAGS_DECAYHFLIMIT: u32 = 0x20;
pub const EAXREVERBFLAGS_ECHOTIMESCALE: u32 = 0x40;
pub const EAXREVERBFLAGS_MODULATIONTIMESCALE: u32 = 0x80;

const EAX2LISTENERFLAGS_RESERVED: u32 = 0xFFFF_FFC0;
const EAXREVERBFLAGS_RESERVED: u32 = 0xFFFF_FF00;

pub const EAXREVERB_MINENVIRONMENT: u32 = 0;
/// Highest environment accepted through `ENVIRONMENT` or in EAX 2.0
pub const EAX20REVERB_MAXENVIRONMENT: u32 = (EAX_ENVIRONMENT_COUNT - 1) as u32;
/// Highest environment accepted in an EAX 3.0+ full property set
pub const EAX30REVERB_MAXENVIRONMENT: u32 = EAX_ENVIRONMENT_COUNT as u32;
pub const EAXREVERB_DEFAULTENVIRONMENT: u32 = 0;

pub const EAXREVERB_MINENVIRONMENTSIZE: f32 = 1.0;
pub const EAXREVERB_MAXENVIRONMENTSIZE: f32 = 100.0;
pub const EAXREVERB_DEFAULTENVIRONMENTSIZE: f32 = 7.5;

pub const EAXREVERB_MINENVIRONMENTDIFFUSION: f32 = 0.0;
pub const EAXREVERB_MAXENVIRONMENTDIFFUSION: f32 = 1.0;
pub const EAXREVERB_DEFAULTENVIRONMENTDIFFUSION: f32 = 1.0;

pub const EAXREVERB_MINROOM: i32 = -10_000;
pub const EAXREVERB_MAXROOM: i32 = 0;
pub const EAXREVERB_DEFAULTROOM: i32 = -1_000;

pub const EAXREVERB_MINROOMHF: i32 = -10_000;
pub const EAXREVERB_MAXROOMHF: i32 = 0;
pub const EAXREVERB_DEFAULTROOMHF: i32 = -100;

pub const EAXREVERB_MINROOMLF: i32 = -10_000;
pub const EAXREVERB_MAXROOMLF: i32 = 0;
pub const EAXREVERB_DEFAULTROOMLF: i32 = 0;

pub const EAXREVERB_MINDECAYTIME: f32 = 0.1;
pub const EAXREVERB_MAXDECAYTIME: f32 = 20.0;
pub const EAXREVERB_DEFAULTDECAYTIME: f32 = 1.49;

pub const EAXREVERB_MINDECAYHFRATIO: f32 = 0.1;
pub const EAXREVERB_MAXDECAYHFRATIO: f32 = 2.0;
pub const EAXREVERB_DEFAULTDECAYHFRATIO: f32 = 0.83;

pub const EAXREVERB_MINDECAYLFRATIO: f32 = 0.1;
pub const EAXREVERB_MAXDECAYLFRATIO: f32 = 2.0;
pub const EAXREVERB_DEFAULTDECAYLFRATIO: f32 = 1.0;

pub const EAXREVERB_MINREFLECTIONS: i32 = -10_000;
pub const EAXREVERB_MAXREFLECTIONS: i32 = 1_000;
pub const EAXREVERB_DEFAULTREFLECTIONS: i32 = -2_602;

pub const EAXREVERB_MINREFLECTIONSDELAY: f32 = 0.0;
pub const EAXREVERB_MAXREFLECTIONSDELAY: f32 = 0.3;
pub const EAXREVERB_DEFAULTREFLECTIONSDELAY: f32 = 0.007;

pub const EAXREVERB_MINREVERB: i32 = -10_000;
pub const EAXREVERB_MAXREVERB: i32 = 2_000;
pub const EAXREVERB_DEFAULTREVERB: i32 = 200;

pub const EAXREVERB_MINREVERBDELAY: f32 = 0.0;
pub const EAXREVERB_MAXREVERBDELAY: f32 = 0.1;
pub const EAXREVERB_DEFAULTREVERBDELAY: f32 = 0.011;

pub const EAXREVERB_MINECHOTIME: f32 = 0.075;
pub const EAXREVERB_MAXECHOTIME: f32 = 0.25;
pub const EAXREVERB_DEFAULTECHOTIME: f32 = 0.25;

pub const EAXREVERB_MINECHODEPTH: f32 = 0.0;
pub const EAXREVERB_MAXECHODEPTH: f32 = 1.0;
pub const EAXREVERB_DEFAULTECHODEPTH: f32 = 0.0;

pub const EAXREVERB_MINMODULATIONTIME: f32 = 0.04;
pub const EAXREVERB_MAXMODULATIONTIME: f32 = 4.0;
pub const EAXREVERB_DEFAULTMODULATIONTIME: f32 = 0.25;

pub const EAXREVERB_MINMODULATIONDEPTH: f32 = 0.0;
pub const EAXREVERB_MAXMODULATIONDEPTH: f32 = 1.0;
pub const EAXREVERB_DEFAULTMODULATIONDEPTH: f32 = 0.0;

pub const EAXREVERB_MINAIRABSORPTIONHF: f32 = -100.0;
pub const EAXREVERB_MAXAIRABSORPTIONHF: f32 = 0.0;
pub const EAXREVERB_DEFAULTAIRABSORPTIONHF: f32 = -5.0;

pub const EAXREVERB_MINHFREFERENCE: f32 = 1_000.0;
pub const EAXREVERB_MAXHFREFERENCE: f32 = 20_000.0;
pub const EAXREVERB_DEFAULTHFREFERENCE: f32 = 5_000.0;

pub const EAXREVERB_MINLFREFERENCE: f32 = 20.0;
pub const EAXREVERB_MAXLFREFERENCE: f32 = 1_000.0;
pub const EAXREVERB_DEFAULTLFREFERENCE: f32 = 250.0;

pub const EAXREVERB_MINROOMROLLOFFFACTOR: f32 = 0.0;
pub const EAXREVERB_MAXROOMROLLOFFFACTOR: f32 = 10.0;
pub const EAXREVERB_DEFAULTROOMROLLOFFFACTOR: f32 = 0.0;

pub const EAXREVERB_DEFAULTFLAGS: u32 = EAXREVERBFLAGS_DECAYTIMESCALE
    | EAXREVERBFLAGS_REFLECTIONSSCALE
    | EAXREVERBFLAGS_REFLECTIONSDELAYSCALE
    | EAXREVERBFLAGS_REVERBSCALE
    | EAXREVERBFLAGS_REVERBDELAYSCALE
    | EAXREVERBFLAGS_DECAYHFLIMIT;

// Native EAX-reverb ranges
const AL_EAXREVERB_MIN_DENSITY: f32 = 0.0;
const AL_EAXREVERB_MAX_DENSITY: f32 = 1.0;
const AL_EAXREVERB_MIN_DIFFUSION: f32 = 0.0;
const AL_EAXREVERB_MAX_DIFFUSION: f32 = 1.0;
const AL_EAXREVERB_MIN_GAIN: f32 = 0.0;
const AL_EAXREVERB_MAX_GAIN: f32 = 1.0;
const AL_EAXREVERB_MIN_GAINHF: f32 = 0.0;
const AL_EAXREVERB_MAX_GAINHF: f32 = 1.0;
const AL_EAXREVERB_MIN_GAINLF: f32 = 0.0;
const AL_EAXREVERB_MAX_GAINLF: f32 = 1.0;
const AL_EAXREVERB_MIN_DECAY_TIME: f32 = 0.1;
const AL_EAXREVERB_MAX_DECAY_TIME: f32 = 20.0;
const AL_EAXREVERB_MIN_DECAY_HFRATIO: f32 = 0.1;
const AL_EAXREVERB_MAX_DECAY_HFRATIO: f32 = 2.0;
const AL_EAXREVERB_MIN_DECAY_LFRATIO: f32 = 0.1;
const AL_EAXREVERB_MAX_DECAY_LFRATIO: f32 = 2.0;
const AL_EAXREVERB_MIN_REFLECTIONS_GAIN: f32 = 0.0;
const AL_EAXREVERB_MAX_REFLECTIONS_GAIN: f32 = 3.16;
const AL_EAXREVERB_MIN_REFLECTIONS_DELAY: f32 = 0.0;
const AL_EAXREVERB_MAX_REFLECTIONS_DELAY: f32 = 0.3;
const AL_EAXREVERB_MIN_LATE_REVERB_GAIN: f32 = 0.0;
const AL_EAXREVERB_MAX_LATE_REVERB_GAIN: f32 = 10.0;
const AL_EAXREVERB_MIN_LATE_REVERB_DELAY: f32 = 0.0;
const AL_EAXREVERB_MAX_LATE_REVERB_DELAY: f32 = 0.1;
const AL_EAXREVERB_MIN_ECHO_TIME: f32 = 0.075;
const AL_EAXREVERB_MAX_ECHO_TIME: f32 = 0.25;
const AL_EAXREVERB_MIN_ECHO_DEPTH: f32 = 0.0;
const AL_EAXREVERB_MAX_ECHO_DEPTH: f32 = 1.0;
const AL_EAXREVERB_MIN_MODULATION_TIME: f32 = 0.04;
const AL_EAXREVERB_MAX_MODULATION_TIME: f32 = 4.0;
const AL_EAXREVERB_MIN_MODULATION_DEPTH: f32 = 0.0;
const AL_EAXREVERB_MAX_MODULATION_DEPTH: f32 = 1.0;
const AL_EAXREVERB_MIN_AIR_ABSORPTION_GAINHF: f32 = 0.892;
const AL_EAXREVERB_MAX_AIR_ABSORPTION_GAINHF: f32 = 1.0;
const AL_EAXREVERB_MIN_HFREFERENCE: f32 = 1_000.0;
const AL_EAXREVERB_MAX_HFREFERENCE: f32 = 20_000.0;
const AL_EAXREVERB_MIN_LFREFERENCE: f32 = 20.0;
const AL_EAXREVERB_MAX_LFREFERENCE: f32 = 1_000.0;
const AL_EAXREVERB_MIN_ROOM_ROLLOFF_FACTOR: f32 = 0.0;
const AL_EAXREVERB_MAX_ROOM_ROLLOFF_FACTOR: f32 = 10.0;

/// Three-component vector used for reflection/reverb panning
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize)]
pub struct EaxVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// EAX 3.0+ reverb properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct ReverbProperties {
    /// Preset index, or `EAX_ENVIRONMENT_UNDEFINED`
    pub environment: u32,
    /// Room size in meters
    pub environment_size: f32,
    pub environment_diffusion: f32,
    /// Room effect level at mid frequencies, millibels
    pub room: i32,
    pub room_hf: i32,
    pub room_lf: i32,
    /// Reverberation decay time at mid frequencies, seconds
    pub decay_time: f32,
    pub decay_hf_ratio: f32,
    pub decay_lf_ratio: f32,
    /// Early reflections level relative to `room`, millibels
    pub reflections: i32,
    pub reflections_delay: f32,
    pub reflections_pan: EaxVector,
    /// Late reverberation level relative to `room`, millibels
    pub reverb: i32,
    pub reverb_delay: f32,
    pub reverb_pan: EaxVector,
    pub echo_time: f32,
    pub echo_depth: f32,
    pub modulation_time: f32,
    pub modulation_depth: f32,
    /// Air absorption per meter at `hf_reference`, millibels
    pub air_absorption_hf: f32,
    pub hf_reference: f32,
    pub lf_reference: f32,
    pub room_rolloff_factor: f32,
    /// `EAXREVERBFLAGS_*`
    pub flags: u32,
}

impl Default for ReverbProperties {
    fn default() -> Self {
        Self {
            environment: EAXREVERB_DEFAULTENVIRONMENT,
            environment_size: EAXREVERB_DEFAULTENVIRONMENTSIZE,
            environment_diffusion: EAXREVERB_DEFAULTENVIRONMENTDIFFUSION,
            room: EAXREVERB_DEFAULTROOM,
            room_hf: EAXREVERB_DEFAULTROOMHF,
            room_lf: EAXREVERB_DEFAULTROOMLF,
            decay_time: EAXREVERB_DEFAULTDECAYTIME,
            decay_hf_ratio: EAXREVERB_DEFAULTDECAYHFRATIO,
            decay_lf_ratio: EAXREVERB_DEFAULTDECAYLFRATIO,
            reflections: EAXREVERB_DEFAULTREFLECTIONS,
            reflections_delay: EAXREVERB_DEFAULTREFLECTIONSDELAY,
            reflections_pan: EaxVector::default(),
            reverb: EAXREVERB_DEFAULTREVERB,
            reverb_delay: EAXREVERB_DEFAULTREVERBDELAY,
            reverb_pan: EaxVector::default(),
            echo_time: EAXREVERB_DEFAULTECHOTIME,
            echo_depth: EAXREVERB_DEFAULTECHODEPTH,
            modulation_time: EAXREVERB_DEFAULTMODULATIONTIME,
            modulation_depth: EAXREVERB_DEFAULTMODULATIONDEPTH,
            air_absorption_hf: EAXREVERB_DEFAULTAIRABSORPTIONHF,
            hf_reference: EAXREVERB_DEFAULTHFREFERENCE,
            lf_reference: EAXREVERB_DEFAULTLFREFERENCE,
            room_rolloff_factor: EAXREVERB_DEFAULTROOMROLLOFFFACTOR,
            flags: EAXREVERB_DEFAULTFLAGS,
        }
    }
}

/// EAX 2.0 listener properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax20ListenerProperties {
    pub room: i32,
    pub room_hf: i32,
    pub room_rolloff_factor: f32,
    pub decay_time: f32,
    pub decay_hf_ratio: f32,
    pub reflections: i32,
    pub reflections_delay: f32,
    pub reverb: i32,
    pub reverb_delay: f32,
    pub environment: u32,
    pub environment_size: f32,
    pub environment_diffusion: f32,
    pub air_absorption_hf: f32,
    pub flags: u32,
}

impl From<&ReverbProperties> for Eax20ListenerProperties {
    fn from(p: &ReverbProperties) -> Self {
        Self {
            room: p.room,
            room_hf: p.room_hf,
            room_rolloff_factor: p.room_rolloff_factor,
            decay_time: p.decay_time,
            decay_hf_ratio: p.decay_hf_ratio,
            reflections: p.reflections,
            reflections_delay: p.reflections_delay,
            reverb: p.reverb,
            reverb_delay: p.reverb_delay,
            environment: p.environment,
            environment_size: p.environment_size,
            environment_diffusion: p.environment_diffusion,
            air_absorption_hf: p.air_absorption_hf,
            flags: p.flags,
        }
    }
}

impl Eax20ListenerProperties {
    /// Overlay the legacy fields onto a full property set
    fn merge_into(&self, base: &ReverbProperties) -> ReverbProperties {
        ReverbProperties {
            room: self.room,
            room_hf: self.room_hf,
            room_rolloff_factor: self.room_rolloff_factor,
            decay_time: self.decay_time,
            decay_hf_ratio: self.decay_hf_ratio,
            reflections: self.reflections,
            reflections_delay: self.reflections_delay,
            reverb: self.reverb,
            reverb_delay: self.reverb_delay,
            environment: self.environment,
            environment_size: self.environment_size,
            environment_diffusion: self.environment_diffusion,
            air_absorption_hf: self.air_absorption_hf,
            flags: self.flags,
            ..*base
        }
    }
}

crate::dirty_fields! {
    enum ReverbField {
        Environment,
        EnvironmentSize,
        EnvironmentDiffusion,
        Room,
        RoomHF,
        RoomLF,
        DecayTime,
        DecayHFRatio,
        DecayLFRatio,
        Reflections,
        ReflectionsDelay,
        ReflectionsPan,
        Reverb,
        ReverbDelay,
        ReverbPan,
        EchoTime,
        EchoDepth,
        ModulationTime,
        ModulationDepth,
        AirAbsorptionHF,
        HFReference,
        LFReference,
        RoomRolloffFactor,
        Flags,
    }
}

#[derive(Debug)]
pub struct ReverbEffect {
    effect: EffectId,
    eax: ReverbProperties,
    eax_d: ReverbProperties,
    dirty: DirtySet<ReverbField>,
}

impl ReverbEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::EaxReverb)?;
        let this = Self {
            effect,
            eax: ReverbProperties::default(),
            eax_d: ReverbProperties::default(),
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
    pub fn properties(&self) -> &ReverbProperties {
        &self.eax
    }

    /// Staged properties
    pub fn deferred_properties(&self) -> &ReverbProperties {
        &self.eax_d
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
        let eax = &self.eax;
        match call.property_id() {
            EAXREVERB_NONE => Ok(()),
            EAXREVERB_ALLPARAMETERS if call.version() == 2 => {
                call.set_value(&Eax20ListenerProperties::from(eax))
            }
            EAXREVERB_ALLPARAMETERS => call.set_value(eax),
            EAXREVERB_ENVIRONMENT => call.set_value(&eax.environment),
            EAXREVERB_ENVIRONMENTSIZE => call.set_value(&eax.environment_size),
            EAXREVERB_ENVIRONMENTDIFFUSION => call.set_value(&eax.environment_diffusion),
            EAXREVERB_ROOM => call.set_value(&eax.room),
            EAXREVERB_ROOMHF => call.set_value(&eax.room_hf),
            EAXREVERB_ROOMLF => call.set_value(&eax.room_lf),
            EAXREVERB_DECAYTIME => call.set_value(&eax.decay_time),
            EAXREVERB_DECAYHFRATIO => call.set_value(&eax.decay_hf_ratio),
            EAXREVERB_DECAYLFRATIO => call.set_value(&eax.decay_lf_ratio),
            EAXREVERB_REFLECTIONS => call.set_value(&eax.reflections),
            EAXREVERB_REFLECTIONSDELAY => call.set_value(&eax.reflections_delay),
            EAXREVERB_REFLECTIONSPAN => call.set_value(&eax.reflections_pan),
            EAXREVERB_REVERB => call.set_value(&eax.reverb),
            EAXREVERB_REVERBDELAY => call.set_value(&eax.reverb_delay),
            EAXREVERB_REVERBPAN => call.set_value(&eax.reverb_pan),
            EAXREVERB_ECHOTIME => call.set_value(&eax.echo_time),
            EAXREVERB_ECHODEPTH => call.set_value(&eax.echo_depth),
            EAXREVERB_MODULATIONTIME => call.set_value(&eax.modulation_time),
            EAXREVERB_MODULATIONDEPTH => call.set_value(&eax.modulation_depth),
            EAXREVERB_AIRABSORPTIONHF => call.set_value(&eax.air_absorption_hf),
            EAXREVERB_HFREFERENCE => call.set_value(&eax.hf_reference),
            EAXREVERB_LFREFERENCE => call.set_value(&eax.lf_reference),
            EAXREVERB_ROOMROLLOFFFACTOR => call.set_value(&eax.room_rolloff_factor),
            EAXREVERB_FLAGS => call.set_value(&eax.flags),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        let version = call.version();
        match call.property_id() {
            EAXREVERB_NONE => Ok(()),
            EAXREVERB_ALLPARAMETERS if version == 2 => {
                let legacy: Eax20ListenerProperties = call.get_value()?;
                let all = legacy.merge_into(&self.eax_d);
                self.defer_all(&all, version)
            }
            EAXREVERB_ALLPARAMETERS => self.defer_all(&call.get_value()?, version),
            EAXREVERB_ENVIRONMENT => self.defer_environment(call.get_value()?),
            EAXREVERB_ENVIRONMENTSIZE => self.defer_environment_size(call.get_value()?),
            EAXREVERB_ENVIRONMENTDIFFUSION => self.defer_environment_diffusion(call.get_value()?),
            EAXREVERB_ROOM => self.defer_room(call.get_value()?),
            EAXREVERB_ROOMHF => self.defer_room_hf(call.get_value()?),
            EAXREVERB_ROOMLF => self.defer_room_lf(call.get_value()?),
            EAXREVERB_DECAYTIME => self.defer_decay_time(call.get_value()?),
            EAXREVERB_DECAYHFRATIO => self.defer_decay_hf_ratio(call.get_value()?),
            EAXREVERB_DECAYLFRATIO => self.defer_decay_lf_ratio(call.get_value()?),
            EAXREVERB_REFLECTIONS => self.defer_reflections(call.get_value()?),
            EAXREVERB_REFLECTIONSDELAY => self.defer_reflections_delay(call.get_value()?),
            EAXREVERB_REFLECTIONSPAN => self.defer_reflections_pan(call.get_value()?),
            EAXREVERB_REVERB => self.defer_reverb(call.get_value()?),
            EAXREVERB_REVERBDELAY => self.defer_reverb_delay(call.get_value()?),
            EAXREVERB_REVERBPAN => self.defer_reverb_pan(call.get_value()?),
            EAXREVERB_ECHOTIME => self.defer_echo_time(call.get_value()?),
            EAXREVERB_ECHODEPTH => self.defer_echo_depth(call.get_value()?),
            EAXREVERB_MODULATIONTIME => self.defer_modulation_time(call.get_value()?),
            EAXREVERB_MODULATIONDEPTH => self.defer_modulation_depth(call.get_value()?),
            EAXREVERB_AIRABSORPTIONHF => self.defer_air_absorption_hf(call.get_value()?),
            EAXREVERB_HFREFERENCE => self.defer_hf_reference(call.get_value()?),
            EAXREVERB_LFREFERENCE => self.defer_lf_reference(call.get_value()?),
            EAXREVERB_ROOMROLLOFFFACTOR => self.defer_room_rolloff_factor(call.get_value()?),
            EAXREVERB_FLAGS => self.defer_flags(call.get_value()?, version),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    // Validation

    fn validate_environment(value: u32, version: u32, is_standalone: bool) -> EaxResult<()> {
        let max = if version == 2 || is_standalone {
            EAX20REVERB_MAXENVIRONMENT
        } else {
            EAX30REVERB_MAXENVIRONMENT
        };
        validate_range(OWNER, "Environment", value, EAXREVERB_MINENVIRONMENT, max)
    }

    fn validate_environment_size(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Environment Size",
            value,
            EAXREVERB_MINENVIRONMENTSIZE,
            EAXREVERB_MAXENVIRONMENTSIZE,
        )
    }

    fn validate_environment_diffusion(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Environment Diffusion",
            value,
            EAXREVERB_MINENVIRONMENTDIFFUSION,
            EAXREVERB_MAXENVIRONMENTDIFFUSION,
        )
    }

    fn validate_room(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Room", value, EAXREVERB_MINROOM, EAXREVERB_MAXROOM)
    }

    fn validate_room_hf(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Room HF", value, EAXREVERB_MINROOMHF, EAXREVERB_MAXROOMHF)
    }

    fn validate_room_lf(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Room LF", value, EAXREVERB_MINROOMLF, EAXREVERB_MAXROOMLF)
    }

    fn validate_decay_time(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Decay Time", value, EAXREVERB_MINDECAYTIME, EAXREVERB_MAXDECAYTIME)
    }

    fn validate_decay_hf_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Decay HF Ratio",
            value,
            EAXREVERB_MINDECAYHFRATIO,
            EAXREVERB_MAXDECAYHFRATIO,
        )
    }

    fn validate_decay_lf_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Decay LF Ratio",
            value,
            EAXREVERB_MINDECAYLFRATIO,
            EAXREVERB_MAXDECAYLFRATIO,
        )
    }

    fn validate_reflections(value: i32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Reflections",
            value,
            EAXREVERB_MINREFLECTIONS,
            EAXREVERB_MAXREFLECTIONS,
        )
    }

    fn validate_reflections_delay(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Reflections Delay",
            value,
            EAXREVERB_MINREFLECTIONSDELAY,
            EAXREVERB_MAXREFLECTIONSDELAY,
        )
    }

    fn validate_reverb(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Reverb", value, EAXREVERB_MINREVERB, EAXREVERB_MAXREVERB)
    }

    fn validate_reverb_delay(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Reverb Delay",
            value,
            EAXREVERB_MINREVERBDELAY,
            EAXREVERB_MAXREVERBDELAY,
        )
    }

    fn validate_echo_time(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Echo Time", value, EAXREVERB_MINECHOTIME, EAXREVERB_MAXECHOTIME)
    }

    fn validate_echo_depth(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Echo Depth", value, EAXREVERB_MINECHODEPTH, EAXREVERB_MAXECHODEPTH)
    }

    fn validate_modulation_time(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Modulation Time",
            value,
            EAXREVERB_MINMODULATIONTIME,
            EAXREVERB_MAXMODULATIONTIME,
        )
    }

    fn validate_modulation_depth(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Modulation Depth",
            value,
            EAXREVERB_MINMODULATIONDEPTH,
            EAXREVERB_MAXMODULATIONDEPTH,
        )
    }

    fn validate_air_absorption_hf(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Air Absorption HF",
            value,
            EAXREVERB_MINAIRABSORPTIONHF,
            EAXREVERB_MAXAIRABSORPTIONHF,
        )
    }

    fn validate_hf_reference(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "HF Reference",
            value,
            EAXREVERB_MINHFREFERENCE,
            EAXREVERB_MAXHFREFERENCE,
        )
    }

    fn validate_lf_reference(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "LF Reference",
            value,
            EAXREVERB_MINLFREFERENCE,
            EAXREVERB_MAXLFREFERENCE,
        )
    }

    fn validate_room_rolloff_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Room Rolloff Factor",
            value,
            EAXREVERB_MINROOMROLLOFFFACTOR,
            EAXREVERB_MAXROOMROLLOFFFACTOR,
        )
    }

    fn validate_flags(value: u32, version: u32) -> EaxResult<()> {
        let reserved = if version == 2 {
            EAX2LISTENERFLAGS_RESERVED
        } else {
            EAXREVERBFLAGS_RESERVED
        };
        validate_flags(OWNER, "Flags", value, reserved)
    }

    fn validate_all(props: &ReverbProperties, version: u32) -> EaxResult<()> {
        Self::validate_environment(props.environment, version, false)?;
        Self::validate_environment_size(props.environment_size)?;
        Self::validate_environment_diffusion(props.environment_diffusion)?;
        Self::validate_room(props.room)?;
        Self::validate_room_hf(props.room_hf)?;
        Self::validate_room_lf(props.room_lf)?;
        Self::validate_decay_time(props.decay_time)?;
        Self::validate_decay_hf_ratio(props.decay_hf_ratio)?;
        Self::validate_decay_lf_ratio(props.decay_lf_ratio)?;
        Self::validate_reflections(props.reflections)?;
        Self::validate_reflections_delay(props.reflections_delay)?;
        Self::validate_reverb(props.reverb)?;
        Self::validate_reverb_delay(props.reverb_delay)?;
        Self::validate_echo_time(props.echo_time)?;
        Self::validate_echo_depth(props.echo_depth)?;
        Self::validate_modulation_time(props.modulation_time)?;
        Self::validate_modulation_depth(props.modulation_depth)?;
        Self::validate_air_absorption_hf(props.air_absorption_hf)?;
        Self::validate_hf_reference(props.hf_reference)?;
        Self::validate_lf_reference(props.lf_reference)?;
        Self::validate_room_rolloff_factor(props.room_rolloff_factor)?;
        Self::validate_flags(props.flags, version)?;
        Ok(())
    }

    // Staging

    fn defer_environment_index(&mut self, value: u32) {
        self.eax_d.environment = value;
        self.dirty.assign(ReverbField::Environment, self.eax.environment != self.eax_d.environment);
    }

    /// Load a preset in place of every field
    fn defer_environment(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_environment(value, 2, true)?;
        if self.eax_d.environment == value {
            return Ok(());
        }
        let preset = EAXREVERB_PRESETS[value as usize];
        self.defer_all(&preset, 3)
    }

    /// Change the room size and rescale the dependent fields whose scale flag is set
    fn defer_environment_size(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_environment_size(value)?;
        if self.eax_d.environment_size == value {
            return Ok(());
        }

        let scale = value / self.eax_d.environment_size;
        let flags = self.eax_d.flags;

        self.eax_d.environment_size = value;
        self.dirty.assign(
            ReverbField::EnvironmentSize,
            self.eax.environment_size != self.eax_d.environment_size,
        );

        if flags & EAXREVERBFLAGS_DECAYTIMESCALE != 0 {
            let decay_time = (scale * self.eax_d.decay_time)
                .clamp(EAXREVERB_MINDECAYTIME, EAXREVERB_MAXDECAYTIME);
            self.defer_decay_time(decay_time)?;
        }

        if flags & EAXREVERBFLAGS_REFLECTIONSSCALE != 0 && flags & EAXREVERBFLAGS_REFLECTIONSDELAYSCALE != 0 {
            let reflections = ((self.eax_d.reflections as f32 - gain_to_level_mb(scale)) as i32)
                .clamp(EAXREVERB_MINREFLECTIONS, EAXREVERB_MAXREFLECTIONS);
            self.defer_reflections(reflections)?;
        }

        if flags & EAXREVERBFLAGS_REFLECTIONSDELAYSCALE != 0 {
            let reflections_delay = (self.eax_d.reflections_delay * scale)
                .clamp(EAXREVERB_MINREFLECTIONSDELAY, EAXREVERB_MAXREFLECTIONSDELAY);
            self.defer_reflections_delay(reflections_delay)?;
        }

        if flags & EAXREVERBFLAGS_REVERBSCALE != 0 {
            let log_scalar = if flags & EAXREVERBFLAGS_DECAYTIMESCALE != 0 {
                2_000.0
            } else {
                3_000.0
            };
            let reverb = ((self.eax_d.reverb as f32 - scale.log10() * log_scalar) as i32)
                .clamp(EAXREVERB_MINREVERB, EAXREVERB_MAXREVERB);
            self.defer_reverb(reverb)?;
        }

        if flags & EAXREVERBFLAGS_REVERBDELAYSCALE != 0 {
            let reverb_delay = (scale * self.eax_d.reverb_delay)
                .clamp(EAXREVERB_MINREVERBDELAY, EAXREVERB_MAXREVERBDELAY);
            self.defer_reverb_delay(reverb_delay)?;
        }

        if flags & EAXREVERBFLAGS_ECHOTIMESCALE != 0 {
            let echo_time = (self.eax_d.echo_time * scale)
                .clamp(EAXREVERB_MINECHOTIME, EAXREVERB_MAXECHOTIME);
            self.defer_echo_time(echo_time)?;
        }

        if flags & EAXREVERBFLAGS_MODULATIONTIMESCALE != 0 {
            let modulation_time = (scale * self.eax_d.modulation_time)
                .clamp(EAXREVERB_MINMODULATIONTIME, EAXREVERB_MAXMODULATIONTIME);
            self.defer_modulation_time(modulation_time)?;
        }

        Ok(())
    }

    fn defer_environment_diffusion(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_environment_diffusion(value)?;
        self.eax_d.environment_diffusion = value;
        self.dirty.assign(
            ReverbField::EnvironmentDiffusion,
            self.eax.environment_diffusion != self.eax_d.environment_diffusion,
        );
        Ok(())
    }

    fn defer_room(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_room(value)?;
        self.eax_d.room = value;
        self.dirty.assign(ReverbField::Room, self.eax.room != self.eax_d.room);
        Ok(())
    }

    fn defer_room_hf(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_room_hf(value)?;
        self.eax_d.room_hf = value;
        self.dirty.assign(ReverbField::RoomHF, self.eax.room_hf != self.eax_d.room_hf);
        Ok(())
    }

    fn defer_room_lf(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_room_lf(value)?;
        self.eax_d.room_lf = value;
        self.dirty.assign(ReverbField::RoomLF, self.eax.room_lf != self.eax_d.room_lf);
        Ok(())
    }

    fn defer_decay_time(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_decay_time(value)?;
        self.eax_d.decay_time = value;
        self.dirty.assign(ReverbField::DecayTime, self.eax.decay_time != self.eax_d.decay_time);
        Ok(())
    }

    fn defer_decay_hf_ratio(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_decay_hf_ratio(value)?;
        self.eax_d.decay_hf_ratio = value;
        self.dirty.assign(ReverbField::DecayHFRatio, self.eax.decay_hf_ratio != self.eax_d.decay_hf_ratio);
        Ok(())
    }

    fn defer_decay_lf_ratio(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_decay_lf_ratio(value)?;
        self.eax_d.decay_lf_ratio = value;
        self.dirty.assign(ReverbField::DecayLFRatio, self.eax.decay_lf_ratio != self.eax_d.decay_lf_ratio);
        Ok(())
    }

    fn defer_reflections(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_reflections(value)?;
        self.eax_d.reflections = value;
        self.dirty.assign(ReverbField::Reflections, self.eax.reflections != self.eax_d.reflections);
        Ok(())
    }

    fn defer_reflections_delay(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_reflections_delay(value)?;
        self.eax_d.reflections_delay = value;
        self.dirty.assign(
            ReverbField::ReflectionsDelay,
            self.eax.reflections_delay != self.eax_d.reflections_delay,
        );
        Ok(())
    }

    fn defer_reflections_pan(&mut self, value: EaxVector) -> EaxResult<()> {
        self.eax_d.reflections_pan = value;
        self.dirty.assign(
            ReverbField::ReflectionsPan,
            self.eax.reflections_pan != self.eax_d.reflections_pan,
        );
        Ok(())
    }

    fn defer_reverb(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_reverb(value)?;
        self.eax_d.reverb = value;
        self.dirty.assign(ReverbField::Reverb, self.eax.reverb != self.eax_d.reverb);
        Ok(())
    }

    fn defer_reverb_delay(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_reverb_delay(value)?;
        self.eax_d.reverb_delay = value;
        self.dirty.assign(ReverbField::ReverbDelay, self.eax.reverb_delay != self.eax_d.reverb_delay);
        Ok(())
    }

    fn defer_reverb_pan(&mut self, value: EaxVector) -> EaxResult<()> {
        self.eax_d.reverb_pan = value;
        self.dirty.assign(ReverbField::ReverbPan, self.eax.reverb_pan != self.eax_d.reverb_pan);
        Ok(())
    }

    fn defer_echo_time(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_echo_time(value)?;
        self.eax_d.echo_time = value;
        self.dirty.assign(ReverbField::EchoTime, self.eax.echo_time != self.eax_d.echo_time);
        Ok(())
    }

    fn defer_echo_depth(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_echo_depth(value)?;
        self.eax_d.echo_depth = value;
        self.dirty.assign(ReverbField::EchoDepth, self.eax.echo_depth != self.eax_d.echo_depth);
        Ok(())
    }

    fn defer_modulation_time(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_modulation_time(value)?;
        self.eax_d.modulation_time = value;
        self.dirty.assign(
            ReverbField::ModulationTime,
            self.eax.modulation_time != self.eax_d.modulation_time,
        );
        Ok(())
    }

    fn defer_modulation_depth(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_modulation_depth(value)?;
        self.eax_d.modulation_depth = value;
        self.dirty.assign(
            ReverbField::ModulationDepth,
            self.eax.modulation_depth != self.eax_d.modulation_depth,
        );
        Ok(())
    }

    fn defer_air_absorption_hf(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_air_absorption_hf(value)?;
        self.eax_d.air_absorption_hf = value;
        self.dirty.assign(
            ReverbField::AirAbsorptionHF,
            self.eax.air_absorption_hf != self.eax_d.air_absorption_hf,
        );
        Ok(())
    }

    fn defer_hf_reference(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_hf_reference(value)?;
        self.eax_d.hf_reference = value;
        self.dirty.assign(ReverbField::HFReference, self.eax.hf_reference != self.eax_d.hf_reference);
        Ok(())
    }

    fn defer_lf_reference(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_lf_reference(value)?;
        self.eax_d.lf_reference = value;
        self.dirty.assign(ReverbField::LFReference, self.eax.lf_reference != self.eax_d.lf_reference);
        Ok(())
    }

    fn defer_room_rolloff_factor(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_room_rolloff_factor(value)?;
        self.eax_d.room_rolloff_factor = value;
        self.dirty.assign(
            ReverbField::RoomRolloffFactor,
            self.eax.room_rolloff_factor != self.eax_d.room_rolloff_factor,
        );
        Ok(())
    }

    fn defer_flags(&mut self, value: u32, version: u32) -> EaxResult<()> {
        Self::validate_flags(value, version)?;
        self.eax_d.flags = value;
        self.dirty.assign(ReverbField::Flags, self.eax.flags != self.eax_d.flags);
        Ok(())
    }

    fn defer_all(&mut self, props: &ReverbProperties, version: u32) -> EaxResult<()> {
        Self::validate_all(props, version)?;
        self.defer_environment_index(props.environment);
        self.defer_environment_size_only(props.environment_size);
        self.defer_environment_diffusion(props.environment_diffusion)?;
        self.defer_room(props.room)?;
        self.defer_room_hf(props.room_hf)?;
        self.defer_room_lf(props.room_lf)?;
        self.defer_decay_time(props.decay_time)?;
        self.defer_decay_hf_ratio(props.decay_hf_ratio)?;
        self.defer_decay_lf_ratio(props.decay_lf_ratio)?;
        self.defer_reflections(props.reflections)?;
        self.defer_reflections_delay(props.reflections_delay)?;
        self.defer_reflections_pan(props.reflections_pan)?;
        self.defer_reverb(props.reverb)?;
        self.defer_reverb_delay(props.reverb_delay)?;
        self.defer_reverb_pan(props.reverb_pan)?;
        self.defer_echo_time(props.echo_time)?;
        self.defer_echo_depth(props.echo_depth)?;
        self.defer_modulation_time(props.modulation_time)?;
        self.defer_modulation_depth(props.modulation_depth)?;
        self.defer_air_absorption_hf(props.air_absorption_hf)?;
        self.defer_hf_reference(props.hf_reference)?;
        self.defer_lf_reference(props.lf_reference)?;
        self.defer_room_rolloff_factor(props.room_rolloff_factor)?;
        self.defer_flags(props.flags, version)?;
        Ok(())
    }

    /// Size from a full property set: no cascade, every field is given explicitly
    fn defer_environment_size_only(&mut self, value: f32) {
        self.eax_d.environment_size = value;
        self.dirty.assign(
            ReverbField::EnvironmentSize,
            self.eax.environment_size != self.eax_d.environment_size,
        );
    }

    // Commit

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        // The environment index has no native counterpart
        if self.dirty.len() == 1 && self.dirty.contains(ReverbField::Environment) {
            self.dirty.clear();
            return Ok(());
        }

        let dirty = self.dirty;

        if dirty.contains(ReverbField::EnvironmentSize) {
            self.set_efx_density(backend)?;
        }
        if dirty.contains(ReverbField::EnvironmentDiffusion) {
            self.set_efx_diffusion(backend)?;
        }
        if dirty.contains(ReverbField::Room) {
            self.set_efx_gain(backend)?;
        }
        if dirty.contains(ReverbField::RoomHF) {
            self.set_efx_gain_hf(backend)?;
        }
        if dirty.contains(ReverbField::RoomLF) {
            self.set_efx_gain_lf(backend)?;
        }
        if dirty.contains(ReverbField::DecayTime) {
            self.set_efx_decay_time(backend)?;
        }
        if dirty.contains(ReverbField::DecayHFRatio) {
            self.set_efx_decay_hf_ratio(backend)?;
        }
        if dirty.contains(ReverbField::DecayLFRatio) {
            self.set_efx_decay_lf_ratio(backend)?;
        }
        if dirty.contains(ReverbField::Reflections) {
            self.set_efx_reflections_gain(backend)?;
        }
        if dirty.contains(ReverbField::ReflectionsDelay) {
            self.set_efx_reflections_delay(backend)?;
        }
        if dirty.contains(ReverbField::ReflectionsPan) {
            self.set_efx_reflections_pan(backend)?;
        }
        if dirty.contains(ReverbField::Reverb) {
            self.set_efx_late_reverb_gain(backend)?;
        }
        if dirty.contains(ReverbField::ReverbDelay) {
            self.set_efx_late_reverb_delay(backend)?;
        }
        if dirty.contains(ReverbField::ReverbPan) {
            self.set_efx_late_reverb_pan(backend)?;
        }
        if dirty.contains(ReverbField::EchoTime) {
            self.set_efx_echo_time(backend)?;
        }
        if dirty.contains(ReverbField::EchoDepth) {
            self.set_efx_echo_depth(backend)?;
        }
        if dirty.contains(ReverbField::ModulationTime) {
            self.set_efx_modulation_time(backend)?;
        }
        if dirty.contains(ReverbField::ModulationDepth) {
            self.set_efx_modulation_depth(backend)?;
        }
        if dirty.contains(ReverbField::AirAbsorptionHF) {
            self.set_efx_air_absorption_gain_hf(backend)?;
        }
        if dirty.contains(ReverbField::HFReference) {
            self.set_efx_hf_reference(backend)?;
        }
        if dirty.contains(ReverbField::LFReference) {
            self.set_efx_lf_reference(backend)?;
        }
        if dirty.contains(ReverbField::RoomRolloffFactor) {
            self.set_efx_room_rolloff_factor(backend)?;
        }
        if dirty.contains(ReverbField::Flags) {
            self.set_efx_decay_hf_limit(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    // Native parameters

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_density(backend)?;
        self.set_efx_diffusion(backend)?;
        self.set_efx_gain(backend)?;
        self.set_efx_gain_hf(backend)?;
        self.set_efx_gain_lf(backend)?;
        self.set_efx_decay_time(backend)?;
        self.set_efx_decay_hf_ratio(backend)?;
        self.set_efx_decay_lf_ratio(backend)?;
        self.set_efx_reflections_gain(backend)?;
        self.set_efx_reflections_delay(backend)?;
        self.set_efx_reflections_pan(backend)?;
        self.set_efx_late_reverb_gain(backend)?;
        self.set_efx_late_reverb_delay(backend)?;
        self.set_efx_late_reverb_pan(backend)?;
        self.set_efx_echo_time(backend)?;
        self.set_efx_echo_depth(backend)?;
        self.set_efx_modulation_time(backend)?;
        self.set_efx_modulation_depth(backend)?;
        self.set_efx_air_absorption_gain_hf(backend)?;
        self.set_efx_hf_reference(backend)?;
        self.set_efx_lf_reference(backend)?;
        self.set_efx_room_rolloff_factor(backend)?;
        self.set_efx_decay_hf_limit(backend)
    }

    fn float(&self, backend: &mut dyn EfxBackend, param: EfxParam, value: f32, min: f32, max: f32) -> EaxResult<()> {
        set_efx_float(backend, self.effect, param, value, min, max)
    }

    /// Density follows the room volume: size³ / 16
    fn set_efx_density(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let size = self.eax.environment_size;
        let density = (size * size * size) / 16.0;
        self.float(
            backend,
            EfxParam::ReverbDensity,
            density,
            AL_EAXREVERB_MIN_DENSITY,
            AL_EAXREVERB_MAX_DENSITY,
        )
    }

    fn set_efx_diffusion(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbDiffusion,
            self.eax.environment_diffusion,
            AL_EAXREVERB_MIN_DIFFUSION,
            AL_EAXREVERB_MAX_DIFFUSION,
        )
    }

    fn set_efx_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbGain,
            level_mb_to_gain(self.eax.room as f32),
            AL_EAXREVERB_MIN_GAIN,
            AL_EAXREVERB_MAX_GAIN,
        )
    }

    fn set_efx_gain_hf(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbGainHF,
            level_mb_to_gain(self.eax.room_hf as f32),
            AL_EAXREVERB_MIN_GAINHF,
            AL_EAXREVERB_MAX_GAINHF,
        )
    }

    fn set_efx_gain_lf(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbGainLF,
            level_mb_to_gain(self.eax.room_lf as f32),
            AL_EAXREVERB_MIN_GAINLF,
            AL_EAXREVERB_MAX_GAINLF,
        )
    }

    fn set_efx_decay_time(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbDecayTime,
            self.eax.decay_time,
            AL_EAXREVERB_MIN_DECAY_TIME,
            AL_EAXREVERB_MAX_DECAY_TIME,
        )
    }

    fn set_efx_decay_hf_ratio(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbDecayHFRatio,
            self.eax.decay_hf_ratio,
            AL_EAXREVERB_MIN_DECAY_HFRATIO,
            AL_EAXREVERB_MAX_DECAY_HFRATIO,
        )
    }

    fn set_efx_decay_lf_ratio(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbDecayLFRatio,
            self.eax.decay_lf_ratio,
            AL_EAXREVERB_MIN_DECAY_LFRATIO,
            AL_EAXREVERB_MAX_DECAY_LFRATIO,
        )
    }

    fn set_efx_reflections_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbReflectionsGain,
            level_mb_to_gain(self.eax.reflections as f32),
            AL_EAXREVERB_MIN_REFLECTIONS_GAIN,
            AL_EAXREVERB_MAX_REFLECTIONS_GAIN,
        )
    }

    fn set_efx_reflections_delay(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbReflectionsDelay,
            self.eax.reflections_delay,
            AL_EAXREVERB_MIN_REFLECTIONS_DELAY,
            AL_EAXREVERB_MAX_REFLECTIONS_DELAY,
        )
    }

    fn set_efx_reflections_pan(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let pan = self.eax.reflections_pan;
        backend.set_effect_param(
            self.effect,
            EfxParam::ReverbReflectionsPan,
            EfxValue::Vector([pan.x, pan.y, pan.z]),
        )
    }

    fn set_efx_late_reverb_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbLateReverbGain,
            level_mb_to_gain(self.eax.reverb as f32),
            AL_EAXREVERB_MIN_LATE_REVERB_GAIN,
            AL_EAXREVERB_MAX_LATE_REVERB_GAIN,
        )
    }

    fn set_efx_late_reverb_delay(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbLateReverbDelay,
            self.eax.reverb_delay,
            AL_EAXREVERB_MIN_LATE_REVERB_DELAY,
            AL_EAXREVERB_MAX_LATE_REVERB_DELAY,
        )
    }

    fn set_efx_late_reverb_pan(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let pan = self.eax.reverb_pan;
        backend.set_effect_param(
            self.effect,
            EfxParam::ReverbLateReverbPan,
            EfxValue::Vector([pan.x, pan.y, pan.z]),
        )
    }

    fn set_efx_echo_time(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbEchoTime,
            self.eax.echo_time,
            AL_EAXREVERB_MIN_ECHO_TIME,
            AL_EAXREVERB_MAX_ECHO_TIME,
        )
    }

    fn set_efx_echo_depth(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbEchoDepth,
            self.eax.echo_depth,
            AL_EAXREVERB_MIN_ECHO_DEPTH,
            AL_EAXREVERB_MAX_ECHO_DEPTH,
        )
    }

    fn set_efx_modulation_time(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbModulationTime,
            self.eax.modulation_time,
            AL_EAXREVERB_MIN_MODULATION_TIME,
            AL_EAXREVERB_MAX_MODULATION_TIME,
        )
    }

    fn set_efx_modulation_depth(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbModulationDepth,
            self.eax.modulation_depth,
            AL_EAXREVERB_MIN_MODULATION_DEPTH,
            AL_EAXREVERB_MAX_MODULATION_DEPTH,
        )
    }

    fn set_efx_air_absorption_gain_hf(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbAirAbsorptionGainHF,
            level_mb_to_gain(self.eax.air_absorption_hf),
            AL_EAXREVERB_MIN_AIR_ABSORPTION_GAINHF,
            AL_EAXREVERB_MAX_AIR_ABSORPTION_GAINHF,
        )
    }

    fn set_efx_hf_reference(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbHFReference,
            self.eax.hf_reference,
            AL_EAXREVERB_MIN_HFREFERENCE,
            AL_EAXREVERB_MAX_HFREFERENCE,
        )
    }

    fn set_efx_lf_reference(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbLFReference,
            self.eax.lf_reference,
            AL_EAXREVERB_MIN_LFREFERENCE,
            AL_EAXREVERB_MAX_LFREFERENCE,
        )
    }

    fn set_efx_room_rolloff_factor(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.float(
            backend,
            EfxParam::ReverbRoomRolloffFactor,
            self.eax.room_rolloff_factor,
            AL_EAXREVERB_MIN_ROOM_ROLLOFF_FACTOR,
            AL_EAXREVERB_MAX_ROOM_ROLLOFF_FACTOR,
        )
    }

    fn set_efx_decay_hf_limit(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let limit = self.eax.flags & EAXREVERBFLAGS_DECAYHFLIMIT != 0;
        set_efx_int(backend, self.effect, EfxParam::ReverbDecayHFLimit, limit as i32, 0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::reverb_presets::*;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};
    use approx::assert_relative_eq;

    fn setup() -> (RecordingBackend, EffectSlotId, ReverbEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = ReverbEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn set<T: Pod>(effect: &mut ReverbEffect, backend: &mut RecordingBackend, slot: EffectSlotId, id: u32, value: T) -> EaxResult<()> {
        let mut buf = bytemuck::bytes_of(&value).to_vec();
        effect.dispatch(&mut effect_set(id, &mut buf, false), backend, slot)
    }

    #[test]
    fn test_layouts() {
        assert_eq!(size_of::<ReverbProperties>(), 112);
        assert_eq!(size_of::<Eax20ListenerProperties>(), 56);
    }

    #[test]
    fn test_environment_loads_preset() {
        let (mut backend, slot, mut effect) = setup();
        set(&mut effect, &mut backend, slot, EAXREVERB_ENVIRONMENT, EAX_ENVIRONMENT_HANGAR).unwrap();
        assert_eq!(*effect.properties(), EAXREVERB_PRESETS[EAX_ENVIRONMENT_HANGAR as usize]);
        assert_eq!(
            backend.slot_param(slot, EfxParam::ReverbDecayTime),
            Some(EfxValue::Float(10.05))
        );
    }

    #[test]
    fn test_environment_rejects_undefined() {
        let (mut backend, slot, mut effect) = setup();
        assert!(set(&mut effect, &mut backend, slot, EAXREVERB_ENVIRONMENT, EAX_ENVIRONMENT_UNDEFINED).is_err());

        // A full set may carry the undefined marker from EAX 3.0 on
        let props = ReverbProperties {
            environment: EAX_ENVIRONMENT_UNDEFINED,
            ..Default::default()
        };
        set(&mut effect, &mut backend, slot, EAXREVERB_ALLPARAMETERS, props).unwrap();
        assert_eq!(effect.properties().environment, EAX_ENVIRONMENT_UNDEFINED);
    }

    #[test]
    fn test_environment_index_alone_is_silent() {
        let (mut backend, slot, mut effect) = setup();
        backend.clear_calls();
        let props = ReverbProperties {
            environment: EAX_ENVIRONMENT_UNDEFINED,
            ..Default::default()
        };
        set(&mut effect, &mut backend, slot, EAXREVERB_ALLPARAMETERS, props).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_size_cascade_doubles_times() {
        let (mut backend, slot, mut effect) = setup();
        // Generic: size 7.5, every scale flag except echo/modulation
        set(&mut effect, &mut backend, slot, EAXREVERB_ENVIRONMENTSIZE, 15.0_f32).unwrap();
        let p = effect.properties();
        assert_eq!(p.environment_size, 15.0);
        assert_relative_eq!(p.decay_time, 2.98, epsilon = 1e-5);
        assert_relative_eq!(p.reflections_delay, 0.014, epsilon = 1e-6);
        assert_relative_eq!(p.reverb_delay, 0.022, epsilon = 1e-6);
        // reflections drop by 20*log10(2) dB, reverb by log10(2)*2000 mB
        assert_eq!(p.reflections, -2602 - 602);
        assert_eq!(p.reverb, 200 - 602);
        // echo and modulation scale flags are off
        assert_eq!(p.echo_time, EAXREVERB_DEFAULTECHOTIME);
        assert_eq!(p.modulation_time, EAXREVERB_DEFAULTMODULATIONTIME);
    }

    #[test]
    fn test_size_cascade_respects_flags_and_clamps() {
        let (mut backend, slot, mut effect) = setup();
        set(&mut effect, &mut backend, slot, EAXREVERB_FLAGS, EAXREVERBFLAGS_REVERBSCALE | EAXREVERBFLAGS_MODULATIONTIMESCALE).unwrap();
        set(&mut effect, &mut backend, slot, EAXREVERB_ENVIRONMENTSIZE, 75.0_f32).unwrap();
        let p = effect.properties();
        // No decay-time scaling, so the reverb level uses the 3000 mB scalar
        assert_eq!(p.decay_time, EAXREVERB_DEFAULTDECAYTIME);
        assert_eq!(p.reverb, 200 - 3000);
        assert_eq!(p.modulation_time, 2.5);
        assert_eq!(p.reflections, EAXREVERB_DEFAULTREFLECTIONS);

        // Shrinking clamps the modulation time at its floor
        set(&mut effect, &mut backend, slot, EAXREVERB_ENVIRONMENTSIZE, 1.0_f32).unwrap();
        assert_eq!(effect.properties().modulation_time, EAXREVERB_MINMODULATIONTIME);
    }

    #[test]
    fn test_native_mapping() {
        let (mut backend, slot, mut effect) = setup();
        set(&mut effect, &mut backend, slot, EAXREVERB_ROOM, -2000_i32).unwrap();
        set(&mut effect, &mut backend, slot, EAXREVERB_ENVIRONMENTSIZE, 2.0_f32).unwrap();
        set(&mut effect, &mut backend, slot, EAXREVERB_FLAGS, 0_u32).unwrap();

        let gain = backend.slot_param(slot, EfxParam::ReverbGain).and_then(|v| v.as_f32());
        assert_relative_eq!(gain.unwrap(), 0.1, epsilon = 1e-6);
        assert_eq!(backend.slot_param(slot, EfxParam::ReverbDensity), Some(EfxValue::Float(0.5)));
        assert_eq!(backend.slot_param(slot, EfxParam::ReverbDecayHFLimit), Some(EfxValue::Int(0)));
    }

    #[test]
    fn test_legacy_all_parameters() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = [0u8; size_of::<Eax20ListenerProperties>()];
        let mut call = crate::call::PropertyCall::new(
            true,
            Some(&crate::guids::DSPROPSETID_EAX20_LISTENER_PROPERTIES),
            1,
            0,
            Some(&mut buf[..]),
        )
        .unwrap();
        effect.dispatch(&mut call, &mut backend, slot).unwrap();
        let legacy: Eax20ListenerProperties = bytemuck::pod_read_unaligned(&buf);
        assert_eq!(legacy.room, EAXREVERB_DEFAULTROOM);
        assert_eq!(legacy.flags, EAXREVERB_DEFAULTFLAGS);

        // EAX 2.0 only knows six flags
        let bad = Eax20ListenerProperties { flags: 0x40, ..legacy };
        let mut buf = bytemuck::bytes_of(&bad).to_vec();
        let mut call = crate::call::PropertyCall::new(
            false,
            Some(&crate::guids::DSPROPSETID_EAX20_LISTENER_PROPERTIES),
            1,
            0,
            Some(&mut buf[..]),
        )
        .unwrap();
        assert!(effect.dispatch(&mut call, &mut backend, slot).is_err());
    }

    #[test]
    fn test_get_single_field() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = [0u8; 4];
        effect.dispatch(&mut effect_get(EAXREVERB_REFLECTIONS, &mut buf), &mut backend, slot).unwrap();
        assert_eq!(i32::from_ne_bytes(buf), EAXREVERB_DEFAULTREFLECTIONS);
    }
}
