//! Context property ids, ranges and wire layouts

use crate::guids::EAXPROPERTYID_EAX40_FX_SLOT0;
use al_core::Guid;
use bytemuck::{Pod, Zeroable};

pub const EAXCONTEXT_NONE: u32 = 0;
pub const EAXCONTEXT_ALLPARAMETERS: u32 = 1;
pub const EAXCONTEXT_PRIMARYFXSLOTID: u32 = 2;
pub const EAXCONTEXT_DISTANCEFACTOR: u32 = 3;
pub const EAXCONTEXT_AIRABSORPTIONHF: u32 = 4;
pub const EAXCONTEXT_HFREFERENCE: u32 = 5;
pub const EAXCONTEXT_LASTERROR: u32 = 6;
pub const EAXCONTEXT_SPEAKERCONFIG: u32 = 7;
pub const EAXCONTEXT_EAXSESSION: u32 = 8;
pub const EAXCONTEXT_MACROFXFACTOR: u32 = 9;

pub const EAXCONTEXT_DEFAULTPRIMARYFXSLOTID: Guid = EAXPROPERTYID_EAX40_FX_SLOT0;

pub const EAXCONTEXT_MINDISTANCEFACTOR: f32 = f32::MIN_POSITIVE;
pub const EAXCONTEXT_MAXDISTANCEFACTOR: f32 = f32::MAX;
pub const EAXCONTEXT_DEFAULTDISTANCEFACTOR: f32 = 1.0;

pub const EAXCONTEXT_MINAIRABSORPTIONHF: f32 = -100.0;
pub const EAXCONTEXT_MAXAIRABSORPTIONHF: f32 = 0.0;
pub const EAXCONTEXT_DEFAULTAIRABSORPTIONHF: f32 = -5.0;

pub const EAXCONTEXT_MINHFREFERENCE: f32 = 1_000.0;
pub const EAXCONTEXT_MAXHFREFERENCE: f32 = 20_000.0;
pub const EAXCONTEXT_DEFAULTHFREFERENCE: f32 = 5_000.0;

pub const EAXCONTEXT_MINMACROFXFACTOR: f32 = 0.0;
pub const EAXCONTEXT_MAXMACROFXFACTOR: f32 = 1.0;
pub const EAXCONTEXT_DEFAULTMACROFXFACTOR: f32 = 0.0;

pub const EAXCONTEXT_MINMAXACTIVESENDS: u32 = 2;
pub const EAXCONTEXT_MAXMAXACTIVESENDS: u32 = 4;
pub const EAXCONTEXT_DEFAULTMAXACTIVESENDS: u32 = 2;

pub const EAX_OK: i32 = 0;
pub const EAXERR_INVALID_OPERATION: i32 = -1;

pub const HEADPHONES: u32 = 0;
pub const SPEAKERS_2: u32 = 1;
pub const SPEAKERS_4: u32 = 2;
pub const SPEAKERS_5: u32 = 3;
pub const SPEAKERS_6: u32 = 4;
pub const SPEAKERS_7: u32 = 5;

/// Session version tags
pub const EAX_40: u32 = 5;
pub const EAX_50: u32 = 6;

/// EAX 4.0 context properties
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax40ContextProperties {
    pub primary_fx_slot_id: Guid,
    pub distance_factor: f32,
    pub air_absorption_hf: f32,
    pub hf_reference: f32,
}

/// EAX 5.0 context properties
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax50ContextProperties {
    pub primary_fx_slot_id: Guid,
    pub distance_factor: f32,
    pub air_absorption_hf: f32,
    pub hf_reference: f32,
    pub macro_fx_factor: f32,
}

impl Default for Eax50ContextProperties {
    fn default() -> Self {
        Self {
            primary_fx_slot_id: EAXCONTEXT_DEFAULTPRIMARYFXSLOTID,
            distance_factor: EAXCONTEXT_DEFAULTDISTANCEFACTOR,
            air_absorption_hf: EAXCONTEXT_DEFAULTAIRABSORPTIONHF,
            hf_reference: EAXCONTEXT_DEFAULTHFREFERENCE,
            macro_fx_factor: EAXCONTEXT_DEFAULTMACROFXFACTOR,
        }
    }
}

impl From<&Eax50ContextProperties> for Eax40ContextProperties {
    fn from(p: &Eax50ContextProperties) -> Self {
        Self {
            primary_fx_slot_id: p.primary_fx_slot_id,
            distance_factor: p.distance_factor,
            air_absorption_hf: p.air_absorption_hf,
            hf_reference: p.hf_reference,
        }
    }
}

impl Eax40ContextProperties {
    pub fn merge_into(&self, base: &Eax50ContextProperties) -> Eax50ContextProperties {
        Eax50ContextProperties {
            primary_fx_slot_id: self.primary_fx_slot_id,
            distance_factor: self.distance_factor,
            air_absorption_hf: self.air_absorption_hf,
            hf_reference: self.hf_reference,
            macro_fx_factor: base.macro_fx_factor,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct EaxSessionProperties {
    pub eax_version: u32,
    pub max_active_sends: u32,
}

impl Default for EaxSessionProperties {
    fn default() -> Self {
        Self {
            eax_version: EAX_40,
            max_active_sends: EAXCONTEXT_DEFAULTMAXACTIVESENDS,
        }
    }
}
