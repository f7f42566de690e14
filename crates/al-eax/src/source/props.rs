//! Source property ids, ranges and wire layouts

use crate::guids::{EAX_NULL_GUID, EAX_PRIMARY_FX_SLOT_ID};
use crate::fx_slot_index::EAX_MAX_FX_SLOTS;
use al_core::Guid;
use bytemuck::{Pod, Zeroable};

pub const EAXSOURCE_NONE: u32 = 0;
pub const EAXSOURCE_ALLPARAMETERS: u32 = 1;
pub const EAXSOURCE_OBSTRUCTIONPARAMETERS: u32 = 2;
pub const EAXSOURCE_OCCLUSIONPARAMETERS: u32 = 3;
pub const EAXSOURCE_EXCLUSIONPARAMETERS: u32 = 4;
pub const EAXSOURCE_DIRECT: u32 = 5;
pub const EAXSOURCE_DIRECTHF: u32 = 6;
pub const EAXSOURCE_ROOM: u32 = 7;
pub const EAXSOURCE_ROOMHF: u32 = 8;
pub const EAXSOURCE_OBSTRUCTION: u32 = 9;
pub const EAXSOURCE_OBSTRUCTIONLFRATIO: u32 = 10;
pub const EAXSOURCE_OCCLUSION: u32 = 11;
pub const EAXSOURCE_OCCLUSIONLFRATIO: u32 = 12;
pub const EAXSOURCE_OCCLUSIONROOMRATIO: u32 = 13;
pub const EAXSOURCE_OCCLUSIONDIRECTRATIO: u32 = 14;
pub const EAXSOURCE_EXCLUSION: u32 = 15;
pub const EAXSOURCE_EXCLUSIONLFRATIO: u32 = 16;
pub const EAXSOURCE_OUTSIDEVOLUMEHF: u32 = 17;
pub const EAXSOURCE_DOPPLERFACTOR: u32 = 18;
pub const EAXSOURCE_ROLLOFFFACTOR: u32 = 19;
pub const EAXSOURCE_ROOMROLLOFFFACTOR: u32 = 20;
pub const EAXSOURCE_AIRABSORPTIONFACTOR: u32 = 21;
pub const EAXSOURCE_FLAGS: u32 = 22;
pub const EAXSOURCE_SENDPARAMETERS: u32 = 23;
pub const EAXSOURCE_ALLSENDPARAMETERS: u32 = 24;
pub const EAXSOURCE_OCCLUSIONSENDPARAMETERS: u32 = 25;
pub const EAXSOURCE_EXCLUSIONSENDPARAMETERS: u32 = 26;
pub const EAXSOURCE_ACTIVEFXSLOTID: u32 = 27;
pub const EAXSOURCE_MACROFXFACTOR: u32 = 28;
pub const EAXSOURCE_SPEAKERLEVELS: u32 = 29;
pub const EAXSOURCE_ALL2DPARAMETERS: u32 = 30;

pub const EAXSOURCE_MINSEND: i32 = -10_000;
pub const EAXSOURCE_MAXSEND: i32 = 0;
pub const EAXSOURCE_DEFAULTSEND: i32 = 0;

pub const EAXSOURCE_MINSENDHF: i32 = -10_000;
pub const EAXSOURCE_MAXSENDHF: i32 = 0;
pub const EAXSOURCE_DEFAULTSENDHF: i32 = 0;

pub const EAXSOURCE_MINDIRECT: i32 = -10_000;
pub const EAXSOURCE_MAXDIRECT: i32 = 1_000;
pub const EAXSOURCE_DEFAULTDIRECT: i32 = 0;

pub const EAXSOURCE_MINDIRECTHF: i32 = -10_000;
pub const EAXSOURCE_MAXDIRECTHF: i32 = 0;
pub const EAXSOURCE_DEFAULTDIRECTHF: i32 = 0;

pub const EAXSOURCE_MINROOM: i32 = -10_000;
pub const EAXSOURCE_MAXROOM: i32 = 1_000;
pub const EAXSOURCE_DEFAULTROOM: i32 = 0;

pub const EAXSOURCE_MINROOMHF: i32 = -10_000;
pub const EAXSOURCE_MAXROOMHF: i32 = 0;
pub const EAXSOURCE_DEFAULTROOMHF: i32 = 0;

pub const EAXSOURCE_MINOBSTRUCTION: i32 = -10_000;
pub const EAXSOURCE_MAXOBSTRUCTION: i32 = 0;
pub const EAXSOURCE_DEFAULTOBSTRUCTION: i32 = 0;

pub const EAXSOURCE_MINOBSTRUCTIONLFRATIO: f32 = 0.0;
pub const EAXSOURCE_MAXOBSTRUCTIONLFRATIO: f32 = 1.0;
pub const EAXSOURCE_DEFAULTOBSTRUCTIONLFRATIO: f32 = 0.0;

pub const EAXSOURCE_MINOCCLUSION: i32 = -10_000;
pub const EAXSOURCE_MAXOCCLUSION: i32 = 0;
pub const EAXSOURCE_DEFAULTOCCLUSION: i32 = 0;

pub const EAXSOURCE_MINOCCLUSIONLFRATIO: f32 = 0.0;
pub const EAXSOURCE_MAXOCCLUSIONLFRATIO: f32 = 1.0;
pub const EAXSOURCE_DEFAULTOCCLUSIONLFRATIO: f32 = 0.25;

pub const EAXSOURCE_MINOCCLUSIONROOMRATIO: f32 = 0.0;
pub const EAXSOURCE_MAXOCCLUSIONROOMRATIO: f32 = 10.0;
pub const EAXSOURCE_DEFAULTOCCLUSIONROOMRATIO: f32 = 1.5;

pub const EAXSOURCE_MINOCCLUSIONDIRECTRATIO: f32 = 0.0;
pub const EAXSOURCE_MAXOCCLUSIONDIRECTRATIO: f32 = 10.0;
pub const EAXSOURCE_DEFAULTOCCLUSIONDIRECTRATIO: f32 = 1.0;

pub const EAXSOURCE_MINEXCLUSION: i32 = -10_000;
pub const EAXSOURCE_MAXEXCLUSION: i32 = 0;
pub const EAXSOURCE_DEFAULTEXCLUSION: i32 = 0;

pub const EAXSOURCE_MINEXCLUSIONLFRATIO: f32 = 0.0;
pub const EAXSOURCE_MAXEXCLUSIONLFRATIO: f32 = 1.0;
pub const EAXSOURCE_DEFAULTEXCLUSIONLFRATIO: f32 = 1.0;

pub const EAXSOURCE_MINOUTSIDEVOLUMEHF: i32 = -10_000;
pub const EAXSOURCE_MAXOUTSIDEVOLUMEHF: i32 = 0;
pub const EAXSOURCE_DEFAULTOUTSIDEVOLUMEHF: i32 = 0;

pub const EAXSOURCE_MINDOPPLERFACTOR: f32 = 0.0;
pub const EAXSOURCE_MAXDOPPLERFACTOR: f32 = 10.0;
pub const EAXSOURCE_DEFAULTDOPPLERFACTOR: f32 = 1.0;

pub const EAXSOURCE_MINROLLOFFFACTOR: f32 = 0.0;
pub const EAXSOURCE_MAXROLLOFFFACTOR: f32 = 10.0;
pub const EAXSOURCE_DEFAULTROLLOFFFACTOR: f32 = 0.0;

pub const EAXSOURCE_MINROOMROLLOFFFACTOR: f32 = 0.0;
pub const EAXSOURCE_MAXROOMROLLOFFFACTOR: f32 = 10.0;
pub const EAXSOURCE_DEFAULTROOMROLLOFFFACTOR: f32 = 0.0;

pub const EAXSOURCE_MINAIRABSORPTIONFACTOR: f32 = 0.0;
pub const EAXSOURCE_MAXAIRABSORPTIONFACTOR: f32 = 10.0;
pub const EAXSOURCE_DEFAULTAIRABSORPTIONFACTOR: f32 = 1.0;

pub const EAXSOURCE_MINMACROFXFACTOR: f32 = 0.0;
pub const EAXSOURCE_MAXMACROFXFACTOR: f32 = 1.0;
pub const EAXSOURCE_DEFAULTMACROFXFACTOR: f32 = 0.0;

pub const EAXSOURCE_MINSPEAKERLEVEL: i32 = -10_000;
pub const EAXSOURCE_MAXSPEAKERLEVEL: i32 = 0;
pub const EAXSOURCE_DEFAULTSPEAKERLEVEL: i32 = -10_000;

pub const EAXSOURCEFLAGS_DIRECTHFAUTO: u32 = 0x1;
pub const EAXSOURCEFLAGS_ROOMAUTO: u32 = 0x2;
pub const EAXSOURCEFLAGS_ROOMHFAUTO: u32 = 0x4;
pub const EAXSOURCEFLAGS_UPMIX: u32 = 0x8;

pub const EAXSOURCE_DEFAULTFLAGS: u32 =
    EAXSOURCEFLAGS_DIRECTHFAUTO | EAXSOURCEFLAGS_ROOMAUTO | EAXSOURCEFLAGS_ROOMHFAUTO;

pub(super) const EAX20SOURCEFLAGS_RESERVED: u32 = 0xFFFF_FFF8;
pub(super) const EAX50SOURCEFLAGS_RESERVED: u32 = 0xFFFF_FFF0;

pub const SPEAKER_FRONT_LEFT: i32 = 1;
pub const SPEAKER_FRONT_CENTER: i32 = 2;
pub const SPEAKER_FRONT_RIGHT: i32 = 3;
pub const SPEAKER_SIDE_RIGHT: i32 = 4;
pub const SPEAKER_REAR_RIGHT: i32 = 5;
pub const SPEAKER_REAR_CENTER: i32 = 6;
pub const SPEAKER_REAR_LEFT: i32 = 7;
pub const SPEAKER_SIDE_LEFT: i32 = 8;
pub const SPEAKER_LOW_FREQUENCY: i32 = 9;

/// Number of addressable speaker levels
pub const EAX_SPEAKER_COUNT: usize = 9;

/// Active FX slot ids exposed by the 4.0 layout
pub const EAX40_MAX_ACTIVE_FXSLOTS: usize = 2;
/// Active FX slot ids exposed by the 5.0 layout
pub const EAX50_MAX_ACTIVE_FXSLOTS: usize = EAX_MAX_FX_SLOTS;

pub const EAX_DEFAULT_ACTIVE_FX_SLOT_IDS: [Guid; EAX_MAX_FX_SLOTS] =
    [EAX_NULL_GUID, EAX_PRIMARY_FX_SLOT_ID, EAX_NULL_GUID, EAX_NULL_GUID];

/// EAX 2.0 buffer properties
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax20BufferProperties {
    pub direct: i32,
    pub direct_hf: i32,
    pub room: i32,
    pub room_hf: i32,
    pub room_rolloff_factor: f32,
    pub obstruction: i32,
    pub obstruction_lf_ratio: f32,
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
    pub occlusion_room_ratio: f32,
    pub outside_volume_hf: i32,
    pub air_absorption_factor: f32,
    pub flags: u32,
}

/// EAX 3.0 / 4.0 source properties
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax30SourceProperties {
    pub direct: i32,
    pub direct_hf: i32,
    pub room: i32,
    pub room_hf: i32,
    pub obstruction: i32,
    pub obstruction_lf_ratio: f32,
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
    pub occlusion_room_ratio: f32,
    pub occlusion_direct_ratio: f32,
    pub exclusion: i32,
    pub exclusion_lf_ratio: f32,
    pub outside_volume_hf: i32,
    pub doppler_factor: f32,
    pub rolloff_factor: f32,
    pub room_rolloff_factor: f32,
    pub air_absorption_factor: f32,
    pub flags: u32,
}

/// EAX 5.0 source properties, also the internal source state
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax50SourceProperties {
    pub direct: i32,
    pub direct_hf: i32,
    pub room: i32,
    pub room_hf: i32,
    pub obstruction: i32,
    pub obstruction_lf_ratio: f32,
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
    pub occlusion_room_ratio: f32,
    pub occlusion_direct_ratio: f32,
    pub exclusion: i32,
    pub exclusion_lf_ratio: f32,
    pub outside_volume_hf: i32,
    pub doppler_factor: f32,
    pub rolloff_factor: f32,
    pub room_rolloff_factor: f32,
    pub air_absorption_factor: f32,
    pub flags: u32,
    pub macro_fx_factor: f32,
}

impl Default for Eax50SourceProperties {
    fn default() -> Self {
        Self {
            direct: EAXSOURCE_DEFAULTDIRECT,
            direct_hf: EAXSOURCE_DEFAULTDIRECTHF,
            room: EAXSOURCE_DEFAULTROOM,
            room_hf: EAXSOURCE_DEFAULTROOMHF,
            obstruction: EAXSOURCE_DEFAULTOBSTRUCTION,
            obstruction_lf_ratio: EAXSOURCE_DEFAULTOBSTRUCTIONLFRATIO,
            occlusion: EAXSOURCE_DEFAULTOCCLUSION,
            occlusion_lf_ratio: EAXSOURCE_DEFAULTOCCLUSIONLFRATIO,
            occlusion_room_ratio: EAXSOURCE_DEFAULTOCCLUSIONROOMRATIO,
            occlusion_direct_ratio: EAXSOURCE_DEFAULTOCCLUSIONDIRECTRATIO,
            exclusion: EAXSOURCE_DEFAULTEXCLUSION,
            exclusion_lf_ratio: EAXSOURCE_DEFAULTEXCLUSIONLFRATIO,
            outside_volume_hf: EAXSOURCE_DEFAULTOUTSIDEVOLUMEHF,
            doppler_factor: EAXSOURCE_DEFAULTDOPPLERFACTOR,
            rolloff_factor: EAXSOURCE_DEFAULTROLLOFFFACTOR,
            room_rolloff_factor: EAXSOURCE_DEFAULTROOMROLLOFFFACTOR,
            air_absorption_factor: EAXSOURCE_DEFAULTAIRABSORPTIONFACTOR,
            flags: EAXSOURCE_DEFAULTFLAGS,
            macro_fx_factor: EAXSOURCE_DEFAULTMACROFXFACTOR,
        }
    }
}

impl From<&Eax50SourceProperties> for Eax20BufferProperties {
    fn from(p: &Eax50SourceProperties) -> Self {
        Self {
            direct: p.direct,
            direct_hf: p.direct_hf,
            room: p.room,
            room_hf: p.room_hf,
            room_rolloff_factor: p.room_rolloff_factor,
            obstruction: p.obstruction,
            obstruction_lf_ratio: p.obstruction_lf_ratio,
            occlusion: p.occlusion,
            occlusion_lf_ratio: p.occlusion_lf_ratio,
            occlusion_room_ratio: p.occlusion_room_ratio,
            outside_volume_hf: p.outside_volume_hf,
            air_absorption_factor: p.air_absorption_factor,
            flags: p.flags,
        }
    }
}

impl Eax20BufferProperties {
    /// Overlay the legacy fields onto `base`; fields the 2.0 layout lacks keep their value
    pub fn merge_into(&self, base: &Eax50SourceProperties) -> Eax50SourceProperties {
        Eax50SourceProperties {
            direct: self.direct,
            direct_hf: self.direct_hf,
            room: self.room,
            room_hf: self.room_hf,
            room_rolloff_factor: self.room_rolloff_factor,
            obstruction: self.obstruction,
            obstruction_lf_ratio: self.obstruction_lf_ratio,
            occlusion: self.occlusion,
            occlusion_lf_ratio: self.occlusion_lf_ratio,
            occlusion_room_ratio: self.occlusion_room_ratio,
            outside_volume_hf: self.outside_volume_hf,
            air_absorption_factor: self.air_absorption_factor,
            flags: self.flags,
            ..*base
        }
    }
}

impl From<&Eax50SourceProperties> for Eax30SourceProperties {
    fn from(p: &Eax50SourceProperties) -> Self {
        Self {
            direct: p.direct,
            direct_hf: p.direct_hf,
            room: p.room,
            room_hf: p.room_hf,
            obstruction: p.obstruction,
            obstruction_lf_ratio: p.obstruction_lf_ratio,
            occlusion: p.occlusion,
            occlusion_lf_ratio: p.occlusion_lf_ratio,
            occlusion_room_ratio: p.occlusion_room_ratio,
            occlusion_direct_ratio: p.occlusion_direct_ratio,
            exclusion: p.exclusion,
            exclusion_lf_ratio: p.exclusion_lf_ratio,
            outside_volume_hf: p.outside_volume_hf,
            doppler_factor: p.doppler_factor,
            rolloff_factor: p.rolloff_factor,
            room_rolloff_factor: p.room_rolloff_factor,
            air_absorption_factor: p.air_absorption_factor,
            flags: p.flags,
        }
    }
}

impl Eax30SourceProperties {
    /// Widen to the 5.0 layout, keeping `base`'s macro FX factor
    pub fn merge_into(&self, base: &Eax50SourceProperties) -> Eax50SourceProperties {
        Eax50SourceProperties {
            direct: self.direct,
            direct_hf: self.direct_hf,
            room: self.room,
            room_hf: self.room_hf,
            obstruction: self.obstruction,
            obstruction_lf_ratio: self.obstruction_lf_ratio,
            occlusion: self.occlusion,
            occlusion_lf_ratio: self.occlusion_lf_ratio,
            occlusion_room_ratio: self.occlusion_room_ratio,
            occlusion_direct_ratio: self.occlusion_direct_ratio,
            exclusion: self.exclusion,
            exclusion_lf_ratio: self.exclusion_lf_ratio,
            outside_volume_hf: self.outside_volume_hf,
            doppler_factor: self.doppler_factor,
            rolloff_factor: self.rolloff_factor,
            room_rolloff_factor: self.room_rolloff_factor,
            air_absorption_factor: self.air_absorption_factor,
            flags: self.flags,
            macro_fx_factor: base.macro_fx_factor,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxObstructionProperties {
    pub obstruction: i32,
    pub obstruction_lf_ratio: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxOcclusionProperties {
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
    pub occlusion_room_ratio: f32,
    pub occlusion_direct_ratio: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxExclusionProperties {
    pub exclusion: i32,
    pub exclusion_lf_ratio: f32,
}

/// Non-positional subset
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxSource2dProperties {
    pub direct: i32,
    pub direct_hf: i32,
    pub room: i32,
    pub room_hf: i32,
    pub flags: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxSpeakerLevelProperties {
    pub speaker_id: i32,
    pub level: i32,
}

/// Per-send state, one per FX slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendProperties {
    pub send: i32,
    pub send_hf: i32,
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
    pub occlusion_room_ratio: f32,
    pub occlusion_direct_ratio: f32,
    pub exclusion: i32,
    pub exclusion_lf_ratio: f32,
}

impl Default for SendProperties {
    fn default() -> Self {
        Self {
            send: EAXSOURCE_DEFAULTSEND,
            send_hf: EAXSOURCE_DEFAULTSENDHF,
            occlusion: EAXSOURCE_DEFAULTOCCLUSION,
            occlusion_lf_ratio: EAXSOURCE_DEFAULTOCCLUSIONLFRATIO,
            occlusion_room_ratio: EAXSOURCE_DEFAULTOCCLUSIONROOMRATIO,
            occlusion_direct_ratio: EAXSOURCE_DEFAULTOCCLUSIONDIRECTRATIO,
            exclusion: EAXSOURCE_DEFAULTEXCLUSION,
            exclusion_lf_ratio: EAXSOURCE_DEFAULTEXCLUSIONLFRATIO,
        }
    }
}

/// Wire records of the send family. Each carries the receiving FX slot GUID
/// followed by a subset of `SendProperties`.
pub trait SendRecord: Pod {
    const NAME: &'static str;

    fn receiving_fx_slot_id(&self) -> &Guid;

    fn from_send(guid: Guid, send: &SendProperties) -> Self;

    /// Overlay this record's fields onto `send`
    fn merge_into(&self, send: &SendProperties) -> SendProperties;
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxSourceSendProperties {
    pub receiving_fx_slot_id: Guid,
    pub send: i32,
    pub send_hf: i32,
}

impl SendRecord for EaxSourceSendProperties {
    const NAME: &'static str = "Send";

    fn receiving_fx_slot_id(&self) -> &Guid {
        &self.receiving_fx_slot_id
    }

    fn from_send(guid: Guid, send: &SendProperties) -> Self {
        Self {
            receiving_fx_slot_id: guid,
            send: send.send,
            send_hf: send.send_hf,
        }
    }

    fn merge_into(&self, send: &SendProperties) -> SendProperties {
        SendProperties {
            send: self.send,
            send_hf: self.send_hf,
            ..*send
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxSourceAllSendProperties {
    pub receiving_fx_slot_id: Guid,
    pub send: i32,
    pub send_hf: i32,
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
    pub occlusion_room_ratio: f32,
    pub occlusion_direct_ratio: f32,
    pub exclusion: i32,
    pub exclusion_lf_ratio: f32,
}

impl SendRecord for EaxSourceAllSendProperties {
    const NAME: &'static str = "All Send";

    fn receiving_fx_slot_id(&self) -> &Guid {
        &self.receiving_fx_slot_id
    }

    fn from_send(guid: Guid, send: &SendProperties) -> Self {
        Self {
            receiving_fx_slot_id: guid,
            send: send.send,
            send_hf: send.send_hf,
            occlusion: send.occlusion,
            occlusion_lf_ratio: send.occlusion_lf_ratio,
            occlusion_room_ratio: send.occlusion_room_ratio,
            occlusion_direct_ratio: send.occlusion_direct_ratio,
            exclusion: send.exclusion,
            exclusion_lf_ratio: send.exclusion_lf_ratio,
        }
    }

    fn merge_into(&self, _send: &SendProperties) -> SendProperties {
        SendProperties {
            send: self.send,
            send_hf: self.send_hf,
            occlusion: self.occlusion,
            occlusion_lf_ratio: self.occlusion_lf_ratio,
            occlusion_room_ratio: self.occlusion_room_ratio,
            occlusion_direct_ratio: self.occlusion_direct_ratio,
            exclusion: self.exclusion,
            exclusion_lf_ratio: self.exclusion_lf_ratio,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxSourceOcclusionSendProperties {
    pub receiving_fx_slot_id: Guid,
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
    pub occlusion_room_ratio: f32,
    pub occlusion_direct_ratio: f32,
}

impl SendRecord for EaxSourceOcclusionSendProperties {
    const NAME: &'static str = "Occlusion Send";

    fn receiving_fx_slot_id(&self) -> &Guid {
        &self.receiving_fx_slot_id
    }

    fn from_send(guid: Guid, send: &SendProperties) -> Self {
        Self {
            receiving_fx_slot_id: guid,
            occlusion: send.occlusion,
            occlusion_lf_ratio: send.occlusion_lf_ratio,
            occlusion_room_ratio: send.occlusion_room_ratio,
            occlusion_direct_ratio: send.occlusion_direct_ratio,
        }
    }

    fn merge_into(&self, send: &SendProperties) -> SendProperties {
        SendProperties {
            occlusion: self.occlusion,
            occlusion_lf_ratio: self.occlusion_lf_ratio,
            occlusion_room_ratio: self.occlusion_room_ratio,
            occlusion_direct_ratio: self.occlusion_direct_ratio,
            ..*send
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EaxSourceExclusionSendProperties {
    pub receiving_fx_slot_id: Guid,
    pub exclusion: i32,
    pub exclusion_lf_ratio: f32,
}

impl SendRecord for EaxSourceExclusionSendProperties {
    const NAME: &'static str = "Exclusion Send";

    fn receiving_fx_slot_id(&self) -> &Guid {
        &self.receiving_fx_slot_id
    }

    fn from_send(guid: Guid, send: &SendProperties) -> Self {
        Self {
            receiving_fx_slot_id: guid,
            exclusion: send.exclusion,
            exclusion_lf_ratio: send.exclusion_lf_ratio,
        }
    }

    fn merge_into(&self, send: &SendProperties) -> SendProperties {
        SendProperties {
            exclusion: self.exclusion,
            exclusion_lf_ratio: self.exclusion_lf_ratio,
            ..*send
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_sizes() {
        assert_eq!(size_of::<Eax20BufferProperties>(), 13 * 4);
        assert_eq!(size_of::<Eax30SourceProperties>(), 18 * 4);
        assert_eq!(size_of::<Eax50SourceProperties>(), 19 * 4);
        assert_eq!(size_of::<EaxSourceSendProperties>(), 16 + 2 * 4);
        assert_eq!(size_of::<EaxSourceAllSendProperties>(), 16 + 8 * 4);
        assert_eq!(size_of::<EaxSourceOcclusionSendProperties>(), 16 + 4 * 4);
        assert_eq!(size_of::<EaxSourceExclusionSendProperties>(), 16 + 2 * 4);
        assert_eq!(size_of::<EaxSource2dProperties>(), 5 * 4);
    }

    #[test]
    fn test_legacy_merge_keeps_newer_fields() {
        let base = Eax50SourceProperties {
            exclusion: -300,
            macro_fx_factor: 0.5,
            ..Default::default()
        };
        let mut legacy = Eax20BufferProperties::from(&base);
        legacy.direct = -100;

        let merged = legacy.merge_into(&base);
        assert_eq!(merged.direct, -100);
        assert_eq!(merged.exclusion, -300);
        assert_eq!(merged.macro_fx_factor, 0.5);
    }

    #[test]
    fn test_partial_send_record() {
        let send = SendProperties {
            send: -200,
            ..Default::default()
        };
        let record = EaxSourceExclusionSendProperties {
            receiving_fx_slot_id: EAX_NULL_GUID,
            exclusion: -500,
            exclusion_lf_ratio: 0.5,
        };
        let merged = record.merge_into(&send);
        assert_eq!(merged.send, -200);
        assert_eq!(merged.exclusion, -500);
        assert_eq!(merged.occlusion_room_ratio, EAXSOURCE_DEFAULTOCCLUSIONROOMRATIO);
    }
}
