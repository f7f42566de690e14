//! EAX source
//!
//! Per-source obstruction, occlusion and exclusion state plus the four
//! sends into the context's FX slots. Every filter-affecting change ends up
//! as low-pass gains on the source's direct path and on each active send.
//!
//! ## Commit order
//! 1. Active FX slot membership (forces a full filter pass)
//! 2. Filter inputs of the source or of an active send (one filter pass)
//! 3. Fields with their own native setter (doppler, rolloff, flags, ...)

mod filter;
mod props;

pub use filter::{LowpassParam, calculate_dst_occlusion_mb, direct_filter_param, room_filter_param};
pub use props::*;

use crate::backend::{EffectSlotId, EfxBackend, FilterId, SourceFlag, SourceId, SourceParam};
use crate::call::{PropertyCall, PropertySetId};
use crate::context::{SharedField, SharedState};
use crate::dirty::DirtySet;
use crate::error::{EaxError, EaxResult};
use crate::fx_slot_index::{EAX_MAX_FX_SLOTS, FxSlotIndex};
use crate::guids::*;
use crate::validate::{validate_flags, validate_range};
use al_core::{Guid, clamp_f32, level_mb_to_gain};

const OWNER: &str = "Source";

crate::dirty_fields! {
    /// Inputs of the direct and room filters
    enum FilterField {
        Direct,
        DirectHF,
        Room,
        RoomHF,
        Obstruction,
        ObstructionLFRatio,
        Occlusion,
        OcclusionLFRatio,
        OcclusionRoomRatio,
        OcclusionDirectRatio,
        Exclusion,
        ExclusionLFRatio,
    }
}

crate::dirty_fields! {
    enum MiscField {
        OutsideVolumeHF,
        DopplerFactor,
        RolloffFactor,
        RoomRolloffFactor,
        AirAbsorptionFactor,
        Flags,
        MacroFXFactor,
        SpeakerLevels,
    }
}

crate::dirty_fields! {
    enum SendField {
        Send,
        SendHF,
        Occlusion,
        OcclusionLFRatio,
        OcclusionRoomRatio,
        OcclusionDirectRatio,
        Exclusion,
        ExclusionLFRatio,
    }
}

/// What a source needs to know about one FX slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotView {
    pub efx_slot: EffectSlotId,
    pub occlusion: i32,
}

/// Context state read by a source while it pushes native changes
#[derive(Debug, Clone, Copy)]
pub struct SourceEnv<'a> {
    pub shared: &'a SharedState,
    pub slots: [SlotView; EAX_MAX_FX_SLOTS],
    /// Low-pass filter shared by every source of the context
    pub filter: FilterId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SourceState {
    source: Eax50SourceProperties,
    active_fx_slots: [Guid; EAX_MAX_FX_SLOTS],
    sends: [SendProperties; EAX_MAX_FX_SLOTS],
    speaker_levels: [i32; EAX_SPEAKER_COUNT],
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            source: Eax50SourceProperties::default(),
            active_fx_slots: EAX_DEFAULT_ACTIVE_FX_SLOT_IDS,
            sends: [SendProperties::default(); EAX_MAX_FX_SLOTS],
            speaker_levels: [EAXSOURCE_DEFAULTSPEAKERLEVEL; EAX_SPEAKER_COUNT],
        }
    }
}

/// One native source under EAX control
#[derive(Debug)]
pub struct Source {
    id: SourceId,
    eax: SourceState,
    eax_d: SourceState,

    uses_primary_id: bool,
    has_active_fx_slots: bool,
    active_fx_slots: [bool; EAX_MAX_FX_SLOTS],

    active_fx_slots_dirty: bool,
    filter_dirty: DirtySet<FilterField>,
    misc_dirty: DirtySet<MiscField>,
    sends_dirty: [DirtySet<SendField>; EAX_MAX_FX_SLOTS],
}

impl Source {
    /// Take over `id` with default EAX state and wire its sends and filters
    pub fn new(id: SourceId, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let eax = SourceState::default();
        let mut source = Self {
            id,
            eax,
            eax_d: eax,
            uses_primary_id: false,
            has_active_fx_slots: false,
            active_fx_slots: [false; EAX_MAX_FX_SLOTS],
            active_fx_slots_dirty: false,
            filter_dirty: DirtySet::new(),
            misc_dirty: DirtySet::new(),
            sends_dirty: [DirtySet::new(); EAX_MAX_FX_SLOTS],
        };

        source.set_fx_slots(env, backend)?;
        source.update_filters_internal(env, backend)?;

        source.set_outside_volume_hf(backend)?;
        source.set_doppler_factor(backend)?;
        source.set_rolloff_factor(backend)?;
        source.set_room_rolloff_factor(backend)?;
        source.set_air_absorption_factor(env, backend)?;
        source.set_flags(backend)?;

        log::debug!("[EAX] Source {} registered", id.0);
        Ok(source)
    }

    #[inline]
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Committed source properties
    pub fn properties(&self) -> &Eax50SourceProperties {
        &self.eax.source
    }

    /// Committed active FX slot GUIDs
    pub fn active_fx_slot_ids(&self) -> &[Guid; EAX_MAX_FX_SLOTS] {
        &self.eax.active_fx_slots
    }

    /// Committed send state for an FX slot
    pub fn send(&self, index: usize) -> Option<&SendProperties> {
        self.eax.sends.get(index)
    }

    /// Committed level of a speaker (1-based id)
    pub fn speaker_level(&self, speaker_id: i32) -> Option<i32> {
        let index = usize::try_from(speaker_id).ok()?.checked_sub(1)?;
        self.eax.speaker_levels.get(index).copied()
    }

    /// Whether the native send `index` is routed to its FX slot
    pub fn is_fx_slot_active(&self, index: usize) -> bool {
        self.active_fx_slots.get(index).copied().unwrap_or(false)
    }

    pub fn has_active_fx_slots(&self) -> bool {
        self.has_active_fx_slots
    }

    /// True if one of the active slot ids is the primary sentinel
    pub fn uses_primary_fx_slot_id(&self) -> bool {
        self.uses_primary_id
    }

    /// Handle a source call. Non-deferred sets commit everything staged so far.
    pub fn dispatch(
        &mut self,
        call: &mut PropertyCall<'_>,
        env: &SourceEnv<'_>,
        backend: &mut dyn EfxBackend,
    ) -> EaxResult<()> {
        match call.property_set_id() {
            PropertySetId::Source if call.is_get() => self.get(call),
            PropertySetId::Source => {
                self.set(call)?;
                if !call.is_deferred() {
                    self.apply_deferred(env, backend)?;
                }
                Ok(())
            }
            other => Err(EaxError::internal(format!("Source got a {other:?} call"))),
        }
    }

    /// Recompute every filter, e.g. after an FX slot's occlusion changed
    pub fn update_filters(&mut self, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.update_filters_internal(env, backend)
    }

    /// React to committed context changes
    pub fn update(
        &mut self,
        shared_dirty: DirtySet<SharedField>,
        env: &SourceEnv<'_>,
        backend: &mut dyn EfxBackend,
    ) -> EaxResult<()> {
        if shared_dirty.contains(SharedField::PrimaryFxSlotId) && self.uses_primary_id {
            self.update_primary_fx_slot_id(env, backend)?;
        }
        if shared_dirty.contains(SharedField::AirAbsorptionHF) {
            self.set_air_absorption_factor(env, backend)?;
        }
        Ok(())
    }

    // FX slots and filters

    fn set_fx_slots(&mut self, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.uses_primary_id = false;
        self.active_fx_slots = [false; EAX_MAX_FX_SLOTS];

        let ids = self.eax.active_fx_slots;
        for id in &ids {
            let index = if *id == EAX_PRIMARY_FX_SLOT_ID {
                self.uses_primary_id = true;
                env.shared.primary_fx_slot_index
            } else {
                FxSlotIndex::from_guid(id)
            };
            if let Some(i) = index.value() {
                self.active_fx_slots[i] = true;
            }
        }
        self.has_active_fx_slots = self.active_fx_slots.iter().any(|&active| active);

        for i in (0..EAX_MAX_FX_SLOTS).filter(|&i| !self.active_fx_slots[i]) {
            backend.set_source_send(self.id, i, None)?;
        }
        Ok(())
    }

    fn update_filters_internal(&mut self, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let direct = direct_filter_param(
            &self.eax.source,
            &self.eax.sends,
            &self.active_fx_slots,
            env.shared.max_filter_gain,
        );
        backend.set_lowpass(env.filter, direct.gain, direct.gain_hf)?;
        backend.set_source_direct_filter(self.id, env.filter)?;

        if !self.has_active_fx_slots {
            return Ok(());
        }
        for i in (0..EAX_MAX_FX_SLOTS).filter(|&i| self.active_fx_slots[i]) {
            self.attach_send(i, env, backend)?;
        }
        Ok(())
    }

    fn attach_send(&self, index: usize, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let slot = &env.slots[index];
        let room = room_filter_param(
            &self.eax.source,
            &self.eax.sends[index],
            slot.occlusion,
            env.shared.max_filter_gain,
        );
        backend.set_lowpass(env.filter, room.gain, room.gain_hf)?;
        backend.set_source_send(self.id, index, Some((slot.efx_slot, env.filter)))
    }

    fn update_primary_fx_slot_id(&mut self, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let previous = env.shared.previous_primary_fx_slot_index;
        let primary = env.shared.primary_fx_slot_index;
        if previous == primary {
            return Ok(());
        }

        if let Some(i) = previous.value() {
            self.active_fx_slots[i] = false;
            backend.set_source_send(self.id, i, None)?;
        }
        if let Some(i) = primary.value() {
            self.active_fx_slots[i] = true;
            self.attach_send(i, env, backend)?;
        }

        self.has_active_fx_slots = self.active_fx_slots.iter().any(|&active| active);
        Ok(())
    }

    // Commit

    fn is_dirty(&self) -> bool {
        self.active_fx_slots_dirty
            || !self.filter_dirty.is_empty()
            || !self.misc_dirty.is_empty()
            || self.sends_dirty.iter().any(|d| !d.is_empty())
    }

    /// Commit staged values and push what changed to the backend.
    ///
    /// On a backend failure the values stay committed and the dirty flags
    /// stay set, so the next commit reissues the native calls.
    pub(crate) fn apply_deferred(&mut self, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        if !self.is_dirty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.active_fx_slots_dirty {
            self.set_fx_slots(env, backend)?;
            self.update_filters_internal(env, backend)?;
        } else if !self.filter_dirty.is_empty() || self.is_active_send_dirty() {
            self.update_filters_internal(env, backend)?;
        }

        let misc = self.misc_dirty;
        if misc.contains(MiscField::OutsideVolumeHF) {
            self.set_outside_volume_hf(backend)?;
        }
        if misc.contains(MiscField::DopplerFactor) {
            self.set_doppler_factor(backend)?;
        }
        if misc.contains(MiscField::RolloffFactor) {
            self.set_rolloff_factor(backend)?;
        }
        if misc.contains(MiscField::RoomRolloffFactor) {
            self.set_room_rolloff_factor(backend)?;
        }
        if misc.contains(MiscField::AirAbsorptionFactor) {
            self.set_air_absorption_factor(env, backend)?;
        }
        if misc.contains(MiscField::Flags) {
            self.set_flags(backend)?;
        }
        // Macro FX and speaker levels have no native counterpart

        self.active_fx_slots_dirty = false;
        self.filter_dirty.clear();
        self.misc_dirty.clear();
        self.sends_dirty.iter_mut().for_each(DirtySet::clear);
        Ok(())
    }

    fn is_active_send_dirty(&self) -> bool {
        self.has_active_fx_slots
            && self
                .sends_dirty
                .iter()
                .zip(&self.active_fx_slots)
                .any(|(dirty, &active)| active && !dirty.is_empty())
    }

    /// Recompute every dirty flag from the committed/deferred pair
    fn sync_dirty(&mut self) {
        let (a, d) = (&self.eax, &self.eax_d);

        self.active_fx_slots_dirty = a.active_fx_slots != d.active_fx_slots;

        let (s, t) = (&a.source, &d.source);
        let f = &mut self.filter_dirty;
        f.assign(FilterField::Direct, s.direct != t.direct);
        f.assign(FilterField::DirectHF, s.direct_hf != t.direct_hf);
        f.assign(FilterField::Room, s.room != t.room);
        f.assign(FilterField::RoomHF, s.room_hf != t.room_hf);
        f.assign(FilterField::Obstruction, s.obstruction != t.obstruction);
        f.assign(FilterField::ObstructionLFRatio, s.obstruction_lf_ratio != t.obstruction_lf_ratio);
        f.assign(FilterField::Occlusion, s.occlusion != t.occlusion);
        f.assign(FilterField::OcclusionLFRatio, s.occlusion_lf_ratio != t.occlusion_lf_ratio);
        f.assign(FilterField::OcclusionRoomRatio, s.occlusion_room_ratio != t.occlusion_room_ratio);
        f.assign(FilterField::OcclusionDirectRatio, s.occlusion_direct_ratio != t.occlusion_direct_ratio);
        f.assign(FilterField::Exclusion, s.exclusion != t.exclusion);
        f.assign(FilterField::ExclusionLFRatio, s.exclusion_lf_ratio != t.exclusion_lf_ratio);

        let m = &mut self.misc_dirty;
        m.assign(MiscField::OutsideVolumeHF, s.outside_volume_hf != t.outside_volume_hf);
        m.assign(MiscField::DopplerFactor, s.doppler_factor != t.doppler_factor);
        m.assign(MiscField::RolloffFactor, s.rolloff_factor != t.rolloff_factor);
        m.assign(MiscField::RoomRolloffFactor, s.room_rolloff_factor != t.room_rolloff_factor);
        m.assign(MiscField::AirAbsorptionFactor, s.air_absorption_factor != t.air_absorption_factor);
        m.assign(MiscField::Flags, s.flags != t.flags);
        m.assign(MiscField::MacroFXFactor, s.macro_fx_factor != t.macro_fx_factor);
        m.assign(MiscField::SpeakerLevels, a.speaker_levels != d.speaker_levels);

        for ((dirty, s), t) in self.sends_dirty.iter_mut().zip(&a.sends).zip(&d.sends) {
            dirty.assign(SendField::Send, s.send != t.send);
            dirty.assign(SendField::SendHF, s.send_hf != t.send_hf);
            dirty.assign(SendField::Occlusion, s.occlusion != t.occlusion);
            dirty.assign(SendField::OcclusionLFRatio, s.occlusion_lf_ratio != t.occlusion_lf_ratio);
            dirty.assign(SendField::OcclusionRoomRatio, s.occlusion_room_ratio != t.occlusion_room_ratio);
            dirty.assign(SendField::OcclusionDirectRatio, s.occlusion_direct_ratio != t.occlusion_direct_ratio);
            dirty.assign(SendField::Exclusion, s.exclusion != t.exclusion);
            dirty.assign(SendField::ExclusionLFRatio, s.exclusion_lf_ratio != t.exclusion_lf_ratio);
        }
    }

    // Native setters

    fn set_outside_volume_hf(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let gain = clamp_f32(level_mb_to_gain(self.eax.source.outside_volume_hf as f32), 0.0, 1.0);
        backend.set_source_param(self.id, SourceParam::ConeOuterGainHF, gain)
    }

    fn set_doppler_factor(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        backend.set_source_param(self.id, SourceParam::DopplerFactor, self.eax.source.doppler_factor)
    }

    fn set_rolloff_factor(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        backend.set_source_param(self.id, SourceParam::RolloffFactor, self.eax.source.rolloff_factor)
    }

    fn set_room_rolloff_factor(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        backend.set_source_param(
            self.id,
            SourceParam::RoomRolloffFactor,
            self.eax.source.room_rolloff_factor,
        )
    }

    fn set_air_absorption_factor(&self, env: &SourceEnv<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let factor = env.shared.air_absorption_factor * self.eax.source.air_absorption_factor;
        backend.set_source_param(self.id, SourceParam::AirAbsorptionFactor, factor)
    }

    fn set_flags(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let flags = self.eax.source.flags;
        backend.set_source_flag(
            self.id,
            SourceFlag::DirectFilterGainHFAuto,
            flags & EAXSOURCEFLAGS_DIRECTHFAUTO != 0,
        )?;
        backend.set_source_flag(
            self.id,
            SourceFlag::AuxSendFilterGainAuto,
            flags & EAXSOURCEFLAGS_ROOMAUTO != 0,
        )?;
        backend.set_source_flag(
            self.id,
            SourceFlag::AuxSendFilterGainHFAuto,
            flags & EAXSOURCEFLAGS_ROOMHFAUTO != 0,
        )
    }

    // Get

    fn get(&self, call: &mut PropertyCall<'_>) -> EaxResult<()> {
        let s = &self.eax.source;
        match call.property_id() {
            EAXSOURCE_NONE => Ok(()),
            EAXSOURCE_ALLPARAMETERS => match call.version() {
                2 => call.set_value(&Eax20BufferProperties::from(s)),
                3 | 4 => call.set_value(&Eax30SourceProperties::from(s)),
                _ => call.set_value(s),
            },
            EAXSOURCE_OBSTRUCTIONPARAMETERS => call.set_value(&EaxObstructionProperties {
                obstruction: s.obstruction,
                obstruction_lf_ratio: s.obstruction_lf_ratio,
            }),
            EAXSOURCE_OCCLUSIONPARAMETERS => call.set_value(&EaxOcclusionProperties {
                occlusion: s.occlusion,
                occlusion_lf_ratio: s.occlusion_lf_ratio,
                occlusion_room_ratio: s.occlusion_room_ratio,
                occlusion_direct_ratio: s.occlusion_direct_ratio,
            }),
            EAXSOURCE_EXCLUSIONPARAMETERS => call.set_value(&EaxExclusionProperties {
                exclusion: s.exclusion,
                exclusion_lf_ratio: s.exclusion_lf_ratio,
            }),
            EAXSOURCE_DIRECT => call.set_value(&s.direct),
            EAXSOURCE_DIRECTHF => call.set_value(&s.direct_hf),
            EAXSOURCE_ROOM => call.set_value(&s.room),
            EAXSOURCE_ROOMHF => call.set_value(&s.room_hf),
            EAXSOURCE_OBSTRUCTION => call.set_value(&s.obstruction),
            EAXSOURCE_OBSTRUCTIONLFRATIO => call.set_value(&s.obstruction_lf_ratio),
            EAXSOURCE_OCCLUSION => call.set_value(&s.occlusion),
            EAXSOURCE_OCCLUSIONLFRATIO => call.set_value(&s.occlusion_lf_ratio),
            EAXSOURCE_OCCLUSIONROOMRATIO => call.set_value(&s.occlusion_room_ratio),
            EAXSOURCE_OCCLUSIONDIRECTRATIO => call.set_value(&s.occlusion_direct_ratio),
            EAXSOURCE_EXCLUSION => call.set_value(&s.exclusion),
            EAXSOURCE_EXCLUSIONLFRATIO => call.set_value(&s.exclusion_lf_ratio),
            EAXSOURCE_OUTSIDEVOLUMEHF => call.set_value(&s.outside_volume_hf),
            EAXSOURCE_DOPPLERFACTOR => call.set_value(&s.doppler_factor),
            EAXSOURCE_ROLLOFFFACTOR => call.set_value(&s.rolloff_factor),
            EAXSOURCE_ROOMROLLOFFFACTOR => call.set_value(&s.room_rolloff_factor),
            EAXSOURCE_AIRABSORPTIONFACTOR => call.set_value(&s.air_absorption_factor),
            EAXSOURCE_FLAGS => call.set_value(&s.flags),
            EAXSOURCE_SENDPARAMETERS => self.get_sends::<EaxSourceSendProperties>(call),
            EAXSOURCE_ALLSENDPARAMETERS => self.get_sends::<EaxSourceAllSendProperties>(call),
            EAXSOURCE_OCCLUSIONSENDPARAMETERS => self.get_sends::<EaxSourceOcclusionSendProperties>(call),
            EAXSOURCE_EXCLUSIONSENDPARAMETERS => self.get_sends::<EaxSourceExclusionSendProperties>(call),
            EAXSOURCE_ACTIVEFXSLOTID => self.get_active_fx_slots(call),
            EAXSOURCE_MACROFXFACTOR => call.set_value(&s.macro_fx_factor),
            EAXSOURCE_SPEAKERLEVELS => {
                let mut levels: EaxSpeakerLevelProperties = call.get_value()?;
                let index = Self::validate_speaker_id(levels.speaker_id)?;
                levels.level = self.eax.speaker_levels[index];
                call.set_value(&levels)
            }
            EAXSOURCE_ALL2DPARAMETERS => call.set_value(&EaxSource2dProperties {
                direct: s.direct,
                direct_hf: s.direct_hf,
                room: s.room,
                room_hf: s.room_hf,
                flags: s.flags,
            }),
            id => Err(unsupported(id)),
        }
    }

    /// Fill as many records as fit, slot by slot
    fn get_sends<T: SendRecord>(&self, call: &mut PropertyCall<'_>) -> EaxResult<()> {
        let version = call.version();
        let count = call.get_values::<T>(EAX_MAX_FX_SLOTS)?.len();
        for (i, send) in self.eax.sends.iter().enumerate().take(count) {
            let record = T::from_send(send_fx_slot_guid(version, i)?, send);
            call.set_value_at(i, &record)?;
        }
        Ok(())
    }

    fn get_active_fx_slots(&self, call: &mut PropertyCall<'_>) -> EaxResult<()> {
        let ids = &self.eax.active_fx_slots;
        match call.version() {
            4 => {
                let mut v4 = [EAX_NULL_GUID; EAX40_MAX_ACTIVE_FXSLOTS];
                v4.copy_from_slice(&ids[..EAX40_MAX_ACTIVE_FXSLOTS]);
                call.set_value(&v4)
            }
            5 => call.set_value(ids),
            version => Err(EaxError::protocol(format!(
                "Active FX slots not available in EAX {version}.0"
            ))),
        }
    }

    // Set

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        let version = call.version();
        match call.property_id() {
            EAXSOURCE_NONE => Ok(()),
            EAXSOURCE_ALLPARAMETERS => {
                let base = self.eax_d.source;
                let all = match version {
                    2 => call.get_value::<Eax20BufferProperties>()?.merge_into(&base),
                    3 | 4 => call.get_value::<Eax30SourceProperties>()?.merge_into(&base),
                    _ => call.get_value::<Eax50SourceProperties>()?,
                };
                Self::validate_all(&all, version)?;
                self.defer_source(|s| *s = all)
            }
            EAXSOURCE_OBSTRUCTIONPARAMETERS => {
                let v: EaxObstructionProperties = call.get_value()?;
                Self::validate_obstruction(v.obstruction)?;
                Self::validate_obstruction_lf_ratio(v.obstruction_lf_ratio)?;
                self.defer_source(|s| {
                    s.obstruction = v.obstruction;
                    s.obstruction_lf_ratio = v.obstruction_lf_ratio;
                })
            }
            EAXSOURCE_OCCLUSIONPARAMETERS => {
                let v: EaxOcclusionProperties = call.get_value()?;
                Self::validate_occlusion(v.occlusion)?;
                Self::validate_occlusion_lf_ratio(v.occlusion_lf_ratio)?;
                Self::validate_occlusion_room_ratio(v.occlusion_room_ratio)?;
                Self::validate_occlusion_direct_ratio(v.occlusion_direct_ratio)?;
                self.defer_source(|s| {
                    s.occlusion = v.occlusion;
                    s.occlusion_lf_ratio = v.occlusion_lf_ratio;
                    s.occlusion_room_ratio = v.occlusion_room_ratio;
                    s.occlusion_direct_ratio = v.occlusion_direct_ratio;
                })
            }
            EAXSOURCE_EXCLUSIONPARAMETERS => {
                let v: EaxExclusionProperties = call.get_value()?;
                Self::validate_exclusion(v.exclusion)?;
                Self::validate_exclusion_lf_ratio(v.exclusion_lf_ratio)?;
                self.defer_source(|s| {
                    s.exclusion = v.exclusion;
                    s.exclusion_lf_ratio = v.exclusion_lf_ratio;
                })
            }
            EAXSOURCE_DIRECT => {
                let v = call.get_value()?;
                Self::validate_direct(v)?;
                self.defer_source(|s| s.direct = v)
            }
            EAXSOURCE_DIRECTHF => {
                let v = call.get_value()?;
                Self::validate_direct_hf(v)?;
                self.defer_source(|s| s.direct_hf = v)
            }
            EAXSOURCE_ROOM => {
                let v = call.get_value()?;
                Self::validate_room(v)?;
                self.defer_source(|s| s.room = v)
            }
            EAXSOURCE_ROOMHF => {
                let v = call.get_value()?;
                Self::validate_room_hf(v)?;
                self.defer_source(|s| s.room_hf = v)
            }
            EAXSOURCE_OBSTRUCTION => {
                let v = call.get_value()?;
                Self::validate_obstruction(v)?;
                self.defer_source(|s| s.obstruction = v)
            }
            EAXSOURCE_OBSTRUCTIONLFRATIO => {
                let v = call.get_value()?;
                Self::validate_obstruction_lf_ratio(v)?;
                self.defer_source(|s| s.obstruction_lf_ratio = v)
            }
            EAXSOURCE_OCCLUSION => {
                let v = call.get_value()?;
                Self::validate_occlusion(v)?;
                self.defer_source(|s| s.occlusion = v)
            }
            EAXSOURCE_OCCLUSIONLFRATIO => {
                let v = call.get_value()?;
                Self::validate_occlusion_lf_ratio(v)?;
                self.defer_source(|s| s.occlusion_lf_ratio = v)
            }
            EAXSOURCE_OCCLUSIONROOMRATIO => {
                let v = call.get_value()?;
                Self::validate_occlusion_room_ratio(v)?;
                self.defer_source(|s| s.occlusion_room_ratio = v)
            }
            EAXSOURCE_OCCLUSIONDIRECTRATIO => {
                let v = call.get_value()?;
                Self::validate_occlusion_direct_ratio(v)?;
                self.defer_source(|s| s.occlusion_direct_ratio = v)
            }
            EAXSOURCE_EXCLUSION => {
                let v = call.get_value()?;
                Self::validate_exclusion(v)?;
                self.defer_source(|s| s.exclusion = v)
            }
            EAXSOURCE_EXCLUSIONLFRATIO => {
                let v = call.get_value()?;
                Self::validate_exclusion_lf_ratio(v)?;
                self.defer_source(|s| s.exclusion_lf_ratio = v)
            }
            EAXSOURCE_OUTSIDEVOLUMEHF => {
                let v = call.get_value()?;
                Self::validate_outside_volume_hf(v)?;
                self.defer_source(|s| s.outside_volume_hf = v)
            }
            EAXSOURCE_DOPPLERFACTOR => {
                let v = call.get_value()?;
                Self::validate_doppler_factor(v)?;
                self.defer_source(|s| s.doppler_factor = v)
            }
            EAXSOURCE_ROLLOFFFACTOR => {
                let v = call.get_value()?;
                Self::validate_rolloff_factor(v)?;
                self.defer_source(|s| s.rolloff_factor = v)
            }
            EAXSOURCE_ROOMROLLOFFFACTOR => {
                let v = call.get_value()?;
                Self::validate_room_rolloff_factor(v)?;
                self.defer_source(|s| s.room_rolloff_factor = v)
            }
            EAXSOURCE_AIRABSORPTIONFACTOR => {
                let v = call.get_value()?;
                Self::validate_air_absorption_factor(v)?;
                self.defer_source(|s| s.air_absorption_factor = v)
            }
            EAXSOURCE_FLAGS => {
                let v = call.get_value()?;
                Self::validate_flags(v, version)?;
                self.defer_source(|s| s.flags = v)
            }
            EAXSOURCE_SENDPARAMETERS => self.defer_sends::<EaxSourceSendProperties>(call),
            EAXSOURCE_ALLSENDPARAMETERS => self.defer_sends::<EaxSourceAllSendProperties>(call),
            EAXSOURCE_OCCLUSIONSENDPARAMETERS => self.defer_sends::<EaxSourceOcclusionSendProperties>(call),
            EAXSOURCE_EXCLUSIONSENDPARAMETERS => self.defer_sends::<EaxSourceExclusionSendProperties>(call),
            EAXSOURCE_ACTIVEFXSLOTID => self.defer_active_fx_slots(call),
            EAXSOURCE_MACROFXFACTOR => {
                let v = call.get_value()?;
                Self::validate_macro_fx_factor(v)?;
                self.defer_source(|s| s.macro_fx_factor = v)
            }
            EAXSOURCE_SPEAKERLEVELS => {
                let v: EaxSpeakerLevelProperties = call.get_value()?;
                let index = Self::validate_speaker_id(v.speaker_id)?;
                Self::validate_speaker_level(v.level)?;
                self.eax_d.speaker_levels[index] = v.level;
                self.sync_dirty();
                Ok(())
            }
            EAXSOURCE_ALL2DPARAMETERS => {
                let v: EaxSource2dProperties = call.get_value()?;
                Self::validate_direct(v.direct)?;
                Self::validate_direct_hf(v.direct_hf)?;
                Self::validate_room(v.room)?;
                Self::validate_room_hf(v.room_hf)?;
                Self::validate_flags(v.flags, version)?;
                self.defer_source(|s| {
                    s.direct = v.direct;
                    s.direct_hf = v.direct_hf;
                    s.room = v.room;
                    s.room_hf = v.room_hf;
                    s.flags = v.flags;
                })
            }
            id => Err(unsupported(id)),
        }
    }

    fn defer_source(&mut self, update: impl FnOnce(&mut Eax50SourceProperties)) -> EaxResult<()> {
        update(&mut self.eax_d.source);
        self.sync_dirty();
        Ok(())
    }

    /// Stage 1..=4 send records. Every record is checked before any is staged.
    fn defer_sends<T: SendRecord>(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        let records = call.get_values::<T>(usize::MAX)?;
        if records.len() > EAX_MAX_FX_SLOTS {
            return Err(EaxError::validation(
                OWNER,
                T::NAME,
                format!("record count {} out of range", records.len()),
            ));
        }

        let mut staged = Vec::with_capacity(records.len());
        for record in &records {
            let index = Self::send_index(record.receiving_fx_slot_id())?;
            let send = record.merge_into(&self.eax_d.sends[index]);
            Self::validate_send(&send)?;
            staged.push((index, send));
        }

        for (index, send) in staged {
            self.eax_d.sends[index] = send;
        }
        self.sync_dirty();
        Ok(())
    }

    fn defer_active_fx_slots(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        let ids = call.get_values::<Guid>(usize::MAX)?;
        if ids.len() > EAX_MAX_FX_SLOTS {
            return Err(EaxError::validation(
                OWNER,
                "Active FX Slot Id",
                format!("count {} out of range", ids.len()),
            ));
        }
        for id in &ids {
            if *id != EAX_NULL_GUID && *id != EAX_PRIMARY_FX_SLOT_ID && !is_fx_slot_guid(id) {
                return Err(EaxError::validation(
                    OWNER,
                    "Active FX Slot Id",
                    format!("unsupported FX slot {id}"),
                ));
            }
        }

        let mut active = [EAX_NULL_GUID; EAX_MAX_FX_SLOTS];
        active[..ids.len()].copy_from_slice(&ids);
        self.eax_d.active_fx_slots = active;
        self.sync_dirty();
        Ok(())
    }

    // Validation

    fn validate_direct(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Direct", value, EAXSOURCE_MINDIRECT, EAXSOURCE_MAXDIRECT)
    }

    fn validate_direct_hf(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Direct HF", value, EAXSOURCE_MINDIRECTHF, EAXSOURCE_MAXDIRECTHF)
    }

    fn validate_room(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Room", value, EAXSOURCE_MINROOM, EAXSOURCE_MAXROOM)
    }

    fn validate_room_hf(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Room HF", value, EAXSOURCE_MINROOMHF, EAXSOURCE_MAXROOMHF)
    }

    fn validate_obstruction(value: i32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Obstruction",
            value,
            EAXSOURCE_MINOBSTRUCTION,
            EAXSOURCE_MAXOBSTRUCTION,
        )
    }

    fn validate_obstruction_lf_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Obstruction LF Ratio",
            value,
            EAXSOURCE_MINOBSTRUCTIONLFRATIO,
            EAXSOURCE_MAXOBSTRUCTIONLFRATIO,
        )
    }

    fn validate_occlusion(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Occlusion", value, EAXSOURCE_MINOCCLUSION, EAXSOURCE_MAXOCCLUSION)
    }

    fn validate_occlusion_lf_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Occlusion LF Ratio",
            value,
            EAXSOURCE_MINOCCLUSIONLFRATIO,
            EAXSOURCE_MAXOCCLUSIONLFRATIO,
        )
    }

    fn validate_occlusion_room_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Occlusion Room Ratio",
            value,
            EAXSOURCE_MINOCCLUSIONROOMRATIO,
            EAXSOURCE_MAXOCCLUSIONROOMRATIO,
        )
    }

    fn validate_occlusion_direct_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Occlusion Direct Ratio",
            value,
            EAXSOURCE_MINOCCLUSIONDIRECTRATIO,
            EAXSOURCE_MAXOCCLUSIONDIRECTRATIO,
        )
    }

    fn validate_exclusion(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Exclusion", value, EAXSOURCE_MINEXCLUSION, EAXSOURCE_MAXEXCLUSION)
    }

    fn validate_exclusion_lf_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Exclusion LF Ratio",
            value,
            EAXSOURCE_MINEXCLUSIONLFRATIO,
            EAXSOURCE_MAXEXCLUSIONLFRATIO,
        )
    }

    fn validate_outside_volume_hf(value: i32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Outside Volume HF",
            value,
            EAXSOURCE_MINOUTSIDEVOLUMEHF,
            EAXSOURCE_MAXOUTSIDEVOLUMEHF,
        )
    }

    fn validate_doppler_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Doppler Factor",
            value,
            EAXSOURCE_MINDOPPLERFACTOR,
            EAXSOURCE_MAXDOPPLERFACTOR,
        )
    }

    fn validate_rolloff_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Rolloff Factor",
            value,
            EAXSOURCE_MINROLLOFFFACTOR,
            EAXSOURCE_MAXROLLOFFFACTOR,
        )
    }

    fn validate_room_rolloff_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Room Rolloff Factor",
            value,
            EAXSOURCE_MINROOMROLLOFFFACTOR,
            EAXSOURCE_MAXROOMROLLOFFFACTOR,
        )
    }

    fn validate_air_absorption_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Air Absorption Factor",
            value,
            EAXSOURCE_MINAIRABSORPTIONFACTOR,
            EAXSOURCE_MAXAIRABSORPTIONFACTOR,
        )
    }

    fn validate_flags(value: u32, version: u32) -> EaxResult<()> {
        let reserved = if version >= 5 {
            EAX50SOURCEFLAGS_RESERVED
        } else {
            EAX20SOURCEFLAGS_RESERVED
        };
        validate_flags(OWNER, "Flags", value, reserved)
    }

    fn validate_macro_fx_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Macro FX Factor",
            value,
            EAXSOURCE_MINMACROFXFACTOR,
            EAXSOURCE_MAXMACROFXFACTOR,
        )
    }

    /// Speaker id to array index
    fn validate_speaker_id(speaker_id: i32) -> EaxResult<usize> {
        validate_range(OWNER, "Speaker Id", speaker_id, SPEAKER_FRONT_LEFT, SPEAKER_LOW_FREQUENCY)?;
        Ok((speaker_id - SPEAKER_FRONT_LEFT) as usize)
    }

    fn validate_speaker_level(value: i32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Speaker Level",
            value,
            EAXSOURCE_MINSPEAKERLEVEL,
            EAXSOURCE_MAXSPEAKERLEVEL,
        )
    }

    fn validate_all(all: &Eax50SourceProperties, version: u32) -> EaxResult<()> {
        Self::validate_direct(all.direct)?;
        Self::validate_direct_hf(all.direct_hf)?;
        Self::validate_room(all.room)?;
        Self::validate_room_hf(all.room_hf)?;
        Self::validate_obstruction(all.obstruction)?;
        Self::validate_obstruction_lf_ratio(all.obstruction_lf_ratio)?;
        Self::validate_occlusion(all.occlusion)?;
        Self::validate_occlusion_lf_ratio(all.occlusion_lf_ratio)?;
        Self::validate_occlusion_room_ratio(all.occlusion_room_ratio)?;
        Self::validate_occlusion_direct_ratio(all.occlusion_direct_ratio)?;
        Self::validate_exclusion(all.exclusion)?;
        Self::validate_exclusion_lf_ratio(all.exclusion_lf_ratio)?;
        Self::validate_outside_volume_hf(all.outside_volume_hf)?;
        Self::validate_doppler_factor(all.doppler_factor)?;
        Self::validate_rolloff_factor(all.rolloff_factor)?;
        Self::validate_room_rolloff_factor(all.room_rolloff_factor)?;
        Self::validate_air_absorption_factor(all.air_absorption_factor)?;
        Self::validate_flags(all.flags, version)?;
        Self::validate_macro_fx_factor(all.macro_fx_factor)
    }

    fn validate_send(send: &SendProperties) -> EaxResult<()> {
        validate_range(OWNER, "Send", send.send, EAXSOURCE_MINSEND, EAXSOURCE_MAXSEND)?;
        validate_range(OWNER, "Send HF", send.send_hf, EAXSOURCE_MINSENDHF, EAXSOURCE_MAXSENDHF)?;
        Self::validate_occlusion(send.occlusion)?;
        Self::validate_occlusion_lf_ratio(send.occlusion_lf_ratio)?;
        Self::validate_occlusion_room_ratio(send.occlusion_room_ratio)?;
        Self::validate_occlusion_direct_ratio(send.occlusion_direct_ratio)?;
        Self::validate_exclusion(send.exclusion)?;
        Self::validate_exclusion_lf_ratio(send.exclusion_lf_ratio)
    }

    fn send_index(guid: &Guid) -> EaxResult<usize> {
        FxSlotIndex::from_guid(guid).value().ok_or_else(|| {
            EaxError::validation(OWNER, "Receiving FX Slot Id", format!("unsupported FX slot {guid}"))
        })
    }
}

/// Receiving FX slot GUID reported for send `index`
fn send_fx_slot_guid(version: u32, index: usize) -> EaxResult<Guid> {
    let ids = match version {
        4 => &EAX40_FX_SLOT_IDS,
        5 => &EAX50_FX_SLOT_IDS,
        _ => return Err(EaxError::protocol(format!("Sends not available in EAX {version}.0"))),
    };
    ids.get(index)
        .copied()
        .ok_or_else(|| EaxError::Index(format!("send index {index} out of range")))
}

fn unsupported(property_id: u32) -> EaxError {
    EaxError::protocol(format!("Unsupported source property id {property_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::EAX_PROPERTY_DEFERRED;
    use crate::recording::{BackendCall, RecordingBackend};
    use approx::assert_relative_eq;
    use bytemuck::Pod;

    const SOURCE: SourceId = SourceId(42);

    struct Fixture {
        backend: RecordingBackend,
        shared: SharedState,
        slots: [SlotView; EAX_MAX_FX_SLOTS],
        filter: FilterId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut backend = RecordingBackend::new();
            let slots = std::array::from_fn(|_| SlotView {
                efx_slot: backend.create_effect_slot().unwrap(),
                occlusion: 0,
            });
            let filter = backend.create_lowpass_filter().unwrap();
            Self {
                backend,
                shared: SharedState::default(),
                slots,
                filter,
            }
        }

        fn update(&mut self, source: &mut Source, field: SharedField) {
            let mut dirty = DirtySet::new();
            dirty.insert(field);
            let env = SourceEnv {
                shared: &self.shared,
                slots: self.slots,
                filter: self.filter,
            };
            source.update(dirty, &env, &mut self.backend).unwrap();
        }

        fn source(&mut self) -> Source {
            let env = SourceEnv {
                shared: &self.shared,
                slots: self.slots,
                filter: self.filter,
            };
            Source::new(SOURCE, &env, &mut self.backend).unwrap()
        }

        fn set<T: Pod>(&mut self, source: &mut Source, guid: &Guid, id: u32, value: &T) -> EaxResult<()> {
            let mut buf = bytemuck::bytes_of(value).to_vec();
            self.set_bytes(source, guid, id, &mut buf)
        }

        fn set_bytes(&mut self, source: &mut Source, guid: &Guid, id: u32, buf: &mut [u8]) -> EaxResult<()> {
            let mut call = PropertyCall::new(false, Some(guid), id, SOURCE.0, Some(buf))?;
            let env = SourceEnv {
                shared: &self.shared,
                slots: self.slots,
                filter: self.filter,
            };
            source.dispatch(&mut call, &env, &mut self.backend)
        }

        fn get<T: Pod>(&mut self, source: &mut Source, guid: &Guid, id: u32) -> T {
            let mut buf = vec![0u8; size_of::<T>()];
            self.get_bytes(source, guid, id, &mut buf).unwrap();
            bytemuck::pod_read_unaligned(&buf)
        }

        fn get_bytes(&mut self, source: &mut Source, guid: &Guid, id: u32, buf: &mut [u8]) -> EaxResult<()> {
            let mut call = PropertyCall::new(true, Some(guid), id, SOURCE.0, Some(buf))?;
            let env = SourceEnv {
                shared: &self.shared,
                slots: self.slots,
                filter: self.filter,
            };
            source.dispatch(&mut call, &env, &mut self.backend)
        }
    }

    #[test]
    fn test_initial_wiring() {
        let mut fx = Fixture::new();
        let source = fx.source();

        // Default ids are {NULL, PRIMARY, NULL, NULL} and the primary is slot 0
        assert!(source.uses_primary_fx_slot_id());
        assert!(source.is_fx_slot_active(0));
        assert!(!source.is_fx_slot_active(1));

        let native = fx.backend.source(SOURCE).unwrap();
        let send = native.sends[0].unwrap();
        assert_eq!(send.slot, fx.slots[0].efx_slot);
        assert_relative_eq!(send.filter.gain, 1.0);
        assert!(native.sends[1..].iter().all(Option::is_none));
        assert!(native.direct_filter.is_some());
        assert_eq!(native.params[&SourceParam::DopplerFactor], 1.0);
        assert!(native.flags[&SourceFlag::AuxSendFilterGainHFAuto]);
    }

    #[test]
    fn test_deferred_then_commit() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v5 = EAXPROPERTYID_EAX50_SOURCE;

        fx.set(&mut source, &v5, EAXSOURCE_OBSTRUCTION | EAX_PROPERTY_DEFERRED, &-2000_i32)
            .unwrap();
        fx.set(&mut source, &v5, EAXSOURCE_DOPPLERFACTOR | EAX_PROPERTY_DEFERRED, &2.0_f32)
            .unwrap();
        let all: Eax50SourceProperties = fx.get(&mut source, &v5, EAXSOURCE_ALLPARAMETERS);
        assert_eq!(all.obstruction, 0);

        fx.backend.clear_calls();
        fx.set(&mut source, &v5, EAXSOURCE_ROOM, &-100_i32).unwrap();
        assert_eq!(source.properties().obstruction, -2000);
        assert_eq!(source.properties().doppler_factor, 2.0);
        assert_eq!(source.properties().room, -100);

        let native = fx.backend.source(SOURCE).unwrap();
        assert_relative_eq!(native.direct_filter.unwrap().gain_hf, 0.1, epsilon = 1e-6);
        assert_eq!(native.params[&SourceParam::DopplerFactor], 2.0);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v5 = EAXPROPERTYID_EAX50_SOURCE;

        fx.set(&mut source, &v5, EAXSOURCE_DIRECT, &-500_i32).unwrap();
        fx.backend.clear_calls();
        fx.set(&mut source, &v5, EAXSOURCE_DIRECT, &-500_i32).unwrap();
        assert_eq!(fx.backend.call_count(), 0);
    }

    #[test]
    fn test_direct_filter_without_active_slots() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v5 = EAXPROPERTYID_EAX50_SOURCE;

        fx.set(&mut source, &v5, EAXSOURCE_ACTIVEFXSLOTID, &EAX_NULL_GUID).unwrap();
        assert!(!source.has_active_fx_slots());
        assert!(fx.backend.source(SOURCE).unwrap().sends.iter().all(Option::is_none));

        fx.set(&mut source, &v5, EAXSOURCE_DIRECTHF, &-2000_i32).unwrap();
        let direct = fx.backend.source(SOURCE).unwrap().direct_filter.unwrap();
        assert_relative_eq!(direct.gain_hf, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_active_fx_slots() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v5 = EAXPROPERTYID_EAX50_SOURCE;

        let ids = [EAXPROPERTYID_EAX50_FX_SLOT2, EAXPROPERTYID_EAX40_FX_SLOT3];
        fx.set(&mut source, &v5, EAXSOURCE_ACTIVEFXSLOTID, &ids).unwrap();
        assert_eq!(
            source.active_fx_slot_ids(),
            &[ids[0], ids[1], EAX_NULL_GUID, EAX_NULL_GUID]
        );
        assert!(!source.uses_primary_fx_slot_id());
        assert!(!source.is_fx_slot_active(0));
        assert!(source.is_fx_slot_active(2) && source.is_fx_slot_active(3));

        let native = fx.backend.source(SOURCE).unwrap();
        assert!(native.sends[0].is_none());
        assert_eq!(native.sends[3].unwrap().slot, fx.slots[3].efx_slot);

        // v4 layout reports two ids
        let v4: [Guid; 2] = fx.get(&mut source, &EAXPROPERTYID_EAX40_SOURCE, EAXSOURCE_ACTIVEFXSLOTID);
        assert_eq!(v4, ids);

        let bad = [EAX_REVERB_EFFECT];
        assert!(matches!(
            fx.set(&mut source, &v5, EAXSOURCE_ACTIVEFXSLOTID, &bad),
            Err(EaxError::Validation { .. })
        ));
        let five = [EAX_NULL_GUID; 5];
        assert!(fx.set(&mut source, &v5, EAXSOURCE_ACTIVEFXSLOTID, &five).is_err());
    }

    #[test]
    fn test_primary_sentinel_follows_context() {
        let mut fx = Fixture::new();
        fx.shared.primary_fx_slot_index = FxSlotIndex::NONE;
        let mut source = fx.source();
        assert!(source.uses_primary_fx_slot_id());
        assert!(!source.has_active_fx_slots());

        fx.shared.previous_primary_fx_slot_index = FxSlotIndex::NONE;
        fx.shared.primary_fx_slot_index = FxSlotIndex::from(2);
        fx.update(&mut source, SharedField::PrimaryFxSlotId);

        assert!(source.is_fx_slot_active(2));
        let native = fx.backend.source(SOURCE).unwrap();
        assert_eq!(native.sends[2].unwrap().slot, fx.slots[2].efx_slot);
    }

    #[test]
    fn test_air_absorption_uses_context_factor() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        fx.set(&mut source, &EAXPROPERTYID_EAX50_SOURCE, EAXSOURCE_AIRABSORPTIONFACTOR, &2.0_f32)
            .unwrap();

        fx.shared.air_absorption_factor = 0.5;
        fx.update(&mut source, SharedField::AirAbsorptionHF);

        let native = fx.backend.source(SOURCE).unwrap();
        assert_relative_eq!(native.params[&SourceParam::AirAbsorptionFactor], 1.0);
    }

    #[test]
    fn test_send_family() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v4 = EAXPROPERTYID_EAX40_SOURCE;

        let record = EaxSourceSendProperties {
            receiving_fx_slot_id: EAXPROPERTYID_EAX40_FX_SLOT0,
            send: -2000,
            send_hf: 0,
        };
        fx.set(&mut source, &v4, EAXSOURCE_SENDPARAMETERS, &record).unwrap();
        assert_eq!(source.send(0).unwrap().send, -2000);

        // Slot 0 is active through the primary sentinel, so its room filter moved
        let send = fx.backend.source(SOURCE).unwrap().sends[0].unwrap();
        assert_relative_eq!(send.filter.gain, 0.1, epsilon = 1e-6);

        let got: [EaxSourceSendProperties; 2] = fx.get(&mut source, &v4, EAXSOURCE_SENDPARAMETERS);
        assert_eq!(got[0], record);
        assert_eq!(got[1].receiving_fx_slot_id, EAXPROPERTYID_EAX40_FX_SLOT1);
        assert_eq!(got[1].send, 0);

        let got: EaxSourceSendProperties = fx.get(&mut source, &EAXPROPERTYID_EAX50_SOURCE, EAXSOURCE_SENDPARAMETERS);
        assert_eq!(got.receiving_fx_slot_id, EAXPROPERTYID_EAX50_FX_SLOT0);
    }

    #[test]
    fn test_send_records_validated_up_front() {
        let mut fx = Fixture::new();
        let mut source = fx.source();

        let records = [
            EaxSourceExclusionSendProperties {
                receiving_fx_slot_id: EAXPROPERTYID_EAX50_FX_SLOT1,
                exclusion: -100,
                exclusion_lf_ratio: 0.5,
            },
            EaxSourceExclusionSendProperties {
                receiving_fx_slot_id: EAXPROPERTYID_EAX50_FX_SLOT2,
                exclusion: 10,
                exclusion_lf_ratio: 0.5,
            },
        ];
        let err = fx.set(&mut source, &EAXPROPERTYID_EAX50_SOURCE, EAXSOURCE_EXCLUSIONSENDPARAMETERS, &records);
        assert!(matches!(err, Err(EaxError::Validation { .. })));
        assert_eq!(source.send(1).unwrap().exclusion, 0);

        let unknown = EaxSourceSendProperties {
            receiving_fx_slot_id: EAX_PRIMARY_FX_SLOT_ID,
            send: 0,
            send_hf: 0,
        };
        assert!(fx.set(&mut source, &EAXPROPERTYID_EAX50_SOURCE, EAXSOURCE_SENDPARAMETERS, &unknown).is_err());
    }

    #[test]
    fn test_legacy_all_parameters() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v2 = DSPROPSETID_EAX20_BUFFER_PROPERTIES;

        // EAX 2.0 id 1 is ALLPARAMETERS
        let mut all: Eax20BufferProperties = fx.get(&mut source, &v2, 1);
        assert_eq!(all.flags, EAXSOURCE_DEFAULTFLAGS);
        all.room = -300;
        all.room_rolloff_factor = 1.5;
        fx.set(&mut source, &v2, 1, &all).unwrap();

        assert_eq!(source.properties().room, -300);
        assert_eq!(source.properties().exclusion_lf_ratio, EAXSOURCE_DEFAULTEXCLUSIONLFRATIO);
        let native = fx.backend.source(SOURCE).unwrap();
        assert_eq!(native.params[&SourceParam::RoomRolloffFactor], 1.5);

        // Upmix is a 5.0 flag
        all.flags = EAXSOURCEFLAGS_UPMIX;
        assert!(fx.set(&mut source, &v2, 1, &all).is_err());
        fx.set(&mut source, &EAXPROPERTYID_EAX50_SOURCE, EAXSOURCE_FLAGS, &EAXSOURCEFLAGS_UPMIX)
            .unwrap();
    }

    #[test]
    fn test_flags_drive_auto_switches() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        fx.backend.clear_calls();
        fx.set(&mut source, &EAXPROPERTYID_EAX40_SOURCE, EAXSOURCE_FLAGS, &EAXSOURCEFLAGS_ROOMAUTO)
            .unwrap();

        let calls = fx.backend.take_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.contains(&BackendCall::SourceFlag(SOURCE, SourceFlag::DirectFilterGainHFAuto, false)));
        assert!(calls.contains(&BackendCall::SourceFlag(SOURCE, SourceFlag::AuxSendFilterGainAuto, true)));
    }

    #[test]
    fn test_outside_volume_maps_to_cone_gain() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        fx.set(&mut source, &EAXPROPERTYID_EAX40_SOURCE, EAXSOURCE_OUTSIDEVOLUMEHF, &-2000_i32)
            .unwrap();
        let native = fx.backend.source(SOURCE).unwrap();
        assert_relative_eq!(native.params[&SourceParam::ConeOuterGainHF], 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_speaker_levels() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v5 = EAXPROPERTYID_EAX50_SOURCE;

        let level = EaxSpeakerLevelProperties {
            speaker_id: SPEAKER_LOW_FREQUENCY,
            level: -600,
        };
        fx.backend.clear_calls();
        fx.set(&mut source, &v5, EAXSOURCE_SPEAKERLEVELS, &level).unwrap();
        assert_eq!(fx.backend.call_count(), 0);
        assert_eq!(source.speaker_level(SPEAKER_LOW_FREQUENCY), Some(-600));
        assert_eq!(source.speaker_level(SPEAKER_FRONT_LEFT), Some(EAXSOURCE_DEFAULTSPEAKERLEVEL));

        let mut buf = bytemuck::bytes_of(&EaxSpeakerLevelProperties {
            speaker_id: SPEAKER_LOW_FREQUENCY,
            level: 0,
        })
        .to_vec();
        fx.get_bytes(&mut source, &v5, EAXSOURCE_SPEAKERLEVELS, &mut buf).unwrap();
        let got: EaxSpeakerLevelProperties = bytemuck::pod_read_unaligned(&buf);
        assert_eq!(got.level, -600);

        let bad = EaxSpeakerLevelProperties {
            speaker_id: 10,
            level: 0,
        };
        assert!(fx.set(&mut source, &v5, EAXSOURCE_SPEAKERLEVELS, &bad).is_err());
    }

    #[test]
    fn test_range_errors_leave_state() {
        let mut fx = Fixture::new();
        let mut source = fx.source();
        let v5 = EAXPROPERTYID_EAX50_SOURCE;

        assert!(fx.set(&mut source, &v5, EAXSOURCE_DIRECT, &1001_i32).is_err());
        assert!(fx.set(&mut source, &v5, EAXSOURCE_OCCLUSIONROOMRATIO, &10.5_f32).is_err());
        assert!(fx.set(&mut source, &v5, 31, &0_i32).is_err());
        assert_eq!(source.properties(), &Eax50SourceProperties::default());

        let mut short = [0u8; 2];
        assert!(matches!(
            fx.set_bytes(&mut source, &v5, EAXSOURCE_DIRECT, &mut short),
            Err(EaxError::BufferTooSmall { .. })
        ));
    }
}
