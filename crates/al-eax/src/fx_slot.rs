//! FX slot
//!
//! Owns one native auxiliary effect slot and the effect handlers that have
//! been loaded into it. Handlers are created on first use and kept, so
//! switching back to an effect restores its last state.
//!
//! Slot properties (volume, lock, flags, occlusion) always apply
//! immediately; effect properties follow the deferred model of the handler.

use crate::backend::{EffectSlotId, EfxBackend};
use crate::call::{PropertyCall, PropertySetId};
use crate::effects::{EffectHandler, EffectType};
use crate::error::{EaxError, EaxResult};
use crate::guids::*;
use crate::validate::{validate_flags, validate_range};
use al_core::{Guid, level_mb_to_gain};
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "FX Slot";

pub const EAXFXSLOT_NONE: u32 = 0x1_0000;
pub const EAXFXSLOT_ALLPARAMETERS: u32 = 0x1_0001;
pub const EAXFXSLOT_LOADEFFECT: u32 = 0x1_0002;
pub const EAXFXSLOT_VOLUME: u32 = 0x1_0003;
pub const EAXFXSLOT_LOCK: u32 = 0x1_0004;
pub const EAXFXSLOT_FLAGS: u32 = 0x1_0005;
pub const EAXFXSLOT_OCCLUSION: u32 = 0x1_0006;
pub const EAXFXSLOT_OCCLUSIONLFRATIO: u32 = 0x1_0007;

pub const EAXFXSLOT_MINVOLUME: i32 = -10_000;
pub const EAXFXSLOT_MAXVOLUME: i32 = 0;
pub const EAXFXSLOT_DEFAULTVOLUME: i32 = 0;

pub const EAXFXSLOT_UNLOCKED: i32 = 0;
pub const EAXFXSLOT_LOCKED: i32 = 1;
pub const EAXFXSLOT_MINLOCK: i32 = EAXFXSLOT_UNLOCKED;
pub const EAXFXSLOT_MAXLOCK: i32 = EAXFXSLOT_LOCKED;
pub const EAXFXSLOT_DEFAULTLOCK: i32 = EAXFXSLOT_UNLOCKED;

pub const EAXFXSLOT_MINOCCLUSION: i32 = -10_000;
pub const EAXFXSLOT_MAXOCCLUSION: i32 = 0;
pub const EAXFXSLOT_DEFAULTOCCLUSION: i32 = 0;

pub const EAXFXSLOT_MINOCCLUSIONLFRATIO: f32 = 0.0;
pub const EAXFXSLOT_MAXOCCLUSIONLFRATIO: f32 = 1.0;
pub const EAXFXSLOT_DEFAULTOCCLUSIONLFRATIO: f32 = 0.25;

pub const EAXFXSLOTFLAGS_ENVIRONMENT: u32 = 0x1;
pub const EAXFXSLOTFLAGS_UPMIX: u32 = 0x2;

const EAX40FXSLOTFLAGS_RESERVED: u32 = !EAXFXSLOTFLAGS_ENVIRONMENT;
const EAX50FXSLOTFLAGS_RESERVED: u32 = !(EAXFXSLOTFLAGS_ENVIRONMENT | EAXFXSLOTFLAGS_UPMIX);

pub const EAXFXSLOT_DEFAULTFLAGS: u32 = EAXFXSLOTFLAGS_ENVIRONMENT | EAXFXSLOTFLAGS_UPMIX;

/// EAX 4.0 slot properties
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax40FxSlotProperties {
    pub load_effect: Guid,
    pub volume: i32,
    pub lock: i32,
    pub flags: u32,
}

/// EAX 5.0 slot properties
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Eax50FxSlotProperties {
    pub load_effect: Guid,
    pub volume: i32,
    pub lock: i32,
    pub flags: u32,
    pub occlusion: i32,
    pub occlusion_lf_ratio: f32,
}

impl Default for Eax50FxSlotProperties {
    fn default() -> Self {
        Self {
            load_effect: EAX_NULL_GUID,
            volume: EAXFXSLOT_DEFAULTVOLUME,
            lock: EAXFXSLOT_DEFAULTLOCK,
            flags: EAXFXSLOT_DEFAULTFLAGS,
            occlusion: EAXFXSLOT_DEFAULTOCCLUSION,
            occlusion_lf_ratio: EAXFXSLOT_DEFAULTOCCLUSIONLFRATIO,
        }
    }
}

impl From<&Eax50FxSlotProperties> for Eax40FxSlotProperties {
    fn from(p: &Eax50FxSlotProperties) -> Self {
        Self {
            load_effect: p.load_effect,
            volume: p.volume,
            lock: p.lock,
            flags: p.flags,
        }
    }
}

/// One of the four FX slots of a context
#[derive(Debug)]
pub struct FxSlot {
    index: usize,
    efx_slot: EffectSlotId,
    eax: Eax50FxSlotProperties,
    handlers: [Option<EffectHandler>; EffectType::COUNT],
    active: EffectType,
}

impl FxSlot {
    /// Create the native slot and load the slot's initial effect.
    ///
    /// Slot 0 records reverb but keeps the null effect until
    /// `activate_default_reverb_effect`; slot 1 starts with chorus.
    pub fn new(index: usize, backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let efx_slot = backend.create_effect_slot()?;
        let mut slot = Self {
            index,
            efx_slot,
            eax: Eax50FxSlotProperties::default(),
            handlers: Default::default(),
            active: EffectType::Null,
        };

        slot.set_effect_type(EffectType::Null, backend)?;
        match index {
            0 => slot.eax.load_effect = EAX_REVERB_EFFECT,
            1 => slot.set_effect_type(EffectType::Chorus, backend)?,
            _ => {}
        }

        backend.set_slot_gain(efx_slot, level_mb_to_gain(slot.eax.volume as f32))?;
        backend.set_slot_send_auto(efx_slot, slot.eax.flags & EAXFXSLOTFLAGS_ENVIRONMENT != 0)?;
        Ok(slot)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Native auxiliary slot
    #[inline]
    pub fn efx_slot(&self) -> EffectSlotId {
        self.efx_slot
    }

    pub fn properties(&self) -> &Eax50FxSlotProperties {
        &self.eax
    }

    /// Effect currently bound to the native slot
    pub fn effect_type(&self) -> EffectType {
        self.active
    }

    pub fn handler(&self) -> Option<&EffectHandler> {
        self.handlers[self.active.index()].as_ref()
    }

    /// Switch slot 0 to the reverb effect. Does nothing on other slots or
    /// once reverb is active.
    pub fn activate_default_reverb_effect(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        if self.index != 0 || self.active == EffectType::Reverb {
            return Ok(());
        }
        self.eax.load_effect = EAX_REVERB_EFFECT;
        self.set_effect_type(EffectType::Reverb, backend)
    }

    /// Dispatch a slot or effect call. Returns true when the slot occlusion
    /// changed, which invalidates source filters.
    pub fn dispatch(&mut self, call: &mut PropertyCall<'_>, backend: &mut dyn EfxBackend) -> EaxResult<bool> {
        match call.property_set_id() {
            PropertySetId::FxSlot if call.is_get() => {
                self.get(call)?;
                Ok(false)
            }
            PropertySetId::FxSlot => self.set(call, backend),
            PropertySetId::FxSlotEffect => {
                let efx_slot = self.efx_slot;
                self.active_handler_mut()?.dispatch(call, backend, efx_slot)?;
                Ok(false)
            }
            other => Err(EaxError::internal(format!("FX slot got a {other:?} call"))),
        }
    }

    /// Apply the active effect's staged values
    pub fn commit(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let efx_slot = self.efx_slot;
        self.active_handler_mut()?.apply_deferred(backend, efx_slot)
    }

    /// Delete every native object owned by the slot
    pub fn release(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        for handler in self.handlers.iter_mut().filter_map(Option::take) {
            handler.release(backend)?;
        }
        backend.delete_effect_slot(self.efx_slot)
    }

    fn active_handler_mut(&mut self) -> EaxResult<&mut EffectHandler> {
        self.handlers[self.active.index()]
            .as_mut()
            .ok_or_else(|| EaxError::internal(format!("FX slot {} has no effect handler", self.index)))
    }

    fn get(&self, call: &mut PropertyCall<'_>) -> EaxResult<()> {
        let eax = &self.eax;
        let is_v5 = call.version() >= 5;
        match call.property_id() {
            EAXFXSLOT_NONE => Ok(()),
            EAXFXSLOT_ALLPARAMETERS if is_v5 => call.set_value(eax),
            EAXFXSLOT_ALLPARAMETERS => call.set_value(&Eax40FxSlotProperties::from(eax)),
            EAXFXSLOT_LOADEFFECT => call.set_value(&eax.load_effect),
            EAXFXSLOT_VOLUME => call.set_value(&eax.volume),
            EAXFXSLOT_LOCK => call.set_value(&eax.lock),
            EAXFXSLOT_FLAGS => call.set_value(&eax.flags),
            EAXFXSLOT_OCCLUSION if is_v5 => call.set_value(&eax.occlusion),
            EAXFXSLOT_OCCLUSIONLFRATIO if is_v5 => call.set_value(&eax.occlusion_lf_ratio),
            id => Err(unsupported(id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>, backend: &mut dyn EfxBackend) -> EaxResult<bool> {
        let version = call.version();
        let is_v5 = version >= 5;
        match call.property_id() {
            EAXFXSLOT_NONE => Ok(false),
            EAXFXSLOT_ALLPARAMETERS if is_v5 => {
                let all: Eax50FxSlotProperties = call.get_value()?;
                self.set_all(&all, version, backend)
            }
            EAXFXSLOT_ALLPARAMETERS => {
                let v4: Eax40FxSlotProperties = call.get_value()?;
                let all = Eax50FxSlotProperties {
                    load_effect: v4.load_effect,
                    volume: v4.volume,
                    lock: v4.lock,
                    flags: v4.flags,
                    ..self.eax
                };
                self.set_all(&all, version, backend).map(|_| false)
            }
            EAXFXSLOT_LOADEFFECT => self.set_load_effect(&call.get_value()?, backend).map(|_| false),
            EAXFXSLOT_VOLUME => self.set_volume(call.get_value()?, backend).map(|_| false),
            EAXFXSLOT_LOCK => self.set_lock(call.get_value()?).map(|_| false),
            EAXFXSLOT_FLAGS => self.set_flags(call.get_value()?, version, backend).map(|_| false),
            EAXFXSLOT_OCCLUSION if is_v5 => self.set_occlusion(call.get_value()?),
            EAXFXSLOT_OCCLUSIONLFRATIO if is_v5 => self.set_occlusion_lf_ratio(call.get_value()?),
            id => Err(unsupported(id)),
        }
    }

    // Validation

    fn validate_load_effect(guid: &Guid) -> EaxResult<EffectType> {
        EffectType::from_guid(guid)
            .ok_or_else(|| EaxError::validation(OWNER, "Load Effect", format!("unsupported effect {guid}")))
    }

    fn validate_volume(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Volume", value, EAXFXSLOT_MINVOLUME, EAXFXSLOT_MAXVOLUME)
    }

    fn validate_lock(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Lock", value, EAXFXSLOT_MINLOCK, EAXFXSLOT_MAXLOCK)
    }

    fn validate_flags(value: u32, version: u32) -> EaxResult<()> {
        let reserved = if version >= 5 {
            EAX50FXSLOTFLAGS_RESERVED
        } else {
            EAX40FXSLOTFLAGS_RESERVED
        };
        validate_flags(OWNER, "Flags", value, reserved)
    }

    fn validate_occlusion(value: i32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Occlusion",
            value,
            EAXFXSLOT_MINOCCLUSION,
            EAXFXSLOT_MAXOCCLUSION,
        )
    }

    fn validate_occlusion_lf_ratio(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Occlusion LF Ratio",
            value,
            EAXFXSLOT_MINOCCLUSIONLFRATIO,
            EAXFXSLOT_MAXOCCLUSIONLFRATIO,
        )
    }

    // Setters

    fn set_all(&mut self, all: &Eax50FxSlotProperties, version: u32, backend: &mut dyn EfxBackend) -> EaxResult<bool> {
        Self::validate_load_effect(&all.load_effect)?;
        Self::validate_volume(all.volume)?;
        Self::validate_lock(all.lock)?;
        Self::validate_flags(all.flags, version)?;
        Self::validate_occlusion(all.occlusion)?;
        Self::validate_occlusion_lf_ratio(all.occlusion_lf_ratio)?;

        self.set_load_effect(&all.load_effect, backend)?;
        self.set_volume(all.volume, backend)?;
        self.set_lock(all.lock)?;
        self.set_flags(all.flags, version, backend)?;
        let occlusion_changed = self.set_occlusion(all.occlusion)?;
        let lf_ratio_changed = self.set_occlusion_lf_ratio(all.occlusion_lf_ratio)?;
        Ok(occlusion_changed || lf_ratio_changed)
    }

    fn set_load_effect(&mut self, guid: &Guid, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let effect_type = Self::validate_load_effect(guid)?;
        if self.eax.load_effect == *guid {
            return Ok(());
        }
        if self.eax.lock == EAXFXSLOT_LOCKED {
            return Err(EaxError::validation(OWNER, "Load Effect", "slot is locked"));
        }
        self.eax.load_effect = *guid;
        self.set_effect_type(effect_type, backend)
    }

    fn set_volume(&mut self, value: i32, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        Self::validate_volume(value)?;
        if self.eax.volume == value {
            return Ok(());
        }
        self.eax.volume = value;
        backend.set_slot_gain(self.efx_slot, level_mb_to_gain(value as f32))
    }

    fn set_lock(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_lock(value)?;
        self.eax.lock = value;
        Ok(())
    }

    fn set_flags(&mut self, value: u32, version: u32, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        Self::validate_flags(value, version)?;
        if self.eax.flags == value {
            return Ok(());
        }
        self.eax.flags = value;
        backend.set_slot_send_auto(self.efx_slot, value & EAXFXSLOTFLAGS_ENVIRONMENT != 0)
    }

    fn set_occlusion(&mut self, value: i32) -> EaxResult<bool> {
        Self::validate_occlusion(value)?;
        if self.eax.occlusion == value {
            return Ok(false);
        }
        self.eax.occlusion = value;
        Ok(true)
    }

    fn set_occlusion_lf_ratio(&mut self, value: f32) -> EaxResult<bool> {
        Self::validate_occlusion_lf_ratio(value)?;
        if self.eax.occlusion_lf_ratio == value {
            return Ok(false);
        }
        self.eax.occlusion_lf_ratio = value;
        Ok(true)
    }

    /// Make `effect_type` active, creating its handler on first use, and bind
    /// it to the native slot
    fn set_effect_type(&mut self, effect_type: EffectType, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let entry = &mut self.handlers[effect_type.index()];
        if entry.is_none() {
            *entry = Some(EffectHandler::new(effect_type, backend)?);
        }
        if let Some(handler) = entry {
            handler.load(backend, self.efx_slot)?;
        }
        self.active = effect_type;
        log::debug!("[EAX] FX slot {} loaded {}", self.index, effect_type.name());
        Ok(())
    }
}

fn unsupported(property_id: u32) -> EaxError {
    EaxError::protocol(format!("Unsupported FX slot property id {property_id:#x}"))
}
