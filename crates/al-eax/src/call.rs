//! Property call descriptor
//!
//! Decodes a raw `(guid, property_id, target, buffer)` tuple into a
//! `PropertyCall`: target domain, protocol version, deferred flag and
//! FX-slot index. The buffer stays untyped until a handler reads or writes
//! it through `get_value`/`set_value`.

use crate::context::{EAXCONTEXT_EAXSESSION, EAXCONTEXT_LASTERROR, EAXCONTEXT_SPEAKERCONFIG};
use crate::effects::reverb::*;
use crate::error::{EaxError, EaxResult};
use crate::fx_slot::{EAXFXSLOT_NONE, EAXFXSLOT_OCCLUSIONLFRATIO};
use crate::fx_slot_index::FxSlotIndex;
use crate::guids::*;
use crate::source::*;
use al_core::Guid;
use bytemuck::Pod;

/// Top bit of a property id: stage the value instead of committing it
pub const EAX_PROPERTY_DEFERRED: u32 = 0x8000_0000;

/// Domain addressed by a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySetId {
    Context,
    FxSlot,
    Source,
    FxSlotEffect,
}

/// One decoded Set/Get invocation. Lives only for the duration of a dispatch.
#[derive(Debug)]
pub struct PropertyCall<'a> {
    is_get: bool,
    is_deferred: bool,
    version: u32,
    property_set_id: PropertySetId,
    property_id: u32,
    target_name: u32,
    fx_slot_index: FxSlotIndex,
    buffer: Option<&'a mut [u8]>,
}

/// (version, domain, fx slot) for a property-set GUID
fn resolve_guid(guid: &Guid) -> Option<(u32, PropertySetId, FxSlotIndex)> {
    use PropertySetId::*;

    if let Some(i) = EAX40_FX_SLOT_IDS.iter().position(|id| id == guid) {
        return Some((4, FxSlot, FxSlotIndex::from(i)));
    }
    if let Some(i) = EAX50_FX_SLOT_IDS.iter().position(|id| id == guid) {
        return Some((5, FxSlot, FxSlotIndex::from(i)));
    }

    let entry = match *guid {
        g if g == EAXPROPERTYID_EAX40_CONTEXT => (4, Context, FxSlotIndex::NONE),
        g if g == EAXPROPERTYID_EAX50_CONTEXT => (5, Context, FxSlotIndex::NONE),
        g if g == DSPROPSETID_EAX20_LISTENER_PROPERTIES => (2, FxSlotEffect, FxSlotIndex::from(0)),
        g if g == DSPROPSETID_EAX30_LISTENER_PROPERTIES => (3, FxSlotEffect, FxSlotIndex::from(0)),
        g if g == DSPROPSETID_EAX20_BUFFER_PROPERTIES => (2, Source, FxSlotIndex::NONE),
        g if g == DSPROPSETID_EAX30_BUFFER_PROPERTIES => (3, Source, FxSlotIndex::NONE),
        g if g == EAXPROPERTYID_EAX40_SOURCE => (4, Source, FxSlotIndex::NONE),
        g if g == EAXPROPERTYID_EAX50_SOURCE => (5, Source, FxSlotIndex::NONE),
        _ => return None,
    };
    Some(entry)
}

/// EAX 2.0 listener ids, in legacy order, mapped onto reverb ids
const EAX2_LISTENER_MAP: [u32; 16] = [
    EAXREVERB_NONE,
    EAXREVERB_ALLPARAMETERS,
    EAXREVERB_ROOM,
    EAXREVERB_ROOMHF,
    EAXREVERB_ROOMROLLOFFFACTOR,
    EAXREVERB_DECAYTIME,
    EAXREVERB_DECAYHFRATIO,
    EAXREVERB_REFLECTIONS,
    EAXREVERB_REFLECTIONSDELAY,
    EAXREVERB_REVERB,
    EAXREVERB_REVERBDELAY,
    EAXREVERB_ENVIRONMENT,
    EAXREVERB_ENVIRONMENTSIZE,
    EAXREVERB_ENVIRONMENTDIFFUSION,
    EAXREVERB_AIRABSORPTIONHF,
    EAXREVERB_FLAGS,
];

/// EAX 2.0 buffer ids, in legacy order, mapped onto source ids
const EAX2_BUFFER_MAP: [u32; 15] = [
    EAXSOURCE_NONE,
    EAXSOURCE_ALLPARAMETERS,
    EAXSOURCE_DIRECT,
    EAXSOURCE_DIRECTHF,
    EAXSOURCE_ROOM,
    EAXSOURCE_ROOMHF,
    EAXSOURCE_ROOMROLLOFFFACTOR,
    EAXSOURCE_OBSTRUCTION,
    EAXSOURCE_OBSTRUCTIONLFRATIO,
    EAXSOURCE_OCCLUSION,
    EAXSOURCE_OCCLUSIONLFRATIO,
    EAXSOURCE_OCCLUSIONROOMRATIO,
    EAXSOURCE_OUTSIDEVOLUMEHF,
    EAXSOURCE_AIRABSORPTIONFACTOR,
    EAXSOURCE_FLAGS,
];

fn remap_legacy(table: &[u32], property_id: u32) -> EaxResult<u32> {
    table
        .get(property_id as usize)
        .copied()
        .ok_or_else(|| EaxError::protocol(format!("Unsupported EAX 2.0 property id {property_id}")))
}

/// Ids that always apply immediately, whatever the caller's deferred bit says
fn is_immediate_only(domain: PropertySetId, property_id: u32) -> bool {
    match domain {
        PropertySetId::Context => matches!(
            property_id,
            EAXCONTEXT_LASTERROR | EAXCONTEXT_SPEAKERCONFIG | EAXCONTEXT_EAXSESSION
        ),
        PropertySetId::FxSlot => (EAXFXSLOT_NONE..=EAXFXSLOT_OCCLUSIONLFRATIO).contains(&property_id),
        _ => false,
    }
}

impl<'a> PropertyCall<'a> {
    /// Decode a raw call
    pub fn new(
        is_get: bool,
        property_set_guid: Option<&Guid>,
        property_id: u32,
        target_name: u32,
        buffer: Option<&'a mut [u8]>,
    ) -> EaxResult<Self> {
        let guid = property_set_guid.ok_or_else(|| EaxError::protocol("Null property set ID"))?;

        let (version, mut property_set_id, fx_slot_index) =
            resolve_guid(guid).ok_or_else(|| EaxError::protocol(format!("Unsupported property set id {guid}")))?;

        let mut is_deferred = property_id & EAX_PROPERTY_DEFERRED != 0;
        let mut property_id = property_id & !EAX_PROPERTY_DEFERRED;

        if is_get && is_deferred {
            return Err(EaxError::protocol("Deferred flag on a get call"));
        }

        if is_deferred && is_immediate_only(property_set_id, property_id) {
            is_deferred = false;
        }

        if property_set_id != PropertySetId::FxSlot && property_id != 0 {
            match buffer.as_deref() {
                None => return Err(EaxError::protocol("Null property buffer")),
                Some([]) => return Err(EaxError::protocol("Empty property")),
                Some(_) => {}
            }
        }

        if property_set_id == PropertySetId::Source && target_name == 0 {
            return Err(EaxError::protocol("Null AL source"));
        }

        if property_set_id == PropertySetId::FxSlot && property_id < EAXFXSLOT_NONE {
            property_set_id = PropertySetId::FxSlotEffect;
        }

        if version == 2 {
            property_id = match property_set_id {
                PropertySetId::FxSlotEffect => remap_legacy(&EAX2_LISTENER_MAP, property_id)?,
                PropertySetId::Source => remap_legacy(&EAX2_BUFFER_MAP, property_id)?,
                _ => property_id,
            };
        }

        Ok(Self {
            is_get,
            is_deferred,
            version,
            property_set_id,
            property_id,
            target_name,
            fx_slot_index,
            buffer,
        })
    }

    #[inline]
    pub fn is_get(&self) -> bool {
        self.is_get
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.is_deferred
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn property_set_id(&self) -> PropertySetId {
        self.property_set_id
    }

    #[inline]
    pub fn property_id(&self) -> u32 {
        self.property_id
    }

    #[inline]
    pub fn target_name(&self) -> u32 {
        self.target_name
    }

    #[inline]
    pub fn fx_slot_index(&self) -> FxSlotIndex {
        self.fx_slot_index
    }

    /// Buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.buffer.as_deref().map_or(0, <[u8]>::len)
    }

    fn check_size(&self, needed: usize) -> EaxResult<()> {
        let got = self.buffer_size();
        if got < needed {
            Err(EaxError::BufferTooSmall { needed, got })
        } else {
            Ok(())
        }
    }

    /// Read the `index`-th `T` from the buffer
    pub fn get_value_at<T: Pod>(&self, index: usize) -> EaxResult<T> {
        let size = size_of::<T>();
        let start = index * size;
        self.check_size(start + size)?;
        let bytes = self.buffer.as_deref().unwrap_or_default();
        Ok(bytemuck::pod_read_unaligned(&bytes[start..start + size]))
    }

    /// Read one `T` from the start of the buffer
    pub fn get_value<T: Pod>(&self) -> EaxResult<T> {
        self.get_value_at(0)
    }

    /// Read as many whole `T` as fit, up to `max_count`. At least one must fit.
    pub fn get_values<T: Pod>(&self, max_count: usize) -> EaxResult<Vec<T>> {
        let size = size_of::<T>();
        self.check_size(size)?;
        let count = (self.buffer_size() / size).min(max_count);
        (0..count).map(|i| self.get_value_at(i)).collect()
    }

    /// Write `value` as the `index`-th `T` of the buffer
    pub fn set_value_at<T: Pod>(&mut self, index: usize, value: &T) -> EaxResult<()> {
        let size = size_of::<T>();
        let start = index * size;
        self.check_size(start + size)?;
        if let Some(bytes) = self.buffer.as_deref_mut() {
            bytes[start..start + size].copy_from_slice(bytemuck::bytes_of(value));
        }
        Ok(())
    }

    /// Write one `T` at the start of the buffer
    pub fn set_value<T: Pod>(&mut self, value: &T) -> EaxResult<()> {
        self.set_value_at(0, value)
    }
}
