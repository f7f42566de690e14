//! AGC compressor effect

use super::{set_efx_int, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "Compressor";

pub const EAXAGCCOMPRESSOR_NONE: u32 = 0;
pub const EAXAGCCOMPRESSOR_ALLPARAMETERS: u32 = 1;
pub const EAXAGCCOMPRESSOR_ONOFF: u32 = 2;

pub const EAXAGCCOMPRESSOR_MINONOFF: u32 = 0;
pub const EAXAGCCOMPRESSOR_MAXONOFF: u32 = 1;
pub const EAXAGCCOMPRESSOR_DEFAULTONOFF: u32 = 1;

const AL_COMPRESSOR_MIN_ONOFF: i32 = 0;
const AL_COMPRESSOR_MAX_ONOFF: i32 = 1;

/// EAX compressor properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CompressorProperties {
    /// Nonzero enables the compressor
    pub on_off: u32,
}

impl Default for CompressorProperties {
    fn default() -> Self {
        Self {
            on_off: EAXAGCCOMPRESSOR_DEFAULTONOFF,
        }
    }
}

crate::dirty_fields! {
    enum CompressorField {
        OnOff,
    }
}

#[derive(Debug)]
pub struct CompressorEffect {
    effect: EffectId,
    eax: CompressorProperties,
    eax_d: CompressorProperties,
    dirty: DirtySet<CompressorField>,
}

impl CompressorEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Compressor)?;
        let this = Self {
            effect,
            eax: CompressorProperties::default(),
            eax_d: CompressorProperties::default(),
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
    pub fn properties(&self) -> &CompressorProperties {
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
            EAXAGCCOMPRESSOR_NONE => Ok(()),
            EAXAGCCOMPRESSOR_ALLPARAMETERS => call.set_value(&self.eax),
            EAXAGCCOMPRESSOR_ONOFF => call.set_value(&self.eax.on_off),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXAGCCOMPRESSOR_NONE => Ok(()),
            EAXAGCCOMPRESSOR_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXAGCCOMPRESSOR_ONOFF => self.defer_on_off(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_on_off(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "OnOff", value, EAXAGCCOMPRESSOR_MINONOFF, EAXAGCCOMPRESSOR_MAXONOFF)
    }

    fn validate_all(props: &CompressorProperties) -> EaxResult<()> {
        Self::validate_on_off(props.on_off)?;
        Ok(())
    }

    fn defer_on_off(&mut self, value: u32) -> EaxResult<()> {
        Self::validate_on_off(value)?;
        self.eax_d.on_off = value;
        self.dirty.assign(CompressorField::OnOff, self.eax.on_off != self.eax_d.on_off);
        Ok(())
    }

    fn defer_all(&mut self, props: &CompressorProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_on_off(props.on_off)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(CompressorField::OnOff) {
            self.set_efx_on_off(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_on_off(backend)?;
        Ok(())
    }

    fn set_efx_on_off(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_int(
            backend,
            self.effect,
            EfxParam::CompressorOnOff,
            self.eax.on_off as i32,
            AL_COMPRESSOR_MIN_ONOFF,
            AL_COMPRESSOR_MAX_ONOFF,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EfxValue;
    use crate::recording::RecordingBackend;
    use crate::testing::{effect_get, effect_set};

    fn setup() -> (RecordingBackend, EffectSlotId, CompressorEffect) {
        let mut backend = RecordingBackend::new();
        let slot = backend.create_effect_slot().unwrap();
        let effect = CompressorEffect::new(&mut backend).unwrap();
        (backend, slot, effect)
    }

    fn get_all(effect: &mut CompressorEffect, backend: &mut RecordingBackend, slot: EffectSlotId) -> CompressorProperties {
        let mut buf = [0u8; size_of::<CompressorProperties>()];
        effect.dispatch(&mut effect_get(EAXAGCCOMPRESSOR_ALLPARAMETERS, &mut buf), backend, slot).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    #[test]
    fn test_defaults() {
        let (mut backend, slot, mut effect) = setup();
        assert_eq!(get_all(&mut effect, &mut backend, slot), CompressorProperties::default());
    }

    #[test]
    fn test_set_on_off_commits_to_native() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0_u32).to_vec();
        effect.dispatch(&mut effect_set(EAXAGCCOMPRESSOR_ONOFF, &mut buf, false), &mut backend, slot).unwrap();

        assert_eq!(effect.properties().on_off, 0_u32);
        assert_eq!(backend.slot_param(slot, EfxParam::CompressorOnOff), Some(EfxValue::Int(0)));
    }

    #[test]
    fn test_deferred_until_apply() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&0_u32).to_vec();
        effect.dispatch(&mut effect_set(EAXAGCCOMPRESSOR_ONOFF, &mut buf, true), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).on_off, EAXAGCCOMPRESSOR_DEFAULTONOFF);

        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot).on_off, 0_u32);

        backend.clear_calls();
        effect.apply_deferred(&mut backend, slot).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let (mut backend, slot, mut effect) = setup();
        let mut buf = bytemuck::bytes_of(&2_u32).to_vec();
        let result = effect.dispatch(&mut effect_set(EAXAGCCOMPRESSOR_ONOFF, &mut buf, false), &mut backend, slot);
        assert!(result.is_err());
        assert_eq!(effect.properties().on_off, EAXAGCCOMPRESSOR_DEFAULTONOFF);
    }

    #[test]
    fn test_all_parameters_round_trip() {
        let (mut backend, slot, mut effect) = setup();
        let props = CompressorProperties {
            on_off: 0_u32,
            ..Default::default()
        };
        let mut buf = bytemuck::bytes_of(&props).to_vec();
        effect.dispatch(&mut effect_set(EAXAGCCOMPRESSOR_ALLPARAMETERS, &mut buf, false), &mut backend, slot).unwrap();
        assert_eq!(get_all(&mut effect, &mut backend, slot), props);
    }
}
