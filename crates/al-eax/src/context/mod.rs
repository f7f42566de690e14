//! EAX context
//!
//! Owns the four FX slots, the shared low-pass filter and every source under
//! EAX control. Context-wide settings (primary FX slot, air absorption) are
//! pushed to each source when they are committed.

mod props;

pub use props::*;

use crate::backend::{EfxBackend, FilterId, SourceId};
use crate::call::{PropertyCall, PropertySetId};
use crate::dirty::DirtySet;
use crate::error::{EaxError, EaxResult};
use crate::fx_slot::FxSlot;
use crate::fx_slot_index::{EAX_MAX_FX_SLOTS, FxSlotIndex};
use crate::guids::{EAX_NULL_GUID, is_fx_slot_guid};
use crate::source::{SlotView, Source, SourceEnv};
use crate::validate::validate_range;
use al_core::Guid;
use std::collections::BTreeMap;

const OWNER: &str = "Context";

crate::dirty_fields! {
    enum ContextField {
        PrimaryFxSlotId,
        DistanceFactor,
        AirAbsorptionHF,
        HFReference,
        MacroFXFactor,
    }
}

crate::dirty_fields! {
    /// Committed context changes that sources must react to
    pub enum SharedField {
        PrimaryFxSlotId,
        AirAbsorptionHF,
    }
}

/// Context state every source reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedState {
    pub primary_fx_slot_index: FxSlotIndex,
    pub previous_primary_fx_slot_index: FxSlotIndex,
    /// `air_absorption_hf / -5.0`
    pub air_absorption_factor: f32,
    /// Upper clamp of filter gains
    pub max_filter_gain: f32,
}

impl Default for SharedState {
    fn default() -> Self {
        let primary = FxSlotIndex::from_guid(&EAXCONTEXT_DEFAULTPRIMARYFXSLOTID);
        Self {
            primary_fx_slot_index: primary,
            previous_primary_fx_slot_index: primary,
            air_absorption_factor: 1.0,
            max_filter_gain: 1.0,
        }
    }
}

/// One EAX context
#[derive(Debug)]
pub struct Context {
    eax: Eax50ContextProperties,
    eax_d: Eax50ContextProperties,
    dirty: DirtySet<ContextField>,

    last_error: i32,
    speaker_config: u32,
    session: EaxSessionProperties,

    shared: SharedState,
    fx_slots: Vec<FxSlot>,
    filter: FilterId,
    sources: BTreeMap<SourceId, Source>,
    default_reverb_activated: bool,
}

fn source_env<'a>(shared: &'a SharedState, fx_slots: &[FxSlot], filter: FilterId) -> SourceEnv<'a> {
    SourceEnv {
        shared,
        slots: std::array::from_fn(|i| SlotView {
            efx_slot: fx_slots[i].efx_slot(),
            occlusion: fx_slots[i].properties().occlusion,
        }),
        filter,
    }
}

impl Context {
    /// Check the backend, then create the FX slots and the shared filter
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let caps = backend.caps();
        if !caps.efx {
            return Err(EaxError::resource("EFX extension not found"));
        }
        if caps.max_aux_sends < EAX_MAX_FX_SLOTS {
            return Err(EaxError::resource(format!(
                "expected at least {EAX_MAX_FX_SLOTS} auxiliary sends, got {}",
                caps.max_aux_sends
            )));
        }
        if !caps.lowpass_filter {
            return Err(EaxError::resource("EFX low-pass filter not supported"));
        }
        if !caps.eax_reverb {
            return Err(EaxError::resource("EFX EAX reverb not supported"));
        }

        let filter = backend.create_lowpass_filter()?;
        let fx_slots = (0..EAX_MAX_FX_SLOTS)
            .map(|i| FxSlot::new(i, backend))
            .collect::<EaxResult<Vec<_>>>()?;

        let eax = Eax50ContextProperties::default();
        let shared = SharedState {
            air_absorption_factor: eax.air_absorption_hf / EAXCONTEXT_DEFAULTAIRABSORPTIONHF,
            max_filter_gain: if caps.filter_gain_ex { 4.0 } else { 1.0 },
            ..SharedState::default()
        };
        backend.set_listener_meters_per_unit(eax.distance_factor)?;

        log::info!(
            "[EAX] Context created (max filter gain {})",
            shared.max_filter_gain
        );

        Ok(Self {
            eax,
            eax_d: eax,
            dirty: DirtySet::new(),
            last_error: EAX_OK,
            speaker_config: HEADPHONES,
            session: EaxSessionProperties::default(),
            shared,
            fx_slots,
            filter,
            sources: BTreeMap::new(),
            default_reverb_activated: false,
        })
    }

    /// Committed context properties
    pub fn properties(&self) -> &Eax50ContextProperties {
        &self.eax
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    /// Stored error, without resetting it
    pub fn last_error(&self) -> i32 {
        self.last_error
    }

    /// Record a failed call
    pub fn set_last_error(&mut self) {
        self.last_error = EAXERR_INVALID_OPERATION;
    }

    pub fn speaker_config(&self) -> u32 {
        self.speaker_config
    }

    pub fn session(&self) -> &EaxSessionProperties {
        &self.session
    }

    /// Shared low-pass filter
    pub fn filter(&self) -> FilterId {
        self.filter
    }

    pub fn get_slot(&self, index: FxSlotIndex) -> EaxResult<&FxSlot> {
        let i = index.get()?;
        self.fx_slots
            .get(i)
            .ok_or_else(|| EaxError::Index(format!("FX slot index {i} out of range")))
    }

    pub fn get_slot_mut(&mut self, index: FxSlotIndex) -> EaxResult<&mut FxSlot> {
        let i = index.get()?;
        self.fx_slots
            .get_mut(i)
            .ok_or_else(|| EaxError::Index(format!("FX slot index {i} out of range")))
    }

    pub fn fx_slots(&self) -> &[FxSlot] {
        &self.fx_slots
    }

    pub fn find_source(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(&id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Put a native source under EAX control. Registering twice keeps the
    /// existing state.
    pub fn register_source(&mut self, id: SourceId, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        if id.0 == 0 || self.sources.contains_key(&id) {
            return Ok(());
        }
        let env = source_env(&self.shared, &self.fx_slots, self.filter);
        let source = Source::new(id, &env, backend)?;
        self.sources.insert(id, source);
        Ok(())
    }

    /// Forget a source. Returns false if it was never registered.
    pub fn unregister_source(&mut self, id: SourceId) -> bool {
        self.sources.remove(&id).is_some()
    }

    /// Load reverb into slot 0 on first use
    pub fn activate_default_reverb_effect(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        if self.default_reverb_activated {
            return Ok(());
        }
        if let Some(slot) = self.fx_slots.first_mut() {
            slot.activate_default_reverb_effect(backend)?;
        }
        self.default_reverb_activated = true;
        Ok(())
    }

    /// Route a parsed call to the context, an FX slot or a source. A
    /// successful immediate set commits every staged value, whatever object
    /// it was staged on.
    pub fn dispatch(&mut self, call: &mut PropertyCall<'_>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        match call.property_set_id() {
            PropertySetId::Context if call.is_get() => self.get(call)?,
            PropertySetId::Context => self.set(call)?,
            PropertySetId::FxSlot | PropertySetId::FxSlotEffect => {
                if self.get_slot_mut(call.fx_slot_index())?.dispatch(call, backend)? {
                    self.update_source_filters(backend)?;
                }
            }
            PropertySetId::Source => {
                let id = SourceId(call.target_name());
                let env = source_env(&self.shared, &self.fx_slots, self.filter);
                let source = self
                    .sources
                    .get_mut(&id)
                    .ok_or_else(|| EaxError::protocol(format!("Source {} not found", id.0)))?;
                source.dispatch(call, &env, backend)?;
            }
        }

        if !call.is_get() && !call.is_deferred() {
            self.commit(backend)?;
        }
        Ok(())
    }

    /// Apply staged values of the context, then of every slot effect, then
    /// of every source
    pub fn commit(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.apply_deferred(backend)?;
        for slot in &mut self.fx_slots {
            slot.commit(backend)?;
        }
        let env = source_env(&self.shared, &self.fx_slots, self.filter);
        for source in self.sources.values_mut() {
            source.apply_deferred(&env, backend)?;
        }
        Ok(())
    }

    /// Delete the FX slots and the shared filter
    pub fn release(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.sources.clear();
        for slot in &mut self.fx_slots {
            slot.release(backend)?;
        }
        self.fx_slots.clear();
        backend.delete_filter(self.filter)
    }

    fn update_source_filters(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let env = source_env(&self.shared, &self.fx_slots, self.filter);
        for source in self.sources.values_mut() {
            source.update_filters(&env, backend)?;
        }
        Ok(())
    }

    fn update_sources(&mut self, shared_dirty: DirtySet<SharedField>, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        let env = source_env(&self.shared, &self.fx_slots, self.filter);
        for source in self.sources.values_mut() {
            source.update(shared_dirty, &env, backend)?;
        }
        Ok(())
    }

    fn apply_deferred(&mut self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;
        let mut shared_dirty = DirtySet::new();

        if self.dirty.contains(ContextField::PrimaryFxSlotId) {
            shared_dirty.insert(SharedField::PrimaryFxSlotId);
            self.shared.previous_primary_fx_slot_index = self.shared.primary_fx_slot_index;
            self.shared.primary_fx_slot_index = FxSlotIndex::from_guid(&self.eax.primary_fx_slot_id);
            log::debug!(
                "[EAX] Primary FX slot {:?} -> {:?}",
                self.shared.previous_primary_fx_slot_index.value(),
                self.shared.primary_fx_slot_index.value()
            );
        }
        if self.dirty.contains(ContextField::DistanceFactor) {
            backend.set_listener_meters_per_unit(self.eax.distance_factor)?;
        }
        if self.dirty.contains(ContextField::AirAbsorptionHF) {
            shared_dirty.insert(SharedField::AirAbsorptionHF);
            self.shared.air_absorption_factor = self.eax.air_absorption_hf / EAXCONTEXT_DEFAULTAIRABSORPTIONHF;
        }
        // HF reference and macro FX factor are state only

        if !shared_dirty.is_empty() {
            self.update_sources(shared_dirty, backend)?;
        }
        self.dirty.clear();
        Ok(())
    }

    fn get(&mut self, call: &mut PropertyCall<'_>) -> EaxResult<()> {
        let eax = self.eax;
        match call.property_id() {
            EAXCONTEXT_NONE => Ok(()),
            EAXCONTEXT_ALLPARAMETERS => match call.version() {
                4 => call.set_value(&Eax40ContextProperties::from(&eax)),
                5 => call.set_value(&eax),
                version => Err(EaxError::protocol(format!("Unsupported EAX version {version}"))),
            },
            EAXCONTEXT_PRIMARYFXSLOTID => call.set_value(&eax.primary_fx_slot_id),
            EAXCONTEXT_DISTANCEFACTOR => call.set_value(&eax.distance_factor),
            EAXCONTEXT_AIRABSORPTIONHF => call.set_value(&eax.air_absorption_hf),
            EAXCONTEXT_HFREFERENCE => call.set_value(&eax.hf_reference),
            EAXCONTEXT_LASTERROR => {
                let last_error = std::mem::replace(&mut self.last_error, EAX_OK);
                call.set_value(&last_error)
            }
            EAXCONTEXT_SPEAKERCONFIG => call.set_value(&self.speaker_config),
            EAXCONTEXT_EAXSESSION => call.set_value(&self.session),
            EAXCONTEXT_MACROFXFACTOR => call.set_value(&eax.macro_fx_factor),
            id => Err(unsupported(id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXCONTEXT_NONE => Ok(()),
            EAXCONTEXT_ALLPARAMETERS => {
                let all = match call.version() {
                    4 => call.get_value::<Eax40ContextProperties>()?.merge_into(&self.eax_d),
                    5 => call.get_value::<Eax50ContextProperties>()?,
                    version => return Err(EaxError::protocol(format!("Unsupported EAX version {version}"))),
                };
                Self::validate_primary_fx_slot_id(&all.primary_fx_slot_id)?;
                Self::validate_distance_factor(all.distance_factor)?;
                Self::validate_air_absorption_hf(all.air_absorption_hf)?;
                Self::validate_hf_reference(all.hf_reference)?;
                Self::validate_macro_fx_factor(all.macro_fx_factor)?;
                self.defer(|d| *d = all);
                Ok(())
            }
            EAXCONTEXT_PRIMARYFXSLOTID => {
                let v: Guid = call.get_value()?;
                Self::validate_primary_fx_slot_id(&v)?;
                self.defer(|d| d.primary_fx_slot_id = v);
                Ok(())
            }
            EAXCONTEXT_DISTANCEFACTOR => {
                let v = call.get_value()?;
                Self::validate_distance_factor(v)?;
                self.defer(|d| d.distance_factor = v);
                Ok(())
            }
            EAXCONTEXT_AIRABSORPTIONHF => {
                let v = call.get_value()?;
                Self::validate_air_absorption_hf(v)?;
                self.defer(|d| d.air_absorption_hf = v);
                Ok(())
            }
            EAXCONTEXT_HFREFERENCE => {
                let v = call.get_value()?;
                Self::validate_hf_reference(v)?;
                self.defer(|d| d.hf_reference = v);
                Ok(())
            }
            EAXCONTEXT_LASTERROR => Err(EaxError::validation(OWNER, "Last Error", "read-only property")),
            EAXCONTEXT_SPEAKERCONFIG => {
                let v: u32 = call.get_value()?;
                Self::validate_speaker_config(v)?;
                self.speaker_config = v;
                Ok(())
            }
            EAXCONTEXT_EAXSESSION => {
                let v: EaxSessionProperties = call.get_value()?;
                Self::validate_session(&v)?;
                self.session = v;
                Ok(())
            }
            EAXCONTEXT_MACROFXFACTOR => {
                let v = call.get_value()?;
                Self::validate_macro_fx_factor(v)?;
                self.defer(|d| d.macro_fx_factor = v);
                Ok(())
            }
            id => Err(unsupported(id)),
        }
    }

    fn defer(&mut self, update: impl FnOnce(&mut Eax50ContextProperties)) {
        update(&mut self.eax_d);
        let (a, d) = (&self.eax, &self.eax_d);
        self.dirty
            .assign(ContextField::PrimaryFxSlotId, a.primary_fx_slot_id != d.primary_fx_slot_id);
        self.dirty
            .assign(ContextField::DistanceFactor, a.distance_factor != d.distance_factor);
        self.dirty
            .assign(ContextField::AirAbsorptionHF, a.air_absorption_hf != d.air_absorption_hf);
        self.dirty.assign(ContextField::HFReference, a.hf_reference != d.hf_reference);
        self.dirty
            .assign(ContextField::MacroFXFactor, a.macro_fx_factor != d.macro_fx_factor);
    }

    // Validation

    fn validate_primary_fx_slot_id(guid: &Guid) -> EaxResult<()> {
        if *guid == EAX_NULL_GUID || is_fx_slot_guid(guid) {
            Ok(())
        } else {
            Err(EaxError::validation(
                OWNER,
                "Primary FX Slot Id",
                format!("unsupported FX slot {guid}"),
            ))
        }
    }

    fn validate_distance_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Distance Factor",
            value,
            EAXCONTEXT_MINDISTANCEFACTOR,
            EAXCONTEXT_MAXDISTANCEFACTOR,
        )
    }

    fn validate_air_absorption_hf(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Air Absorption HF",
            value,
            EAXCONTEXT_MINAIRABSORPTIONHF,
            EAXCONTEXT_MAXAIRABSORPTIONHF,
        )
    }

    fn validate_hf_reference(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "HF Reference",
            value,
            EAXCONTEXT_MINHFREFERENCE,
            EAXCONTEXT_MAXHFREFERENCE,
        )
    }

    fn validate_macro_fx_factor(value: f32) -> EaxResult<()> {
        validate_range(
            OWNER,
            "Macro FX Factor",
            value,
            EAXCONTEXT_MINMACROFXFACTOR,
            EAXCONTEXT_MAXMACROFXFACTOR,
        )
    }

    fn validate_speaker_config(value: u32) -> EaxResult<()> {
        validate_range(OWNER, "Speaker Config", value, HEADPHONES, SPEAKERS_7)
    }

    fn validate_session(session: &EaxSessionProperties) -> EaxResult<()> {
        if !matches!(session.eax_version, EAX_40 | EAX_50) {
            return Err(EaxError::validation(
                OWNER,
                "EAX Version",
                format!("unsupported session version {}", session.eax_version),
            ));
        }
        validate_range(
            OWNER,
            "Max Active Sends",
            session.max_active_sends,
            EAXCONTEXT_MINMAXACTIVESENDS,
            EAXCONTEXT_MAXMAXACTIVESENDS,
        )
    }
}

fn unsupported(property_id: u32) -> EaxError {
    EaxError::protocol(format!("Unsupported context property id {property_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{EfxCaps, SourceParam};
    use crate::call::EAX_PROPERTY_DEFERRED;
    use crate::effects::EffectType;
    use crate::fx_slot::EAXFXSLOT_OCCLUSION;
    use crate::guids::*;
    use crate::recording::RecordingBackend;
    use crate::source::{EAXSOURCE_ALLPARAMETERS, EAXSOURCE_DIRECT};
    use approx::assert_relative_eq;
    use bytemuck::Pod;

    fn set<T: Pod>(
        context: &mut Context,
        backend: &mut RecordingBackend,
        guid: &Guid,
        id: u32,
        target: u32,
        value: &T,
    ) -> EaxResult<()> {
        let mut buf = bytemuck::bytes_of(value).to_vec();
        let mut call = PropertyCall::new(false, Some(guid), id, target, Some(&mut buf[..]))?;
        context.dispatch(&mut call, backend)
    }

    fn get<T: Pod>(context: &mut Context, backend: &mut RecordingBackend, guid: &Guid, id: u32) -> T {
        let mut buf = vec![0u8; size_of::<T>()];
        let mut call = PropertyCall::new(true, Some(guid), id, 0, Some(&mut buf[..])).unwrap();
        context.dispatch(&mut call, backend).unwrap();
        bytemuck::pod_read_unaligned(&buf)
    }

    fn setup() -> (Context, RecordingBackend) {
        let mut backend = RecordingBackend::new();
        let context = Context::new(&mut backend).unwrap();
        (context, backend)
    }

    #[test]
    fn test_capability_checks() {
        let mut backend = RecordingBackend::with_caps(EfxCaps {
            max_aux_sends: 2,
            ..Default::default()
        });
        assert!(matches!(Context::new(&mut backend), Err(EaxError::Resource(_))));

        let mut backend = RecordingBackend::with_caps(EfxCaps {
            filter_gain_ex: true,
            ..Default::default()
        });
        let context = Context::new(&mut backend).unwrap();
        assert_eq!(context.shared().max_filter_gain, 4.0);
    }

    #[test]
    fn test_defaults() {
        let (mut context, mut backend) = setup();
        let all: Eax50ContextProperties = get(&mut context, &mut backend, &EAXPROPERTYID_EAX50_CONTEXT, EAXCONTEXT_ALLPARAMETERS);
        assert_eq!(all, Eax50ContextProperties::default());
        assert_eq!(all.primary_fx_slot_id, EAXPROPERTYID_EAX40_FX_SLOT0);
        assert_eq!(context.shared().primary_fx_slot_index.value(), Some(0));
        assert_relative_eq!(context.shared().air_absorption_factor, 1.0);
        assert_eq!(context.session(), &EaxSessionProperties::default());
    }

    #[test]
    fn test_default_reverb_once() {
        let (mut context, mut backend) = setup();
        assert_eq!(context.fx_slots()[0].effect_type(), EffectType::Null);
        context.activate_default_reverb_effect(&mut backend).unwrap();
        assert_eq!(context.fx_slots()[0].effect_type(), EffectType::Reverb);

        backend.clear_calls();
        context.activate_default_reverb_effect(&mut backend).unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_last_error_resets_on_read() {
        let (mut context, mut backend) = setup();
        context.set_last_error();
        let first: i32 = get(&mut context, &mut backend, &EAXPROPERTYID_EAX40_CONTEXT, EAXCONTEXT_LASTERROR);
        let second: i32 = get(&mut context, &mut backend, &EAXPROPERTYID_EAX40_CONTEXT, EAXCONTEXT_LASTERROR);
        assert_eq!(first, EAXERR_INVALID_OPERATION);
        assert_eq!(second, EAX_OK);

        let err = set(&mut context, &mut backend, &EAXPROPERTYID_EAX40_CONTEXT, EAXCONTEXT_LASTERROR, 0, &0_i32);
        assert!(matches!(err, Err(EaxError::Validation { .. })));
    }

    #[test]
    fn test_immediate_settings() {
        let (mut context, mut backend) = setup();
        let v5 = EAXPROPERTYID_EAX50_CONTEXT;

        set(&mut context, &mut backend, &v5, EAXCONTEXT_SPEAKERCONFIG | EAX_PROPERTY_DEFERRED, 0, &SPEAKERS_5).unwrap();
        assert_eq!(context.speaker_config(), SPEAKERS_5);
        assert!(set(&mut context, &mut backend, &v5, EAXCONTEXT_SPEAKERCONFIG, 0, &6_u32).is_err());

        let session = EaxSessionProperties {
            eax_version: EAX_50,
            max_active_sends: 4,
        };
        set(&mut context, &mut backend, &v5, EAXCONTEXT_EAXSESSION, 0, &session).unwrap();
        assert_eq!(context.session(), &session);

        let bad = EaxSessionProperties {
            eax_version: 3,
            max_active_sends: 2,
        };
        assert!(set(&mut context, &mut backend, &v5, EAXCONTEXT_EAXSESSION, 0, &bad).is_err());
        let bad = EaxSessionProperties {
            eax_version: EAX_40,
            max_active_sends: 5,
        };
        assert!(set(&mut context, &mut backend, &v5, EAXCONTEXT_EAXSESSION, 0, &bad).is_err());
    }

    #[test]
    fn test_all_parameters_defer_every_field() {
        let (mut context, mut backend) = setup();
        let all = Eax40ContextProperties {
            primary_fx_slot_id: EAXPROPERTYID_EAX40_FX_SLOT1,
            distance_factor: 2.0,
            air_absorption_hf: -10.0,
            hf_reference: 6000.0,
        };
        set(&mut context, &mut backend, &EAXPROPERTYID_EAX40_CONTEXT, EAXCONTEXT_ALLPARAMETERS, 0, &all).unwrap();

        let got: Eax40ContextProperties = get(&mut context, &mut backend, &EAXPROPERTYID_EAX40_CONTEXT, EAXCONTEXT_ALLPARAMETERS);
        assert_eq!(got, all);
        assert_eq!(backend.meters_per_unit(), 2.0);
        assert_eq!(context.shared().primary_fx_slot_index.value(), Some(1));
        assert_eq!(context.shared().previous_primary_fx_slot_index.value(), Some(0));
        assert_relative_eq!(context.shared().air_absorption_factor, 2.0);

        let mut bad = all;
        bad.hf_reference = 500.0;
        assert!(set(&mut context, &mut backend, &EAXPROPERTYID_EAX40_CONTEXT, EAXCONTEXT_ALLPARAMETERS, 0, &bad).is_err());
    }

    #[test]
    fn test_deferred_context_change() {
        let (mut context, mut backend) = setup();
        let v4 = EAXPROPERTYID_EAX40_CONTEXT;

        set(&mut context, &mut backend, &v4, EAXCONTEXT_DISTANCEFACTOR | EAX_PROPERTY_DEFERRED, 0, &3.0_f32).unwrap();
        let distance: f32 = get(&mut context, &mut backend, &v4, EAXCONTEXT_DISTANCEFACTOR);
        assert_eq!(distance, 1.0);

        set(&mut context, &mut backend, &v4, EAXCONTEXT_HFREFERENCE, 0, &2000.0_f32).unwrap();
        assert_eq!(context.properties().distance_factor, 3.0);
        assert_eq!(backend.meters_per_unit(), 3.0);
    }

    #[test]
    fn test_context_set_commits_staged_source() {
        let (mut context, mut backend) = setup();
        let source = SourceId(5);
        context.register_source(source, &mut backend).unwrap();

        let id = EAXSOURCE_DIRECT | EAX_PROPERTY_DEFERRED;
        set(&mut context, &mut backend, &EAXPROPERTYID_EAX50_SOURCE, id, source.0, &-1000_i32).unwrap();
        assert_eq!(context.find_source(source).unwrap().properties().direct, 0);

        set(&mut context, &mut backend, &EAXPROPERTYID_EAX50_CONTEXT, EAXCONTEXT_HFREFERENCE, 0, &2000.0_f32).unwrap();
        assert_eq!(context.find_source(source).unwrap().properties().direct, -1000);
        let gain = backend.source(source).unwrap().direct_filter.unwrap().gain;
        assert_relative_eq!(gain, 10.0_f32.powf(-0.5), epsilon = 1e-6);
    }

    #[test]
    fn test_failed_set_commits_nothing() {
        let (mut context, mut backend) = setup();
        let v4 = EAXPROPERTYID_EAX40_CONTEXT;

        set(&mut context, &mut backend, &v4, EAXCONTEXT_DISTANCEFACTOR | EAX_PROPERTY_DEFERRED, 0, &3.0_f32).unwrap();
        assert!(set(&mut context, &mut backend, &v4, EAXCONTEXT_HFREFERENCE, 0, &500.0_f32).is_err());
        assert_eq!(context.properties().distance_factor, 1.0);

        // Reads never commit
        let _: f32 = get(&mut context, &mut backend, &v4, EAXCONTEXT_HFREFERENCE);
        assert_eq!(context.properties().distance_factor, 1.0);
    }

    #[test]
    fn test_slot_lookup() {
        let (mut context, mut backend) = setup();
        assert_eq!(context.get_slot_mut(FxSlotIndex::new(3).unwrap()).unwrap().index(), 3);
        assert!(context.get_slot_mut(FxSlotIndex::NONE).is_err());

        context.release(&mut backend).unwrap();
        let index = FxSlotIndex::new(0).unwrap();
        assert!(matches!(context.get_slot_mut(index), Err(EaxError::Index(_))));
        assert!(matches!(context.get_slot(index), Err(EaxError::Index(_))));
    }

    #[test]
    fn test_primary_change_moves_sources() {
        let (mut context, mut backend) = setup();
        let source = SourceId(5);
        context.register_source(source, &mut backend).unwrap();
        assert!(backend.source(source).unwrap().sends[0].is_some());

        set(&mut context, &mut backend, &EAXPROPERTYID_EAX50_CONTEXT, EAXCONTEXT_PRIMARYFXSLOTID, 0, &EAXPROPERTYID_EAX50_FX_SLOT2).unwrap();

        let native = backend.source(source).unwrap();
        assert!(native.sends[0].is_none());
        assert!(native.sends[2].is_some());
        assert!(context.find_source(source).unwrap().is_fx_slot_active(2));

        set(&mut context, &mut backend, &EAXPROPERTYID_EAX50_CONTEXT, EAXCONTEXT_PRIMARYFXSLOTID, 0, &EAX_NULL_GUID).unwrap();
        assert!(!context.find_source(source).unwrap().has_active_fx_slots());

        let bad = EAX_REVERB_EFFECT;
        assert!(set(&mut context, &mut backend, &EAXPROPERTYID_EAX50_CONTEXT, EAXCONTEXT_PRIMARYFXSLOTID, 0, &bad).is_err());
    }

    #[test]
    fn test_air_absorption_reaches_sources() {
        let (mut context, mut backend) = setup();
        let source = SourceId(9);
        context.register_source(source, &mut backend).unwrap();

        set(&mut context, &mut backend, &EAXPROPERTYID_EAX40_CONTEXT, EAXCONTEXT_AIRABSORPTIONHF, 0, &-2.5_f32).unwrap();
        let factor = backend.source(source).unwrap().params[&SourceParam::AirAbsorptionFactor];
        assert_relative_eq!(factor, 0.5);
    }

    #[test]
    fn test_slot_occlusion_updates_sources() {
        let (mut context, mut backend) = setup();
        let source = SourceId(3);
        context.register_source(source, &mut backend).unwrap();

        set(&mut context, &mut backend, &EAXPROPERTYID_EAX50_FX_SLOT0, EAXFXSLOT_OCCLUSION, 0, &-2000_i32).unwrap();
        // Slot occlusion scales with the source's room ratio (default 1.5)
        let send = backend.source(source).unwrap().sends[0].unwrap();
        assert_relative_eq!(send.filter.gain_hf, 10.0_f32.powf(-1.5), epsilon = 1e-6);
    }

    #[test]
    fn test_source_routing() {
        let (mut context, mut backend) = setup();
        let mut buf = [0u8; 76];
        let mut call = PropertyCall::new(
            true,
            Some(&EAXPROPERTYID_EAX50_SOURCE),
            EAXSOURCE_ALLPARAMETERS,
            77,
            Some(&mut buf[..]),
        )
        .unwrap();
        assert!(matches!(context.dispatch(&mut call, &mut backend), Err(EaxError::Protocol(_))));

        context.register_source(SourceId(77), &mut backend).unwrap();
        assert!(context.dispatch(&mut call, &mut backend).is_ok());
        assert_eq!(context.source_count(), 1);
        assert!(context.unregister_source(SourceId(77)));
        assert!(!context.unregister_source(SourceId(77)));
    }

    #[test]
    fn test_release() {
        let (mut context, mut backend) = setup();
        context.activate_default_reverb_effect(&mut backend).unwrap();
        context.release(&mut backend).unwrap();
        assert_eq!(backend.live_objects(), 0);
    }
}
