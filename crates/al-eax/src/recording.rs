//! In-memory backend that records every native call
//!
//! Keeps the resulting native object state so hosts without a real device
//! (tests, the CLI) can inspect what the EAX layer configured.

use crate::backend::*;
use crate::error::{EaxError, EaxResult};
use std::collections::HashMap;

/// One recorded native call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateEffectSlot(EffectSlotId),
    DeleteEffectSlot(EffectSlotId),
    CreateEffect(EffectId, EfxEffectType),
    DeleteEffect(EffectId),
    CreateFilter(FilterId),
    DeleteFilter(FilterId),
    EffectParam(EffectId, EfxParam, EfxValue),
    SlotEffect(EffectSlotId, EffectId),
    SlotGain(EffectSlotId, f32),
    SlotSendAuto(EffectSlotId, bool),
    Lowpass(FilterId, f32, f32),
    SourceDirectFilter(SourceId, FilterId),
    SourceSend(SourceId, usize, Option<(EffectSlotId, FilterId)>),
    SourceParam(SourceId, SourceParam, f32),
    SourceFlag(SourceId, SourceFlag, bool),
    MetersPerUnit(f32),
}

/// Native effect object
#[derive(Debug, Clone)]
pub struct EffectState {
    pub effect_type: EfxEffectType,
    pub params: HashMap<EfxParam, EfxValue>,
}

/// Native auxiliary slot
#[derive(Debug, Clone)]
pub struct SlotState {
    /// Effect last bound, with the parameters copied at bind time
    pub effect: Option<(EffectId, EffectState)>,
    pub gain: f32,
    pub send_auto: bool,
}

/// Low-pass parameters as copied onto a source path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowpassState {
    pub gain: f32,
    pub gain_hf: f32,
}

/// A wired source send
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendState {
    pub slot: EffectSlotId,
    pub filter: LowpassState,
}

/// Native source
#[derive(Debug, Clone, Default)]
pub struct SourceState {
    pub direct_filter: Option<LowpassState>,
    pub sends: [Option<SendState>; 4],
    pub params: HashMap<SourceParam, f32>,
    pub flags: HashMap<SourceFlag, bool>,
}

/// Recording backend
#[derive(Debug)]
pub struct RecordingBackend {
    caps: EfxCaps,
    next_id: u32,
    calls: Vec<BackendCall>,
    effects: HashMap<EffectId, EffectState>,
    slots: HashMap<EffectSlotId, SlotState>,
    filters: HashMap<FilterId, LowpassState>,
    sources: HashMap<SourceId, SourceState>,
    meters_per_unit: f32,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Backend with every capability present
    pub fn new() -> Self {
        Self::with_caps(EfxCaps::default())
    }

    pub fn with_caps(caps: EfxCaps) -> Self {
        Self {
            caps,
            next_id: 1,
            calls: Vec::new(),
            effects: HashMap::new(),
            slots: HashMap::new(),
            filters: HashMap::new(),
            sources: HashMap::new(),
            meters_per_unit: 1.0,
        }
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// All calls recorded so far
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Drain the call log, keeping native state
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn effect(&self, effect: EffectId) -> Option<&EffectState> {
        self.effects.get(&effect)
    }

    pub fn slot(&self, slot: EffectSlotId) -> Option<&SlotState> {
        self.slots.get(&slot)
    }

    /// Parameter of the effect currently bound to `slot`
    pub fn slot_param(&self, slot: EffectSlotId, param: EfxParam) -> Option<EfxValue> {
        let (_, state) = self.slots.get(&slot)?.effect.as_ref()?;
        state.params.get(&param).copied()
    }

    /// Type of the effect currently bound to `slot`
    pub fn slot_effect_type(&self, slot: EffectSlotId) -> Option<EfxEffectType> {
        self.slots.get(&slot)?.effect.as_ref().map(|(_, e)| e.effect_type)
    }

    pub fn source(&self, source: SourceId) -> Option<&SourceState> {
        self.sources.get(&source)
    }

    pub fn meters_per_unit(&self) -> f32 {
        self.meters_per_unit
    }

    /// Number of live native objects (effects, slots, filters)
    pub fn live_objects(&self) -> usize {
        self.effects.len() + self.slots.len() + self.filters.len()
    }

    fn effect_mut(&mut self, effect: EffectId) -> EaxResult<&mut EffectState> {
        self.effects
            .get_mut(&effect)
            .ok_or_else(|| EaxError::resource(format!("unknown effect {}", effect.0)))
    }

    fn slot_mut(&mut self, slot: EffectSlotId) -> EaxResult<&mut SlotState> {
        self.slots
            .get_mut(&slot)
            .ok_or_else(|| EaxError::resource(format!("unknown effect slot {}", slot.0)))
    }

    fn filter(&self, filter: FilterId) -> EaxResult<LowpassState> {
        self.filters
            .get(&filter)
            .copied()
            .ok_or_else(|| EaxError::resource(format!("unknown filter {}", filter.0)))
    }
}

impl EfxBackend for RecordingBackend {
    fn caps(&self) -> EfxCaps {
        self.caps
    }

    fn create_effect_slot(&mut self) -> EaxResult<EffectSlotId> {
        if !self.caps.efx {
            return Err(EaxError::resource("effects extension not available"));
        }
        let slot = EffectSlotId(self.next());
        self.slots.insert(
            slot,
            SlotState {
                effect: None,
                gain: 1.0,
                send_auto: true,
            },
        );
        self.calls.push(BackendCall::CreateEffectSlot(slot));
        Ok(slot)
    }

    fn delete_effect_slot(&mut self, slot: EffectSlotId) -> EaxResult<()> {
        self.slots.remove(&slot);
        self.calls.push(BackendCall::DeleteEffectSlot(slot));
        Ok(())
    }

    fn create_effect(&mut self, effect_type: EfxEffectType) -> EaxResult<EffectId> {
        if effect_type == EfxEffectType::EaxReverb && !self.caps.eax_reverb {
            return Err(EaxError::resource("EAX reverb effect not supported"));
        }
        let effect = EffectId(self.next());
        self.effects.insert(
            effect,
            EffectState {
                effect_type,
                params: HashMap::new(),
            },
        );
        self.calls.push(BackendCall::CreateEffect(effect, effect_type));
        Ok(effect)
    }

    fn delete_effect(&mut self, effect: EffectId) -> EaxResult<()> {
        self.effects.remove(&effect);
        self.calls.push(BackendCall::DeleteEffect(effect));
        Ok(())
    }

    fn create_lowpass_filter(&mut self) -> EaxResult<FilterId> {
        if !self.caps.lowpass_filter {
            return Err(EaxError::resource("low-pass filter not supported"));
        }
        let filter = FilterId(self.next());
        self.filters.insert(filter, LowpassState { gain: 1.0, gain_hf: 1.0 });
        self.calls.push(BackendCall::CreateFilter(filter));
        Ok(filter)
    }

    fn delete_filter(&mut self, filter: FilterId) -> EaxResult<()> {
        self.filters.remove(&filter);
        self.calls.push(BackendCall::DeleteFilter(filter));
        Ok(())
    }

    fn set_effect_param(&mut self, effect: EffectId, param: EfxParam, value: EfxValue) -> EaxResult<()> {
        self.effect_mut(effect)?.params.insert(param, value);
        self.calls.push(BackendCall::EffectParam(effect, param, value));
        Ok(())
    }

    fn set_slot_effect(&mut self, slot: EffectSlotId, effect: EffectId) -> EaxResult<()> {
        let state = self.effect_mut(effect)?.clone();
        self.slot_mut(slot)?.effect = Some((effect, state));
        self.calls.push(BackendCall::SlotEffect(slot, effect));
        Ok(())
    }

    fn set_slot_gain(&mut self, slot: EffectSlotId, gain: f32) -> EaxResult<()> {
        self.slot_mut(slot)?.gain = gain;
        self.calls.push(BackendCall::SlotGain(slot, gain));
        Ok(())
    }

    fn set_slot_send_auto(&mut self, slot: EffectSlotId, send_auto: bool) -> EaxResult<()> {
        self.slot_mut(slot)?.send_auto = send_auto;
        self.calls.push(BackendCall::SlotSendAuto(slot, send_auto));
        Ok(())
    }

    fn set_lowpass(&mut self, filter: FilterId, gain: f32, gain_hf: f32) -> EaxResult<()> {
        self.filter(filter)?;
        self.filters.insert(filter, LowpassState { gain, gain_hf });
        self.calls.push(BackendCall::Lowpass(filter, gain, gain_hf));
        Ok(())
    }

    fn set_source_direct_filter(&mut self, source: SourceId, filter: FilterId) -> EaxResult<()> {
        let params = self.filter(filter)?;
        self.sources.entry(source).or_default().direct_filter = Some(params);
        self.calls.push(BackendCall::SourceDirectFilter(source, filter));
        Ok(())
    }

    fn set_source_send(
        &mut self,
        source: SourceId,
        send_index: usize,
        target: Option<(EffectSlotId, FilterId)>,
    ) -> EaxResult<()> {
        if send_index >= self.caps.max_aux_sends {
            return Err(EaxError::resource(format!("send index {send_index} out of range")));
        }
        let send = match target {
            Some((slot, filter)) => Some(SendState {
                slot,
                filter: self.filter(filter)?,
            }),
            None => None,
        };
        self.sources.entry(source).or_default().sends[send_index] = send;
        self.calls.push(BackendCall::SourceSend(source, send_index, target));
        Ok(())
    }

    fn set_source_param(&mut self, source: SourceId, param: SourceParam, value: f32) -> EaxResult<()> {
        self.sources.entry(source).or_default().params.insert(param, value);
        self.calls.push(BackendCall::SourceParam(source, param, value));
        Ok(())
    }

    fn set_source_flag(&mut self, source: SourceId, flag: SourceFlag, value: bool) -> EaxResult<()> {
        self.sources.entry(source).or_default().flags.insert(flag, value);
        self.calls.push(BackendCall::SourceFlag(source, flag, value));
        Ok(())
    }

    fn set_listener_meters_per_unit(&mut self, meters_per_unit: f32) -> EaxResult<()> {
        self.meters_per_unit = meters_per_unit;
        self.calls.push(BackendCall::MetersPerUnit(meters_per_unit));
        Ok(())
    }
}
