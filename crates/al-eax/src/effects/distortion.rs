//! Distortion effect
//!
//! The EAX gain is in millibels; the native gain is linear.

use super::{set_efx_float, unsupported_property};
use crate::backend::{EffectId, EffectSlotId, EfxBackend, EfxEffectType, EfxParam};
use crate::call::PropertyCall;
use crate::dirty::DirtySet;
use crate::error::EaxResult;
use crate::validate::validate_range;
use al_core::level_mb_to_gain;
use bytemuck::{Pod, Zeroable};

const OWNER: &str = "Distortion";

pub const EAXDISTORTION_NONE: u32 = 0;
pub const EAXDISTORTION_ALLPARAMETERS: u32 = 1;
pub const EAXDISTORTION_EDGE: u32 = 2;
pub const EAXDISTORTION_GAIN: u32 = 3;
pub const EAXDISTORTION_LOWPASSCUTOFF: u32 = 4;
pub const EAXDISTORTION_EQCENTER: u32 = 5;
pub const EAXDISTORTION_EQBANDWIDTH: u32 = 6;

pub const EAXDISTORTION_MINEDGE: f32 = 0.0;
pub const EAXDISTORTION_MAXEDGE: f32 = 1.0;
pub const EAXDISTORTION_DEFAULTEDGE: f32 = 0.2;

pub const EAXDISTORTION_MINGAIN: i32 = -6000;
pub const EAXDISTORTION_MAXGAIN: i32 = 0;
pub const EAXDISTORTION_DEFAULTGAIN: i32 = -2600;

pub const EAXDISTORTION_MINLOWPASSCUTOFF: f32 = 80.0;
pub const EAXDISTORTION_MAXLOWPASSCUTOFF: f32 = 24000.0;
pub const EAXDISTORTION_DEFAULTLOWPASSCUTOFF: f32 = 8000.0;

pub const EAXDISTORTION_MINEQCENTER: f32 = 80.0;
pub const EAXDISTORTION_MAXEQCENTER: f32 = 24000.0;
pub const EAXDISTORTION_DEFAULTEQCENTER: f32 = 3600.0;

pub const EAXDISTORTION_MINEQBANDWIDTH: f32 = 80.0;
pub const EAXDISTORTION_MAXEQBANDWIDTH: f32 = 24000.0;
pub const EAXDISTORTION_DEFAULTEQBANDWIDTH: f32 = 3600.0;

const AL_DISTORTION_MIN_EDGE: f32 = 0.0;
const AL_DISTORTION_MAX_EDGE: f32 = 1.0;
const AL_DISTORTION_MIN_GAIN: f32 = 0.01;
const AL_DISTORTION_MAX_GAIN: f32 = 1.0;
const AL_DISTORTION_MIN_LOWPASSCUTOFF: f32 = 80.0;
const AL_DISTORTION_MAX_LOWPASSCUTOFF: f32 = 24000.0;
const AL_DISTORTION_MIN_EQCENTER: f32 = 80.0;
const AL_DISTORTION_MAX_EQCENTER: f32 = 24000.0;
const AL_DISTORTION_MIN_EQBANDWIDTH: f32 = 80.0;
const AL_DISTORTION_MAX_EQBANDWIDTH: f32 = 24000.0;

/// EAX distortion properties as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DistortionProperties {
    /// Shape of the distortion curve
    pub edge: f32,
    /// Output level, millibels
    pub gain: i32,
    /// Pre-distortion low-pass cutoff, Hz
    pub low_pass_cutoff: f32,
    /// Post-distortion band center, Hz
    pub eq_center: f32,
    /// Post-distortion bandwidth, Hz
    pub eq_bandwidth: f32,
}

impl Default for DistortionProperties {
    fn default() -> Self {
        Self {
            edge: EAXDISTORTION_DEFAULTEDGE,
            gain: EAXDISTORTION_DEFAULTGAIN,
            low_pass_cutoff: EAXDISTORTION_DEFAULTLOWPASSCUTOFF,
            eq_center: EAXDISTORTION_DEFAULTEQCENTER,
            eq_bandwidth: EAXDISTORTION_DEFAULTEQBANDWIDTH,
        }
    }
}

crate::dirty_fields! {
    enum DistortionField {
        Edge,
        Gain,
        LowPassCutoff,
        EqCenter,
        EqBandwidth,
    }
}

#[derive(Debug)]
pub struct DistortionEffect {
    effect: EffectId,
    eax: DistortionProperties,
    eax_d: DistortionProperties,
    dirty: DirtySet<DistortionField>,
}

impl DistortionEffect {
    pub fn new(backend: &mut dyn EfxBackend) -> EaxResult<Self> {
        let effect = backend.create_effect(EfxEffectType::Distortion)?;
        let this = Self {
            effect,
            eax: DistortionProperties::default(),
            eax_d: DistortionProperties::default(),
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
    pub fn properties(&self) -> &DistortionProperties {
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
            EAXDISTORTION_NONE => Ok(()),
            EAXDISTORTION_ALLPARAMETERS => call.set_value(&self.eax),
            EAXDISTORTION_EDGE => call.set_value(&self.eax.edge),
            EAXDISTORTION_GAIN => call.set_value(&self.eax.gain),
            EAXDISTORTION_LOWPASSCUTOFF => call.set_value(&self.eax.low_pass_cutoff),
            EAXDISTORTION_EQCENTER => call.set_value(&self.eax.eq_center),
            EAXDISTORTION_EQBANDWIDTH => call.set_value(&self.eax.eq_bandwidth),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn set(&mut self, call: &PropertyCall<'_>) -> EaxResult<()> {
        match call.property_id() {
            EAXDISTORTION_NONE => Ok(()),
            EAXDISTORTION_ALLPARAMETERS => self.defer_all(&call.get_value()?),
            EAXDISTORTION_EDGE => self.defer_edge(call.get_value()?),
            EAXDISTORTION_GAIN => self.defer_gain(call.get_value()?),
            EAXDISTORTION_LOWPASSCUTOFF => self.defer_low_pass_cutoff(call.get_value()?),
            EAXDISTORTION_EQCENTER => self.defer_eq_center(call.get_value()?),
            EAXDISTORTION_EQBANDWIDTH => self.defer_eq_bandwidth(call.get_value()?),
            id => Err(unsupported_property(OWNER, id)),
        }
    }

    fn validate_edge(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "Edge", value, EAXDISTORTION_MINEDGE, EAXDISTORTION_MAXEDGE)
    }

    fn validate_gain(value: i32) -> EaxResult<()> {
        validate_range(OWNER, "Gain", value, EAXDISTORTION_MINGAIN, EAXDISTORTION_MAXGAIN)
    }

    fn validate_low_pass_cutoff(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "LowPassCutoff", value, EAXDISTORTION_MINLOWPASSCUTOFF, EAXDISTORTION_MAXLOWPASSCUTOFF)
    }

    fn validate_eq_center(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "EqCenter", value, EAXDISTORTION_MINEQCENTER, EAXDISTORTION_MAXEQCENTER)
    }

    fn validate_eq_bandwidth(value: f32) -> EaxResult<()> {
        validate_range(OWNER, "EqBandwidth", value, EAXDISTORTION_MINEQBANDWIDTH, EAXDISTORTION_MAXEQBANDWIDTH)
    }

    fn validate_all(props: &DistortionProperties) -> EaxResult<()> {
        Self::validate_edge(props.edge)?;
        Self::validate_gain(props.gain)?;
        Self::validate_low_pass_cutoff(props.low_pass_cutoff)?;
        Self::validate_eq_center(props.eq_center)?;
        Self::validate_eq_bandwidth(props.eq_bandwidth)?;
        Ok(())
    }

    fn defer_edge(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_edge(value)?;
        self.eax_d.edge = value;
        self.dirty.assign(DistortionField::Edge, self.eax.edge != self.eax_d.edge);
        Ok(())
    }

    fn defer_gain(&mut self, value: i32) -> EaxResult<()> {
        Self::validate_gain(value)?;
        self.eax_d.gain = value;
        self.dirty.assign(DistortionField::Gain, self.eax.gain != self.eax_d.gain);
        Ok(())
    }

    fn defer_low_pass_cutoff(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_low_pass_cutoff(value)?;
        self.eax_d.low_pass_cutoff = value;
        self.dirty.assign(DistortionField::LowPassCutoff, self.eax.low_pass_cutoff != self.eax_d.low_pass_cutoff);
        Ok(())
    }

    fn defer_eq_center(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_eq_center(value)?;
        self.eax_d.eq_center = value;
        self.dirty.assign(DistortionField::EqCenter, self.eax.eq_center != self.eax_d.eq_center);
        Ok(())
    }

    fn defer_eq_bandwidth(&mut self, value: f32) -> EaxResult<()> {
        Self::validate_eq_bandwidth(value)?;
        self.eax_d.eq_bandwidth = value;
        self.dirty.assign(DistortionField::EqBandwidth, self.eax.eq_bandwidth != self.eax_d.eq_bandwidth);
        Ok(())
    }

    fn defer_all(&mut self, props: &DistortionProperties) -> EaxResult<()> {
        Self::validate_all(props)?;
        self.defer_edge(props.edge)?;
        self.defer_gain(props.gain)?;
        self.defer_low_pass_cutoff(props.low_pass_cutoff)?;
        self.defer_eq_center(props.eq_center)?;
        self.defer_eq_bandwidth(props.eq_bandwidth)?;
        Ok(())
    }

    /// Commit staged fields, push them to the native effect and reload it into `slot`
    pub fn apply_deferred(&mut self, backend: &mut dyn EfxBackend, slot: EffectSlotId) -> EaxResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        self.eax = self.eax_d;

        if self.dirty.contains(DistortionField::Edge) {
            self.set_efx_edge(backend)?;
        }

        if self.dirty.contains(DistortionField::Gain) {
            self.set_efx_gain(backend)?;
        }

        if self.dirty.contains(DistortionField::LowPassCutoff) {
            self.set_efx_low_pass_cutoff(backend)?;
        }

        if self.dirty.contains(DistortionField::EqCenter) {
            self.set_efx_eq_center(backend)?;
        }

        if self.dirty.contains(DistortionField::EqBandwidth) {
            self.set_efx_eq_bandwidth(backend)?;
        }

        self.dirty.clear();
        backend.set_slot_effect(slot, self.effect)
    }

    fn set_efx_all(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        self.set_efx_edge(backend)?;
        self.set_efx_gain(backend)?;
        self.set_efx_low_pass_cutoff(backend)?;
        self.set_efx_eq_center(backend)?;
        self.set_efx_eq_bandwidth(backend)?;
        Ok(())
    }

    fn set_efx_edge(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::DistortionEdge,
            self.eax.edge,
            AL_DISTORTION_MIN_EDGE,
            AL_DISTORTION_MAX_EDGE,
        )
    }

    fn set_efx_gain(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::DistortionGain,
            level_mb_to_gain(self.eax.gain as f32),
            AL_DISTORTION_MIN_GAIN,
            AL_DISTORTION_MAX_GAIN,
        )
    }

    fn set_efx_low_pass_cutoff(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::DistortionLowpassCutoff,
            self.eax.low_pass_cutoff,
            AL_DISTORTION_MIN_LOWPASSCUTOFF,
            AL_DISTORTION_MAX_LOWPASSCUTOFF,
        )
    }

    fn set_efx_eq_center(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::DistortionEqCenter,
            self.eax.eq_center,
            AL_DISTORTION_MIN_EQCENTER,
            AL_DISTORTION_MAX_EQCENTER,
        )
    }

    fn set_efx_eq_bandwidth(&self, backend: &mut dyn EfxBackend) -> EaxResult<()> {
        set_efx_float(
            backend,
            self.effect,
            EfxParam::DistortionEqBandwidth,
            self.eax.eq_bandwidth,
            AL_DISTORTION_MIN_EQBANDWIDTH,
            AL_DISTORTION_MAX_EQBANDWIDTH,
        )
    }
}
