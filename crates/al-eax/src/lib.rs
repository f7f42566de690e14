//! al-eax: EAX property-set emulation
//!
//! Translates the GUID-keyed EAX 2.0 - 5.0 property protocol into native
//! effect, slot, filter and send parameters:
//!
//! ## Call routing
//! - GUID → (version, domain, FX slot) decode
//! - Legacy 2.0 id remapping
//! - Deferred vs immediate commit
//!
//! ## State
//! - Context with 4 FX slots and a source registry
//! - 13 effect handlers (EAX reverb, chorus, echo, ...)
//! - Per-source occlusion/obstruction/exclusion filter math
//!
//! The native side is abstracted behind [`EfxBackend`]; [`RecordingBackend`]
//! is an in-memory implementation.

pub mod backend;
pub mod call;
pub mod context;
pub mod dirty;
pub mod effects;
pub mod fx_slot;
pub mod fx_slot_index;
pub mod guids;
pub mod recording;
pub mod source;
pub mod validate;

mod eax;
mod error;

pub use backend::{
    EffectId, EffectSlotId, EfxBackend, EfxCaps, EfxEffectType, EfxParam, EfxValue, FilterId,
    SourceFlag, SourceId, SourceParam,
};
pub use call::{EAX_PROPERTY_DEFERRED, PropertyCall, PropertySetId};
pub use context::Context;
pub use eax::Eax;
pub use effects::{EffectHandler, EffectType};
pub use error::*;
pub use fx_slot::FxSlot;
pub use fx_slot_index::{EAX_MAX_FX_SLOTS, FxSlotIndex};
pub use recording::RecordingBackend;
pub use source::Source;
