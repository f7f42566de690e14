//! Top-level EAX state and the Set/Get entry points

use crate::backend::{EfxBackend, SourceId};
use crate::call::PropertyCall;
use crate::context::Context;
use crate::error::{AL_NO_ERROR, EaxError, EaxResult};
use al_core::{EaxConfig, Guid};

/// EAX emulation bound to one native backend
pub struct Eax<B: EfxBackend> {
    backend: B,
    context: Context,
    trace_calls: bool,
}

impl<B: EfxBackend> Eax<B> {
    /// Create the context (4 FX slots and the shared filter) on `backend`
    pub fn new(mut backend: B, config: &EaxConfig) -> EaxResult<Self> {
        if !config.enabled {
            return Err(EaxError::resource("EAX disabled"));
        }
        let context = Context::new(&mut backend)?;
        Ok(Self {
            backend,
            context,
            trace_calls: config.trace_calls,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Set entry point. Returns `AL_NO_ERROR` or `AL_INVALID_OPERATION`.
    pub fn set(&mut self, guid: Option<&Guid>, property_id: u32, target: u32, buffer: Option<&mut [u8]>) -> i32 {
        let result = self.try_set(guid, property_id, target, buffer);
        self.status(result)
    }

    /// Get entry point. Returns `AL_NO_ERROR` or `AL_INVALID_OPERATION`.
    pub fn get(&mut self, guid: Option<&Guid>, property_id: u32, target: u32, buffer: Option<&mut [u8]>) -> i32 {
        let result = self.try_get(guid, property_id, target, buffer);
        self.status(result)
    }

    pub fn try_set(
        &mut self,
        guid: Option<&Guid>,
        property_id: u32,
        target: u32,
        buffer: Option<&mut [u8]>,
    ) -> EaxResult<()> {
        self.call(false, guid, property_id, target, buffer)
    }

    pub fn try_get(
        &mut self,
        guid: Option<&Guid>,
        property_id: u32,
        target: u32,
        buffer: Option<&mut [u8]>,
    ) -> EaxResult<()> {
        self.call(true, guid, property_id, target, buffer)
    }

    /// Put newly generated sources under EAX control
    pub fn register_sources(&mut self, ids: &[SourceId]) -> EaxResult<()> {
        for &id in ids {
            self.context.register_source(id, &mut self.backend)?;
        }
        Ok(())
    }

    /// Forget deleted sources
    pub fn unregister_sources(&mut self, ids: &[SourceId]) {
        for &id in ids {
            self.context.unregister_source(id);
        }
    }

    /// Delete every native object the context owns
    pub fn release(&mut self) -> EaxResult<()> {
        self.context.release(&mut self.backend)
    }

    fn call(
        &mut self,
        is_get: bool,
        guid: Option<&Guid>,
        property_id: u32,
        target: u32,
        buffer: Option<&mut [u8]>,
    ) -> EaxResult<()> {
        self.context.activate_default_reverb_effect(&mut self.backend)?;

        let mut call = PropertyCall::new(is_get, guid, property_id, target, buffer)?;
        if self.trace_calls {
            log::debug!(
                "[EAX] {} v{} {:?} id {:#x}{} target {} ({} bytes)",
                if is_get { "get" } else { "set" },
                call.version(),
                call.property_set_id(),
                call.property_id(),
                if call.is_deferred() { " deferred" } else { "" },
                call.target_name(),
                call.buffer_size()
            );
        }
        self.context.dispatch(&mut call, &mut self.backend)
    }

    fn status(&mut self, result: EaxResult<()>) -> i32 {
        match result {
            Ok(()) => AL_NO_ERROR,
            Err(err) => {
                if err.is_fatal() {
                    log::error!("[EAX] {err}");
                } else {
                    log::warn!("[EAX] {err}");
                }
                self.context.set_last_error();
                err.al_status()
            }
        }
    }
}
