//! Alternate object access
//!
//! Backends that need several operations on an object to appear atomic
//! (a keyset walking its contents, a session using its keys) take the
//! object's advisory lock through [`Kernel::acquire_object`]. While the
//! returned [`ObjectGuard`] is alive other threads can read the object but
//! not change its security state or destroy it.

use std::marker::PhantomData;
use std::sync::Arc;

use super::Kernel;
use crate::dispatch::ObjectHandler;
use crate::object_type::ObjectType;
use crate::objects::ObjectHandle;
use crate::sync::{current_thread, ThreadToken};
use crate::{KernelError, Result};

/// Advisory lock on an object, released on drop
///
/// The guard is tied to the thread that took it.
pub struct ObjectGuard<'a> {
    kernel: &'a Kernel,
    handle: ObjectHandle,
    thread: ThreadToken,
    /// Lock depth while suspended
    suspended: Option<u32>,
    _not_send: PhantomData<*const ()>,
}

impl Kernel {
    /// Lock `handle` for the calling thread.
    ///
    /// Waits for any dispatch in progress on another thread to finish
    /// first. Fails with `ArgObject` if the object isn't of type
    /// `object_type`.
    pub fn acquire_object(&self, handle: ObjectHandle, object_type: ObjectType) -> Result<ObjectGuard<'_>> {
        let thread = current_thread();
        let mut state = self.lock_state();
        {
            let record = state.objects()?.get(handle).ok_or(KernelError::NotFound)?;
            if record.object_type != object_type {
                return Err(KernelError::ArgObject);
            }
            if record.in_invalid_state() {
                return Err(record.invalid_state_error());
            }
        }
        state = self.wait_until_idle(state, handle, thread)?;
        state.objects_mut()?.lookup_mut(handle)?.lock(thread)?;
        log::trace!("{handle:?} acquired by thread {thread}");
        Ok(ObjectGuard {
            kernel: self,
            handle,
            thread,
            suspended: None,
            _not_send: PhantomData,
        })
    }
}

impl ObjectGuard<'_> {
    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// Run `f` directly against the object's handler state
    pub fn with_handler<R>(&self, f: impl FnOnce(&mut dyn ObjectHandler) -> R) -> Result<R> {
        if self.suspended.is_some() {
            return Err(KernelError::Permission);
        }
        let handler = {
            let state = self.kernel.lock_state();
            Arc::clone(&state.objects()?.lookup(self.handle)?.handler)
        };
        let mut handler = handler.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(f(&mut *handler))
    }

    /// Let other threads at the object until [`resume`](Self::resume)
    pub fn suspend(&mut self) -> Result<()> {
        if self.suspended.is_some() {
            return Ok(());
        }
        let mut state = self.kernel.lock_state();
        let depth = state.objects_mut()?.lookup_mut(self.handle)?.suspend_lock(self.thread)?;
        self.suspended = Some(depth);
        Ok(())
    }

    /// Re-take a suspended lock.
    ///
    /// Fails with `Permission` if another thread locked the object in the
    /// meantime.
    pub fn resume(&mut self) -> Result<()> {
        let Some(depth) = self.suspended else {
            return Ok(());
        };
        let mut state = self.kernel.lock_state();
        state.objects_mut()?.lookup_mut(self.handle)?.resume_lock(self.thread, depth)?;
        self.suspended = None;
        Ok(())
    }
}

impl Drop for ObjectGuard<'_> {
    fn drop(&mut self) {
        if self.suspended.is_some() {
            return;
        }
        let mut state = self.kernel.lock_state();
        let result = state
            .objects_mut()
            .and_then(|objects| objects.lookup_mut(self.handle))
            .and_then(|record| record.unlock(self.thread));
        if let Err(err) = result {
            log::warn!("couldn't release lock on {:?}: {err}", self.handle);
        }
    }
}
