//! The reference monitor
//!
//! [`Kernel`] owns everything the monitor needs: the object table, the
//! deferred message queue, the mutex set and the semaphore table. One
//! table-wide lock serialises the object table and queue; ACL evaluation
//! runs over immutable statics and needs no lock at all.
//!
//! No kernel lock is ever held across an object handler call or a
//! blocking wait. Handlers are free to send further messages, including
//! to the object they are handling (those are queued until the handler
//! returns).

mod acquire;
mod create;
mod handlers;
mod init;
mod selftest;
mod send;
mod system;

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Instant;

pub use acquire::ObjectGuard;
pub use create::{CreateFlags, CreateObjectInfo};
pub use init::{InitLevel, ShutdownLevel};
pub use system::SystemDevice;

use crate::config::KernelConfig;
use crate::dispatch::{MemoryObjectFactory, MessageQueue, ObjectFactory};
use crate::objects::{ObjectHandle, ObjectTable};
use crate::sync::{current_thread, MutexSet, SemaphoreId, SemaphoreTable, ThreadToken};
use crate::{KernelError, Result};

/// State guarded by the kernel lock
pub(crate) struct KernelState {
    /// Present between init and the end of shutdown
    objects: Option<ObjectTable>,
    queue: MessageQueue,
    init_level: InitLevel,
    shutdown_level: ShutdownLevel,
}

impl KernelState {
    fn new(queue_size: usize) -> Self {
        Self {
            objects: None,
            queue: MessageQueue::new(queue_size),
            init_level: InitLevel::None,
            shutdown_level: ShutdownLevel::None,
        }
    }

    pub(crate) fn objects(&self) -> Result<&ObjectTable> {
        self.objects.as_ref().ok_or(KernelError::NotInitialized)
    }

    pub(crate) fn objects_mut(&mut self) -> Result<&mut ObjectTable> {
        self.objects.as_mut().ok_or(KernelError::NotInitialized)
    }
}

pub(crate) type StateGuard<'a> = MutexGuard<'a, KernelState>;

/// Security kernel instance
///
/// Created uninitialised; [`init`](Kernel::init) brings it up and
/// [`shutdown`](Kernel::shutdown) (or dropping it) tears it down again. A
/// kernel can go through any number of init/shutdown cycles.
pub struct Kernel {
    config: KernelConfig,
    state: Mutex<KernelState>,
    /// Signalled whenever an object stops being busy
    idle: Condvar,
    init_lock: Mutex<()>,
    mutexes: MutexSet,
    semaphores: SemaphoreTable,
    factory: Box<dyn ObjectFactory>,
}

impl Kernel {
    /// Create an uninitialised kernel backed by in-memory objects
    pub fn new(config: KernelConfig) -> Result<Self> {
        Self::with_factory(config, Box::new(MemoryObjectFactory))
    }

    /// Create an uninitialised kernel whose devices build objects with
    /// `factory`
    pub fn with_factory(config: KernelConfig, factory: Box<dyn ObjectFactory>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(KernelState::new(config.message_queue_size)),
            idle: Condvar::new(),
            init_lock: Mutex::new(()),
            mutexes: MutexSet::new(),
            semaphores: SemaphoreTable::new(),
            factory,
            config,
        })
    }

    /// Create and initialise a kernel in one step
    pub fn start(config: KernelConfig) -> Result<Self> {
        let kernel = Self::new(config)?;
        kernel.init()?;
        Ok(kernel)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn mutexes(&self) -> &MutexSet {
        &self.mutexes
    }

    pub fn semaphores(&self) -> &SemaphoreTable {
        &self.semaphores
    }

    /// Block until `id` is released, bounded by the configured wait timeout
    pub fn wait_semaphore(&self, id: SemaphoreId) -> Result<bool> {
        self.semaphores.wait(id, self.config.wait_timeout)
    }

    pub(crate) fn factory(&self) -> &dyn ObjectFactory {
        self.factory.as_ref()
    }

    pub(crate) fn lock_state(&self) -> StateGuard<'_> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock_state().init_level != InitLevel::None
    }

    pub fn init_level(&self) -> InitLevel {
        self.lock_state().init_level
    }

    pub fn shutdown_level(&self) -> ShutdownLevel {
        self.lock_state().shutdown_level
    }

    /// Number of live objects, system objects included
    pub fn object_count(&self) -> usize {
        self.lock_state().objects.as_ref().map_or(0, ObjectTable::len)
    }

    /// True if `handle` refers to a live object
    pub fn is_valid(&self, handle: ObjectHandle) -> bool {
        self.lock_state()
            .objects
            .as_ref()
            .is_some_and(|objects| objects.is_valid(handle))
    }

    /// Wait until no other thread is dispatching to `handle`.
    ///
    /// Returns the re-acquired guard. An object that disappears while we
    /// wait is reported as `NotFound`; once shutdown has restricted
    /// messages the wait is abandoned with `Permission`.
    pub(crate) fn wait_until_idle<'a>(
        &'a self,
        mut state: StateGuard<'a>,
        handle: ObjectHandle,
        thread: ThreadToken,
    ) -> Result<StateGuard<'a>> {
        let deadline = Instant::now() + self.config.wait_timeout;
        loop {
            let busy = state.objects()?.lookup(handle)?.busy_with_other(thread);
            if !busy {
                return Ok(state);
            }
            if state.shutdown_level >= ShutdownLevel::MessagesRestricted {
                log::debug!("abandoned wait for {handle:?}: kernel shutting down");
                return Err(KernelError::Permission);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!("timed out waiting for {handle:?} to become idle");
                return Err(KernelError::Timeout);
            }
            state = self
                .idle
                .wait_timeout(state, remaining)
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .0;
        }
    }

    /// Mark `handle` busy for the calling thread, or clear it
    pub(crate) fn set_busy(&self, state: &mut KernelState, handle: ObjectHandle, busy: bool) {
        if let Some(record) = state.objects.as_mut().and_then(|objects| objects.get_mut(handle)) {
            record.busy = busy.then(current_thread);
        }
        if !busy {
            self.idle.notify_all();
        }
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        if self.is_initialized() {
            if let Err(err) = self.shutdown() {
                log::warn!("kernel shutdown on drop failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_uninitialized() {
        let kernel = Kernel::new(KernelConfig::for_testing()).unwrap();
        assert!(!kernel.is_initialized());
        assert_eq!(kernel.object_count(), 0);
        assert!(!kernel.is_valid(ObjectHandle::SYSTEM_DEVICE));
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = KernelConfig {
            message_queue_size: 0,
            ..KernelConfig::for_testing()
        };
        assert!(matches!(Kernel::new(config), Err(KernelError::ArgNum1)));
    }

    #[test]
    fn test_start_creates_system_objects() {
        let kernel = Kernel::start(KernelConfig::for_testing()).unwrap();
        assert_eq!(kernel.init_level(), InitLevel::FullyInitialized);
        assert!(kernel.is_valid(ObjectHandle::SYSTEM_DEVICE));
        assert!(kernel.is_valid(ObjectHandle::DEFAULT_USER));
        assert_eq!(kernel.object_count(), 2);
    }
}
