//! Init and shutdown sequencing
//!
//! ```text
//!   init:      None ──▶ KernelDataInitialized ──▶ FullyInitialized
//!
//!   shutdown:  None ──▶ ThreadsSignaled ──▶ MessagesRestricted
//!                                  ──▶ MutexesInvalid ──▶ FullyShutdown
//! ```
//!
//! The shutdown level also gates message traffic while the kernel winds
//! down: once threads have been signalled only internal and teardown
//! messages get through. Once messages are restricted all that is left
//! is destruction, reference drops and status reads, from anyone.

use std::time::{SystemTime, UNIX_EPOCH};

use super::system::SystemDevice;
use super::{Kernel, KernelState};
use crate::acl;
use crate::attr_id::AttributeId;
use crate::dispatch::{check_table, MemoryObject, Message, MessageType};
use crate::object_type::{ObjectType, SubType, SubTypeB, SubTypeC};
use crate::objects::{ObjectFlags, ObjectHandle, ObjectRecord, ObjectTable};
use crate::{KernelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitLevel {
    None,
    /// Tables checked and allocated, no system objects yet
    KernelDataInitialized,
    FullyInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShutdownLevel {
    None,
    ThreadsSignaled,
    MessagesRestricted,
    MutexesInvalid,
    FullyShutdown,
}

/// Messages that tear objects down
fn is_teardown(kind: MessageType) -> bool {
    matches!(
        kind,
        MessageType::Destroy | MessageType::IncRefCount | MessageType::DecRefCount
    )
}

/// Messages still let through once shutdown has restricted messages
fn admitted_while_restricted(message: &Message) -> bool {
    match message.kind {
        MessageType::Destroy | MessageType::DecRefCount => true,
        // Shutdown asks objects whether they're still busy
        MessageType::GetAttribute => message.attribute() == AttributeId::IATTRIBUTE_STATUS,
        _ => false,
    }
}

/// Seed for the handle sequence, so handle values differ between runs
fn handle_seed() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(1, |elapsed| elapsed.subsec_nanos() as usize ^ elapsed.as_secs() as usize)
}

/// Run every static table check, in dependency order
fn check_tables() -> Result<()> {
    acl::check_all()?;
    acl::cert_mgmt::check_tables()?;
    check_table()?;
    acl::key_mgmt::check_tables()?;
    acl::mechanism::check_tables()?;
    acl::check::check_tables()?;
    acl::compare::check_tables()?;
    acl::create::check_tables()?;
    acl::export::check_tables()?;
    acl::dependency::check_tables()?;
    Ok(())
}

impl KernelState {
    /// Whether a message may pass at the current init/shutdown level
    pub(crate) fn admits(&self, message: &Message, internal: bool) -> Result<()> {
        if self.init_level == InitLevel::None {
            return Err(KernelError::NotInitialized);
        }
        if !internal && self.init_level < InitLevel::FullyInitialized {
            return Err(KernelError::NotInitialized);
        }
        match self.shutdown_level {
            ShutdownLevel::None => Ok(()),
            ShutdownLevel::ThreadsSignaled if internal || is_teardown(message.kind) => Ok(()),
            _ if admitted_while_restricted(message) => Ok(()),
            _ => Err(KernelError::Permission),
        }
    }
}

impl Kernel {
    /// Bring the kernel up.
    ///
    /// Verifies every static table, allocates the object table, creates the
    /// system device and default user, and runs the self-test if
    /// configured. Any failure leaves the kernel uninitialised.
    pub fn init(&self) -> Result<()> {
        let _init = self.init_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        {
            let mut state = self.lock_state();
            if state.init_level != InitLevel::None {
                return Err(KernelError::AlreadyInitialized);
            }
            let shutdown_level = state.shutdown_level;
            *state = KernelState::new(self.config.message_queue_size);
            state.shutdown_level = shutdown_level;
        }

        check_tables()?;
        let objects = ObjectTable::new(self.config.initial_table_size, self.config.max_objects, handle_seed())?;
        self.mutexes.reset();
        self.semaphores.reset();
        {
            let mut state = self.lock_state();
            state.objects = Some(objects);
            state.init_level = InitLevel::KernelDataInitialized;
            state.shutdown_level = ShutdownLevel::None;
        }
        log::info!("kernel data initialised");

        if let Err(err) = self.create_system_objects() {
            self.abandon_init();
            return Err(err);
        }
        self.lock_state().init_level = InitLevel::FullyInitialized;
        log::info!("kernel fully initialised");

        if self.config.run_self_test {
            if let Err(err) = self.send_internal(ObjectHandle::SYSTEM_DEVICE, Message::bare(MessageType::SelfTest)) {
                log::error!("kernel self-test failed: {err}");
                drop(_init);
                if let Err(shutdown_err) = self.shutdown() {
                    log::warn!("shutdown after failed self-test: {shutdown_err}");
                }
                return Err(err);
            }
            log::info!("kernel self-test passed");
        }
        Ok(())
    }

    fn create_system_objects(&self) -> Result<()> {
        let mut state = self.lock_state();
        let objects = state.objects_mut()?;

        let mut device = ObjectRecord::new(
            ObjectType::Device,
            SubType::B(SubTypeB::DEV_SYSTEM),
            SystemDevice::shared(),
        );
        device.flags = ObjectFlags::HIGH;
        device.owner = Some(ObjectHandle::DEFAULT_USER);
        objects.insert_system(ObjectHandle::SYSTEM_DEVICE, device)?;

        let mut user = ObjectRecord::new(ObjectType::User, SubType::C(SubTypeC::USER_SO), MemoryObject::shared());
        user.flags = ObjectFlags::HIGH;
        objects.insert_system(ObjectHandle::DEFAULT_USER, user)?;

        log::debug!("system device and default user created");
        Ok(())
    }

    /// Drop everything a partial init set up
    fn abandon_init(&self) {
        let records = {
            let mut state = self.lock_state();
            state.init_level = InitLevel::None;
            state.queue.clear();
            state.objects.take().map(|mut objects| objects.clear())
        };
        drop(records);
        log::warn!("kernel init abandoned");
    }

    /// Tear the kernel down.
    ///
    /// Wakes blocked threads, destroys every object, invalidates the
    /// mutexes and finally frees the object table.
    pub fn shutdown(&self) -> Result<()> {
        let _init = self.init_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.lock_state().init_level == InitLevel::None {
            return Err(KernelError::NotInitialized);
        }

        self.begin_shutdown();

        self.set_shutdown_level(ShutdownLevel::MessagesRestricted);
        self.destroy_all_objects();

        self.set_shutdown_level(ShutdownLevel::MutexesInvalid);
        self.mutexes.invalidate();

        let records = {
            let mut state = self.lock_state();
            state.shutdown_level = ShutdownLevel::FullyShutdown;
            state.init_level = InitLevel::None;
            state.queue.clear();
            state.objects.take().map(|mut objects| objects.clear())
        };
        // Handlers are dropped outside the lock
        drop(records);
        log::info!("kernel shutdown complete");
        Ok(())
    }

    /// Move to ThreadsSignaled (if not there already) and wake everyone
    /// blocked in the kernel
    pub(crate) fn begin_shutdown(&self) {
        {
            let mut state = self.lock_state();
            if state.shutdown_level < ShutdownLevel::ThreadsSignaled {
                state.shutdown_level = ShutdownLevel::ThreadsSignaled;
                log::info!("kernel shutdown: threads signalled");
            }
        }
        self.semaphores.release_all();
        self.idle.notify_all();
    }

    fn set_shutdown_level(&self, level: ShutdownLevel) {
        {
            let mut state = self.lock_state();
            if state.shutdown_level < level {
                state.shutdown_level = level;
                log::info!("kernel shutdown: {level:?}");
            }
        }
        // Threads waiting on busy objects give up at MessagesRestricted
        self.idle.notify_all();
    }

    /// Destroy every ordinary object regardless of references and locks
    fn destroy_all_objects(&self) {
        let handles = {
            let mut state = self.lock_state();
            let Ok(objects) = state.objects_mut() else {
                return;
            };
            let handles: Vec<_> = objects.handles().into_iter().filter(|h| !h.is_system()).collect();
            for handle in &handles {
                if let Some(record) = objects.get_mut(*handle) {
                    record.ref_count = 0;
                    record.lock_count = 0;
                    record.lock_owner = None;
                }
            }
            handles
        };

        for handle in handles {
            // Destroying one object can take its dependents with it
            if !self.is_valid(handle) {
                continue;
            }
            if let Err(err) = self.send_internal(handle, Message::bare(MessageType::Destroy)) {
                log::warn!("couldn't destroy {handle:?} at shutdown: {err}");
            }
        }
        log::debug!("{} objects left after shutdown destroy pass", self.object_count());
    }
}
