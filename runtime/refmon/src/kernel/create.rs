//! Trusted object creation
//!
//! Backends create the objects they manage through
//! [`Kernel::create_object`]. The new object starts out internal and not
//! yet initialised; once the backend has finished setting it up it clears
//! the not-initialised state by writing `IATTRIBUTE_STATUS`.

use bitflags::bitflags;

use super::init::ShutdownLevel;
use super::Kernel;
use crate::dispatch::SharedHandler;
use crate::error::internal_error;
use crate::object_type::{ObjectType, SubType};
use crate::objects::{ActionPerms, ObjectFlags, ObjectHandle, ObjectRecord};
use crate::{KernelError, Result};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CreateFlags: u8 {
        /// Visible to external callers straight away
        const EXTERNAL = 1 << 0;
        /// Already fully set up, skip the not-initialised state
        const INITIALISED = 1 << 1;
        /// Backend keeps the object's state in secure memory
        const SECURE_STORAGE = 1 << 2;
    }
}

/// Everything needed to create an object
pub struct CreateObjectInfo {
    pub object_type: ObjectType,
    pub subtype: SubType,
    /// Owning user, the default user if `None`
    pub owner: Option<ObjectHandle>,
    /// Device the object's state lives in
    pub device: ObjectHandle,
    pub flags: CreateFlags,
    pub action_perms: ActionPerms,
    pub handler: SharedHandler,
}

impl CreateObjectInfo {
    pub fn new(object_type: ObjectType, subtype: SubType, handler: SharedHandler) -> Self {
        Self {
            object_type,
            subtype,
            owner: None,
            device: ObjectHandle::SYSTEM_DEVICE,
            flags: CreateFlags::empty(),
            action_perms: ActionPerms::ALL,
            handler,
        }
    }

    pub fn owner(mut self, owner: ObjectHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn device(mut self, device: ObjectHandle) -> Self {
        self.device = device;
        self
    }

    pub fn flags(mut self, flags: CreateFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn action_perms(mut self, perms: ActionPerms) -> Self {
        self.action_perms = perms;
        self
    }
}

impl Kernel {
    /// Add a new object to the object table
    pub fn create_object(&self, info: CreateObjectInfo) -> Result<ObjectHandle> {
        if !info.subtype.is_single() || info.subtype.object_type() != Some(info.object_type) {
            internal_error!("object subtype doesn't match its type");
        }

        let mut state = self.lock_state();
        if state.shutdown_level >= ShutdownLevel::MessagesRestricted {
            return Err(KernelError::Permission);
        }
        let objects = state.objects_mut()?;

        let owner = info.owner.unwrap_or(ObjectHandle::DEFAULT_USER);
        if objects.get(owner).map(|record| record.object_type) != Some(ObjectType::User) {
            return Err(KernelError::NotFound);
        }
        if objects.get(info.device).map(|record| record.object_type) != Some(ObjectType::Device) {
            return Err(KernelError::NotFound);
        }

        let mut record = ObjectRecord::new(info.object_type, info.subtype, info.handler);
        if info.flags.contains(CreateFlags::EXTERNAL) {
            record.flags.remove(ObjectFlags::INTERNAL);
        }
        if info.flags.contains(CreateFlags::INITIALISED) {
            record.flags.remove(ObjectFlags::NOTINITED);
        }
        if info.flags.contains(CreateFlags::SECURE_STORAGE) {
            record.flags.insert(ObjectFlags::SECUREMALLOC);
        }
        record.action_perms = info.action_perms;
        record.owner = Some(owner);
        record.dependent_device = Some(info.device);

        let handle = objects.allocate(record)?;
        if info.device != ObjectHandle::SYSTEM_DEVICE {
            let device = objects.lookup_mut(info.device)?;
            device.ref_count = device.ref_count.saturating_add(1);
        }
        log::debug!("created {:?} ({:?}) as {handle:?}", info.object_type, info.subtype);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_id::AttributeId;
    use crate::config::KernelConfig;
    use crate::dispatch::{MemoryObject, Message};
    use crate::object_type::{SubTypeA, SubTypeB, SubTypeC};

    fn kernel() -> Kernel {
        Kernel::start(KernelConfig {
            run_self_test: false,
            ..KernelConfig::for_testing()
        })
        .unwrap()
    }

    fn info(object_type: ObjectType, subtype: SubType) -> CreateObjectInfo {
        CreateObjectInfo::new(object_type, subtype, MemoryObject::shared())
    }

    #[test]
    fn test_new_object_not_inited() {
        let kernel = kernel();
        let handle = kernel
            .create_object(info(ObjectType::Context, SubType::A(SubTypeA::CTX_CONV)))
            .unwrap();
        assert!(!handle.is_system());
        assert_eq!(
            kernel.send(handle, Message::get_attribute(AttributeId::CTXINFO_MODE)),
            Err(KernelError::ArgObject)
        );
        let state = kernel.lock_state();
        let record = state.objects().unwrap().lookup(handle).unwrap();
        assert!(record.in_invalid_state());
        assert!(record.is_internal());
        assert_eq!(record.owner, Some(ObjectHandle::DEFAULT_USER));
        assert_eq!(record.dependent_device, Some(ObjectHandle::SYSTEM_DEVICE));
    }

    #[test]
    fn test_mismatched_subtype() {
        let kernel = kernel();
        let result = kernel.create_object(info(ObjectType::Context, SubType::C(SubTypeC::USER_NORMAL)));
        assert!(matches!(result, Err(KernelError::Internal { .. })));
    }

    #[test]
    fn test_owner_must_be_user() {
        let kernel = kernel();
        let result = kernel.create_object(
            info(ObjectType::Context, SubType::A(SubTypeA::CTX_CONV)).owner(ObjectHandle::SYSTEM_DEVICE),
        );
        assert_eq!(result, Err(KernelError::NotFound));
    }

    #[test]
    fn test_device_holds_reference() {
        let kernel = kernel();
        let device = kernel
            .create_object(info(ObjectType::Device, SubType::B(SubTypeB::DEV_HW)).flags(CreateFlags::INITIALISED))
            .unwrap();
        kernel
            .create_object(info(ObjectType::Context, SubType::A(SubTypeA::CTX_PKC)).device(device))
            .unwrap();
        let state = kernel.lock_state();
        assert_eq!(state.objects().unwrap().lookup(device).unwrap().ref_count, 1);
    }

    #[test]
    fn test_refused_during_shutdown() {
        let kernel = kernel();
        kernel.lock_state().shutdown_level = ShutdownLevel::MessagesRestricted;
        let result = kernel.create_object(info(ObjectType::Context, SubType::A(SubTypeA::CTX_CONV)));
        assert_eq!(result, Err(KernelError::Permission));
        kernel.lock_state().shutdown_level = ShutdownLevel::None;
    }
}
