//! The system device
//!
//! Handle 0. Creates every object that isn't created by some other device,
//! answers capability queries for the built-in algorithms and otherwise
//! behaves like a plain in-memory object.

use std::sync::{Arc, Mutex};

use super::create::CreateObjectInfo;
use super::Kernel;
use crate::acl::create::check_create;
use crate::algo;
use crate::attr_id::AttributeId;
use crate::dispatch::{CreateArgs, MemoryObject, Message, MessageData, MessageType, ObjectHandler, SharedHandler};
use crate::objects::ObjectHandle;
use crate::{KernelError, Result};

#[derive(Debug, Default)]
pub struct SystemDevice {
    storage: MemoryObject,
}

impl SystemDevice {
    pub fn shared() -> SharedHandler {
        Arc::new(Mutex::new(Self::default()))
    }

    fn create_object(kernel: &Kernel, device: ObjectHandle, object_type: i32, args: &CreateArgs) -> Result<ObjectHandle> {
        let (object_type, subtype) = check_create(object_type, args)?;
        let handler = kernel.factory().create(object_type, subtype, args)?;
        let mut info = CreateObjectInfo::new(object_type, subtype, handler).device(device);
        if let Some(owner) = args.owner {
            info = info.owner(owner);
        }
        let handle = kernel.create_object(info)?;

        // Nothing to set up for in-memory objects, so they're ready straight away
        if let Err(err) = kernel.send_internal(handle, Message::set_attribute(AttributeId::IATTRIBUTE_STATUS, 0)) {
            log::warn!("couldn't complete creation of {handle:?}: {err}");
            if let Err(destroy_err) = kernel.send_internal(handle, Message::bare(MessageType::Destroy)) {
                log::warn!("couldn't clean up {handle:?}: {destroy_err}");
            }
            return Err(err);
        }
        Ok(handle)
    }
}

fn query_capability(algorithm: algo::Algorithm) -> Result<()> {
    let known = algo::is_conventional(algorithm)
        || algo::is_pkc(algorithm)
        || algo::is_hash(algorithm)
        || algo::is_mac(algorithm);
    if known {
        Ok(())
    } else {
        Err(KernelError::NotAvail)
    }
}

impl ObjectHandler for SystemDevice {
    fn handle(&mut self, kernel: &Kernel, object: ObjectHandle, message: &mut Message) -> Result<()> {
        match message.kind {
            MessageType::DevCreateObject => {
                let MessageData::Create(args) = &message.data else {
                    return Err(KernelError::ArgNum1);
                };
                let handle = Self::create_object(kernel, object, message.value, args)?;
                message.data = MessageData::Handle(handle);
                Ok(())
            }
            MessageType::DevQueryCapability => query_capability(message.value),
            MessageType::Destroy => Ok(()),
            _ => self.storage.handle(kernel, object, message),
        }
    }
}
