//! Object handlers
//!
//! The kernel never looks inside an object. Once a message has passed
//! every check it is handed to the object's [`ObjectHandler`], which owns
//! the actual state (key material, certificate fields, keyset contents).
//! [`MemoryObject`] is a plain in-memory handler used for objects that
//! have no backend of their own and throughout the tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use super::message::{CreateArgs, Message, MessageData, MessageType};
use crate::kernel::Kernel;
use crate::object_type::{ObjectType, SubType};
use crate::objects::ObjectHandle;
use crate::{KernelError, Result};

/// Object logic invoked after the kernel has granted access
pub trait ObjectHandler: Send {
    /// Process `message` for `object`, leaving any result in
    /// `message.data`
    fn handle(&mut self, kernel: &Kernel, object: ObjectHandle, message: &mut Message) -> Result<()>;

    /// A fresh handler holding a copy of this one's state, for cloning
    fn duplicate(&self) -> Option<SharedHandler> {
        None
    }
}

/// Handler shared between the object table and in-flight dispatches
pub type SharedHandler = Arc<Mutex<dyn ObjectHandler>>;

/// Creates handlers for objects made through a device
pub trait ObjectFactory: Send + Sync {
    fn create(&self, object_type: ObjectType, subtype: SubType, args: &CreateArgs) -> Result<SharedHandler>;
}

/// Value mask applied by [`MemoryObject`] to "encrypt" data
const XOR_MASK: u8 = 0xA5;

/// In-memory object
#[derive(Debug, Clone, Default)]
pub struct MemoryObject {
    attributes: HashMap<i32, MessageData>,
    /// Values compare messages are matched against, by compare kind
    compare_values: HashMap<i32, Vec<u8>>,
    keys: BTreeMap<Vec<u8>, ObjectHandle>,
    buffer: Vec<u8>,
}

impl MemoryObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedHandler {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Value a compare of `kind` matches against
    pub fn with_compare_value(mut self, kind: i32, value: &[u8]) -> Self {
        self.compare_values.insert(kind, value.to_vec());
        self
    }

    pub fn into_shared(self) -> SharedHandler {
        Arc::new(Mutex::new(self))
    }

    fn handle_keyset(&mut self, message: &mut Message) -> Result<()> {
        let MessageData::Key(info) = &mut message.data else {
            return Err(KernelError::ArgNum1);
        };
        match message.kind {
            MessageType::KeySetKey => {
                let object = info.object.ok_or(KernelError::ArgNum1)?;
                self.keys.insert(info.id.clone(), object);
            }
            MessageType::KeyGetKey => {
                info.object = Some(*self.keys.get(&info.id).ok_or(KernelError::NotFound)?);
            }
            MessageType::KeyDeleteKey => {
                self.keys.remove(&info.id).ok_or(KernelError::NotFound)?;
            }
            MessageType::KeyGetFirstCert | MessageType::KeyGetNextCert => {
                let position = match (message.kind, info.state) {
                    (MessageType::KeyGetFirstCert, _) => 0,
                    (_, Some(state)) => usize::try_from(state).map_err(|_| KernelError::ArgNum1)? + 1,
                    (_, None) => return Err(KernelError::NotInited),
                };
                let object = *self.keys.values().nth(position).ok_or(KernelError::NotFound)?;
                info.object = Some(object);
                info.state = Some(i32::try_from(position).map_err(|_| KernelError::Overflow)?);
            }
            _ => return Err(KernelError::NotAvail),
        }
        Ok(())
    }
}

impl ObjectHandler for MemoryObject {
    fn handle(&mut self, _kernel: &Kernel, object: ObjectHandle, message: &mut Message) -> Result<()> {
        match message.kind {
            MessageType::GetAttribute | MessageType::GetAttributeS => {
                message.data = self.attributes.get(&message.value).cloned().ok_or(KernelError::NotFound)?;
            }
            MessageType::SetAttribute | MessageType::SetAttributeS => {
                self.attributes.insert(message.value, message.data.clone());
            }
            MessageType::DeleteAttribute => {
                self.attributes.remove(&message.value).ok_or(KernelError::NotFound)?;
            }
            MessageType::CtxEncrypt | MessageType::CtxDecrypt => {
                let MessageData::Bytes(bytes) = &mut message.data else {
                    return Err(KernelError::ArgStr1);
                };
                bytes.iter_mut().for_each(|byte| *byte ^= XOR_MASK);
            }
            MessageType::Compare => {
                let matched = match &message.data {
                    MessageData::Bytes(bytes) => self.compare_values.get(&message.value) == Some(bytes),
                    MessageData::Handle(other) => *other == object,
                    _ => return Err(KernelError::ArgNum1),
                };
                message.data = MessageData::Int(i32::from(matched));
            }
            MessageType::EnvPushData => {
                let MessageData::Bytes(bytes) = &message.data else {
                    return Err(KernelError::ArgStr1);
                };
                let pushed = i32::try_from(bytes.len()).map_err(|_| KernelError::Overflow)?;
                self.buffer.extend_from_slice(bytes);
                message.data = MessageData::Int(pushed);
            }
            MessageType::EnvPopData => {
                message.data = MessageData::Bytes(std::mem::take(&mut self.buffer));
            }
            MessageType::CrtExport => {
                message.data = MessageData::Bytes(self.compare_values.values().next().cloned().unwrap_or_default());
            }
            MessageType::KeySetKey
            | MessageType::KeyGetKey
            | MessageType::KeyDeleteKey
            | MessageType::KeyGetFirstCert
            | MessageType::KeyGetNextCert => self.handle_keyset(message)?,
            MessageType::DevCreateObject => return Err(KernelError::NotAvail),
            _ => {}
        }
        Ok(())
    }

    fn duplicate(&self) -> Option<SharedHandler> {
        Some(self.clone().into_shared())
    }
}

/// Factory producing [`MemoryObject`] handlers for every object type
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryObjectFactory;

impl ObjectFactory for MemoryObjectFactory {
    fn create(&self, object_type: ObjectType, subtype: SubType, _args: &CreateArgs) -> Result<SharedHandler> {
        log::trace!("creating in-memory {object_type:?} ({subtype:?})");
        Ok(MemoryObject::shared())
    }
}
