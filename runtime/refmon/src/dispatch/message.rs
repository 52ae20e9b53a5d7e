//! Kernel messages
//!
//! Every operation on an object is a [`Message`]: a type, an integer value
//! (attribute id, item type, mechanism, ...) and a typed payload. Results
//! come back as a [`MessageData`] as well.

use crate::acl::key_mgmt::{KeyIdType, KeyMgmtFlags};
use crate::acl::AccessOp;
use crate::attr_id::AttributeId;
use crate::objects::ObjectHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    // Object lifecycle
    Destroy,
    IncRefCount,
    DecRefCount,
    GetDependent,
    SetDependent,
    Clone,

    // Attributes
    GetAttribute,
    GetAttributeS,
    SetAttribute,
    SetAttributeS,
    DeleteAttribute,

    // General object operations
    Compare,
    Check,
    SelfTest,
    ChangeNotify,

    // Contexts
    CtxEncrypt,
    CtxDecrypt,
    CtxSign,
    CtxSigCheck,
    CtxHash,
    CtxGenKey,

    // Certificates
    CrtSign,
    CrtSigCheck,
    CrtExport,

    // Devices
    DevQueryCapability,
    DevExport,
    DevImport,
    DevSign,
    DevSigCheck,
    DevDerive,
    DevCreateObject,

    // Envelopes and sessions
    EnvPushData,
    EnvPopData,

    // Keysets
    KeyGetKey,
    KeySetKey,
    KeyDeleteKey,
    KeyGetFirstCert,
    KeyGetNextCert,
    KeyCertMgmt,

    // Users
    UserUserMgmt,
    UserTrustMgmt,
}

impl MessageType {
    pub const COUNT: usize = 41;

    pub const ALL: [MessageType; Self::COUNT] = [
        MessageType::Destroy,
        MessageType::IncRefCount,
        MessageType::DecRefCount,
        MessageType::GetDependent,
        MessageType::SetDependent,
        MessageType::Clone,
        MessageType::GetAttribute,
        MessageType::GetAttributeS,
        MessageType::SetAttribute,
        MessageType::SetAttributeS,
        MessageType::DeleteAttribute,
        MessageType::Compare,
        MessageType::Check,
        MessageType::SelfTest,
        MessageType::ChangeNotify,
        MessageType::CtxEncrypt,
        MessageType::CtxDecrypt,
        MessageType::CtxSign,
        MessageType::CtxSigCheck,
        MessageType::CtxHash,
        MessageType::CtxGenKey,
        MessageType::CrtSign,
        MessageType::CrtSigCheck,
        MessageType::CrtExport,
        MessageType::DevQueryCapability,
        MessageType::DevExport,
        MessageType::DevImport,
        MessageType::DevSign,
        MessageType::DevSigCheck,
        MessageType::DevDerive,
        MessageType::DevCreateObject,
        MessageType::EnvPushData,
        MessageType::EnvPopData,
        MessageType::KeyGetKey,
        MessageType::KeySetKey,
        MessageType::KeyDeleteKey,
        MessageType::KeyGetFirstCert,
        MessageType::KeyGetNextCert,
        MessageType::KeyCertMgmt,
        MessageType::UserUserMgmt,
        MessageType::UserTrustMgmt,
    ];

    /// Position in [`ALL`](Self::ALL) and in the handling table
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for messages that change an object's state.
    ///
    /// These are refused while another thread holds the object's advisory
    /// lock.
    pub const fn is_mutating(self) -> bool {
        !matches!(
            self,
            MessageType::GetAttribute
                | MessageType::GetAttributeS
                | MessageType::Compare
                | MessageType::Check
                | MessageType::GetDependent
                | MessageType::KeyGetKey
                | MessageType::KeyGetFirstCert
                | MessageType::KeyGetNextCert
                | MessageType::DevQueryCapability
                | MessageType::IncRefCount
        )
    }

    /// Attribute access performed by an attribute message, and whether it
    /// is the string-valued form
    pub const fn attribute_op(self) -> Option<(AccessOp, bool)> {
        match self {
            MessageType::GetAttribute => Some((AccessOp::Read, false)),
            MessageType::GetAttributeS => Some((AccessOp::Read, true)),
            MessageType::SetAttribute => Some((AccessOp::Write, false)),
            MessageType::SetAttributeS => Some((AccessOp::Write, true)),
            MessageType::DeleteAttribute => Some((AccessOp::Delete, false)),
            _ => None,
        }
    }
}

/// Parameters of a key management message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyMgmtInfo {
    pub id_type: KeyIdType,
    pub id: Vec<u8>,
    /// Password or other auxiliary data
    pub aux: Option<Vec<u8>>,
    pub flags: KeyMgmtFlags,
    /// Object stored on a write, or returned on a read
    pub object: Option<ObjectHandle>,
    /// Cursor state for get-first/get-next queries
    pub state: Option<i32>,
}

impl KeyMgmtInfo {
    pub fn with_id(id_type: KeyIdType, id: &[u8]) -> Self {
        Self {
            id_type,
            id: id.to_vec(),
            ..Self::default()
        }
    }

    pub fn aux(mut self, aux: &[u8]) -> Self {
        self.aux = Some(aux.to_vec());
        self
    }

    pub fn object(mut self, object: ObjectHandle) -> Self {
        self.object = Some(object);
        self
    }
}

/// One parameter of a mechanism message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MechanismParam {
    Int(i32),
    /// Buffer; `None` when the caller only wants the length
    Bytes(Option<Vec<u8>>),
    Object(Option<ObjectHandle>),
}

impl MechanismParam {
    /// True for a parameter that carries nothing
    pub fn is_empty(&self) -> bool {
        matches!(
            self,
            MechanismParam::Int(0) | MechanismParam::Bytes(None) | MechanismParam::Object(None)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MechanismInfo {
    pub params: Vec<MechanismParam>,
}

/// Parameters of a certificate management message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CertMgmtInfo {
    pub ca_key: Option<ObjectHandle>,
    pub request: Option<ObjectHandle>,
    /// Certificate produced by the operation
    pub result: Option<ObjectHandle>,
}

/// Arguments of a create-object message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateArgs {
    pub arg1: i32,
    pub arg2: i32,
    pub str1: Option<Vec<u8>>,
    pub str2: Option<Vec<u8>>,
    /// User the new object belongs to
    pub owner: Option<ObjectHandle>,
}

/// Message payload, and message result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MessageData {
    #[default]
    None,
    Int(i32),
    Handle(ObjectHandle),
    Bytes(Vec<u8>),
    /// Seconds since the epoch
    Time(i64),
    Key(KeyMgmtInfo),
    Mechanism(MechanismInfo),
    CertMgmt(CertMgmtInfo),
    Create(CreateArgs),
}

impl MessageData {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            MessageData::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<ObjectHandle> {
        match self {
            MessageData::Handle(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MessageData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    pub value: i32,
    pub data: MessageData,
    /// Already passed on once to a dependent object
    pub(crate) forwarded: bool,
}

impl Message {
    pub fn new(kind: MessageType, value: i32, data: MessageData) -> Self {
        Self {
            kind,
            value,
            data,
            forwarded: false,
        }
    }

    /// A message carrying only its type
    pub fn bare(kind: MessageType) -> Self {
        Self::new(kind, 0, MessageData::None)
    }

    pub fn get_attribute(attribute: AttributeId) -> Self {
        Self::new(MessageType::GetAttribute, attribute.0, MessageData::None)
    }

    pub fn get_attribute_s(attribute: AttributeId) -> Self {
        Self::new(MessageType::GetAttributeS, attribute.0, MessageData::None)
    }

    pub fn set_attribute(attribute: AttributeId, value: i32) -> Self {
        Self::new(MessageType::SetAttribute, attribute.0, MessageData::Int(value))
    }

    pub fn set_attribute_object(attribute: AttributeId, object: ObjectHandle) -> Self {
        Self::new(MessageType::SetAttribute, attribute.0, MessageData::Handle(object))
    }

    pub fn set_attribute_s(attribute: AttributeId, value: &[u8]) -> Self {
        Self::new(MessageType::SetAttributeS, attribute.0, MessageData::Bytes(value.to_vec()))
    }

    pub fn set_attribute_time(attribute: AttributeId, time: i64) -> Self {
        Self::new(MessageType::SetAttributeS, attribute.0, MessageData::Time(time))
    }

    pub fn delete_attribute(attribute: AttributeId) -> Self {
        Self::new(MessageType::DeleteAttribute, attribute.0, MessageData::None)
    }

    pub fn attribute(&self) -> AttributeId {
        AttributeId(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_position() {
        for (index, kind) in MessageType::ALL.iter().enumerate() {
            assert_eq!(kind.index(), index);
        }
    }

    #[test]
    fn test_read_only_messages() {
        assert!(!MessageType::GetAttribute.is_mutating());
        assert!(!MessageType::Check.is_mutating());
        assert!(MessageType::SetAttribute.is_mutating());
        assert!(MessageType::Destroy.is_mutating());
        assert!(MessageType::CtxEncrypt.is_mutating());
    }

    #[test]
    fn test_attribute_ops() {
        assert_eq!(MessageType::SetAttributeS.attribute_op(), Some((AccessOp::Write, true)));
        assert_eq!(MessageType::DeleteAttribute.attribute_op(), Some((AccessOp::Delete, false)));
        assert_eq!(MessageType::Compare.attribute_op(), None);
    }

    #[test]
    fn test_empty_mechanism_params() {
        assert!(MechanismParam::Bytes(None).is_empty());
        assert!(MechanismParam::Int(0).is_empty());
        assert!(!MechanismParam::Int(3).is_empty());
        assert!(!MechanismParam::Bytes(Some(Vec::new())).is_empty());
    }
}
