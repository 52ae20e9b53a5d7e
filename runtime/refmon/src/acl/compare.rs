//! Compare-message ACL
//!
//! Each compare kind names the object type that answers it, the subtypes
//! that carry the compared value, and the shape of the value sent along.
//! Only objects in the high state hold anything to compare against.

use crate::dispatch::MessageData;
use crate::error::internal_error;
use crate::limits::{KEYID_SIZE, MAX_ATTRIBUTE_SIZE, MAX_HASHSIZE, MIN_HASHSIZE, MIN_NAME_LENGTH, PGP_KEYID_SIZE};
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};
use crate::objects::{ObjectHandle, ObjectTable};
use crate::sync::ThreadToken;
use crate::{KernelError, Result};

use super::types::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CompareKind {
    Hash = 1,
    KeyId = 2,
    KeyIdPgp = 3,
    KeyIdOpenPgp = 4,
    Subject = 5,
    IssuerAndSerialNumber = 6,
    Fingerprint = 7,
    /// Compare against another certificate object
    CertObj = 8,
}

impl CompareKind {
    pub const ALL: [CompareKind; 8] = [
        CompareKind::Hash,
        CompareKind::KeyId,
        CompareKind::KeyIdPgp,
        CompareKind::KeyIdOpenPgp,
        CompareKind::Subject,
        CompareKind::IssuerAndSerialNumber,
        CompareKind::Fingerprint,
        CompareKind::CertObj,
    ];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| *kind as i32 == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareValue {
    /// Byte string with inclusive length bounds
    Bytes { min: i32, max: i32 },
    /// Handle of a signed certificate
    Certificate,
}

#[derive(Debug, Clone, Copy)]
pub struct CompareAcl {
    pub kind: CompareKind,
    pub object_type: ObjectType,
    pub subtypes: SubTypeA,
    pub value: CompareValue,
}

const CERTS: SubTypeA = SubTypeA::CERT_ANY_CERT.union(SubTypeA::CERT_ATTRCERT).union(SubTypeA::CERT_CRL);

/// One entry per compare kind, in kind order
pub static COMPARE_ACL: [CompareAcl; 8] = [
    CompareAcl {
        kind: CompareKind::Hash,
        object_type: ObjectType::Context,
        subtypes: SubTypeA::CTX_HASH.union(SubTypeA::CTX_MAC),
        value: CompareValue::Bytes { min: MIN_HASHSIZE, max: MAX_HASHSIZE },
    },
    CompareAcl {
        kind: CompareKind::KeyId,
        object_type: ObjectType::Context,
        subtypes: SubTypeA::CTX_PKC,
        value: CompareValue::Bytes { min: KEYID_SIZE, max: KEYID_SIZE },
    },
    CompareAcl {
        kind: CompareKind::KeyIdPgp,
        object_type: ObjectType::Context,
        subtypes: SubTypeA::CTX_PKC,
        value: CompareValue::Bytes { min: PGP_KEYID_SIZE, max: PGP_KEYID_SIZE },
    },
    CompareAcl {
        kind: CompareKind::KeyIdOpenPgp,
        object_type: ObjectType::Context,
        subtypes: SubTypeA::CTX_PKC,
        value: CompareValue::Bytes { min: PGP_KEYID_SIZE, max: PGP_KEYID_SIZE },
    },
    CompareAcl {
        kind: CompareKind::Subject,
        object_type: ObjectType::Certificate,
        subtypes: CERTS,
        value: CompareValue::Bytes { min: MIN_NAME_LENGTH, max: MAX_ATTRIBUTE_SIZE },
    },
    CompareAcl {
        kind: CompareKind::IssuerAndSerialNumber,
        object_type: ObjectType::Certificate,
        subtypes: CERTS,
        value: CompareValue::Bytes { min: MIN_NAME_LENGTH, max: MAX_ATTRIBUTE_SIZE },
    },
    CompareAcl {
        kind: CompareKind::Fingerprint,
        object_type: ObjectType::Certificate,
        subtypes: CERTS,
        value: CompareValue::Bytes { min: MIN_HASHSIZE, max: MAX_HASHSIZE },
    },
    CompareAcl {
        kind: CompareKind::CertObj,
        object_type: ObjectType::Certificate,
        subtypes: CERTS,
        value: CompareValue::Certificate,
    },
];

fn acl_for(kind: i32) -> Result<&'static CompareAcl> {
    CompareKind::from_raw(kind)
        .map(|kind| &COMPARE_ACL[kind as usize - 1])
        .ok_or(KernelError::ArgValue)
}

/// Object type a compare of `kind` is routed to
pub fn compare_route(kind: i32) -> Result<Route> {
    acl_for(kind).map(|acl| Route::Object(acl.object_type))
}

/// Check a compare request against the routed target
pub fn check_compare_param(
    objects: &ObjectTable,
    target: ObjectHandle,
    kind: i32,
    data: &MessageData,
    internal: bool,
    thread: ThreadToken,
) -> Result<()> {
    let acl = acl_for(kind)?;
    let record = objects.lookup(target)?;
    if !SubTypeSet::a(acl.subtypes).contains(record.subtype) {
        return Err(KernelError::ArgObject);
    }
    if !record.is_high() {
        return Err(KernelError::NotInited);
    }

    match (acl.value, data) {
        (CompareValue::Bytes { min, max }, MessageData::Bytes(bytes)) => {
            if !i32::try_from(bytes.len()).is_ok_and(|len| (min..=max).contains(&len)) {
                return Err(KernelError::ArgStr1);
            }
        }
        (CompareValue::Bytes { .. }, _) => return Err(KernelError::ArgStr1),
        (CompareValue::Certificate, MessageData::Handle(other)) => {
            let usable = objects.get(*other).is_some_and(|value| {
                !value.in_invalid_state()
                    && (internal || (!value.is_internal() && value.accessible_by(thread)))
                    && value.object_type == ObjectType::Certificate
                    && value.is_high()
            });
            if !usable {
                return Err(KernelError::ArgNum1);
            }
        }
        (CompareValue::Certificate, _) => return Err(KernelError::ArgNum1),
    }
    Ok(())
}

/// Init-time consistency check of the compare ACL
pub fn check_tables() -> Result<()> {
    for (index, acl) in COMPARE_ACL.iter().enumerate() {
        if acl.kind as usize != index + 1 {
            log::error!("compare ACL entry {index} is out of order");
            internal_error!("compare ACL out of order");
        }
        let family = match acl.object_type {
            ObjectType::Context => SubTypeA::CTX_ANY,
            ObjectType::Certificate => SubTypeA::CERT_ANY,
            _ => SubTypeA::empty(),
        };
        let value_ok = match acl.value {
            CompareValue::Bytes { min, max } => min > 0 && min <= max,
            CompareValue::Certificate => acl.object_type == ObjectType::Certificate,
        };
        if acl.subtypes.is_empty() || !family.contains(acl.subtypes) || !value_ok {
            log::error!("compare ACL for {:?} is inconsistent", acl.kind);
            internal_error!("inconsistent compare ACL");
        }
    }
    log::debug!("compare ACL verified");
    Ok(())
}
