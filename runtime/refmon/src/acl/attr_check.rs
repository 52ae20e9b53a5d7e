//! Attribute access checks
//!
//! Runs against the *routed* target, after the dispatcher has found the ACL
//! entry and moved the message to the object type the entry names. The
//! order of the checks decides which error a caller sees when several
//! things are wrong at once:
//!
//! 1. resolve a subtype-dependent entry to its child
//! 2. the target's subtype must carry the attribute
//! 3. the caller needs the permission bit for the operation and state
//! 4. the message kind (numeric or string) must match the value kind
//! 5. the proposed value must be in range

use super::lookup::resolve_sub_acl;
use super::perm::{AccessFlags, AccessOp};
use super::range::{check_length, check_numeric};
use super::types::{AttributeAcl, ObjectAcl, ObjectAclFlags, ValueKind};
use crate::error::internal_error;
use crate::limits::MIN_TIME_VALUE;
use crate::object_type::ObjectType;
use crate::objects::{find_target_type, ObjectHandle, ObjectTable};
use crate::sync::ThreadToken;
use crate::{KernelError, Result};

/// Value carried by an attribute message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// Reads and deletes carry nothing
    None,
    Int(i32),
    Object(ObjectHandle),
    Bytes(&'a [u8]),
    Time(i64),
}

/// One attribute operation as seen by the ACL check
#[derive(Debug, Clone, Copy)]
pub struct AttributeRequest<'a> {
    pub op: AccessOp,
    /// Sent as a string-valued message rather than a numeric one
    pub string_message: bool,
    pub value: AttributeValue<'a>,
    pub internal: bool,
    pub thread: ThreadToken,
}

/// Check an attribute operation against its ACL entry.
///
/// Returns the entry that actually applied, which differs from `acl` for
/// subtype-dependent attributes.
pub fn check_attribute_access(
    objects: &ObjectTable,
    target: ObjectHandle,
    acl: &'static AttributeAcl,
    request: &AttributeRequest<'_>,
) -> Result<&'static AttributeAcl> {
    let record = objects.lookup(target)?;

    let acl = if acl.kind == ValueKind::Special {
        resolve_sub_acl(acl, record.subtype).ok_or(KernelError::ArgValue)?
    } else {
        acl
    };

    if !acl.is_property() && !acl.subtypes.contains(record.subtype) {
        return Err(KernelError::ArgValue);
    }

    let required = AccessFlags::required(request.op, record.is_high(), request.internal);
    if !acl.access.contains(required) {
        // Internal-only attributes don't exist as far as outsiders know
        if !request.internal && !acl.access.has_external() {
            return Err(KernelError::ArgValue);
        }
        return Err(KernelError::Permission);
    }
    if request.op == AccessOp::Delete {
        return Ok(acl);
    }

    let kind_matches = if request.string_message {
        matches!(acl.kind, ValueKind::String | ValueKind::WideString | ValueKind::Time)
    } else {
        matches!(acl.kind, ValueKind::Boolean | ValueKind::Numeric | ValueKind::Object)
    };
    if !kind_matches {
        return Err(KernelError::ArgValue);
    }
    if request.op == AccessOp::Read {
        return Ok(acl);
    }

    match (acl.kind, request.value) {
        (ValueKind::Boolean | ValueKind::Numeric, AttributeValue::Int(value)) => {
            if !check_numeric(&acl.range, value) {
                return Err(KernelError::ArgNum1);
            }
        }
        (ValueKind::Boolean | ValueKind::Numeric, _) => return Err(KernelError::ArgNum1),
        (ValueKind::Object, AttributeValue::Object(handle)) => {
            let super::types::RangeSpec::Object(object_acl) = acl.range else {
                internal_error!("object attribute without an object ACL");
            };
            check_object_value(objects, target, &object_acl, handle, request)?;
        }
        (ValueKind::Object, _) => return Err(KernelError::ArgNum1),
        (ValueKind::String, AttributeValue::Bytes(bytes)) => {
            if !check_length(&acl.range, bytes.len()) {
                return Err(KernelError::ArgStr1);
            }
        }
        (ValueKind::WideString, AttributeValue::Bytes(bytes)) => {
            if bytes.len() % 2 != 0 || !check_length(&acl.range, bytes.len() / 2) {
                return Err(KernelError::ArgStr1);
            }
        }
        (ValueKind::Time, AttributeValue::Time(time)) => {
            if time <= MIN_TIME_VALUE {
                return Err(KernelError::ArgStr1);
            }
        }
        (ValueKind::String | ValueKind::WideString | ValueKind::Time, _) => {
            return Err(KernelError::ArgStr1)
        }
        (ValueKind::Special, _) => internal_error!("unresolved sub-ACL"),
    }
    Ok(acl)
}

/// Check an object passed as an attribute value
fn check_object_value(
    objects: &ObjectTable,
    target: ObjectHandle,
    object_acl: &ObjectAcl,
    handle: ObjectHandle,
    request: &AttributeRequest<'_>,
) -> Result<()> {
    let Some(value) = objects.get(handle) else {
        return Err(KernelError::ArgNum1);
    };
    if value.in_invalid_state() {
        return Err(KernelError::ArgNum1);
    }
    if !request.internal && (value.is_internal() || !value.accessible_by(request.thread)) {
        return Err(KernelError::ArgNum1);
    }
    if !objects.same_owner(target, handle) {
        return Err(KernelError::ArgNum1);
    }

    let checked = if object_acl.flags.contains(ObjectAclFlags::ROUTE_TO_CTX) {
        find_target_type(objects, handle, ObjectType::Context)
    } else if object_acl.flags.contains(ObjectAclFlags::ROUTE_TO_CERT) {
        find_target_type(objects, handle, ObjectType::Certificate)
    } else {
        Some(handle)
    };
    let Some(record) = checked.and_then(|h| objects.get(h)) else {
        return Err(KernelError::ArgNum1);
    };

    if !object_acl.subtypes.contains(record.subtype) || !object_acl.state_ok(record.is_high()) {
        return Err(KernelError::ArgNum1);
    }
    Ok(())
}
