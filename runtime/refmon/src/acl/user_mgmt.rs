//! User and trust management ACLs

use crate::object_type::{SubTypeA, SubTypeC, SubTypeSet};
use crate::objects::{ObjectHandle, ObjectTable};
use crate::sync::ThreadToken;
use crate::{KernelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum UserAction {
    /// Wipe all stored state and shut the kernel down
    Zeroise = 1,
}

impl UserAction {
    pub fn from_raw(value: i32) -> Option<Self> {
        (value == UserAction::Zeroise as i32).then_some(UserAction::Zeroise)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TrustAction {
    Query = 1,
    Add = 2,
    Delete = 3,
    /// Find the trusted issuer of a certificate
    GetIssuer = 4,
}

impl TrustAction {
    pub const ALL: [TrustAction; 4] = [TrustAction::Query, TrustAction::Add, TrustAction::Delete, TrustAction::GetIssuer];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|action| *action as i32 == value)
    }
}

/// Only the security officer may zeroise
pub fn check_user_mgmt_access(objects: &ObjectTable, user: ObjectHandle, action: i32) -> Result<UserAction> {
    let action = UserAction::from_raw(action).ok_or(KernelError::ArgValue)?;
    let record = objects.lookup(user)?;
    if !SubTypeSet::c(SubTypeC::USER_SO).contains(record.subtype) {
        return Err(KernelError::Permission);
    }
    Ok(action)
}

/// Check the certificate passed with a trust management request
pub fn check_trust_mgmt_access(
    objects: &ObjectTable,
    certificate: ObjectHandle,
    action: i32,
    internal: bool,
    thread: ThreadToken,
) -> Result<TrustAction> {
    let action = TrustAction::from_raw(action).ok_or(KernelError::ArgValue)?;
    let Some(record) = objects.get(certificate) else {
        return Err(KernelError::ArgNum1);
    };
    let usable = !record.in_invalid_state()
        && (internal || (!record.is_internal() && record.accessible_by(thread)))
        && SubTypeSet::a(SubTypeA::CERT_CERT | SubTypeA::CERT_CERTCHAIN).contains(record.subtype);
    // Only signed certificates can be made trusted
    if !usable || (action == TrustAction::Add && !record.is_high()) {
        return Err(KernelError::ArgNum1);
    }
    Ok(action)
}
