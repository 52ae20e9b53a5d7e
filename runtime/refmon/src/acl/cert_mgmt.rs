//! Certificate management ACL
//!
//! Certificate store operations (issuing, revoking, expiring, request
//! handling) each name whether they need a CA key and whether they need a
//! request object, and what that request must look like. The target is
//! always a certificate store keyset.

use crate::dispatch::CertMgmtInfo;
use crate::error::internal_error;
use crate::object_type::{ObjectType, SubTypeA, SubTypeB, SubTypeSet};
use crate::objects::{find_target_type, ObjectHandle, ObjectTable};
use crate::sync::ThreadToken;
use crate::{KernelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CertAction {
    IssueCert = 1,
    IssueCrl = 2,
    RevokeCert = 3,
    ExpireCert = 4,
    Cleanup = 5,
    CertCreation = 6,
    CertCreationComplete = 7,
    CertCreationDrop = 8,
    CertCreationReverse = 9,
    RequestCert = 10,
    RequestRenewal = 11,
    RequestRevocation = 12,
}

impl CertAction {
    pub const ALL: [CertAction; 12] = [
        CertAction::IssueCert,
        CertAction::IssueCrl,
        CertAction::RevokeCert,
        CertAction::ExpireCert,
        CertAction::Cleanup,
        CertAction::CertCreation,
        CertAction::CertCreationComplete,
        CertAction::CertCreationDrop,
        CertAction::CertCreationReverse,
        CertAction::RequestCert,
        CertAction::RequestRenewal,
        CertAction::RequestRevocation,
    ];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|action| *action as i32 == value)
    }
}

/// Whether a message parameter must, may or must not be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Absent,
}

#[derive(Debug, Clone, Copy)]
pub struct CertMgmtAcl {
    pub action: CertAction,
    /// Only the kernel and backends may ask for this
    pub internal_only: bool,
    pub ca_key: Presence,
    pub request: Presence,
    /// Subtypes the request may have, empty when no request is taken
    pub request_subtypes: SubTypeA,
    /// The request must be signed (high state)
    pub request_high: bool,
}

const fn acl(
    action: CertAction,
    internal_only: bool,
    ca_key: Presence,
    request_subtypes: SubTypeA,
    request_high: bool,
) -> CertMgmtAcl {
    CertMgmtAcl {
        action,
        internal_only,
        ca_key,
        request: if request_subtypes.is_empty() {
            Presence::Absent
        } else {
            Presence::Required
        },
        request_subtypes,
        request_high,
    }
}

const CERT_REQUESTS: SubTypeA = SubTypeA::CERT_CERTREQ.union(SubTypeA::CERT_REQ_CERT);
const NO_REQUEST: SubTypeA = SubTypeA::empty();

/// One entry per action, in action order
pub static CERT_MGMT_ACL: [CertMgmtAcl; 12] = [
    acl(CertAction::IssueCert, false, Presence::Required, CERT_REQUESTS, true),
    acl(CertAction::IssueCrl, false, Presence::Required, NO_REQUEST, false),
    acl(CertAction::RevokeCert, false, Presence::Required, SubTypeA::CERT_REQ_REV, true),
    acl(CertAction::ExpireCert, true, Presence::Absent, NO_REQUEST, false),
    acl(CertAction::Cleanup, true, Presence::Absent, NO_REQUEST, false),
    acl(CertAction::CertCreation, true, Presence::Required, CERT_REQUESTS, true),
    acl(CertAction::CertCreationComplete, true, Presence::Absent, SubTypeA::CERT_CERT, true),
    acl(CertAction::CertCreationDrop, true, Presence::Absent, SubTypeA::CERT_CERT, true),
    acl(CertAction::CertCreationReverse, true, Presence::Absent, SubTypeA::CERT_CERT, true),
    acl(CertAction::RequestCert, false, Presence::Absent, CERT_REQUESTS, true),
    acl(CertAction::RequestRenewal, false, Presence::Absent, SubTypeA::CERT_REQ_CERT, true),
    acl(CertAction::RequestRevocation, false, Presence::Absent, SubTypeA::CERT_REQ_REV, true),
];

/// Check a certificate management request sent to `keyset`
pub fn check_cert_mgmt(
    objects: &ObjectTable,
    keyset: ObjectHandle,
    action: i32,
    info: &CertMgmtInfo,
    internal: bool,
    thread: ThreadToken,
) -> Result<()> {
    let acl = CertAction::from_raw(action)
        .map(|action| &CERT_MGMT_ACL[action as usize - 1])
        .ok_or(KernelError::ArgValue)?;
    if acl.internal_only && !internal {
        return Err(KernelError::ArgValue);
    }

    let store = objects.lookup(keyset)?;
    if !SubTypeSet::b(SubTypeB::KEYSET_DBMS_STORE).contains(store.subtype) {
        return Err(KernelError::ArgObject);
    }

    match (acl.ca_key, info.ca_key) {
        (Presence::Required, Some(ca_key)) => {
            if !ca_key_ok(objects, keyset, ca_key, internal, thread) {
                return Err(KernelError::ArgNum1);
            }
        }
        (Presence::Required, None) | (Presence::Absent, Some(_)) => return Err(KernelError::ArgNum1),
        (Presence::Absent, None) => {}
    }

    match (acl.request, info.request) {
        (Presence::Required, Some(request)) => {
            if !request_ok(objects, keyset, acl, request, internal, thread) {
                return Err(KernelError::ArgNum2);
            }
        }
        (Presence::Required, None) | (Presence::Absent, Some(_)) => return Err(KernelError::ArgNum2),
        (Presence::Absent, None) => {}
    }
    Ok(())
}

fn usable(objects: &ObjectTable, keyset: ObjectHandle, handle: ObjectHandle, internal: bool, thread: ThreadToken) -> bool {
    let Some(record) = objects.get(handle) else {
        return false;
    };
    !record.in_invalid_state()
        && (internal || (!record.is_internal() && record.accessible_by(thread)))
        && objects.same_owner(keyset, handle)
}

/// A CA key is a signing-capable PKC context with a CA certificate attached
fn ca_key_ok(objects: &ObjectTable, keyset: ObjectHandle, ca_key: ObjectHandle, internal: bool, thread: ThreadToken) -> bool {
    if !usable(objects, keyset, ca_key, internal, thread) {
        return false;
    }
    let context = find_target_type(objects, ca_key, ObjectType::Context).and_then(|h| objects.get(h));
    let certificate = find_target_type(objects, ca_key, ObjectType::Certificate).and_then(|h| objects.get(h));
    match (context, certificate) {
        (Some(context), Some(certificate)) => {
            SubTypeSet::a(SubTypeA::CTX_PKC).contains(context.subtype)
                && context.is_high()
                && SubTypeSet::a(SubTypeA::CERT_CERT | SubTypeA::CERT_CERTCHAIN).contains(certificate.subtype)
                && certificate.is_high()
        }
        _ => false,
    }
}

fn request_ok(
    objects: &ObjectTable,
    keyset: ObjectHandle,
    acl: &CertMgmtAcl,
    request: ObjectHandle,
    internal: bool,
    thread: ThreadToken,
) -> bool {
    if !usable(objects, keyset, request, internal, thread) {
        return false;
    }
    objects.get(request).is_some_and(|record| {
        SubTypeSet::a(acl.request_subtypes).contains(record.subtype) && (!acl.request_high || record.is_high())
    })
}

/// Init-time consistency check of the certificate management ACL
pub fn check_tables() -> Result<()> {
    for (index, acl) in CERT_MGMT_ACL.iter().enumerate() {
        if acl.action as usize != index + 1 {
            log::error!("cert management ACL entry {index} is out of order");
            internal_error!("cert management ACL out of order");
        }
        let request_taken = !acl.request_subtypes.is_empty();
        if request_taken && !SubTypeA::CERT_ANY.contains(acl.request_subtypes) {
            log::error!("cert management ACL for {:?} accepts a non-certificate request", acl.action);
            internal_error!("inconsistent cert management ACL");
        }
        if acl.request == Presence::Required && !request_taken {
            log::error!("cert management ACL for {:?} requires a request of no type", acl.action);
            internal_error!("inconsistent cert management ACL");
        }
    }
    log::debug!("cert management ACL verified");
    Ok(())
}
