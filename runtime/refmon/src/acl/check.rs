//! Check-message ACL
//!
//! A check asks whether an object is usable for some purpose ("can this
//! key sign?"). Keys usually come as a context with a certificate bound to
//! it, so each check kind describes what is required of the context and of
//! the certificate separately. The object the message was sent to is
//! checked first; once its own handler is satisfied the message is
//! forwarded once to the bound object so that both halves are checked.

use crate::error::internal_error;
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};
use crate::objects::{Action, ObjectHandle, ObjectRecord, ObjectTable};
use crate::{KernelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CheckKind {
    Pkc = 1,
    PkcPrivate = 2,
    PkcEncrypt = 3,
    PkcDecrypt = 4,
    PkcSigCheck = 5,
    PkcSign = 6,
    Crypt = 7,
    Hash = 8,
    Mac = 9,
    KeyGen = 10,
    /// Key and certificate usable as a CA
    Ca = 11,
    Cert = 12,
}

impl CheckKind {
    pub const ALL: [CheckKind; 12] = [
        CheckKind::Pkc,
        CheckKind::PkcPrivate,
        CheckKind::PkcEncrypt,
        CheckKind::PkcDecrypt,
        CheckKind::PkcSigCheck,
        CheckKind::PkcSign,
        CheckKind::Crypt,
        CheckKind::Hash,
        CheckKind::Mac,
        CheckKind::KeyGen,
        CheckKind::Ca,
        CheckKind::Cert,
    ];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| *kind as i32 == value)
    }
}

/// Object state a check phase accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Any,
    High,
    Low,
}

impl CheckState {
    fn accepts(self, high: bool) -> bool {
        match self {
            CheckState::Any => true,
            CheckState::High => high,
            CheckState::Low => !high,
        }
    }
}

/// Requirements on one half of a key
#[derive(Debug, Clone, Copy)]
pub struct CheckPhase {
    pub subtypes: SubTypeA,
    pub state: CheckState,
    /// Action the object must still be able to perform
    pub action: Option<Action>,
}

#[derive(Debug, Clone, Copy)]
pub struct CheckAcl {
    pub kind: CheckKind,
    pub context: Option<CheckPhase>,
    pub certificate: Option<CheckPhase>,
}

const fn ctx(subtypes: SubTypeA, state: CheckState, action: Option<Action>) -> Option<CheckPhase> {
    Some(CheckPhase { subtypes, state, action })
}

const fn signed_cert(subtypes: SubTypeA) -> Option<CheckPhase> {
    Some(CheckPhase { subtypes, state: CheckState::High, action: None })
}

const PKC: SubTypeA = SubTypeA::CTX_PKC;
const CERTS: SubTypeA = SubTypeA::CERT_ANY_CERT;
const CA_CERTS: SubTypeA = SubTypeA::CERT_CERT.union(SubTypeA::CERT_CERTCHAIN);
const KEYABLE: SubTypeA = SubTypeA::CTX_CONV.union(SubTypeA::CTX_PKC).union(SubTypeA::CTX_MAC);

/// One entry per check kind, in kind order
pub static CHECK_ACL: [CheckAcl; 12] = [
    CheckAcl { kind: CheckKind::Pkc, context: ctx(PKC, CheckState::Any, None), certificate: signed_cert(CERTS) },
    CheckAcl {
        kind: CheckKind::PkcPrivate,
        context: ctx(PKC, CheckState::High, None),
        certificate: signed_cert(CERTS),
    },
    CheckAcl {
        kind: CheckKind::PkcEncrypt,
        context: ctx(PKC, CheckState::High, Some(Action::Encrypt)),
        certificate: signed_cert(CERTS),
    },
    CheckAcl {
        kind: CheckKind::PkcDecrypt,
        context: ctx(PKC, CheckState::High, Some(Action::Decrypt)),
        certificate: signed_cert(CERTS),
    },
    CheckAcl {
        kind: CheckKind::PkcSigCheck,
        context: ctx(PKC, CheckState::High, Some(Action::SigCheck)),
        certificate: signed_cert(CERTS),
    },
    CheckAcl {
        kind: CheckKind::PkcSign,
        context: ctx(PKC, CheckState::High, Some(Action::Sign)),
        certificate: signed_cert(CERTS),
    },
    CheckAcl {
        kind: CheckKind::Crypt,
        context: ctx(SubTypeA::CTX_CONV, CheckState::High, Some(Action::Encrypt)),
        certificate: None,
    },
    CheckAcl {
        kind: CheckKind::Hash,
        context: ctx(SubTypeA::CTX_HASH, CheckState::Any, Some(Action::Hash)),
        certificate: None,
    },
    CheckAcl {
        kind: CheckKind::Mac,
        context: ctx(SubTypeA::CTX_MAC, CheckState::High, Some(Action::Hash)),
        certificate: None,
    },
    CheckAcl {
        kind: CheckKind::KeyGen,
        context: ctx(KEYABLE, CheckState::Low, Some(Action::GenKey)),
        certificate: None,
    },
    CheckAcl {
        kind: CheckKind::Ca,
        context: ctx(PKC, CheckState::High, Some(Action::Sign)),
        certificate: signed_cert(CA_CERTS),
    },
    CheckAcl { kind: CheckKind::Cert, context: ctx(PKC, CheckState::Any, None), certificate: signed_cert(CERTS) },
];

fn acl_for(kind: i32) -> Result<&'static CheckAcl> {
    CheckKind::from_raw(kind)
        .map(|kind| &CHECK_ACL[kind as usize - 1])
        .ok_or(KernelError::ArgValue)
}

fn phase_for(acl: &CheckAcl, object_type: ObjectType) -> Option<&CheckPhase> {
    match object_type {
        ObjectType::Context => acl.context.as_ref(),
        ObjectType::Certificate => acl.certificate.as_ref(),
        _ => None,
    }
}

fn phase_ok(phase: &CheckPhase, record: &ObjectRecord) -> bool {
    SubTypeSet::a(phase.subtypes).contains(record.subtype)
        && phase.state.accepts(record.is_high())
        && phase
            .action
            .map_or(true, |action| record.action_perms.check(action, true).is_ok())
}

/// Check that `target` can serve as the half of a key it claims to be
pub fn check_check_param(objects: &ObjectTable, target: ObjectHandle, kind: i32) -> Result<()> {
    let acl = acl_for(kind)?;
    let record = objects.lookup(target)?;
    match phase_for(acl, record.object_type) {
        Some(phase) if phase_ok(phase, record) => Ok(()),
        _ => Err(KernelError::ArgObject),
    }
}

/// Object the check should be forwarded to after the target has passed
/// it, if the key has a second half that the check covers
pub fn forward_target(objects: &ObjectTable, target: ObjectHandle, kind: i32) -> Option<ObjectHandle> {
    let acl = acl_for(kind).ok()?;
    let dependent = objects.get(target)?.dependent_object?;
    let dependent_type = objects.get(dependent)?.object_type;
    phase_for(acl, dependent_type).map(|_| dependent)
}

/// Init-time consistency check of the check ACL
pub fn check_tables() -> Result<()> {
    for (index, acl) in CHECK_ACL.iter().enumerate() {
        if acl.kind as usize != index + 1 {
            log::error!("check ACL entry {index} is out of order");
            internal_error!("check ACL out of order");
        }
        let context_ok = acl.context.map_or(true, |p| !p.subtypes.is_empty() && SubTypeA::CTX_ANY.contains(p.subtypes));
        let cert_ok = acl
            .certificate
            .map_or(true, |p| !p.subtypes.is_empty() && SubTypeA::CERT_ANY.contains(p.subtypes) && p.action.is_none());
        if !context_ok || !cert_ok || (acl.context.is_none() && acl.certificate.is_none()) {
            log::error!("check ACL for {:?} is inconsistent", acl.kind);
            internal_error!("inconsistent check ACL");
        }
    }
    log::debug!("check ACL verified");
    Ok(())
}
