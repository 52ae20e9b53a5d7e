//! Message handling table
//!
//! One entry per [`MessageType`], indexed by the type itself. An entry
//! tells the dispatcher where to route the message, which target subtypes
//! accept it, what shape its payload must have, and which checks run
//! before and after the object sees it.

use super::message::{MessageData, MessageType};
use crate::acl::key_mgmt::KeyAccess;
use crate::acl::mechanism::MechanismOp;
use crate::error::internal_error;
use crate::object_type::{ObjectType, SubTypeA, SubTypeB, SubTypeC, SubTypeSet};
use crate::objects::Action;
use crate::Result;

/// Where a message goes before it is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// To the object it was sent to
    None,
    /// Decided by the message value (the attribute or compare kind)
    Implicit,
    Fixed(ObjectType),
    /// Either type, whichever is found first along the dependency chain
    FixedAlt(ObjectType, ObjectType),
}

/// Payload a message must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    None,
    Int,
    Handle,
    HandleOpt,
    Bytes,
    BytesOpt,
    /// Numeric attribute value or object handle
    Value,
    /// String attribute value or time
    StringValue,
    /// Compared value: bytes or a handle
    Comparand,
    Key,
    Mechanism,
    CertMgmt,
    Create,
}

impl ParamShape {
    pub fn accepts(self, data: &MessageData) -> bool {
        matches!(
            (self, data),
            (ParamShape::None, MessageData::None)
                | (ParamShape::Int, MessageData::Int(_))
                | (ParamShape::Handle, MessageData::Handle(_))
                | (ParamShape::HandleOpt, MessageData::Handle(_) | MessageData::None)
                | (ParamShape::Bytes, MessageData::Bytes(_))
                | (ParamShape::BytesOpt, MessageData::Bytes(_) | MessageData::None)
                | (ParamShape::Value, MessageData::Int(_) | MessageData::Handle(_))
                | (ParamShape::StringValue, MessageData::Bytes(_) | MessageData::Time(_))
                | (ParamShape::Comparand, MessageData::Bytes(_) | MessageData::Handle(_))
                | (ParamShape::Key, MessageData::Key(_))
                | (ParamShape::Mechanism, MessageData::Mechanism(_))
                | (ParamShape::CertMgmt, MessageData::CertMgmt(_))
                | (ParamShape::Create, MessageData::Create(_))
        )
    }
}

/// Messages the kernel answers itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelHandler {
    IncRef,
    DecRef,
    GetDependent,
    SetDependent,
    Clone,
    SelfTest,
}

/// Check run after routing and before the object sees the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreHook {
    None,
    SignalDependentObjects,
    CheckAttributeAccess,
    CheckCompareParam,
    CheckCheckParam,
    CheckActionAccess(Action),
    /// Object must still be in the low state
    CheckState,
    /// Object must be low and the handle parameter a signing key
    CheckStateParamHandle,
    /// Optional handle parameter must be a usable object
    CheckParamHandleOpt,
    CheckExportAccess,
    CheckMechanism(MechanismOp),
    CheckCreate,
    CheckData,
    CheckKeysetAccess(KeyAccess),
    CheckCertMgmtAccess,
    CheckUserMgmtAccess,
    CheckTrustMgmtAccess,
}

/// Work done after the object has processed the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostHook {
    None,
    SignalDependentDevices,
    /// An object handed back to an external caller becomes visible
    MakeObjectExternal,
    /// A trigger attribute write moves the object to the high state
    ChangeStateOpt,
    ForwardToDependentObject,
    UpdateUsageCount,
    ChangeState,
    HandleZeroise,
}

#[derive(Debug, Clone, Copy)]
pub struct HandlingEntry {
    pub kind: MessageType,
    pub routing: Routing,
    pub subtypes: SubTypeSet,
    pub shape: ParamShape,
    pub internal_only: bool,
    pub handler: Option<KernelHandler>,
    pub pre: PreHook,
    pub post: PostHook,
}

impl HandlingEntry {
    const fn new(kind: MessageType, routing: Routing, subtypes: SubTypeSet, shape: ParamShape) -> Self {
        Self {
            kind,
            routing,
            subtypes,
            shape,
            internal_only: false,
            handler: None,
            pre: PreHook::None,
            post: PostHook::None,
        }
    }

    const fn internal(mut self) -> Self {
        self.internal_only = true;
        self
    }

    const fn kernel(mut self, handler: KernelHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    const fn pre(mut self, pre: PreHook) -> Self {
        self.pre = pre;
        self
    }

    const fn post(mut self, post: PostHook) -> Self {
        self.post = post;
        self
    }
}

const ALL: SubTypeSet = SubTypeSet::ALL;
const CONTEXTS: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_ANY);
const CERTIFICATES: SubTypeSet = SubTypeSet::a(SubTypeA::CERT_ANY);
const KEYS_AND_CERTS: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_ANY.union(SubTypeA::CERT_ANY));
const CRYPT_CONTEXTS: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_CONV.union(SubTypeA::CTX_PKC));
const PKC_CONTEXTS: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_PKC);
const HASH_CONTEXTS: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_HASH.union(SubTypeA::CTX_MAC));
const KEYABLE_CONTEXTS: SubTypeSet =
    SubTypeSet::a(SubTypeA::CTX_CONV.union(SubTypeA::CTX_PKC).union(SubTypeA::CTX_MAC));
const CLONEABLE: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_CONV.union(SubTypeA::CTX_HASH).union(SubTypeA::CTX_MAC));
const SIGNABLE_CERTS: SubTypeSet = SubTypeSet::a(SubTypeA::CERT_ANY.difference(SubTypeA::CERT_CMSATTR));
const DEVICES: SubTypeSet = SubTypeSet::b(SubTypeB::DEV_ANY);
const KEY_DEVICES: SubTypeSet = SubTypeSet::b(SubTypeB::DEV_ANY_STD);
const SYSTEM_DEVICE: SubTypeSet = SubTypeSet::b(SubTypeB::DEV_SYSTEM);
const KEY_STORES: SubTypeSet = SubTypeSet::b(SubTypeB::KEYSET_ANY.union(SubTypeB::DEV_ANY_STD));
const CERT_STORE: SubTypeSet = SubTypeSet::b(SubTypeB::KEYSET_DBMS_STORE);
const DATA_OBJECTS: SubTypeSet = SubTypeSet::new(SubTypeA::empty(), SubTypeB::ENV_ANY, SubTypeC::SESS_ANY);
const USERS: SubTypeSet = SubTypeSet::c(SubTypeC::USER_ANY);

const TO_CONTEXT: Routing = Routing::Fixed(ObjectType::Context);
const TO_CERTIFICATE: Routing = Routing::Fixed(ObjectType::Certificate);
const TO_DEVICE: Routing = Routing::Fixed(ObjectType::Device);
const TO_USER: Routing = Routing::Fixed(ObjectType::User);
const TO_KEY_STORE: Routing = Routing::FixedAlt(ObjectType::Keyset, ObjectType::Device);
const TO_DATA: Routing = Routing::FixedAlt(ObjectType::Envelope, ObjectType::Session);

use HandlingEntry as E;
use MessageType as M;

const fn action(kind: MessageType, subtypes: SubTypeSet, action: Action) -> HandlingEntry {
    E::new(kind, TO_CONTEXT, subtypes, ParamShape::Bytes)
        .pre(PreHook::CheckActionAccess(action))
        .post(PostHook::UpdateUsageCount)
}

const fn mechanism(kind: MessageType, op: MechanismOp) -> HandlingEntry {
    E::new(kind, TO_DEVICE, DEVICES, ParamShape::Mechanism).pre(PreHook::CheckMechanism(op))
}

const fn keyset(kind: MessageType, access: KeyAccess, post: PostHook) -> HandlingEntry {
    E::new(kind, TO_KEY_STORE, KEY_STORES, ParamShape::Key)
        .pre(PreHook::CheckKeysetAccess(access))
        .post(post)
}

/// The handling table, one entry per message type in type order
pub static HANDLING_TABLE: [HandlingEntry; MessageType::COUNT] = [
    E::new(M::Destroy, Routing::None, ALL, ParamShape::None)
        .pre(PreHook::SignalDependentObjects)
        .post(PostHook::SignalDependentDevices),
    E::new(M::IncRefCount, Routing::None, ALL, ParamShape::None).kernel(KernelHandler::IncRef),
    E::new(M::DecRefCount, Routing::None, ALL, ParamShape::None).kernel(KernelHandler::DecRef),
    E::new(M::GetDependent, Routing::None, ALL, ParamShape::None)
        .internal()
        .kernel(KernelHandler::GetDependent),
    E::new(M::SetDependent, Routing::None, ALL, ParamShape::Handle)
        .internal()
        .kernel(KernelHandler::SetDependent),
    E::new(M::Clone, TO_CONTEXT, CLONEABLE, ParamShape::None)
        .internal()
        .kernel(KernelHandler::Clone),
    E::new(M::GetAttribute, Routing::Implicit, ALL, ParamShape::None)
        .pre(PreHook::CheckAttributeAccess)
        .post(PostHook::MakeObjectExternal),
    E::new(M::GetAttributeS, Routing::Implicit, ALL, ParamShape::None).pre(PreHook::CheckAttributeAccess),
    E::new(M::SetAttribute, Routing::Implicit, ALL, ParamShape::Value)
        .pre(PreHook::CheckAttributeAccess)
        .post(PostHook::ChangeStateOpt),
    E::new(M::SetAttributeS, Routing::Implicit, ALL, ParamShape::StringValue)
        .pre(PreHook::CheckAttributeAccess)
        .post(PostHook::ChangeStateOpt),
    E::new(M::DeleteAttribute, Routing::Implicit, ALL, ParamShape::None).pre(PreHook::CheckAttributeAccess),
    E::new(M::Compare, Routing::Implicit, KEYS_AND_CERTS, ParamShape::Comparand).pre(PreHook::CheckCompareParam),
    E::new(
        M::Check,
        Routing::FixedAlt(ObjectType::Context, ObjectType::Certificate),
        KEYS_AND_CERTS,
        ParamShape::None,
    )
    .pre(PreHook::CheckCheckParam)
    .post(PostHook::ForwardToDependentObject),
    E::new(M::SelfTest, TO_DEVICE, SYSTEM_DEVICE, ParamShape::None).kernel(KernelHandler::SelfTest),
    E::new(M::ChangeNotify, Routing::None, ALL, ParamShape::Int).internal(),
    action(M::CtxEncrypt, CRYPT_CONTEXTS, Action::Encrypt),
    action(M::CtxDecrypt, CRYPT_CONTEXTS, Action::Decrypt),
    action(M::CtxSign, PKC_CONTEXTS, Action::Sign),
    action(M::CtxSigCheck, PKC_CONTEXTS, Action::SigCheck),
    action(M::CtxHash, HASH_CONTEXTS, Action::Hash),
    E::new(M::CtxGenKey, TO_CONTEXT, KEYABLE_CONTEXTS, ParamShape::None)
        .pre(PreHook::CheckState)
        .post(PostHook::ChangeState),
    E::new(M::CrtSign, TO_CERTIFICATE, SIGNABLE_CERTS, ParamShape::Handle)
        .pre(PreHook::CheckStateParamHandle)
        .post(PostHook::ChangeState),
    E::new(M::CrtSigCheck, TO_CERTIFICATE, SIGNABLE_CERTS, ParamShape::HandleOpt)
        .pre(PreHook::CheckParamHandleOpt),
    E::new(M::CrtExport, TO_CERTIFICATE, CERTIFICATES, ParamShape::BytesOpt).pre(PreHook::CheckExportAccess),
    E::new(M::DevQueryCapability, TO_DEVICE, DEVICES, ParamShape::None),
    mechanism(M::DevExport, MechanismOp::Wrap),
    mechanism(M::DevImport, MechanismOp::Unwrap),
    mechanism(M::DevSign, MechanismOp::Sign),
    mechanism(M::DevSigCheck, MechanismOp::SigCheck),
    mechanism(M::DevDerive, MechanismOp::Derive),
    E::new(M::DevCreateObject, TO_DEVICE, DEVICES, ParamShape::Create)
        .pre(PreHook::CheckCreate)
        .post(PostHook::MakeObjectExternal),
    E::new(M::EnvPushData, TO_DATA, DATA_OBJECTS, ParamShape::Bytes).pre(PreHook::CheckData),
    E::new(M::EnvPopData, TO_DATA, DATA_OBJECTS, ParamShape::BytesOpt).pre(PreHook::CheckData),
    keyset(M::KeyGetKey, KeyAccess::Read, PostHook::MakeObjectExternal),
    keyset(M::KeySetKey, KeyAccess::Write, PostHook::None),
    keyset(M::KeyDeleteKey, KeyAccess::Delete, PostHook::None),
    keyset(M::KeyGetFirstCert, KeyAccess::GetFirst, PostHook::MakeObjectExternal),
    keyset(M::KeyGetNextCert, KeyAccess::GetNext, PostHook::MakeObjectExternal),
    E::new(M::KeyCertMgmt, Routing::Fixed(ObjectType::Keyset), CERT_STORE, ParamShape::CertMgmt)
        .pre(PreHook::CheckCertMgmtAccess)
        .post(PostHook::MakeObjectExternal),
    E::new(M::UserUserMgmt, TO_USER, USERS, ParamShape::None)
        .pre(PreHook::CheckUserMgmtAccess)
        .post(PostHook::HandleZeroise),
    E::new(M::UserTrustMgmt, TO_USER, USERS, ParamShape::Handle).pre(PreHook::CheckTrustMgmtAccess),
];

pub fn entry(kind: MessageType) -> &'static HandlingEntry {
    &HANDLING_TABLE[kind.index()]
}

fn routing_reaches(routing: Routing, subtypes: SubTypeSet) -> bool {
    let reachable = match routing {
        Routing::None | Routing::Implicit => return true,
        Routing::Fixed(a) => a.subtypes(),
        Routing::FixedAlt(a, b) => a.subtypes().union(b.subtypes()),
    };
    subtypes.is_subset_of(reachable)
}

fn hooks_consistent(entry: &HandlingEntry) -> bool {
    let attribute = entry.kind.attribute_op().is_some();
    let pre_ok = match entry.pre {
        PreHook::CheckAttributeAccess => attribute && entry.routing == Routing::Implicit,
        PreHook::CheckCompareParam => entry.routing == Routing::Implicit,
        PreHook::CheckActionAccess(_) | PreHook::CheckState => entry.routing == TO_CONTEXT,
        PreHook::CheckStateParamHandle | PreHook::CheckParamHandleOpt | PreHook::CheckExportAccess => {
            entry.routing == TO_CERTIFICATE
        }
        PreHook::CheckMechanism(_) | PreHook::CheckCreate => entry.routing == TO_DEVICE,
        PreHook::CheckKeysetAccess(_) => entry.shape == ParamShape::Key,
        PreHook::CheckUserMgmtAccess | PreHook::CheckTrustMgmtAccess => entry.routing == TO_USER,
        _ => true,
    };
    let post_ok = match entry.post {
        PostHook::UpdateUsageCount => matches!(entry.pre, PreHook::CheckActionAccess(_)),
        PostHook::ChangeStateOpt => attribute,
        PostHook::ForwardToDependentObject => entry.pre == PreHook::CheckCheckParam,
        _ => true,
    };
    // Kernel-answered messages never reach a handler, so nothing can run around them
    let handler_ok = entry.handler.is_none() || (entry.pre == PreHook::None && entry.post == PostHook::None);
    pre_ok && post_ok && handler_ok
}

/// Init-time consistency check of the handling table
pub fn check_table() -> Result<()> {
    for (index, entry) in HANDLING_TABLE.iter().enumerate() {
        if entry.kind.index() != index {
            log::error!("handling table entry {index} is for {:?}", entry.kind);
            internal_error!("handling table out of order");
        }
        if entry.subtypes.is_empty() || !routing_reaches(entry.routing, entry.subtypes) {
            log::error!("handling table entry for {:?} names unreachable subtypes", entry.kind);
            internal_error!("inconsistent handling table routing");
        }
        if !hooks_consistent(entry) {
            log::error!("handling table entry for {:?} has inconsistent hooks", entry.kind);
            internal_error!("inconsistent handling table hooks");
        }
    }
    log::debug!("message handling table verified");
    Ok(())
}
