//! Pre-dispatch checks
//!
//! Run under the kernel lock once the message has been routed. A failing
//! check leaves every object untouched; only checks that pass may update
//! kernel state.

use super::context::{DispatchContext, FollowUp};
use super::message::{Message, MessageData, MessageType};
use super::table::PreHook;
use crate::acl::check::check_check_param;
use crate::acl::compare::check_compare_param;
use crate::acl::create::check_create;
use crate::acl::export::check_export_access;
use crate::acl::key_mgmt::check_keyset_access;
use crate::acl::mechanism::{check_mechanism, MechanismCaller};
use crate::acl::cert_mgmt::check_cert_mgmt;
use crate::acl::user_mgmt::{check_trust_mgmt_access, check_user_mgmt_access};
use crate::acl::{check_attribute_access, find_attribute_acl, AttributeRequest, AttributeValue};
use crate::error::internal_error;
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};
use crate::objects::{Action, ObjectFlags, ObjectHandle, ObjectRecord, ObjectTable};
use crate::{KernelError, Result};

pub fn run(hook: PreHook, objects: &mut ObjectTable, ctx: &mut DispatchContext, message: &Message) -> Result<()> {
    match hook {
        PreHook::None => Ok(()),
        PreHook::SignalDependentObjects => signal_dependent_objects(objects, ctx),
        PreHook::CheckAttributeAccess => check_attribute(objects, ctx, message),
        PreHook::CheckCompareParam => check_compare_param(
            objects,
            ctx.target,
            message.value,
            &message.data,
            ctx.internal,
            ctx.thread,
        ),
        PreHook::CheckCheckParam => check_check_param(objects, ctx.target, message.value),
        PreHook::CheckActionAccess(action) => check_action(objects.lookup(ctx.target)?, action, ctx.internal),
        PreHook::CheckState => {
            let record = objects.lookup(ctx.target)?;
            if record.is_high() {
                return Err(KernelError::Inited);
            }
            record.action_perms.check(Action::GenKey, ctx.internal)
        }
        PreHook::CheckStateParamHandle => {
            if objects.lookup(ctx.target)?.is_high() {
                return Err(KernelError::Inited);
            }
            let key = message.data.as_handle().ok_or(KernelError::ArgNum1)?;
            let signer = SubTypeSet::a(SubTypeA::CTX_PKC);
            match usable(objects, key, ctx) {
                Some(record) if signer.contains(record.subtype) && record.is_high() => Ok(()),
                _ => Err(KernelError::ArgNum1),
            }
        }
        PreHook::CheckParamHandleOpt => {
            if !objects.lookup(ctx.target)?.is_high() {
                return Err(KernelError::NotInited);
            }
            let Some(checker) = message.data.as_handle() else {
                return Ok(());
            };
            let checkers = SubTypeSet::a(SubTypeA::CTX_PKC.union(SubTypeA::CERT_ANY));
            match usable(objects, checker, ctx) {
                Some(record) if checkers.contains(record.subtype) => Ok(()),
                _ => Err(KernelError::ArgNum1),
            }
        }
        PreHook::CheckExportAccess => check_export_access(objects, ctx.target, message.value, ctx.internal),
        PreHook::CheckMechanism(op) => {
            let MessageData::Mechanism(info) = &message.data else {
                internal_error!("mechanism message without mechanism parameters");
            };
            let caller = MechanismCaller {
                device: ctx.target,
                internal: ctx.internal,
                thread: ctx.thread,
            };
            check_mechanism(objects, op, message.value, info, &caller)
        }
        PreHook::CheckCreate => {
            let MessageData::Create(args) = &message.data else {
                internal_error!("create message without creation arguments");
            };
            check_create(message.value, args)?;
            match args.owner {
                Some(owner) => check_owner(objects, owner, ctx),
                None => Ok(()),
            }
        }
        PreHook::CheckData => check_data(objects.lookup(ctx.target)?, message),
        PreHook::CheckKeysetAccess(access) => {
            let MessageData::Key(info) = &message.data else {
                internal_error!("key management message without key parameters");
            };
            check_keyset_access(objects, ctx.target, access, message.value, info, ctx.internal)
        }
        PreHook::CheckCertMgmtAccess => {
            let MessageData::CertMgmt(info) = &message.data else {
                internal_error!("certificate management message without parameters");
            };
            check_cert_mgmt(objects, ctx.target, message.value, info, ctx.internal, ctx.thread)
        }
        PreHook::CheckUserMgmtAccess => check_user_mgmt_access(objects, ctx.target, message.value).map(drop),
        PreHook::CheckTrustMgmtAccess => {
            let certificate = message.data.as_handle().ok_or(KernelError::ArgNum1)?;
            check_trust_mgmt_access(objects, certificate, message.value, ctx.internal, ctx.thread).map(drop)
        }
    }
}

/// A parameter object the caller may use, or `None`
fn usable<'a>(objects: &'a ObjectTable, handle: ObjectHandle, ctx: &DispatchContext) -> Option<&'a ObjectRecord> {
    objects.get(handle).filter(|record| {
        !record.in_invalid_state() && (ctx.internal || (!record.is_internal() && record.accessible_by(ctx.thread)))
    })
}

fn signal_dependent_objects(objects: &mut ObjectTable, ctx: &mut DispatchContext) -> Result<()> {
    // System objects only go away at shutdown
    if ctx.target.is_system() {
        return Err(KernelError::Permission);
    }
    let record = objects.lookup_mut(ctx.target)?;
    if record.lock_count > 0 || record.ref_count > 0 {
        return Err(KernelError::Permission);
    }
    record.flags.insert(ObjectFlags::SIGNALLED);
    if let Some(dependent) = record.dependent_object {
        ctx.follow_ups
            .push(FollowUp::Notify(dependent, Message::bare(MessageType::DecRefCount)));
    }
    Ok(())
}

fn attribute_value(data: &MessageData) -> AttributeValue<'_> {
    match data {
        MessageData::Int(value) => AttributeValue::Int(*value),
        MessageData::Handle(handle) => AttributeValue::Object(*handle),
        MessageData::Bytes(bytes) => AttributeValue::Bytes(bytes),
        MessageData::Time(time) => AttributeValue::Time(*time),
        _ => AttributeValue::None,
    }
}

fn check_attribute(objects: &ObjectTable, ctx: &DispatchContext, message: &Message) -> Result<()> {
    let Some((op, string_message)) = message.kind.attribute_op() else {
        internal_error!("attribute check on a non-attribute message");
    };
    let acl = find_attribute_acl(message.attribute(), ctx.internal).ok_or(KernelError::ArgValue)?;
    let request = AttributeRequest {
        op,
        string_message,
        value: attribute_value(&message.data),
        internal: ctx.internal,
        thread: ctx.thread,
    };
    check_attribute_access(objects, ctx.target, acl, &request).map(drop)
}

fn check_action(record: &ObjectRecord, action: Action, internal: bool) -> Result<()> {
    record.action_perms.check(action, internal)?;
    if record.usage_exhausted() {
        return Err(KernelError::Permission);
    }
    // Hashing needs no key
    if action != Action::Hash && !record.is_high() {
        return Err(KernelError::NotInited);
    }
    Ok(())
}

fn check_owner(objects: &ObjectTable, owner: ObjectHandle, ctx: &DispatchContext) -> Result<()> {
    match usable(objects, owner, ctx) {
        Some(record) if record.object_type == ObjectType::User => Ok(()),
        _ if ctx.internal => internal_error!("object created for an owner that isn't a user"),
        _ => Err(KernelError::Permission),
    }
}

fn check_data(record: &ObjectRecord, message: &Message) -> Result<()> {
    // Sessions move data only once they're connected
    if record.object_type == ObjectType::Session && !record.is_high() {
        return Err(KernelError::NotInited);
    }
    if message.kind == MessageType::EnvPopData && message.value < 0 {
        return Err(KernelError::ArgNum1);
    }
    Ok(())
}
