//! Messages answered by the kernel itself

use std::sync::Arc;

use super::{selftest, Kernel, StateGuard};
use crate::acl::dependency::{check_dependency, perms_for_key_usage, DependencySlot};
use crate::attr_id::AttributeId;
use crate::dispatch::context::{DispatchContext, FollowUp};
use crate::dispatch::{KernelHandler, Message, MessageData, SharedHandler};
use crate::limits::{KEYUSAGE_CRYPT, KEYUSAGE_SIGN};
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};
use crate::objects::{Action, ActionLevel, ActionPerms, ObjectFlags, ObjectHandle, ObjectRecord, ObjectTable};
use crate::{KernelError, Result};

/// A clone can only be used by the kernel for bulk data actions
const CLONE_PERMS: ActionPerms = ActionPerms::ALL
    .with(Action::Encrypt, ActionLevel::NoneExternal)
    .with(Action::Decrypt, ActionLevel::NoneExternal)
    .with(Action::Hash, ActionLevel::NoneExternal);

fn inc_ref(objects: &mut ObjectTable, ctx: &DispatchContext) -> Result<()> {
    let record = objects.lookup_mut(ctx.target)?;
    record.ref_count = record.ref_count.checked_add(1).ok_or(KernelError::Overflow)?;
    Ok(())
}

fn dec_ref(objects: &mut ObjectTable, ctx: &mut DispatchContext) -> Result<()> {
    let record = objects.lookup_mut(ctx.target)?;
    if record.ref_count > 0 {
        record.ref_count -= 1;
    } else if !ctx.target.is_system() {
        // Last reference gone
        ctx.follow_ups.push(FollowUp::Destroy(ctx.target));
    }
    Ok(())
}

fn get_dependent(objects: &ObjectTable, ctx: &DispatchContext, message: &mut Message) -> Result<()> {
    let object_type = ObjectType::from_raw(message.value).ok_or(KernelError::ArgValue)?;
    let record = objects.lookup(ctx.target)?;
    let found = [record.dependent_object, record.dependent_device]
        .into_iter()
        .flatten()
        .find(|handle| objects.get(*handle).is_some_and(|dep| dep.object_type == object_type))
        .ok_or(KernelError::NotFound)?;
    message.data = MessageData::Handle(found);
    Ok(())
}

fn is_pkc_context(record: &ObjectRecord) -> bool {
    SubTypeSet::a(SubTypeA::CTX_PKC).contains(record.subtype)
}

fn set_dependent(objects: &mut ObjectTable, ctx: &mut DispatchContext, message: &Message) -> Result<()> {
    let dependent = message.data.as_handle().ok_or(KernelError::ArgNum1)?;
    let slot = check_dependency(objects, ctx.target, dependent)?;
    let incref = message.value != 0;

    let key_usage_pair = match (objects.get(ctx.target), objects.get(dependent)) {
        (Some(object), Some(dep)) if is_pkc_context(object) && dep.object_type == ObjectType::Certificate => {
            Some((ctx.target, dependent))
        }
        (Some(object), Some(dep)) if object.object_type == ObjectType::Certificate && is_pkc_context(dep) => {
            Some((dependent, ctx.target))
        }
        _ => None,
    };

    if incref {
        let dep = objects.lookup_mut(dependent)?;
        dep.ref_count = dep.ref_count.checked_add(1).ok_or(KernelError::Overflow)?;
    }
    let record = objects.lookup_mut(ctx.target)?;
    match slot {
        DependencySlot::Object => record.dependent_object = Some(dependent),
        DependencySlot::Device => record.dependent_device = Some(dependent),
    }
    if let Some((context, certificate)) = key_usage_pair {
        ctx.follow_ups
            .push(FollowUp::UpdateKeyUsagePerms { context, certificate });
    }
    log::debug!("{dependent:?} now a dependent of {:?}", ctx.target);
    Ok(())
}

impl Kernel {
    pub(super) fn run_kernel_handler<'a>(
        &'a self,
        handler: KernelHandler,
        mut state: StateGuard<'a>,
        ctx: &mut DispatchContext,
        message: &mut Message,
    ) -> (StateGuard<'a>, Result<()>) {
        let result = match handler {
            KernelHandler::IncRef => state.objects_mut().and_then(|objects| inc_ref(objects, ctx)),
            KernelHandler::DecRef => state.objects_mut().and_then(|objects| dec_ref(objects, ctx)),
            KernelHandler::GetDependent => state
                .objects()
                .and_then(|objects| get_dependent(objects, ctx, message)),
            KernelHandler::SetDependent => state
                .objects_mut()
                .and_then(|objects| set_dependent(objects, ctx, message)),
            KernelHandler::Clone => return self.clone_context(state, ctx, message),
            KernelHandler::SelfTest => {
                drop(state);
                let result = selftest::run(self);
                return (self.lock_state(), result);
            }
        };
        (state, result)
    }

    /// Copy a context into a new internal object.
    ///
    /// The source is marked busy while its handler state is copied, so the
    /// copy never sees a half-processed message.
    fn clone_context<'a>(
        &'a self,
        mut state: StateGuard<'a>,
        ctx: &DispatchContext,
        message: &mut Message,
    ) -> (StateGuard<'a>, Result<()>) {
        let handler = match state.objects().and_then(|objects| objects.lookup(ctx.target)) {
            Ok(record) => Arc::clone(&record.handler),
            Err(err) => return (state, Err(err)),
        };
        self.set_busy(&mut state, ctx.target, true);
        drop(state);

        let copy = handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .duplicate();

        let mut state = self.lock_state();
        self.set_busy(&mut state, ctx.target, false);
        let result = copy
            .ok_or(KernelError::NotAvail)
            .and_then(|copy| state.objects_mut().and_then(|objects| store_clone(objects, ctx.target, copy)));
        if let Ok(handle) = result {
            log::debug!("cloned {:?} into {handle:?}", ctx.target);
            message.data = MessageData::Handle(handle);
        }
        (state, result.map(drop))
    }

    /// Restrict a PKC context to the usage allowed by its certificate
    pub(super) fn update_key_usage_perms(&self, context: ObjectHandle, certificate: ObjectHandle) -> Result<()> {
        let key_usage = match self.send_internal(certificate, Message::get_attribute(AttributeId::CERTINFO_KEYUSAGE)) {
            Ok(MessageData::Int(usage)) => usage,
            // No usage recorded means no restriction
            Ok(_) | Err(KernelError::NotFound | KernelError::ArgValue | KernelError::Permission) => {
                KEYUSAGE_SIGN | KEYUSAGE_CRYPT
            }
            Err(err) => return Err(err),
        };
        let mut state = self.lock_state();
        let record = state.objects_mut()?.lookup_mut(context)?;
        record.action_perms = record.action_perms.ratchet(perms_for_key_usage(key_usage));
        log::debug!("{context:?} restricted to key usage {key_usage:#x}");
        Ok(())
    }
}

fn store_clone(objects: &mut ObjectTable, source: ObjectHandle, handler: SharedHandler) -> Result<ObjectHandle> {
    let src = objects.lookup(source)?;
    let mut record = ObjectRecord::new(ObjectType::Context, src.subtype, handler);
    record.flags = (src.flags & (ObjectFlags::HIGH | ObjectFlags::SECUREMALLOC)) | ObjectFlags::INTERNAL;
    record.action_perms = src.action_perms.ratchet(CLONE_PERMS);
    record.owner = src.owner;
    record.usage_count = src.usage_count;
    let device = src.dependent_device;
    record.dependent_device = device;

    let handle = objects.allocate(record)?;
    if let Some(device) = device.filter(|device| *device != ObjectHandle::SYSTEM_DEVICE) {
        let dev = objects.lookup_mut(device)?;
        dev.ref_count = dev.ref_count.saturating_add(1);
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::dispatch::{MemoryObject, MessageType};
    use crate::kernel::CreateObjectInfo;
    use crate::object_type::{SubType, SubTypeB};

    fn kernel() -> Kernel {
        Kernel::start(KernelConfig {
            run_self_test: false,
            ..KernelConfig::for_testing()
        })
        .unwrap()
    }

    fn make(kernel: &Kernel, object_type: ObjectType, subtype: SubType) -> ObjectHandle {
        let handle = kernel
            .create_object(CreateObjectInfo::new(object_type, subtype, MemoryObject::shared()))
            .unwrap();
        kernel
            .send_internal(handle, Message::set_attribute(AttributeId::IATTRIBUTE_STATUS, 0))
            .unwrap();
        handle
    }

    fn ref_count(kernel: &Kernel, handle: ObjectHandle) -> u32 {
        kernel.lock_state().objects().unwrap().lookup(handle).unwrap().ref_count
    }

    #[test]
    fn test_last_reference_destroys() {
        let kernel = kernel();
        let handle = make(&kernel, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));
        kernel.send_internal(handle, Message::bare(MessageType::IncRefCount)).unwrap();
        assert_eq!(ref_count(&kernel, handle), 1);

        kernel.send_internal(handle, Message::bare(MessageType::DecRefCount)).unwrap();
        assert!(kernel.is_valid(handle));
        kernel.send_internal(handle, Message::bare(MessageType::DecRefCount)).unwrap();
        assert!(!kernel.is_valid(handle));
    }

    #[test]
    fn test_system_objects_survive_decref() {
        let kernel = kernel();
        kernel
            .send_internal(ObjectHandle::DEFAULT_USER, Message::bare(MessageType::DecRefCount))
            .unwrap();
        assert!(kernel.is_valid(ObjectHandle::DEFAULT_USER));
        assert_eq!(
            kernel.send_internal(ObjectHandle::DEFAULT_USER, Message::bare(MessageType::Destroy)),
            Err(KernelError::Permission)
        );
    }

    #[test]
    fn test_dependent_lookup_and_release() {
        let kernel = kernel();
        let envelope = make(&kernel, ObjectType::Envelope, SubType::B(SubTypeB::ENV_ENV));
        let key = make(&kernel, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));

        let attach = Message::new(MessageType::SetDependent, 1, MessageData::Handle(key));
        kernel.send_internal(envelope, attach).unwrap();
        assert_eq!(ref_count(&kernel, key), 1);

        let found = kernel
            .send_internal(envelope, Message::new(MessageType::GetDependent, ObjectType::Context as i32, MessageData::None))
            .unwrap();
        assert_eq!(found, MessageData::Handle(key));
        assert_eq!(
            kernel.send_internal(
                envelope,
                Message::new(MessageType::GetDependent, ObjectType::Certificate as i32, MessageData::None)
            ),
            Err(KernelError::NotFound)
        );

        // Destroying the envelope drops its reference; the key stays
        kernel.send_internal(envelope, Message::bare(MessageType::Destroy)).unwrap();
        assert!(kernel.is_valid(key));
        assert_eq!(ref_count(&kernel, key), 0);
    }

    #[test]
    fn test_transferred_dependent_goes_with_owner() {
        let kernel = kernel();
        let envelope = make(&kernel, ObjectType::Envelope, SubType::B(SubTypeB::ENV_ENV));
        let key = make(&kernel, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));
        kernel
            .send_internal(envelope, Message::new(MessageType::SetDependent, 0, MessageData::Handle(key)))
            .unwrap();
        kernel.send_internal(envelope, Message::bare(MessageType::Destroy)).unwrap();
        assert!(!kernel.is_valid(key));
    }

    #[test]
    fn test_certificate_restricts_key() {
        let kernel = kernel();
        let key = make(&kernel, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC));
        let cert = make(&kernel, ObjectType::Certificate, SubType::A(SubTypeA::CERT_CERT));
        kernel
            .send_internal(key, Message::new(MessageType::SetDependent, 1, MessageData::Handle(cert)))
            .unwrap();

        let state = kernel.lock_state();
        let perms = state.objects().unwrap().lookup(key).unwrap().action_perms;
        assert_eq!(perms.level(Action::Sign), ActionLevel::NoneExternal);
        assert_eq!(perms.level(Action::Encrypt), ActionLevel::NoneExternal);
        assert_eq!(perms.level(Action::GenKey), ActionLevel::All);
    }

    #[test]
    fn test_clone_is_internal_and_restricted() {
        let kernel = kernel();
        let key = make(&kernel, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));
        kernel
            .send_internal(key, Message::set_attribute(AttributeId::CTXINFO_MODE, 3))
            .unwrap();
        let copy = kernel
            .send_internal(key, Message::bare(MessageType::Clone))
            .unwrap()
            .as_handle()
            .unwrap();

        let state = kernel.lock_state();
        let record = state.objects().unwrap().lookup(copy).unwrap();
        assert!(record.is_internal());
        assert_eq!(record.subtype, SubType::A(SubTypeA::CTX_CONV));
        assert_eq!(record.action_perms.level(Action::Encrypt), ActionLevel::NoneExternal);
        drop(state);

        assert_eq!(
            kernel.send_internal(copy, Message::get_attribute(AttributeId::CTXINFO_MODE)),
            Ok(MessageData::Int(3))
        );
    }
}
