//! Post-dispatch work
//!
//! Run under the kernel lock after the object's handler has succeeded.

use super::context::{DispatchContext, FollowUp};
use super::message::{Message, MessageData, MessageType};
use super::table::PostHook;
use crate::acl::check::forward_target;
use crate::acl::{find_attribute_acl, resolve_sub_acl, ValueKind};
use crate::error::internal_error;
use crate::objects::{ObjectFlags, ObjectHandle, ObjectTable};
use crate::Result;

pub fn run(hook: PostHook, objects: &mut ObjectTable, ctx: &mut DispatchContext, message: &Message) -> Result<()> {
    match hook {
        PostHook::None => Ok(()),
        PostHook::SignalDependentDevices => {
            let Some(record) = objects.remove(ctx.target) else {
                internal_error!("destroyed object vanished from the table");
            };
            if let Some(device) = record.dependent_device.filter(|device| *device != ObjectHandle::SYSTEM_DEVICE) {
                ctx.follow_ups
                    .push(FollowUp::Notify(device, Message::bare(MessageType::DecRefCount)));
            }
            log::trace!("destroyed {:?} ({:?})", ctx.target, record.object_type);
            ctx.removed = Some(record);
            Ok(())
        }
        PostHook::MakeObjectExternal => {
            if !ctx.internal {
                if let Some(handle) = returned_object(&message.data) {
                    if let Some(record) = objects.get_mut(handle) {
                        record.flags.remove(ObjectFlags::INTERNAL);
                    }
                }
            }
            Ok(())
        }
        PostHook::ChangeStateOpt => {
            if is_trigger_write(objects, ctx, message) {
                objects.promote_high_state(ctx.target)?;
            }
            Ok(())
        }
        PostHook::ForwardToDependentObject => {
            if !message.forwarded {
                ctx.forward = forward_target(objects, ctx.target, message.value);
            }
            Ok(())
        }
        PostHook::UpdateUsageCount => {
            let record = objects.lookup_mut(ctx.target)?;
            if let Some(count) = record.usage_count.as_mut() {
                *count = count.saturating_sub(1);
            }
            Ok(())
        }
        PostHook::ChangeState => objects.promote_high_state(ctx.target),
        PostHook::HandleZeroise => {
            ctx.zeroise = true;
            Ok(())
        }
    }
}

/// Object handed back in a message result, if any
fn returned_object(data: &MessageData) -> Option<ObjectHandle> {
    match data {
        MessageData::Handle(handle) => Some(*handle),
        MessageData::Key(info) => info.object,
        MessageData::CertMgmt(info) => info.result,
        _ => None,
    }
}

fn is_trigger_write(objects: &ObjectTable, ctx: &DispatchContext, message: &Message) -> bool {
    let Some(acl) = find_attribute_acl(message.attribute(), ctx.internal) else {
        return false;
    };
    let acl = match (acl.kind, objects.get(ctx.target)) {
        (ValueKind::Special, Some(record)) => resolve_sub_acl(acl, record.subtype),
        (ValueKind::Special, None) => None,
        _ => Some(acl),
    };
    acl.is_some_and(|acl| acl.is_trigger())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_id::AttributeId;
    use crate::dispatch::{KeyMgmtInfo, MemoryObject};
    use crate::object_type::{ObjectType, SubType, SubTypeA, SubTypeB};
    use crate::objects::ObjectRecord;

    fn table() -> ObjectTable {
        ObjectTable::new(256, 256, 9).unwrap()
    }

    fn add(objects: &mut ObjectTable, object_type: ObjectType, subtype: SubType) -> ObjectHandle {
        let mut record = ObjectRecord::new(object_type, subtype, MemoryObject::shared());
        record.flags = ObjectFlags::INTERNAL;
        objects.allocate(record).unwrap()
    }

    #[test]
    fn test_key_write_moves_to_high_state() {
        let mut objects = table();
        let handle = add(&mut objects, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));
        let mut ctx = DispatchContext::new(handle, handle, false, 1);

        run(
            PostHook::ChangeStateOpt,
            &mut objects,
            &mut ctx,
            &Message::set_attribute_s(AttributeId::CTXINFO_LABEL, b"label"),
        )
        .unwrap();
        assert!(!objects.lookup(handle).unwrap().is_high());

        run(
            PostHook::ChangeStateOpt,
            &mut objects,
            &mut ctx,
            &Message::set_attribute_s(AttributeId::CTXINFO_KEY, &[0x11; 16]),
        )
        .unwrap();
        assert!(objects.lookup(handle).unwrap().is_high());
    }

    #[test]
    fn test_returned_key_becomes_external() {
        let mut objects = table();
        let keyset = add(&mut objects, ObjectType::Keyset, SubType::B(SubTypeB::KEYSET_FILE));
        let key = add(&mut objects, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC));
        let reply = Message::new(
            MessageType::KeyGetKey,
            1,
            MessageData::Key(KeyMgmtInfo::default().object(key)),
        );

        let mut ctx = DispatchContext::new(keyset, keyset, true, 1);
        run(PostHook::MakeObjectExternal, &mut objects, &mut ctx, &reply).unwrap();
        assert!(objects.lookup(key).unwrap().is_internal());

        let mut ctx = DispatchContext::new(keyset, keyset, false, 1);
        run(PostHook::MakeObjectExternal, &mut objects, &mut ctx, &reply).unwrap();
        assert!(!objects.lookup(key).unwrap().is_internal());
    }

    #[test]
    fn test_usage_count_runs_down() {
        let mut objects = table();
        let handle = add(&mut objects, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));
        objects.lookup_mut(handle).unwrap().usage_count = Some(1);
        let mut ctx = DispatchContext::new(handle, handle, false, 1);
        let encrypt = Message::bare(MessageType::CtxEncrypt);

        run(PostHook::UpdateUsageCount, &mut objects, &mut ctx, &encrypt).unwrap();
        assert!(objects.lookup(handle).unwrap().usage_exhausted());
        run(PostHook::UpdateUsageCount, &mut objects, &mut ctx, &encrypt).unwrap();
        assert_eq!(objects.lookup(handle).unwrap().usage_count, Some(0));
    }

    #[test]
    fn test_destroy_releases_device() {
        let mut objects = table();
        let device = add(&mut objects, ObjectType::Device, SubType::B(SubTypeB::DEV_HW));
        let key = add(&mut objects, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC));
        objects.lookup_mut(key).unwrap().dependent_device = Some(device);

        let mut ctx = DispatchContext::new(key, key, false, 1);
        run(PostHook::SignalDependentDevices, &mut objects, &mut ctx, &Message::bare(MessageType::Destroy)).unwrap();
        assert!(!objects.is_valid(key));
        assert!(ctx.removed.is_some());
        assert_eq!(
            ctx.follow_ups,
            vec![FollowUp::Notify(device, Message::bare(MessageType::DecRefCount))]
        );
    }
}
