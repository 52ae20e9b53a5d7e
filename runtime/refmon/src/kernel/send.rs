//! Message dispatch
//!
//! `send` is the only way anything outside the kernel touches an object.
//! A message is admitted, routed and checked under the kernel lock; only
//! when every check has passed is the lock dropped and the object's
//! handler called. Post-dispatch work runs under the lock again, and
//! anything that involves further messages (dependent objects, queued
//! messages, forwarding) runs after it has been released.

use std::sync::Arc;

use super::{Kernel, StateGuard};
use crate::acl::compare::compare_route;
use crate::acl::{find_attribute_acl, Route};
use crate::dispatch::context::{DispatchContext, FollowUp};
use crate::dispatch::{entry, post, pre, HandlingEntry, KernelHandler, Message, MessageData, MessageType, QueuedMessage, Routing};
use crate::error::internal_error;
use crate::objects::{find_target, is_kernel_property, ObjectHandle, ObjectTable};
use crate::sync::{current_thread, ThreadToken};
use crate::{KernelError, Result};

/// Message routed to an object the sender can't see or use
fn missing(internal: bool) -> KernelError {
    if internal {
        KernelError::NotFound
    } else {
        KernelError::ArgObject
    }
}

/// Messages the kernel answers without calling the object's handler
fn answered_by_kernel(entry: &HandlingEntry, message: &Message) -> bool {
    match entry.handler {
        Some(KernelHandler::Clone) => false,
        Some(_) => true,
        None => is_property_message(message),
    }
}

fn is_property_message(message: &Message) -> bool {
    message.kind.attribute_op().is_some() && is_kernel_property(message.attribute())
}

/// Messages let through to an object that isn't initialised yet, or is
/// on its way out: teardown, and the creator reading or setting the
/// properties held in the record. Nothing reaches the object's handler.
fn invalid_state_allowed(message: &Message, internal: bool) -> bool {
    match message.kind {
        MessageType::Destroy | MessageType::IncRefCount | MessageType::DecRefCount => true,
        _ => internal && is_property_message(message),
    }
}

fn resolve_route(entry: &HandlingEntry, message: &Message, internal: bool) -> Result<Route> {
    match entry.routing {
        Routing::None => Ok(Route::None),
        Routing::Fixed(object_type) => Ok(Route::Object(object_type)),
        Routing::FixedAlt(a, b) => Ok(Route::Alt(a, b)),
        Routing::Implicit if message.kind == MessageType::Compare => compare_route(message.value),
        Routing::Implicit => find_attribute_acl(message.attribute(), internal)
            .map(|acl| acl.route)
            .ok_or(KernelError::ArgValue),
    }
}

/// Find the object a message is actually for
fn route(
    objects: &ObjectTable,
    sent_to: ObjectHandle,
    entry: &HandlingEntry,
    message: &Message,
    internal: bool,
    thread: ThreadToken,
) -> Result<ObjectHandle> {
    let Some(record) = objects.get(sent_to) else {
        if internal {
            log::debug!("internal {:?} sent to missing object {sent_to:?}", message.kind);
        }
        return Err(missing(internal));
    };
    if !internal && (record.is_internal() || !record.accessible_by(thread)) {
        return Err(KernelError::ArgObject);
    }

    let route = resolve_route(entry, message, internal)?;
    let target = find_target(objects, sent_to, route).ok_or(KernelError::ArgObject)?;
    let record = objects.lookup(target)?;
    if !entry.subtypes.contains(record.subtype) {
        return Err(KernelError::ArgObject);
    }
    Ok(target)
}

/// Get or set a property held in the object record
fn access_property(objects: &mut ObjectTable, ctx: &DispatchContext, message: &mut Message) -> Result<()> {
    let record = objects.lookup_mut(ctx.target)?;
    let attribute = message.attribute();
    match message.kind {
        MessageType::GetAttribute => message.data = MessageData::Int(record.get_property(attribute)?),
        MessageType::SetAttribute => {
            let value = message.data.as_int().ok_or(KernelError::ArgNum1)?;
            record.set_property(attribute, value, ctx.thread)?;
        }
        _ => return Err(KernelError::Permission),
    }
    Ok(())
}

impl Kernel {
    /// Send a message from outside the kernel.
    ///
    /// The message is subject to every access check; internal objects and
    /// internal-only attributes and messages don't exist as far as the
    /// caller can tell.
    pub fn send(&self, handle: ObjectHandle, message: Message) -> Result<MessageData> {
        self.dispatch(handle, message, false)
    }

    /// Send a message on behalf of the kernel or an object backend
    pub fn send_internal(&self, handle: ObjectHandle, message: Message) -> Result<MessageData> {
        self.dispatch(handle, message, true)
    }

    fn dispatch(&self, sent_to: ObjectHandle, message: Message, internal: bool) -> Result<MessageData> {
        let kind = message.kind;
        let result = self.process(sent_to, message, internal);
        if let Err(err) = &result {
            log::debug!(
                "{} {kind:?} to {sent_to:?} failed: {err}",
                if internal { "internal" } else { "external" }
            );
        }
        result
    }

    fn process(&self, sent_to: ObjectHandle, mut message: Message, internal: bool) -> Result<MessageData> {
        let entry = entry(message.kind);
        let thread = current_thread();

        let mut state = self.lock_state();
        state.admits(&message, internal)?;
        if entry.internal_only && !internal {
            return Err(KernelError::Permission);
        }
        let target = route(state.objects()?, sent_to, entry, &message, internal, thread)?;
        if !entry.shape.accepts(&message.data) {
            if internal {
                internal_error!("internal message with malformed parameters");
            }
            return Err(KernelError::ArgNum1);
        }

        if !answered_by_kernel(entry, &message) {
            state = self.wait_until_idle(state, target, thread).map_err(|err| match err {
                KernelError::NotFound => missing(internal),
                other => other,
            })?;
            if state.objects()?.lookup(target)?.busy == Some(thread) {
                // Our own handler further up the stack is using the object
                if entry.handler == Some(KernelHandler::Clone) {
                    return Err(KernelError::Permission);
                }
                state.queue.enqueue(QueuedMessage {
                    target,
                    sent_to,
                    message,
                    internal,
                })?;
                return Ok(MessageData::None);
            }
        }

        {
            let record = state.objects()?.lookup(target)?;
            if record.in_invalid_state() && !invalid_state_allowed(&message, internal) {
                return Err(record.invalid_state_error());
            }
            if message.kind.is_mutating()
                && message.kind != MessageType::DecRefCount
                && record.locked_by_other(thread)
            {
                return Err(KernelError::Permission);
            }
        }

        let mut ctx = DispatchContext::new(sent_to, target, internal, thread);
        pre::run(entry.pre, state.objects_mut()?, &mut ctx, &message)?;

        let (mut state, result) = self.execute(entry, state, &mut ctx, &mut message);
        if let Err(err) = result {
            if message.kind != MessageType::Destroy {
                let dropped = state.queue.take_for(target);
                if !dropped.is_empty() {
                    log::debug!("dropping {} queued messages for {target:?}", dropped.len());
                }
                return Err(err);
            }
            // The object goes regardless of what its handler thinks
            log::warn!("handler for {target:?} failed on destroy: {err}");
        }
        if state.objects().is_err() {
            // Shut down while the handler ran
            return Err(KernelError::Permission);
        }

        let post_result = state
            .objects_mut()
            .and_then(|objects| post::run(entry.post, objects, &mut ctx, &message));
        let queued = state.queue.take_for(target);
        let removed = ctx.removed.take();
        drop(state);
        drop(removed);

        if ctx.zeroise {
            log::info!("zeroise requested by {sent_to:?}");
            self.begin_shutdown();
        }
        for deferred in queued {
            let kind = deferred.message.kind;
            let sent_to = deferred.sent_to;
            let result = self.dispatch(sent_to, deferred.message, deferred.internal);
            log::trace!("queued {kind:?} for {sent_to:?} completed: {result:?}");
        }
        let follow_up_result = self.run_follow_ups(std::mem::take(&mut ctx.follow_ups));

        if let Err(err) = post_result {
            log::warn!("post-dispatch for {:?} on {target:?} failed: {err}", message.kind);
            internal_error!("post-dispatch failure");
        }
        follow_up_result?;

        if let Some(dependent) = ctx.forward {
            log::trace!("forwarding {:?} from {target:?} to {dependent:?}", message.kind);
            message.forwarded = true;
            return self.dispatch(dependent, message, true);
        }
        Ok(message.data)
    }

    /// Carry out a message that has passed every check
    fn execute<'a>(
        &'a self,
        entry: &HandlingEntry,
        mut state: StateGuard<'a>,
        ctx: &mut DispatchContext,
        message: &mut Message,
    ) -> (StateGuard<'a>, Result<()>) {
        if let Some(handler) = entry.handler {
            return self.run_kernel_handler(handler, state, ctx, message);
        }
        if is_property_message(message) {
            let result = state
                .objects_mut()
                .and_then(|objects| access_property(objects, ctx, message));
            return (state, result);
        }
        self.call_handler(state, ctx, message)
    }

    /// Hand the message to the object's own handler, without the kernel lock
    fn call_handler<'a>(
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

        let result = handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .handle(self, ctx.target, message);

        let mut state = self.lock_state();
        self.set_busy(&mut state, ctx.target, false);
        (state, result)
    }

    fn run_follow_ups(&self, follow_ups: Vec<FollowUp>) -> Result<()> {
        let mut result = Ok(());
        for follow_up in follow_ups {
            let outcome = match follow_up {
                FollowUp::Notify(handle, message) => {
                    if let Err(err) = self.dispatch(handle, message, true) {
                        log::debug!("notification to {handle:?} failed: {err}");
                    }
                    Ok(())
                }
                FollowUp::Destroy(handle) => self
                    .dispatch(handle, Message::bare(MessageType::Destroy), true)
                    .map(drop),
                FollowUp::UpdateKeyUsagePerms { context, certificate } => {
                    self.update_key_usage_perms(context, certificate)
                }
            };
            if result.is_ok() {
                result = outcome;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_id::AttributeId;
    use crate::config::KernelConfig;
    use crate::dispatch::{CreateArgs, MemoryObject};
    use crate::kernel::CreateObjectInfo;
    use crate::object_type::{ObjectType, SubType, SubTypeA};

    fn kernel() -> Kernel {
        let config = KernelConfig {
            run_self_test: false,
            ..KernelConfig::for_testing()
        };
        Kernel::start(config).unwrap()
    }

    fn create_des(kernel: &Kernel) -> ObjectHandle {
        let args = CreateArgs {
            arg1: crate::algo::ALGO_DES,
            ..CreateArgs::default()
        };
        let data = kernel
            .send(
                ObjectHandle::SYSTEM_DEVICE,
                Message::new(MessageType::DevCreateObject, ObjectType::Context as i32, MessageData::Create(args)),
            )
            .unwrap();
        data.as_handle().unwrap()
    }

    #[test]
    fn test_external_create_is_visible() {
        let kernel = kernel();
        let handle = create_des(&kernel);
        assert_eq!(
            kernel.send(handle, Message::set_attribute(AttributeId::CTXINFO_MODE, 2)),
            Ok(MessageData::Int(2))
        );
        assert_eq!(
            kernel.send(handle, Message::get_attribute(AttributeId::CTXINFO_MODE)),
            Ok(MessageData::Int(2))
        );
    }

    #[test]
    fn test_internal_object_hidden() {
        let kernel = kernel();
        let handle = kernel
            .create_object(CreateObjectInfo::new(
                ObjectType::Context,
                SubType::A(SubTypeA::CTX_CONV),
                MemoryObject::shared(),
            ))
            .unwrap();
        kernel
            .send_internal(handle, Message::set_attribute(AttributeId::IATTRIBUTE_STATUS, 0))
            .unwrap();
        assert_eq!(
            kernel.send(handle, Message::get_attribute(AttributeId::CTXINFO_MODE)),
            Err(KernelError::ArgObject)
        );
        assert!(kernel.send_internal(handle, Message::set_attribute(AttributeId::CTXINFO_MODE, 1)).is_ok());
    }

    #[test]
    fn test_missing_object() {
        let kernel = kernel();
        let stale = ObjectHandle::from_raw(0x3FF);
        assert_eq!(
            kernel.send(stale, Message::bare(MessageType::Destroy)),
            Err(KernelError::ArgObject)
        );
        assert_eq!(
            kernel.send_internal(stale, Message::bare(MessageType::Destroy)),
            Err(KernelError::NotFound)
        );
    }

    #[test]
    fn test_internal_only_message_refused() {
        let kernel = kernel();
        let handle = create_des(&kernel);
        assert_eq!(
            kernel.send(handle, Message::bare(MessageType::Clone)),
            Err(KernelError::Permission)
        );
    }

    #[test]
    fn test_bad_shape() {
        let kernel = kernel();
        let handle = create_des(&kernel);
        assert_eq!(
            kernel.send(handle, Message::new(MessageType::CtxEncrypt, 0, MessageData::Int(3))),
            Err(KernelError::ArgNum1)
        );
    }

    #[test]
    fn test_wrong_target_subtype() {
        let kernel = kernel();
        let handle = create_des(&kernel);
        assert_eq!(
            kernel.send(handle, Message::new(MessageType::CtxSign, 0, MessageData::Bytes(vec![0; 20]))),
            Err(KernelError::ArgObject)
        );
    }

    #[test]
    fn test_unknown_attribute() {
        let kernel = kernel();
        let handle = create_des(&kernel);
        assert_eq!(
            kernel.send(handle, Message::get_attribute(AttributeId(99_999))),
            Err(KernelError::ArgValue)
        );
    }

    #[test]
    fn test_destroy_invalidates_handle() {
        let kernel = kernel();
        let handle = create_des(&kernel);
        kernel.send(handle, Message::bare(MessageType::Destroy)).unwrap();
        assert!(!kernel.is_valid(handle));
        assert_eq!(
            kernel.send(handle, Message::get_attribute(AttributeId::CTXINFO_MODE)),
            Err(KernelError::ArgObject)
        );
    }
}
