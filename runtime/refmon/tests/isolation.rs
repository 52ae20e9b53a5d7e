//! What external callers can and can't see
//!
//! - Internal objects, attributes and messages are invisible from outside
//! - Unknown and stale handles look the same as internal ones
//! - Objects bound to a thread are invisible to every other thread

mod common;

use common::*;
use refmon::algo::ALGO_DES;
use refmon::attr_id::UNUSED;
use refmon::*;

// ============================================================================
// Internal objects and attributes
// ============================================================================

/// Internal objects answer internal messages only
#[test]
fn test_internal_object() {
    let kernel = kernel();
    let hidden = internal_object(&kernel, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));

    assert_eq!(
        kernel.send(hidden, Message::set_attribute(AttributeId::CTXINFO_MODE, 2)),
        Err(KernelError::ArgObject)
    );
    kernel
        .send_internal(hidden, Message::set_attribute(AttributeId::CTXINFO_MODE, 2))
        .unwrap();
    assert_eq!(
        kernel.send_internal(hidden, Message::get_attribute(AttributeId::CTXINFO_MODE)),
        Ok(MessageData::Int(2))
    );
}

/// Making an object external opens it up, and taking that back hides it
/// again
#[test]
fn test_internal_flag_toggles_visibility() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    let internal = |value| Message::set_attribute(AttributeId::IATTRIBUTE_INTERNAL, value);
    let probe = || kernel.send(des, Message::get_attribute(AttributeId::PROPERTY_LOCKED));

    assert!(probe().is_ok());
    kernel.send_internal(des, internal(1)).unwrap();
    assert_eq!(probe(), Err(KernelError::ArgObject));
    kernel.send_internal(des, internal(0)).unwrap();
    assert!(probe().is_ok());
}

/// Internal attributes don't exist for external callers, even on external
/// objects
#[test]
fn test_internal_attribute() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    assert_eq!(
        kernel.send(des, Message::get_attribute(AttributeId::IATTRIBUTE_TYPE)),
        Err(KernelError::ArgValue)
    );
    assert_eq!(
        kernel.send_internal(des, Message::get_attribute(AttributeId::IATTRIBUTE_TYPE)),
        Ok(MessageData::Int(ObjectType::Context as i32))
    );
}

/// Messages reserved for the kernel and object backends are refused
#[test]
fn test_internal_only_messages() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    let get_dependent = Message::new(MessageType::GetDependent, ObjectType::Device as i32, MessageData::None);
    assert_eq!(kernel.send(des, get_dependent.clone()), Err(KernelError::Permission));
    assert_eq!(
        kernel.send_internal(des, get_dependent),
        Ok(MessageData::Handle(ObjectHandle::SYSTEM_DEVICE))
    );
    assert_eq!(
        kernel.send(des, Message::bare(MessageType::Clone)),
        Err(KernelError::Permission)
    );
}

/// An object still being created can't be used from outside
#[test]
fn test_uninitialised_object() {
    let kernel = kernel();
    let handle = kernel
        .create_object(
            CreateObjectInfo::new(ObjectType::Context, SubType::A(SubTypeA::CTX_CONV), MemoryObject::shared())
                .flags(CreateFlags::EXTERNAL),
        )
        .unwrap();
    assert!(kernel
        .send(handle, Message::set_attribute(AttributeId::CTXINFO_MODE, 2))
        .is_err());

    kernel
        .send_internal(handle, Message::set_attribute(AttributeId::IATTRIBUTE_STATUS, 0))
        .unwrap();
    kernel
        .send(handle, Message::set_attribute(AttributeId::CTXINFO_MODE, 2))
        .unwrap();
}

// ============================================================================
// Handles
// ============================================================================

/// A handle that was never issued is reported like an internal object
#[test]
fn test_unknown_handle() {
    let kernel = kernel();
    let bogus = ObjectHandle::from_raw(0x00ff_0123);
    assert_eq!(
        kernel.send(bogus, Message::get_attribute(AttributeId::PROPERTY_LOCKED)),
        Err(KernelError::ArgObject)
    );
    assert_eq!(
        kernel.send_internal(bogus, Message::get_attribute(AttributeId::PROPERTY_LOCKED)),
        Err(KernelError::NotFound)
    );
}

/// Messages routed to the wrong kind of object are refused
#[test]
fn test_message_for_wrong_object_type() {
    let kernel = kernel();
    let keyset = file_keyset(&kernel);
    assert_eq!(
        kernel.send(
            keyset,
            Message::new(MessageType::CtxEncrypt, 0, MessageData::Bytes(vec![0; 8]))
        ),
        Err(KernelError::ArgObject)
    );
}

// ============================================================================
// Thread binding
// ============================================================================

/// An object bound to one thread is invisible to the others until
/// released
#[test]
fn test_thread_bound_object() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    kernel
        .send(des, Message::set_attribute(AttributeId::PROPERTY_OWNER, 1))
        .unwrap();
    assert_eq!(
        kernel.send(des, Message::get_attribute(AttributeId::PROPERTY_OWNER)),
        Ok(MessageData::Int(current_thread()))
    );

    let probe = || kernel.send(des, Message::get_attribute(AttributeId::PROPERTY_LOCKED));
    crossbeam::scope(|scope| {
        let seen = scope.spawn(|_| probe()).join().unwrap();
        assert_eq!(seen, Err(KernelError::ArgObject));
    })
    .unwrap();

    kernel
        .send(des, Message::set_attribute(AttributeId::PROPERTY_OWNER, UNUSED))
        .unwrap();
    crossbeam::scope(|scope| {
        let seen = scope.spawn(|_| probe()).join().unwrap();
        assert_eq!(seen, Ok(MessageData::Int(0)));
    })
    .unwrap();
}

/// The kernel itself isn't bound by thread ownership
#[test]
fn test_internal_ignores_thread_binding() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    kernel
        .send(des, Message::set_attribute(AttributeId::PROPERTY_OWNER, 1))
        .unwrap();
    crossbeam::scope(|scope| {
        let seen = scope
            .spawn(|_| kernel.send_internal(des, Message::get_attribute(AttributeId::PROPERTY_LOCKED)))
            .join()
            .unwrap();
        assert_eq!(seen, Ok(MessageData::Int(0)));
    })
    .unwrap();
}
