//! Object lifecycle through the public message interface
//!
//! - Creation leaves objects ready, external and owned by the default user
//! - Key loading moves contexts to the high state
//! - Usage counts run down and then block further actions
//! - Reference counts and advisory locks hold off destruction
//! - Destroyed handles are stale, system objects can't be destroyed

mod common;

use common::*;
use refmon::algo::{ALGO_AES, ALGO_DES, ALGO_RSA, ALGO_SHA1};
use refmon::*;

fn encrypt(kernel: &Kernel, context: ObjectHandle) -> Result<MessageData> {
    kernel.send(
        context,
        Message::new(MessageType::CtxEncrypt, 0, MessageData::Bytes(vec![0; 16])),
    )
}

fn destroy(kernel: &Kernel, handle: ObjectHandle) -> Result<MessageData> {
    kernel.send(handle, Message::bare(MessageType::Destroy))
}

// ============================================================================
// Creation and state
// ============================================================================

/// A fresh conventional context refuses actions until keyed
#[test]
fn test_action_needs_key() {
    let kernel = kernel();
    let aes = context(&kernel, ALGO_AES);
    assert_eq!(encrypt(&kernel, aes), Err(KernelError::NotInited));

    load_key(&kernel, aes);
    let sealed = encrypt(&kernel, aes).unwrap();
    assert_eq!(sealed.as_bytes().map(<[u8]>::len), Some(16));
    assert_ne!(sealed, MessageData::Bytes(vec![0; 16]));
}

/// Until its creator marks it ready, an object's handler sees nothing, not
/// even internal messages
#[test]
fn test_unfinished_object_refuses_key_load() {
    let kernel = kernel();
    let handle = kernel
        .create_object(CreateObjectInfo::new(
            ObjectType::Context,
            SubType::A(SubTypeA::CTX_CONV),
            MemoryObject::shared(),
        ))
        .unwrap();
    let key_load = || Message::set_attribute_s(AttributeId::CTXINFO_KEY, &[0x42; 16]);
    let encrypt_internal =
        || Message::new(MessageType::CtxEncrypt, 0, MessageData::Bytes(vec![0; 16]));

    assert_eq!(kernel.send_internal(handle, key_load()), Err(KernelError::NotInited));
    assert_eq!(
        kernel.send_internal(handle, Message::set_attribute(AttributeId::CTXINFO_MODE, 2)),
        Err(KernelError::NotInited)
    );

    // Record properties are still the creator's to read and set
    assert_eq!(
        kernel.send_internal(handle, Message::get_attribute(AttributeId::IATTRIBUTE_STATUS)),
        Ok(MessageData::Int(1))
    );
    kernel
        .send_internal(handle, Message::set_attribute(AttributeId::IATTRIBUTE_STATUS, 0))
        .unwrap();

    // The refused key load left the context unkeyed
    assert_eq!(kernel.send_internal(handle, encrypt_internal()), Err(KernelError::NotInited));
    kernel.send_internal(handle, key_load()).unwrap();
    assert!(kernel.send_internal(handle, encrypt_internal()).is_ok());
}

/// Hash contexts work without a key
#[test]
fn test_hash_needs_no_key() {
    let kernel = kernel();
    let sha1 = context(&kernel, ALGO_SHA1);
    let result = kernel.send(
        sha1,
        Message::new(MessageType::CtxHash, 0, MessageData::Bytes(b"abc".to_vec())),
    );
    assert!(result.is_ok());
}

/// Keying is one-way: a second key load and key generation are refused
#[test]
fn test_high_state_is_final() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    load_key(&kernel, des);

    assert_eq!(
        kernel.send(des, Message::set_attribute_s(AttributeId::CTXINFO_KEY, &[0x11; 16])),
        Err(KernelError::Permission)
    );
    assert_eq!(
        kernel.send(des, Message::bare(MessageType::CtxGenKey)),
        Err(KernelError::Inited)
    );
}

/// Generating a key moves a PKC context to the high state
#[test]
fn test_genkey_moves_to_high_state() {
    let kernel = kernel();
    let rsa = context(&kernel, ALGO_RSA);
    kernel.send(rsa, Message::bare(MessageType::CtxGenKey)).unwrap();
    assert_eq!(
        kernel.send(rsa, Message::bare(MessageType::CtxGenKey)),
        Err(KernelError::Inited)
    );
}

// ============================================================================
// Usage counts
// ============================================================================

/// Exactly N actions succeed after the usage count is set to N
#[test]
fn test_usage_count_runs_down() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    load_key(&kernel, des);
    kernel
        .send(des, Message::set_attribute(AttributeId::PROPERTY_USAGECOUNT, 3))
        .unwrap();

    for remaining in (0..3).rev() {
        encrypt(&kernel, des).unwrap();
        assert_eq!(
            kernel.send(des, Message::get_attribute(AttributeId::PROPERTY_USAGECOUNT)),
            Ok(MessageData::Int(remaining))
        );
    }
    assert_eq!(encrypt(&kernel, des), Err(KernelError::Permission));
}

/// A usage count can only go down, and zero isn't a valid setting
#[test]
fn test_usage_count_only_decreases() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    let set = |count| kernel.send(des, Message::set_attribute(AttributeId::PROPERTY_USAGECOUNT, count));

    assert_eq!(set(0), Err(KernelError::ArgNum1));
    set(5).unwrap();
    assert_eq!(set(6), Err(KernelError::Permission));
    set(2).unwrap();
}

/// Locking the properties freezes the counts
#[test]
fn test_locked_properties() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    kernel
        .send(des, Message::set_attribute(AttributeId::PROPERTY_FORWARDCOUNT, 3))
        .unwrap();
    kernel
        .send(des, Message::set_attribute(AttributeId::PROPERTY_LOCKED, 1))
        .unwrap();

    assert_eq!(
        kernel.send(des, Message::get_attribute(AttributeId::PROPERTY_LOCKED)),
        Ok(MessageData::Int(1))
    );
    assert_eq!(
        kernel.send(des, Message::set_attribute(AttributeId::PROPERTY_FORWARDCOUNT, 2)),
        Err(KernelError::Permission)
    );
    assert_eq!(
        kernel.send(des, Message::get_attribute(AttributeId::PROPERTY_FORWARDCOUNT)),
        Err(KernelError::Permission)
    );
    assert_eq!(
        kernel.send(des, Message::set_attribute(AttributeId::PROPERTY_USAGECOUNT, 1)),
        Err(KernelError::Permission)
    );
}

// ============================================================================
// Destruction
// ============================================================================

/// After destruction the handle is stale for every kind of caller
#[test]
fn test_destroyed_handle_is_stale() {
    let kernel = kernel();
    let count = kernel.object_count();
    let des = context(&kernel, ALGO_DES);
    assert_eq!(kernel.object_count(), count + 1);

    destroy(&kernel, des).unwrap();
    assert!(!kernel.is_valid(des));
    assert_eq!(kernel.object_count(), count);
    assert_eq!(
        kernel.send(des, Message::get_attribute(AttributeId::PROPERTY_USAGECOUNT)),
        Err(KernelError::ArgObject)
    );
    assert_eq!(
        kernel.send_internal(des, Message::get_attribute(AttributeId::PROPERTY_USAGECOUNT)),
        Err(KernelError::NotFound)
    );
}

/// A referenced object survives destroy until the references are dropped;
/// dropping the last one destroys it
#[test]
fn test_references_hold_off_destroy() {
    let kernel = kernel();
    let des = context(&kernel, ALGO_DES);
    kernel.send(des, Message::bare(MessageType::IncRefCount)).unwrap();

    assert_eq!(destroy(&kernel, des), Err(KernelError::Permission));
    assert!(kernel.is_valid(des));

    kernel.send(des, Message::bare(MessageType::DecRefCount)).unwrap();
    assert!(kernel.is_valid(des));
    kernel.send(des, Message::bare(MessageType::DecRefCount)).unwrap();
    assert!(!kernel.is_valid(des));
}

/// An advisory lock holds off destroy until released
#[test]
fn test_lock_holds_off_destroy() {
    let kernel = kernel();
    let keyset = file_keyset(&kernel);
    {
        let _guard = kernel.acquire_object(keyset, ObjectType::Keyset).unwrap();
        assert_eq!(destroy(&kernel, keyset), Err(KernelError::Permission));
    }
    destroy(&kernel, keyset).unwrap();
    assert!(!kernel.is_valid(keyset));
}

/// The system device and default user can't be destroyed or released
#[test]
fn test_system_objects_are_permanent() {
    let kernel = kernel();
    for handle in [ObjectHandle::SYSTEM_DEVICE, ObjectHandle::DEFAULT_USER] {
        assert_eq!(
            kernel.send_internal(handle, Message::bare(MessageType::Destroy)),
            Err(KernelError::Permission)
        );
        kernel.send_internal(handle, Message::bare(MessageType::DecRefCount)).unwrap();
        assert!(kernel.is_valid(handle));
    }
}

/// Handles of destroyed objects are not handed out again straight away
#[test]
fn test_handles_not_reused_immediately() {
    let kernel = kernel();
    let first = context(&kernel, ALGO_DES);
    destroy(&kernel, first).unwrap();
    let second = context(&kernel, ALGO_DES);
    assert_ne!(first, second);
    assert!(!kernel.is_valid(first));
}
