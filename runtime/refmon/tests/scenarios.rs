//! End-to-end scenarios
//!
//! - Numeric range fenceposts on a [1,50] attribute
//! - Private key into a keyset: password first, then key state
//! - Advisory lock held by one thread blocks another's property writes

mod common;

use common::*;
use refmon::acl::key_mgmt::{KeyIdType, KeyItem};
use refmon::acl::range::check_numeric;
use refmon::acl::{check_attribute_access, find_attribute_acl, perm, AccessOp, AttributeAcl, AttributeRequest, AttributeValue};
use refmon::algo::{ALGO_DES, ALGO_RSA};
use refmon::objects::{ObjectRecord, ObjectTable};
use refmon::*;

// ============================================================================
// Scenario A: numeric range
// ============================================================================

static STEPPING_LIKE: AttributeAcl = AttributeAcl::numeric(
    AttributeId::OPTION_INFO_STEPPING,
    SubTypeSet::c(SubTypeC::USER_ANY),
    perm("RWx_RWx"),
    1,
    50,
);

/// The shipped [1,50] entry rejects 0 and 51 and accepts both ends
#[test]
fn test_scenario_a_shipped_range() {
    let acl = find_attribute_acl(AttributeId::OPTION_INFO_STEPPING, false).expect("stepping ACL");
    assert!(!check_numeric(&acl.range, 0));
    assert!(check_numeric(&acl.range, 1));
    assert!(check_numeric(&acl.range, 50));
    assert!(!check_numeric(&acl.range, 51));
}

/// A writable [1,50] attribute goes through the full access check with
/// the same outcome
#[test]
fn test_scenario_a_write() {
    let mut table = ObjectTable::new(256, 256, 3).unwrap();
    let mut record = ObjectRecord::new(ObjectType::User, SubType::C(SubTypeC::USER_NORMAL), MemoryObject::shared());
    record.flags = ObjectFlags::empty();
    let user = table.allocate(record).unwrap();

    let write = |value| {
        let request = AttributeRequest {
            op: AccessOp::Write,
            string_message: false,
            value: AttributeValue::Int(value),
            internal: false,
            thread: 1,
        };
        check_attribute_access(&table, user, &STEPPING_LIKE, &request).map(drop)
    };
    assert_eq!(write(0), Err(KernelError::ArgNum1));
    assert_eq!(write(1), Ok(()));
    assert_eq!(write(50), Ok(()));
    assert_eq!(write(51), Err(KernelError::ArgNum1));
}

/// The shipped entry is read-only, so a write is refused before any range
/// check
#[test]
fn test_scenario_a_read_only_through_kernel() {
    let kernel = kernel();
    assert_eq!(
        kernel.send(
            ObjectHandle::DEFAULT_USER,
            Message::set_attribute(AttributeId::OPTION_INFO_STEPPING, 1)
        ),
        Err(KernelError::Permission)
    );
}

// ============================================================================
// Scenario B: private key into a keyset
// ============================================================================

fn store_private_key(kernel: &Kernel, keyset: ObjectHandle, key: ObjectHandle, password: Option<&[u8]>) -> Result<MessageData> {
    let mut info = KeyMgmtInfo::with_id(KeyIdType::Name, b"signing key").object(key);
    if let Some(password) = password {
        info = info.aux(password);
    }
    kernel.send(
        keyset,
        Message::new(MessageType::KeySetKey, KeyItem::PrivateKey as i32, MessageData::Key(info)),
    )
}

/// Without a password the write fails on the string parameter
#[test]
fn test_scenario_b_no_password() {
    let kernel = kernel();
    let keyset = file_keyset(&kernel);
    let rsa = context(&kernel, ALGO_RSA);
    assert_eq!(store_private_key(&kernel, keyset, rsa, None), Err(KernelError::ArgStr1));
}

/// With a password, a key that was never loaded fails on the numeric
/// parameter
#[test]
fn test_scenario_b_low_state_key() {
    let kernel = kernel();
    let keyset = file_keyset(&kernel);
    let rsa = context(&kernel, ALGO_RSA);
    assert_eq!(
        store_private_key(&kernel, keyset, rsa, Some(b"correct horse")),
        Err(KernelError::ArgNum1)
    );
}

/// A conventional key isn't a private key at all
#[test]
fn test_scenario_b_wrong_key_type() {
    let kernel = kernel();
    let keyset = file_keyset(&kernel);
    let des = context(&kernel, ALGO_DES);
    load_key(&kernel, des);
    assert_eq!(
        store_private_key(&kernel, keyset, des, Some(b"correct horse")),
        Err(KernelError::ArgNum1)
    );
}

// ============================================================================
// Scenario C: advisory lock across threads
// ============================================================================

/// Thread 2's property write fails while thread 1 holds the lock and
/// succeeds once it lets go
#[test]
fn test_scenario_c_lock_blocks_other_thread() {
    let kernel = kernel();
    let keyset = file_keyset(&kernel);
    let guard = kernel.acquire_object(keyset, ObjectType::Keyset).unwrap();

    let set_usage = |count| kernel.send(keyset, Message::set_attribute(AttributeId::PROPERTY_USAGECOUNT, count));

    crossbeam::scope(|scope| {
        let blocked = scope.spawn(|_| set_usage(10)).join().unwrap();
        assert_eq!(blocked, Err(KernelError::Permission));
    })
    .unwrap();

    drop(guard);

    crossbeam::scope(|scope| {
        let allowed = scope.spawn(|_| set_usage(10)).join().unwrap();
        assert!(allowed.is_ok());
    })
    .unwrap();
}

/// The lock holder itself isn't blocked, and reads by others go through
#[test]
fn test_scenario_c_holder_and_readers() {
    let kernel = kernel();
    let keyset = file_keyset(&kernel);
    let _guard = kernel.acquire_object(keyset, ObjectType::Keyset).unwrap();

    assert!(kernel
        .send(keyset, Message::set_attribute(AttributeId::PROPERTY_USAGECOUNT, 5))
        .is_ok());

    crossbeam::scope(|scope| {
        let read = scope
            .spawn(|_| kernel.send(keyset, Message::get_attribute(AttributeId::PROPERTY_USAGECOUNT)))
            .join()
            .unwrap();
        assert_eq!(read, Ok(MessageData::Int(5)));
    })
    .unwrap();
}
