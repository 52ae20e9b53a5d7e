//! Dependency ACL
//!
//! Which objects may be bound to which. A context keyed from a certificate
//! depends on it and vice versa, envelopes and sessions depend on their
//! session keys, contexts on the device that holds the key, and every
//! object may depend on the system device.

use crate::error::internal_error;
use crate::limits::{KEYUSAGE_CRYPT, KEYUSAGE_SIGN};
use crate::object_type::{ObjectType, SubTypeA, SubTypeB, SubTypeC, SubTypeSet};
use crate::objects::{Action, ActionLevel, ActionPerms, ObjectHandle, ObjectTable};
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct DependencyAcl {
    pub object_type: ObjectType,
    pub subtypes: SubTypeSet,
    pub dependent_type: ObjectType,
    pub dependent_subtypes: SubTypeSet,
}

/// Where a dependency is recorded on the depending object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencySlot {
    Object,
    Device,
}

const SESSION_KEYS: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_CONV.union(SubTypeA::CTX_MAC));

pub static DEPENDENCY_ACL: [DependencyAcl; 6] = [
    DependencyAcl {
        object_type: ObjectType::Envelope,
        subtypes: SubTypeSet::b(SubTypeB::ENV_ANY),
        dependent_type: ObjectType::Context,
        dependent_subtypes: SESSION_KEYS,
    },
    DependencyAcl {
        object_type: ObjectType::Session,
        subtypes: SubTypeSet::c(SubTypeC::SESS_ANY),
        dependent_type: ObjectType::Context,
        dependent_subtypes: SESSION_KEYS,
    },
    DependencyAcl {
        object_type: ObjectType::Context,
        subtypes: SubTypeSet::a(SubTypeA::CTX_PKC),
        dependent_type: ObjectType::Certificate,
        dependent_subtypes: SubTypeSet::a(SubTypeA::CERT_ANY_CERT),
    },
    DependencyAcl {
        object_type: ObjectType::Certificate,
        subtypes: SubTypeSet::a(SubTypeA::CERT_ANY_CERT),
        dependent_type: ObjectType::Context,
        dependent_subtypes: SubTypeSet::a(SubTypeA::CTX_PKC),
    },
    DependencyAcl {
        object_type: ObjectType::Context,
        subtypes: SubTypeSet::a(SubTypeA::CTX_ANY),
        dependent_type: ObjectType::Device,
        dependent_subtypes: SubTypeSet::b(SubTypeB::DEV_ANY_STD),
    },
    DependencyAcl {
        object_type: ObjectType::Device,
        subtypes: SubTypeSet::b(SubTypeB::DEV_HW),
        dependent_type: ObjectType::Keyset,
        dependent_subtypes: SubTypeSet::b(SubTypeB::KEYSET_FILE),
    },
];

/// Check that `dependent` may be bound to `object`, returning the slot it
/// goes into
pub fn check_dependency(objects: &ObjectTable, object: ObjectHandle, dependent: ObjectHandle) -> Result<DependencySlot> {
    let (Some(record), Some(target)) = (objects.get(object), objects.get(dependent)) else {
        internal_error!("dependency between invalid objects");
    };
    let slot = if target.object_type == ObjectType::Device {
        DependencySlot::Device
    } else {
        DependencySlot::Object
    };

    if dependent == ObjectHandle::SYSTEM_DEVICE {
        if record.dependent_device.is_some() {
            internal_error!("object already has a dependent device");
        }
        return Ok(slot);
    }
    if object == dependent || target.dependent_object == Some(object) || target.dependent_device == Some(object) {
        log::debug!("refusing dependency loop {object:?} <-> {dependent:?}");
        internal_error!("dependency loop");
    }
    if record.object_type == target.object_type {
        internal_error!("same-type dependency");
    }
    let occupied = match slot {
        DependencySlot::Object => record.dependent_object.is_some(),
        // The system device is only a placeholder until a real device is bound
        DependencySlot::Device => record
            .dependent_device
            .is_some_and(|device| device != ObjectHandle::SYSTEM_DEVICE),
    };
    if occupied {
        internal_error!("dependency slot already in use");
    }

    let allowed = DEPENDENCY_ACL.iter().any(|acl| {
        acl.object_type == record.object_type
            && acl.subtypes.contains(record.subtype)
            && acl.dependent_type == target.object_type
            && acl.dependent_subtypes.contains(target.subtype)
    });
    if !allowed {
        log::debug!(
            "no dependency ACL for {:?}/{:?} -> {:?}/{:?}",
            record.object_type,
            record.subtype,
            target.object_type,
            target.subtype
        );
        internal_error!("dependency not permitted");
    }
    Ok(slot)
}

/// Action permissions a PKC context keeps once a certificate with the
/// given key usage is bound to it
pub fn perms_for_key_usage(key_usage: i32) -> ActionPerms {
    let level = |bits: i32| {
        if key_usage & bits != 0 {
            ActionLevel::NoneExternal
        } else {
            ActionLevel::NotAvail
        }
    };
    ActionPerms::ALL
        .with(Action::Sign, level(KEYUSAGE_SIGN))
        .with(Action::SigCheck, level(KEYUSAGE_SIGN))
        .with(Action::Encrypt, level(KEYUSAGE_CRYPT))
        .with(Action::Decrypt, level(KEYUSAGE_CRYPT))
}

/// Init-time consistency check of the dependency ACL
pub fn check_tables() -> Result<()> {
    for acl in &DEPENDENCY_ACL {
        if acl.object_type == acl.dependent_type
            || !acl.subtypes.is_subset_of(acl.object_type.subtypes())
            || !acl.dependent_subtypes.is_subset_of(acl.dependent_type.subtypes())
        {
            log::error!("dependency ACL {:?} -> {:?} is inconsistent", acl.object_type, acl.dependent_type);
            internal_error!("inconsistent dependency ACL");
        }
    }
    log::debug!("dependency ACL verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemoryObject;
    use crate::limits::KEYUSAGE_DIGITALSIGNATURE;
    use crate::object_type::SubType;
    use crate::objects::ObjectRecord;
    use crate::KernelError;

    fn add(table: &mut ObjectTable, object_type: ObjectType, subtype: SubType) -> ObjectHandle {
        table.allocate(ObjectRecord::new(object_type, subtype, MemoryObject::shared())).unwrap()
    }

    fn table() -> ObjectTable {
        let mut table = ObjectTable::new(256, 256, 17).unwrap();
        table
            .insert_system(
                ObjectHandle::SYSTEM_DEVICE,
                ObjectRecord::new(ObjectType::Device, SubType::B(SubTypeB::DEV_SYSTEM), MemoryObject::shared()),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_tables_consistent() {
        assert_eq!(check_tables(), Ok(()));
    }

    #[test]
    fn test_allowed_pairs() {
        let mut table = table();
        let rsa = add(&mut table, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC));
        let cert = add(&mut table, ObjectType::Certificate, SubType::A(SubTypeA::CERT_CERT));
        let aes = add(&mut table, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));
        let env = add(&mut table, ObjectType::Envelope, SubType::B(SubTypeB::ENV_ENV));
        let hw = add(&mut table, ObjectType::Device, SubType::B(SubTypeB::DEV_HW));

        assert_eq!(check_dependency(&table, rsa, cert), Ok(DependencySlot::Object));
        assert_eq!(check_dependency(&table, env, aes), Ok(DependencySlot::Object));
        assert_eq!(check_dependency(&table, aes, hw), Ok(DependencySlot::Device));
        assert_eq!(check_dependency(&table, env, ObjectHandle::SYSTEM_DEVICE), Ok(DependencySlot::Device));

        // A real device replaces the system device placeholder
        table.get_mut(aes).unwrap().dependent_device = Some(ObjectHandle::SYSTEM_DEVICE);
        assert_eq!(check_dependency(&table, aes, hw), Ok(DependencySlot::Device));
        assert!(matches!(check_dependency(&table, env, rsa), Err(KernelError::Internal { .. })));
    }

    #[test]
    fn test_loops_and_same_type() {
        let mut table = table();
        let rsa = add(&mut table, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC));
        let cert = add(&mut table, ObjectType::Certificate, SubType::A(SubTypeA::CERT_CERT));
        let aes = add(&mut table, ObjectType::Context, SubType::A(SubTypeA::CTX_CONV));
        table.get_mut(cert).unwrap().dependent_object = Some(rsa);

        assert!(check_dependency(&table, rsa, cert).is_err());
        assert!(check_dependency(&table, rsa, rsa).is_err());
        assert!(check_dependency(&table, aes, rsa).is_err());
    }

    #[test]
    fn test_key_usage_perms() {
        let perms = perms_for_key_usage(KEYUSAGE_DIGITALSIGNATURE);
        assert_eq!(perms.level(Action::Sign), ActionLevel::NoneExternal);
        assert_eq!(perms.level(Action::SigCheck), ActionLevel::NoneExternal);
        assert_eq!(perms.level(Action::Encrypt), ActionLevel::NotAvail);
        assert_eq!(perms.level(Action::Hash), ActionLevel::All);
    }
}
