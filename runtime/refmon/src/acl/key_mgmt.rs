//! Key management ACL
//!
//! Governs every movement of key material in and out of keysets and
//! devices. A request is checked three ways:
//!
//! 1. the **item type** (public key, private key, request, ...) names the
//!    keyset subtypes that support each kind of access, the objects that
//!    can be stored, and whether an id or password is needed
//! 2. the **keyset subtype** of the target must be allowed for the access
//! 3. the **id type** used for the lookup must be legal both for the item
//!    and for the keyset subtype ([`ID_TYPE_ACL`])

use bitflags::bitflags;

use crate::dispatch::KeyMgmtInfo;
use crate::error::internal_error;
use crate::limits::{MAX_ATTRIBUTE_SIZE, MIN_NAME_LENGTH};
use crate::object_type::{ObjectType, SubType, SubTypeA, SubTypeB};
use crate::objects::{find_target_type, ObjectHandle, ObjectTable};
use crate::{KernelError, Result};

/// Kind of item moved in or out of a keyset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KeyItem {
    PublicKey = 1,
    PrivateKey = 2,
    SecretKey = 3,
    Request = 4,
    RevRequest = 5,
    PkiUser = 6,
    RevocationInfo = 7,
    KeyMetadata = 8,
    Data = 9,
}

impl KeyItem {
    pub const ALL: [KeyItem; 9] = [
        KeyItem::PublicKey,
        KeyItem::PrivateKey,
        KeyItem::SecretKey,
        KeyItem::Request,
        KeyItem::RevRequest,
        KeyItem::PkiUser,
        KeyItem::RevocationInfo,
        KeyItem::KeyMetadata,
        KeyItem::Data,
    ];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|item| *item as i32 == value)
    }
}

/// Kind of id a keyset lookup is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyIdType {
    /// No id, for cursor-style queries
    #[default]
    None,
    Name,
    Uri,
    // The rest are internal-only
    KeyId,
    PgpKeyId,
    CertId,
    IssuerId,
    IssuerAndSerialNumber,
}

impl KeyIdType {
    pub const fn is_internal(self) -> bool {
        !matches!(self, KeyIdType::None | KeyIdType::Name | KeyIdType::Uri)
    }
}

/// Access kind requested by a key management message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAccess {
    Read,
    Write,
    Delete,
    GetFirst,
    GetNext,
}

bitflags! {
    /// Which accesses need an id (or a password)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyUse: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const DELETE = 1 << 2;
        const GET_FIRST = 1 << 3;
    }
}

impl KeyUse {
    const fn of(access: KeyAccess) -> KeyUse {
        match access {
            KeyAccess::Read => KeyUse::READ,
            KeyAccess::Write => KeyUse::WRITE,
            KeyAccess::Delete => KeyUse::DELETE,
            KeyAccess::GetFirst | KeyAccess::GetNext => KeyUse::GET_FIRST,
        }
    }
}

bitflags! {
    /// Modifiers carried by a key management request
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyMgmtFlags: u16 {
        /// Only check that the item exists
        const CHECK_ONLY = 1 << 0;
        /// Only fetch the item's label
        const LABEL_ONLY = 1 << 1;
        /// Update an existing item in place
        const UPDATE = 1 << 2;
        /// First operation in a multi-step exchange
        const INITIAL_OP = 1 << 3;
        /// Fetch the issuer rather than the subject
        const GET_ISSUER = 1 << 4;
        const USAGE_CRYPT = 1 << 5;
        const USAGE_SIGN = 1 << 6;
        /// Return only the leaf of a chain
        const LEAF_ONLY = 1 << 7;
        /// Return the data-only form of the certificate
        const DATA_ONLY_CERT = 1 << 8;

        const USAGE_MASK = Self::USAGE_CRYPT.bits() | Self::USAGE_SIGN.bits();
        const CERT_OPTIONS = Self::LEAF_ONLY.bits() | Self::DATA_ONLY_CERT.bits();
    }
}

/// Policy for one [`KeyItem`]
#[derive(Debug, Clone, Copy)]
pub struct KeysetAcl {
    pub item: KeyItem,
    pub read: SubTypeB,
    pub write: SubTypeB,
    pub delete: SubTypeB,
    pub get_first_next: SubTypeB,
    pub query: SubTypeB,
    /// Objects that can be stored as this item
    pub objects: SubTypeA,
    /// Keysets that need a more specific object than `objects`
    pub specific_keysets: SubTypeB,
    pub specific_objects: SubTypeA,
    pub allowed_flags: KeyMgmtFlags,
    pub id_use: KeyUse,
    pub password_use: KeyUse,
    pub id_types: &'static [KeyIdType],
}

impl KeysetAcl {
    fn allowed(&self, access: KeyAccess) -> SubTypeB {
        match access {
            KeyAccess::Read => self.read,
            KeyAccess::Write => self.write,
            KeyAccess::Delete => self.delete,
            KeyAccess::GetFirst | KeyAccess::GetNext => self.get_first_next,
        }
    }
}

const FILE: SubTypeB = SubTypeB::KEYSET_FILE;
const FILE_PARTIAL: SubTypeB = SubTypeB::KEYSET_FILE_PARTIAL;
const FILE_RO: SubTypeB = SubTypeB::KEYSET_FILE_RO;
const DBMS: SubTypeB = SubTypeB::KEYSET_DBMS;
const STORE: SubTypeB = SubTypeB::KEYSET_DBMS_STORE;
const LDAP: SubTypeB = SubTypeB::KEYSET_LDAP;
const P11: SubTypeB = SubTypeB::DEV_P11;
const CAPI: SubTypeB = SubTypeB::DEV_CAPI;
const HW: SubTypeB = SubTypeB::DEV_HW;
const NONE: SubTypeB = SubTypeB::empty();

const fn set(parts: &[SubTypeB]) -> SubTypeB {
    let mut bits = SubTypeB::empty();
    let mut i = 0;
    while i < parts.len() {
        bits = bits.union(parts[i]);
        i += 1;
    }
    bits
}

const PUBLIC_PRIVATE_IDS: [KeyIdType; 7] = [
    KeyIdType::Name,
    KeyIdType::Uri,
    KeyIdType::KeyId,
    KeyIdType::PgpKeyId,
    KeyIdType::CertId,
    KeyIdType::IssuerId,
    KeyIdType::IssuerAndSerialNumber,
];
const SECRET_KEY_IDS: [KeyIdType; 2] = [KeyIdType::Name, KeyIdType::KeyId];
const REQUEST_IDS: [KeyIdType; 3] = [KeyIdType::Name, KeyIdType::Uri, KeyIdType::CertId];
const REV_REQUEST_IDS: [KeyIdType; 1] = [KeyIdType::Name];
const PKI_USER_IDS: [KeyIdType; 4] = [
    KeyIdType::Name,
    KeyIdType::Uri,
    KeyIdType::KeyId,
    KeyIdType::CertId,
];
const REV_INFO_IDS: [KeyIdType; 2] = [KeyIdType::CertId, KeyIdType::IssuerId];

const ID_FRD: KeyUse = KeyUse::GET_FIRST.union(KeyUse::READ).union(KeyUse::DELETE);
const ID_RD: KeyUse = KeyUse::READ.union(KeyUse::DELETE);
const ID_RWD: KeyUse = ID_RD.union(KeyUse::WRITE);

const CERT_OR_CHAIN: SubTypeA = SubTypeA::CERT_CERT.union(SubTypeA::CERT_CERTCHAIN);

/// One entry per [`KeyItem`], in item order
pub static KEYSET_ACL: [KeysetAcl; 9] = [
    KeysetAcl {
        item: KeyItem::PublicKey,
        read: set(&[SubTypeB::KEYSET_ANY, P11, CAPI, HW]),
        write: set(&[FILE, FILE_PARTIAL, DBMS, LDAP, P11, CAPI, HW]),
        delete: set(&[FILE, DBMS, LDAP, P11, CAPI, HW]),
        get_first_next: set(&[FILE, DBMS, STORE, P11, CAPI, HW]),
        query: set(&[DBMS, STORE, LDAP]),
        objects: SubTypeA::CTX_PKC.union(CERT_OR_CHAIN),
        specific_keysets: set(&[DBMS, STORE, LDAP, P11, CAPI]),
        specific_objects: CERT_OR_CHAIN,
        allowed_flags: KeyMgmtFlags::CHECK_ONLY
            .union(KeyMgmtFlags::LABEL_ONLY)
            .union(KeyMgmtFlags::CERT_OPTIONS),
        id_use: ID_FRD,
        password_use: KeyUse::empty(),
        id_types: &PUBLIC_PRIVATE_IDS,
    },
    KeysetAcl {
        item: KeyItem::PrivateKey,
        read: set(&[FILE, FILE_PARTIAL, FILE_RO, P11, CAPI, HW]),
        write: set(&[FILE, FILE_PARTIAL, P11, CAPI, HW]),
        delete: set(&[FILE, P11, CAPI, HW]),
        get_first_next: NONE,
        query: NONE,
        objects: SubTypeA::CTX_PKC,
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::CHECK_ONLY
            .union(KeyMgmtFlags::LABEL_ONLY)
            .union(KeyMgmtFlags::USAGE_MASK),
        id_use: ID_RD,
        password_use: KeyUse::WRITE,
        id_types: &PUBLIC_PRIVATE_IDS,
    },
    KeysetAcl {
        item: KeyItem::SecretKey,
        read: set(&[FILE, P11]),
        write: set(&[FILE, P11]),
        delete: set(&[FILE, P11]),
        get_first_next: NONE,
        query: NONE,
        objects: SubTypeA::CTX_CONV,
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::CHECK_ONLY,
        id_use: ID_RD,
        password_use: KeyUse::WRITE,
        id_types: &SECRET_KEY_IDS,
    },
    KeysetAcl {
        item: KeyItem::Request,
        read: STORE,
        write: STORE,
        delete: NONE,
        get_first_next: NONE,
        query: STORE,
        objects: SubTypeA::CERT_CERTREQ.union(SubTypeA::CERT_REQ_CERT),
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::UPDATE.union(KeyMgmtFlags::INITIAL_OP),
        id_use: ID_FRD,
        password_use: KeyUse::empty(),
        id_types: &REQUEST_IDS,
    },
    KeysetAcl {
        item: KeyItem::RevRequest,
        read: STORE,
        write: STORE,
        delete: NONE,
        get_first_next: NONE,
        query: STORE,
        objects: SubTypeA::CERT_REQ_REV,
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::empty(),
        id_use: ID_FRD,
        password_use: KeyUse::empty(),
        id_types: &REV_REQUEST_IDS,
    },
    KeysetAcl {
        item: KeyItem::PkiUser,
        read: STORE,
        write: STORE,
        delete: STORE,
        get_first_next: NONE,
        query: NONE,
        objects: SubTypeA::CERT_PKIUSER,
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::GET_ISSUER,
        id_use: ID_FRD,
        password_use: KeyUse::empty(),
        id_types: &PKI_USER_IDS,
    },
    KeysetAcl {
        item: KeyItem::RevocationInfo,
        read: DBMS.union(STORE),
        write: DBMS,
        delete: NONE,
        get_first_next: NONE,
        query: NONE,
        objects: SubTypeA::CERT_CRL,
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::CHECK_ONLY,
        id_use: ID_FRD,
        password_use: KeyUse::empty(),
        id_types: &REV_INFO_IDS,
    },
    KeysetAcl {
        item: KeyItem::KeyMetadata,
        read: NONE,
        write: FILE,
        delete: NONE,
        get_first_next: NONE,
        query: NONE,
        objects: SubTypeA::CTX_PKC,
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::empty(),
        id_use: ID_RD,
        password_use: KeyUse::empty(),
        id_types: &PUBLIC_PRIVATE_IDS,
    },
    KeysetAcl {
        item: KeyItem::Data,
        read: FILE,
        write: FILE,
        delete: NONE,
        get_first_next: NONE,
        query: NONE,
        objects: SubTypeA::empty(),
        specific_keysets: NONE,
        specific_objects: SubTypeA::empty(),
        allowed_flags: KeyMgmtFlags::empty(),
        id_use: ID_RWD,
        password_use: KeyUse::empty(),
        id_types: &[],
    },
];

/// Keyset and device subtypes each id type can be looked up in
pub static ID_TYPE_ACL: [(KeyIdType, SubTypeB); 7] = [
    (KeyIdType::Name, set(&[SubTypeB::KEYSET_ANY, P11, CAPI, HW])),
    (KeyIdType::Uri, set(&[SubTypeB::KEYSET_ANY, P11, HW])),
    (KeyIdType::KeyId, set(&[FILE, FILE_RO, DBMS, STORE, P11, HW])),
    (KeyIdType::PgpKeyId, set(&[FILE, FILE_RO, HW])),
    (KeyIdType::CertId, set(&[DBMS, STORE])),
    (KeyIdType::IssuerId, set(&[FILE, DBMS, STORE, HW])),
    (KeyIdType::IssuerAndSerialNumber, set(&[FILE, DBMS, STORE, P11, HW])),
];

fn acl_for(item: KeyItem) -> &'static KeysetAcl {
    &KEYSET_ACL[item as usize - 1]
}

fn id_type_allowed(id_type: KeyIdType, subtype: SubTypeB) -> bool {
    ID_TYPE_ACL
        .iter()
        .any(|(kind, keysets)| *kind == id_type && keysets.contains(subtype))
}

fn family_b(subtype: SubType) -> SubTypeB {
    match subtype {
        SubType::B(b) => b,
        _ => SubTypeB::empty(),
    }
}

fn family_a(subtype: SubType) -> SubTypeA {
    match subtype {
        SubType::A(a) => a,
        _ => SubTypeA::empty(),
    }
}

/// Check a key management request against the keyset ACL.
///
/// `target` is the keyset or device the message was routed to and `item`
/// the raw item type carried in the message value.
pub fn check_keyset_access(
    objects: &ObjectTable,
    target: ObjectHandle,
    access: KeyAccess,
    item: i32,
    info: &KeyMgmtInfo,
    internal: bool,
) -> Result<()> {
    let Some(item) = KeyItem::from_raw(item) else {
        return Err(KernelError::ArgValue);
    };
    let acl = acl_for(item);
    let record = objects.lookup(target)?;
    let keyset_type = family_b(record.subtype);
    let is_device = record.object_type == ObjectType::Device;

    // Keyset subtype against the access kind
    match (access, info.state) {
        (KeyAccess::GetFirst | KeyAccess::GetNext, None) => {
            if !acl.query.contains(keyset_type) || keyset_type.is_empty() {
                return Err(if info.id_type == KeyIdType::None {
                    KernelError::ArgNum1
                } else {
                    KernelError::ArgStr1
                });
            }
        }
        _ => {
            if keyset_type.is_empty() || !acl.allowed(access).contains(keyset_type) {
                return Err(KernelError::ArgObject);
            }
        }
    }

    if !acl.allowed_flags.contains(info.flags) {
        if internal {
            internal_error!("key management flags not valid for the item type");
        }
        return Err(KernelError::ArgNum2);
    }

    let id_required = acl.id_use.contains(KeyUse::of(access));
    if id_required {
        check_id(acl, keyset_type, info, internal)?;
    }

    if matches!(item, KeyItem::PrivateKey | KeyItem::SecretKey) {
        if !is_device {
            if acl.password_use.contains(KeyUse::of(access)) {
                let length = info.aux.as_ref().map_or(0, Vec::len);
                if !(MIN_NAME_LENGTH as usize..MAX_ATTRIBUTE_SIZE as usize).contains(&length) {
                    return Err(KernelError::ArgStr1);
                }
            }
        } else if !info.flags.contains(KeyMgmtFlags::LABEL_ONLY) && info.aux.is_some() {
            // Devices authenticate at login, never per key
            return Err(if id_required {
                KernelError::ArgStr2
            } else {
                KernelError::ArgStr1
            });
        }
    }

    if access == KeyAccess::Write {
        check_stored_object(objects, target, acl, keyset_type, info)?;
    }
    Ok(())
}

fn check_id(acl: &KeysetAcl, keyset_type: SubTypeB, info: &KeyMgmtInfo, internal: bool) -> Result<()> {
    if info.id_type == KeyIdType::None || (!internal && info.id_type.is_internal()) {
        return Err(KernelError::ArgNum1);
    }
    let length = info.id.len();
    if length < MIN_NAME_LENGTH as usize || length >= MAX_ATTRIBUTE_SIZE as usize {
        return Err(KernelError::ArgStr1);
    }
    if !acl.id_types.contains(&info.id_type) || !id_type_allowed(info.id_type, keyset_type) {
        log::debug!(
            "id type {:?} not usable for {:?} in keyset {:?}",
            info.id_type,
            acl.item,
            keyset_type
        );
        return Err(KernelError::NotFound);
    }
    Ok(())
}

fn check_stored_object(
    objects: &ObjectTable,
    target: ObjectHandle,
    acl: &KeysetAcl,
    keyset_type: SubTypeB,
    info: &KeyMgmtInfo,
) -> Result<()> {
    if acl.objects.is_empty() {
        // Opaque data items carry no object
        return match info.object {
            None => Ok(()),
            Some(_) => Err(KernelError::ArgNum1),
        };
    }
    let Some(handle) = info.object else {
        return Err(KernelError::ArgNum1);
    };
    let Some(mut record) = objects.get(handle) else {
        return Err(KernelError::ArgNum1);
    };
    if record.in_invalid_state() || !objects.same_owner(target, handle) {
        return Err(KernelError::ArgNum1);
    }

    if !acl.objects.contains(family_a(record.subtype)) || family_a(record.subtype).is_empty() {
        // A certificate with a key behind it can stand in for the key
        let context = (acl.objects == SubTypeA::CTX_PKC)
            .then(|| find_target_type(objects, handle, ObjectType::Context))
            .flatten()
            .and_then(|ctx| objects.get(ctx));
        match context {
            Some(ctx) if acl.objects.contains(family_a(ctx.subtype)) => record = ctx,
            _ => return Err(KernelError::ArgNum1),
        }
    }

    // PKI user records, revocation requests and key metadata are stored
    // unsigned
    let unsigned_ok = matches!(
        acl.item,
        KeyItem::PkiUser | KeyItem::RevRequest | KeyItem::KeyMetadata
    );
    if !record.is_high() && !unsigned_ok {
        return Err(KernelError::ArgNum1);
    }

    if acl.specific_keysets.contains(keyset_type) {
        let cert = find_target_type(objects, handle, ObjectType::Certificate)
            .and_then(|cert| objects.get(cert));
        match cert {
            Some(cert) if acl.specific_objects.contains(family_a(cert.subtype)) && cert.is_high() => {}
            _ => return Err(KernelError::ArgNum1),
        }
    }
    Ok(())
}

/// Init-time consistency check of the keyset tables
pub fn check_tables() -> Result<()> {
    let storage = SubTypeB::KEYSET_ANY.union(SubTypeB::DEV_ANY_STD);
    let storable = SubTypeA::CTX_ANY.union(SubTypeA::CERT_ANY);

    for (index, acl) in KEYSET_ACL.iter().enumerate() {
        if acl.item as usize != index + 1 {
            log::error!("keyset ACL entry {index} is out of item order");
            internal_error!("keyset ACL out of order");
        }
        let access_sets = [acl.read, acl.write, acl.delete, acl.get_first_next, acl.query];
        if access_sets.iter().any(|set| !storage.contains(*set)) {
            log::error!("keyset ACL for {:?} names a non-keyset subtype", acl.item);
            internal_error!("keyset ACL subtype outside keysets and devices");
        }
        if !storable.contains(acl.objects)
            || (!acl.specific_keysets.is_empty() && acl.specific_objects.is_empty())
        {
            log::error!("keyset ACL for {:?} has bad object subtypes", acl.item);
            internal_error!("keyset ACL object subtypes inconsistent");
        }
        if !acl.read.contains(acl.specific_keysets) {
            log::error!("keyset ACL for {:?} refines an unreadable keyset", acl.item);
            internal_error!("keyset ACL specific keysets inconsistent");
        }
        if !acl.id_use.is_empty() && acl.id_types.is_empty() && acl.item != KeyItem::Data {
            log::error!("keyset ACL for {:?} needs an id but allows none", acl.item);
            internal_error!("keyset ACL id types inconsistent");
        }
    }
    for (id_type, keysets) in &ID_TYPE_ACL {
        if *id_type == KeyIdType::None || keysets.is_empty() || !storage.contains(*keysets) {
            log::error!("id type ACL entry for {id_type:?} is inconsistent");
            internal_error!("id type ACL inconsistent");
        }
    }
    log::debug!("keyset ACL tables verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemoryObject;
    use crate::objects::{ObjectFlags, ObjectRecord};

    fn add(table: &mut ObjectTable, object_type: ObjectType, subtype: SubType, high: bool) -> ObjectHandle {
        let mut record = ObjectRecord::new(object_type, subtype, MemoryObject::shared());
        record.flags = if high { ObjectFlags::HIGH } else { ObjectFlags::empty() };
        record.owner = Some(ObjectHandle::DEFAULT_USER);
        table.allocate(record).unwrap()
    }

    fn setup(keyset: SubTypeB) -> (ObjectTable, ObjectHandle) {
        let mut table = ObjectTable::new(256, 256, 21).unwrap();
        let object_type = if SubTypeB::DEV_ANY.contains(keyset) {
            ObjectType::Device
        } else {
            ObjectType::Keyset
        };
        let handle = add(&mut table, object_type, SubType::B(keyset), true);
        (table, handle)
    }

    fn named(name: &[u8]) -> KeyMgmtInfo {
        KeyMgmtInfo::with_id(KeyIdType::Name, name)
    }

    #[test]
    fn test_tables_consistent() {
        assert_eq!(check_tables(), Ok(()));
    }

    #[test]
    fn test_unknown_item() {
        let (table, keyset) = setup(FILE);
        let result = check_keyset_access(&table, keyset, KeyAccess::Read, 42, &named(b"alice"), false);
        assert_eq!(result, Err(KernelError::ArgValue));
    }

    #[test]
    fn test_keyset_subtype_per_access() {
        let (table, keyset) = setup(FILE_RO);
        let item = KeyItem::PrivateKey as i32;
        assert!(check_keyset_access(&table, keyset, KeyAccess::Read, item, &named(b"alice"), false).is_ok());
        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::Delete, item, &named(b"alice"), false),
            Err(KernelError::ArgObject)
        );
    }

    #[test]
    fn test_id_checks() {
        let (table, keyset) = setup(FILE);
        let item = KeyItem::PublicKey as i32;
        let external_internal_id = KeyMgmtInfo::with_id(KeyIdType::KeyId, &[7; 20]);
        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::Read, item, &external_internal_id, false),
            Err(KernelError::ArgNum1)
        );
        assert!(check_keyset_access(&table, keyset, KeyAccess::Read, item, &external_internal_id, true).is_ok());

        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::Read, item, &named(b"a"), false),
            Err(KernelError::ArgStr1)
        );

        // Cert ids only exist in database keysets
        let cert_id = KeyMgmtInfo::with_id(KeyIdType::CertId, &[1; 20]);
        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::Read, item, &cert_id, true),
            Err(KernelError::NotFound)
        );
    }

    #[test]
    fn test_private_key_write_needs_password_and_high_key() {
        let (mut table, keyset) = setup(FILE);
        let key = add(&mut table, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC), false);
        let item = KeyItem::PrivateKey as i32;

        let mut info = KeyMgmtInfo::default();
        info.object = Some(key);
        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::Write, item, &info, false),
            Err(KernelError::ArgStr1)
        );

        info.aux = Some(b"password".to_vec());
        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::Write, item, &info, false),
            Err(KernelError::ArgNum1)
        );

        table.get_mut(key).unwrap().flags.insert(ObjectFlags::HIGH);
        assert!(check_keyset_access(&table, keyset, KeyAccess::Write, item, &info, false).is_ok());
    }

    #[test]
    fn test_device_rejects_password() {
        let (mut table, device) = setup(HW);
        let key = add(&mut table, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC), true);
        let mut info = KeyMgmtInfo::default();
        info.object = Some(key);
        info.aux = Some(b"password".to_vec());
        assert_eq!(
            check_keyset_access(&table, device, KeyAccess::Write, KeyItem::PrivateKey as i32, &info, false),
            Err(KernelError::ArgStr1)
        );
        info.aux = None;
        assert!(
            check_keyset_access(&table, device, KeyAccess::Write, KeyItem::PrivateKey as i32, &info, false)
                .is_ok()
        );
    }

    #[test]
    fn test_query_without_cursor() {
        let (table, keyset) = setup(FILE);
        let info = KeyMgmtInfo::default();
        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::GetFirst, KeyItem::Request as i32, &info, false),
            Err(KernelError::ArgNum1)
        );
        let (table, store) = setup(STORE);
        let info = named(b"pending");
        assert!(
            check_keyset_access(&table, store, KeyAccess::GetFirst, KeyItem::Request as i32, &info, false).is_ok()
        );
    }

    #[test]
    fn test_public_key_into_database_needs_certificate() {
        let (mut table, keyset) = setup(DBMS);
        let ctx = add(&mut table, ObjectType::Context, SubType::A(SubTypeA::CTX_PKC), true);
        let mut info = KeyMgmtInfo::default();
        info.object = Some(ctx);
        assert_eq!(
            check_keyset_access(&table, keyset, KeyAccess::Write, KeyItem::PublicKey as i32, &info, false),
            Err(KernelError::ArgNum1)
        );

        let cert = add(&mut table, ObjectType::Certificate, SubType::A(SubTypeA::CERT_CERT), true);
        table.get_mut(cert).unwrap().dependent_object = Some(ctx);
        info.object = Some(cert);
        assert!(
            check_keyset_access(&table, keyset, KeyAccess::Write, KeyItem::PublicKey as i32, &info, false).is_ok()
        );
    }

    #[test]
    fn test_unsigned_items_may_be_low() {
        let (mut table, store) = setup(STORE);
        let user = add(&mut table, ObjectType::Certificate, SubType::A(SubTypeA::CERT_PKIUSER), false);
        let mut info = KeyMgmtInfo::default();
        info.object = Some(user);
        assert!(
            check_keyset_access(&table, store, KeyAccess::Write, KeyItem::PkiUser as i32, &info, false).is_ok()
        );
    }
}
