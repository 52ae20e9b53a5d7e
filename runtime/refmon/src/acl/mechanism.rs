//! Mechanism ACLs
//!
//! Device-level operations (key wrap and unwrap, signing, signature checks
//! and key derivation) take a fixed list of parameters per mechanism. Each
//! table entry describes that list; a request must match it position by
//! position.
//!
//! Numeric and object parameters report failures through the numeric
//! argument errors, strings through the string argument errors. The first
//! parameter of a class maps to `ArgNum1`/`ArgStr1`, any later one to
//! `ArgNum2`/`ArgStr2`.

use super::types::{ObjectAcl, ObjectAclFlags};
use crate::algo::{ALGO_FIRST_HASH, ALGO_LAST_HASH};
use crate::dispatch::{MechanismInfo, MechanismParam};
use crate::error::internal_error;
use crate::limits::{
    MAX_ATTRIBUTE_SIZE, MAX_HASHSIZE, MAX_KEYSETUP_ITERATIONS, MAX_KEYSIZE, MAX_PKCSIZE,
    MIN_KEYSIZE, MIN_PKCSIZE,
};
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};
use crate::objects::{find_target_type, ObjectFlags, ObjectHandle, ObjectTable};
use crate::sync::ThreadToken;
use crate::{KernelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Mechanism {
    /// PKCS #1 key transport / signature
    Pkcs1 = 1,
    /// PKCS #1 with a PGP key-transport wrapper
    Pkcs1Pgp = 2,
    /// Raw PKCS #1 padding, used by SSL
    Pkcs1Raw = 3,
    Oaep = 4,
    /// CMS key wrap with a conventional key
    Cms = 5,
    PrivateKeyWrap = 6,
    Pkcs5 = 7,
    Ssl = 8,
    Tls = 9,
    Cmp = 10,
    Pgp = 11,
}

impl Mechanism {
    pub const ALL: [Mechanism; 11] = [
        Mechanism::Pkcs1,
        Mechanism::Pkcs1Pgp,
        Mechanism::Pkcs1Raw,
        Mechanism::Oaep,
        Mechanism::Cms,
        Mechanism::PrivateKeyWrap,
        Mechanism::Pkcs5,
        Mechanism::Ssl,
        Mechanism::Tls,
        Mechanism::Cmp,
        Mechanism::Pgp,
    ];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| *m as i32 == value)
    }
}

/// Device operation a mechanism is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanismOp {
    /// Key export
    Wrap,
    /// Key import
    Unwrap,
    Sign,
    SigCheck,
    Derive,
}

/// Constraint on one mechanism parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamAcl {
    Numeric { low: i32, high: i32 },
    String { min: i32, max: i32 },
    /// String that may be absent, used for output buffers when the caller
    /// only wants the length
    StringOpt { min: i32, max: i32 },
    Object(ObjectAcl),
    /// Must be left empty
    Unused,
}

#[derive(Debug, Clone, Copy)]
pub struct MechanismAcl {
    pub mechanism: Mechanism,
    pub params: &'static [ParamAcl],
}

const MAX_PRIVATE_KEYSIZE: i32 = MAX_PKCSIZE * 8;

const fn object(subtypes: SubTypeA, flags: ObjectAclFlags) -> ParamAcl {
    ParamAcl::Object(ObjectAcl::new(SubTypeSet::a(subtypes), flags))
}

const HIGH: ObjectAclFlags = ObjectAclFlags::HIGH_STATE;
const LOW: ObjectAclFlags = ObjectAclFlags::LOW_STATE;
const SESSION_KEY: SubTypeA = SubTypeA::CTX_CONV.union(SubTypeA::CTX_MAC);

const PKC_WRAPPED: ParamAcl = ParamAcl::StringOpt { min: MIN_PKCSIZE, max: MAX_PKCSIZE };
const PKC_WRAPPED_IN: ParamAcl = ParamAcl::String { min: MIN_PKCSIZE, max: MAX_PKCSIZE };
const CONV_WRAPPED: ParamAcl = ParamAcl::StringOpt { min: 8 + MIN_KEYSIZE, max: MAX_PKCSIZE };
const CONV_WRAPPED_IN: ParamAcl = ParamAcl::String { min: 8 + MIN_KEYSIZE, max: MAX_PKCSIZE };
const HASH_ALGO: ParamAcl = ParamAcl::Numeric { low: ALGO_FIRST_HASH, high: ALGO_LAST_HASH };
const ITERATIONS: ParamAcl = ParamAcl::Numeric { low: 1, high: MAX_KEYSETUP_ITERATIONS };
const SALT: ParamAcl = ParamAcl::StringOpt { min: 1, max: MAX_HASHSIZE * 2 };
const SECRET: ParamAcl = ParamAcl::String { min: 1, max: MAX_ATTRIBUTE_SIZE };

// Wrap: wrapped data, key to export, wrapping key, unused
const WRAP_PKC: [ParamAcl; 4] = [
    PKC_WRAPPED,
    object(SESSION_KEY, HIGH),
    object(SubTypeA::CTX_PKC, HIGH),
    ParamAcl::Unused,
];
const WRAP_PKC_PGP: [ParamAcl; 4] = [
    PKC_WRAPPED,
    object(SubTypeA::CTX_CONV, HIGH),
    object(SubTypeA::CTX_PKC, HIGH),
    ParamAcl::Unused,
];
const WRAP_CMS: [ParamAcl; 4] = [
    CONV_WRAPPED,
    object(SESSION_KEY, HIGH),
    object(SubTypeA::CTX_CONV, HIGH),
    ParamAcl::Unused,
];
const WRAP_PRIVATE_KEY: [ParamAcl; 4] = [
    ParamAcl::StringOpt { min: 16, max: MAX_PRIVATE_KEYSIZE },
    object(SubTypeA::CTX_PKC, HIGH),
    object(SubTypeA::CTX_CONV, HIGH),
    ParamAcl::Unused,
];

// Unwrap: wrapped data, key to import into, unwrapping key, unused
const UNWRAP_PKC: [ParamAcl; 4] = [
    PKC_WRAPPED_IN,
    object(SESSION_KEY, LOW),
    object(SubTypeA::CTX_PKC, HIGH),
    ParamAcl::Unused,
];
const UNWRAP_PKC_PGP: [ParamAcl; 4] = [
    PKC_WRAPPED_IN,
    object(SubTypeA::CTX_CONV, LOW),
    object(SubTypeA::CTX_PKC, HIGH),
    ParamAcl::Unused,
];
const UNWRAP_CMS: [ParamAcl; 4] = [
    CONV_WRAPPED_IN,
    object(SESSION_KEY, LOW),
    object(SubTypeA::CTX_CONV, HIGH),
    ParamAcl::Unused,
];
const UNWRAP_PRIVATE_KEY: [ParamAcl; 4] = [
    ParamAcl::String { min: 16, max: MAX_PRIVATE_KEYSIZE },
    object(SubTypeA::CTX_PKC, LOW),
    object(SubTypeA::CTX_CONV, HIGH),
    ParamAcl::Unused,
];

// Sign: signature, hash context, signing key
const SIGN: [ParamAcl; 3] = [
    PKC_WRAPPED,
    object(SubTypeA::CTX_HASH, HIGH),
    object(SubTypeA::CTX_PKC, HIGH),
];
// Signature check: signature, hash context, checking key
const SIG_CHECK: [ParamAcl; 3] = [
    PKC_WRAPPED_IN,
    object(SubTypeA::CTX_HASH, HIGH),
    object(SubTypeA::CTX_PKC, HIGH.union(ObjectAclFlags::ROUTE_TO_CTX)),
];

// Derive: derived key, hash algorithm, secret, salt, iterations
const DERIVE_PBKDF: [ParamAcl; 5] = [
    ParamAcl::String { min: MIN_KEYSIZE, max: MAX_KEYSIZE },
    HASH_ALGO,
    SECRET,
    SALT,
    ITERATIONS,
];
const DERIVE_PRF: [ParamAcl; 5] = [
    ParamAcl::String { min: 48, max: 512 },
    ParamAcl::Unused,
    ParamAcl::String { min: 48, max: 48 },
    ParamAcl::String { min: 64, max: 512 },
    ParamAcl::Unused,
];
const DERIVE_CMP: [ParamAcl; 5] = [
    ParamAcl::String { min: 20, max: 20 },
    HASH_ALGO,
    SECRET,
    SALT,
    ITERATIONS,
];

pub static WRAP_ACL: [MechanismAcl; 6] = [
    MechanismAcl { mechanism: Mechanism::Pkcs1, params: &WRAP_PKC },
    MechanismAcl { mechanism: Mechanism::Pkcs1Pgp, params: &WRAP_PKC_PGP },
    MechanismAcl { mechanism: Mechanism::Pkcs1Raw, params: &WRAP_PKC },
    MechanismAcl { mechanism: Mechanism::Oaep, params: &WRAP_PKC },
    MechanismAcl { mechanism: Mechanism::Cms, params: &WRAP_CMS },
    MechanismAcl { mechanism: Mechanism::PrivateKeyWrap, params: &WRAP_PRIVATE_KEY },
];

pub static UNWRAP_ACL: [MechanismAcl; 6] = [
    MechanismAcl { mechanism: Mechanism::Pkcs1, params: &UNWRAP_PKC },
    MechanismAcl { mechanism: Mechanism::Pkcs1Pgp, params: &UNWRAP_PKC_PGP },
    MechanismAcl { mechanism: Mechanism::Pkcs1Raw, params: &UNWRAP_PKC },
    MechanismAcl { mechanism: Mechanism::Oaep, params: &UNWRAP_PKC },
    MechanismAcl { mechanism: Mechanism::Cms, params: &UNWRAP_CMS },
    MechanismAcl { mechanism: Mechanism::PrivateKeyWrap, params: &UNWRAP_PRIVATE_KEY },
];

pub static SIGN_ACL: [MechanismAcl; 1] = [MechanismAcl { mechanism: Mechanism::Pkcs1, params: &SIGN }];

pub static SIG_CHECK_ACL: [MechanismAcl; 1] = [MechanismAcl { mechanism: Mechanism::Pkcs1, params: &SIG_CHECK }];

pub static DERIVE_ACL: [MechanismAcl; 5] = [
    MechanismAcl { mechanism: Mechanism::Pkcs5, params: &DERIVE_PBKDF },
    MechanismAcl { mechanism: Mechanism::Ssl, params: &DERIVE_PRF },
    MechanismAcl { mechanism: Mechanism::Tls, params: &DERIVE_PRF },
    MechanismAcl { mechanism: Mechanism::Cmp, params: &DERIVE_CMP },
    MechanismAcl { mechanism: Mechanism::Pgp, params: &DERIVE_PBKDF },
];

pub fn table_for(op: MechanismOp) -> &'static [MechanismAcl] {
    match op {
        MechanismOp::Wrap => &WRAP_ACL,
        MechanismOp::Unwrap => &UNWRAP_ACL,
        MechanismOp::Sign => &SIGN_ACL,
        MechanismOp::SigCheck => &SIG_CHECK_ACL,
        MechanismOp::Derive => &DERIVE_ACL,
    }
}

/// Position of the exported key in a wrap parameter list
const EXPORTED_KEY_PARAM: usize = 1;

/// Who is asking, and through which device
#[derive(Debug, Clone, Copy)]
pub struct MechanismCaller {
    pub device: ObjectHandle,
    pub internal: bool,
    pub thread: ThreadToken,
}

const fn numeric_error(position: usize) -> KernelError {
    if position == 0 {
        KernelError::ArgNum1
    } else {
        KernelError::ArgNum2
    }
}

const fn string_error(position: usize) -> KernelError {
    if position == 0 {
        KernelError::ArgStr1
    } else {
        KernelError::ArgStr2
    }
}

fn length_ok(bytes: &[u8], min: i32, max: i32) -> bool {
    i32::try_from(bytes.len()).is_ok_and(|len| (min..=max).contains(&len))
}

/// Check a mechanism request against its ACL
pub fn check_mechanism(
    objects: &ObjectTable,
    op: MechanismOp,
    mechanism: i32,
    info: &MechanismInfo,
    caller: &MechanismCaller,
) -> Result<()> {
    let acl = Mechanism::from_raw(mechanism)
        .and_then(|mechanism| table_for(op).iter().find(|acl| acl.mechanism == mechanism))
        .ok_or(KernelError::ArgValue)?;
    if info.params.len() != acl.params.len() {
        return Err(KernelError::ArgNum1);
    }

    let mut numeric = 0;
    let mut strings = 0;
    for (index, (rule, param)) in acl.params.iter().zip(&info.params).enumerate() {
        match (*rule, param) {
            (ParamAcl::Numeric { low, high }, param) => {
                if !matches!(param, MechanismParam::Int(value) if (low..=high).contains(value)) {
                    return Err(numeric_error(numeric));
                }
                numeric += 1;
            }
            (ParamAcl::Unused, param) => {
                if !param.is_empty() {
                    return Err(numeric_error(numeric));
                }
                numeric += 1;
            }
            (ParamAcl::String { min, max }, param) => {
                if !matches!(param, MechanismParam::Bytes(Some(bytes)) if length_ok(bytes, min, max)) {
                    return Err(string_error(strings));
                }
                strings += 1;
            }
            (ParamAcl::StringOpt { min, max }, param) => {
                let ok = match param {
                    MechanismParam::Bytes(None) => true,
                    MechanismParam::Bytes(Some(bytes)) => length_ok(bytes, min, max),
                    _ => false,
                };
                if !ok {
                    return Err(string_error(strings));
                }
                strings += 1;
            }
            (ParamAcl::Object(object_acl), param) => {
                let MechanismParam::Object(Some(handle)) = param else {
                    return Err(numeric_error(numeric));
                };
                if !object_ok(objects, &object_acl, *handle, caller) {
                    return Err(numeric_error(numeric));
                }
                if op == MechanismOp::Wrap
                    && index == EXPORTED_KEY_PARAM
                    && objects
                        .get(*handle)
                        .is_some_and(|record| record.flags.contains(ObjectFlags::NONEXPORTABLE))
                {
                    log::debug!("refusing to export non-exportable key {handle:?}");
                    return Err(KernelError::Permission);
                }
                numeric += 1;
            }
        }
    }
    Ok(())
}

fn object_ok(objects: &ObjectTable, acl: &ObjectAcl, handle: ObjectHandle, caller: &MechanismCaller) -> bool {
    let Some(record) = objects.get(handle) else {
        return false;
    };
    if record.in_invalid_state() {
        return false;
    }
    if !caller.internal && (record.is_internal() || !record.accessible_by(caller.thread)) {
        return false;
    }
    // Objects used with the system device may belong to any user
    if caller.device != ObjectHandle::SYSTEM_DEVICE && !objects.same_owner(caller.device, handle) {
        return false;
    }
    let checked = if acl.flags.contains(ObjectAclFlags::ROUTE_TO_CTX) {
        find_target_type(objects, handle, ObjectType::Context).and_then(|ctx| objects.get(ctx))
    } else {
        Some(record)
    };
    checked.is_some_and(|record| acl.subtypes.contains(record.subtype) && acl.state_ok(record.is_high()))
}

/// Init-time consistency check of the mechanism tables
pub fn check_tables() -> Result<()> {
    let ops = [
        MechanismOp::Wrap,
        MechanismOp::Unwrap,
        MechanismOp::Sign,
        MechanismOp::SigCheck,
        MechanismOp::Derive,
    ];
    for op in ops {
        let table = table_for(op);
        for (index, acl) in table.iter().enumerate() {
            if table[..index].iter().any(|other| other.mechanism == acl.mechanism) {
                log::error!("{op:?} mechanism ACL lists {:?} twice", acl.mechanism);
                internal_error!("duplicate mechanism ACL entry");
            }
            if acl.params.is_empty() {
                log::error!("{op:?} mechanism ACL for {:?} has no parameters", acl.mechanism);
                internal_error!("empty mechanism ACL");
            }
            for param in acl.params {
                let ok = match *param {
                    ParamAcl::Numeric { low, high } => low <= high,
                    ParamAcl::String { min, max } | ParamAcl::StringOpt { min, max } => {
                        min > 0 && min <= max
                    }
                    ParamAcl::Object(object) => {
                        !object.subtypes.is_empty()
                            && object.flags.intersects(ObjectAclFlags::ANY_STATE)
                            && object.subtypes.is_subset_of(SubTypeSet::a(SubTypeA::CTX_ANY))
                    }
                    ParamAcl::Unused => true,
                };
                if !ok {
                    log::error!("{op:?} mechanism ACL for {:?} has a bad parameter", acl.mechanism);
                    internal_error!("inconsistent mechanism parameter ACL");
                }
            }
        }
    }
    log::debug!("mechanism ACL tables verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemoryObject;
    use crate::object_type::{SubType, SubTypeB};
    use crate::objects::ObjectRecord;

    fn add(table: &mut ObjectTable, subtype: SubTypeA, high: bool) -> ObjectHandle {
        let mut record = ObjectRecord::new(ObjectType::Context, SubType::A(subtype), MemoryObject::shared());
        record.flags = if high { ObjectFlags::HIGH } else { ObjectFlags::empty() };
        record.owner = Some(ObjectHandle::DEFAULT_USER);
        table.allocate(record).unwrap()
    }

    const CALLER: MechanismCaller = MechanismCaller {
        device: ObjectHandle::SYSTEM_DEVICE,
        internal: false,
        thread: 1,
    };

    fn wrap_params(key: ObjectHandle, wrapper: ObjectHandle) -> MechanismInfo {
        MechanismInfo {
            params: vec![
                MechanismParam::Bytes(None),
                MechanismParam::Object(Some(key)),
                MechanismParam::Object(Some(wrapper)),
                MechanismParam::Int(0),
            ],
        }
    }

    #[test]
    fn test_tables_consistent() {
        assert_eq!(check_tables(), Ok(()));
    }

    #[test]
    fn test_unknown_mechanism_and_param_count() {
        let table = ObjectTable::new(256, 256, 3).unwrap();
        let empty = MechanismInfo { params: vec![] };
        assert_eq!(
            check_mechanism(&table, MechanismOp::Wrap, 99, &empty, &CALLER),
            Err(KernelError::ArgValue)
        );
        // Known mechanism, wrong operation
        assert_eq!(
            check_mechanism(&table, MechanismOp::Sign, Mechanism::Cms as i32, &empty, &CALLER),
            Err(KernelError::ArgValue)
        );
        assert_eq!(
            check_mechanism(&table, MechanismOp::Wrap, Mechanism::Pkcs1 as i32, &empty, &CALLER),
            Err(KernelError::ArgNum1)
        );
    }

    #[test]
    fn test_wrap_object_positions() {
        let mut table = ObjectTable::new(256, 256, 3).unwrap();
        let session = add(&mut table, SubTypeA::CTX_CONV, true);
        let rsa = add(&mut table, SubTypeA::CTX_PKC, true);
        let low_rsa = add(&mut table, SubTypeA::CTX_PKC, false);
        let pkcs1 = Mechanism::Pkcs1 as i32;

        assert!(check_mechanism(&table, MechanismOp::Wrap, pkcs1, &wrap_params(session, rsa), &CALLER).is_ok());
        assert_eq!(
            check_mechanism(&table, MechanismOp::Wrap, pkcs1, &wrap_params(rsa, rsa), &CALLER),
            Err(KernelError::ArgNum1)
        );
        assert_eq!(
            check_mechanism(&table, MechanismOp::Wrap, pkcs1, &wrap_params(session, low_rsa), &CALLER),
            Err(KernelError::ArgNum2)
        );
    }

    #[test]
    fn test_non_exportable_key_refused() {
        let mut table = ObjectTable::new(256, 256, 3).unwrap();
        let session = add(&mut table, SubTypeA::CTX_CONV, true);
        let rsa = add(&mut table, SubTypeA::CTX_PKC, true);
        table.get_mut(session).unwrap().flags.insert(ObjectFlags::NONEXPORTABLE);
        assert_eq!(
            check_mechanism(
                &table,
                MechanismOp::Wrap,
                Mechanism::Pkcs1 as i32,
                &wrap_params(session, rsa),
                &CALLER
            ),
            Err(KernelError::Permission)
        );
    }

    #[test]
    fn test_sig_check_errors_name_the_bad_context() {
        let mut table = ObjectTable::new(256, 256, 3).unwrap();
        let hash = add(&mut table, SubTypeA::CTX_HASH, true);
        let rsa = add(&mut table, SubTypeA::CTX_PKC, true);
        let sig = vec![0u8; MIN_PKCSIZE as usize];
        let params = |h, k| MechanismInfo {
            params: vec![
                MechanismParam::Bytes(Some(sig.clone())),
                MechanismParam::Object(Some(h)),
                MechanismParam::Object(Some(k)),
            ],
        };
        let pkcs1 = Mechanism::Pkcs1 as i32;
        assert!(check_mechanism(&table, MechanismOp::SigCheck, pkcs1, &params(hash, rsa), &CALLER).is_ok());
        assert_eq!(
            check_mechanism(&table, MechanismOp::SigCheck, pkcs1, &params(rsa, rsa), &CALLER),
            Err(KernelError::ArgNum1)
        );
        assert_eq!(
            check_mechanism(&table, MechanismOp::SigCheck, pkcs1, &params(hash, hash), &CALLER),
            Err(KernelError::ArgNum2)
        );
    }

    #[test]
    fn test_derive_strings_and_numbers() {
        let table = ObjectTable::new(256, 256, 3).unwrap();
        let params = |out: usize, algo: i32, secret: usize| MechanismInfo {
            params: vec![
                MechanismParam::Bytes(Some(vec![0; out])),
                MechanismParam::Int(algo),
                MechanismParam::Bytes(Some(vec![1; secret])),
                MechanismParam::Bytes(None),
                MechanismParam::Int(1000),
            ],
        };
        let pkcs5 = Mechanism::Pkcs5 as i32;
        assert!(check_mechanism(&table, MechanismOp::Derive, pkcs5, &params(16, ALGO_FIRST_HASH + 3, 8), &CALLER).is_ok());
        assert_eq!(
            check_mechanism(&table, MechanismOp::Derive, pkcs5, &params(2, ALGO_FIRST_HASH, 8), &CALLER),
            Err(KernelError::ArgStr1)
        );
        assert_eq!(
            check_mechanism(&table, MechanismOp::Derive, pkcs5, &params(16, 1, 8), &CALLER),
            Err(KernelError::ArgNum1)
        );
        assert_eq!(
            check_mechanism(&table, MechanismOp::Derive, pkcs5, &params(16, ALGO_FIRST_HASH, 0), &CALLER),
            Err(KernelError::ArgStr2)
        );
    }

    #[test]
    fn test_owner_checked_for_other_devices() {
        let mut table = ObjectTable::new(256, 256, 3).unwrap();
        let session = add(&mut table, SubTypeA::CTX_CONV, true);
        let rsa = add(&mut table, SubTypeA::CTX_PKC, true);
        let mut device = ObjectRecord::new(
            ObjectType::Device,
            SubType::B(SubTypeB::DEV_HW),
            MemoryObject::shared(),
        );
        device.owner = Some(ObjectHandle::from_raw(0x3FF));
        let device = table.allocate(device).unwrap();
        let caller = MechanismCaller { device, ..CALLER };
        assert_eq!(
            check_mechanism(
                &table,
                MechanismOp::Wrap,
                Mechanism::Pkcs1 as i32,
                &wrap_params(session, rsa),
                &caller
            ),
            Err(KernelError::ArgNum1)
        );
    }
}
