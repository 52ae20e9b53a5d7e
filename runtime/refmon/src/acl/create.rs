//! Object creation ACL
//!
//! Objects created through a device take up to two numeric and two string
//! arguments. The first numeric argument selects the subtype (the
//! algorithm for contexts), the second carries type-specific options, and
//! the strings carry names, URLs or passwords.

use crate::algo::{ALGO_FIRST_CONVENTIONAL, ALGO_LAST_GENERIC};
use crate::dispatch::CreateArgs;
use crate::error::internal_error;
use crate::limits::{MAX_ATTRIBUTE_SIZE, MIN_NAME_LENGTH};
use crate::object_type::{ObjectType, SubType, SubTypeA, SubTypeB, SubTypeC};
use crate::{KernelError, Result};

/// Constraint on a string creation argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringArg {
    Absent,
    Optional { min: i32, max: i32 },
    Required { min: i32, max: i32 },
}

impl StringArg {
    fn accepts(self, value: Option<&[u8]>) -> bool {
        let in_bounds = |bytes: &[u8], min: i32, max: i32| {
            i32::try_from(bytes.len()).is_ok_and(|len| (min..=max).contains(&len))
        };
        match (self, value) {
            (StringArg::Absent, None) | (StringArg::Optional { .. }, None) => true,
            (StringArg::Absent, Some(_)) | (StringArg::Required { .. }, None) => false,
            (StringArg::Optional { min, max }, Some(bytes))
            | (StringArg::Required { min, max }, Some(bytes)) => in_bounds(bytes, min, max),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CreateAcl {
    pub object_type: ObjectType,
    pub arg1: (i32, i32),
    pub arg2: (i32, i32),
    pub str1: StringArg,
    pub str2: StringArg,
}

const fn count(bits: u32) -> i32 {
    bits.count_ones() as i32
}

const NAME: StringArg = StringArg::Required { min: MIN_NAME_LENGTH, max: MAX_ATTRIBUTE_SIZE };

/// Keyset open options: none, read-only, create
const KEYSET_OPTIONS: (i32, i32) = (0, 2);

/// One entry per object type, in type order
pub static CREATE_ACL: [CreateAcl; 7] = [
    CreateAcl {
        object_type: ObjectType::Context,
        arg1: (ALGO_FIRST_CONVENTIONAL, ALGO_LAST_GENERIC),
        arg2: (0, 0),
        str1: StringArg::Absent,
        str2: StringArg::Absent,
    },
    CreateAcl {
        object_type: ObjectType::Keyset,
        arg1: (1, count(SubTypeB::KEYSET_ANY.bits())),
        arg2: KEYSET_OPTIONS,
        str1: NAME,
        str2: StringArg::Absent,
    },
    CreateAcl {
        object_type: ObjectType::Envelope,
        arg1: (1, count(SubTypeB::ENV_ANY.bits())),
        arg2: (0, 0),
        str1: StringArg::Absent,
        str2: StringArg::Absent,
    },
    CreateAcl {
        object_type: ObjectType::Certificate,
        arg1: (1, count(SubTypeA::CERT_ANY.bits())),
        arg2: (0, 0),
        str1: StringArg::Absent,
        str2: StringArg::Absent,
    },
    // The system device can't be created a second time
    CreateAcl {
        object_type: ObjectType::Device,
        arg1: (2, count(SubTypeB::DEV_ANY.bits())),
        arg2: (0, 0),
        str1: StringArg::Optional { min: MIN_NAME_LENGTH, max: MAX_ATTRIBUTE_SIZE },
        str2: StringArg::Absent,
    },
    CreateAcl {
        object_type: ObjectType::Session,
        arg1: (1, count(SubTypeC::SESS_ANY.bits())),
        arg2: (0, 0),
        str1: StringArg::Absent,
        str2: StringArg::Absent,
    },
    CreateAcl {
        object_type: ObjectType::User,
        arg1: (1, count(SubTypeC::USER_ANY.bits())),
        arg2: (0, 0),
        str1: NAME,
        str2: NAME,
    },
];

/// Check creation arguments for an object of type `object_type`.
///
/// Returns the type and subtype of the object to create.
pub fn check_create(object_type: i32, args: &CreateArgs) -> Result<(ObjectType, SubType)> {
    let object_type = ObjectType::from_raw(object_type).ok_or(KernelError::ArgValue)?;
    let acl = &CREATE_ACL[object_type as usize - 1];

    if !(acl.arg1.0..=acl.arg1.1).contains(&args.arg1) {
        return Err(KernelError::ArgNum1);
    }
    let subtype = SubType::from_creation_arg(object_type, args.arg1).ok_or(KernelError::ArgNum1)?;
    if !(acl.arg2.0..=acl.arg2.1).contains(&args.arg2) {
        return Err(KernelError::ArgNum2);
    }
    if !acl.str1.accepts(args.str1.as_deref()) {
        return Err(KernelError::ArgStr1);
    }
    if !acl.str2.accepts(args.str2.as_deref()) {
        return Err(KernelError::ArgStr2);
    }
    Ok((object_type, subtype))
}

/// Init-time consistency check of the creation ACL
pub fn check_tables() -> Result<()> {
    for (index, acl) in CREATE_ACL.iter().enumerate() {
        if acl.object_type as usize != index + 1 {
            log::error!("create ACL entry {index} is out of order");
            internal_error!("create ACL out of order");
        }
        let (low, high) = acl.arg1;
        let subtypes_ok = low <= high
            && SubType::from_creation_arg(acl.object_type, low).is_some()
            && SubType::from_creation_arg(acl.object_type, high).is_some();
        if !subtypes_ok || acl.arg2.0 > acl.arg2.1 {
            log::error!("create ACL for {:?} has a bad argument range", acl.object_type);
            internal_error!("inconsistent create ACL");
        }
    }
    log::debug!("create ACL verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::ALGO_FIRST_HASH;

    fn args(arg1: i32) -> CreateArgs {
        CreateArgs { arg1, ..CreateArgs::default() }
    }

    #[test]
    fn test_tables_consistent() {
        assert_eq!(check_create(ObjectType::Context as i32, &args(1)).map(|(t, _)| t), Ok(ObjectType::Context));
        assert_eq!(check_tables(), Ok(()));
    }

    #[test]
    fn test_context_algorithm_selects_subtype() {
        let (_, subtype) = check_create(ObjectType::Context as i32, &args(ALGO_FIRST_HASH)).unwrap();
        assert_eq!(subtype, SubType::A(SubTypeA::CTX_HASH));
        assert_eq!(check_create(ObjectType::Context as i32, &args(0)), Err(KernelError::ArgNum1));
        assert_eq!(check_create(ObjectType::Context as i32, &args(500)), Err(KernelError::ArgNum1));
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(check_create(0, &args(1)), Err(KernelError::ArgValue));
        assert_eq!(check_create(42, &args(1)), Err(KernelError::ArgValue));
    }

    #[test]
    fn test_keyset_needs_name() {
        let keyset = ObjectType::Keyset as i32;
        assert_eq!(check_create(keyset, &args(1)), Err(KernelError::ArgStr1));
        let named = CreateArgs { arg1: 1, str1: Some(b"keys.p15".to_vec()), ..CreateArgs::default() };
        assert_eq!(
            check_create(keyset, &named),
            Ok((ObjectType::Keyset, SubType::B(SubTypeB::KEYSET_FILE)))
        );
        let bad_option = CreateArgs { arg2: 3, ..named.clone() };
        assert_eq!(check_create(keyset, &bad_option), Err(KernelError::ArgNum2));
        let password = CreateArgs { str2: Some(b"secret".to_vec()), ..named };
        assert_eq!(check_create(keyset, &password), Err(KernelError::ArgStr2));
    }

    #[test]
    fn test_system_device_not_creatable() {
        assert_eq!(check_create(ObjectType::Device as i32, &args(1)), Err(KernelError::ArgNum1));
        assert_eq!(
            check_create(ObjectType::Device as i32, &args(4)),
            Ok((ObjectType::Device, SubType::B(SubTypeB::DEV_HW)))
        );
    }
}
