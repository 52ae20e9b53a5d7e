//! Crypto device attributes
//!
//! Only key-holding devices have these; the system device is managed
//! through internal attributes.

use static_assertions::const_assert_eq;

use super::check_ids;
use crate::acl::perm::{perm, AccessFlags};
use crate::acl::types::{AclFlags, AttributeAcl, Route};
use crate::attr_id::AttributeId;
use crate::limits::MAX_TEXTSIZE;
use crate::object_type::{ObjectType, SubTypeB, SubTypeSet};

const DEVICES: SubTypeSet = SubTypeSet::b(SubTypeB::DEV_ANY_STD);

const fn device_str(id: AttributeId, access: AccessFlags) -> AttributeAcl {
    AttributeAcl::string(id, DEVICES, access, 1, MAX_TEXTSIZE)
        .route(Route::Object(ObjectType::Device))
}

const TABLE: [AttributeAcl; 8] = [
    // Initialising or logging in keys the device
    device_str(AttributeId::DEVINFO_INITIALISE, perm("xWx_xWx")).flags(AclFlags::TRIGGER),
    device_str(AttributeId::DEVINFO_AUTHENT_USER, perm("xWx_xWx")).flags(AclFlags::TRIGGER),
    device_str(AttributeId::DEVINFO_AUTHENT_SUPERVISOR, perm("xxx_xWx")).flags(AclFlags::TRIGGER),
    device_str(AttributeId::DEVINFO_SET_AUTHENT_USER, perm("xWx_xxx")),
    device_str(AttributeId::DEVINFO_SET_AUTHENT_SUPERVISOR, perm("xWx_xxx")),
    device_str(AttributeId::DEVINFO_ZEROISE, perm("xWx_xWx")),
    AttributeAcl::boolean(AttributeId::DEVINFO_LOGGEDIN, DEVICES, perm("Rxx_Rxx"))
        .route(Route::Object(ObjectType::Device)),
    device_str(AttributeId::DEVINFO_LABEL, perm("Rxx_Rxx")),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::DEVINFO_LAST.0 - AttributeId::DEVINFO_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::DEVINFO_INITIALISE);

pub static DEVICE_ACL: [AttributeAcl; 8] = TABLE;
