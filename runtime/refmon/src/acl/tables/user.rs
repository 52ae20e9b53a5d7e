//! User object attributes

use static_assertions::const_assert_eq;

use super::{check_ids, OBJECT_CERTIFICATE};
use crate::acl::perm::perm;
use crate::acl::types::{AclFlags, AttributeAcl, Route};
use crate::attr_id::AttributeId;
use crate::limits::MAX_TEXTSIZE;
use crate::object_type::{ObjectType, SubTypeC, SubTypeSet};

const TO_USER: Route = Route::Object(ObjectType::User);

const fn ca_key(id: AttributeId) -> AttributeAcl {
    AttributeAcl::object(
        id,
        SubTypeSet::c(SubTypeC::USER_CA),
        perm("xxx_xWx"),
        OBJECT_CERTIFICATE,
    )
    .route(TO_USER)
}

const TABLE: [AttributeAcl; 5] = [
    // Logging in moves the user to the high state
    AttributeAcl::string(
        AttributeId::USERINFO_PASSWORD,
        SubTypeSet::c(SubTypeC::USER_ANY),
        perm("xxx_xWx"),
        1,
        MAX_TEXTSIZE,
    )
    .route(TO_USER)
    .flags(AclFlags::TRIGGER),
    ca_key(AttributeId::USERINFO_CAKEY_CERTSIGN),
    ca_key(AttributeId::USERINFO_CAKEY_CRLSIGN),
    ca_key(AttributeId::USERINFO_CAKEY_RTCSSIGN),
    ca_key(AttributeId::USERINFO_CAKEY_OCSPSIGN),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::USERINFO_LAST.0 - AttributeId::USERINFO_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::USERINFO_PASSWORD);

pub static USER_ACL: [AttributeAcl; 5] = TABLE;
