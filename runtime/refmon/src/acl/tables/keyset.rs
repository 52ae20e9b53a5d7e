//! Keyset attributes

use static_assertions::const_assert_eq;

use super::check_ids;
use crate::acl::perm::perm;
use crate::acl::types::{AttributeAcl, Route};
use crate::attr_id::AttributeId;
use crate::limits::MAX_TEXTSIZE;
use crate::object_type::{ObjectType, SubTypeB, SubTypeSet};

const MIN_QUERY_SIZE: i32 = 6;

const TABLE: [AttributeAcl; 2] = [
    AttributeAcl::string(
        AttributeId::KEYINFO_QUERY,
        SubTypeSet::b(SubTypeB::KEYSET_DBMS),
        perm("xWx_xWx"),
        MIN_QUERY_SIZE,
        MAX_TEXTSIZE,
    )
    .route(Route::Object(ObjectType::Keyset)),
    AttributeAcl::string(
        AttributeId::KEYINFO_QUERY_REQUESTS,
        SubTypeSet::b(SubTypeB::KEYSET_DBMS_STORE),
        perm("xWx_xWx"),
        MIN_QUERY_SIZE,
        MAX_TEXTSIZE,
    )
    .route(Route::Object(ObjectType::Keyset)),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::KEYINFO_LAST.0 - AttributeId::KEYINFO_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::KEYINFO_QUERY);

pub static KEYSET_ACL: [AttributeAcl; 2] = TABLE;
