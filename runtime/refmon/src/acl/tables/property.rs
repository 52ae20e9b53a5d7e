//! Object properties
//!
//! Managed by the kernel itself; none of these reach an object handler.

use static_assertions::const_assert_eq;

use super::check_ids;
use crate::acl::perm::{perm, perm_int};
use crate::acl::types::{AclFlags, AttributeAcl, Route};
use crate::attr_id::AttributeId;
use crate::limits::{MAX_FORWARD_COUNT, MAX_USAGE_COUNT};
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};

const ALL: SubTypeSet = SubTypeSet::ALL;

const TABLE: [AttributeAcl; 6] = [
    AttributeAcl::boolean(AttributeId::PROPERTY_HIGHSECURITY, ALL, perm("xWx_xWx"))
        .flags(AclFlags::PROPERTY)
        .bounds(1, 1),
    AttributeAcl::numeric(AttributeId::PROPERTY_OWNER, ALL, perm("RWx_RWx"), 0, 0)
        .flags(AclFlags::PROPERTY)
        .any(),
    AttributeAcl::numeric(
        AttributeId::PROPERTY_FORWARDCOUNT,
        ALL,
        perm("RWx_RWx"),
        1,
        MAX_FORWARD_COUNT,
    )
    .flags(AclFlags::PROPERTY),
    AttributeAcl::boolean(AttributeId::PROPERTY_LOCKED, ALL, perm("RWx_RWx"))
        .flags(AclFlags::PROPERTY)
        .bounds(1, 1),
    AttributeAcl::numeric(
        AttributeId::PROPERTY_USAGECOUNT,
        ALL,
        perm("RWx_RWx"),
        1,
        MAX_USAGE_COUNT,
    )
    .flags(AclFlags::PROPERTY),
    AttributeAcl::boolean(
        AttributeId::PROPERTY_NONEXPORTABLE,
        SubTypeSet::a(SubTypeA::CTX_ANY),
        perm_int("RWx_RWx"),
    )
    .flags(AclFlags::PROPERTY)
    .route(Route::Object(ObjectType::Context))
    .bounds(1, 1),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::PROPERTY_LAST.0 - AttributeId::PROPERTY_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::PROPERTY_HIGHSECURITY);

pub static PROPERTY_ACL: [AttributeAcl; 6] = TABLE;
