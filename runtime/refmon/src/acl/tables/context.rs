//! Encryption context attributes

use static_assertions::const_assert_eq;

use super::check_ids;
use crate::acl::perm::{perm, perm_int};
use crate::acl::types::{AclFlags, AttributeAcl, Route};
use crate::algo::*;
use crate::attr_id::AttributeId;
use crate::limits::*;
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};

const fn ctx(bits: SubTypeA) -> SubTypeSet {
    SubTypeSet::a(bits)
}

const CONV: SubTypeA = SubTypeA::CTX_CONV;
const PKC: SubTypeA = SubTypeA::CTX_PKC;
const HASH: SubTypeA = SubTypeA::CTX_HASH;
const MAC: SubTypeA = SubTypeA::CTX_MAC;
const GENERIC: SubTypeA = SubTypeA::CTX_GENERIC;

const TO_CONTEXT: Route = Route::Object(ObjectType::Context);

const KEYING_ALGOS: [i32; 2] = [ALGO_HMAC_SHA1, ALGO_HMAC_SHA2];

/// Sizes of the two public-key component layouts
const PKC_COMPONENT_SIZES: [i32; 2] = [KEY_COMPONENTS_RSA_SIZE, KEY_COMPONENTS_DLP_SIZE];

const SUB_BLOCKSIZE: [AttributeAcl; 3] = [
    AttributeAcl::numeric(
        AttributeId::CTXINFO_BLOCKSIZE,
        ctx(CONV.union(PKC)),
        perm("Rxx_Rxx"),
        1,
        MAX_HASHSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::CTXINFO_BLOCKSIZE,
        ctx(HASH),
        perm("RWx_Rxx"),
        MIN_HASHSIZE,
        MAX_HASHSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::CTXINFO_BLOCKSIZE,
        ctx(MAC),
        perm("Rxx_RWx"),
        MIN_HASHSIZE,
        MAX_HASHSIZE,
    )
    .route(TO_CONTEXT),
];

const SUB_PERSISTENT: [AttributeAcl; 2] = [
    AttributeAcl::boolean(AttributeId::CTXINFO_PERSISTENT, ctx(PKC), perm("Rxx_Rxx"))
        .route(TO_CONTEXT),
    AttributeAcl::boolean(
        AttributeId::CTXINFO_PERSISTENT,
        ctx(CONV.union(MAC)),
        perm("Rxx_RWD"),
    )
    .route(TO_CONTEXT),
];

const TABLE: [AttributeAcl; 17] = [
    AttributeAcl::numeric(
        AttributeId::CTXINFO_ALGO,
        ctx(SubTypeA::CTX_ANY),
        perm("Rxx_Rxx"),
        ALGO_NONE + 1,
        ALGO_LAST_GENERIC,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::CTXINFO_MODE,
        ctx(CONV),
        perm("Rxx_RWx"),
        MODE_NONE + 1,
        MODE_LAST - 1,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::CTXINFO_NAME_ALGO,
        ctx(SubTypeA::CTX_ANY),
        perm("Rxx_Rxx"),
        3,
        MAX_TEXTSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::CTXINFO_NAME_MODE,
        ctx(CONV),
        perm("Rxx_Rxx"),
        3,
        MAX_TEXTSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::CTXINFO_KEYSIZE,
        ctx(CONV.union(PKC).union(MAC).union(GENERIC)),
        perm("Rxx_RWx"),
        MIN_KEYSIZE,
        MAX_PKCSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::special(
        AttributeId::CTXINFO_BLOCKSIZE,
        ctx(CONV.union(PKC).union(HASH).union(MAC)),
        perm("RWx_RWx"),
        &SUB_BLOCKSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::CTXINFO_IVSIZE,
        ctx(CONV),
        perm("Rxx_Rxx"),
        MIN_IVSIZE,
        MAX_IVSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::CTXINFO_KEYING_ALGO,
        ctx(CONV.union(MAC)),
        perm("Rxx_RWD"),
        0,
        0,
    )
    .route(TO_CONTEXT)
    .values(&KEYING_ALGOS),
    AttributeAcl::numeric(
        AttributeId::CTXINFO_KEYING_ITERATIONS,
        ctx(CONV.union(MAC)),
        perm("Rxx_RWD"),
        MIN_KEYSETUP_ITERATIONS,
        MAX_KEYSETUP_ITERATIONS,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::CTXINFO_KEYING_SALT,
        ctx(CONV.union(MAC)),
        perm("Rxx_RWD"),
        8,
        MAX_HASHSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::CTXINFO_KEYING_VALUE,
        ctx(CONV.union(MAC)),
        perm("xxx_xWx"),
        1,
        MAX_ATTRIBUTE_SIZE,
    )
    .route(TO_CONTEXT)
    .flags(AclFlags::TRIGGER),
    AttributeAcl::string(
        AttributeId::CTXINFO_KEY,
        ctx(CONV.union(MAC).union(GENERIC)),
        perm("xxx_xWx"),
        MIN_KEYSIZE,
        MAX_KEYSIZE,
    )
    .route(TO_CONTEXT)
    .flags(AclFlags::TRIGGER),
    AttributeAcl::string(
        AttributeId::CTXINFO_KEY_COMPONENTS,
        ctx(PKC),
        perm_int("xxx_xWx"),
        0,
        0,
    )
    .route(TO_CONTEXT)
    .flags(AclFlags::TRIGGER)
    .values(&PKC_COMPONENT_SIZES),
    AttributeAcl::string(
        AttributeId::CTXINFO_IV,
        ctx(CONV),
        perm("RWx_RWx"),
        MIN_IVSIZE,
        MAX_IVSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::CTXINFO_HASHVALUE,
        ctx(HASH.union(MAC)),
        perm("RxD_RxD"),
        MIN_HASHSIZE,
        MAX_HASHSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::CTXINFO_LABEL,
        ctx(CONV.union(PKC).union(MAC)),
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::special(
        AttributeId::CTXINFO_PERSISTENT,
        ctx(CONV.union(PKC).union(MAC)),
        perm("Rxx_RWD"),
        &SUB_PERSISTENT,
    )
    .route(TO_CONTEXT),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::CTXINFO_LAST.0 - AttributeId::CTXINFO_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::CTXINFO_ALGO);

pub static CONTEXT_ACL: [AttributeAcl; 17] = TABLE;
