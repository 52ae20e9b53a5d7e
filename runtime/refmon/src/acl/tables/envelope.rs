//! Envelope attributes
//!
//! Most envelope attributes differ between the enveloping and
//! de-enveloping directions, so they are special entries whose children
//! split on [`SubTypeB::ENV_DEENV`].

use static_assertions::const_assert_eq;

use super::cert_cms::CONTENT_TYPES;
use super::{
    check_ids, OBJECT_CMS_ATTR, OBJECT_CTX_CONV, OBJECT_CTX_HASH, OBJECT_CTX_PKC,
    OBJECT_DEENVELOPE, OBJECT_KEYSET, OBJECT_SESSION_TSP,
};
use crate::acl::perm::{perm, AccessFlags};
use crate::acl::types::{AttributeAcl, ObjectAcl, Route};
use crate::attr_id::{AttributeId, UNUSED};
use crate::limits::MAX_TEXTSIZE;
use crate::object_type::{ObjectType, SubTypeB, SubTypeSet};

const ENV: SubTypeB = SubTypeB::ENV_ENV;
const PGP: SubTypeB = SubTypeB::ENV_ENV_PGP;
const DEENV: SubTypeB = SubTypeB::ENV_DEENV;
const ENVELOPING: SubTypeB = ENV.union(PGP);

const TO_ENVELOPE: Route = Route::Object(ObjectType::Envelope);

const INTEGRITY_FULL: i32 = 2;

/// Signature check results: a kernel error code, or zero for success
const SIGNATURE_RESULTS: [(i32, i32); 2] = [(-50, -10), (0, 0)];

const fn env_num(id: AttributeId, st: SubTypeB, access: AccessFlags, low: i32, high: i32) -> AttributeAcl {
    AttributeAcl::numeric(id, SubTypeSet::b(st), access, low, high).route(TO_ENVELOPE)
}

const fn env_str(id: AttributeId, st: SubTypeB, access: AccessFlags) -> AttributeAcl {
    AttributeAcl::string(id, SubTypeSet::b(st), access, 1, MAX_TEXTSIZE).route(TO_ENVELOPE)
}

const fn env_obj(id: AttributeId, st: SubTypeB, access: AccessFlags, object: ObjectAcl) -> AttributeAcl {
    AttributeAcl::object(id, SubTypeSet::b(st), access, object).route(TO_ENVELOPE)
}

const fn env_special(
    id: AttributeId,
    st: SubTypeB,
    access: AccessFlags,
    children: &'static [AttributeAcl],
) -> AttributeAcl {
    AttributeAcl::special(id, SubTypeSet::b(st), access, children).route(TO_ENVELOPE)
}

const SUB_CONTENTTYPE: [AttributeAcl; 2] = [
    env_num(AttributeId::ENVINFO_CONTENTTYPE, ENVELOPING, perm("Rxx_RWx"), 0, 0)
        .subranges(&CONTENT_TYPES),
    env_num(AttributeId::ENVINFO_CONTENTTYPE, DEENV, perm("Rxx_xxx"), 0, 0)
        .subranges(&CONTENT_TYPES),
];

const SUB_INTEGRITY: [AttributeAcl; 2] = [
    env_num(
        AttributeId::ENVINFO_INTEGRITY,
        ENVELOPING,
        perm("xxx_xWx"),
        0,
        INTEGRITY_FULL,
    ),
    env_num(
        AttributeId::ENVINFO_INTEGRITY,
        DEENV,
        perm("Rxx_xxx"),
        0,
        INTEGRITY_FULL,
    ),
];

const SUB_SIGNATURE: [AttributeAcl; 2] = [
    env_obj(
        AttributeId::ENVINFO_SIGNATURE,
        ENVELOPING,
        perm("xxx_xWx"),
        OBJECT_CTX_PKC,
    ),
    env_obj(
        AttributeId::ENVINFO_SIGNATURE,
        DEENV,
        perm("RWx_xxx"),
        OBJECT_CTX_PKC,
    ),
];

const SUB_SIGNATURE_EXTRADATA: [AttributeAcl; 2] = [
    env_obj(
        AttributeId::ENVINFO_SIGNATURE_EXTRADATA,
        ENV,
        perm("xxx_xWx"),
        OBJECT_CMS_ATTR,
    ),
    env_obj(
        AttributeId::ENVINFO_SIGNATURE_EXTRADATA,
        DEENV,
        perm("Rxx_xxx"),
        OBJECT_CMS_ATTR,
    ),
];

const SUB_TIMESTAMP: [AttributeAcl; 2] = [
    env_obj(
        AttributeId::ENVINFO_TIMESTAMP,
        ENV,
        perm("xxx_xWx"),
        OBJECT_SESSION_TSP,
    ),
    env_obj(
        AttributeId::ENVINFO_TIMESTAMP,
        DEENV,
        perm("Rxx_xxx"),
        OBJECT_DEENVELOPE,
    ),
];

const TABLE: [AttributeAcl; 21] = [
    env_num(
        AttributeId::ENVINFO_DATASIZE,
        ENVELOPING,
        perm("xxx_xWx"),
        0,
        i32::MAX - 1,
    ),
    // Compression is either on or off, there's no level to pick
    env_num(
        AttributeId::ENVINFO_COMPRESSION,
        ENVELOPING,
        perm("Rxx_RWx"),
        UNUSED,
        UNUSED,
    ),
    env_special(
        AttributeId::ENVINFO_CONTENTTYPE,
        SubTypeB::ENV_ANY,
        perm("Rxx_RWx"),
        &SUB_CONTENTTYPE,
    ),
    AttributeAcl::boolean(
        AttributeId::ENVINFO_DETACHEDSIGNATURE,
        SubTypeSet::b(SubTypeB::ENV_ANY),
        perm("Rxx_RWx"),
    )
    .route(TO_ENVELOPE),
    env_num(
        AttributeId::ENVINFO_SIGNATURE_RESULT,
        DEENV,
        perm("Rxx_xxx"),
        0,
        0,
    )
    .subranges(&SIGNATURE_RESULTS),
    env_special(
        AttributeId::ENVINFO_INTEGRITY,
        SubTypeB::ENV_ANY,
        perm("Rxx_xWx"),
        &SUB_INTEGRITY,
    ),
    env_str(AttributeId::ENVINFO_PASSWORD, SubTypeB::ENV_ANY, perm("xxx_xWx")),
    env_obj(
        AttributeId::ENVINFO_KEY,
        ENV.union(DEENV),
        perm("xxx_xWx"),
        OBJECT_CTX_CONV,
    ),
    env_special(
        AttributeId::ENVINFO_SIGNATURE,
        SubTypeB::ENV_ANY,
        perm("RWx_xWx"),
        &SUB_SIGNATURE,
    ),
    env_special(
        AttributeId::ENVINFO_SIGNATURE_EXTRADATA,
        ENV.union(DEENV),
        perm("Rxx_xWx"),
        &SUB_SIGNATURE_EXTRADATA,
    ),
    env_str(AttributeId::ENVINFO_RECIPIENT, ENVELOPING, perm("xxx_xWx")),
    env_obj(
        AttributeId::ENVINFO_PUBLICKEY,
        ENVELOPING,
        perm("xxx_xWx"),
        OBJECT_CTX_PKC,
    ),
    env_obj(
        AttributeId::ENVINFO_PRIVATEKEY,
        DEENV,
        perm("xxx_xWx"),
        OBJECT_CTX_PKC,
    ),
    env_str(AttributeId::ENVINFO_PRIVATEKEY_LABEL, DEENV, perm("xxx_Rxx")),
    env_obj(
        AttributeId::ENVINFO_ORIGINATOR,
        ENV,
        perm("xxx_xWx"),
        OBJECT_CTX_PKC,
    ),
    env_obj(
        AttributeId::ENVINFO_SESSIONKEY,
        ENV.union(DEENV),
        perm("xxx_xWx"),
        OBJECT_CTX_CONV,
    ),
    env_obj(
        AttributeId::ENVINFO_HASH,
        SubTypeB::ENV_ANY,
        perm("xxx_xWx"),
        OBJECT_CTX_HASH,
    ),
    env_special(
        AttributeId::ENVINFO_TIMESTAMP,
        ENV.union(DEENV),
        perm("Rxx_xWx"),
        &SUB_TIMESTAMP,
    ),
    env_obj(
        AttributeId::ENVINFO_KEYSET_SIGCHECK,
        DEENV,
        perm("xWx_xWx"),
        OBJECT_KEYSET,
    ),
    env_obj(
        AttributeId::ENVINFO_KEYSET_ENCRYPT,
        ENVELOPING,
        perm("xWx_xWx"),
        OBJECT_KEYSET,
    ),
    env_obj(
        AttributeId::ENVINFO_KEYSET_DECRYPT,
        DEENV,
        perm("xWx_xWx"),
        OBJECT_KEYSET,
    ),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::ENVINFO_LAST.0 - AttributeId::ENVINFO_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::ENVINFO_DATASIZE);

pub static ENVELOPE_ACL: [AttributeAcl; 21] = TABLE;
