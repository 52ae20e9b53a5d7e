//! Internal attributes
//!
//! Only reachable through internal messages. The first few describe the
//! object record itself and are answered by the kernel without involving
//! the object's handler.

use static_assertions::const_assert_eq;

use super::{check_ids, OBJECT_CERTIFICATE};
use crate::acl::perm::{perm_int, AccessFlags};
use crate::acl::types::{AclFlags, AttributeAcl, Route};
use crate::attr_id::{AttributeId, UNUSED};
use crate::limits::{KEYID_SIZE, MAX_PKCSIZE, MIN_KEYSIZE, MIN_PKCSIZE, PGP_KEYID_SIZE};
use crate::object_type::{ObjectType, SubTypeA, SubTypeB, SubTypeSet};
use crate::objects::ActionPerms;

const ALL: SubTypeSet = SubTypeSet::ALL;
const PKC: SubTypeSet = SubTypeSet::a(SubTypeA::CTX_PKC);
const KEYED_CONTEXTS: SubTypeSet = SubTypeSet::a(
    SubTypeA::CTX_CONV
        .union(SubTypeA::CTX_PKC)
        .union(SubTypeA::CTX_MAC)
        .union(SubTypeA::CTX_GENERIC),
);
const CERT_OR_CHAIN: SubTypeA = SubTypeA::CERT_CERT.union(SubTypeA::CERT_CERTCHAIN);

const TO_CONTEXT: Route = Route::Object(ObjectType::Context);
const TO_CERTIFICATE: Route = Route::Object(ObjectType::Certificate);
const TO_DEVICE: Route = Route::Object(ObjectType::Device);
const TO_KEYSET: Route = Route::Object(ObjectType::Keyset);

const MAX_ENCODED_DN: i32 = 8192;
const MIN_ENCODED_DN: i32 = 16;
const MAX_KEYFEATURES: i32 = 16;
const MAX_CONFIGDATA: i32 = 16384;

/// Clearing an object's status is the only status change allowed
const STATUS_VALUES: [i32; 1] = [0];

const fn property(acl: AttributeAcl) -> AttributeAcl {
    acl.flags(AclFlags::PROPERTY)
}

const fn encoded_key(id: AttributeId, overhead: i32, slack: i32) -> AttributeAcl {
    AttributeAcl::string(
        id,
        PKC,
        perm_int("Rxx_xWx"),
        overhead + MIN_PKCSIZE,
        MAX_PKCSIZE * 4 + slack,
    )
    .flags(AclFlags::TRIGGER)
    .route(TO_CONTEXT)
}

const fn cert_blob(id: AttributeId, st: SubTypeA, access: AccessFlags, min: i32, max: i32) -> AttributeAcl {
    AttributeAcl::string(id, SubTypeSet::a(st), access, min, max).route(TO_CERTIFICATE)
}

const fn keyset_blob(id: AttributeId, min: i32, max: i32) -> AttributeAcl {
    AttributeAcl::string(
        id,
        SubTypeSet::b(SubTypeB::KEYSET_FILE),
        perm_int("RWx_RWx"),
        min,
        max,
    )
    .route(TO_KEYSET)
}

// Requests expose the subject DN they carry; for everything else the DN
// only ever goes out as part of a key lookup
const SUB_SUBJECT: [AttributeAcl; 2] = [
    cert_blob(
        AttributeId::IATTRIBUTE_SUBJECT,
        SubTypeA::CERT_REQ_CERT.union(SubTypeA::CERT_REQ_REV),
        perm_int("Rxx_Rxx"),
        MIN_ENCODED_DN,
        MAX_ENCODED_DN,
    ),
    cert_blob(
        AttributeId::IATTRIBUTE_SUBJECT,
        CERT_OR_CHAIN
            .union(SubTypeA::CERT_CERTREQ)
            .union(SubTypeA::CERT_PKIUSER),
        perm_int("Rxx_xxx"),
        MIN_ENCODED_DN,
        MAX_ENCODED_DN,
    ),
];

const TABLE: [AttributeAcl; 30] = [
    property(AttributeAcl::numeric(
        AttributeId::IATTRIBUTE_TYPE,
        ALL,
        perm_int("Rxx_Rxx"),
        1,
        ObjectType::ALL.len() as i32,
    )),
    property(AttributeAcl::numeric(AttributeId::IATTRIBUTE_SUBTYPE, ALL, perm_int("Rxx_Rxx"), 0, 0).any()),
    property(
        AttributeAcl::numeric(AttributeId::IATTRIBUTE_STATUS, ALL, perm_int("RWx_RWx"), 0, 0)
            .values(&STATUS_VALUES),
    ),
    property(AttributeAcl::boolean(
        AttributeId::IATTRIBUTE_INTERNAL,
        ALL,
        perm_int("RWx_RWx"),
    )),
    property(AttributeAcl::numeric(
        AttributeId::IATTRIBUTE_ACTIONPERMS,
        SubTypeSet::a(SubTypeA::CTX_ANY),
        perm_int("RWx_RWx"),
        ActionPerms::NOT_AVAILABLE.bits() as i32,
        ActionPerms::ALL.bits() as i32,
    ))
    .route(TO_CONTEXT),
    property(AttributeAcl::boolean(
        AttributeId::IATTRIBUTE_LOCKED,
        SubTypeSet::a(
            SubTypeA::CTX_PKC
                .union(SubTypeA::CTX_CONV)
                .union(SubTypeA::CERT_ANY_CERT)
                .union(SubTypeA::CERT_CRL),
        ),
        perm_int("xWx_xWx"),
    )),
    AttributeAcl::numeric(
        AttributeId::IATTRIBUTE_INITIALISED,
        ALL,
        perm_int("xxx_xWx"),
        UNUSED,
        UNUSED,
    )
    .flags(AclFlags::TRIGGER),
    AttributeAcl::numeric(
        AttributeId::IATTRIBUTE_KEYSIZE,
        KEYED_CONTEXTS,
        perm_int("xxx_xWx"),
        MIN_KEYSIZE,
        MAX_PKCSIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::IATTRIBUTE_KEYFEATURES,
        PKC,
        perm_int("Rxx_xxx"),
        0,
        MAX_KEYFEATURES,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::IATTRIBUTE_KEYID,
        PKC,
        perm_int("Rxx_Rxx"),
        KEYID_SIZE,
        KEYID_SIZE,
    )
    .route(TO_CONTEXT),
    AttributeAcl::string(
        AttributeId::IATTRIBUTE_KEYID_PGP2,
        PKC,
        perm_int("Rxx_Rxx"),
        PGP_KEYID_SIZE,
        PGP_KEYID_SIZE,
    )
    .route(TO_CONTEXT),
    // Settable since OpenPGP key ids can't always be derived from the key
    AttributeAcl::string(
        AttributeId::IATTRIBUTE_KEYID_OPENPGP,
        PKC,
        perm_int("RWx_RWx"),
        PGP_KEYID_SIZE,
        PGP_KEYID_SIZE,
    )
    .route(TO_CONTEXT),
    encoded_key(AttributeId::IATTRIBUTE_KEY_SPKI, 8, 0),
    encoded_key(AttributeId::IATTRIBUTE_KEY_PGP, 10, 0),
    encoded_key(AttributeId::IATTRIBUTE_KEY_SSH, 16, 20),
    encoded_key(AttributeId::IATTRIBUTE_KEY_SSL, 4, 20),
    AttributeAcl::string(
        AttributeId::IATTRIBUTE_KEY_SPKI_PARTIAL,
        PKC,
        perm_int("Rxx_RWx"),
        8 + MIN_PKCSIZE,
        MAX_PKCSIZE * 4,
    )
    .route(TO_CONTEXT),
    AttributeAcl::numeric(
        AttributeId::IATTRIBUTE_DEVICEOBJECT,
        SubTypeSet::a(SubTypeA::CTX_ANY),
        perm_int("Rxx_RWx"),
        0,
        0,
    )
    .any()
    .route(TO_CONTEXT),
    AttributeAcl::special(
        AttributeId::IATTRIBUTE_SUBJECT,
        SubTypeSet::a(
            CERT_OR_CHAIN
                .union(SubTypeA::CERT_CERTREQ)
                .union(SubTypeA::CERT_REQ_CERT)
                .union(SubTypeA::CERT_REQ_REV)
                .union(SubTypeA::CERT_PKIUSER),
        ),
        perm_int("Rxx_Rxx"),
        &SUB_SUBJECT,
    )
    .route(TO_CERTIFICATE),
    cert_blob(
        AttributeId::IATTRIBUTE_ISSUER,
        CERT_OR_CHAIN
            .union(SubTypeA::CERT_REQ_CERT)
            .union(SubTypeA::CERT_CRL),
        perm_int("Rxx_xxx"),
        MIN_ENCODED_DN,
        MAX_ENCODED_DN,
    ),
    cert_blob(
        AttributeId::IATTRIBUTE_ISSUERANDSERIALNUMBER,
        CERT_OR_CHAIN
            .union(SubTypeA::CERT_REQ_REV)
            .union(SubTypeA::CERT_CRL),
        perm_int("Rxx_xxx"),
        MIN_ENCODED_DN,
        MAX_ENCODED_DN,
    ),
    cert_blob(
        AttributeId::IATTRIBUTE_SPKI,
        CERT_OR_CHAIN
            .union(SubTypeA::CERT_CERTREQ)
            .union(SubTypeA::CERT_REQ_CERT),
        perm_int("Rxx_xxx"),
        64,
        MAX_PKCSIZE * 3,
    ),
    AttributeAcl::object(
        AttributeId::IATTRIBUTE_CERTCOLLECTION,
        SubTypeSet::a(SubTypeA::CERT_CERTCHAIN),
        perm_int("xWx_xWx"),
        OBJECT_CERTIFICATE,
    )
    .flags(AclFlags::TRIGGER)
    .route(TO_CERTIFICATE),
    AttributeAcl::string(
        AttributeId::IATTRIBUTE_ENTROPY,
        SubTypeSet::b(SubTypeB::DEV_SYSTEM),
        perm_int("xWx_xWx"),
        1,
        i32::MAX - 1,
    )
    .route(TO_DEVICE),
    AttributeAcl::numeric(
        AttributeId::IATTRIBUTE_ENTROPY_QUALITY,
        SubTypeSet::b(SubTypeB::DEV_SYSTEM),
        perm_int("xWx_xWx"),
        1,
        100,
    )
    .route(TO_DEVICE),
    AttributeAcl::string(
        AttributeId::IATTRIBUTE_RANDOM,
        SubTypeSet::b(SubTypeB::DEV_ANY),
        perm_int("Rxx_Rxx"),
        MIN_KEYSIZE,
        MAX_PKCSIZE,
    )
    .route(TO_DEVICE),
    AttributeAcl::string(
        AttributeId::IATTRIBUTE_RANDOM_NONCE,
        SubTypeSet::b(SubTypeB::DEV_SYSTEM),
        perm_int("Rxx_Rxx"),
        1,
        i16::MAX as i32,
    )
    .route(TO_DEVICE),
    AttributeAcl::time(
        AttributeId::IATTRIBUTE_TIME,
        SubTypeSet::b(SubTypeB::DEV_ANY),
        perm_int("Rxx_xxx"),
    )
    .route(TO_DEVICE),
    keyset_blob(AttributeId::IATTRIBUTE_CONFIGDATA, 8, MAX_CONFIGDATA),
    keyset_blob(AttributeId::IATTRIBUTE_USERID, KEYID_SIZE, KEYID_SIZE),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::IATTRIBUTE_LAST.0 - AttributeId::IATTRIBUTE_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::IATTRIBUTE_TYPE);

pub static INTERNAL_ACL: [AttributeAcl; 30] = TABLE;
