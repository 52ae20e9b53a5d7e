//! Configuration options
//!
//! Options live in the user object. A few of them can also be overridden
//! per envelope, session, keyset or context, hence the alternate routes.

use static_assertions::const_assert_eq;

use super::check_ids;
use crate::acl::perm::perm;
use crate::acl::types::{AttributeAcl, Route};
use crate::algo::*;
use crate::attr_id::AttributeId;
use crate::limits::{MAX_KEYSETUP_ITERATIONS, MAX_PKCSIZE, MAX_TEXTSIZE, MIN_PKCSIZE};
use crate::object_type::{ObjectType, SubTypeA, SubTypeB, SubTypeC, SubTypeSet};

const USERS: SubTypeSet = SubTypeSet::c(SubTypeC::USER_ANY);
const TO_USER: Route = Route::Object(ObjectType::User);

const ENVELOPES_AND_USERS: SubTypeSet = SubTypeSet::new(
    SubTypeA::empty(),
    SubTypeB::ENV_ENV.union(SubTypeB::ENV_ENV_PGP),
    SubTypeC::USER_ANY,
);
const SESSIONS_AND_USERS: SubTypeSet = SubTypeSet::c(SubTypeC::SESS_ANY.union(SubTypeC::USER_ANY));

/// Conventional algorithms usable for bulk encryption; RC2 to RC5 and
/// Skipjack are excluded
const ENCR_ALGOS: [(i32, i32); 2] = [(ALGO_DES, ALGO_CAST), (ALGO_AES, ALGO_BLOWFISH)];

const MAX_COMPLIANCE_LEVEL: i32 = 4;
const MIN_DNS_SIZE: i32 = 4;
const MAX_DNS_SIZE: i32 = 255;

const fn user_bool(attribute: AttributeId) -> AttributeAcl {
    AttributeAcl::boolean(attribute, USERS, perm("RWx_RWx")).route(TO_USER)
}

const fn user_numeric(attribute: AttributeId, low: i32, high: i32) -> AttributeAcl {
    AttributeAcl::numeric(attribute, USERS, perm("RWx_RWx"), low, high).route(TO_USER)
}

const fn user_info_numeric(attribute: AttributeId, low: i32, high: i32) -> AttributeAcl {
    AttributeAcl::numeric(attribute, USERS, perm("Rxx_Rxx"), low, high).route(TO_USER)
}

const TABLE: [AttributeAcl; 30] = [
    AttributeAcl::string(
        AttributeId::OPTION_INFO_DESCRIPTION,
        USERS,
        perm("Rxx_Rxx"),
        16,
        MAX_TEXTSIZE,
    )
    .route(TO_USER),
    AttributeAcl::string(
        AttributeId::OPTION_INFO_COPYRIGHT,
        USERS,
        perm("Rxx_Rxx"),
        16,
        MAX_TEXTSIZE,
    )
    .route(TO_USER),
    user_info_numeric(AttributeId::OPTION_INFO_MAJORVERSION, 3, 3),
    user_info_numeric(AttributeId::OPTION_INFO_MINORVERSION, 0, 5),
    user_info_numeric(AttributeId::OPTION_INFO_STEPPING, 1, 50),
    AttributeAcl::numeric(
        AttributeId::OPTION_ENCR_ALGO,
        ENVELOPES_AND_USERS,
        perm("RWx_RWx"),
        0,
        0,
    )
    .route(Route::Alt(ObjectType::Envelope, ObjectType::User))
    .subranges(&ENCR_ALGOS),
    AttributeAcl::numeric(
        AttributeId::OPTION_ENCR_HASH,
        ENVELOPES_AND_USERS,
        perm("RWx_RWx"),
        ALGO_SHA1,
        ALGO_LAST_HASH,
    )
    .route(Route::Alt(ObjectType::Envelope, ObjectType::User)),
    AttributeAcl::numeric(
        AttributeId::OPTION_ENCR_MAC,
        SubTypeSet::new(SubTypeA::empty(), SubTypeB::ENV_ENV, SubTypeC::USER_ANY),
        perm("RWx_RWx"),
        ALGO_FIRST_MAC,
        ALGO_LAST_MAC,
    )
    .route(Route::Alt(ObjectType::Envelope, ObjectType::User)),
    user_numeric(AttributeId::OPTION_PKC_ALGO, ALGO_FIRST_PKC, ALGO_LAST_PKC),
    user_numeric(AttributeId::OPTION_PKC_KEYSIZE, MIN_PKCSIZE, MAX_PKCSIZE),
    user_numeric(AttributeId::OPTION_SIG_ALGO, ALGO_FIRST_PKC, ALGO_LAST_PKC),
    user_numeric(AttributeId::OPTION_SIG_KEYSIZE, MIN_PKCSIZE, MAX_PKCSIZE),
    AttributeAcl::numeric(
        AttributeId::OPTION_KEYING_ALGO,
        SubTypeSet::new(SubTypeA::CTX_CONV, SubTypeB::empty(), SubTypeC::USER_ANY),
        perm("RWx_RWx"),
        ALGO_HMAC_SHA1,
        ALGO_HMAC_SHA1,
    )
    .route(Route::Alt(ObjectType::Context, ObjectType::User)),
    AttributeAcl::numeric(
        AttributeId::OPTION_KEYING_ITERATIONS,
        SubTypeSet::new(SubTypeA::CTX_CONV, SubTypeB::empty(), SubTypeC::USER_ANY),
        perm("RWx_RWx"),
        1,
        MAX_KEYSETUP_ITERATIONS,
    )
    .route(Route::Alt(ObjectType::Context, ObjectType::User)),
    user_bool(AttributeId::OPTION_CERT_SIGNUNRECOGNISEDATTRIBUTES),
    user_numeric(AttributeId::OPTION_CERT_VALIDITY, 1, 20 * 365),
    user_numeric(AttributeId::OPTION_CERT_UPDATEINTERVAL, 1, 365),
    user_numeric(AttributeId::OPTION_CERT_COMPLIANCELEVEL, 0, MAX_COMPLIANCE_LEVEL),
    user_bool(AttributeId::OPTION_CERT_REQUIREPOLICY),
    user_bool(AttributeId::OPTION_CMS_DEFAULTATTRIBUTES),
    AttributeAcl::string(
        AttributeId::OPTION_KEYS_LDAP_OBJECTCLASS,
        SubTypeSet::new(SubTypeA::empty(), SubTypeB::KEYSET_LDAP, SubTypeC::USER_ANY),
        perm("RWx_RWx"),
        2,
        MAX_TEXTSIZE,
    )
    .route(Route::Alt(ObjectType::Keyset, ObjectType::User)),
    AttributeAcl::string(
        AttributeId::OPTION_NET_SOCKS_SERVER,
        SESSIONS_AND_USERS,
        perm("RWD_RWD"),
        MIN_DNS_SIZE,
        MAX_DNS_SIZE,
    )
    .route(Route::Alt(ObjectType::Session, ObjectType::User)),
    AttributeAcl::string(
        AttributeId::OPTION_NET_HTTP_PROXY,
        SESSIONS_AND_USERS,
        perm("RWD_RWD"),
        MIN_DNS_SIZE,
        MAX_DNS_SIZE,
    )
    .route(Route::Alt(ObjectType::Session, ObjectType::User)),
    AttributeAcl::numeric(
        AttributeId::OPTION_NET_CONNECTTIMEOUT,
        SESSIONS_AND_USERS,
        perm("Rxx_RWx"),
        5,
        300,
    )
    .route(Route::Alt(ObjectType::Session, ObjectType::User)),
    AttributeAcl::numeric(
        AttributeId::OPTION_NET_READTIMEOUT,
        SESSIONS_AND_USERS,
        perm("RWx_RWx"),
        0,
        300,
    )
    .route(Route::Alt(ObjectType::Session, ObjectType::User)),
    AttributeAcl::numeric(
        AttributeId::OPTION_NET_WRITETIMEOUT,
        SESSIONS_AND_USERS,
        perm("RWx_RWx"),
        0,
        300,
    )
    .route(Route::Alt(ObjectType::Session, ObjectType::User)),
    AttributeAcl::boolean(
        AttributeId::OPTION_MISC_ASYNCINIT,
        SubTypeSet::c(SubTypeC::USER_SO),
        perm("RWx_RWx"),
    )
    .route(TO_USER),
    AttributeAcl::numeric(
        AttributeId::OPTION_MISC_SIDECHANNELPROTECTION,
        SubTypeSet::new(SubTypeA::CTX_PKC, SubTypeB::empty(), SubTypeC::USER_SO),
        perm("RWx_RWx"),
        0,
        2,
    )
    .route(Route::Alt(ObjectType::Context, ObjectType::User)),
    // Can only be cleared, which commits the configuration
    AttributeAcl::boolean(AttributeId::OPTION_CONFIGCHANGED, USERS, perm("RWx_RWx"))
        .route(TO_USER)
        .bounds(0, 0),
    user_bool(AttributeId::OPTION_SELFTESTOK),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::OPTION_LAST.0 - AttributeId::OPTION_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::OPTION_INFO_DESCRIPTION);

pub static OPTION_ACL: [AttributeAcl; 30] = TABLE;
