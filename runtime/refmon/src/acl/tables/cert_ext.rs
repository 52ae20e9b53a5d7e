//! Certificate extensions

use static_assertions::const_assert_eq;

use super::{cert_bool, cert_num, cert_str, cert_time, check_ids};
use crate::acl::perm::perm;
use crate::acl::types::AttributeAcl;
use crate::attr_id::{AttributeId, UNUSED};
use crate::limits::{KEYUSAGE_LAST, MAX_TEXTSIZE};
use crate::object_type::SubTypeA;

const CERT_OR_CHAIN: SubTypeA = SubTypeA::CERT_CERT.union(SubTypeA::CERT_CERTCHAIN);
const REVOCATIONS: SubTypeA = SubTypeA::CERT_CRL.union(SubTypeA::CERT_REQ_REV);
const AIA_HOLDERS: SubTypeA = CERT_OR_CHAIN.union(SubTypeA::CERT_PKIUSER);
const CONSTRAINT_HOLDERS: SubTypeA = CERT_OR_CHAIN
    .union(SubTypeA::CERT_ATTRCERT)
    .union(SubTypeA::CERT_PKIUSER);
const USAGE_HOLDERS: SubTypeA = SubTypeA::CERT_ANY_CERT.union(SubTypeA::CERT_PKIUSER);

/// CRL reason codes; 7 is unassigned
const CRL_REASONS: [(i32, i32); 2] = [(0, 6), (8, 10)];

const HOLDINSTRUCTION_LAST: i32 = 3;
const MAX_PATHLEN: i32 = 64;
const KEYFEATURES_ALL: i32 = 7;

const TABLE: [AttributeAcl; 18] = [
    cert_str(
        AttributeId::CERTINFO_CHALLENGEPASSWORD,
        SubTypeA::CERT_CERTREQ,
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
    cert_num(AttributeId::CERTINFO_CRLEXTREASON, REVOCATIONS, perm("Rxx_RWD"), 0, 0)
        .subranges(&CRL_REASONS),
    cert_num(
        AttributeId::CERTINFO_KEYFEATURES,
        SubTypeA::CERT_ANY_CERT,
        perm("Rxx_Rxx"),
        0,
        KEYFEATURES_ALL,
    ),
    cert_bool(AttributeId::CERTINFO_AUTHORITYINFOACCESS, AIA_HOLDERS, perm("Rxx_RxD")),
    cert_num(
        AttributeId::CERTINFO_AUTHORITYINFO_OCSP,
        AIA_HOLDERS,
        perm("Rxx_RxD"),
        0,
        1,
    ),
    cert_num(
        AttributeId::CERTINFO_AUTHORITYINFO_CAISSUERS,
        AIA_HOLDERS,
        perm("Rxx_RxD"),
        0,
        1,
    ),
    cert_str(
        AttributeId::CERTINFO_SUBJECTKEYIDENTIFIER,
        CERT_OR_CHAIN,
        perm("Rxx_RxD"),
        1,
        MAX_TEXTSIZE,
    ),
    cert_num(
        AttributeId::CERTINFO_KEYUSAGE,
        USAGE_HOLDERS,
        perm("Rxx_RWD"),
        1,
        KEYUSAGE_LAST - 1,
    ),
    cert_bool(
        AttributeId::CERTINFO_BASICCONSTRAINTS,
        CONSTRAINT_HOLDERS,
        perm("Rxx_RxD"),
    ),
    cert_bool(AttributeId::CERTINFO_CA, CONSTRAINT_HOLDERS, perm("Rxx_RWD")),
    cert_num(
        AttributeId::CERTINFO_PATHLENCONSTRAINT,
        CONSTRAINT_HOLDERS,
        perm("Rxx_RWD"),
        0,
        MAX_PATHLEN,
    ),
    cert_num(
        AttributeId::CERTINFO_CRLNUMBER,
        SubTypeA::CERT_CRL,
        perm("Rxx_RWD"),
        0,
        i32::MAX - 1,
    ),
    cert_num(AttributeId::CERTINFO_CRLREASON, REVOCATIONS, perm("Rxx_RWD"), 0, 0)
        .subranges(&CRL_REASONS),
    cert_num(
        AttributeId::CERTINFO_HOLDINSTRUCTIONCODE,
        REVOCATIONS,
        perm("Rxx_RWD"),
        1,
        HOLDINSTRUCTION_LAST,
    ),
    cert_time(AttributeId::CERTINFO_INVALIDITYDATE, REVOCATIONS, perm("Rxx_RWD")),
    cert_str(
        AttributeId::CERTINFO_CERTPOLICYID,
        AIA_HOLDERS,
        perm("Rxx_RWD"),
        3,
        32,
    ),
    // Presence-only extensions take no value
    cert_num(
        AttributeId::CERTINFO_EXTKEY_SERVERAUTH,
        USAGE_HOLDERS,
        perm("Rxx_RWD"),
        UNUSED,
        UNUSED,
    ),
    cert_num(
        AttributeId::CERTINFO_EXTKEY_CLIENTAUTH,
        USAGE_HOLDERS,
        perm("Rxx_RWD"),
        UNUSED,
        UNUSED,
    ),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::CERTINFO_LAST_EXTENSION.0 - AttributeId::CERTINFO_FIRST_EXTENSION.0) as usize
);
const _: () = check_ids(&TABLE, AttributeId::CERTINFO_FIRST_EXTENSION);

pub static CERT_EXTENSION_ACL: [AttributeAcl; 18] = TABLE;
