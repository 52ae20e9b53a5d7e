//! Certificate pseudo-information and main fields

use static_assertions::const_assert_eq;

use super::{
    cert_bool, cert_num, cert_obj, cert_str, cert_time, check_ids, CURSOR_RANGE,
    OBJECT_CERTIFICATE, OBJECT_CERT_REQUEST, OBJECT_CTX_PKC,
};
use crate::acl::perm::{perm, perm_int};
use crate::acl::types::{AttributeAcl, Route};
use crate::attr_id::AttributeId;
use crate::limits::{KEYUSAGE_LAST, MAX_ATTRIBUTE_SIZE, MAX_SERIALNO_SIZE};
use crate::object_type::{ObjectType, SubTypeA, SubTypeSet};

const CERT: SubTypeA = SubTypeA::CERT_CERT;
const CHAIN: SubTypeA = SubTypeA::CERT_CERTCHAIN;
const ANY_CERT: SubTypeA = SubTypeA::CERT_ANY_CERT;
const ATTRCERT: SubTypeA = SubTypeA::CERT_ATTRCERT;
const CRL: SubTypeA = SubTypeA::CERT_CRL;
const REQ_CERT: SubTypeA = SubTypeA::CERT_REQ_CERT;
const REQ_REV: SubTypeA = SubTypeA::CERT_REQ_REV;
const PKIUSER: SubTypeA = SubTypeA::CERT_PKIUSER;
const RTCS_REQ: SubTypeA = SubTypeA::CERT_RTCS_REQ;
const RTCS_RESP: SubTypeA = SubTypeA::CERT_RTCS_RESP;
const OCSP_REQ: SubTypeA = SubTypeA::CERT_OCSP_REQ;
const OCSP_RESP: SubTypeA = SubTypeA::CERT_OCSP_RESP;

const CERT_OR_CHAIN: SubTypeA = CERT.union(CHAIN);

/// Number of certificate object subtypes
const CERTTYPE_LAST: i32 = SubTypeA::CERT_ANY.bits().count_ones() as i32;

const SIGNATURELEVEL_ALL: i32 = 2;
const OCSPSTATUS_UNKNOWN: i32 = 3;
const CERTSTATUS_UNKNOWN: i32 = 3;
const FINGERPRINT_MD5_SIZE: i32 = 16;
const FINGERPRINT_SHA1_SIZE: i32 = 20;
const PKIUSER_ID_SIZE: i32 = 17;
const PKIUSER_PASSWORD_SIZE: i32 = 23;

// Full certificates expose their SHA-1 fingerprint; for requests and PKI
// user records it is only used internally as a lookup key.
const SUB_FINGERPRINT_SHA1: [AttributeAcl; 2] = [
    cert_str(
        AttributeId::CERTINFO_FINGERPRINT_SHA1,
        CERT_OR_CHAIN,
        perm("Rxx_xxx"),
        FINGERPRINT_SHA1_SIZE,
        FINGERPRINT_SHA1_SIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_FINGERPRINT_SHA1,
        ANY_CERT.union(REQ_REV).union(PKIUSER),
        perm_int("Rxx_xxx"),
        FINGERPRINT_SHA1_SIZE,
        FINGERPRINT_SHA1_SIZE,
    ),
];

const TABLE: [AttributeAcl; 29] = [
    cert_bool(AttributeId::CERTINFO_SELFSIGNED, ANY_CERT, perm("Rxx_RWD")),
    cert_bool(AttributeId::CERTINFO_IMMUTABLE, SubTypeA::CERT_ANY, perm("Rxx_Rxx")),
    cert_bool(AttributeId::CERTINFO_XYZZY, CERT_OR_CHAIN, perm("Rxx_RWx")),
    cert_num(
        AttributeId::CERTINFO_CERTTYPE,
        SubTypeA::CERT_ANY,
        perm("Rxx_Rxx"),
        1,
        CERTTYPE_LAST,
    ),
    cert_str(
        AttributeId::CERTINFO_FINGERPRINT_MD5,
        CERT_OR_CHAIN,
        perm("Rxx_xxx"),
        FINGERPRINT_MD5_SIZE,
        FINGERPRINT_MD5_SIZE,
    ),
    AttributeAcl::special(
        AttributeId::CERTINFO_FINGERPRINT_SHA1,
        SubTypeSet::a(ANY_CERT.union(REQ_REV).union(PKIUSER)),
        perm("Rxx_xxx"),
        &SUB_FINGERPRINT_SHA1,
    )
    .route(Route::Object(ObjectType::Certificate)),
    cert_num(
        AttributeId::CERTINFO_CURRENT_CERTIFICATE,
        CERT_OR_CHAIN
            .union(CRL)
            .union(RTCS_REQ)
            .union(RTCS_RESP)
            .union(OCSP_REQ)
            .union(OCSP_RESP),
        perm("xWx_xWx"),
        CURSOR_RANGE.0,
        CURSOR_RANGE.1,
    ),
    cert_num(
        AttributeId::CERTINFO_TRUSTED_USAGE,
        CERT_OR_CHAIN,
        perm("RWD_RWD"),
        0,
        KEYUSAGE_LAST - 1,
    ),
    cert_bool(AttributeId::CERTINFO_TRUSTED_IMPLICIT, CERT_OR_CHAIN, perm("RWD_xxx")),
    cert_num(
        AttributeId::CERTINFO_SIGNATURELEVEL,
        OCSP_REQ,
        perm("RWx_RWx"),
        0,
        SIGNATURELEVEL_ALL,
    ),
    cert_num(
        AttributeId::CERTINFO_VERSION,
        CERT_OR_CHAIN
            .union(ATTRCERT)
            .union(CRL)
            .union(RTCS_REQ)
            .union(RTCS_RESP)
            .union(OCSP_REQ)
            .union(OCSP_RESP),
        perm("Rxx_Rxx"),
        1,
        3,
    ),
    cert_str(
        AttributeId::CERTINFO_SERIALNUMBER,
        CERT_OR_CHAIN.union(ATTRCERT).union(CRL).union(REQ_REV),
        perm("Rxx_Rxx"),
        1,
        MAX_SERIALNO_SIZE,
    ),
    cert_obj(
        AttributeId::CERTINFO_SUBJECTPUBLICKEYINFO,
        ANY_CERT,
        perm("xxx_xWx"),
        OBJECT_CTX_PKC,
    ),
    cert_obj(
        AttributeId::CERTINFO_CERTIFICATE,
        CHAIN
            .union(CRL)
            .union(REQ_CERT)
            .union(REQ_REV)
            .union(RTCS_REQ)
            .union(OCSP_REQ),
        perm("xxx_xWx"),
        OBJECT_CERTIFICATE,
    ),
    cert_obj(
        AttributeId::CERTINFO_CACERTIFICATE,
        OCSP_REQ,
        perm("xxx_xWx"),
        OBJECT_CERTIFICATE,
    ),
    cert_bool(
        AttributeId::CERTINFO_ISSUERNAME,
        CERT_OR_CHAIN.union(ATTRCERT).union(CRL).union(OCSP_RESP),
        perm("Rxx_Rxx"),
    ),
    cert_time(
        AttributeId::CERTINFO_VALIDFROM,
        CERT_OR_CHAIN.union(REQ_CERT).union(ATTRCERT),
        perm("Rxx_RWD"),
    ),
    cert_time(
        AttributeId::CERTINFO_VALIDTO,
        CERT_OR_CHAIN.union(REQ_CERT).union(ATTRCERT),
        perm("Rxx_RWD"),
    ),
    cert_bool(
        AttributeId::CERTINFO_SUBJECTNAME,
        ANY_CERT.union(ATTRCERT).union(PKIUSER),
        perm("Rxx_RxD"),
    ),
    cert_obj(
        AttributeId::CERTINFO_CERTREQUEST,
        CERT_OR_CHAIN.union(ATTRCERT),
        perm("xxx_xWx"),
        OBJECT_CERT_REQUEST,
    ),
    cert_time(AttributeId::CERTINFO_THISUPDATE, CRL.union(OCSP_RESP), perm("Rxx_RWx")),
    cert_time(AttributeId::CERTINFO_NEXTUPDATE, CRL.union(OCSP_RESP), perm("Rxx_RWx")),
    cert_time(
        AttributeId::CERTINFO_REVOCATIONDATE,
        CRL.union(RTCS_RESP).union(OCSP_RESP),
        perm("Rxx_RWD"),
    ),
    cert_num(
        AttributeId::CERTINFO_REVOCATIONSTATUS,
        OCSP_RESP,
        perm("Rxx_xxx"),
        1,
        OCSPSTATUS_UNKNOWN,
    ),
    cert_num(
        AttributeId::CERTINFO_CERTSTATUS,
        RTCS_RESP,
        perm("Rxx_xxx"),
        0,
        CERTSTATUS_UNKNOWN,
    ),
    cert_str(
        AttributeId::CERTINFO_DN,
        ANY_CERT.union(ATTRCERT).union(CRL).union(OCSP_RESP).union(PKIUSER),
        perm("Rxx_RWx"),
        3,
        MAX_ATTRIBUTE_SIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_PKIUSER_ID,
        PKIUSER,
        perm("Rxx_xxx"),
        PKIUSER_ID_SIZE,
        PKIUSER_ID_SIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_PKIUSER_ISSUEPASSWORD,
        PKIUSER,
        perm("Rxx_xxx"),
        PKIUSER_PASSWORD_SIZE,
        PKIUSER_PASSWORD_SIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_PKIUSER_REVPASSWORD,
        PKIUSER,
        perm("Rxx_xxx"),
        PKIUSER_PASSWORD_SIZE,
        PKIUSER_PASSWORD_SIZE,
    ),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::CERTINFO_PKIUSER_REVPASSWORD.0 - AttributeId::CERTINFO_FIRST.0) as usize
);
const _: () = check_ids(&TABLE, AttributeId::CERTINFO_SELFSIGNED);

pub static CERTIFICATE_ACL: [AttributeAcl; 29] = TABLE;
