//! Certificate name components: DN parts and general names

use static_assertions::const_assert_eq;

use super::{cert_bool, cert_str, cert_wstr, check_ids};
use crate::acl::perm::perm;
use crate::acl::types::AttributeAcl;
use crate::attr_id::AttributeId;
use crate::limits::MAX_TEXTSIZE;
use crate::object_type::SubTypeA;

/// Objects carrying a DN
const DN_HOLDERS: SubTypeA = SubTypeA::CERT_ANY_CERT
    .union(SubTypeA::CERT_ATTRCERT)
    .union(SubTypeA::CERT_CRL)
    .union(SubTypeA::CERT_OCSP_RESP)
    .union(SubTypeA::CERT_PKIUSER);

/// Objects carrying general names
const NAME_HOLDERS: SubTypeA = SubTypeA::CERT_ANY_CERT
    .union(SubTypeA::CERT_ATTRCERT)
    .union(SubTypeA::CERT_CRL)
    .union(SubTypeA::CERT_PKIUSER);

const MAX_DN_PART: i32 = 128;
const MIN_RFC822_SIZE: i32 = 7;
const MIN_DNS_SIZE: i32 = 4;
const MIN_URL_SIZE: i32 = 12;
const MAX_NAME_SIZE: i32 = 255;

/// IPv4 or IPv6 address
const IP_ADDRESS_SIZES: [i32; 2] = [4, 16];

const TABLE: [AttributeAcl; 14] = [
    cert_str(AttributeId::CERTINFO_COUNTRYNAME, DN_HOLDERS, perm("Rxx_RWD"), 2, 2),
    cert_wstr(
        AttributeId::CERTINFO_STATEORPROVINCENAME,
        DN_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_DN_PART,
    ),
    cert_wstr(
        AttributeId::CERTINFO_LOCALITYNAME,
        DN_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_DN_PART,
    ),
    cert_wstr(
        AttributeId::CERTINFO_ORGANIZATIONNAME,
        DN_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
    cert_wstr(
        AttributeId::CERTINFO_ORGANIZATIONALUNITNAME,
        DN_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
    cert_wstr(
        AttributeId::CERTINFO_COMMONNAME,
        DN_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_OTHERNAME_TYPEID,
        NAME_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_OTHERNAME_VALUE,
        NAME_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_RFC822NAME,
        NAME_HOLDERS,
        perm("Rxx_RWD"),
        MIN_RFC822_SIZE,
        MAX_NAME_SIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_DNSNAME,
        NAME_HOLDERS,
        perm("Rxx_RWD"),
        MIN_DNS_SIZE,
        MAX_NAME_SIZE,
    ),
    // Selects the directory name as the current DN
    cert_bool(AttributeId::CERTINFO_DIRECTORYNAME, NAME_HOLDERS, perm("Rxx_RxD")),
    cert_str(
        AttributeId::CERTINFO_UNIFORMRESOURCEIDENTIFIER,
        NAME_HOLDERS,
        perm("Rxx_RWD"),
        MIN_URL_SIZE,
        MAX_NAME_SIZE,
    ),
    cert_str(AttributeId::CERTINFO_IPADDRESS, NAME_HOLDERS, perm("Rxx_RWD"), 0, 0)
        .values(&IP_ADDRESS_SIZES),
    cert_str(
        AttributeId::CERTINFO_REGISTEREDID,
        NAME_HOLDERS,
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::CERTINFO_LAST_NAME.0 - AttributeId::CERTINFO_FIRST_NAME.0) as usize
);
const _: () = check_ids(&TABLE, AttributeId::CERTINFO_FIRST_NAME);

pub static CERT_NAME_ACL: [AttributeAcl; 14] = TABLE;
