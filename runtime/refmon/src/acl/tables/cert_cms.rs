//! CMS signed attributes

use static_assertions::const_assert_eq;

use super::{cert_bool, cert_num, cert_str, cert_time, check_ids};
use crate::acl::perm::perm;
use crate::acl::types::AttributeAcl;
use crate::attr_id::{AttributeId, UNUSED};
use crate::limits::{MAX_ATTRIBUTE_SIZE, MAX_HASHSIZE, MIN_HASHSIZE};
use crate::object_type::SubTypeA;

const CMSATTR: SubTypeA = SubTypeA::CERT_CMSATTR;

/// Content types that may be signed; 4 (signed-and-enveloped) is obsolete
pub(crate) const CONTENT_TYPES: [(i32, i32); 2] = [(1, 3), (5, 13)];

const TABLE: [AttributeAcl; 8] = [
    cert_num(AttributeId::CERTINFO_CMS_CONTENTTYPE, CMSATTR, perm("Rxx_RWD"), 0, 0)
        .subranges(&CONTENT_TYPES),
    cert_str(
        AttributeId::CERTINFO_CMS_MESSAGEDIGEST,
        CMSATTR,
        perm("Rxx_RWD"),
        MIN_HASHSIZE,
        MAX_HASHSIZE,
    ),
    cert_time(AttributeId::CERTINFO_CMS_SIGNINGTIME, CMSATTR, perm("Rxx_RWD")),
    cert_str(
        AttributeId::CERTINFO_CMS_COUNTERSIGNATURE,
        CMSATTR,
        perm("Rxx_xxx"),
        64,
        MAX_ATTRIBUTE_SIZE,
    ),
    cert_str(
        AttributeId::CERTINFO_CMS_SIGNINGDESCRIPTION,
        CMSATTR,
        perm("Rxx_RWD"),
        1,
        MAX_ATTRIBUTE_SIZE,
    ),
    cert_bool(AttributeId::CERTINFO_CMS_SMIMECAPABILITIES, CMSATTR, perm("Rxx_RxD")),
    cert_num(
        AttributeId::CERTINFO_CMS_SMIMECAP_3DES,
        CMSATTR,
        perm("Rxx_RWD"),
        UNUSED,
        UNUSED,
    ),
    cert_num(
        AttributeId::CERTINFO_CMS_SMIMECAP_AES,
        CMSATTR,
        perm("Rxx_RWD"),
        UNUSED,
        UNUSED,
    ),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::CERTINFO_LAST_CMS.0 - AttributeId::CERTINFO_FIRST_CMS.0) as usize
);
const _: () = check_ids(&TABLE, AttributeId::CERTINFO_FIRST_CMS);

pub static CERT_CMS_ACL: [AttributeAcl; 8] = TABLE;
