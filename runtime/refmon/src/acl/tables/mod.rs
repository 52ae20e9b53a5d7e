//! Static attribute ACL tables
//!
//! One table per attribute category. Each table holds exactly one entry
//! per id in its category, in id order, so the entry for an id is found by
//! subtracting the category's first id. The ordering is enforced at compile
//! time by [`check_ids`]; everything else about the entries is verified by
//! the init-time consistency check.

mod cert_cms;
mod cert_ext;
mod cert_name;
mod certificate;
mod context;
mod device;
mod envelope;
mod generic;
mod internal;
mod keyset;
mod option;
mod property;
mod session;
mod user;

pub use cert_cms::CERT_CMS_ACL;
pub use cert_ext::CERT_EXTENSION_ACL;
pub use cert_name::CERT_NAME_ACL;
pub use certificate::CERTIFICATE_ACL;
pub use context::CONTEXT_ACL;
pub use device::DEVICE_ACL;
pub use envelope::ENVELOPE_ACL;
pub use generic::GENERIC_ACL;
pub use internal::INTERNAL_ACL;
pub use keyset::KEYSET_ACL;
pub use option::OPTION_ACL;
pub use property::PROPERTY_ACL;
pub use session::SESSION_ACL;
pub use user::USER_ACL;

use super::perm::AccessFlags;
use super::types::{AttributeAcl, ObjectAcl, ObjectAclFlags, Route};
use crate::attr_id::{AttributeClass, AttributeId};
use crate::object_type::{ObjectType, SubTypeA, SubTypeB, SubTypeC, SubTypeSet};

/// Panic (at compile time) unless entry `i` describes id `first + i`
pub(crate) const fn check_ids(table: &[AttributeAcl], first: AttributeId) {
    let mut i = 0;
    while i < table.len() {
        if table[i].attribute.0 != first.0 + i as i32 {
            panic!("attribute ACL table is not in id order");
        }
        i += 1;
    }
}

// Objects accepted as attribute values

pub(crate) const OBJECT_CTX_PKC: ObjectAcl = ObjectAcl::new(
    SubTypeSet::a(SubTypeA::CTX_PKC),
    ObjectAclFlags::HIGH_STATE.union(ObjectAclFlags::ROUTE_TO_CTX),
);
pub(crate) const OBJECT_CTX_CONV: ObjectAcl =
    ObjectAcl::new(SubTypeSet::a(SubTypeA::CTX_CONV), ObjectAclFlags::HIGH_STATE);
pub(crate) const OBJECT_CTX_HASH: ObjectAcl =
    ObjectAcl::new(SubTypeSet::a(SubTypeA::CTX_HASH), ObjectAclFlags::HIGH_STATE);
pub(crate) const OBJECT_CERTIFICATE: ObjectAcl = ObjectAcl::new(
    SubTypeSet::a(SubTypeA::CERT_CERT.union(SubTypeA::CERT_CERTCHAIN)),
    ObjectAclFlags::HIGH_STATE.union(ObjectAclFlags::ROUTE_TO_CERT),
);
pub(crate) const OBJECT_CERT_REQUEST: ObjectAcl = ObjectAcl::new(
    SubTypeSet::a(SubTypeA::CERT_CERTREQ.union(SubTypeA::CERT_REQ_CERT)),
    ObjectAclFlags::HIGH_STATE,
);
pub(crate) const OBJECT_CMS_ATTR: ObjectAcl =
    ObjectAcl::new(SubTypeSet::a(SubTypeA::CERT_CMSATTR), ObjectAclFlags::LOW_STATE);
pub(crate) const OBJECT_KEYSET: ObjectAcl =
    ObjectAcl::new(SubTypeSet::b(SubTypeB::KEYSET_ANY), ObjectAclFlags::HIGH_STATE);
pub(crate) const OBJECT_KEYSET_CERTS: ObjectAcl = ObjectAcl::new(
    SubTypeSet::b(
        SubTypeB::KEYSET_FILE
            .union(SubTypeB::KEYSET_DBMS)
            .union(SubTypeB::KEYSET_DBMS_STORE),
    ),
    ObjectAclFlags::HIGH_STATE,
);
pub(crate) const OBJECT_CERTSTORE: ObjectAcl =
    ObjectAcl::new(SubTypeSet::b(SubTypeB::KEYSET_DBMS_STORE), ObjectAclFlags::HIGH_STATE);
pub(crate) const OBJECT_SESSION_TSP: ObjectAcl =
    ObjectAcl::new(SubTypeSet::c(SubTypeC::SESS_TSP), ObjectAclFlags::HIGH_STATE);
pub(crate) const OBJECT_DEENVELOPE: ObjectAcl =
    ObjectAcl::new(SubTypeSet::b(SubTypeB::ENV_DEENV), ObjectAclFlags::HIGH_STATE);

/// Cursor movement codes, shared by every cursor attribute
pub(crate) const CURSOR_RANGE: (i32, i32) = (crate::attr_id::CURSOR_LAST, crate::attr_id::CURSOR_FIRST);

// Certificate attributes all route to the certificate object and only use
// family A subtypes, so the certificate tables share these shorthands.

const TO_CERTIFICATE: Route = Route::Object(ObjectType::Certificate);

pub(crate) const fn cert_bool(id: AttributeId, st: SubTypeA, access: AccessFlags) -> AttributeAcl {
    AttributeAcl::boolean(id, SubTypeSet::a(st), access).route(TO_CERTIFICATE)
}

pub(crate) const fn cert_num(
    id: AttributeId,
    st: SubTypeA,
    access: AccessFlags,
    low: i32,
    high: i32,
) -> AttributeAcl {
    AttributeAcl::numeric(id, SubTypeSet::a(st), access, low, high).route(TO_CERTIFICATE)
}

pub(crate) const fn cert_str(
    id: AttributeId,
    st: SubTypeA,
    access: AccessFlags,
    min: i32,
    max: i32,
) -> AttributeAcl {
    AttributeAcl::string(id, SubTypeSet::a(st), access, min, max).route(TO_CERTIFICATE)
}

pub(crate) const fn cert_wstr(
    id: AttributeId,
    st: SubTypeA,
    access: AccessFlags,
    min: i32,
    max: i32,
) -> AttributeAcl {
    AttributeAcl::wide_string(id, SubTypeSet::a(st), access, min, max).route(TO_CERTIFICATE)
}

pub(crate) const fn cert_time(id: AttributeId, st: SubTypeA, access: AccessFlags) -> AttributeAcl {
    AttributeAcl::time(id, SubTypeSet::a(st), access).route(TO_CERTIFICATE)
}

pub(crate) const fn cert_obj(
    id: AttributeId,
    st: SubTypeA,
    access: AccessFlags,
    object: ObjectAcl,
) -> AttributeAcl {
    AttributeAcl::object(id, SubTypeSet::a(st), access, object).route(TO_CERTIFICATE)
}

/// The table for a category and the id its first entry describes
pub fn table_for(class: AttributeClass) -> (&'static [AttributeAcl], AttributeId) {
    match class {
        AttributeClass::Property => (&PROPERTY_ACL, AttributeId(AttributeId::PROPERTY_FIRST.0 + 1)),
        AttributeClass::Generic => (&GENERIC_ACL, AttributeId(AttributeId::GENERIC_FIRST.0 + 1)),
        AttributeClass::Option => (&OPTION_ACL, AttributeId(AttributeId::OPTION_FIRST.0 + 1)),
        AttributeClass::Context => (&CONTEXT_ACL, AttributeId(AttributeId::CTXINFO_FIRST.0 + 1)),
        AttributeClass::Certificate => {
            (&CERTIFICATE_ACL, AttributeId(AttributeId::CERTINFO_FIRST.0 + 1))
        }
        AttributeClass::CertName => (&CERT_NAME_ACL, AttributeId::CERTINFO_FIRST_NAME),
        AttributeClass::CertExtension => (&CERT_EXTENSION_ACL, AttributeId::CERTINFO_FIRST_EXTENSION),
        AttributeClass::CertCms => (&CERT_CMS_ACL, AttributeId::CERTINFO_FIRST_CMS),
        AttributeClass::Keyset => (&KEYSET_ACL, AttributeId(AttributeId::KEYINFO_FIRST.0 + 1)),
        AttributeClass::Device => (&DEVICE_ACL, AttributeId(AttributeId::DEVINFO_FIRST.0 + 1)),
        AttributeClass::Envelope => (&ENVELOPE_ACL, AttributeId(AttributeId::ENVINFO_FIRST.0 + 1)),
        AttributeClass::Session => (&SESSION_ACL, AttributeId(AttributeId::SESSINFO_FIRST.0 + 1)),
        AttributeClass::User => (&USER_ACL, AttributeId(AttributeId::USERINFO_FIRST.0 + 1)),
        AttributeClass::Internal => (&INTERNAL_ACL, AttributeId(AttributeId::IATTRIBUTE_FIRST.0 + 1)),
    }
}

/// Every table with a name for diagnostics
pub fn all_tables() -> [(&'static str, &'static [AttributeAcl]); 14] {
    [
        ("property", &PROPERTY_ACL),
        ("generic", &GENERIC_ACL),
        ("option", &OPTION_ACL),
        ("context", &CONTEXT_ACL),
        ("certificate", &CERTIFICATE_ACL),
        ("certificate name", &CERT_NAME_ACL),
        ("certificate extension", &CERT_EXTENSION_ACL),
        ("CMS attribute", &CERT_CMS_ACL),
        ("keyset", &KEYSET_ACL),
        ("device", &DEVICE_ACL),
        ("envelope", &ENVELOPE_ACL),
        ("session", &SESSION_ACL),
        ("user", &USER_ACL),
        ("internal", &INTERNAL_ACL),
    ]
}
