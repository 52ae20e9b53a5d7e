//! Generic attributes: error reporting, cursors and buffer sizes

use static_assertions::const_assert_eq;

use super::{check_ids, CURSOR_RANGE};
use crate::acl::perm::perm;
use crate::acl::types::{AttributeAcl, Route};
use crate::attr_id::AttributeId;
use crate::limits::{MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::object_type::{ObjectType, SubTypeA, SubTypeB, SubTypeC, SubTypeSet};

/// Last defined error type
const ERRTYPE_LAST: i32 = 7;

const CERT_CURSOR: [(i32, i32); 2] = [
    CURSOR_RANGE,
    (AttributeId::CERTINFO_FIRST.0 + 1, AttributeId::CERTINFO_LAST.0 - 1),
];
const ENV_CURSOR: [(i32, i32); 2] = [
    CURSOR_RANGE,
    (AttributeId::ENVINFO_FIRST.0 + 1, AttributeId::ENVINFO_LAST.0 - 1),
];
const SESSION_CURSOR: [(i32, i32); 2] = [
    CURSOR_RANGE,
    (AttributeId::SESSINFO_SSH_CHANNEL.0, AttributeId::SESSINFO_SSH_CHANNEL_ACTIVE.0),
];

const CERT_SUBTYPES: SubTypeSet = SubTypeSet::a(SubTypeA::CERT_ANY);
const ENV_SUBTYPES: SubTypeSet = SubTypeSet::b(SubTypeB::ENV_DEENV);
const SESSION_SUBTYPES: SubTypeSet =
    SubTypeSet::c(SubTypeC::SESS_SSH.union(SubTypeC::SESS_SSH_SVR));
const CURSOR_SUBTYPES: SubTypeSet = CERT_SUBTYPES.union(ENV_SUBTYPES).union(SESSION_SUBTYPES);
const CURSOR_ROUTE: Route = Route::Alt2(
    ObjectType::Certificate,
    ObjectType::Envelope,
    ObjectType::Session,
);

const fn cursor_children(attribute: AttributeId) -> [AttributeAcl; 3] {
    [
        AttributeAcl::numeric(attribute, CERT_SUBTYPES, perm("RWx_RWx"), 0, 0)
            .route(Route::Object(ObjectType::Certificate))
            .subranges(&CERT_CURSOR),
        AttributeAcl::numeric(attribute, ENV_SUBTYPES, perm("RWx_RWx"), 0, 0)
            .route(Route::Object(ObjectType::Envelope))
            .subranges(&ENV_CURSOR),
        AttributeAcl::numeric(attribute, SESSION_SUBTYPES, perm("RWx_RWx"), 0, 0)
            .route(Route::Object(ObjectType::Session))
            .subranges(&SESSION_CURSOR),
    ]
}

const SUB_CURRENT_GROUP: [AttributeAcl; 3] = cursor_children(AttributeId::CURRENT_GROUP);
const SUB_CURRENT: [AttributeAcl; 3] = cursor_children(AttributeId::CURRENT);

const TABLE: [AttributeAcl; 7] = [
    AttributeAcl::numeric(
        AttributeId::ERRORTYPE,
        SubTypeSet::ALL,
        perm("Rxx_Rxx"),
        0,
        ERRTYPE_LAST,
    ),
    AttributeAcl::numeric(
        AttributeId::ERRORLOCUS,
        SubTypeSet::ALL,
        perm("Rxx_Rxx"),
        0,
        AttributeId::USERINFO_LAST.0,
    ),
    AttributeAcl::string(
        AttributeId::ERRORMESSAGE,
        SubTypeSet::new(
            SubTypeA::empty(),
            SubTypeB::ENV_ANY
                .union(SubTypeB::KEYSET_ANY)
                .union(SubTypeB::DEV_ANY_STD),
            SubTypeC::SESS_ANY,
        ),
        perm("Rxx_Rxx"),
        0,
        512,
    ),
    AttributeAcl::special(
        AttributeId::CURRENT_GROUP,
        CURSOR_SUBTYPES,
        perm("RWx_RWx"),
        &SUB_CURRENT_GROUP,
    )
    .route(CURSOR_ROUTE),
    AttributeAcl::special(
        AttributeId::CURRENT,
        CURSOR_SUBTYPES,
        perm("RWx_RWx"),
        &SUB_CURRENT,
    )
    .route(CURSOR_ROUTE),
    AttributeAcl::numeric(
        AttributeId::CURRENT_INSTANCE,
        CERT_SUBTYPES,
        perm("RWx_RWx"),
        CURSOR_RANGE.0,
        CURSOR_RANGE.1,
    )
    .route(Route::Object(ObjectType::Certificate)),
    AttributeAcl::numeric(
        AttributeId::BUFFERSIZE,
        SubTypeSet::new(SubTypeA::empty(), SubTypeB::ENV_ANY, SubTypeC::SESS_ANY),
        perm("Rxx_RWx"),
        MIN_BUFFER_SIZE,
        MAX_BUFFER_SIZE,
    )
    .route(Route::Alt(ObjectType::Envelope, ObjectType::Session)),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::GENERIC_LAST.0 - AttributeId::GENERIC_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::ERRORTYPE);

pub static GENERIC_ACL: [AttributeAcl; 7] = TABLE;
