//! Session attributes

use static_assertions::const_assert_eq;

use super::{
    check_ids, OBJECT_CERTIFICATE, OBJECT_CERTSTORE, OBJECT_CTX_HASH, OBJECT_CTX_PKC,
    OBJECT_DEENVELOPE, OBJECT_KEYSET_CERTS,
};
use crate::acl::perm::{perm, AccessFlags};
use crate::acl::types::{AclFlags, AttributeAcl, ObjectAcl, ObjectAclFlags, Route};
use crate::attr_id::{AttributeId, UNUSED};
use crate::limits::MAX_TEXTSIZE;
use crate::object_type::{ObjectType, SubTypeA, SubTypeC, SubTypeSet};

const SSH: SubTypeC = SubTypeC::SESS_SSH;
const SSH_SVR: SubTypeC = SubTypeC::SESS_SSH_SVR;
const SSL: SubTypeC = SubTypeC::SESS_SSL;
const SSL_SVR: SubTypeC = SubTypeC::SESS_SSL_SVR;
const RTCS: SubTypeC = SubTypeC::SESS_RTCS;
const RTCS_SVR: SubTypeC = SubTypeC::SESS_RTCS_SVR;
const OCSP: SubTypeC = SubTypeC::SESS_OCSP;
const OCSP_SVR: SubTypeC = SubTypeC::SESS_OCSP_SVR;
const TSP: SubTypeC = SubTypeC::SESS_TSP;
const TSP_SVR: SubTypeC = SubTypeC::SESS_TSP_SVR;
const CMP: SubTypeC = SubTypeC::SESS_CMP;
const CMP_SVR: SubTypeC = SubTypeC::SESS_CMP_SVR;
const SCEP: SubTypeC = SubTypeC::SESS_SCEP;
const SCEP_SVR: SubTypeC = SubTypeC::SESS_SCEP_SVR;
const CERT_SVR: SubTypeC = SubTypeC::SESS_CERT_SVR;

/// Secure-channel sessions that carry arbitrary data
const DATA_SESSIONS: SubTypeC = SSH.union(SSH_SVR).union(SSL).union(SSL_SVR);
/// Request/response protocol sessions
const REQRESP_SESSIONS: SubTypeC = SubTypeC::SESS_ANY.difference(DATA_SESSIONS);
const SSH_ANY: SubTypeC = SSH.union(SSH_SVR);
const SSL_ANY: SubTypeC = SSL.union(SSL_SVR);
const CLIENT_PROTOCOLS: SubTypeC = RTCS.union(OCSP).union(TSP).union(CMP).union(SCEP);
const SERVER_PROTOCOLS: SubTypeC = RTCS_SVR
    .union(OCSP_SVR)
    .union(TSP_SVR)
    .union(CMP_SVR)
    .union(SCEP_SVR);
const PRIVKEY_HOLDERS: SubTypeC = SubTypeC::SESS_ANY_SERVER
    .difference(CERT_SVR)
    .union(SSH)
    .union(SSL)
    .union(CMP)
    .union(SCEP);

const TO_SESSION: Route = Route::Object(ObjectType::Session);

const MAX_URL_SIZE: i32 = 1024;
const MIN_PORT_NUMBER: i32 = 22;
const MAX_PORT_NUMBER: i32 = 65535;
const MIN_FINGERPRINT_SIZE: i32 = 16;
const MAX_FINGERPRINT_SIZE: i32 = 20;
const REQUESTTYPE_LAST: i32 = 6;
const SSLOPTION_MAX: i32 = 0x3F;

const AUTH_RESPONSES: [i32; 2] = [0, 1];

/// Either "no channel", or a channel number
const SSH_CHANNELS: [(i32, i32); 2] = [(UNUSED, UNUSED), (1, 0x7FFF)];

const fn sess_bool(id: AttributeId, st: SubTypeC, access: AccessFlags) -> AttributeAcl {
    AttributeAcl::boolean(id, SubTypeSet::c(st), access).route(TO_SESSION)
}

const fn sess_num(id: AttributeId, st: SubTypeC, access: AccessFlags, low: i32, high: i32) -> AttributeAcl {
    AttributeAcl::numeric(id, SubTypeSet::c(st), access, low, high).route(TO_SESSION)
}

const fn sess_str(id: AttributeId, st: SubTypeC, access: AccessFlags, min: i32, max: i32) -> AttributeAcl {
    AttributeAcl::string(id, SubTypeSet::c(st), access, min, max).route(TO_SESSION)
}

const fn sess_obj(id: AttributeId, st: SubTypeC, access: AccessFlags, object: ObjectAcl) -> AttributeAcl {
    AttributeAcl::object(id, SubTypeSet::c(st), access, object).route(TO_SESSION)
}

const fn sess_special(
    id: AttributeId,
    st: SubTypeC,
    access: AccessFlags,
    children: &'static [AttributeAcl],
) -> AttributeAcl {
    AttributeAcl::special(id, SubTypeSet::c(st), access, children).route(TO_SESSION)
}

const fn certs(st: SubTypeA, flags: ObjectAclFlags) -> ObjectAcl {
    ObjectAcl::new(SubTypeSet::a(st), flags)
}

// Objects that sessions accept or hand back

const OBJECT_SESSION_CLIENT: ObjectAcl =
    ObjectAcl::new(SubTypeSet::c(SSH.union(SSL)), ObjectAclFlags::HIGH_STATE);
const OBJECT_SESSION_SERVER: ObjectAcl =
    ObjectAcl::new(SubTypeSet::c(SSH_SVR.union(SSL_SVR)), ObjectAclFlags::HIGH_STATE);
const OBJECT_RTCS_REQUEST: ObjectAcl = certs(SubTypeA::CERT_RTCS_REQ, ObjectAclFlags::HIGH_STATE);
const OBJECT_OCSP_REQUEST: ObjectAcl = certs(SubTypeA::CERT_OCSP_REQ, ObjectAclFlags::HIGH_STATE);
const OBJECT_CMP_REQUEST: ObjectAcl = certs(
    SubTypeA::CERT_CERTREQ
        .union(SubTypeA::CERT_REQ_CERT)
        .union(SubTypeA::CERT_REQ_REV),
    ObjectAclFlags::ANY_STATE,
);
const OBJECT_PKCS10_REQUEST: ObjectAcl = certs(SubTypeA::CERT_CERTREQ, ObjectAclFlags::ANY_STATE);
const OBJECT_RTCS_RESPONSE: ObjectAcl = certs(SubTypeA::CERT_RTCS_RESP, ObjectAclFlags::HIGH_STATE);
const OBJECT_OCSP_RESPONSE: ObjectAcl = certs(SubTypeA::CERT_OCSP_RESP, ObjectAclFlags::HIGH_STATE);

const SUB_ACTIVE: [AttributeAcl; 2] = [
    sess_bool(AttributeId::SESSINFO_ACTIVE, DATA_SESSIONS, perm("Rxx_RWx"))
        .flags(AclFlags::TRIGGER)
        .bounds(1, 1),
    sess_bool(AttributeId::SESSINFO_ACTIVE, REQRESP_SESSIONS, perm("RWx_RWx"))
        .flags(AclFlags::TRIGGER)
        .bounds(1, 1),
];

const SUB_USERNAME: [AttributeAcl; 5] = [
    sess_str(
        AttributeId::SESSINFO_USERNAME,
        SSH.union(SSL).union(SCEP),
        perm("Rxx_RWD"),
        1,
        MAX_TEXTSIZE,
    ),
    sess_str(AttributeId::SESSINFO_USERNAME, SSH_SVR, perm("Rxx_Rxx"), 1, MAX_TEXTSIZE),
    sess_str(AttributeId::SESSINFO_USERNAME, CMP_SVR, perm("Rxx_xxx"), 1, MAX_TEXTSIZE),
    sess_str(AttributeId::SESSINFO_USERNAME, SSL_SVR, perm("RWx_RWx"), 1, MAX_TEXTSIZE),
    sess_str(AttributeId::SESSINFO_USERNAME, CMP, perm("RWD_RWD"), 1, MAX_TEXTSIZE),
];

const SUB_PASSWORD: [AttributeAcl; 3] = [
    sess_str(
        AttributeId::SESSINFO_PASSWORD,
        SSH.union(SSL).union(SCEP),
        perm("xxx_xWD"),
        1,
        MAX_TEXTSIZE,
    ),
    sess_str(AttributeId::SESSINFO_PASSWORD, SSH_SVR, perm("Rxx_Rxx"), 1, MAX_TEXTSIZE),
    sess_str(
        AttributeId::SESSINFO_PASSWORD,
        SSL_SVR.union(CMP),
        perm("xWD_xWD"),
        1,
        MAX_TEXTSIZE,
    ),
];

const SUB_PRIVATEKEY: [AttributeAcl; 2] = [
    sess_obj(
        AttributeId::SESSINFO_PRIVATEKEY,
        PRIVKEY_HOLDERS.difference(CMP),
        perm("xxx_xWx"),
        OBJECT_CTX_PKC,
    ),
    sess_obj(AttributeId::SESSINFO_PRIVATEKEY, CMP, perm("xWx_xWx"), OBJECT_CTX_PKC),
];

const SUB_KEYSET: [AttributeAcl; 2] = [
    sess_obj(
        AttributeId::SESSINFO_KEYSET,
        SSL_SVR.union(RTCS_SVR).union(OCSP_SVR).union(CERT_SVR),
        perm("xxx_xWx"),
        OBJECT_KEYSET_CERTS,
    ),
    sess_obj(
        AttributeId::SESSINFO_KEYSET,
        CMP_SVR.union(SCEP_SVR),
        perm("xxx_xWx"),
        OBJECT_CERTSTORE,
    ),
];

const SUB_SERVER_FINGERPRINT: [AttributeAcl; 2] = [
    sess_str(
        AttributeId::SESSINFO_SERVER_FINGERPRINT,
        SSH.union(SSL).union(SCEP),
        perm("Rxx_xWx"),
        MIN_FINGERPRINT_SIZE,
        MAX_FINGERPRINT_SIZE,
    ),
    sess_str(
        AttributeId::SESSINFO_SERVER_FINGERPRINT,
        SSH_SVR,
        perm("Rxx_Rxx"),
        MIN_FINGERPRINT_SIZE,
        MAX_FINGERPRINT_SIZE,
    ),
];

// The protocol session wraps a secure-channel session on the same side
const SUB_SESSION: [AttributeAcl; 2] = [
    sess_obj(
        AttributeId::SESSINFO_SESSION,
        CLIENT_PROTOCOLS,
        perm("xxx_xWx"),
        OBJECT_SESSION_CLIENT,
    ),
    sess_obj(
        AttributeId::SESSINFO_SESSION,
        SERVER_PROTOCOLS,
        perm("xxx_xWx"),
        OBJECT_SESSION_SERVER,
    ),
];

const SUB_VERSION: [AttributeAcl; 3] = [
    sess_num(AttributeId::SESSINFO_VERSION, SSH_ANY, perm("Rxx_RWx"), 1, 2),
    sess_num(AttributeId::SESSINFO_VERSION, SSL_ANY, perm("Rxx_RWx"), 0, 3),
    sess_num(
        AttributeId::SESSINFO_VERSION,
        OCSP.union(OCSP_SVR),
        perm("Rxx_RWx"),
        1,
        2,
    ),
];

const SUB_REQUEST: [AttributeAcl; 4] = [
    sess_obj(AttributeId::SESSINFO_REQUEST, RTCS, perm("xWD_xWD"), OBJECT_RTCS_REQUEST),
    sess_obj(AttributeId::SESSINFO_REQUEST, OCSP, perm("xWD_xWD"), OBJECT_OCSP_REQUEST),
    sess_obj(AttributeId::SESSINFO_REQUEST, CMP, perm("xWD_xWD"), OBJECT_CMP_REQUEST),
    sess_obj(AttributeId::SESSINFO_REQUEST, SCEP, perm("xWD_xWD"), OBJECT_PKCS10_REQUEST),
];

const SUB_RESPONSE: [AttributeAcl; 4] = [
    sess_obj(AttributeId::SESSINFO_RESPONSE, RTCS, perm("Rxx_xxx"), OBJECT_RTCS_RESPONSE),
    sess_obj(AttributeId::SESSINFO_RESPONSE, OCSP, perm("Rxx_xxx"), OBJECT_OCSP_RESPONSE),
    sess_obj(
        AttributeId::SESSINFO_RESPONSE,
        SSL_ANY.union(CMP).union(SCEP),
        perm("Rxx_xxx"),
        OBJECT_CERTIFICATE,
    ),
    sess_obj(AttributeId::SESSINFO_RESPONSE, TSP, perm("Rxx_xxx"), OBJECT_DEENVELOPE),
];

const SUB_CMP_REQUESTTYPE: [AttributeAcl; 2] = [
    sess_num(
        AttributeId::SESSINFO_CMP_REQUESTTYPE,
        CMP,
        perm("RWx_RWx"),
        1,
        REQUESTTYPE_LAST - 1,
    ),
    sess_num(
        AttributeId::SESSINFO_CMP_REQUESTTYPE,
        CMP_SVR,
        perm("Rxx_xxx"),
        1,
        REQUESTTYPE_LAST - 1,
    ),
];

const SUB_SSH_CHANNEL: [AttributeAcl; 2] = [
    sess_num(AttributeId::SESSINFO_SSH_CHANNEL, SSH, perm("RWx_RWx"), 0, 0)
        .subranges(&SSH_CHANNELS),
    sess_num(AttributeId::SESSINFO_SSH_CHANNEL, SSH_SVR, perm("RWx_xxx"), 0, 0)
        .subranges(&SSH_CHANNELS),
];

// A server only sees channel types the client asked for, so the shortest
// name it can be handed is "session"
const SUB_SSH_CHANNEL_TYPE: [AttributeAcl; 2] = [
    sess_str(
        AttributeId::SESSINFO_SSH_CHANNEL_TYPE,
        SSH,
        perm("RWx_RWx"),
        4,
        MAX_TEXTSIZE,
    ),
    sess_str(
        AttributeId::SESSINFO_SSH_CHANNEL_TYPE,
        SSH_SVR,
        perm("RWx_xxx"),
        7,
        MAX_TEXTSIZE,
    ),
];

const TABLE: [AttributeAcl; 24] = [
    sess_special(
        AttributeId::SESSINFO_ACTIVE,
        SubTypeC::SESS_ANY,
        perm("RWx_RWx"),
        &SUB_ACTIVE,
    )
    .flags(AclFlags::TRIGGER),
    sess_bool(
        AttributeId::SESSINFO_CONNECTIONACTIVE,
        SubTypeC::SESS_ANY,
        perm("Rxx_Rxx"),
    ),
    sess_special(
        AttributeId::SESSINFO_USERNAME,
        DATA_SESSIONS.union(CMP).union(CMP_SVR).union(SCEP),
        perm("RWD_RWD"),
        &SUB_USERNAME,
    ),
    sess_special(
        AttributeId::SESSINFO_PASSWORD,
        DATA_SESSIONS.union(CMP).union(SCEP),
        perm("RWD_RWD"),
        &SUB_PASSWORD,
    ),
    sess_special(
        AttributeId::SESSINFO_PRIVATEKEY,
        PRIVKEY_HOLDERS,
        perm("xWx_xWx"),
        &SUB_PRIVATEKEY,
    ),
    sess_special(
        AttributeId::SESSINFO_KEYSET,
        SSL_SVR
            .union(RTCS_SVR)
            .union(OCSP_SVR)
            .union(CMP_SVR)
            .union(SCEP_SVR)
            .union(CERT_SVR),
        perm("xxx_xWx"),
        &SUB_KEYSET,
    ),
    sess_num(AttributeId::SESSINFO_AUTHRESPONSE, SSH_SVR, perm("RWx_RWx"), 0, 0)
        .values(&AUTH_RESPONSES),
    sess_str(
        AttributeId::SESSINFO_SERVER_NAME,
        SubTypeC::SESS_ANY,
        perm("Rxx_RWD"),
        2,
        MAX_URL_SIZE,
    ),
    sess_num(
        AttributeId::SESSINFO_SERVER_PORT,
        SubTypeC::SESS_ANY,
        perm("Rxx_RWD"),
        MIN_PORT_NUMBER,
        MAX_PORT_NUMBER,
    ),
    sess_special(
        AttributeId::SESSINFO_SERVER_FINGERPRINT,
        SSH.union(SSL).union(SCEP).union(SSH_SVR),
        perm("Rxx_RWx"),
        &SUB_SERVER_FINGERPRINT,
    ),
    sess_str(
        AttributeId::SESSINFO_CLIENT_NAME,
        SubTypeC::SESS_ANY_SERVER,
        perm("Rxx_xxx"),
        2,
        MAX_URL_SIZE,
    ),
    // Client ports are ephemeral, anything above 0 is plausible
    sess_num(
        AttributeId::SESSINFO_CLIENT_PORT,
        SubTypeC::SESS_ANY_SERVER,
        perm("Rxx_xxx"),
        1,
        MAX_PORT_NUMBER,
    ),
    sess_special(
        AttributeId::SESSINFO_SESSION,
        CLIENT_PROTOCOLS.union(SERVER_PROTOCOLS),
        perm("xxx_xWx"),
        &SUB_SESSION,
    ),
    sess_num(
        AttributeId::SESSINFO_NETWORKSOCKET,
        SubTypeC::SESS_ANY,
        perm("xxx_xWx"),
        0,
        0,
    )
    .any(),
    sess_special(
        AttributeId::SESSINFO_VERSION,
        SSH_ANY.union(SSL_ANY).union(OCSP).union(OCSP_SVR),
        perm("Rxx_RWx"),
        &SUB_VERSION,
    ),
    sess_special(
        AttributeId::SESSINFO_REQUEST,
        RTCS.union(OCSP).union(CMP).union(SCEP),
        perm("xWD_xWD"),
        &SUB_REQUEST,
    ),
    sess_special(
        AttributeId::SESSINFO_RESPONSE,
        SSL_ANY.union(RTCS).union(OCSP).union(TSP).union(CMP).union(SCEP),
        perm("Rxx_xxx"),
        &SUB_RESPONSE,
    ),
    sess_obj(
        AttributeId::SESSINFO_CACERTIFICATE,
        CMP.union(SCEP),
        perm("xxx_xWx"),
        OBJECT_CERTIFICATE,
    ),
    sess_special(
        AttributeId::SESSINFO_CMP_REQUESTTYPE,
        CMP.union(CMP_SVR),
        perm("RWx_RWx"),
        &SUB_CMP_REQUESTTYPE,
    ),
    sess_special(
        AttributeId::SESSINFO_SSH_CHANNEL,
        SSH_ANY,
        perm("RWx_RWx"),
        &SUB_SSH_CHANNEL,
    ),
    sess_special(
        AttributeId::SESSINFO_SSH_CHANNEL_TYPE,
        SSH_ANY,
        perm("RWx_RWx"),
        &SUB_SSH_CHANNEL_TYPE,
    ),
    sess_bool(AttributeId::SESSINFO_SSH_CHANNEL_ACTIVE, SSH_ANY, perm("RWx_xxx")),
    sess_num(
        AttributeId::SESSINFO_SSL_OPTIONS,
        SSL_ANY,
        perm("Rxx_RWx"),
        0,
        SSLOPTION_MAX,
    ),
    sess_obj(
        AttributeId::SESSINFO_TSP_MSGIMPRINT,
        TSP,
        perm("xWD_xWD"),
        OBJECT_CTX_HASH,
    ),
];

const_assert_eq!(
    TABLE.len(),
    (AttributeId::SESSINFO_LAST.0 - AttributeId::SESSINFO_FIRST.0 - 1) as usize
);
const _: () = check_ids(&TABLE, AttributeId::SESSINFO_ACTIVE);

pub static SESSION_ACL: [AttributeAcl; 24] = TABLE;
