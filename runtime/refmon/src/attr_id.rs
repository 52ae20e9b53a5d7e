//! Attribute identifiers
//!
//! Attribute ids are grouped into numeric ranges, one per category. The ACL
//! engine relies on this layout: each category's ids are contiguous so that
//! an id maps to its table slot by subtraction. The `*_FIRST`/`*_LAST`
//! markers are never valid attributes themselves.

use core::fmt;

use static_assertions::const_assert;

/// Numeric attribute identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct AttributeId(pub i32);

impl fmt::Debug for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeId({})", self.0)
    }
}

/// Not-used marker for numeric parameters
pub const UNUSED: i32 = -101;

/// Use-the-default marker for numeric parameters
pub const USE_DEFAULT: i32 = -100;

/// Cursor movement codes accepted by cursor attributes
pub const CURSOR_FIRST: i32 = -200;
pub const CURSOR_PREVIOUS: i32 = -201;
pub const CURSOR_NEXT: i32 = -202;
pub const CURSOR_LAST: i32 = -203;

/// Category an attribute id falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeClass {
    Property,
    Generic,
    Option,
    Context,
    Certificate,
    CertName,
    CertExtension,
    CertCms,
    Keyset,
    Device,
    Envelope,
    Session,
    User,
    Internal,
}

impl AttributeId {
    pub const NONE: Self = Self(0);

    // Object properties
    pub const PROPERTY_FIRST: Self = Self(1);
    pub const PROPERTY_HIGHSECURITY: Self = Self(2);
    pub const PROPERTY_OWNER: Self = Self(3);
    pub const PROPERTY_FORWARDCOUNT: Self = Self(4);
    pub const PROPERTY_LOCKED: Self = Self(5);
    pub const PROPERTY_USAGECOUNT: Self = Self(6);
    pub const PROPERTY_NONEXPORTABLE: Self = Self(7);
    pub const PROPERTY_LAST: Self = Self(8);

    // Generic attributes
    pub const GENERIC_FIRST: Self = Self(9);
    pub const ERRORTYPE: Self = Self(10);
    pub const ERRORLOCUS: Self = Self(11);
    pub const ERRORMESSAGE: Self = Self(12);
    pub const CURRENT_GROUP: Self = Self(13);
    pub const CURRENT: Self = Self(14);
    pub const CURRENT_INSTANCE: Self = Self(15);
    pub const BUFFERSIZE: Self = Self(16);
    pub const GENERIC_LAST: Self = Self(17);

    // Configuration options
    pub const OPTION_FIRST: Self = Self(100);
    pub const OPTION_INFO_DESCRIPTION: Self = Self(101);
    pub const OPTION_INFO_COPYRIGHT: Self = Self(102);
    pub const OPTION_INFO_MAJORVERSION: Self = Self(103);
    pub const OPTION_INFO_MINORVERSION: Self = Self(104);
    pub const OPTION_INFO_STEPPING: Self = Self(105);
    pub const OPTION_ENCR_ALGO: Self = Self(106);
    pub const OPTION_ENCR_HASH: Self = Self(107);
    pub const OPTION_ENCR_MAC: Self = Self(108);
    pub const OPTION_PKC_ALGO: Self = Self(109);
    pub const OPTION_PKC_KEYSIZE: Self = Self(110);
    pub const OPTION_SIG_ALGO: Self = Self(111);
    pub const OPTION_SIG_KEYSIZE: Self = Self(112);
    pub const OPTION_KEYING_ALGO: Self = Self(113);
    pub const OPTION_KEYING_ITERATIONS: Self = Self(114);
    pub const OPTION_CERT_SIGNUNRECOGNISEDATTRIBUTES: Self = Self(115);
    pub const OPTION_CERT_VALIDITY: Self = Self(116);
    pub const OPTION_CERT_UPDATEINTERVAL: Self = Self(117);
    pub const OPTION_CERT_COMPLIANCELEVEL: Self = Self(118);
    pub const OPTION_CERT_REQUIREPOLICY: Self = Self(119);
    pub const OPTION_CMS_DEFAULTATTRIBUTES: Self = Self(120);
    pub const OPTION_KEYS_LDAP_OBJECTCLASS: Self = Self(121);
    pub const OPTION_NET_SOCKS_SERVER: Self = Self(122);
    pub const OPTION_NET_HTTP_PROXY: Self = Self(123);
    pub const OPTION_NET_CONNECTTIMEOUT: Self = Self(124);
    pub const OPTION_NET_READTIMEOUT: Self = Self(125);
    pub const OPTION_NET_WRITETIMEOUT: Self = Self(126);
    pub const OPTION_MISC_ASYNCINIT: Self = Self(127);
    pub const OPTION_MISC_SIDECHANNELPROTECTION: Self = Self(128);
    pub const OPTION_CONFIGCHANGED: Self = Self(129);
    pub const OPTION_SELFTESTOK: Self = Self(130);
    pub const OPTION_LAST: Self = Self(131);

    // Encryption contexts
    pub const CTXINFO_FIRST: Self = Self(1000);
    pub const CTXINFO_ALGO: Self = Self(1001);
    pub const CTXINFO_MODE: Self = Self(1002);
    pub const CTXINFO_NAME_ALGO: Self = Self(1003);
    pub const CTXINFO_NAME_MODE: Self = Self(1004);
    pub const CTXINFO_KEYSIZE: Self = Self(1005);
    pub const CTXINFO_BLOCKSIZE: Self = Self(1006);
    pub const CTXINFO_IVSIZE: Self = Self(1007);
    pub const CTXINFO_KEYING_ALGO: Self = Self(1008);
    pub const CTXINFO_KEYING_ITERATIONS: Self = Self(1009);
    pub const CTXINFO_KEYING_SALT: Self = Self(1010);
    pub const CTXINFO_KEYING_VALUE: Self = Self(1011);
    pub const CTXINFO_KEY: Self = Self(1012);
    pub const CTXINFO_KEY_COMPONENTS: Self = Self(1013);
    pub const CTXINFO_IV: Self = Self(1014);
    pub const CTXINFO_HASHVALUE: Self = Self(1015);
    pub const CTXINFO_LABEL: Self = Self(1016);
    pub const CTXINFO_PERSISTENT: Self = Self(1017);
    pub const CTXINFO_LAST: Self = Self(1018);

    // Certificates: pseudo-information and main fields
    pub const CERTINFO_FIRST: Self = Self(2000);
    pub const CERTINFO_SELFSIGNED: Self = Self(2001);
    pub const CERTINFO_IMMUTABLE: Self = Self(2002);
    pub const CERTINFO_XYZZY: Self = Self(2003);
    pub const CERTINFO_CERTTYPE: Self = Self(2004);
    pub const CERTINFO_FINGERPRINT_MD5: Self = Self(2005);
    pub const CERTINFO_FINGERPRINT_SHA1: Self = Self(2006);
    pub const CERTINFO_CURRENT_CERTIFICATE: Self = Self(2007);
    pub const CERTINFO_TRUSTED_USAGE: Self = Self(2008);
    pub const CERTINFO_TRUSTED_IMPLICIT: Self = Self(2009);
    pub const CERTINFO_SIGNATURELEVEL: Self = Self(2010);
    pub const CERTINFO_VERSION: Self = Self(2011);
    pub const CERTINFO_SERIALNUMBER: Self = Self(2012);
    pub const CERTINFO_SUBJECTPUBLICKEYINFO: Self = Self(2013);
    pub const CERTINFO_CERTIFICATE: Self = Self(2014);
    pub const CERTINFO_CACERTIFICATE: Self = Self(2015);
    pub const CERTINFO_ISSUERNAME: Self = Self(2016);
    pub const CERTINFO_VALIDFROM: Self = Self(2017);
    pub const CERTINFO_VALIDTO: Self = Self(2018);
    pub const CERTINFO_SUBJECTNAME: Self = Self(2019);
    pub const CERTINFO_CERTREQUEST: Self = Self(2020);
    pub const CERTINFO_THISUPDATE: Self = Self(2021);
    pub const CERTINFO_NEXTUPDATE: Self = Self(2022);
    pub const CERTINFO_REVOCATIONDATE: Self = Self(2023);
    pub const CERTINFO_REVOCATIONSTATUS: Self = Self(2024);
    pub const CERTINFO_CERTSTATUS: Self = Self(2025);
    pub const CERTINFO_DN: Self = Self(2026);
    pub const CERTINFO_PKIUSER_ID: Self = Self(2027);
    pub const CERTINFO_PKIUSER_ISSUEPASSWORD: Self = Self(2028);
    pub const CERTINFO_PKIUSER_REVPASSWORD: Self = Self(2029);

    // Certificates: name components
    pub const CERTINFO_FIRST_NAME: Self = Self(2100);
    pub const CERTINFO_COUNTRYNAME: Self = Self(2100);
    pub const CERTINFO_STATEORPROVINCENAME: Self = Self(2101);
    pub const CERTINFO_LOCALITYNAME: Self = Self(2102);
    pub const CERTINFO_ORGANIZATIONNAME: Self = Self(2103);
    pub const CERTINFO_ORGANIZATIONALUNITNAME: Self = Self(2104);
    pub const CERTINFO_COMMONNAME: Self = Self(2105);
    pub const CERTINFO_OTHERNAME_TYPEID: Self = Self(2106);
    pub const CERTINFO_OTHERNAME_VALUE: Self = Self(2107);
    pub const CERTINFO_RFC822NAME: Self = Self(2108);
    pub const CERTINFO_DNSNAME: Self = Self(2109);
    pub const CERTINFO_DIRECTORYNAME: Self = Self(2110);
    pub const CERTINFO_UNIFORMRESOURCEIDENTIFIER: Self = Self(2111);
    pub const CERTINFO_IPADDRESS: Self = Self(2112);
    pub const CERTINFO_REGISTEREDID: Self = Self(2113);
    pub const CERTINFO_LAST_NAME: Self = Self(2114);

    // Certificates: extensions
    pub const CERTINFO_FIRST_EXTENSION: Self = Self(2200);
    pub const CERTINFO_CHALLENGEPASSWORD: Self = Self(2200);
    pub const CERTINFO_CRLEXTREASON: Self = Self(2201);
    pub const CERTINFO_KEYFEATURES: Self = Self(2202);
    pub const CERTINFO_AUTHORITYINFOACCESS: Self = Self(2203);
    pub const CERTINFO_AUTHORITYINFO_OCSP: Self = Self(2204);
    pub const CERTINFO_AUTHORITYINFO_CAISSUERS: Self = Self(2205);
    pub const CERTINFO_SUBJECTKEYIDENTIFIER: Self = Self(2206);
    pub const CERTINFO_KEYUSAGE: Self = Self(2207);
    pub const CERTINFO_BASICCONSTRAINTS: Self = Self(2208);
    pub const CERTINFO_CA: Self = Self(2209);
    pub const CERTINFO_PATHLENCONSTRAINT: Self = Self(2210);
    pub const CERTINFO_CRLNUMBER: Self = Self(2211);
    pub const CERTINFO_CRLREASON: Self = Self(2212);
    pub const CERTINFO_HOLDINSTRUCTIONCODE: Self = Self(2213);
    pub const CERTINFO_INVALIDITYDATE: Self = Self(2214);
    pub const CERTINFO_CERTPOLICYID: Self = Self(2215);
    pub const CERTINFO_EXTKEY_SERVERAUTH: Self = Self(2216);
    pub const CERTINFO_EXTKEY_CLIENTAUTH: Self = Self(2217);
    pub const CERTINFO_LAST_EXTENSION: Self = Self(2218);

    // Certificates: CMS attributes
    pub const CERTINFO_FIRST_CMS: Self = Self(2500);
    pub const CERTINFO_CMS_CONTENTTYPE: Self = Self(2500);
    pub const CERTINFO_CMS_MESSAGEDIGEST: Self = Self(2501);
    pub const CERTINFO_CMS_SIGNINGTIME: Self = Self(2502);
    pub const CERTINFO_CMS_COUNTERSIGNATURE: Self = Self(2503);
    pub const CERTINFO_CMS_SIGNINGDESCRIPTION: Self = Self(2504);
    pub const CERTINFO_CMS_SMIMECAPABILITIES: Self = Self(2505);
    pub const CERTINFO_CMS_SMIMECAP_3DES: Self = Self(2506);
    pub const CERTINFO_CMS_SMIMECAP_AES: Self = Self(2507);
    pub const CERTINFO_LAST_CMS: Self = Self(2508);
    pub const CERTINFO_LAST: Self = Self(2600);

    // Keysets
    pub const KEYINFO_FIRST: Self = Self(3000);
    pub const KEYINFO_QUERY: Self = Self(3001);
    pub const KEYINFO_QUERY_REQUESTS: Self = Self(3002);
    pub const KEYINFO_LAST: Self = Self(3003);

    // Devices
    pub const DEVINFO_FIRST: Self = Self(4000);
    pub const DEVINFO_INITIALISE: Self = Self(4001);
    pub const DEVINFO_AUTHENT_USER: Self = Self(4002);
    pub const DEVINFO_AUTHENT_SUPERVISOR: Self = Self(4003);
    pub const DEVINFO_SET_AUTHENT_USER: Self = Self(4004);
    pub const DEVINFO_SET_AUTHENT_SUPERVISOR: Self = Self(4005);
    pub const DEVINFO_ZEROISE: Self = Self(4006);
    pub const DEVINFO_LOGGEDIN: Self = Self(4007);
    pub const DEVINFO_LABEL: Self = Self(4008);
    pub const DEVINFO_LAST: Self = Self(4009);

    // Envelopes
    pub const ENVINFO_FIRST: Self = Self(5000);
    pub const ENVINFO_DATASIZE: Self = Self(5001);
    pub const ENVINFO_COMPRESSION: Self = Self(5002);
    pub const ENVINFO_CONTENTTYPE: Self = Self(5003);
    pub const ENVINFO_DETACHEDSIGNATURE: Self = Self(5004);
    pub const ENVINFO_SIGNATURE_RESULT: Self = Self(5005);
    pub const ENVINFO_INTEGRITY: Self = Self(5006);
    pub const ENVINFO_PASSWORD: Self = Self(5007);
    pub const ENVINFO_KEY: Self = Self(5008);
    pub const ENVINFO_SIGNATURE: Self = Self(5009);
    pub const ENVINFO_SIGNATURE_EXTRADATA: Self = Self(5010);
    pub const ENVINFO_RECIPIENT: Self = Self(5011);
    pub const ENVINFO_PUBLICKEY: Self = Self(5012);
    pub const ENVINFO_PRIVATEKEY: Self = Self(5013);
    pub const ENVINFO_PRIVATEKEY_LABEL: Self = Self(5014);
    pub const ENVINFO_ORIGINATOR: Self = Self(5015);
    pub const ENVINFO_SESSIONKEY: Self = Self(5016);
    pub const ENVINFO_HASH: Self = Self(5017);
    pub const ENVINFO_TIMESTAMP: Self = Self(5018);
    pub const ENVINFO_KEYSET_SIGCHECK: Self = Self(5019);
    pub const ENVINFO_KEYSET_ENCRYPT: Self = Self(5020);
    pub const ENVINFO_KEYSET_DECRYPT: Self = Self(5021);
    pub const ENVINFO_LAST: Self = Self(5022);

    // Sessions
    pub const SESSINFO_FIRST: Self = Self(6000);
    pub const SESSINFO_ACTIVE: Self = Self(6001);
    pub const SESSINFO_CONNECTIONACTIVE: Self = Self(6002);
    pub const SESSINFO_USERNAME: Self = Self(6003);
    pub const SESSINFO_PASSWORD: Self = Self(6004);
    pub const SESSINFO_PRIVATEKEY: Self = Self(6005);
    pub const SESSINFO_KEYSET: Self = Self(6006);
    pub const SESSINFO_AUTHRESPONSE: Self = Self(6007);
    pub const SESSINFO_SERVER_NAME: Self = Self(6008);
    pub const SESSINFO_SERVER_PORT: Self = Self(6009);
    pub const SESSINFO_SERVER_FINGERPRINT: Self = Self(6010);
    pub const SESSINFO_CLIENT_NAME: Self = Self(6011);
    pub const SESSINFO_CLIENT_PORT: Self = Self(6012);
    pub const SESSINFO_SESSION: Self = Self(6013);
    pub const SESSINFO_NETWORKSOCKET: Self = Self(6014);
    pub const SESSINFO_VERSION: Self = Self(6015);
    pub const SESSINFO_REQUEST: Self = Self(6016);
    pub const SESSINFO_RESPONSE: Self = Self(6017);
    pub const SESSINFO_CACERTIFICATE: Self = Self(6018);
    pub const SESSINFO_CMP_REQUESTTYPE: Self = Self(6019);
    pub const SESSINFO_SSH_CHANNEL: Self = Self(6020);
    pub const SESSINFO_SSH_CHANNEL_TYPE: Self = Self(6021);
    pub const SESSINFO_SSH_CHANNEL_ACTIVE: Self = Self(6022);
    pub const SESSINFO_SSL_OPTIONS: Self = Self(6023);
    pub const SESSINFO_TSP_MSGIMPRINT: Self = Self(6024);
    pub const SESSINFO_LAST: Self = Self(6025);

    // Users
    pub const USERINFO_FIRST: Self = Self(7000);
    pub const USERINFO_PASSWORD: Self = Self(7001);
    pub const USERINFO_CAKEY_CERTSIGN: Self = Self(7002);
    pub const USERINFO_CAKEY_CRLSIGN: Self = Self(7003);
    pub const USERINFO_CAKEY_RTCSSIGN: Self = Self(7004);
    pub const USERINFO_CAKEY_OCSPSIGN: Self = Self(7005);
    pub const USERINFO_LAST: Self = Self(7006);

    // Kernel-internal attributes, never reachable by external messages
    pub const IATTRIBUTE_FIRST: Self = Self(8000);
    pub const IATTRIBUTE_TYPE: Self = Self(8001);
    pub const IATTRIBUTE_SUBTYPE: Self = Self(8002);
    pub const IATTRIBUTE_STATUS: Self = Self(8003);
    pub const IATTRIBUTE_INTERNAL: Self = Self(8004);
    pub const IATTRIBUTE_ACTIONPERMS: Self = Self(8005);
    pub const IATTRIBUTE_LOCKED: Self = Self(8006);
    pub const IATTRIBUTE_INITIALISED: Self = Self(8007);
    pub const IATTRIBUTE_KEYSIZE: Self = Self(8008);
    pub const IATTRIBUTE_KEYFEATURES: Self = Self(8009);
    pub const IATTRIBUTE_KEYID: Self = Self(8010);
    pub const IATTRIBUTE_KEYID_PGP2: Self = Self(8011);
    pub const IATTRIBUTE_KEYID_OPENPGP: Self = Self(8012);
    pub const IATTRIBUTE_KEY_SPKI: Self = Self(8013);
    pub const IATTRIBUTE_KEY_PGP: Self = Self(8014);
    pub const IATTRIBUTE_KEY_SSH: Self = Self(8015);
    pub const IATTRIBUTE_KEY_SSL: Self = Self(8016);
    pub const IATTRIBUTE_KEY_SPKI_PARTIAL: Self = Self(8017);
    pub const IATTRIBUTE_DEVICEOBJECT: Self = Self(8018);
    pub const IATTRIBUTE_SUBJECT: Self = Self(8019);
    pub const IATTRIBUTE_ISSUER: Self = Self(8020);
    pub const IATTRIBUTE_ISSUERANDSERIALNUMBER: Self = Self(8021);
    pub const IATTRIBUTE_SPKI: Self = Self(8022);
    pub const IATTRIBUTE_CERTCOLLECTION: Self = Self(8023);
    pub const IATTRIBUTE_ENTROPY: Self = Self(8024);
    pub const IATTRIBUTE_ENTROPY_QUALITY: Self = Self(8025);
    pub const IATTRIBUTE_RANDOM: Self = Self(8026);
    pub const IATTRIBUTE_RANDOM_NONCE: Self = Self(8027);
    pub const IATTRIBUTE_TIME: Self = Self(8028);
    pub const IATTRIBUTE_CONFIGDATA: Self = Self(8029);
    pub const IATTRIBUTE_USERID: Self = Self(8030);
    pub const IATTRIBUTE_LAST: Self = Self(8031);

    pub const fn value(self) -> i32 {
        self.0
    }

    /// Category of this id, or `None` for markers and gaps
    pub fn class(self) -> Option<AttributeClass> {
        let id = self;
        let inside = |first: Self, last: Self| id.0 > first.0 && id.0 < last.0;
        let class = if inside(Self::PROPERTY_FIRST, Self::PROPERTY_LAST) {
            AttributeClass::Property
        } else if inside(Self::GENERIC_FIRST, Self::GENERIC_LAST) {
            AttributeClass::Generic
        } else if inside(Self::OPTION_FIRST, Self::OPTION_LAST) {
            AttributeClass::Option
        } else if inside(Self::CTXINFO_FIRST, Self::CTXINFO_LAST) {
            AttributeClass::Context
        } else if inside(Self::CERTINFO_FIRST, Self::CERTINFO_FIRST_NAME) {
            if id.0 >= Self::CERTINFO_PKIUSER_REVPASSWORD.0 + 1 {
                return None;
            }
            AttributeClass::Certificate
        } else if id.0 >= Self::CERTINFO_FIRST_NAME.0 && id.0 < Self::CERTINFO_LAST_NAME.0 {
            AttributeClass::CertName
        } else if id.0 >= Self::CERTINFO_FIRST_EXTENSION.0
            && id.0 < Self::CERTINFO_LAST_EXTENSION.0
        {
            AttributeClass::CertExtension
        } else if id.0 >= Self::CERTINFO_FIRST_CMS.0 && id.0 < Self::CERTINFO_LAST_CMS.0 {
            AttributeClass::CertCms
        } else if inside(Self::KEYINFO_FIRST, Self::KEYINFO_LAST) {
            AttributeClass::Keyset
        } else if inside(Self::DEVINFO_FIRST, Self::DEVINFO_LAST) {
            AttributeClass::Device
        } else if inside(Self::ENVINFO_FIRST, Self::ENVINFO_LAST) {
            AttributeClass::Envelope
        } else if inside(Self::SESSINFO_FIRST, Self::SESSINFO_LAST) {
            AttributeClass::Session
        } else if inside(Self::USERINFO_FIRST, Self::USERINFO_LAST) {
            AttributeClass::User
        } else if inside(Self::IATTRIBUTE_FIRST, Self::IATTRIBUTE_LAST) {
            AttributeClass::Internal
        } else {
            return None;
        };
        Some(class)
    }

    pub fn is_internal(self) -> bool {
        self.class() == Some(AttributeClass::Internal)
    }

    /// Every declared attribute id, in ascending order
    pub fn all() -> impl Iterator<Item = AttributeId> {
        const RANGES: [(i32, i32); 14] = [
            (AttributeId::PROPERTY_FIRST.0 + 1, AttributeId::PROPERTY_LAST.0),
            (AttributeId::GENERIC_FIRST.0 + 1, AttributeId::GENERIC_LAST.0),
            (AttributeId::OPTION_FIRST.0 + 1, AttributeId::OPTION_LAST.0),
            (AttributeId::CTXINFO_FIRST.0 + 1, AttributeId::CTXINFO_LAST.0),
            (AttributeId::CERTINFO_FIRST.0 + 1, AttributeId::CERTINFO_PKIUSER_REVPASSWORD.0 + 1),
            (AttributeId::CERTINFO_FIRST_NAME.0, AttributeId::CERTINFO_LAST_NAME.0),
            (AttributeId::CERTINFO_FIRST_EXTENSION.0, AttributeId::CERTINFO_LAST_EXTENSION.0),
            (AttributeId::CERTINFO_FIRST_CMS.0, AttributeId::CERTINFO_LAST_CMS.0),
            (AttributeId::KEYINFO_FIRST.0 + 1, AttributeId::KEYINFO_LAST.0),
            (AttributeId::DEVINFO_FIRST.0 + 1, AttributeId::DEVINFO_LAST.0),
            (AttributeId::ENVINFO_FIRST.0 + 1, AttributeId::ENVINFO_LAST.0),
            (AttributeId::SESSINFO_FIRST.0 + 1, AttributeId::SESSINFO_LAST.0),
            (AttributeId::USERINFO_FIRST.0 + 1, AttributeId::USERINFO_LAST.0),
            (AttributeId::IATTRIBUTE_FIRST.0 + 1, AttributeId::IATTRIBUTE_LAST.0),
        ];
        RANGES
            .into_iter()
            .flat_map(|(first, end)| (first..end).map(AttributeId))
    }
}

// Category ranges must be ordered and disjoint
const_assert!(AttributeId::PROPERTY_LAST.0 < AttributeId::GENERIC_FIRST.0 + 1);
const_assert!(AttributeId::GENERIC_LAST.0 < AttributeId::OPTION_FIRST.0);
const_assert!(AttributeId::OPTION_LAST.0 < AttributeId::CTXINFO_FIRST.0);
const_assert!(AttributeId::CTXINFO_LAST.0 < AttributeId::CERTINFO_FIRST.0);
const_assert!(AttributeId::CERTINFO_PKIUSER_REVPASSWORD.0 < AttributeId::CERTINFO_FIRST_NAME.0);
const_assert!(AttributeId::CERTINFO_LAST_NAME.0 <= AttributeId::CERTINFO_FIRST_EXTENSION.0);
const_assert!(AttributeId::CERTINFO_LAST_EXTENSION.0 <= AttributeId::CERTINFO_FIRST_CMS.0);
const_assert!(AttributeId::CERTINFO_LAST_CMS.0 <= AttributeId::CERTINFO_LAST.0);
const_assert!(AttributeId::CERTINFO_LAST.0 < AttributeId::KEYINFO_FIRST.0);
const_assert!(AttributeId::KEYINFO_LAST.0 < AttributeId::DEVINFO_FIRST.0);
const_assert!(AttributeId::DEVINFO_LAST.0 < AttributeId::ENVINFO_FIRST.0);
const_assert!(AttributeId::ENVINFO_LAST.0 < AttributeId::SESSINFO_FIRST.0);
const_assert!(AttributeId::SESSINFO_LAST.0 < AttributeId::USERINFO_FIRST.0);
const_assert!(AttributeId::USERINFO_LAST.0 < AttributeId::IATTRIBUTE_FIRST.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_have_no_class() {
        for marker in [
            AttributeId::NONE,
            AttributeId::PROPERTY_FIRST,
            AttributeId::PROPERTY_LAST,
            AttributeId::CTXINFO_FIRST,
            AttributeId::CTXINFO_LAST,
            AttributeId::CERTINFO_FIRST,
            AttributeId::IATTRIBUTE_LAST,
            AttributeId(2050),
            AttributeId(2300),
        ] {
            assert_eq!(marker.class(), None, "{marker:?}");
        }
    }

    #[test]
    fn test_class_lookup() {
        assert_eq!(
            AttributeId::PROPERTY_OWNER.class(),
            Some(AttributeClass::Property)
        );
        assert_eq!(
            AttributeId::CERTINFO_COMMONNAME.class(),
            Some(AttributeClass::CertName)
        );
        assert_eq!(
            AttributeId::CERTINFO_CMS_SIGNINGTIME.class(),
            Some(AttributeClass::CertCms)
        );
        assert!(AttributeId::IATTRIBUTE_TYPE.is_internal());
        assert!(!AttributeId::CTXINFO_KEY.is_internal());
    }

    #[test]
    fn test_all_ids_are_classified() {
        let mut count = 0;
        for id in AttributeId::all() {
            assert!(id.class().is_some(), "{id:?}");
            count += 1;
        }
        assert_eq!(count, 6 + 7 + 30 + 17 + 29 + 14 + 18 + 8 + 2 + 8 + 21 + 24 + 5 + 30);
    }
}
