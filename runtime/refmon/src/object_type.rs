//! Object types and subtypes
//!
//! Every object has a coarse [`ObjectType`] and exactly one subtype bit
//! drawn from one of three independent families ([`SubTypeA`],
//! [`SubTypeB`], [`SubTypeC`]). ACL entries name the subtypes they apply to
//! with a [`SubTypeSet`], a sum of one set per family; membership succeeds
//! if the live subtype is present in *any* of the three.

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObjectType {
    Context = 1,
    Keyset = 2,
    Envelope = 3,
    Certificate = 4,
    Device = 5,
    Session = 6,
    User = 7,
}

impl ObjectType {
    pub const ALL: [ObjectType; 7] = [
        ObjectType::Context,
        ObjectType::Keyset,
        ObjectType::Envelope,
        ObjectType::Certificate,
        ObjectType::Device,
        ObjectType::Session,
        ObjectType::User,
    ];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| *t as i32 == value)
    }

    /// Every subtype that an object of this type may carry
    pub const fn subtypes(self) -> SubTypeSet {
        match self {
            ObjectType::Context => SubTypeSet::a(SubTypeA::CTX_ANY),
            ObjectType::Certificate => SubTypeSet::a(SubTypeA::CERT_ANY),
            ObjectType::Keyset => SubTypeSet::b(SubTypeB::KEYSET_ANY),
            ObjectType::Envelope => SubTypeSet::b(SubTypeB::ENV_ANY),
            ObjectType::Device => SubTypeSet::b(SubTypeB::DEV_ANY),
            ObjectType::Session => SubTypeSet::c(SubTypeC::SESS_ANY),
            ObjectType::User => SubTypeSet::c(SubTypeC::USER_ANY),
        }
    }
}

bitflags! {
    /// Subtype family A: contexts and certificates
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubTypeA: u32 {
        const CTX_CONV = 1 << 0;
        const CTX_PKC = 1 << 1;
        const CTX_HASH = 1 << 2;
        const CTX_MAC = 1 << 3;
        const CTX_GENERIC = 1 << 4;

        const CERT_CERT = 1 << 5;
        const CERT_CERTREQ = 1 << 6;
        const CERT_REQ_CERT = 1 << 7;
        const CERT_REQ_REV = 1 << 8;
        const CERT_CERTCHAIN = 1 << 9;
        const CERT_ATTRCERT = 1 << 10;
        const CERT_CRL = 1 << 11;
        const CERT_CMSATTR = 1 << 12;
        const CERT_RTCS_REQ = 1 << 13;
        const CERT_RTCS_RESP = 1 << 14;
        const CERT_OCSP_REQ = 1 << 15;
        const CERT_OCSP_RESP = 1 << 16;
        const CERT_PKIUSER = 1 << 17;

        const CTX_ANY = Self::CTX_CONV.bits() | Self::CTX_PKC.bits()
            | Self::CTX_HASH.bits() | Self::CTX_MAC.bits() | Self::CTX_GENERIC.bits();
        const CERT_ANY_CERT = Self::CERT_CERT.bits() | Self::CERT_CERTREQ.bits()
            | Self::CERT_REQ_CERT.bits() | Self::CERT_CERTCHAIN.bits();
        const CERT_ANY = Self::CERT_ANY_CERT.bits() | Self::CERT_REQ_REV.bits()
            | Self::CERT_ATTRCERT.bits() | Self::CERT_CRL.bits() | Self::CERT_CMSATTR.bits()
            | Self::CERT_RTCS_REQ.bits() | Self::CERT_RTCS_RESP.bits()
            | Self::CERT_OCSP_REQ.bits() | Self::CERT_OCSP_RESP.bits()
            | Self::CERT_PKIUSER.bits();
    }
}

bitflags! {
    /// Subtype family B: envelopes, keysets and devices
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubTypeB: u32 {
        const ENV_ENV = 1 << 0;
        const ENV_ENV_PGP = 1 << 1;
        const ENV_DEENV = 1 << 2;

        const KEYSET_FILE = 1 << 3;
        const KEYSET_FILE_PARTIAL = 1 << 4;
        const KEYSET_FILE_RO = 1 << 5;
        const KEYSET_DBMS = 1 << 6;
        const KEYSET_DBMS_STORE = 1 << 7;
        const KEYSET_HTTP = 1 << 8;
        const KEYSET_LDAP = 1 << 9;

        const DEV_SYSTEM = 1 << 10;
        const DEV_P11 = 1 << 11;
        const DEV_CAPI = 1 << 12;
        const DEV_HW = 1 << 13;

        const ENV_ANY = Self::ENV_ENV.bits() | Self::ENV_ENV_PGP.bits() | Self::ENV_DEENV.bits();
        const KEYSET_ANY = Self::KEYSET_FILE.bits() | Self::KEYSET_FILE_PARTIAL.bits()
            | Self::KEYSET_FILE_RO.bits() | Self::KEYSET_DBMS.bits()
            | Self::KEYSET_DBMS_STORE.bits() | Self::KEYSET_HTTP.bits()
            | Self::KEYSET_LDAP.bits();
        /// Devices that can hold keys, everything but the system device
        const DEV_ANY_STD = Self::DEV_P11.bits() | Self::DEV_CAPI.bits() | Self::DEV_HW.bits();
        const DEV_ANY = Self::DEV_SYSTEM.bits() | Self::DEV_ANY_STD.bits();
    }
}

bitflags! {
    /// Subtype family C: sessions and users
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubTypeC: u32 {
        const SESS_SSH = 1 << 0;
        const SESS_SSH_SVR = 1 << 1;
        const SESS_SSL = 1 << 2;
        const SESS_SSL_SVR = 1 << 3;
        const SESS_RTCS = 1 << 4;
        const SESS_RTCS_SVR = 1 << 5;
        const SESS_OCSP = 1 << 6;
        const SESS_OCSP_SVR = 1 << 7;
        const SESS_TSP = 1 << 8;
        const SESS_TSP_SVR = 1 << 9;
        const SESS_CMP = 1 << 10;
        const SESS_CMP_SVR = 1 << 11;
        const SESS_SCEP = 1 << 12;
        const SESS_SCEP_SVR = 1 << 13;
        const SESS_CERT_SVR = 1 << 14;

        const USER_NORMAL = 1 << 15;
        const USER_SO = 1 << 16;
        const USER_CA = 1 << 17;

        const SESS_ANY_CLIENT = Self::SESS_SSH.bits() | Self::SESS_SSL.bits()
            | Self::SESS_RTCS.bits() | Self::SESS_OCSP.bits() | Self::SESS_TSP.bits()
            | Self::SESS_CMP.bits() | Self::SESS_SCEP.bits();
        const SESS_ANY_SERVER = Self::SESS_SSH_SVR.bits() | Self::SESS_SSL_SVR.bits()
            | Self::SESS_RTCS_SVR.bits() | Self::SESS_OCSP_SVR.bits()
            | Self::SESS_TSP_SVR.bits() | Self::SESS_CMP_SVR.bits()
            | Self::SESS_SCEP_SVR.bits() | Self::SESS_CERT_SVR.bits();
        const SESS_ANY = Self::SESS_ANY_CLIENT.bits() | Self::SESS_ANY_SERVER.bits();
        const USER_ANY = Self::USER_NORMAL.bits() | Self::USER_SO.bits() | Self::USER_CA.bits();
    }
}

/// A single live subtype: exactly one bit from exactly one family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubType {
    A(SubTypeA),
    B(SubTypeB),
    C(SubTypeC),
}

impl SubType {
    /// True if this is exactly one known subtype bit
    pub fn is_single(&self) -> bool {
        let bits = match self {
            SubType::A(a) => a.bits(),
            SubType::B(b) => b.bits(),
            SubType::C(c) => c.bits(),
        };
        bits.count_ones() == 1 && SubTypeSet::from(*self).is_subset_of(SubTypeSet::ALL)
    }

    /// The object type this subtype belongs to
    pub fn object_type(&self) -> Option<ObjectType> {
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.subtypes().contains(*self))
    }

    /// Subtype of a newly created object, from the creation argument.
    ///
    /// Contexts are selected by algorithm range (conventional 1-99, PKC
    /// 100-199, hash 200-299, MAC 300-399, generic 400-499); other types
    /// number their subtypes from 1 in declaration order.
    pub fn from_creation_arg(object_type: ObjectType, arg: i32) -> Option<SubType> {
        if arg <= 0 {
            return None;
        }
        let index = (arg - 1) as usize;
        match object_type {
            ObjectType::Context => {
                let sub = match arg {
                    1..=99 => SubTypeA::CTX_CONV,
                    100..=199 => SubTypeA::CTX_PKC,
                    200..=299 => SubTypeA::CTX_HASH,
                    300..=399 => SubTypeA::CTX_MAC,
                    400..=499 => SubTypeA::CTX_GENERIC,
                    _ => return None,
                };
                Some(SubType::A(sub))
            }
            ObjectType::Certificate => SubTypeA::CERT_ANY
                .iter()
                .nth(index)
                .map(SubType::A),
            ObjectType::Keyset => SubTypeB::KEYSET_ANY.iter().nth(index).map(SubType::B),
            ObjectType::Envelope => SubTypeB::ENV_ANY.iter().nth(index).map(SubType::B),
            ObjectType::Device => SubTypeB::DEV_ANY.iter().nth(index).map(SubType::B),
            ObjectType::Session => SubTypeC::SESS_ANY.iter().nth(index).map(SubType::C),
            ObjectType::User => SubTypeC::USER_ANY.iter().nth(index).map(SubType::C),
        }
    }
}

/// Sum of one subtype set per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubTypeSet {
    pub a: SubTypeA,
    pub b: SubTypeB,
    pub c: SubTypeC,
}

impl SubTypeSet {
    pub const NONE: Self = Self::new(SubTypeA::empty(), SubTypeB::empty(), SubTypeC::empty());
    pub const ALL: Self = Self::new(SubTypeA::all(), SubTypeB::all(), SubTypeC::all());

    pub const fn new(a: SubTypeA, b: SubTypeB, c: SubTypeC) -> Self {
        Self { a, b, c }
    }

    pub const fn a(a: SubTypeA) -> Self {
        Self::new(a, SubTypeB::empty(), SubTypeC::empty())
    }

    pub const fn b(b: SubTypeB) -> Self {
        Self::new(SubTypeA::empty(), b, SubTypeC::empty())
    }

    pub const fn c(c: SubTypeC) -> Self {
        Self::new(SubTypeA::empty(), SubTypeB::empty(), c)
    }

    pub const fn union(self, other: Self) -> Self {
        Self::new(
            self.a.union(other.a),
            self.b.union(other.b),
            self.c.union(other.c),
        )
    }

    pub const fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty() && self.c.is_empty()
    }

    /// Live-subtype membership in any of the three families
    pub const fn contains(&self, subtype: SubType) -> bool {
        match subtype {
            SubType::A(a) => !a.is_empty() && self.a.contains(a),
            SubType::B(b) => !b.is_empty() && self.b.contains(b),
            SubType::C(c) => !c.is_empty() && self.c.contains(c),
        }
    }

    pub const fn is_subset_of(&self, other: Self) -> bool {
        other.a.contains(self.a) && other.b.contains(self.b) && other.c.contains(self.c)
    }

    pub const fn intersects(&self, other: Self) -> bool {
        self.a.intersects(other.a) || self.b.intersects(other.b) || self.c.intersects(other.c)
    }
}

impl From<SubType> for SubTypeSet {
    fn from(subtype: SubType) -> Self {
        match subtype {
            SubType::A(a) => SubTypeSet::a(a),
            SubType::B(b) => SubTypeSet::b(b),
            SubType::C(c) => SubTypeSet::c(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_across_families() {
        let set = SubTypeSet::new(SubTypeA::CTX_PKC, SubTypeB::KEYSET_FILE, SubTypeC::empty());
        assert!(set.contains(SubType::A(SubTypeA::CTX_PKC)));
        assert!(set.contains(SubType::B(SubTypeB::KEYSET_FILE)));
        assert!(!set.contains(SubType::A(SubTypeA::CTX_CONV)));
        assert!(!set.contains(SubType::C(SubTypeC::USER_SO)));
    }

    #[test]
    fn test_empty_subtype_never_matches() {
        assert!(!SubTypeSet::ALL.contains(SubType::A(SubTypeA::empty())));
    }

    #[test]
    fn test_object_type_of_subtype() {
        assert_eq!(
            SubType::A(SubTypeA::CERT_CRL).object_type(),
            Some(ObjectType::Certificate)
        );
        assert_eq!(
            SubType::B(SubTypeB::DEV_SYSTEM).object_type(),
            Some(ObjectType::Device)
        );
        assert_eq!(
            SubType::C(SubTypeC::SESS_SSH).object_type(),
            Some(ObjectType::Session)
        );
    }

    #[test]
    fn test_families_do_not_overlap_within_class() {
        for t in ObjectType::ALL {
            for u in ObjectType::ALL {
                if t != u {
                    assert!(!t.subtypes().intersects(u.subtypes()), "{t:?} overlaps {u:?}");
                }
            }
        }
    }

    #[test]
    fn test_creation_arg_mapping() {
        assert_eq!(
            SubType::from_creation_arg(ObjectType::Context, 1),
            Some(SubType::A(SubTypeA::CTX_CONV))
        );
        assert_eq!(
            SubType::from_creation_arg(ObjectType::Context, 101),
            Some(SubType::A(SubTypeA::CTX_PKC))
        );
        assert_eq!(
            SubType::from_creation_arg(ObjectType::Certificate, 1),
            Some(SubType::A(SubTypeA::CERT_CERT))
        );
        assert_eq!(
            SubType::from_creation_arg(ObjectType::Keyset, 1),
            Some(SubType::B(SubTypeB::KEYSET_FILE))
        );
        assert_eq!(SubType::from_creation_arg(ObjectType::User, 0), None);
        assert_eq!(SubType::from_creation_arg(ObjectType::User, 99), None);
    }

    #[test]
    fn test_single_subtype() {
        assert!(SubType::C(SubTypeC::USER_SO).is_single());
        assert!(!SubType::C(SubTypeC::USER_ANY).is_single());
    }
}
