//! ACL entry types
//!
//! An [`AttributeAcl`] describes one attribute: the kind of value it
//! carries, which object subtypes have it, who may read/write/delete it in
//! which state, where messages for it are routed, and exactly one
//! [`RangeSpec`] constraining its value.

use bitflags::bitflags;

use super::perm::AccessFlags;
use crate::attr_id::AttributeId;
use crate::object_type::{ObjectType, SubTypeSet};

/// Kind of value an attribute carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Numeric,
    String,
    /// UTF-16 string; length limits count code units
    WideString,
    /// Handle of another object
    Object,
    /// Seconds since the epoch
    Time,
    /// Subtype-dependent, resolved through a nested sub-ACL
    Special,
}

impl ValueKind {
    pub const fn is_string(self) -> bool {
        matches!(self, ValueKind::String | ValueKind::WideString)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AclFlags: u8 {
        /// Kernel-managed object property, skips subtype checks
        const PROPERTY = 1 << 0;
        /// Writing the attribute moves the object to the high state
        const TRIGGER = 1 << 1;
    }
}

bitflags! {
    /// Constraints on an object-valued attribute's referenced object
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectAclFlags: u8 {
        /// Object must be in the high state
        const HIGH_STATE = 1 << 0;
        /// Object must be in the low state
        const LOW_STATE = 1 << 1;
        /// Check the context behind a certificate rather than the certificate
        const ROUTE_TO_CTX = 1 << 2;
        /// Check the certificate attached to a context rather than the context
        const ROUTE_TO_CERT = 1 << 3;

        const ANY_STATE = Self::HIGH_STATE.bits() | Self::LOW_STATE.bits();
    }
}

/// Requirements on an object passed as an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectAcl {
    pub subtypes: SubTypeSet,
    pub flags: ObjectAclFlags,
}

impl ObjectAcl {
    pub const fn new(subtypes: SubTypeSet, flags: ObjectAclFlags) -> Self {
        Self { subtypes, flags }
    }

    /// Whether an object in the given state is acceptable
    pub const fn state_ok(&self, high: bool) -> bool {
        if high {
            self.flags.contains(ObjectAclFlags::HIGH_STATE)
        } else {
            self.flags.contains(ObjectAclFlags::LOW_STATE)
        }
    }
}

/// Object type an attribute message is routed to before the checks run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Handled by whatever object the message was sent to
    None,
    Object(ObjectType),
    Alt(ObjectType, ObjectType),
    Alt2(ObjectType, ObjectType, ObjectType),
}

impl Route {
    pub fn targets(self) -> impl Iterator<Item = ObjectType> {
        let list = match self {
            Route::None => [None, None, None],
            Route::Object(a) => [Some(a), None, None],
            Route::Alt(a, b) => [Some(a), Some(b), None],
            Route::Alt2(a, b, c) => [Some(a), Some(b), Some(c)],
        };
        list.into_iter().flatten()
    }

    pub fn accepts(self, object_type: ObjectType) -> bool {
        self.targets().any(|t| t == object_type)
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Route::None)
    }
}

/// Constraint on an attribute's value
///
/// For string attributes bounds and allowed values apply to the length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeSpec {
    /// No value constraint (time values, checked separately)
    None,
    /// Any numeric value
    Any,
    Bounds { low: i32, high: i32 },
    AllowedValues(&'static [i32]),
    /// Accepted iff inside one of the inclusive ranges
    SubRanges(&'static [(i32, i32)]),
    Object(ObjectAcl),
    /// Per-subtype refinement; the first child whose subtypes contain the
    /// live subtype applies
    SubAcl(&'static [AttributeAcl]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeAcl {
    pub attribute: AttributeId,
    pub kind: ValueKind,
    pub subtypes: SubTypeSet,
    pub access: AccessFlags,
    pub flags: AclFlags,
    pub route: Route,
    pub range: RangeSpec,
}

impl AttributeAcl {
    const fn base(
        attribute: AttributeId,
        kind: ValueKind,
        subtypes: SubTypeSet,
        access: AccessFlags,
        range: RangeSpec,
    ) -> Self {
        Self {
            attribute,
            kind,
            subtypes,
            access,
            flags: AclFlags::empty(),
            route: Route::None,
            range,
        }
    }

    pub const fn boolean(attribute: AttributeId, subtypes: SubTypeSet, access: AccessFlags) -> Self {
        Self::base(
            attribute,
            ValueKind::Boolean,
            subtypes,
            access,
            RangeSpec::Bounds { low: 0, high: 1 },
        )
    }

    pub const fn numeric(
        attribute: AttributeId,
        subtypes: SubTypeSet,
        access: AccessFlags,
        low: i32,
        high: i32,
    ) -> Self {
        Self::base(
            attribute,
            ValueKind::Numeric,
            subtypes,
            access,
            RangeSpec::Bounds { low, high },
        )
    }

    pub const fn string(
        attribute: AttributeId,
        subtypes: SubTypeSet,
        access: AccessFlags,
        min: i32,
        max: i32,
    ) -> Self {
        Self::base(
            attribute,
            ValueKind::String,
            subtypes,
            access,
            RangeSpec::Bounds { low: min, high: max },
        )
    }

    pub const fn wide_string(
        attribute: AttributeId,
        subtypes: SubTypeSet,
        access: AccessFlags,
        min: i32,
        max: i32,
    ) -> Self {
        Self::base(
            attribute,
            ValueKind::WideString,
            subtypes,
            access,
            RangeSpec::Bounds { low: min, high: max },
        )
    }

    pub const fn time(attribute: AttributeId, subtypes: SubTypeSet, access: AccessFlags) -> Self {
        Self::base(attribute, ValueKind::Time, subtypes, access, RangeSpec::None)
    }

    pub const fn object(
        attribute: AttributeId,
        subtypes: SubTypeSet,
        access: AccessFlags,
        object: ObjectAcl,
    ) -> Self {
        Self::base(
            attribute,
            ValueKind::Object,
            subtypes,
            access,
            RangeSpec::Object(object),
        )
    }

    pub const fn special(
        attribute: AttributeId,
        subtypes: SubTypeSet,
        access: AccessFlags,
        children: &'static [AttributeAcl],
    ) -> Self {
        Self::base(
            attribute,
            ValueKind::Special,
            subtypes,
            access,
            RangeSpec::SubAcl(children),
        )
    }

    pub const fn route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    pub const fn flags(mut self, flags: AclFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn bounds(mut self, low: i32, high: i32) -> Self {
        self.range = RangeSpec::Bounds { low, high };
        self
    }

    pub const fn values(mut self, values: &'static [i32]) -> Self {
        self.range = RangeSpec::AllowedValues(values);
        self
    }

    pub const fn subranges(mut self, ranges: &'static [(i32, i32)]) -> Self {
        self.range = RangeSpec::SubRanges(ranges);
        self
    }

    pub const fn any(mut self) -> Self {
        self.range = RangeSpec::Any;
        self
    }

    #[inline]
    pub const fn is_property(&self) -> bool {
        self.flags.contains(AclFlags::PROPERTY)
    }

    #[inline]
    pub const fn is_trigger(&self) -> bool {
        self.flags.contains(AclFlags::TRIGGER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::perm::perm;
    use crate::object_type::SubTypeA;

    #[test]
    fn test_builders() {
        let acl = AttributeAcl::numeric(
            AttributeId::CTXINFO_MODE,
            SubTypeSet::a(SubTypeA::CTX_CONV),
            perm("Rxx_RWx"),
            1,
            5,
        )
        .route(Route::Object(ObjectType::Context))
        .flags(AclFlags::TRIGGER);

        assert_eq!(acl.kind, ValueKind::Numeric);
        assert!(acl.is_trigger());
        assert!(!acl.is_property());
        assert_eq!(acl.range, RangeSpec::Bounds { low: 1, high: 5 });
        assert!(acl.route.accepts(ObjectType::Context));
        assert!(!acl.route.accepts(ObjectType::User));
    }

    #[test]
    fn test_route_targets() {
        let route = Route::Alt2(ObjectType::Certificate, ObjectType::Envelope, ObjectType::Session);
        let targets: Vec<_> = route.targets().collect();
        assert_eq!(targets.len(), 3);
        assert_eq!(Route::None.targets().count(), 0);
    }

    #[test]
    fn test_object_acl_state() {
        let high_only = ObjectAcl::new(SubTypeSet::ALL, ObjectAclFlags::HIGH_STATE);
        assert!(high_only.state_ok(true));
        assert!(!high_only.state_ok(false));
        let any = ObjectAcl::new(SubTypeSet::ALL, ObjectAclFlags::ANY_STATE);
        assert!(any.state_ok(false));
    }
}
