//! Init-time consistency check of the attribute ACL tables
//!
//! The tables are hand-written, so before the kernel trusts them every
//! entry is walked once and checked for internal coherence. Any failure is
//! a build defect and aborts kernel init.

use super::perm::AccessFlags;
use super::tables::all_tables;
use super::types::{AttributeAcl, ObjectAclFlags, RangeSpec, ValueKind};
use crate::error::internal_error;
use crate::object_type::{ObjectType, SubTypeSet};
use crate::Result;

/// Verify every attribute ACL table
pub fn check_all() -> Result<()> {
    for (name, table) in all_tables() {
        let Some(first) = table.first() else {
            log::error!("{name} attribute ACL table is empty");
            internal_error!("empty attribute ACL table");
        };
        for (index, acl) in table.iter().enumerate() {
            if acl.attribute.0 != first.attribute.0 + index as i32 {
                log::error!("{name} ACL entry {index} is out of id order");
                internal_error!("attribute ACL table out of order");
            }
            if let Err(problem) = check_entry(acl) {
                log::error!(
                    "{name} ACL entry for attribute {} is inconsistent: {problem}",
                    acl.attribute.0
                );
                internal_error!("inconsistent attribute ACL entry");
            }
        }
    }
    log::debug!("attribute ACL tables verified");
    Ok(())
}

fn check_entry(acl: &AttributeAcl) -> core::result::Result<(), &'static str> {
    check_access(acl.access)?;
    check_subtypes(acl)?;
    check_range(acl)?;

    if acl.is_trigger() && !acl.access.contains(AccessFlags::INT_WRITE_LOW) {
        return Err("trigger attribute can't be written in the low state");
    }

    if let RangeSpec::SubAcl(children) = acl.range {
        for child in children {
            check_child(acl, child)?;
        }
    }
    Ok(())
}

fn check_access(access: AccessFlags) -> core::result::Result<(), &'static str> {
    if AccessFlags::from_bits(access.bits()).is_none() {
        return Err("unknown permission bits");
    }
    // Anything an external caller may do, an internal one may do as well
    let external = access & AccessFlags::EXTERNAL;
    if !access.internal_as_external().contains(external) {
        return Err("external permission without matching internal permission");
    }
    Ok(())
}

fn check_subtypes(acl: &AttributeAcl) -> core::result::Result<(), &'static str> {
    if acl.subtypes.is_empty() {
        return Err("no subtypes");
    }
    if !acl.subtypes.is_subset_of(SubTypeSet::ALL) {
        return Err("subtype outside every family");
    }
    if acl.route.is_none() {
        return Ok(());
    }
    // A routed attribute may only apply to objects its route can reach
    for object_type in ObjectType::ALL {
        if object_type.subtypes().intersects(acl.subtypes) && !acl.route.accepts(object_type) {
            return Err("subtypes reach an object type the route excludes");
        }
    }
    Ok(())
}

fn check_range(acl: &AttributeAcl) -> core::result::Result<(), &'static str> {
    match (acl.kind, acl.range) {
        (ValueKind::Boolean, RangeSpec::Bounds { low, high }) => {
            if low < 0 || high > 1 || low > high {
                return Err("boolean bounds outside 0..=1");
            }
        }
        (ValueKind::Numeric, RangeSpec::Bounds { low, high }) => {
            if low > high {
                return Err("inverted numeric bounds");
            }
        }
        (ValueKind::Numeric, RangeSpec::Any) => {}
        (ValueKind::Numeric, RangeSpec::AllowedValues(values)) => {
            if values.is_empty() {
                return Err("empty allowed-value list");
            }
        }
        (ValueKind::Numeric, RangeSpec::SubRanges(ranges)) => {
            if ranges.is_empty() {
                return Err("empty subrange list");
            }
            if ranges.iter().any(|&(low, high)| low > high) {
                return Err("inverted subrange");
            }
            if ranges.windows(2).any(|pair| pair[0].1 >= pair[1].0) {
                return Err("subranges overlap or are unordered");
            }
        }
        (ValueKind::String | ValueKind::WideString, RangeSpec::Bounds { low, high }) => {
            if low < 0 || low > high {
                return Err("bad string length bounds");
            }
        }
        (ValueKind::String | ValueKind::WideString, RangeSpec::AllowedValues(lengths)) => {
            if lengths.is_empty() || lengths.iter().any(|&len| len <= 0) {
                return Err("bad allowed string lengths");
            }
        }
        (ValueKind::Object, RangeSpec::Object(object)) => {
            if object.subtypes.is_empty() {
                return Err("object value accepts no subtypes");
            }
            if !object.flags.intersects(ObjectAclFlags::ANY_STATE) {
                return Err("object value accepts no state");
            }
            if object.flags.contains(ObjectAclFlags::ROUTE_TO_CTX | ObjectAclFlags::ROUTE_TO_CERT) {
                return Err("object value routed both ways");
            }
        }
        (ValueKind::Time, RangeSpec::None) => {}
        (ValueKind::Special, RangeSpec::SubAcl(children)) => {
            if children.is_empty() {
                return Err("empty sub-ACL");
            }
        }
        _ => return Err("range descriptor doesn't match the value kind"),
    }
    Ok(())
}

fn check_child(parent: &AttributeAcl, child: &AttributeAcl) -> core::result::Result<(), &'static str> {
    if child.attribute != parent.attribute {
        return Err("sub-ACL entry for a different attribute");
    }
    if child.kind == ValueKind::Special {
        return Err("nested sub-ACL");
    }
    if !child.subtypes.is_subset_of(parent.subtypes) {
        return Err("sub-ACL subtypes exceed the parent's");
    }
    if !parent.access.contains(child.access) {
        return Err("sub-ACL permissions exceed the parent's");
    }
    if child.route.is_none() != parent.route.is_none()
        || !child.route.targets().all(|target| parent.route.accepts(target))
    {
        return Err("sub-ACL routed outside the parent's route");
    }
    check_entry(child)
}
