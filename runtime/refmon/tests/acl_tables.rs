//! Attribute ACL tables
//!
//! - Every declared attribute id has exactly one entry and vice versa
//! - Internal ids are hidden from external lookups
//! - Range checks through the kernel agree with the shipped ranges
//! - Read/write attributes hand back exactly what was written

mod common;

use std::collections::HashMap;

use common::*;
use proptest::prelude::*;
use refmon::acl::tables::all_tables;
use refmon::acl::{check_all, find_attribute_acl, AccessFlags, AttributeAcl, RangeSpec, ValueKind};
use refmon::algo::{ALGO_DES, ALGO_HMAC_SHA1, ALGO_HMAC_SHA2};
use refmon::*;

// ============================================================================
// Id to entry mapping
// ============================================================================

/// Lookup by id lands on the entry declaring that id, for every id
#[test]
fn test_ids_and_entries_are_a_bijection() {
    let entries: usize = all_tables().iter().map(|(_, table)| table.len()).sum();
    assert_eq!(AttributeId::all().count(), entries);

    for id in AttributeId::all() {
        let acl = find_attribute_acl(id, true).unwrap_or_else(|| panic!("no entry for {id:?}"));
        assert_eq!(acl.attribute, id);
    }
    for (name, table) in all_tables() {
        for acl in table {
            let found = find_attribute_acl(acl.attribute, true)
                .unwrap_or_else(|| panic!("{name} entry {:?} not reachable", acl.attribute));
            assert!(std::ptr::eq(found, acl), "{name} entry {:?} shadowed", acl.attribute);
        }
    }
}

/// External lookups see everything except internal attributes
#[test]
fn test_external_lookup_hides_internal_ids() {
    for id in AttributeId::all() {
        assert_eq!(find_attribute_acl(id, false).is_none(), id.is_internal(), "{id:?}");
    }
}

/// Category markers aren't attributes
#[test]
fn test_markers_have_no_entry() {
    for marker in [
        AttributeId::PROPERTY_FIRST,
        AttributeId::PROPERTY_LAST,
        AttributeId::CTXINFO_FIRST,
        AttributeId::CTXINFO_LAST,
        AttributeId::IATTRIBUTE_FIRST,
        AttributeId::IATTRIBUTE_LAST,
    ] {
        assert!(find_attribute_acl(marker, true).is_none(), "{marker:?}");
    }
}

/// The shipped tables pass the init-time checks
#[test]
fn test_shipped_tables_consistent() {
    init_test_logging();
    assert_eq!(check_all(), Ok(()));
}

/// Boolean attributes only ever take 0/1
#[test]
fn test_boolean_ranges() {
    for (name, table) in all_tables() {
        for acl in table.iter().filter(|acl| acl.kind == ValueKind::Boolean) {
            let RangeSpec::Bounds { low, high } = acl.range else {
                panic!("{name} boolean {:?} without bounds", acl.attribute);
            };
            assert!(0 <= low && low <= high && high <= 1, "{name} {:?}", acl.attribute);
        }
    }
}

// ============================================================================
// Write then read back
// ============================================================================

/// A subtype of `object_type` that carries `acl`, other than the system
/// device
fn subtype_for(acl: &AttributeAcl, object_type: ObjectType) -> Option<SubType> {
    let own = object_type.subtypes();
    let a = acl.subtypes.a.intersection(own.a);
    let b = acl.subtypes.b.intersection(own.b).difference(SubTypeB::DEV_SYSTEM);
    let c = acl.subtypes.c.intersection(own.c);
    a.iter()
        .next()
        .map(SubType::A)
        .or_else(|| b.iter().next().map(SubType::B))
        .or_else(|| c.iter().next().map(SubType::C))
}

/// An in-range value for a plain numeric or string attribute
fn sample_value(acl: &AttributeAcl) -> Option<MessageData> {
    let pick = match acl.range {
        RangeSpec::Bounds { low, high } if acl.kind.is_string() => low.max(1).min(high),
        RangeSpec::Bounds { high, .. } => high,
        RangeSpec::AllowedValues(values) => *values.first()?,
        RangeSpec::SubRanges(ranges) => ranges.first()?.1,
        RangeSpec::Any => 1,
        _ => return None,
    };
    match acl.kind {
        ValueKind::Boolean | ValueKind::Numeric => Some(MessageData::Int(pick)),
        ValueKind::String => Some(MessageData::Bytes(vec![b'v'; usize::try_from(pick).ok()?])),
        ValueKind::WideString => Some(MessageData::Bytes(vec![b'w'; 2 * usize::try_from(pick).ok()?])),
        _ => None,
    }
}

/// Every attribute an outsider can both write and read on a fresh object
/// reads back as written
#[test]
fn test_read_write_attributes_round_trip() {
    let kernel = kernel();
    let mut objects: HashMap<SubType, ObjectHandle> = HashMap::new();
    let read_write = AccessFlags::EXT_READ_LOW | AccessFlags::EXT_WRITE_LOW;
    let mut checked = 0;

    for (name, table) in all_tables() {
        for acl in table {
            if acl.is_property() || acl.is_trigger() || acl.attribute.is_internal() || !acl.access.contains(read_write) {
                continue;
            }
            let Some(value) = sample_value(acl) else {
                continue;
            };
            let Some((object_type, subtype)) = ObjectType::ALL
                .iter()
                .filter(|t| acl.route.is_none() || acl.route.accepts(**t))
                .find_map(|t| subtype_for(acl, *t).map(|subtype| (*t, subtype)))
            else {
                continue;
            };
            let handle = *objects.entry(subtype).or_insert_with(|| {
                kernel
                    .create_object(
                        CreateObjectInfo::new(object_type, subtype, MemoryObject::shared())
                            .flags(CreateFlags::EXTERNAL | CreateFlags::INITIALISED),
                    )
                    .unwrap()
            });

            let (write, read) = match &value {
                MessageData::Int(v) => (Message::set_attribute(acl.attribute, *v), Message::get_attribute(acl.attribute)),
                MessageData::Bytes(bytes) => (
                    Message::set_attribute_s(acl.attribute, bytes),
                    Message::get_attribute_s(acl.attribute),
                ),
                _ => unreachable!(),
            };
            kernel
                .send(handle, write)
                .unwrap_or_else(|err| panic!("{name} {:?} write to {subtype:?}: {err}", acl.attribute));
            assert_eq!(
                kernel.send(handle, read),
                Ok(value),
                "{name} {:?} on {subtype:?}",
                acl.attribute
            );
            checked += 1;
        }
    }

    assert!(checked >= 50, "only {checked} attributes round-tripped");
}

// ============================================================================
// Range checks through the kernel
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Mode writes succeed exactly inside [1,5]
    #[test]
    fn test_mode_bounds(mode in -20i32..30) {
        let kernel = kernel();
        let des = context(&kernel, ALGO_DES);
        let result = kernel.send(des, Message::set_attribute(AttributeId::CTXINFO_MODE, mode));
        if (1..=5).contains(&mode) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(KernelError::ArgNum1));
        }
    }

    /// Revocation reasons skip the unused value between the two subranges
    #[test]
    fn test_crl_reason_subranges(reason in -3i32..15) {
        let kernel = kernel();
        let crl = create(&kernel, ObjectType::Certificate, CreateArgs { arg1: 7, ..CreateArgs::default() }).unwrap();
        let result = kernel.send(crl, Message::set_attribute(AttributeId::CERTINFO_CRLREASON, reason));
        if (0..=6).contains(&reason) || (8..=10).contains(&reason) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(KernelError::ArgNum1));
        }
    }

    /// Only the listed keying algorithms are accepted
    #[test]
    fn test_keying_algorithm_allowed_values(algorithm in 290i32..310) {
        let kernel = kernel();
        let des = context(&kernel, ALGO_DES);
        let result = kernel.send(des, Message::set_attribute(AttributeId::CTXINFO_KEYING_ALGO, algorithm));
        if algorithm == ALGO_HMAC_SHA1 || algorithm == ALGO_HMAC_SHA2 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(KernelError::ArgNum1));
        }
    }

    /// Label lengths are accepted exactly inside [1,64]
    #[test]
    fn test_label_length(length in 0usize..80) {
        let kernel = kernel();
        let des = context(&kernel, ALGO_DES);
        let label = vec![b'l'; length];
        let result = kernel.send(des, Message::set_attribute_s(AttributeId::CTXINFO_LABEL, &label));
        if (1..=64).contains(&length) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(KernelError::ArgStr1));
        }
    }
}
