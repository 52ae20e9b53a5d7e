//! Attribute id to ACL entry

use super::tables::table_for;
use super::types::{AttributeAcl, RangeSpec};
use crate::attr_id::{AttributeClass, AttributeId};
use crate::object_type::SubType;

/// Find the ACL entry for an attribute.
///
/// Returns `None` for ids outside every category, and for internal
/// attributes requested through an external message: to an outside caller
/// those ids don't exist.
pub fn find_attribute_acl(attribute: AttributeId, internal: bool) -> Option<&'static AttributeAcl> {
    let class = attribute.class()?;
    if class == AttributeClass::Internal && !internal {
        return None;
    }
    let (table, first) = table_for(class);
    let index = usize::try_from(attribute.0 - first.0).ok()?;
    let acl = table.get(index)?;
    debug_assert_eq!(acl.attribute, attribute);
    Some(acl)
}

/// Resolve a subtype-dependent entry to the child for `subtype`.
///
/// Entries without a sub-ACL resolve to themselves.
pub fn resolve_sub_acl(acl: &'static AttributeAcl, subtype: SubType) -> Option<&'static AttributeAcl> {
    match acl.range {
        RangeSpec::SubAcl(children) => children.iter().find(|child| child.subtypes.contains(subtype)),
        _ => Some(acl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::types::ValueKind;
    use crate::object_type::SubTypeA;

    #[test]
    fn test_every_id_maps_to_its_entry() {
        for id in AttributeId::all() {
            let acl = find_attribute_acl(id, true).unwrap();
            assert_eq!(acl.attribute, id);
        }
    }

    #[test]
    fn test_markers_and_gaps_have_no_entry() {
        assert!(find_attribute_acl(AttributeId::NONE, true).is_none());
        assert!(find_attribute_acl(AttributeId::CTXINFO_LAST, true).is_none());
        assert!(find_attribute_acl(AttributeId(2300), true).is_none());
        assert!(find_attribute_acl(AttributeId(-5), true).is_none());
    }

    #[test]
    fn test_internal_ids_hidden_from_external_callers() {
        assert!(find_attribute_acl(AttributeId::IATTRIBUTE_TYPE, false).is_none());
        assert!(find_attribute_acl(AttributeId::IATTRIBUTE_TYPE, true).is_some());
        assert!(find_attribute_acl(AttributeId::CTXINFO_KEY, false).is_some());
    }

    #[test]
    fn test_sub_acl_resolution() {
        let acl = find_attribute_acl(AttributeId::CTXINFO_BLOCKSIZE, false).unwrap();
        assert_eq!(acl.kind, ValueKind::Special);

        let hash = resolve_sub_acl(acl, SubType::A(SubTypeA::CTX_HASH)).unwrap();
        assert_eq!(hash.kind, ValueKind::Numeric);
        assert!(hash.subtypes.contains(SubType::A(SubTypeA::CTX_HASH)));

        assert!(resolve_sub_acl(acl, SubType::A(SubTypeA::CTX_GENERIC)).is_none());

        let plain = find_attribute_acl(AttributeId::CTXINFO_MODE, false).unwrap();
        assert!(core::ptr::eq(
            resolve_sub_acl(plain, SubType::A(SubTypeA::CTX_CONV)).unwrap(),
            plain
        ));
    }
}
