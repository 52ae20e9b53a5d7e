//! Access control lists
//!
//! Every policy decision the kernel makes is driven by static tables:
//!
//! - **Attribute ACLs** ([`tables`]): one entry per attribute id, found by
//!   id-range dispatch, checked by [`check_attribute_access`].
//! - **Key management ACL** ([`key_mgmt`]): item type x keyset type x id
//!   type, governing movement of keys in and out of keysets and devices.
//! - **Mechanism ACLs** ([`mechanism`]): parameter lists for wrap, unwrap,
//!   sign, signature check and key derivation.
//! - **Message parameter ACLs** ([`compare`], [`check`], [`create`],
//!   [`export`], [`cert_mgmt`], [`user_mgmt`]): one small table per
//!   message family.
//! - **Dependency ACL** ([`dependency`]): which objects may be attached to
//!   which.
//!
//! The tables are immutable, so evaluating them needs no locking. Their
//! internal consistency is verified once at kernel init by
//! [`check_all`]; a failure aborts init.

pub mod cert_mgmt;
pub mod check;
pub mod compare;
pub mod create;
pub mod dependency;
pub mod export;
pub mod key_mgmt;
pub mod mechanism;
pub mod perm;
pub mod range;
pub mod tables;
pub mod types;
pub mod user_mgmt;

mod attr_check;
mod consistency;
mod lookup;

pub use attr_check::{check_attribute_access, AttributeRequest, AttributeValue};
pub use consistency::check_all;
pub use lookup::{find_attribute_acl, resolve_sub_acl};
pub use perm::{perm, perm_int, AccessFlags, AccessOp};
pub use types::{AclFlags, AttributeAcl, ObjectAcl, ObjectAclFlags, RangeSpec, Route, ValueKind};
