//! Kernel-managed object properties
//!
//! Properties live in the object record rather than behind the handler,
//! so the kernel answers them directly while it holds the table lock. The
//! attribute ACL has already checked access and value ranges by the time
//! these run; what is left are the state-dependent rules.

use super::perms::ActionPerms;
use super::record::{ObjectFlags, ObjectRecord};
use crate::attr_id::{AttributeId, UNUSED};
use crate::error::internal_error;
use crate::object_type::SubType;
use crate::sync::ThreadToken;
use crate::{KernelError, Result};

/// Attributes answered by the kernel itself
pub const KERNEL_PROPERTIES: [AttributeId; 12] = [
    AttributeId::PROPERTY_HIGHSECURITY,
    AttributeId::PROPERTY_OWNER,
    AttributeId::PROPERTY_FORWARDCOUNT,
    AttributeId::PROPERTY_LOCKED,
    AttributeId::PROPERTY_USAGECOUNT,
    AttributeId::PROPERTY_NONEXPORTABLE,
    AttributeId::IATTRIBUTE_TYPE,
    AttributeId::IATTRIBUTE_SUBTYPE,
    AttributeId::IATTRIBUTE_STATUS,
    AttributeId::IATTRIBUTE_INTERNAL,
    AttributeId::IATTRIBUTE_ACTIONPERMS,
    AttributeId::IATTRIBUTE_LOCKED,
];

pub fn is_kernel_property(attribute: AttributeId) -> bool {
    KERNEL_PROPERTIES.contains(&attribute)
}

/// Status value meaning "no error"
const STATUS_OK: i32 = 0;

fn count_value(count: Option<u32>) -> i32 {
    count.map_or(UNUSED, |count| i32::try_from(count).unwrap_or(i32::MAX))
}

fn subtype_bits(subtype: SubType) -> i32 {
    let bits = match subtype {
        SubType::A(a) => a.bits(),
        SubType::B(b) => b.bits(),
        SubType::C(c) => c.bits(),
    };
    i32::try_from(bits).unwrap_or(i32::MAX)
}

impl ObjectRecord {
    /// Read a kernel-managed property
    pub(crate) fn get_property(&self, attribute: AttributeId) -> Result<i32> {
        let value = match attribute {
            AttributeId::PROPERTY_OWNER => {
                // No owner to report unless the object is bound to a thread
                if !self.flags.contains(ObjectFlags::OWNED) {
                    return Err(KernelError::NotInited);
                }
                self.owner_thread.unwrap_or(UNUSED)
            }
            AttributeId::PROPERTY_FORWARDCOUNT => {
                if self.flags.contains(ObjectFlags::ATTRLOCKED) {
                    return Err(KernelError::Permission);
                }
                count_value(self.forward_count)
            }
            AttributeId::PROPERTY_LOCKED => i32::from(self.flags.contains(ObjectFlags::ATTRLOCKED)),
            AttributeId::PROPERTY_USAGECOUNT => count_value(self.usage_count),
            AttributeId::PROPERTY_NONEXPORTABLE => i32::from(self.flags.contains(ObjectFlags::NONEXPORTABLE)),
            AttributeId::IATTRIBUTE_TYPE => self.object_type as i32,
            AttributeId::IATTRIBUTE_SUBTYPE => subtype_bits(self.subtype),
            AttributeId::IATTRIBUTE_STATUS => {
                if self.in_invalid_state() {
                    1
                } else {
                    STATUS_OK
                }
            }
            AttributeId::IATTRIBUTE_INTERNAL => i32::from(self.is_internal()),
            AttributeId::IATTRIBUTE_ACTIONPERMS => i32::from(self.action_perms.bits()),
            _ => internal_error!("read of a property the kernel doesn't manage"),
        };
        Ok(value)
    }

    /// Write a kernel-managed property on behalf of `thread`
    pub(crate) fn set_property(&mut self, attribute: AttributeId, value: i32, thread: ThreadToken) -> Result<()> {
        let locked = self.flags.contains(ObjectFlags::ATTRLOCKED);
        match attribute {
            AttributeId::PROPERTY_HIGHSECURITY => {
                if locked {
                    return Err(KernelError::Permission);
                }
                // Bound to the caller for good: no further ownership changes
                self.owner_thread = Some(thread);
                self.forward_count = Some(0);
                self.flags.insert(ObjectFlags::ATTRLOCKED | ObjectFlags::OWNED);
            }
            AttributeId::PROPERTY_OWNER => {
                if let Some(count) = self.forward_count {
                    if count == 0 {
                        return Err(KernelError::Permission);
                    }
                    self.forward_count = Some(count - 1);
                }
                if value == UNUSED {
                    self.flags.remove(ObjectFlags::OWNED);
                    self.owner_thread = None;
                } else {
                    self.flags.insert(ObjectFlags::OWNED);
                    self.owner_thread = Some(thread);
                }
            }
            AttributeId::PROPERTY_FORWARDCOUNT => {
                let new = u32::try_from(value).map_err(|_| KernelError::ArgNum1)?;
                if locked || self.forward_count.is_some_and(|current| new > current) {
                    return Err(KernelError::Permission);
                }
                self.forward_count = Some(new);
            }
            AttributeId::PROPERTY_LOCKED => {
                if value == 0 {
                    return Err(KernelError::Permission);
                }
                self.flags.insert(ObjectFlags::ATTRLOCKED);
            }
            AttributeId::PROPERTY_USAGECOUNT => {
                let new = u32::try_from(value).map_err(|_| KernelError::ArgNum1)?;
                if locked || self.usage_count.is_some_and(|current| new > current) {
                    return Err(KernelError::Permission);
                }
                self.usage_count = Some(new);
            }
            AttributeId::PROPERTY_NONEXPORTABLE => {
                if value == 0 || self.flags.contains(ObjectFlags::NONEXPORTABLE) {
                    return Err(KernelError::Permission);
                }
                self.flags.insert(ObjectFlags::NONEXPORTABLE);
            }
            AttributeId::IATTRIBUTE_STATUS => {
                if value != STATUS_OK {
                    internal_error!("object status can only be cleared");
                }
                if self.flags.contains(ObjectFlags::SIGNALLED) {
                    return Err(KernelError::Signalled);
                }
                self.flags.remove(ObjectFlags::NOTINITED);
            }
            AttributeId::IATTRIBUTE_INTERNAL => {
                self.flags.set(ObjectFlags::INTERNAL, value != 0);
            }
            AttributeId::IATTRIBUTE_ACTIONPERMS => {
                let requested = u16::try_from(value).map_err(|_| KernelError::ArgNum1)?;
                self.action_perms = self.action_perms.ratchet(ActionPerms::from_bits(requested));
            }
            AttributeId::IATTRIBUTE_LOCKED => {
                if value != 0 {
                    self.lock(thread)?;
                } else {
                    self.unlock(thread)?;
                }
            }
            _ => internal_error!("write of a property the kernel doesn't manage"),
        }
        log::trace!("property {} of {:?} set to {value}", attribute.0, self.object_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemoryObject;
    use crate::object_type::{ObjectType, SubTypeA};
    use crate::objects::{Action, ActionLevel};

    fn record() -> ObjectRecord {
        let mut record = ObjectRecord::new(ObjectType::Context, SubType::A(SubTypeA::CTX_CONV), MemoryObject::shared());
        record.flags = ObjectFlags::empty();
        record
    }

    #[test]
    fn test_high_security_freezes_owner() {
        let mut rec = record();
        rec.set_property(AttributeId::PROPERTY_HIGHSECURITY, 1, 7).unwrap();
        assert!(rec.flags.contains(ObjectFlags::ATTRLOCKED | ObjectFlags::OWNED));
        assert_eq!(rec.get_property(AttributeId::PROPERTY_OWNER), Ok(7));
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_OWNER, 9, 9),
            Err(KernelError::Permission)
        );
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_HIGHSECURITY, 1, 7),
            Err(KernelError::Permission)
        );
        assert_eq!(
            rec.get_property(AttributeId::PROPERTY_FORWARDCOUNT),
            Err(KernelError::Permission)
        );
    }

    #[test]
    fn test_owner_forwarding_uses_up_count() {
        let mut rec = record();
        assert_eq!(rec.get_property(AttributeId::PROPERTY_OWNER), Err(KernelError::NotInited));
        rec.set_property(AttributeId::PROPERTY_FORWARDCOUNT, 1, 1).unwrap();
        rec.set_property(AttributeId::PROPERTY_OWNER, 2, 2).unwrap();
        assert_eq!(rec.get_property(AttributeId::PROPERTY_OWNER), Ok(2));
        assert_eq!(rec.forward_count, Some(0));
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_OWNER, UNUSED, 2),
            Err(KernelError::Permission)
        );
    }

    #[test]
    fn test_owner_release() {
        let mut rec = record();
        rec.set_property(AttributeId::PROPERTY_OWNER, 3, 3).unwrap();
        rec.set_property(AttributeId::PROPERTY_OWNER, UNUSED, 3).unwrap();
        assert!(!rec.flags.contains(ObjectFlags::OWNED));
        assert!(rec.accessible_by(4));
    }

    #[test]
    fn test_counts_only_decrease() {
        let mut rec = record();
        rec.set_property(AttributeId::PROPERTY_USAGECOUNT, 5, 1).unwrap();
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_USAGECOUNT, 6, 1),
            Err(KernelError::Permission)
        );
        rec.set_property(AttributeId::PROPERTY_USAGECOUNT, 2, 1).unwrap();
        assert_eq!(rec.get_property(AttributeId::PROPERTY_USAGECOUNT), Ok(2));

        rec.set_property(AttributeId::PROPERTY_FORWARDCOUNT, 3, 1).unwrap();
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_FORWARDCOUNT, 4, 1),
            Err(KernelError::Permission)
        );
    }

    #[test]
    fn test_locked_freezes_counts() {
        let mut rec = record();
        rec.set_property(AttributeId::PROPERTY_LOCKED, 1, 1).unwrap();
        assert_eq!(rec.get_property(AttributeId::PROPERTY_LOCKED), Ok(1));
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_USAGECOUNT, 1, 1),
            Err(KernelError::Permission)
        );
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_FORWARDCOUNT, 1, 1),
            Err(KernelError::Permission)
        );
    }

    #[test]
    fn test_status_and_internal() {
        let mut rec = record();
        rec.flags = ObjectFlags::NOTINITED | ObjectFlags::INTERNAL;
        assert_eq!(rec.get_property(AttributeId::IATTRIBUTE_STATUS), Ok(1));
        rec.set_property(AttributeId::IATTRIBUTE_STATUS, 0, 1).unwrap();
        rec.set_property(AttributeId::IATTRIBUTE_INTERNAL, 0, 1).unwrap();
        assert_eq!(rec.flags, ObjectFlags::empty());

        rec.flags.insert(ObjectFlags::SIGNALLED);
        assert_eq!(
            rec.set_property(AttributeId::IATTRIBUTE_STATUS, 0, 1),
            Err(KernelError::Signalled)
        );
    }

    #[test]
    fn test_action_perms_ratchet() {
        let mut rec = record();
        let restricted = ActionPerms::ALL.with(Action::Encrypt, ActionLevel::NoneExternal);
        rec.set_property(AttributeId::IATTRIBUTE_ACTIONPERMS, i32::from(restricted.bits()), 1)
            .unwrap();
        rec.set_property(AttributeId::IATTRIBUTE_ACTIONPERMS, i32::from(ActionPerms::ALL.bits()), 1)
            .unwrap();
        assert_eq!(rec.action_perms.level(Action::Encrypt), ActionLevel::NoneExternal);
    }

    #[test]
    fn test_non_exportable_write_once() {
        let mut rec = record();
        rec.set_property(AttributeId::PROPERTY_NONEXPORTABLE, 1, 1).unwrap();
        assert_eq!(
            rec.set_property(AttributeId::PROPERTY_NONEXPORTABLE, 1, 1),
            Err(KernelError::Permission)
        );
        assert_eq!(rec.get_property(AttributeId::PROPERTY_NONEXPORTABLE), Ok(1));
    }

    #[test]
    fn test_advisory_lock_property() {
        let mut rec = record();
        rec.set_property(AttributeId::IATTRIBUTE_LOCKED, 1, 3).unwrap();
        assert!(rec.locked_by_other(4));
        assert_eq!(
            rec.set_property(AttributeId::IATTRIBUTE_LOCKED, 0, 4),
            Err(KernelError::Permission)
        );
        rec.set_property(AttributeId::IATTRIBUTE_LOCKED, 0, 3).unwrap();
        assert!(!rec.locked_by_other(4));
    }
}
