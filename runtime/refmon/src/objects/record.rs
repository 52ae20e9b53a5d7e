//! Object table records

use bitflags::bitflags;

use super::handle::ObjectHandle;
use super::perms::ActionPerms;
use crate::dispatch::SharedHandler;
use crate::object_type::{ObjectType, SubType};
use crate::sync::ThreadToken;

bitflags! {
    /// Kernel-maintained object state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u16 {
        /// Only reachable through internal messages
        const INTERNAL = 1 << 0;
        /// Still being created; cleared when the creator reports success
        const NOTINITED = 1 << 1;
        /// In the high (keyed/active) state
        const HIGH = 1 << 2;
        /// Marked for destruction
        const SIGNALLED = 1 << 3;
        /// Bound to a single thread
        const OWNED = 1 << 4;
        /// Security properties frozen
        const ATTRLOCKED = 1 << 5;
        /// Backend asked for locked/secure storage
        const SECUREMALLOC = 1 << 6;
        /// Key material must never leave the object
        const NONEXPORTABLE = 1 << 7;

        /// Flags that make an object unusable for ordinary messages
        const STATUS_MASK = Self::NOTINITED.bits() | Self::SIGNALLED.bits();
    }
}

/// Kernel bookkeeping for one live object
pub struct ObjectRecord {
    pub object_type: ObjectType,
    pub subtype: SubType,
    pub flags: ObjectFlags,
    pub action_perms: ActionPerms,

    /// References beyond the first; destruction needs this at zero
    pub ref_count: u32,

    /// Advisory lock depth and its holder
    pub lock_count: u32,
    pub lock_owner: Option<ThreadToken>,

    /// Unique across the kernel's lifetime, never reused
    pub unique_id: u64,

    /// Remaining ownership transfers, `None` for unlimited
    pub forward_count: Option<u32>,

    /// Remaining actions, `None` for unlimited
    pub usage_count: Option<u32>,

    /// Thread the object is bound to when `OWNED` is set
    pub owner_thread: Option<ThreadToken>,

    /// Owning user object
    pub owner: Option<ObjectHandle>,

    pub dependent_object: Option<ObjectHandle>,
    pub dependent_device: Option<ObjectHandle>,

    /// Thread currently dispatching to the object
    pub busy: Option<ThreadToken>,

    pub handler: SharedHandler,
}

impl ObjectRecord {
    /// A fresh record: internal, not yet initialised, every action allowed
    pub fn new(object_type: ObjectType, subtype: SubType, handler: SharedHandler) -> Self {
        Self {
            object_type,
            subtype,
            flags: ObjectFlags::INTERNAL | ObjectFlags::NOTINITED,
            action_perms: ActionPerms::ALL,
            ref_count: 0,
            lock_count: 0,
            lock_owner: None,
            unique_id: 0,
            forward_count: None,
            usage_count: None,
            owner_thread: None,
            owner: None,
            dependent_object: None,
            dependent_device: None,
            busy: None,
            handler,
        }
    }

    #[inline]
    pub fn is_internal(&self) -> bool {
        self.flags.contains(ObjectFlags::INTERNAL)
    }

    #[inline]
    pub fn is_high(&self) -> bool {
        self.flags.contains(ObjectFlags::HIGH)
    }

    /// Not yet initialised, or signalled for destruction
    #[inline]
    pub fn in_invalid_state(&self) -> bool {
        self.flags.intersects(ObjectFlags::STATUS_MASK)
    }

    /// Status a message to an invalid-state object gets back
    pub fn invalid_state_error(&self) -> crate::KernelError {
        if self.flags.contains(ObjectFlags::SIGNALLED) {
            crate::KernelError::Signalled
        } else {
            crate::KernelError::NotInited
        }
    }

    /// True if `thread` may send external messages to the object
    pub fn accessible_by(&self, thread: ThreadToken) -> bool {
        !self.flags.contains(ObjectFlags::OWNED) || self.owner_thread == Some(thread)
    }

    /// True if some thread other than `thread` holds the advisory lock
    pub fn locked_by_other(&self, thread: ThreadToken) -> bool {
        self.lock_count > 0 && self.lock_owner != Some(thread)
    }

    /// True if some thread other than `thread` is dispatching to the object
    pub fn busy_with_other(&self, thread: ThreadToken) -> bool {
        matches!(self.busy, Some(owner) if owner != thread)
    }

    /// True if the usage count has run out
    pub fn usage_exhausted(&self) -> bool {
        self.usage_count == Some(0)
    }
}

impl core::fmt::Debug for ObjectRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectRecord")
            .field("object_type", &self.object_type)
            .field("subtype", &self.subtype)
            .field("flags", &self.flags)
            .field("ref_count", &self.ref_count)
            .field("lock_count", &self.lock_count)
            .field("unique_id", &self.unique_id)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}
