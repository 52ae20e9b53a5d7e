//! Advisory object locks
//!
//! A lock is held by exactly one thread and may be taken recursively by
//! that thread. While it is held, other threads cannot mutate the object's
//! security state and the object cannot be destroyed.

use super::record::ObjectRecord;
use crate::sync::ThreadToken;
use crate::{KernelError, Result};

impl ObjectRecord {
    /// Take (or re-take) the advisory lock for `thread`
    pub fn lock(&mut self, thread: ThreadToken) -> Result<()> {
        if self.locked_by_other(thread) {
            return Err(KernelError::Permission);
        }
        self.lock_count += 1;
        self.lock_owner = Some(thread);
        Ok(())
    }

    /// Release one level of the advisory lock.
    ///
    /// Only the holder may unlock.
    pub fn unlock(&mut self, thread: ThreadToken) -> Result<()> {
        if self.lock_count == 0 {
            return Err(KernelError::NotInited);
        }
        if self.lock_owner != Some(thread) {
            return Err(KernelError::Permission);
        }
        self.lock_count -= 1;
        if self.lock_count == 0 {
            self.lock_owner = None;
        }
        Ok(())
    }

    /// Release the lock completely, returning the depth that was held
    pub(crate) fn suspend_lock(&mut self, thread: ThreadToken) -> Result<u32> {
        if self.lock_count == 0 || self.lock_owner != Some(thread) {
            return Err(KernelError::Permission);
        }
        let depth = self.lock_count;
        self.lock_count = 0;
        self.lock_owner = None;
        Ok(depth)
    }

    /// Re-take a lock released by [`suspend_lock`](Self::suspend_lock)
    pub(crate) fn resume_lock(&mut self, thread: ThreadToken, depth: u32) -> Result<()> {
        if self.locked_by_other(thread) {
            return Err(KernelError::Permission);
        }
        self.lock_count += depth;
        self.lock_owner = Some(thread);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemoryObject;
    use crate::object_type::{ObjectType, SubType, SubTypeA};

    fn record() -> ObjectRecord {
        ObjectRecord::new(
            ObjectType::Certificate,
            SubType::A(SubTypeA::CERT_CERT),
            MemoryObject::shared(),
        )
    }

    #[test]
    fn test_lock_is_recursive_for_holder() {
        let mut rec = record();
        rec.lock(1).unwrap();
        rec.lock(1).unwrap();
        assert_eq!(rec.lock_count, 2);
        rec.unlock(1).unwrap();
        rec.unlock(1).unwrap();
        assert_eq!(rec.lock_count, 0);
        assert_eq!(rec.lock_owner, None);
    }

    #[test]
    fn test_other_thread_cannot_lock_or_unlock() {
        let mut rec = record();
        rec.lock(1).unwrap();
        assert_eq!(rec.lock(2), Err(KernelError::Permission));
        assert_eq!(rec.unlock(2), Err(KernelError::Permission));
        assert!(rec.locked_by_other(2));
        assert!(!rec.locked_by_other(1));
    }

    #[test]
    fn test_unlock_without_lock() {
        let mut rec = record();
        assert_eq!(rec.unlock(1), Err(KernelError::NotInited));
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut rec = record();
        rec.lock(4).unwrap();
        rec.lock(4).unwrap();
        let depth = rec.suspend_lock(4).unwrap();
        assert_eq!(depth, 2);
        assert!(!rec.locked_by_other(5));

        rec.resume_lock(4, depth).unwrap();
        assert_eq!(rec.lock_count, 2);
        assert!(rec.locked_by_other(5));
    }
}
