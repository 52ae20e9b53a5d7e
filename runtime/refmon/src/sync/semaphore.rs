use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU8, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::{KernelError, Result};

/// Named kernel semaphores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemaphoreId {
    /// Asynchronous driver binding at startup
    DriverBind,
}

impl SemaphoreId {
    pub const COUNT: usize = 1;
    pub const ALL: [SemaphoreId; Self::COUNT] = [SemaphoreId::DriverBind];

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SemaphoreState {
    Uninited = 0,
    /// Clear, and will stay clear
    Clear = 1,
    /// Clear requested, waiters still inside
    PreClear = 2,
    Set = 3,
}

impl SemaphoreState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SemaphoreState::Clear,
            2 => SemaphoreState::PreClear,
            3 => SemaphoreState::Set,
            _ => SemaphoreState::Uninited,
        }
    }
}

struct Semaphore {
    state: AtomicU8,
    waiters: AtomicU32,
    /// Raw handle of the object or activity the semaphore tracks
    object: AtomicI64,
}

impl Semaphore {
    const fn new() -> Self {
        Self {
            state: AtomicU8::new(SemaphoreState::Uninited as u8),
            waiters: AtomicU32::new(0),
            object: AtomicI64::new(-1),
        }
    }

    fn state(&self) -> SemaphoreState {
        SemaphoreState::from_raw(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: SemaphoreState, to: SemaphoreState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Semaphore table with its own lock, independent of the object table
pub struct SemaphoreTable {
    slots: [Semaphore; SemaphoreId::COUNT],
    lock: Mutex<()>,
    released: Condvar,
}

impl SemaphoreTable {
    pub fn new() -> Self {
        Self {
            slots: [Semaphore::new()],
            lock: Mutex::new(()),
            released: Condvar::new(),
        }
    }

    pub fn state(&self, id: SemaphoreId) -> SemaphoreState {
        self.slots[id.index()].state()
    }

    pub fn waiters(&self, id: SemaphoreId) -> u32 {
        self.slots[id.index()].waiters.load(Ordering::Acquire)
    }

    /// Raw id of the object the semaphore was set for, if any
    pub fn object(&self, id: SemaphoreId) -> Option<i64> {
        let raw = self.slots[id.index()].object.load(Ordering::Acquire);
        (raw >= 0).then_some(raw)
    }

    /// Arm a semaphore. Only an uninited semaphore can be set.
    pub fn set(&self, id: SemaphoreId, object: i64) -> Result<()> {
        let sem = &self.slots[id.index()];
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        if !sem.transition(SemaphoreState::Uninited, SemaphoreState::Set) {
            return Err(KernelError::Inited);
        }
        sem.object.store(object, Ordering::Release);
        log::debug!("semaphore {id:?} set for object {object}");
        Ok(())
    }

    /// Release a semaphore.
    ///
    /// With waiters still blocked the semaphore goes to PreClear and the
    /// last waiter out completes the transition to Clear.
    pub fn clear(&self, id: SemaphoreId) {
        let sem = &self.slots[id.index()];
        let guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        if sem.transition(SemaphoreState::Set, SemaphoreState::PreClear)
            && sem.waiters.load(Ordering::Acquire) == 0
        {
            sem.transition(SemaphoreState::PreClear, SemaphoreState::Clear);
        }
        drop(guard);
        self.released.notify_all();
        log::debug!("semaphore {id:?} cleared");
    }

    /// Block until the semaphore is released.
    ///
    /// Returns `Ok(true)` if the caller actually waited, `Ok(false)` if the
    /// semaphore was not set, and `Timeout` if `timeout` elapsed first.
    pub fn wait(&self, id: SemaphoreId, timeout: Duration) -> Result<bool> {
        let sem = &self.slots[id.index()];
        let guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        if sem.state() != SemaphoreState::Set {
            return Ok(false);
        }
        sem.waiters.fetch_add(1, Ordering::AcqRel);

        let (guard, result) = self
            .released
            .wait_timeout_while(guard, timeout, |_| sem.state() == SemaphoreState::Set)
            .unwrap_or_else(|p| p.into_inner());

        let remaining = sem.waiters.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining == 0 {
            sem.transition(SemaphoreState::PreClear, SemaphoreState::Clear);
        }
        drop(guard);

        if result.timed_out() {
            log::warn!("wait on semaphore {id:?} timed out");
            return Err(KernelError::Timeout);
        }
        Ok(true)
    }

    /// Force every semaphore to Clear, waking all waiters (shutdown)
    pub fn release_all(&self) {
        let guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        for sem in &self.slots {
            if !sem.transition(SemaphoreState::Set, SemaphoreState::PreClear)
                && sem.state() != SemaphoreState::PreClear
            {
                continue;
            }
            if sem.waiters.load(Ordering::Acquire) == 0 {
                sem.transition(SemaphoreState::PreClear, SemaphoreState::Clear);
            }
        }
        drop(guard);
        self.released.notify_all();
    }

    /// Return all semaphores to Uninited for a fresh init cycle.
    ///
    /// Only valid when nobody is waiting.
    pub fn reset(&self) {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        for sem in &self.slots {
            if sem.waiters.load(Ordering::Acquire) == 0 {
                sem.state
                    .store(SemaphoreState::Uninited as u8, Ordering::Release);
                sem.object.store(-1, Ordering::Release);
            }
        }
    }
}

impl Default for SemaphoreTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn test_wait_on_unset_returns_immediately() {
        let table = SemaphoreTable::new();
        assert_eq!(table.wait(SemaphoreId::DriverBind, SHORT), Ok(false));
    }

    #[test]
    fn test_set_is_one_shot() {
        let table = SemaphoreTable::new();
        table.set(SemaphoreId::DriverBind, 7).unwrap();
        assert_eq!(table.object(SemaphoreId::DriverBind), Some(7));
        assert_eq!(
            table.set(SemaphoreId::DriverBind, 8),
            Err(KernelError::Inited)
        );

        table.clear(SemaphoreId::DriverBind);
        assert_eq!(table.state(SemaphoreId::DriverBind), SemaphoreState::Clear);

        // Never re-armed
        assert_eq!(
            table.set(SemaphoreId::DriverBind, 9),
            Err(KernelError::Inited)
        );
        assert_eq!(table.wait(SemaphoreId::DriverBind, SHORT), Ok(false));
    }

    #[test]
    fn test_wait_times_out() {
        let table = SemaphoreTable::new();
        table.set(SemaphoreId::DriverBind, 1).unwrap();
        assert_eq!(
            table.wait(SemaphoreId::DriverBind, SHORT),
            Err(KernelError::Timeout)
        );
        assert_eq!(table.waiters(SemaphoreId::DriverBind), 0);
        assert_eq!(table.state(SemaphoreId::DriverBind), SemaphoreState::Set);
    }

    #[test]
    fn test_reset_rearms_for_new_cycle() {
        let table = SemaphoreTable::new();
        table.set(SemaphoreId::DriverBind, 1).unwrap();
        table.release_all();
        assert_eq!(table.state(SemaphoreId::DriverBind), SemaphoreState::Clear);
        table.reset();
        assert_eq!(
            table.state(SemaphoreId::DriverBind),
            SemaphoreState::Uninited
        );
    }
}
