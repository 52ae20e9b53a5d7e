use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{KernelError, Result};

/// Named kernel mutexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelMutex {
    /// Session scoreboard shared between server sessions
    Scoreboard,
    /// Network socket pool
    SocketPool,
    /// Randomness pool
    Random,
}

impl KernelMutex {
    pub const COUNT: usize = 3;

    const fn index(self) -> usize {
        self as usize
    }
}

/// The fixed set of kernel mutexes
pub struct MutexSet {
    mutexes: [Mutex<()>; KernelMutex::COUNT],
    invalid: AtomicBool,
}

impl MutexSet {
    pub fn new() -> Self {
        Self {
            mutexes: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
            invalid: AtomicBool::new(false),
        }
    }

    /// Acquire a mutex, blocking until it is free.
    ///
    /// A poisoned mutex is recovered: the protected value is `()` so there
    /// is no state to be left inconsistent.
    pub fn enter(&self, mutex: KernelMutex) -> Result<MutexGuard<'_, ()>> {
        if self.invalid.load(Ordering::Acquire) {
            return Err(KernelError::Permission);
        }
        let guard = self.mutexes[mutex.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Shutdown may have started while we were blocked
        if self.invalid.load(Ordering::Acquire) {
            return Err(KernelError::Permission);
        }
        Ok(guard)
    }

    /// Mark the set unusable (shutdown phase MutexesInvalid)
    pub fn invalidate(&self) {
        self.invalid.store(true, Ordering::Release);
    }

    /// Make the set usable again for a new init cycle
    pub fn reset(&self) {
        self.invalid.store(false, Ordering::Release);
    }

    pub fn is_valid(&self) -> bool {
        !self.invalid.load(Ordering::Acquire)
    }
}

impl Default for MutexSet {
    fn default() -> Self {
        Self::new()
    }
}
