//! Kernel synchronisation primitives
//!
//! ## Mutexes
//!
//! A small fixed set of named mutexes used by backends for shared
//! resources that live outside any one object. Once shutdown reaches the
//! mutexes-invalid phase every enter fails with `Permission` and no
//! blocking takes place.
//!
//! ## Semaphores
//!
//! One-shot semaphores that block callers until an asynchronous activity
//! (typically driver binding at startup) has completed. A semaphore moves
//! Uninited -> Set -> PreClear -> Clear and is never re-armed.
//!
//! ## Thread identity
//!
//! Object ownership and advisory locks record the calling thread as a
//! [`ThreadToken`].

mod mutex;
mod semaphore;
mod thread;

pub use mutex::{KernelMutex, MutexSet};
pub use semaphore::{SemaphoreId, SemaphoreState, SemaphoreTable};
pub use thread::{current_thread, ThreadToken};
