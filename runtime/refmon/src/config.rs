//! Kernel configuration
//!
//! Sizing and timing parameters for a [`Kernel`](crate::Kernel) instance.
//! Hosts typically embed this in their own configuration file, hence the
//! serde derives.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{KernelError, Result};

/// Default number of object table slots allocated at init
pub const DEFAULT_TABLE_SIZE: usize = 1024;

/// Default upper bound on object table growth
pub const DEFAULT_MAX_OBJECTS: usize = 16384;

/// Default depth of the per-kernel message queue
pub const DEFAULT_QUEUE_SIZE: usize = 16;

/// Smallest table the handle LFSR has a polynomial for
pub const MIN_TABLE_SIZE: usize = 256;

/// Largest table the handle LFSR has a polynomial for
pub const MAX_TABLE_SIZE: usize = 1 << 22;

/// Upper bound on bounded-loop iterations over kernel tables
pub const FAILSAFE_ITERATIONS_LARGE: usize = 1000;

/// Upper bound on bounded-loop iterations over short lists
pub const FAILSAFE_ITERATIONS_SMALL: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Initial object table size (power of two)
    pub initial_table_size: usize,

    /// Maximum object table size (power of two, >= initial size)
    pub max_objects: usize,

    /// Message queue depth
    pub message_queue_size: usize,

    /// Bound on any blocking wait (semaphores, busy objects)
    pub wait_timeout: Duration,

    /// Run the message-level kernel self-test at the end of init
    pub run_self_test: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            initial_table_size: DEFAULT_TABLE_SIZE,
            max_objects: DEFAULT_MAX_OBJECTS,
            message_queue_size: DEFAULT_QUEUE_SIZE,
            wait_timeout: Duration::from_secs(30),
            run_self_test: true,
        }
    }
}

impl KernelConfig {
    /// Check that all settings are usable
    pub fn validate(&self) -> Result<()> {
        let size_ok = |n: usize| n.is_power_of_two() && (MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&n);

        if !size_ok(self.initial_table_size) {
            return Err(KernelError::ArgNum1);
        }
        if !size_ok(self.max_objects) || self.max_objects < self.initial_table_size {
            return Err(KernelError::ArgNum1);
        }
        // The queue must hold at least a message and the one it spawns
        if !(2..=256).contains(&self.message_queue_size) {
            return Err(KernelError::ArgNum1);
        }
        if self.wait_timeout.is_zero() {
            return Err(KernelError::ArgNum1);
        }
        Ok(())
    }

    /// Configuration suited to unit tests: small table, short waits
    pub fn for_testing() -> Self {
        Self {
            initial_table_size: MIN_TABLE_SIZE,
            max_objects: 4096,
            wait_timeout: Duration::from_millis(500),
            ..Self::default()
        }
    }
}
