//! Object table and object lifecycle
//!
//! Every object the kernel manages lives in one [`ObjectTable`] slot and is
//! addressed by a generation-checked [`ObjectHandle`]. The record holds
//! the kernel's view of the object (type, state, counters, dependencies);
//! the object's own state sits behind its handler.
//!
//! ```text
//!   NOTINITED ──status OK──▶ low ──trigger──▶ high
//!        │                    │                │
//!        └────────────────────┴── SIGNALLED ◀──┘ ──▶ removed
//! ```

mod dependency;
mod handle;
mod lock;
mod perms;
mod property;
mod record;
mod table;

pub use dependency::{find_target, find_target_type};
pub use handle::{ObjectHandle, SYSTEM_OBJECT_COUNT};
pub use perms::{Action, ActionLevel, ActionPerms};
pub use property::{is_kernel_property, KERNEL_PROPERTIES};
pub use record::{ObjectFlags, ObjectRecord};
pub use table::ObjectTable;
