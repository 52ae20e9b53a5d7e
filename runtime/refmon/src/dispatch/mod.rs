//! Message dispatch
//!
//! A message travels through a fixed pipeline:
//!
//! ```text
//!   send ──▶ gate ──▶ route ──▶ pre-dispatch ──▶ handler ──▶ post-dispatch
//!                                    │                            │
//!                                    └── reject, nothing changed  └── follow-ups
//! ```
//!
//! What happens at each step is driven by the [`HANDLING_TABLE`]. The
//! pipeline itself lives on [`Kernel`](crate::Kernel); this module holds
//! the message types, the table, the hooks and the deferred queue.

mod handler;
mod message;
mod queue;
mod table;

pub(crate) mod context;
pub(crate) mod post;
pub(crate) mod pre;

pub use handler::{MemoryObject, MemoryObjectFactory, ObjectFactory, ObjectHandler, SharedHandler};
pub use message::{
    CertMgmtInfo, CreateArgs, KeyMgmtInfo, MechanismInfo, MechanismParam, Message, MessageData, MessageType,
};
pub use queue::{MessageQueue, QueuedMessage};
pub use table::{check_table, entry, HandlingEntry, KernelHandler, ParamShape, PostHook, PreHook, Routing, HANDLING_TABLE};
