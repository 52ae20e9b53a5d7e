//! refmon: Security Kernel Reference Monitor
//!
//! A reference monitor mediates every operation on a set of security
//! objects (encryption contexts, certificates, keysets, envelopes,
//! sessions, devices and users). Callers never touch an object directly:
//! they send the kernel a message addressed to an opaque handle, and the
//! kernel decides, from static ACL tables and the object's current state,
//! whether the object's handler gets to see it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      Caller (external messages)         │
//! └──────────────┬──────────────────────────┘
//!                │ send(handle, message)
//! ┌──────────────▼──────────────────────────┐
//! │     Kernel (this crate)                 │
//! │  • Init/shutdown gate                   │
//! │  • Routing to the target object         │
//! │  • Attribute / action / keyset ACLs     │
//! │  • Post-dispatch state changes          │
//! └──────────────┬──────────────────────────┘
//!                │ ObjectHandler::handle
//! ┌──────────────▼──────────────────────────┐
//! │      Object backends                    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - **Object Table**: Generation-checked handles, reference counts and advisory locks
//! - **Attribute ACLs**: Per-attribute access, type and range checks in const tables
//! - **Message Dispatch**: Table-driven pre/post hooks, same-object re-entry queued
//! - **Keyset and Mechanism ACLs**: Key management and crypto mechanism parameter checks
//! - **Synchronisation**: Named kernel mutexes and one-shot semaphores
//! - **Self-Test**: Message-level check of the whole monitor at init
//!
//! # Usage
//!
//! ```rust,no_run
//! use refmon::{AttributeId, CreateArgs, Kernel, KernelConfig, Message, MessageData, MessageType, ObjectHandle, ObjectType};
//!
//! # fn main() -> refmon::Result<()> {
//! // Bring up the kernel (runs the self-test)
//! let kernel = Kernel::start(KernelConfig::default())?;
//!
//! // Create a DES context through the system device
//! let args = CreateArgs { arg1: refmon::algo::ALGO_DES, ..CreateArgs::default() };
//! let create = Message::new(MessageType::DevCreateObject, ObjectType::Context as i32, MessageData::Create(args));
//! let context = kernel.send(ObjectHandle::SYSTEM_DEVICE, create)?.as_handle().unwrap_or(ObjectHandle::SYSTEM_DEVICE);
//!
//! // Attribute writes are range-checked before the object sees them
//! kernel.send(context, Message::set_attribute(AttributeId::CTXINFO_MODE, 2))?;
//!
//! kernel.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod acl;
pub mod algo;
pub mod attr_id;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod kernel;
pub mod limits;
pub mod object_type;
pub mod objects;
pub mod sync;

pub use attr_id::AttributeId;
pub use config::KernelConfig;
pub use dispatch::{
    CertMgmtInfo, CreateArgs, KeyMgmtInfo, MechanismInfo, MechanismParam, MemoryObject, MemoryObjectFactory, Message,
    MessageData, MessageType, ObjectFactory, ObjectHandler, SharedHandler,
};
pub use error::{KernelError, Result};
pub use kernel::{CreateFlags, CreateObjectInfo, InitLevel, Kernel, ObjectGuard, ShutdownLevel, SystemDevice};
pub use object_type::{ObjectType, SubType, SubTypeA, SubTypeB, SubTypeC, SubTypeSet};
pub use objects::{Action, ActionLevel, ActionPerms, ObjectFlags, ObjectHandle};
pub use sync::{current_thread, KernelMutex, SemaphoreId, SemaphoreState, ThreadToken};
