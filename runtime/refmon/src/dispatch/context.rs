//! Per-message dispatch state shared by the hooks

use super::message::Message;
use crate::objects::{ObjectHandle, ObjectRecord};
use crate::sync::ThreadToken;

/// Work left over once a message has been handled.
///
/// Run after the kernel lock has been released, since each of these
/// dispatches messages of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Internal message whose failure is only logged
    Notify(ObjectHandle, Message),
    /// Destroy an object whose last reference went away
    Destroy(ObjectHandle),
    /// Restrict a context to what its certificate's key usage allows
    UpdateKeyUsagePerms {
        context: ObjectHandle,
        certificate: ObjectHandle,
    },
}

#[derive(Debug)]
pub struct DispatchContext {
    /// Object the sender addressed
    pub sent_to: ObjectHandle,
    /// Object the message was routed to
    pub target: ObjectHandle,
    pub internal: bool,
    pub thread: ThreadToken,
    pub follow_ups: Vec<FollowUp>,
    /// Dependent object the message is passed on to after this one
    pub forward: Option<ObjectHandle>,
    pub zeroise: bool,
    /// Record taken out of the table by a destroy, dropped once unlocked
    pub removed: Option<ObjectRecord>,
}

impl DispatchContext {
    pub fn new(sent_to: ObjectHandle, target: ObjectHandle, internal: bool, thread: ThreadToken) -> Self {
        Self {
            sent_to,
            target,
            internal,
            thread,
            follow_ups: Vec::new(),
            forward: None,
            zeroise: false,
            removed: None,
        }
    }
}
