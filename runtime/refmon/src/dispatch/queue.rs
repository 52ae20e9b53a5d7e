//! Deferred message queue
//!
//! A handler that sends a message back to an object its own thread is
//! already dispatching to can't be served on the spot: the object's
//! handler is in use further up the stack. Such messages are parked here
//! and run once the outer dispatch to that object has finished.

use std::collections::VecDeque;

use super::message::Message;
use crate::objects::ObjectHandle;
use crate::{KernelError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    /// Object whose dispatch the message waits for
    pub target: ObjectHandle,
    /// Object the sender addressed
    pub sent_to: ObjectHandle,
    pub message: Message,
    pub internal: bool,
}

/// Fixed-depth FIFO of deferred messages
#[derive(Debug)]
pub struct MessageQueue {
    entries: VecDeque<QueuedMessage>,
    capacity: usize,
}

impl MessageQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enqueue(&mut self, entry: QueuedMessage) -> Result<()> {
        if self.entries.len() >= self.capacity {
            log::warn!(
                "message queue full, dropping {:?} for {:?}",
                entry.message.kind,
                entry.target
            );
            return Err(KernelError::Overflow);
        }
        log::trace!("queued {:?} for {:?}", entry.message.kind, entry.target);
        self.entries.push_back(entry);
        Ok(())
    }

    /// Remove and return every message waiting for `target`, oldest first
    pub fn take_for(&mut self, target: ObjectHandle) -> Vec<QueuedMessage> {
        let mut taken = Vec::new();
        let mut kept = VecDeque::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.target == target {
                taken.push(entry);
            } else {
                kept.push_back(entry);
            }
        }
        self.entries = kept;
        taken
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
