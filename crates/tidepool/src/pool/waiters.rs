//! FIFO queue of callers waiting for a connection
//!
//! Tickets are kept in arrival order in a `VecDeque`, senders in a map keyed
//! by ticket. Cancelling removes the map entry only; `dequeue` skips tickets
//! whose entry is gone, and the order deque is compacted once stale tickets
//! outnumber live ones, so every operation is amortized O(1).

use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

/// Identifies one queued waiter
pub(crate) type WaiterId = u64;

/// Stale tickets tolerated before a compaction pass is considered
const COMPACT_SLACK: usize = 32;

pub(crate) struct WaiterQueue<T> {
    order: VecDeque<WaiterId>,
    pending: HashMap<WaiterId, oneshot::Sender<T>>,
    next_id: WaiterId,
}

impl<T> WaiterQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            order: VecDeque::new(),
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    /// Queue a waiter behind everyone already waiting
    pub(crate) fn enqueue(&mut self, sender: oneshot::Sender<T>) -> WaiterId {
        let id = self.next_id;
        self.next_id += 1;
        self.order.push_back(id);
        self.pending.insert(id, sender);
        id
    }

    /// Pop the earliest waiter still queued
    pub(crate) fn dequeue(&mut self) -> Option<oneshot::Sender<T>> {
        while let Some(id) = self.order.pop_front() {
            if let Some(sender) = self.pending.remove(&id) {
                return Some(sender);
            }
        }
        None
    }

    /// Drop a waiter that timed out or was cancelled.
    ///
    /// Returns false if the waiter was already dequeued.
    pub(crate) fn remove(&mut self, id: WaiterId) -> bool {
        let removed = self.pending.remove(&id).is_some();
        if removed {
            self.compact();
        }
        removed
    }

    /// Hand `value` to the earliest waiter that is still listening.
    ///
    /// Gives the value back if nobody took it.
    pub(crate) fn offer(&mut self, mut value: T) -> Result<(), T> {
        while let Some(sender) = self.dequeue() {
            match sender.send(value) {
                Ok(()) => return Ok(()),
                Err(returned) => value = returned,
            }
        }
        Err(value)
    }

    /// Remove every waiter, earliest first
    pub(crate) fn drain(&mut self) -> Vec<oneshot::Sender<T>> {
        let mut senders = Vec::with_capacity(self.pending.len());
        while let Some(sender) = self.dequeue() {
            senders.push(sender);
        }
        self.order.clear();
        senders
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    fn compact(&mut self) {
        if self.order.len() > COMPACT_SLACK && self.order.len() > 2 * self.pending.len() {
            let pending = &self.pending;
            self.order.retain(|id| pending.contains_key(id));
        }
    }
}
