//! Bounded priority queue between event handlers and the render worker.
//!
//! Producers enqueue without ever blocking: a full queue drops the new item
//! (counted, logged, never an error). The single consumer blocks in
//! `dequeue` until an item arrives or the queue is closed. Ordering is by
//! priority descending with arrival order breaking ties — a plain max-heap
//! is not stable, so each item carries a monotonic sequence number.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Condvar, Mutex};

/// One pending line of commentary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryItem {
    pub text: String,
    pub priority: u8,
    pub sequence: u64,
}

impl Ord for CommentaryItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then lower sequence (FIFO).
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for CommentaryItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    heap: BinaryHeap<CommentaryItem>,
    next_sequence: u64,
    dropped: u64,
    closed: bool,
}

/// Bounded, closable priority queue.
#[derive(Debug)]
pub struct DispatchQueue {
    inner: Mutex<QueueInner>,
    available: Condvar,
    capacity: usize,
}

impl DispatchQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner::default()),
            available: Condvar::new(),
            capacity,
        }
    }

    /// Enqueues a line. Returns false when the item was not accepted
    /// (queue full or closed); the caller never blocks either way.
    pub fn enqueue(&self, text: String, priority: u8) -> bool {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if inner.closed {
            return false;
        }
        if inner.heap.len() >= self.capacity {
            inner.dropped += 1;
            tracing::debug!(dropped = inner.dropped, "commentary queue full, dropping line");
            return false;
        }
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.heap.push(CommentaryItem {
            text,
            priority,
            sequence,
        });
        self.available.notify_one();
        true
    }

    /// Blocks until an item is available or the queue is closed and drained.
    ///
    /// After `close`, remaining items are still handed out in priority
    /// order; `None` means the worker should exit.
    pub fn dequeue(&self) -> Option<CommentaryItem> {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            if let Some(item) = inner.heap.pop() {
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            inner = match self.available.wait(inner) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    /// Stops intake and wakes the consumer. Idempotent.
    pub fn close(&self) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        match self.inner.lock() {
            Ok(guard) => guard.closed,
            Err(poisoned) => poisoned.into_inner().closed,
        }
    }

    /// Number of items currently pending.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.heap.len(),
            Err(poisoned) => poisoned.into_inner().heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        match self.inner.lock() {
            Ok(guard) => guard.dropped,
            Err(poisoned) => poisoned.into_inner().dropped,
        }
    }
}
