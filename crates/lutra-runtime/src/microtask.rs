//! Microtask queue for deferred promise callbacks
//!
//! ## Ordering Guarantees
//!
//! - FIFO: first queued, first executed
//! - `drain` runs until the queue is empty; tasks enqueued during the drain
//!   are also executed

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Microtask callback type
pub type Microtask = Box<dyn FnOnce() + Send>;

/// Shared sequencer for microtask ordering across queues
#[derive(Clone, Default)]
pub struct MicrotaskSequencer {
    counter: Arc<AtomicU64>,
}

impl MicrotaskSequencer {
    /// Create a new sequencer starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next sequence number
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

/// Queue of microtasks
pub struct MicrotaskQueue {
    queue: Mutex<VecDeque<(u64, Microtask)>>,
    len: AtomicUsize,
    sequencer: MicrotaskSequencer,
}

impl MicrotaskQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::with_sequencer(MicrotaskSequencer::new())
    }

    /// Create new queue with a shared sequencer
    pub fn with_sequencer(sequencer: MicrotaskSequencer) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            len: AtomicUsize::new(0),
            sequencer,
        }
    }

    /// Add a microtask to the queue
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let seq = self.sequencer.next();
        self.queue.lock().push_back((seq, Box::new(task)));
        self.len.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the next microtask
    pub fn dequeue(&self) -> Option<Microtask> {
        let task = self.queue.lock().pop_front().map(|(_, task)| task);
        if task.is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        task
    }

    /// Run queued microtasks in FIFO order until the queue is empty,
    /// including tasks enqueued while draining. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.dequeue() {
            task();
            ran += 1;
        }
        ran
    }

    /// Number of pending microtasks
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.len.load(Ordering::Relaxed) == 0
    }

    /// Clear all pending microtasks without running them
    pub fn clear(&self) {
        let mut queue = self.queue.lock();
        let len = queue.len();
        queue.clear();
        self.len.fetch_sub(len, Ordering::Relaxed);
    }
}

impl Default for MicrotaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
