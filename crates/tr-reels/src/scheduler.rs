//! Single-threaded timer queue and clocks
//!
//! Timers fire in due-time order; timers due at the same instant fire in
//! the order they were scheduled. Nothing here spawns threads.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// A pending timer
#[derive(Debug, Clone)]
pub struct Timer<T> {
    pub due_ms: u64,
    seq: u64,
    pub payload: T,
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    // Reversed so the max-heap pops the earliest timer
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of timers keyed by (due time, insertion order)
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Timer<T>>,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` at absolute time `due_ms`
    pub fn schedule(&mut self, due_ms: u64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Timer {
            due_ms,
            seq,
            payload,
        });
    }

    /// Remove and return the earliest timer
    pub fn pop(&mut self) -> Option<Timer<T>> {
        self.heap.pop()
    }

    /// Due time of the earliest timer
    pub fn next_due_ms(&self) -> Option<u64> {
        self.heap.peek().map(|t| t.due_ms)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of "now" for a running spin, relative to spin start
pub trait Clock {
    /// Mark spin start (time zero)
    fn restart(&mut self);

    /// Milliseconds since the last restart
    fn now_ms(&self) -> u64;

    /// Block until `due_ms` has been reached
    fn wait_until(&mut self, due_ms: u64);
}

/// Clock that jumps straight to each due time
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualClock {
    now_ms: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for VirtualClock {
    fn restart(&mut self) {
        self.now_ms = 0;
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn wait_until(&mut self, due_ms: u64) {
        self.now_ms = self.now_ms.max(due_ms);
    }
}

/// Clock backed by the monotonic system clock; waiting sleeps the thread
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn restart(&mut self) {
        self.started = Instant::now();
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn wait_until(&mut self, due_ms: u64) {
        let now = self.now_ms();
        if due_ms > now {
            std::thread::sleep(Duration::from_millis(due_ms - now));
        }
    }
}
