//! Pending value changes and the scheduler that enqueues them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use circa_core::{ComponentId, Location, SimTime, StateId, Value};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A driver asserting `value` at `location` of `state` at `time`.
#[derive(Clone, Debug)]
pub(crate) struct Event {
    pub time: SimTime,
    pub serial: u64,
    pub state: StateId,
    pub location: Location,
    pub driver: ComponentId,
    pub value: Value,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.serial == other.serial
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the earliest (time, serial) first.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.time, other.serial).cmp(&(self.time, self.serial))
    }
}

// ── EventQueue ─────────────────────────────────────────────────────

/// Min-queue of events ordered by time, then by insertion.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Event>,
    next_serial: u64,
}

impl EventQueue {
    pub fn push(
        &mut self,
        time: SimTime,
        state: StateId,
        location: Location,
        driver: ComponentId,
        value: Value,
    ) {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.heap.push(Event {
            time,
            serial,
            state,
            location,
            driver,
            value,
        });
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|e| e.time)
    }

    /// Remove every event scheduled at `time`, in FIFO order.
    pub fn pop_batch(&mut self, time: SimTime) -> Vec<Event> {
        let mut batch = Vec::new();
        while self.heap.peek().is_some_and(|e| e.time == time) {
            if let Some(e) = self.heap.pop() {
                batch.push(e);
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

// ── Scheduler ──────────────────────────────────────────────────────

/// The queue plus the clock and jitter source used to time new events.
#[derive(Debug)]
pub(crate) struct Scheduler {
    pub queue: EventQueue,
    pub now: SimTime,
    random_shift: u32,
    rng: ChaCha8Rng,
}

impl Scheduler {
    pub fn new(random_shift: u32, seed: u64) -> Self {
        Self {
            queue: EventQueue::default(),
            now: SimTime(0),
            random_shift,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Enqueue `value` at `now + max(1, delay)`, jittered when enabled.
    /// Subcircuit port transfers pass `noisy = false`.
    pub fn schedule(
        &mut self,
        state: StateId,
        location: Location,
        driver: ComponentId,
        value: Value,
        delay: u32,
        noisy: bool,
    ) {
        let mut delay = u64::from(delay.max(1));
        if self.random_shift > 0 {
            delay <<= self.random_shift;
            if noisy {
                delay += u64::from(self.rng.next_u32()) & ((1 << self.random_shift) - 1);
            }
        }
        self.queue
            .push(self.now.after(delay), state, location, driver, value);
    }

    /// Empty the queue and rewind time. The jitter stream continues.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.now = SimTime(0);
    }
}
