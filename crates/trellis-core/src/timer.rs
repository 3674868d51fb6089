//! Timer system for Trellis.
//!
//! Provides one-shot and repeating timers against a virtual clock. Nothing
//! here reads the wall clock: the host advances time explicitly, which keeps
//! hover delays and similar behavior deterministic under test.
//!
//! Timers fire in deadline order; timers sharing a deadline fire in the order
//! they were started.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the specified duration.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should next fire.
    next_fire: Duration,
    /// The interval for repeating timers.
    interval: Duration,
    /// The kind of timer.
    kind: TimerKind,
}

/// An entry in the timer queue (min-heap by fire time, then sequence).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Duration,
    sequence: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.sequence == other.sequence
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Manages timers against a virtual clock.
#[derive(Debug)]
pub struct TimerManager {
    /// All registered timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires.
    queue: BinaryHeap<TimerQueueEntry>,
    /// Current virtual time since the manager was created.
    now: Duration,
    /// Monotonic counter breaking ties between equal deadlines.
    sequence: u64,
}

impl TimerManager {
    /// Create a new timer manager with the clock at zero.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            now: Duration::ZERO,
            sequence: 0,
        }
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, id: TimerId, fire_time: Duration) {
        self.sequence += 1;
        self.queue.push(TimerQueueEntry {
            id,
            fire_time,
            sequence: self.sequence,
        });
    }

    fn start(&mut self, interval: Duration, kind: TimerKind) -> TimerId {
        let next_fire = self.now + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
        });
        self.schedule(id, next_fire);
        tracing::trace!(target: targets::TIMER, ?id, ?kind, ?interval, "timer started");
        id
    }

    /// Start a one-shot timer that fires after the specified duration.
    pub fn start_one_shot(&mut self, duration: Duration) -> TimerId {
        self.start(duration, TimerKind::OneShot)
    }

    /// Start a repeating timer. The first fire occurs after `interval`.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        self.start(interval, TimerKind::Repeating)
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.timers
            .remove(id)
            .map(|_| ())
            .ok_or(TimerError::InvalidTimerId)
    }

    /// Check if a timer is currently pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    fn prune(&mut self) {
        // Entries for stopped timers stay in the heap until they surface.
        while let Some(entry) = self.queue.peek() {
            let live = self
                .timers
                .get(entry.id)
                .is_some_and(|t| t.next_fire == entry.fire_time);
            if live {
                break;
            }
            self.queue.pop();
        }
    }

    /// Get the duration until the next timer fires, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.prune();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_sub(self.now))
    }

    /// Fire the earliest timer due at or before `limit`.
    ///
    /// The clock moves to that timer's deadline. Returns `None` once no timer
    /// is due; the clock is left untouched in that case.
    pub fn fire_next(&mut self, limit: Duration) -> Option<TimerId> {
        self.prune();
        let entry = *self.queue.peek()?;
        if entry.fire_time > limit {
            return None;
        }
        self.queue.pop();

        let id = entry.id;
        self.now = self.now.max(entry.fire_time);
        tracing::trace!(target: targets::TIMER, ?id, now = ?self.now, "timer fired");

        let now = self.now;
        let timer = self.timers.get_mut(id)?;
        match timer.kind {
            TimerKind::OneShot => {
                self.timers.remove(id);
            }
            TimerKind::Repeating => {
                let next = now + timer.interval.max(Duration::from_millis(1));
                timer.next_fire = next;
                self.schedule(id, next);
            }
        }
        Some(id)
    }

    /// Move the clock forward to `time` without firing anything.
    ///
    /// Callers fire due timers with [`fire_next`](Self::fire_next) first.
    pub fn settle(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Advance the clock by `delta`, returning every timer that fired in order.
    #[tracing::instrument(skip(self), target = "trellis_core::timer", level = "trace")]
    pub fn advance(&mut self, delta: Duration) -> Vec<TimerId> {
        let target = self.now + delta;
        let mut fired = Vec::new();
        while let Some(id) = self.fire_next(target) {
            fired.push(id);
        }
        self.settle(target);
        fired
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}
