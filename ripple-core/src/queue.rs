//! Event Queue — time-ordered pending-event store.
//!
//! All scheduled deliveries flow through one queue that guarantees:
//! - Earliest `deliver_at` pops first
//! - Equal timestamps pop in insertion order (FIFO), so identical input
//!   sequences give identical runs
//! - Delivery is monotonic: nothing is ever popped earlier than something
//!   already popped
//! - Withdrawn events are skipped and never delivered
//!
//! The queue is a cheap handle: clones share the same store, so ingestion
//! threads can insert while the driver pops. Every operation takes the
//! single lock once and is atomic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, SimError};
use crate::event::WorldEvent;
use crate::types::{EventId, GameTime};

/// A queued event with its delivery key.
#[derive(Debug)]
struct Scheduled {
    deliver_at: GameTime,
    seq: u64,
    event: WorldEvent,
}

// BinaryHeap is a max-heap, so the earliest (time, seq) must compare greatest.
impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Primary: delivery time (earlier first).
        // Secondary: FIFO (smaller sequence first).
        other
            .deliver_at
            .cmp(&self.deliver_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Thread-safe pending-event queue.
pub struct EventQueue {
    inner: Arc<Mutex<EventQueueInner>>,
}

struct EventQueueInner {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
    pending: HashSet<EventId>,
    withdrawn: HashSet<EventId>,
    last_delivered: Option<GameTime>,
    total_inserted: u64,
    total_delivered: u64,
    total_withdrawn: u64,
}

/// Statistics about the event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Events currently waiting (withdrawn ones excluded).
    pub depth: usize,
    /// Total events inserted.
    pub total_inserted: u64,
    /// Total events popped for delivery.
    pub total_delivered: u64,
    /// Total events withdrawn before delivery.
    pub total_withdrawn: u64,
}

impl EventQueueInner {
    fn check(&self, event: &WorldEvent) -> Result<()> {
        if !event.deliver_at.is_finite() {
            return Err(SimError::OutOfRangeValue {
                what: "delivery time",
                value: event.deliver_at.hours(),
            });
        }
        if event.deliver_at < event.created_at {
            return Err(SimError::NonMonotonicTime {
                requested: event.deliver_at,
                current: event.created_at,
            });
        }
        if let Some(floor) = self.last_delivered {
            if event.deliver_at < floor {
                return Err(SimError::NonMonotonicTime {
                    requested: event.deliver_at,
                    current: floor,
                });
            }
        }
        Ok(())
    }

    fn push(&mut self, event: WorldEvent) -> EventId {
        let id = event.id;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.total_inserted += 1;
        self.pending.insert(id);
        self.heap.push(Scheduled {
            deliver_at: event.deliver_at,
            seq,
            event,
        });
        id
    }

    /// Drop withdrawn entries sitting at the top of the heap.
    fn prune_top(&mut self) {
        while let Some(top) = self.heap.peek() {
            if !self.withdrawn.contains(&top.event.id) {
                return;
            }
            let id = top.event.id;
            self.heap.pop();
            self.withdrawn.remove(&id);
        }
    }

    fn take_top(&mut self) -> Option<WorldEvent> {
        self.prune_top();
        let scheduled = self.heap.pop()?;
        self.pending.remove(&scheduled.event.id);
        if self.last_delivered.is_none_or(|floor| floor < scheduled.deliver_at) {
            self.last_delivered = Some(scheduled.deliver_at);
        }
        self.total_delivered += 1;
        Some(scheduled.event)
    }
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventQueueInner {
                heap: BinaryHeap::new(),
                next_seq: 0,
                pending: HashSet::new(),
                withdrawn: HashSet::new(),
                last_delivered: None,
                total_inserted: 0,
                total_delivered: 0,
                total_withdrawn: 0,
            })),
        }
    }

    /// Schedule an event for delivery at its `deliver_at`.
    ///
    /// # Errors
    /// - [`SimError::OutOfRangeValue`] if `deliver_at` is not finite.
    /// - [`SimError::NonMonotonicTime`] if `deliver_at` precedes `created_at`,
    ///   or precedes an event already delivered.
    pub fn insert(&self, event: WorldEvent) -> Result<EventId> {
        let mut inner = self.inner.lock();
        inner.check(&event)?;
        Ok(inner.push(event))
    }

    /// Schedule several events atomically: either all are inserted, in
    /// order, or none is.
    ///
    /// # Errors
    /// Same as [`insert`](Self::insert), for the first offending event.
    pub fn insert_batch(&self, events: Vec<WorldEvent>) -> Result<Vec<EventId>> {
        let mut inner = self.inner.lock();
        for event in &events {
            inner.check(event)?;
        }
        Ok(events.into_iter().map(|event| inner.push(event)).collect())
    }

    /// Remove and return the earliest event, or `None` if nothing is pending.
    pub fn pop_earliest(&self) -> Option<WorldEvent> {
        self.inner.lock().take_top()
    }

    /// Pop the earliest event only if it is due at `now`.
    pub fn pop_if_due(&self, now: GameTime) -> Option<WorldEvent> {
        let mut inner = self.inner.lock();
        inner.prune_top();
        if inner.heap.peek()?.deliver_at > now {
            return None;
        }
        inner.take_top()
    }

    /// Pop every event due at `now`, earliest first.
    pub fn pop_due(&self, now: GameTime) -> Vec<WorldEvent> {
        let mut inner = self.inner.lock();
        let mut due = Vec::new();
        loop {
            inner.prune_top();
            match inner.heap.peek() {
                Some(top) if top.deliver_at <= now => {}
                _ => return due,
            }
            if let Some(event) = inner.take_top() {
                due.push(event);
            }
        }
    }

    /// A copy of the earliest pending event, without removing it.
    #[must_use]
    pub fn peek_earliest(&self) -> Option<WorldEvent> {
        let mut inner = self.inner.lock();
        inner.prune_top();
        inner.heap.peek().map(|s| s.event.clone())
    }

    /// Delivery time of the earliest pending event.
    #[must_use]
    pub fn next_due_time(&self) -> Option<GameTime> {
        let mut inner = self.inner.lock();
        inner.prune_top();
        inner.heap.peek().map(|s| s.deliver_at)
    }

    /// Refuse any later insert scheduled before `t`.
    ///
    /// The driver calls this before draining up to `t`, so that time a
    /// tick is passing over cannot receive new deliveries. Popping never
    /// lowers the floor again. Inserts at exactly `t` are still accepted
    /// and wait for the next tick.
    pub fn close_until(&self, t: GameTime) {
        let mut inner = self.inner.lock();
        if inner.last_delivered.is_none_or(|floor| floor < t) {
            inner.last_delivered = Some(t);
        }
    }

    /// Withdraw a pending event so it is never delivered.
    ///
    /// # Errors
    /// Returns [`SimError::EventNotPending`] if the event was already
    /// delivered, withdrawn, or never inserted.
    pub fn withdraw(&self, id: EventId) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.pending.remove(&id) {
            return Err(SimError::EventNotPending(id));
        }
        inner.withdrawn.insert(id);
        inner.total_withdrawn += 1;
        Ok(())
    }

    /// Withdraw every pending event of a cascade. Returns how many were withdrawn.
    pub fn withdraw_cascade(&self, cascade: EventId) -> usize {
        let mut inner = self.inner.lock();
        let ids: Vec<EventId> = inner
            .heap
            .iter()
            .filter(|s| s.event.cascade == cascade && inner.pending.contains(&s.event.id))
            .map(|s| s.event.id)
            .collect();
        for id in &ids {
            inner.pending.remove(id);
            inner.withdrawn.insert(*id);
        }
        inner.total_withdrawn += ids.len() as u64;
        ids.len()
    }

    /// Number of pending (not withdrawn) events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Whether no event is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// Get queue statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let inner = self.inner.lock();
        QueueStats {
            depth: inner.pending.len(),
            total_inserted: inner.total_inserted,
            total_delivered: inner.total_delivered,
            total_withdrawn: inner.total_withdrawn,
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").field("stats", &self.stats()).finish()
    }
}

impl Clone for EventQueue {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
