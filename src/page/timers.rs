use std::{cell::Cell, collections::BTreeMap, time::Instant};

/// Handle to a scheduled timer. Ids are never reused within one queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// What a timer means when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TimerEvent {
    /// The intro did not report completion in time.
    IntroFallback,
    PinHeading,
    ShowDescription,
    /// The scroll static overlay has been quiet long enough.
    ScrollStaticEnd,
}

/// A timer whose deadline has passed, as returned by [`TimerQueue::pop_due`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DueTimer {
    pub id: TimerId,
    pub at_ms: u64,
    pub event: TimerEvent,
}

/// Virtual-time one-shot timers.
///
/// Nothing here sleeps: the owner feeds timestamps in and drains due timers in deadline
/// order (ties fire in scheduling order). Cancelling an already-fired or unknown id is a
/// no-op, so stale handles are harmless.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    by_deadline: BTreeMap<(u64, u64), TimerEvent>,
    deadlines: BTreeMap<u64, u64>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, event: TimerEvent) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let at = now_ms.saturating_add(delay_ms);
        self.by_deadline.insert((at, id), event);
        self.deadlines.insert(id, at);
        tracing::trace!(id, at, ?event, "timer scheduled");
        TimerId(id)
    }

    /// Returns `true` when a pending timer was removed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(at) => {
                self.by_deadline.remove(&(at, id.0));
                tracing::trace!(id = id.0, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id.0)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.by_deadline.keys().next().map(|&(at, _)| at)
    }

    /// Remove and return the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<DueTimer> {
        let (&(at, id), _) = self.by_deadline.iter().next()?;
        if at > now_ms {
            return None;
        }
        let event = self.by_deadline.remove(&(at, id))?;
        self.deadlines.remove(&id);
        Some(DueTimer {
            id: TimerId(id),
            at_ms: at,
            event,
        })
    }

    /// Drain every timer due at or before `now_ms`, in firing order. Timers scheduled
    /// while handling the result are not included; use [`TimerQueue::pop_due`] to chain.
    pub fn advance(&mut self, now_ms: u64) -> Vec<DueTimer> {
        std::iter::from_fn(|| self.pop_due(now_ms)).collect()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_deadline.clear();
        self.deadlines.clear();
    }
}

/// Millisecond time source for the page and widget loops.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for headless runs and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) -> u64 {
        let t = self.now.get().saturating_add(ms);
        self.now.set(t);
        t
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
