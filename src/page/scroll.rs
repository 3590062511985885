use crate::page::timers::{TimerEvent, TimerId, TimerQueue};

/// Full-viewport static that flashes while the visitor scrolls back up.
///
/// Owns its last scroll reading; nothing outside the effect tracks scroll position. The
/// effect only observes offsets and never changes them.
#[derive(Debug)]
pub struct ScrollStatic {
    duration_ms: u64,
    last_offset: Option<f64>,
    active: bool,
    timer: Option<TimerId>,
    activated_at: Option<u64>,
    torn_down: bool,
}

impl ScrollStatic {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            last_offset: None,
            active: false,
            timer: None,
            activated_at: None,
            torn_down: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// When the current burst started, if one is showing.
    pub fn active_since(&self) -> Option<u64> {
        self.activated_at.filter(|_| self.active)
    }

    /// Feed one scroll reading. Returns `true` when the overlay turned on or was extended.
    ///
    /// The first reading only primes the comparison. An upward scroll (smaller offset)
    /// restarts the off-timer from `now_ms`; downward or unchanged readings do nothing.
    pub fn on_scroll(&mut self, offset: f64, now_ms: u64, timers: &mut TimerQueue) -> bool {
        if self.torn_down {
            return false;
        }
        let previous = self.last_offset.replace(offset);
        let Some(previous) = previous else {
            return false;
        };
        if offset >= previous {
            return false;
        }

        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
        self.timer = Some(timers.schedule(now_ms, self.duration_ms, TimerEvent::ScrollStaticEnd));
        if !self.active {
            tracing::trace!(offset, at_ms = now_ms, "scroll static on");
            self.active = true;
            self.activated_at = Some(now_ms);
        }
        true
    }

    /// Returns `true` when `id` was this effect's live timer and the overlay turned off.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.timer != Some(id) {
            return false;
        }
        self.timer = None;
        self.active = false;
        true
    }

    pub fn teardown(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
        self.active = false;
        self.torn_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(fx: &mut ScrollStatic, timers: &mut TimerQueue, now_ms: u64) {
        for due in timers.advance(now_ms) {
            fx.on_timer(due.id);
        }
    }

    #[test]
    fn upward_run_deactivates_after_the_debounce() {
        let mut timers = TimerQueue::new();
        let mut fx = ScrollStatic::new(350);
        assert!(!fx.on_scroll(100.0, 0, &mut timers));
        assert!(fx.on_scroll(90.0, 10, &mut timers));
        assert!(fx.on_scroll(80.0, 20, &mut timers));
        assert!(fx.is_active());
        assert_eq!(timers.len(), 1);

        drain(&mut fx, &mut timers, 369);
        assert!(fx.is_active());
        drain(&mut fx, &mut timers, 370);
        assert!(!fx.is_active());
        assert!(timers.is_empty());
    }

    #[test]
    fn new_upward_scroll_before_expiry_extends_the_burst() {
        let mut timers = TimerQueue::new();
        let mut fx = ScrollStatic::new(350);
        fx.on_scroll(100.0, 0, &mut timers);
        fx.on_scroll(90.0, 0, &mut timers);
        drain(&mut fx, &mut timers, 300);
        assert!(fx.on_scroll(70.0, 300, &mut timers));

        drain(&mut fx, &mut timers, 640);
        assert!(fx.is_active());
        assert_eq!(fx.active_since(), Some(0));
        drain(&mut fx, &mut timers, 650);
        assert!(!fx.is_active());
    }

    #[test]
    fn downward_and_equal_readings_are_ignored() {
        let mut timers = TimerQueue::new();
        let mut fx = ScrollStatic::new(350);
        fx.on_scroll(10.0, 0, &mut timers);
        assert!(!fx.on_scroll(50.0, 5, &mut timers));
        assert!(!fx.on_scroll(50.0, 6, &mut timers));
        assert!(!fx.is_active());
        assert!(timers.is_empty());
    }

    #[test]
    fn teardown_cancels_the_timer() {
        let mut timers = TimerQueue::new();
        let mut fx = ScrollStatic::new(350);
        fx.on_scroll(10.0, 0, &mut timers);
        fx.on_scroll(5.0, 1, &mut timers);
        fx.teardown(&mut timers);
        assert!(timers.is_empty());
        assert!(!fx.is_active());
        assert!(!fx.on_scroll(1.0, 2, &mut timers));
    }
}
