//! Minimal stand-in for the page runtime that widgets attach to.
//!
//! A widget asks the host for a frame loop, an input listener and a render context. Each
//! request returns an RAII handle; dropping the handle detaches the resource, so a widget
//! that is dropped can never leave a loop or listener behind.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
};

/// Pointer input in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
}

type LoopFn = Rc<RefCell<dyn FnMut(u64)>>;
type ListenerFn = Rc<RefCell<dyn FnMut(&PointerEvent)>>;

struct FrameLoop {
    interval_ms: u64,
    next_due_ms: u64,
    callback: LoopFn,
}

#[derive(Default)]
struct HostState {
    next_id: u64,
    loops: BTreeMap<u64, FrameLoop>,
    listeners: BTreeMap<u64, ListenerFn>,
    /// `None` means unlimited.
    context_budget: Option<usize>,
    live_contexts: usize,
}

/// Shared handle to the host. Clones refer to the same host.
#[derive(Clone, Default)]
pub struct WidgetHost {
    state: Rc<RefCell<HostState>>,
}

impl WidgetHost {
    /// Host with as many render contexts as widgets ask for.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that hands out at most `n` live render contexts (`0`: no rendering at all).
    pub fn with_context_limit(n: usize) -> Self {
        let host = Self::default();
        host.state.borrow_mut().context_budget = Some(n);
        host
    }

    /// Register a callback run at most once per [`WidgetHost::run_until`] and no more often
    /// than every `interval_ms`. The first run is due at `now_ms`.
    pub fn request_loop(
        &self,
        now_ms: u64,
        interval_ms: u64,
        callback: impl FnMut(u64) + 'static,
    ) -> LoopHandle {
        let mut st = self.state.borrow_mut();
        let id = st.next_id;
        st.next_id += 1;
        st.loops.insert(
            id,
            FrameLoop {
                interval_ms: interval_ms.max(1),
                next_due_ms: now_ms,
                callback: Rc::new(RefCell::new(callback)),
            },
        );
        LoopHandle {
            host: Rc::downgrade(&self.state),
            id,
        }
    }

    pub fn add_listener(&self, callback: impl FnMut(&PointerEvent) + 'static) -> ListenerHandle {
        let mut st = self.state.borrow_mut();
        let id = st.next_id;
        st.next_id += 1;
        st.listeners.insert(id, Rc::new(RefCell::new(callback)));
        ListenerHandle {
            host: Rc::downgrade(&self.state),
            id,
        }
    }

    /// `None` when the host cannot render (budget exhausted or rendering unavailable).
    pub fn acquire_context(&self) -> Option<RenderContext> {
        let mut st = self.state.borrow_mut();
        if st.context_budget.is_some_and(|max| st.live_contexts >= max) {
            return None;
        }
        st.live_contexts += 1;
        Some(RenderContext {
            host: Rc::downgrade(&self.state),
        })
    }

    /// Run every loop that is due at `now_ms`. Returns how many callbacks ran.
    ///
    /// A loop that fell behind runs once and resumes its cadence from `now_ms`; missed
    /// frames are dropped rather than replayed.
    pub fn run_until(&self, now_ms: u64) -> usize {
        let due: Vec<(u64, LoopFn)> = {
            let mut st = self.state.borrow_mut();
            st.loops
                .iter_mut()
                .filter(|(_, l)| l.next_due_ms <= now_ms)
                .map(|(&id, l)| {
                    l.next_due_ms += l.interval_ms;
                    if l.next_due_ms <= now_ms {
                        l.next_due_ms = now_ms + l.interval_ms;
                    }
                    (id, Rc::clone(&l.callback))
                })
                .collect()
        };

        let mut ran = 0;
        for (id, cb) in due {
            // A callback earlier in this pass may have dropped this loop's handle.
            if !self.state.borrow().loops.contains_key(&id) {
                continue;
            }
            (&mut *cb.borrow_mut())(now_ms);
            ran += 1;
        }
        ran
    }

    pub fn dispatch(&self, event: PointerEvent) {
        let listeners: Vec<(u64, ListenerFn)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(&id, l)| (id, Rc::clone(l)))
            .collect();
        for (id, cb) in listeners {
            if self.state.borrow().listeners.contains_key(&id) {
                (&mut *cb.borrow_mut())(&event);
            }
        }
    }

    pub fn active_loops(&self) -> usize {
        self.state.borrow().loops.len()
    }

    pub fn active_listeners(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn live_contexts(&self) -> usize {
        self.state.borrow().live_contexts
    }
}

/// Cancels its frame loop on drop.
#[must_use = "dropping the handle cancels the loop"]
pub struct LoopHandle {
    host: Weak<RefCell<HostState>>,
    id: u64,
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        if let Some(host) = self.host.upgrade() {
            host.borrow_mut().loops.remove(&self.id);
        }
    }
}

/// Detaches its listener on drop.
#[must_use = "dropping the handle detaches the listener"]
pub struct ListenerHandle {
    host: Weak<RefCell<HostState>>,
    id: u64,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(host) = self.host.upgrade() {
            host.borrow_mut().listeners.remove(&self.id);
        }
    }
}

/// A live render context; released on drop.
#[must_use = "dropping the context releases it"]
pub struct RenderContext {
    host: Weak<RefCell<HostState>>,
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        if let Some(host) = self.host.upgrade() {
            let mut st = host.borrow_mut();
            st.live_contexts = st.live_contexts.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn loop_runs_on_its_cadence_until_dropped() {
        let host = WidgetHost::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let handle = host.request_loop(0, 33, move |_| h.set(h.get() + 1));

        for t in 0..=1_000 {
            host.run_until(t);
        }
        assert_eq!(hits.get(), 31);

        drop(handle);
        assert_eq!(host.active_loops(), 0);
        host.run_until(5_000);
        assert_eq!(hits.get(), 31);
    }

    #[test]
    fn late_loops_skip_missed_frames() {
        let host = WidgetHost::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let _handle = host.request_loop(0, 33, move |_| h.set(h.get() + 1));
        assert_eq!(host.run_until(1_000), 1);
        assert_eq!(host.run_until(1_032), 0);
        assert_eq!(host.run_until(1_033), 1);
    }

    #[test]
    fn listeners_detach_on_drop() {
        let host = WidgetHost::new();
        let seen = Rc::new(Cell::new(0u32));
        let s = Rc::clone(&seen);
        let handle = host.add_listener(move |_| s.set(s.get() + 1));
        host.dispatch(PointerEvent::Up);
        drop(handle);
        host.dispatch(PointerEvent::Up);
        assert_eq!(seen.get(), 1);
        assert_eq!(host.active_listeners(), 0);
    }

    #[test]
    fn context_budget_is_enforced_and_released() {
        let host = WidgetHost::with_context_limit(1);
        let ctx = host.acquire_context();
        assert!(ctx.is_some());
        assert!(host.acquire_context().is_none());
        drop(ctx);
        assert_eq!(host.live_contexts(), 0);
        assert!(host.acquire_context().is_some());
        assert!(WidgetHost::with_context_limit(0).acquire_context().is_none());
    }

    #[test]
    fn handles_outliving_the_host_are_harmless() {
        let host = WidgetHost::new();
        let handle = host.request_loop(0, 10, |_| {});
        let ctx = host.acquire_context();
        drop(host);
        drop(handle);
        drop(ctx);
    }
}
