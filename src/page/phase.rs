use crate::{
    foundation::error::{CyberfolioError, CyberfolioResult},
    page::timers::{TimerEvent, TimerId, TimerQueue},
};

/// Forward-only reveal sequence of the landing page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum TransitionPhase {
    IntroPlaying,
    IntroDone,
    HeadingPinned,
    DescriptionShown,
}

impl TransitionPhase {
    pub fn flags(self) -> PhaseFlags {
        PhaseFlags {
            content_visible: self >= Self::IntroDone,
            heading_pinned: self >= Self::HeadingPinned,
            description_shown: self >= Self::DescriptionShown,
        }
    }
}

/// Presentational switches derived from the phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PhaseFlags {
    pub content_visible: bool,
    pub heading_pinned: bool,
    pub description_shown: bool,
}

/// Things that may end the intro. Whichever arrives first wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PhaseTrigger {
    Completion,
    Skip,
    FallbackTimeout,
}

/// Wall-clock delays of the page sequence, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PageTiming {
    /// Authoritative end of the intro: its nominal length plus a grace period.
    pub fallback_ms: u64,
    /// IntroDone to HeadingPinned.
    pub heading_delay_ms: u64,
    /// HeadingPinned to DescriptionShown.
    pub description_delay_ms: u64,
    /// How long the scroll static overlay outlives the last upward scroll.
    pub scroll_static_ms: u64,
}

impl Default for PageTiming {
    fn default() -> Self {
        Self {
            fallback_ms: 5_500,
            heading_delay_ms: 1_000,
            description_delay_ms: 1_000,
            scroll_static_ms: 350,
        }
    }
}

impl PageTiming {
    pub fn validate(&self) -> CyberfolioResult<()> {
        if self.fallback_ms == 0 {
            return Err(CyberfolioError::validation("fallback_ms must be > 0"));
        }
        if self.scroll_static_ms == 0 {
            return Err(CyberfolioError::validation("scroll_static_ms must be > 0"));
        }
        Ok(())
    }
}

/// One entry of the phase history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PhaseChange {
    pub phase: TransitionPhase,
    pub at_ms: u64,
}

/// Page sequencer.
///
/// Every trigger funnels into [`PhaseController::advance_to`], which only ever moves
/// forward. Each phase schedules the next one relative to its own entry time, and at most
/// one chained timer is pending at a time.
#[derive(Debug)]
pub struct PhaseController {
    timing: PageTiming,
    phase: TransitionPhase,
    fallback: Option<TimerId>,
    chained: Option<TimerId>,
    history: Vec<PhaseChange>,
    torn_down: bool,
}

impl PhaseController {
    pub fn new(timing: PageTiming) -> Self {
        Self {
            timing,
            phase: TransitionPhase::IntroPlaying,
            fallback: None,
            chained: None,
            history: Vec::new(),
            torn_down: false,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn flags(&self) -> PhaseFlags {
        self.phase.flags()
    }

    pub fn history(&self) -> &[PhaseChange] {
        &self.history
    }

    pub fn timing(&self) -> PageTiming {
        self.timing
    }

    /// Arm the fallback timer. Calling it again while armed does nothing.
    pub fn start(&mut self, now_ms: u64, timers: &mut TimerQueue) {
        let armed = self.fallback.is_some();
        if self.torn_down || armed || self.phase != TransitionPhase::IntroPlaying {
            return;
        }
        self.fallback = Some(timers.schedule(
            now_ms,
            self.timing.fallback_ms,
            TimerEvent::IntroFallback,
        ));
    }

    /// Move to `target` if it lies ahead of the current phase.
    ///
    /// Returns `false` (and changes nothing) for re-entry, regression or after teardown.
    pub fn advance_to(
        &mut self,
        target: TransitionPhase,
        now_ms: u64,
        timers: &mut TimerQueue,
    ) -> bool {
        if self.torn_down || target <= self.phase {
            return false;
        }

        if let Some(id) = self.fallback.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.chained.take() {
            timers.cancel(id);
        }

        tracing::debug!(from = ?self.phase, to = ?target, at_ms = now_ms, "phase advanced");
        self.phase = target;
        self.history.push(PhaseChange {
            phase: target,
            at_ms: now_ms,
        });

        self.chained = match target {
            TransitionPhase::IntroPlaying | TransitionPhase::DescriptionShown => None,
            TransitionPhase::IntroDone => Some(timers.schedule(
                now_ms,
                self.timing.heading_delay_ms,
                TimerEvent::PinHeading,
            )),
            TransitionPhase::HeadingPinned => Some(timers.schedule(
                now_ms,
                self.timing.description_delay_ms,
                TimerEvent::ShowDescription,
            )),
        };
        true
    }

    /// Every trigger means the same thing: the intro is over.
    pub fn on_trigger(
        &mut self,
        trigger: PhaseTrigger,
        now_ms: u64,
        timers: &mut TimerQueue,
    ) -> bool {
        let advanced = self.advance_to(TransitionPhase::IntroDone, now_ms, timers);
        if !advanced {
            tracing::trace!(?trigger, phase = ?self.phase, "late trigger ignored");
        }
        advanced
    }

    /// Handle a fired timer. Timers this controller does not own are ignored.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        event: TimerEvent,
        now_ms: u64,
        timers: &mut TimerQueue,
    ) -> bool {
        match event {
            TimerEvent::IntroFallback if self.fallback == Some(id) => {
                self.fallback = None;
                self.on_trigger(PhaseTrigger::FallbackTimeout, now_ms, timers)
            }
            TimerEvent::PinHeading if self.chained == Some(id) => {
                self.chained = None;
                self.advance_to(TransitionPhase::HeadingPinned, now_ms, timers)
            }
            TimerEvent::ShowDescription if self.chained == Some(id) => {
                self.chained = None;
                self.advance_to(TransitionPhase::DescriptionShown, now_ms, timers)
            }
            _ => false,
        }
    }

    /// Cancel all pending phase timers and freeze the phase.
    pub fn teardown(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.fallback.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.chained.take() {
            timers.cancel(id);
        }
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
