use crate::{
    content::{ExperienceEntry, SiteContent},
    foundation::{core::FrameIndex, error::CyberfolioResult},
    page::{
        intro::IntroSurface,
        phase::{PageTiming, PhaseController, PhaseFlags, PhaseTrigger, TransitionPhase},
        scroll::ScrollStatic,
        timers::{DueTimer, TimerEvent, TimerQueue},
    },
    render::display::Scene,
    scene::config::IntroConfig,
    sphere::{
        host::{PointerEvent, WidgetHost},
        widget::{AsciiFrame, SphereProps, SphereSlot},
    },
    widgets::{
        audio::{AudioBackend, AudioToggle, PlaybackState, default_backend},
        contributions::{ContributionSource, ContributionsWidget, FetchState},
        marquee::Marquee,
    },
};
use std::{path::Path, sync::Arc};

/// Everything the page needs at mount time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub intro: IntroConfig,
    pub timing: PageTiming,
    pub content: SiteContent,
    pub sphere: SphereProps,
    /// Whether the intro player reports the end of playback. When it does not, the
    /// fallback timer alone ends the intro.
    pub completion_event: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            intro: IntroConfig::default(),
            timing: PageTiming::default(),
            content: SiteContent::default(),
            sphere: SphereProps::default(),
            completion_event: true,
        }
    }
}

impl PageConfig {
    pub fn validate(&self) -> CyberfolioResult<()> {
        self.intro.validate()?;
        self.timing.validate()?;
        self.content.validate()
    }

    pub fn from_path(path: &Path) -> CyberfolioResult<Self> {
        use anyhow::Context as _;
        let file = std::fs::File::open(path)
            .with_context(|| format!("open page config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Something observable that happened on the page.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEventKind {
    Phase {
        phase: TransitionPhase,
        trigger: Option<PhaseTrigger>,
    },
    IntroClosed {
        frame: u64,
    },
    StaticOn,
    StaticOff,
    ContributionsLoaded {
        days: usize,
        total: u32,
        streak: u32,
    },
    ContributionsFailed,
    Audio {
        state: PlaybackState,
    },
    SphereRebuilt,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub kind: PageEventKind,
}

/// What the visitor can read right now.
///
/// The heading, nav and experience timeline appear with the content at IntroDone. The
/// tagline is the description and waits for DescriptionShown.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageView<'a> {
    pub phase: TransitionPhase,
    pub heading: Option<&'a str>,
    pub heading_pinned: bool,
    pub tagline: Option<&'a str>,
    pub nav_links: &'a [String],
    pub experience: &'a [ExperienceEntry],
}

/// The landing page as a single-threaded event loop.
///
/// Time only moves when the owner calls [`Page::advance_to`] (directly or through one of
/// the input methods). Within one advance, intro completion and timers are processed in
/// timestamp order, so the outcome does not depend on how coarsely time is fed in.
pub struct Page {
    timers: TimerQueue,
    controller: PhaseController,
    scroll: ScrollStatic,
    intro: Option<IntroSurface>,
    host: WidgetHost,
    sphere: SphereSlot,
    contributions: Option<ContributionsWidget>,
    audio: AudioToggle,
    marquee: Marquee,
    content: SiteContent,
    now_ms: u64,
    log: Vec<PageEvent>,
    torn_down: bool,
}

impl Page {
    /// Mount on a fresh host.
    pub fn new(config: PageConfig, now_ms: u64) -> CyberfolioResult<Self> {
        Self::mount(config, WidgetHost::new(), now_ms)
    }

    pub fn mount(config: PageConfig, host: WidgetHost, now_ms: u64) -> CyberfolioResult<Self> {
        config.validate()?;
        let PageConfig {
            intro,
            timing,
            content,
            sphere,
            completion_event,
        } = config;

        let mut timers = TimerQueue::new();
        let mut controller = PhaseController::new(timing);
        controller.start(now_ms, &mut timers);

        let audio = AudioToggle::new(
            default_backend(&content.audio_path),
            content.track_label.clone(),
        );
        tracing::debug!(at_ms = now_ms, "page mounted");
        Ok(Self {
            timers,
            controller,
            scroll: ScrollStatic::new(timing.scroll_static_ms),
            intro: Some(IntroSurface::new(intro, now_ms, completion_event)),
            sphere: SphereSlot::new(host.clone(), sphere, now_ms),
            host,
            contributions: None,
            audio,
            marquee: Marquee::new(content.skills.clone()),
            content,
            now_ms,
            log: Vec::new(),
            torn_down: false,
        })
    }

    pub fn with_audio_backend(mut self, backend: Box<dyn AudioBackend>) -> Self {
        self.audio = AudioToggle::new(backend, self.content.track_label.clone());
        self
    }

    /// Start the one contribution fetch for the configured user.
    pub fn with_contributions(mut self, source: Arc<dyn ContributionSource>) -> Self {
        self.contributions = Some(ContributionsWidget::mount(
            source,
            self.content.github_user.clone(),
        ));
        self
    }

    /// Process everything due up to `now_ms`. Earlier timestamps are treated as "now".
    pub fn advance_to(&mut self, now_ms: u64) {
        if self.torn_down {
            return;
        }
        let now_ms = now_ms.max(self.now_ms);
        loop {
            let completion = self
                .intro
                .as_ref()
                .and_then(IntroSurface::completion_due_ms)
                .filter(|&t| t <= now_ms);
            let timer = self.timers.next_deadline().filter(|&t| t <= now_ms);
            match (completion, timer) {
                (Some(c), t) if t.is_none_or(|t| c <= t) => {
                    self.settle(c);
                    self.end_intro(PhaseTrigger::Completion, c);
                }
                (_, Some(_)) => {
                    let Some(due) = self.timers.pop_due(now_ms) else {
                        break;
                    };
                    self.settle(due.at_ms);
                    self.fire(due);
                }
                _ => break,
            }
        }
        self.settle(now_ms);
    }

    /// Bring clocks and widgets up to `t` without firing page timers.
    fn settle(&mut self, t: u64) {
        self.now_ms = t;
        if let Some(intro) = self.intro.as_mut() {
            intro.tick_to(t);
        }
        self.host.run_until(t);

        if let Some(w) = self.contributions.as_mut()
            && w.poll()
        {
            let kind = match w.state() {
                FetchState::Ready => PageEventKind::ContributionsLoaded {
                    days: w.data().days.len(),
                    total: w.data().total,
                    streak: w.streak(),
                },
                FetchState::Failed | FetchState::Loading => PageEventKind::ContributionsFailed,
            };
            self.push(t, kind);
        }

        let before = self.audio.state();
        let after = self.audio.poll();
        if after != before {
            self.push(t, PageEventKind::Audio { state: after });
        }
    }

    fn fire(&mut self, due: DueTimer) {
        match due.event {
            TimerEvent::ScrollStaticEnd => {
                if self.scroll.on_timer(due.id) {
                    self.push(due.at_ms, PageEventKind::StaticOff);
                }
            }
            TimerEvent::IntroFallback => {
                if self
                    .controller
                    .on_timer(due.id, due.event, due.at_ms, &mut self.timers)
                {
                    self.after_intro(PhaseTrigger::FallbackTimeout, due.at_ms);
                }
            }
            TimerEvent::PinHeading | TimerEvent::ShowDescription => {
                if self
                    .controller
                    .on_timer(due.id, due.event, due.at_ms, &mut self.timers)
                {
                    let phase = self.controller.phase();
                    self.push(
                        due.at_ms,
                        PageEventKind::Phase {
                            phase,
                            trigger: None,
                        },
                    );
                }
            }
        }
    }

    fn end_intro(&mut self, trigger: PhaseTrigger, at_ms: u64) -> bool {
        let advanced = self.controller.on_trigger(trigger, at_ms, &mut self.timers);
        if advanced {
            self.after_intro(trigger, at_ms);
        }
        advanced
    }

    fn after_intro(&mut self, trigger: PhaseTrigger, at_ms: u64) {
        self.push(
            at_ms,
            PageEventKind::Phase {
                phase: TransitionPhase::IntroDone,
                trigger: Some(trigger),
            },
        );
        if let Some(intro) = self.intro.take() {
            let frame = intro.frame().0;
            self.push(at_ms, PageEventKind::IntroClosed { frame });
        }
    }

    fn push(&mut self, at_ms: u64, kind: PageEventKind) {
        tracing::trace!(at_ms, ?kind, "page event");
        self.log.push(PageEvent { at_ms, kind });
    }

    /// The "Skip Intro" button. Returns `true` if it ended the intro.
    pub fn skip(&mut self, now_ms: u64) -> bool {
        self.advance_to(now_ms);
        if self.torn_down {
            return false;
        }
        self.end_intro(PhaseTrigger::Skip, self.now_ms)
    }

    pub fn scroll(&mut self, offset: f64, now_ms: u64) {
        self.advance_to(now_ms);
        if self.torn_down {
            return;
        }
        let was_active = self.scroll.is_active();
        if self.scroll.on_scroll(offset, self.now_ms, &mut self.timers) && !was_active {
            self.push(self.now_ms, PageEventKind::StaticOn);
        }
    }

    pub fn toggle_audio(&mut self, now_ms: u64) -> PlaybackState {
        self.advance_to(now_ms);
        if self.torn_down {
            return self.audio.state();
        }
        let state = self.audio.toggle(self.now_ms);
        self.push(self.now_ms, PageEventKind::Audio { state });
        state
    }

    pub fn pointer(&mut self, event: PointerEvent, now_ms: u64) {
        self.advance_to(now_ms);
        if !self.torn_down {
            self.host.dispatch(event);
        }
    }

    /// Rebuild the sphere if `props` differ from the current ones.
    pub fn set_sphere_props(&mut self, props: SphereProps, now_ms: u64) -> bool {
        self.advance_to(now_ms);
        if self.torn_down {
            return false;
        }
        let rebuilt = self.sphere.set_props(props, self.now_ms);
        if rebuilt {
            self.push(self.now_ms, PageEventKind::SphereRebuilt);
        }
        rebuilt
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn phase(&self) -> TransitionPhase {
        self.controller.phase()
    }

    pub fn flags(&self) -> PhaseFlags {
        self.controller.flags()
    }

    pub fn static_active(&self) -> bool {
        self.scroll.is_active()
    }

    pub fn intro_frame(&self) -> Option<FrameIndex> {
        self.intro.as_ref().map(IntroSurface::frame)
    }

    pub fn intro_scene(&self) -> Option<Scene> {
        self.intro.as_ref().map(IntroSurface::scene)
    }

    pub fn sphere_frame(&self) -> Option<AsciiFrame> {
        self.sphere.mounted()?.latest_frame()
    }

    pub fn contributions(&self) -> Option<&ContributionsWidget> {
        self.contributions.as_ref()
    }

    pub fn audio(&self) -> &AudioToggle {
        &self.audio
    }

    pub fn marquee_line(&self, width: usize) -> String {
        self.marquee.render_line(self.now_ms, width, 8.0)
    }

    pub fn content(&self) -> &SiteContent {
        &self.content
    }

    pub fn view(&self) -> PageView<'_> {
        let flags = self.flags();
        let c = &self.content;
        let visible = flags.content_visible;
        PageView {
            phase: self.phase(),
            heading: visible.then_some(c.name.as_str()),
            heading_pinned: flags.heading_pinned,
            tagline: flags.description_shown.then_some(c.tagline.as_str()),
            nav_links: if visible { c.nav_links.as_slice() } else { &[] },
            experience: if visible { c.experience.as_slice() } else { &[] },
        }
    }

    pub fn host(&self) -> &WidgetHost {
        &self.host
    }

    pub fn log(&self) -> &[PageEvent] {
        &self.log
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Cancel every timer, loop and listener and drop the intro and widgets. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.controller.teardown(&mut self.timers);
        self.scroll.teardown(&mut self.timers);
        self.timers.clear();
        self.intro = None;
        self.sphere.unmount();
        self.contributions = None;
        self.audio.stop();
        self.torn_down = true;
        tracing::debug!(at_ms = self.now_ms, "page torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.teardown();
    }
}
