use cyberfolio::{
    Clock, ManualClock, Page, PageConfig, PageEventKind, PageTiming, PhaseController,
    PhaseTrigger, ScrollStatic, SphereProps, TimerQueue, TransitionPhase,
};

fn small_page() -> PageConfig {
    PageConfig {
        sphere: SphereProps {
            size: 40,
            ..SphereProps::default()
        },
        ..PageConfig::default()
    }
}

/// Drive a controller with the three intro triggers at the given times and let every
/// timer run out.
fn run(order: &[(PhaseTrigger, u64)]) -> Vec<(TransitionPhase, u64)> {
    let mut timers = TimerQueue::new();
    let mut ctl = PhaseController::new(PageTiming::default());
    ctl.start(0, &mut timers);

    // Timers scheduled while firing may already be due, so drain one at a time.
    let drain = |ctl: &mut PhaseController, timers: &mut TimerQueue, now_ms: u64| {
        while let Some(due) = timers.pop_due(now_ms) {
            ctl.on_timer(due.id, due.event, due.at_ms, timers);
        }
    };

    let mut inputs = order.to_vec();
    inputs.sort_by_key(|&(_, at)| at);
    for (trigger, at) in inputs {
        drain(&mut ctl, &mut timers, at);
        if trigger != PhaseTrigger::FallbackTimeout {
            ctl.on_trigger(trigger, at, &mut timers);
        }
    }
    drain(&mut ctl, &mut timers, 60_000);
    ctl.history().iter().map(|c| (c.phase, c.at_ms)).collect()
}

#[test]
fn every_trigger_interleaving_reaches_intro_done_once() {
    use PhaseTrigger::*;
    let orders: [&[(PhaseTrigger, u64)]; 6] = [
        &[(Completion, 1_000), (Skip, 2_000), (FallbackTimeout, 5_500)],
        &[(Skip, 1_000), (Completion, 2_000), (FallbackTimeout, 5_500)],
        &[(Completion, 5_000), (FallbackTimeout, 5_500), (Skip, 6_000)],
        &[(FallbackTimeout, 5_500), (Completion, 5_800), (Skip, 5_900)],
        &[(FallbackTimeout, 5_500), (Skip, 5_600), (Completion, 9_000)],
        &[(Skip, 5_499), (FallbackTimeout, 5_500), (Completion, 5_501)],
    ];
    for order in orders {
        let history = run(order);
        let phases: Vec<TransitionPhase> = history.iter().map(|&(p, _)| p).collect();
        assert_eq!(
            phases,
            vec![
                TransitionPhase::IntroDone,
                TransitionPhase::HeadingPinned,
                TransitionPhase::DescriptionShown,
            ],
            "{order:?}"
        );
        let done_at = history[0].1;
        assert_eq!(history[1].1, done_at + 1_000);
        assert_eq!(history[2].1, done_at + 2_000);
        assert!(history.windows(2).all(|w| w[0].0 < w[1].0));
    }
}

#[test]
fn teardown_before_the_fallback_means_no_phase_change() {
    let clock = ManualClock::new(0);
    let mut page = Page::new(
        PageConfig {
            completion_event: false,
            ..small_page()
        },
        clock.now_ms(),
    )
    .unwrap();

    page.advance_to(clock.advance(3_000));
    page.teardown();
    page.advance_to(clock.advance(10_000));

    assert_eq!(page.phase(), TransitionPhase::IntroPlaying);
    assert!(
        !page
            .log()
            .iter()
            .any(|e| matches!(e.kind, PageEventKind::Phase { .. }))
    );
}

#[test]
fn dropping_the_page_detaches_the_sphere() {
    let page = Page::new(small_page(), 0).unwrap();
    let host = page.host().clone();
    assert_eq!(host.active_loops(), 1);
    drop(page);
    assert_eq!(host.active_loops(), 0);
    assert_eq!(host.active_listeners(), 0);
    assert_eq!(host.live_contexts(), 0);
}

#[test]
fn phase_flags_follow_the_sequence() {
    let mut page = Page::new(small_page(), 0).unwrap();
    let f = page.flags();
    assert!(!f.content_visible && !f.heading_pinned && !f.description_shown);
    page.advance_to(5_000);
    assert!(page.flags().content_visible);
    assert!(!page.flags().heading_pinned);
    page.advance_to(6_000);
    assert!(page.flags().heading_pinned);
    page.advance_to(7_000);
    assert!(page.flags().description_shown);
}

#[test]
fn coarse_and_fine_time_steps_agree() {
    let mut coarse = Page::new(small_page(), 0).unwrap();
    coarse.skip(700);
    coarse.advance_to(20_000);

    let mut fine = Page::new(small_page(), 0).unwrap();
    for t in (0..=700).step_by(16) {
        fine.advance_to(t);
    }
    fine.skip(700);
    for t in (700..=20_000).step_by(16) {
        fine.advance_to(t);
    }

    let phases = |p: &Page| -> Vec<(u64, TransitionPhase)> {
        p.log()
            .iter()
            .filter_map(|e| match e.kind {
                PageEventKind::Phase { phase, .. } => Some((e.at_ms, phase)),
                _ => None,
            })
            .collect()
    };
    assert_eq!(phases(&coarse), phases(&fine));
}

#[test]
fn upward_scroll_overlay_deactivates_after_the_debounce() {
    let mut timers = TimerQueue::new();
    let mut fx = ScrollStatic::new(350);
    for (offset, at) in [(100.0, 0), (90.0, 10), (80.0, 20)] {
        fx.on_scroll(offset, at, &mut timers);
    }
    assert!(fx.is_active());
    assert!(timers.advance(369).is_empty());
    let fired = timers.advance(370);
    assert_eq!(fired.len(), 1);
    assert!(fx.on_timer(fired[0].id));
    assert!(!fx.is_active());
}

#[test]
fn a_new_upward_scroll_extends_the_overlay() {
    let mut timers = TimerQueue::new();
    let mut fx = ScrollStatic::new(350);
    fx.on_scroll(100.0, 0, &mut timers);
    fx.on_scroll(90.0, 100, &mut timers);
    fx.on_scroll(80.0, 400, &mut timers);
    assert!(timers.advance(449).is_empty());
    assert!(fx.is_active());
    // Downward scrolling does nothing.
    fx.on_scroll(500.0, 600, &mut timers);
    let fired = timers.advance(750);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].at_ms, 750);
    fx.on_timer(fired[0].id);
    assert!(!fx.is_active());
}
