use cyberfolio::{
    CyberfolioError, Ease, Fps, FrameIndex, InterpOpts, IntroConfig, IntroTiming, SpringConfig, Timeline,
    interpolate, spring,
};

#[test]
fn interpolation_stays_in_range_and_clamps_outside() {
    let input = [50.0, 65.0, 120.0];
    let output = [0.0, 1.0, 0.25];
    for ease in [Ease::Linear, Ease::OutCubic, Ease::InOutQuad] {
        let opts = InterpOpts::CLAMP.eased(ease);
        for f in 0..400u32 {
            let x = f64::from(f) / 2.0;
            let v = interpolate(x, &input, &output, opts);
            assert!((0.0..=1.0).contains(&v), "{ease:?} at {x}: {v}");
            if x <= 50.0 {
                assert_eq!(v, 0.0);
            }
            if x >= 120.0 {
                assert_eq!(v, 0.25);
            }
        }
    }
}

#[test]
fn spring_is_zero_before_its_start() {
    let fps = Fps::new(60, 1).unwrap();
    let configs = [
        SpringConfig::default(),
        SpringConfig::new(100.0, 40.0, 1.0),
        SpringConfig::new(15.0, 10.0, 1.0),
        SpringConfig::new(60.0, 12.0, 3.0),
        SpringConfig::new(1.0, 300.0, 0.5),
    ];
    for cfg in configs {
        assert_eq!(spring(-1, fps, cfg), 0.0);
        assert_eq!(spring(-1000, fps, cfg), 0.0);
        assert_eq!(spring(0, fps, cfg), 0.0);
        assert!(spring(30, fps, cfg) > 0.0);
    }
}

#[test]
fn underdamped_spring_overshoots_then_settles() {
    let fps = Fps::new(60, 1).unwrap();
    let bouncy = SpringConfig::new(4.0, 200.0, 1.0);
    let peak = (0..240)
        .map(|f| spring(f, fps, bouncy))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.05, "peak {peak}");
    assert!((spring(1_200, fps, bouncy) - 1.0).abs() < 1e-3);
}

#[test]
fn crash_window_is_a_hard_range() {
    let timing = IntroTiming::default();
    let crashed: Vec<u64> = (0..300)
        .filter(|&f| timing.is_crashed(FrameIndex(f)))
        .collect();
    assert_eq!(crashed.first(), Some(&51));
    assert_eq!(crashed.last(), Some(&64));
    assert_eq!(crashed.len(), 14);
}

#[test]
fn frames_past_the_duration_still_evaluate() {
    let cfg = IntroConfig::default();
    let timeline = Timeline::new(&cfg);
    let last = timeline.frame_ctx(FrameIndex(cfg.duration - 1));
    let beyond = timeline.frame_ctx(FrameIndex(cfg.duration + 500));
    assert!(beyond.transition.is_finite());
    assert!(beyond.camera_zoom >= last.camera_zoom - 1e-9);
    assert!(!beyond.crashed);
}

#[test]
fn every_layer_sees_the_same_frame_context() {
    let cfg = IntroConfig::default();
    let timeline = Timeline::new(&cfg);
    let a = timeline.frame_ctx(FrameIndex(120));
    let b = timeline.frame_ctx(FrameIndex(120));
    assert_eq!(a.transition, b.transition);
    assert_eq!(a.shake, b.shake);
    assert_eq!(a.camera_zoom, b.camera_zoom);
}

#[test]
fn start_frames_beyond_i64_are_rejected_at_load() {
    for field in ["transition_start", "title_reveal_start", "title_exit_start"] {
        let json = format!(r#"{{"timing":{{"{field}":9223372036854775808}}}}"#);
        assert!(
            matches!(
                IntroConfig::from_reader(json.as_bytes()),
                Err(CyberfolioError::Validation(_))
            ),
            "{field}"
        );
    }
}

#[test]
fn extreme_frames_evaluate_without_overflow() {
    let mut cfg = IntroConfig::default();
    cfg.timing.transition_start = u64::MAX;
    let timeline = Timeline::new(&cfg);
    assert_eq!(timeline.transition_progress(FrameIndex(10)), 0.0);

    let cfg = IntroConfig::default();
    let far = Timeline::new(&cfg).frame_ctx(FrameIndex(u64::MAX));
    assert!(far.transition.is_finite());
    assert!(far.camera_zoom.is_finite());
}
