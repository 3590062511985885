use cyberfolio::{
    Color, FRAME_INTERVAL_MS, MountedSphere, PointerEvent, SphereProps, SphereSlot, WidgetHost,
};

fn props(color: Color) -> SphereProps {
    SphereProps {
        color,
        size: 60,
        ..SphereProps::default()
    }
}

#[test]
fn mounting_twice_leaves_a_single_loop_cadence() {
    let host = WidgetHost::new();
    let first = MountedSphere::mount(&host, props(Color::rgb(255, 42, 85)), 0);
    host.run_until(0);
    drop(first);
    let second = MountedSphere::mount(&host, props(Color::rgb(0, 255, 170)), 0);

    assert_eq!(host.active_loops(), 1);
    assert_eq!(host.active_listeners(), 1);

    for t in 0..=2_000 {
        host.run_until(t);
    }
    // One loop at a 33 ms cadence over 0..=2000.
    assert_eq!(second.frames_rendered(), 2_000 / FRAME_INTERVAL_MS + 1);
}

#[test]
fn color_changes_rebuild_instead_of_stacking() {
    let host = WidgetHost::new();
    let mut slot = SphereSlot::new(host.clone(), props(Color::rgb(255, 42, 85)), 0);
    for (i, c) in [Color::rgb(1, 2, 3), Color::rgb(4, 5, 6), Color::rgb(7, 8, 9)]
        .into_iter()
        .enumerate()
    {
        slot.set_props(props(c), 100 * i as u64);
        assert_eq!(host.active_loops(), 1);
        assert_eq!(host.active_listeners(), 1);
        assert_eq!(host.live_contexts(), 1);
    }
    assert_eq!(slot.mounts(), 4);
    host.run_until(1_000);
    let frame = slot.mounted().unwrap().latest_frame().unwrap();
    assert_eq!(frame.color, Color::rgb(7, 8, 9));
}

#[test]
fn pointer_input_reaches_only_the_live_mount() {
    let host = WidgetHost::new();
    let mut slot = SphereSlot::new(host.clone(), props(Color::WHITE), 0);
    slot.set_props(props(Color::BLACK), 0);
    host.dispatch(PointerEvent::Down { x: 10.0, y: 10.0 });
    host.dispatch(PointerEvent::Move { x: 40.0, y: 10.0 });
    host.dispatch(PointerEvent::Up);
    host.run_until(0);
    let frame = slot.mounted().unwrap().latest_frame().unwrap();
    assert_eq!(frame.rows.len(), 9);
    assert!(frame.rows.iter().all(|r| r.chars().count() == 9));
}

#[test]
fn unavailable_context_never_blocks() {
    let host = WidgetHost::with_context_limit(0);
    let sphere = MountedSphere::mount(&host, SphereProps::default(), 0);
    assert!(sphere.is_inert());
    host.dispatch(PointerEvent::Up);
    assert_eq!(host.run_until(10_000), 0);
    assert_eq!(sphere.frames_rendered(), 0);
}

#[test]
fn remounting_restarts_the_bob_cycle() {
    let fresh_host = WidgetHost::new();
    let fresh = MountedSphere::mount(&fresh_host, props(Color::WHITE), 0);
    fresh_host.run_until(0);
    let expected = fresh.latest_frame().unwrap();

    let host = WidgetHost::new();
    let mut slot = SphereSlot::new(host.clone(), props(Color::BLACK), 0);
    for t in 0..=1_234 {
        host.run_until(t);
    }
    slot.set_props(props(Color::WHITE), 1_234);
    assert_eq!(slot.mounted().unwrap().mounted_at_ms(), 1_234);
    host.run_until(1_234);
    let frame = slot.mounted().unwrap().latest_frame().unwrap();

    assert_eq!(frame.at_ms, 1_234);
    assert_eq!(frame.rows, expected.rows);
}
