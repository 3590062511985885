use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use cyberfolio::{
    AudioBackend, AudioToggle, ContributionData, ContributionDay, ContributionSource,
    ContributionsWidget, CyberfolioError, CyberfolioResult, ERROR_LABEL, FetchState, Marquee,
    SiteContent, current_streak, parse_response,
};

fn days(counts: &[u32]) -> Vec<ContributionDay> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| ContributionDay {
            date: NaiveDate::from_ymd_opt(2025, 3, i as u32 + 1).unwrap(),
            count,
            level: count.min(4) as u8,
        })
        .collect()
}

#[test]
fn streak_counts_the_trailing_run() {
    assert_eq!(current_streak(&days(&[3, 0, 2, 1])), 2);
    assert_eq!(current_streak(&days(&[5, 5, 5])), 3);
}

#[test]
fn a_single_trailing_zero_is_skipped_once() {
    assert_eq!(current_streak(&days(&[1, 1, 1, 0])), 3);
    assert_eq!(current_streak(&days(&[1, 0, 1, 0])), 1);
}

#[test]
fn two_trailing_zeros_break_the_streak() {
    assert_eq!(current_streak(&days(&[4, 4, 0, 0])), 0);
    assert_eq!(current_streak(&days(&[0, 0])), 0);
    assert_eq!(current_streak(&[]), 0);
}

#[test]
fn api_body_is_parsed() {
    let body = r#"{
        "total": {"2024": 10, "lastYear": 7},
        "contributions": [
            {"date": "2025-01-01", "count": 3, "level": 2},
            {"date": "2025-01-02", "count": 4, "level": 3}
        ]
    }"#;
    let data = parse_response(body).unwrap();
    assert_eq!(data.total, 7);
    assert_eq!(data.days.len(), 2);
    assert_eq!(data.streak(), 2);
}

struct Unreachable;

impl ContributionSource for Unreachable {
    fn fetch(&self, user: &str) -> CyberfolioResult<ContributionData> {
        Err(CyberfolioError::fetch(format!("{user}: connection refused")))
    }
}

#[test]
fn fetch_failure_renders_the_zero_state() {
    let mut w = ContributionsWidget::mount(Arc::new(Unreachable), "someone");
    assert_eq!(w.state(), FetchState::Loading);
    assert!(w.wait(Duration::from_secs(5)));
    assert_eq!(w.state(), FetchState::Failed);
    assert!(w.data().is_empty());
    assert_eq!(w.streak(), 0);
    assert_eq!(w.grid_lines().len(), 7);
}

struct Muted;

impl AudioBackend for Muted {
    fn play(&mut self) -> CyberfolioResult<()> {
        Err(CyberfolioError::audio("file missing"))
    }

    fn pause(&mut self) {}
}

#[test]
fn playback_failure_is_a_visible_state() {
    let content = SiteContent::default();
    let mut toggle = AudioToggle::new(Box::new(Muted), content.track_label);
    let st = toggle.toggle(0);
    assert!(st.has_error);
    assert!(!st.is_playing);
    assert_eq!(toggle.label(), ERROR_LABEL);
    assert_eq!(toggle.poll(), st);
}

#[test]
fn marquee_wraps_its_track() {
    let m = Marquee::new(SiteContent::default().skills);
    assert_eq!(m.track_px(), 1_280.0);
    // 64 s at 60 px/s is exactly three laps.
    assert_eq!(m.render_line(0, 40, 8.0), m.render_line(64_000, 40, 8.0));
    assert_ne!(m.render_line(0, 40, 8.0), m.render_line(1_000, 40, 8.0));
}

#[test]
fn marquee_with_no_usable_scale_renders_nothing() {
    let mut m = Marquee::new(SiteContent::default().skills);
    assert_eq!(m.render_line(2_000, 30, 0.0), " ".repeat(30));
    assert_eq!(m.render_line(2_000, 30, -1.0), " ".repeat(30));
    assert_eq!(m.render_line(2_000, 30, f64::NAN), " ".repeat(30));

    m.item_px = 0.0;
    assert!(m.visible(2_000, 1_280.0).is_empty());
    m.item_px = -40.0;
    assert!(m.visible(2_000, 1_280.0).is_empty());
    assert_eq!(m.render_line(2_000, 8, 8.0), " ".repeat(8));
}

#[test]
fn contribution_days_must_be_real_dates() {
    let body = r#"{"contributions":[{"date":"2024-02-30","count":1,"level":1}]}"#;
    assert!(matches!(parse_response(body), Err(CyberfolioError::Serde(_))));
    let ok = parse_response(r#"{"contributions":[{"date":"2024-02-29","count":1,"level":1}]}"#)
        .unwrap();
    assert_eq!(ok.days[0].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
}
