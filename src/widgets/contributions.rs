use crate::foundation::error::{CyberfolioError, CyberfolioResult};
use chrono::{Datelike, Days, NaiveDate};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::{collections::BTreeMap, sync::Arc, time::Duration};

/// Public contribution calendar API; `{endpoint}/{user}?y=last`.
pub const DEFAULT_ENDPOINT: &str = "https://github-contributions-api.jogruber.de/v4";

/// Glyphs for contribution levels 0..=4.
pub const LEVEL_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];

/// One calendar day.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContributionDay {
    /// Serialized as `YYYY-MM-DD`; impossible dates fail to decode.
    pub date: NaiveDate,
    pub count: u32,
    /// Intensity bucket in `0..=4`.
    pub level: u8,
}

/// Result of one fetch: the day list (oldest first) and the yearly total.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ContributionData {
    pub total: u32,
    pub days: Vec<ContributionDay>,
}

impl ContributionData {
    /// The zero state shown while loading or after a failure.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn streak(&self) -> u32 {
        current_streak(&self.days)
    }
}

/// Consecutive non-zero days ending at the most recent entry.
///
/// A zero on the very last day is skipped once (today may not be counted yet); any other
/// zero ends the streak.
pub fn current_streak(days: &[ContributionDay]) -> u32 {
    let rest = match days {
        [head @ .., last] if last.count == 0 => head,
        _ => days,
    };
    rest.iter().rev().take_while(|d| d.count > 0).count() as u32
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    total: BTreeMap<String, u32>,
    #[serde(default)]
    contributions: Vec<ContributionDay>,
}

/// Decode an API body. Levels above 4 are clamped; a missing `lastYear` total falls back
/// to the sum of the day counts.
pub fn parse_response(body: &str) -> CyberfolioResult<ContributionData> {
    let raw: ApiResponse = serde_json::from_str(body)?;
    let mut days = raw.contributions;
    for d in &mut days {
        d.level = d.level.min(4);
    }
    let total = raw
        .total
        .get("lastYear")
        .copied()
        .unwrap_or_else(|| days.iter().map(|d| d.count).sum());
    Ok(ContributionData { total, days })
}

/// Where contribution data comes from.
pub trait ContributionSource: Send + Sync {
    fn fetch(&self, user: &str) -> CyberfolioResult<ContributionData>;
}

/// Blocking HTTP source. Only ever called from the widget's fetch thread.
pub struct HttpContributionSource {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpContributionSource {
    pub fn new() -> CyberfolioResult<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> CyberfolioResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("cyberfolio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CyberfolioError::fetch(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn url_for(&self, user: &str) -> String {
        format!("{}/{}?y=last", self.endpoint, user)
    }
}

impl ContributionSource for HttpContributionSource {
    fn fetch(&self, user: &str) -> CyberfolioResult<ContributionData> {
        let url = self.url_for(user);
        tracing::debug!(%url, "fetching contributions");
        let body = self
            .client
            .get(&url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| CyberfolioError::fetch(format!("{url}: {e}")))?;
        parse_response(&body)
    }
}

/// Progress of the one fetch a widget makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchState {
    Loading,
    Ready,
    /// Fetch failed; the widget shows the zero state.
    Failed,
}

/// Contribution grid as mounted on the page.
///
/// Mounting starts exactly one fetch on a background thread; the result comes back over a
/// channel and is picked up by [`ContributionsWidget::poll`], which never blocks. The
/// thread never touches widget state. Dropping the widget abandons an in-flight fetch.
pub struct ContributionsWidget {
    user: String,
    rx: Option<Receiver<CyberfolioResult<ContributionData>>>,
    data: ContributionData,
    state: FetchState,
}

impl ContributionsWidget {
    pub fn mount(source: Arc<dyn ContributionSource>, user: impl Into<String>) -> Self {
        let user = user.into();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let thread_user = user.clone();
        let spawned = std::thread::Builder::new()
            .name("contributions-fetch".to_owned())
            .spawn(move || {
                // The widget may be gone by now; a closed channel is fine.
                let _ = tx.send(source.fetch(&thread_user));
            });

        let mut widget = Self {
            user,
            rx: Some(rx),
            data: ContributionData::empty(),
            state: FetchState::Loading,
        };
        if let Err(e) = spawned {
            widget.fail(&CyberfolioError::fetch(format!("spawn fetch thread: {e}")));
        }
        widget
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn data(&self) -> &ContributionData {
        &self.data
    }

    pub fn streak(&self) -> u32 {
        self.data.streak()
    }

    /// Pick up the fetch result if it has arrived. Returns `true` on the call that
    /// resolves the fetch.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = self.rx.as_ref() else {
            return false;
        };
        match rx.try_recv() {
            Ok(result) => self.resolve(result),
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.fail(&CyberfolioError::fetch("fetch thread ended without a result"));
                true
            }
        }
    }

    /// Block up to `timeout` for the result. For command-line use; the page only polls.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let Some(rx) = self.rx.as_ref() else {
            return false;
        };
        match rx.recv_timeout(timeout) {
            Ok(result) => self.resolve(result),
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                self.fail(&CyberfolioError::fetch("fetch thread ended without a result"));
                true
            }
        }
    }

    fn resolve(&mut self, result: CyberfolioResult<ContributionData>) -> bool {
        match result {
            Ok(data) => {
                tracing::debug!(
                    user = %self.user,
                    days = data.days.len(),
                    total = data.total,
                    "contributions loaded"
                );
                self.data = data;
                self.state = FetchState::Ready;
                self.rx = None;
            }
            Err(e) => self.fail(&e),
        }
        true
    }

    fn fail(&mut self, err: &CyberfolioError) {
        tracing::warn!(
            user = %self.user,
            error = %err,
            "contribution fetch failed, showing empty grid"
        );
        self.data = ContributionData::empty();
        self.state = FetchState::Failed;
        self.rx = None;
    }

    /// Terminal rendering: seven weekday rows (Sunday first), one column per week.
    pub fn grid_lines(&self) -> Vec<String> {
        render_grid(&weekly_grid(&self.data.days))
    }
}

/// Lay days out in week columns, Sunday on row 0.
///
/// Columns count whole weeks from the Sunday on or before the first day, so gaps in the
/// day list leave blank cells instead of shifting later days. Days earlier than the first
/// one are dropped.
pub fn weekly_grid(days: &[ContributionDay]) -> Vec<[Option<u8>; 7]> {
    let Some(first) = days.first() else {
        return Vec::new();
    };
    let lead = first.date.weekday().num_days_from_sunday();
    let origin = first.date - Days::new(u64::from(lead));
    let mut weeks: Vec<[Option<u8>; 7]> = Vec::new();
    for day in days {
        let Ok(column) = usize::try_from((day.date - origin).num_days() / 7) else {
            continue;
        };
        let row = day.date.weekday().num_days_from_sunday() as usize;
        if weeks.len() <= column {
            weeks.resize(column + 1, [None; 7]);
        }
        weeks[column][row] = Some(day.level.min(4));
    }
    weeks
}

pub fn render_grid(weeks: &[[Option<u8>; 7]]) -> Vec<String> {
    (0..7)
        .map(|row| {
            weeks
                .iter()
                .map(|w| w[row].map_or(' ', |l| LEVEL_GLYPHS[usize::from(l)]))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(counts: &[u32]) -> Vec<ContributionDay> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| ContributionDay {
                date: march(i as u32 + 1),
                count,
                level: count.min(4) as u8,
            })
            .collect()
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    struct Fixed(CyberfolioResult<ContributionData>);

    impl ContributionSource for Fixed {
        fn fetch(&self, _user: &str) -> CyberfolioResult<ContributionData> {
            match &self.0 {
                Ok(d) => Ok(d.clone()),
                Err(e) => Err(CyberfolioError::fetch(e.to_string())),
            }
        }
    }

    #[test]
    fn streak_counts_back_to_the_first_zero() {
        assert_eq!(current_streak(&days(&[5, 3, 0, 2, 1])), 2);
        assert_eq!(current_streak(&days(&[1, 1, 1])), 3);
    }

    #[test]
    fn streak_skips_only_a_trailing_zero() {
        assert_eq!(current_streak(&days(&[0, 4, 3, 0])), 2);
        assert_eq!(current_streak(&days(&[7, 0, 0])), 0);
        assert_eq!(current_streak(&days(&[0, 0])), 0);
        assert_eq!(current_streak(&days(&[0])), 0);
        assert_eq!(current_streak(&[]), 0);
    }

    #[test]
    fn parses_the_api_shape() {
        let body = r#"{
            "total": {"lastYear": 812},
            "contributions": [
                {"date": "2025-01-05", "count": 0, "level": 0},
                {"date": "2025-01-06", "count": 9, "level": 7}
            ]
        }"#;
        let data = parse_response(body).unwrap();
        assert_eq!(data.total, 812);
        assert_eq!(data.days[1].level, 4);
        assert_eq!(data.streak(), 1);
    }

    #[test]
    fn missing_total_falls_back_to_the_sum() {
        let data = parse_response(
            r#"{"contributions":[{"date":"2025-01-05","count":2,"level":1},{"date":"2025-01-06","count":3,"level":1}]}"#,
        )
        .unwrap();
        assert_eq!(data.total, 5);
    }

    #[test]
    fn garbage_is_a_serde_error() {
        assert!(matches!(
            parse_response("<html>"),
            Err(CyberfolioError::Serde(_))
        ));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        for date in ["2024-02-30", "2025-02-29", "2024-13-01", "yesterday"] {
            let body = format!(r#"{{"contributions":[{{"date":"{date}","count":1,"level":1}}]}}"#);
            assert!(
                matches!(parse_response(&body), Err(CyberfolioError::Serde(_))),
                "{date}"
            );
        }
        let leap = parse_response(r#"{"contributions":[{"date":"2024-02-29","count":1,"level":1}]}"#)
            .unwrap();
        assert_eq!(leap.days[0].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn grid_leaves_gaps_for_missing_days() {
        let sparse = vec![
            ContributionDay {
                date: march(1),
                count: 1,
                level: 1,
            },
            ContributionDay {
                date: march(10),
                count: 4,
                level: 3,
            },
        ];
        let weeks = weekly_grid(&sparse);
        // 2025-03-10 is the Monday two weeks after the Sunday before 2025-03-01.
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0][6], Some(1));
        assert_eq!(weeks[1], [None; 7]);
        assert_eq!(weeks[2][1], Some(3));
    }

    #[test]
    fn grid_pads_the_first_week() {
        // 2025-03-01 is a Saturday.
        let weeks = weekly_grid(&days(&[1, 2, 0]));
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0][6], Some(1));
        assert_eq!(weeks[0][0], None);
        assert_eq!(weeks[1][0], Some(2));
        assert_eq!(weeks[1][1], Some(0));

        let lines = render_grid(&weeks);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], " ▒");
        assert_eq!(lines[6], "░ ");
    }

    #[test]
    fn widget_delivers_the_fetch_result() {
        let data = ContributionData {
            total: 3,
            days: days(&[1, 2]),
        };
        let mut w = ContributionsWidget::mount(Arc::new(Fixed(Ok(data.clone()))), "someone");
        assert!(w.wait(Duration::from_secs(5)));
        assert_eq!(w.state(), FetchState::Ready);
        assert_eq!(w.data(), &data);
        assert_eq!(w.streak(), 2);
        assert!(!w.poll());
    }

    #[test]
    fn failed_fetch_shows_the_zero_state() {
        let mut w = ContributionsWidget::mount(
            Arc::new(Fixed(Err(CyberfolioError::fetch("offline")))),
            "someone",
        );
        assert!(w.wait(Duration::from_secs(5)));
        assert_eq!(w.state(), FetchState::Failed);
        assert!(w.data().is_empty());
        assert_eq!(w.data().total, 0);
        assert_eq!(w.streak(), 0);
        assert_eq!(w.grid_lines(), vec![String::new(); 7]);
    }

    #[test]
    fn url_targets_last_year() {
        let src = HttpContributionSource::with_endpoint("https://example.test/v4/").unwrap();
        assert_eq!(src.url_for("ritam"), "https://example.test/v4/ritam?y=last");
    }
}
