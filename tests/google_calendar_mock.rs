use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use chrono_tz::{Tz, UTC};
use jarvis_calendar::calendar::{
    build_windows, fetch_events, CalendarSource, RawEvent, RawEventTime, UrgencyPolicy,
};
use jarvis_calendar::error::{auth_error, fetch_error, AppResult, Error};
use jarvis_calendar::presenter::{Presenter, URGENT_MARKER};
use std::sync::Mutex;

/// Mock implementation of the Google Calendar source for testing
#[derive(Default)]
struct MockCalendarSource {
    events: Vec<RawEvent>,
    failure: Option<fn(&str) -> Error>,
    requests: Mutex<Vec<(DateTime<Tz>, DateTime<Tz>)>>,
}

impl MockCalendarSource {
    fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    fn failing(failure: fn(&str) -> Error) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }
}

#[async_trait]
impl CalendarSource for MockCalendarSource {
    async fn list_events(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<Vec<RawEvent>> {
        self.requests.lock().unwrap().push((start, end));
        if let Some(failure) = self.failure {
            return Err(failure("mock source unavailable"));
        }
        // Like the real API, return everything whose start is before the window end
        Ok(self
            .events
            .iter()
            .filter(|e| {
                let start_str = e.start.as_ref().and_then(|s| s.date_time.clone());
                match start_str {
                    Some(s) => DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt < end)
                        .unwrap_or(true),
                    None => true,
                }
            })
            .cloned()
            .collect())
    }
}

fn timed(id: &str, summary: Option<&str>, start: &str, end: &str) -> RawEvent {
    RawEvent {
        id: id.to_string(),
        summary: summary.map(str::to_string),
        status: Some("confirmed".to_string()),
        start: Some(RawEventTime::date_time(start)),
        end: Some(RawEventTime::date_time(end)),
    }
}

fn monday_morning() -> DateTime<Tz> {
    UTC.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

#[tokio::test]
async fn test_dentist_scenario() {
    let now = monday_morning();
    let source = MockCalendarSource::new(vec![timed(
        "dentist",
        Some("Dentist"),
        "2024-06-04T15:00:00Z",
        "2024-06-04T16:00:00Z",
    )]);

    let windows = build_windows(&now);
    assert_eq!(windows[0].start, UTC.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap());
    assert_eq!(windows[0].end, UTC.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());

    let events = fetch_events(&windows[0], &source, UTC).await.unwrap();
    let classified = UrgencyPolicy::default().classify_all(events, &now);
    assert_eq!(classified.len(), 1);
    assert!(classified[0].urgent);

    let presenter = Presenter::new(UTC, "en");
    let lines: Vec<String> = presenter.render(&classified).collect();
    assert!(lines[0].contains("Dentist"));
    assert!(lines[0].contains(URGENT_MARKER));
}

#[tokio::test]
async fn test_events_split_across_windows_in_order() {
    let now = monday_morning();
    let source = MockCalendarSource::new(vec![
        timed("a", Some("Standup"), "2024-06-03T10:00:00Z", "2024-06-03T10:15:00Z"),
        timed("c", Some("Review"), "2024-06-12T13:00:00Z", "2024-06-12T14:00:00Z"),
        timed("b", Some("Lunch"), "2024-06-05T11:00:00Z", "2024-06-05T12:00:00Z"),
        timed("d", Some("Trip"), "2024-06-20T08:00:00Z", "2024-06-21T08:00:00Z"),
        timed("e", Some("Later"), "2024-07-01T08:00:00Z", "2024-07-01T09:00:00Z"),
    ]);

    let mut per_window = Vec::new();
    for window in build_windows(&now).iter() {
        let events = fetch_events(window, &source, UTC).await.unwrap();
        per_window.push(events.into_iter().map(|e| e.id).collect::<Vec<_>>());
    }

    assert_eq!(per_window, vec![vec!["a", "b"], vec!["c"], vec!["d"]]);

    let requests = source.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].1, requests[1].0);
    assert_eq!(requests[1].1, requests[2].0);
}

#[tokio::test]
async fn test_all_day_and_malformed_records() {
    let now = monday_morning();
    let mut cancelled = timed(
        "x",
        Some("Cancelled"),
        "2024-06-04T09:00:00Z",
        "2024-06-04T10:00:00Z",
    );
    cancelled.status = Some("cancelled".to_string());
    let broken = RawEvent {
        id: "broken".to_string(),
        summary: Some("Broken".to_string()),
        status: None,
        start: Some(RawEventTime::date_time("not a time")),
        end: None,
    };
    let holiday = RawEvent {
        id: "holiday".to_string(),
        summary: None,
        status: None,
        start: Some(RawEventTime::date("2024-06-06")),
        end: Some(RawEventTime::date("2024-06-07")),
    };

    let source = MockCalendarSource::new(vec![cancelled, broken, holiday]);
    let window = build_windows(&now)[0];
    let events = fetch_events(&window, &source, UTC).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "holiday");
    assert!(events[0].all_day);
    assert_eq!(events[0].start, UTC.with_ymd_and_hms(2024, 6, 6, 0, 0, 0).unwrap());

    let classified = UrgencyPolicy::default().classify_all(events, &now);
    let presenter = Presenter::new(UTC, "en");
    assert_eq!(
        presenter.render_narration(&classified).collect::<Vec<_>>(),
        vec!["Untitled event on Thursday, all day."]
    );
}

#[tokio::test]
async fn test_empty_window_renders_nothing() {
    let now = monday_morning();
    let source = MockCalendarSource::new(Vec::new());
    let window = build_windows(&now)[1];

    let events = fetch_events(&window, &source, UTC).await.unwrap();
    let classified = UrgencyPolicy::default().classify_all(events, &now);
    let presenter = Presenter::new(UTC, "en");

    assert_eq!(presenter.render(&classified).count(), 0);
    assert_eq!(presenter.week_section(1, &classified), "Next week:\n  No events.\n");
}

#[tokio::test]
async fn test_source_failures_propagate_unchanged() {
    let now = monday_morning();
    let window = build_windows(&now)[0];

    let source = MockCalendarSource::failing(fetch_error);
    let err = fetch_events(&window, &source, UTC).await.unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
    assert_eq!(source.requests.lock().unwrap().len(), 1);

    let source = MockCalendarSource::failing(auth_error);
    let err = fetch_events(&window, &source, UTC).await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert_eq!(source.requests.lock().unwrap().len(), 1);
}
