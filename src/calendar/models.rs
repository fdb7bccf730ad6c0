use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One calendar week, half-open `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    /// Whether `instant` falls inside the window
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// A calendar event with resolved start and end instants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// The source gave only a date; start is local midnight
    pub all_day: bool,
}

/// A calendar event tagged with its urgency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub event: CalendarEvent,
    pub urgent: bool,
}

/// Event record as returned by the Google Calendar events endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub start: Option<RawEventTime>,
    pub end: Option<RawEventTime>,
}

/// Either `dateTime` (RFC 3339) or `date` (all-day, `YYYY-MM-DD`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

impl RawEventTime {
    pub fn date_time(value: &str) -> Self {
        Self {
            date_time: Some(value.to_string()),
            ..Default::default()
        }
    }

    pub fn date(value: &str) -> Self {
        Self {
            date: Some(value.to_string()),
            ..Default::default()
        }
    }
}

/// One page of the events list response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<RawEvent>,
    pub next_page_token: Option<String>,
}
