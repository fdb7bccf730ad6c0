use super::models::{RawEventTime, TimeWindow};
use crate::error::{fetch_error, AppResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Number of consecutive weeks covered by one run
pub const WEEKS_AHEAD: usize = 3;

/// Midnight of `date` in `tz`.
///
/// When midnight falls into a DST gap the first valid instant after it is used.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
        return dt;
    }
    // Gaps are at most a few hours; step forward until the wall clock exists
    (1..=24)
        .filter_map(|h| tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
        .next()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Monday 00:00 of the week containing `now`, in the zone of `now`
pub fn week_start(now: &DateTime<Tz>) -> DateTime<Tz> {
    let today = now.date_naive();
    let monday = today - Duration::days(now.weekday().num_days_from_monday() as i64);
    local_midnight(monday, now.timezone())
}

/// Current week, next week and the week after, as consecutive windows
pub fn build_windows(now: &DateTime<Tz>) -> [TimeWindow; WEEKS_AHEAD] {
    let tz = now.timezone();
    let monday = week_start(now).date_naive();

    std::array::from_fn(|i| {
        let offset = 7 * i as i64;
        TimeWindow {
            start: local_midnight(monday + Duration::days(offset), tz),
            end: local_midnight(monday + Duration::days(offset + 7), tz),
        }
    })
}

/// Resolved form of a raw start/end field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    At(DateTime<Tz>),
    AllDay(NaiveDate),
}

impl EventTime {
    /// Concrete instant; all-day dates become local midnight
    pub fn instant(&self, tz: Tz) -> DateTime<Tz> {
        match self {
            EventTime::At(dt) => *dt,
            EventTime::AllDay(date) => local_midnight(*date, tz),
        }
    }
}

/// Parse a raw start/end field, preferring `dateTime` over `date`
pub fn parse_event_time(raw: &RawEventTime, tz: Tz) -> AppResult<EventTime> {
    if let Some(date_time) = &raw.date_time {
        let dt = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| fetch_error(&format!("Failed to parse datetime '{}': {}", date_time, e)))?;
        Ok(EventTime::At(dt.with_timezone(&tz)))
    } else if let Some(date) = &raw.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| fetch_error(&format!("Failed to parse date '{}': {}", date, e)))?;
        Ok(EventTime::AllDay(date))
    } else {
        Err(fetch_error("Event time has neither dateTime nor date"))
    }
}
