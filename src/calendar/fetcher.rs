use super::models::{CalendarEvent, RawEvent, TimeWindow};
use super::time::{parse_event_time, EventTime};
use crate::error::{fetch_error, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Anything that can list raw calendar records for a time range.
///
/// Implementations own authentication, pagination and transport retries.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Records intersecting `[start, end)`, ordered by start time
    async fn list_events(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> AppResult<Vec<RawEvent>>;
}

/// Turn a raw record into a [`CalendarEvent`]
pub fn normalize_event(raw: &RawEvent, tz: Tz) -> AppResult<CalendarEvent> {
    let start_raw = raw
        .start
        .as_ref()
        .ok_or_else(|| fetch_error(&format!("Event {} has no start", raw.id)))?;
    let start_time = parse_event_time(start_raw, tz)?;
    let start = start_time.instant(tz);
    let all_day = matches!(start_time, EventTime::AllDay(_));

    // All-day end dates are exclusive, so midnight of the end date is right
    let end = match &raw.end {
        Some(end_raw) => parse_event_time(end_raw, tz)?.instant(tz),
        None if all_day => start + Duration::days(1),
        None => start,
    };
    let end = if end < start {
        warn!("Event {} ends before it starts, clamping end to start", raw.id);
        start
    } else {
        end
    };

    Ok(CalendarEvent {
        id: raw.id.clone(),
        title: raw.summary.clone().unwrap_or_default(),
        start,
        end,
        all_day,
    })
}

/// Fetch the events starting inside `window`, ordered by start
pub async fn fetch_events(
    window: &TimeWindow,
    source: &dyn CalendarSource,
    tz: Tz,
) -> AppResult<Vec<CalendarEvent>> {
    let raw_events = source.list_events(window.start, window.end).await?;
    debug!("Source returned {} records for {} - {}", raw_events.len(), window.start, window.end);

    let mut events: Vec<CalendarEvent> = raw_events
        .iter()
        .filter(|raw| raw.status.as_deref() != Some("cancelled"))
        .filter_map(|raw| match normalize_event(raw, tz) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping event {}: {}", raw.id, e);
                None
            }
        })
        .filter(|event| window.contains(&event.start))
        .collect();

    events.sort_by_key(|e| e.start);
    Ok(events)
}
