use super::models::{CalendarEvent, ClassifiedEvent};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Default urgency threshold in days
pub const DEFAULT_URGENCY_THRESHOLD_DAYS: i64 = 2;

/// Largest accepted urgency threshold in days
pub const MAX_URGENCY_THRESHOLD_DAYS: i64 = 365;

/// Decides which events are close enough to be urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyPolicy {
    threshold: Duration,
}

impl Default for UrgencyPolicy {
    fn default() -> Self {
        Self::from_days(DEFAULT_URGENCY_THRESHOLD_DAYS)
    }
}

impl UrgencyPolicy {
    /// Threshold of `days`, clamped to `0..=MAX_URGENCY_THRESHOLD_DAYS`
    pub fn from_days(days: i64) -> Self {
        Self {
            threshold: Duration::days(days.clamp(0, MAX_URGENCY_THRESHOLD_DAYS)),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Urgent when the event has not started yet and starts within the threshold
    pub fn is_urgent(&self, start: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
        let until_start = *start - *now;
        until_start >= Duration::zero() && until_start <= self.threshold
    }

    pub fn classify(&self, event: CalendarEvent, now: &DateTime<Tz>) -> ClassifiedEvent {
        let urgent = self.is_urgent(&event.start, now);
        ClassifiedEvent { event, urgent }
    }

    pub fn classify_all(
        &self,
        events: Vec<CalendarEvent>,
        now: &DateTime<Tz>,
    ) -> Vec<ClassifiedEvent> {
        events.into_iter().map(|e| self.classify(e, now)).collect()
    }
}

/// Classify with the default two-day threshold
pub fn classify(event: CalendarEvent, now: &DateTime<Tz>) -> ClassifiedEvent {
    UrgencyPolicy::default().classify(event, now)
}
