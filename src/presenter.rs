//! Turns classified events into terminal lines and spoken sentences.

use crate::calendar::models::ClassifiedEvent;
use chrono::{DateTime, Datelike, Timelike, Weekday};
use chrono_tz::Tz;

/// Appended to urgent events in both render modes
pub const URGENT_MARKER: &str = "URGENT!";

/// Titles longer than this are not used to widen the title column
const MAX_TITLE_COLUMN: usize = 40;

/// Renders events in the configured zone and message locale
#[derive(Debug, Clone)]
pub struct Presenter {
    tz: Tz,
    locale: String,
}

impl Presenter {
    pub fn new(tz: Tz, locale: impl Into<String>) -> Self {
        Self {
            tz,
            locale: locale.into(),
        }
    }

    fn text(&self, key: &str) -> String {
        t!(key, locale = self.locale.as_str()).to_string()
    }

    /// Title, or the untitled placeholder when it is blank
    pub fn title(&self, event: &ClassifiedEvent) -> String {
        let title = event.event.title.trim();
        if title.is_empty() {
            self.text("untitled_event")
        } else {
            title.to_string()
        }
    }

    pub fn weekday_name(&self, weekday: Weekday) -> String {
        let key = match weekday {
            Weekday::Mon => "weekday_mon",
            Weekday::Tue => "weekday_tue",
            Weekday::Wed => "weekday_wed",
            Weekday::Thu => "weekday_thu",
            Weekday::Fri => "weekday_fri",
            Weekday::Sat => "weekday_sat",
            Weekday::Sun => "weekday_sun",
        };
        self.text(key)
    }

    /// Terminal lines with the title column aligned
    pub fn render<'a>(
        &'a self,
        events: &'a [ClassifiedEvent],
    ) -> impl Iterator<Item = String> + 'a {
        let width = events
            .iter()
            .map(|e| self.title(e).chars().count())
            .filter(|len| *len <= MAX_TITLE_COLUMN)
            .max()
            .unwrap_or(0);

        events.iter().map(move |e| self.terminal_line(e, width))
    }

    /// One spoken sentence per event
    pub fn render_narration<'a>(
        &'a self,
        events: &'a [ClassifiedEvent],
    ) -> impl Iterator<Item = String> + 'a {
        events.iter().map(move |e| self.narration_line(e))
    }

    pub fn terminal_line(&self, event: &ClassifiedEvent, width: usize) -> String {
        let start = event.event.start.with_timezone(&self.tz);
        let day = format!(
            "{} {}",
            self.weekday_name(start.weekday()),
            start.format(&self.text("terminal_date_format"))
        );
        let when = if event.event.all_day {
            format!("{} {}", day, self.text("all_day"))
        } else {
            format!("{} {}", day, start.format(&self.text("terminal_time_format")))
        };

        let mut line = format!("  {:<width$}  {}", self.title(event), when, width = width);
        if event.urgent {
            line.push_str("  ");
            line.push_str(URGENT_MARKER);
        }
        line
    }

    pub fn narration_line(&self, event: &ClassifiedEvent) -> String {
        let start = event.event.start.with_timezone(&self.tz);
        let title = self.title(event);
        let day = self.weekday_name(start.weekday());

        let mut line = if event.event.all_day {
            t!(
                "narration_all_day_event",
                locale = self.locale.as_str(),
                title = title,
                day = day
            )
            .to_string()
        } else {
            let time = start.format(&self.text("narration_time_format")).to_string();
            t!(
                "narration_event",
                locale = self.locale.as_str(),
                title = title,
                day = day,
                time = time
            )
            .to_string()
        };
        if event.urgent {
            line.push(' ');
            line.push_str(URGENT_MARKER);
        }
        line
    }

    /// Greeting for the local time of day
    pub fn greeting(&self, now: &DateTime<Tz>) -> String {
        let hour = now.with_timezone(&self.tz).hour();
        let key = match hour {
            5..=11 => "greeting_morning",
            12..=17 => "greeting_afternoon",
            _ => "greeting_evening",
        };
        self.text(key)
    }

    pub fn welcome(&self, now: &DateTime<Tz>) -> String {
        let greeting = self.greeting(now);
        t!("welcome", locale = self.locale.as_str(), greeting = greeting).to_string()
    }

    /// "This week", "Next week", "Week after next"
    pub fn week_label(&self, index: usize) -> String {
        match index {
            0 => self.text("week_this"),
            1 => self.text("week_next"),
            _ => self.text("week_after_next"),
        }
    }

    /// Labelled block of terminal lines for one week
    pub fn week_section(&self, index: usize, events: &[ClassifiedEvent]) -> String {
        let mut section = format!("{}:\n", self.week_label(index));
        if events.is_empty() {
            section.push_str("  ");
            section.push_str(&self.text("no_events"));
            section.push('\n');
        } else {
            for line in self.render(events) {
                section.push_str(&line);
                section.push('\n');
            }
        }
        section
    }

    /// Spoken sentences for one week, led by its label
    pub fn week_narration(&self, index: usize, events: &[ClassifiedEvent]) -> Vec<String> {
        let label = self.week_label(index);
        let heading = t!("narration_week", locale = self.locale.as_str(), label = label);
        let mut lines = vec![heading.to_string()];
        if events.is_empty() {
            lines.push(self.text("no_events"));
        } else {
            lines.extend(self.render_narration(events));
        }
        lines
    }
}
