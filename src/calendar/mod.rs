pub mod classify;
pub mod fetcher;
pub mod google;
pub mod models;
pub mod time;
pub mod token;

pub use classify::{classify, UrgencyPolicy};
pub use fetcher::{fetch_events, CalendarSource};
pub use google::GoogleCalendarSource;
pub use models::{CalendarEvent, ClassifiedEvent, RawEvent, RawEventTime, TimeWindow};
pub use time::build_windows;
pub use token::TokenManager;
