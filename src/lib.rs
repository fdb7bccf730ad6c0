#[macro_use]
extern crate rust_i18n;

pub mod briefing;
pub mod calendar;
pub mod config;
pub mod error;
pub mod narration;
pub mod presenter;

// Initialize i18n
i18n!("locales", fallback = "en");
