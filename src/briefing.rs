//! One complete briefing: fetch the three weeks, print them, then narrate.

use crate::calendar::{build_windows, fetch_events, CalendarSource, UrgencyPolicy};
use crate::error::{other_error, AppResult, Error};
use crate::narration::{narrate, AudioCheck, NarrationConfig, SpeechSink};
use crate::presenter::Presenter;
use chrono::DateTime;
use chrono_tz::Tz;
use std::io::Write;
use tracing::{error, info, warn};

/// Capabilities needed to speak the briefing
pub struct Narrator {
    pub audio: Box<dyn AudioCheck + Send>,
    pub speech: Box<dyn SpeechSink + Send>,
    pub config: NarrationConfig,
}

/// How the spoken part of a briefing ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationOutcome {
    Spoken,
    /// No narrator was supplied
    Skipped,
    /// No audio device appeared in time; events were printed only
    AudioNotReady,
    /// Speech failed part way through
    Stopped(String),
}

/// Print the welcome and all three weeks to `out`, then narrate them.
///
/// Any fetch failure aborts before narration. Narration failures are logged
/// and reported through the outcome, never as an error.
pub async fn run_briefing(
    source: &dyn CalendarSource,
    now: DateTime<Tz>,
    presenter: &Presenter,
    policy: UrgencyPolicy,
    narrator: Option<Narrator>,
    out: &mut dyn Write,
) -> AppResult<NarrationOutcome> {
    let tz = now.timezone();

    let welcome = presenter.welcome(&now);
    writeln!(out, "{}\n", welcome)?;
    let mut narration_lines = vec![welcome];

    for (index, window) in build_windows(&now).iter().enumerate() {
        info!(
            "Fetching {} ({} - {})",
            presenter.week_label(index),
            window.start,
            window.end
        );
        let events = match fetch_events(window, source, tz).await {
            Ok(events) => events,
            Err(e) => {
                error!("Failed to fetch events: {}", e);
                return Err(e);
            }
        };

        let classified = policy.classify_all(events, &now);
        writeln!(out, "{}", presenter.week_section(index, &classified))?;
        narration_lines.extend(presenter.week_narration(index, &classified));
    }
    out.flush()?;

    let Some(narrator) = narrator else {
        info!("Narration disabled, printed output only");
        return Ok(NarrationOutcome::Skipped);
    };

    let Narrator {
        mut audio,
        mut speech,
        config,
    } = narrator;
    let result = tokio::task::spawn_blocking(move || {
        narrate(narration_lines, audio.as_mut(), speech.as_mut(), &config)
    })
    .await
    .map_err(|e| other_error(&format!("Narration task failed: {}", e)))?;

    match result {
        Ok(()) => Ok(NarrationOutcome::Spoken),
        Err(e @ Error::AudioNotReady { .. }) => {
            warn!("{}; events were printed only", e);
            Ok(NarrationOutcome::AudioNotReady)
        }
        Err(e) => {
            warn!("Narration stopped: {}", e);
            Ok(NarrationOutcome::Stopped(e.to_string()))
        }
    }
}
