//! Speaks rendered lines once an audio output device is available.
//!
//! Narration is synchronous: the calling thread is blocked while waiting for
//! the device and while each line is spoken.

pub mod audio;
pub mod speech;

pub use audio::{from_settings as audio_check_from_settings, AudioCheck, CommandAudioCheck};
pub use speech::{SpdSaySink, SpeechSink};

use crate::config::NarrationSettings;
use crate::error::{AppResult, Error};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Polling schedule for the audio readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        NarrationSettings::default().into()
    }
}

impl From<NarrationSettings> for NarrationConfig {
    fn from(settings: NarrationSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            max_wait: Duration::from_millis(settings.max_wait_ms),
        }
    }
}

impl NarrationConfig {
    /// Number of readiness checks before giving up, at least one
    pub fn max_polls(&self) -> u32 {
        let interval = self.poll_interval.as_millis().max(1);
        let polls = self.max_wait.as_millis().div_ceil(interval);
        polls.clamp(1, u32::MAX as u128) as u32
    }
}

/// Block until `audio` reports ready, checking at most `max_polls` times.
///
/// Checks are scheduled every `poll_interval` from the start of the wait and
/// the wait never outlasts `max_wait`, however long each check takes.
/// Returns the number of checks made.
pub fn wait_for_audio(audio: &mut dyn AudioCheck, config: &NarrationConfig) -> AppResult<u32> {
    let started = Instant::now();
    let max_polls = config.max_polls();
    let mut polls = 0;

    loop {
        polls += 1;
        if audio.is_ready() {
            debug!("Audio output ready after {} checks", polls);
            return Ok(polls);
        }
        if polls >= max_polls {
            break;
        }

        let elapsed = started.elapsed();
        if elapsed >= config.max_wait {
            break;
        }
        let next_check = config
            .poll_interval
            .checked_mul(polls)
            .unwrap_or(config.max_wait)
            .min(config.max_wait);
        if next_check > elapsed {
            thread::sleep(next_check - elapsed);
        }
    }

    Err(Error::AudioNotReady {
        waited_ms: started.elapsed().as_millis() as u64,
        polls,
    })
}

/// Speak `lines` in order once audio is ready.
///
/// An empty input returns immediately without touching the audio device.
pub fn narrate<I>(
    lines: I,
    audio: &mut dyn AudioCheck,
    speech: &mut dyn SpeechSink,
    config: &NarrationConfig,
) -> AppResult<()>
where
    I: IntoIterator<Item = String>,
{
    let mut lines = lines.into_iter().peekable();
    if lines.peek().is_none() {
        debug!("Nothing to narrate");
        return Ok(());
    }

    wait_for_audio(audio, config)?;

    let mut spoken = 0;
    for line in lines {
        speech.speak(&line)?;
        spoken += 1;
    }
    info!("Narrated {} lines", spoken);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config(poll_ms: u64, max_ms: u64) -> NarrationConfig {
        NarrationConfig {
            poll_interval: Duration::from_millis(poll_ms),
            max_wait: Duration::from_millis(max_ms),
        }
    }

    #[test]
    fn test_max_polls() {
        assert_eq!(fast_config(500, 5000).max_polls(), 10);
        assert_eq!(fast_config(500, 5200).max_polls(), 11);
        assert_eq!(fast_config(500, 0).max_polls(), 1);
        assert_eq!(NarrationConfig::default().max_polls(), 30);
    }

    #[test]
    fn test_speaks_lines_in_order_when_ready() {
        let mut checks = 0;
        let mut audio = || {
            checks += 1;
            checks >= 3
        };
        let mut spoken = Vec::new();
        let mut speech = |line: &str| -> AppResult<()> {
            spoken.push(line.to_string());
            Ok(())
        };

        let lines = vec!["first".to_string(), "second".to_string()];
        narrate(lines, &mut audio, &mut speech, &fast_config(1, 50)).unwrap();

        assert_eq!(checks, 3);
        assert_eq!(spoken, vec!["first", "second"]);
    }

    #[test]
    fn test_empty_input_skips_audio_wait() {
        let mut checks = 0;
        let mut audio = || {
            checks += 1;
            false
        };
        let mut calls = 0;
        let mut speech = |_: &str| -> AppResult<()> {
            calls += 1;
            Ok(())
        };

        narrate(Vec::new(), &mut audio, &mut speech, &fast_config(1, 10)).unwrap();
        assert_eq!(checks, 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_times_out_when_audio_never_ready() {
        let mut checks = 0;
        let mut audio = || {
            checks += 1;
            false
        };
        let mut calls = 0;
        let mut speech = |_: &str| -> AppResult<()> {
            calls += 1;
            Ok(())
        };

        let err = narrate(
            vec!["hello".to_string()],
            &mut audio,
            &mut speech,
            &fast_config(20, 200),
        )
        .unwrap_err();

        assert!(matches!(err, Error::AudioNotReady { polls: 10, .. }));
        assert_eq!(checks, 10);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_slow_checks_do_not_extend_the_wait() {
        let config = fast_config(10, 100);
        let mut checks = 0;
        let mut audio = || {
            checks += 1;
            thread::sleep(Duration::from_millis(60));
            false
        };

        let started = Instant::now();
        let err = wait_for_audio(&mut audio, &config).unwrap_err();
        let elapsed = started.elapsed();

        match err {
            Error::AudioNotReady { polls, waited_ms } => {
                assert!(polls < config.max_polls());
                assert!(waited_ms >= 100);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(checks <= 2);
        assert!(elapsed < Duration::from_millis(400));
    }

    #[test]
    fn test_speech_failure_stops_narration() {
        let mut audio = || true;
        let mut calls = 0;
        let mut speech = |_: &str| -> AppResult<()> {
            calls += 1;
            Err(crate::error::speech_error("synthesizer crashed"))
        };

        let lines = vec!["a".to_string(), "b".to_string()];
        let err = narrate(lines, &mut audio, &mut speech, &fast_config(1, 10)).unwrap_err();
        assert!(matches!(err, Error::Speech(_)));
        assert_eq!(calls, 1);
    }
}
