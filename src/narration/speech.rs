use crate::config::SpeechSettings;
use crate::error::{speech_error, AppResult};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Synchronous text-to-speech output, one utterance per call
pub trait SpeechSink {
    fn speak(&mut self, text: &str) -> AppResult<()>;
}

impl<F> SpeechSink for F
where
    F: FnMut(&str) -> AppResult<()>,
{
    fn speak(&mut self, text: &str) -> AppResult<()> {
        self(text)
    }
}

/// Speaks through speech-dispatcher's `spd-say`, waiting for each utterance
#[derive(Debug, Clone)]
pub struct SpdSaySink {
    program: PathBuf,
    rate: i32,
    voice: Option<String>,
    language: Option<String>,
}

impl SpdSaySink {
    /// Locate the configured command on `PATH`
    pub fn from_settings(settings: &SpeechSettings) -> AppResult<Self> {
        let program = which::which(&settings.command).map_err(|e| {
            speech_error(&format!(
                "{} not found in PATH ({}); install speech-dispatcher",
                settings.command, e
            ))
        })?;

        Ok(Self {
            program,
            rate: settings.rate.clamp(-100, 100),
            voice: settings.voice.clone(),
            language: settings.language.clone(),
        })
    }

    /// Arguments passed for one utterance
    pub fn args(&self, text: &str) -> Vec<String> {
        let mut args = vec!["--wait".to_string(), "-r".to_string(), self.rate.to_string()];
        if let Some(voice) = &self.voice {
            args.push("-t".to_string());
            args.push(voice.clone());
        }
        if let Some(language) = &self.language {
            args.push("-l".to_string());
            args.push(language.clone());
        }
        // Keep text that starts with '-' from being read as a flag
        args.push("--".to_string());
        args.push(text.to_string());
        args
    }
}

impl SpeechSink for SpdSaySink {
    fn speak(&mut self, text: &str) -> AppResult<()> {
        debug!("Speaking: {}", text);
        let status = Command::new(&self.program)
            .args(self.args(text))
            .status()
            .map_err(|e| {
                speech_error(&format!("Failed to execute {}: {}", self.program.display(), e))
            })?;

        if !status.success() {
            return Err(speech_error(&format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }
        Ok(())
    }
}
