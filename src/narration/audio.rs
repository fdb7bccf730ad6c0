use crate::config::{AudioBackend, AudioSettings};
use crate::error::{config_error, AppResult};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const PROBE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Fast check for an available audio output device
pub trait AudioCheck {
    fn is_ready(&mut self) -> bool;
}

impl<F> AudioCheck for F
where
    F: FnMut() -> bool,
{
    fn is_ready(&mut self) -> bool {
        self()
    }
}

/// Build the readiness check selected by `[audio] backend`
pub fn from_settings(settings: &AudioSettings) -> AppResult<Box<dyn AudioCheck + Send>> {
    match settings.backend {
        AudioBackend::Command => CommandAudioCheck::from_settings(settings)
            .map(|check| Box::new(check) as Box<dyn AudioCheck + Send>)
            .ok_or_else(|| config_error("audio.probe must name a command")),
        #[cfg(feature = "cpal-audio")]
        AudioBackend::Cpal => Ok(Box::new(CpalAudioCheck)),
        #[cfg(not(feature = "cpal-audio"))]
        AudioBackend::Cpal => Err(config_error(
            "audio.backend = \"cpal\" requires building with the cpal-audio feature",
        )),
    }
}

/// Ready when a probe command (e.g. `pactl info`) exits successfully
#[derive(Debug, Clone)]
pub struct CommandAudioCheck {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAudioCheck {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_millis(AudioSettings::default().probe_timeout_ms),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from the `[audio] probe` setting; `None` when it is empty
    pub fn from_settings(settings: &AudioSettings) -> Option<Self> {
        let (program, args) = settings.probe.split_first()?;
        Some(
            Self::new(program.clone(), args.to_vec())
                .with_timeout(Duration::from_millis(settings.probe_timeout_ms)),
        )
    }
}

impl AudioCheck for CommandAudioCheck {
    fn is_ready(&mut self) -> bool {
        // A probe that cannot be started, fails or hangs counts as "not ready"
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                debug!("Audio probe {} failed to start: {}", self.program, e);
                return false;
            }
        };

        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return status.success(),
                Ok(None) if started.elapsed() >= self.timeout => {
                    debug!(
                        "Audio probe {} still running after {:?}, killing it",
                        self.program, self.timeout
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return false;
                }
                Ok(None) => thread::sleep(PROBE_POLL_INTERVAL),
                Err(e) => {
                    debug!("Audio probe {} could not be waited on: {}", self.program, e);
                    let _ = child.kill();
                    return false;
                }
            }
        }
    }
}

/// Ready when the default cpal host has an output device
#[cfg(feature = "cpal-audio")]
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalAudioCheck;

#[cfg(feature = "cpal-audio")]
impl AudioCheck for CpalAudioCheck {
    fn is_ready(&mut self) -> bool {
        use cpal::traits::HostTrait;
        cpal::default_host().default_output_device().is_some()
    }
}
