use crate::calendar::classify::MAX_URGENCY_THRESHOLD_DAYS;
use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "config/jarvis.toml";

/// Main configuration structure for the assistant
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Google Calendar ID to read
    pub google_calendar_id: String,
    /// Where the OAuth token is stored
    pub token_path: PathBuf,
    /// Zone used as "local time"
    pub timezone: Tz,
    /// Message catalogue locale
    pub locale: String,
    /// Tunables from the settings file
    pub settings: Settings,
}

/// Tunables read from the optional TOML settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Events starting within this many days are urgent
    pub urgency_threshold_days: i64,
    pub narration: NarrationSettings,
    pub speech: SpeechSettings,
    pub audio: AudioSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            urgency_threshold_days: 2,
            narration: NarrationSettings::default(),
            speech: SpeechSettings::default(),
            audio: AudioSettings::default(),
        }
    }
}

/// How long to wait for an audio device before giving up on narration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    pub poll_interval_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            max_wait_ms: 15_000,
        }
    }
}

/// Text-to-speech options, passed to `spd-say`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub enabled: bool,
    pub command: String,
    /// Speech rate, -100..100
    pub rate: i32,
    pub voice: Option<String>,
    pub language: Option<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "spd-say".to_string(),
            rate: 0,
            voice: Some("male1".to_string()),
            language: Some("en".to_string()),
        }
    }
}

/// How audio readiness is detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBackend {
    /// Run the probe command
    #[default]
    Command,
    /// Ask cpal for a default output device (needs the `cpal-audio` feature)
    Cpal,
}

/// Audio readiness detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub backend: AudioBackend,
    /// Command whose successful exit means an output device is available
    pub probe: Vec<String>,
    /// A probe running longer than this counts as "not ready"
    pub probe_timeout_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            backend: AudioBackend::Command,
            probe: vec!["pactl".to_string(), "info".to_string()],
            probe_timeout_ms: 2_000,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text, filling in defaults for missing keys
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file that must exist
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Cannot read settings file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load settings from a file; a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> AppResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> AppResult<()> {
        if !(0..=MAX_URGENCY_THRESHOLD_DAYS).contains(&self.urgency_threshold_days) {
            return Err(config_error(&format!(
                "urgency_threshold_days must be between 0 and {}",
                MAX_URGENCY_THRESHOLD_DAYS
            )));
        }
        if self.narration.poll_interval_ms == 0 {
            return Err(config_error("narration.poll_interval_ms must be positive"));
        }
        if self.audio.backend == AudioBackend::Command && self.audio.probe.is_empty() {
            return Err(config_error("audio.probe must name a command"));
        }
        Ok(())
    }
}

/// Client secret file as downloaded from the Google Cloud console
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
}

/// Settings from an explicit path, or from the default path when it exists
pub fn load_settings(path: Option<&Path>) -> AppResult<Settings> {
    match path {
        Some(path) => Settings::load(path),
        None => Settings::load_or_default(Path::new(DEFAULT_SETTINGS_PATH)),
    }
}

/// Read client credentials from env vars, falling back to a client secret file
fn load_client_credentials() -> AppResult<(String, String)> {
    if let (Ok(id), Ok(secret)) = (
        env::var("GOOGLE_CLIENT_ID"),
        env::var("GOOGLE_CLIENT_SECRET"),
    ) {
        return Ok((id, secret));
    }

    let path = env::var("GOOGLE_CREDENTIALS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("credentials.json"));
    read_client_secret_file(&path)
}

fn read_client_secret_file(path: &Path) -> AppResult<(String, String)> {
    let content = fs::read_to_string(path).map_err(|e| {
        env_error(&format!(
            "GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET are not set and the client secret file {} \
             cannot be read: {}",
            path.display(),
            e
        ))
    })?;
    parse_client_secret(&content)
}

fn parse_client_secret(content: &str) -> AppResult<(String, String)> {
    let file: ClientSecretFile = serde_json::from_str(content)?;
    file.installed
        .or(file.web)
        .map(|c| (c.client_id, c.client_secret))
        .ok_or_else(|| config_error("Client secret file has no 'installed' or 'web' section"))
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| config_error(&format!("Invalid timezone: {}", name)))
}

impl Config {
    /// Load configuration from environment and settings file
    pub fn load(settings_path: Option<&Path>) -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let settings = load_settings(settings_path)?;
        let (google_client_id, google_client_secret) = load_client_credentials()?;

        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| String::from("primary"));
        let token_path = env::var("GOOGLE_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("token.json"));

        // Default timezone
        let timezone =
            parse_timezone(&env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC")))?;

        let locale = env::var("JARVIS_LOCALE").unwrap_or_else(|_| String::from("en"));

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            token_path,
            timezone,
            locale,
            settings,
        })
    }
}
