use crate::cli::CliArgs;
use chrono::Utc;
use jarvis_calendar::briefing::{run_briefing, Narrator};
use jarvis_calendar::calendar::{GoogleCalendarSource, TokenManager, UrgencyPolicy};
use jarvis_calendar::config::{parse_timezone, Config};
use jarvis_calendar::error::{config_error, Error};
use jarvis_calendar::narration::{audio_check_from_settings, NarrationConfig, SpdSaySink};
use jarvis_calendar::presenter::Presenter;
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging(level: Option<&str>) -> miette::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| config_error(&format!("Invalid log filter '{}': {}", level, e)))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the configuration and apply command line overrides
pub fn load_config(args: &CliArgs) -> miette::Result<Config> {
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            return Err(e.into());
        }
    };

    if let Some(tz) = &args.timezone {
        config.timezone = parse_timezone(tz)?;
    }

    Ok(config)
}

/// Build the real capabilities and run one briefing
pub async fn run(config: Config, args: &CliArgs) -> miette::Result<()> {
    let tz = config.timezone;
    let now = Utc::now().with_timezone(&tz);
    let presenter = Presenter::new(tz, config.locale.clone());
    let policy = UrgencyPolicy::from_days(config.settings.urgency_threshold_days);

    let token_manager = TokenManager::new(
        config.token_path.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    let source = GoogleCalendarSource::new(config.google_calendar_id.clone(), token_manager);

    let narrator = if args.print_only || !config.settings.speech.enabled {
        None
    } else {
        build_narrator(&config)?
    };

    let mut stdout = std::io::stdout();
    let outcome = run_briefing(&source, now, &presenter, policy, narrator, &mut stdout).await?;
    debug!("Narration outcome: {:?}", outcome);
    Ok(())
}

/// `None` when no speech command is installed
fn build_narrator(config: &Config) -> miette::Result<Option<Narrator>> {
    let speech = match SpdSaySink::from_settings(&config.settings.speech) {
        Ok(sink) => sink,
        Err(e) => {
            warn!("Skipping narration: {}", e);
            return Ok(None);
        }
    };
    let audio = audio_check_from_settings(&config.settings.audio)?;

    Ok(Some(Narrator {
        audio,
        speech: Box::new(speech),
        config: NarrationConfig::from(config.settings.narration),
    }))
}
