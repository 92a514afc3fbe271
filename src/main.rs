//! Habit Nudge service entry point.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use habit_nudge::adapters::{
    InMemoryActivityLog, InMemoryPreferenceStore, LoggingNotificationChannel, SystemClock,
    TracingErrorSink, TracingOutcomePublisher, YamlPreferenceStore,
};
use habit_nudge::application::{
    HandlerRegistry, ReminderScheduler, SchedulerPorts, StretchHandler, WaterHandler,
};
use habit_nudge::config::AppConfig;
use habit_nudge::ports::PreferenceStore;

fn init_tracing(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));

    if config.is_production() {
        let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config)?;

    let preferences: Arc<dyn PreferenceStore> = match &config.storage.preferences_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using YAML preference store");
            Arc::new(YamlPreferenceStore::new(path))
        }
        None => {
            tracing::info!("Using in-memory preference store");
            Arc::new(InMemoryPreferenceStore::new())
        }
    };

    let ports = SchedulerPorts {
        preferences,
        channel: Arc::new(LoggingNotificationChannel::new()),
        activity_log: Arc::new(InMemoryActivityLog::new()),
        outcomes: Arc::new(TracingOutcomePublisher),
        errors: Arc::new(TracingErrorSink),
        clock: Arc::new(SystemClock),
    };
    let registry = HandlerRegistry::new()
        .with_handler(Arc::new(WaterHandler::new()))
        .with_handler(Arc::new(StretchHandler::new()));

    let scheduler = ReminderScheduler::new(ports, registry, config.streak.policy());
    let summary = scheduler.initialize_all().await?;
    tracing::info!(
        environment = ?config.service.environment,
        started = summary.started,
        "Habit Nudge running"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    scheduler.shutdown(config.service.shutdown_grace()).await;

    Ok(())
}
