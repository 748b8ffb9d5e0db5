use std::{num::ParseIntError, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// True if the environment variable is set and not empty. False otherwise.
pub fn is_env_set(env_var: &str) -> bool {
    match std::env::var(env_var) {
        Ok(val) => !val.is_empty(),
        Err(_) => false,
    }
}

/// Sets the logging (tracing) level using RUST_LOG, falling back to the supplied default log settings.
pub fn setup_logging(default_log_settings: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_settings.into()))
        .with(tracing_subscriber::fmt::layer())
        .init()
}

#[derive(Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}

/// Retrieves the value of the environment variable as a duration, using the default when unset.
pub fn env_duration(units: TimeUnit, env_var_name: &str, default: u64) -> Result<Duration, ParseIntError> {
    let value = match std::env::var(env_var_name) {
        Ok(v) => v.trim().parse::<u64>()?,
        Err(_) => default,
    };

    let duration = match units {
        TimeUnit::Seconds => Duration::from_secs(value),
        TimeUnit::Milliseconds => Duration::from_millis(value),
    };
    Ok(duration)
}
