//! # Structured Logging Module
//!
//! Environment-aware `tracing` setup plus structured helpers for resolution and session events.

use crate::config::LoggingSettings;
use crate::constants::env;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    init_with_options(None, false);
}

/// Initialize logging with an explicit level (falls back to the environment default) and
/// optional JSON output. Only the first call in a process has any effect.
pub fn init_with_options(level: Option<&str>, json: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = level
            .map(str::to_string)
            .unwrap_or_else(|| get_log_level(&environment));
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A host application may already own the global subscriber
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing");
        }

        tracing::info!(
            environment = %environment,
            level = %log_level,
            json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Initialize logging from the `[logging]` section of the importer configuration
pub fn init_from_settings(settings: &LoggingSettings) {
    init_with_options(settings.level.as_deref(), settings.json);
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(env::ENVIRONMENT)
        .or_else(|_| std::env::var(env::FALLBACK_ENVIRONMENT))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log one step of the fallback chain
pub fn log_resolution_step(
    session_id: &str,
    step: &str,
    url: &str,
    context: &str,
    outcome: &str,
) {
    tracing::debug!(
        session_id = %session_id,
        step = %step,
        url = %url,
        context = %context,
        outcome = %outcome,
        "🔎 RESOLUTION_STEP"
    );
}

/// Log a session lifecycle transition
pub fn log_session_operation(
    operation: &str,
    session_id: &str,
    handle: Option<u64>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        session_id = %session_id,
        handle = handle,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🌉 SESSION_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
