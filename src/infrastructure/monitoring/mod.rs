//! Optional Sentry error reporting

use crate::infrastructure::config::SentryConfig;

/// Start Sentry when a DSN is configured; the guard flushes on drop
pub fn init_sentry(config: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.dsn.as_deref().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.environment.clone().map(Into::into),
            traces_sample_rate: 1.0,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        tracing::info!("Sentry initialized");
    } else {
        tracing::warn!("Sentry DSN rejected, error reporting disabled");
    }
    Some(guard)
}

/// Report a fatal error to Sentry, a no-op when it is not initialized
pub fn report_error(error: &(dyn std::error::Error + 'static)) {
    sentry::capture_error(error);
}
