use crate::services::AdminError;

#[cfg(feature = "server")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second init (tests, embedded use) is not an error
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

pub fn log_failure(resource: &str, action: &str, error: &AdminError) {
    match error {
        AdminError::Validation(_) | AdminError::NotFound(_) => {
            tracing::info!(resource, action, error = %error, "request rejected");
        }
        _ => tracing::warn!(resource, action, error = %error, "request failed"),
    }
}

/// Capability failures (notifications, clipboard) are never surfaced.
pub fn log_capability_failure(capability: &str, reason: &str) {
    tracing::debug!(capability, reason, "capability unavailable");
}
