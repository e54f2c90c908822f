use log::{info, log_enabled, Level};
use std::time::Duration;

/// Log to console if configuration verbose.
pub fn log(message: &'static str, data: impl AsRef<str>) {
    if log_enabled!(Level::Info) {
        info!("{message} - {}", data.as_ref());
    }
}

/// Sleep for the duration, skipping the timer entirely when it is zero.
pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Banner separating the log output of two tests.
pub(crate) fn banner() -> String {
    "=".repeat(50)
}
