use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while harvesting.
#[derive(Debug, Error)]
pub enum Error {
    /// The browser session could not be created or is gone.
    #[error("{0}")]
    Session(#[from] SessionError),
    /// A WebDriver command failed.
    #[error("webdriver: {0}")]
    WebDriver(String),
    /// File system failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// JSON encode or decode failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// HTTP transport failure.
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non success status.
    #[error("unexpected status {0}")]
    Status(u16),
    /// A test number outside of the catalog.
    #[error("test {0} is outside of the catalog 1..={1}")]
    OutOfRange(u32, u32),
    /// A range whose start lies after its end.
    #[error("start {0} is after end {1}")]
    InvalidRange(u32, u32),
}

/// Fatal session lifecycle errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The browser could not be launched.
    #[error("failed to launch browser session: {0}")]
    Launch(String),
    /// A command was issued with no live session.
    #[error("no browser session is running")]
    NotStarted,
}
