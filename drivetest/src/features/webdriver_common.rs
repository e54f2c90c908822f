use std::time::Duration;

/// The supported WebDriver browser types.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::EnumString,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum WebDriverBrowser {
    #[default]
    #[serde(rename = "chrome")]
    /// Google Chrome browser.
    Chrome,
    #[serde(rename = "edge")]
    /// Microsoft Edge browser.
    Edge,
}

/// Configuration for WebDriver connections.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// The WebDriver server URL (e.g., "http://localhost:9515").
    pub server_url: String,
    /// The browser to use for WebDriver sessions.
    pub browser: WebDriverBrowser,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Custom browser arguments appended after the defaults.
    pub browser_args: Option<Vec<String>>,
    /// Timeout for WebDriver commands.
    pub timeout: Option<Duration>,
    /// User agent string to use.
    pub user_agent: Option<String>,
    /// Viewport width.
    pub viewport_width: u32,
    /// Viewport height.
    pub viewport_height: u32,
    /// Page load strategy (normal, eager, none).
    pub page_load_strategy: Option<String>,
    /// Connection attempts before launching is reported as failed.
    pub connect_retries: usize,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9515".to_string(),
            browser: WebDriverBrowser::Chrome,
            headless: !cfg!(feature = "webdriver_headed"),
            browser_args: None,
            timeout: Some(Duration::from_secs(60)),
            user_agent: None,
            viewport_width: 1920,
            viewport_height: 1080,
            page_load_strategy: None,
            connect_retries: 10,
        }
    }
}

impl WebDriverConfig {
    /// Create a new WebDriverConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the WebDriver server URL.
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Set the browser type.
    pub fn with_browser(mut self, browser: WebDriverBrowser) -> Self {
        self.browser = browser;
        self
    }

    /// Set whether to run in headless mode.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set custom browser arguments.
    pub fn with_browser_args(mut self, args: Vec<String>) -> Self {
        self.browser_args = Some(args);
        self
    }

    /// Set the command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the viewport dimensions used in headless mode.
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the page load strategy.
    pub fn with_page_load_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.page_load_strategy = Some(strategy.into());
        self
    }

    /// Set how many times connecting to the server is attempted.
    pub fn with_connect_retries(mut self, connect_retries: usize) -> Self {
        self.connect_retries = connect_retries;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_parse() {
        assert_eq!("chrome".parse::<WebDriverBrowser>().ok(), Some(WebDriverBrowser::Chrome));
        assert_eq!("edge".parse::<WebDriverBrowser>().ok(), Some(WebDriverBrowser::Edge));
        assert!("firefox".parse::<WebDriverBrowser>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = WebDriverConfig::new()
            .with_server_url("http://127.0.0.1:4444")
            .with_headless(false)
            .with_viewport(800, 600)
            .build();
        assert_eq!(config.server_url, "http://127.0.0.1:4444");
        assert!(!config.headless);
        assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
    }
}
