use crate::error::{Error, Result, SessionError};
use crate::features::webdriver_args::{get_browser_args, headless_args, EXCLUDED_SWITCHES};
use crate::features::webdriver_common::{WebDriverBrowser, WebDriverConfig};
use crate::page::{Launcher, Page};
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::common::capabilities::desiredcapabilities::Capabilities;
use thirtyfour::prelude::*;

impl From<WebDriverError> for Error {
    fn from(err: WebDriverError) -> Self {
        Error::WebDriver(err.to_string())
    }
}

/// Launches WebDriver sessions with the provided configuration.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    /// Session settings.
    pub config: WebDriverConfig,
}

impl WebDriverLauncher {
    /// A new launcher.
    pub fn new(config: WebDriverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    type Page = WebDriverPage;

    async fn launch(&self) -> Result<WebDriverPage, SessionError> {
        let driver = launch_driver(&self.config).await?;
        Ok(WebDriverPage::new(driver))
    }
}

/// Launch a WebDriver session, retrying the connection to the server.
pub async fn launch_driver(config: &WebDriverConfig) -> Result<WebDriver, SessionError> {
    let caps = build_capabilities(config);

    let mut attempts = 0;
    let max_retries = config.connect_retries;

    let driver = loop {
        match WebDriver::new(&config.server_url, caps.clone()).await {
            Ok(d) => break d,
            Err(err) => {
                log::error!("WebDriver connection error: {:?}", err);
                attempts += 1;
                if attempts > max_retries {
                    log::error!("Exceeded maximum retry attempts for WebDriver connection");
                    return Err(SessionError::Launch(err.to_string()));
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    };

    if !config.headless {
        if let Err(e) = driver.maximize_window().await {
            log::warn!("Failed to maximize window: {:?}", e);
        }
    }

    if let Some(timeout) = config.timeout {
        // Implicit waits stay at zero, element waits are explicit queries.
        let timeouts = TimeoutConfiguration::new(Some(timeout), Some(timeout), Some(Duration::ZERO));
        if let Err(e) = driver.update_timeouts(timeouts).await {
            log::warn!("Failed to set timeouts: {:?}", e);
        }
    }

    log::info!("Driver initialized successfully");

    Ok(driver)
}

/// Build browser capabilities based on configuration.
fn build_capabilities(config: &WebDriverConfig) -> Capabilities {
    match config.browser {
        WebDriverBrowser::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            apply_chromium_options(&mut caps, config);
            caps.into()
        }
        WebDriverBrowser::Edge => {
            let mut caps = DesiredCapabilities::edge();
            apply_chromium_options(&mut caps, config);
            caps.into()
        }
    }
}

/// Collect the arguments passed to a chromium based browser.
pub(crate) fn collect_args(config: &WebDriverConfig) -> Vec<String> {
    let mut args: Vec<String> = get_browser_args(&config.browser)
        .iter()
        .map(|arg| arg.to_string())
        .collect();

    if let Some(ref custom_args) = config.browser_args {
        args.extend(custom_args.clone());
    }

    if config.headless && !args.iter().any(|a| a.contains("headless")) {
        log::info!("Running in headless mode");
        args.extend(headless_args(config.viewport_width, config.viewport_height));
    }

    if let Some(ref ua) = config.user_agent {
        args.push(format!("--user-agent={}", ua));
    }

    args
}

/// Chrome and Edge share the chromium option set.
fn apply_chromium_options<C>(caps: &mut C, config: &WebDriverConfig)
where
    C: ChromiumLikeCapabilities + CapabilitiesHelper,
{
    if let Some(ref strategy) = config.page_load_strategy {
        let strategy = match strategy.as_str() {
            "eager" => thirtyfour::PageLoadStrategy::Eager,
            "none" => thirtyfour::PageLoadStrategy::None,
            _ => thirtyfour::PageLoadStrategy::Normal,
        };
        if let Err(e) = caps.set_page_load_strategy(strategy) {
            log::warn!("Failed to set page_load_strategy: {:?}", e);
        }
    }

    for arg in collect_args(config) {
        if let Err(e) = caps.add_arg(&arg) {
            log::warn!("Failed to add browser arg '{}': {:?}", arg, e);
        }
    }

    if let Err(e) = caps.add_experimental_option("excludeSwitches", EXCLUDED_SWITCHES) {
        log::warn!("Failed to set excludeSwitches: {:?}", e);
    }
    if let Err(e) = caps.add_experimental_option("useAutomationExtension", false) {
        log::warn!("Failed to set useAutomationExtension: {:?}", e);
    }

    // Keep the performance (network) event log of the session.
    if let Err(e) = caps.set_base_capability(
        "goog:loggingPrefs",
        serde_json::json!({ "performance": "ALL" }),
    ) {
        log::warn!("Failed to set goog:loggingPrefs: {:?}", e);
    }
}

/// A [`Page`] backed by a WebDriver session.
#[derive(Clone)]
pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    /// Wrap a connected driver.
    pub fn new(driver: WebDriver) -> Self {
        Self { driver }
    }

    /// Get the WebDriver instance.
    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    /// Run a script taking the element as `arguments[0]`.
    async fn execute_on(&self, script: &str, element: &WebElement) -> Result<()> {
        self.driver.execute(script, vec![element.to_json()?]).await?;
        Ok(())
    }
}

impl std::fmt::Debug for WebDriverPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverPage")
            .field("driver", &"WebDriver { ... }")
            .finish()
    }
}

#[async_trait]
impl Page for WebDriverPage {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<()> {
        Ok(self.driver.goto(url).await?)
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let ret = self.driver.execute(script, vec![]).await?;
        Ok(ret.json().clone())
    }

    async fn find_xpath(&self, xpath: &str, timeout: Duration) -> Result<Option<WebElement>> {
        Ok(self
            .driver
            .query(By::XPath(xpath))
            .wait(timeout, Duration::from_millis(100))
            .first_opt()
            .await?)
    }

    async fn find_relative(&self, element: &WebElement, xpath: &str) -> Result<WebElement> {
        Ok(element.find(By::XPath(xpath)).await?)
    }

    async fn scroll_into_view(&self, element: &WebElement) -> Result<()> {
        self.execute_on("arguments[0].scrollIntoView({block: 'center'});", element)
            .await
    }

    async fn click(&self, element: &WebElement) -> Result<()> {
        Ok(element.click().await?)
    }

    async fn script_click(&self, element: &WebElement) -> Result<()> {
        self.execute_on("arguments[0].click();", element).await
    }

    async fn pointer_click(&self, element: &WebElement) -> Result<()> {
        Ok(self
            .driver
            .action_chain()
            .move_to_element_center(element)
            .click()
            .perform()
            .await?)
    }

    async fn quit(&self) -> Result<()> {
        Ok(self.driver.clone().quit().await?)
    }
}
