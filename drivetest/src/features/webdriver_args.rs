use super::webdriver_common::WebDriverBrowser;

/// Chromium arguments hiding automation signals and suppressing popups.
pub(crate) static CHROMIUM_WEBDRIVER_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-popup-blocking",
    "--no-first-run",
    "--disable-notifications",
    "--disable-dev-shm-usage",
    "--no-sandbox",
    "--disable-default-apps",
    "--disable-prompt-on-repost",
    "--mute-audio",
];

/// Switches chromedriver adds that reveal automation.
pub(crate) static EXCLUDED_SWITCHES: &[&str] = &["enable-automation"];

/// Get the default arguments for a browser type.
pub(crate) fn get_browser_args(browser: &WebDriverBrowser) -> &'static [&'static str] {
    match browser {
        WebDriverBrowser::Chrome | WebDriverBrowser::Edge => CHROMIUM_WEBDRIVER_ARGS,
    }
}

/// Arguments added when running without a visible window.
pub(crate) fn headless_args(width: u32, height: u32) -> [String; 2] {
    [
        "--headless".to_string(),
        format!("--window-size={},{}", width, height),
    ]
}
