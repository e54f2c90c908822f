/// WebDriver session backend.
#[cfg(feature = "webdriver")]
pub mod webdriver;
/// WebDriver browser arguments.
pub mod webdriver_args;
/// WebDriver configuration.
pub mod webdriver_common;
