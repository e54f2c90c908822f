use crate::features::webdriver_common::WebDriverConfig;
use std::path::PathBuf;
use std::time::Duration;

/// The catalog page listing every test.
pub const CATALOG_URL: &str = "https://www.avtodproc.com/hy-am/exam-tests";
/// Base url question images are served from.
pub const ASSET_BASE_URL: &str =
    "https://api.avtodproc.com/storage/uploads/exam-test-questions/";
/// Number of tests published in the catalog.
pub const CATALOG_SIZE: u32 = 63;
/// Display name prefix of a catalog entry, followed by the test number.
pub const LABEL_PREFIX: &str = "Թեստ";
/// Browser-like user agent sent with image downloads.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Where to click, relative to the element carrying the test label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ClickTarget {
    /// The labeled element itself.
    Element,
    /// The n-th ancestor of the labeled element. `Ancestor(0)` is the element itself.
    Ancestor(u8),
}

impl ClickTarget {
    /// The relative xpath deriving the target from the labeled element.
    pub fn xpath(&self) -> String {
        let mut xpath = String::from(".");
        for _ in 0..self.depth() {
            xpath.push_str("/..");
        }
        xpath
    }

    /// How many levels above the labeled element the target sits.
    pub fn depth(&self) -> u8 {
        match self {
            ClickTarget::Element => 0,
            ClickTarget::Ancestor(depth) => *depth,
        }
    }
}

/// Default click chain: the label, its parent, its grandparent.
pub fn default_click_targets() -> Vec<ClickTarget> {
    vec![
        ClickTarget::Element,
        ClickTarget::Ancestor(1),
        ClickTarget::Ancestor(2),
    ]
}

/// How an unspecified start test is resolved.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ResumePolicy {
    #[default]
    /// Continue after the highest persisted test, else at the cursor. Skipped
    /// tests below the highest record are not revisited.
    LatestRecord,
    /// Continue at the lowest test with no persisted record.
    FirstGap,
}

/// Bounded pauses used across the run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Delays {
    /// After navigating to the catalog.
    pub render_settle: Duration,
    /// After a successful click, before reading the capture.
    pub payload_settle: Duration,
    /// Between scrolling an element into view and clicking it.
    pub click_settle: Duration,
    /// Between extraction attempts.
    pub attempt_backoff: Duration,
    /// After a session restart.
    pub restart_settle: Duration,
    /// After the batch driver forces a restart.
    pub restart_backoff: Duration,
    /// Between two tests.
    pub inter_test: Duration,
    /// Max wait for the labeled element to appear.
    pub element_wait: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            render_settle: Duration::from_secs(3),
            payload_settle: Duration::from_secs(5),
            click_settle: Duration::from_millis(500),
            attempt_backoff: Duration::from_secs(3),
            restart_settle: Duration::from_secs(2),
            restart_backoff: Duration::from_secs(3),
            inter_test: Duration::from_secs(2),
            element_wait: Duration::from_secs(10),
        }
    }
}

impl Delays {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            render_settle: Duration::ZERO,
            payload_settle: Duration::ZERO,
            click_settle: Duration::ZERO,
            attempt_backoff: Duration::ZERO,
            restart_settle: Duration::ZERO,
            restart_backoff: Duration::ZERO,
            inter_test: Duration::ZERO,
            element_wait: Duration::ZERO,
        }
    }
}

/// Structure to configure a harvest run.
///
/// Loadable from a JSON file where every field is optional, see [`Configuration::load`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Directory holding records, images and the cursor.
    pub data_dir: PathBuf,
    /// The catalog page.
    pub catalog_url: String,
    /// Image base url, joined with the image filename.
    pub asset_base_url: String,
    /// Highest test number of the catalog.
    pub catalog_size: u32,
    /// Label prefix of a catalog entry.
    pub label_prefix: String,
    /// Extraction attempts per call.
    pub retries: usize,
    /// Consecutive errors tolerated on one test before skipping it.
    pub max_iteration_errors: usize,
    /// Ordered click targets tried on the labeled element.
    pub click_targets: Vec<ClickTarget>,
    /// Start resolution when no start is given.
    pub resume_policy: ResumePolicy,
    /// Pauses.
    pub delays: Delays,
    /// User agent for image downloads.
    pub user_agent: String,
    /// Image request timeout.
    pub image_timeout: Duration,
    /// Browser session settings.
    pub webdriver: WebDriverConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("scraped_data"),
            catalog_url: CATALOG_URL.to_string(),
            asset_base_url: ASSET_BASE_URL.to_string(),
            catalog_size: CATALOG_SIZE,
            label_prefix: LABEL_PREFIX.to_string(),
            retries: 3,
            max_iteration_errors: 5,
            click_targets: default_click_targets(),
            resume_policy: ResumePolicy::default(),
            delays: Delays::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            image_timeout: Duration::from_secs(10),
            webdriver: WebDriverConfig::default(),
        }
    }
}

impl Configuration {
    /// Represents harvest configurations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a configuration from a JSON file. Missing fields keep their defaults.
    pub async fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The display name of a test, used as title and click label.
    pub fn label(&self, test_number: u32) -> String {
        format!("{} {}", self.label_prefix, test_number)
    }

    /// Reject test numbers outside of the catalog.
    pub fn check_range(&self, test_number: u32) -> crate::Result<()> {
        if test_number == 0 || test_number > self.catalog_size {
            Err(crate::Error::OutOfRange(test_number, self.catalog_size))
        } else {
            Ok(())
        }
    }

    /// Set the data directory.
    pub fn with_data_dir(&mut self, data_dir: impl Into<PathBuf>) -> &mut Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Set the catalog page url.
    pub fn with_catalog_url(&mut self, catalog_url: &str) -> &mut Self {
        self.catalog_url = catalog_url.into();
        self
    }

    /// Set the image base url.
    pub fn with_asset_base_url(&mut self, asset_base_url: &str) -> &mut Self {
        self.asset_base_url = asset_base_url.into();
        self
    }

    /// Set the attempts per extraction call. A value of zero is raised to one.
    pub fn with_retries(&mut self, retries: usize) -> &mut Self {
        self.retries = retries.max(1);
        self
    }

    /// Set how many consecutive errors one test may raise before it is skipped.
    pub fn with_max_iteration_errors(&mut self, max: usize) -> &mut Self {
        self.max_iteration_errors = max.max(1);
        self
    }

    /// Set the ordered click targets.
    pub fn with_click_targets(&mut self, click_targets: Vec<ClickTarget>) -> &mut Self {
        self.click_targets = click_targets;
        self
    }

    /// Set the resume policy.
    pub fn with_resume_policy(&mut self, resume_policy: ResumePolicy) -> &mut Self {
        self.resume_policy = resume_policy;
        self
    }

    /// Set the pauses.
    pub fn with_delays(&mut self, delays: Delays) -> &mut Self {
        self.delays = delays;
        self
    }

    /// Set the user agent used for image downloads.
    pub fn with_user_agent(&mut self, user_agent: &str) -> &mut Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the browser session settings.
    pub fn with_webdriver(&mut self, webdriver: WebDriverConfig) -> &mut Self {
        self.webdriver = webdriver;
        self
    }

    /// Build the configuration.
    pub fn build(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_target_xpath() {
        assert_eq!(ClickTarget::Element.xpath(), ".");
        assert_eq!(ClickTarget::Ancestor(1).xpath(), "./..");
        assert_eq!(ClickTarget::Ancestor(2).xpath(), "./../..");
        assert_eq!(ClickTarget::Ancestor(0).xpath(), ".");
        assert_eq!(ClickTarget::Ancestor(0).depth(), ClickTarget::Element.depth());
    }

    #[test]
    fn test_label_and_range() {
        let config = Configuration::default();
        assert_eq!(config.label(7), "Թեստ 7");
        assert!(config.check_range(1).is_ok());
        assert!(config.check_range(63).is_ok());
        assert!(config.check_range(0).is_err());
        assert!(config.check_range(64).is_err());
    }

    #[test]
    fn test_resume_policy_parse() {
        assert_eq!(
            "first-gap".parse::<ResumePolicy>().ok(),
            Some(ResumePolicy::FirstGap)
        );
        assert_eq!(ResumePolicy::LatestRecord.to_string(), "latest-record");
    }

    #[test]
    fn test_configuration_serde() {
        let mut config = Configuration::new();
        config.with_retries(0).with_data_dir("out");
        assert_eq!(config.retries, 1);
        let json = serde_json::to_string(&config).unwrap();
        let back: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivetest.json");
        std::fs::write(
            &path,
            r#"{
                "retries": 5,
                "click_targets": ["Element", { "Ancestor": 3 }],
                "delays": { "inter_test": { "secs": 1, "nanos": 0 } },
                "webdriver": { "browser": "edge", "viewport_width": 1280 }
            }"#,
        )
        .unwrap();

        let config = Configuration::load(&path).await.unwrap();

        assert_eq!(config.retries, 5);
        assert_eq!(
            config.click_targets,
            vec![ClickTarget::Element, ClickTarget::Ancestor(3)]
        );
        assert_eq!(config.delays.inter_test, Duration::from_secs(1));
        assert_eq!(config.delays.render_settle, Delays::default().render_settle);
        assert_eq!(
            config.webdriver.browser,
            crate::features::webdriver_common::WebDriverBrowser::Edge
        );
        assert_eq!(config.webdriver.viewport_width, 1280);
        assert_eq!(config.webdriver.viewport_height, 1080);
        assert_eq!(config.catalog_size, CATALOG_SIZE);
    }

    #[tokio::test]
    async fn test_load_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Configuration::load(dir.path().join("absent.json")).await.is_err());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ retries").unwrap();
        assert!(matches!(
            Configuration::load(&path).await,
            Err(crate::Error::Json(_))
        ));
    }
}
