use crate::capture;
use crate::configuration::Configuration;
use crate::error::Result;
use crate::images::{Fetch, ImageStore};
use crate::interaction::click_targets;
use crate::normalize::Normalizer;
use crate::page::{Launcher, Page};
use crate::session::SessionController;
use crate::storage::DataStore;
use crate::utils::{banner, log, pause};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of extracting one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The payload was captured and the record persisted.
    Captured,
    /// Every attempt ran without capturing the payload.
    Exhausted,
    /// No click landed. The session is assumed stuck and should be restarted.
    Intercepted,
}

impl Extraction {
    /// Whether the test was persisted.
    pub fn is_captured(&self) -> bool {
        matches!(self, Extraction::Captured)
    }
}

/// What the batch driver drives: extract a test, or restart the session.
#[async_trait]
pub trait Harvest: Send {
    /// Extract and persist one test.
    async fn extract(&mut self, test_number: u32) -> Result<Extraction>;

    /// Replace the browser session with a fresh one.
    async fn restart(&mut self) -> Result<()>;
}

/// Outcome of a single attempt.
#[derive(Debug)]
enum Attempt {
    Captured,
    NotFound,
    ClickFailed,
    NoPayload,
}

/// Quote a string as an xpath literal.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Xpath of the catalog entry carrying `label`.
pub fn label_xpath(label: &str) -> String {
    format!(
        "//span[normalize-space(text())={}]",
        xpath_literal(label)
    )
}

/// Extracts tests through a browser session.
pub struct Extractor<L: Launcher> {
    session: SessionController<L>,
    normalizer: Normalizer,
    store: DataStore,
    config: Configuration,
}

#[cfg(feature = "webdriver")]
impl Extractor<crate::features::webdriver::WebDriverLauncher> {
    /// An extractor over a WebDriver session, downloading images over HTTP.
    pub fn webdriver(config: &Configuration) -> Result<Self> {
        let fetcher = crate::images::HttpFetcher::new(&config.user_agent, config.image_timeout)?;
        let launcher = crate::features::webdriver::WebDriverLauncher::new(config.webdriver.clone());
        Ok(Self::new(launcher, config, Arc::new(fetcher)))
    }
}

impl<L: Launcher> Extractor<L> {
    /// A new extractor. No session is started until the first extraction.
    pub fn new(launcher: L, config: &Configuration, fetcher: Arc<dyn Fetch>) -> Self {
        let store = DataStore::new(&config.data_dir);
        let images = ImageStore::new(store.images_dir(), &config.asset_base_url, fetcher);

        Self {
            session: SessionController::new(launcher, config.delays.restart_settle),
            normalizer: Normalizer::new(images, &config.label_prefix),
            store,
            config: config.clone(),
        }
    }

    /// The data store records are written to.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Close the browser session.
    pub async fn shutdown(&mut self) {
        self.session.shutdown().await;
    }

    /// Extract a test, retrying up to the configured bound. Never fails:
    /// errors are logged and spend an attempt.
    pub async fn extract_test(&mut self, test_number: u32) -> Extraction {
        let retries = self.config.retries.max(1);

        for attempt in 1..=retries {
            log::info!("{}", banner());
            log::info!(
                "Extracting Test {} (Attempt {}/{})",
                test_number,
                attempt,
                retries
            );
            log::info!("{}", banner());

            match self.attempt(test_number).await {
                Ok(Attempt::Captured) => return Extraction::Captured,
                Ok(Attempt::ClickFailed) => {
                    log::error!(
                        "Could not click Test {} on attempt {}, will restart the session",
                        test_number,
                        attempt
                    );
                    return Extraction::Intercepted;
                }
                Ok(Attempt::NotFound) => {
                    log::error!("Timeout on attempt {} for Test {}", attempt, test_number);
                }
                Ok(Attempt::NoPayload) => {
                    log::warn!(
                        "No data captured for Test {} on attempt {}",
                        test_number,
                        attempt
                    );
                }
                Err(e) => {
                    log::error!(
                        "Error on attempt {} for Test {}: {}",
                        attempt,
                        test_number,
                        e
                    );
                }
            }

            if attempt < retries {
                pause(self.config.delays.attempt_backoff).await;
            }
        }

        log::error!(
            "✗ Failed to extract Test {} after {} attempts",
            test_number,
            retries
        );

        Extraction::Exhausted
    }

    /// Navigate, arm, click, read, normalize and persist.
    async fn attempt(&mut self, test_number: u32) -> Result<Attempt> {
        let Self {
            session,
            normalizer,
            store,
            config,
        } = self;
        let delays = &config.delays;
        let page = session.page().await?;

        log("Navigating to", &config.catalog_url);
        page.goto(&config.catalog_url).await?;
        pause(delays.render_settle).await;

        capture::arm(page).await;

        let xpath = label_xpath(&config.label(test_number));
        let element = match page.find_xpath(&xpath, delays.element_wait).await? {
            Some(element) => element,
            None => return Ok(Attempt::NotFound),
        };

        if !click_targets(page, &element, &config.click_targets, delays.click_settle).await {
            return Ok(Attempt::ClickFailed);
        }

        pause(delays.payload_settle).await;

        let captured = match capture::read(page).await {
            Some(captured) => Some(captured),
            None => capture::read_fallback(page).await,
        };

        let payload = match captured.as_ref().and_then(capture::exam_payload) {
            Some(payload) => payload,
            None => return Ok(Attempt::NoPayload),
        };

        let record = normalizer.normalize(payload, test_number).await?;
        store.write_record(&record).await?;

        log::info!("✓ Successfully extracted Test {}", test_number);
        log::info!("  - Questions: {}", record.questions.len());
        log::info!("  - Duration: {} minutes", record.duration_minutes);
        log::info!("  - Max wrong answers: {}", record.max_wrong_answers);

        Ok(Attempt::Captured)
    }
}

#[async_trait]
impl<L: Launcher> Harvest for Extractor<L> {
    async fn extract(&mut self, test_number: u32) -> Result<Extraction> {
        Ok(self.extract_test(test_number).await)
    }

    async fn restart(&mut self) -> Result<()> {
        self.session.restart().await?;
        Ok(())
    }
}
