use crate::archive::build_archive;
use crate::configuration::{Configuration, ResumePolicy};
use crate::error::{Error, Result};
use crate::extractor::Harvest;
use crate::storage::DataStore;
use crate::utils::{banner, pause};

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Tests captured during this run.
    pub successful: usize,
    /// Tests given up on, in order.
    pub skipped: Vec<u32>,
    /// First test of the run.
    pub start: u32,
    /// Last test of the run.
    pub end: u32,
    /// Tests in the rebuilt archive.
    pub archived: usize,
}

/// Where a run without an explicit start begins.
pub async fn resolve_start(store: &DataStore, policy: ResumePolicy, catalog_size: u32) -> u32 {
    let existing = store.existing_tests(catalog_size).await;

    match policy {
        ResumePolicy::LatestRecord => {
            if let Some(latest) = existing.last() {
                log::info!("Found {} existing tests", existing.len());
                latest + 1
            } else {
                match store.load_progress().await {
                    Some(cursor) if (1..=catalog_size + 1).contains(&cursor) => {
                        log::info!("Resuming from saved progress at Test {}", cursor);
                        cursor
                    }
                    Some(cursor) => {
                        log::warn!("Ignoring saved progress outside of the catalog: {}", cursor);
                        1
                    }
                    None => 1,
                }
            }
        }
        ResumePolicy::FirstGap => {
            let gap = (1..=catalog_size)
                .zip(existing.iter().copied().chain(std::iter::repeat(0)))
                .find(|(expected, found)| expected != found)
                .map(|(expected, _)| expected)
                .unwrap_or(catalog_size + 1);
            log::info!("First missing test is Test {}", gap);
            gap
        }
    }
}

/// Walks a range of tests, escalating failures to session restarts.
pub struct BatchDriver<H: Harvest> {
    harvester: H,
    store: DataStore,
    config: Configuration,
}

impl<H: Harvest> BatchDriver<H> {
    /// A driver persisting into the configured data directory.
    pub fn new(harvester: H, config: &Configuration) -> Self {
        Self {
            harvester,
            store: DataStore::new(&config.data_dir),
            config: config.clone(),
        }
    }

    /// The harvester.
    pub fn harvester(&self) -> &H {
        &self.harvester
    }

    /// The harvester, mutably.
    pub fn harvester_mut(&mut self) -> &mut H {
        &mut self.harvester
    }

    /// Give the harvester back.
    pub fn into_inner(self) -> H {
        self.harvester
    }

    /// The data store.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Extract every test from `start` (resolved from disk when `None`) to
    /// `end`, then rebuild the archive and drop the cursor.
    ///
    /// The cursor is persisted before each test, so an interrupted run
    /// repeats at most the test it was on.
    pub async fn run(&mut self, start: Option<u32>, end: u32) -> Result<BatchReport> {
        self.config.check_range(end)?;

        let start = match start {
            Some(start) => {
                self.config.check_range(start)?;
                if start > end {
                    return Err(Error::InvalidRange(start, end));
                }
                start
            }
            None => {
                resolve_start(
                    &self.store,
                    self.config.resume_policy,
                    self.config.catalog_size,
                )
                .await
            }
        };

        self.store.ensure_dirs().await?;

        let mut report = BatchReport {
            start,
            end,
            ..Default::default()
        };

        if start > end {
            log::info!("Nothing left to extract up to Test {}", end);
        } else {
            log::info!("Starting extraction from Test {} to Test {}", start, end);
        }

        let mut current = start;
        let mut errors = 0;

        while current <= end {
            if let Err(e) = self.store.save_progress(current).await {
                log::warn!("Failed to save progress at Test {}: {}", current, e);
            }

            match self.iteration(current).await {
                Ok(captured) => {
                    if captured {
                        report.successful += 1;
                    } else {
                        log::warn!("Skipping Test {} after restart", current);
                        report.skipped.push(current);
                    }
                    current += 1;
                    errors = 0;
                    pause(self.config.delays.inter_test).await;
                }
                Err(e) => {
                    errors += 1;
                    log::error!("Error in main loop at Test {}: {}", current, e);

                    if errors >= self.config.max_iteration_errors {
                        log::error!(
                            "Skipping Test {} after {} consecutive errors",
                            current,
                            errors
                        );
                        report.skipped.push(current);
                        current += 1;
                        errors = 0;
                    }

                    self.recover().await;
                }
            }
        }

        report.archived = build_archive(&self.store, self.config.catalog_size).await?;
        self.store.clear_progress().await?;

        log::info!("{}", banner());
        log::info!("Extraction complete!");
        log::info!("Total tests extracted: {}", report.archived);
        log::info!("Captured this run: {}", report.successful);
        if !report.skipped.is_empty() {
            log::warn!("Skipped tests: {:?}", report.skipped);
        }
        log::info!("Data saved to: {}", self.store.root().display());
        log::info!("{}", banner());

        Ok(report)
    }

    /// One test: extract, and on failure restart and extract once more.
    async fn iteration(&mut self, test_number: u32) -> Result<bool> {
        if self.harvester.extract(test_number).await?.is_captured() {
            return Ok(true);
        }

        log::warn!(
            "Test {} failed, restarting the session and retrying once",
            test_number
        );
        self.harvester.restart().await?;
        pause(self.config.delays.restart_backoff).await;

        Ok(self.harvester.extract(test_number).await?.is_captured())
    }

    /// Restart after an error escaped an iteration.
    async fn recover(&mut self) {
        if let Err(e) = self.harvester.restart().await {
            log::error!("Session restart failed: {}", e);
        }
        pause(self.config.delays.restart_backoff).await;
    }
}
