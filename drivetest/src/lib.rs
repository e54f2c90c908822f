#![warn(missing_docs)]

//! Resumable harvester for the driving-exam practice test catalog.
//!
//! The catalog is a JavaScript rendered web client, so every test is
//! reached through an automated browser session: navigate to the
//! catalog, arm an in-page `fetch` interceptor, click the test entry and
//! poll for the captured payload. Each captured test is normalized into a
//! [`TestRecord`] and written to its own file before the batch moves on,
//! so a run can be killed at any point and picked up again.
//!
//! # How to use drivetest
//!
//! - [`BatchDriver::run`] walks a range of test numbers with a persisted
//!   cursor, restarting the browser session when a test keeps failing.
//! - [`Extractor`] is the production [`Harvest`] implementation driving a
//!   WebDriver session through [`SessionController`].
//! - [`build_archive`] rebuilds `all_tests.json` from the per-test files.
//!
//! [`TestRecord`]: record::TestRecord
//! [`BatchDriver::run`]: batch::BatchDriver::run
//! [`Extractor`]: extractor::Extractor
//! [`Harvest`]: extractor::Harvest
//! [`SessionController`]: session::SessionController
//! [`build_archive`]: archive::build_archive

extern crate log;
pub extern crate serde_json;
pub extern crate tokio;

/// Combined archive of every persisted test.
pub mod archive;
/// Batch driver iterating the catalog with a resumable cursor.
pub mod batch;
/// In-page capture of the exam payload.
pub mod capture;
/// Configuration structure for a harvest run.
pub mod configuration;
/// Error types.
pub mod error;
/// Per-test extraction state machine.
pub mod extractor;
/// Browser engine adapters.
pub mod features;
/// Image downloads.
pub mod images;
/// Layered click strategies.
pub mod interaction;
/// Raw payload to record mapping.
pub mod normalize;
/// Browser capability traits.
pub mod page;
/// Persisted record types.
pub mod record;
/// Browser session lifecycle.
pub mod session;
/// Data directory layout and cursor persistence.
pub mod storage;
/// Application utils.
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::build_archive;
pub use batch::{BatchDriver, BatchReport};
pub use configuration::{ClickTarget, Configuration, Delays, ResumePolicy};
pub use error::{Error, Result, SessionError};
pub use extractor::{Extraction, Extractor, Harvest};
pub use record::{AnswerRecord, Explanation, QuestionRecord, TestRecord};
pub use storage::DataStore;
