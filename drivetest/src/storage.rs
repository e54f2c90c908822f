use crate::error::Result;
use crate::record::TestRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Combined archive file name.
pub const ARCHIVE_FILE: &str = "all_tests.json";
/// Progress cursor file name.
pub const PROGRESS_FILE: &str = "progress.txt";
/// Image folder name.
pub const IMAGES_DIR: &str = "images";

/// Layout of the data directory.
///
/// ```text
/// scraped_data/
///   test_<n>.json
///   all_tests.json
///   images/<n>/<file>
///   progress.txt
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    /// A store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the data and image directories.
    pub async fn ensure_dirs(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.images_dir()).await?;
        Ok(())
    }

    /// Record file of a test.
    pub fn record_path(&self, test_number: u32) -> PathBuf {
        self.root.join(format!("test_{}.json", test_number))
    }

    /// The combined archive.
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE)
    }

    /// The progress cursor.
    pub fn progress_path(&self) -> PathBuf {
        self.root.join(PROGRESS_FILE)
    }

    /// Root of the per-test image folders.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Persist a record. The file is replaced atomically so an interrupted
    /// write never leaves a truncated record behind.
    pub async fn write_record(&self, record: &TestRecord) -> Result<PathBuf> {
        let path = self.record_path(record.test_number);
        write_atomic(&path, record.to_json()?.as_bytes()).await?;
        Ok(path)
    }

    /// Read a persisted record, `None` when the test was never stored.
    pub async fn read_record(&self, test_number: u32) -> Result<Option<TestRecord>> {
        match tokio::fs::read(self.record_path(test_number)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Test numbers in `1..=catalog_size` with a record file, ascending.
    pub async fn existing_tests(&self, catalog_size: u32) -> Vec<u32> {
        let mut existing = Vec::new();
        for test_number in 1..=catalog_size {
            if tokio::fs::try_exists(self.record_path(test_number))
                .await
                .unwrap_or(false)
            {
                existing.push(test_number);
            }
        }
        existing
    }

    /// Persist the next test to attempt.
    pub async fn save_progress(&self, test_number: u32) -> Result<()> {
        write_atomic(&self.progress_path(), test_number.to_string().as_bytes()).await?;
        Ok(())
    }

    /// The persisted cursor, `None` when absent or unreadable.
    pub async fn load_progress(&self) -> Option<u32> {
        let content = tokio::fs::read_to_string(self.progress_path()).await.ok()?;
        content.trim().parse().ok()
    }

    /// Remove the cursor once a run completed.
    pub async fn clear_progress(&self) -> Result<()> {
        match tokio::fs::remove_file(self.progress_path()).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Write to a sibling temp file and rename it over the target.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}
