use crate::error::Result;
use crate::record::TestRecord;
use crate::storage::{write_atomic, DataStore};
use crate::utils::log;

/// Rebuild `all_tests.json` from every record file in `1..=catalog_size`.
///
/// Records are sorted by test number. A record that cannot be parsed is
/// logged and left out. Returns the number of archived tests.
pub async fn build_archive(store: &DataStore, catalog_size: u32) -> Result<usize> {
    let mut all_tests: Vec<TestRecord> = Vec::new();

    for test_number in store.existing_tests(catalog_size).await {
        match store.read_record(test_number).await {
            Ok(Some(record)) => all_tests.push(record),
            Ok(None) => (),
            Err(e) => log::warn!("Skipping unreadable test_{}.json: {}", test_number, e),
        }
    }

    all_tests.sort_by_key(|record| record.test_number);

    let json = serde_json::to_string_pretty(&all_tests)?;
    let archive_path = store.archive_path();
    write_atomic(&archive_path, json.as_bytes()).await?;
    log("Archive written", archive_path.to_string_lossy());

    log::info!("Created combined file with {} tests", all_tests.len());

    Ok(all_tests.len())
}
