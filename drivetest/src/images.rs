use crate::error::{Error, Result};
use crate::storage::write_atomic;
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use unicode_normalization::UnicodeNormalization;

/// Windows reserved device names (case-insensitive, no extension)
fn is_windows_reserved_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    let upper = name.split('.').next().unwrap_or("").to_ascii_uppercase();
    RESERVED.contains(&upper.as_str())
}

/// Separators, characters Windows rejects, and control characters.
fn is_unsafe_char(ch: char) -> bool {
    matches!(
        ch,
        '\0' | '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*'
    ) || ch.is_control()
}

/// A name usable verbatim as one file name in a test folder.
fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with([' ', '.'])
        && !name.ends_with([' ', '.'])
        && !name.chars().any(is_unsafe_char)
        && !is_windows_reserved_name(name)
}

/// Turn an upstream image name into a single safe file name.
///
/// A name that is already safe is kept byte for byte, readers of the data
/// directory join the raw `image` field to the test folder. Anything else is
/// decoded (%XX), normalized NFC and scrubbed. Returns None when nothing
/// usable remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    if is_safe_component(raw) {
        return Some(raw.to_string());
    }

    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let normalized: Cow<str> = Cow::Owned(decoded.nfc().collect::<String>());

    // Separators are replaced too, the name never leaves its test folder.
    let mut out = String::with_capacity(normalized.len());
    for ch in normalized.chars() {
        out.push(if is_unsafe_char(ch) { '_' } else { ch });
    }

    // Trim spaces and dots (Windows unsafe at ends, and no "..")
    let out = out.trim_matches([' ', '.']).to_string();

    if out.is_empty() {
        return None;
    }

    let out = if is_windows_reserved_name(&out) {
        format!("{}_file", out)
    } else {
        out
    };

    Some(out)
}

/// Fetch bytes over HTTP.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET the url, failing on transport errors and non success statuses.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetch`] over a reqwest client with a browser-like user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the client.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Question images, one folder per test under `images/`.
#[derive(Clone)]
pub struct ImageStore {
    base_dir: PathBuf,
    base_url: String,
    fetcher: Arc<dyn Fetch>,
}

impl ImageStore {
    /// A new store writing below `base_dir` and fetching from `base_url`.
    pub fn new(base_dir: impl Into<PathBuf>, base_url: &str, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_url: base_url.to_string(),
            fetcher,
        }
    }

    /// Where an image of a test is stored.
    pub fn local_path(&self, image_name: &str, test_number: u32) -> Option<PathBuf> {
        let file_name = sanitize_filename(image_name)?;
        Some(self.test_dir(test_number).join(file_name))
    }

    /// The folder of a test.
    pub fn test_dir(&self, test_number: u32) -> PathBuf {
        self.base_dir.join(test_number.to_string())
    }

    /// Download an image once. An existing file is returned without any
    /// request. Failures are logged and yield `None`.
    pub async fn download(&self, image_name: &str, test_number: u32) -> Option<PathBuf> {
        if image_name.is_empty() {
            return None;
        }

        let path = match self.local_path(image_name, test_number) {
            Some(path) => path,
            None => {
                log::warn!("  Unusable image name: {:?}", image_name);
                return None;
            }
        };

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            log::info!("  Image already exists: {}", image_name);
            return Some(path);
        }

        let url = format!("{}{}", self.base_url, image_name);

        match self.fetch_to(&url, &path).await {
            Ok(_) => {
                log::info!(
                    "  Downloaded image: {} to test_{} folder",
                    image_name,
                    test_number
                );
                Some(path)
            }
            Err(Error::Status(status)) => {
                log::warn!(
                    "  Failed to download image: {} (Status: {})",
                    image_name,
                    status
                );
                None
            }
            Err(e) => {
                log::error!("  Error downloading image {}: {}", image_name, e);
                None
            }
        }
    }

    async fn fetch_to(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = self.fetcher.get_bytes(url).await?;
        // An existing file is trusted as complete, so it must only ever appear whole.
        write_atomic(path, &bytes).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("base_dir", &self.base_dir)
            .field("base_url", &self.base_url)
            .finish()
    }
}
