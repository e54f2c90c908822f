//! Capabilities the harvester needs from a browser engine.
//!
//! The core never talks to an engine directly: the extractor, the
//! interaction layer and the capture bridge only see a [`Page`], and the
//! session controller only sees a [`Launcher`]. The WebDriver backend lives
//! in [`crate::features::webdriver`].

use crate::error::{Result, SessionError};
use async_trait::async_trait;
use std::time::Duration;

/// A live, rendered browser page.
#[async_trait]
pub trait Page: Send + Sync {
    /// Handle to an element of the page.
    type Element: Clone + Send + Sync;

    /// Navigate to a url.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Execute a script, returning its value as JSON (`null` when nothing is returned).
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Wait up to `timeout` for the first element matching `xpath`.
    async fn find_xpath(&self, xpath: &str, timeout: Duration) -> Result<Option<Self::Element>>;

    /// Resolve a relative xpath against an element.
    async fn find_relative(&self, element: &Self::Element, xpath: &str) -> Result<Self::Element>;

    /// Scroll the element to the center of the viewport.
    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    /// Native click through the engine's event dispatch.
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Click from page script, bypassing pointer events.
    async fn script_click(&self, element: &Self::Element) -> Result<()>;

    /// Pointer move to the element followed by a click.
    async fn pointer_click(&self, element: &Self::Element) -> Result<()>;

    /// End the session.
    async fn quit(&self) -> Result<()>;
}

/// Creates fresh [`Page`] sessions.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// The page type produced.
    type Page: Page;

    /// Launch a new session.
    async fn launch(&self) -> Result<Self::Page, SessionError>;
}
