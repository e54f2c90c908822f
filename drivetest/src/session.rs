use crate::error::SessionError;
use crate::page::{Launcher, Page};
use crate::utils::pause;
use std::time::Duration;

/// Owns the single browser session of a run.
///
/// Every other component borrows the live [`Page`] through [`page`] and
/// never creates or tears down a session itself.
///
/// [`page`]: SessionController::page
pub struct SessionController<L: Launcher> {
    launcher: L,
    page: Option<L::Page>,
    restart_settle: Duration,
}

impl<L: Launcher> SessionController<L> {
    /// A controller with no session yet.
    pub fn new(launcher: L, restart_settle: Duration) -> Self {
        Self {
            launcher,
            page: None,
            restart_settle,
        }
    }

    /// Whether a session is live.
    pub fn is_started(&self) -> bool {
        self.page.is_some()
    }

    /// Create a fresh session, closing the current one first.
    pub async fn start(&mut self) -> Result<&L::Page, SessionError> {
        self.teardown().await;
        let page = self.launcher.launch().await?;
        Ok(self.page.insert(page))
    }

    /// Tear down and start again, then let the new session settle.
    pub async fn restart(&mut self) -> Result<&L::Page, SessionError> {
        log::info!("Restarting browser session...");
        self.teardown().await;
        let page = self.launcher.launch().await?;
        self.page = Some(page);
        pause(self.restart_settle).await;
        self.page.as_ref().ok_or(SessionError::NotStarted)
    }

    /// The live session, started on first use.
    pub async fn page(&mut self) -> Result<&L::Page, SessionError> {
        if self.page.is_none() {
            return self.start().await;
        }
        self.page.as_ref().ok_or(SessionError::NotStarted)
    }

    /// Close the session for good.
    pub async fn shutdown(&mut self) {
        self.teardown().await;
    }

    /// Quit the current session, swallowing errors.
    async fn teardown(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.quit().await {
                log::debug!("ignoring session teardown error: {}", e);
            }
        }
    }
}
