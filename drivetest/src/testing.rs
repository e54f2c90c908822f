//! Scripted browser used by the unit tests.

use crate::capture::{ARM_SCRIPT, FALLBACK_SCRIPT, READ_SCRIPT};
use crate::error::{Error, Result, SessionError};
use crate::images::Fetch;
use crate::page::{Launcher, Page};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeElement {
    pub depth: u8,
}

#[derive(Debug, Default)]
pub struct FakeState {
    /// The labeled element exists.
    pub label_present: bool,
    /// Click strategies that always fail ("click", "script", "pointer").
    pub broken: Vec<&'static str>,
    /// Element depths where every click fails.
    pub dead_depths: Vec<u8>,
    /// Payload staged by the interceptor once a click landed.
    pub fetch_payload: Option<serde_json::Value>,
    /// Value of the embedded page state script.
    pub next_data: Option<serde_json::Value>,
    /// Fail every navigation.
    pub goto_fails: bool,
    /// Set when the interceptor is armed and a click landed.
    pub staged: Option<serde_json::Value>,
    pub armed: bool,
    pub calls: Vec<String>,
    pub quits: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    pub fn with_state(state: FakeState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn attempt(&self, strategy: &'static str, element: &FakeElement) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{}:{}", strategy, element.depth));
        if state.broken.contains(&strategy) || state.dead_depths.contains(&element.depth) {
            return Err(Error::WebDriver(format!("{} intercepted", strategy)));
        }
        if state.armed {
            state.staged = state.fetch_payload.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl Page for FakePage {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("goto:{}", url));
        if state.goto_fails {
            return Err(Error::WebDriver("navigation failed".into()));
        }
        // A new document drops the interceptor and anything it staged.
        state.armed = false;
        state.staged = None;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let mut state = self.state.lock().unwrap();
        if script == ARM_SCRIPT {
            state.calls.push("arm".into());
            state.armed = true;
            Ok(serde_json::Value::Null)
        } else if script == READ_SCRIPT {
            Ok(state.staged.clone().unwrap_or_default())
        } else if script == FALLBACK_SCRIPT {
            Ok(state.next_data.clone().unwrap_or_default())
        } else {
            Ok(serde_json::Value::Null)
        }
    }

    async fn find_xpath(&self, xpath: &str, _timeout: Duration) -> Result<Option<FakeElement>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("find:{}", xpath));
        Ok(state.label_present.then_some(FakeElement { depth: 0 }))
    }

    async fn find_relative(&self, element: &FakeElement, xpath: &str) -> Result<FakeElement> {
        let up = xpath.matches("..").count() as u8;
        Ok(FakeElement {
            depth: element.depth + up,
        })
    }

    async fn scroll_into_view(&self, element: &FakeElement) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("scroll:{}", element.depth));
        Ok(())
    }

    async fn click(&self, element: &FakeElement) -> Result<()> {
        self.attempt("click", element)
    }

    async fn script_click(&self, element: &FakeElement) -> Result<()> {
        self.attempt("script", element)
    }

    async fn pointer_click(&self, element: &FakeElement) -> Result<()> {
        self.attempt("pointer", element)
    }

    async fn quit(&self) -> Result<()> {
        self.state.lock().unwrap().quits += 1;
        Ok(())
    }
}

/// Hands out pages sharing one scripted state.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    pub page: FakePage,
    pub launches: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    type Page = FakePage;

    async fn launch(&self) -> Result<FakePage, SessionError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SessionError::Launch("no browser".into()));
        }
        Ok(self.page.clone())
    }
}

/// Serves fixed bytes and counts requests.
#[derive(Debug, Default)]
pub struct CountingFetch {
    pub requests: AtomicUsize,
    pub status: Option<u16>,
}

impl CountingFetch {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for CountingFetch {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.status {
            Some(status) => Err(Error::Status(status)),
            None => Ok(url.as_bytes().to_vec()),
        }
    }
}

/// A raw `userExamTest` payload with two questions, the first with an image.
pub fn sample_payload() -> serde_json::Value {
    serde_json::json!({
        "exam_test": {
            "id": 411,
            "duration": 20,
            "questions": [
                {
                    "id": 9001,
                    "image": "sign.png",
                    "translation": { "title": "Ո՞ր նշանն է" },
                    "answers": [
                        { "id": 1, "translation": { "title": "Այո" }, "is_right": true },
                        { "id": 2, "translation": { "title": "Ոչ" }, "is_right": false }
                    ],
                    "explanation": {
                        "translation": { "title": "Բացատրություն", "description": "Կանոն 12" }
                    }
                },
                {
                    "id": 9003,
                    "translation": { "title": "Երկրորդ" },
                    "answers": [
                        { "id": 3, "translation": { "title": "Ա" }, "is_right": 1 },
                        { "id": 4, "translation": { "title": "Բ" }, "is_right": 1 }
                    ],
                    "explanation": { "translation": {} }
                }
            ]
        }
    })
}
