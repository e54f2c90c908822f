//! Side channel observing the page's own data requests.
//!
//! The catalog loads each test through a client-side `fetch` of the
//! next.js page data. [`arm`] wraps `window.fetch` so every JSON response
//! carrying the payload marker is copied to `window.capturedData`, while the
//! original response flows on untouched. [`read_fallback`] covers the case
//! where the test page is server rendered and the payload only lives in the
//! embedded `__NEXT_DATA__` script.

use crate::page::Page;
use serde_json::Value;

/// Field holding the page props of a next.js data response.
pub const PAGE_PROPS: &str = "pageProps";
/// Field of the page props identifying an exam test payload.
pub const PAYLOAD_MARKER: &str = "userExamTest";

/// Wraps `window.fetch`, staging responses that carry the payload marker.
pub const ARM_SCRIPT: &str = r#"
window.capturedData = null;
const originalFetch = window.fetch;
window.fetch = function(...args) {
    return originalFetch.apply(this, args).then(response => {
        const clonedResponse = response.clone();
        clonedResponse.json().then(data => {
            if (data && data.pageProps && data.pageProps.userExamTest) {
                window.capturedData = data;
            }
        }).catch(() => {});
        return response;
    });
};
"#;

/// Returns the staged response, if any.
pub const READ_SCRIPT: &str = "return window.capturedData;";

/// Returns the parsed `__NEXT_DATA__` page state, if any.
pub const FALLBACK_SCRIPT: &str = r#"
const scripts = document.querySelectorAll('script');
for (let script of scripts) {
    if (script.id === '__NEXT_DATA__') {
        return JSON.parse(script.textContent);
    }
}
return null;
"#;

/// Install the interceptor. Failures are logged, the caller keeps polling.
pub async fn arm<P: Page>(page: &P) {
    if let Err(e) = page.evaluate(ARM_SCRIPT).await {
        log::warn!("Failed to inject fetch interceptor: {}", e);
    }
}

/// The staged response, or `None` when nothing was captured yet.
pub async fn read<P: Page>(page: &P) -> Option<Value> {
    match page.evaluate(READ_SCRIPT).await {
        Ok(Value::Null) => None,
        Ok(data) => Some(data),
        Err(e) => {
            log::debug!("reading captured data failed: {}", e);
            None
        }
    }
}

/// The `props` of the embedded page state when it holds page props.
pub async fn read_fallback<P: Page>(page: &P) -> Option<Value> {
    match page.evaluate(FALLBACK_SCRIPT).await {
        Ok(mut next_data) => match next_data.get_mut("props") {
            Some(props) if props.get(PAGE_PROPS).is_some() => Some(props.take()),
            _ => None,
        },
        Err(e) => {
            log::debug!("reading embedded page state failed: {}", e);
            None
        }
    }
}

/// Select the exam test payload out of a captured response.
pub fn exam_payload(captured: &Value) -> Option<&Value> {
    captured
        .get(PAGE_PROPS)?
        .get(PAYLOAD_MARKER)
        .filter(|payload| !payload.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePage, FakeState};
    use serde_json::json;

    #[test]
    fn test_exam_payload() {
        let captured = json!({ "pageProps": { "userExamTest": { "exam_test": {} } } });
        assert_eq!(exam_payload(&captured), Some(&json!({ "exam_test": {} })));
        assert_eq!(exam_payload(&json!({ "pageProps": {} })), None);
        assert_eq!(exam_payload(&json!({ "pageProps": { "userExamTest": null } })), None);
        assert_eq!(exam_payload(&json!([1, 2])), None);
    }

    #[tokio::test]
    async fn test_read_absent_is_none() {
        let page = FakePage::default();
        arm(&page).await;
        assert_eq!(read(&page).await, None);
        assert_eq!(read_fallback(&page).await, None);
    }

    #[tokio::test]
    async fn test_read_fallback_props() {
        let page = FakePage::with_state(FakeState {
            next_data: Some(json!({
                "props": { "pageProps": { "userExamTest": { "exam_test": { "id": 1 } } } },
                "page": "/exam-tests/[id]"
            })),
            ..Default::default()
        });
        let props = read_fallback(&page).await.unwrap();
        assert_eq!(
            exam_payload(&props),
            Some(&json!({ "exam_test": { "id": 1 } }))
        );
    }

    #[tokio::test]
    async fn test_read_fallback_without_page_props() {
        let page = FakePage::with_state(FakeState {
            next_data: Some(json!({ "props": { "other": true } })),
            ..Default::default()
        });
        assert_eq!(read_fallback(&page).await, None);
    }
}
