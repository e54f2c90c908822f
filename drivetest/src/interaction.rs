//! Clicking through overlays and animations.
//!
//! No single click strategy is reliable on the catalog page, so each
//! click runs three strategies from cheapest to most expensive and stops at
//! the first that lands. Failures are reported as `false`, never as errors.

use crate::configuration::ClickTarget;
use crate::page::Page;
use crate::utils::pause;
use std::time::Duration;

/// Click the element, falling back from a native click to a script click
/// to a pointer gesture.
pub async fn click<P: Page>(page: &P, element: &P::Element, settle: Duration) -> bool {
    let native = async {
        page.scroll_into_view(element).await?;
        pause(settle).await;
        page.click(element).await
    };

    match native.await {
        Ok(_) => return true,
        Err(e) => log::debug!("native click failed: {}", e),
    }

    match page.script_click(element).await {
        Ok(_) => return true,
        Err(e) => log::debug!("script click failed: {}", e),
    }

    match page.pointer_click(element).await {
        Ok(_) => true,
        Err(e) => {
            log::debug!("pointer click failed: {}", e);
            false
        }
    }
}

/// Click the first target derived from `element` that accepts a click.
pub async fn click_targets<P: Page>(
    page: &P,
    element: &P::Element,
    targets: &[ClickTarget],
    settle: Duration,
) -> bool {
    for target in targets {
        let derived = match target.depth() {
            0 => element.clone(),
            _ => match page.find_relative(element, &target.xpath()).await {
                Ok(derived) => derived,
                Err(e) => {
                    log::debug!("click target {:?} unavailable: {}", target, e);
                    continue;
                }
            },
        };

        if click(page, &derived, settle).await {
            return true;
        }
    }

    false
}
