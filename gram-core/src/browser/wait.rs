use std::time::Duration;

use tokio::time::{sleep, Instant};

use super::error::{BrowserError, BrowserResult};
use super::session::PageSession;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll a selector until it yields at least one match, returning the
/// first. Times out with a description of what was being awaited.
pub(crate) async fn wait_for_first<S: PageSession>(
    session: &mut S,
    selector: &str,
    timeout: Duration,
    what: &str,
) -> BrowserResult<S::Element> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(element) = session.find(selector).await?.into_iter().next() {
            return Ok(element);
        }
        if Instant::now() >= deadline {
            return Err(BrowserError::Timeout(what.to_string()));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Poll an already-held element until the page reports it displayed and
/// enabled.
pub(crate) async fn wait_until_usable<S: PageSession>(
    session: &mut S,
    element: &S::Element,
    timeout: Duration,
    what: &str,
) -> BrowserResult<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if session.interactability(element).await?.usable() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(BrowserError::Timeout(what.to_string()));
        }
        sleep(POLL_INTERVAL).await;
    }
}
