use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use super::error::{BrowserError, BrowserResult};
use super::session::PageSession;
use super::wait::{wait_for_first, wait_until_usable};

const CONTENT_REGION: &str = "main";

/// Selector strategies for the first post link, most specific first.
/// The markup shifts between rollouts, so every strategy gets a chance
/// each iteration.
pub(crate) const POST_SELECTORS: [&str; 3] = [
    "article a[href*='/p/']",
    "main section a[href*='/p/']",
    "main div[role='presentation'] a[href*='/p/']",
];

const CONTENT_WAIT: Duration = Duration::from_secs(20);
const CLICK_WAIT: Duration = Duration::from_secs(5);
const SCAN_ITERATIONS: usize = 10;
const SCROLL_STEP: f64 = 400.0;
const SCROLL_PAUSE: Duration = Duration::from_millis(500);

/// Open the first visible post on a profile page, tolerating lazy
/// rendering by scrolling and re-polling up to a fixed bound.
pub async fn open_first_post<S: PageSession>(
    session: &mut S,
    profile_url: &str,
) -> BrowserResult<()> {
    session.navigate(profile_url).await?;
    wait_for_first(session, CONTENT_REGION, CONTENT_WAIT, "profile content region").await?;

    for iteration in 0..SCAN_ITERATIONS {
        for selector in POST_SELECTORS {
            let Some(candidate) = session.find(selector).await?.into_iter().next() else {
                continue;
            };
            match try_open(session, &candidate).await {
                Ok(()) => {
                    info!(iteration, selector, "opened first post");
                    return Ok(());
                }
                Err(error) => {
                    // Stale nodes and click-wait timeouts are routine on a
                    // still-rendering grid; move on to the next strategy.
                    debug!(iteration, selector, error = %error, "post candidate unusable");
                }
            }
        }
        session.scroll_by(SCROLL_STEP).await?;
        sleep(SCROLL_PAUSE).await;
    }

    Err(BrowserError::Content(
        "could not locate any posts on the profile page".into(),
    ))
}

async fn try_open<S: PageSession>(session: &mut S, candidate: &S::Element) -> BrowserResult<()> {
    session.scroll_into_view(candidate).await?;
    wait_until_usable(session, candidate, CLICK_WAIT, "post link to become clickable").await?;
    session.click(candidate).await
}
