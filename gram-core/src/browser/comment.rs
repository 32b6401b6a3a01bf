use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::info;

use super::error::{BrowserError, BrowserResult};
use super::session::PageSession;
use super::wait::{wait_for_first, POLL_INTERVAL};

pub(crate) const COMMENT_BOX: &str = "textarea[aria-label='Add a comment…']";

const COMMENT_WAIT: Duration = Duration::from_secs(20);
/// Pause after submission so the request reaches the server before the
/// caller tears the session down.
const SUBMIT_SETTLE: Duration = Duration::from_secs(3);

/// Submit a comment on the currently open post.
pub async fn leave_comment<S: PageSession>(session: &mut S, comment: &str) -> BrowserResult<()> {
    let textarea = wait_for_first(session, COMMENT_BOX, COMMENT_WAIT, "comment input").await?;
    session.click(&textarea).await?;

    // Focusing the comment box makes the page swap the node out, so
    // re-locate it until the fresh one is ready for input.
    let textarea = wait_until_ready(session).await?;
    session.type_text(&textarea, comment).await?;
    session.submit(&textarea).await?;
    info!("comment submitted; waiting for the server to acknowledge");
    sleep(SUBMIT_SETTLE).await;
    Ok(())
}

async fn wait_until_ready<S: PageSession>(session: &mut S) -> BrowserResult<S::Element> {
    let deadline = Instant::now() + COMMENT_WAIT;
    loop {
        if let Some(element) = session.find(COMMENT_BOX).await?.into_iter().next() {
            if session.interactability(&element).await?.usable() {
                return Ok(element);
            }
        }
        if Instant::now() >= deadline {
            return Err(BrowserError::Timeout(
                "comment input to become clickable".into(),
            ));
        }
        sleep(POLL_INTERVAL).await;
    }
}
