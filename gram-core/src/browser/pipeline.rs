use std::future::Future;

use tracing::info;

use crate::config::RunConfig;

use super::comment::leave_comment;
use super::error::BrowserResult;
use super::locator::open_first_post;
use super::login::login;
use super::session::{BrowserSession, PageSession, SessionLauncher};

/// Run the whole workflow once: bootstrap a session, drive the stages,
/// and release the session on every exit path.
pub async fn run_once(config: &RunConfig) -> BrowserResult<()> {
    let launcher = SessionLauncher::new(config.headless, config.user_data_dir.clone());
    let session = launcher.launch().await?;
    run_with_session(session, config, BrowserSession::close).await
}

/// Drive the stages and release the session through `close` no matter
/// how they end. A stage error takes precedence over anything that
/// happens during teardown.
async fn run_with_session<S, C, Fut>(
    mut session: S,
    config: &RunConfig,
    close: C,
) -> BrowserResult<()>
where
    S: PageSession,
    C: FnOnce(S) -> Fut,
    Fut: Future<Output = BrowserResult<()>>,
{
    let outcome = run_stages(&mut session, config).await;
    let teardown = close(session).await;
    outcome?;
    teardown
}

/// The strictly linear stage sequence. No stage is re-entered; the
/// first failure aborts the run.
pub async fn run_stages<S: PageSession>(session: &mut S, config: &RunConfig) -> BrowserResult<()> {
    login(session, &config.username, &config.password).await?;
    open_first_post(session, &config.profile_url).await?;
    leave_comment(session, &config.comment).await?;
    info!("automation run completed");
    Ok(())
}
