use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use url::Url;

use super::error::{BrowserError, BrowserResult};
use super::session::PageSession;
use super::wait::{wait_for_first, POLL_INTERVAL};

pub(crate) const LOGIN_URL: &str = "https://www.instagram.com/accounts/login/";
const LOGIN_PATH: &str = "/accounts/login";
pub(crate) const USERNAME_FIELD: &str = "input[name='username']";
pub(crate) const PASSWORD_FIELD: &str = "input[name='password']";
/// Navigation link that only renders for an authenticated session.
pub(crate) const HOME_LANDMARK: &str = "a[href*='/explore/']";

const LOGIN_WAIT: Duration = Duration::from_secs(20);

fn on_login_path(current: &str) -> bool {
    match Url::parse(current) {
        Ok(parsed) => parsed.path().starts_with(LOGIN_PATH),
        Err(_) => current.contains(LOGIN_PATH),
    }
}

/// Drive the login form to completion, or confirm the session was
/// already authenticated. Either way the post-login landmark must
/// appear before this returns; its absence is a login failure.
pub async fn login<S: PageSession>(
    session: &mut S,
    username: &str,
    password: &str,
) -> BrowserResult<()> {
    session.navigate(LOGIN_URL).await?;

    // The page either renders the form fields or has already bounced us
    // off the login path (persistent profile with a live session).
    let deadline = Instant::now() + LOGIN_WAIT;
    loop {
        if !on_login_path(&session.current_url().await?) {
            break;
        }
        if !session.find(USERNAME_FIELD).await?.is_empty() {
            break;
        }
        if Instant::now() >= deadline {
            return Err(BrowserError::Timeout("login page to load".into()));
        }
        sleep(POLL_INTERVAL).await;
    }

    if !on_login_path(&session.current_url().await?) {
        debug!("session already authenticated; skipping credential entry");
        wait_for_first(session, HOME_LANDMARK, LOGIN_WAIT, "authenticated home view").await?;
        return Ok(());
    }

    let username_field = session
        .find(USERNAME_FIELD)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| BrowserError::Unexpected("username field disappeared after load".into()))?;
    let password_field = session
        .find(PASSWORD_FIELD)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| BrowserError::Unexpected("password field disappeared after load".into()))?;

    session.clear(&username_field).await?;
    session.type_text(&username_field, username).await?;
    session.clear(&password_field).await?;
    session.type_text(&password_field, password).await?;
    session.submit(&password_field).await?;
    info!("credentials submitted; waiting for the authenticated home view");

    // Dialogs may appear after the redirect; the landmark is the only
    // positive confirmation that login went through.
    wait_for_first(session, HOME_LANDMARK, LOGIN_WAIT, "authenticated home view").await?;
    Ok(())
}
