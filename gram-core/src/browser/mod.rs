mod bootstrap;
mod comment;
mod error;
mod locator;
mod login;
mod pipeline;
mod session;
mod wait;

#[cfg(test)]
pub(crate) mod fake;

pub use bootstrap::{is_recoverable_startup, launch_plan, launch_with_plan, LaunchAttempt};
pub use comment::leave_comment;
pub use error::{BrowserError, BrowserResult};
pub use locator::open_first_post;
pub use login::login;
pub use pipeline::{run_once, run_stages};
pub use session::{BrowserSession, Interactability, PageSession, SessionLauncher};
