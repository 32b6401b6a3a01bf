use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::{BrowserError, BrowserResult};

pub(crate) const HEADLESS_FALLBACK_WARNING: &str =
    "Chromium failed to start headless; retrying with a visible browser window.";
pub(crate) const PROFILE_FALLBACK_WARNING: &str =
    "Chromium failed to start with the persistent profile; retrying without it.";

/// Startup failure symptoms worth another attempt: a debugging-port
/// conflict or an early crash. Anything else is fatal on first sight.
const RECOVERABLE_SYMPTOMS: [&str; 3] =
    ["DevToolsActivePort", "crashed", "Address already in use"];

/// One configured try at starting a session. The warning, when set, is
/// emitted if this attempt fails recoverably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAttempt {
    pub headless: bool,
    pub user_data_dir: Option<PathBuf>,
    pub warning: Option<&'static str>,
}

/// Build the ordered attempt list for a launch: the preferred
/// configuration first, then a visible-mode fallback when headless was
/// requested, then a profile-less fallback when a persistent profile
/// was requested.
pub fn launch_plan(headless: bool, user_data_dir: Option<&Path>) -> Vec<LaunchAttempt> {
    let user_data_dir = user_data_dir.map(Path::to_path_buf);
    let mut attempts = vec![LaunchAttempt {
        headless,
        user_data_dir: user_data_dir.clone(),
        warning: None,
    }];

    if headless {
        attempts.push(LaunchAttempt {
            headless: false,
            user_data_dir: user_data_dir.clone(),
            warning: Some(HEADLESS_FALLBACK_WARNING),
        });
    }

    if user_data_dir.is_some() {
        attempts.push(LaunchAttempt {
            headless: false,
            user_data_dir: None,
            warning: Some(PROFILE_FALLBACK_WARNING),
        });
    }

    attempts
}

pub fn is_recoverable_startup(symptom: &str) -> bool {
    RECOVERABLE_SYMPTOMS
        .iter()
        .any(|marker| symptom.contains(marker))
}

/// Try the attempts strictly in order until one yields a session.
///
/// An unrecognized startup failure aborts immediately with zero further
/// attempts; a recoverable one emits the attempt's warning and moves
/// on. When every attempt fails, the last observed error is returned.
pub async fn launch_with_plan<S, F, Fut>(
    attempts: &[LaunchAttempt],
    mut try_launch: F,
) -> BrowserResult<S>
where
    F: FnMut(LaunchAttempt) -> Fut,
    Fut: Future<Output = BrowserResult<S>>,
{
    let mut last_error = None;
    for attempt in attempts {
        match try_launch(attempt.clone()).await {
            Ok(session) => return Ok(session),
            Err(error) => {
                if !is_recoverable_startup(&error.to_string()) {
                    return Err(error);
                }
                if let Some(warning) = attempt.warning {
                    warn!("{warning}");
                }
                last_error = Some(error);
            }
        }
    }
    Err(last_error
        .unwrap_or_else(|| BrowserError::Launch("no launch attempts were configured".into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn plan_keeps_the_preferred_configuration_first() {
        let plan = launch_plan(false, None);
        assert_eq!(plan.len(), 1);
        assert!(!plan[0].headless);
        assert_eq!(plan[0].warning, None);
    }

    #[test]
    fn headless_request_gains_a_visible_fallback() {
        let plan = launch_plan(true, None);
        assert_eq!(plan.len(), 2);
        assert!(plan[0].headless);
        assert!(!plan[1].headless);
        assert_eq!(plan[1].warning, Some(HEADLESS_FALLBACK_WARNING));
    }

    #[test]
    fn profile_request_gains_a_profileless_fallback() {
        let dir = PathBuf::from("/tmp/profile");
        let plan = launch_plan(true, Some(dir.as_path()));
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].user_data_dir.as_deref(), Some(dir.as_path()));
        assert_eq!(plan[1].user_data_dir.as_deref(), Some(dir.as_path()));
        assert!(!plan[1].headless);
        assert_eq!(plan[2].user_data_dir, None);
        assert!(!plan[2].headless);
        assert_eq!(plan[2].warning, Some(PROFILE_FALLBACK_WARNING));
    }

    #[test]
    fn classifies_transient_startup_symptoms() {
        assert!(is_recoverable_startup(
            "chromium launch failed: DevToolsActivePort file doesn't exist"
        ));
        assert!(is_recoverable_startup("the browser process crashed early"));
        assert!(is_recoverable_startup("bind: Address already in use"));
        assert!(!is_recoverable_startup("executable not found in PATH"));
    }

    #[tokio::test]
    async fn falls_back_to_visible_mode_on_port_conflict() {
        let plan = launch_plan(true, None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&seen);

        let session = launch_with_plan(&plan, move |attempt| {
            let recorder = Rc::clone(&recorder);
            async move {
                recorder.borrow_mut().push(attempt.clone());
                if attempt.headless {
                    Err(BrowserError::Launch(
                        "DevToolsActivePort file doesn't exist".into(),
                    ))
                } else {
                    Ok(7u32)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(session, 7);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].headless);
        assert!(!seen[1].headless);
    }

    #[tokio::test]
    async fn unrecognized_failure_gets_zero_fallback_attempts() {
        let plan = launch_plan(true, None);
        let seen = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&seen);

        let result: BrowserResult<u32> = launch_with_plan(&plan, move |_| {
            let counter = Rc::clone(&counter);
            async move {
                *counter.borrow_mut() += 1;
                Err(BrowserError::Launch("executable not found in PATH".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(*seen.borrow(), 1);
    }

    #[tokio::test]
    async fn exhaustion_surfaces_the_last_observed_error() {
        let dir = PathBuf::from("/tmp/profile");
        let plan = launch_plan(true, Some(dir.as_path()));
        let seen = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&seen);

        let result: BrowserResult<u32> = launch_with_plan(&plan, move |attempt| {
            let counter = Rc::clone(&counter);
            async move {
                *counter.borrow_mut() += 1;
                Err(BrowserError::Launch(format!(
                    "attempt {} crashed",
                    attempt.user_data_dir.is_some()
                )))
            }
        })
        .await;

        assert_eq!(*seen.borrow(), 3);
        let error = result.unwrap_err();
        assert_eq!(
            error.to_string(),
            "chromium launch failed: attempt false crashed"
        );
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let dir = PathBuf::from("/tmp/profile");
        let plan = launch_plan(true, Some(dir.as_path()));
        let seen = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&seen);

        let session = launch_with_plan(&plan, move |_| {
            let counter = Rc::clone(&counter);
            async move {
                *counter.borrow_mut() += 1;
                Ok("session")
            }
        })
        .await
        .unwrap();

        assert_eq!(session, "session");
        assert_eq!(*seen.borrow(), 1);
    }
}
