use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::bootstrap::{launch_plan, launch_with_plan, LaunchAttempt};
use super::error::{BrowserError, BrowserResult};

/// What the page reports about an element right now. Both flags must
/// hold before a click or keystroke is worth sending.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Interactability {
    pub displayed: bool,
    pub enabled: bool,
}

impl Interactability {
    pub fn usable(self) -> bool {
        self.displayed && self.enabled
    }
}

/// The capability surface the automation stages run against. The
/// production implementation drives a Chromium page over CDP; tests
/// script a fake.
#[async_trait(?Send)]
pub trait PageSession {
    type Element;

    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;
    async fn current_url(&mut self) -> BrowserResult<String>;
    async fn find(&mut self, selector: &str) -> BrowserResult<Vec<Self::Element>>;
    async fn interactability(
        &mut self,
        element: &Self::Element,
    ) -> BrowserResult<Interactability>;
    async fn scroll_into_view(&mut self, element: &Self::Element) -> BrowserResult<()>;
    async fn scroll_by(&mut self, delta_y: f64) -> BrowserResult<()>;
    async fn click(&mut self, element: &Self::Element) -> BrowserResult<()>;
    async fn clear(&mut self, element: &Self::Element) -> BrowserResult<()>;
    async fn type_text(&mut self, element: &Self::Element, text: &str) -> BrowserResult<()>;
    async fn submit(&mut self, element: &Self::Element) -> BrowserResult<()>;
}

/// Starts Chromium sessions with the layered fallback plan from
/// [`launch_plan`].
#[derive(Debug, Clone)]
pub struct SessionLauncher {
    headless: bool,
    user_data_dir: Option<PathBuf>,
}

impl SessionLauncher {
    pub fn new(headless: bool, user_data_dir: Option<PathBuf>) -> Self {
        Self {
            headless,
            user_data_dir,
        }
    }

    pub async fn launch(&self) -> BrowserResult<BrowserSession> {
        let plan = launch_plan(self.headless, self.user_data_dir.as_deref());
        launch_with_plan(&plan, |attempt| async move {
            BrowserSession::launch(attempt).await
        })
        .await
    }
}

/// The one live connection to a controlled Chromium instance. Owned
/// exclusively by the run and released exactly once via [`close`].
///
/// [`close`]: BrowserSession::close
#[derive(Debug)]
pub struct BrowserSession {
    browser: Browser,
    handler_task: Option<JoinHandle<()>>,
    page: Page,
}

impl BrowserSession {
    async fn launch(attempt: LaunchAttempt) -> BrowserResult<Self> {
        let config = chromium_config(&attempt)?;
        info!(
            headless = attempt.headless,
            persistent_profile = attempt.user_data_dir.is_some(),
            "launching Chromium instance"
        );

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| BrowserError::Launch(err.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "chromium handler reported error");
                }
            }
        });

        let params = CreateTargetParams::new("about:blank");
        let page = match browser.new_page(params).await {
            Ok(page) => page,
            Err(err) => {
                // A half-started browser must not outlive the failed attempt.
                if let Err(close_err) = browser.close().await {
                    warn!(error = %close_err, "failed to close browser after page setup error");
                }
                handler_task.abort();
                return Err(BrowserError::Launch(err.to_string()));
            }
        };

        Ok(Self {
            browser,
            handler_task: Some(handler_task),
            page,
        })
    }

    pub async fn close(mut self) -> BrowserResult<()> {
        info!("shutting down Chromium instance");
        if let Err(err) = self.browser.close().await {
            warn!(error = %err, "failed to close browser gracefully");
        }
        if let Some(handle) = self.handler_task.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "browser handler join error");
            }
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(handle) = &self.handler_task {
            if !handle.is_finished() {
                warn!("BrowserSession dropped without explicit close");
            }
        }
    }
}

fn chromium_config(attempt: &LaunchAttempt) -> BrowserResult<ChromiumConfig> {
    let mut builder = ChromiumConfig::builder().no_sandbox().args(vec![
        "--disable-gpu",
        "--window-size=1920,1080",
        "--disable-dev-shm-usage",
    ]);
    if !attempt.headless {
        builder = builder.with_head();
    }
    if let Some(dir) = &attempt.user_data_dir {
        builder = builder.user_data_dir(dir);
    }
    builder.build().map_err(BrowserError::Configuration)
}

const INTERACTABILITY_PROBE: &str = r#"
function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return JSON.stringify({
        displayed: rect.width > 0 && rect.height > 0
            && style.visibility !== 'hidden' && style.display !== 'none',
        enabled: !this.disabled && this.getAttribute('aria-disabled') !== 'true',
    });
}
"#;

#[async_trait(?Send)]
impl PageSession for BrowserSession {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(BrowserError::Configuration)?;
        self.page.goto(params).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn current_url(&mut self) -> BrowserResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn find(&mut self, selector: &str) -> BrowserResult<Vec<Element>> {
        match self.page.find_elements(selector).await {
            Ok(elements) => Ok(elements),
            Err(err) => {
                // Lookup failures while the page is still rendering count
                // as "no matches this poll", not as a dead session.
                trace!(selector, error = %err, "element lookup failed");
                Ok(Vec::new())
            }
        }
    }

    async fn interactability(&mut self, element: &Element) -> BrowserResult<Interactability> {
        let returns = element.call_js_fn(INTERACTABILITY_PROBE, false).await?;
        let payload = returns
            .result
            .value
            .and_then(|value| value.as_str().map(str::to_owned))
            .ok_or_else(|| {
                BrowserError::Unexpected("interactability probe returned no value".into())
            })?;
        serde_json::from_str(&payload).map_err(|err| {
            BrowserError::Unexpected(format!("failed to decode interactability probe: {err}"))
        })
    }

    async fn scroll_into_view(&mut self, element: &Element) -> BrowserResult<()> {
        element
            .call_js_fn("function() { this.scrollIntoView({ block: 'center' }); }", false)
            .await?;
        Ok(())
    }

    async fn scroll_by(&mut self, delta_y: f64) -> BrowserResult<()> {
        let script = format!("window.scrollBy(0, {delta_y})");
        self.page.evaluate(script.as_str()).await.map_err(|err| {
            BrowserError::Unexpected(format!("failed to execute scroll script: {err}"))
        })?;
        Ok(())
    }

    async fn click(&mut self, element: &Element) -> BrowserResult<()> {
        element.click().await?;
        Ok(())
    }

    async fn clear(&mut self, element: &Element) -> BrowserResult<()> {
        element
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                false,
            )
            .await?;
        Ok(())
    }

    async fn type_text(&mut self, element: &Element, text: &str) -> BrowserResult<()> {
        element.focus().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn submit(&mut self, element: &Element) -> BrowserResult<()> {
        element.press_key("Enter").await?;
        Ok(())
    }
}
