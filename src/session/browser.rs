//! Chromium session driving login, navigation and scrolling.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::{Credentials, FeedPage, SessionError};
use crate::constants::{BROWSER_USER_AGENT, HIDE_WEBDRIVER_SCRIPT};
use crate::pacing::Pacing;

/// Default viewport width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1600;

const EMAIL_FIELD: &str = r#"input[name="email"]"#;
const PASSWORD_FIELD: &str = r#"input[name="pass"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

/// How often to re-query while waiting for a login field.
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser launch and login settings.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Path to Chrome/Chromium executable (None for auto-detection).
    pub chrome_path: Option<String>,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub login_url: String,
    /// How long to wait for each login form field to appear.
    pub login_field_timeout: Duration,
}

/// A running browser with a single page.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    options: BrowserOptions,
    pacing: Pacing,
}

impl BrowserSession {
    /// Launch Chromium and open a blank page.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be configured or started.
    pub async fn launch(options: BrowserOptions, pacing: Pacing) -> Result<Self, SessionError> {
        info!(headless = options.headless, "Launching browser");

        let mut builder = BrowserConfig::builder()
            .window_size(options.viewport_width, options.viewport_height)
            .no_sandbox()
            .disable_default_args()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-extensions")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--mute-audio")
            .arg("--lang=en-US,en")
            .arg(format!("--user-agent={BROWSER_USER_AGENT}"));

        builder = if options.headless {
            builder.arg("--headless=new").arg("--disable-gpu")
        } else {
            builder.with_head()
        };

        if let Some(ref chrome_path) = options.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        let config = builder.build().map_err(SessionError::Config)?;
        let (browser, mut handler) = Browser::launch(config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
            HIDE_WEBDRIVER_SCRIPT,
        ))
        .await?;

        info!("Browser ready");
        Ok(Self {
            browser,
            page,
            handler,
            options,
            pacing,
        })
    }

    /// Fill and submit the login form.
    ///
    /// # Errors
    ///
    /// Returns an error if a form field never appears or the browser fails.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), SessionError> {
        info!(url = %self.options.login_url, email = %credentials.email, "Logging in");
        self.page.goto(self.options.login_url.as_str()).await?;

        let email = self.wait_for_element(EMAIL_FIELD).await?;
        self.type_slowly(&email, &credentials.email).await?;

        let password = self.wait_for_element(PASSWORD_FIELD).await?;
        self.type_slowly(&password, &credentials.password).await?;

        let submit = self.page.find_element(SUBMIT_BUTTON).await?;
        submit.scroll_into_view().await?;
        submit.hover().await?;
        self.pacing.click.wait().await;
        submit.click().await?;

        self.pacing.login_settle.wait().await;
        info!("Login submitted");
        Ok(())
    }

    /// Open `url` and let it settle.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation fails.
    pub async fn navigate_to(&self, url: &str) -> Result<(), SessionError> {
        info!(url = %url, "Navigating");
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        self.pacing.navigation_settle.wait().await;
        Ok(())
    }

    /// Shutdown the browser gracefully.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            error!("Failed to close browser: {e}");
        } else {
            info!("Browser shutdown complete");
        }
        self.handler.abort();
    }

    async fn wait_for_element(&self, selector: &str) -> Result<Element, SessionError> {
        let timeout = self.options.login_field_timeout;
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(e) if Instant::now() >= deadline => {
                    debug!(selector, error = %e, "Gave up waiting for element");
                    return Err(SessionError::ElementTimeout {
                        selector: selector.to_string(),
                        timeout,
                    });
                }
                Err(_) => tokio::time::sleep(ELEMENT_POLL_INTERVAL).await,
            }
        }
    }

    /// Type one character at a time with the keystroke cadence between keys.
    async fn type_slowly(&self, element: &Element, text: &str) -> Result<(), SessionError> {
        element.click().await?;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            element.type_str(ch.encode_utf8(&mut buf)).await?;
            self.pacing.keystroke.wait().await;
        }
        Ok(())
    }
}

#[async_trait]
impl FeedPage for BrowserSession {
    async fn current_markup(&mut self) -> Result<String, SessionError> {
        Ok(self.page.content().await?)
    }

    async fn scroll_by(&mut self, pixels: u32) -> Result<(), SessionError> {
        self.page
            .evaluate(format!("window.scrollBy(0, {pixels});"))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
