mod browser;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use browser::{
    BrowserOptions, BrowserSession, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to build browser config: {0}")]
    Config(String),
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    #[error("timed out after {timeout:?} waiting for '{selector}'")]
    ElementTimeout { selector: String, timeout: Duration },
}

/// A scrollable page whose rendered markup can be read.
///
/// This is all the scrape loop needs from a browser.
#[async_trait]
pub trait FeedPage: Send {
    /// The currently rendered DOM as HTML.
    async fn current_markup(&mut self) -> Result<String, SessionError>;

    /// Scroll the viewport down by `pixels`.
    async fn scroll_by(&mut self, pixels: u32) -> Result<(), SessionError>;
}

/// Account credentials for the login form.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
