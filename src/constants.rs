//! Shared constants used across the application.

/// User agent string the browser presents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Installed on every new document so `navigator.webdriver` reads as undefined.
pub const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Origin that relative post links resolve against.
pub const DEFAULT_SITE_ROOT: &str = "https://www.facebook.com";

/// Where posts are written when no output path is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "facebook_posts.csv";
