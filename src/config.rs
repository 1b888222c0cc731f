use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::constants::{DEFAULT_OUTPUT_PATH, DEFAULT_SITE_ROOT};
use crate::scrape::{ScrapeSettings, DEFAULT_MAX_STALLED_PASSES, DEFAULT_SCROLL_STEP};
use crate::session::{BrowserOptions, Credentials};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
    #[error("failed to parse {name} as URL: {source}")]
    ParseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Account
    pub credentials: Credentials,

    // Site
    pub site_root: Url,
    pub login_url: String,
    pub profile_url: String,

    // Scraping
    pub max_posts: usize,
    pub scroll_step: u32,
    pub scroll_delay: Duration,
    pub max_stalled_passes: u32,
    pub max_passes: Option<u32>,
    pub selectors_path: Option<PathBuf>,

    // Output
    pub output_path: PathBuf,

    // Browser
    pub chrome_path: Option<String>,
    pub headless: bool,
    pub login_field_timeout: Duration,
    pub login_settle: Duration,
    pub navigation_settle: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let site_root_raw = env_or_default("SITE_ROOT", DEFAULT_SITE_ROOT);
        let site_root = Url::parse(&site_root_raw).map_err(|source| ConfigError::ParseUrl {
            name: "SITE_ROOT".to_string(),
            source,
        })?;
        let default_login_url = format!("{}/login", site_root_raw.trim_end_matches('/'));

        Ok(Self {
            // Account
            credentials: Credentials {
                email: required_env("SCRAPER_EMAIL")?,
                password: required_env("SCRAPER_PASSWORD")?,
            },

            // Site
            login_url: env_or_default("LOGIN_URL", &default_login_url),
            profile_url: required_env("PROFILE_URL")?,
            site_root,

            // Scraping
            max_posts: parse_env_usize("MAX_POSTS", 600)?,
            scroll_step: parse_env_u32("SCROLL_STEP_PX", DEFAULT_SCROLL_STEP)?,
            scroll_delay: Duration::from_millis(parse_env_u64("SCROLL_DELAY_MS", 2000)?),
            max_stalled_passes: parse_env_u32("MAX_STALLED_PASSES", DEFAULT_MAX_STALLED_PASSES)?,
            max_passes: optional_env("MAX_PASSES")
                .map(|v| {
                    v.parse().map_err(|e| ConfigError::ParseInt {
                        name: "MAX_PASSES".to_string(),
                        source: e,
                    })
                })
                .transpose()?,
            selectors_path: optional_env("SELECTORS_PATH").map(PathBuf::from),

            // Output
            output_path: PathBuf::from(env_or_default("OUTPUT_PATH", DEFAULT_OUTPUT_PATH)),

            // Browser
            chrome_path: optional_env("CHROME_PATH"),
            headless: parse_env_bool("HEADLESS", false)?,
            login_field_timeout: Duration::from_secs(parse_env_u64(
                "LOGIN_FIELD_TIMEOUT_SECS",
                10,
            )?),
            login_settle: Duration::from_secs(parse_env_u64("LOGIN_SETTLE_SECS", 15)?),
            navigation_settle: Duration::from_secs(parse_env_u64("NAVIGATION_SETTLE_SECS", 4)?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.email.is_empty() {
            return Err(invalid("SCRAPER_EMAIL", "cannot be empty"));
        }
        if self.credentials.password.is_empty() {
            return Err(invalid("SCRAPER_PASSWORD", "cannot be empty"));
        }
        if Url::parse(&self.profile_url).is_err() {
            return Err(invalid("PROFILE_URL", "must be an absolute URL"));
        }
        if self.max_posts == 0 {
            return Err(invalid("MAX_POSTS", "must be at least 1"));
        }
        if self.scroll_step == 0 {
            return Err(invalid("SCROLL_STEP_PX", "must be at least 1"));
        }
        if self.max_stalled_passes == 0 {
            return Err(invalid("MAX_STALLED_PASSES", "must be at least 1"));
        }
        if self.max_passes == Some(0) {
            return Err(invalid("MAX_PASSES", "must be at least 1 when set"));
        }
        Ok(())
    }

    #[must_use]
    pub fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            scroll_step: self.scroll_step,
            max_stalled_passes: self.max_stalled_passes,
            max_passes: self.max_passes,
        }
    }

    #[must_use]
    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            chrome_path: self.chrome_path.clone(),
            headless: self.headless,
            viewport_width: crate::session::DEFAULT_VIEWPORT_WIDTH,
            viewport_height: crate::session::DEFAULT_VIEWPORT_HEIGHT,
            login_url: self.login_url.clone(),
            login_field_timeout: self.login_field_timeout,
        }
    }
}

fn invalid(name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const VARS: &[&str] = &[
        "SCRAPER_EMAIL",
        "SCRAPER_PASSWORD",
        "PROFILE_URL",
        "SITE_ROOT",
        "LOGIN_URL",
        "MAX_POSTS",
        "MAX_PASSES",
        "HEADLESS",
        "SCROLL_STEP_PX",
        "SCROLL_DELAY_MS",
        "MAX_STALLED_PASSES",
        "OUTPUT_PATH",
        "SELECTORS_PATH",
        "CHROME_PATH",
    ];

    fn reset_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
        std::env::set_var("SCRAPER_EMAIL", "someone@example.com");
        std::env::set_var("SCRAPER_PASSWORD", "secret");
        std::env::set_var("PROFILE_URL", "https://www.facebook.com/somepage");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        reset_env();
        let config = Config::from_env().unwrap();
        config.validate().unwrap();

        assert_eq!(config.site_root.as_str(), "https://www.facebook.com/");
        assert_eq!(config.login_url, "https://www.facebook.com/login");
        assert_eq!(config.max_posts, 600);
        assert_eq!(config.scroll_step, 500);
        assert_eq!(config.scroll_delay, Duration::from_secs(2));
        assert_eq!(config.max_passes, None);
        assert!(!config.headless);
        assert_eq!(config.output_path, PathBuf::from("facebook_posts.csv"));
    }

    #[test]
    #[serial]
    fn test_missing_credentials() {
        reset_env();
        std::env::remove_var("SCRAPER_PASSWORD");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingEnvVar(name)) if name == "SCRAPER_PASSWORD"
        ));
    }

    #[test]
    #[serial]
    fn test_login_url_follows_site_root() {
        reset_env();
        std::env::set_var("SITE_ROOT", "https://m.example.test/");
        let config = Config::from_env().unwrap();
        assert_eq!(config.login_url, "https://m.example.test/login");
    }

    #[test]
    #[serial]
    fn test_zero_target_rejected() {
        reset_env();
        std::env::set_var("MAX_POSTS", "0");
        let config = Config::from_env().unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "MAX_POSTS"
        ));
    }

    #[test]
    #[serial]
    fn test_zero_scroll_step_rejected() {
        reset_env();
        std::env::set_var("SCROLL_STEP_PX", "0");
        let config = Config::from_env().unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_max_passes_parsed() {
        reset_env();
        std::env::set_var("MAX_PASSES", "25");
        assert_eq!(Config::from_env().unwrap().max_passes, Some(25));

        std::env::set_var("MAX_PASSES", "lots");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::ParseInt { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_parse_bool() {
        reset_env();
        assert!(parse_env_bool("NONEXISTENT_VAR", true).unwrap());
        std::env::set_var("HEADLESS", "maybe");
        assert!(parse_env_bool("HEADLESS", false).is_err());
        std::env::set_var("HEADLESS", "ON");
        assert!(parse_env_bool("HEADLESS", false).unwrap());
    }
}
