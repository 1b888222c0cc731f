use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feed_post_scraper::config::Config;
use feed_post_scraper::export;
use feed_post_scraper::extract::{PostExtractor, SelectorSet};
use feed_post_scraper::pacing::{FixedDelay, Pacing};
use feed_post_scraper::scrape::{ScrapeLoop, ScrapeOutcome, StopReason};
use feed_post_scraper::session::BrowserSession;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting feed-post-scraper");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        profile_url = %config.profile_url,
        max_posts = config.max_posts,
        output = %config.output_path.display(),
        "Configuration loaded"
    );

    let selectors = match config.selectors_path.as_deref() {
        Some(path) => {
            info!(path = %path.display(), "Loading selector overrides");
            SelectorSet::from_file(path).context("Failed to load selectors")?
        }
        None => SelectorSet::default(),
    };
    let extractor = PostExtractor::from_set(&selectors, config.site_root.clone())
        .context("Invalid selector configuration")?;
    let scrape_loop = ScrapeLoop::new(
        extractor,
        config.scrape_settings(),
        Box::new(FixedDelay(config.scroll_delay)),
    );

    let mut session = BrowserSession::launch(
        config.browser_options(),
        Pacing::human(config.login_settle, config.navigation_settle),
    )
    .await
    .context("Failed to launch browser")?;

    let result = tokio::select! {
        result = scrape_profile(&mut session, &config, &scrape_loop) => result,
        () = shutdown_signal() => Err(anyhow::anyhow!("Interrupted before the scrape finished")),
    };

    session.close().await;
    let outcome = result?;

    match outcome.stop_reason {
        StopReason::TargetReached => info!(
            posts = outcome.posts.len(),
            passes = outcome.passes,
            "Target reached"
        ),
        reason => warn!(
            ?reason,
            posts = outcome.posts.len(),
            target = config.max_posts,
            passes = outcome.passes,
            "Stopped before reaching target"
        ),
    }

    export::write_posts(&config.output_path, &outcome.posts)
        .with_context(|| format!("Failed to write posts to {}", config.output_path.display()))?;

    Ok(())
}

async fn scrape_profile(
    session: &mut BrowserSession,
    config: &Config,
    scrape_loop: &ScrapeLoop,
) -> Result<ScrapeOutcome> {
    session
        .login(&config.credentials)
        .await
        .context("Login failed")?;
    session
        .navigate_to(&config.profile_url)
        .await
        .context("Failed to open profile")?;
    scrape_loop
        .run(session, config.max_posts)
        .await
        .context("Scraping failed")
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,feed_post_scraper=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        // Structured JSON logging for unattended runs
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        // Human-readable logging for interactive runs
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // Without a handler, only SIGTERM can interrupt the run
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                // Fall back to Ctrl+C alone
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
