//! Incremental scroll-and-extract loop.

use tracing::{debug, info, warn};

use crate::dedup::Deduplicator;
use crate::extract::PostExtractor;
use crate::models::PostRecord;
use crate::pacing::DelayPolicy;
use crate::session::{FeedPage, SessionError};

/// Default scroll distance per pass, in pixels.
pub const DEFAULT_SCROLL_STEP: u32 = 500;

/// Default number of consecutive passes without a new post before giving up.
pub const DEFAULT_MAX_STALLED_PASSES: u32 = 10;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target number of unique posts was collected.
    TargetReached,
    /// Too many consecutive passes produced no new post.
    Stalled,
    /// The configured pass limit was hit.
    PassLimit,
}

/// Result of a scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// Unique posts in first-seen order, at most the requested target.
    pub posts: Vec<PostRecord>,
    /// Number of extraction passes made.
    pub passes: u32,
    pub stop_reason: StopReason,
}

/// Loop tuning.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeSettings {
    pub scroll_step: u32,
    pub max_stalled_passes: u32,
    /// Hard cap on extraction passes (None for no cap).
    pub max_passes: Option<u32>,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            scroll_step: DEFAULT_SCROLL_STEP,
            max_stalled_passes: DEFAULT_MAX_STALLED_PASSES,
            max_passes: None,
        }
    }
}

/// Scrolls a feed, re-extracting the whole visible post set on every pass.
pub struct ScrapeLoop {
    extractor: PostExtractor,
    settings: ScrapeSettings,
    scroll_delay: Box<dyn DelayPolicy>,
}

impl ScrapeLoop {
    #[must_use]
    pub fn new(
        extractor: PostExtractor,
        settings: ScrapeSettings,
        scroll_delay: Box<dyn DelayPolicy>,
    ) -> Self {
        Self {
            extractor,
            settings,
            scroll_delay,
        }
    }

    /// Collect up to `target` unique posts from `page`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or scrolling the page fails. Posts
    /// collected before the failure are discarded.
    pub async fn run<P: FeedPage + ?Sized>(
        &self,
        page: &mut P,
        target: usize,
    ) -> Result<ScrapeOutcome, SessionError> {
        let mut unique = Deduplicator::new();
        let mut passes = 0u32;
        let mut stalled = 0u32;

        let stop_reason = loop {
            let markup = page.current_markup().await?;
            let extracted = self.extractor.extract(&markup);
            let visible = extracted.len();
            let added = unique.extend(extracted);
            passes += 1;

            info!(
                pass = passes,
                visible,
                added,
                unique = unique.len(),
                "Extracted {} unique posts so far",
                unique.len()
            );

            if unique.len() >= target {
                break StopReason::TargetReached;
            }

            if added == 0 {
                stalled += 1;
                debug!(stalled, "Pass produced no new posts");
            } else {
                stalled = 0;
            }

            if stalled >= self.settings.max_stalled_passes {
                warn!(
                    stalled,
                    unique = unique.len(),
                    target,
                    "Feed stopped producing new posts; giving up"
                );
                break StopReason::Stalled;
            }

            if self.settings.max_passes.is_some_and(|max| passes >= max) {
                warn!(passes, unique = unique.len(), target, "Pass limit reached");
                break StopReason::PassLimit;
            }

            page.scroll_by(self.settings.scroll_step).await?;
            self.scroll_delay.wait().await;
        };

        if unique.is_empty() {
            warn!(passes, "No post fragments matched the post selector");
        }

        let mut posts = unique.into_records();
        posts.truncate(target);

        Ok(ScrapeOutcome {
            posts,
            passes,
            stop_reason,
        })
    }
}

impl std::fmt::Debug for ScrapeLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeLoop")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
