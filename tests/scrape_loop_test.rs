//! Integration tests for the scroll/extract/deduplicate loop.

use std::time::Duration;

use async_trait::async_trait;
use feed_post_scraper::extract::{PostExtractor, SelectorSet};
use feed_post_scraper::models::PostRecord;
use feed_post_scraper::pacing::NoDelay;
use feed_post_scraper::scrape::{ScrapeLoop, ScrapeSettings, StopReason};
use feed_post_scraper::session::{FeedPage, SessionError};
use url::Url;

/// A feed that serves one scripted snapshot per scroll position.
///
/// Scrolling past the last snapshot keeps returning it, like a feed that has
/// run out of posts.
struct ScriptedFeed {
    snapshots: Vec<String>,
    position: usize,
    scrolls: Vec<u32>,
}

impl ScriptedFeed {
    fn new(snapshots: Vec<String>) -> Self {
        Self {
            snapshots,
            position: 0,
            scrolls: Vec::new(),
        }
    }
}

#[async_trait]
impl FeedPage for ScriptedFeed {
    async fn current_markup(&mut self) -> Result<String, SessionError> {
        let last = self.snapshots.len() - 1;
        Ok(self.snapshots[self.position.min(last)].clone())
    }

    async fn scroll_by(&mut self, pixels: u32) -> Result<(), SessionError> {
        self.scrolls.push(pixels);
        self.position += 1;
        Ok(())
    }
}

/// A feed whose markup can never be read.
struct BrokenFeed;

#[async_trait]
impl FeedPage for BrokenFeed {
    async fn current_markup(&mut self) -> Result<String, SessionError> {
        Err(SessionError::ElementTimeout {
            selector: "body".to_string(),
            timeout: Duration::from_secs(1),
        })
    }

    async fn scroll_by(&mut self, _pixels: u32) -> Result<(), SessionError> {
        Ok(())
    }
}

fn post_html(text: &str, likes: &str) -> String {
    format!(
        r#"<div class="x1n2onr6 x1ja2u2z">
             <div data-ad-preview="message">{text}</div>
             <span class="xt0b8zv x1jx94hy xrbpyxo xl423tq"><span><span>{likes}</span></span></span>
           </div>"#
    )
}

/// A page showing posts `first..=last`, each with 5 likes.
fn snapshot(first: usize, last: usize) -> String {
    let posts: String = (first..=last)
        .map(|n| post_html(&format!("post {n}"), "5"))
        .collect();
    format!("<html><body>{posts}</body></html>")
}

fn scrape_loop(settings: ScrapeSettings) -> ScrapeLoop {
    let extractor = PostExtractor::from_set(
        &SelectorSet::default(),
        Url::parse("https://www.facebook.com").unwrap(),
    )
    .unwrap();
    ScrapeLoop::new(extractor, settings, Box::new(NoDelay))
}

fn texts(posts: &[PostRecord]) -> Vec<String> {
    posts.iter().filter_map(|p| p.text.clone()).collect()
}

#[tokio::test]
async fn test_stops_at_target_and_truncates() {
    let mut feed = ScriptedFeed::new(vec![snapshot(1, 3), snapshot(1, 6), snapshot(1, 9)]);
    let outcome = scrape_loop(ScrapeSettings::default())
        .run(&mut feed, 4)
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.passes, 2);
    assert_eq!(
        texts(&outcome.posts),
        vec!["post 1", "post 2", "post 3", "post 4"]
    );
    assert_eq!(feed.scrolls, vec![500]);
}

#[tokio::test]
async fn test_never_returns_more_than_target() {
    for target in 1..=8 {
        let mut feed = ScriptedFeed::new(vec![snapshot(1, 2), snapshot(2, 4), snapshot(3, 6)]);
        let settings = ScrapeSettings {
            max_stalled_passes: 2,
            ..ScrapeSettings::default()
        };
        let outcome = scrape_loop(settings).run(&mut feed, target).await.unwrap();

        assert!(outcome.posts.len() <= target);
        assert_eq!(outcome.posts.len(), target.min(6), "target {target}");
    }
}

#[tokio::test]
async fn test_stalled_feed_terminates() {
    let mut feed = ScriptedFeed::new(vec![snapshot(1, 2)]);
    let settings = ScrapeSettings {
        max_stalled_passes: 3,
        ..ScrapeSettings::default()
    };
    let outcome = scrape_loop(settings).run(&mut feed, 10).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::Stalled);
    assert_eq!(outcome.passes, 4);
    assert_eq!(outcome.posts.len(), 2);
    assert_eq!(feed.scrolls.len(), 3);
}

#[tokio::test]
async fn test_stall_counter_resets_on_progress() {
    // New posts arrive every other pass; a stall limit of 2 is never hit.
    let mut feed = ScriptedFeed::new(vec![
        snapshot(1, 1),
        snapshot(1, 1),
        snapshot(1, 2),
        snapshot(1, 2),
        snapshot(1, 3),
    ]);
    let settings = ScrapeSettings {
        max_stalled_passes: 2,
        ..ScrapeSettings::default()
    };
    let outcome = scrape_loop(settings).run(&mut feed, 3).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.passes, 5);
}

#[tokio::test]
async fn test_pass_limit() {
    let mut feed = ScriptedFeed::new((0..10).map(|i| snapshot(i * 3 + 1, i * 3 + 3)).collect());
    let settings = ScrapeSettings {
        max_passes: Some(2),
        ..ScrapeSettings::default()
    };
    let outcome = scrape_loop(settings).run(&mut feed, 100).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::PassLimit);
    assert_eq!(outcome.passes, 2);
    assert_eq!(outcome.posts.len(), 6);
    assert_eq!(feed.scrolls.len(), 1);
}

#[tokio::test]
async fn test_changed_like_count_is_a_new_post() {
    let first = format!("<html><body>{}</body></html>", post_html("same post", "10"));
    let second = format!("<html><body>{}</body></html>", post_html("same post", "11"));
    let mut feed = ScriptedFeed::new(vec![first, second]);

    let outcome = scrape_loop(ScrapeSettings::default())
        .run(&mut feed, 2)
        .await
        .unwrap();

    let likes: Vec<_> = outcome
        .posts
        .iter()
        .filter_map(|p| p.likes.as_deref())
        .collect();
    assert_eq!(likes, vec!["10", "11"]);
}

#[tokio::test]
async fn test_uses_configured_scroll_step() {
    let mut feed = ScriptedFeed::new(vec![snapshot(1, 1), snapshot(1, 2), snapshot(1, 3)]);
    let settings = ScrapeSettings {
        scroll_step: 320,
        ..ScrapeSettings::default()
    };
    scrape_loop(settings).run(&mut feed, 3).await.unwrap();

    assert_eq!(feed.scrolls, vec![320, 320]);
}

#[tokio::test]
async fn test_page_without_posts_stalls_empty() {
    let mut feed = ScriptedFeed::new(vec!["<html><body><p>nothing</p></body></html>".to_string()]);
    let settings = ScrapeSettings {
        max_stalled_passes: 2,
        ..ScrapeSettings::default()
    };
    let outcome = scrape_loop(settings).run(&mut feed, 5).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::Stalled);
    assert!(outcome.posts.is_empty());
}

#[tokio::test]
async fn test_session_errors_propagate() {
    let result = scrape_loop(ScrapeSettings::default())
        .run(&mut BrokenFeed, 5)
        .await;

    assert!(matches!(result, Err(SessionError::ElementTimeout { .. })));
}
