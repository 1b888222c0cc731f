//! Profile feed scraper library.
//!
//! Drives a logged-in browser down a social profile feed, extracts each
//! rendered post into a [`models::PostRecord`], deduplicates them, and
//! exports the result to CSV.

pub mod config;
pub mod constants;
pub mod dedup;
pub mod export;
pub mod extract;
pub mod models;
pub mod pacing;
pub mod scrape;
pub mod session;
