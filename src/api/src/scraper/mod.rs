//! Race card acquisition from Yahoo! sports keiba.
//!
//! Renders the denma page in a headless browser, parses it into engine
//! inputs and caches the result on disk.

pub mod browser;
pub mod cache;
pub mod parsers;
pub mod rate_limiter;

use anyhow::{bail, Result};
use regex::Regex;
use tokio::time::Duration;

pub use browser::Browser;
pub use cache::RaceCardCache;
pub use parsers::{DenmaParser, RaceCard};
pub use rate_limiter::RateLimiter;

use crate::config::ScraperConfig;
use crate::retry::{retry, RetryConfig};

/// Element that only exists once the entries table has rendered
pub const READY_SELECTOR: &str = "#denma_latest";

/// Build race card URL (detail view)
pub fn race_card_url(base_url: &str, race_id: &str) -> String {
    format!("{}/{}?detail=1", base_url.trim_end_matches('/'), race_id)
}

/// Pull a 10-digit race id out of a pasted URL or bare id
pub fn extract_race_id(target: &str) -> Option<String> {
    let re = Regex::new(r"\d{10}").ok()?;
    re.find(target).map(|m| m.as_str().to_string())
}

/// Race id of another race at the same meeting
pub fn meeting_race_id(race_id: &str, race_number: u32) -> Result<String> {
    if race_id.len() != 10 || !race_id.bytes().all(|b| b.is_ascii_digit()) {
        bail!("Invalid race id: {}", race_id);
    }
    if !(1..=12).contains(&race_number) {
        bail!("Race number must be 1-12, got {}", race_number);
    }
    Ok(format!("{}{:02}", &race_id[..8], race_number))
}

/// Fetches race cards through the cache, browser and parser
pub struct RaceCardFetcher {
    config: ScraperConfig,
    browser: Option<Browser>,
    cache: RaceCardCache,
    limiter: RateLimiter,
    parser: DenmaParser,
    use_cache: bool,
}

impl RaceCardFetcher {
    pub fn new(config: ScraperConfig, use_cache: bool) -> Result<Self> {
        Ok(Self {
            cache: RaceCardCache::from_config(&config),
            limiter: RateLimiter::from_millis(config.request_interval_ms),
            parser: DenmaParser::new()?,
            browser: None,
            use_cache,
            config,
        })
    }

    /// Race card for `race_id`, from cache when fresh
    pub async fn fetch(&mut self, race_id: &str) -> Result<RaceCard> {
        if self.use_cache {
            if let Some(card) = self.cache.get(race_id) {
                tracing::info!("Cache hit for race {}", race_id);
                return Ok(card);
            }
        }

        let html = self.fetch_html(race_id).await?;
        let card = self.parser.parse(&html, race_id)?;
        tracing::info!(
            "Parsed race {}: {} {}m, {} runners",
            race_id,
            card.venue,
            card.distance,
            card.horses.len()
        );

        if let Err(e) = self.cache.set(&card) {
            tracing::warn!("Failed to cache race {}: {}", race_id, e);
        }
        Ok(card)
    }

    async fn fetch_html(&mut self, race_id: &str) -> Result<String> {
        if self.browser.is_none() {
            tracing::info!("Launching headless browser");
            self.browser = Some(Browser::launch().await?);
        }
        let Some(browser) = self.browser.as_ref() else {
            bail!("Browser unavailable");
        };

        let url = race_card_url(&self.config.base_url, race_id);
        let url = url.as_str();
        let timeout = Duration::from_secs(self.config.page_timeout_secs);
        let retry_config = RetryConfig::from_scraper(&self.config);
        let limiter = &self.limiter;

        tracing::info!("Fetching {}", url);
        retry(&retry_config, &format!("fetch {}", race_id), move || async move {
            limiter.acquire().await;
            browser.fetch_page(url, READY_SELECTOR, timeout).await
        })
        .await
    }

    /// Shut the browser down if one was started
    pub async fn close(self) -> Result<()> {
        match self.browser {
            Some(browser) => browser.close().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_card_url() {
        assert_eq!(
            race_card_url("https://sports.yahoo.co.jp/keiba/race/denma/", "2605010711"),
            "https://sports.yahoo.co.jp/keiba/race/denma/2605010711?detail=1"
        );
    }

    #[test]
    fn test_extract_race_id() {
        assert_eq!(
            extract_race_id("https://sports.yahoo.co.jp/keiba/race/denma/2605010711?detail=1"),
            Some("2605010711".to_string())
        );
        assert_eq!(extract_race_id("2605010711"), Some("2605010711".to_string()));
        assert_eq!(extract_race_id("race 123"), None);
    }

    #[test]
    fn test_meeting_race_id() {
        assert_eq!(meeting_race_id("2605010711", 9).unwrap(), "2605010709");
        assert_eq!(meeting_race_id("2605010711", 12).unwrap(), "2605010712");
        assert!(meeting_race_id("2605010711", 0).is_err());
        assert!(meeting_race_id("2605010711", 13).is_err());
        assert!(meeting_race_id("26050107", 1).is_err());
    }

    #[tokio::test]
    async fn test_fetch_serves_cached_card() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ScraperConfig {
            cache_dir: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        let card = RaceCard {
            race_id: "2605010711".to_string(),
            venue: "東京".to_string(),
            distance: 2400,
            track_type: crate::pace::model::TrackType::Turf,
            entries: 0,
            horses: vec![],
        };
        RaceCardCache::from_config(&config).set(&card).unwrap();

        // No browser is launched for a cache hit
        let mut fetcher = RaceCardFetcher::new(config, true).unwrap();
        assert_eq!(fetcher.fetch("2605010711").await.unwrap(), card);
        assert!(fetcher.browser.is_none());
    }
}
