//! File-based race card cache with TTL support.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::parsers::RaceCard;
use crate::config::ScraperConfig;

/// Cache entry with timestamp
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Parsed race cards keyed by race id
pub struct RaceCardCache {
    dir: PathBuf,
    ttl: Duration,
}

impl RaceCardCache {
    pub fn new(dir: PathBuf, ttl: Duration) -> Self {
        Self { dir, ttl }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            PathBuf::from(&config.cache_dir),
            Duration::hours(config.cache_ttl_hours),
        )
    }

    fn cache_path(&self, race_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", race_id))
    }

    /// Cached card if present and not expired
    pub fn get(&self, race_id: &str) -> Option<RaceCard> {
        let path = self.cache_path(race_id);
        let content = std::fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<RaceCard> = serde_json::from_str(&content).ok()?;

        if Utc::now() - entry.cached_at > self.ttl {
            let _ = std::fs::remove_file(&path);
            return None;
        }

        Some(entry.data)
    }

    pub fn set(&self, card: &RaceCard) -> Result<()> {
        self.write(card, Utc::now())
    }

    fn write(&self, card: &RaceCard, cached_at: DateTime<Utc>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            data: card,
            cached_at,
        };
        let content = serde_json::to_string_pretty(&entry)?;
        std::fs::write(self.cache_path(&card.race_id), content)?;
        Ok(())
    }
}
