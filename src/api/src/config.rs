//! Configuration for the pace API.
//!
//! Engine defaults are named constants; any of them can be overridden from
//! a config file or `PACE__...` environment variables.

use serde::{Deserialize, Serialize};

// Score calculator
pub const NEUTRAL_POSITION: f64 = 7.0;
pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 18.0;
pub const RECENT_WINDOW: usize = 3;
pub const RECENT_WEIGHT: f64 = 0.6;
pub const SAME_VENUE_BONUS: f64 = 8.0;
pub const WIN_BONUS: f64 = 10.0;
pub const DISTANCE_CLIP_M: f64 = 400.0;
pub const DISTANCE_SCALE_PER_100M: f64 = 0.2;
pub const WEIGHT_FACTOR: f64 = 0.25;
pub const REGIONAL_ADJUSTMENT: f64 = -1.0;
pub const POST_STEP: f64 = 0.05;

// Early speed (m/s over the opening 600m)
pub const EARLY_SEGMENT_M: f64 = 600.0;
pub const REFERENCE_SPEED: f64 = 17.0;
pub const SPEED_GAP_CLIP: f64 = 1.0;
pub const SPEED_MULTIPLIER: f64 = 2.0;
pub const SPRINT_DIRT_SPEED_MULTIPLIER: f64 = 3.0;
pub const SPRINT_MAX_DISTANCE: u32 = 1400;
pub const EARLY_SPEED_WINDOW: usize = 5;
pub const SPEED_DISTANCE_CLIP_M: f64 = 500.0;
pub const SPEED_DISTANCE_SCALE: f64 = 0.0002;
pub const GOING_SPEED_STEP: f64 = 0.05;
pub const TURF_START_SPEED_CORRECTION: f64 = -0.15;
pub const UPHILL_START_SPEED_CORRECTION: f64 = 0.10;
pub const DOWNHILL_START_SPEED_CORRECTION: f64 = -0.10;

// Context penalties
pub const PROMOTION_PENALTY: f64 = 0.5;
pub const SLOW_START_REPEAT_PENALTY: f64 = 1.5;
pub const SLOW_START_RECOVERY_PENALTY: f64 = 0.5;
pub const SLOW_START_CLOSE_POSITION: u32 = 5;
pub const WIDE_POST_RATIO: f64 = 0.65;
pub const WAIT_AND_SEE_PENALTY: f64 = 0.6;

// Synergy
pub const STALK_BAND_LOW: f64 = 3.0;
pub const STALK_BAND_HIGH: f64 = 7.0;
pub const CLEAR_LEADER_SCORE: f64 = 2.5;
pub const DRAFT_REACH: u32 = 2;
pub const DRAFT_BONUS: f64 = 0.5;
pub const CONTEST_MARGIN: f64 = 0.3;
pub const YIELD_PENALTY_FAVOURED: f64 = 0.8;
pub const YIELD_PENALTY_DEFAULT: f64 = 0.4;

// Formation
pub const LEADER_GAP: f64 = 1.2;
pub const CHASER_GAP: f64 = 4.5;
pub const MIDFIELD_GAP: f64 = 9.5;
pub const MAX_LEADERS: usize = 3;

// Narrative
pub const TURF_FAST_SPEED: f64 = 17.3;
pub const TURF_SLOW_SPEED: f64 = 16.7;
pub const DIRT_FAST_SPEED: f64 = 17.0;
pub const DIRT_SLOW_SPEED: f64 = 16.5;
pub const STRUNG_OUT_GAP: f64 = 6.0;
pub const SPREAD_PERCENTILE: f64 = 0.6;
pub const LONE_LEADER_GAP: f64 = 1.5;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Race card fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Minimum gap between two page loads
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// How long to wait for the race card table to render
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,
}

fn default_base_url() -> String {
    "https://sports.yahoo.co.jp/keiba/race/denma".to_string()
}

fn default_request_interval_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}

fn default_page_timeout_secs() -> u64 {
    10
}

fn default_cache_dir() -> String {
    "data/cache/race_card".to_string()
}

fn default_cache_ttl_hours() -> i64 {
    6
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_interval_ms: default_request_interval_ms(),
            max_retries: default_max_retries(),
            page_timeout_secs: default_page_timeout_secs(),
            cache_dir: default_cache_dir(),
            cache_ttl_hours: default_cache_ttl_hours(),
        }
    }
}

/// Statistic used to summarise recent first-corner positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecentStatistic {
    Mean,
    Median,
}

/// How the jockey target position picks its reference race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// Highest surprise score over all successes, same-venue bonus included
    BestMemory,
    /// Most recent same-venue success, falling back to `BestMemory`
    CourseFirst,
}

/// An additive penalty that can be switched off independently
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Toggle {
    pub enabled: bool,
    pub value: f64,
}

impl Toggle {
    pub const fn on(value: f64) -> Self {
        Self {
            enabled: true,
            value,
        }
    }

    /// The configured value, or zero when disabled
    pub fn get(&self) -> f64 {
        if self.enabled {
            self.value
        } else {
            0.0
        }
    }
}

/// Pace score calculator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub neutral_position: f64,
    pub recent_window: usize,
    pub recent_weight: f64,
    pub recent_statistic: RecentStatistic,
    pub target_mode: TargetMode,
    pub venue_bonus: f64,
    pub distance_clip_m: f64,
    pub distance_scale_per_100m: f64,
    pub weight_factor: f64,
    pub regional_adjustment: f64,
    pub post_step: f64,
    pub early_speed_enabled: bool,
    pub early_speed_window: usize,
    pub reference_speed: f64,
    pub speed_gap_clip: f64,
    pub speed_multiplier: f64,
    pub sprint_dirt_speed_multiplier: f64,
    pub sprint_max_distance: u32,
    pub speed_distance_clip_m: f64,
    pub speed_distance_scale: f64,
    pub escape_only_enabled: bool,
    pub promotion_shock: Toggle,
    pub slow_start_repeat: Toggle,
    pub slow_start_recovery: Toggle,
    pub slow_start_close_position: u32,
    pub wait_and_see: Toggle,
    pub wide_post_ratio: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            neutral_position: NEUTRAL_POSITION,
            recent_window: RECENT_WINDOW,
            recent_weight: RECENT_WEIGHT,
            recent_statistic: RecentStatistic::Median,
            target_mode: TargetMode::BestMemory,
            venue_bonus: SAME_VENUE_BONUS,
            distance_clip_m: DISTANCE_CLIP_M,
            distance_scale_per_100m: DISTANCE_SCALE_PER_100M,
            weight_factor: WEIGHT_FACTOR,
            regional_adjustment: REGIONAL_ADJUSTMENT,
            post_step: POST_STEP,
            early_speed_enabled: true,
            early_speed_window: EARLY_SPEED_WINDOW,
            reference_speed: REFERENCE_SPEED,
            speed_gap_clip: SPEED_GAP_CLIP,
            speed_multiplier: SPEED_MULTIPLIER,
            sprint_dirt_speed_multiplier: SPRINT_DIRT_SPEED_MULTIPLIER,
            sprint_max_distance: SPRINT_MAX_DISTANCE,
            speed_distance_clip_m: SPEED_DISTANCE_CLIP_M,
            speed_distance_scale: SPEED_DISTANCE_SCALE,
            escape_only_enabled: true,
            promotion_shock: Toggle::on(PROMOTION_PENALTY),
            slow_start_repeat: Toggle::on(SLOW_START_REPEAT_PENALTY),
            slow_start_recovery: Toggle::on(SLOW_START_RECOVERY_PENALTY),
            slow_start_close_position: SLOW_START_CLOSE_POSITION,
            wait_and_see: Toggle::on(WAIT_AND_SEE_PENALTY),
            wide_post_ratio: WIDE_POST_RATIO,
        }
    }
}

/// Inter-horse synergy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynergyConfig {
    pub drafting_enabled: bool,
    pub yield_enabled: bool,
    pub stalk_band_low: f64,
    pub stalk_band_high: f64,
    pub clear_leader_score: f64,
    pub draft_reach: u32,
    pub draft_bonus: f64,
    pub contest_margin: f64,
    pub yield_penalty_favoured: f64,
    pub yield_penalty_default: f64,
}

impl Default for SynergyConfig {
    fn default() -> Self {
        Self {
            drafting_enabled: true,
            yield_enabled: true,
            stalk_band_low: STALK_BAND_LOW,
            stalk_band_high: STALK_BAND_HIGH,
            clear_leader_score: CLEAR_LEADER_SCORE,
            draft_reach: DRAFT_REACH,
            draft_bonus: DRAFT_BONUS,
            contest_margin: CONTEST_MARGIN,
            yield_penalty_favoured: YIELD_PENALTY_FAVOURED,
            yield_penalty_default: YIELD_PENALTY_DEFAULT,
        }
    }
}

/// Formation band thresholds, relative to the top score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub leader_gap: f64,
    pub chaser_gap: f64,
    pub midfield_gap: f64,
    pub max_leaders: usize,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            leader_gap: LEADER_GAP,
            chaser_gap: CHASER_GAP,
            midfield_gap: MIDFIELD_GAP,
            max_leaders: MAX_LEADERS,
        }
    }
}

/// Narrative rule-table thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub turf_fast_speed: f64,
    pub turf_slow_speed: f64,
    pub dirt_fast_speed: f64,
    pub dirt_slow_speed: f64,
    pub strung_out_gap: f64,
    pub spread_percentile: f64,
    pub lone_leader_gap: f64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            turf_fast_speed: TURF_FAST_SPEED,
            turf_slow_speed: TURF_SLOW_SPEED,
            dirt_fast_speed: DIRT_FAST_SPEED,
            dirt_slow_speed: DIRT_SLOW_SPEED,
            strung_out_gap: STRUNG_OUT_GAP,
            spread_percentile: SPREAD_PERCENTILE,
            lone_leader_gap: LONE_LEADER_GAP,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaceConfig {
    #[serde(default)]
    pub score: ScoreConfig,
    #[serde(default)]
    pub synergy: SynergyConfig,
    #[serde(default)]
    pub formation: FormationConfig,
    #[serde(default)]
    pub narrative: NarrativeConfig,
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub pace: PaceConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (PACE__SERVER__PORT, etc.)
            .add_source(
                config::Environment::with_prefix("PACE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
