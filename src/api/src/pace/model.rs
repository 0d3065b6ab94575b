//! Input records and per-stage outputs of the pace engine.

use serde::{Deserialize, Serialize};

/// Racing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    #[default]
    Turf,
    Dirt,
    Jump,
}

/// Going (良 / 稍重 / 重 / 不良)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackCondition {
    #[default]
    Good,
    SlightlyHeavy,
    Heavy,
    Bad,
}

impl TrackCondition {
    /// 0 for good ground up to 3 for bad ground
    pub fn severity(self) -> f64 {
        match self {
            TrackCondition::Good => 0.0,
            TrackCondition::SlightlyHeavy => 1.0,
            TrackCondition::Heavy => 2.0,
            TrackCondition::Bad => 3.0,
        }
    }
}

fn default_popularity() -> u32 {
    7
}

fn default_corner() -> u32 {
    7
}

/// One historical start. Lists of these are ordered most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastRaceRecord {
    pub finish_position: u32,
    #[serde(default = "default_popularity")]
    pub popularity: u32,
    #[serde(default = "default_corner")]
    pub first_corner_position: u32,
    pub distance: u32,
    #[serde(default)]
    pub track_type: TrackType,
    #[serde(default)]
    pub track_condition: TrackCondition,
    #[serde(default)]
    pub venue: String,
    /// Missing weight means "same as today"
    #[serde(default)]
    pub weight_carried: Option<f64>,
    #[serde(default)]
    pub is_local_circuit: bool,
    /// Derived from `venue` when absent
    #[serde(default)]
    pub is_same_venue: Option<bool>,
    #[serde(default)]
    pub had_slow_start: bool,
    #[serde(default)]
    pub post_position: Option<u32>,
    #[serde(default)]
    pub field_size: Option<u32>,
    /// Opening 600m split in seconds
    #[serde(default)]
    pub early_time: Option<f64>,
}

impl PastRaceRecord {
    pub fn is_win(&self) -> bool {
        self.finish_position == 1
    }

    /// Finished better than the betting market ranked it
    pub fn beat_market(&self) -> bool {
        self.popularity > self.finish_position
    }

    pub fn same_venue_as(&self, venue: &str) -> bool {
        match self.is_same_venue {
            Some(flag) => flag,
            None => !self.venue.is_empty() && !venue.is_empty() && venue.contains(&self.venue),
        }
    }
}

fn default_weight() -> f64 {
    55.0
}

/// A declared runner as handed over by the acquisition layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseEntry {
    pub horse_number: u32,
    #[serde(default)]
    pub horse_name: String,
    #[serde(default = "default_weight")]
    pub current_weight: f64,
    #[serde(default)]
    pub past_races: Vec<PastRaceRecord>,
}

impl HorseEntry {
    /// Past races usable as evidence (jump races excluded)
    pub fn flat_races(&self) -> Vec<&PastRaceRecord> {
        self.past_races
            .iter()
            .filter(|r| r.track_type != TrackType::Jump)
            .collect()
    }
}

/// Conditions of the race being forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceContext {
    pub distance: u32,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub track_type: TrackType,
    pub field_size: u32,
}

impl RaceContext {
    pub fn is_dirt_sprint(&self, max_distance: u32) -> bool {
        self.track_type == TrackType::Dirt && self.distance <= max_distance
    }
}

/// Early-position temperament learned from good runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningStyle {
    MustLead,
    CanYield,
    Closer,
    #[default]
    Unknown,
}

/// Why a score moved, kept as data so callers can test and render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// No usable past races; neutral score
    NoHistory,
    /// Only hits the board from the front on the major circuit
    EscapeOnly,
    /// Last start was on the regional circuit
    RegionalForm,
    /// Won last time, steps up in company
    PromotionShock,
    /// Recovered from a slow start last time, but the draw no longer helps
    SlowStartRepeatRisk,
    /// Recovered from a slow start last time under similar conditions
    SlowStartRecovered,
    /// Drawn wide without a weight drop; likely to sit and wait
    WaitAndSee,
    /// Can tuck in behind a leader drawn just inside
    Drafting { behind: u32 },
    /// Will likely hand the lead to a quicker rival
    YieldsLead { to: u32 },
}

/// Extractor outputs for one horse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorseSignals {
    pub target_position: f64,
    pub recent_position: Option<f64>,
    pub best_early_speed: Option<f64>,
    pub running_style: RunningStyle,
    pub escape_only: bool,
}

/// Every additive term of the score, kept for explanation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub early_speed: f64,
    pub distance: f64,
    pub weight: f64,
    pub circuit: f64,
    pub post: f64,
    pub context: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    /// Sum of the terms before clamping
    pub fn raw(&self) -> f64 {
        self.base + self.early_speed + self.distance + self.weight + self.circuit + self.post
            + self.context
    }
}

/// A horse after scoring and synergy, before banding
#[derive(Debug, Clone, PartialEq)]
pub struct RatedHorse {
    pub horse_number: u32,
    pub horse_name: String,
    pub current_weight: f64,
    pub evidence_races: usize,
    pub breakdown: ScoreBreakdown,
    pub signals: HorseSignals,
    pub annotations: Vec<Annotation>,
    /// Net change applied by the synergy pass
    pub synergy: f64,
    pub score: f64,
    pub yields_lead: bool,
}

/// Running-order band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Leader,
    Chaser,
    Midfield,
    Backmarker,
}

/// Final per-horse result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredHorse {
    pub horse_number: u32,
    pub horse_name: String,
    pub current_weight: f64,
    pub evidence_races: usize,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub synergy: f64,
    pub signals: HorseSignals,
    pub annotations: Vec<Annotation>,
    pub yields_lead: bool,
    pub band: Band,
}

impl ScoredHorse {
    pub fn new(rated: RatedHorse, band: Band) -> Self {
        Self {
            horse_number: rated.horse_number,
            horse_name: rated.horse_name,
            current_weight: rated.current_weight,
            evidence_races: rated.evidence_races,
            score: rated.score,
            breakdown: rated.breakdown,
            synergy: rated.synergy,
            signals: rated.signals,
            annotations: rated.annotations,
            yields_lead: rated.yields_lead,
            band,
        }
    }

    pub fn running_style(&self) -> RunningStyle {
        self.signals.running_style
    }
}
