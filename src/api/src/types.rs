//! Request and response types for the pace API.

use serde::{Deserialize, Serialize};

use crate::pace::formation::Formation;
use crate::pace::model::{
    Annotation, Band, HorseEntry, RaceContext, RunningStyle, ScoreBreakdown, ScoredHorse, TrackType,
};
use crate::pace::narrative::PaceSummary;
use crate::pace::RaceAnalysis;
use crate::report::{annotation_text, style_label};

/// Race conditions as supplied by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct RaceInput {
    pub distance: u32,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub track_type: TrackType,
    /// Defaults to the number of runners supplied
    #[serde(default)]
    pub field_size: Option<u32>,
}

/// Pace analysis request
#[derive(Debug, Clone, Deserialize)]
pub struct PaceRequest {
    #[serde(default)]
    pub race_id: Option<String>,
    pub race: RaceInput,
    pub horses: Vec<HorseEntry>,
}

impl PaceRequest {
    pub fn context(&self) -> RaceContext {
        RaceContext {
            distance: self.race.distance,
            venue: self.race.venue.clone(),
            track_type: self.race.track_type,
            field_size: self
                .race
                .field_size
                .unwrap_or(self.horses.len() as u32),
        }
    }
}

/// Per-horse result row
#[derive(Debug, Clone, Serialize)]
pub struct HorseResult {
    pub horse_number: u32,
    pub horse_name: String,
    pub score: f64,
    pub band: Band,
    pub running_style: RunningStyle,
    pub style_label: String,
    pub yields_lead: bool,
    pub escape_only: bool,
    pub current_weight: f64,
    pub evidence_races: usize,
    pub breakdown: ScoreBreakdown,
    pub synergy: f64,
    pub annotations: Vec<Annotation>,
    /// Display text for each annotation
    pub notes: Vec<String>,
}

impl From<&ScoredHorse> for HorseResult {
    fn from(horse: &ScoredHorse) -> Self {
        Self {
            horse_number: horse.horse_number,
            horse_name: horse.horse_name.clone(),
            score: horse.score,
            band: horse.band,
            running_style: horse.running_style(),
            style_label: style_label(horse.running_style(), horse.yields_lead).to_string(),
            yields_lead: horse.yields_lead,
            escape_only: horse.signals.escape_only,
            current_weight: horse.current_weight,
            evidence_races: horse.evidence_races,
            breakdown: horse.breakdown.clone(),
            synergy: horse.synergy,
            notes: horse.annotations.iter().map(annotation_text).collect(),
            annotations: horse.annotations.clone(),
        }
    }
}

/// Pace analysis response
#[derive(Debug, Serialize)]
pub struct PaceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_id: Option<String>,
    pub race: RaceContext,
    pub formation: Formation,
    pub formation_text: String,
    pub summary: PaceSummary,
    /// In predicted running order
    pub horses: Vec<HorseResult>,
}

impl PaceResponse {
    pub fn new(race_id: Option<String>, analysis: RaceAnalysis) -> Self {
        Self {
            race_id,
            horses: analysis.horses.iter().map(HorseResult::from).collect(),
            race: analysis.context,
            formation: analysis.formation,
            formation_text: analysis.formation_text,
            summary: analysis.summary,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
