//! Pace formation engine.
//!
//! Pure and synchronous: historical records in, scored and banded field out.

pub mod course;
pub mod formation;
pub mod model;
pub mod narrative;
pub mod score;
pub mod signals;
pub mod synergy;

use serde::Serialize;
use std::collections::HashSet;

use crate::config::PaceConfig;
use crate::error::PaceError;
use formation::{classify, Formation};
use model::{HorseEntry, RaceContext, ScoredHorse, TrackType};
use narrative::{summarize, PaceSummary};
use score::rate_horse;

/// Full result for one race
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceAnalysis {
    pub context: RaceContext,
    /// Sorted by score, then horse number
    pub horses: Vec<ScoredHorse>,
    pub formation: Formation,
    pub formation_text: String,
    pub summary: PaceSummary,
}

/// Check the race context and runner list before scoring
pub fn validate(context: &RaceContext, horses: &[HorseEntry]) -> Result<(), PaceError> {
    if context.distance == 0 {
        return Err(PaceError::InvalidDistance);
    }
    if context.field_size == 0 {
        return Err(PaceError::InvalidFieldSize);
    }
    if context.track_type == TrackType::Jump {
        return Err(PaceError::UnsupportedTrack);
    }
    if horses.is_empty() {
        return Err(PaceError::EmptyField);
    }
    if (context.field_size as usize) < horses.len() {
        return Err(PaceError::FieldSizeMismatch {
            field_size: context.field_size,
            runners: horses.len(),
        });
    }

    let mut seen = HashSet::new();
    for horse in horses {
        if horse.horse_number == 0 {
            return Err(PaceError::InvalidHorseNumber);
        }
        if !seen.insert(horse.horse_number) {
            return Err(PaceError::DuplicateHorseNumber(horse.horse_number));
        }
    }

    Ok(())
}

/// Run the whole pipeline: score, synergy, sort, band, summarise
pub fn analyze(
    context: &RaceContext,
    horses: &[HorseEntry],
    config: &PaceConfig,
) -> Result<RaceAnalysis, PaceError> {
    validate(context, horses)?;

    let rated = horses
        .iter()
        .map(|h| rate_horse(h, context, &config.score))
        .collect();
    let mut rated = synergy::adjust(rated, context, &config.synergy);

    rated.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then(a.horse_number.cmp(&b.horse_number))
    });

    let scores: Vec<f64> = rated.iter().map(|h| h.score).collect();
    let bands = classify(&scores, &config.formation);
    let sorted: Vec<ScoredHorse> = rated
        .into_iter()
        .zip(bands.iter().copied())
        .map(|(horse, band)| ScoredHorse::new(horse, band))
        .collect();

    let numbers: Vec<u32> = sorted.iter().map(|h| h.horse_number).collect();
    let formation = Formation::from_bands(&numbers, &bands);
    let summary = summarize(&sorted, context, &config.narrative);

    Ok(RaceAnalysis {
        context: context.clone(),
        formation_text: formation.to_string(),
        formation,
        horses: sorted,
        summary,
    })
}
