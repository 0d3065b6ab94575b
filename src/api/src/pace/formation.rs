//! Formation classifier: relative banding of the sorted field.

use serde::Serialize;
use std::fmt;

use super::model::Band;
use crate::config::FormationConfig;

/// Assign a band to each score of an ascending score list.
///
/// Thresholds are offsets from the top score. The leader band is capped
/// and never empty for a non-empty field.
pub fn classify(sorted_scores: &[f64], config: &FormationConfig) -> Vec<Band> {
    let Some(&top) = sorted_scores.first() else {
        return Vec::new();
    };

    let mut leaders = 0;
    let mut bands: Vec<Band> = sorted_scores
        .iter()
        .map(|&score| {
            if score <= top + config.leader_gap && leaders < config.max_leaders {
                leaders += 1;
                Band::Leader
            } else if score <= top + config.chaser_gap {
                Band::Chaser
            } else if score <= top + config.midfield_gap {
                Band::Midfield
            } else {
                Band::Backmarker
            }
        })
        .collect();

    if leaders == 0 {
        bands[0] = Band::Leader;
    }

    bands
}

/// Circled horse-number glyph (①..⑳), plain digits beyond 20
pub fn horse_glyph(number: u32) -> String {
    match number {
        1..=20 => char::from_u32(0x245F + number)
            .map(|c| c.to_string())
            .unwrap_or_else(|| number.to_string()),
        _ => format!("({})", number),
    }
}

/// Horse numbers per band, each in score order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Formation {
    pub leaders: Vec<u32>,
    pub chasers: Vec<u32>,
    pub midfield: Vec<u32>,
    pub backmarkers: Vec<u32>,
}

impl Formation {
    /// Group horse numbers (in score order) by their bands
    pub fn from_bands(numbers: &[u32], bands: &[Band]) -> Self {
        let mut formation = Formation::default();
        for (&number, band) in numbers.iter().zip(bands) {
            match band {
                Band::Leader => formation.leaders.push(number),
                Band::Chaser => formation.chasers.push(number),
                Band::Midfield => formation.midfield.push(number),
                Band::Backmarker => formation.backmarkers.push(number),
            }
        }
        formation
    }
}

impl fmt::Display for Formation {
    /// `(leaders) chasers midfield backmarkers`, empty bands omitted
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyphs = |numbers: &[u32]| numbers.iter().map(|&n| horse_glyph(n)).collect::<String>();

        let mut parts = Vec::new();
        if !self.leaders.is_empty() {
            parts.push(format!("({})", glyphs(self.leaders.as_slice())));
        }
        for group in [&self.chasers, &self.midfield, &self.backmarkers] {
            if !group.is_empty() {
                parts.push(glyphs(group.as_slice()));
            }
        }
        write!(f, "{}", parts.join(" "))
    }
}
