//! Inter-horse synergy pass.
//!
//! Runs once over the field in post-position order after individual
//! scoring. Later posts see the scores earlier posts were given in the same
//! pass; nothing is iterated to a fixed point.

use super::course::course_profile;
use super::model::{Annotation, RaceContext, RatedHorse, RunningStyle};
use super::score::clamp_score;
use crate::config::SynergyConfig;

fn shift(horse: &mut RatedHorse, delta: f64) {
    let before = horse.score;
    horse.score = clamp_score(horse.score + delta);
    horse.synergy += horse.score - before;
}

/// Rule A: a stalker drawn just outside a clear leader tucks in behind it
fn apply_drafting(horses: &mut [RatedHorse], config: &SynergyConfig) {
    for i in 0..horses.len() {
        let score = horses[i].score;
        if score <= config.stalk_band_low || score > config.stalk_band_high {
            continue;
        }

        let number = horses[i].horse_number;
        let ahead = horses[..i]
            .iter()
            .rev()
            .take_while(|h| number - h.horse_number <= config.draft_reach)
            .find(|h| h.score <= config.clear_leader_score)
            .map(|h| h.horse_number);

        if let Some(behind) = ahead {
            shift(&mut horses[i], -config.draft_bonus);
            horses[i].annotations.push(Annotation::Drafting { behind });
        }
    }
}

/// Rule B: a must-lead horse facing a quicker rival gives up the lead.
///
/// Near-equal rivals are resolved by the course's draw bias: the horse on
/// the favoured side keeps the lead.
fn apply_yield(horses: &mut [RatedHorse], outside_favoured: bool, config: &SynergyConfig) {
    for i in 0..horses.len() {
        if horses[i].signals.running_style != RunningStyle::MustLead {
            continue;
        }

        let number = horses[i].horse_number;
        let score = horses[i].score;
        let stubborn = horses[i].signals.escape_only;

        let owns_favoured_side = |rival: u32| {
            if outside_favoured {
                rival > number
            } else {
                rival < number
            }
        };

        let rival = horses
            .iter()
            .filter(|r| r.horse_number != number)
            .filter(|r| {
                r.score < score
                    || (!stubborn
                        && r.score - score <= config.contest_margin
                        && owns_favoured_side(r.horse_number))
            })
            .min_by(|a, b| {
                a.score
                    .total_cmp(&b.score)
                    .then(a.horse_number.cmp(&b.horse_number))
            })
            .map(|r| r.horse_number);

        let Some(to) = rival else {
            continue;
        };

        let penalty = if owns_favoured_side(to) {
            config.yield_penalty_favoured
        } else {
            config.yield_penalty_default
        };
        shift(&mut horses[i], penalty);
        horses[i].yields_lead = true;
        horses[i].annotations.push(Annotation::YieldsLead { to });
    }
}

/// Apply drafting then yield-the-lead; returns the field in post order
pub fn adjust(
    mut horses: Vec<RatedHorse>,
    context: &RaceContext,
    config: &SynergyConfig,
) -> Vec<RatedHorse> {
    horses.sort_by_key(|h| h.horse_number);

    if config.drafting_enabled {
        apply_drafting(&mut horses, config);
    }

    if config.yield_enabled {
        let outside_favoured =
            course_profile(&context.venue, context.track_type, context.distance).outside_favoured;
        apply_yield(&mut horses, outside_favoured, config);
    }

    horses
}
