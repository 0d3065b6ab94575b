//! Pace score calculator.
//!
//! Scores sit on a 1–18 position scale: 1 is a certain leader, 18 the last
//! horse to leave the gates. Every term is additive and recorded in a
//! [`ScoreBreakdown`].

use super::course::course_profile;
use super::model::{
    Annotation, HorseEntry, HorseSignals, PastRaceRecord, RaceContext, RatedHorse, RunningStyle,
    ScoreBreakdown,
};
use super::signals::extract_signals;
use crate::config::{ScoreConfig, MAX_SCORE, MIN_SCORE};

/// Calculator output for one horse
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutput {
    pub breakdown: ScoreBreakdown,
    pub annotations: Vec<Annotation>,
}

pub fn clamp_score(score: f64) -> f64 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

fn draw_ratio(post: u32, field_size: u32) -> f64 {
    post as f64 / field_size.max(1) as f64
}

/// Per-stall penalty for wide draws, reversed where the course favours them
fn post_term(horse: &HorseEntry, signals: &HorseSignals, context: &RaceContext, config: &ScoreConfig) -> f64 {
    if signals.escape_only && config.escape_only_enabled {
        return 0.0;
    }
    let base = horse.horse_number.saturating_sub(1) as f64 * config.post_step;
    if course_profile(&context.venue, context.track_type, context.distance).outside_favoured {
        -base
    } else {
        base
    }
}

fn early_speed_term(signals: &HorseSignals, context: &RaceContext, config: &ScoreConfig) -> f64 {
    if !config.early_speed_enabled {
        return 0.0;
    }
    let Some(best) = signals.best_early_speed else {
        return 0.0;
    };
    let clip = config.speed_gap_clip;
    let gap = (config.reference_speed - best).clamp(-clip, clip);
    let multiplier = if context.is_dirt_sprint(config.sprint_max_distance) {
        config.sprint_dirt_speed_multiplier
    } else {
        config.speed_multiplier
    };
    gap * multiplier
}

fn distance_term(last: &PastRaceRecord, context: &RaceContext, config: &ScoreConfig) -> f64 {
    let clip = config.distance_clip_m;
    let diff = (last.distance as f64 - context.distance as f64).clamp(-clip, clip);
    diff / 100.0 * config.distance_scale_per_100m
}

fn weight_change(horse: &HorseEntry, last: &PastRaceRecord) -> f64 {
    last.weight_carried
        .map(|w| horse.current_weight - w)
        .unwrap_or(0.0)
}

/// Slow-start recovery check against today's draw.
///
/// A horse that broke poorly yet still raced close up made its ground from
/// the side of the gates it was drawn on. Drawn on the other side today,
/// that route forward is gone. An unknown past draw counts as recovered.
fn slow_start_term(
    horse: &HorseEntry,
    last: &PastRaceRecord,
    context: &RaceContext,
    config: &ScoreConfig,
    annotations: &mut Vec<Annotation>,
) -> f64 {
    if !last.had_slow_start || last.first_corner_position > config.slow_start_close_position {
        return 0.0;
    }

    let past_outside = match (last.post_position, last.field_size) {
        (Some(post), Some(field)) if field > 0 => Some(draw_ratio(post, field) > 0.5),
        _ => None,
    };
    let outside_today = draw_ratio(horse.horse_number, context.field_size) > 0.5;

    match past_outside {
        Some(past) if past != outside_today => {
            if config.slow_start_repeat.enabled {
                annotations.push(Annotation::SlowStartRepeatRisk);
            }
            config.slow_start_repeat.get()
        }
        _ => {
            if config.slow_start_recovery.enabled {
                annotations.push(Annotation::SlowStartRecovered);
            }
            config.slow_start_recovery.get()
        }
    }
}

/// Score one horse from its extracted signals.
///
/// Pure: identical inputs give bit-identical output. An empty history
/// yields the neutral position plus the draw term only.
pub fn score_horse(
    horse: &HorseEntry,
    signals: &HorseSignals,
    context: &RaceContext,
    config: &ScoreConfig,
) -> ScoreOutput {
    let mut annotations = Vec::new();
    let post = post_term(horse, signals, context, config);
    let races = horse.flat_races();

    let Some(last) = races.first().copied() else {
        annotations.push(Annotation::NoHistory);
        let mut breakdown = ScoreBreakdown {
            base: config.neutral_position,
            post,
            ..Default::default()
        };
        breakdown.total = clamp_score(breakdown.raw());
        return ScoreOutput {
            breakdown,
            annotations,
        };
    };

    if signals.escape_only && config.escape_only_enabled {
        annotations.push(Annotation::EscapeOnly);
    }

    // 1. Recent form blended with the jockey's target position
    let base = match signals.recent_position {
        Some(recent) => {
            recent * config.recent_weight + signals.target_position * (1.0 - config.recent_weight)
        }
        None => signals.target_position,
    };

    // 2-4. Early speed, distance change, weight change
    let early_speed = early_speed_term(signals, context, config);
    let distance = distance_term(last, context, config);
    let weight_delta = weight_change(horse, last);
    let weight = weight_delta * config.weight_factor;

    // 5. Regional circuit
    let circuit = if last.is_local_circuit {
        annotations.push(Annotation::RegionalForm);
        config.regional_adjustment
    } else {
        0.0
    };

    // 7. Context penalties
    let mut context_term = 0.0;

    if last.is_win() && config.promotion_shock.enabled {
        annotations.push(Annotation::PromotionShock);
        context_term += config.promotion_shock.get();
    }

    context_term += slow_start_term(horse, last, context, config, &mut annotations);

    let front_runner = signals.running_style == RunningStyle::MustLead
        || (signals.escape_only && config.escape_only_enabled);
    if config.wait_and_see.enabled
        && !front_runner
        && draw_ratio(horse.horse_number, context.field_size) > config.wide_post_ratio
        && weight_delta >= 0.0
    {
        annotations.push(Annotation::WaitAndSee);
        context_term += config.wait_and_see.get();
    }

    let mut breakdown = ScoreBreakdown {
        base,
        early_speed,
        distance,
        weight,
        circuit,
        post,
        context: context_term,
        total: 0.0,
    };
    breakdown.total = clamp_score(breakdown.raw());

    ScoreOutput {
        breakdown,
        annotations,
    }
}

/// Extract signals and score one horse
pub fn rate_horse(horse: &HorseEntry, context: &RaceContext, config: &ScoreConfig) -> RatedHorse {
    let signals = extract_signals(horse, context, config);
    let output = score_horse(horse, &signals, context, config);
    RatedHorse {
        horse_number: horse.horse_number,
        horse_name: horse.horse_name.clone(),
        current_weight: horse.current_weight,
        evidence_races: horse.flat_races().len(),
        score: output.breakdown.total,
        breakdown: output.breakdown,
        signals,
        annotations: output.annotations,
        synergy: 0.0,
        yields_lead: false,
    }
}
