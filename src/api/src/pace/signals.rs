//! Position signal extractors.
//!
//! Each function reads a horse's past races (most recent first, jump races
//! already removed) and returns one signal. None of them fail: sparse
//! history falls back to a neutral value or `None`.

use super::course::{course_profile, StartProfile};
use super::model::{HorseEntry, HorseSignals, PastRaceRecord, RaceContext, RunningStyle, TrackType};
use crate::config::{
    RecentStatistic, ScoreConfig, TargetMode, DOWNHILL_START_SPEED_CORRECTION, EARLY_SEGMENT_M,
    GOING_SPEED_STEP, TURF_START_SPEED_CORRECTION, UPHILL_START_SPEED_CORRECTION, WIN_BONUS,
};

/// Won, or finished ahead of the market's ranking
fn is_success(race: &PastRaceRecord) -> bool {
    race.is_win() || race.beat_market()
}

/// Board finish, or an overachieving run close to the board
fn is_good_run(race: &PastRaceRecord) -> bool {
    race.finish_position <= 3 || (race.beat_market() && race.finish_position <= 5)
}

fn surprise_score(race: &PastRaceRecord, venue: &str, config: &ScoreConfig) -> f64 {
    let upset = race.popularity as f64 - race.finish_position as f64;
    let win_bonus = if race.is_win() { WIN_BONUS } else { 0.0 };
    let venue_bonus = if race.same_venue_as(venue) {
        config.venue_bonus
    } else {
        0.0
    };
    upset + win_bonus + venue_bonus
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Position the jockey is likely to aim for, anchored on the horse's most
/// memorable overachieving run.
///
/// Successes are ranked by `(popularity - finish) + 10 * win + venue_bonus *
/// same_venue`; the most recent race wins ties. Without any success the mean
/// first-corner position is used, and without any race the neutral default.
pub fn extract_target_position(
    races: &[&PastRaceRecord],
    venue: &str,
    config: &ScoreConfig,
) -> f64 {
    if races.is_empty() {
        return config.neutral_position;
    }

    let successes: Vec<&PastRaceRecord> = races.iter().copied().filter(|r| is_success(r)).collect();

    if successes.is_empty() {
        let corners: Vec<f64> = races.iter().map(|r| r.first_corner_position as f64).collect();
        return mean(&corners).unwrap_or(config.neutral_position);
    }

    if config.target_mode == TargetMode::CourseFirst && !venue.is_empty() {
        if let Some(race) = successes.iter().find(|r| r.same_venue_as(venue)) {
            return race.first_corner_position as f64;
        }
    }

    let mut best = successes[0];
    let mut best_score = surprise_score(best, venue, config);
    for &race in &successes[1..] {
        let score = surprise_score(race, venue, config);
        if score > best_score {
            best = race;
            best_score = score;
        }
    }

    best.first_corner_position as f64
}

/// Recent first-corner statistic over the last `window` races
pub fn recent_position(
    races: &[&PastRaceRecord],
    window: usize,
    statistic: RecentStatistic,
) -> Option<f64> {
    let corners: Vec<f64> = races
        .iter()
        .take(window.max(1))
        .map(|r| r.first_corner_position as f64)
        .collect();
    match statistic {
        RecentStatistic::Mean => mean(&corners),
        RecentStatistic::Median => median(&corners),
    }
}

/// Normalised early speed (m/s over the opening 600m) of one past race,
/// projected onto today's distance.
///
/// Returns `None` when the split was not recorded.
pub fn estimate_early_speed(
    race: &PastRaceRecord,
    context: &RaceContext,
    config: &ScoreConfig,
) -> Option<f64> {
    let time = race.early_time.filter(|t| t.is_finite() && *t > 0.0)?;
    let mut speed = EARLY_SEGMENT_M / time;

    // Soft turf slows raw times for the same effort; wet dirt speeds them up
    let going = race.track_condition.severity() * GOING_SPEED_STEP;
    speed += match race.track_type {
        TrackType::Dirt => -going,
        _ => going,
    };

    speed += match course_profile(&race.venue, race.track_type, race.distance).start {
        StartProfile::TurfStartDirt => TURF_START_SPEED_CORRECTION,
        StartProfile::Uphill => UPHILL_START_SPEED_CORRECTION,
        StartProfile::Downhill => DOWNHILL_START_SPEED_CORRECTION,
        StartProfile::Flat => 0.0,
    };

    let clip = config.speed_distance_clip_m;
    let diff = (race.distance as f64 - context.distance as f64).clamp(-clip, clip);
    speed += diff * config.speed_distance_scale;

    Some(speed)
}

/// Fastest normalised early speed over the recent window
pub fn best_early_speed(
    races: &[&PastRaceRecord],
    context: &RaceContext,
    config: &ScoreConfig,
) -> Option<f64> {
    races
        .iter()
        .take(config.early_speed_window)
        .filter_map(|r| estimate_early_speed(r, context, config))
        .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
}

/// Classify temperament from the first-corner positions of good runs
pub fn determine_running_style(races: &[&PastRaceRecord]) -> RunningStyle {
    let corners: Vec<u32> = races
        .iter()
        .filter(|r| is_good_run(r))
        .map(|r| r.first_corner_position)
        .collect();

    if corners.is_empty() {
        RunningStyle::Unknown
    } else if corners.iter().all(|&c| c == 1) {
        RunningStyle::MustLead
    } else if corners.iter().any(|c| (2..=5).contains(c)) {
        RunningStyle::CanYield
    } else {
        RunningStyle::Closer
    }
}

/// Horse that has only ever made the board from the front.
///
/// Regional-circuit starts are ignored: their slower early pace hands out
/// easy leads.
pub fn is_escape_only(races: &[&PastRaceRecord]) -> bool {
    let board: Vec<&PastRaceRecord> = races
        .iter()
        .copied()
        .filter(|r| !r.is_local_circuit && r.finish_position <= 3)
        .collect();

    !board.is_empty() && board.iter().all(|r| r.first_corner_position == 1)
}

/// Run every extractor for one horse
pub fn extract_signals(horse: &HorseEntry, context: &RaceContext, config: &ScoreConfig) -> HorseSignals {
    let races = horse.flat_races();
    HorseSignals {
        target_position: extract_target_position(&races, &context.venue, config),
        recent_position: recent_position(&races, config.recent_window, config.recent_statistic),
        best_early_speed: best_early_speed(&races, context, config),
        running_style: determine_running_style(&races),
        escape_only: config.escape_only_enabled && is_escape_only(&races),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pace::model::TrackCondition;

    fn race(finish: u32, popularity: u32, corner: u32) -> PastRaceRecord {
        PastRaceRecord {
            finish_position: finish,
            popularity,
            first_corner_position: corner,
            distance: 1600,
            track_type: TrackType::Turf,
            track_condition: TrackCondition::Good,
            venue: "中山".to_string(),
            weight_carried: Some(55.0),
            is_local_circuit: false,
            is_same_venue: None,
            had_slow_start: false,
            post_position: None,
            field_size: None,
            early_time: None,
        }
    }

    fn context() -> RaceContext {
        RaceContext {
            distance: 1600,
            venue: "東京".to_string(),
            track_type: TrackType::Turf,
            field_size: 16,
        }
    }

    #[test]
    fn test_target_empty_is_neutral() {
        let cfg = ScoreConfig::default();
        assert_eq!(extract_target_position(&[], "東京", &cfg), 7.0);
    }

    #[test]
    fn test_target_same_venue_upset_win() {
        let cfg = ScoreConfig::default();
        let mut last = race(1, 5, 1);
        last.is_same_venue = Some(true);
        let older = race(2, 6, 8);
        let races = vec![&last, &older];
        assert_eq!(extract_target_position(&races, "東京", &cfg), 1.0);
    }

    #[test]
    fn test_target_prefers_higher_surprise() {
        let cfg = ScoreConfig::default();
        // 4 - 3 = 1
        let last = race(3, 4, 2);
        // 12 - 1 + 10 = 21
        let older = race(1, 12, 9);
        let races = vec![&last, &older];
        assert_eq!(extract_target_position(&races, "東京", &cfg), 9.0);
    }

    #[test]
    fn test_target_tie_keeps_most_recent() {
        let cfg = ScoreConfig::default();
        let last = race(2, 4, 3);
        let older = race(3, 5, 10);
        let races = vec![&last, &older];
        assert_eq!(extract_target_position(&races, "", &cfg), 3.0);
    }

    #[test]
    fn test_target_without_success_uses_mean() {
        let cfg = ScoreConfig::default();
        let a = race(8, 2, 4);
        let b = race(10, 3, 6);
        let races = vec![&a, &b];
        assert_eq!(extract_target_position(&races, "東京", &cfg), 5.0);
    }

    #[test]
    fn test_target_course_first_mode() {
        let cfg = ScoreConfig {
            target_mode: TargetMode::CourseFirst,
            ..Default::default()
        };
        let last = race(1, 12, 9);
        let mut older = race(2, 3, 4);
        older.venue = "東京".to_string();
        let races = vec![&last, &older];
        assert_eq!(extract_target_position(&races, "東京", &cfg), 4.0);

        // Surprise ranking without the course filter
        let cfg = ScoreConfig::default();
        assert_eq!(extract_target_position(&races, "東京", &cfg), 9.0);
    }

    #[test]
    fn test_recent_position_median_resists_outlier() {
        let a = race(5, 5, 2);
        let b = race(5, 5, 14);
        let c = race(5, 5, 3);
        let d = race(5, 5, 1);
        let races = vec![&a, &b, &c, &d];
        assert_eq!(recent_position(&races, 3, RecentStatistic::Median), Some(3.0));
        let mean = recent_position(&races, 3, RecentStatistic::Mean).unwrap();
        assert!((mean - 19.0 / 3.0).abs() < 1e-9);
        assert_eq!(recent_position(&[], 3, RecentStatistic::Median), None);
    }

    #[test]
    fn test_early_speed_missing_split() {
        let cfg = ScoreConfig::default();
        let r = race(1, 1, 1);
        assert_eq!(estimate_early_speed(&r, &context(), &cfg), None);

        let mut zero = race(1, 1, 1);
        zero.early_time = Some(0.0);
        assert_eq!(estimate_early_speed(&zero, &context(), &cfg), None);
    }

    #[test]
    fn test_early_speed_going_correction_sign() {
        let cfg = ScoreConfig::default();
        let mut turf = race(1, 1, 1);
        turf.venue = "札幌".to_string();
        turf.early_time = Some(36.0);
        let good = estimate_early_speed(&turf, &context(), &cfg).unwrap();
        turf.track_condition = TrackCondition::Heavy;
        let heavy = estimate_early_speed(&turf, &context(), &cfg).unwrap();
        assert!(heavy > good);

        let mut dirt = turf.clone();
        dirt.track_type = TrackType::Dirt;
        dirt.track_condition = TrackCondition::Good;
        let good = estimate_early_speed(&dirt, &context(), &cfg).unwrap();
        dirt.track_condition = TrackCondition::Heavy;
        let heavy = estimate_early_speed(&dirt, &context(), &cfg).unwrap();
        assert!(heavy < good);
    }

    #[test]
    fn test_early_speed_turf_start_dirt_discounted() {
        let cfg = ScoreConfig::default();
        let mut r = race(1, 1, 1);
        r.track_type = TrackType::Dirt;
        r.early_time = Some(35.0);
        r.venue = "札幌".to_string();
        let plain = estimate_early_speed(&r, &context(), &cfg).unwrap();
        r.venue = "東京".to_string();
        let chute = estimate_early_speed(&r, &context(), &cfg).unwrap();
        assert!((plain - chute - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_early_speed_distance_clipped() {
        let cfg = ScoreConfig::default();
        let mut r = race(1, 1, 1);
        r.venue = "札幌".to_string();
        r.early_time = Some(35.0);
        r.distance = 1000;
        let far = estimate_early_speed(&r, &context(), &cfg).unwrap();
        r.distance = 1100;
        let near = estimate_early_speed(&r, &context(), &cfg).unwrap();
        // Both differences exceed the 500m clip
        assert_eq!(far, near);
        let raw = 600.0 / 35.0;
        assert!((far - (raw - 500.0 * 0.0002)).abs() < 1e-9);
    }

    #[test]
    fn test_best_early_speed_picks_fastest() {
        let cfg = ScoreConfig::default();
        let mut a = race(1, 1, 1);
        a.venue = "札幌".to_string();
        a.early_time = Some(36.0);
        let mut b = a.clone();
        b.early_time = Some(34.5);
        let c = race(3, 3, 3);
        let races = vec![&a, &c, &b];
        let best = best_early_speed(&races, &context(), &cfg).unwrap();
        assert!((best - 600.0 / 34.5).abs() < 1e-9);
        assert_eq!(best_early_speed(&[&c], &context(), &cfg), None);
    }

    #[test]
    fn test_running_style_classification() {
        let a = race(1, 3, 1);
        let b = race(2, 2, 1);
        let bad = race(9, 5, 4);
        assert_eq!(determine_running_style(&[&a, &b, &bad]), RunningStyle::MustLead);

        let c = race(3, 4, 3);
        assert_eq!(determine_running_style(&[&a, &c]), RunningStyle::CanYield);

        let d = race(2, 1, 10);
        assert_eq!(determine_running_style(&[&d]), RunningStyle::Closer);

        // 5th at 8th favourite is a good run
        let e = race(5, 8, 4);
        assert_eq!(determine_running_style(&[&e]), RunningStyle::CanYield);

        assert_eq!(determine_running_style(&[&bad]), RunningStyle::Unknown);
        assert_eq!(determine_running_style(&[]), RunningStyle::Unknown);
    }

    #[test]
    fn test_escape_only_ignores_regional_form() {
        let led = race(1, 2, 1);
        let mut regional = race(2, 1, 4);
        regional.is_local_circuit = true;
        let unplaced = race(8, 6, 5);
        assert!(is_escape_only(&[&led, &regional, &unplaced]));

        let stalked = race(3, 5, 3);
        assert!(!is_escape_only(&[&led, &stalked]));
        assert!(!is_escape_only(&[&unplaced]));
    }
}
