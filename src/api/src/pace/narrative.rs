//! Narrative summarizer: a rule table over discrete pace signals.

use serde::Serialize;

use super::formation::horse_glyph;
use super::model::{Band, RaceContext, RunningStyle, ScoredHorse, TrackType};
use crate::config::NarrativeConfig;

/// Expected early pace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceLevel {
    Fast,
    ModerateFast,
    Moderate,
    ModerateSlow,
    Slow,
}

impl PaceLevel {
    fn slower(self) -> Self {
        match self {
            PaceLevel::Fast => PaceLevel::ModerateFast,
            PaceLevel::ModerateFast => PaceLevel::Moderate,
            PaceLevel::Moderate => PaceLevel::ModerateSlow,
            PaceLevel::ModerateSlow | PaceLevel::Slow => PaceLevel::Slow,
        }
    }
}

/// How spread out the field runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    Bunched,
    StrungOut,
}

/// Early-speed reading of the leader band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedReading {
    Fast,
    Normal,
    Slow,
    Unknown,
}

/// Discrete inputs to the rule table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaceSignals {
    pub must_lead_leaders: usize,
    pub can_yield_leaders: usize,
    pub leader_speed: SpeedReading,
    pub spread_gap: f64,
    pub gap_to_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaceSummary {
    pub pace: PaceLevel,
    pub shape: FieldShape,
    pub leaders: Vec<u32>,
    pub signals: Option<PaceSignals>,
    pub text: String,
}

const INSUFFICIENT: &str = "出走馬データが不足しているため、展開予想を生成できません。";

fn leader_speed(leaders: &[&ScoredHorse], context: &RaceContext, config: &NarrativeConfig) -> SpeedReading {
    let speeds: Vec<f64> = leaders
        .iter()
        .filter_map(|h| h.signals.best_early_speed)
        .collect();
    if speeds.is_empty() {
        return SpeedReading::Unknown;
    }
    let avg = speeds.iter().sum::<f64>() / speeds.len() as f64;

    let (fast, slow) = match context.track_type {
        TrackType::Dirt => (config.dirt_fast_speed, config.dirt_slow_speed),
        _ => (config.turf_fast_speed, config.turf_slow_speed),
    };
    if avg >= fast {
        SpeedReading::Fast
    } else if avg <= slow {
        SpeedReading::Slow
    } else {
        SpeedReading::Normal
    }
}

/// Read the discrete signals off a score-sorted field
pub fn read_signals(sorted: &[ScoredHorse], context: &RaceContext, config: &NarrativeConfig) -> PaceSignals {
    let leaders: Vec<&ScoredHorse> = sorted.iter().filter(|h| h.band == Band::Leader).collect();
    let count_style = |style: RunningStyle| leaders.iter().filter(|h| h.running_style() == style).count();

    let top = sorted.first().map(|h| h.score).unwrap_or_default();
    let index = ((sorted.len() as f64 * config.spread_percentile).ceil() as usize)
        .saturating_sub(1)
        .min(sorted.len().saturating_sub(1));
    let spread_gap = sorted.get(index).map(|h| h.score - top).unwrap_or_default();
    let gap_to_second = sorted.get(1).map(|h| h.score - top).unwrap_or_default();

    PaceSignals {
        must_lead_leaders: count_style(RunningStyle::MustLead),
        can_yield_leaders: count_style(RunningStyle::CanYield),
        leader_speed: leader_speed(&leaders, context, config),
        spread_gap,
        gap_to_second,
    }
}

/// Map signals to a pace level.
///
/// Two or more confirmed front-runners in the leader band make a contested
/// pace; a leader band of horses happy to sit makes a cooperative one.
pub fn pace_level(signals: &PaceSignals, config: &NarrativeConfig) -> PaceLevel {
    let speed = signals.leader_speed;

    if signals.must_lead_leaders >= 2 {
        return match speed {
            SpeedReading::Slow => PaceLevel::ModerateFast,
            _ => PaceLevel::Fast,
        };
    }

    if signals.must_lead_leaders == 0 && signals.can_yield_leaders >= 2 {
        return match speed {
            SpeedReading::Fast => PaceLevel::ModerateSlow,
            _ => PaceLevel::Slow,
        };
    }

    let level = match speed {
        SpeedReading::Fast => PaceLevel::ModerateFast,
        SpeedReading::Slow => PaceLevel::ModerateSlow,
        SpeedReading::Normal | SpeedReading::Unknown => PaceLevel::Moderate,
    };

    // Nobody close enough to press a lone leader
    if signals.gap_to_second >= config.lone_leader_gap {
        level.slower()
    } else {
        level
    }
}

pub fn field_shape(signals: &PaceSignals, config: &NarrativeConfig) -> FieldShape {
    if signals.spread_gap >= config.strung_out_gap {
        FieldShape::StrungOut
    } else {
        FieldShape::Bunched
    }
}

fn render(pace: PaceLevel, shape: FieldShape, leaders: &str) -> String {
    let pace_text = match pace {
        PaceLevel::Fast => format!("ハイペース。{}がハナを主張し合い、テンのペースは速くなりそう。", leaders),
        PaceLevel::ModerateFast => format!("やや速いペース。{}が積極的に前へ行き、緩みのない流れになりそう。", leaders),
        PaceLevel::Moderate => format!("平均ペース。{}が先行し、隊列はすんなり決まりそう。", leaders),
        PaceLevel::ModerateSlow => format!(
            "平均〜スローペース。{}が主導権を握るが、競りかける馬はおらずペースは落ち着く可能性が高い。",
            leaders
        ),
        PaceLevel::Slow => format!("スローペース。{}が楽に先行できそう。後続は折り合い重視の展開。", leaders),
    };
    let shape_text = match shape {
        FieldShape::StrungOut => "縦長の展開か。",
        FieldShape::Bunched => "馬群は一団で進みそう。",
    };
    format!("{}{}", pace_text, shape_text)
}

/// Summarise the expected pace of a score-sorted, banded field
pub fn summarize(sorted: &[ScoredHorse], context: &RaceContext, config: &NarrativeConfig) -> PaceSummary {
    let leaders: Vec<u32> = sorted
        .iter()
        .filter(|h| h.band == Band::Leader)
        .map(|h| h.horse_number)
        .collect();

    if sorted.len() < 2 {
        return PaceSummary {
            pace: PaceLevel::Moderate,
            shape: FieldShape::Bunched,
            leaders,
            signals: None,
            text: INSUFFICIENT.to_string(),
        };
    }

    let signals = read_signals(sorted, context, config);
    let pace = pace_level(&signals, config);
    let shape = field_shape(&signals, config);
    let names = leaders
        .iter()
        .map(|&n| horse_glyph(n))
        .collect::<Vec<_>>()
        .join("と");

    PaceSummary {
        pace,
        shape,
        text: render(pace, shape, &names),
        leaders,
        signals: Some(signals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pace::model::{HorseSignals, ScoreBreakdown};

    fn horse(number: u32, score: f64, style: RunningStyle, band: Band) -> ScoredHorse {
        ScoredHorse {
            horse_number: number,
            horse_name: String::new(),
            current_weight: 55.0,
            evidence_races: 3,
            score,
            breakdown: ScoreBreakdown::default(),
            synergy: 0.0,
            signals: HorseSignals {
                target_position: score,
                recent_position: Some(score),
                best_early_speed: None,
                running_style: style,
                escape_only: false,
            },
            annotations: Vec::new(),
            yields_lead: false,
            band,
        }
    }

    fn context() -> RaceContext {
        RaceContext {
            distance: 1600,
            venue: "東京".to_string(),
            track_type: TrackType::Turf,
            field_size: 6,
        }
    }

    fn field(front: [(u32, f64, RunningStyle); 2]) -> Vec<ScoredHorse> {
        let mut horses: Vec<ScoredHorse> = front
            .iter()
            .map(|&(n, s, style)| horse(n, s, style, Band::Leader))
            .collect();
        horses.push(horse(3, 5.0, RunningStyle::CanYield, Band::Chaser));
        horses.push(horse(4, 6.0, RunningStyle::Closer, Band::Chaser));
        horses.push(horse(5, 9.0, RunningStyle::Closer, Band::Midfield));
        horses.push(horse(6, 12.0, RunningStyle::Closer, Band::Backmarker));
        horses
    }

    #[test]
    fn test_two_must_lead_is_fast() {
        let cfg = NarrativeConfig::default();
        let sorted = field([
            (1, 2.0, RunningStyle::MustLead),
            (2, 2.3, RunningStyle::MustLead),
        ]);
        let summary = summarize(&sorted, &context(), &cfg);
        assert_eq!(summary.pace, PaceLevel::Fast);
        assert_eq!(summary.leaders, vec![1, 2]);
        assert!(summary.text.starts_with("ハイペース"));
        assert!(summary.text.contains("①と②"));
    }

    #[test]
    fn test_two_must_lead_even_when_one_yields() {
        let cfg = NarrativeConfig::default();
        let mut sorted = field([
            (1, 2.0, RunningStyle::MustLead),
            (2, 2.2, RunningStyle::MustLead),
        ]);
        sorted[1].yields_lead = true;
        let summary = summarize(&sorted, &context(), &cfg);
        assert_eq!(summary.pace, PaceLevel::Fast);
    }

    #[test]
    fn test_cooperative_leaders_is_slow() {
        let cfg = NarrativeConfig::default();
        let sorted = field([
            (1, 2.0, RunningStyle::CanYield),
            (2, 2.4, RunningStyle::CanYield),
        ]);
        let summary = summarize(&sorted, &context(), &cfg);
        assert_eq!(summary.pace, PaceLevel::Slow);
    }

    #[test]
    fn test_fast_leader_speed_lifts_cooperative_pace() {
        let cfg = NarrativeConfig::default();
        let mut sorted = field([
            (1, 2.0, RunningStyle::CanYield),
            (2, 2.4, RunningStyle::CanYield),
        ]);
        sorted[0].signals.best_early_speed = Some(17.6);
        sorted[1].signals.best_early_speed = Some(17.4);
        let signals = read_signals(&sorted, &context(), &cfg);
        assert_eq!(signals.leader_speed, SpeedReading::Fast);
        assert_eq!(pace_level(&signals, &cfg), PaceLevel::ModerateSlow);
    }

    #[test]
    fn test_lone_leader_slows_pace() {
        let cfg = NarrativeConfig::default();
        let sorted = vec![
            horse(1, 2.0, RunningStyle::MustLead, Band::Leader),
            horse(2, 4.0, RunningStyle::CanYield, Band::Chaser),
            horse(3, 5.0, RunningStyle::Closer, Band::Chaser),
        ];
        let summary = summarize(&sorted, &context(), &cfg);
        assert_eq!(summary.pace, PaceLevel::ModerateSlow);
        assert_eq!(summary.leaders, vec![1]);
    }

    #[test]
    fn test_field_shape() {
        let cfg = NarrativeConfig::default();
        let sorted = field([
            (1, 2.0, RunningStyle::MustLead),
            (2, 2.3, RunningStyle::MustLead),
        ]);
        // 60th percentile of six horses is the 4th: 6.0 - 2.0
        let signals = read_signals(&sorted, &context(), &cfg);
        assert!((signals.spread_gap - 4.0).abs() < 1e-9);
        assert_eq!(field_shape(&signals, &cfg), FieldShape::Bunched);

        let mut strung = sorted.clone();
        strung[3].score = 9.5;
        let signals = read_signals(&strung, &context(), &cfg);
        assert_eq!(field_shape(&signals, &cfg), FieldShape::StrungOut);
        assert!(summarize(&strung, &context(), &cfg).text.ends_with("縦長の展開か。"));
    }

    #[test]
    fn test_insufficient_field() {
        let cfg = NarrativeConfig::default();
        let sorted = vec![horse(1, 3.0, RunningStyle::MustLead, Band::Leader)];
        let summary = summarize(&sorted, &context(), &cfg);
        assert!(summary.signals.is_none());
        assert!(summary.text.contains("不足"));
    }
}
