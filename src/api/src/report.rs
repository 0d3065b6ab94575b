//! Display text and table output for pace analyses.

use crate::pace::formation::horse_glyph;
use crate::pace::model::{Annotation, Band, RunningStyle};
use crate::pace::narrative::{FieldShape, PaceLevel};
use crate::types::PaceResponse;

/// Running style label; a must-lead horse expected to concede gets a softer one
pub fn style_label(style: RunningStyle, yields_lead: bool) -> &'static str {
    match (style, yields_lead) {
        (RunningStyle::MustLead, false) => "逃げ",
        (RunningStyle::MustLead, true) => "逃げ（控えも）",
        (RunningStyle::CanYield, _) => "先行",
        (RunningStyle::Closer, _) => "差し・追込",
        (RunningStyle::Unknown, _) => "不明",
    }
}

pub fn annotation_text(annotation: &Annotation) -> String {
    match annotation {
        Annotation::NoHistory => "過去走データなし（中団想定）".to_string(),
        Annotation::EscapeOnly => "逃げてこその馬（枠に関係なくハナ主張）".to_string(),
        Annotation::RegionalForm => "前走地方競馬".to_string(),
        Annotation::PromotionShock => "前走勝ちで昇級（位置取り後退の懸念）".to_string(),
        Annotation::SlowStartRepeatRisk => "前走出遅れを挽回、今回は枠が逆で再現困難".to_string(),
        Annotation::SlowStartRecovered => "前走出遅れから挽回".to_string(),
        Annotation::WaitAndSee => "外枠・斤量減なしで様子見".to_string(),
        Annotation::Drafting { behind } => format!("{}の直後を確保", horse_glyph(*behind)),
        Annotation::YieldsLead { to } => format!("{}にハナを譲る可能性", horse_glyph(*to)),
    }
}

pub fn band_label(band: Band) -> &'static str {
    match band {
        Band::Leader => "逃げ・先頭",
        Band::Chaser => "好位",
        Band::Midfield => "中団",
        Band::Backmarker => "後方",
    }
}

pub fn pace_label(pace: PaceLevel) -> &'static str {
    match pace {
        PaceLevel::Fast => "ハイ",
        PaceLevel::ModerateFast => "やや速い",
        PaceLevel::Moderate => "平均",
        PaceLevel::ModerateSlow => "平均〜スロー",
        PaceLevel::Slow => "スロー",
    }
}

pub fn shape_label(shape: FieldShape) -> &'static str {
    match shape {
        FieldShape::Bunched => "一団",
        FieldShape::StrungOut => "縦長",
    }
}

/// Print one race as a text table
pub fn print_table(response: &PaceResponse) {
    match &response.race_id {
        Some(id) => println!("Race: {}", id),
        None => println!("Race"),
    }
    println!(
        "  {} {:?} {}m, {} runners",
        response.race.venue, response.race.track_type, response.race.distance, response.race.field_size
    );
    println!();

    println!("=== Formation ===");
    println!("  {}", response.formation_text);
    println!(
        "  Pace: {} / {}",
        pace_label(response.summary.pace),
        shape_label(response.summary.shape)
    );
    println!("  {}", response.summary.text);
    println!();

    println!("=== Horses ===");
    for h in &response.horses {
        println!(
            "  {:>2} {:<18} {:>5.2}  {:<10} {:<14} {:>4.1}kg  ({} races)",
            h.horse_number,
            h.horse_name,
            h.score,
            band_label(h.band),
            h.style_label,
            h.current_weight,
            h.evidence_races
        );
        for note in &h.notes {
            println!("       - {}", note);
        }
    }
    println!();
}
