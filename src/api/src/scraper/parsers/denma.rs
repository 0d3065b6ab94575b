//! Race card (denma, detail view) parser for Yahoo! sports keiba.

use anyhow::{anyhow, bail, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::pace::course::is_regional_venue;
use crate::pace::model::{HorseEntry, PastRaceRecord, RaceContext, TrackCondition, TrackType};

/// Distance used when the page does not state one
const FALLBACK_DISTANCE: u32 = 1600;
const FALLBACK_WEIGHT: f64 = 55.0;
const UNKNOWN_HORSE: &str = "不明";

/// Parsed race card: race conditions plus every runner's form lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceCard {
    pub race_id: String,
    pub venue: String,
    pub distance: u32,
    pub track_type: TrackType,
    /// Rows on the card, scratched entries included
    #[serde(default)]
    pub entries: u32,
    pub horses: Vec<HorseEntry>,
}

impl RaceCard {
    /// Gate count: scratched entries keep their stalls, so runners alone undercount
    pub fn field_size(&self) -> u32 {
        let highest = self.horses.iter().map(|h| h.horse_number).max().unwrap_or(0);
        self.entries.max(highest).max(self.horses.len() as u32)
    }

    pub fn context(&self) -> RaceContext {
        RaceContext {
            distance: self.distance,
            venue: self.venue.clone(),
            track_type: self.track_type,
            field_size: self.field_size(),
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {}: {:?}", css, e))
}

fn text_of(elem: ElementRef<'_>) -> String {
    elem.text().collect::<String>().trim().to_string()
}

struct Selectors {
    latest_table: Selector,
    venue: Selector,
    status: Selector,
    latest_rows: Selector,
    past_rows: Selector,
    number: Selector,
    name: Selector,
    info: Selector,
    paragraph: Selector,
    race_cells: Selector,
    arrival: Selector,
    passing: Selector,
    date_spans: Selector,
    jockey: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            latest_table: selector("#denma_latest")?,
            venue: selector(".hr-menuWhite__item--current .hr-menuWhite__text")?,
            status: selector(".hr-predictRaceInfo__status")?,
            latest_rows: selector("#denma_latest tbody tr")?,
            past_rows: selector("#denma_past tbody tr")?,
            number: selector(".hr-denma__number")?,
            name: selector(".hr-denma__horse a")?,
            info: selector(".hr-tableScroll__data--name")?,
            paragraph: selector("p")?,
            race_cells: selector(".hr-tableScroll__data--race")?,
            arrival: selector(".hr-denma__arrival")?,
            passing: selector(".hr-denma__passing")?,
            date_spans: selector(".hr-denma__date span")?,
            jockey: selector(".hr-denma__jockey")?,
        })
    }
}

struct Patterns {
    digits: Regex,
    popularity: Regex,
    leading_digits: Regex,
    distance: Regex,
    weight: Regex,
    draw: Regex,
    surface: Regex,
    going: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        Ok(Self {
            digits: Regex::new(r"\d+")?,
            popularity: Regex::new(r"\((\d+)人気\)")?,
            leading_digits: Regex::new(r"^(\d+)")?,
            distance: Regex::new(r"(\d{4})m")?,
            weight: Regex::new(r"\((\d{2}(?:\.\d)?)\)")?,
            draw: Regex::new(r"(\d+)頭\s*(\d+)番")?,
            // Surface mark must lead into the distance ("芝2400m", "ダート・左 1600m")
            surface: Regex::new(r"(芝|ダ|障)[^\d\s]{0,4}\s*\d{4}m")?,
            // Going is a standalone label, never part of a longer word
            going: Regex::new(
                r"(?:^|\d{4}m|[\s/・])\s*(不良|稍重|重|良)(?:$|[^\p{Han}\p{Hiragana}\p{Katakana}])",
            )?,
        })
    }

    fn surface(&self, text: &str) -> Option<TrackType> {
        let caps = self.surface.captures(text)?;
        match &caps[1] {
            "障" => Some(TrackType::Jump),
            "ダ" => Some(TrackType::Dirt),
            _ => Some(TrackType::Turf),
        }
    }

    fn condition(&self, text: &str) -> TrackCondition {
        match self.going.captures(text).as_ref().map(|caps| &caps[1]) {
            Some("不良") => TrackCondition::Bad,
            Some("稍重") => TrackCondition::SlightlyHeavy,
            Some("重") => TrackCondition::Heavy,
            _ => TrackCondition::Good,
        }
    }
}

/// Parser for the denma detail page
pub struct DenmaParser {
    selectors: Selectors,
    patterns: Patterns,
}

impl DenmaParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            selectors: Selectors::new()?,
            patterns: Patterns::new()?,
        })
    }

    /// Parse a race card from HTML
    pub fn parse(&self, html: &str, race_id: &str) -> Result<RaceCard> {
        let document = Html::parse_document(html);
        let s = &self.selectors;

        if document.select(&s.latest_table).next().is_none() {
            bail!("Race card not found for {} (wrong id or entries not final)", race_id);
        }

        let venue = document
            .select(&s.venue)
            .next()
            .map(text_of)
            .unwrap_or_default();

        let status = document
            .select(&s.status)
            .next()
            .map(text_of)
            .unwrap_or_default();
        let distance = self
            .capture_u32(&self.patterns.distance, &status)
            .unwrap_or(FALLBACK_DISTANCE);
        let track_type = self.patterns.surface(&status).unwrap_or_default();

        let entries = document.select(&s.latest_rows).count() as u32;
        let horses: Vec<HorseEntry> = document
            .select(&s.latest_rows)
            .zip(document.select(&s.past_rows))
            .filter_map(|(latest, past)| self.parse_horse(latest, past, &venue, distance))
            .collect();

        if horses.is_empty() {
            bail!("No runners found for {} (entries not final)", race_id);
        }

        Ok(RaceCard {
            race_id: race_id.to_string(),
            venue,
            distance,
            track_type,
            entries,
            horses,
        })
    }

    fn capture_u32(&self, re: &Regex, text: &str) -> Option<u32> {
        re.captures(text).and_then(|caps| caps[1].parse().ok())
    }

    fn parse_horse(
        &self,
        latest: ElementRef<'_>,
        past: ElementRef<'_>,
        venue: &str,
        distance: u32,
    ) -> Option<HorseEntry> {
        let s = &self.selectors;

        let horse_number: u32 = latest
            .select(&s.number)
            .next()
            .and_then(|e| text_of(e).parse().ok())?;

        let horse_name = latest
            .select(&s.name)
            .next()
            .map(text_of)
            .unwrap_or_else(|| UNKNOWN_HORSE.to_string());

        // Weight carried today is the last line of the name cell
        let current_weight = past
            .select(&s.info)
            .next()
            .and_then(|info| info.select(&s.paragraph).last())
            .and_then(|p| text_of(p).parse().ok())
            .unwrap_or(FALLBACK_WEIGHT);

        let past_races = past
            .select(&s.race_cells)
            .filter_map(|cell| self.parse_past_race(cell, venue, distance))
            .collect();

        Some(HorseEntry {
            horse_number,
            horse_name,
            current_weight,
            past_races,
        })
    }

    fn parse_past_race(&self, cell: ElementRef<'_>, venue: &str, distance: u32) -> Option<PastRaceRecord> {
        let s = &self.selectors;
        let p = &self.patterns;

        // Cancelled or blank starts have no arrival
        let arrival = text_of(cell.select(&s.arrival).next()?);
        let finish_position: u32 = p.digits.find(&arrival)?.as_str().parse().ok()?;

        let text: String = cell.text().collect();

        let popularity = self.capture_u32(&p.popularity, &text).unwrap_or(7);
        let first_corner_position = cell
            .select(&s.passing)
            .next()
            .and_then(|e| self.capture_u32(&p.leading_digits, &text_of(e)))
            .unwrap_or(7);
        let past_distance = self.capture_u32(&p.distance, &text).unwrap_or(distance);

        let spans: Vec<String> = cell.select(&s.date_spans).map(text_of).collect();
        let past_venue = spans.get(1).cloned().unwrap_or_default();
        let is_same_venue = if venue.is_empty() {
            None
        } else if !past_venue.is_empty() {
            Some(venue.contains(&past_venue))
        } else {
            Some(text.contains(venue))
        };

        let weight_carried = cell
            .select(&s.jockey)
            .next()
            .and_then(|e| p.weight.captures(&text_of(e)).and_then(|caps| caps[1].parse().ok()));

        let (field_size, post_position) = match p.draw.captures(&text) {
            Some(caps) => (caps[1].parse().ok(), caps[2].parse().ok()),
            None => (None, None),
        };

        Some(PastRaceRecord {
            finish_position,
            popularity,
            first_corner_position,
            distance: past_distance,
            track_type: p.surface(&text).unwrap_or_default(),
            track_condition: p.condition(&text),
            is_local_circuit: is_regional_venue(&text),
            venue: past_venue,
            weight_carried,
            is_same_venue,
            had_slow_start: text.contains("出遅"),
            post_position,
            field_size,
            early_time: None,
        })
    }
}
