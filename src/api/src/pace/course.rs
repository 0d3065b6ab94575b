//! Course geometry lookups: draw bias and start profiles.

use super::model::TrackType;

/// Shape of the opening run from the gates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartProfile {
    Flat,
    Uphill,
    Downhill,
    /// Dirt race that breaks on a turf chute
    TurfStartDirt,
}

/// Structural facts about one venue / surface / distance combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseProfile {
    pub outside_favoured: bool,
    pub start: StartProfile,
}

impl Default for CourseProfile {
    fn default() -> Self {
        Self {
            outside_favoured: false,
            start: StartProfile::Flat,
        }
    }
}

struct CourseEntry {
    venue: &'static str,
    surface: TrackType,
    distance: u32,
    outside_favoured: bool,
    start: StartProfile,
}

const fn course(
    venue: &'static str,
    surface: TrackType,
    distance: u32,
    outside_favoured: bool,
    start: StartProfile,
) -> CourseEntry {
    CourseEntry {
        venue,
        surface,
        distance,
        outside_favoured,
        start,
    }
}

use StartProfile::*;
use TrackType::{Dirt, Turf};

const COURSES: &[CourseEntry] = &[
    // Turf-chute dirt starts: outside draws stay on grass longer
    course("東京", Dirt, 1600, true, TurfStartDirt),
    course("中山", Dirt, 1200, true, TurfStartDirt),
    course("阪神", Dirt, 1400, true, TurfStartDirt),
    course("阪神", Dirt, 2000, true, TurfStartDirt),
    course("京都", Dirt, 1400, true, TurfStartDirt),
    course("中京", Dirt, 1400, true, TurfStartDirt),
    course("新潟", Dirt, 1200, true, TurfStartDirt),
    course("福島", Dirt, 1150, true, TurfStartDirt),
    // Straight sprint
    course("新潟", Turf, 1000, true, Flat),
    // Downhill starts
    course("中山", Turf, 1200, true, Downhill),
    course("中京", Turf, 1200, false, Downhill),
    course("京都", Turf, 1200, false, Downhill),
    course("小倉", Turf, 1200, false, Downhill),
    // Starts on or into the home-straight hill
    course("中山", Turf, 1800, false, Uphill),
    course("中山", Turf, 2000, false, Uphill),
    course("阪神", Turf, 2000, false, Uphill),
    course("中山", Dirt, 1800, false, Uphill),
    course("阪神", Dirt, 1800, false, Uphill),
];

/// Look up the course profile; unknown courses are flat with inside bias
pub fn course_profile(venue: &str, surface: TrackType, distance: u32) -> CourseProfile {
    COURSES
        .iter()
        .find(|c| c.surface == surface && c.distance == distance && venue.contains(c.venue))
        .map(|c| CourseProfile {
            outside_favoured: c.outside_favoured,
            start: c.start,
        })
        .unwrap_or_default()
}

/// Venues of the regional (NAR) circuit
pub const REGIONAL_VENUES: [&str; 15] = [
    "川崎", "大井", "船橋", "浦和", "門別", "盛岡", "水沢", "園田", "姫路", "高知", "佐賀",
    "名古屋", "笠松", "金沢", "帯広",
];

/// Whether the text names a regional-circuit venue
pub fn is_regional_venue(text: &str) -> bool {
    REGIONAL_VENUES.iter().any(|v| text.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turf_start_dirt_lookup() {
        let p = course_profile("東京", TrackType::Dirt, 1600);
        assert!(p.outside_favoured);
        assert_eq!(p.start, StartProfile::TurfStartDirt);
    }

    #[test]
    fn test_venue_matches_inside_longer_name() {
        let p = course_profile("2回中山7日", TrackType::Turf, 2000);
        assert_eq!(p.start, StartProfile::Uphill);
        assert!(!p.outside_favoured);
    }

    #[test]
    fn test_unknown_course_defaults() {
        let p = course_profile("札幌", TrackType::Turf, 1500);
        assert_eq!(p, CourseProfile::default());

        // Surface must match too
        let p = course_profile("東京", TrackType::Turf, 1600);
        assert_eq!(p, CourseProfile::default());
    }

    #[test]
    fn test_regional_venue() {
        assert!(is_regional_venue("大井"));
        assert!(is_regional_venue("3/12 園田 1400m"));
        assert!(!is_regional_venue("東京"));
    }
}
