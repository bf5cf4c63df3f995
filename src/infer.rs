//! Fills in coordinates for points that were captured without GPS.
//!
//! The primary strategy is temporal: a photo taken between two geotagged photos
//! is placed on the straight line between them, proportionally to time. Points
//! that still have no location can fall back to a place name derived from their
//! folder, looked up in the custom location table and then the geocoder.

use std::collections::HashMap;
use std::path::{Component, Path};

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::geo::hours_between;
use crate::locations::{CustomLocationTable, GeocodeResolver, resolve_name};
use crate::point::{Coord, Point, PointSource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceConfig {
    /// Largest gap, in hours, between a point and the known locations it borrows from.
    pub max_inference_window_hours: f64,
}

/// Result of [`infer_locations`]: every input point, sorted by time, plus counts.
#[derive(Debug, Clone)]
pub struct Inference {
    pub points: Vec<Point>,
    pub inferred: usize,
    pub unresolved: usize,
}

/// A known location at a moment in time.
pub type Anchor = (OffsetDateTime, Coord);

pub fn infer_locations(mut points: Vec<Point>, config: &InferenceConfig) -> Inference {
    points.sort_by_key(|p| p.timestamp);

    // Only originally-known locations act as anchors; inferred ones never chain.
    let anchors: Vec<Anchor> = points
        .iter()
        .filter_map(|p| p.location.map(|loc| (p.timestamp, loc)))
        .collect();

    let mut inferred = 0;
    let mut unresolved = 0;

    for point in points.iter_mut().filter(|p| !p.is_resolved()) {
        let ts = point.timestamp;
        let before_idx = anchors.partition_point(|a| a.0 <= ts);
        let before = before_idx.checked_sub(1).map(|i| anchors[i]);
        let after = anchors.get(anchors.partition_point(|a| a.0 < ts)).copied();

        match infer_between(ts, before, after, config.max_inference_window_hours) {
            Some(coord) => {
                debug!(origin = %point.origin_id, %coord, "inferred location");
                point.location = Some(coord);
                point.source = PointSource::Inferred;
                inferred += 1;
            }
            None => {
                debug!(origin = %point.origin_id, "no known location within window");
                unresolved += 1;
            }
        }
    }

    Inference {
        points,
        inferred,
        unresolved,
    }
}

/// Picks a location for a point at `ts` given its nearest known neighbours.
///
/// Interpolates when both neighbours exist and span at most `window_hours`;
/// otherwise copies whichever neighbour is closer in time, provided it is itself
/// within the window. Ties go to the earlier neighbour.
pub fn infer_between(
    ts: OffsetDateTime,
    before: Option<Anchor>,
    after: Option<Anchor>,
    window_hours: f64,
) -> Option<Coord> {
    if let (Some((t0, c0)), Some((t1, c1))) = (before, after)
        && hours_between(t0, t1) <= window_hours
    {
        if t0 == t1 {
            return Some(c0);
        }
        let fraction =
            ((ts - t0).as_seconds_f64() / (t1 - t0).as_seconds_f64()).clamp(0.0, 1.0);
        return Some(Coord::new(
            c0.lat + fraction * (c1.lat - c0.lat),
            c0.lon + fraction * (c1.lon - c0.lon),
        ));
    }

    let within = |anchor: Option<Anchor>| {
        anchor
            .map(|(t, c)| (hours_between(t, ts), c))
            .filter(|(dt, _)| *dt <= window_hours)
    };

    match (within(before), within(after)) {
        (Some((db, cb)), Some((da, ca))) => Some(if da < db { ca } else { cb }),
        (Some((_, c)), None) | (None, Some((_, c))) => Some(c),
        (None, None) => None,
    }
}

const GENERIC_FOLDERS: &[&str] = &[
    "pictures", "photos", "images", "camera", "dcim", "iphone", "android", "backup", "desktop",
];

const FOLDER_PREFIXES: &[&str] = &["vacation_", "trip_"];

/// Guesses a place name from the folders around a photo, e.g.
/// `photos/2019_Lake_Bled/IMG_1.jpg` gives `Lake Bled`.
pub fn place_hint_from_path(origin_id: &str) -> Option<String> {
    let parent = Path::new(origin_id).parent()?;

    parent
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .map(strip_folder_prefix)
        .filter(|part| {
            part.chars().count() > 3 && !GENERIC_FOLDERS.contains(&part.to_lowercase().as_str())
        })
        .last()
        .map(|part| part.replace('_', " "))
}

fn strip_folder_prefix(part: &str) -> &str {
    let bytes = part.as_bytes();
    let digits = |range: std::ops::Range<usize>| {
        bytes.get(range).is_some_and(|b| b.iter().all(u8::is_ascii_digit))
    };

    // "2019_" or "05_12_"
    if digits(0..4) && bytes.get(4) == Some(&b'_') {
        return &part[5..];
    }
    if digits(0..2) && bytes.get(2) == Some(&b'_') && digits(3..5) && bytes.get(5) == Some(&b'_') {
        return &part[6..];
    }
    for prefix in FOLDER_PREFIXES {
        if part.len() >= prefix.len()
            && part.is_char_boundary(prefix.len())
            && part[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return &part[prefix.len()..];
        }
    }
    part
}

/// Second pass for points the temporal pass could not place: resolve a place
/// name derived from each point's folder. Returns how many points were placed.
///
/// Lookups are made once per distinct place name. Geocoder failures leave the
/// points unresolved.
pub fn resolve_by_place<R: GeocodeResolver + ?Sized>(
    points: &mut [Point],
    custom: &CustomLocationTable,
    geocoder: &R,
) -> usize {
    let mut lookups: HashMap<String, Option<(Coord, PointSource)>> = HashMap::new();
    let mut resolved = 0;

    for point in points.iter_mut().filter(|p| !p.is_resolved()) {
        let Some(place) = place_hint_from_path(&point.origin_id) else {
            continue;
        };

        let answer = lookups
            .entry(place)
            .or_insert_with_key(|place| match resolve_name(place, custom, geocoder) {
                Ok(found) => Some(found),
                Err(e) => {
                    warn!(place = %place, error = %e, "could not resolve folder location");
                    None
                }
            });

        if let Some((coord, source)) = *answer {
            point.location = Some(coord);
            point.source = source;
            resolved += 1;
        }
    }

    resolved
}
