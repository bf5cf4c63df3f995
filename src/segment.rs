//! Splits a stream of located points into trips.
//!
//! Segmentation is a single forward scan over time-sorted points. Two adjacent
//! points belong to the same trip only if they are close both in time and in
//! space; breaking either threshold starts a new run. Runs shorter than
//! `min_photos` are dropped and reported back rather than emitted.

use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Result, TripError};
use crate::geo::{distance_km, hours_between};
use crate::point::{Coord, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentConfig {
    pub gap_hours: f64,
    pub distance_km: f64,
    pub min_photos: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            gap_hours: 4.0,
            distance_km: 25.0,
            min_photos: 3,
        }
    }
}

/// A closed, time-ordered run of located points. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    points: Vec<Point>,
}

impl Trip {
    /// Takes `points` as a single trip without segmenting them, for tracks
    /// that are already known to be one journey.
    pub fn from_points(mut points: Vec<Point>) -> Result<Self> {
        if points.is_empty() {
            return Err(TripError::EmptyTrip);
        }
        if let Some(bad) = points.iter().find(|p| !p.is_resolved()) {
            return Err(TripError::InvalidPoint {
                origin_id: bad.origin_id.clone(),
                reason: "point has no location".into(),
            });
        }
        points.sort_by_key(|p| p.timestamp);
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> OffsetDateTime {
        self.points[0].timestamp
    }

    pub fn end(&self) -> OffsetDateTime {
        self.points[self.points.len() - 1].timestamp
    }

    /// Coordinates in visiting order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.points.iter().filter_map(|p| p.location)
    }

    pub fn length_km(&self) -> f64 {
        let coords: Vec<Coord> = self.coords().collect();
        coords.windows(2).map(|w| distance_km(w[0], w[1])).sum()
    }
}

#[derive(Debug)]
pub struct Segmentation {
    pub trips: Vec<Trip>,
    /// One [`TripError::InsufficientPoints`] per run that was too short to keep.
    pub discarded: Vec<TripError>,
}

impl Segmentation {
    pub fn dropped_points(&self) -> usize {
        self.discarded
            .iter()
            .map(|e| match e {
                TripError::InsufficientPoints { points, .. } => *points,
                _ => 0,
            })
            .sum()
    }
}

/// Groups points into trips. Fails fast if any point has no location.
pub fn segment_trips(mut points: Vec<Point>, config: &SegmentConfig) -> Result<Segmentation> {
    if let Some(bad) = points.iter().find(|p| !p.is_resolved()) {
        return Err(TripError::InvalidPoint {
            origin_id: bad.origin_id.clone(),
            reason: "point has no location; filter unresolved points before segmenting".into(),
        });
    }

    points.sort_by_key(|p| p.timestamp);

    let mut segmentation = Segmentation {
        trips: Vec::new(),
        discarded: Vec::new(),
    };
    let mut run: Vec<Point> = Vec::new();

    for point in points {
        if let Some(prev) = run.last()
            && breaks_run(prev, &point, config)
        {
            close_run(std::mem::take(&mut run), config, &mut segmentation);
        }
        run.push(point);
    }
    close_run(run, config, &mut segmentation);

    Ok(segmentation)
}

fn breaks_run(prev: &Point, cur: &Point, config: &SegmentConfig) -> bool {
    let (Some(a), Some(b)) = (prev.location, cur.location) else {
        return true;
    };
    let dt = hours_between(prev.timestamp, cur.timestamp);
    let dd = distance_km(a, b);
    let breaks = dt > config.gap_hours || dd > config.distance_km;
    if breaks {
        debug!(
            at = %cur.timestamp,
            hours = dt,
            km = dd,
            "trip boundary"
        );
    }
    breaks
}

fn close_run(run: Vec<Point>, config: &SegmentConfig, out: &mut Segmentation) {
    if run.is_empty() {
        return;
    }
    if run.len() >= config.min_photos {
        out.trips.push(Trip { points: run });
    } else {
        out.discarded.push(TripError::InsufficientPoints {
            points: run.len(),
            min_photos: config.min_photos,
            start: run[0].timestamp,
        });
    }
}
