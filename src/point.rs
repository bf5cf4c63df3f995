use std::fmt;

use time::{Date, Duration, OffsetDateTime};

use crate::error::{Result, TripError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5},{:.5})", self.lat, self.lon)
    }
}

/// Where a point's coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSource {
    Exif,
    Gpx,
    Inferred,
    Custom,
}

/// A single timestamped observation. A point either has a full coordinate
/// pair or none at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub timestamp: OffsetDateTime,
    pub location: Option<Coord>,
    pub source: PointSource,
    pub origin_id: String,
}

impl Point {
    pub fn resolved(
        timestamp: OffsetDateTime,
        location: Coord,
        source: PointSource,
        origin_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            location: Some(location),
            source,
            origin_id: origin_id.into(),
        }
    }

    pub fn unresolved(
        timestamp: OffsetDateTime,
        source: PointSource,
        origin_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            location: None,
            source,
            origin_id: origin_id.into(),
        }
    }

    /// Builds a point from loosely-typed reader output, rejecting half-set or
    /// out-of-range coordinates.
    pub fn from_parts(
        timestamp: OffsetDateTime,
        lat: Option<f64>,
        lon: Option<f64>,
        source: PointSource,
        origin_id: impl Into<String>,
    ) -> Result<Self> {
        let origin_id = origin_id.into();
        let location = match (lat, lon) {
            (Some(lat), Some(lon)) => {
                let coord = Coord::new(lat, lon);
                if !coord.is_valid() {
                    return Err(TripError::InvalidPoint {
                        origin_id,
                        reason: format!("coordinates {lat}, {lon} are out of range"),
                    });
                }
                Some(coord)
            }
            (None, None) => None,
            _ => {
                return Err(TripError::InvalidPoint {
                    origin_id,
                    reason: "exactly one of latitude/longitude is set".into(),
                });
            }
        };

        Ok(Self {
            timestamp,
            location,
            source,
            origin_id,
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }
}

/// Moves every timestamp by a whole number of hours. Camera clocks are
/// frequently left on home time while travelling.
///
/// Either every point is shifted or, if any result would fall outside the
/// supported time range, none is.
pub fn shift_timestamps(points: &mut [Point], hours: i64) -> Result<()> {
    if hours == 0 {
        return Ok(());
    }
    let shift = hours.checked_mul(3600).map(Duration::seconds);
    let shifted = points
        .iter()
        .map(|p| {
            shift
                .and_then(|shift| p.timestamp.checked_add(shift))
                .ok_or_else(|| TripError::TimestampOutOfRange {
                    origin_id: p.origin_id.clone(),
                    hours,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    for (point, timestamp) in points.iter_mut().zip(shifted) {
        point.timestamp = timestamp;
    }
    Ok(())
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn contains(&self, timestamp: OffsetDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date <= self.end
    }
}

pub fn filter_by_date_range(points: Vec<Point>, range: &DateRange) -> Vec<Point> {
    points
        .into_iter()
        .filter(|p| range.contains(p.timestamp))
        .collect()
}
