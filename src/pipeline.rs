use tracing::{info, warn};

use crate::error::{Result, TripError};
use crate::infer::{InferenceConfig, infer_locations, resolve_by_place};
use crate::locations::{CustomLocationTable, GeocodeResolver};
use crate::point::Point;
use crate::segment::{SegmentConfig, Trip, segment_trips};

pub struct TripOptions<'a> {
    pub segment: SegmentConfig,
    /// Temporal inference for points without coordinates; skipped when `None`.
    pub inference: Option<InferenceConfig>,
    /// Folder-name lookup for points temporal inference could not place.
    pub place_lookup: Option<(&'a CustomLocationTable, &'a dyn GeocodeResolver)>,
}

impl Default for TripOptions<'_> {
    fn default() -> Self {
        Self {
            segment: SegmentConfig::default(),
            inference: None,
            place_lookup: None,
        }
    }
}

/// Counts reported at the end of a run, distinct from outright failures.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub input_points: usize,
    pub inferred: usize,
    pub placed_by_name: usize,
    /// [`TripError::UnresolvedPoint`] for every point left out of segmentation.
    pub unresolved: Vec<TripError>,
    /// [`TripError::InsufficientPoints`] for every run too short to become a trip.
    pub discarded_runs: Vec<TripError>,
    pub dropped_points: usize,
    pub trips: usize,
}

#[derive(Debug)]
pub struct Reconstruction {
    pub trips: Vec<Trip>,
    pub diagnostics: Diagnostics,
}

/// Infers missing locations, drops what stays unresolved and segments the rest.
pub fn reconstruct_trips(points: Vec<Point>, options: &TripOptions<'_>) -> Result<Reconstruction> {
    let mut diagnostics = Diagnostics {
        input_points: points.len(),
        ..Diagnostics::default()
    };

    let mut points = match &options.inference {
        Some(config) => {
            let inference = infer_locations(points, config);
            diagnostics.inferred = inference.inferred;
            inference.points
        }
        None => points,
    };

    if let Some((custom, geocoder)) = options.place_lookup {
        diagnostics.placed_by_name = resolve_by_place(&mut points, custom, geocoder);
    }

    let (resolved, unresolved): (Vec<Point>, Vec<Point>) =
        points.into_iter().partition(Point::is_resolved);
    for point in unresolved {
        warn!(origin = %point.origin_id, "no location, left out of trips");
        diagnostics.unresolved.push(TripError::UnresolvedPoint {
            origin_id: point.origin_id,
        });
    }

    let segmentation = segment_trips(resolved, &options.segment)?;
    diagnostics.dropped_points = segmentation.dropped_points();
    diagnostics.discarded_runs = segmentation.discarded;
    diagnostics.trips = segmentation.trips.len();

    info!(
        points = diagnostics.input_points,
        inferred = diagnostics.inferred,
        placed_by_name = diagnostics.placed_by_name,
        unresolved = diagnostics.unresolved.len(),
        dropped = diagnostics.dropped_points,
        trips = diagnostics.trips,
        "trip reconstruction finished"
    );

    Ok(Reconstruction {
        trips: segmentation.trips,
        diagnostics,
    })
}
