use crate::TripsArgs;
use crate::commands::load_custom_locations;
use crate::gpxxml::{extract_track_points, write_trips_gpx};
use crate::photos::read_photo_manifest;
use crate::summary::write_summary;
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use tracing::{debug, info};
use tripwrench::point::{filter_by_date_range, shift_timestamps};
use tripwrench::{
    GeocodeResolver, InferenceConfig, NoGeocoder, SegmentConfig, Trip, TripOptions,
    parse_date_range, reconstruct_trips,
};

pub fn trips_command(args: &TripsArgs) -> Result<(), Box<dyn Error>> {
    let mut points = Vec::new();

    for path in &args.photos {
        let input = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let mut photos = read_photo_manifest(&input, args.filename_dates)?;
        shift_timestamps(&mut photos, args.tz_shift)?;
        debug!(path = %path.display(), photos = photos.len(), "read photo manifest");
        points.extend(photos);
    }

    for path in &args.gpx {
        let input = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let track = extract_track_points(&input, &path.display().to_string())?;
        debug!(path = %path.display(), points = track.len(), "read GPX track");
        points.extend(track);
    }

    if args.photos.is_empty() && args.gpx.is_empty() {
        let mut input = Vec::new();
        io::stdin().lock().read_to_end(&mut input)?;
        points.extend(extract_track_points(&input, "stdin")?);
    }

    if let Some(range_str) = &args.date_range {
        let range = parse_date_range(range_str)?;
        let before = points.len();
        points = filter_by_date_range(points, &range);
        info!(kept = points.len(), removed = before - points.len(), "applied date range");
    }

    if args.gpx_as_route {
        info!(points = points.len(), "using GPX track as a single trip");
        let trips = if points.is_empty() {
            Vec::new()
        } else {
            vec![Trip::from_points(points)?]
        };
        return write_output(&trips, args);
    }

    let custom = load_custom_locations(args.custom_locations.as_deref())?;
    let inference = args.infer_window.map(|hours| InferenceConfig {
        max_inference_window_hours: hours,
    });
    let place_lookup = (inference.is_some() && !custom.is_empty())
        .then_some((&custom, &NoGeocoder as &dyn GeocodeResolver));

    let options = TripOptions {
        segment: SegmentConfig {
            gap_hours: args.gap,
            distance_km: args.distance,
            min_photos: args.min_photos,
        },
        inference,
        place_lookup,
    };

    let reconstruction = reconstruct_trips(points, &options)?;
    let diagnostics = &reconstruction.diagnostics;
    info!(
        "{} trips from {} points ({} inferred, {} placed by folder name, {} without location, {} in runs too short)",
        diagnostics.trips,
        diagnostics.input_points,
        diagnostics.inferred,
        diagnostics.placed_by_name,
        diagnostics.unresolved.len(),
        diagnostics.dropped_points
    );

    write_output(&reconstruction.trips, args)
}

fn write_output(trips: &[Trip], args: &TripsArgs) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &args.summary {
        let file = File::create(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let mut output = BufWriter::new(file);
        write_summary(trips, &mut output)?;
        output.flush()?;
        info!(path = %path.display(), "wrote summary");
    }

    write_trips_gpx(trips, io::stdout().lock())?;
    Ok(())
}
