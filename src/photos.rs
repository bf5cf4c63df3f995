//! Photo manifests: the metadata an EXIF scan produced, as JSON.
//!
//! ```json
//! [
//!   {"file": "2019_Bled/IMG_0001.jpg", "time": "2019:08:14 10:02:11", "lat": 46.36, "lon": 14.09},
//!   {"file": "2019_Bled/IMG_0002.jpg", "time": "2019:08:14 10:40:00"}
//! ]
//! ```

use serde::Deserialize;
use std::error::Error;
use tracing::{debug, warn};
use tripwrench::{Point, PointSource, parse_timestamp, timestamp_from_filename};

#[derive(Debug, Deserialize)]
struct PhotoEntry {
    file: String,
    time: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Parses a manifest into points. With `filename_dates`, a photo without a
/// capture time falls back to the date in its file name. Photos still without
/// a time cannot be placed on the timeline and are skipped; bad coordinates
/// are an error.
pub fn read_photo_manifest(
    input: &[u8],
    filename_dates: bool,
) -> Result<Vec<Point>, Box<dyn Error>> {
    let entries: Vec<PhotoEntry> = serde_json::from_slice(input)?;
    let mut points = Vec::with_capacity(entries.len());

    for entry in entries {
        let timestamp = match entry.time.as_deref() {
            Some(time) => parse_timestamp(time).map_err(|e| format!("{}: {e}", entry.file))?,
            None => match filename_dates.then(|| timestamp_from_filename(&entry.file)).flatten() {
                Some(timestamp) => {
                    debug!(file = %entry.file, %timestamp, "capture time taken from file name");
                    timestamp
                }
                None => {
                    warn!(file = %entry.file, "photo has no capture time, skipping");
                    continue;
                }
            },
        };
        points.push(Point::from_parts(
            timestamp,
            entry.lat,
            entry.lon,
            PointSource::Exif,
            entry.file,
        )?);
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use tripwrench::{Coord, TripError};

    #[test]
    fn test_read_photo_manifest() {
        let manifest = br#"[
            {"file": "a.jpg", "time": "2019:08:14 10:02:11", "lat": 46.36, "lon": 14.09},
            {"file": "b.jpg", "time": "2019-08-14T10:40:00+02:00"},
            {"file": "c.jpg", "lat": 46.0, "lon": 14.0}
        ]"#;

        let points = read_photo_manifest(manifest, false).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].location, Some(Coord::new(46.36, 14.09)));
        assert_eq!(points[0].timestamp, datetime!(2019-08-14 10:02:11 UTC));
        assert_eq!(points[1].location, None);
        assert_eq!(points[1].timestamp, datetime!(2019-08-14 08:40:00 UTC));
        assert_eq!(points[1].origin_id, "b.jpg");
    }

    #[test]
    fn test_half_located_photo_is_an_error() {
        let manifest = br#"[{"file": "a.jpg", "time": "2019:08:14 10:02:11", "lat": 46.36}]"#;

        let err = read_photo_manifest(manifest, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TripError>(),
            Some(TripError::InvalidPoint { .. })
        ));
    }

    #[test]
    fn test_bad_timestamp_names_the_file() {
        let manifest = br#"[{"file": "odd.jpg", "time": "last tuesday"}]"#;

        let err = read_photo_manifest(manifest, false).unwrap_err();
        assert!(err.to_string().contains("odd.jpg"));
    }

    #[test]
    fn test_filename_dates_fill_missing_capture_time() {
        let manifest = br#"[
            {"file": "Lisbon/IMG_20230610_120000.jpg", "lat": 38.71, "lon": -9.14},
            {"file": "Lisbon/DSC0001.jpg", "lat": 38.71, "lon": -9.14},
            {"file": "IMG_20230610_130000.jpg", "time": "2023:06:10 13:05:00"}
        ]"#;

        let points = read_photo_manifest(manifest, true).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, datetime!(2023-06-10 12:00 UTC));
        assert_eq!(points[0].location, Some(Coord::new(38.71, -9.14)));
        // A recorded capture time wins over the file name
        assert_eq!(points[1].timestamp, datetime!(2023-06-10 13:05 UTC));

        let points = read_photo_manifest(manifest, false).unwrap();
        assert_eq!(points.len(), 1);
    }
}
