use std::error::Error;
use std::path::Path;
use time::format_description::StaticFormatDescription;
use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};

pub mod error;
pub mod geo;
pub mod infer;
pub mod locations;
pub mod pipeline;
pub mod point;
pub mod route;
pub mod segment;

pub use error::{ResolutionFailure, TripError};
pub use geo::{distance_km, hours_between};
pub use infer::{InferenceConfig, infer_locations};
pub use locations::{CustomLocationTable, GeocodeResolver, NoGeocoder};
pub use pipeline::{Diagnostics, Reconstruction, TripOptions, reconstruct_trips};
pub use point::{Coord, DateRange, Point, PointSource};
pub use route::{Route, RouteDates, Waypoint, build_route};
pub use segment::{SegmentConfig, Segmentation, Trip, segment_trips};

pub fn parse_date(s: &str) -> Result<Date, Box<dyn Error>> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Empty date".into());
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("Invalid date {s:?} (expected YYYY-MM-DD): {e}").into())
}

/// Parses `YYYY-MM-DD:YYYY-MM-DD`, or a single `YYYY-MM-DD` meaning that day only.
pub fn parse_date_range(range_str: &str) -> Result<DateRange, Box<dyn Error>> {
    let parts: Vec<&str> = range_str.split(':').collect();

    let (start, end) = match parts.as_slice() {
        [day] => {
            let day = parse_date(day)?;
            (day, day)
        }
        [start, end] => (parse_date(start)?, parse_date(end)?),
        _ => return Err("Date range must be YYYY-MM-DD:YYYY-MM-DD".into()),
    };

    if end < start {
        return Err(format!("Date range ends ({end}) before it starts ({start})").into());
    }

    Ok(DateRange { start, end })
}

/// Parses a capture timestamp. Strings with an offset are taken as-is; local
/// camera times (ISO or EXIF `YYYY:MM:DD HH:MM:SS` style) are read as UTC and
/// left for the timezone shift to correct.
pub fn parse_timestamp(s: &str) -> Result<OffsetDateTime, Box<dyn Error>> {
    let s = s.trim();

    if let Ok(t) = OffsetDateTime::parse(s, &Iso8601::DEFAULT) {
        return Ok(t);
    }

    let local_formats = [
        format_description!("[year]:[month]:[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ];
    for format in local_formats {
        if let Ok(t) = PrimitiveDateTime::parse(s, format) {
            return Ok(t.assume_utc());
        }
    }

    Err(format!("Unrecognised timestamp {s:?}").into())
}

/// File name layouts cameras and messengers use, each paired with a sample of
/// its exact length.
const FILENAME_PATTERNS: [(&str, StaticFormatDescription); 6] = [
    (
        "IMG_20000101_000000",
        format_description!("IMG_[year][month][day]_[hour][minute][second]"),
    ),
    (
        "2000-01-01_00-00-00",
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]"),
    ),
    (
        "20000101_000000",
        format_description!("[year][month][day]_[hour][minute][second]"),
    ),
    (
        "IMG-20000101-000000",
        format_description!("IMG-[year][month][day]-[hour][minute][second]"),
    ),
    (
        "WhatsApp Image 2000-01-01 at 00.00.00",
        format_description!("WhatsApp Image [year]-[month]-[day] at [hour].[minute].[second]"),
    ),
    (
        "Photo 2000-01-01 00-00-00",
        format_description!("Photo [year]-[month]-[day] [hour]-[minute]-[second]"),
    ),
];

/// Recovers a capture time from the file name in `path`, read as UTC like
/// other camera-local times. A bare year followed by `_` or `-` gives noon
/// on January 1st.
pub fn timestamp_from_filename(path: &str) -> Option<OffsetDateTime> {
    let name = Path::new(path).file_name()?.to_str()?;

    for (sample, format) in FILENAME_PATTERNS {
        let found = (0..name.len())
            .filter_map(|start| name.get(start..start + sample.len()))
            .filter(|window| window.starts_with(|c: char| c.is_ascii_alphanumeric()))
            .find_map(|window| PrimitiveDateTime::parse(window, format).ok());
        if let Some(t) = found {
            return Some(t.assume_utc());
        }
    }

    name.as_bytes().windows(5).find_map(|w| {
        let (digits, sep) = w.split_at(4);
        if !digits.iter().all(u8::is_ascii_digit) || !matches!(sep[0], b'_' | b'-') {
            return None;
        }
        let year: i32 = std::str::from_utf8(digits).ok()?.parse().ok()?;
        let noon = Date::from_calendar_date(year, Month::January, 1)
            .ok()?
            .with_hms(12, 0, 0)
            .ok()?;
        Some(noon.assume_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-31").unwrap(), date!(2024 - 01 - 31));
        assert_eq!(parse_date(" 2024-01-31 ").unwrap(), date!(2024 - 01 - 31));
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("31/01/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_date_range() {
        let range = parse_date_range("2023-07-01:2023-07-14").unwrap();
        assert_eq!(range.start, date!(2023 - 07 - 01));
        assert_eq!(range.end, date!(2023 - 07 - 14));

        let single = parse_date_range("2023-07-01").unwrap();
        assert_eq!(single.start, single.end);

        assert!(parse_date_range("2023-07-14:2023-07-01").is_err()); // Backwards
        assert!(parse_date_range("2023-07-01:2023-07-02:2023-07-03").is_err());
        assert!(parse_date_range("July").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("2023-07-01T10:15:00Z").unwrap(),
            datetime!(2023-07-01 10:15 UTC)
        );
        assert_eq!(
            parse_timestamp("2023-07-01T10:15:00+02:00").unwrap(),
            datetime!(2023-07-01 08:15 UTC)
        );
        assert_eq!(
            parse_timestamp("2023:07:01 10:15:00").unwrap(),
            datetime!(2023-07-01 10:15 UTC)
        );
        assert_eq!(
            parse_timestamp("2023-07-01 10:15:00").unwrap(),
            datetime!(2023-07-01 10:15 UTC)
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_from_filename_patterns() {
        let cases = [
            ("IMG_20230610_120000.jpg", datetime!(2023-06-10 12:00:00 UTC)),
            ("2023-06-10_12-30-05.jpg", datetime!(2023-06-10 12:30:05 UTC)),
            ("20230610_081500_HDR.jpg", datetime!(2023-06-10 08:15:00 UTC)),
            ("IMG-20230610-235959.jpg", datetime!(2023-06-10 23:59:59 UTC)),
            (
                "WhatsApp Image 2023-06-10 at 14.02.33.jpeg",
                datetime!(2023-06-10 14:02:33 UTC),
            ),
            ("Photo 2023-06-10 09-45-00.jpg", datetime!(2023-06-10 09:45:00 UTC)),
            ("Lisbon/IMG_20230611_070000.jpg", datetime!(2023-06-11 07:00:00 UTC)),
        ];
        for (name, expected) in cases {
            assert_eq!(timestamp_from_filename(name), Some(expected), "{name}");
        }
    }

    #[test]
    fn test_timestamp_from_filename_year_fallback() {
        assert_eq!(
            timestamp_from_filename("beach_2019-best.jpg"),
            Some(datetime!(2019-01-01 12:00 UTC))
        );
        // An impossible date falls through to the year
        assert_eq!(
            timestamp_from_filename("IMG_20231340_120000.jpg"),
            Some(datetime!(1340-01-01 12:00 UTC))
        );
    }

    #[test]
    fn test_timestamp_from_filename_no_match() {
        assert_eq!(timestamp_from_filename("DSC0001.jpg"), None);
        // Folder names are not consulted
        assert_eq!(timestamp_from_filename("2019_Bled/IMG_0001.jpg"), None);
        assert_eq!(timestamp_from_filename(""), None);
    }
}
