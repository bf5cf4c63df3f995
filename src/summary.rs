use std::error::Error;
use std::io::Write;
use time::macros::format_description;
use tripwrench::{PointSource, Trip};

/// Markdown overview: one section per trip, one line per point.
pub fn write_summary<W: Write>(trips: &[Trip], mut output: W) -> Result<(), Box<dyn Error>> {
    let day = format_description!("[year]-[month]-[day]");
    let clock = format_description!("[hour]:[minute]");

    writeln!(output, "# Trip Summary")?;
    writeln!(output)?;

    for (idx, trip) in trips.iter().enumerate() {
        writeln!(
            output,
            "## Segment {} - {} ({} points, {:.1} km)",
            idx + 1,
            trip.start().format(day)?,
            trip.len(),
            trip.length_km()
        )?;

        for point in trip.points() {
            let Some(location) = point.location else {
                continue;
            };
            let marker = match point.source {
                PointSource::Inferred => " (inferred)",
                PointSource::Custom => " (custom)",
                PointSource::Exif | PointSource::Gpx => "",
            };
            writeln!(
                output,
                "- {} @ {}{} {}",
                point.timestamp.format(clock)?,
                location,
                marker,
                point.origin_id
            )?;
        }
        writeln!(output)?;
    }

    Ok(())
}
