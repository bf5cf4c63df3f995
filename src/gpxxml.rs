use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::error::Error;
use std::io::Write;
use time::OffsetDateTime;
use time::format_description::well_known::{Iso8601, Rfc3339};
use tracing::debug;
use tripwrench::{Coord, Point, PointSource, Route, Trip, TripError};

/// Reads every timed `<trkpt>` as a located point. `origin` prefixes the
/// point index to form each point's `origin_id`. A timed point without
/// usable coordinates is an error.
pub fn extract_track_points(input: &[u8], origin: &str) -> Result<Vec<Point>, Box<dyn Error>> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut points = Vec::new();
    let mut index = 0usize;

    let mut in_trkpt = false;
    let mut current_lat: Option<f64> = None;
    let mut current_lon: Option<f64> = None;
    let mut current_time: Option<OffsetDateTime> = None;
    let mut in_time_element = false;
    let mut time_text = String::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(
                    format!("Error at position {}: {:?}", reader.buffer_position(), e).into(),
                );
            }
            Ok(Event::Eof) => break,
            Ok(event) => event.into_owned(),
        };

        match event {
            Event::Start(ref e) => {
                if e.name().as_ref() == "trkpt" {
                    in_trkpt = true;
                    current_lat = None;
                    current_lon = None;
                    current_time = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            "lat" => current_lat = attr.value.trim().parse().ok(),
                            "lon" => current_lon = attr.value.trim().parse().ok(),
                            _ => {}
                        }
                    }
                } else if in_trkpt && e.name().as_ref() == "time" {
                    in_time_element = true;
                    time_text.clear();
                }
            }

            Event::End(ref e) => {
                if e.name().as_ref() == "trkpt" {
                    let origin_id = format!("{origin}#{index}");
                    index += 1;
                    match (current_time, current_lat, current_lon) {
                        (None, _, _) => {
                            debug!(origin = %origin_id, "skipping track point without time")
                        }
                        (Some(_), None, None) => {
                            return Err(TripError::InvalidPoint {
                                origin_id,
                                reason: "track point has no coordinates".into(),
                            }
                            .into());
                        }
                        (Some(time), lat, lon) => points.push(Point::from_parts(
                            time,
                            lat,
                            lon,
                            PointSource::Gpx,
                            origin_id,
                        )?),
                    }
                    in_trkpt = false;
                } else if e.name().as_ref() == "time" && in_trkpt {
                    in_time_element = false;
                    if let Ok(parsed_time) = OffsetDateTime::parse(time_text.trim(), &Iso8601::DEFAULT)
                    {
                        current_time = Some(parsed_time);
                    }
                }
            }

            Event::Text(ref e) => {
                if in_trkpt && in_time_element {
                    time_text.push_str(e);
                }
            }

            _ => {}
        }

        buf.clear();
    }

    Ok(points)
}

fn write_gpx_start<W: Write>(writer: &mut Writer<W>) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", "tripwrench"));
    gpx.push_attribute(("xmlns", "http://www.topografix.com/GPX/1/1"));
    writer.write_event(Event::Start(gpx))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_trkpt<W: Write>(
    writer: &mut Writer<W>,
    location: Coord,
    time: Option<OffsetDateTime>,
    name: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let lat = location.lat.to_string();
    let lon = location.lon.to_string();
    let mut trkpt = BytesStart::new("trkpt");
    trkpt.push_attribute(("lat", lat.as_str()));
    trkpt.push_attribute(("lon", lon.as_str()));
    writer.write_event(Event::Start(trkpt))?;

    if let Some(time) = time {
        write_text_element(writer, "time", &time.format(&Rfc3339)?)?;
    }
    if let Some(name) = name {
        write_text_element(writer, "name", name)?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
    Ok(())
}

/// Writes one `<trk>` per trip, named `Segment 1`, `Segment 2`, ...
pub fn write_trips_gpx<W: Write>(trips: &[Trip], output: W) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(output, b' ', 2);
    write_gpx_start(&mut writer)?;

    for (idx, trip) in trips.iter().enumerate() {
        writer.write_event(Event::Start(BytesStart::new("trk")))?;
        write_text_element(&mut writer, "name", &format!("Segment {}", idx + 1))?;
        writer.write_event(Event::Start(BytesStart::new("trkseg")))?;

        for point in trip.points() {
            if let Some(location) = point.location {
                write_trkpt(&mut writer, location, Some(point.timestamp), None)?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
        writer.write_event(Event::End(BytesEnd::new("trk")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(())
}

/// Writes a route as a single `Custom Route` track with one named point per stop.
pub fn write_route_gpx<W: Write>(route: &Route, output: W) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(output, b' ', 2);
    write_gpx_start(&mut writer)?;

    writer.write_event(Event::Start(BytesStart::new("trk")))?;
    write_text_element(&mut writer, "name", "Custom Route")?;
    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;

    for waypoint in route.waypoints() {
        let time = waypoint.date.map(|d| d.midnight().assume_utc());
        write_trkpt(&mut writer, waypoint.location, time, Some(&waypoint.name))?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
    writer.write_event(Event::End(BytesEnd::new("trk")))?;
    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(())
}
