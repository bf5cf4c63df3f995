use crate::RouteArgs;
use crate::commands::load_custom_locations;
use crate::gpxxml::write_route_gpx;
use std::error::Error;
use std::io;
use tracing::info;
use tripwrench::{NoGeocoder, RouteDates, build_route, parse_date};

pub fn route_command(args: &RouteArgs) -> Result<(), Box<dyn Error>> {
    let dates = match (&args.start_date, args.dates.as_slice()) {
        (Some(start), _) => RouteDates::Start(parse_date(start)?),
        (None, []) => RouteDates::None,
        (None, dates) => RouteDates::PerStop(
            dates
                .iter()
                .map(|d| parse_date(d))
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };

    let custom = load_custom_locations(args.custom_locations.as_deref())?;
    let route = build_route(&args.cities, &dates, &custom, &NoGeocoder)?;
    info!(stops = route.len(), "built route");

    write_route_gpx(&route, io::stdout().lock())?;
    Ok(())
}
