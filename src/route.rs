//! Explicit, user-authored routes built from a list of place names.

use time::{Date, Duration};
use tracing::info;

use crate::error::{Result, TripError};
use crate::locations::{CustomLocationTable, GeocodeResolver, resolve_name};
use crate::point::{Coord, PointSource};

#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub location: Coord,
    pub date: Option<Date>,
    pub source: PointSource,
}

/// Ordered stops. Either every waypoint has a date or none does.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn is_dated(&self) -> bool {
        self.waypoints.first().is_some_and(|w| w.date.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RouteDates {
    #[default]
    None,
    /// First stop on this date, each following stop one calendar day later.
    Start(Date),
    /// One date per stop.
    PerStop(Vec<Date>),
}

/// Expands `dates` into one optional date per stop, validating counts and order.
fn stop_dates(stops: usize, dates: &RouteDates) -> Result<Vec<Option<Date>>> {
    match dates {
        RouteDates::None => Ok(vec![None; stops]),
        RouteDates::Start(start) => Ok((0..stops)
            .map(|i| Some(start.saturating_add(Duration::days(i as i64))))
            .collect()),
        RouteDates::PerStop(dates) => {
            if dates.len() != stops {
                return Err(TripError::DateCountMismatch {
                    names: stops,
                    dates: dates.len(),
                });
            }
            if let Some(index) = dates.windows(2).position(|w| w[1] < w[0]) {
                return Err(TripError::DatesOutOfOrder { index: index + 1 });
            }
            Ok(dates.iter().copied().map(Some).collect())
        }
    }
}

/// Builds a route visiting `names` in order.
///
/// Each name is looked up in `custom` first and then passed to `geocoder`. Any
/// name that cannot be resolved fails the whole route.
pub fn build_route<S, R>(
    names: &[S],
    dates: &RouteDates,
    custom: &CustomLocationTable,
    geocoder: &R,
) -> Result<Route>
where
    S: AsRef<str>,
    R: GeocodeResolver + ?Sized,
{
    if names.is_empty() {
        return Err(TripError::EmptyRoute);
    }
    let dates = stop_dates(names.len(), dates)?;

    let mut waypoints = Vec::with_capacity(names.len());
    for (name, date) in names.iter().map(AsRef::as_ref).zip(dates) {
        let (location, source) =
            resolve_name(name, custom, geocoder).map_err(|source| TripError::LocationResolution {
                name: name.to_string(),
                source,
            })?;
        info!(stop = name, %location, "added route stop");
        waypoints.push(Waypoint {
            name: name.to_string(),
            location,
            date,
            source,
        });
    }

    Ok(Route { waypoints })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolutionFailure;
    use crate::locations::NoGeocoder;
    use std::cell::RefCell;
    use time::macros::date;

    struct RecordingGeocoder {
        asked: RefCell<Vec<String>>,
    }

    impl RecordingGeocoder {
        fn new() -> Self {
            Self {
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl GeocodeResolver for RecordingGeocoder {
        fn resolve(&self, name: &str) -> std::result::Result<Coord, ResolutionFailure> {
            self.asked.borrow_mut().push(name.to_string());
            match name {
                "Vienna" => Ok(Coord::new(48.2082, 16.3738)),
                "Salzburg" => Ok(Coord::new(47.8095, 13.0550)),
                _ => Err(ResolutionFailure::new("unknown place")),
            }
        }
    }

    fn table() -> CustomLocationTable {
        CustomLocationTable::from_pairs([("Hallstatt", (47.5622, 13.6493))]).unwrap()
    }

    #[test]
    fn test_builds_route_in_input_order() {
        let geocoder = RecordingGeocoder::new();
        let route = build_route(
            &["Vienna", "Hallstatt", "Salzburg"],
            &RouteDates::None,
            &table(),
            &geocoder,
        )
        .unwrap();

        let names: Vec<_> = route.waypoints().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Vienna", "Hallstatt", "Salzburg"]);
        assert_eq!(route.waypoints()[1].source, PointSource::Custom);
        assert_eq!(route.waypoints()[1].location, Coord::new(47.5622, 13.6493));
        assert!(!route.is_dated());
        // Custom locations never reach the geocoder
        assert_eq!(*geocoder.asked.borrow(), vec!["Vienna", "Salzburg"]);
    }

    #[test]
    fn test_date_count_mismatch_is_fatal() {
        let geocoder = RecordingGeocoder::new();
        let result = build_route(
            &["A", "B"],
            &RouteDates::PerStop(vec![date!(2024 - 01 - 01)]),
            &table(),
            &geocoder,
        );

        match result {
            Err(TripError::DateCountMismatch { names, dates }) => {
                assert_eq!(names, 2);
                assert_eq!(dates, 1);
            }
            other => panic!("Expected DateCountMismatch, got {:?}", other),
        }
        assert!(geocoder.asked.borrow().is_empty());
    }

    #[test]
    fn test_per_stop_dates() {
        let route = build_route(
            &["Vienna", "Salzburg"],
            &RouteDates::PerStop(vec![date!(2024 - 06 - 01), date!(2024 - 06 - 01)]),
            &CustomLocationTable::new(),
            &RecordingGeocoder::new(),
        )
        .unwrap();

        assert!(route.is_dated());
        assert_eq!(route.waypoints()[1].date, Some(date!(2024 - 06 - 01)));
    }

    #[test]
    fn test_decreasing_dates_are_rejected() {
        let result = build_route(
            &["Vienna", "Hallstatt", "Salzburg"],
            &RouteDates::PerStop(vec![
                date!(2024 - 06 - 01),
                date!(2024 - 06 - 03),
                date!(2024 - 06 - 02),
            ]),
            &table(),
            &RecordingGeocoder::new(),
        );
        assert!(matches!(result, Err(TripError::DatesOutOfOrder { index: 2 })));
    }

    #[test]
    fn test_start_date_spaces_stops_by_day() {
        let route = build_route(
            &["Vienna", "Hallstatt", "Salzburg"],
            &RouteDates::Start(date!(2024 - 02 - 28)),
            &table(),
            &RecordingGeocoder::new(),
        )
        .unwrap();

        let dates: Vec<_> = route.waypoints().iter().map(|w| w.date.unwrap()).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 28),
                date!(2024 - 02 - 29),
                date!(2024 - 03 - 01)
            ]
        );
    }

    #[test]
    fn test_unresolved_stop_fails_whole_route() {
        let result = build_route(
            &["Vienna", "Atlantis", "Salzburg"],
            &RouteDates::None,
            &table(),
            &RecordingGeocoder::new(),
        );

        match result {
            Err(TripError::LocationResolution { name, .. }) => assert_eq!(name, "Atlantis"),
            other => panic!("Expected LocationResolution, got {:?}", other),
        }
    }

    #[test]
    fn test_offline_route_from_custom_table() {
        let route = build_route(
            &["Hallstatt".to_string()],
            &RouteDates::PerStop(vec![date!(2024 - 06 - 01)]),
            &table(),
            &NoGeocoder,
        )
        .unwrap();
        assert_eq!(route.len(), 1);
    }

    #[test]
    fn test_empty_route_is_rejected() {
        let names: [&str; 0] = [];
        let result = build_route(&names, &RouteDates::None, &table(), &NoGeocoder);
        assert!(matches!(result, Err(TripError::EmptyRoute)));
    }
}
