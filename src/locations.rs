//! Named places: the user's custom coordinate table and the geocoder seam.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ResolutionFailure, Result, TripError};
use crate::point::{Coord, PointSource};

/// Turns a place name into coordinates.
///
/// Implementations may hit the network, cache, or rate-limit internally; callers
/// treat every call as a single synchronous unit that either answers or fails.
pub trait GeocodeResolver {
    fn resolve(&self, name: &str) -> std::result::Result<Coord, ResolutionFailure>;
}

/// Resolver used when no geocoding service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeocoder;

impl GeocodeResolver for NoGeocoder {
    fn resolve(&self, name: &str) -> std::result::Result<Coord, ResolutionFailure> {
        Err(ResolutionFailure::new(format!(
            "no geocoding service configured to look up {name:?}"
        )))
    }
}

/// Immutable map from exact, case-sensitive place name to coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomLocationTable {
    entries: HashMap<String, Coord>,
}

impl CustomLocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object of the form `{"Name": [lat, lon], ...}`.
    pub fn from_json(input: &[u8]) -> Result<Self> {
        let raw: HashMap<String, (f64, f64)> = serde_json::from_slice(input)?;
        Self::from_pairs(raw)
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, (f64, f64))>,
        S: Into<String>,
    {
        let mut entries = HashMap::new();
        for (name, (lat, lon)) in pairs {
            let name = name.into();
            let coord = Coord::new(lat, lon);
            if !coord.is_valid() {
                return Err(TripError::InvalidCustomLocation { name });
            }
            entries.insert(name, coord);
        }
        debug!(entries = entries.len(), "loaded custom location table");
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<Coord> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeocodeResolver for CustomLocationTable {
    fn resolve(&self, name: &str) -> std::result::Result<Coord, ResolutionFailure> {
        self.get(name)
            .ok_or_else(|| ResolutionFailure::new(format!("{name:?} is not a custom location")))
    }
}

/// Looks `name` up in the custom table first, then asks the geocoder.
pub fn resolve_name<R: GeocodeResolver + ?Sized>(
    name: &str,
    custom: &CustomLocationTable,
    geocoder: &R,
) -> std::result::Result<(Coord, PointSource), ResolutionFailure> {
    if let Some(coord) = custom.get(name) {
        debug!(place = name, %coord, "using custom coordinates");
        return Ok((coord, PointSource::Custom));
    }
    let coord = geocoder.resolve(name)?;
    debug!(place = name, %coord, "geocoded");
    Ok((coord, PointSource::Inferred))
}
