use thiserror::Error;
use time::OffsetDateTime;

#[derive(Error, Debug)]
pub enum TripError {
    #[error("No location within the inference window for {origin_id}")]
    UnresolvedPoint { origin_id: String },

    #[error("Run of {points} points starting {start} is below the minimum of {min_photos}")]
    InsufficientPoints {
        points: usize,
        min_photos: usize,
        start: OffsetDateTime,
    },

    #[error("Got {dates} dates for {names} route stops")]
    DateCountMismatch { names: usize, dates: usize },

    #[error("Route dates must be non-decreasing (stop {index} goes back in time)")]
    DatesOutOfOrder { index: usize },

    #[error("A route needs at least one stop")]
    EmptyRoute,

    #[error("Could not resolve location {name:?}")]
    LocationResolution {
        name: String,
        #[source]
        source: ResolutionFailure,
    },

    #[error("Invalid point {origin_id}: {reason}")]
    InvalidPoint { origin_id: String, reason: String },

    #[error("Shifting {origin_id} by {hours} hours leaves the supported time range")]
    TimestampOutOfRange { origin_id: String, hours: i64 },

    #[error("A trip needs at least one point")]
    EmptyTrip,

    #[error("Custom location {name:?} has out-of-range coordinates")]
    InvalidCustomLocation { name: String },

    #[error("Invalid custom location table")]
    LocationTable(#[from] serde_json::Error),
}

/// Returned by a [`GeocodeResolver`](crate::locations::GeocodeResolver) that has no answer for a name.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct ResolutionFailure {
    pub reason: String,
}

impl ResolutionFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TripError>;
