use std::fmt;

use chrono::{DateTime, Utc};
use trip_tracker_lib::trip_status::TripStatus;

pub mod clock;
pub mod controller;
pub mod distance;
pub mod presets;
pub mod session;
pub mod store;

pub use controller::TripController;
pub use session::*;
pub use store::{DatasetSource, DatasetStore};

pub const DEFAULT_LABEL_PREFIX: &str = "Trip";
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;
/// Capacity of the session event channel. Lagging subscribers skip old events.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The user action a transition was attempted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripAction {
    Start,
    End,
    Cancel,
}

impl fmt::Display for TripAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripAction::Start => f.write_str("start"),
            TripAction::End => f.write_str("end"),
            TripAction::Cancel => f.write_str("cancel"),
        }
    }
}

/// Errors are reported to the caller with the controller state left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripError {
    InvalidStateTransition { from: TripStatus, action: TripAction },
    ClockSkew { started_at: DateTime<Utc>, ended_at: DateTime<Utc> },
}

impl fmt::Display for TripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripError::InvalidStateTransition { from, action } => {
                write!(f, "cannot {action} a trip while {from}")
            }
            TripError::ClockSkew { started_at, ended_at } => write!(
                f,
                "trip ended at {} before it started at {}",
                ended_at.to_rfc3339(),
                started_at.to_rfc3339()
            ),
        }
    }
}

impl std::error::Error for TripError {}
