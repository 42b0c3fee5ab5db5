use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Observable lifecycle state of the trip controller.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripStatus {
    Idle,
    Active,
    /// Idle again, with the summary of the last finished trip still on display.
    Summarized,
}

impl TripStatus {
    pub fn is_active(self) -> bool {
        self == TripStatus::Active
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripStatus::Idle => f.write_str("idle"),
            TripStatus::Active => f.write_str("active"),
            TripStatus::Summarized => f.write_str("summarized"),
        }
    }
}
