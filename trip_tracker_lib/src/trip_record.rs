#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::transport_mode::TransportMode;

/// Summary of a completed trip. Fields are private so a record cannot change after creation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "TripRecordFields"))]
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    label: String,
    duration_minutes: u32,
    distance_km: f64,
    mode: TransportMode,
}

impl TripRecord {
    /// Distance is rounded to one decimal place, negative or NaN distances become 0.
    pub fn new(label: impl Into<String>, duration_minutes: u32, distance_km: f64, mode: TransportMode) -> Self {
        Self {
            label: label.into(),
            duration_minutes,
            distance_km: round_tenths(distance_km),
            mode,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn mode(&self) -> &TransportMode {
        &self.mode
    }
}

/// Wire shape of a record. Decoding goes through `TripRecord::new` so the distance rules hold.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct TripRecordFields {
    label: String,
    duration_minutes: u32,
    distance_km: f64,
    mode: TransportMode,
}

#[cfg(feature = "serde")]
impl From<TripRecordFields> for TripRecord {
    fn from(fields: TripRecordFields) -> Self {
        TripRecord::new(fields.label, fields.duration_minutes, fields.distance_km, fields.mode)
    }
}

fn round_tenths(km: f64) -> f64 {
    if km.is_nan() || km <= 0.0 {
        return 0.0;
    }
    (km * 10.0).round() / 10.0
}
