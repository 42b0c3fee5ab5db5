use std::{fmt, str::FromStr};

use trip_tracker_lib::{transport_mode::TransportMode, trip_record::TripRecord};

/// Fixed datasets standing in for a real backend query.
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Initial,
    /// The initial trips plus one recorded after a citizen used the app.
    PostTrip,
}

const INITIAL: [(&str, u32, f64, &str); 5] = [
    ("Trip 1", 15, 3.2, "Car"),
    ("Trip 2", 25, 5.8, "Bus"),
    ("Trip 3", 10, 1.5, "Walk"),
    ("Trip 4", 40, 8.5, "Train"),
    ("Trip 5", 20, 4.0, "Car"),
];

const POST_TRIP_EXTRA: (&str, u32, f64, &str) = ("Trip 6", 30, 6.5, "Car");

impl Preset {
    pub fn records(self) -> Vec<TripRecord> {
        let rows = match self {
            Preset::Initial => INITIAL.to_vec(),
            Preset::PostTrip => INITIAL.iter().copied().chain([POST_TRIP_EXTRA]).collect(),
        };

        rows.into_iter()
            .map(|(label, duration, distance, mode)| TripRecord::new(label, duration, distance, TransportMode::from(mode)))
            .collect()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Initial => f.write_str("initial"),
            Preset::PostTrip => f.write_str("post-trip"),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initial" => Ok(Preset::Initial),
            "post-trip" | "posttrip" | "post_trip" => Ok(Preset::PostTrip),
            other => Err(format!("unknown preset: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_preset() {
        let records = Preset::Initial.records();
        assert_eq!(records.len(), 5);
        assert_eq!(records[3].label(), "Trip 4");
        assert_eq!(records[3].duration_minutes(), 40);
        assert_eq!(records[3].distance_km(), 8.5);
        assert_eq!(records[3].mode(), &TransportMode::Train);
    }

    #[test]
    fn post_trip_extends_initial() {
        let records = Preset::PostTrip.records();
        assert_eq!(records.len(), 6);
        assert_eq!(records[..5], Preset::Initial.records()[..]);
        assert_eq!(records[5], TripRecord::new("Trip 6", 30, 6.5, TransportMode::Car));
    }

    #[test]
    fn parses_names() {
        assert_eq!("post-trip".parse::<Preset>(), Ok(Preset::PostTrip));
        assert_eq!("Initial".parse::<Preset>(), Ok(Preset::Initial));
        assert!("weekly".parse::<Preset>().is_err());
    }
}
