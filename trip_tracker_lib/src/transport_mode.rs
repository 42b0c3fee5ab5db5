use std::{convert::Infallible, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How a trip was travelled. Unknown names are kept as `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TransportMode {
    #[default]
    Car,
    Bus,
    Walk,
    Train,
    Other(String),
}

impl TransportMode {
    pub fn as_str(&self) -> &str {
        match self {
            TransportMode::Car => "Car",
            TransportMode::Bus => "Bus",
            TransportMode::Walk => "Walk",
            TransportMode::Train => "Train",
            TransportMode::Other(name) => name,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "car" => TransportMode::Car,
            "bus" => TransportMode::Bus,
            "walk" => TransportMode::Walk,
            "train" => TransportMode::Train,
            _ => TransportMode::Other(trimmed.to_string()),
        })
    }
}

impl From<&str> for TransportMode {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for TransportMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for TransportMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TransportMode::from(name.as_str()))
    }
}
