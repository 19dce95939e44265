use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PuzzleError;

/// Pixel coordinate of a piece on the play area.
///
/// Locations cross the persistence boundary as the text `"(x,y)"`, so the
/// serde impls read and write exactly that form. Coordinates are signed:
/// shuffling can push a piece left of or above the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl FromStr for Location {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PuzzleError::MalformedLocation {
            text: s.to_string(),
        };
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;
        let (x, y) = inner.split_once(',').ok_or_else(malformed)?;
        Ok(Self {
            x: x.trim().parse().map_err(|_| malformed())?,
            y: y.trim().parse().map_err(|_| malformed())?,
        })
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LocationVisitor;

        impl Visitor<'_> for LocationVisitor {
            type Value = Location;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a \"(x,y)\" location string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Location, E> {
                value.parse().map_err(|_| {
                    E::invalid_value(de::Unexpected::Str(value), &self)
                })
            }
        }

        deserializer.deserialize_str(LocationVisitor)
    }
}

/// Pixel size of a piece (or of the whole puzzle). Crosses the boundary as
/// a structured `{x, y}` pair, unlike locations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub x: u32,
    pub y: u32,
}

impl Dimensions {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_wire_text_round_trips() {
        for loc in [
            Location::new(0, 0),
            Location::new(150, 100),
            Location::new(-100, -50),
        ] {
            let text = loc.to_string();
            assert_eq!(text.parse::<Location>().unwrap(), loc);
        }
        assert_eq!(Location::new(150, 100).to_string(), "(150,100)");
    }

    #[test]
    fn malformed_location_text_is_rejected() {
        for text in ["", "150,100", "(150,100", "(150;100)", "(a,b)", "()"] {
            assert!(matches!(
                text.parse::<Location>(),
                Err(PuzzleError::MalformedLocation { .. })
            ));
        }
    }

    #[test]
    fn location_serde_uses_wire_text() {
        let json = serde_json::to_string(&Location::new(-50, 200)).unwrap();
        assert_eq!(json, "\"(-50,200)\"");
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Location::new(-50, 200));
    }

    #[test]
    fn dimensions_serde_is_structured() {
        let json = serde_json::to_string(&Dimensions::new(130, 90)).unwrap();
        assert_eq!(json, "{\"x\":130,\"y\":90}");
    }
}
