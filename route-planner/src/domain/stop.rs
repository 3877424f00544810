//! Stop and identifier types.

use std::fmt;
use std::sync::Arc;

use crate::geometry::Coord;

/// Longest identifier accepted from source data.
const MAX_ID_LEN: usize = 64;

/// Error returned when parsing an invalid stop or route identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier {value:?}: {reason}")]
pub struct InvalidId {
    value: String,
    reason: &'static str,
}

fn validate_id(s: &str) -> Result<(), InvalidId> {
    let fail = |reason| {
        Err(InvalidId {
            value: s.to_string(),
            reason,
        })
    };

    if s.is_empty() {
        return fail("must not be empty");
    }
    if s.len() > MAX_ID_LEN {
        return fail("must be at most 64 bytes");
    }
    if !s.chars().all(|c| c.is_ascii_graphic()) {
        return fail("must be printable ASCII without whitespace");
    }
    Ok(())
}

/// A stop identifier such as `METRO_SEV_L1_E10` or `RENFE_43002`.
///
/// Identifiers are opaque: the planner never derives meaning from their
/// structure. Any `StopId` is non-empty printable ASCII without spaces.
///
/// # Examples
///
/// ```
/// use route_planner::domain::StopId;
///
/// let id = StopId::parse("RENFE_43002").unwrap();
/// assert_eq!(id.as_str(), "RENFE_43002");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("SAN BERNARDO").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop identifier.
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        validate_id(s)?;
        Ok(StopId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A route identifier such as `METRO_SEV_L1`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(String);

impl RouteId {
    /// Parse a route identifier.
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        validate_id(s)?;
        Ok(RouteId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A physical stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub coord: Coord,
    /// Grouping key for stops that share one station building.
    pub parent_station: Option<String>,
}

impl Stop {
    /// Create a stop with no parent station.
    pub fn new(id: StopId, name: impl Into<String>, coord: Coord) -> Self {
        Self {
            id,
            name: name.into(),
            coord,
            parent_station: None,
        }
    }

    /// Set the parent station.
    pub fn with_parent_station(mut self, parent: impl Into<String>) -> Self {
        self.parent_station = Some(parent.into());
        self
    }
}

/// Index of a physical place: a group of stops treated as one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceId(pub u32);

/// A stop as visited by a journey, tagged with the place it belongs to.
///
/// Legs meet at places rather than stop ids, so a transit leg arriving at
/// one platform of a station connects to a leg leaving another.
#[derive(Debug, Clone, PartialEq)]
pub struct StopPoint {
    pub stop: Arc<Stop>,
    pub place: PlaceId,
}

impl StopPoint {
    pub fn id(&self) -> &StopId {
        &self.stop.id
    }

    pub fn name(&self) -> &str {
        &self.stop.name
    }

    pub fn coord(&self) -> Coord {
        self.stop.coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StopId::parse("METRO_SEV_L1_E21").is_ok());
        assert!(StopId::parse("RENFE_43004").is_ok());
        assert!(StopId::parse("a").is_ok());
        assert!(RouteId::parse("TRAM_SEV_T1").is_ok());
    }

    #[test]
    fn reject_whitespace_and_empty() {
        assert!(StopId::parse("").is_err());
        assert!(StopId::parse(" X").is_err());
        assert!(StopId::parse("A\tB").is_err());
        assert!(RouteId::parse("L 1").is_err());
    }

    #[test]
    fn reject_non_ascii() {
        assert!(StopId::parse("NERVIÓN").is_err());
    }

    #[test]
    fn reject_too_long() {
        let long = "X".repeat(65);
        assert!(StopId::parse(&long).is_err());
        assert!(StopId::parse(&long[..64]).is_ok());
    }

    #[test]
    fn error_names_value() {
        let err = StopId::parse("A B").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid identifier \"A B\": must be printable ASCII without whitespace"
        );
    }

    #[test]
    fn display_and_debug() {
        let id = StopId::parse("RENFE_43002").unwrap();
        assert_eq!(format!("{id}"), "RENFE_43002");
        assert_eq!(format!("{id:?}"), "StopId(RENFE_43002)");

        let route = RouteId::parse("METRO_SEV_L1").unwrap();
        assert_eq!(format!("{route:?}"), "RouteId(METRO_SEV_L1)");
    }

    #[test]
    fn stop_builder() {
        let coord = Coord::new(37.3785, -5.9790).unwrap();
        let stop = Stop::new(StopId::parse("M").unwrap(), "San Bernardo", coord)
            .with_parent_station("SEV_SAN_BERNARDO");
        assert_eq!(stop.parent_station.as_deref(), Some("SEV_SAN_BERNARDO"));
        assert_eq!(stop.name, "San Bernardo");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parse then as_str returns the original
        #[test]
        fn roundtrip(s in "[A-Z0-9_]{1,64}") {
            let id = StopId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Any string containing a space is rejected
        #[test]
        fn spaces_rejected(a in "[A-Z]{0,5}", b in "[A-Z]{0,5}") {
            let s = format!("{a} {b}");
            prop_assert!(StopId::parse(&s).is_err());
        }
    }
}
