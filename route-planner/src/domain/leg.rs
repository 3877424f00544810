//! Leg types.
//!
//! A `Leg` is one contiguous part of a journey: a ride on a single route,
//! or a walk between stops. Routes and stops are shared through `Arc` so
//! legs stay cheap to clone.

use std::sync::Arc;

use chrono::Duration;

use super::{DomainError, Route, StopPoint, TransportMode};
use crate::geometry::{Coord, MaxGap, normalize};

/// A ride on one route from boarding to alighting.
///
/// # Invariants
///
/// - At least two stops (boarding and alighting)
/// - Stops are in travel order
#[derive(Debug, Clone, PartialEq)]
pub struct TransitLeg {
    route: Arc<Route>,
    headsign: String,
    stops: Vec<StopPoint>,
    duration: Duration,
    geometry: Vec<Coord>,
}

impl TransitLeg {
    /// Construct a transit leg.
    ///
    /// `stops` runs from boarding to alighting inclusive. `duration` covers
    /// waiting for the vehicle as well as riding it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if fewer than two stops are given.
    pub fn new(
        route: Arc<Route>,
        headsign: impl Into<String>,
        stops: Vec<StopPoint>,
        duration: Duration,
        geometry: Vec<Coord>,
    ) -> Result<Self, DomainError> {
        if stops.len() < 2 {
            return Err(DomainError::InvalidLeg("transit leg needs two stops"));
        }

        Ok(TransitLeg {
            route,
            headsign: headsign.into(),
            stops,
            duration,
            geometry,
        })
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Name of the terminus the vehicle is heading to.
    pub fn headsign(&self) -> &str {
        &self.headsign
    }

    /// Boarding stop.
    pub fn origin(&self) -> &StopPoint {
        // Safe: validated at construction
        &self.stops[0]
    }

    /// Alighting stop.
    pub fn destination(&self) -> &StopPoint {
        &self.stops[self.stops.len() - 1]
    }

    /// Stops passed between boarding and alighting.
    pub fn intermediate_stops(&self) -> &[StopPoint] {
        &self.stops[1..self.stops.len() - 1]
    }

    /// All stops from boarding to alighting, inclusive.
    pub fn stops(&self) -> &[StopPoint] {
        &self.stops
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn geometry(&self) -> &[Coord] {
        &self.geometry
    }
}

/// A walk between two distinct physical stops.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingLeg {
    from: StopPoint,
    to: StopPoint,
    distance_m: f64,
    duration: Duration,
    geometry: Vec<Coord>,
}

impl WalkingLeg {
    /// Creates a straight walk from `from` to `to`.
    pub fn new(from: StopPoint, to: StopPoint, distance_m: f64, duration: Duration) -> Self {
        let geometry = vec![from.coord(), to.coord()];
        Self {
            from,
            to,
            distance_m,
            duration,
            geometry,
        }
    }

    /// Replace the straight-line geometry, e.g. for walks through an
    /// intermediate stop.
    pub fn with_geometry(mut self, geometry: Vec<Coord>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn origin(&self) -> &StopPoint {
        &self.from
    }

    pub fn destination(&self) -> &StopPoint {
        &self.to
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn geometry(&self) -> &[Coord] {
        &self.geometry
    }
}

/// A leg of a journey: either a ride or a walk.
#[derive(Debug, Clone, PartialEq)]
pub enum Leg {
    Transit(TransitLeg),
    Walking(WalkingLeg),
}

impl Leg {
    pub fn origin(&self) -> &StopPoint {
        match self {
            Leg::Transit(leg) => leg.origin(),
            Leg::Walking(walk) => walk.origin(),
        }
    }

    pub fn destination(&self) -> &StopPoint {
        match self {
            Leg::Transit(leg) => leg.destination(),
            Leg::Walking(walk) => walk.destination(),
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Leg::Transit(leg) => leg.duration(),
            Leg::Walking(walk) => walk.duration(),
        }
    }

    pub fn geometry(&self) -> &[Coord] {
        match self {
            Leg::Transit(leg) => leg.geometry(),
            Leg::Walking(walk) => walk.geometry(),
        }
    }

    /// Transport mode; walking legs report [`TransportMode::Walking`].
    pub fn mode(&self) -> TransportMode {
        match self {
            Leg::Transit(leg) => leg.route().mode,
            Leg::Walking(_) => TransportMode::Walking,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, Leg::Transit(_))
    }

    pub fn is_walking(&self) -> bool {
        matches!(self, Leg::Walking(_))
    }

    pub fn as_transit(&self) -> Option<&TransitLeg> {
        match self {
            Leg::Transit(leg) => Some(leg),
            Leg::Walking(_) => None,
        }
    }

    pub fn as_walking(&self) -> Option<&WalkingLeg> {
        match self {
            Leg::Transit(_) => None,
            Leg::Walking(walk) => Some(walk),
        }
    }

    /// Densify this leg's polyline in place.
    pub fn normalize_geometry(&mut self, max_gap: MaxGap) {
        let geometry = match self {
            Leg::Transit(leg) => &mut leg.geometry,
            Leg::Walking(walk) => &mut walk.geometry,
        };
        let dense = normalize(geometry, max_gap);
        *geometry = dense;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{route, stop_point};

    #[test]
    fn transit_leg_endpoints() {
        let stops = vec![
            stop_point("A", 37.00, -6.0, 0),
            stop_point("B", 37.01, -6.0, 1),
            stop_point("C", 37.02, -6.0, 2),
        ];
        let leg = TransitLeg::new(
            route("L1", TransportMode::Metro),
            "C",
            stops,
            Duration::minutes(4),
            vec![],
        )
        .unwrap();

        assert_eq!(leg.origin().id().as_str(), "A");
        assert_eq!(leg.destination().id().as_str(), "C");
        assert_eq!(leg.intermediate_stops().len(), 1);
        assert_eq!(leg.intermediate_stops()[0].name(), "B");
        assert_eq!(leg.headsign(), "C");
    }

    #[test]
    fn transit_leg_without_intermediate_stops() {
        let stops = vec![stop_point("A", 37.0, -6.0, 0), stop_point("B", 37.01, -6.0, 1)];
        let leg = TransitLeg::new(
            route("L1", TransportMode::Tram),
            "B",
            stops,
            Duration::minutes(2),
            vec![],
        )
        .unwrap();
        assert!(leg.intermediate_stops().is_empty());
    }

    #[test]
    fn transit_leg_needs_two_stops() {
        let result = TransitLeg::new(
            route("L1", TransportMode::Metro),
            "A",
            vec![stop_point("A", 37.0, -6.0, 0)],
            Duration::zero(),
            vec![],
        );
        assert!(matches!(result, Err(DomainError::InvalidLeg(_))));
    }

    #[test]
    fn walking_leg_defaults_to_straight_line() {
        let a = stop_point("A", 37.0, -6.0, 0);
        let b = stop_point("B", 37.001, -6.0, 1);
        let walk = WalkingLeg::new(a.clone(), b.clone(), 111.0, Duration::minutes(2));

        assert_eq!(walk.geometry(), &[a.coord(), b.coord()]);
        assert_eq!(walk.distance_m(), 111.0);
    }

    #[test]
    fn leg_mode_and_accessors() {
        let a = stop_point("A", 37.0, -6.0, 0);
        let b = stop_point("B", 37.001, -6.0, 1);
        let leg = Leg::Walking(WalkingLeg::new(a, b, 111.0, Duration::minutes(2)));

        assert!(leg.is_walking());
        assert!(!leg.is_transit());
        assert!(leg.as_transit().is_none());
        assert_eq!(leg.mode(), TransportMode::Walking);
        assert_eq!(leg.origin().id().as_str(), "A");
        assert_eq!(leg.destination().id().as_str(), "B");
        assert_eq!(leg.duration(), Duration::minutes(2));
    }

    #[test]
    fn normalize_geometry_densifies() {
        let a = stop_point("A", 37.0, -6.0, 0);
        let b = stop_point("B", 37.01, -6.0, 1);
        let mut leg = Leg::Walking(WalkingLeg::new(a, b, 1112.0, Duration::minutes(15)));

        leg.normalize_geometry(MaxGap::Meters(100.0));
        assert_eq!(leg.geometry().len(), 13);

        let before = leg.geometry().to_vec();
        leg.normalize_geometry(MaxGap::Disabled);
        assert_eq!(leg.geometry(), before.as_slice());
    }
}
