//! Journey types.
//!
//! A `Journey` represents a complete trip from origin to destination,
//! made of transit rides and walks between stops.

use chrono::Duration;

use super::{DomainError, Leg, StopPoint, TransitLeg, WalkingLeg};
use crate::geometry::MaxGap;

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs meet at the same physical place
///   (destination of one = origin of next)
/// - Requested endpoints, when set, share a place with the first leg's
///   origin and the last leg's destination
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    legs: Vec<Leg>,
    /// Stops the traveller asked for, if they differ from where the legs
    /// start and end.
    endpoints: Option<(StopPoint, StopPoint)>,
}

impl Journey {
    /// Constructs a journey from legs in travel order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - The list is empty
    /// - Two consecutive legs don't meet at the same place
    pub fn new(legs: Vec<Leg>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyJourney);
        }

        for window in legs.windows(2) {
            let prev_dest = window[0].destination();
            let next_origin = window[1].origin();
            if prev_dest.place != next_origin.place {
                return Err(DomainError::LegsNotContiguous(
                    prev_dest.id().clone(),
                    next_origin.id().clone(),
                ));
            }
        }

        Ok(Journey {
            legs,
            endpoints: None,
        })
    }

    /// Report `origin` and `destination` as the journey's endpoints.
    ///
    /// A search may leave from or arrive at another stop of the requested
    /// place, e.g. the metro platform of a station the tram also serves.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either stop is at a different place than the legs'
    /// ends.
    pub fn with_endpoints(
        mut self,
        origin: StopPoint,
        destination: StopPoint,
    ) -> Result<Self, DomainError> {
        let first = self.legs[0].origin();
        if first.place != origin.place {
            return Err(DomainError::EndpointMismatch(
                origin.id().clone(),
                first.id().clone(),
            ));
        }
        let last = self.legs[self.legs.len() - 1].destination();
        if last.place != destination.place {
            return Err(DomainError::EndpointMismatch(
                destination.id().clone(),
                last.id().clone(),
            ));
        }
        self.endpoints = Some((origin, destination));
        Ok(self)
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the number of legs, walks included.
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Returns all transit legs in order.
    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.legs.iter().filter_map(|l| l.as_transit())
    }

    /// Returns all walking legs in order.
    pub fn walking_legs(&self) -> impl Iterator<Item = &WalkingLeg> {
        self.legs.iter().filter_map(|l| l.as_walking())
    }

    /// Returns the number of transfers (transit legs - 1, or 0 with none).
    pub fn transfer_count(&self) -> usize {
        self.transit_legs().count().saturating_sub(1)
    }

    /// Returns the origin stop: the requested one if set, else where the
    /// first leg starts.
    pub fn origin(&self) -> &StopPoint {
        match &self.endpoints {
            Some((origin, _)) => origin,
            // Safe: validated non-empty at construction
            None => self.legs[0].origin(),
        }
    }

    /// Returns the destination stop: the requested one if set, else where
    /// the last leg ends.
    pub fn destination(&self) -> &StopPoint {
        match &self.endpoints {
            Some((_, destination)) => destination,
            None => self.legs[self.legs.len() - 1].destination(),
        }
    }

    /// Returns the total journey duration.
    pub fn total_duration(&self) -> Duration {
        self.legs.iter().map(Leg::duration).sum()
    }

    /// Returns the total walking time.
    pub fn total_walking_duration(&self) -> Duration {
        self.walking_legs().map(WalkingLeg::duration).sum()
    }

    /// Returns the total time spent waiting for and riding vehicles.
    pub fn total_transit_duration(&self) -> Duration {
        self.transit_legs().map(TransitLeg::duration).sum()
    }

    /// Returns true if this is a single ride with no transfer.
    pub fn is_direct(&self) -> bool {
        self.legs.len() == 1 && self.legs[0].is_transit()
    }

    /// Densify every leg's polyline.
    pub fn with_normalized_geometry(mut self, max_gap: MaxGap) -> Self {
        for leg in &mut self.legs {
            leg.normalize_geometry(max_gap);
        }
        self
    }
}
