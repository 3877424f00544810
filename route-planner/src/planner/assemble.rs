//! Folding graph paths into journeys.
//!
//! Consecutive rides on one route become a single transit leg and
//! consecutive walks become a single walking leg. Same-stop transfers
//! produce no leg; their penalty is charged to the next transit leg.

use chrono::Duration;

use crate::domain::{DomainError, Journey, Leg, TransitLeg, WalkingLeg};
use crate::geometry::Coord;
use crate::topology::{EdgeKind, RouteIdx, StopIdx, Topology};

use super::search::EdgePath;

/// A leg still being folded.
enum Draft {
    Transit {
        route: RouteIdx,
        headsign: Option<String>,
        stops: Vec<StopIdx>,
        geometry: Vec<Coord>,
        secs: u32,
    },
    Walk {
        stops: Vec<StopIdx>,
        distance_m: f64,
        secs: u32,
    },
}

impl Draft {
    fn add_secs(&mut self, extra: u32) {
        match self {
            Draft::Transit { secs, .. } | Draft::Walk { secs, .. } => *secs += extra,
        }
    }
}

/// Build a journey from a path.
///
/// The journey's total duration equals the path cost: every edge's cost
/// lands in exactly one leg.
///
/// # Errors
///
/// Returns `Err` if the path is empty, rides without boarding, or yields
/// legs that don't connect.
pub fn assemble(topology: &Topology, path: &EdgePath) -> Result<Journey, DomainError> {
    let mut drafts: Vec<Draft> = Vec::new();
    // Same-stop transfer cost waiting for the next transit leg
    let mut pending = 0u32;

    for edge in &path.edges {
        match edge.kind {
            EdgeKind::Board { route, stop } => {
                drafts.push(Draft::Transit {
                    route,
                    headsign: None,
                    stops: vec![stop],
                    geometry: Vec::new(),
                    secs: edge.cost + pending,
                });
                pending = 0;
            }
            EdgeKind::Ride { route, hop, .. } => {
                let hop = topology.hop(hop);
                match drafts.last_mut() {
                    Some(Draft::Transit {
                        route: current,
                        headsign,
                        stops,
                        geometry,
                        secs,
                    }) if *current == route => {
                        headsign.get_or_insert_with(|| hop.headsign.clone());
                        stops.push(hop.to);
                        let skip = usize::from(!geometry.is_empty());
                        geometry.extend(hop.geometry.iter().skip(skip));
                        *secs += edge.cost;
                    }
                    _ => return Err(DomainError::InvalidLeg("ride without boarding")),
                }
            }
            EdgeKind::TransferSameStop { .. } => {
                pending += edge.cost;
            }
            EdgeKind::TransferWalking { walkway, from, to } => {
                let distance = topology.walkway(walkway).distance_m;
                match drafts.last_mut() {
                    Some(Draft::Walk {
                        stops,
                        distance_m,
                        secs,
                    }) if stops
                        .last()
                        .is_some_and(|&last| topology.place_of(last) == topology.place_of(from)) =>
                    {
                        // Walks may leave from a sibling of the stop they reached
                        if stops.last() != Some(&from) {
                            stops.push(from);
                        }
                        stops.push(to);
                        *distance_m += distance;
                        *secs += edge.cost;
                    }
                    _ => drafts.push(Draft::Walk {
                        stops: vec![from, to],
                        distance_m: distance,
                        secs: edge.cost,
                    }),
                }
            }
        }
    }

    if pending > 0 {
        if let Some(last) = drafts.last_mut() {
            last.add_secs(pending);
        }
    }

    let legs = drafts
        .into_iter()
        .map(|draft| build_leg(topology, draft))
        .collect::<Result<Vec<_>, _>>()?;
    Journey::new(legs)
}

fn build_leg(topology: &Topology, draft: Draft) -> Result<Leg, DomainError> {
    match draft {
        Draft::Transit {
            route,
            headsign,
            stops,
            geometry,
            secs,
        } => {
            let stop_points: Vec<_> = stops.iter().map(|s| topology.stop_point(*s)).collect();
            let leg = TransitLeg::new(
                topology.route_at(route).clone(),
                headsign.unwrap_or_default(),
                stop_points,
                Duration::seconds(i64::from(secs)),
                geometry,
            )?;
            Ok(Leg::Transit(leg))
        }
        Draft::Walk {
            stops,
            distance_m,
            secs,
        } => {
            let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
                return Err(DomainError::InvalidLeg("walk without stops"));
            };
            let geometry = stops.iter().map(|s| topology.stop_at(*s).coord).collect();
            let walk = WalkingLeg::new(
                topology.stop_point(*first),
                topology.stop_point(*last),
                distance_m,
                Duration::seconds(i64::from(secs)),
            )
            .with_geometry(geometry);
            Ok(Leg::Walking(walk))
        }
    }
}
