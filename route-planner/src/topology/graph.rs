//! Graph primitives.
//!
//! Nodes are `(stop, context)` pairs. Edges carry a closed [`EdgeKind`]
//! plus a precomputed cost, so search never consults the cost model.

use crate::geometry::Coord;

/// Index of a stop in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopIdx(pub u32);

/// Index of a route in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteIdx(pub u32);

/// Index of a ride hop in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HopIdx(pub u32);

/// Index of a walking correspondence in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalkwayIdx(pub u32);

/// Index of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What the traveller is doing at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Standing at the place, not on any vehicle.
    Unboarded,
    /// Aboard a vehicle of this route.
    OnRoute(RouteIdx),
}

/// A graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    pub stop: StopIdx,
    pub context: Context,
}

/// The kind of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Ride one hop on a route.
    Ride {
        route: RouteIdx,
        from: StopIdx,
        to: StopIdx,
        hop: HopIdx,
    },
    /// Wait for and board a route at a stop.
    Board { route: RouteIdx, stop: StopIdx },
    /// Alight and change vehicle without leaving the place.
    TransferSameStop { stop: StopIdx },
    /// Alight and walk to another place.
    TransferWalking {
        walkway: WalkwayIdx,
        from: StopIdx,
        to: StopIdx,
    },
}

/// A directed graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: NodeIdx,
    /// Cost in seconds.
    pub cost: u32,
    pub kind: EdgeKind,
}

/// One stop-to-next-stop hop of a route, in travel direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub route: RouteIdx,
    pub from: StopIdx,
    pub to: StopIdx,
    pub distance_m: f64,
    pub seconds: u32,
    /// Polyline from `from` to `to`, endpoints included.
    pub geometry: Vec<Coord>,
    /// Terminus the vehicle is heading to.
    pub headsign: String,
}

/// A walking correspondence between two stops of different places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walkway {
    pub a: StopIdx,
    pub b: StopIdx,
    pub distance_m: f64,
    /// Walking time without the transfer penalty.
    pub walk_secs: u32,
}
