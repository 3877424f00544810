//! Shortest-path journey search.
//!
//! Finds the fastest itinerary between two stops with a bounded number of
//! transfers, by label-setting search over the topology graph.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::domain::{DomainError, Journey, StopId};
use crate::geometry::MaxGap;
use crate::topology::{Edge, EdgeKind, NodeIdx, StopIdx, Topology};

use super::assemble::assemble;
use super::config::{PlannerConfig, StrategyKind};
use super::rank::{deduplicate, rank_journeys, remove_dominated};
use super::rounds::ParetoRounds;

/// Error from journey search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// The origin id is not a known stop
    #[error("origin stop not found: {0}")]
    OriginNotFound(String),

    /// The destination id is not a known stop
    #[error("destination stop not found: {0}")]
    DestinationNotFound(String),

    /// No itinerary within the transfer limit
    #[error("no route found within the transfer limit")]
    NoRouteFound,

    /// Origin and destination are the same physical place
    #[error("origin and destination are the same place")]
    SameOriginAndDestination,

    /// The search settled too many nodes
    #[error("search gave up after visiting {0} nodes")]
    VisitLimitReached(usize),

    /// A found path did not fold into a valid journey
    #[error("could not assemble journey: {0}")]
    Assembly(#[from] DomainError),
}

/// A path through the graph, as found by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    /// Stop whose place the path starts from.
    pub origin: StopIdx,
    /// Edges in travel order.
    pub edges: Vec<Edge>,
    /// Sum of edge costs, in seconds.
    pub cost: u32,
    /// Number of `Board` edges.
    pub boardings: u32,
}

impl EdgePath {
    /// Transfers made: boardings after the first.
    pub fn transfers(&self) -> u32 {
        self.boardings.saturating_sub(1)
    }
}

/// What a strategy found, plus how hard it looked.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Non-dominated paths, fewest boardings first. Empty if unreachable.
    pub paths: Vec<EdgePath>,
    /// Node labels settled.
    pub visited: usize,
}

impl SearchOutcome {
    /// The cheapest path; fewer boardings break ties.
    pub fn fastest(&self) -> Option<&EdgePath> {
        self.paths.iter().min_by_key(|p| (p.cost, p.boardings))
    }
}

/// An algorithm that finds paths between two stops.
///
/// Implementations must treat the topology as read-only and keep all
/// per-search state local, so one topology can serve concurrent searches.
pub trait SearchStrategy: Send + Sync {
    /// Search from `origin`'s place to `destination`'s place using at most
    /// `max_transfers + 1` boardings.
    fn search(
        &self,
        topology: &Topology,
        origin: StopIdx,
        destination: StopIdx,
        max_transfers: u32,
    ) -> Result<SearchOutcome, SearchError>;

    fn name(&self) -> &'static str;
}

/// One search label: a node reached with a number of boardings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Label {
    pub node: NodeIdx,
    pub cost: u32,
    pub boardings: u32,
    /// Previous label and the edge taken from it.
    pub parent: Option<(usize, Edge)>,
}

/// Walk parent links back from `last` to build the path.
pub(crate) fn trace_path(labels: &[Label], last: usize, origin: StopIdx) -> EdgePath {
    let mut edges = Vec::new();
    let mut at = last;
    while let Some((prev, edge)) = labels[at].parent {
        edges.push(edge);
        at = prev;
    }
    edges.reverse();

    EdgePath {
        origin,
        edges,
        cost: labels[last].cost,
        boardings: labels[last].boardings,
    }
}

/// Boardings added by taking `edge`.
pub(crate) fn boarding_step(edge: &Edge) -> u32 {
    match edge.kind {
        EdgeKind::Board { .. } => 1,
        EdgeKind::Ride { .. }
        | EdgeKind::TransferSameStop { .. }
        | EdgeKind::TransferWalking { .. } => 0,
    }
}

/// Dijkstra over `(node, boardings)` labels.
///
/// A label is dropped when a label at the same node with no more boardings
/// has already been settled, so the first settled destination label is the
/// cheapest path within the boarding limit. Among equal costs the label
/// discovered first wins.
#[derive(Debug, Clone)]
pub struct Dijkstra {
    pub max_visits: usize,
}

impl SearchStrategy for Dijkstra {
    fn search(
        &self,
        topology: &Topology,
        origin: StopIdx,
        destination: StopIdx,
        max_transfers: u32,
    ) -> Result<SearchOutcome, SearchError> {
        let max_boardings = max_transfers + 1;
        let target = topology.place_of(destination);

        // Fewest boardings among settled labels, per node
        let mut settled = vec![u32::MAX; topology.node_count()];
        let mut labels = vec![Label {
            node: topology.unboarded_node(origin),
            cost: 0,
            boardings: 0,
            parent: None,
        }];
        let mut heap = BinaryHeap::from([Reverse((0u32, 0usize))]);
        let mut visited = 0;

        while let Some(Reverse((cost, idx))) = heap.pop() {
            let label = labels[idx];
            let node = label.node.index();
            if settled[node] <= label.boardings {
                continue;
            }
            settled[node] = label.boardings;

            visited += 1;
            if visited > self.max_visits {
                return Err(SearchError::VisitLimitReached(self.max_visits));
            }

            if topology.place_of(topology.node(label.node).stop) == target {
                debug!(
                    visited,
                    cost,
                    boardings = label.boardings,
                    "Dijkstra reached destination"
                );
                return Ok(SearchOutcome {
                    paths: vec![trace_path(&labels, idx, origin)],
                    visited,
                });
            }

            for edge in topology.neighbors(label.node) {
                let boardings = label.boardings + boarding_step(edge);
                if boardings > max_boardings || settled[edge.target.index()] <= boardings {
                    continue;
                }
                let next = cost + edge.cost;
                labels.push(Label {
                    node: edge.target,
                    cost: next,
                    boardings,
                    parent: Some((idx, *edge)),
                });
                heap.push(Reverse((next, labels.len() - 1)));
            }
        }

        debug!(visited, "Dijkstra exhausted the graph");
        Ok(SearchOutcome {
            paths: Vec::new(),
            visited,
        })
    }

    fn name(&self) -> &'static str {
        "dijkstra"
    }
}

/// Request for journey planning.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub origin: StopId,
    pub destination: StopId,
    pub max_transfers: u32,
    pub max_gap: MaxGap,
    /// Also return Pareto-optimal alternatives.
    pub alternatives: bool,
}

impl SearchRequest {
    /// Create a request for the fastest journey only.
    pub fn new(origin: StopId, destination: StopId, max_transfers: u32, max_gap: MaxGap) -> Self {
        Self {
            origin,
            destination,
            max_transfers,
            max_gap,
            alternatives: false,
        }
    }

    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }
}

/// Result of journey planning.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The fastest journey.
    pub journey: Journey,

    /// Other non-dominated journeys, ranked best-first. Empty unless
    /// requested.
    pub alternatives: Vec<Journey>,

    /// Node labels settled during search.
    pub visited: usize,
}

/// Journey planner over one topology snapshot.
pub struct Planner<'a> {
    topology: &'a Topology,
    strategy: Box<dyn SearchStrategy>,
    max_visits: usize,
}

impl<'a> Planner<'a> {
    /// Create a planner with an explicit strategy.
    pub fn new(
        topology: &'a Topology,
        strategy: Box<dyn SearchStrategy>,
        max_visits: usize,
    ) -> Self {
        Self {
            topology,
            strategy,
            max_visits,
        }
    }

    /// Create a planner with the configured strategy.
    pub fn with_config(topology: &'a Topology, config: &PlannerConfig) -> Self {
        let max_visits = config.max_visits;
        let strategy: Box<dyn SearchStrategy> = match config.strategy {
            StrategyKind::Dijkstra => Box::new(Dijkstra { max_visits }),
            StrategyKind::ParetoRounds => Box::new(ParetoRounds { max_visits }),
        };
        Self::new(topology, strategy, max_visits)
    }

    /// Find the fastest journey using at most `max_transfers` transfers.
    ///
    /// Leg geometry is left as recorded; see [`Planner::plan`] for
    /// densified output.
    pub fn find(
        &self,
        origin: &StopId,
        destination: &StopId,
        max_transfers: u32,
    ) -> Result<Journey, SearchError> {
        let (from, to) = self.resolve(origin, destination)?;
        let outcome = self.strategy.search(self.topology, from, to, max_transfers)?;
        let path = outcome.fastest().ok_or(SearchError::NoRouteFound)?;
        self.journey(path, from, to)
    }

    /// Run the full pipeline: search, assemble legs, densify geometry.
    ///
    /// With `alternatives` requested, the Pareto frontier is searched
    /// whatever the configured strategy.
    pub fn plan(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let (from, to) = self.resolve(&request.origin, &request.destination)?;

        let outcome = if request.alternatives {
            ParetoRounds {
                max_visits: self.max_visits,
            }
            .search(self.topology, from, to, request.max_transfers)?
        } else {
            self.strategy
                .search(self.topology, from, to, request.max_transfers)?
        };
        let fastest = outcome.fastest().ok_or(SearchError::NoRouteFound)?;

        let journey = self
            .journey(fastest, from, to)?
            .with_normalized_geometry(request.max_gap);

        let mut alternatives = Vec::new();
        if request.alternatives {
            for path in outcome.paths.iter().filter(|p| *p != fastest) {
                alternatives.push(
                    self.journey(path, from, to)?
                        .with_normalized_geometry(request.max_gap),
                );
            }
            alternatives = rank_journeys(deduplicate(remove_dominated(alternatives)));
        }

        debug!(
            strategy = self.strategy.name(),
            origin = %request.origin,
            destination = %request.destination,
            visited = outcome.visited,
            alternatives = alternatives.len(),
            "Planned journey"
        );

        Ok(SearchResult {
            journey,
            alternatives,
            visited: outcome.visited,
        })
    }

    /// Assemble `path` and report the requested stops as its endpoints.
    fn journey(&self, path: &EdgePath, from: StopIdx, to: StopIdx) -> Result<Journey, SearchError> {
        let journey = assemble(self.topology, path)?.with_endpoints(
            self.topology.stop_point(from),
            self.topology.stop_point(to),
        )?;
        Ok(journey)
    }

    fn resolve(
        &self,
        origin: &StopId,
        destination: &StopId,
    ) -> Result<(StopIdx, StopIdx), SearchError> {
        let from = self
            .topology
            .stop_idx(origin)
            .ok_or_else(|| SearchError::OriginNotFound(origin.to_string()))?;
        let to = self
            .topology
            .stop_idx(destination)
            .ok_or_else(|| SearchError::DestinationNotFound(destination.to_string()))?;

        if self.topology.place_of(from) == self.topology.place_of(to) {
            return Err(SearchError::SameOriginAndDestination);
        }
        Ok((from, to))
    }
}
