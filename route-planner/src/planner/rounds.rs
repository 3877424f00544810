//! Round-based multi-criteria search.
//!
//! Round `k` finds the cheapest way to every node using exactly `k`
//! boardings, seeded by the `Board` edges taken at the end of round `k - 1`.
//! A label survives only if it beats every label found with fewer
//! boardings, so each round that improves on the destination adds one
//! point to the arrival-cost/transfers Pareto frontier.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::topology::{EdgeKind, StopIdx, Topology};

use super::search::{
    EdgePath, Label, SearchError, SearchOutcome, SearchStrategy, boarding_step, trace_path,
};

/// Pareto search over arrival cost and transfer count.
///
/// Returns every non-dominated path, fewest boardings first, with strictly
/// decreasing cost. The last path is as cheap as [`Dijkstra`]'s.
///
/// [`Dijkstra`]: super::Dijkstra
#[derive(Debug, Clone)]
pub struct ParetoRounds {
    pub max_visits: usize,
}

impl SearchStrategy for ParetoRounds {
    fn search(
        &self,
        topology: &Topology,
        origin: StopIdx,
        destination: StopIdx,
        max_transfers: u32,
    ) -> Result<SearchOutcome, SearchError> {
        let max_boardings = max_transfers + 1;
        let target = topology.place_of(destination);

        // Cheapest cost per node over all rounds so far
        let mut best = vec![u32::MAX; topology.node_count()];
        let mut best_destination = u32::MAX;
        let mut labels = vec![Label {
            node: topology.unboarded_node(origin),
            cost: 0,
            boardings: 0,
            parent: None,
        }];
        let mut seeds = vec![0usize];
        let mut frontier: Vec<EdgePath> = Vec::new();
        let mut visited = 0;

        for round in 0..=max_boardings {
            if seeds.is_empty() {
                break;
            }

            let mut heap: BinaryHeap<_> = seeds
                .drain(..)
                .map(|idx| Reverse((labels[idx].cost, idx)))
                .collect();
            let mut arrival: Option<usize> = None;

            while let Some(Reverse((cost, idx))) = heap.pop() {
                let label = labels[idx];
                let node = label.node.index();
                if cost >= best[node] || cost >= best_destination {
                    continue;
                }
                best[node] = cost;

                visited += 1;
                if visited > self.max_visits {
                    return Err(SearchError::VisitLimitReached(self.max_visits));
                }

                if topology.place_of(topology.node(label.node).stop) == target {
                    // Cheapest arrival this round; later labels can't beat it
                    best_destination = cost;
                    arrival = Some(idx);
                    continue;
                }

                for edge in topology.neighbors(label.node) {
                    let next = cost + edge.cost;
                    if next >= best[edge.target.index()] || next >= best_destination {
                        continue;
                    }
                    labels.push(Label {
                        node: edge.target,
                        cost: next,
                        boardings: label.boardings + boarding_step(edge),
                        parent: Some((idx, *edge)),
                    });
                    let pushed = labels.len() - 1;

                    match edge.kind {
                        EdgeKind::Board { .. } => {
                            if round < max_boardings {
                                seeds.push(pushed);
                            }
                        }
                        EdgeKind::Ride { .. }
                        | EdgeKind::TransferSameStop { .. }
                        | EdgeKind::TransferWalking { .. } => {
                            heap.push(Reverse((next, pushed)));
                        }
                    }
                }
            }

            // Seeds found before the arrival may now be too expensive
            seeds.retain(|idx| labels[*idx].cost < best_destination);

            if let Some(idx) = arrival {
                debug!(round, cost = labels[idx].cost, "Pareto round improved arrival");
                frontier.push(trace_path(&labels, idx, origin));
            }
        }

        debug!(visited, paths = frontier.len(), "Pareto search complete");
        Ok(SearchOutcome {
            paths: frontier,
            visited,
        })
    }

    fn name(&self) -> &'static str {
        "pareto_rounds"
    }
}
