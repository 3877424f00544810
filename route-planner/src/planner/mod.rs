//! Journey planner.
//!
//! Searches the topology graph for the fastest itinerary between two stops
//! within a transfer limit, folds the path into legs and densifies leg
//! geometry. The search algorithm sits behind [`SearchStrategy`]; plain
//! Dijkstra is the default and a round-based Pareto search can also
//! return the arrival/transfers trade-offs.

mod assemble;
mod config;
mod rank;
mod rounds;
mod search;


pub use assemble::assemble;
pub use config::{PlaceRule, PlannerConfig, StrategyKind};
pub use rank::{deduplicate, rank_journeys, remove_dominated};
pub use rounds::ParetoRounds;
pub use search::{
    Dijkstra, EdgePath, Planner, SearchError, SearchOutcome, SearchRequest, SearchResult,
    SearchStrategy,
};
