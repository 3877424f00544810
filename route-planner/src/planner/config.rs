//! Planner configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryError, MaxGap};
use crate::topology::{CoLocated, CostModel, DistinctStops, SamePlace, SharedParentStation};

/// Which search algorithm answers `find`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Single-criterion shortest path over `(node, boardings)` labels.
    #[default]
    Dijkstra,
    /// Round-based search returning the arrival/transfers Pareto frontier.
    ParetoRounds,
}

/// Which stops count as one physical place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PlaceRule {
    DistinctStops,
    #[default]
    SharedParentStation,
    CoLocated { radius_m: f64 },
}

impl PlaceRule {
    pub fn predicate(&self) -> Arc<dyn SamePlace> {
        match *self {
            PlaceRule::DistinctStops => Arc::new(DistinctStops),
            PlaceRule::SharedParentStation => Arc::new(SharedParentStation),
            PlaceRule::CoLocated { radius_m } => Arc::new(CoLocated { radius_m }),
        }
    }
}

fn default_max_visits() -> usize {
    1_000_000
}

fn default_max_transfers() -> u32 {
    3
}

fn default_max_transfers_limit() -> u32 {
    5
}

fn default_max_gap_m() -> u32 {
    50
}

/// Configuration parameters for journey planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Speeds and penalties used to weight the graph.
    #[serde(default)]
    pub cost_model: CostModel,

    /// Node settlements after which a search gives up.
    #[serde(default = "default_max_visits")]
    pub max_visits: usize,

    /// Transfers allowed when a request doesn't say.
    #[serde(default = "default_max_transfers")]
    pub default_max_transfers: u32,

    /// Largest `max_transfers` a request may ask for.
    #[serde(default = "default_max_transfers_limit")]
    pub max_transfers_limit: u32,

    /// Polyline gap bound (meters) when a request doesn't say; 0 disables.
    #[serde(default = "default_max_gap_m")]
    pub default_max_gap_m: u32,

    #[serde(default)]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub place_rule: PlaceRule,
}

impl PlannerConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The default polyline gap bound.
    pub fn default_max_gap(&self) -> Result<MaxGap, GeometryError> {
        MaxGap::from_meters_or_disabled(self.default_max_gap_m)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cost_model: CostModel::default(),
            max_visits: default_max_visits(),
            default_max_transfers: default_max_transfers(),
            max_transfers_limit: default_max_transfers_limit(),
            default_max_gap_m: default_max_gap_m(),
            strategy: StrategyKind::default(),
            place_rule: PlaceRule::default(),
        }
    }
}
