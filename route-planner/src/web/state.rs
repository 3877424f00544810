//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::PlannerConfig;
use crate::topology::TopologyStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Current topology snapshot, refreshed in the background
    pub store: TopologyStore,

    /// Journey planner configuration
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: TopologyStore, config: PlannerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
