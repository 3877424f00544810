//! Transit network topology.
//!
//! Loads stops, routes, stop sequences and walking correspondences into an
//! immutable directed multigraph whose nodes are `(stop, context)` pairs,
//! and keeps the current snapshot in a refreshable [`TopologyStore`].

mod cost;
mod error;
mod graph;
mod loader;
mod place;
mod source;
mod store;

pub use cost::CostModel;
pub use error::{SourceError, TopologyError};
pub use graph::{
    Context, Edge, EdgeKind, Hop, HopIdx, Node, NodeIdx, RouteIdx, StopIdx, Walkway, WalkwayIdx,
};
pub use loader::{Topology, TopologySummary};
pub use place::{CoLocated, DistinctStops, SamePlace, SharedParentStation};
pub use source::{
    CorrespondenceRecord, JsonFileSource, NetworkData, RouteRecord, SequenceRecord, StaticSource,
    StopRecord, TopologyDocument, TopologySource,
};
pub use store::TopologyStore;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// The bundled Seville network.
    pub const SEVILLA_JSON: &str = include_str!("../../data/sevilla.json");

    pub fn sevilla_document() -> TopologyDocument {
        TopologyDocument::from_json(SEVILLA_JSON).unwrap()
    }

    pub fn sevilla() -> Topology {
        let doc = sevilla_document();
        Topology::load(
            doc.network,
            &doc.correspondences,
            &SharedParentStation,
            &CostModel::default(),
        )
        .unwrap()
    }
}
