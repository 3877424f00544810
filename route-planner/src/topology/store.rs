//! Process-wide topology snapshot.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use super::{CostModel, SamePlace, Topology, TopologyError, TopologySource, TopologySummary};

/// Thread-safe holder of the current topology.
///
/// Searches take a cheap `Arc` clone of the snapshot and never hold the
/// lock while they run, so a refresh never waits on a search and a search
/// never sees a half-built network.
#[derive(Clone)]
pub struct TopologyStore {
    inner: Arc<RwLock<Arc<Topology>>>,
    source: Arc<dyn TopologySource>,
    same_place: Arc<dyn SamePlace>,
    cost_model: CostModel,
}

impl TopologyStore {
    /// Load the first snapshot from `source`.
    ///
    /// This will fail if the source is unreadable or malformed.
    pub async fn open(
        source: Arc<dyn TopologySource>,
        same_place: Arc<dyn SamePlace>,
        cost_model: CostModel,
    ) -> Result<Self, TopologyError> {
        let topology = build(&source, &same_place, &cost_model).await?;
        Ok(Self {
            inner: Arc::new(RwLock::new(Arc::new(topology))),
            source,
            same_place,
            cost_model,
        })
    }

    /// Wrap an already-built topology. Refreshes still read `source`.
    pub fn with_topology(
        topology: Topology,
        source: Arc<dyn TopologySource>,
        same_place: Arc<dyn SamePlace>,
        cost_model: CostModel,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(topology))),
            source,
            same_place,
            cost_model,
        }
    }

    /// The current snapshot.
    pub async fn current(&self) -> Arc<Topology> {
        let guard = self.inner.read().await;
        Arc::clone(&guard)
    }

    /// Rebuild the snapshot from the source.
    ///
    /// On success, replaces the current snapshot; searches already running
    /// finish on the old one. On failure, the existing snapshot is preserved
    /// and the error is returned.
    pub async fn refresh(&self) -> Result<TopologySummary, TopologyError> {
        let topology = build(&self.source, &self.same_place, &self.cost_model).await?;
        let summary = topology.summary();

        let mut guard = self.inner.write().await;
        *guard = Arc::new(topology);

        Ok(summary)
    }
}

async fn build(
    source: &Arc<dyn TopologySource>,
    same_place: &Arc<dyn SamePlace>,
    cost_model: &CostModel,
) -> Result<Topology, TopologyError> {
    let (source, same_place, cost_model) =
        (Arc::clone(source), Arc::clone(same_place), cost_model.clone());

    info!(source = %source.describe(), "Loading topology");
    tokio::task::spawn_blocking(move || {
        Topology::from_source(source.as_ref(), same_place.as_ref(), &cost_model)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::source::{JsonFileSource, StaticSource, TopologyDocument};
    use crate::topology::{DistinctStops, SharedParentStation};

    const ONE_LINE: &str = r#"{
        "stops": [
            {"id": "A", "name": "A", "lat": 37.0, "lon": -6.0},
            {"id": "B", "name": "B", "lat": 37.01, "lon": -6.0}
        ],
        "routes": [{"id": "R", "name": "R", "mode": "metro"}],
        "sequences": [{"route": "R", "stops": ["A", "B"]}]
    }"#;

    const TWO_LINES: &str = r#"{
        "stops": [
            {"id": "A", "name": "A", "lat": 37.0, "lon": -6.0},
            {"id": "B", "name": "B", "lat": 37.01, "lon": -6.0},
            {"id": "C", "name": "C", "lat": 37.02, "lon": -6.0}
        ],
        "routes": [
            {"id": "R", "name": "R", "mode": "metro"},
            {"id": "S", "name": "S", "mode": "tram"}
        ],
        "sequences": [
            {"route": "R", "stops": ["A", "B"]},
            {"route": "S", "stops": ["B", "C"]}
        ]
    }"#;

    fn write(file: &tempfile::NamedTempFile, json: &str) {
        std::fs::write(file.path(), json).unwrap();
    }

    #[tokio::test]
    async fn open_and_current() {
        let source = StaticSource::new(TopologyDocument::from_json(ONE_LINE).unwrap());
        let store = TopologyStore::open(
            Arc::new(source),
            Arc::new(SharedParentStation),
            CostModel::default(),
        )
        .await
        .unwrap();

        let topology = store.current().await;
        assert_eq!(topology.summary().stops, 2);
    }

    #[tokio::test]
    async fn open_fails_on_bad_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("missing.json"));

        let result = TopologyStore::open(
            Arc::new(source),
            Arc::new(DistinctStops),
            CostModel::default(),
        )
        .await;
        assert!(matches!(result, Err(TopologyError::Source(_))));
    }

    #[tokio::test]
    async fn refresh_swaps_snapshot() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write(&file, ONE_LINE);

        let store = TopologyStore::open(
            Arc::new(JsonFileSource::new(file.path())),
            Arc::new(SharedParentStation),
            CostModel::default(),
        )
        .await
        .unwrap();

        let before = store.current().await;
        write(&file, TWO_LINES);
        let summary = store.refresh().await.unwrap();

        assert_eq!(summary.routes, 2);
        assert_eq!(store.current().await.summary().routes, 2);
        // Holders of the old snapshot are unaffected
        assert_eq!(before.summary().routes, 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_snapshot() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write(&file, ONE_LINE);

        let store = TopologyStore::open(
            Arc::new(JsonFileSource::new(file.path())),
            Arc::new(SharedParentStation),
            CostModel::default(),
        )
        .await
        .unwrap();

        write(&file, r#"{"stops": "broken"}"#);
        assert!(store.refresh().await.is_err());
        assert_eq!(store.current().await.summary().stops, 2);
    }
}
