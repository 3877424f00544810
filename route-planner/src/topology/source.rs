//! Raw topology records and the readers that produce them.
//!
//! Records are unvalidated: ids, modes and coordinates are checked when a
//! [`Topology`](super::Topology) is built from them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::SourceError;

/// A stop as stored in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_station: Option<String>,
}

/// A route as stored in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: String,
    pub name: String,
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Overrides the mode's commercial speed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
}

fn default_bidirectional() -> bool {
    true
}

/// The ordered stops of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub route: String,
    pub stops: Vec<String>,
    /// Whether vehicles also run the sequence in reverse.
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
    /// Headsign for the forward direction; defaults to the last stop's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headsign: Option<String>,
    /// Track polyline as `[lon, lat]` pairs, in forward direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<[f64; 2]>>,
}

/// A walking correspondence as stored in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceRecord {
    pub from: String,
    pub to: String,
    pub distance_m: f64,
    /// Recorded walking time; derived from distance when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_seconds: Option<u32>,
}

/// Stops, routes and sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub stops: Vec<StopRecord>,
    pub routes: Vec<RouteRecord>,
    pub sequences: Vec<SequenceRecord>,
}

/// A whole topology document: network plus correspondences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(flatten)]
    pub network: NetworkData,
    #[serde(default)]
    pub correspondences: Vec<CorrespondenceRecord>,
}

impl TopologyDocument {
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Backing store the topology is read from.
///
/// Reads are blocking; async callers should run them on the blocking pool.
pub trait TopologySource: Send + Sync {
    /// Read stops, routes and stop sequences.
    fn read_network(&self) -> Result<NetworkData, SourceError>;

    /// Read walking correspondences.
    fn read_correspondences(&self) -> Result<Vec<CorrespondenceRecord>, SourceError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// A JSON [`TopologyDocument`] on disk. Re-read on every call, so a refresh
/// picks up edits.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<TopologyDocument, SourceError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        TopologyDocument::from_json(&text)
    }
}

impl TopologySource for JsonFileSource {
    fn read_network(&self) -> Result<NetworkData, SourceError> {
        Ok(self.read_document()?.network)
    }

    fn read_correspondences(&self) -> Result<Vec<CorrespondenceRecord>, SourceError> {
        Ok(self.read_document()?.correspondences)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// An in-memory document, for tests and embedded data.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    document: TopologyDocument,
}

impl StaticSource {
    pub fn new(document: TopologyDocument) -> Self {
        Self { document }
    }
}

impl TopologySource for StaticSource {
    fn read_network(&self) -> Result<NetworkData, SourceError> {
        Ok(self.document.network.clone())
    }

    fn read_correspondences(&self) -> Result<Vec<CorrespondenceRecord>, SourceError> {
        Ok(self.document.correspondences.clone())
    }

    fn describe(&self) -> String {
        format!("static document ({} stops)", self.document.network.stops.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL: &str = r#"{
        "stops": [
            {"id": "A", "name": "Alpha", "lat": 37.0, "lon": -6.0},
            {"id": "B", "name": "Beta", "lat": 37.01, "lon": -6.0, "parent_station": "P"}
        ],
        "routes": [{"id": "L", "name": "Line", "mode": "metro"}],
        "sequences": [{"route": "L", "stops": ["A", "B"]}],
        "correspondences": [{"from": "A", "to": "B", "distance_m": 50.0}]
    }"#;

    #[test]
    fn parse_document_defaults() {
        let doc = TopologyDocument::from_json(SMALL).unwrap();

        assert_eq!(doc.network.stops.len(), 2);
        assert_eq!(doc.network.stops[1].parent_station.as_deref(), Some("P"));
        assert!(doc.network.routes[0].color.is_none());

        let seq = &doc.network.sequences[0];
        assert!(seq.bidirectional);
        assert!(seq.headsign.is_none());
        assert!(seq.shape.is_none());

        assert_eq!(doc.correspondences[0].walk_seconds, None);
    }

    #[test]
    fn correspondences_optional() {
        let doc = TopologyDocument::from_json(r#"{"stops": [], "routes": [], "sequences": []}"#)
            .unwrap();
        assert!(doc.correspondences.is_empty());
    }

    #[test]
    fn malformed_json_is_error() {
        let err = TopologyDocument::from_json(r#"{"stops": 3}"#).unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }

    #[test]
    fn file_source_reads_both_parts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();

        let source = JsonFileSource::new(file.path());
        assert_eq!(source.read_network().unwrap().stops.len(), 2);
        assert_eq!(source.read_correspondences().unwrap().len(), 1);
        assert!(source.describe().starts_with("file "));
    }

    #[test]
    fn file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("absent.json"));

        let err = source.read_network().unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn static_source_clones_document() {
        let doc = TopologyDocument::from_json(SMALL).unwrap();
        let source = StaticSource::new(doc.clone());

        assert_eq!(source.read_network().unwrap(), doc.network);
        assert_eq!(source.read_correspondences().unwrap(), doc.correspondences);
    }
}
