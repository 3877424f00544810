//! Topology error types.

use std::path::PathBuf;

use crate::domain::{InvalidColor, InvalidId, InvalidMode, RouteId};
use crate::geometry::GeometryError;

/// Errors from reading raw topology data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backing file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid topology JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from building a topology snapshot.
///
/// Loading is all-or-nothing: any of these aborts the whole load.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// A referenced stop or route does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Two records share an id
    #[error("duplicate {kind} id: {id}")]
    Duplicate { kind: &'static str, id: String },

    /// A route has no stop sequence
    #[error("route {0} has no stop sequence")]
    RouteWithoutSequence(RouteId),

    /// A stop sequence is too short to ride
    #[error("sequence of route {route} has {len} stop(s), need at least 2")]
    ShortSequence { route: RouteId, len: usize },

    /// A correspondence distance is negative or not finite
    #[error("invalid walking distance {distance_m} m between {from} and {to}")]
    InvalidDistance {
        from: String,
        to: String,
        distance_m: f64,
    },

    /// A speed is zero, negative or not finite
    #[error("invalid speed for {what}: {kmh} km/h")]
    InvalidSpeed { what: String, kmh: f64 },

    #[error(transparent)]
    InvalidId(#[from] InvalidId),

    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    #[error(transparent)]
    InvalidColor(#[from] InvalidColor),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Reading the raw data failed
    #[error("topology source: {0}")]
    Source(#[from] SourceError),

    /// The background load task panicked or was cancelled
    #[error("topology load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl TopologyError {
    pub(crate) fn stop_not_found(id: impl Into<String>) -> Self {
        TopologyError::NotFound {
            kind: "stop",
            id: id.into(),
        }
    }

    pub(crate) fn route_not_found(id: impl Into<String>) -> Self {
        TopologyError::NotFound {
            kind: "route",
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TopologyError::stop_not_found("RENFE_99999");
        assert_eq!(err.to_string(), "stop not found: RENFE_99999");

        let err = TopologyError::ShortSequence {
            route: RouteId::parse("METRO_SEV_L1").unwrap(),
            len: 1,
        };
        assert_eq!(
            err.to_string(),
            "sequence of route METRO_SEV_L1 has 1 stop(s), need at least 2"
        );

        let err = TopologyError::Duplicate {
            kind: "route",
            id: "TRAM_SEV_T1".into(),
        };
        assert_eq!(err.to_string(), "duplicate route id: TRAM_SEV_T1");
    }

    #[test]
    fn source_error_wraps() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = TopologyError::from(SourceError::from(json_err));
        assert!(err.to_string().starts_with("topology source: JSON parse error"));
    }
}
