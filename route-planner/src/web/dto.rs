//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Journey, Leg, Stop, StopPoint};
use crate::topology::TopologySummary;

/// Query string of `GET /route-planner`.
#[derive(Debug, Deserialize)]
pub struct RoutePlannerQuery {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// Transfers allowed (defaults from config)
    pub max_transfers: Option<u32>,

    /// Polyline gap bound in meters, 0 to disable (defaults from config)
    pub max_gap: Option<u32>,

    /// Also return Pareto-optimal alternatives
    #[serde(default)]
    pub alternatives: bool,
}

/// A stop as shown in responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name.clone(),
            lat: stop.coord.lat,
            lon: stop.coord.lon,
        }
    }

    pub fn from_point(point: &StopPoint) -> Self {
        Self::from_stop(&point.stop)
    }
}

/// Round a duration to whole minutes.
fn minutes(duration: chrono::Duration) -> i64 {
    (duration.num_seconds() as f64 / 60.0).round() as i64
}

/// One leg of a journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentResult {
    /// "transit" or "walking"
    #[serde(rename = "type")]
    pub kind: String,

    pub transport_mode: String,

    /// Route details, absent for walks
    pub line_id: Option<String>,
    pub line_name: Option<String>,
    pub line_color: Option<String>,
    pub headsign: Option<String>,

    pub origin: StopResult,
    pub destination: StopResult,
    pub intermediate_stops: Vec<StopResult>,

    pub duration_minutes: i64,

    /// Walking distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,

    /// Polyline as `[lon, lat]` pairs
    pub coordinates: Vec<[f64; 2]>,
}

impl SegmentResult {
    pub fn from_leg(leg: &Leg) -> Self {
        let coordinates = leg.geometry().iter().map(|c| c.to_lon_lat()).collect();
        let origin = StopResult::from_point(leg.origin());
        let destination = StopResult::from_point(leg.destination());
        let duration_minutes = minutes(leg.duration());

        match leg {
            Leg::Transit(transit) => {
                let route = transit.route();
                SegmentResult {
                    kind: "transit".to_string(),
                    transport_mode: route.mode.to_string(),
                    line_id: Some(route.id.to_string()),
                    line_name: Some(route.name.clone()),
                    line_color: Some(route.color.as_str().to_string()),
                    headsign: Some(transit.headsign().to_string()),
                    origin,
                    destination,
                    intermediate_stops: transit
                        .intermediate_stops()
                        .iter()
                        .map(StopResult::from_point)
                        .collect(),
                    duration_minutes,
                    distance_meters: None,
                    coordinates,
                }
            }
            Leg::Walking(walk) => SegmentResult {
                kind: "walking".to_string(),
                transport_mode: leg.mode().to_string(),
                line_id: None,
                line_name: None,
                line_color: None,
                headsign: None,
                origin,
                destination,
                intermediate_stops: Vec::new(),
                duration_minutes,
                distance_meters: Some(walk.distance_m()),
                coordinates,
            },
        }
    }
}

/// A journey option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyResult {
    pub origin: StopResult,
    pub destination: StopResult,
    pub total_duration_minutes: i64,
    pub total_walking_minutes: i64,
    pub total_transit_minutes: i64,
    pub transfer_count: usize,
    pub segments: Vec<SegmentResult>,
}

impl JourneyResult {
    pub fn from_journey(journey: &Journey) -> Self {
        Self {
            origin: StopResult::from_point(journey.origin()),
            destination: StopResult::from_point(journey.destination()),
            total_duration_minutes: minutes(journey.total_duration()),
            total_walking_minutes: minutes(journey.total_walking_duration()),
            total_transit_minutes: minutes(journey.total_transit_duration()),
            transfer_count: journey.transfer_count(),
            segments: journey.legs().iter().map(SegmentResult::from_leg).collect(),
        }
    }
}

/// Response of `GET /route-planner`, on success and on failure alike.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoutePlannerResponse {
    pub success: bool,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey: Option<JourneyResult>,
    /// Present, possibly empty, whenever `success` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<JourneyResult>>,
}

impl RoutePlannerResponse {
    pub fn found(journey: &Journey, alternatives: &[Journey]) -> Self {
        Self {
            success: true,
            message: None,
            journey: Some(JourneyResult::from_journey(journey)),
            alternatives: Some(alternatives.iter().map(JourneyResult::from_journey).collect()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            journey: None,
            alternatives: None,
        }
    }
}

/// Query string of `GET /stops/search`.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Search query (name or id fragment)
    pub q: String,

    /// Maximum results (default 10)
    pub limit: Option<usize>,
}

/// Response for stop search.
#[derive(Debug, Serialize, Deserialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopResult>,
}

/// Response of `GET /topology`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopologyResponse {
    pub stops: usize,
    pub routes: usize,
    pub places: usize,
    pub nodes: usize,
    pub edges: usize,
    pub correspondences: usize,
    /// RFC 3339 load time
    pub loaded_at: String,
}

impl From<TopologySummary> for TopologyResponse {
    fn from(summary: TopologySummary) -> Self {
        Self {
            stops: summary.stops,
            routes: summary.routes,
            places: summary.places,
            nodes: summary.nodes,
            edges: summary.edges,
            correspondences: summary.correspondences,
            loaded_at: summary.loaded_at.to_rfc3339(),
        }
    }
}
