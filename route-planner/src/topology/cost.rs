//! Edge cost model.
//!
//! All edge costs are whole seconds, fixed when the topology is loaded.

use serde::{Deserialize, Serialize};

use crate::domain::{Route, SpeedClass, TransportMode};

use super::TopologyError;

/// Commercial speeds and fixed penalties used to weight graph edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub metro_kmh: f64,
    pub commuter_rail_kmh: f64,
    pub tram_kmh: f64,
    pub light_rail_kmh: f64,
    pub walking_kmh: f64,

    /// Average wait when boarding a route (seconds).
    pub board_wait_secs: u32,

    /// Penalty for changing vehicle, on the spot or after a walk (seconds).
    pub transfer_penalty_secs: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            metro_kmh: 30.0,
            commuter_rail_kmh: 45.0,
            tram_kmh: 18.0,
            light_rail_kmh: 25.0,
            walking_kmh: 4.5,
            board_wait_secs: 6 * 60,
            transfer_penalty_secs: 5 * 60,
        }
    }
}

impl CostModel {
    /// Standard commercial speed of a mode, in km/h.
    pub fn mode_kmh(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Metro => self.metro_kmh,
            TransportMode::CommuterRail => self.commuter_rail_kmh,
            TransportMode::Tram => self.tram_kmh,
            TransportMode::LightRail => self.light_rail_kmh,
            TransportMode::Walking => self.walking_kmh,
        }
    }

    /// Speed a route's vehicles run at, in km/h.
    pub fn route_kmh(&self, route: &Route) -> f64 {
        match route.speed {
            SpeedClass::Standard => self.mode_kmh(route.mode),
            SpeedClass::Custom(kmh) => kmh,
        }
    }

    /// Seconds to ride `distance_m` on `route`. Never zero, so every ride
    /// edge has a positive weight.
    pub fn ride_secs(&self, route: &Route, distance_m: f64) -> u32 {
        secs_at(distance_m, self.route_kmh(route)).max(1)
    }

    /// Seconds to walk `distance_m`.
    pub fn walk_secs(&self, distance_m: f64) -> u32 {
        secs_at(distance_m, self.walking_kmh)
    }

    /// Check every speed is usable.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for mode in [
            TransportMode::Metro,
            TransportMode::CommuterRail,
            TransportMode::Tram,
            TransportMode::LightRail,
            TransportMode::Walking,
        ] {
            check_speed(mode.as_str(), self.mode_kmh(mode))?;
        }
        Ok(())
    }
}

pub(crate) fn check_speed(what: &str, kmh: f64) -> Result<(), TopologyError> {
    if kmh.is_finite() && kmh > 0.0 {
        Ok(())
    } else {
        Err(TopologyError::InvalidSpeed {
            what: what.to_string(),
            kmh,
        })
    }
}

fn secs_at(distance_m: f64, kmh: f64) -> u32 {
    (distance_m / (kmh / 3.6)).round() as u32
}
