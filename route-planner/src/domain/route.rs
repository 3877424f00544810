//! Route (line) types.

use std::fmt;

use super::RouteId;

/// Error returned when parsing an unknown transport mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode {0:?}")]
pub struct InvalidMode(pub String);

/// Error returned when parsing an invalid line color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid line color {0:?}: expected #RRGGBB")]
pub struct InvalidColor(pub String);

/// Transport mode of a route. Selects the commercial speed used for rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Metro,
    CommuterRail,
    Tram,
    LightRail,
    Walking,
}

impl TransportMode {
    /// Parse a mode name. Accepts kebab-case and snake_case spellings.
    ///
    /// # Examples
    ///
    /// ```
    /// use route_planner::domain::TransportMode;
    ///
    /// assert_eq!(TransportMode::parse("commuter-rail"), Ok(TransportMode::CommuterRail));
    /// assert_eq!(TransportMode::parse("light_rail"), Ok(TransportMode::LightRail));
    /// assert!(TransportMode::parse("ferry").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, InvalidMode> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "metro" => Ok(TransportMode::Metro),
            "commuter-rail" => Ok(TransportMode::CommuterRail),
            "tram" => Ok(TransportMode::Tram),
            "light-rail" => Ok(TransportMode::LightRail),
            "walking" => Ok(TransportMode::Walking),
            _ => Err(InvalidMode(s.to_string())),
        }
    }

    /// Wire name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Metro => "metro",
            TransportMode::CommuterRail => "commuter-rail",
            TransportMode::Tram => "tram",
            TransportMode::LightRail => "light-rail",
            TransportMode::Walking => "walking",
        }
    }

    /// Color used when the source gives none.
    pub fn default_color(self) -> LineColor {
        let hex = match self {
            TransportMode::Metro => "#0B8B3D",
            TransportMode::CommuterRail => "#E2001A",
            TransportMode::Tram => "#C8102E",
            TransportMode::LightRail => "#6F2C91",
            TransportMode::Walking => "#888888",
        };
        LineColor(hex.to_string())
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `#RRGGBB` line color, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineColor(String);

impl LineColor {
    /// Parse a hex color, with or without the leading `#`.
    pub fn parse(s: &str) -> Result<Self, InvalidColor> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor(s.to_string()));
        }
        Ok(LineColor(format!("#{}", hex.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How fast a route's vehicles run on average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedClass {
    /// The mode's standard commercial speed.
    Standard,
    /// A route-specific commercial speed in km/h.
    Custom(f64),
}

/// A transit route (line).
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub color: LineColor,
    pub mode: TransportMode,
    pub speed: SpeedClass,
}
