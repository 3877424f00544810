//! Spherical geometry for leg polylines.
//!
//! Coordinates are WGS84 degrees. Distances and interpolation use `geo`'s
//! haversine metric on a spherical Earth, which is accurate to well under a
//! percent at city scale.

mod normalize;

use geo::line_measures::LengthMeasurable;
use geo::{Distance, Haversine, LineString, Point};

pub use normalize::{MAX_GAP_RANGE_M, MaxGap, normalize};

/// Error returned for invalid geometric input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Latitude or longitude out of range, or not finite
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Maximum gap outside the accepted range
    #[error("max gap {0} m is outside 10..=500 m")]
    GapOutOfRange(f64),
}

/// A point on the Earth's surface.
///
/// Construct with [`Coord::new`] to get range validation. Fields stay public
/// for cheap pattern matching in hot loops.
///
/// # Examples
///
/// ```
/// use route_planner::geometry::Coord;
///
/// let sevilla = Coord::new(37.3886, -5.9823).unwrap();
/// assert_eq!(sevilla.to_lon_lat(), [-5.9823, 37.3886]);
///
/// assert!(Coord::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Create a coordinate, rejecting values outside [-90, 90] x [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeometryError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !valid {
            return Err(GeometryError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Returns `[lon, lat]`, the GeoJSON axis order used in responses.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<Coord> for geo::Coord {
    fn from(c: Coord) -> Self {
        geo::Coord { x: c.lon, y: c.lat }
    }
}

impl From<Coord> for Point {
    fn from(c: Coord) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl From<Point> for Coord {
    fn from(p: Point) -> Self {
        Coord {
            lat: p.y(),
            lon: p.x(),
        }
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_m(a: Coord, b: Coord) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

/// Total great-circle length of a polyline, in meters.
pub fn polyline_length_m(points: &[Coord]) -> f64 {
    let line: LineString = points.iter().map(|&c| geo::Coord::from(c)).collect();
    line.length(&Haversine)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coord {
        Coord::new(lat, lon).unwrap()
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Coord::new(90.5, 0.0).is_err());
        assert!(Coord::new(0.0, -180.5).is_err());
        assert!(Coord::new(f64::NAN, 0.0).is_err());
        assert!(Coord::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let p = coord(37.3785, -5.9790);
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_m(coord(0.0, 0.0), coord(1.0, 0.0));
        // One degree on the mean sphere is ~111.195 km
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = coord(37.3310, -5.9270);
        let b = coord(37.4095, -6.0055);
        assert!((haversine_m(a, b) - haversine_m(b, a)).abs() < 1e-9);
    }

    #[test]
    fn polyline_length_sums_segments() {
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 1.0);
        let c = coord(1.0, 1.0);
        let total = polyline_length_m(&[a, b, c]);
        assert!((total - haversine_m(a, b) - haversine_m(b, c)).abs() < 1e-6);
        assert_eq!(polyline_length_m(&[a]), 0.0);
    }
}
