//! Polyline densification.

use std::ops::RangeInclusive;

use geo::{Haversine, InterpolatePoint, Point};

use super::{Coord, GeometryError, haversine_m};

/// Accepted range for an enabled maximum gap, in meters.
pub const MAX_GAP_RANGE_M: RangeInclusive<f64> = 10.0..=500.0;

/// Maximum distance allowed between consecutive polyline points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxGap {
    /// Leave polylines untouched.
    Disabled,
    /// Densify so no gap exceeds this many meters.
    Meters(f64),
}

impl MaxGap {
    /// An enabled gap, validated against [`MAX_GAP_RANGE_M`].
    pub fn meters(meters: f64) -> Result<Self, GeometryError> {
        if !MAX_GAP_RANGE_M.contains(&meters) {
            return Err(GeometryError::GapOutOfRange(meters));
        }
        Ok(MaxGap::Meters(meters))
    }

    /// Interpret a request or config value, where 0 means disabled.
    pub fn from_meters_or_disabled(meters: u32) -> Result<Self, GeometryError> {
        if meters == 0 {
            Ok(MaxGap::Disabled)
        } else {
            Self::meters(f64::from(meters))
        }
    }
}

/// Densify a polyline along great circles.
///
/// Every consecutive pair further apart than the gap is split into equal
/// parts along the great circle between them. Original points are copied
/// through unchanged, so endpoints and order are preserved exactly.
///
/// # Examples
///
/// ```
/// use route_planner::geometry::{Coord, MaxGap, normalize};
///
/// let a = Coord::new(37.3785, -5.9790).unwrap();
/// let b = Coord::new(37.3918, -5.9757).unwrap();
///
/// let dense = normalize(&[a, b], MaxGap::meters(50.0).unwrap());
/// assert_eq!(dense.first(), Some(&a));
/// assert_eq!(dense.last(), Some(&b));
/// assert!(dense.len() > 2);
///
/// assert_eq!(normalize(&[a, b], MaxGap::Disabled), vec![a, b]);
/// ```
pub fn normalize(polyline: &[Coord], max_gap: MaxGap) -> Vec<Coord> {
    let MaxGap::Meters(limit) = max_gap else {
        return polyline.to_vec();
    };
    let Some(first) = polyline.first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(polyline.len());
    out.push(*first);

    for pair in polyline.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let gap = haversine_m(a, b);
        if gap > limit {
            let parts = (gap / limit).ceil() as usize;
            let (start, end) = (Point::from(a), Point::from(b));
            for i in 1..parts {
                let ratio = i as f64 / parts as f64;
                out.push(Haversine.point_at_ratio_between(start, end, ratio).into());
            }
        }
        out.push(b);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coord {
        Coord::new(lat, lon).unwrap()
    }

    #[test]
    fn gap_range_is_enforced() {
        assert!(MaxGap::meters(9.9).is_err());
        assert!(MaxGap::meters(500.1).is_err());
        assert_eq!(MaxGap::meters(10.0), Ok(MaxGap::Meters(10.0)));
        assert_eq!(MaxGap::meters(500.0), Ok(MaxGap::Meters(500.0)));
    }

    #[test]
    fn zero_means_disabled() {
        assert_eq!(MaxGap::from_meters_or_disabled(0), Ok(MaxGap::Disabled));
        assert_eq!(MaxGap::from_meters_or_disabled(50), Ok(MaxGap::Meters(50.0)));
        assert!(MaxGap::from_meters_or_disabled(5).is_err());
    }

    #[test]
    fn empty_and_single_point() {
        let gap = MaxGap::Meters(50.0);
        assert!(normalize(&[], gap).is_empty());

        let p = coord(37.0, -6.0);
        assert_eq!(normalize(&[p], gap), vec![p]);
    }

    #[test]
    fn splits_into_equal_parts() {
        // ~1112 m apart: 23 parts of ~48 m with a 50 m gap
        let a = coord(37.0, -6.0);
        let b = coord(37.01, -6.0);
        let out = normalize(&[a, b], MaxGap::Meters(50.0));

        assert_eq!(out.len(), 24);
        for w in out.windows(2) {
            assert!(haversine_m(w[0], w[1]) <= 50.0 + 1e-6);
        }
    }

    #[test]
    fn inserted_points_lie_on_the_great_circle() {
        let a = coord(37.3310, -5.9270);
        let b = coord(37.4095, -6.0055);
        let total = haversine_m(a, b);
        let out = normalize(&[a, b], MaxGap::Meters(100.0));

        let parts = out.len() - 1;
        for (i, p) in out.iter().enumerate() {
            let expected = total * i as f64 / parts as f64;
            assert!((haversine_m(a, *p) - expected).abs() < 1e-3);
            assert!((haversine_m(a, *p) + haversine_m(*p, b) - total).abs() < 1e-3);
        }
    }

    #[test]
    fn coincident_points_are_kept() {
        let p = coord(37.0, -6.0);
        assert_eq!(normalize(&[p, p], MaxGap::Meters(10.0)), vec![p, p]);
    }
}
