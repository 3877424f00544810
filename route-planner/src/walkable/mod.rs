//! Walking correspondences between stops.
//!
//! Some stops of different lines are close enough to walk between, enabling
//! interchanges that don't appear in any route (e.g., San Bernardo metro and
//! San Bernardo commuter rail). This module provides lookup for walkable
//! stop pairs and their distances and walking times.

use std::collections::HashMap;

use chrono::Duration;

use crate::domain::StopId;

/// One recorded walk between two stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walk {
    /// Walking distance in meters.
    pub distance_m: f64,
    /// Walking time, when the source records one.
    pub duration: Option<Duration>,
}

impl Walk {
    /// Walking time, derived from distance at `walking_kmh` when unrecorded.
    pub fn duration_at(&self, walking_kmh: f64) -> Duration {
        self.duration.unwrap_or_else(|| {
            let secs = self.distance_m / (walking_kmh / 3.6);
            Duration::seconds(secs.round() as i64)
        })
    }
}

/// A collection of walking correspondences between stops.
///
/// Correspondences are symmetric: if you can walk from A to B, you can walk
/// from B to A with the same distance and time.
#[derive(Debug, Clone, Default)]
pub struct Correspondences {
    /// Map from (from, to) to the walk. Stored in both directions for O(1)
    /// lookup.
    walks: HashMap<(StopId, StopId), Walk>,
}

impl Correspondences {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a correspondence between two stops.
    ///
    /// The walk is stored symmetrically (both A→B and B→A). Returns false
    /// and stores nothing if `from` and `to` are the same stop.
    pub fn add(&mut self, from: StopId, to: StopId, walk: Walk) -> bool {
        if from == to {
            return false;
        }
        self.walks.insert((to.clone(), from.clone()), walk);
        self.walks.insert((from, to), walk);
        true
    }

    /// Get the walk between two stops, if any.
    pub fn get(&self, from: &StopId, to: &StopId) -> Option<Walk> {
        self.walks.get(&(from.clone(), to.clone())).copied()
    }

    /// Each correspondence once, as `(a, b, walk)` with `a < b`, sorted.
    pub fn pairs(&self) -> Vec<(&StopId, &StopId, Walk)> {
        let mut out: Vec<_> = self
            .walks
            .iter()
            .filter(|((a, b), _)| a < b)
            .map(|((a, b), walk)| (a, b, *walk))
            .collect();
        out.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
        out
    }

    /// Returns the number of correspondences (counting A→B and B→A as one).
    pub fn len(&self) -> usize {
        self.walks.len() / 2
    }

    /// Returns true if there are no correspondences.
    pub fn is_empty(&self) -> bool {
        self.walks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn walk(distance_m: f64, secs: i64) -> Walk {
        Walk {
            distance_m,
            duration: Some(Duration::seconds(secs)),
        }
    }

    #[test]
    fn empty_correspondences() {
        let c = Correspondences::new();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
        assert!(c.get(&id("A"), &id("B")).is_none());
    }

    #[test]
    fn add_and_lookup() {
        let mut c = Correspondences::new();
        assert!(c.add(id("METRO_SEV_L1_E10"), id("RENFE_43002"), walk(118.0, 240)));

        assert_eq!(c.len(), 1);

        // Forward lookup
        assert_eq!(
            c.get(&id("METRO_SEV_L1_E10"), &id("RENFE_43002")),
            Some(walk(118.0, 240))
        );

        // Reverse lookup (symmetric)
        assert_eq!(
            c.get(&id("RENFE_43002"), &id("METRO_SEV_L1_E10")),
            Some(walk(118.0, 240))
        );

        assert!(c.get(&id("RENFE_43002"), &id("RENFE_43003")).is_none());
    }

    #[test]
    fn self_pair_rejected() {
        let mut c = Correspondences::new();
        assert!(!c.add(id("A"), id("A"), walk(0.0, 0)));
        assert!(c.is_empty());
    }

    #[test]
    fn pairs_lists_each_once() {
        let mut c = Correspondences::new();
        c.add(id("B"), id("A"), walk(100.0, 90));
        c.add(id("C"), id("B"), walk(50.0, 45));

        let pairs = c.pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].0.as_str(), pairs[0].1.as_str()), ("A", "B"));
        assert_eq!((pairs[1].0.as_str(), pairs[1].1.as_str()), ("B", "C"));
    }

    #[test]
    fn duration_derived_from_distance() {
        let w = Walk {
            distance_m: 450.0,
            duration: None,
        };
        // 4.5 km/h = 1.25 m/s
        assert_eq!(w.duration_at(4.5), Duration::seconds(360));

        let recorded = walk(450.0, 200);
        assert_eq!(recorded.duration_at(4.5), Duration::seconds(200));
    }
}
