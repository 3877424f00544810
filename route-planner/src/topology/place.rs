//! Same-place rules.
//!
//! A place is a set of stops treated as one physical location: two
//! platforms of one station, or a metro and a tram stop sharing a parent
//! station. Transfers inside a place need no walking leg.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{PlaceId, Stop};
use crate::geometry::haversine_m;

use super::graph::StopIdx;

/// Decides whether two stops are the same physical place.
///
/// The relation is closed transitively when grouping, so a rule only needs
/// to recognize direct pairs.
pub trait SamePlace: Send + Sync {
    fn same_place(&self, a: &Stop, b: &Stop) -> bool;

    /// Key two stops must share before `same_place` is asked about them.
    /// `None` keeps the stop in a place of its own.
    ///
    /// The default puts every stop in one bucket, so every pair is compared.
    fn bucket(&self, stop: &Stop) -> Option<String> {
        let _ = stop;
        Some(String::new())
    }
}

impl<F> SamePlace for F
where
    F: Fn(&Stop, &Stop) -> bool + Send + Sync,
{
    fn same_place(&self, a: &Stop, b: &Stop) -> bool {
        self(a, b)
    }
}

/// Every stop is its own place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctStops;

impl SamePlace for DistinctStops {
    fn same_place(&self, _: &Stop, _: &Stop) -> bool {
        false
    }

    fn bucket(&self, _: &Stop) -> Option<String> {
        None
    }
}

/// Stops with equal `parent_station` are one place.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedParentStation;

impl SamePlace for SharedParentStation {
    fn same_place(&self, a: &Stop, b: &Stop) -> bool {
        matches!(
            (&a.parent_station, &b.parent_station),
            (Some(pa), Some(pb)) if pa == pb
        )
    }

    fn bucket(&self, stop: &Stop) -> Option<String> {
        stop.parent_station.clone()
    }
}

/// Stops with the same name standing within `radius_m` of each other are one
/// place. Names compare case-insensitively with whitespace collapsed.
#[derive(Debug, Clone, Copy)]
pub struct CoLocated {
    pub radius_m: f64,
}

impl SamePlace for CoLocated {
    fn same_place(&self, a: &Stop, b: &Stop) -> bool {
        normalized_name(&a.name) == normalized_name(&b.name)
            && haversine_m(a.coord, b.coord) <= self.radius_m
    }

    fn bucket(&self, stop: &Stop) -> Option<String> {
        Some(normalized_name(&stop.name))
    }
}

fn normalized_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stop-to-place assignment.
#[derive(Debug, Clone)]
pub(crate) struct Places {
    /// Place of each stop, by stop index.
    pub place_of: Vec<PlaceId>,
    /// Member stops of each place in index order. The first member is the
    /// place's representative.
    pub members: Vec<Vec<StopIdx>>,
}

impl Places {
    pub fn representative(&self, place: PlaceId) -> StopIdx {
        self.members[place.0 as usize][0]
    }
}

/// Group stops into places, closing `rule` transitively.
///
/// Only stops in the same [`SamePlace::bucket`] are compared. Place ids
/// follow the order of each place's first stop, so the result depends only
/// on stop order.
pub(crate) fn group_places(stops: &[Arc<Stop>], rule: &dyn SamePlace) -> Places {
    let mut parent: Vec<usize> = (0..stops.len()).collect();

    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, stop) in stops.iter().enumerate() {
        if let Some(key) = rule.bucket(stop) {
            buckets.entry(key).or_default().push(i);
        }
    }

    for bucket in buckets.values() {
        for (n, &i) in bucket.iter().enumerate() {
            for &j in &bucket[n + 1..] {
                if rule.same_place(&stops[i], &stops[j]) {
                    union(&mut parent, i, j);
                }
            }
        }
    }

    let mut root_place: Vec<Option<PlaceId>> = vec![None; stops.len()];
    let mut place_of = Vec::with_capacity(stops.len());
    let mut members: Vec<Vec<StopIdx>> = Vec::new();

    for i in 0..stops.len() {
        let root = find(&mut parent, i);
        let place = *root_place[root].get_or_insert_with(|| {
            members.push(Vec::new());
            PlaceId((members.len() - 1) as u32)
        });
        members[place.0 as usize].push(StopIdx(i as u32));
        place_of.push(place);
    }

    Places { place_of, members }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        // Lower index stays root
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::StopId;
    use crate::geometry::Coord;

    fn stop(id: &str, name: &str, lat: f64, lon: f64, parent: Option<&str>) -> Arc<Stop> {
        let mut s = Stop::new(StopId::parse(id).unwrap(), name, Coord::new(lat, lon).unwrap());
        s.parent_station = parent.map(str::to_string);
        Arc::new(s)
    }

    fn fixture() -> Vec<Arc<Stop>> {
        vec![
            stop("METRO_E8", "Puerta Jerez", 37.3815, -5.9925, Some("SEV_PUERTA_JEREZ")),
            stop("TRAM_03", "Puerta Jerez", 37.3818, -5.9928, Some("SEV_PUERTA_JEREZ")),
            stop("METRO_E10", "San Bernardo", 37.3785, -5.9790, None),
            stop("RENFE_43002", "San  bernardo", 37.3778, -5.9780, None),
        ]
    }

    #[test]
    fn distinct_stops_never_merge() {
        let places = group_places(&fixture(), &DistinctStops);
        assert_eq!(places.members.len(), 4);
        assert_eq!(places.place_of[3], PlaceId(3));
    }

    #[test]
    fn parent_station_merges() {
        let places = group_places(&fixture(), &SharedParentStation);
        assert_eq!(places.members.len(), 3);
        assert_eq!(places.place_of[0], places.place_of[1]);
        assert_ne!(places.place_of[2], places.place_of[3]);
        assert_eq!(places.representative(places.place_of[1]), StopIdx(0));
    }

    #[test]
    fn co_located_uses_name_and_radius() {
        let places = group_places(&fixture(), &CoLocated { radius_m: 150.0 });
        assert_eq!(places.place_of[0], places.place_of[1]);
        assert_eq!(places.place_of[2], places.place_of[3]);

        let tight = group_places(&fixture(), &CoLocated { radius_m: 10.0 });
        assert_ne!(tight.place_of[2], tight.place_of[3]);
    }

    /// Parent-station rule that counts the pairs it is asked about.
    #[derive(Default)]
    struct CountingRule {
        calls: AtomicUsize,
    }

    impl SamePlace for CountingRule {
        fn same_place(&self, a: &Stop, b: &Stop) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            SharedParentStation.same_place(a, b)
        }

        fn bucket(&self, stop: &Stop) -> Option<String> {
            SharedParentStation.bucket(stop)
        }
    }

    #[test]
    fn only_stops_in_one_bucket_are_compared() {
        let rule = CountingRule::default();
        let places = group_places(&fixture(), &rule);

        assert_eq!(places.members.len(), 3);
        // Just the two Puerta Jerez platforms
        assert_eq!(rule.calls.load(Ordering::Relaxed), 1);

        assert_eq!(DistinctStops.bucket(&fixture()[0]), None);
        assert_eq!(
            CoLocated { radius_m: 150.0 }.bucket(&fixture()[3]),
            Some("san bernardo".to_string())
        );
    }

    #[test]
    fn closure_rule_is_transitive() {
        let stops = vec![
            stop("A", "A", 37.0, -6.0, None),
            stop("B", "B", 37.0, -6.0, None),
            stop("C", "C", 37.0, -6.0, None),
            stop("D", "D", 37.0, -6.0, None),
        ];
        // A~C and C~B only; A and B still land together
        let rule = |a: &Stop, b: &Stop| {
            let pair = (a.id.as_str(), b.id.as_str());
            matches!(pair, ("A", "C") | ("B", "C"))
        };
        let places = group_places(&stops, &rule);

        assert_eq!(places.members.len(), 2);
        assert_eq!(places.place_of[0], places.place_of[1]);
        assert_eq!(places.place_of[1], places.place_of[2]);
        assert_eq!(
            places.members[0],
            vec![StopIdx(0), StopIdx(1), StopIdx(2)]
        );
        assert_eq!(places.place_of[3], PlaceId(1));
    }
}
