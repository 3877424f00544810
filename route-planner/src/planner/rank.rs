//! Journey ranking for search results.
//!
//! Ranks journeys by a combination of factors to present the most useful
//! options first.

use std::cmp::Ordering;

use crate::domain::{Journey, RouteId};

/// Rank journeys by preference.
///
/// Journeys are ranked by:
/// 1. Total duration (shorter is better)
/// 2. Number of transfers (fewer is better)
/// 3. Walking time (less is better)
///
/// Returns journeys sorted best-first.
pub fn rank_journeys(mut journeys: Vec<Journey>) -> Vec<Journey> {
    journeys.sort_by(compare);
    journeys
}

fn compare(a: &Journey, b: &Journey) -> Ordering {
    a.total_duration()
        .cmp(&b.total_duration())
        .then_with(|| a.transfer_count().cmp(&b.transfer_count()))
        .then_with(|| a.total_walking_duration().cmp(&b.total_walking_duration()))
}

/// True if `a` is no worse than `b` on duration and transfers, and
/// strictly better on one of them.
fn dominates(a: &Journey, b: &Journey) -> bool {
    a.total_duration() <= b.total_duration()
        && a.transfer_count() <= b.transfer_count()
        && (a.total_duration() < b.total_duration() || a.transfer_count() < b.transfer_count())
}

/// Remove dominated journeys.
///
/// A journey is dominated if another journey takes no longer and makes
/// no more transfers, and is strictly better on one of the two.
pub fn remove_dominated(journeys: Vec<Journey>) -> Vec<Journey> {
    if journeys.len() <= 1 {
        return journeys;
    }

    let mut result: Vec<Journey> = Vec::with_capacity(journeys.len());

    for journey in journeys {
        if result.iter().any(|existing| dominates(existing, &journey)) {
            continue;
        }
        // Also drop anything this one dominates
        result.retain(|existing| !dominates(&journey, existing));
        result.push(journey);
    }

    result
}

/// Routes ridden, in order.
fn route_key(journey: &Journey) -> Vec<RouteId> {
    journey
        .transit_legs()
        .map(|leg| leg.route().id.clone())
        .collect()
}

/// Deduplicate journeys that are effectively identical.
///
/// Two journeys are duplicates if they take the same time, make the same
/// number of transfers and ride the same routes in the same order. Of each
/// group the best-ranked one is kept.
pub fn deduplicate(journeys: Vec<Journey>) -> Vec<Journey> {
    if journeys.len() <= 1 {
        return journeys;
    }

    let mut seen = Vec::with_capacity(journeys.len());
    let mut result = Vec::with_capacity(journeys.len());

    for journey in rank_journeys(journeys) {
        let key = (
            journey.total_duration(),
            journey.transfer_count(),
            route_key(&journey),
        );
        if !seen.contains(&key) {
            seen.push(key);
            result.push(journey);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{route, stop_point};
    use crate::domain::{Leg, StopPoint, TransitLeg, TransportMode, WalkingLeg};
    use chrono::Duration;

    fn a() -> StopPoint {
        stop_point("A", 37.38, -5.99, 0)
    }

    fn m() -> StopPoint {
        stop_point("M", 37.39, -5.98, 1)
    }

    fn z() -> StopPoint {
        stop_point("Z", 37.40, -5.97, 2)
    }

    fn ride(line: &str, from: StopPoint, to: StopPoint, mins: i64) -> Leg {
        Leg::Transit(
            TransitLeg::new(
                route(line, TransportMode::Metro),
                to.name().to_string(),
                vec![from, to],
                Duration::minutes(mins),
                vec![],
            )
            .unwrap(),
        )
    }

    fn walk(from: StopPoint, to: StopPoint, mins: i64) -> Leg {
        Leg::Walking(WalkingLeg::new(from, to, 100.0, Duration::minutes(mins)))
    }

    fn direct(line: &str, mins: i64) -> Journey {
        Journey::new(vec![ride(line, a(), z(), mins)]).unwrap()
    }

    fn change(first: i64, second: i64) -> Journey {
        Journey::new(vec![ride("L1", a(), m(), first), ride("L2", m(), z(), second)]).unwrap()
    }

    #[test]
    fn rank_by_duration() {
        let ranked = rank_journeys(vec![direct("L1", 40), direct("L2", 30)]);
        assert_eq!(ranked[0].total_duration(), Duration::minutes(30));
        assert_eq!(ranked[1].total_duration(), Duration::minutes(40));
    }

    #[test]
    fn rank_by_transfers_when_same_duration() {
        let ranked = rank_journeys(vec![change(15, 15), direct("L1", 30)]);
        assert_eq!(ranked[0].transfer_count(), 0);
        assert_eq!(ranked[1].transfer_count(), 1);
    }

    #[test]
    fn rank_by_walking_last() {
        let walky = Journey::new(vec![ride("L1", a(), m(), 20), walk(m(), z(), 10)]).unwrap();
        let ranked = rank_journeys(vec![walky, direct("L2", 30)]);
        assert_eq!(ranked[0].total_walking_duration(), Duration::zero());
    }

    #[test]
    fn remove_dominated_keeps_pareto_optimal() {
        let result = remove_dominated(vec![
            direct("L1", 40),
            change(10, 15),
            // Slower and no fewer transfers than the direct ride
            change(20, 25),
            direct("L2", 45),
        ]);

        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|j| j.total_duration() == Duration::minutes(40)));
        assert!(result.iter().any(|j| j.total_duration() == Duration::minutes(25)));
    }

    #[test]
    fn deduplicate_same_routes() {
        let result = deduplicate(vec![direct("L1", 30), direct("L1", 30), direct("L2", 30)]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(rank_journeys(vec![]).is_empty());
        assert!(remove_dominated(vec![]).is_empty());
        assert!(deduplicate(vec![]).is_empty());
    }
}
