//! Topology construction and queries.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    LineColor, PlaceId, Route, RouteId, SpeedClass, Stop, StopId, StopPoint, TransportMode,
};
use crate::geometry::{Coord, haversine_m, polyline_length_m};
use crate::walkable::{Correspondences, Walk};

use super::cost::check_speed;
use super::graph::{
    Context, Edge, EdgeKind, Hop, HopIdx, Node, NodeIdx, RouteIdx, StopIdx, Walkway, WalkwayIdx,
};
use super::place::{Places, SamePlace, group_places};
use super::source::{
    CorrespondenceRecord, NetworkData, RouteRecord, SequenceRecord, StopRecord, TopologySource,
};
use super::{CostModel, TopologyError};

/// Counts describing a loaded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologySummary {
    pub stops: usize,
    pub routes: usize,
    pub places: usize,
    pub nodes: usize,
    pub edges: usize,
    pub correspondences: usize,
    pub loaded_at: DateTime<Utc>,
}

/// An immutable, searchable transit network.
///
/// Built once by [`Topology::load`] and shared read-only between searches.
#[derive(Debug)]
pub struct Topology {
    stops: Vec<Arc<Stop>>,
    stop_index: HashMap<StopId, StopIdx>,
    routes: Vec<Arc<Route>>,
    route_index: HashMap<RouteId, RouteIdx>,
    places: Places,
    nodes: Vec<Node>,
    adjacency: Vec<Vec<Edge>>,
    hops: Vec<Hop>,
    walkways: Vec<Walkway>,
    correspondences: Correspondences,
    cost_model: CostModel,
    loaded_at: DateTime<Utc>,
}

/// Mutable state while the graph is being built.
#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<Node>,
    node_index: HashMap<Node, NodeIdx>,
    /// Nodes of each stop, in creation order.
    nodes_at: Vec<Vec<NodeIdx>>,
    adjacency: Vec<Vec<Edge>>,
    hops: Vec<Hop>,
}

impl GraphBuilder {
    fn new(stop_count: usize) -> Self {
        Self {
            nodes_at: vec![Vec::new(); stop_count],
            ..Self::default()
        }
    }

    fn intern(&mut self, stop: StopIdx, context: Context) -> NodeIdx {
        let node = Node { stop, context };
        if let Some(&idx) = self.node_index.get(&node) {
            return idx;
        }
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        self.node_index.insert(node, idx);
        self.nodes_at[stop.0 as usize].push(idx);
        idx
    }

    fn connect(&mut self, from: NodeIdx, target: NodeIdx, cost: u32, kind: EdgeKind) {
        self.adjacency[from.index()].push(Edge { target, cost, kind });
    }
}

impl Topology {
    /// Read both parts of a source and build a topology from them.
    pub fn from_source(
        source: &dyn TopologySource,
        same_place: &dyn SamePlace,
        cost_model: &CostModel,
    ) -> Result<Self, TopologyError> {
        let network = source.read_network()?;
        let correspondences = source.read_correspondences()?;
        Self::load(network, &correspondences, same_place, cost_model)
    }

    /// Build a topology.
    ///
    /// Stops are grouped into places with `same_place`; every edge cost is
    /// computed from `cost_model` here, once.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed record: invalid ids, coordinates,
    /// colors or speeds, duplicate ids, references to unknown stops or
    /// routes, sequences with fewer than two stops, and routes without any
    /// sequence. Nothing is returned on failure.
    pub fn load(
        network: NetworkData,
        correspondences: &[CorrespondenceRecord],
        same_place: &dyn SamePlace,
        cost_model: &CostModel,
    ) -> Result<Self, TopologyError> {
        cost_model.validate()?;

        let (stops, stop_index) = build_stops(&network.stops)?;
        let (routes, route_index) = build_routes(&network.routes)?;
        let places = group_places(&stops, same_place);

        let mut graph = GraphBuilder::new(stops.len());
        for members in &places.members {
            graph.intern(members[0], Context::Unboarded);
        }

        let mut sequenced: HashSet<RouteIdx> = HashSet::new();
        for seq in &network.sequences {
            let route = add_sequence(
                &mut graph,
                seq,
                &stops,
                &stop_index,
                &routes,
                &route_index,
                cost_model,
            )?;
            sequenced.insert(route);
        }
        if let Some(route) = routes
            .iter()
            .enumerate()
            .find(|(i, _)| !sequenced.contains(&RouteIdx(*i as u32)))
            .map(|(_, r)| r)
        {
            return Err(TopologyError::RouteWithoutSequence(route.id.clone()));
        }

        // Boarding and alighting within a place
        for idx in 0..graph.nodes.len() {
            let node = graph.nodes[idx];
            let Context::OnRoute(route) = node.context else {
                continue;
            };
            let place = places.place_of[node.stop.0 as usize];
            let unboarded = graph.intern(places.representative(place), Context::Unboarded);
            let on_route = NodeIdx(idx as u32);

            graph.connect(
                unboarded,
                on_route,
                cost_model.board_wait_secs,
                EdgeKind::Board {
                    route,
                    stop: node.stop,
                },
            );
            graph.connect(
                on_route,
                unboarded,
                cost_model.transfer_penalty_secs,
                EdgeKind::TransferSameStop { stop: node.stop },
            );
        }

        let table = build_correspondences(correspondences, &stop_index)?;
        let walkways = add_walkways(&mut graph, &table, &stop_index, &places, cost_model);

        let topology = Topology {
            stops,
            stop_index,
            routes,
            route_index,
            places,
            nodes: graph.nodes,
            adjacency: graph.adjacency,
            hops: graph.hops,
            walkways,
            correspondences: table,
            cost_model: cost_model.clone(),
            loaded_at: Utc::now(),
        };

        let summary = topology.summary();
        info!(
            stops = summary.stops,
            routes = summary.routes,
            places = summary.places,
            nodes = summary.nodes,
            edges = summary.edges,
            correspondences = summary.correspondences,
            "Topology loaded"
        );

        Ok(topology)
    }

    /// Outgoing edges of a node.
    pub fn neighbors(&self, node: NodeIdx) -> &[Edge] {
        &self.adjacency[node.index()]
    }

    pub fn node(&self, node: NodeIdx) -> Node {
        self.nodes[node.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a stop by id.
    pub fn stop(&self, id: &StopId) -> Result<&Arc<Stop>, TopologyError> {
        self.stop_idx(id)
            .map(|idx| self.stop_at(idx))
            .ok_or_else(|| TopologyError::stop_not_found(id.as_str()))
    }

    pub fn stop_idx(&self, id: &StopId) -> Option<StopIdx> {
        self.stop_index.get(id).copied()
    }

    pub fn stop_at(&self, idx: StopIdx) -> &Arc<Stop> {
        &self.stops[idx.0 as usize]
    }

    /// A stop tagged with its place, as legs carry it.
    pub fn stop_point(&self, idx: StopIdx) -> StopPoint {
        StopPoint {
            stop: Arc::clone(self.stop_at(idx)),
            place: self.place_of(idx),
        }
    }

    /// Look up a route by id.
    pub fn route(&self, id: &RouteId) -> Result<&Arc<Route>, TopologyError> {
        self.route_index
            .get(id)
            .map(|idx| self.route_at(*idx))
            .ok_or_else(|| TopologyError::route_not_found(id.as_str()))
    }

    pub fn route_at(&self, idx: RouteIdx) -> &Arc<Route> {
        &self.routes[idx.0 as usize]
    }

    pub fn place_of(&self, stop: StopIdx) -> PlaceId {
        self.places.place_of[stop.0 as usize]
    }

    /// Stops of a place, representative first.
    pub fn place_members(&self, place: PlaceId) -> impl Iterator<Item = &Arc<Stop>> {
        self.places.members[place.0 as usize]
            .iter()
            .map(|idx| self.stop_at(*idx))
    }

    /// The node for standing, unboarded, at a stop's place.
    pub fn unboarded_node(&self, stop: StopIdx) -> NodeIdx {
        // Unboarded nodes are interned first, one per place, in place order
        NodeIdx(self.place_of(stop).0)
    }

    pub fn hop(&self, hop: HopIdx) -> &Hop {
        &self.hops[hop.0 as usize]
    }

    pub fn walkway(&self, walkway: WalkwayIdx) -> &Walkway {
        &self.walkways[walkway.0 as usize]
    }

    pub fn correspondences(&self) -> &Correspondences {
        &self.correspondences
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Stops whose name or id contains `query`, case-insensitively.
    ///
    /// Name-prefix matches come first; ties sort by name then id.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<&Arc<Stop>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(bool, &Arc<Stop>)> = self
            .stops
            .iter()
            .filter_map(|stop| {
                let name = stop.name.to_lowercase();
                let id = stop.id.as_str().to_lowercase();
                if name.contains(&needle) || id.contains(&needle) {
                    Some((!name.starts_with(&needle), stop))
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|(pa, a), (pb, b)| {
            pa.cmp(pb)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.into_iter().take(limit).map(|(_, s)| s).collect()
    }

    pub fn summary(&self) -> TopologySummary {
        TopologySummary {
            stops: self.stops.len(),
            routes: self.routes.len(),
            places: self.places.members.len(),
            nodes: self.nodes.len(),
            edges: self.adjacency.iter().map(Vec::len).sum(),
            correspondences: self.walkways.len(),
            loaded_at: self.loaded_at,
        }
    }
}

type StopTable = (Vec<Arc<Stop>>, HashMap<StopId, StopIdx>);

fn build_stops(records: &[StopRecord]) -> Result<StopTable, TopologyError> {
    let mut stops = Vec::with_capacity(records.len());
    let mut index = HashMap::with_capacity(records.len());

    for record in records {
        let id = StopId::parse(&record.id)?;
        let coord = Coord::new(record.lat, record.lon)?;
        let mut stop = Stop::new(id.clone(), record.name.clone(), coord);
        stop.parent_station = record.parent_station.clone();

        let idx = StopIdx(stops.len() as u32);
        if index.insert(id, idx).is_some() {
            return Err(TopologyError::Duplicate {
                kind: "stop",
                id: record.id.clone(),
            });
        }
        stops.push(Arc::new(stop));
    }

    Ok((stops, index))
}

type RouteTable = (Vec<Arc<Route>>, HashMap<RouteId, RouteIdx>);

fn build_routes(records: &[RouteRecord]) -> Result<RouteTable, TopologyError> {
    let mut routes = Vec::with_capacity(records.len());
    let mut index = HashMap::with_capacity(records.len());

    for record in records {
        let id = RouteId::parse(&record.id)?;
        let mode = TransportMode::parse(&record.mode)?;
        let color = match &record.color {
            Some(hex) => LineColor::parse(hex)?,
            None => mode.default_color(),
        };
        let speed = match record.speed_kmh {
            Some(kmh) => {
                check_speed(&record.id, kmh)?;
                SpeedClass::Custom(kmh)
            }
            None => SpeedClass::Standard,
        };

        let idx = RouteIdx(routes.len() as u32);
        if index.insert(id.clone(), idx).is_some() {
            return Err(TopologyError::Duplicate {
                kind: "route",
                id: record.id.clone(),
            });
        }
        routes.push(Arc::new(Route {
            id,
            name: record.name.clone(),
            color,
            mode,
            speed,
        }));
    }

    Ok((routes, index))
}

fn resolve_stop(
    raw: &str,
    stop_index: &HashMap<StopId, StopIdx>,
) -> Result<StopIdx, TopologyError> {
    StopId::parse(raw)
        .ok()
        .and_then(|id| stop_index.get(&id).copied())
        .ok_or_else(|| TopologyError::stop_not_found(raw))
}

/// Add the ride hops and edges of one sequence. Returns its route.
fn add_sequence(
    graph: &mut GraphBuilder,
    seq: &SequenceRecord,
    stops: &[Arc<Stop>],
    stop_index: &HashMap<StopId, StopIdx>,
    routes: &[Arc<Route>],
    route_index: &HashMap<RouteId, RouteIdx>,
    cost_model: &CostModel,
) -> Result<RouteIdx, TopologyError> {
    let route_idx = RouteId::parse(&seq.route)
        .ok()
        .and_then(|id| route_index.get(&id).copied())
        .ok_or_else(|| TopologyError::route_not_found(&seq.route))?;
    let route = &routes[route_idx.0 as usize];

    if seq.stops.len() < 2 {
        return Err(TopologyError::ShortSequence {
            route: route.id.clone(),
            len: seq.stops.len(),
        });
    }

    let path: Vec<StopIdx> = seq
        .stops
        .iter()
        .map(|raw| resolve_stop(raw, stop_index))
        .collect::<Result<_, _>>()?;
    let coords: Vec<Coord> = path.iter().map(|s| stops[s.0 as usize].coord).collect();

    let shape = seq
        .shape
        .as_ref()
        .map(|points| {
            points
                .iter()
                .map(|[lon, lat]| Coord::new(*lat, *lon))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let forward = hop_geometries(&coords, shape.as_deref());

    let last = path[path.len() - 1];
    let headsign = seq
        .headsign
        .clone()
        .unwrap_or_else(|| stops[last.0 as usize].name.clone());
    for (pair, geometry) in path.windows(2).zip(&forward) {
        add_hop(
            graph,
            route_idx,
            route,
            (pair[0], pair[1]),
            geometry.clone(),
            &headsign,
            cost_model,
        );
    }

    if seq.bidirectional {
        let reverse_headsign = stops[path[0].0 as usize].name.clone();
        for (pair, geometry) in path.windows(2).zip(&forward).rev() {
            let geometry: Vec<Coord> = geometry.iter().rev().copied().collect();
            add_hop(
                graph,
                route_idx,
                route,
                (pair[1], pair[0]),
                geometry,
                &reverse_headsign,
                cost_model,
            );
        }
    }

    debug!(
        route = %route.id,
        stops = path.len(),
        bidirectional = seq.bidirectional,
        shaped = shape.is_some(),
        "Added stop sequence"
    );

    Ok(route_idx)
}

fn add_hop(
    graph: &mut GraphBuilder,
    route_idx: RouteIdx,
    route: &Route,
    (from, to): (StopIdx, StopIdx),
    geometry: Vec<Coord>,
    headsign: &str,
    cost_model: &CostModel,
) {
    let distance_m = polyline_length_m(&geometry);
    let seconds = cost_model.ride_secs(route, distance_m);

    let hop = HopIdx(graph.hops.len() as u32);
    graph.hops.push(Hop {
        route: route_idx,
        from,
        to,
        distance_m,
        seconds,
        geometry,
        headsign: headsign.to_string(),
    });

    let a = graph.intern(from, Context::OnRoute(route_idx));
    let b = graph.intern(to, Context::OnRoute(route_idx));
    graph.connect(
        a,
        b,
        seconds,
        EdgeKind::Ride {
            route: route_idx,
            from,
            to,
            hop,
        },
    );
}

/// Polyline for each consecutive stop pair.
///
/// Without a shape each hop is a straight segment. With one, each stop is
/// snapped to its nearest shape vertex, searching forward from the previous
/// stop's vertex, and the hop follows the shape between them.
fn hop_geometries(stops: &[Coord], shape: Option<&[Coord]>) -> Vec<Vec<Coord>> {
    let Some(shape) = shape.filter(|s| !s.is_empty()) else {
        return stops.windows(2).map(|w| vec![w[0], w[1]]).collect();
    };

    let mut snapped = Vec::with_capacity(stops.len());
    let mut from = 0;
    for stop in stops {
        let (best, _) = shape
            .iter()
            .enumerate()
            .skip(from)
            .map(|(i, p)| (i, haversine_m(*stop, *p)))
            .fold((from, f64::INFINITY), |best, (i, d)| {
                if d < best.1 { (i, d) } else { best }
            });
        snapped.push(best);
        from = best;
    }

    stops
        .windows(2)
        .zip(snapped.windows(2))
        .map(|(pair, ix)| {
            let mut line = vec![pair[0]];
            if ix[1] > ix[0] + 1 {
                line.extend_from_slice(&shape[ix[0] + 1..ix[1]]);
            }
            line.push(pair[1]);
            line
        })
        .collect()
}

fn build_correspondences(
    records: &[CorrespondenceRecord],
    stop_index: &HashMap<StopId, StopIdx>,
) -> Result<Correspondences, TopologyError> {
    let mut table = Correspondences::new();

    for record in records {
        resolve_stop(&record.from, stop_index)?;
        resolve_stop(&record.to, stop_index)?;
        if !record.distance_m.is_finite() || record.distance_m < 0.0 {
            return Err(TopologyError::InvalidDistance {
                from: record.from.clone(),
                to: record.to.clone(),
                distance_m: record.distance_m,
            });
        }

        let walk = Walk {
            distance_m: record.distance_m,
            duration: record.walk_seconds.map(|s| Duration::seconds(i64::from(s))),
        };
        let (from, to) = (StopId::parse(&record.from)?, StopId::parse(&record.to)?);
        if table.get(&from, &to).is_some() {
            warn!(from = %from, to = %to, "Duplicate correspondence, keeping the later one");
        }
        if !table.add(from, to, walk) {
            warn!(stop = %record.from, "Skipping correspondence from a stop to itself");
        }
    }

    Ok(table)
}

/// Add walking edges for every correspondence between distinct places.
fn add_walkways(
    graph: &mut GraphBuilder,
    table: &Correspondences,
    stop_index: &HashMap<StopId, StopIdx>,
    places: &Places,
    cost_model: &CostModel,
) -> Vec<Walkway> {
    let mut walkways = Vec::new();

    for (a_id, b_id, walk) in table.pairs() {
        let (a, b) = (stop_index[a_id], stop_index[b_id]);
        let (place_a, place_b) = (places.place_of[a.0 as usize], places.place_of[b.0 as usize]);
        if place_a == place_b {
            debug!(a = %a_id, b = %b_id, "Correspondence inside one place, ignored");
            continue;
        }

        let walk_secs = walk.duration_at(cost_model.walking_kmh).num_seconds().max(0) as u32;
        let idx = WalkwayIdx(walkways.len() as u32);
        walkways.push(Walkway {
            a,
            b,
            distance_m: walk.distance_m,
            walk_secs,
        });

        let cost = walk_secs + cost_model.transfer_penalty_secs;
        let directions = [(a, b, place_a, place_b), (b, a, place_b, place_a)];
        for (from, to, from_place, to_place) in directions {
            let target = graph.intern(places.representative(to_place), Context::Unboarded);
            let home = graph.intern(places.representative(from_place), Context::Unboarded);

            let mut sources = graph.nodes_at[from.0 as usize].clone();
            if !sources.contains(&home) {
                sources.push(home);
            }
            for source in sources {
                graph.connect(
                    source,
                    target,
                    cost,
                    EdgeKind::TransferWalking {
                        walkway: idx,
                        from,
                        to,
                    },
                );
            }
        }
    }

    walkways
}
