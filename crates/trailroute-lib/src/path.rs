use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::cost::RoutingMode;
use crate::error::{Error, Result};
use crate::geo::{haversine_distance, Coordinate};
use crate::graph::{Direction, Edge, GraphSource, Node, NodeId};
use crate::heap::{FloatOrd, MinHeap};

/// An edge as walked by a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraversedEdge {
    pub edge: Edge,
    pub direction: Direction,
}

impl TraversedEdge {
    pub fn cost(&self) -> f64 {
        self.edge.cost_in(self.direction)
    }
}

/// Result of a pathfinding run, for a single segment or a whole via-point route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedRoute {
    pub mode: RoutingMode,
    /// Visited nodes in order; always one more than `edges` for a non-empty route.
    pub nodes: Vec<Node>,
    pub edges: Vec<TraversedEdge>,
    /// Metres.
    pub total_distance: f64,
    pub total_cost: f64,
    /// Seconds, derived from `total_cost` and the mode's base speed.
    pub estimated_duration: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    /// Continuous polyline without repeated adjacent points.
    pub coordinates: Vec<Coordinate>,
    /// Via coordinates as requested, before snapping.
    pub via_points: Vec<Coordinate>,
}

impl ComputedRoute {
    /// Zero-length route sitting on a single node.
    pub fn single(node: Node, mode: RoutingMode) -> Self {
        Self {
            mode,
            nodes: vec![node],
            edges: Vec::new(),
            total_distance: 0.0,
            total_cost: 0.0,
            estimated_duration: 0.0,
            elevation_gain: 0.0,
            elevation_loss: 0.0,
            coordinates: vec![node.coordinate()],
            via_points: Vec::new(),
        }
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id).collect()
    }

    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn goal(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Append a segment that starts where this route ends.
    ///
    /// The segment's first node and first coordinate duplicate this route's last
    /// ones and are dropped; totals are summed.
    pub fn append(&mut self, segment: ComputedRoute) {
        self.nodes.extend(segment.nodes.into_iter().skip(1));
        for point in segment.coordinates.into_iter().skip(1) {
            push_point(&mut self.coordinates, point);
        }
        self.edges.extend(segment.edges);
        self.total_distance += segment.total_distance;
        self.total_cost += segment.total_cost;
        self.elevation_gain += segment.elevation_gain;
        self.elevation_loss += segment.elevation_loss;
        self.estimated_duration = self.total_cost / self.mode.base_speed_mps();
    }
}

/// Find the lowest-cost path from `from` to `to` with A*.
///
/// The heuristic is the great-circle distance to the goal. Edge costs below
/// 1.0 per metre (gentle descents) make it only approximately admissible, so
/// the result can exceed the optimum by a small margin on long descents.
///
/// The open set may hold several entries for one node; entries for nodes that
/// were already expanded are skipped when popped.
pub fn find_path<G>(graph: &G, from: &Node, to: &Node, mode: RoutingMode) -> Result<ComputedRoute>
where
    G: GraphSource + ?Sized,
{
    if from.id == to.id {
        return Ok(ComputedRoute::single(*from, mode));
    }

    let goal = to.coordinate();
    let mut known: HashMap<NodeId, Node> = HashMap::from([(from.id, *from), (to.id, *to)]);
    let mut g_score: HashMap<NodeId, f64> = HashMap::from([(from.id, 0.0)]);
    let mut came_from: HashMap<NodeId, Step> = HashMap::new();
    let mut closed: HashSet<NodeId> = HashSet::new();
    let mut open = MinHeap::new();
    open.insert(OpenEntry::new(
        from.id,
        0.0,
        haversine_distance(from.coordinate(), goal),
    ));

    while let Some(entry) = open.extract_min() {
        if entry.node == to.id {
            debug!(
                expanded = closed.len(),
                cost = entry.cost.0,
                "a* reached goal"
            );
            return reconstruct(&came_from, &known, from, to, mode);
        }
        if !closed.insert(entry.node) {
            continue;
        }

        let current_g = g_score.get(&entry.node).copied().unwrap_or(f64::INFINITY);
        for edge in graph.edges_from(entry.node)? {
            let Some(direction) = edge.direction_from(entry.node) else {
                continue;
            };
            let cost = edge.cost_in(direction);
            if !cost.is_finite() || cost < 0.0 || !mode.permits(&edge) {
                continue;
            }

            let next = edge.target(direction);
            if closed.contains(&next) {
                continue;
            }

            let tentative = current_g + cost;
            if tentative >= g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            let Some(next_node) = resolve_node(graph, &mut known, next)? else {
                warn!(edge = edge.id, node = next, "edge references a missing node");
                continue;
            };

            g_score.insert(next, tentative);
            open.insert(OpenEntry::new(
                next,
                tentative,
                haversine_distance(next_node.coordinate(), goal),
            ));
            came_from.insert(
                next,
                Step {
                    previous: entry.node,
                    edge,
                    direction,
                },
            );
        }
    }

    debug!(expanded = closed.len(), "a* exhausted the open set");
    Err(Error::RouteNotFound {
        start: from.id,
        goal: to.id,
    })
}

struct Step {
    previous: NodeId,
    edge: Edge,
    direction: Direction,
}

fn resolve_node<G>(graph: &G, known: &mut HashMap<NodeId, Node>, id: NodeId) -> Result<Option<Node>>
where
    G: GraphSource + ?Sized,
{
    if let Some(node) = known.get(&id) {
        return Ok(Some(*node));
    }
    let node = graph.node(id)?;
    if let Some(node) = node {
        known.insert(id, node);
    }
    Ok(node)
}

fn reconstruct(
    came_from: &HashMap<NodeId, Step>,
    known: &HashMap<NodeId, Node>,
    from: &Node,
    to: &Node,
    mode: RoutingMode,
) -> Result<ComputedRoute> {
    let not_found = || Error::RouteNotFound {
        start: from.id,
        goal: to.id,
    };

    let mut steps = Vec::new();
    let mut current = to.id;
    while current != from.id {
        let step = came_from.get(&current).ok_or_else(not_found)?;
        steps.push((current, step));
        current = step.previous;
    }
    steps.reverse();

    let mut route = ComputedRoute::single(*from, mode);
    for (node_id, step) in steps {
        let node = known.get(&node_id).copied().ok_or_else(not_found)?;
        let (gain, loss) = step.edge.elevation_in(step.direction);

        for point in step.edge.geometry_in(step.direction) {
            push_point(&mut route.coordinates, point);
        }
        push_point(&mut route.coordinates, node.coordinate());

        route.total_distance += step.edge.distance;
        route.total_cost += step.edge.cost_in(step.direction);
        route.elevation_gain += gain;
        route.elevation_loss += loss;
        route.nodes.push(node);
        route.edges.push(TraversedEdge {
            edge: step.edge.clone(),
            direction: step.direction,
        });
    }
    route.estimated_duration = route.total_cost / mode.base_speed_mps();
    Ok(route)
}

fn push_point(points: &mut Vec<Coordinate>, point: Coordinate) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct OpenEntry {
    node: NodeId,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl OpenEntry {
    fn new(node: NodeId, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.estimate
            .cmp(&other.estimate)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
