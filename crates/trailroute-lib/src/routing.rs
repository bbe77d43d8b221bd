//! Multi-stop route composition.
//!
//! A [`RouteRequest`] names a start, a goal and any number of ordered via
//! coordinates. [`find_route`] snaps each waypoint onto the graph, runs
//! [`find_path`] between consecutive snapped nodes, and stitches the segments
//! into one [`ComputedRoute`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use trailroute_lib::{find_route, Coordinate, GraphStore, RouteRequest, RouterConfig, RoutingMode};
//!
//! # fn main() -> trailroute_lib::Result<()> {
//! let store = GraphStore::open_path(Path::new("trails.db"))?;
//! let request = RouteRequest::new(
//!     Coordinate::new(46.5575, 7.9815),
//!     Coordinate::new(46.5772, 8.0053),
//!     RoutingMode::Hiking,
//! );
//! let route = find_route(&store, &request, &RouterConfig::default())?;
//! println!("{:.0} m", route.total_distance);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cost::RoutingMode;
use crate::db::GraphStore;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::Node;
use crate::path::{find_path, ComputedRoute};

/// Default snapping radius in metres.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 500.0;

/// How waypoints are mapped onto graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapStrategy {
    /// Nearest junction node within the radius.
    #[default]
    Junction,
    /// Nearest trail within the radius, entering the graph at the closer
    /// endpoint of that trail.
    Trail,
}

impl fmt::Display for SnapStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SnapStrategy::Junction => "junction",
            SnapStrategy::Trail => "trail",
        };
        f.write_str(value)
    }
}

/// Tunables for route composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterConfig {
    /// Maximum distance in metres between a waypoint and its snapped node.
    pub search_radius_m: f64,
    pub snap: SnapStrategy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            snap: SnapStrategy::Junction,
        }
    }
}

/// A routing query between two coordinates through optional via points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from: Coordinate,
    pub to: Coordinate,
    #[serde(default)]
    pub via: Vec<Coordinate>,
    #[serde(default)]
    pub mode: RoutingMode,
}

impl RouteRequest {
    pub fn new(from: Coordinate, to: Coordinate, mode: RoutingMode) -> Self {
        Self {
            from,
            to,
            via: Vec::new(),
            mode,
        }
    }

    pub fn with_via(mut self, via: impl IntoIterator<Item = Coordinate>) -> Self {
        self.via.extend(via);
        self
    }

    /// `[from] + via + [to]`.
    pub fn waypoints(&self) -> Vec<Coordinate> {
        let mut waypoints = Vec::with_capacity(self.via.len() + 2);
        waypoints.push(self.from);
        waypoints.extend_from_slice(&self.via);
        waypoints.push(self.to);
        waypoints
    }
}

/// Compute a route through every waypoint of `request`, in order.
///
/// Each waypoint is snapped independently. Consecutive waypoints that snap to
/// the same node produce no segment. Any failing segment fails the whole route.
pub fn find_route(
    store: &GraphStore,
    request: &RouteRequest,
    config: &RouterConfig,
) -> Result<ComputedRoute> {
    let snapped = snap_waypoints(store, request, config)?;

    let mut route: Option<ComputedRoute> = None;
    for (index, pair) in snapped.windows(2).enumerate() {
        let (from, to) = (&pair[0], &pair[1]);
        if from.id == to.id {
            debug!(segment = index, node = from.id, "skipping zero-length segment");
            continue;
        }

        let segment = find_path(store, from, to, request.mode)?;
        debug!(
            segment = index,
            from = from.id,
            to = to.id,
            distance = segment.total_distance,
            "routed segment"
        );
        route = Some(match route.take() {
            Some(mut composed) => {
                composed.append(segment);
                composed
            }
            None => segment,
        });
    }

    let mut route = match route {
        Some(route) => route,
        None => ComputedRoute::single(snapped[0], request.mode),
    };
    route.via_points = request.via.clone();

    info!(
        mode = %request.mode,
        stops = snapped.len(),
        distance_m = route.total_distance,
        duration_s = route.estimated_duration,
        "computed route"
    );
    Ok(route)
}

fn snap_waypoints(
    store: &GraphStore,
    request: &RouteRequest,
    config: &RouterConfig,
) -> Result<Vec<Node>> {
    let waypoints = request.waypoints();
    let last = waypoints.len() - 1;

    waypoints
        .iter()
        .enumerate()
        .map(|(index, &coordinate)| {
            snap(store, coordinate, config)?.ok_or_else(|| {
                if index == 0 || index == last {
                    Error::NoNearbyNode { coordinate }
                } else {
                    Error::ViaPointUnreachable {
                        index: index - 1,
                        coordinate,
                    }
                }
            })
        })
        .collect()
}

fn snap(store: &GraphStore, coordinate: Coordinate, config: &RouterConfig) -> Result<Option<Node>> {
    match config.snap {
        SnapStrategy::Junction => store.nearest_node(coordinate, config.search_radius_m),
        SnapStrategy::Trail => Ok(store
            .nearest_trail_point(coordinate, config.search_radius_m)?
            .map(|snap| snap.node)),
    }
}
