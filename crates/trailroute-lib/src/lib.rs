//! Trailroute library entry points.
//!
//! This crate reads a pre-built trail graph from SQLite, snaps coordinates onto
//! it, and computes hiking or cycling routes with A* through optional via
//! points. Higher-level consumers (the CLI) should only depend on the items
//! exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod codec;
pub mod cost;
pub mod dataset;
pub mod db;
pub mod error;
pub mod geo;
pub mod graph;
pub mod heap;
pub mod output;
pub mod path;
pub mod routing;

pub use cost::{CostModel, EdgeCosts, EdgeProfile, RoutingMode};
pub use dataset::{default_graph_path, resolve_graph_path, GRAPH_PATH_ENV};
pub use db::{GraphInfo, GraphStore, SnapResult, TrailSegment};
pub use error::{Error, Result};
pub use geo::{haversine_distance, BoundingBox, Coordinate, ParseCoordinateError};
pub use graph::{Direction, Edge, EdgeId, GraphSource, Node, NodeId, Surface, TrailClass};
pub use heap::{FloatOrd, MinHeap};
pub use output::{format_duration, route_to_geojson, trails_to_geojson, RouteSummary};
pub use path::{find_path, ComputedRoute, TraversedEdge};
pub use routing::{
    find_route, RouteRequest, RouterConfig, SnapStrategy, DEFAULT_SEARCH_RADIUS_M,
};
