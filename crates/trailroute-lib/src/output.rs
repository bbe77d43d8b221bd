use serde::Serialize;
use serde_json::{json, Value};

use crate::cost::RoutingMode;
use crate::db::TrailSegment;
use crate::geo::Coordinate;
use crate::graph::NodeId;
use crate::path::ComputedRoute;

/// Compact, serialisable digest of a [`ComputedRoute`] without per-edge detail.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub mode: RoutingMode,
    pub start: Option<NodeId>,
    pub goal: Option<NodeId>,
    pub nodes: Vec<NodeId>,
    pub edge_count: usize,
    pub distance_m: f64,
    pub cost: f64,
    pub duration_s: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    /// Named trails in walking order, consecutive repeats merged.
    pub trails: Vec<String>,
    pub via_points: Vec<Coordinate>,
}

impl RouteSummary {
    pub fn from_route(route: &ComputedRoute) -> Self {
        let mut trails: Vec<String> = Vec::new();
        for traversed in &route.edges {
            if let Some(name) = traversed.edge.name.as_deref() {
                if trails.last().map(String::as_str) != Some(name) {
                    trails.push(name.to_string());
                }
            }
        }

        Self {
            mode: route.mode,
            start: route.start().map(|node| node.id),
            goal: route.goal().map(|node| node.id),
            nodes: route.node_ids(),
            edge_count: route.edges.len(),
            distance_m: route.total_distance,
            cost: route.total_cost,
            duration_s: route.estimated_duration,
            elevation_gain_m: route.elevation_gain,
            elevation_loss_m: route.elevation_loss,
            trails,
            via_points: route.via_points.clone(),
        }
    }
}

/// GeoJSON `Feature` with a `LineString` of the route polyline
/// (`[longitude, latitude]` order) and the summary as properties.
pub fn route_to_geojson(route: &ComputedRoute) -> Value {
    let coordinates = lon_lat(&route.coordinates);
    let summary = RouteSummary::from_route(route);

    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        },
        "properties": {
            "mode": summary.mode,
            "distance_m": summary.distance_m,
            "duration_s": summary.duration_s,
            "elevation_gain_m": summary.elevation_gain_m,
            "elevation_loss_m": summary.elevation_loss_m,
            "trails": summary.trails,
            "nodes": summary.nodes,
        },
    })
}

/// GeoJSON `FeatureCollection` with one `LineString` per trail segment, for
/// map overlays.
pub fn trails_to_geojson(segments: &[TrailSegment]) -> Value {
    let features: Vec<Value> = segments
        .iter()
        .map(|segment| {
            json!({
                "type": "Feature",
                "id": segment.edge_id,
                "geometry": {
                    "type": "LineString",
                    "coordinates": lon_lat(&segment.coordinates),
                },
                "properties": {
                    "name": segment.name,
                    "highway": segment.highway_type,
                    "surface": segment.surface,
                    "sac_scale": segment.sac_scale,
                    "trail_visibility": segment.trail_visibility,
                    "oneway": segment.is_oneway,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn lon_lat(points: &[Coordinate]) -> Vec<[f64; 2]> {
    points.iter().map(|c| [c.longitude, c.latitude]).collect()
}

/// Render seconds as `1h 05m`, or `12m` under an hour.
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds.max(0.0) / 60.0).round() as u64;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}
