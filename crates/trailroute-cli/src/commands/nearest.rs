//! Nearest command: snap a coordinate onto the graph.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::json;

use trailroute_lib::{haversine_distance, Coordinate, Node};

use trailroute_cli::output::{
    nearest_node_text, snap_text, write_json, write_text, OutputFormat,
};
use trailroute_cli::terminal::ColorPalette;

use crate::commands::open_store;

#[derive(Debug, Clone)]
pub struct NearestCommandArgs {
    pub at: Coordinate,
    /// Search radius in metres.
    pub radius: f64,
    /// Snap onto the closest trail instead of the closest junction.
    pub trail: bool,
}

#[derive(Debug, Serialize)]
struct NearestNode<'a> {
    query: Coordinate,
    node: &'a Node,
    distance_m: f64,
}

pub fn handle_nearest_command(
    graph: Option<&Path>,
    format: OutputFormat,
    args: &NearestCommandArgs,
) -> Result<()> {
    let store = open_store(graph)?;
    let not_found = || {
        anyhow!(
            "Nothing within {:.0} m of {}. Try increasing --radius.",
            args.radius,
            args.at
        )
    };

    if args.trail {
        let snap = store
            .nearest_trail_point(args.at, args.radius)?
            .ok_or_else(not_found)?;
        return match format {
            OutputFormat::Text => write_text(&snap_text(&snap, &ColorPalette::detect())),
            OutputFormat::Json => write_json(&snap),
            OutputFormat::Geojson => write_json(&point_feature(
                snap.point,
                json!({
                    "node": snap.node.id,
                    "edge": snap.edge.id,
                    "distance_m": snap.distance_to_trail,
                }),
            )),
        }
        .context("failed to write nearest-trail output");
    }

    let node = store
        .nearest_node(args.at, args.radius)?
        .ok_or_else(not_found)?;
    let distance_m = haversine_distance(args.at, node.coordinate());
    let written = match format {
        OutputFormat::Text => write_text(&nearest_node_text(
            &node,
            distance_m,
            &ColorPalette::detect(),
        )),
        OutputFormat::Json => write_json(&NearestNode {
            query: args.at,
            node: &node,
            distance_m,
        }),
        OutputFormat::Geojson => write_json(&point_feature(
            node.coordinate(),
            json!({ "node": node.id, "distance_m": distance_m }),
        )),
    };
    written.context("failed to write nearest-node output")
}

fn point_feature(point: Coordinate, properties: serde_json::Value) -> serde_json::Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [point.longitude, point.latitude],
        },
        "properties": properties,
    })
}
