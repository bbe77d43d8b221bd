//! Trails command: list classified trail segments inside a bounding box.

use std::path::Path;

use anyhow::{Context, Result};

use trailroute_lib::{trails_to_geojson, BoundingBox};

use trailroute_cli::output::{trails_text, write_json, write_text, OutputFormat};
use trailroute_cli::terminal::ColorPalette;

use crate::commands::open_store;

/// Parse `SOUTH,WEST,NORTH,EAST` in degrees.
pub fn parse_bbox(value: &str) -> Result<BoundingBox, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("invalid bounding box '{value}'; expected SOUTH,WEST,NORTH,EAST"))?;
    let [south, west, north, east] = parts[..] else {
        return Err(format!(
            "invalid bounding box '{value}'; expected four values SOUTH,WEST,NORTH,EAST"
        ));
    };
    if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
        return Err(format!("latitude out of range in '{value}'"));
    }
    if west > east {
        return Err(format!(
            "west edge {west} is east of {east}; boxes crossing the antimeridian are not supported"
        ));
    }
    Ok(BoundingBox::new(north, south, east, west))
}

pub fn handle_trails_command(
    graph: Option<&Path>,
    format: OutputFormat,
    bbox: &BoundingBox,
) -> Result<()> {
    let store = open_store(graph)?;
    let segments = store.get_edges_in_bounding_box(bbox)?;

    let written = match format {
        OutputFormat::Text => write_text(&trails_text(&segments, &ColorPalette::detect())),
        OutputFormat::Json => write_json(&segments),
        OutputFormat::Geojson => write_json(&trails_to_geojson(&segments)),
    };
    written.context("failed to write trail output")
}
