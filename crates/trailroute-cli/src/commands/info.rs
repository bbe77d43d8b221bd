//! Info command: describe the resolved trail graph.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use trailroute_cli::output::{info_text, write_json, write_text, OutputFormat};
use trailroute_cli::terminal::ColorPalette;

use crate::commands::open_store;

pub fn handle_info_command(graph: Option<&Path>, format: OutputFormat) -> Result<()> {
    let store = open_store(graph)?;
    let info = store.info()?;
    let bounds = store.bounds()?;

    let written = match format {
        OutputFormat::Text => write_text(&info_text(&info, &ColorPalette::detect())),
        OutputFormat::Json => write_json(&json!({ "graph": info, "bounds": bounds })),
        OutputFormat::Geojson => {
            let geometry = bounds.map(|b| {
                json!({
                    "type": "Polygon",
                    "coordinates": [[
                        [b.west, b.south],
                        [b.east, b.south],
                        [b.east, b.north],
                        [b.west, b.north],
                        [b.west, b.south],
                    ]],
                })
            });
            write_json(&json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": info,
            }))
        }
    };
    written.context("failed to write graph info")
}
