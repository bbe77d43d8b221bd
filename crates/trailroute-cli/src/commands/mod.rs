// Module exports for CLI subcommands.
//
// Each module handles one subcommand; main.rs parses arguments and dispatches.

pub mod info;
pub mod nearest;
pub mod route;
pub mod trails;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use trailroute_lib::{resolve_graph_path, Error as LibError, GraphStore, GRAPH_PATH_ENV};

/// Resolve and open the trail graph, turning a missing file into an actionable
/// message.
pub fn open_store(graph: Option<&Path>) -> Result<GraphStore> {
    let path = resolve_graph_path(graph).context("failed to resolve the trail graph location")?;
    debug!(path = %path.display(), "opening trail graph");

    GraphStore::open_path(&path).map_err(|err| match err {
        LibError::NoRoutingData { .. } => anyhow!(
            "No routing data at {}. Pass --graph PATH or set {} to a trail graph database.",
            path.display(),
            GRAPH_PATH_ENV
        ),
        LibError::UnsupportedSchema { missing } => anyhow!(
            "{} is not a trail graph (missing {}).",
            path.display(),
            missing
        ),
        other => anyhow::Error::new(other)
            .context(format!("failed to open trail graph {}", path.display())),
    })
}
