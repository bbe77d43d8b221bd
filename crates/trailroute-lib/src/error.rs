use std::path::PathBuf;

use thiserror::Error;

use crate::geo::Coordinate;
use crate::graph::NodeId;

/// Convenient result alias for the trail-routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The store has no open graph: it was never opened, was closed, or the
    /// backing file does not exist.
    #[error("no routing data available{}", format_path(.path))]
    NoRoutingData { path: Option<PathBuf> },

    /// The file opened but does not carry the expected graph tables.
    #[error("unsupported graph schema; missing {missing}")]
    UnsupportedSchema { missing: String },

    /// Raised when a route endpoint has no graph node within the search radius.
    #[error("no nearby node at endpoint {coordinate}")]
    NoNearbyNode { coordinate: Coordinate },

    /// Raised when an intermediate stop has no graph node within the search radius.
    #[error("via-point {index} not reachable ({coordinate})")]
    ViaPointUnreachable { index: usize, coordinate: Coordinate },

    /// Raised when the search exhausted every reachable node without meeting the goal.
    #[error("no route found between node {start} and node {goal}")]
    RouteNotFound { start: NodeId, goal: NodeId },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the default graph location")]
    ProjectDirsUnavailable,

    /// Wrapper for SQLite errors.
    #[error("graph store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn no_data() -> Self {
        Error::NoRoutingData { path: None }
    }
}

fn format_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" at {}", path.display()),
        None => String::new(),
    }
}
