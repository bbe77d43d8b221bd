use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Default filename for the trail graph inside the data directory.
const GRAPH_FILENAME: &str = "trails.db";

/// Environment variable that overrides the default graph location.
pub const GRAPH_PATH_ENV: &str = "TRAILROUTE_GRAPH";

/// Resolve the default graph location using platform-specific project directories.
pub fn default_graph_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("org", "trailroute", "trailroute").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(GRAPH_FILENAME))
}

/// Resolve which graph file to open.
///
/// Precedence: an explicit path, then the [`GRAPH_PATH_ENV`] environment
/// variable, then [`default_graph_path`]. A directory resolves to the default
/// filename inside it. The file is not required to exist; opening a missing
/// file is reported by [`crate::GraphStore::open`].
pub fn resolve_graph_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match env::var_os(GRAPH_PATH_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => default_graph_path()?,
        },
    };

    let path = if path.is_dir() {
        path.join(GRAPH_FILENAME)
    } else {
        path
    };
    debug!(path = %path.display(), "resolved graph path");
    Ok(path)
}
