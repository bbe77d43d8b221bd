mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use trailroute_cli::output::OutputFormat;
use trailroute_lib::{BoundingBox, Coordinate, RoutingMode, DEFAULT_SEARCH_RADIUS_M};

use commands::nearest::NearestCommandArgs;
use commands::route::{RouteCommandArgs, SnapArg};

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline hiking and cycling routes over a trail graph")]
struct Cli {
    /// Trail graph database, or a directory containing trails.db. Falls back
    /// to TRAILROUTE_GRAPH, then the platform data directory.
    #[arg(long, global = true)]
    graph: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a route between two coordinates, optionally through via points.
    Route {
        /// Start as LAT,LON.
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,
        /// Destination as LAT,LON.
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,
        /// Intermediate stop as LAT,LON; repeat for several, visited in order.
        #[arg(long, allow_hyphen_values = true)]
        via: Vec<Coordinate>,
        /// Travel mode (hiking or cycling).
        #[arg(long, default_value_t = RoutingMode::Hiking)]
        mode: RoutingMode,
        /// Maximum distance in metres between a waypoint and the trail network.
        #[arg(long, default_value_t = DEFAULT_SEARCH_RADIUS_M)]
        radius: f64,
        /// How waypoints attach to the graph.
        #[arg(long, value_enum, default_value_t = SnapArg::Junction)]
        snap: SnapArg,
    },
    /// Find the closest junction (or trail, with --trail) to a coordinate.
    Nearest {
        /// Query point as LAT,LON.
        #[arg(long, allow_hyphen_values = true)]
        at: Coordinate,
        /// Search radius in metres.
        #[arg(long, default_value_t = DEFAULT_SEARCH_RADIUS_M)]
        radius: f64,
        /// Snap onto the closest trail instead of the closest junction.
        #[arg(long)]
        trail: bool,
    },
    /// List classified trail segments inside a bounding box.
    Trails {
        /// Box as SOUTH,WEST,NORTH,EAST in degrees.
        #[arg(long, allow_hyphen_values = true, value_parser = commands::trails::parse_bbox)]
        bbox: BoundingBox,
    },
    /// Show counts and metadata for the trail graph.
    Info,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let graph = cli.graph.as_deref();

    match cli.command {
        Command::Route {
            from,
            to,
            via,
            mode,
            radius,
            snap,
        } => {
            let args = RouteCommandArgs {
                from,
                to,
                via,
                mode,
                radius,
                snap,
            };
            commands::route::handle_route_command(graph, cli.format, &args)
        }
        Command::Nearest { at, radius, trail } => {
            let args = NearestCommandArgs { at, radius, trail };
            commands::nearest::handle_nearest_command(graph, cli.format, &args)
        }
        Command::Trails { bbox } => {
            commands::trails::handle_trails_command(graph, cli.format, &bbox)
        }
        Command::Info => commands::info::handle_info_command(graph, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
