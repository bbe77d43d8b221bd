//! Route command handler for computing trail routes through optional stops.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;

use trailroute_lib::{
    find_route, route_to_geojson, Coordinate, Error as RouteError, RouteRequest, RouteSummary,
    RouterConfig, RoutingMode, SnapStrategy,
};

use trailroute_cli::output::{route_text, write_json, write_text, OutputFormat};
use trailroute_cli::terminal::ColorPalette;

use crate::commands::open_store;

/// How waypoints are attached to the graph, as accepted by `--snap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SnapArg {
    /// Nearest trail junction.
    #[default]
    Junction,
    /// Nearest point on any trail, entering at the closer end of that trail.
    Trail,
}

impl From<SnapArg> for SnapStrategy {
    fn from(value: SnapArg) -> Self {
        match value {
            SnapArg::Junction => SnapStrategy::Junction,
            SnapArg::Trail => SnapStrategy::Trail,
        }
    }
}

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Intermediate stops, visited in order.
    pub via: Vec<Coordinate>,
    pub mode: RoutingMode,
    /// Snapping radius in metres.
    pub radius: f64,
    pub snap: SnapArg,
}

impl RouteCommandArgs {
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest::new(self.from, self.to, self.mode).with_via(self.via.iter().copied())
    }

    pub fn to_config(&self) -> RouterConfig {
        RouterConfig {
            search_radius_m: self.radius,
            snap: self.snap.into(),
        }
    }
}

/// Handle the route subcommand.
pub fn handle_route_command(
    graph: Option<&Path>,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let store = open_store(graph)?;
    let request = args.to_request();

    let route = match find_route(&store, &request, &args.to_config()) {
        Ok(route) => route,
        Err(err) => return Err(handle_route_failure(args, err)),
    };

    let written = match format {
        OutputFormat::Text => {
            let summary = RouteSummary::from_route(&route);
            write_text(&route_text(&summary, &ColorPalette::detect()))
        }
        OutputFormat::Json => write_json(&RouteSummary::from_route(&route)),
        OutputFormat::Geojson => write_json(&route_to_geojson(&route)),
    };
    written.context("failed to write route output")
}

fn handle_route_failure(args: &RouteCommandArgs, err: RouteError) -> anyhow::Error {
    match err {
        RouteError::NoNearbyNode { coordinate } => {
            anyhow!(format_unsnapped_message(
                &format!("No trail within {:.0} m of {coordinate}.", args.radius),
                args
            ))
        }
        RouteError::ViaPointUnreachable { index, coordinate } => {
            anyhow!(format_unsnapped_message(
                &format!(
                    "Via-point {} ({coordinate}) is more than {:.0} m from any trail.",
                    index + 1,
                    args.radius
                ),
                args
            ))
        }
        RouteError::RouteNotFound { start, goal } => {
            anyhow!(format_route_not_found_message(start, goal, args.mode))
        }
        other => anyhow::Error::new(other),
    }
}

fn format_unsnapped_message(lead: &str, args: &RouteCommandArgs) -> String {
    let mut tips = vec!["increasing --radius"];
    if args.snap == SnapArg::Junction {
        tips.push("using --snap trail");
    }
    format!("{lead} Try {}.", tips.join(" or "))
}

fn format_route_not_found_message(start: i64, goal: i64, mode: RoutingMode) -> String {
    let mut message = format!("No {mode} route found between node {start} and node {goal}.");
    message.push_str(" The points may lie on disconnected trail networks");
    if mode == RoutingMode::Cycling {
        message.push_str("; steps are not rideable, try --mode hiking");
    }
    message.push('.');
    message
}
