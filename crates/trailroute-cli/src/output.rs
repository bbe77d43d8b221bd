//! Output formatting for command results.
//!
//! Text renderers build a `String` so they can be tested without capturing
//! stdout; JSON and GeoJSON go straight to stdout.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use trailroute_lib::{format_duration, GraphInfo, Node, RouteSummary, SnapResult, TrailSegment};

use crate::terminal::{arrow, format_distance, format_with_separators, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// GeoJSON geometry for map tools.
    Geojson,
}

/// Write any serialisable value to stdout as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Print pre-rendered text to stdout.
pub fn write_text(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

pub fn route_text(summary: &RouteSummary, palette: &ColorPalette) -> String {
    let p = palette;
    let mut out = String::new();

    let endpoints = match (summary.start, summary.goal) {
        (Some(start), Some(goal)) => format!("node {start} to node {goal}"),
        _ => "unknown endpoints".to_string(),
    };
    let _ = writeln!(
        out,
        "{}Route from {} ({}; {} segments){}",
        p.heading, endpoints, summary.mode, summary.edge_count, p.reset
    );
    let _ = writeln!(
        out,
        "{}Distance:{} {}",
        p.label,
        p.reset,
        format_distance(summary.distance_m)
    );
    let _ = writeln!(
        out,
        "{}Duration:{} {}",
        p.label,
        p.reset,
        format_duration(summary.duration_s)
    );
    let _ = writeln!(
        out,
        "{}Ascent:{} {}{} m{}  {}Descent:{} {} m",
        p.label,
        p.reset,
        p.ascent,
        format_with_separators(summary.elevation_gain_m.round().max(0.0) as u64),
        p.reset,
        p.label,
        p.reset,
        format_with_separators(summary.elevation_loss_m.round().max(0.0) as u64),
    );
    if !summary.via_points.is_empty() {
        let via: Vec<String> = summary.via_points.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "{}Via:{} {}", p.label, p.reset, via.join("; "));
    }
    if !summary.trails.is_empty() {
        let trails: Vec<String> = summary
            .trails
            .iter()
            .map(|name| format!("{}{}{}", p.trail, name, p.reset))
            .collect();
        let _ = writeln!(out, "{}Trails:{} {}", p.label, p.reset, trails.join(arrow()));
    }
    out
}

pub fn nearest_node_text(node: &Node, distance_m: f64, palette: &ColorPalette) -> String {
    let p = palette;
    format!(
        "Nearest node {} at {}{}{} ({} away)\n",
        node.id,
        p.coordinate,
        node.coordinate(),
        p.reset,
        format_distance(distance_m)
    )
}

pub fn snap_text(snap: &SnapResult, palette: &ColorPalette) -> String {
    let p = palette;
    let name = snap.edge.name.as_deref().unwrap_or("<unnamed>");
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Nearest trail {}{}{} (edge {}), {} away at {}{}{}",
        p.trail,
        name,
        p.reset,
        snap.edge.id,
        format_distance(snap.distance_to_trail),
        p.coordinate,
        snap.point,
        p.reset
    );
    let _ = writeln!(
        out,
        "Enters the graph at node {} ({}{}{})",
        snap.node.id,
        p.coordinate,
        snap.node.coordinate(),
        p.reset
    );
    out
}

pub fn trails_text(segments: &[TrailSegment], palette: &ColorPalette) -> String {
    let p = palette;
    let mut out = String::new();
    let _ = writeln!(out, "{}{} trail segments{}", p.heading, segments.len(), p.reset);
    for segment in segments {
        let name = segment.name.as_deref().unwrap_or("<unnamed>");
        let surface = segment.surface.as_deref().unwrap_or("unknown surface");
        let _ = writeln!(
            out,
            " - {}{}{} [{}] {}, {}{}",
            p.trail,
            name,
            p.reset,
            segment.edge_id,
            segment.highway_type,
            surface,
            if segment.is_oneway { ", one-way" } else { "" }
        );
    }
    out
}

pub fn info_text(info: &GraphInfo, palette: &ColorPalette) -> String {
    let p = palette;
    let mut out = String::new();
    let path = info
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());
    let _ = writeln!(out, "{}Graph:{} {}", p.heading, p.reset, path);
    let _ = writeln!(
        out,
        "{}Nodes:{} {}",
        p.label,
        p.reset,
        format_with_separators(info.node_count)
    );
    let _ = writeln!(
        out,
        "{}Edges:{} {}",
        p.label,
        p.reset,
        format_with_separators(info.edge_count)
    );
    for (key, value) in &info.metadata {
        let _ = writeln!(out, "{}{}:{} {}", p.label, key, p.reset, value);
    }
    out
}
