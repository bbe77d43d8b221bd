//! Traversal profiles and the effort cost model.
//!
//! The graph build pipeline stores a precomputed `cost` and `reverse_cost` on
//! every edge using [`CostModel`]; the engine itself only reads those values and
//! applies the passability rules of the active [`RoutingMode`]. Multipliers are
//! compiled `match` tables keyed by the enums parsed from OSM tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Surface, TrailClass};

/// Traversal profile for a route query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    #[default]
    Hiking,
    Cycling,
}

impl RoutingMode {
    /// Sustained speed on flat, well-surfaced trail in metres per second. Route
    /// duration is the total effort cost divided by this speed.
    pub const fn base_speed_mps(self) -> f64 {
        match self {
            RoutingMode::Hiking => 1.25,
            RoutingMode::Cycling => 4.0,
        }
    }

    /// Whether an edge may be used at all in this mode, independent of its cost.
    pub fn permits(self, edge: &Edge) -> bool {
        match self {
            RoutingMode::Hiking => true,
            RoutingMode::Cycling => edge.trail_class() != Some(TrailClass::Steps),
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RoutingMode::Hiking => "hiking",
            RoutingMode::Cycling => "cycling",
        };
        f.write_str(value)
    }
}

impl FromStr for RoutingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hiking" | "hike" | "walking" => Ok(RoutingMode::Hiking),
            "cycling" | "bike" | "bicycle" => Ok(RoutingMode::Cycling),
            other => Err(format!("unknown routing mode '{other}'")),
        }
    }
}

/// Forward and reverse traversal cost of one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCosts {
    pub forward: f64,
    pub reverse: f64,
}

/// Inputs the cost model needs for one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProfile {
    pub distance: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub surface: Surface,
    pub trail_class: Option<TrailClass>,
}

/// Effort cost model: distance scaled by surface, trail-class and slope
/// multipliers.
///
/// Surface and trail-class multipliers are never below 1.0. The slope multiplier
/// drops below 1.0 on gentle descents, which makes the haversine heuristic only
/// approximately admissible on such edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    mode: RoutingMode,
}

impl CostModel {
    pub const fn new(mode: RoutingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// Compute both directional costs for an edge.
    pub fn edge_costs(&self, profile: &EdgeProfile) -> EdgeCosts {
        if profile.trail_class == Some(TrailClass::Steps) && self.mode == RoutingMode::Cycling {
            return EdgeCosts {
                forward: f64::INFINITY,
                reverse: f64::INFINITY,
            };
        }
        if profile.distance <= 0.0 {
            return EdgeCosts {
                forward: 0.0,
                reverse: 0.0,
            };
        }

        let base = profile.distance
            * self.surface_multiplier(profile.surface)
            * self.class_multiplier(profile.trail_class);
        let net_climb = profile.elevation_gain - profile.elevation_loss;
        let grade = net_climb / profile.distance;

        EdgeCosts {
            forward: base * self.slope_multiplier(grade),
            reverse: base * self.slope_multiplier(-grade),
        }
    }

    pub fn surface_multiplier(&self, surface: Surface) -> f64 {
        match (self.mode, surface) {
            (_, Surface::Paved) | (_, Surface::Wood) => 1.0,
            (RoutingMode::Hiking, Surface::Gravel) => 1.0,
            (RoutingMode::Hiking, Surface::Ground) => 1.05,
            (RoutingMode::Hiking, Surface::Grass) => 1.1,
            (RoutingMode::Hiking, Surface::Rock) => 1.3,
            (RoutingMode::Hiking, Surface::Sand) => 1.4,
            (RoutingMode::Hiking, Surface::Mud) => 1.5,
            (RoutingMode::Hiking, Surface::Unknown) => 1.1,
            (RoutingMode::Cycling, Surface::Gravel) => 1.2,
            (RoutingMode::Cycling, Surface::Ground) => 1.3,
            (RoutingMode::Cycling, Surface::Grass) => 1.5,
            (RoutingMode::Cycling, Surface::Rock) => 2.0,
            (RoutingMode::Cycling, Surface::Sand) => 2.5,
            (RoutingMode::Cycling, Surface::Mud) => 2.5,
            (RoutingMode::Cycling, Surface::Unknown) => 1.3,
        }
    }

    pub fn class_multiplier(&self, class: Option<TrailClass>) -> f64 {
        let Some(class) = class else {
            return 1.2;
        };
        match (self.mode, class) {
            (RoutingMode::Hiking, TrailClass::Path | TrailClass::Footway) => 1.0,
            (RoutingMode::Hiking, TrailClass::Track | TrailClass::Bridleway) => 1.0,
            (RoutingMode::Hiking, TrailClass::Cycleway) => 1.1,
            (RoutingMode::Hiking, TrailClass::Steps) => 1.5,
            (RoutingMode::Hiking, TrailClass::Road) => 1.2,
            (RoutingMode::Hiking, TrailClass::Other) => 1.1,
            (RoutingMode::Cycling, TrailClass::Cycleway) => 1.0,
            (RoutingMode::Cycling, TrailClass::Track | TrailClass::Road) => 1.1,
            (RoutingMode::Cycling, TrailClass::Path | TrailClass::Bridleway) => 1.3,
            (RoutingMode::Cycling, TrailClass::Footway) => 1.5,
            (RoutingMode::Cycling, TrailClass::Other) => 1.3,
            (RoutingMode::Cycling, TrailClass::Steps) => f64::INFINITY,
        }
    }

    /// Multiplier for a signed grade (rise over run) in the direction of travel.
    pub fn slope_multiplier(&self, grade: f64) -> f64 {
        let (climb, gentle_limit, steep_penalty) = match self.mode {
            RoutingMode::Hiking => (8.0, 0.12, 4.0),
            RoutingMode::Cycling => (12.0, 0.08, 5.0),
        };

        if grade >= 0.0 {
            1.0 + climb * grade
        } else {
            let descent = -grade;
            if descent <= gentle_limit {
                1.0 - descent * (0.12 / gentle_limit)
            } else {
                0.88 + (descent - gentle_limit) * steep_penalty
            }
        }
    }
}
