use serde::Serialize;

use crate::error::Result;
use crate::geo::Coordinate;

/// Numeric identifier for a graph vertex.
pub type NodeId = i64;

/// Numeric identifier for a trail segment.
pub type EdgeId = i64;

/// A trail junction or shape point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in metres, when the build pipeline could sample one.
    pub elevation: Option<f64>,
}

impl Node {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Direction in which an edge is walked relative to its stored orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From `from_node` to `to_node`.
    Forward,
    /// From `to_node` to `from_node`.
    Reverse,
}

/// A traversable trail segment between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from_node: NodeId,
    pub to_node: NodeId,
    /// Length in metres, including intermediate geometry.
    pub distance: f64,
    /// Metres climbed walking forward.
    pub elevation_gain: f64,
    /// Metres descended walking forward.
    pub elevation_loss: f64,
    pub surface: Option<String>,
    /// OSM `highway` tag; `None` for unclassified segments.
    pub highway_type: Option<String>,
    pub sac_scale: Option<String>,
    pub trail_visibility: Option<String>,
    pub name: Option<String>,
    pub source_way_id: Option<i64>,
    /// Effort cost walking forward; `f64::INFINITY` when impassable.
    pub cost: f64,
    /// Effort cost walking in reverse; `f64::INFINITY` when impassable.
    pub reverse_cost: f64,
    pub is_oneway: bool,
    /// Intermediate points from `from_node` to `to_node`, endpoints excluded.
    pub geometry: Vec<Coordinate>,
}

impl Edge {
    /// Direction of travel when leaving `node`, or `None` if `node` is not an
    /// endpoint or the edge may not be left from it.
    pub fn direction_from(&self, node: NodeId) -> Option<Direction> {
        if node == self.from_node {
            Some(Direction::Forward)
        } else if node == self.to_node && !self.is_oneway {
            Some(Direction::Reverse)
        } else {
            None
        }
    }

    pub fn cost_in(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Forward => self.cost,
            Direction::Reverse => self.reverse_cost,
        }
    }

    /// Node reached after walking the edge in `direction`.
    pub fn target(&self, direction: Direction) -> NodeId {
        match direction {
            Direction::Forward => self.to_node,
            Direction::Reverse => self.from_node,
        }
    }

    /// Elevation `(gain, loss)` experienced walking in `direction`.
    pub fn elevation_in(&self, direction: Direction) -> (f64, f64) {
        match direction {
            Direction::Forward => (self.elevation_gain, self.elevation_loss),
            Direction::Reverse => (self.elevation_loss, self.elevation_gain),
        }
    }

    /// Intermediate geometry in walking order.
    pub fn geometry_in(&self, direction: Direction) -> Vec<Coordinate> {
        match direction {
            Direction::Forward => self.geometry.clone(),
            Direction::Reverse => self.geometry.iter().rev().copied().collect(),
        }
    }

    pub fn trail_class(&self) -> Option<TrailClass> {
        self.highway_type.as_deref().map(TrailClass::from_tag)
    }

    pub fn surface_kind(&self) -> Surface {
        self.surface
            .as_deref()
            .map(Surface::from_tag)
            .unwrap_or(Surface::Unknown)
    }
}

/// Trail classification derived from the OSM `highway` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailClass {
    Path,
    Footway,
    Track,
    Bridleway,
    Cycleway,
    Steps,
    Road,
    Other,
}

impl TrailClass {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "path" => TrailClass::Path,
            "footway" | "pedestrian" => TrailClass::Footway,
            "track" => TrailClass::Track,
            "bridleway" => TrailClass::Bridleway,
            "cycleway" => TrailClass::Cycleway,
            "steps" => TrailClass::Steps,
            "residential" | "unclassified" | "service" | "tertiary" | "secondary"
            | "living_street" => TrailClass::Road,
            _ => TrailClass::Other,
        }
    }
}

/// Surface category derived from the OSM `surface` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Paved,
    Wood,
    Gravel,
    Ground,
    Grass,
    Rock,
    Sand,
    Mud,
    Unknown,
}

impl Surface {
    pub const ALL: [Surface; 9] = [
        Surface::Paved,
        Surface::Wood,
        Surface::Gravel,
        Surface::Ground,
        Surface::Grass,
        Surface::Rock,
        Surface::Sand,
        Surface::Mud,
        Surface::Unknown,
    ];

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "asphalt" | "paved" | "concrete" | "paving_stones" | "sett" | "chipseal" => {
                Surface::Paved
            }
            "wood" | "boardwalk" => Surface::Wood,
            "compacted" | "fine_gravel" | "gravel" | "pebblestone" => Surface::Gravel,
            "dirt" | "earth" | "ground" | "unpaved" => Surface::Ground,
            "grass" => Surface::Grass,
            "rock" | "stone" | "scree" => Surface::Rock,
            "sand" => Surface::Sand,
            "mud" => Surface::Mud,
            _ => Surface::Unknown,
        }
    }
}

/// Read access to a trail graph, as needed by the pathfinder.
pub trait GraphSource {
    /// Look up a single node.
    fn node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Edges usable as outgoing from `node`: forward edges plus the reverse of
    /// every edge ending at `node` that is not one-way.
    fn edges_from(&self, node: NodeId) -> Result<Vec<Edge>>;
}
