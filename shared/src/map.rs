//! Map geometry: [`MapDescriptor`], the static collision polygons it carries, and spawn
//! points. Loaded once at startup by a catalog external to this crate (see the `server`
//! crate's `map_catalog` module) and treated as immutable thereafter.

use serde::{Deserialize, Serialize};

/// A single static collision obstacle, given as its vertex list.
///
/// Only the polygon's axis-aligned bounding rectangle is ever used for collision
/// (see `shared::simulation`); the vertices themselves are carried for rendering and
/// for computing that bounding rectangle, not for exact polygon intersection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polygon {
    pub points: Vec<(f32, f32)>,
}

impl Polygon {
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self { points }
    }

    /// Axis-aligned bounding rectangle `(min_x, min_y, max_x, max_y)` of this polygon's
    /// vertices. Panics if `points` is empty — an empty polygon is a malformed map.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for &(x, y) in &self.points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        (min_x, min_y, max_x, max_y)
    }
}

/// An immutable description of one map: identity, world size, static obstacles, and
/// the spawn points new players cycle through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapDescriptor {
    pub id: String,
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub objects: Vec<Polygon>,
    pub spawn_points: Vec<(f32, f32)>,
}

impl MapDescriptor {
    /// Builds a map descriptor. Panics if `spawn_points` is empty: a map with no spawn
    /// points has no well-defined spawn assignment and is a configuration error, not a
    /// runtime condition to recover from.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        width: f32,
        height: f32,
        objects: Vec<Polygon>,
        spawn_points: Vec<(f32, f32)>,
    ) -> Self {
        assert!(
            !spawn_points.is_empty(),
            "map must have at least one spawn point"
        );
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            objects,
            spawn_points,
        }
    }

    /// Spawn point for the `n`-th player to join this map, cycling deterministically
    /// through `spawn_points`.
    pub fn spawn_point_for(&self, player_index: usize) -> (f32, f32) {
        self.spawn_points[player_index % self.spawn_points.len()]
    }
}
