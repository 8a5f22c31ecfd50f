//! Map Catalog: loads [`MapDescriptor`]s from an opaque source at startup and exposes
//! lookup by id plus a first-loaded default. The real file format (YAML in the source
//! project) is out of scope; [`MapSource`] is the seam a real loader would implement.

use std::collections::HashMap;

use shared::map::{MapDescriptor, Polygon};

/// External collaborator boundary: anything that can produce a set of maps at startup.
/// The file-format loader this would normally wrap is explicitly out of scope.
pub trait MapSource {
    fn load(&self) -> Vec<MapDescriptor>;
}

/// Loads the two builtin maps. Stands in for a real YAML-backed loader.
pub struct BuiltinMaps;

impl MapSource for BuiltinMaps {
    fn load(&self) -> Vec<MapDescriptor> {
        vec![
            MapDescriptor::new(
                "m1",
                "Forest",
                800.0,
                600.0,
                vec![Polygon::new(vec![
                    (200.0, 100.0),
                    (300.0, 100.0),
                    (300.0, 200.0),
                    (200.0, 200.0),
                ])],
                vec![(100.0, 100.0), (700.0, 500.0)],
            ),
            MapDescriptor::new(
                "m2",
                "Cave",
                1000.0,
                800.0,
                vec![Polygon::new(vec![
                    (400.0, 300.0),
                    (600.0, 300.0),
                    (600.0, 500.0),
                    (400.0, 500.0),
                ])],
                vec![(50.0, 50.0), (950.0, 750.0)],
            ),
        ]
    }
}

/// `{id -> MapDescriptor}`, built once at startup, and looked up by the Instance Router
/// on every `join`. `default()` is the first-loaded map, matching the source's
/// `next(iter(loaded_maps.values()))` semantics (insertion order).
pub struct MapCatalog {
    maps: HashMap<String, MapDescriptor>,
    order: Vec<String>,
}

impl MapCatalog {
    pub fn load(source: &dyn MapSource) -> Self {
        let mut maps = HashMap::new();
        let mut order = Vec::new();
        for map in source.load() {
            order.push(map.id.clone());
            maps.insert(map.id.clone(), map);
        }
        Self { maps, order }
    }

    pub fn get(&self, id: &str) -> Option<&MapDescriptor> {
        self.maps.get(id)
    }

    /// The first-loaded map, or `None` if the catalog is empty.
    pub fn default_map(&self) -> Option<&MapDescriptor> {
        self.order.first().and_then(|id| self.maps.get(id))
    }

    /// Resolves a possibly-absent/unknown map id to a concrete map, falling back to
    /// [`Self::default_map`] in both cases (§4.2, §9 Open Questions).
    pub fn resolve(&self, requested: Option<&str>) -> Option<&MapDescriptor> {
        requested
            .and_then(|id| self.maps.get(id))
            .or_else(|| self.default_map())
    }

    pub fn list(&self) -> HashMap<String, String> {
        self.maps
            .iter()
            .map(|(id, map)| (id.clone(), map.name.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
