//! Surface registry: which surfaces each named material paints

use indexmap::{IndexMap, IndexSet};
use tracing::warn;

/// One paintable unit found while traversing a loaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceNode {
    pub surface_id: String,
    /// Material bound to the surface. `None` or empty means the surface is
    /// unpainted and stays out of the registry.
    pub material: Option<String>,
}

impl SurfaceNode {
    pub fn new(surface_id: impl Into<String>, material: Option<&str>) -> Self {
        Self {
            surface_id: surface_id.into(),
            material: material.map(str::to_string),
        }
    }
}

/// Mapping from material name to the ordered set of surface ids painted by
/// it. Materials keep the order they were first seen in, so UI listings stay
/// stable across reloads of the same asset. Each surface id belongs to
/// exactly one material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceRegistry {
    materials: IndexMap<String, IndexSet<String>>,
}

impl SurfaceRegistry {
    /// Build a registry from a traversal result. Surfaces without a material
    /// name are skipped. If the source data lists one surface under two
    /// materials, the last binding seen wins.
    pub fn from_nodes(nodes: &[SurfaceNode]) -> Self {
        let mut registry = Self::default();
        for node in nodes {
            match node.material.as_deref() {
                Some(material) if !material.is_empty() => {
                    registry.insert(material, &node.surface_id);
                }
                _ => {}
            }
        }
        registry
    }

    fn insert(&mut self, material: &str, surface_id: &str) {
        let previous = self
            .materials
            .iter()
            .find(|(name, ids)| name.as_str() != material && ids.contains(surface_id))
            .map(|(name, _)| name.clone());

        if let Some(previous) = previous {
            warn!(
                "surface '{}' listed under both '{}' and '{}', keeping '{}'",
                surface_id, previous, material, material
            );
            if let Some(ids) = self.materials.get_mut(&previous) {
                ids.shift_remove(surface_id);
                if ids.is_empty() {
                    self.materials.shift_remove(&previous);
                }
            }
        }

        self.materials
            .entry(material.to_string())
            .or_insert_with(IndexSet::new)
            .insert(surface_id.to_string());
    }

    /// Material names in first-seen order.
    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    /// The surfaces painted by `material`, in first-seen order.
    pub fn surfaces(&self, material: &str) -> Option<&IndexSet<String>> {
        self.materials.get(material)
    }

    /// Every surface id in the registry, grouped by material in registry
    /// order. This is the `model_meshes` list a create payload carries.
    pub fn surface_ids(&self) -> impl Iterator<Item = &str> {
        self.materials
            .values()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    pub fn contains(&self, material: &str) -> bool {
        self.materials.contains_key(material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
