//! Merging saved color assignments onto a freshly built registry

use tracing::warn;

use crate::registry::SurfaceRegistry;
use crate::store::{ColorOverride, ColorOverrideStore};

/// Result of merging saved overrides onto a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub store: ColorOverrideStore,
    /// Saved entries naming materials the current asset no longer has,
    /// usually because it was re-exported with renamed surfaces. Non-fatal.
    pub unmatched: Vec<ColorOverride>,
}

/// Merge `persisted` onto `registry`: matching entries keep their saved
/// color, the rest of the registry gets the default, and entries whose
/// material is missing from the registry come back in `unmatched`.
/// Reconciling the same inputs twice yields an identical store.
pub fn reconcile(registry: &SurfaceRegistry, persisted: &[ColorOverride]) -> Reconciliation {
    let unmatched: Vec<ColorOverride> = persisted
        .iter()
        .filter(|o| !registry.contains(&o.material))
        .cloned()
        .collect();

    if !unmatched.is_empty() {
        let names: Vec<&str> = unmatched.iter().map(|o| o.material.as_str()).collect();
        warn!(
            "{} saved color(s) reference materials missing from the loaded asset: {:?}",
            unmatched.len(),
            names
        );
    }

    Reconciliation {
        store: ColorOverrideStore::initialize(registry, persisted),
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SurfaceNode;
    use crate::store::DEFAULT_COLOR;

    fn registry(materials: &[&str]) -> SurfaceRegistry {
        let nodes: Vec<SurfaceNode> = materials
            .iter()
            .enumerate()
            .map(|(i, m)| SurfaceNode::new(format!("surface_{i}"), Some(m)))
            .collect();
        SurfaceRegistry::from_nodes(&nodes)
    }

    #[test]
    fn no_saved_record_falls_back_to_default() {
        let result = reconcile(&registry(&["Hull", "Trim"]), &[]);

        assert_eq!(result.store.color_of("Hull"), Some(DEFAULT_COLOR));
        assert_eq!(result.store.color_of("Trim"), Some(DEFAULT_COLOR));
        assert!(result.unmatched.is_empty());
    }

    #[test]
    fn matching_overrides_keep_their_saved_color() {
        let result = reconcile(
            &registry(&["Hull", "Trim"]),
            &[ColorOverride::new("Hull", "#00ff00")],
        );

        assert_eq!(result.store.color_of("Hull"), Some("#00ff00"));
        assert_eq!(result.store.color_of("Trim"), Some(DEFAULT_COLOR));
        assert!(result.unmatched.is_empty());
    }

    #[test]
    fn drifted_overrides_are_reported_not_applied() {
        let result = reconcile(
            &registry(&["Hull", "Trim"]),
            &[
                ColorOverride::new("Hull", "#00ff00"),
                ColorOverride::new("Wheel", "#0000ff"),
            ],
        );

        assert_eq!(result.unmatched, vec![ColorOverride::new("Wheel", "#0000ff")]);
        let materials: Vec<&str> = result.store.materials().collect();
        assert_eq!(materials, vec!["Hull", "Trim"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let registry = registry(&["Hull", "Trim", "Sole"]);
        let persisted = vec![
            ColorOverride::new("Hull", "#00ff00"),
            ColorOverride::new("Wheel", "#0000ff"),
        ];

        let first = reconcile(&registry, &persisted);
        let second = reconcile(&registry, &persisted);

        assert_eq!(first, second);
        assert_eq!(
            first.store.to_override_list(),
            second.store.to_override_list()
        );
    }
}
