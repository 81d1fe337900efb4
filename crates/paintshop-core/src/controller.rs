//! Asset load supervision with stale-load suppression

use tracing::{debug, warn};

use crate::error::{AssetLoadError, PaintError};
use crate::reconcile::{reconcile, Reconciliation};
use crate::registry::{SurfaceNode, SurfaceRegistry};
use crate::store::{ColorOverride, ColorOverrideStore};

/// Token identifying one load request. Monotonically increasing; a result
/// carrying a superseded generation is discarded instead of applied.
pub type Generation = u64;

/// Where the controller currently is in the load lifecycle.
#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading {
        asset_path: String,
    },
    Ready {
        asset_path: String,
        registry: SurfaceRegistry,
        store: ColorOverrideStore,
        unmatched: Vec<ColorOverride>,
    },
    Failed {
        asset_path: String,
        error: AssetLoadError,
    },
}

/// Supervises asynchronous asset loads for one editing session. Each call to
/// [`begin_load`](LoadController::begin_load) bumps the generation; only the
/// completion carrying the current generation may transition the controller,
/// so a slow load finishing after the user switched assets can never
/// overwrite the newer asset's registry.
#[derive(Debug, Default)]
pub struct LoadController {
    generation: Generation,
    state: LoadState,
}

impl LoadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Start loading `asset_path`. Any load still in flight becomes stale.
    /// Returns the generation the eventual completion must present.
    pub fn begin_load(&mut self, asset_path: impl Into<String>) -> Generation {
        self.generation += 1;
        let asset_path = asset_path.into();
        debug!("load {} started for '{}'", self.generation, asset_path);
        self.state = LoadState::Loading { asset_path };
        self.generation
    }

    /// Feed a finished traversal back in, together with the saved overrides
    /// to reconcile against. Returns whether the result was applied; a stale
    /// generation leaves the state untouched.
    pub fn complete_load(
        &mut self,
        generation: Generation,
        nodes: &[SurfaceNode],
        persisted: &[ColorOverride],
    ) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        let asset_path = self.current_path();
        let registry = SurfaceRegistry::from_nodes(nodes);
        let Reconciliation { store, unmatched } = reconcile(&registry, persisted);
        debug!(
            "load {} ready: {} material(s), {} unmatched saved color(s)",
            generation,
            registry.len(),
            unmatched.len()
        );
        self.state = LoadState::Ready {
            asset_path,
            registry,
            store,
            unmatched,
        };
        true
    }

    /// Record a failed load. Same staleness rule as `complete_load`; there
    /// is no automatic retry.
    pub fn fail_load(&mut self, generation: Generation, error: AssetLoadError) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        let asset_path = self.current_path();
        warn!("load {} failed: {}", generation, error);
        self.state = LoadState::Failed { asset_path, error };
        true
    }

    /// Update one material's color. Only possible once a load is ready.
    pub fn set_color(&mut self, material: &str, hexcode: &str) -> Result<(), PaintError> {
        match &mut self.state {
            LoadState::Ready { store, .. } => store.set_color(material, hexcode),
            _ => Err(PaintError::UnknownMaterial(material.to_string())),
        }
    }

    pub fn registry(&self) -> Option<&SurfaceRegistry> {
        match &self.state {
            LoadState::Ready { registry, .. } => Some(registry),
            _ => None,
        }
    }

    pub fn store(&self) -> Option<&ColorOverrideStore> {
        match &self.state {
            LoadState::Ready { store, .. } => Some(store),
            _ => None,
        }
    }

    /// Saved overrides the last reconciliation could not match. Empty unless
    /// a load is ready.
    pub fn unmatched(&self) -> &[ColorOverride] {
        match &self.state {
            LoadState::Ready { unmatched, .. } => unmatched,
            _ => &[],
        }
    }

    pub fn asset_path(&self) -> Option<&str> {
        match &self.state {
            LoadState::Idle => None,
            LoadState::Loading { asset_path }
            | LoadState::Ready { asset_path, .. }
            | LoadState::Failed { asset_path, .. } => Some(asset_path),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready { .. })
    }

    fn accepts(&self, generation: Generation) -> bool {
        if matches!(self.state, LoadState::Idle) || generation != self.generation {
            warn!(
                "discarding result of load {} (current generation is {})",
                generation, self.generation
            );
            return false;
        }
        true
    }

    fn current_path(&self) -> String {
        self.asset_path().unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_COLOR;

    fn nodes(pairs: &[(&str, &str)]) -> Vec<SurfaceNode> {
        pairs
            .iter()
            .map(|(id, material)| SurfaceNode::new(*id, Some(material)))
            .collect()
    }

    #[test]
    fn load_completes_and_publishes_store() {
        let mut controller = LoadController::new();
        let generation = controller.begin_load("/models/shoe.gltf");
        assert!(controller.is_loading());

        let applied = controller.complete_load(
            generation,
            &nodes(&[("hull", "Hull"), ("trim", "Trim")]),
            &[ColorOverride::new("Hull", "#00ff00")],
        );

        assert!(applied);
        assert!(controller.is_ready());
        let store = controller.store().unwrap();
        assert_eq!(store.color_of("Hull"), Some("#00ff00"));
        assert_eq!(store.color_of("Trim"), Some(DEFAULT_COLOR));
        assert_eq!(controller.asset_path(), Some("/models/shoe.gltf"));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut controller = LoadController::new();
        let first = controller.begin_load("/models/x.gltf");
        let second = controller.begin_load("/models/y.gltf");
        assert_ne!(first, second);

        // The slow first load resolves after the user switched to Y.
        let applied = controller.complete_load(first, &nodes(&[("x", "OldMat")]), &[]);
        assert!(!applied);
        assert!(controller.is_loading());
        assert_eq!(controller.asset_path(), Some("/models/y.gltf"));

        // Y's own completion still drives the state.
        assert!(controller.complete_load(second, &nodes(&[("y", "NewMat")]), &[]));
        assert!(controller.registry().unwrap().contains("NewMat"));
        assert!(!controller.registry().unwrap().contains("OldMat"));
    }

    #[test]
    fn stale_failure_is_discarded() {
        let mut controller = LoadController::new();
        let first = controller.begin_load("/models/x.gltf");
        let second = controller.begin_load("/models/y.gltf");

        let applied = controller.fail_load(first, AssetLoadError::new("/models/x.gltf", "timeout"));
        assert!(!applied);
        assert!(controller.is_loading());

        assert!(controller.complete_load(second, &nodes(&[("y", "Hull")]), &[]));
        assert!(controller.is_ready());
    }

    #[test]
    fn failure_enters_failed_state() {
        let mut controller = LoadController::new();
        let generation = controller.begin_load("/models/broken.gltf");

        assert!(controller.fail_load(
            generation,
            AssetLoadError::new("/models/broken.gltf", "parse error")
        ));
        assert!(matches!(controller.state(), LoadState::Failed { .. }));
        assert!(controller.store().is_none());
    }

    #[test]
    fn completion_without_begin_is_ignored() {
        let mut controller = LoadController::new();
        assert!(!controller.complete_load(0, &nodes(&[("hull", "Hull")]), &[]));
        assert!(matches!(controller.state(), LoadState::Idle));
    }

    #[test]
    fn set_color_requires_a_ready_load() {
        let mut controller = LoadController::new();
        assert!(controller.set_color("Hull", "#123456").is_err());

        let generation = controller.begin_load("/models/shoe.gltf");
        assert!(controller.set_color("Hull", "#123456").is_err());

        controller.complete_load(generation, &nodes(&[("hull", "Hull")]), &[]);
        assert!(controller.set_color("Hull", "#123456").is_ok());
        assert_eq!(
            controller.store().unwrap().color_of("Hull"),
            Some("#123456")
        );
    }

    #[test]
    fn drift_is_exposed_after_completion() {
        let mut controller = LoadController::new();
        let generation = controller.begin_load("/models/shoe.gltf");
        controller.complete_load(
            generation,
            &nodes(&[("hull", "Hull"), ("trim", "Trim")]),
            &[ColorOverride::new("Wheel", "#0000ff")],
        );

        assert_eq!(
            controller.unmatched(),
            &[ColorOverride::new("Wheel", "#0000ff")]
        );
    }
}
