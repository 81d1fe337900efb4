//! Color override store keyed by material name

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PaintError;
use crate::registry::SurfaceRegistry;

/// Initial color for every material without a saved override.
pub const DEFAULT_COLOR: &str = "#ff0000";

/// A chosen color for one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOverride {
    pub material: String,
    pub hexcode: String,
}

impl ColorOverride {
    pub fn new(material: impl Into<String>, hexcode: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            hexcode: hexcode.into(),
        }
    }
}

/// Material name → hex color. The key set always matches the registry the
/// store was initialized from: `set_color` only ever updates an existing
/// entry, so colors for materials the current asset does not have cannot
/// accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorOverrideStore {
    colors: IndexMap<String, String>,
}

impl ColorOverrideStore {
    /// Build a store covering every material in `registry`. Materials named
    /// in `defaults` keep that color (last entry wins on duplicates), the
    /// rest get [`DEFAULT_COLOR`]. Defaults for materials the registry does
    /// not have are ignored here; the reconciler reports them.
    pub fn initialize(registry: &SurfaceRegistry, defaults: &[ColorOverride]) -> Self {
        let mut colors = IndexMap::new();
        for material in registry.materials() {
            let saved = defaults.iter().rev().find(|o| o.material == material);
            let hexcode = match saved {
                Some(o) if is_valid_hex(&o.hexcode) => o.hexcode.clone(),
                Some(o) => {
                    warn!(
                        "saved color '{}' for material '{}' is not a hex color, using default",
                        o.hexcode, material
                    );
                    DEFAULT_COLOR.to_string()
                }
                None => DEFAULT_COLOR.to_string(),
            };
            colors.insert(material.to_string(), hexcode);
        }
        Self { colors }
    }

    /// Update the color of one material. Rejects materials the current asset
    /// does not have and values that are not `#rrggbb`; nothing is changed
    /// on rejection.
    pub fn set_color(&mut self, material: &str, hexcode: &str) -> Result<(), PaintError> {
        if !is_valid_hex(hexcode) {
            return Err(PaintError::InvalidHexColor(hexcode.to_string()));
        }
        match self.colors.get_mut(material) {
            Some(slot) => {
                *slot = hexcode.to_string();
                Ok(())
            }
            None => Err(PaintError::UnknownMaterial(material.to_string())),
        }
    }

    /// The stored color for `material`, if the current asset has it.
    pub fn color_of(&self, material: &str) -> Option<&str> {
        self.colors.get(material).map(String::as_str)
    }

    /// Deterministic export in material first-seen order.
    pub fn to_override_list(&self) -> Vec<ColorOverride> {
        self.colors
            .iter()
            .map(|(material, hexcode)| ColorOverride::new(material.clone(), hexcode.clone()))
            .collect()
    }

    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// `#rrggbb`, case-insensitive.
pub fn is_valid_hex(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
