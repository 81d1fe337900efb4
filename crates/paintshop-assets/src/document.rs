use std::path::PathBuf;

use paintshop_core::SurfaceNode;

/// A loaded asset description: the traversal result the surface registry is
/// built from. Holds identifiers only, never geometry or live scene objects.
#[derive(Debug, Clone)]
pub struct AssetDocument {
    pub path: PathBuf,
    pub surfaces: Vec<SurfaceNode>,
}
