//! Paintshop Assets - asset loading and surface extraction
//!
//! Opens glTF 2.0 model descriptions and extracts the paintable surfaces
//! (mesh primitives and the material names bound to them) that the surface
//! registry is built from. Geometry and textures are never read; painting
//! only needs names.

mod document;
mod error;
mod gltf_loader;

pub use document::AssetDocument;
pub use error::AssetError;
pub use gltf_loader::load_asset;
