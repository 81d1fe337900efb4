//! Paintshop Core - material-color reconciliation engine
//!
//! Tracks which color every named material of a loaded 3D asset should have,
//! and merges previously saved assignments back onto a freshly loaded asset:
//! - Surface registry: material name → the surfaces painted by it
//! - Color override store: material name → chosen color
//! - Reconciler: saved colors merged onto a new registry, with drift reporting
//! - Load controller: generation-checked supervision of asynchronous loads
//!
//! Everything in this crate is pure state: no file, network, or rendering
//! access. Surfaces are referenced by stable string ids only.

pub mod controller;
pub mod error;
pub mod reconcile;
pub mod registry;
pub mod store;

pub use controller::{Generation, LoadController, LoadState};
pub use error::{AssetLoadError, PaintError};
pub use reconcile::{reconcile, Reconciliation};
pub use registry::{SurfaceNode, SurfaceRegistry};
pub use store::{ColorOverride, ColorOverrideStore, DEFAULT_COLOR};
