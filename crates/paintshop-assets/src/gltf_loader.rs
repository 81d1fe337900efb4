use std::path::Path;

use tracing::debug;

use paintshop_core::SurfaceNode;

use crate::document::AssetDocument;
use crate::error::AssetError;

/// Load a glTF 2.0 file (.gltf or .glb) and extract its paintable surfaces.
///
/// Only the document is parsed; buffers and images stay untouched. Each mesh
/// primitive becomes one surface: single-primitive meshes keep the mesh
/// name, extra primitives get an index suffix, mirroring how viewers split
/// multi-primitive meshes into separately named objects.
pub fn load_asset(path: &Path) -> Result<AssetDocument, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }

    let gltf = gltf::Gltf::open(path)
        .map_err(|e| AssetError::GltfLoadFailed(path.to_path_buf(), e.to_string()))?;

    let mut surfaces = Vec::new();
    for mesh in gltf.document.meshes() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));

        let primitive_count = mesh.primitives().count();
        for primitive in mesh.primitives() {
            let surface_id = if primitive_count > 1 {
                format!("{}.{}", mesh_name, primitive.index())
            } else {
                mesh_name.clone()
            };
            let material = primitive.material().name().map(str::to_string);
            surfaces.push(SurfaceNode {
                surface_id,
                material,
            });
        }
    }

    debug!(
        "glTF '{}': {} paintable surface(s)",
        path.display(),
        surfaces.len()
    );

    Ok(AssetDocument {
        path: path.to_path_buf(),
        surfaces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    // Self-contained document: the buffer is a data URI, so nothing besides
    // the .gltf file itself needs to exist on disk.
    const MINIMAL_GLTF: &str = r#"{
        "asset": {"version": "2.0"},
        "buffers": [{"byteLength": 36, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}],
        "bufferViews": [{"buffer": 0, "byteOffset": 0, "byteLength": 36}],
        "accessors": [{"bufferView": 0, "byteOffset": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [0.0, 0.0, 0.0]}],
        "materials": [{"name": "Hull"}, {"name": "Trim"}],
        "meshes": [
            {"name": "hull_mesh", "primitives": [{"attributes": {"POSITION": 0}, "material": 0}]},
            {"name": "trim_mesh", "primitives": [{"attributes": {"POSITION": 0}, "material": 1}]},
            {"name": "wheels", "primitives": [
                {"attributes": {"POSITION": 0}, "material": 0},
                {"attributes": {"POSITION": 0}}
            ]}
        ],
        "nodes": [{"mesh": 0}, {"mesh": 1}, {"mesh": 2}],
        "scenes": [{"nodes": [0, 1, 2]}],
        "scene": 0
    }"#;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("paintshop_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_returns_not_found() {
        let result = load_asset(Path::new("/nonexistent/model.gltf"));
        match result.unwrap_err() {
            AssetError::NotFound(_) => {}
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn unparseable_file_returns_load_failed() {
        let path = temp_file("junk.gltf", "this is not a gltf document");
        let result = load_asset(&path);
        fs::remove_file(&path).ok();
        match result.unwrap_err() {
            AssetError::GltfLoadFailed(_, _) => {}
            other => panic!("expected GltfLoadFailed, got: {:?}", other),
        }
    }

    #[test]
    fn surfaces_carry_mesh_and_material_names() {
        let path = temp_file("minimal.gltf", MINIMAL_GLTF);
        let document = load_asset(&path).unwrap();
        fs::remove_file(&path).ok();

        let pairs: Vec<(&str, Option<&str>)> = document
            .surfaces
            .iter()
            .map(|s| (s.surface_id.as_str(), s.material.as_deref()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("hull_mesh", Some("Hull")),
                ("trim_mesh", Some("Trim")),
                ("wheels.0", Some("Hull")),
                ("wheels.1", None),
            ]
        );
    }
}
