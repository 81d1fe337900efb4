//! Wire types for the model-storage server

use serde::{Deserialize, Serialize};

use paintshop_core::{ColorOverride, ColorOverrideStore, SurfaceRegistry};

use crate::error::IntegrationError;

/// A user account on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
}

/// Color row embedded in a stored record: the material it paints and the
/// chosen hex value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorRecord {
    pub hexcode: String,
    pub material: String,
}

/// One painted-material row of a stored model record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaintedModelRecord {
    pub color: ColorRecord,
}

/// A model record as returned by `GET /models/{id}`. A record without a
/// `filepath` cannot be deserialized at all; the painted rows are kept raw
/// here and validated by [`StoredModel::into_persisted`], so one damaged row
/// is detected without losing the asset path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredModel {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub filepath: String,
    /// Comma-joined surface ids, exactly as the server stores them.
    #[serde(default)]
    pub mesh: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub painted_models: Vec<serde_json::Value>,
}

impl StoredModel {
    /// Reduce the record to what the reconciler needs: the asset path and
    /// the saved material → color pairs. Fails with `MalformedRecord` if a
    /// painted row is missing its color fields.
    pub fn into_persisted(self) -> Result<PersistedPaint, IntegrationError> {
        let entries = self
            .painted_models
            .into_iter()
            .map(|row| {
                let record: PaintedModelRecord = serde_json::from_value(row)
                    .map_err(|e| IntegrationError::MalformedRecord(e.to_string()))?;
                Ok(ColorOverride {
                    material: record.color.material,
                    hexcode: record.color.hexcode,
                })
            })
            .collect::<Result<Vec<_>, IntegrationError>>()?;
        Ok(PersistedPaint {
            asset_path: self.filepath,
            entries,
        })
    }
}

/// Core-facing parse of a stored model record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPaint {
    pub asset_path: String,
    pub entries: Vec<ColorOverride>,
}

/// `POST /save-model` body: first save of a painted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModelRequest {
    pub model_name: String,
    pub model_filepath: String,
    pub model_meshes: Vec<String>,
    pub colors: Vec<ColorEntry>,
}

/// Color element of a create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorEntry {
    pub color_hexcode: String,
    pub color_material: String,
}

impl CreateModelRequest {
    pub fn new(
        model_name: impl Into<String>,
        asset_path: impl Into<String>,
        registry: &SurfaceRegistry,
        store: &ColorOverrideStore,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            model_filepath: asset_path.into(),
            model_meshes: registry.surface_ids().map(str::to_string).collect(),
            colors: store
                .to_override_list()
                .into_iter()
                .map(|o| ColorEntry {
                    color_hexcode: o.hexcode,
                    color_material: o.material,
                })
                .collect(),
        }
    }
}

/// `PATCH /save-model/{id}` body. The saved record's painted rows after the
/// call equal exactly what is sent here, never a merge with prior state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateModelRequest {
    #[serde(rename = "modelId")]
    pub model_id: i64,
    pub painted_models: Vec<PaintedModelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaintedModelEntry {
    pub model: MaterialRef,
    pub color: ColorRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRef {
    pub name: String,
}

impl UpdateModelRequest {
    pub fn new(model_id: i64, store: &ColorOverrideStore) -> Self {
        let painted_models = store
            .to_override_list()
            .into_iter()
            .map(|o| {
                let ColorOverride { material, hexcode } = o;
                PaintedModelEntry {
                    model: MaterialRef {
                        name: material.clone(),
                    },
                    color: ColorRecord { hexcode, material },
                }
            })
            .collect();
        Self {
            model_id,
            painted_models,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paintshop_core::{reconcile, SurfaceNode, DEFAULT_COLOR};
    use serde_json::json;

    fn ready_state() -> (SurfaceRegistry, ColorOverrideStore) {
        let registry = SurfaceRegistry::from_nodes(&[
            SurfaceNode::new("hull_a", Some("Hull")),
            SurfaceNode::new("hull_b", Some("Hull")),
            SurfaceNode::new("trim", Some("Trim")),
        ]);
        let mut store = ColorOverrideStore::initialize(&registry, &[]);
        store.set_color("Hull", "#00ff00").unwrap();
        (registry, store)
    }

    #[test]
    fn test_create_payload_wire_shape() {
        let (registry, store) = ready_state();
        let request = CreateModelRequest::new("Shoe", "/shoe.gltf", &registry, &store);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model_name": "Shoe",
                "model_filepath": "/shoe.gltf",
                "model_meshes": ["hull_a", "hull_b", "trim"],
                "colors": [
                    {"color_hexcode": "#00ff00", "color_material": "Hull"},
                    {"color_hexcode": DEFAULT_COLOR, "color_material": "Trim"}
                ]
            })
        );
    }

    #[test]
    fn test_update_payload_wire_shape() {
        let (_, store) = ready_state();
        let request = UpdateModelRequest::new(7, &store);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "modelId": 7,
                "painted_models": [
                    {"model": {"name": "Hull"}, "color": {"hexcode": "#00ff00", "material": "Hull"}},
                    {"model": {"name": "Trim"}, "color": {"hexcode": DEFAULT_COLOR, "material": "Trim"}}
                ]
            })
        );
    }

    #[test]
    fn test_stored_model_parses_server_response() {
        let raw = json!({
            "id": 3,
            "name": "Shoe",
            "filepath": "/shoe.gltf",
            "mesh": "hull_a,hull_b,trim",
            "user_id": 1,
            "painted_models": [
                {
                    "id": 11,
                    "model_id": 3,
                    "color_id": 5,
                    "color": {"id": 5, "name": null, "hexcode": "#00ff00", "material": "Hull"}
                }
            ]
        });

        let record: StoredModel = serde_json::from_value(raw).unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.user_id, Some(1));

        let persisted = record.into_persisted().unwrap();
        assert_eq!(persisted.asset_path, "/shoe.gltf");
        assert_eq!(persisted.entries, vec![ColorOverride::new("Hull", "#00ff00")]);
    }

    #[test]
    fn test_record_without_filepath_is_rejected() {
        let raw = json!({"id": 3, "name": "Shoe", "painted_models": []});
        assert!(serde_json::from_value::<StoredModel>(raw).is_err());
    }

    #[test]
    fn test_damaged_painted_row_is_malformed() {
        let raw = json!({
            "filepath": "/shoe.gltf",
            "painted_models": [{"color": {"hexcode": "#00ff00"}}]
        });

        let record: StoredModel = serde_json::from_value(raw).unwrap();
        match record.into_persisted() {
            Err(IntegrationError::MalformedRecord(_)) => {}
            other => panic!("expected MalformedRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_store_round_trips_through_update_and_fetch() {
        let (registry, store) = ready_state();

        // What the client sends on save ...
        let update = serde_json::to_value(UpdateModelRequest::new(3, &store)).unwrap();

        // ... comes back embedded in the stored record on the next fetch.
        let fetched: StoredModel = serde_json::from_value(json!({
            "id": 3,
            "filepath": "/shoe.gltf",
            "painted_models": update["painted_models"]
        }))
        .unwrap();

        let persisted = fetched.into_persisted().unwrap();
        let merged = reconcile(&registry, &persisted.entries);

        assert!(merged.unmatched.is_empty());
        assert_eq!(merged.store.to_override_list(), store.to_override_list());
    }
}
