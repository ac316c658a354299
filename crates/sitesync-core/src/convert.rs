// ── Row-to-domain conversions ──
//
// Bridges store-shaped `serde_json::Value` rows into canonical domain
// types and back, always through the key translator so the field tables
// in `keymap` stay the single source of mapping truth.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::keymap;
use crate::model::{EntityId, EntityKind, ListEntity, SingletonContent};

fn as_object(value: Value) -> Result<Map<String, Value>, CoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Internal(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserialize a store row into a list entity (UI shape throughout).
pub(crate) fn list_entity_from_row<T: ListEntity>(row: &Value) -> Result<T, CoreError> {
    let Value::Object(columns) = row else {
        return Err(CoreError::Internal(format!(
            "expected a row object for {}, got {row}",
            T::KIND
        )));
    };
    let ui = keymap::to_ui(T::KIND, columns);
    Ok(serde_json::from_value(Value::Object(ui))?)
}

/// Serialize any UI-shaped value (entity, draft, or patch) into a
/// store-shaped row/patch object.
pub(crate) fn value_to_row(kind: EntityKind, value: &impl Serialize) -> Result<Value, CoreError> {
    let ui = as_object(serde_json::to_value(value)?)?;
    Ok(Value::Object(keymap::to_store(kind, &ui)))
}

/// Build the optimistic local record for a draft: the draft's fields
/// plus the freshly minted pending id.
pub(crate) fn materialize<T: ListEntity>(
    draft: &impl Serialize,
    id: EntityId,
) -> Result<T, CoreError> {
    let mut ui = as_object(serde_json::to_value(draft)?)?;
    ui.insert("id".to_owned(), serde_json::to_value(id)?);
    Ok(serde_json::from_value(Value::Object(ui))?)
}

/// Overlay a partial patch onto a full UI-shaped value.
///
/// Patch fields serialized as absent (`None` with `skip_serializing_if`)
/// leave the current value untouched.
pub(crate) fn merge<T: Serialize + DeserializeOwned>(
    current: &T,
    patch: &impl Serialize,
) -> Result<T, CoreError> {
    let mut ui = as_object(serde_json::to_value(current)?)?;
    let overlay = as_object(serde_json::to_value(patch)?)?;
    for (key, value) in overlay {
        ui.insert(key, value);
    }
    Ok(serde_json::from_value(Value::Object(ui))?)
}

/// Deserialize a `site_content` payload into its singleton type.
pub(crate) fn singleton_from_payload<T: SingletonContent>(payload: &Value) -> Result<T, CoreError> {
    let Value::Object(columns) = payload else {
        return Err(CoreError::Internal(format!(
            "expected a payload object for {}, got {payload}",
            T::KIND
        )));
    };
    let ui = keymap::to_ui(T::KIND, columns);
    Ok(serde_json::from_value(Value::Object(ui))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{AiModel, BrandSettings, Program};

    #[test]
    fn row_converts_through_the_translator() {
        let row = json!({
            "id": 5,
            "title": "Foundations",
            "description": null,
            "image_url": "https://cdn/img.png",
            "level": "Beginner",
            "duration_weeks": 8,
            "enabled": true,
            "position": 2
        });

        let program: Program = list_entity_from_row(&row).unwrap();
        assert_eq!(program.id, EntityId::Assigned(5));
        assert_eq!(program.title, "Foundations");
        // null text column surfaces as ""
        assert_eq!(program.description, "");
        assert_eq!(program.duration_weeks, 8);
    }

    #[test]
    fn materialize_attaches_the_pending_id() {
        let draft = json!({
            "name": "claude",
            "provider": "anthropic",
            "modelKey": "claude-3",
            "modelGroup": "chat",
            "isDefault": false,
            "enabled": true
        });
        let model: AiModel = materialize(&draft, EntityId::Pending(9)).unwrap();
        assert_eq!(model.id, EntityId::Pending(9));
        assert_eq!(model.model_group, "chat");
    }

    #[test]
    fn merge_overlays_only_present_fields() {
        let base: BrandSettings = serde_json::from_value(json!({
            "brandName": "Lumeo",
            "tagline": "learn faster"
        }))
        .unwrap();

        let merged: BrandSettings = merge(&base, &json!({ "brandName": "Acme" })).unwrap();
        assert_eq!(merged.brand_name, "Acme");
        assert_eq!(merged.tagline, "learn faster");
    }

    #[test]
    fn value_to_row_drops_unknown_fields() {
        let row = value_to_row(
            EntityKind::BrandSettings,
            &json!({ "brandName": "Acme", "mystery": 1 }),
        )
        .unwrap();
        assert_eq!(row, json!({ "brand_name": "Acme" }));
    }
}
