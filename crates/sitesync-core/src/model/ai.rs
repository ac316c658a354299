// ── AI model descriptors ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// An AI model offered by the in-site assistant.
///
/// Models are partitioned by `model_group` (e.g. `"chat"`, `"vision"`).
/// At most one model per group carries `is_default`, and `is_default` is
/// only meaningful while `enabled` is true -- the dispatcher clears it
/// when a model is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: String,
    /// Provider-side model identifier sent with assistant requests.
    #[serde(default)]
    pub model_key: String,
    #[serde(default)]
    pub model_group: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub enabled: bool,
}
