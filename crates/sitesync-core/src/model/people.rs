// ── People entities ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// An enrolled student shown in the admin console and dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: EntityId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub cohort: String,
    #[serde(default)]
    pub active: bool,
}

/// A testimonial quote on the marketing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: EntityId,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_role: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub position: i32,
}
