// ── Catalog entities ──
//
// The public-facing offering: programs, downloadable resources, platform
// capabilities, and FAQ entries.

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// A course program listed on the marketing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Difficulty label shown on the card (e.g. "Beginner").
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub duration_weeks: u32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub position: i32,
}

/// A downloadable resource in the student library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub visible: bool,
}

/// A platform capability card (what the academy teaches you to do).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub position: i32,
}

/// A frequently asked question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: EntityId,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub position: i32,
}
