// ── Key translator ──
//
// Bidirectional mapping between UI-facing field names (camelCase) and
// store column names (snake_case), one static table per entity kind.
// Pure functions, no I/O. Unknown keys are dropped in both directions:
// a field with no entry here never reaches the remote schema, and an
// unmapped column never leaks into a UI-shaped record.
//
// The table is the single source of field mapping for the whole crate --
// per-call-site translation is exactly the silent-data-loss bug this
// module exists to prevent.

use serde_json::{Map, Value};

use crate::model::EntityKind;

/// One field mapping entry.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// UI-facing name (camelCase).
    pub ui: &'static str,
    /// Store column name (snake_case).
    pub column: &'static str,
    /// Present a missing or null column value as `""` on the UI side.
    pub empty_text: bool,
}

/// Text field: missing/null surfaces as an empty string.
const fn text(ui: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        ui,
        column,
        empty_text: true,
    }
}

/// Non-text field (id, bool, number, timestamp): passed through as-is.
const fn raw(ui: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        ui,
        column,
        empty_text: false,
    }
}

/// The static field table for an entity kind.
#[allow(clippy::too_many_lines)]
pub fn fields(kind: EntityKind) -> &'static [FieldSpec] {
    match kind {
        // Each arm wraps its array in an inline `const` block so the
        // slice is promoted to a `'static` allocation.
        EntityKind::BrandSettings => const { &[
            text("brandName", "brand_name"),
            text("tagline", "tagline"),
            text("logoUrl", "logo_url"),
            text("faviconUrl", "favicon_url"),
            text("primaryColor", "primary_color"),
            text("secondaryColor", "secondary_color"),
        ] },
        EntityKind::HeroContent => const { &[
            text("title", "title"),
            text("subtitle", "subtitle"),
            text("ctaLabel", "cta_label"),
            text("ctaUrl", "cta_url"),
            text("backgroundUrl", "background_url"),
            text("videoUrl", "video_url"),
        ] },
        EntityKind::AboutContent => const { &[
            text("heading", "heading"),
            text("body", "body"),
            text("imageUrl", "image_url"),
            text("missionStatement", "mission_statement"),
        ] },
        EntityKind::ContactInfo => const { &[
            text("email", "email"),
            text("phone", "phone"),
            text("address", "address"),
            text("whatsapp", "whatsapp"),
            text("instagramUrl", "instagram_url"),
            text("youtubeUrl", "youtube_url"),
            text("linkedinUrl", "linkedin_url"),
        ] },
        EntityKind::FooterContent => const { &[
            text("copyrightText", "copyright_text"),
            raw("showSocialLinks", "show_social_links"),
            raw("newsletterEnabled", "newsletter_enabled"),
        ] },
        EntityKind::SeoSettings => const { &[
            text("metaTitle", "meta_title"),
            text("metaDescription", "meta_description"),
            text("keywords", "keywords"),
            text("ogImageUrl", "og_image_url"),
        ] },
        EntityKind::EnrollmentSettings => const { &[
            raw("enrollmentOpen", "enrollment_open"),
            text("formUrl", "form_url"),
            text("deadline", "deadline"),
            raw("seatLimit", "seat_limit"),
        ] },
        EntityKind::SiteSettings => const { &[
            raw("maintenanceMode", "maintenance_mode"),
            raw("allowRegistration", "allow_registration"),
            raw("chatEnabled", "chat_enabled"),
            text("chatGreeting", "chat_greeting"),
            // Credential field: translated for completeness, but the
            // persistence layer strips it before any payload is written.
            text("adminPassword", "admin_password"),
        ] },
        EntityKind::Programs => const { &[
            raw("id", "id"),
            text("title", "title"),
            text("description", "description"),
            text("imageUrl", "image_url"),
            text("level", "level"),
            raw("durationWeeks", "duration_weeks"),
            raw("enabled", "enabled"),
            raw("position", "position"),
        ] },
        EntityKind::Resources => const { &[
            raw("id", "id"),
            text("title", "title"),
            text("description", "description"),
            text("fileUrl", "file_url"),
            text("category", "category"),
            raw("visible", "visible"),
        ] },
        EntityKind::Students => const { &[
            raw("id", "id"),
            text("fullName", "full_name"),
            text("email", "email"),
            text("avatarUrl", "avatar_url"),
            text("cohort", "cohort"),
            raw("active", "active"),
        ] },
        EntityKind::Testimonials => const { &[
            raw("id", "id"),
            text("authorName", "author_name"),
            text("authorRole", "author_role"),
            text("quote", "quote"),
            text("avatarUrl", "avatar_url"),
            raw("visible", "visible"),
            raw("position", "position"),
        ] },
        EntityKind::SliderCards => const { &[
            raw("id", "id"),
            text("title", "title"),
            text("caption", "caption"),
            text("imageUrl", "image_url"),
            text("linkUrl", "link_url"),
            raw("visible", "visible"),
            raw("position", "position"),
        ] },
        EntityKind::DashboardSlides => const { &[
            raw("id", "id"),
            text("title", "title"),
            text("body", "body"),
            text("imageUrl", "image_url"),
            raw("visible", "visible"),
            raw("position", "position"),
        ] },
        EntityKind::AiModels => const { &[
            raw("id", "id"),
            text("name", "name"),
            text("provider", "provider"),
            text("modelKey", "model_key"),
            text("modelGroup", "model_group"),
            raw("isDefault", "is_default"),
            raw("enabled", "enabled"),
        ] },
        EntityKind::Capabilities => const { &[
            raw("id", "id"),
            text("title", "title"),
            text("description", "description"),
            text("icon", "icon"),
            raw("enabled", "enabled"),
            raw("position", "position"),
        ] },
        EntityKind::Faqs => const { &[
            raw("id", "id"),
            text("question", "question"),
            text("answer", "answer"),
            raw("visible", "visible"),
            raw("position", "position"),
        ] },
        EntityKind::Announcements => const { &[
            raw("id", "id"),
            text("title", "title"),
            text("body", "body"),
            raw("publishedAt", "published_at"),
            raw("pinned", "pinned"),
            raw("visible", "visible"),
        ] },
    }
}

/// Translate a partial UI-shaped object into store shape.
///
/// Only keys present in the input appear in the output; unknown keys
/// are dropped.
pub fn to_store(kind: EntityKind, ui: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for spec in fields(kind) {
        if let Some(value) = ui.get(spec.ui) {
            out.insert(spec.column.to_owned(), value.clone());
        }
    }
    out
}

/// Translate a store-shaped row into UI shape.
///
/// Applies the inverse table plus default substitutions: text fields
/// that are missing or null surface as `""`. Unmapped columns are
/// dropped.
pub fn to_ui(kind: EntityKind, row: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for spec in fields(kind) {
        match row.get(spec.column) {
            Some(Value::Null) | None if spec.empty_text => {
                out.insert(spec.ui.to_owned(), Value::String(String::new()));
            }
            Some(value) => {
                out.insert(spec.ui.to_owned(), value.clone());
            }
            None => {}
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn tables_are_invertible_per_kind() {
        // Totality + invertibility: no duplicate UI names, no duplicate
        // columns, within any one kind.
        for kind in EntityKind::iter() {
            let specs = fields(kind);
            let mut ui_names: Vec<_> = specs.iter().map(|s| s.ui).collect();
            let mut columns: Vec<_> = specs.iter().map(|s| s.column).collect();
            ui_names.sort_unstable();
            columns.sort_unstable();
            let (ud, cd) = (ui_names.windows(2).any(|w| w[0] == w[1]),
                            columns.windows(2).any(|w| w[0] == w[1]));
            assert!(!ud && !cd, "duplicate mapping in {kind}");
        }
    }

    #[test]
    fn round_trip_is_identity_for_fully_populated_records() {
        // Build a fully-populated UI record for every kind from its own
        // table, push it through UI -> store -> UI, and require identity.
        for kind in EntityKind::iter() {
            let mut ui = Map::new();
            for (i, spec) in fields(kind).iter().enumerate() {
                let value = if spec.empty_text {
                    json!(format!("value-{i}"))
                } else {
                    json!(i)
                };
                ui.insert(spec.ui.to_owned(), value);
            }

            let store = to_store(kind, &ui);
            let back = to_ui(kind, &store);
            assert_eq!(back, ui, "round trip failed for {kind}");
        }
    }

    #[test]
    fn unknown_keys_are_dropped_in_both_directions() {
        let ui = obj(json!({ "brandName": "Lumeo", "notAField": true }));
        let store = to_store(EntityKind::BrandSettings, &ui);
        assert_eq!(store, obj(json!({ "brand_name": "Lumeo" })));

        let row = obj(json!({ "brand_name": "Lumeo", "created_at": "2026-01-01" }));
        let back = to_ui(EntityKind::BrandSettings, &row);
        assert_eq!(back.get("brandName"), Some(&json!("Lumeo")));
        assert!(!back.contains_key("created_at"));
        assert!(!back.contains_key("createdAt"));
    }

    #[test]
    fn missing_text_surfaces_as_empty_string() {
        let row = obj(json!({ "brand_name": "Lumeo", "tagline": null }));
        let ui = to_ui(EntityKind::BrandSettings, &row);
        assert_eq!(ui.get("tagline"), Some(&json!("")));
        assert_eq!(ui.get("logoUrl"), Some(&json!("")));
    }

    #[test]
    fn missing_raw_fields_are_omitted_not_defaulted() {
        let row = obj(json!({ "title": "Welcome" }));
        let ui = to_ui(EntityKind::DashboardSlides, &row);
        assert!(!ui.contains_key("visible"));
        assert!(!ui.contains_key("id"));
    }

    #[test]
    fn partial_update_translates_only_present_keys() {
        let ui = obj(json!({ "isDefault": true }));
        let store = to_store(EntityKind::AiModels, &ui);
        assert_eq!(store, obj(json!({ "is_default": true })));
    }
}
