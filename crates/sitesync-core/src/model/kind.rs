// ── Entity kind enumeration ──
//
// One variant per tracked collection. The kind is the join point between
// the key translator (field tables), the store (collections/slots), and
// the remote surface (table names, content keys, watched-table list) --
// the set of synchronized entities is data, not wiring.

use strum::{Display, EnumIter, IntoEnumIterator};

/// Every entity kind the store tracks.
///
/// The `Display` form is the snake_case kind name, which doubles as the
/// remote table name for list kinds and the `content_key` for singleton
/// kinds (all singletons share the `site_content` table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    // ── Singleton configuration objects ──
    BrandSettings,
    HeroContent,
    AboutContent,
    ContactInfo,
    FooterContent,
    SeoSettings,
    EnrollmentSettings,
    SiteSettings,

    // ── List entities ──
    Programs,
    Resources,
    Students,
    Testimonials,
    SliderCards,
    DashboardSlides,
    AiModels,
    Capabilities,
    Faqs,
    Announcements,
}

/// Shared table holding one row per singleton kind, keyed by `content_key`.
pub const CONTENT_TABLE: &str = "site_content";

impl EntityKind {
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            Self::BrandSettings
                | Self::HeroContent
                | Self::AboutContent
                | Self::ContactInfo
                | Self::FooterContent
                | Self::SeoSettings
                | Self::EnrollmentSettings
                | Self::SiteSettings
        )
    }

    /// Remote table backing this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Programs => "programs",
            Self::Resources => "resources",
            Self::Students => "students",
            Self::Testimonials => "testimonials",
            Self::SliderCards => "slider_cards",
            Self::DashboardSlides => "dashboard_slides",
            Self::AiModels => "ai_models",
            Self::Capabilities => "capabilities",
            Self::Faqs => "faqs",
            Self::Announcements => "announcements",
            _ => CONTENT_TABLE,
        }
    }

    /// Logical settings key for singleton kinds.
    pub fn content_key(self) -> Option<&'static str> {
        match self {
            Self::BrandSettings => Some("brand_settings"),
            Self::HeroContent => Some("hero_content"),
            Self::AboutContent => Some("about_content"),
            Self::ContactInfo => Some("contact_info"),
            Self::FooterContent => Some("footer_content"),
            Self::SeoSettings => Some("seo_settings"),
            Self::EnrollmentSettings => Some("enrollment_settings"),
            Self::SiteSettings => Some("site_settings"),
            _ => None,
        }
    }

    /// Store-side ordering applied when fetching this kind, if any.
    pub fn fetch_order(self) -> Option<&'static str> {
        match self {
            Self::Programs
            | Self::Testimonials
            | Self::SliderCards
            | Self::DashboardSlides
            | Self::Capabilities
            | Self::Faqs => Some("position.asc"),
            Self::Announcements => Some("published_at.desc"),
            _ => None,
        }
    }

    /// The full set of tables the realtime listener watches: every list
    /// table plus the shared content table, each exactly once.
    pub fn watched_tables() -> Vec<&'static str> {
        let mut tables = vec![CONTENT_TABLE];
        tables.extend(Self::iter().filter(|k| !k.is_singleton()).map(Self::table));
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_kinds_share_the_content_table() {
        assert_eq!(EntityKind::BrandSettings.table(), CONTENT_TABLE);
        assert_eq!(
            EntityKind::BrandSettings.content_key(),
            Some("brand_settings")
        );
        assert!(EntityKind::Programs.content_key().is_none());
    }

    #[test]
    fn watched_tables_cover_every_list_kind_once() {
        let tables = EntityKind::watched_tables();
        assert_eq!(tables.len(), 11); // 10 list tables + site_content
        assert!(tables.contains(&"ai_models"));
        let mut dedup = tables.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), tables.len());
    }

    #[test]
    fn display_matches_table_for_list_kinds() {
        assert_eq!(EntityKind::SliderCards.to_string(), "slider_cards");
        assert_eq!(EntityKind::SliderCards.table(), "slider_cards");
    }
}
