// ── Singleton configuration objects ──
//
// One logical instance per kind, stored remotely as a payload row in the
// shared `site_content` table. Serde representation is the UI shape
// (camelCase); the key translator owns the mapping to store columns.

use serde::{Deserialize, Serialize};

/// Brand identity shown across every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSettings {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub favicon_url: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
}

/// Landing-page hero block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub cta_url: String,
    #[serde(default)]
    pub background_url: String,
    #[serde(default)]
    pub video_url: String,
}

/// "About us" section copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub mission_statement: String,
}

/// Contact details and social links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub instagram_url: String,
    #[serde(default)]
    pub youtube_url: String,
    #[serde(default)]
    pub linkedin_url: String,
}

/// Footer copy and toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterContent {
    #[serde(default)]
    pub copyright_text: String,
    #[serde(default)]
    pub show_social_links: bool,
    #[serde(default)]
    pub newsletter_enabled: bool,
}

/// Search-engine metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoSettings {
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub og_image_url: String,
}

/// Enrollment window configuration for the admissions flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSettings {
    #[serde(default)]
    pub enrollment_open: bool,
    #[serde(default)]
    pub form_url: String,
    /// ISO date the current cohort's enrollment closes.
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub seat_limit: u32,
}

/// Site-wide operational switches.
///
/// `admin_password` is the shared secret for the elevated guest write
/// path. It lives in local state only -- the persistence layer strips it
/// from every payload, so it is never written to the content table.
/// `chat_greeting` is only meaningful while `chat_enabled` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub allow_registration: bool,
    #[serde(default)]
    pub chat_enabled: bool,
    #[serde(default)]
    pub chat_greeting: String,
    #[serde(default)]
    pub admin_password: String,
}
