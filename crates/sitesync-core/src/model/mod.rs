// ── Unified domain model ──
//
// Every type in this module is the canonical, UI-shaped representation
// of a tracked entity. Consumers read these; the key translator and the
// REST layer own the store-shaped (snake_case) form.

pub mod ai;
pub mod catalog;
pub mod content;
pub mod entity_id;
pub mod kind;
pub mod media;
pub mod people;

use serde::Serialize;
use serde::de::DeserializeOwned;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use sitesync_core::model::*` gives you everything.

pub use ai::AiModel;
pub use catalog::{Capability, Faq, Program, Resource};
pub use content::{
    AboutContent, BrandSettings, ContactInfo, EnrollmentSettings, FooterContent, HeroContent,
    SeoSettings, SiteSettings,
};
pub use entity_id::EntityId;
pub use kind::{CONTENT_TABLE, EntityKind};
pub use media::{Announcement, DashboardSlide, SliderCard};
pub use people::{Student, Testimonial};

// ── Entity traits ───────────────────────────────────────────────────

/// A list entity kind: many records sharing a shape, each with an id.
///
/// The store, refresh path, and dispatcher are generic over this trait;
/// the impls below are the complete list of tracked list kinds.
pub trait ListEntity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Key used to order store snapshots. `None` falls back to id order.
    fn sort_key(&self) -> Option<i64> {
        None
    }
}

/// A singleton configuration kind: at most one logical instance.
pub trait SingletonContent:
    Clone + Send + Sync + Serialize + DeserializeOwned + Default + 'static
{
    const KIND: EntityKind;
}

// ── List entity impls ───────────────────────────────────────────────

impl ListEntity for Program {
    const KIND: EntityKind = EntityKind::Programs;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn sort_key(&self) -> Option<i64> {
        Some(i64::from(self.position))
    }
}

impl ListEntity for Resource {
    const KIND: EntityKind = EntityKind::Resources;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl ListEntity for Student {
    const KIND: EntityKind = EntityKind::Students;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl ListEntity for Testimonial {
    const KIND: EntityKind = EntityKind::Testimonials;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn sort_key(&self) -> Option<i64> {
        Some(i64::from(self.position))
    }
}

impl ListEntity for SliderCard {
    const KIND: EntityKind = EntityKind::SliderCards;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn sort_key(&self) -> Option<i64> {
        Some(i64::from(self.position))
    }
}

impl ListEntity for DashboardSlide {
    const KIND: EntityKind = EntityKind::DashboardSlides;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn sort_key(&self) -> Option<i64> {
        Some(i64::from(self.position))
    }
}

impl ListEntity for AiModel {
    const KIND: EntityKind = EntityKind::AiModels;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl ListEntity for Capability {
    const KIND: EntityKind = EntityKind::Capabilities;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn sort_key(&self) -> Option<i64> {
        Some(i64::from(self.position))
    }
}

impl ListEntity for Faq {
    const KIND: EntityKind = EntityKind::Faqs;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn sort_key(&self) -> Option<i64> {
        Some(i64::from(self.position))
    }
}

impl ListEntity for Announcement {
    const KIND: EntityKind = EntityKind::Announcements;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    /// Newest first, matching the fetch order.
    fn sort_key(&self) -> Option<i64> {
        self.published_at.map(|t| -t.timestamp_millis())
    }
}

// ── Singleton impls ─────────────────────────────────────────────────

impl SingletonContent for BrandSettings {
    const KIND: EntityKind = EntityKind::BrandSettings;
}

impl SingletonContent for HeroContent {
    const KIND: EntityKind = EntityKind::HeroContent;
}

impl SingletonContent for AboutContent {
    const KIND: EntityKind = EntityKind::AboutContent;
}

impl SingletonContent for ContactInfo {
    const KIND: EntityKind = EntityKind::ContactInfo;
}

impl SingletonContent for FooterContent {
    const KIND: EntityKind = EntityKind::FooterContent;
}

impl SingletonContent for SeoSettings {
    const KIND: EntityKind = EntityKind::SeoSettings;
}

impl SingletonContent for EnrollmentSettings {
    const KIND: EntityKind = EntityKind::EnrollmentSettings;
}

impl SingletonContent for SiteSettings {
    const KIND: EntityKind = EntityKind::SiteSettings;
}
