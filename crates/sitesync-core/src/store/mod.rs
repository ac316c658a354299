// ── Central reactive entity store ──
//
// Thread-safe storage for every tracked entity kind. The store is the
// sole owner of the in-memory mirror: UI consumers read snapshots and
// subscriptions, and all writes arrive through the mutation dispatcher
// or the refresh path -- never directly.

pub(crate) mod collection;
pub(crate) mod refresh;
pub(crate) mod singleton;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{
    AboutContent, AiModel, Announcement, BrandSettings, Capability, ContactInfo, DashboardSlide,
    EnrollmentSettings, Faq, FooterContent, HeroContent, ListEntity, Program, Resource,
    SeoSettings, SingletonContent, SiteSettings, SliderCard, Student, Testimonial,
};
use crate::stream::EntityStream;
use collection::EntityCollection;
use singleton::SingletonSlot;

pub(crate) use refresh::RefreshSnapshot;

/// Central reactive store for all tracked entities.
///
/// Mutations are broadcast to subscribers via `watch` channels; reads
/// are cheap `Arc` clones of prebuilt snapshots.
pub struct SiteStore {
    // List collections
    pub(crate) programs: EntityCollection<Program>,
    pub(crate) resources: EntityCollection<Resource>,
    pub(crate) students: EntityCollection<Student>,
    pub(crate) testimonials: EntityCollection<Testimonial>,
    pub(crate) slider_cards: EntityCollection<SliderCard>,
    pub(crate) dashboard_slides: EntityCollection<DashboardSlide>,
    pub(crate) ai_models: EntityCollection<AiModel>,
    pub(crate) capabilities: EntityCollection<Capability>,
    pub(crate) faqs: EntityCollection<Faq>,
    pub(crate) announcements: EntityCollection<Announcement>,

    // Singleton slots
    pub(crate) brand_settings: SingletonSlot<BrandSettings>,
    pub(crate) hero_content: SingletonSlot<HeroContent>,
    pub(crate) about_content: SingletonSlot<AboutContent>,
    pub(crate) contact_info: SingletonSlot<ContactInfo>,
    pub(crate) footer_content: SingletonSlot<FooterContent>,
    pub(crate) seo_settings: SingletonSlot<SeoSettings>,
    pub(crate) enrollment_settings: SingletonSlot<EnrollmentSettings>,
    pub(crate) site_settings: SingletonSlot<SiteSettings>,

    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl SiteStore {
    pub fn new() -> Self {
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            programs: EntityCollection::new(),
            resources: EntityCollection::new(),
            students: EntityCollection::new(),
            testimonials: EntityCollection::new(),
            slider_cards: EntityCollection::new(),
            dashboard_slides: EntityCollection::new(),
            ai_models: EntityCollection::new(),
            capabilities: EntityCollection::new(),
            faqs: EntityCollection::new(),
            announcements: EntityCollection::new(),
            brand_settings: SingletonSlot::new(),
            hero_content: SingletonSlot::new(),
            about_content: SingletonSlot::new(),
            contact_info: SingletonSlot::new(),
            footer_content: SingletonSlot::new(),
            seo_settings: SingletonSlot::new(),
            enrollment_settings: SingletonSlot::new(),
            site_settings: SingletonSlot::new(),
            last_full_refresh,
        }
    }

    // ── List snapshot accessors ──────────────────────────────────────

    pub fn programs(&self) -> Arc<Vec<Arc<Program>>> {
        self.programs.snapshot()
    }

    pub fn resources(&self) -> Arc<Vec<Arc<Resource>>> {
        self.resources.snapshot()
    }

    pub fn students(&self) -> Arc<Vec<Arc<Student>>> {
        self.students.snapshot()
    }

    pub fn testimonials(&self) -> Arc<Vec<Arc<Testimonial>>> {
        self.testimonials.snapshot()
    }

    pub fn slider_cards(&self) -> Arc<Vec<Arc<SliderCard>>> {
        self.slider_cards.snapshot()
    }

    pub fn dashboard_slides(&self) -> Arc<Vec<Arc<DashboardSlide>>> {
        self.dashboard_slides.snapshot()
    }

    pub fn ai_models(&self) -> Arc<Vec<Arc<AiModel>>> {
        self.ai_models.snapshot()
    }

    pub fn capabilities(&self) -> Arc<Vec<Arc<Capability>>> {
        self.capabilities.snapshot()
    }

    pub fn faqs(&self) -> Arc<Vec<Arc<Faq>>> {
        self.faqs.snapshot()
    }

    pub fn announcements(&self) -> Arc<Vec<Arc<Announcement>>> {
        self.announcements.snapshot()
    }

    // ── List subscriptions ───────────────────────────────────────────

    pub fn subscribe_programs(&self) -> EntityStream<Program> {
        EntityStream::new(self.programs.subscribe())
    }

    pub fn subscribe_resources(&self) -> EntityStream<Resource> {
        EntityStream::new(self.resources.subscribe())
    }

    pub fn subscribe_students(&self) -> EntityStream<Student> {
        EntityStream::new(self.students.subscribe())
    }

    pub fn subscribe_testimonials(&self) -> EntityStream<Testimonial> {
        EntityStream::new(self.testimonials.subscribe())
    }

    pub fn subscribe_slider_cards(&self) -> EntityStream<SliderCard> {
        EntityStream::new(self.slider_cards.subscribe())
    }

    pub fn subscribe_dashboard_slides(&self) -> EntityStream<DashboardSlide> {
        EntityStream::new(self.dashboard_slides.subscribe())
    }

    pub fn subscribe_ai_models(&self) -> EntityStream<AiModel> {
        EntityStream::new(self.ai_models.subscribe())
    }

    pub fn subscribe_capabilities(&self) -> EntityStream<Capability> {
        EntityStream::new(self.capabilities.subscribe())
    }

    pub fn subscribe_faqs(&self) -> EntityStream<Faq> {
        EntityStream::new(self.faqs.subscribe())
    }

    pub fn subscribe_announcements(&self) -> EntityStream<Announcement> {
        EntityStream::new(self.announcements.subscribe())
    }

    // ── Singleton accessors ──────────────────────────────────────────

    pub fn brand_settings(&self) -> Option<Arc<BrandSettings>> {
        self.brand_settings.get()
    }

    pub fn hero_content(&self) -> Option<Arc<HeroContent>> {
        self.hero_content.get()
    }

    pub fn about_content(&self) -> Option<Arc<AboutContent>> {
        self.about_content.get()
    }

    pub fn contact_info(&self) -> Option<Arc<ContactInfo>> {
        self.contact_info.get()
    }

    pub fn footer_content(&self) -> Option<Arc<FooterContent>> {
        self.footer_content.get()
    }

    pub fn seo_settings(&self) -> Option<Arc<SeoSettings>> {
        self.seo_settings.get()
    }

    pub fn enrollment_settings(&self) -> Option<Arc<EnrollmentSettings>> {
        self.enrollment_settings.get()
    }

    pub fn site_settings(&self) -> Option<Arc<SiteSettings>> {
        self.site_settings.get()
    }

    // ── Singleton subscriptions ──────────────────────────────────────

    pub fn subscribe_brand_settings(&self) -> watch::Receiver<Option<Arc<BrandSettings>>> {
        self.brand_settings.subscribe()
    }

    pub fn subscribe_hero_content(&self) -> watch::Receiver<Option<Arc<HeroContent>>> {
        self.hero_content.subscribe()
    }

    pub fn subscribe_about_content(&self) -> watch::Receiver<Option<Arc<AboutContent>>> {
        self.about_content.subscribe()
    }

    pub fn subscribe_contact_info(&self) -> watch::Receiver<Option<Arc<ContactInfo>>> {
        self.contact_info.subscribe()
    }

    pub fn subscribe_footer_content(&self) -> watch::Receiver<Option<Arc<FooterContent>>> {
        self.footer_content.subscribe()
    }

    pub fn subscribe_seo_settings(&self) -> watch::Receiver<Option<Arc<SeoSettings>>> {
        self.seo_settings.subscribe()
    }

    pub fn subscribe_enrollment_settings(&self) -> watch::Receiver<Option<Arc<EnrollmentSettings>>> {
        self.enrollment_settings.subscribe()
    }

    pub fn subscribe_site_settings(&self) -> watch::Receiver<Option<Arc<SiteSettings>>> {
        self.site_settings.subscribe()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// How long ago the last full refresh occurred, or `None` if never
    /// refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_full_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for SiteStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Generic store bindings ───────────────────────────────────────────
//
// The dispatcher and refresh path are generic over entity kinds; these
// traits bind each kind to its collection/slot so that code is written
// once instead of per kind.

pub(crate) trait HasCollection<T: ListEntity> {
    fn collection(&self) -> &EntityCollection<T>;
}

pub(crate) trait HasSingleton<T: SingletonContent> {
    fn slot(&self) -> &SingletonSlot<T>;
}

macro_rules! bind_collection {
    ($ty:ty, $field:ident) => {
        impl HasCollection<$ty> for SiteStore {
            fn collection(&self) -> &EntityCollection<$ty> {
                &self.$field
            }
        }
    };
}

macro_rules! bind_singleton {
    ($ty:ty, $field:ident) => {
        impl HasSingleton<$ty> for SiteStore {
            fn slot(&self) -> &SingletonSlot<$ty> {
                &self.$field
            }
        }
    };
}

bind_collection!(Program, programs);
bind_collection!(Resource, resources);
bind_collection!(Student, students);
bind_collection!(Testimonial, testimonials);
bind_collection!(SliderCard, slider_cards);
bind_collection!(DashboardSlide, dashboard_slides);
bind_collection!(AiModel, ai_models);
bind_collection!(Capability, capabilities);
bind_collection!(Faq, faqs);
bind_collection!(Announcement, announcements);

bind_singleton!(BrandSettings, brand_settings);
bind_singleton!(HeroContent, hero_content);
bind_singleton!(AboutContent, about_content);
bind_singleton!(ContactInfo, contact_info);
bind_singleton!(FooterContent, footer_content);
bind_singleton!(SeoSettings, seo_settings);
bind_singleton!(EnrollmentSettings, enrollment_settings);
bind_singleton!(SiteSettings, site_settings);
