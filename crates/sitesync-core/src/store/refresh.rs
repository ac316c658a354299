// ── Full refresh application logic ──
//
// Applies a bulk snapshot fetched from the remote store into the
// SiteStore, replacing the mirror wholesale. The refetch is the coarse
// consistency mechanism: whatever the server returned wins, including
// over optimistic records whose acknowledgment is still in flight.

use std::collections::HashSet;

use chrono::Utc;

use super::SiteStore;
use super::collection::EntityCollection;
use super::singleton::SingletonSlot;
use crate::model::{
    AboutContent, AiModel, Announcement, BrandSettings, Capability, ContactInfo, DashboardSlide,
    EnrollmentSettings, EntityId, Faq, FooterContent, HeroContent, ListEntity, Program, Resource,
    SeoSettings, SingletonContent, SiteSettings, SliderCard, Student, Testimonial,
};

/// Upsert all incoming entities, then prune any existing ids not in the
/// incoming set. This avoids the brief empty state that a clear-then-
/// insert approach would cause.
fn upsert_and_prune<T: ListEntity>(collection: &EntityCollection<T>, items: Vec<T>) {
    let incoming: HashSet<EntityId> = items.iter().map(ListEntity::id).collect();
    for item in items {
        collection.upsert(item);
    }
    for existing in collection.ids() {
        if !incoming.contains(&existing) {
            collection.remove(&existing);
        }
    }
}

/// Replace a singleton slot from a fetched content row.
///
/// A key with no remote row leaves the local value untouched -- wiping a
/// never-persisted local draft on every unrelated refetch would make
/// guest editing impossible.
fn apply_singleton<T: SingletonContent>(slot: &SingletonSlot<T>, fetched: Option<(i64, T)>) {
    if let Some((row_id, value)) = fetched {
        slot.set_row_id(row_id);
        slot.set(value);
    }
}

/// All collections fetched during a single refresh cycle.
///
/// Singleton entries carry the `site_content` row id alongside the
/// decoded payload; `None` means the key has no remote row yet.
#[derive(Default)]
pub(crate) struct RefreshSnapshot {
    pub programs: Vec<Program>,
    pub resources: Vec<Resource>,
    pub students: Vec<Student>,
    pub testimonials: Vec<Testimonial>,
    pub slider_cards: Vec<SliderCard>,
    pub dashboard_slides: Vec<DashboardSlide>,
    pub ai_models: Vec<AiModel>,
    pub capabilities: Vec<Capability>,
    pub faqs: Vec<Faq>,
    pub announcements: Vec<Announcement>,

    pub brand_settings: Option<(i64, BrandSettings)>,
    pub hero_content: Option<(i64, HeroContent)>,
    pub about_content: Option<(i64, AboutContent)>,
    pub contact_info: Option<(i64, ContactInfo)>,
    pub footer_content: Option<(i64, FooterContent)>,
    pub seo_settings: Option<(i64, SeoSettings)>,
    pub enrollment_settings: Option<(i64, EnrollmentSettings)>,
    pub site_settings: Option<(i64, SiteSettings)>,
}

impl SiteStore {
    /// Apply a full refresh snapshot.
    ///
    /// Uses upsert-then-prune per collection: incoming entities are
    /// upserted first, then ids absent from the incoming set are
    /// removed, so subscribers never observe an empty intermediate
    /// state.
    pub(crate) fn apply_snapshot(&self, snap: RefreshSnapshot) {
        upsert_and_prune(&self.programs, snap.programs);
        upsert_and_prune(&self.resources, snap.resources);
        upsert_and_prune(&self.students, snap.students);
        upsert_and_prune(&self.testimonials, snap.testimonials);
        upsert_and_prune(&self.slider_cards, snap.slider_cards);
        upsert_and_prune(&self.dashboard_slides, snap.dashboard_slides);
        upsert_and_prune(&self.ai_models, snap.ai_models);
        upsert_and_prune(&self.capabilities, snap.capabilities);
        upsert_and_prune(&self.faqs, snap.faqs);
        upsert_and_prune(&self.announcements, snap.announcements);

        apply_singleton(&self.brand_settings, snap.brand_settings);
        apply_singleton(&self.hero_content, snap.hero_content);
        apply_singleton(&self.about_content, snap.about_content);
        apply_singleton(&self.contact_info, snap.contact_info);
        apply_singleton(&self.footer_content, snap.footer_content);
        apply_singleton(&self.seo_settings, snap.seo_settings);
        apply_singleton(&self.enrollment_settings, snap.enrollment_settings);
        apply_singleton(&self.site_settings, snap.site_settings);

        let _ = self.last_full_refresh.send(Some(Utc::now()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn program(id: i64, title: &str) -> Program {
        Program {
            id: EntityId::Assigned(id),
            title: title.into(),
            description: String::new(),
            image_url: String::new(),
            level: String::new(),
            duration_weeks: 0,
            enabled: true,
            position: 0,
        }
    }

    #[test]
    fn refresh_prunes_ids_missing_from_the_server_view() {
        let store = SiteStore::new();
        store.programs.upsert(program(1, "stale"));
        store.programs.upsert(program(2, "kept"));

        store.apply_snapshot(RefreshSnapshot {
            programs: vec![program(2, "kept"), program(3, "new")],
            ..RefreshSnapshot::default()
        });

        let snap = store.programs();
        let ids: Vec<_> = snap.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![EntityId::Assigned(2), EntityId::Assigned(3)]);
    }

    #[test]
    fn refresh_clobbers_pending_records() {
        // Accepted race: a refetch landing mid-add replaces the mirror
        // with the server's view, pending records included.
        let store = SiteStore::new();
        store.programs.upsert(Program {
            id: EntityId::Pending(1),
            ..program(0, "optimistic")
        });

        store.apply_snapshot(RefreshSnapshot {
            programs: vec![program(5, "from-server")],
            ..RefreshSnapshot::default()
        });

        assert_eq!(store.programs().len(), 1);
        assert!(store.programs.get(&EntityId::Pending(1)).is_none());
    }

    #[test]
    fn missing_singleton_rows_leave_local_values() {
        let store = SiteStore::new();
        store.site_settings.set(SiteSettings {
            admin_password: "local-secret".into(),
            ..SiteSettings::default()
        });

        store.apply_snapshot(RefreshSnapshot {
            brand_settings: Some((
                7,
                BrandSettings {
                    brand_name: "Lumeo".into(),
                    ..BrandSettings::default()
                },
            )),
            ..RefreshSnapshot::default()
        });

        // Fetched key replaced; absent key untouched.
        assert_eq!(store.brand_settings().unwrap().brand_name, "Lumeo");
        assert_eq!(store.site_settings().unwrap().admin_password, "local-secret");
        assert_eq!(store.brand_settings.row_id(), Some(7));
        assert!(store.last_full_refresh().is_some());
    }
}
