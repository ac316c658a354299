// ── Mutation dispatcher ──
//
// All list-entity write operations: optimistic apply against the
// SiteStore, remote write, then reconcile or revert. ONE policy for
// every kind: apply-then-revert-on-failure. The coarse realtime refetch
// is a cache-invalidation hint, never the primary consistency
// mechanism.
//
//   add     -> pending id, optimistic insert; ack swaps in the assigned
//              row exactly once; failure removes the optimistic record.
//   update  -> optimistic merge; ack applies the server row; failure
//              restores the previous record.
//   remove  -> optimistic removal; failure re-inserts the record.

pub mod requests;

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::warn;

use secrecy::ExposeSecret;

use crate::client::SiteClient;
use crate::convert;
use crate::error::CoreError;
use crate::model::{
    AiModel, Announcement, Capability, DashboardSlide, EntityId, Faq, ListEntity, Program,
    Resource, SingletonContent, SliderCard, Student, Testimonial,
};
use crate::persist::WriteAccess;
use crate::store::{HasCollection, SiteStore};

pub use requests::{
    AboutContentPatch, AiModelPatch, AnnouncementPatch, BrandSettingsPatch, CapabilityPatch,
    ContactInfoPatch, DashboardSlidePatch, EnrollmentSettingsPatch, FaqPatch, FooterContentPatch,
    HeroContentPatch, NewAiModel, NewAnnouncement, NewCapability, NewDashboardSlide, NewFaq,
    NewProgram, NewResource, NewSliderCard, NewStudent, NewTestimonial, ProgramPatch,
    ResourcePatch, SeoSettingsPatch, SiteSettingsPatch, SliderCardPatch, StudentPatch,
    TestimonialPatch,
};

// ── Mutation bindings ────────────────────────────────────────────────

/// Binds a list entity to its draft and patch request types.
pub trait Mutable: ListEntity {
    type Draft: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync + Default;
}

impl Mutable for Program {
    type Draft = NewProgram;
    type Patch = ProgramPatch;
}

impl Mutable for Resource {
    type Draft = NewResource;
    type Patch = ResourcePatch;
}

impl Mutable for Student {
    type Draft = NewStudent;
    type Patch = StudentPatch;
}

impl Mutable for Testimonial {
    type Draft = NewTestimonial;
    type Patch = TestimonialPatch;
}

impl Mutable for SliderCard {
    type Draft = NewSliderCard;
    type Patch = SliderCardPatch;
}

impl Mutable for DashboardSlide {
    type Draft = NewDashboardSlide;
    type Patch = DashboardSlidePatch;
}

impl Mutable for AiModel {
    type Draft = NewAiModel;
    type Patch = AiModelPatch;
}

impl Mutable for Capability {
    type Draft = NewCapability;
    type Patch = CapabilityPatch;
}

impl Mutable for Faq {
    type Draft = NewFaq;
    type Patch = FaqPatch;
}

impl Mutable for Announcement {
    type Draft = NewAnnouncement;
    type Patch = AnnouncementPatch;
}

/// Binds a singleton kind to its patch request type.
pub trait MutableContent: SingletonContent {
    type Patch: Serialize + Send + Sync + Default;
}

impl MutableContent for crate::model::BrandSettings {
    type Patch = BrandSettingsPatch;
}

impl MutableContent for crate::model::HeroContent {
    type Patch = HeroContentPatch;
}

impl MutableContent for crate::model::AboutContent {
    type Patch = AboutContentPatch;
}

impl MutableContent for crate::model::ContactInfo {
    type Patch = ContactInfoPatch;
}

impl MutableContent for crate::model::FooterContent {
    type Patch = FooterContentPatch;
}

impl MutableContent for crate::model::SeoSettings {
    type Patch = SeoSettingsPatch;
}

impl MutableContent for crate::model::EnrollmentSettings {
    type Patch = EnrollmentSettingsPatch;
}

impl MutableContent for crate::model::SiteSettings {
    type Patch = SiteSettingsPatch;
}

// ── Generic list operations ──────────────────────────────────────────

impl SiteClient {
    /// Add a record: optimistic insert under a pending id, then remote
    /// insert. The acknowledged row (with its assigned id) replaces the
    /// pending record exactly once; on failure the pending record is
    /// removed and the error surfaced.
    pub async fn add<T>(&self, draft: T::Draft) -> Result<T, CoreError>
    where
        T: Mutable,
        SiteStore: HasCollection<T>,
    {
        let store = Arc::clone(self.store());
        let collection = <SiteStore as HasCollection<T>>::collection(&store);

        let id = EntityId::next_pending();
        let record: T = convert::materialize(&draft, id)?;
        collection.upsert(record);

        let row = match convert::value_to_row(T::KIND, &draft) {
            Ok(row) => row,
            Err(e) => {
                collection.remove(&id);
                return Err(e);
            }
        };

        let rest = match self.rest().await {
            Ok(rest) => rest,
            Err(e) => {
                collection.remove(&id);
                return Err(e);
            }
        };

        match rest.insert(T::KIND.table(), &row).await {
            Ok(created) => match convert::list_entity_from_row::<T>(&created) {
                Ok(persisted) => {
                    collection.replace(&id, persisted.clone());
                    Ok(persisted)
                }
                Err(e) => {
                    collection.remove(&id);
                    Err(e)
                }
            },
            Err(e) => {
                collection.remove(&id);
                warn!(kind = %T::KIND, error = %e, "insert failed, optimistic record removed");
                Err(e.into())
            }
        }
    }

    /// Update a record: optimistic merge, then remote update keyed by
    /// id. On failure the previous record is restored.
    pub async fn update<T>(&self, id: EntityId, patch: T::Patch) -> Result<(), CoreError>
    where
        T: Mutable,
        SiteStore: HasCollection<T>,
    {
        let store = Arc::clone(self.store());
        let collection = <SiteStore as HasCollection<T>>::collection(&store);

        let Some(previous) = collection.get(&id) else {
            return Err(CoreError::NotFound {
                kind: T::KIND.to_string(),
                identifier: id.to_string(),
            });
        };
        let Some(row_id) = id.as_assigned() else {
            return Err(CoreError::ValidationFailed {
                message: format!("{} {id} has not been persisted yet", T::KIND),
            });
        };

        let next: T = convert::merge(previous.as_ref(), &patch)?;
        collection.upsert(next);

        let row_patch = convert::value_to_row(T::KIND, &patch)?;
        let rest = self.rest().await?;

        match rest.update(T::KIND.table(), "id", row_id, &row_patch).await {
            Ok(acked) => {
                // The server row is authoritative (triggers, defaults).
                if let Ok(server) = convert::list_entity_from_row::<T>(&acked) {
                    collection.upsert(server);
                }
                Ok(())
            }
            Err(e) => {
                collection.upsert(previous.as_ref().clone());
                warn!(kind = %T::KIND, id = %id, error = %e, "update failed, previous record restored");
                Err(e.into())
            }
        }
    }

    /// Remove a record: optimistic removal, then remote delete. On
    /// failure the removed record is re-inserted.
    pub async fn remove<T>(&self, id: EntityId) -> Result<(), CoreError>
    where
        T: Mutable,
        SiteStore: HasCollection<T>,
    {
        let store = Arc::clone(self.store());
        let collection = <SiteStore as HasCollection<T>>::collection(&store);

        let Some(removed) = collection.remove(&id) else {
            return Err(CoreError::NotFound {
                kind: T::KIND.to_string(),
                identifier: id.to_string(),
            });
        };

        // A pending record exists only locally; nothing to delete remotely.
        let Some(row_id) = id.as_assigned() else {
            return Ok(());
        };

        let rest = match self.rest().await {
            Ok(rest) => rest,
            Err(e) => {
                collection.upsert(removed.as_ref().clone());
                return Err(e);
            }
        };

        match rest.delete(T::KIND.table(), "id", row_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                collection.upsert(removed.as_ref().clone());
                warn!(kind = %T::KIND, id = %id, error = %e, "delete failed, record restored");
                Err(e.into())
            }
        }
    }

    // ── AI model flag operations ─────────────────────────────────────

    /// Add an AI model, keeping the single-default-per-group invariant:
    /// a draft carrying `is_default` first clears the flag on every
    /// other model in its group.
    pub async fn add_model(&self, draft: NewAiModel) -> Result<AiModel, CoreError> {
        if draft.is_default {
            let group = draft.model_group.clone();
            self.clear_group_defaults(&group, None).await?;
        }
        self.add::<AiModel>(draft).await
    }

    /// Make `id` the default model of its group, clearing the flag on
    /// every other model in the group. Models outside the group are
    /// untouched. Reverts the whole group on failure.
    pub async fn set_default_model(&self, id: EntityId) -> Result<(), CoreError> {
        let store = Arc::clone(self.store());
        let collection = <SiteStore as HasCollection<AiModel>>::collection(&store);

        let Some(target) = collection.get(&id) else {
            return Err(CoreError::NotFound {
                kind: "ai_models".into(),
                identifier: id.to_string(),
            });
        };
        let Some(target_row) = id.as_assigned() else {
            return Err(CoreError::ValidationFailed {
                message: format!("ai_models {id} has not been persisted yet"),
            });
        };
        if !target.enabled {
            // is_default is only meaningful while the model is enabled.
            return Err(CoreError::ValidationFailed {
                message: format!("model {} is disabled and cannot be the default", target.name),
            });
        }

        let group = target.model_group.clone();
        let previous: Vec<Arc<AiModel>> = collection
            .snapshot()
            .iter()
            .filter(|m| m.model_group == group)
            .map(Arc::clone)
            .collect();

        // Optimistic: exactly one default in the group.
        for model in &previous {
            let mut next = model.as_ref().clone();
            next.is_default = model.id() == id;
            collection.upsert(next);
        }

        let result = self.persist_default(target_row, &previous, id).await;

        if let Err(ref e) = result {
            for model in &previous {
                collection.upsert(model.as_ref().clone());
            }
            warn!(id = %id, error = %e, "set_default_model failed, group restored");
        }
        result
    }

    /// Enable or disable a model. Disabling also clears `is_default` --
    /// dependent flags are only meaningful while the parent flag is
    /// true.
    pub async fn set_model_enabled(&self, id: EntityId, enabled: bool) -> Result<(), CoreError> {
        let store = Arc::clone(self.store());
        let collection = <SiteStore as HasCollection<AiModel>>::collection(&store);

        let Some(previous) = collection.get(&id) else {
            return Err(CoreError::NotFound {
                kind: "ai_models".into(),
                identifier: id.to_string(),
            });
        };
        let Some(row_id) = id.as_assigned() else {
            return Err(CoreError::ValidationFailed {
                message: format!("ai_models {id} has not been persisted yet"),
            });
        };

        let mut next = previous.as_ref().clone();
        next.enabled = enabled;
        if !enabled {
            next.is_default = false;
        }
        collection.upsert(next);

        let result = self.persist_enabled(row_id, enabled).await;

        if let Err(ref e) = result {
            collection.upsert(previous.as_ref().clone());
            warn!(id = %id, error = %e, "set_model_enabled failed, record restored");
        }
        result
    }

    // ── Elevated flag plumbing ───────────────────────────────────────

    async fn persist_default(
        &self,
        target_row: i64,
        group: &[Arc<AiModel>],
        target_id: EntityId,
    ) -> Result<(), CoreError> {
        let rest = self.rest().await?;
        match self.write_access().await {
            WriteAccess::Authenticated => {
                // Clear the old defaults before setting the new one so a
                // crash mid-sequence never leaves two defaults standing.
                for model in group {
                    if model.is_default && model.id() != target_id {
                        if let Some(row) = model.id().as_assigned() {
                            rest.update(
                                "ai_models",
                                "id",
                                row,
                                &json!({ "is_default": false }),
                            )
                            .await?;
                        }
                    }
                }
                rest.update(
                    "ai_models",
                    "id",
                    target_row,
                    &json!({ "is_default": true }),
                )
                .await?;
                Ok(())
            }
            WriteAccess::Elevated { password } => {
                let ok = rest
                    .rpc_bool(
                        "set_default_model",
                        &json!({
                            "model_id": target_row,
                            "admin_password": password.expose_secret(),
                        }),
                    )
                    .await?;
                if ok {
                    Ok(())
                } else {
                    Err(CoreError::AuthorizationFailed {
                        message: "set_default_model rejected the admin password".into(),
                    })
                }
            }
        }
    }

    async fn persist_enabled(&self, row_id: i64, enabled: bool) -> Result<(), CoreError> {
        let rest = self.rest().await?;
        match self.write_access().await {
            WriteAccess::Authenticated => {
                let patch = if enabled {
                    json!({ "enabled": true })
                } else {
                    json!({ "enabled": false, "is_default": false })
                };
                rest.update("ai_models", "id", row_id, &patch).await?;
                Ok(())
            }
            WriteAccess::Elevated { password } => {
                // The procedure clears is_default server-side when disabling.
                let ok = rest
                    .rpc_bool(
                        "set_model_flag",
                        &json!({
                            "model_id": row_id,
                            "flag": "enabled",
                            "value": enabled,
                            "admin_password": password.expose_secret(),
                        }),
                    )
                    .await?;
                if ok {
                    Ok(())
                } else {
                    Err(CoreError::AuthorizationFailed {
                        message: "set_model_flag rejected the admin password".into(),
                    })
                }
            }
        }
    }

    /// Clear `is_default` on every model in `group` (optionally sparing
    /// one id), both locally and remotely. Used by insert-time
    /// enforcement.
    async fn clear_group_defaults(
        &self,
        group: &str,
        spare: Option<EntityId>,
    ) -> Result<(), CoreError> {
        let store = Arc::clone(self.store());
        let collection = <SiteStore as HasCollection<AiModel>>::collection(&store);

        let defaults: Vec<Arc<AiModel>> = collection
            .snapshot()
            .iter()
            .filter(|m| m.model_group == group && m.is_default && Some(m.id()) != spare)
            .map(Arc::clone)
            .collect();

        if defaults.is_empty() {
            return Ok(());
        }

        for model in &defaults {
            let mut next = model.as_ref().clone();
            next.is_default = false;
            collection.upsert(next);
        }

        let rest = self.rest().await?;
        for model in &defaults {
            if let Some(row) = model.id().as_assigned() {
                if let Err(e) = rest
                    .update("ai_models", "id", row, &json!({ "is_default": false }))
                    .await
                {
                    for m in &defaults {
                        collection.upsert(m.as_ref().clone());
                    }
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}
