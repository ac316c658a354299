// ── Singleton persistence ──
//
// The strategy selector and bulk save coordinator for singleton
// configuration objects. Every write resolves a capability first:
//
//   Authenticated      -> direct upsert against `site_content`, keyed on
//                         `content_key` (insert-or-update).
//   Elevated{password} -> `save_site_content` procedure; the server
//                         validates the shared password and writes under
//                         elevated privilege. A falsy result is an
//                         authorization failure.
//
// "No session" is not "no authorization" -- the two capabilities are
// distinct, and the elevated one requires an explicit credential.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::warn;

use crate::client::SiteClient;
use crate::convert;
use crate::dispatcher::MutableContent;
use crate::error::CoreError;
use crate::keymap;
use crate::model::{
    AboutContent, BrandSettings, CONTENT_TABLE, ContactInfo, EnrollmentSettings, FooterContent,
    HeroContent, SeoSettings, SingletonContent, SiteSettings,
};
use crate::store::{HasSingleton, SiteStore};

/// Well-known default for the shared admin password when the local
/// settings never set one.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// UI-shape name of the credential field stripped from every payload.
const CREDENTIAL_FIELD: &str = "adminPassword";

/// Capability resolved per write.
pub(crate) enum WriteAccess {
    /// Live session: direct writes under the authenticated role.
    Authenticated,
    /// No session: elevated procedure gated by the shared password.
    Elevated { password: SecretString },
}

impl SiteClient {
    /// Resolve the write capability for the current state: the session
    /// when one exists, otherwise the elevated path with the password
    /// held in local settings (falling back to the well-known default).
    pub(crate) async fn write_access(&self) -> WriteAccess {
        if self.has_session().await {
            return WriteAccess::Authenticated;
        }
        let password = self
            .store()
            .site_settings()
            .map(|s| s.admin_password.clone())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_owned());
        WriteAccess::Elevated {
            password: SecretString::from(password),
        }
    }

    // ── Singleton update (optimistic merge + revert) ─────────────────

    /// Merge a partial patch into a singleton and persist it.
    ///
    /// The store value is updated synchronously; a failed remote write
    /// restores the exact prior state (including "never loaded") and
    /// re-throws so composite saves stop the sequence.
    pub async fn update_content<T>(&self, patch: T::Patch) -> Result<(), CoreError>
    where
        T: MutableContent,
        SiteStore: HasSingleton<T>,
    {
        let slot = <SiteStore as HasSingleton<T>>::slot(self.store());

        let previous = slot.get();
        let current = previous.as_deref().cloned().unwrap_or_default();
        let next: T = convert::merge(&current, &patch)?;
        slot.set(next.clone());

        match self.save_value::<T>(&next).await {
            Ok(()) => Ok(()),
            Err(e) => {
                match previous {
                    Some(value) => slot.set(value.as_ref().clone()),
                    None => slot.clear(),
                }
                warn!(kind = %T::KIND, error = %e, "content save failed, value restored");
                Err(e)
            }
        }
    }

    // ── Typed singleton update aliases ───────────────────────────────

    pub async fn update_brand_settings(
        &self,
        patch: crate::dispatcher::BrandSettingsPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<BrandSettings>(patch).await
    }

    pub async fn update_hero_content(
        &self,
        patch: crate::dispatcher::HeroContentPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<HeroContent>(patch).await
    }

    pub async fn update_about_content(
        &self,
        patch: crate::dispatcher::AboutContentPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<AboutContent>(patch).await
    }

    pub async fn update_contact_info(
        &self,
        patch: crate::dispatcher::ContactInfoPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<ContactInfo>(patch).await
    }

    pub async fn update_footer_content(
        &self,
        patch: crate::dispatcher::FooterContentPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<FooterContent>(patch).await
    }

    pub async fn update_seo_settings(
        &self,
        patch: crate::dispatcher::SeoSettingsPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<SeoSettings>(patch).await
    }

    pub async fn update_enrollment_settings(
        &self,
        patch: crate::dispatcher::EnrollmentSettingsPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<EnrollmentSettings>(patch).await
    }

    pub async fn update_site_settings(
        &self,
        patch: crate::dispatcher::SiteSettingsPatch,
    ) -> Result<(), CoreError> {
        self.update_content::<SiteSettings>(patch).await
    }

    // ── Bulk save coordinator ────────────────────────────────────────

    /// Persist every loaded singleton, in a fixed order, strictly
    /// sequentially -- the elevated procedure is not designed for
    /// concurrent invocation. The first error stops the sequence and
    /// propagates; prior steps are not rolled back.
    pub async fn save_all_content(&self) -> Result<(), CoreError> {
        self.save_current::<BrandSettings>().await?;
        self.save_current::<HeroContent>().await?;
        self.save_current::<AboutContent>().await?;
        self.save_current::<ContactInfo>().await?;
        self.save_current::<FooterContent>().await?;
        self.save_current::<SeoSettings>().await?;
        self.save_current::<EnrollmentSettings>().await?;
        self.save_current::<SiteSettings>().await?;
        Ok(())
    }

    /// Persist the current store value of one singleton kind. A slot
    /// that was never loaded or edited is skipped -- there is nothing
    /// meaningful to write.
    async fn save_current<T>(&self) -> Result<(), CoreError>
    where
        T: SingletonContent,
        SiteStore: HasSingleton<T>,
    {
        let slot = <SiteStore as HasSingleton<T>>::slot(self.store());
        match slot.get() {
            Some(value) => self.save_value::<T>(value.as_ref()).await,
            None => Ok(()),
        }
    }

    // ── Strategy selector ────────────────────────────────────────────

    /// Write one singleton value through the selected capability.
    ///
    /// The credential field is stripped from the payload before either
    /// path, so it is never written to the content table.
    pub(crate) async fn save_value<T>(&self, value: &T) -> Result<(), CoreError>
    where
        T: SingletonContent,
        SiteStore: HasSingleton<T>,
    {
        let kind = T::KIND;
        let key = kind.content_key().ok_or_else(|| {
            CoreError::Internal(format!("{kind} is not a singleton kind"))
        })?;

        let Value::Object(mut ui) = serde_json::to_value(value)? else {
            return Err(CoreError::Internal(format!(
                "singleton {kind} did not serialize to an object"
            )));
        };
        ui.remove(CREDENTIAL_FIELD);
        let payload = Value::Object(keymap::to_store(kind, &ui));

        let rest = self.rest().await?;

        match self.write_access().await {
            WriteAccess::Authenticated => {
                let row = json!({ "content_key": key, "payload": payload });
                let created = rest.upsert(CONTENT_TABLE, "content_key", &row).await?;
                // Cache the row id on first persisted write.
                if let Some(row_id) = created.get("id").and_then(Value::as_i64) {
                    <SiteStore as HasSingleton<T>>::slot(self.store()).set_row_id(row_id);
                }
                Ok(())
            }
            WriteAccess::Elevated { password } => {
                let ok = rest
                    .rpc_bool(
                        "save_site_content",
                        &json!({
                            "content_key": key,
                            "payload": payload,
                            "admin_password": password.expose_secret(),
                        }),
                    )
                    .await?;
                if ok {
                    Ok(())
                } else {
                    Err(CoreError::AuthorizationFailed {
                        message: format!(
                            "save_site_content rejected the admin password for {key}"
                        ),
                    })
                }
            }
        }
    }
}
