// ── SiteClient facade ──
//
// Full lifecycle management for a synchronized store connection.
// Handles authentication, the initial data load, the realtime change
// listener, and access to the reactive SiteStore. Constructed once at
// process start and passed by reference to consumers -- all mutation
// goes through the typed dispatcher methods, never raw setters.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sitesync_api::realtime::ReconnectConfig;
use sitesync_api::{AuthClient, ChannelHandle, Identity, RestClient, Session, TransportConfig};

use crate::config::StoreConfig;
use crate::convert;
use crate::error::CoreError;
use crate::listener;
use crate::model::{
    AiModel, Announcement, CONTENT_TABLE, Capability, DashboardSlide, EntityKind, Faq, ListEntity,
    Program, Resource, SiteSettings, SliderCard, Student, Testimonial,
};
use crate::store::{RefreshSnapshot, SiteStore};

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

// ── SiteClient ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ClientInner>`. Owns the SiteStore, the
/// remote clients, the optional auth session, and the realtime change
/// listener.
#[derive(Clone)]
pub struct SiteClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) config: StoreConfig,
    pub(crate) store: Arc<SiteStore>,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    /// Child token for the current connection -- cancelled on disconnect,
    /// replaced on reconnect (avoids permanent cancellation).
    cancel_child: Mutex<CancellationToken>,
    rest: Mutex<Option<RestClient>>,
    auth: Mutex<Option<AuthClient>>,
    session: Mutex<Option<Session>>,
    channel: Mutex<Option<ChannelHandle>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl SiteClient {
    /// Create a new client from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to load data and start the
    /// change listener.
    pub fn new(config: StoreConfig) -> Self {
        let store = Arc::new(SiteStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ClientInner {
                config,
                store,
                connection_state,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                rest: Mutex::new(None),
                auth: Mutex::new(None),
                session: Mutex::new(None),
                channel: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the client configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Access the underlying SiteStore.
    pub fn store(&self) -> &Arc<SiteStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the remote store.
    ///
    /// Builds the REST and auth clients, performs the initial full
    /// refresh, and (when enabled) subscribes the realtime change
    /// listener.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let transport = TransportConfig {
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        };

        let rest = RestClient::new(config.url.clone(), &transport)?;
        let auth = AuthClient::new(config.url.clone(), &transport)?;
        *self.inner.rest.lock().await = Some(rest);
        *self.inner.auth.lock().await = Some(auth);

        // Initial data load
        self.full_refresh().await?;

        // Realtime change listener
        if config.realtime_enabled {
            let ws_url = config.realtime_url().map_err(|e| CoreError::Config {
                message: format!("cannot derive realtime URL: {e}"),
            })?;
            let tables: Vec<String> = EntityKind::watched_tables()
                .into_iter()
                .map(str::to_owned)
                .collect();

            let handle = ChannelHandle::connect(
                ws_url,
                tables,
                ReconnectConfig::default(),
                child.child_token(),
            );
            let events = handle.subscribe();
            *self.inner.channel.lock().await = Some(handle);

            let mut handles = self.inner.task_handles.lock().await;
            handles.push(tokio::spawn(listener::change_feed_task(
                self.clone(),
                events,
                child.clone(),
            )));
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!("connected to remote store");
        Ok(())
    }

    /// Disconnect from the store.
    ///
    /// Cancels background tasks, shuts down the realtime channel, and
    /// resets the connection state.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent -- allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        if let Some(channel) = self.inner.channel.lock().await.take() {
            channel.shutdown();
        }

        if let Some(session) = self.inner.session.lock().await.take() {
            if let Some(ref auth) = *self.inner.auth.lock().await {
                if let Err(e) = auth.sign_out(&session).await {
                    warn!(error = %e, "sign-out failed (non-fatal)");
                }
            }
        }

        *self.inner.rest.lock().await = None;
        *self.inner.auth.lock().await = None;

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Authentication ───────────────────────────────────────────

    /// Sign in with email + password.
    ///
    /// On success the REST client is rebuilt with the session bearer so
    /// subsequent writes run under the authenticated role.
    pub async fn sign_in(&self, email: &str, password: &secrecy::SecretString) -> Result<Identity, CoreError> {
        let auth = {
            let guard = self.inner.auth.lock().await;
            guard.as_ref().cloned().ok_or(CoreError::Disconnected)?
        };

        let session = auth.sign_in(email, password).await?;
        let identity = Identity::from(&session);

        let transport = TransportConfig {
            api_key: self.inner.config.api_key.clone(),
            timeout: self.inner.config.timeout,
        };
        let http = transport.build_client_with_token(&session.access_token)?;
        let rest = RestClient::with_client(http, self.inner.config.url.clone());

        *self.inner.rest.lock().await = Some(rest);
        *self.inner.session.lock().await = Some(session);

        info!(identity = %identity.id, "signed in");
        Ok(identity)
    }

    /// Drop the session and fall back to the anonymous client.
    pub async fn sign_out(&self) -> Result<(), CoreError> {
        let session = self.inner.session.lock().await.take();
        let Some(session) = session else {
            return Ok(());
        };

        let auth = {
            let guard = self.inner.auth.lock().await;
            guard.as_ref().cloned()
        };
        if let Some(auth) = auth {
            if let Err(e) = auth.sign_out(&session).await {
                warn!(error = %e, "remote sign-out failed (non-fatal)");
            }
        }

        let transport = TransportConfig {
            api_key: self.inner.config.api_key.clone(),
            timeout: self.inner.config.timeout,
        };
        let rest = RestClient::new(self.inner.config.url.clone(), &transport)?;
        *self.inner.rest.lock().await = Some(rest);
        Ok(())
    }

    /// Whether a live authenticated session exists.
    pub async fn has_session(&self) -> bool {
        self.inner.session.lock().await.is_some()
    }

    /// The identity surfaced to consumers: session-derived when signed
    /// in, the fixed local-admin guest shape otherwise -- never null.
    pub async fn identity(&self) -> Identity {
        match *self.inner.session.lock().await {
            Some(ref session) => Identity::from(session),
            None => Identity::local_admin(),
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch every tracked entity kind and replace the SiteStore
    /// contents with the server's view.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let rest = self.rest().await?;

        let (programs, resources, students, testimonials, slider_cards) = tokio::join!(
            fetch_list::<Program>(&rest),
            fetch_list::<Resource>(&rest),
            fetch_list::<Student>(&rest),
            fetch_list::<Testimonial>(&rest),
            fetch_list::<SliderCard>(&rest),
        );

        let (dashboard_slides, ai_models, capabilities, faqs, announcements) = tokio::join!(
            fetch_list::<DashboardSlide>(&rest),
            fetch_list::<AiModel>(&rest),
            fetch_list::<Capability>(&rest),
            fetch_list::<Faq>(&rest),
            fetch_list::<Announcement>(&rest),
        );

        let content_rows = rest.select(CONTENT_TABLE, None).await?;

        let mut snap = RefreshSnapshot {
            programs: programs?,
            resources: resources?,
            students: students?,
            testimonials: testimonials?,
            slider_cards: slider_cards?,
            dashboard_slides: dashboard_slides?,
            ai_models: ai_models?,
            capabilities: capabilities?,
            faqs: faqs?,
            announcements: announcements?,
            ..RefreshSnapshot::default()
        };

        for row in &content_rows {
            let Some(key) = row.get("content_key").and_then(|v| v.as_str()) else {
                debug!("content row without content_key, skipping");
                continue;
            };
            let Some(row_id) = row.get("id").and_then(serde_json::Value::as_i64) else {
                debug!(key, "content row without id, skipping");
                continue;
            };
            let Some(payload) = row.get("payload").filter(|v| v.is_object()) else {
                debug!(key, "content row without a payload object, skipping");
                continue;
            };

            match key {
                "brand_settings" => {
                    snap.brand_settings = Some((row_id, convert::singleton_from_payload(payload)?));
                }
                "hero_content" => {
                    snap.hero_content = Some((row_id, convert::singleton_from_payload(payload)?));
                }
                "about_content" => {
                    snap.about_content = Some((row_id, convert::singleton_from_payload(payload)?));
                }
                "contact_info" => {
                    snap.contact_info = Some((row_id, convert::singleton_from_payload(payload)?));
                }
                "footer_content" => {
                    snap.footer_content = Some((row_id, convert::singleton_from_payload(payload)?));
                }
                "seo_settings" => {
                    snap.seo_settings = Some((row_id, convert::singleton_from_payload(payload)?));
                }
                "enrollment_settings" => {
                    snap.enrollment_settings =
                        Some((row_id, convert::singleton_from_payload(payload)?));
                }
                "site_settings" => {
                    // The credential column is never stored, so the decoded
                    // value carries an empty password; keep the local one.
                    let mut settings: SiteSettings = convert::singleton_from_payload(payload)?;
                    if let Some(current) = self.inner.store.site_settings() {
                        settings.admin_password = current.admin_password.clone();
                    }
                    snap.site_settings = Some((row_id, settings));
                }
                other => {
                    debug!(key = other, "unknown content key, skipping");
                }
            }
        }

        self.inner.store.apply_snapshot(snap);

        debug!(
            programs = self.inner.store.programs().len(),
            ai_models = self.inner.store.ai_models().len(),
            "data refresh complete"
        );

        Ok(())
    }

    // ── Supplementary reads ──────────────────────────────────────

    /// Fetch the masked form of the shared admin password for display
    /// in the admin console (the clear value never leaves the server).
    pub async fn masked_admin_password(&self) -> Result<String, CoreError> {
        let rest = self.rest().await?;
        Ok(rest
            .rpc_scalar(
                "get_masked_secret",
                &serde_json::json!({ "name": "admin_password" }),
            )
            .await?)
    }

    // ── Internal plumbing ────────────────────────────────────────

    /// Clone the current REST client out of its lock, or fail if the
    /// client is not connected.
    pub(crate) async fn rest(&self) -> Result<RestClient, CoreError> {
        let guard = self.inner.rest.lock().await;
        guard.as_ref().cloned().ok_or(CoreError::Disconnected)
    }
}

/// Fetch and convert one list kind.
async fn fetch_list<T: ListEntity>(rest: &RestClient) -> Result<Vec<T>, CoreError> {
    let kind = T::KIND;
    let rows = rest.select(kind.table(), kind.fetch_order()).await?;
    rows.iter().map(convert::list_entity_from_row).collect()
}
