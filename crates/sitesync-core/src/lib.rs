//! Synchronized state layer between `sitesync-api` and UI consumers.
//!
//! This crate owns the in-memory mirror of the remote store and every
//! rule about how it changes:
//!
//! - **[`SiteClient`]** — Central facade managing the full lifecycle:
//!   [`connect()`](SiteClient::connect) builds the remote clients, loads an
//!   initial snapshot, then subscribes the realtime change listener.
//!   Mutations are typed methods on the client -- optimistic store apply,
//!   remote write, revert on failure, for every entity kind uniformly.
//!
//! - **[`SiteStore`]** — Reactive storage built on `EntityCollection<T>`
//!   (`DashMap` + `tokio::sync::watch` channels) plus one slot per
//!   singleton configuration object. Consumers read snapshots and
//!   subscriptions; only the dispatcher and the refresh path write.
//!
//! - **[`keymap`]** — Static per-kind field tables translating between
//!   UI-shaped (camelCase) and store-shaped (snake_case) records. Total
//!   and invertible per kind; unknown keys never cross the boundary.
//!
//! - **Persistence strategy** — Singleton writes resolve a capability
//!   per write: direct upsert under a live session, or the
//!   password-gated elevated procedure without one.
//!   [`save_all_content()`](SiteClient::save_all_content) persists the
//!   fixed singleton list sequentially, stopping at the first error.
//!
//! - **Coarse invalidation** — Any realtime notification triggers a full
//!   refetch that replaces the mirror wholesale; the refetch is a cache
//!   hint, never the primary consistency mechanism.

pub mod client;
pub mod config;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod keymap;
pub mod listener;
pub mod model;
pub mod persist;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{ConnectionState, SiteClient};
pub use config::StoreConfig;
pub use dispatcher::{Mutable, MutableContent};
pub use dispatcher::requests::*;
pub use error::CoreError;
pub use persist::DEFAULT_ADMIN_PASSWORD;
pub use store::SiteStore;
pub use stream::EntityStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AboutContent,
    AiModel,
    Announcement,
    BrandSettings,
    Capability,
    ContactInfo,
    DashboardSlide,
    EnrollmentSettings,
    EntityId,
    EntityKind,
    Faq,
    FooterContent,
    HeroContent,
    ListEntity,
    Program,
    Resource,
    SeoSettings,
    SingletonContent,
    SiteSettings,
    SliderCard,
    Student,
    Testimonial,
};

// The auth boundary types come from the api crate; consumers should not
// need to depend on it directly.
pub use sitesync_api::{Identity, Session};
