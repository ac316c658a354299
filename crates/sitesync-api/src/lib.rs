// sitesync-api: Async Rust client for the Lumeo remote store
// (REST tables, remote procedures, auth, realtime change channel)

pub mod auth;
pub mod error;
pub mod realtime;
pub mod rest;
pub mod transport;

pub use auth::{AuthClient, Identity, Session};
pub use error::Error;
pub use realtime::{ChangeAction, ChangeEvent, ChannelHandle, ReconnectConfig};
pub use rest::RestClient;
pub use transport::TransportConfig;
