//! # keyward-client
//!
//! Client side of Keyward: keeps a local session snapshot, attaches the
//! access credential to outgoing calls, and refreshes it on expiry.
//!
//! ## Modules
//!
//! - `snapshot`: durable local session (access credential + profile)
//! - `transport`: the wire abstraction and its `reqwest` implementation
//! - `cookies`: cookie jar mirrored to disk next to the snapshot
//! - `coordinator`: single-flight refresh with a FIFO queue of waiters
//! - `gateway`: credential attachment, failure classification, replay
//! - `auth`: `AuthClient` with signup/login/me/logout

pub mod auth;
pub mod config;
pub mod cookies;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod snapshot;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthClient, Registered};
pub use config::ClientConfig;
pub use cookies::CookieFile;
pub use coordinator::{RefreshCoordinator, SessionEvent};
pub use error::{ClientError, RefreshFailure};
pub use gateway::Gateway;
pub use snapshot::{Profile, SessionSnapshot, SnapshotStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
