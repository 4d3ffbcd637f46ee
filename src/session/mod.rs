//! Session and identity layer.
//!
//! The authenticated principal exists in two independently maintained
//! representations: an OAuth provider session and a locally persisted
//! record plus bearer token. This module owns both and everything that
//! keeps the rest of the client in agreement about who is signed in:
//!
//! - [`storage`] — two string key/value areas (local, session) persisted
//!   as JSON files, tolerating legacy duplicate token keys
//! - [`identity`] — the typed accessor (`SessionStore`) every mutation
//!   path goes through
//! - [`reconciler`] — merges the provider session and the local record
//!   into one authoritative `Option<Identity>`
//! - [`notifier`] — login/logout/update signals plus a polling fallback
//!   for out-of-band storage writes
//!
//! ## Contract
//! Any code path that writes or clears identity keys MUST raise the
//! matching signal. `SessionStore` guarantees this by construction; the
//! poller exists only to observe writes made by other processes sharing
//! the same state directory.

pub mod identity;
pub mod notifier;
pub mod reconciler;
pub mod storage;

pub use identity::{Identity, LocalRecord, Role, SessionStore};
pub use notifier::{spawn_session_poller, AuthNotifier, AuthSignal};
pub use reconciler::{reconcile, ProviderClaims, ProviderSession, Reconciled};
pub use storage::{Area, SessionStorage};
