//! Typed identity accessor over the raw session storage.
//!
//! `SessionStore` is the single mutation path for identity state. The
//! read path tolerates legacy duplicate token keys and malformed
//! records; the write path lands on the canonical keys only. Every
//! mutation raises the matching [`AuthSignal`](super::AuthSignal)
//! synchronously, so in-process observers never depend on polling.

use crate::session::notifier::{AuthNotifier, AuthSignal};
use crate::session::reconciler::{reconcile, ProviderClaims, ProviderSession, Reconciled};
use crate::session::storage::{
    Area, SessionStorage, StorageSnapshot, CANONICAL_TOKEN_KEY, PROVIDER_KEY, USER_KEY,
};
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Closed role enumeration. Determines navigation, dashboard content,
/// and page-guard behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Host,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Host => "host",
            Self::Admin => "admin",
        }
    }

    /// Strict parse; empty or unknown strings yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "host" => Some(Self::Host),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated principal, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Bearer token, when the local record was synchronized with the
    /// backend. Provider-derived identities carry none.
    pub token: Option<String>,
}

/// The locally persisted identity record, as written under the `user`
/// key. The role may be absent or empty in records written by a failed
/// or partial OAuth exchange; such records do not take precedence
/// during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "role_or_none")]
    pub role: Option<Role>,
}

/// Accepts `"user" | "host" | "admin"`, treating anything else
/// (including `""` and absence) as no role.
fn role_or_none<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse))
}

/// Typed accessor and single mutation path for session state.
pub struct SessionStore {
    storage: SessionStorage,
    notifier: AuthNotifier,
}

impl SessionStore {
    /// Open the session store rooted at the given state directory.
    pub fn open(state_dir: &Path) -> Result<Self> {
        Ok(Self {
            storage: SessionStorage::open(state_dir)?,
            notifier: AuthNotifier::new(),
        })
    }

    /// Handle for subscribing to and raising auth signals.
    pub fn notifier(&self) -> AuthNotifier {
        self.notifier.clone()
    }

    /// Direct access to the underlying storage areas. Writes made here
    /// bypass signal dispatch; the poller exists to catch exactly that.
    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    /// The locally persisted identity record, if present and parseable.
    /// A malformed record is purged and treated as absent.
    pub fn local_record(&self) -> Option<LocalRecord> {
        let raw = self.storage.get(Area::Local, USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("purging malformed local identity record: {e}");
                if let Err(e) = self.storage.remove(Area::Local, USER_KEY) {
                    tracing::warn!("failed to remove malformed record: {e}");
                }
                None
            }
        }
    }

    /// The provider (OAuth) session, read from the session area. Stored
    /// provider state is always settled; `Loading` never persists.
    pub fn provider_session(&self) -> ProviderSession {
        let raw = match self.storage.get(Area::Session, PROVIDER_KEY) {
            Some(raw) => raw,
            None => return ProviderSession::Unauthenticated,
        };
        match serde_json::from_str::<ProviderClaims>(&raw) {
            Ok(claims) => ProviderSession::Authenticated(claims),
            Err(e) => {
                tracing::warn!("purging malformed provider session: {e}");
                if let Err(e) = self.storage.remove(Area::Session, PROVIDER_KEY) {
                    tracing::warn!("failed to remove malformed provider session: {e}");
                }
                ProviderSession::Unauthenticated
            }
        }
    }

    /// First usable bearer token across the candidate keys, freshest
    /// on-disk state.
    pub fn bearer_token(&self) -> Option<String> {
        self.storage.reload();
        self.storage.first_usable_token()
    }

    /// Reconcile both identity sources into the current identity.
    pub fn current_identity(&self) -> Option<Identity> {
        self.storage.reload();
        let local = self.local_record();
        let token = self.storage.first_usable_token();
        match reconcile(&self.provider_session(), local.as_ref(), token.as_deref()) {
            Reconciled::Resolved(identity) => identity,
            // Stored provider state is never Loading
            Reconciled::Deferred => None,
        }
    }

    /// Persist a fresh login: local record plus canonical token key.
    pub fn login(&self, record: &LocalRecord, token: &str) -> Result<()> {
        self.write_record(record)?;
        self.storage.set(Area::Local, CANONICAL_TOKEN_KEY, token)?;
        self.notifier.emit(AuthSignal::Login);
        Ok(())
    }

    /// Rewrite the local record (profile update), keeping the token.
    pub fn update_identity(&self, record: &LocalRecord) -> Result<()> {
        self.write_record(record)?;
        self.notifier.emit(AuthSignal::Update);
        Ok(())
    }

    /// Persist provider claims after an OAuth callback. The backend
    /// exchange writes the local record separately; if that exchange
    /// fails, this provider state alone yields a minimal identity.
    pub fn set_provider_session(&self, claims: &ProviderClaims) -> Result<()> {
        let raw = serde_json::to_string(claims)?;
        self.storage.set(Area::Session, PROVIDER_KEY, &raw)?;
        self.notifier.emit(AuthSignal::Update);
        Ok(())
    }

    /// Clear all identity state and raise `Logout`.
    pub fn logout(&self) -> Result<()> {
        self.storage.purge_identity_keys()?;
        self.notifier.emit(AuthSignal::Logout);
        Ok(())
    }

    /// Destructive client-wide logout on authorization failure. Unlike
    /// [`logout`](Self::logout) this swallows storage errors: the
    /// session is already invalid and the caller is about to surface a
    /// session-expired error of its own.
    pub fn purge_on_auth_failure(&self) {
        if let Err(e) = self.storage.purge_identity_keys() {
            tracing::warn!("failed to purge session state after 401: {e}");
        }
        self.notifier.emit(AuthSignal::Logout);
    }

    fn write_record(&self, record: &LocalRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.storage.set(Area::Local, USER_KEY, &raw)?;
        Ok(())
    }

    pub(crate) fn refreshed_snapshot(&self) -> StorageSnapshot {
        self.storage.reload();
        self.storage.snapshot()
    }
}
