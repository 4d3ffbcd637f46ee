//! Session source reconciliation.
//!
//! Two independent sources describe the signed-in principal: the OAuth
//! provider's session and the locally persisted record written after a
//! backend exchange. Reconciliation produces one authoritative value
//! with a fixed precedence: a local record carrying a non-empty role
//! always wins, on the assumption that it holds richer role/token
//! information already synchronized with the backend.
//!
//! Reconciliation is pure and idempotent: the same inputs always yield
//! the same output, so the notifier's channels may fire in any order
//! without corrupting the final value.

use crate::session::identity::{Identity, LocalRecord, Role};
use serde::{Deserialize, Serialize};

/// Claims available from the OAuth provider once its session settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderClaims {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

/// Provider session status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSession {
    /// The provider has not settled yet; defer reconciliation.
    Loading,
    Authenticated(ProviderClaims),
    Unauthenticated,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// The provider is still loading; keep the previous value.
    Deferred,
    /// Both sources settled; this is the authoritative identity.
    Resolved(Option<Identity>),
}

/// Merge the provider session and the local record into one identity.
///
/// The token (scanned separately from storage) is attached only to a
/// local-record-derived identity; a provider-derived identity is
/// minimal by design: role [`Role::User`], no token. If the backend
/// exchange behind the local record failed, requests will go out
/// unauthenticated and the first 401 clears the limbo.
pub fn reconcile(
    provider: &ProviderSession,
    local: Option<&LocalRecord>,
    token: Option<&str>,
) -> Reconciled {
    if matches!(provider, ProviderSession::Loading) {
        return Reconciled::Deferred;
    }

    if let Some(record) = local {
        if let Some(role) = record.role {
            return Reconciled::Resolved(Some(Identity {
                id: record.id.clone(),
                name: record.name.clone(),
                email: record.email.clone(),
                role,
                token: token.map(str::to_owned),
            }));
        }
    }

    if let ProviderSession::Authenticated(claims) = provider {
        return Reconciled::Resolved(Some(Identity {
            // The provider exposes no stable id of its own; the email is
            // the only principal-scoped handle available.
            id: claims.email.clone(),
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: Role::User,
            token: None,
        }));
    }

    Reconciled::Resolved(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: Option<Role>) -> LocalRecord {
        LocalRecord {
            id: "u1".into(),
            name: "Local Name".into(),
            email: "local@example.com".into(),
            role,
        }
    }

    fn claims() -> ProviderClaims {
        ProviderClaims {
            name: "Provider Name".into(),
            email: "provider@example.com".into(),
        }
    }

    #[test]
    fn loading_provider_defers() {
        let result = reconcile(&ProviderSession::Loading, Some(&record(Some(Role::Host))), None);
        assert_eq!(result, Reconciled::Deferred);
    }

    #[test]
    fn local_with_role_beats_provider() {
        let result = reconcile(
            &ProviderSession::Authenticated(claims()),
            Some(&record(Some(Role::Admin))),
            Some("tok"),
        );
        let Reconciled::Resolved(Some(identity)) = result else {
            panic!("expected a resolved identity");
        };
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.email, "local@example.com");
        assert_eq!(identity.token.as_deref(), Some("tok"));
    }

    #[test]
    fn roleless_local_falls_through_to_provider() {
        let result = reconcile(
            &ProviderSession::Authenticated(claims()),
            Some(&record(None)),
            Some("tok"),
        );
        let Reconciled::Resolved(Some(identity)) = result else {
            panic!("expected a resolved identity");
        };
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.email, "provider@example.com");
        // Minimal identity never carries the token
        assert!(identity.token.is_none());
    }

    #[test]
    fn both_sources_absent_resolves_to_none() {
        let result = reconcile(&ProviderSession::Unauthenticated, None, None);
        assert_eq!(result, Reconciled::Resolved(None));
    }

    #[test]
    fn roleless_local_without_provider_resolves_to_none() {
        let result = reconcile(&ProviderSession::Unauthenticated, Some(&record(None)), None);
        assert_eq!(result, Reconciled::Resolved(None));
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let provider = ProviderSession::Authenticated(claims());
        let local = record(Some(Role::Host));
        let first = reconcile(&provider, Some(&local), Some("tok"));
        let second = reconcile(&provider, Some(&local), Some("tok"));
        assert_eq!(first, second);
    }
}
