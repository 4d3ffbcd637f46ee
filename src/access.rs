//! Role-gated navigation and page guards.
//!
//! Given the reconciled identity, this module decides which navigation
//! entries exist, whether the authoring screens may render at all, and
//! whether an edit screen may show its form. Rules:
//! - `user` sees joined events only;
//! - `host` additionally gets event creation and hosted-event
//!   management;
//! - `admin` gets a distinct management set in place of the host/user
//!   entries, and passes every authoring guard.
//!
//! Guards redirect (to login or the dashboard) rather than rendering an
//! error in place, except the edit-ownership check, which surfaces an
//! inline not-authorized state.

use crate::api::types::Event;
use crate::session::identity::{Identity, Role};

/// A navigation entry the current viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEntry {
    Dashboard,
    BrowseEvents,
    /// "My Events": the events the viewer joined.
    JoinedEvents,
    CreateEvent,
    HostedEvents,
    ManageUsers,
    ManageHosts,
    ManageEvents,
    PaymentHistory,
    Profile,
}

impl NavEntry {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::BrowseEvents => "Browse Events",
            Self::JoinedEvents => "My Events",
            Self::CreateEvent => "Create Event",
            Self::HostedEvents => "Hosted Events",
            Self::ManageUsers => "User Management",
            Self::ManageHosts => "Host Management",
            Self::ManageEvents => "Event Management",
            Self::PaymentHistory => "Payments",
            Self::Profile => "Profile",
        }
    }
}

/// Navigation for the current viewer. Anonymous visitors can only
/// browse.
pub fn navigation(identity: Option<&Identity>) -> Vec<NavEntry> {
    let Some(identity) = identity else {
        return vec![NavEntry::BrowseEvents];
    };
    match identity.role {
        Role::User => vec![
            NavEntry::Dashboard,
            NavEntry::BrowseEvents,
            NavEntry::JoinedEvents,
            NavEntry::PaymentHistory,
            NavEntry::Profile,
        ],
        Role::Host => vec![
            NavEntry::Dashboard,
            NavEntry::BrowseEvents,
            NavEntry::JoinedEvents,
            NavEntry::CreateEvent,
            NavEntry::HostedEvents,
            NavEntry::PaymentHistory,
            NavEntry::Profile,
        ],
        Role::Admin => vec![
            NavEntry::Dashboard,
            NavEntry::ManageUsers,
            NavEntry::ManageHosts,
            NavEntry::ManageEvents,
            NavEntry::CreateEvent,
            NavEntry::PaymentHistory,
            NavEntry::Profile,
        ],
    }
}

/// Outcome of a page-level guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Not signed in; send the visitor to the login screen.
    RedirectLogin,
    /// Signed in with the wrong role; send them to their dashboard.
    RedirectDashboard,
}

/// Guard for the event-creation and event-editing screens: role must be
/// host or admin.
pub fn guard_event_authoring(identity: Option<&Identity>) -> GuardDecision {
    match identity {
        None => GuardDecision::RedirectLogin,
        Some(identity) if can_author_events(identity.role) => GuardDecision::Allow,
        Some(_) => GuardDecision::RedirectDashboard,
    }
}

pub fn can_author_events(role: Role) -> bool {
    matches!(role, Role::Host | Role::Admin)
}

/// Outcome of the edit-ownership check. Denial renders inline; it is
/// not a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAccess {
    Allowed,
    NotAuthorized,
}

/// The edit form renders only for the event's owning host or an admin.
pub fn guard_event_edit(identity: &Identity, event: &Event) -> EditAccess {
    if identity.role == Role::Admin || identity.id == event.host.id {
        EditAccess::Allowed
    } else {
        EditAccess::NotAuthorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{EventStatus, HostRef};
    use chrono::NaiveDate;

    fn identity(id: &str, role: Role) -> Identity {
        Identity {
            id: id.into(),
            name: "Test".into(),
            email: "test@example.com".into(),
            role,
            token: Some("tok".into()),
        }
    }

    fn event_hosted_by(host_id: &str) -> Event {
        Event {
            id: "e1".into(),
            title: "Picnic".into(),
            description: String::new(),
            category: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            location: String::new(),
            status: EventStatus::Open,
            capacity: 10,
            attendee_count: 0,
            fee: 0.0,
            host: HostRef {
                id: host_id.into(),
                name: "Host".into(),
            },
            participants: Vec::new(),
            reviews: Vec::new(),
        }
    }

    #[test]
    fn plain_user_has_no_create_affordance() {
        let nav = navigation(Some(&identity("u1", Role::User)));
        assert!(!nav.contains(&NavEntry::CreateEvent));
        assert!(nav.contains(&NavEntry::JoinedEvents));
        assert!(!nav.contains(&NavEntry::HostedEvents));
    }

    #[test]
    fn host_and_admin_see_create_affordance() {
        for role in [Role::Host, Role::Admin] {
            let nav = navigation(Some(&identity("u1", role)));
            assert!(nav.contains(&NavEntry::CreateEvent), "{role} lacks create");
        }
    }

    #[test]
    fn admin_gets_management_set_instead_of_user_set() {
        let nav = navigation(Some(&identity("u1", Role::Admin)));
        assert!(nav.contains(&NavEntry::ManageUsers));
        assert!(nav.contains(&NavEntry::ManageHosts));
        assert!(nav.contains(&NavEntry::ManageEvents));
        assert!(!nav.contains(&NavEntry::JoinedEvents));
        assert!(!nav.contains(&NavEntry::HostedEvents));
    }

    #[test]
    fn anonymous_visitor_can_only_browse() {
        assert_eq!(navigation(None), vec![NavEntry::BrowseEvents]);
    }

    #[test]
    fn authoring_guard_redirects_by_cause() {
        assert_eq!(guard_event_authoring(None), GuardDecision::RedirectLogin);
        assert_eq!(
            guard_event_authoring(Some(&identity("u1", Role::User))),
            GuardDecision::RedirectDashboard
        );
        assert_eq!(
            guard_event_authoring(Some(&identity("u1", Role::Host))),
            GuardDecision::Allow
        );
        assert_eq!(
            guard_event_authoring(Some(&identity("u1", Role::Admin))),
            GuardDecision::Allow
        );
    }

    #[test]
    fn edit_guard_denies_non_owning_host() {
        let editor = identity("u1", Role::Host);
        let event = event_hosted_by("u2");
        assert_eq!(guard_event_edit(&editor, &event), EditAccess::NotAuthorized);
    }

    #[test]
    fn edit_guard_allows_owner_and_admin() {
        let owner = identity("u2", Role::Host);
        let admin = identity("u1", Role::Admin);
        let event = event_hosted_by("u2");
        assert_eq!(guard_event_edit(&owner, &event), EditAccess::Allowed);
        assert_eq!(guard_event_edit(&admin, &event), EditAccess::Allowed);
    }
}
