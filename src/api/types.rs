//! Wire types for the EventBuddy backend API.
//!
//! Every response follows the envelope `{success, message?, data?}`.
//! The backend serializes Mongo-style `_id` fields; aliases keep the
//! Rust side on plain `id`.

use crate::session::identity::{LocalRecord, Role};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Response envelope ────────────────────────────────────────────

/// Uniform backend response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

// ── Users ────────────────────────────────────────────────────────

/// A user as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub location: Option<String>,
}

impl From<UserProfile> for LocalRecord {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            role: Some(profile.role),
        }
    }
}

/// Payload of a successful login/registration/exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    pub user: UserProfile,
    pub token: String,
}

// ── Auth requests ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub location: String,
}

/// Exchange an OAuth identity token for a backend-issued session token.
#[derive(Debug, Serialize)]
pub struct GoogleAuthRequest {
    pub token: String,
    pub email: String,
    pub name: String,
}

/// Partial profile update; absent fields stay untouched.
#[derive(Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// ── Events ───────────────────────────────────────────────────────

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Closed,
    Cancelled,
    Completed,
}

impl EventStatus {
    /// Strict parse of the lowercase wire form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

/// Reference to the event's owning host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A review left on an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub author: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// An event with its participants and reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: String,
    pub status: EventStatus,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default, alias = "attendeeCount")]
    pub attendee_count: u32,
    #[serde(default)]
    pub fee: f64,
    pub host: HostRef,
    #[serde(default)]
    pub participants: Vec<UserProfile>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Body for event creation and edits.
#[derive(Debug, Clone, Serialize)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    pub location: String,
    pub capacity: u32,
    pub fee: f64,
}

/// Query parameters for the event listing endpoint.
#[derive(Debug, Default, Clone)]
pub struct EventQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<EventStatus>,
    pub page: Option<u32>,
}

impl EventQuery {
    /// Render as a query string, empty when no filter is set.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(search) = &self.search {
            parts.push(format!("search={}", urlencoding::encode(search)));
        }
        if let Some(category) = &self.category {
            parts.push(format!("category={}", urlencoding::encode(category)));
        }
        if let Some(status) = self.status {
            parts.push(format!("status={}", status.as_str()));
        }
        if let Some(page) = self.page {
            parts.push(format!("page={page}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

// ── Payments ─────────────────────────────────────────────────────

/// One succeeded payment, as returned by the role-scoped history
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "eventTitle")]
    pub event_title: String,
    #[serde(default, alias = "payerName")]
    pub payer_name: String,
    #[serde(default, alias = "payerEmail")]
    pub payer_email: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(alias = "paidAt")]
    pub paid_at: DateTime<Utc>,
    #[serde(default)]
    pub status: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_tolerates_missing_message_and_data() {
        let envelope: Envelope<UserProfile> =
            serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!envelope.success);
        assert!(envelope.message.is_none());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn event_parses_backend_shape() {
        let event: Event = serde_json::from_str(
            r#"{
                "_id": "e1",
                "title": "Board Games Night",
                "date": "2024-06-15",
                "status": "open",
                "capacity": 12,
                "attendeeCount": 4,
                "fee": 5.0,
                "host": {"_id": "u2", "name": "Sam"}
            }"#,
        )
        .unwrap();
        assert_eq!(event.id, "e1");
        assert_eq!(event.status, EventStatus::Open);
        assert_eq!(event.attendee_count, 4);
        assert_eq!(event.host.id, "u2");
        assert!(event.participants.is_empty());
    }

    #[test]
    fn user_role_defaults_to_user() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"_id":"u1","name":"N","email":"n@x.com"}"#).unwrap();
        assert_eq!(profile.role, Role::User);
    }

    #[test]
    fn event_query_percent_encodes_search() {
        let query = EventQuery {
            search: Some("board & games".into()),
            category: None,
            status: Some(EventStatus::Open),
            page: Some(2),
        };
        assert_eq!(
            query.to_query_string(),
            "?search=board%20%26%20games&status=open&page=2"
        );
    }

    #[test]
    fn empty_event_query_renders_nothing() {
        assert_eq!(EventQuery::default().to_query_string(), "");
    }

    #[test]
    fn payment_record_parses_camel_case_fields() {
        let record: PaymentRecord = serde_json::from_str(
            r#"{
                "_id": "p1",
                "eventTitle": "Picnic",
                "payerName": "Ann",
                "payerEmail": "ann@x.com",
                "amount": 12.5,
                "paidAt": "2024-05-01T10:00:00Z",
                "status": "succeeded"
            }"#,
        )
        .unwrap();
        assert_eq!(record.event_title, "Picnic");
        assert_eq!(record.currency, "USD");
    }
}
