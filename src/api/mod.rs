//! Backend gateway.
//!
//! All traffic to the EventBuddy backend goes through one HTTP client
//! wrapper that attaches the bearer token, decodes the response
//! envelope, and centralizes authorization-failure handling. Call sites
//! own their own error presentation; the gateway only classifies.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiError, ApiResult};
pub use types::{
    AuthData, Envelope, Event, EventInput, EventQuery, EventStatus, GoogleAuthRequest, HostRef,
    LoginRequest, PaymentRecord, ProfileUpdate, RegisterRequest, Review, UserProfile,
};
