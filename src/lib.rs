//! Client library for the EventBuddy event-discovery platform.
//!
//! EventBuddy's business logic (persistence, authorization enforcement,
//! payment processing, scheduling rules) lives in a backend HTTP API.
//! This crate is the client side: it keeps a local session, talks to the
//! backend through a single gateway, and decides what the signed-in user
//! is allowed to see and do.
//!
//! ## Layout
//! - [`session`] — identity storage, reconciliation, and change signals
//! - [`api`] — backend gateway (wire types + HTTP client)
//! - [`access`] — role-gated navigation and page guards
//! - [`dashboard`] — joined/hosted event aggregation
//! - [`reports`] — payment-history reporting and CSV export
//! - [`validate`] — pre-network form validation
//! - [`commands`] — CLI command implementations

pub mod access;
pub mod api;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod reports;
pub mod session;
pub mod validate;
