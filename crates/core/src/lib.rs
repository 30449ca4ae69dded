//! Storedesk Core - Shared domain types.
//!
//! This crate provides the types used by the Storedesk back office:
//! - `admin` - Server-rendered store dashboard
//! - `integration-tests` - End-to-end tests against a stub backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Anything that can be decided from in-memory data (stock tiers,
//! pagination, promo codes, money parsing) lives here so it can be tested
//! without a running backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money, statuses, stock tiers, promo codes
//! - [`listing`] - Client-side search, sort and pagination helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod listing;
pub mod types;

pub use listing::{Page, SortDirection, matches_search, paginate};
pub use types::*;
