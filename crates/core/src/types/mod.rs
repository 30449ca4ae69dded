//! Core types for Storedesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod promo;
pub mod status;
pub mod stock;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, MoneyError, Price, format_grouped, parse_amount};
pub use promo::{PromoCode, PromoCodeError};
pub use status::*;
pub use stock::StockTier;
