//! Backend resource types.
//!
//! Field names follow the backend's camelCase JSON. Optional fields default
//! when absent so older backend versions still deserialize.

pub mod auth;
pub mod common;
pub mod employee;
pub mod notification;
pub mod order;
pub mod product;
pub mod promotion;
pub mod store;
pub mod template;

pub use auth::*;
pub use common::*;
pub use employee::*;
pub use notification::*;
pub use order::*;
pub use product::*;
pub use promotion::*;
pub use store::*;
pub use template::*;
