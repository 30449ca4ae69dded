//! Store (tenant) resources.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storedesk_core::{CurrencyCode, ImageId, StoreId};

use super::common::ImageRef;

/// The merchant's store and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub logo: Option<ImageRef>,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub order_settings: OrderSettings,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Checkout rules applied by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSettings {
    #[serde(default)]
    pub auto_confirm: bool,
    #[serde(default)]
    pub min_order_value: Decimal,
    #[serde(default)]
    pub shipping_fee: Decimal,
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(default)]
    pub allow_cancellation: bool,
}

/// `PUT /store/{id}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    pub name: String,
    pub description: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub logo_id: Option<ImageId>,
    pub currency: CurrencyCode,
}
