//! Promotion resources.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storedesk_core::{DiscountType, PromotionId, PromotionState};

/// A discount rule with a validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: PromotionId,
    pub name: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
    #[serde(default)]
    pub min_order_value: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub used_count: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl Promotion {
    /// Lifetime state at `now`.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> PromotionState {
        PromotionState::at(
            self.active,
            self.start_at,
            self.end_at,
            self.usage_limit,
            self.used_count,
            now,
        )
    }
}

/// Create/update body for promotions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    pub name: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_order_value: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub usage_limit: Option<i64>,
    pub active: bool,
}
