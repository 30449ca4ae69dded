//! Order resources.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storedesk_core::{OrderId, OrderStatus, ProductId};

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub code: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping_fee: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub promotion_code: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// `PUT .../orders/{oid}/status` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_totals_and_count() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": 1, "code": "SD-1001", "customerName": "Linh",
                "items": [
                    {"productId": 1, "productName": "Mug", "quantity": 2, "unitPrice": "4.50"},
                    {"productId": 2, "productName": "Tray", "quantity": 1, "unitPrice": 10}
                ],
                "total": "19.00", "status": "PENDING", "createdAt": "2024-05-01T08:00:00Z"
            }"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(order.item_count(), 3);
        assert_eq!(order.items[0].line_total(), Decimal::new(900, 2));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.customer_email.is_none());
    }
}
