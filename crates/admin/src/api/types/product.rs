//! Product resources.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storedesk_core::{ImageId, ProductId, ProductStatus, StockTier};

use super::common::ImageRef;

/// A product in the store catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub in_stock: i64,
    #[serde(default)]
    pub yellow_line: i64,
    #[serde(default)]
    pub red_line: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Stock tier against this product's own thresholds.
    #[must_use]
    pub const fn stock_tier(&self) -> StockTier {
        StockTier::classify(self.in_stock, self.yellow_line, self.red_line)
    }

    /// Price a customer pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    /// First image, used as the list thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&ImageRef> {
        self.images.first()
    }
}

/// Create/update body for products.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub in_stock: i64,
    pub yellow_line: i64,
    pub red_line: i64,
    pub status: ProductStatus,
    pub image_ids: Vec<ImageId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_product() {
        let product: Product =
            serde_json::from_str(r#"{"id":7,"name":"Mug","price":12.5,"inStock":3,"redLine":5}"#)
                .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.price, Decimal::new(125, 1));
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.stock_tier(), StockTier::Critical);
        assert!(product.thumbnail().is_none());
    }

    #[test]
    fn test_effective_price_prefers_sale() {
        let mut product: Product =
            serde_json::from_str(r#"{"id":"p1","name":"Mug","price":"20.00"}"#)
                .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(product.effective_price(), Decimal::new(2000, 2));
        product.sale_price = Some(Decimal::new(1500, 2));
        assert_eq!(product.effective_price(), Decimal::new(1500, 2));
    }
}
