//! Product create/edit form.

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use storedesk_core::{ImageId, ProductStatus};

use super::{FormErrors, RuleCheck, count, optional_amount, required_amount};
use crate::api::{Product, ProductInput};

/// Raw product form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductFormInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub sale_price: String,
    pub in_stock: String,
    pub yellow_line: String,
    pub red_line: String,
    pub status: String,
    /// Comma-separated ids of images already uploaded via `/api/images`.
    pub image_ids: String,
}

impl ProductFormInput {
    /// Whether `status` is the selected option.
    #[must_use]
    pub fn has_status(&self, status: &str) -> bool {
        self.status == status
    }

    /// Prefill the edit form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            sale_price: product
                .sale_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            in_stock: product.in_stock.to_string(),
            yellow_line: product.yellow_line.to_string(),
            red_line: product.red_line.to_string(),
            status: product.status.as_param().to_string(),
            image_ids: product
                .images
                .iter()
                .map(|image| image.id.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Image ids as submitted, in order, blanks dropped.
    #[must_use]
    pub fn image_id_list(&self) -> Vec<ImageId> {
        self.image_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ImageId::new)
            .collect()
    }

    /// Parse and validate.
    ///
    /// # Errors
    ///
    /// Returns field errors when any value fails to parse or breaks a rule.
    pub fn parse(&self) -> Result<ProductDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let price = required_amount(&mut errors, "price", "Price", &self.price);
        let sale_price = optional_amount(&mut errors, "sale_price", "Sale price", &self.sale_price);
        let in_stock = count(&mut errors, "in_stock", "Stock", &self.in_stock);
        let yellow_line = count(&mut errors, "yellow_line", "Yellow line", &self.yellow_line);
        let red_line = count(&mut errors, "red_line", "Red line", &self.red_line);
        let status = if self.status.trim().is_empty() {
            ProductStatus::Active
        } else if let Some(status) = ProductStatus::from_param(&self.status) {
            status
        } else {
            errors.add("status", "Choose a valid status");
            ProductStatus::Active
        };

        let draft = ProductDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            price,
            sale_price,
            in_stock,
            yellow_line,
            red_line,
            status,
            image_ids: self.image_id_list(),
        };

        let unparsed = errors.field_names();
        if let Err(e) = draft.validate() {
            errors.merge_validation(&e);
        }
        draft.check_rules(&mut RuleCheck::new(&mut errors, unparsed));
        errors.into_result(draft)
    }
}

/// Validated product, ready to send to the backend.
#[derive(Debug, Clone, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub in_stock: i64,
    #[validate(range(min = 0, message = "Yellow line cannot be negative"))]
    pub yellow_line: i64,
    #[validate(range(min = 0, message = "Red line cannot be negative"))]
    pub red_line: i64,
    pub status: ProductStatus,
    #[validate(length(max = 20, message = "At most 20 images per product"))]
    pub image_ids: Vec<ImageId>,
}

impl ProductDraft {
    fn check_rules(&self, rules: &mut RuleCheck<'_>) {
        rules.rule(
            &["price", "sale_price"],
            "sale_price",
            self.sale_price.is_none_or(|sale| sale <= self.price),
            "Sale price cannot be higher than the regular price",
        );
        rules.rule(
            &["yellow_line", "red_line"],
            "yellow_line",
            self.yellow_line >= self.red_line,
            "Yellow line must be at or above the red line",
        );
    }

    #[must_use]
    pub fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price,
            sale_price: self.sale_price,
            in_stock: self.in_stock,
            yellow_line: self.yellow_line,
            red_line: self.red_line,
            status: self.status,
            image_ids: self.image_ids,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> ProductFormInput {
        ProductFormInput {
            name: "  Ceramic Mug ".to_string(),
            description: "Stoneware, 350ml".to_string(),
            category: "Kitchen".to_string(),
            price: "12.50".to_string(),
            sale_price: String::new(),
            in_stock: "40".to_string(),
            yellow_line: "10".to_string(),
            red_line: "3".to_string(),
            status: "active".to_string(),
            image_ids: "img1, img2,,".to_string(),
        }
    }

    #[test]
    fn test_valid_product() {
        let draft = valid_input().parse().unwrap();
        assert_eq!(draft.name, "Ceramic Mug");
        assert_eq!(draft.price, Decimal::new(1250, 2));
        assert_eq!(draft.sale_price, None);
        assert_eq!(
            draft.image_ids,
            vec![ImageId::new("img1"), ImageId::new("img2")]
        );
    }

    #[test]
    fn test_name_required_and_bounded() {
        let mut input = valid_input();
        input.name = "   ".to_string();
        assert!(input.parse().unwrap_err().has("name"));

        input.name = "x".repeat(201);
        assert!(input.parse().unwrap_err().has("name"));

        input.name = "x".repeat(200);
        assert!(input.parse().is_ok());
    }

    #[test]
    fn test_price_rules() {
        let mut input = valid_input();
        input.price = "-1".to_string();
        assert!(input.parse().unwrap_err().has("price"));

        input.price = "abc".to_string();
        assert!(input.parse().unwrap_err().has("price"));

        input.price = "0".to_string();
        assert!(input.parse().is_ok());
    }

    #[test]
    fn test_sale_price_cannot_exceed_price() {
        let mut input = valid_input();
        input.sale_price = "13".to_string();
        let errors = input.parse().unwrap_err();
        assert_eq!(
            errors.first("sale_price"),
            Some("Sale price cannot be higher than the regular price")
        );

        input.sale_price = "12.50".to_string();
        assert!(input.parse().is_ok());
    }

    #[test]
    fn test_stock_fields_are_non_negative_integers() {
        let mut input = valid_input();
        input.in_stock = "-5".to_string();
        input.red_line = "1.5".to_string();
        let errors = input.parse().unwrap_err();
        assert!(errors.has("in_stock"));
        assert!(errors.has("red_line"));
    }

    #[test]
    fn test_yellow_line_must_not_be_below_red_line() {
        let mut input = valid_input();
        input.yellow_line = "2".to_string();
        input.red_line = "5".to_string();
        let errors = input.parse().unwrap_err();
        assert!(errors.has("yellow_line"));

        input.yellow_line = "5".to_string();
        assert!(input.parse().is_ok());
    }

    #[test]
    fn test_threshold_rule_skipped_when_threshold_unparseable() {
        let mut input = valid_input();
        input.yellow_line = "lots".to_string();
        let errors = input.parse().unwrap_err();
        assert_eq!(
            errors.messages("yellow_line"),
            ["Yellow line must be a whole number".to_string()]
        );
    }

    #[test]
    fn test_sale_rule_skipped_when_price_unparseable() {
        let mut input = valid_input();
        input.price = "abc".to_string();
        input.sale_price = "5".to_string();
        let errors = input.parse().unwrap_err();
        assert!(errors.has("price"));
        assert!(!errors.has("sale_price"));
    }

    #[test]
    fn test_every_broken_rule_is_reported() {
        let mut input = valid_input();
        input.price = "abc".to_string();
        input.sale_price = "5".to_string();
        input.yellow_line = "1".to_string();
        input.red_line = "5".to_string();
        let errors = input.parse().unwrap_err();
        assert_eq!(
            errors.first("yellow_line"),
            Some("Yellow line must be at or above the red line")
        );

        input.price = "4".to_string();
        let errors = input.parse().unwrap_err();
        assert_eq!(
            errors.first("sale_price"),
            Some("Sale price cannot be higher than the regular price")
        );
        assert!(errors.has("yellow_line"));
    }

    #[test]
    fn test_unknown_status() {
        let mut input = valid_input();
        input.status = "archived".to_string();
        assert!(input.parse().unwrap_err().has("status"));
    }
}
