//! Promotion create/edit form.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use storedesk_core::{DiscountType, PromoCode};

use super::{
    FormErrors, RuleCheck, checkbox, optional_amount, optional_count, required_amount,
};
use crate::api::{Promotion, PromotionInput};

/// Format of `<input type="datetime-local">` values.
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";
const DATETIME_LOCAL_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Raw promotion form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromotionFormInput {
    pub name: String,
    /// Blank means "generate one for me".
    pub code: String,
    pub discount_type: String,
    pub value: String,
    pub min_order_value: String,
    pub max_discount: String,
    pub start_at: String,
    pub end_at: String,
    pub usage_limit: String,
    pub active: Option<String>,
}

impl PromotionFormInput {
    /// Whether `discount_type` is the selected option.
    #[must_use]
    pub fn has_type(&self, discount_type: &str) -> bool {
        self.discount_type == discount_type
    }

    /// Defaults for the "new promotion" form: active, starting now, one
    /// month long.
    #[must_use]
    pub fn new_defaults(now: DateTime<Utc>) -> Self {
        Self {
            discount_type: DiscountType::Percentage.as_param().to_string(),
            start_at: now.format(DATETIME_LOCAL).to_string(),
            end_at: (now + chrono::Duration::days(30))
                .format(DATETIME_LOCAL)
                .to_string(),
            active: Some("on".to_string()),
            ..Self::default()
        }
    }

    /// Prefill the edit form from an existing promotion.
    #[must_use]
    pub fn from_promotion(promotion: &Promotion) -> Self {
        Self {
            name: promotion.name.clone(),
            code: promotion.code.clone(),
            discount_type: promotion.discount_type.as_param().to_string(),
            value: promotion.value.to_string(),
            min_order_value: promotion
                .min_order_value
                .map(|v| v.to_string())
                .unwrap_or_default(),
            max_discount: promotion
                .max_discount
                .map(|v| v.to_string())
                .unwrap_or_default(),
            start_at: promotion.start_at.format(DATETIME_LOCAL).to_string(),
            end_at: promotion.end_at.format(DATETIME_LOCAL).to_string(),
            usage_limit: promotion
                .usage_limit
                .map(|v| v.to_string())
                .unwrap_or_default(),
            active: promotion.active.then(|| "on".to_string()),
        }
    }

    /// Whether the active checkbox is ticked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        checkbox(self.active.as_deref())
    }

    /// Parse and validate. A blank code is replaced with a generated one.
    ///
    /// # Errors
    ///
    /// Returns field errors when any value fails to parse or breaks a rule.
    pub fn parse(&self) -> Result<PromotionDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let code = if self.code.trim().is_empty() {
            PromoCode::generate()
        } else {
            PromoCode::parse(&self.code).unwrap_or_else(|e| {
                errors.add("code", format!("Code: {e}"));
                PromoCode::generate()
            })
        };

        let discount_type = DiscountType::from_param(&self.discount_type).unwrap_or_else(|| {
            errors.add("discount_type", "Choose percentage or fixed amount");
            DiscountType::Percentage
        });

        let value = required_amount(&mut errors, "value", "Value", &self.value);
        let min_order_value = optional_amount(
            &mut errors,
            "min_order_value",
            "Minimum order value",
            &self.min_order_value,
        );
        let max_discount =
            optional_amount(&mut errors, "max_discount", "Maximum discount", &self.max_discount);
        let start_at = parse_datetime(&mut errors, "start_at", "Start", &self.start_at);
        let end_at = parse_datetime(&mut errors, "end_at", "End", &self.end_at);
        let usage_limit =
            optional_count(&mut errors, "usage_limit", "Usage limit", &self.usage_limit);

        let draft = PromotionDraft {
            name: self.name.trim().to_string(),
            code,
            discount_type,
            value,
            min_order_value,
            max_discount,
            start_at,
            end_at,
            usage_limit,
            active: self.is_active(),
        };

        let unparsed = errors.field_names();
        if let Err(e) = draft.validate() {
            errors.merge_validation(&e);
        }
        draft.check_rules(&mut RuleCheck::new(&mut errors, unparsed));
        errors.into_result(draft)
    }
}

/// Validated promotion, ready to send to the backend.
#[derive(Debug, Clone, Validate)]
pub struct PromotionDraft {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    pub code: PromoCode,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_order_value: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[validate(range(min = 1, message = "Usage limit must be at least 1"))]
    pub usage_limit: Option<i64>,
    pub active: bool,
}

impl PromotionDraft {
    fn check_rules(&self, rules: &mut RuleCheck<'_>) {
        rules.rule(
            &["value"],
            "value",
            self.value > Decimal::ZERO,
            "Value must be greater than zero",
        );
        rules.rule(
            &["value", "discount_type"],
            "value",
            self.discount_type != DiscountType::Percentage || self.value <= Decimal::ONE_HUNDRED,
            "A percentage cannot exceed 100",
        );
        rules.rule(
            &["start_at", "end_at"],
            "end_at",
            self.end_at > self.start_at,
            "End must be after the start",
        );
    }

    #[must_use]
    pub fn into_input(self) -> PromotionInput {
        PromotionInput {
            name: self.name,
            code: self.code.into_inner(),
            discount_type: self.discount_type,
            value: self.value,
            min_order_value: self.min_order_value,
            max_discount: self.max_discount,
            start_at: self.start_at,
            end_at: self.end_at,
            usage_limit: self.usage_limit,
            active: self.active,
        }
    }
}

/// Parse a `datetime-local` value (interpreted as UTC) or an RFC 3339 stamp.
fn parse_datetime(
    errors: &mut FormErrors,
    field: &str,
    label: &str,
    raw: &str,
) -> DateTime<Utc> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, format!("{label} date is required"));
        return DateTime::<Utc>::MIN_UTC;
    }

    let parsed = NaiveDateTime::parse_from_str(raw, DATETIME_LOCAL)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, DATETIME_LOCAL_SECONDS))
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)));

    parsed.unwrap_or_else(|_| {
        errors.add(field, format!("{label} date is not valid"));
        DateTime::<Utc>::MIN_UTC
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> PromotionFormInput {
        PromotionFormInput {
            name: "Summer sale".to_string(),
            code: "summer24".to_string(),
            discount_type: "percentage".to_string(),
            value: "15".to_string(),
            min_order_value: "50".to_string(),
            max_discount: String::new(),
            start_at: "2024-06-01T00:00".to_string(),
            end_at: "2024-06-30T23:59".to_string(),
            usage_limit: String::new(),
            active: Some("on".to_string()),
        }
    }

    #[test]
    fn test_valid_promotion() {
        let draft = valid_input().parse().unwrap();
        assert_eq!(draft.code.as_str(), "SUMMER24");
        assert_eq!(draft.value, Decimal::new(15, 0));
        assert_eq!(draft.min_order_value, Some(Decimal::new(50, 0)));
        assert_eq!(draft.usage_limit, None);
        assert!(draft.active);
        assert_eq!(draft.start_at.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_blank_code_is_generated() {
        let mut input = valid_input();
        input.code = "  ".to_string();
        let draft = input.parse().unwrap();
        assert_eq!(draft.code.as_str().len(), 8);
    }

    #[test]
    fn test_invalid_code() {
        let mut input = valid_input();
        input.code = "no spaces".to_string();
        assert!(input.parse().unwrap_err().has("code"));
    }

    #[test]
    fn test_value_must_be_positive() {
        let mut input = valid_input();
        input.value = "0".to_string();
        assert_eq!(
            input.parse().unwrap_err().first("value"),
            Some("Value must be greater than zero")
        );
    }

    #[test]
    fn test_percentage_capped_at_100() {
        let mut input = valid_input();
        input.value = "100.01".to_string();
        assert_eq!(
            input.parse().unwrap_err().first("value"),
            Some("A percentage cannot exceed 100")
        );

        input.discount_type = "fixed".to_string();
        assert!(input.parse().is_ok());
    }

    #[test]
    fn test_end_must_follow_start() {
        let mut input = valid_input();
        input.end_at = input.start_at.clone();
        assert!(input.parse().unwrap_err().has("end_at"));
    }

    #[test]
    fn test_end_rule_reported_alongside_missing_value() {
        let mut input = valid_input();
        input.value = String::new();
        input.start_at = "2024-06-30T00:00".to_string();
        input.end_at = "2024-06-01T00:00".to_string();
        let errors = input.parse().unwrap_err();
        assert_eq!(errors.messages("value"), ["Value is required".to_string()]);
        assert_eq!(errors.first("end_at"), Some("End must be after the start"));
    }

    #[test]
    fn test_end_rule_skipped_when_start_unparseable() {
        let mut input = valid_input();
        input.start_at = "soon".to_string();
        let errors = input.parse().unwrap_err();
        assert_eq!(errors.first("start_at"), Some("Start date is not valid"));
        assert!(!errors.has("end_at"));
    }

    #[test]
    fn test_usage_limit_at_least_one() {
        let mut input = valid_input();
        input.usage_limit = "0".to_string();
        assert!(input.parse().unwrap_err().has("usage_limit"));

        input.usage_limit = "1".to_string();
        assert_eq!(input.parse().unwrap().usage_limit, Some(1));
    }

    #[test]
    fn test_missing_dates() {
        let mut input = valid_input();
        input.start_at = String::new();
        input.end_at = "tomorrow".to_string();
        let errors = input.parse().unwrap_err();
        assert_eq!(errors.first("start_at"), Some("Start date is required"));
        assert_eq!(errors.first("end_at"), Some("End date is not valid"));
    }

    #[test]
    fn test_unchecked_active() {
        let mut input = valid_input();
        input.active = None;
        assert!(!input.parse().unwrap().active);
    }
}
