//! Store settings forms: store profile and order settings.

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use storedesk_core::{CurrencyCode, Email, ImageId};

use super::{
    FormErrors, RuleCheck, checkbox, non_blank, optional_amount, required_amount,
};
use crate::api::{OrderSettings, Store, StoreUpdate};

const PHONE_MIN_DIGITS: usize = 8;
const PHONE_MAX_DIGITS: usize = 15;

/// Raw store profile submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettingsInput {
    pub name: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub currency: String,
    /// Id of a logo uploaded via `/api/images`; blank removes the logo.
    pub logo_id: String,
}

impl StoreSettingsInput {
    #[must_use]
    pub fn has_currency(&self, code: &str) -> bool {
        self.currency.eq_ignore_ascii_case(code)
    }

    #[must_use]
    pub fn from_store(store: &Store) -> Self {
        Self {
            name: store.name.clone(),
            description: store.description.clone().unwrap_or_default(),
            email: store.email.clone(),
            phone: store.phone.clone(),
            address: store.address.clone(),
            currency: store.currency.code().to_string(),
            logo_id: store
                .logo
                .as_ref()
                .map(|logo| logo.id.to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse and validate.
    ///
    /// # Errors
    ///
    /// Returns field errors when any value fails to parse or breaks a rule.
    pub fn parse(&self) -> Result<StoreSettingsDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let email = match Email::parse(&self.email) {
            Ok(email) => email.into_inner(),
            Err(e) => {
                errors.add("email", format!("Email: {e}"));
                String::new()
            }
        };

        let currency = self.currency.parse::<CurrencyCode>().unwrap_or_else(|_| {
            errors.add("currency", "Choose a supported currency");
            CurrencyCode::default()
        });

        let draft = StoreSettingsDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            email,
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            currency,
            logo_id: non_blank(&self.logo_id).map(ImageId::new),
        };

        if let Err(e) = draft.validate() {
            errors.merge_validation(&e);
        }
        errors.into_result(draft)
    }
}

/// Validated store profile.
#[derive(Debug, Clone, Validate)]
pub struct StoreSettingsDraft {
    #[validate(length(min = 1, max = 120, message = "Store name must be 1-120 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, max = 255, message = "Address must be 1-255 characters"))]
    pub address: String,
    pub currency: CurrencyCode,
    pub logo_id: Option<ImageId>,
}

impl StoreSettingsDraft {
    #[must_use]
    pub fn into_update(self) -> StoreUpdate {
        StoreUpdate {
            name: self.name,
            description: non_blank(&self.description),
            email: self.email,
            phone: self.phone,
            address: self.address,
            logo_id: self.logo_id,
            currency: self.currency,
        }
    }
}

/// Phone numbers: 8-15 digits, optionally with a leading `+` and
/// spaces, dashes, dots or parentheses between groups.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let separators_ok = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'));
    let digits = body.chars().filter(char::is_ascii_digit).count();

    if separators_ok && (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone");
        error.message = Some("Phone must have 8-15 digits".into());
        Err(error)
    }
}

/// Raw order settings submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderSettingsInput {
    pub auto_confirm: Option<String>,
    pub allow_cancellation: Option<String>,
    pub min_order_value: String,
    pub shipping_fee: String,
    pub free_shipping_threshold: String,
}

impl OrderSettingsInput {
    #[must_use]
    pub fn auto_confirm_checked(&self) -> bool {
        checkbox(self.auto_confirm.as_deref())
    }

    #[must_use]
    pub fn allow_cancellation_checked(&self) -> bool {
        checkbox(self.allow_cancellation.as_deref())
    }

    #[must_use]
    pub fn from_settings(settings: &OrderSettings) -> Self {
        Self {
            auto_confirm: settings.auto_confirm.then(|| "on".to_string()),
            allow_cancellation: settings.allow_cancellation.then(|| "on".to_string()),
            min_order_value: settings.min_order_value.to_string(),
            shipping_fee: settings.shipping_fee.to_string(),
            free_shipping_threshold: settings
                .free_shipping_threshold
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse and validate. Blank amounts count as zero, except the free
    /// shipping threshold where blank means "never free".
    ///
    /// # Errors
    ///
    /// Returns field errors when any value fails to parse or breaks a rule.
    pub fn parse(&self) -> Result<OrderSettingsDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let min_order_value = amount_or_zero(
            &mut errors,
            "min_order_value",
            "Minimum order value",
            &self.min_order_value,
        );
        let shipping_fee =
            amount_or_zero(&mut errors, "shipping_fee", "Shipping fee", &self.shipping_fee);
        let free_shipping_threshold = optional_amount(
            &mut errors,
            "free_shipping_threshold",
            "Free shipping threshold",
            &self.free_shipping_threshold,
        );

        let draft = OrderSettingsDraft {
            auto_confirm: checkbox(self.auto_confirm.as_deref()),
            allow_cancellation: checkbox(self.allow_cancellation.as_deref()),
            min_order_value,
            shipping_fee,
            free_shipping_threshold,
        };

        let unparsed = errors.field_names();
        if let Err(e) = draft.validate() {
            errors.merge_validation(&e);
        }
        draft.check_rules(&mut RuleCheck::new(&mut errors, unparsed));
        errors.into_result(draft)
    }
}

fn amount_or_zero(errors: &mut FormErrors, field: &str, label: &str, raw: &str) -> Decimal {
    if raw.trim().is_empty() {
        Decimal::ZERO
    } else {
        required_amount(errors, field, label, raw)
    }
}

/// Validated order settings.
#[derive(Debug, Clone, Validate)]
pub struct OrderSettingsDraft {
    pub auto_confirm: bool,
    pub allow_cancellation: bool,
    pub min_order_value: Decimal,
    pub shipping_fee: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
}

impl OrderSettingsDraft {
    fn check_rules(&self, rules: &mut RuleCheck<'_>) {
        rules.rule(
            &["free_shipping_threshold", "min_order_value"],
            "free_shipping_threshold",
            self.free_shipping_threshold.is_none_or(|threshold| threshold >= self.min_order_value),
            "Free shipping threshold cannot be below the minimum order value",
        );
    }

    #[must_use]
    pub const fn into_settings(self) -> OrderSettings {
        OrderSettings {
            auto_confirm: self.auto_confirm,
            min_order_value: self.min_order_value,
            shipping_fee: self.shipping_fee,
            free_shipping_threshold: self.free_shipping_threshold,
            allow_cancellation: self.allow_cancellation,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_store() -> StoreSettingsInput {
        StoreSettingsInput {
            name: "Corner Shop".to_string(),
            description: String::new(),
            email: "Hello@Corner.Example".to_string(),
            phone: "+84 912-345-678".to_string(),
            address: "12 Market Street".to_string(),
            currency: "vnd".to_string(),
            logo_id: String::new(),
        }
    }

    #[test]
    fn test_valid_store_settings() {
        let update = valid_store().parse().unwrap().into_update();
        assert_eq!(update.email, "Hello@corner.example");
        assert_eq!(update.currency, CurrencyCode::VND);
        assert_eq!(update.description, None);
        assert_eq!(update.logo_id, None);
    }

    #[test]
    fn test_store_email_and_currency() {
        let mut input = valid_store();
        input.email = "not-an-email".to_string();
        input.currency = "JPY".to_string();
        let errors = input.parse().unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("currency"));
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("0912345678").is_ok());
        assert!(validate_phone("+1 (555) 010-2030").is_ok());
        assert!(validate_phone("1234567").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("call me 12345678").is_err());

        let mut input = valid_store();
        input.phone = "12".to_string();
        assert_eq!(
            input.parse().unwrap_err().first("phone"),
            Some("Phone must have 8-15 digits")
        );
    }

    #[test]
    fn test_required_store_fields() {
        let mut input = valid_store();
        input.name = " ".to_string();
        input.address = String::new();
        let errors = input.parse().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("address"));
    }

    #[test]
    fn test_order_settings() {
        let input = OrderSettingsInput {
            auto_confirm: Some("on".to_string()),
            allow_cancellation: None,
            min_order_value: String::new(),
            shipping_fee: "2.50".to_string(),
            free_shipping_threshold: "50".to_string(),
        };
        let settings = input.parse().unwrap().into_settings();
        assert!(settings.auto_confirm);
        assert!(!settings.allow_cancellation);
        assert_eq!(settings.min_order_value, Decimal::ZERO);
        assert_eq!(settings.shipping_fee, Decimal::new(250, 2));
        assert_eq!(settings.free_shipping_threshold, Some(Decimal::new(50, 0)));
    }

    #[test]
    fn test_free_shipping_below_minimum_is_rejected() {
        let input = OrderSettingsInput {
            min_order_value: "20".to_string(),
            free_shipping_threshold: "10".to_string(),
            ..OrderSettingsInput::default()
        };
        assert!(input.parse().unwrap_err().has("free_shipping_threshold"));
    }

    #[test]
    fn test_free_shipping_rule_skipped_when_minimum_unparseable() {
        let input = OrderSettingsInput {
            min_order_value: "lots".to_string(),
            free_shipping_threshold: "10".to_string(),
            ..OrderSettingsInput::default()
        };
        let errors = input.parse().unwrap_err();
        assert!(errors.has("min_order_value"));
        assert!(!errors.has("free_shipping_threshold"));
    }

    #[test]
    fn test_order_settings_round_trip_prefill() {
        let settings = OrderSettings {
            auto_confirm: true,
            min_order_value: Decimal::new(5, 0),
            shipping_fee: Decimal::ZERO,
            free_shipping_threshold: None,
            allow_cancellation: true,
        };
        let input = OrderSettingsInput::from_settings(&settings);
        assert_eq!(input.parse().unwrap().into_settings(), settings);
    }
}
