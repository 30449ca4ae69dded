//! Form parsing and validation.
//!
//! Browsers submit every field as a string. Each form has a raw `*Input`
//! struct (all `String`s, deserialized straight from the request) and a
//! typed `*Draft` carrying `validator` rules. `parse()` converts the input
//! into a draft, validates it, and returns either the draft or the field
//! errors to show next to the inputs.
//!
//! Cross-field rules run after the field rules through [`RuleCheck`]. Each
//! is checked on its own, and a rule is skipped when one of its inputs
//! failed to parse.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use storedesk_core::{MoneyError, parse_amount};

pub mod employee;
pub mod password;
pub mod product;
pub mod promotion;
pub mod store;

pub use employee::{EmployeeInviteDraft, EmployeeInviteInput};
pub use password::{PasswordDraft, PasswordInput};
pub use product::{ProductDraft, ProductFormInput};
pub use promotion::{PromotionDraft, PromotionFormInput};
pub use store::{OrderSettingsDraft, OrderSettingsInput, StoreSettingsDraft, StoreSettingsInput};

/// Key under which errors not tied to a single field are collected.
pub const FORM_LEVEL: &str = "__all__";

/// Field name → messages, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors with a single form-level message (e.g. a backend rejection).
    #[must_use]
    pub fn form_level(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(FORM_LEVEL, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// First message for a field, for display under the input.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// All messages for a field.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Form-level messages shown in the banner above the form.
    #[must_use]
    pub fn general(&self) -> &[String] {
        self.messages(FORM_LEVEL)
    }

    /// Number of fields with at least one error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Names of the fields that currently have errors.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Fold `validator` output in.
    ///
    /// Fields that already carry a parse error are skipped, so a field that
    /// failed to parse does not also report a rule about its placeholder
    /// value.
    pub fn merge_validation(&mut self, errors: &ValidationErrors) {
        let parse_failed = self.field_names();

        for (field, field_errors) in errors.field_errors() {
            let field: &str = &field;
            if parse_failed.iter().any(|f| f == field) {
                continue;
            }
            for error in field_errors.iter() {
                self.add(field, error_text(error));
            }
        }
    }

    /// `Ok(value)` when there are no errors, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field has an error.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Message for a `validator` error, falling back to a generic line.
fn error_text(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map_or_else(|| format!("Invalid value ({})", error.code), ToString::to_string)
}

/// Cross-field rules over a parsed draft.
///
/// `unparsed` is the set of fields that failed to parse. The draft holds a
/// placeholder for those, so any rule reading one of them is skipped.
pub(crate) struct RuleCheck<'a> {
    errors: &'a mut FormErrors,
    unparsed: Vec<String>,
}

impl<'a> RuleCheck<'a> {
    pub(crate) const fn new(errors: &'a mut FormErrors, unparsed: Vec<String>) -> Self {
        Self { errors, unparsed }
    }

    /// File `message` under `field` unless the rule `holds`.
    pub(crate) fn rule(&mut self, inputs: &[&str], field: &str, holds: bool, message: &str) {
        if holds || inputs.iter().any(|input| self.unparsed.iter().any(|f| f == input)) {
            return;
        }
        self.errors.add(field, message);
    }
}

/// Parse a required money amount.
pub(crate) fn required_amount(
    errors: &mut FormErrors,
    field: &str,
    label: &str,
    raw: &str,
) -> Decimal {
    match parse_amount(raw) {
        Ok(amount) => amount,
        Err(MoneyError::Empty) => {
            errors.add(field, format!("{label} is required"));
            Decimal::ZERO
        }
        Err(e) => {
            errors.add(field, format!("{label}: {e}"));
            Decimal::ZERO
        }
    }
}

/// Parse an optional money amount; blank means `None`.
pub(crate) fn optional_amount(
    errors: &mut FormErrors,
    field: &str,
    label: &str,
    raw: &str,
) -> Option<Decimal> {
    if raw.trim().is_empty() {
        return None;
    }
    match parse_amount(raw) {
        Ok(amount) => Some(amount),
        Err(e) => {
            errors.add(field, format!("{label}: {e}"));
            None
        }
    }
}

/// Parse a non-negative whole number. Blank counts as zero.
pub(crate) fn count(errors: &mut FormErrors, field: &str, label: &str, raw: &str) -> i64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    if cleaned.is_empty() {
        return 0;
    }
    match cleaned.parse::<i64>() {
        Ok(n) if n >= 0 => n,
        Ok(_) => {
            errors.add(field, format!("{label} cannot be negative"));
            0
        }
        Err(_) => {
            errors.add(field, format!("{label} must be a whole number"));
            0
        }
    }
}

/// Parse an optional positive-or-zero whole number; blank means `None`.
pub(crate) fn optional_count(
    errors: &mut FormErrors,
    field: &str,
    label: &str,
    raw: &str,
) -> Option<i64> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(count(errors, field, label, raw))
    }
}

/// HTML checkboxes submit their value only when ticked.
pub(crate) fn checkbox(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some(v) if !v.is_empty() && v != "false" && v != "off")
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 0, message = "Must not be negative"))]
        qty: i64,
    }

    #[test]
    fn test_merge_validation_files_field_errors() {
        let sample = Sample {
            name: String::new(),
            qty: -1,
        };
        let mut errors = FormErrors::new();
        if let Err(e) = sample.validate() {
            errors.merge_validation(&e);
        }

        assert_eq!(errors.first("name"), Some("Name is required"));
        assert_eq!(errors.first("qty"), Some("Must not be negative"));
        assert!(!errors.has(FORM_LEVEL));
    }

    #[test]
    fn test_rule_check_reports_every_broken_rule() {
        let mut errors = FormErrors::new();
        let mut rules = RuleCheck::new(&mut errors, vec![]);
        rules.rule(&["a", "b"], "a", false, "A conflicts with B");
        rules.rule(&["c"], "c", false, "C is off");
        rules.rule(&["d"], "d", true, "never shown");

        assert_eq!(errors.first("a"), Some("A conflicts with B"));
        assert_eq!(errors.first("c"), Some("C is off"));
        assert!(!errors.has("d"));
    }

    #[test]
    fn test_rule_check_skips_rules_over_unparsed_inputs() {
        let mut errors = FormErrors::new();
        errors.add("b", "B must be a number");
        let unparsed = errors.field_names();
        let mut rules = RuleCheck::new(&mut errors, unparsed);
        rules.rule(&["a", "b"], "a", false, "A conflicts with B");

        assert!(!errors.has("a"));
        assert_eq!(errors.messages("b"), ["B must be a number".to_string()]);
    }

    #[test]
    fn test_merge_validation_skips_fields_with_parse_errors() {
        let sample = Sample {
            name: "ok".to_string(),
            qty: -1,
        };
        let mut errors = FormErrors::new();
        errors.add("qty", "Qty must be a whole number");
        if let Err(e) = sample.validate() {
            errors.merge_validation(&e);
        }

        assert_eq!(errors.messages("qty"), ["Qty must be a whole number".to_string()]);
    }

    #[test]
    fn test_count_parsing() {
        let mut errors = FormErrors::new();
        assert_eq!(count(&mut errors, "n", "Stock", " 1,200 "), 1200);
        assert_eq!(count(&mut errors, "n", "Stock", ""), 0);
        assert!(errors.is_empty());

        count(&mut errors, "a", "Stock", "-4");
        count(&mut errors, "b", "Stock", "2.5");
        assert_eq!(errors.first("a"), Some("Stock cannot be negative"));
        assert_eq!(errors.first("b"), Some("Stock must be a whole number"));
    }

    #[test]
    fn test_amount_parsing() {
        let mut errors = FormErrors::new();
        assert_eq!(
            required_amount(&mut errors, "price", "Price", "1,250.50"),
            Decimal::new(125_050, 2)
        );
        assert_eq!(optional_amount(&mut errors, "sale", "Sale price", "  "), None);
        assert!(errors.is_empty());

        required_amount(&mut errors, "price", "Price", "");
        assert_eq!(errors.first("price"), Some("Price is required"));
    }

    #[test]
    fn test_checkbox() {
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(!checkbox(Some("false")));
        assert!(!checkbox(None));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FormErrors::new().into_result(5), Ok(5));
        let errors = FormErrors::form_level("Backend said no");
        assert_eq!(errors.general(), ["Backend said no".to_string()]);
        assert!(errors.into_result(5).is_err());
    }
}
