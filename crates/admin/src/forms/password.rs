//! Change-password form.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{FormErrors, RuleCheck};
use crate::api::PasswordChange;

/// Raw change-password submission.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct PasswordInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for PasswordInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordInput { .. }")
    }
}

impl PasswordInput {
    /// Validate. Passwords are never trimmed.
    ///
    /// # Errors
    ///
    /// Returns field errors when a rule is broken.
    pub fn parse(self) -> Result<PasswordDraft, FormErrors> {
        let draft = PasswordDraft {
            current_password: self.current_password,
            new_password: self.new_password,
            confirm_password: self.confirm_password,
        };

        let mut errors = FormErrors::new();
        if let Err(e) = draft.validate() {
            errors.merge_validation(&e);
        }
        draft.check_rules(&mut RuleCheck::new(&mut errors, vec![]));
        errors.into_result(draft)
    }
}

/// Validated password change.
#[derive(Validate)]
pub struct PasswordDraft {
    #[validate(length(min = 1, message = "Enter your current password"))]
    pub current_password: String,
    #[validate(
        length(min = 8, max = 128, message = "New password must be 8-128 characters"),
        custom(function = "validate_password_strength")
    )]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

impl std::fmt::Debug for PasswordDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDraft { .. }")
    }
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_letter && has_digit {
        Ok(())
    } else {
        let mut error = ValidationError::new("strength");
        error.message = Some("New password needs at least one letter and one digit".into());
        Err(error)
    }
}

impl PasswordDraft {
    fn check_rules(&self, rules: &mut RuleCheck<'_>) {
        rules.rule(
            &["current_password", "new_password"],
            "new_password",
            self.current_password.is_empty() || self.new_password != self.current_password,
            "New password must differ from the current one",
        );
    }

    #[must_use]
    pub fn into_change(self) -> PasswordChange {
        PasswordChange {
            current_password: self.current_password,
            new_password: self.new_password,
        }
    }
}
