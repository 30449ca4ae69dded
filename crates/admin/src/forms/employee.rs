//! Employee invite form.

use serde::Deserialize;
use validator::Validate;

use storedesk_core::{Email, EmployeeRole};

use super::FormErrors;
use crate::api::EmployeeInvite;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmployeeInviteInput {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl EmployeeInviteInput {
    /// Whether `role` is the selected option.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Parse and validate. Only manager and staff roles can be granted.
    ///
    /// # Errors
    ///
    /// Returns field errors when any value fails to parse or breaks a rule.
    pub fn parse(&self) -> Result<EmployeeInviteDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let email = match Email::parse(&self.email) {
            Ok(email) => email.into_inner(),
            Err(e) => {
                errors.add("email", format!("Email: {e}"));
                String::new()
            }
        };

        let role = EmployeeRole::from_param(self.role.trim())
            .filter(|role| EmployeeRole::INVITABLE.contains(role))
            .unwrap_or_else(|| {
                errors.add("role", "Choose manager or staff");
                EmployeeRole::Staff
            });

        let draft = EmployeeInviteDraft {
            name: self.name.trim().to_string(),
            email,
            role,
        };

        if let Err(e) = draft.validate() {
            errors.merge_validation(&e);
        }
        errors.into_result(draft)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct EmployeeInviteDraft {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    /// Normalized address.
    pub email: String,
    pub role: EmployeeRole,
}

impl EmployeeInviteDraft {
    #[must_use]
    pub fn into_invite(self) -> EmployeeInvite {
        EmployeeInvite {
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, role: &str) -> EmployeeInviteInput {
        EmployeeInviteInput {
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_valid_invite() {
        let invite = input(" Linh ", "linh@shop.test", "manager")
            .parse()
            .unwrap()
            .into_invite();
        assert_eq!(invite.name, "Linh");
        assert_eq!(invite.role, EmployeeRole::Manager);
    }

    #[test]
    fn test_owner_role_cannot_be_granted() {
        let errors = input("Linh", "linh@shop.test", "owner").parse().unwrap_err();
        assert_eq!(errors.first("role"), Some("Choose manager or staff"));
    }

    #[test]
    fn test_invalid_fields() {
        let errors = input("", "linh", "staff").parse().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("email"));
        assert!(!errors.has("role"));
    }
}
