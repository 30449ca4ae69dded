//! Authentication payloads.

use serde::{Deserialize, Serialize};

use storedesk_core::{EmployeeRole, StoreId};

/// `POST /store/auth/login` body.
#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub store_id: StoreId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: EmployeeRole,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("store_id", &self.store_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish()
    }
}

/// `PUT /store/auth/password` body.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_credentials() {
        let req = LoginRequest {
            email: "owner@shop.test".to_string(),
            password: "hunter22".to_string(),
        };
        let out = format!("{req:?}");
        assert!(out.contains("owner@shop.test"));
        assert!(!out.contains("hunter22"));

        let change = PasswordChange {
            current_password: "old-pass-1".to_string(),
            new_password: "new-pass-2".to_string(),
        };
        let out = format!("{change:?}");
        assert!(!out.contains("old-pass-1"));
        assert!(!out.contains("new-pass-2"));
    }

    #[test]
    fn test_login_response_accepts_numeric_store_id() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"token":"t","storeId":42,"name":"Ann","email":"ann@shop.test","role":"OWNER"}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(resp.store_id.as_str(), "42");
        assert_eq!(resp.role, EmployeeRole::Owner);
    }
}
