//! Employee resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storedesk_core::{EmployeeId, EmployeeRole};

/// A person with access to the store dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: EmployeeRole,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

/// `POST /store/{id}/employees` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeInvite {
    pub name: String,
    pub email: String,
    pub role: EmployeeRole,
}
