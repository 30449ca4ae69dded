//! Status enums for store entities.
//!
//! The backend serializes these as `SCREAMING_SNAKE_CASE` strings. Each enum
//! also knows its display label, the badge class used in list views, and the
//! lowercase form used in query strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipping,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Shipping => "Shipping",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Badge CSS classes for list and detail views.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Pending => "bg-yellow-100 text-yellow-700",
            Self::Confirmed => "bg-blue-100 text-blue-700",
            Self::Shipping => "bg-indigo-100 text-indigo-700",
            Self::Delivered => "bg-green-100 text-green-700",
            Self::Cancelled => "bg-gray-100 text-gray-700",
        }
    }

    /// Query-string form (`pending`, `shipping`, ...).
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the query-string form. Unknown values yield `None`.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_param().eq_ignore_ascii_case(s))
    }

    /// Statuses an order may move to from this one.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Shipping, Self::Cancelled],
            Self::Shipping => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Whether moving to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Whether the order is finished and can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Product visibility in the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Hidden,
}

impl ProductStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Hidden => "Hidden",
        }
    }

    /// Badge CSS classes.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Active => "bg-green-100 text-green-700",
            Self::Hidden => "bg-gray-100 text-gray-700",
        }
    }

    /// Query-string / form value.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Hidden => "hidden",
        }
    }

    /// Parse the query-string / form value.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "hidden" => Some(Self::Hidden),
            _ => None,
        }
    }
}

/// How a promotion's value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `value` is a percentage of the order subtotal.
    #[default]
    Percentage,
    /// `value` is a fixed amount off.
    Fixed,
}

impl DiscountType {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Percentage => "Percentage",
            Self::Fixed => "Fixed amount",
        }
    }

    /// Form value.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }

    /// Parse the form value.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "percentage" => Some(Self::Percentage),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

/// Where a promotion sits in its lifetime, derived from its window, usage
/// and the `active` switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionState {
    Active,
    Scheduled,
    Expired,
    Inactive,
}

impl PromotionState {
    /// All states, in filter-dropdown order.
    pub const ALL: [Self; 4] = [Self::Active, Self::Scheduled, Self::Expired, Self::Inactive];

    /// Derive the state of a promotion at `now`.
    ///
    /// A switched-off promotion is `Inactive` regardless of dates. A promotion
    /// whose usage limit is used up counts as `Expired`.
    #[must_use]
    pub fn at(
        active: bool,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        usage_limit: Option<i64>,
        used_count: i64,
        now: DateTime<Utc>,
    ) -> Self {
        if !active {
            return Self::Inactive;
        }
        if now < start_at {
            return Self::Scheduled;
        }
        let exhausted = usage_limit.is_some_and(|limit| used_count >= limit);
        if now >= end_at || exhausted {
            return Self::Expired;
        }
        Self::Active
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Scheduled => "Scheduled",
            Self::Expired => "Expired",
            Self::Inactive => "Inactive",
        }
    }

    /// Badge CSS classes.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Active => "bg-green-100 text-green-700",
            Self::Scheduled => "bg-blue-100 text-blue-700",
            Self::Expired => "bg-gray-100 text-gray-600",
            Self::Inactive => "bg-yellow-100 text-yellow-700",
        }
    }

    /// Query-string form.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Scheduled => "scheduled",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
        }
    }

    /// Parse the query-string form.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_param().eq_ignore_ascii_case(s))
    }
}

/// Role of an employee within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeRole {
    /// Store owner; cannot be removed from the dashboard.
    Owner,
    /// Can manage products, orders and promotions.
    Manager,
    /// Day-to-day order handling.
    #[default]
    Staff,
}

impl EmployeeRole {
    /// All roles.
    pub const ALL: [Self; 3] = [Self::Owner, Self::Manager, Self::Staff];

    /// Roles that can be granted through the invite form.
    pub const INVITABLE: [Self; 2] = [Self::Manager, Self::Staff];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Manager => "Manager",
            Self::Staff => "Staff",
        }
    }

    /// Query-string / form value.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Staff => "staff",
        }
    }

    /// Parse the query-string / form value.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_param().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Category of a dashboard notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Order,
    Stock,
    Promotion,
    #[default]
    System,
}

impl NotificationKind {
    /// Phosphor icon class.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Order => "ph-receipt",
            Self::Stock => "ph-package",
            Self::Promotion => "ph-tag",
            Self::System => "ph-info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipping));
        assert!(OrderStatus::Shipping.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Shipping.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.next_statuses().is_empty());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_order_status_params_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_param(status.as_param()), Some(status));
        }
        assert_eq!(OrderStatus::from_param("SHIPPING"), Some(OrderStatus::Shipping));
        assert_eq!(OrderStatus::from_param("lost"), None);
    }

    #[test]
    fn test_backend_serialization() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap_or_default();
        assert_eq!(json, "\"CANCELLED\"");
        let role: EmployeeRole = serde_json::from_str("\"MANAGER\"").unwrap_or_default();
        assert_eq!(role, EmployeeRole::Manager);
    }

    #[test]
    fn test_promotion_state() {
        use chrono::{Duration, TimeZone};

        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().unwrap_or_default();
        let end = start + Duration::days(30);
        let mid = start + Duration::days(10);

        assert_eq!(
            PromotionState::at(true, start, end, None, 0, mid),
            PromotionState::Active
        );
        assert_eq!(
            PromotionState::at(true, start, end, None, 0, start - Duration::hours(1)),
            PromotionState::Scheduled
        );
        assert_eq!(
            PromotionState::at(true, start, end, None, 0, end),
            PromotionState::Expired
        );
        assert_eq!(
            PromotionState::at(true, start, end, Some(100), 100, mid),
            PromotionState::Expired
        );
        assert_eq!(
            PromotionState::at(false, start, end, None, 0, mid),
            PromotionState::Inactive
        );
    }

    #[test]
    fn test_owner_is_not_invitable() {
        assert!(!EmployeeRole::INVITABLE.contains(&EmployeeRole::Owner));
    }
}
