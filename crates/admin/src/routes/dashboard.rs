//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Response};
use chrono::Utc;
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use storedesk_core::{OrderStatus, PromotionState, StockTier};

use crate::{
    api::{Order, Product, Promotion},
    error::AppError,
    filters,
    middleware::RequireAuth,
    state::AppState,
};

use super::{Layout, render, soft_fail};

const LOW_STOCK_LIMIT: usize = 8;
const RECENT_ORDERS_LIMIT: usize = 5;

/// Dashboard metrics.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub products: usize,
    pub low_stock: usize,
    pub orders: usize,
    pub pending_orders: usize,
    pub revenue: String,
    pub active_promotions: usize,
}

/// Low-stock row.
#[derive(Debug, Clone)]
pub struct LowStockView {
    pub id: String,
    pub name: String,
    pub in_stock: i64,
    pub tier_label: &'static str,
    pub tier_class: &'static str,
}

/// Recent order row.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: String,
    pub code: String,
    pub customer_name: String,
    pub total: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub created_at: String,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub metrics: DashboardMetrics,
    pub low_stock: Vec<LowStockView>,
    pub recent_orders: Vec<RecentOrderView>,
    pub errors: Vec<String>,
}

/// Products that need restocking, most urgent first.
fn low_stock(products: &[Product]) -> Vec<&Product> {
    let mut low: Vec<&Product> = products
        .iter()
        .filter(|p| p.stock_tier().needs_attention())
        .collect();
    low.sort_by(|a, b| {
        a.stock_tier()
            .cmp(&b.stock_tier())
            .then(a.in_stock.cmp(&b.in_stock))
            .then_with(|| a.name.cmp(&b.name))
    });
    low
}

/// Newest orders first.
fn recent_orders(orders: &[Order]) -> Vec<&Order> {
    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_ORDERS_LIMIT);
    recent
}

/// Revenue counts every order that was not cancelled.
fn revenue(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .map(|o| o.total)
        .sum()
}

fn metrics(
    layout: &Layout,
    products: &[Product],
    orders: &[Order],
    promotions: &[Promotion],
) -> DashboardMetrics {
    let now = Utc::now();
    DashboardMetrics {
        products: products.len(),
        low_stock: products
            .iter()
            .filter(|p| p.stock_tier().needs_attention())
            .count(),
        orders: orders.len(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
        revenue: layout.money(revenue(orders)),
        active_promotions: promotions
            .iter()
            .filter(|p| p.state_at(now) == PromotionState::Active)
            .count(),
    }
}

/// Dashboard page handler.
#[instrument(skip(user, state, session))]
pub async fn dashboard(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let layout = Layout::load(&state, &session, &user, "/").await?;

    let api = state.api();
    let (products, orders, promotions) = tokio::join!(
        api.list_all_products(&user.token, &user.store_id),
        api.list_all_orders(&user.token, &user.store_id),
        api.list_all_promotions(&user.token, &user.store_id),
    );

    let (products, products_error) = soft_fail(products, "products")?;
    let (orders, orders_error) = soft_fail(orders, "orders")?;
    let (promotions, promotions_error) = soft_fail(promotions, "promotions")?;
    let mut errors: Vec<String> = [products_error, orders_error, promotions_error]
        .into_iter()
        .flatten()
        .collect();
    errors.dedup();

    let low_stock = low_stock(&products)
        .into_iter()
        .take(LOW_STOCK_LIMIT)
        .map(|p| {
            let tier: StockTier = p.stock_tier();
            LowStockView {
                id: p.id.to_string(),
                name: p.name.clone(),
                in_stock: p.in_stock,
                tier_label: tier.label(),
                tier_class: tier.badge_class(),
            }
        })
        .collect();

    let recent_orders = recent_orders(&orders)
        .into_iter()
        .map(|o| RecentOrderView {
            id: o.id.to_string(),
            code: o.code.clone(),
            customer_name: o.customer_name.clone(),
            total: layout.money(o.total),
            status_label: o.status.label(),
            status_class: o.status.badge_class(),
            created_at: o.created_at.format("%b %e, %H:%M").to_string(),
        })
        .collect();

    let template = DashboardTemplate {
        metrics: metrics(&layout, &products, &orders, &promotions),
        layout,
        low_stock,
        recent_orders,
        errors,
    };
    Ok(render(&template))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, in_stock: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": name,
            "name": name,
            "price": "10",
            "inStock": in_stock,
            "yellowLine": 10,
            "redLine": 3,
            "status": "ACTIVE"
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    fn order(code: &str, total: &str, status: &str, created: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": code,
            "code": code,
            "customerName": "Ann",
            "customerPhone": "0912345678",
            "shippingAddress": "1 Main St",
            "items": [],
            "subtotal": total,
            "shippingFee": "0",
            "discount": "0",
            "total": total,
            "status": status,
            "createdAt": created
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_low_stock_orders_by_urgency() {
        let products = vec![
            product("plenty", 50),
            product("low", 8),
            product("gone", 0),
            product("critical", 2),
        ];
        let names: Vec<&str> = low_stock(&products).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["gone", "critical", "low"]);
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let orders = vec![
            order("A1", "10", "PENDING", "2024-05-01T10:00:00Z"),
            order("A3", "10", "PENDING", "2024-05-03T10:00:00Z"),
            order("A2", "10", "PENDING", "2024-05-02T10:00:00Z"),
        ];
        let codes: Vec<&str> = recent_orders(&orders).iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["A3", "A2", "A1"]);
    }

    #[test]
    fn test_revenue_skips_cancelled() {
        let orders = vec![
            order("A1", "10.50", "DELIVERED", "2024-05-01T10:00:00Z"),
            order("A2", "99", "CANCELLED", "2024-05-01T10:00:00Z"),
            order("A3", "4.50", "PENDING", "2024-05-01T10:00:00Z"),
        ];
        assert_eq!(revenue(&orders), Decimal::new(15, 0));
    }
}
