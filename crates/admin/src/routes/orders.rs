//! Order route handlers.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use storedesk_core::{OrderId, OrderStatus, SortDirection, matches_search, paginate};

use crate::{
    api::{Order, StoreApiError},
    components::{DataTableConfig, PagerView, TableState, data_table::orders_table_config},
    error::AppError,
    filters,
    middleware::{RequireAuth, set_flash},
    models::Flash,
    state::AppState,
};

use super::{Layout, parse_page, pick_tab, render, soft_fail};

const DETAIL_TABS: [&str; 2] = ["items", "customer"];

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

/// Detail query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub tab: Option<String>,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Order row for the list.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub item_count: i64,
    pub total: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub created_at: String,
}

impl OrderRow {
    fn new(order: &Order, layout: &Layout) -> Self {
        Self {
            id: order.id.to_string(),
            code: order.code.clone(),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            item_count: order.item_count(),
            total: layout.money(order.total),
            status_label: order.status.label(),
            status_class: order.status.badge_class(),
            created_at: order.created_at.format("%b %e, %Y %H:%M").to_string(),
        }
    }
}

/// Line item on the detail page.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: String,
    pub line_total: String,
}

/// Order detail view.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub row: OrderRow,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub shipping_fee: String,
    pub discount: Option<String>,
    pub promotion_code: Option<String>,
    pub note: Option<String>,
    /// `(form value, button label)` for each allowed next status.
    pub next_statuses: Vec<(&'static str, &'static str)>,
}

impl OrderDetailView {
    fn new(order: &Order, layout: &Layout) -> Self {
        Self {
            row: OrderRow::new(order, layout),
            customer_email: order.customer_email.clone(),
            shipping_address: order.shipping_address.clone(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    product_id: item.product_id.to_string(),
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price: layout.money(item.unit_price),
                    line_total: layout.money(item.line_total()),
                })
                .collect(),
            subtotal: layout.money(order.subtotal),
            shipping_fee: layout.money(order.shipping_fee),
            discount: (!order.discount.is_zero()).then(|| layout.money(order.discount)),
            promotion_code: order.promotion_code.clone(),
            note: order.note.clone().filter(|n| !n.trim().is_empty()),
            next_statuses: order
                .status
                .next_statuses()
                .iter()
                .map(|s| (s.as_param(), s.label()))
                .collect(),
        }
    }
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub table: TableState,
    pub pager: PagerView,
    pub rows: Vec<OrderRow>,
    pub error: Option<String>,
}

/// Order detail template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: Layout,
    pub tab: &'static str,
    pub order: OrderDetailView,
}

fn filter_and_sort(orders: Vec<Order>, table: &TableState) -> Vec<Order> {
    let status = OrderStatus::from_param(table.filter_value("status"));

    let mut orders: Vec<Order> = orders
        .into_iter()
        .filter(|o| {
            matches_search(
                &table.search,
                &[
                    &o.code,
                    &o.customer_name,
                    &o.customer_phone,
                    o.customer_email.as_deref().unwrap_or_default(),
                ],
            )
        })
        .filter(|o| status.is_none_or(|s| o.status == s))
        .collect();

    orders.sort_by(|a, b| table.dir.apply(compare(a, b, &table.sort)));
    orders
}

fn compare(a: &Order, b: &Order, key: &str) -> Ordering {
    match key {
        "total" => a.total.cmp(&b.total).then_with(|| a.created_at.cmp(&b.created_at)),
        "code" => a.code.cmp(&b.code),
        _ => a.created_at.cmp(&b.created_at).then_with(|| a.code.cmp(&b.code)),
    }
}

/// Why a requested status change is refused, if it is.
fn transition_error(from: OrderStatus, to: OrderStatus) -> Option<String> {
    if from.can_transition_to(to) {
        return None;
    }
    Some(if from.is_terminal() {
        format!("{} orders can no longer change status", from.label())
    } else {
        format!(
            "Cannot move an order from {} to {}",
            from.label(),
            to.label()
        )
    })
}

/// Orders list page handler.
#[instrument(skip(user, state, session))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Result<Response, AppError> {
    let layout = Layout::load(&state, &session, &user, "/orders").await?;
    let result = state.api().list_all_orders(&user.token, &user.store_id).await;
    let (orders, error) = soft_fail(result, "orders")?;

    let config = orders_table_config();
    let table = TableState::new(
        &config,
        query.q.as_deref(),
        &[("status", query.status.as_deref())],
        query.sort.as_deref(),
        query.dir.as_deref(),
        parse_page(query.page.as_deref()),
        ("created", SortDirection::Desc),
    );

    let page = paginate(
        filter_and_sort(orders, &table),
        table.page,
        state.config().page_size,
    );
    let pager = PagerView::new(&page, &table);
    let rows = page.items.iter().map(|o| OrderRow::new(o, &layout)).collect();

    Ok(render(&OrdersIndexTemplate {
        layout,
        config,
        table,
        pager,
        rows,
        error,
    }))
}

/// Order detail page.
#[instrument(skip(user, state, session))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, AppError> {
    let order = state
        .api()
        .get_order(&user.token, &user.store_id, &OrderId::new(id))
        .await?;
    let layout = Layout::load(&state, &session, &user, "/orders").await?;

    Ok(render(&OrderShowTemplate {
        tab: pick_tab(query.tab.as_deref(), &DETAIL_TABS),
        order: OrderDetailView::new(&order, &layout),
        layout,
    }))
}

/// Move an order to its next status.
///
/// Any signed-in employee may do this; the transition must be one the
/// current status allows.
#[instrument(skip(user, state, session, form))]
pub async fn update_status(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let id = OrderId::new(id);
    let back = Redirect::to(&format!("/orders/{id}"));

    let Some(next) = OrderStatus::from_param(form.status.trim()) else {
        set_flash(&session, Flash::error("Unknown order status")).await;
        return Ok(back);
    };

    let order = state
        .api()
        .get_order(&user.token, &user.store_id, &id)
        .await?;
    if let Some(message) = transition_error(order.status, next) {
        tracing::info!(order_id = %id, from = ?order.status, to = ?next, "Rejected status change");
        set_flash(&session, Flash::error(message)).await;
        return Ok(back);
    }

    match state
        .api()
        .update_order_status(&user.token, &user.store_id, &id, next)
        .await
    {
        Ok(updated) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(order_id = %id, status = ?updated.status, "Order status changed");
            set_flash(
                &session,
                Flash::success(format!("Order {} is now {}", updated.code, updated.status.label())),
            )
            .await;
        }
        Err(StoreApiError::Unauthorized) => return Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(order_id = %id, error = %e, "Failed to change order status");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(back)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(code: &str, customer: &str, total: &str, status: &str, created: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": code,
            "code": code,
            "customerName": customer,
            "customerPhone": "0900000000",
            "total": total,
            "status": status,
            "createdAt": created
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    fn orders() -> Vec<Order> {
        vec![
            order("SD-1002", "Linh Tran", "40", "PENDING", "2024-05-02T09:00:00Z"),
            order("SD-1001", "Minh Pham", "15", "DELIVERED", "2024-05-01T09:00:00Z"),
            order("SD-1003", "Lan Do", "90", "PENDING", "2024-05-03T09:00:00Z"),
        ]
    }

    fn table(
        q: Option<&str>,
        status: Option<&str>,
        sort: Option<&str>,
        dir: Option<&str>,
    ) -> TableState {
        TableState::new(
            &orders_table_config(),
            q,
            &[("status", status)],
            sort,
            dir,
            None,
            ("created", SortDirection::Desc),
        )
    }

    fn codes(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.code.as_str()).collect()
    }

    #[test]
    fn test_default_newest_first() {
        let sorted = filter_and_sort(orders(), &table(None, None, None, None));
        assert_eq!(codes(&sorted), vec!["SD-1003", "SD-1002", "SD-1001"]);
    }

    #[test]
    fn test_sort_by_total_and_code() {
        let by_total = filter_and_sort(orders(), &table(None, None, Some("total"), Some("desc")));
        assert_eq!(codes(&by_total), vec!["SD-1003", "SD-1002", "SD-1001"]);

        let by_code = filter_and_sort(orders(), &table(None, None, Some("code"), Some("asc")));
        assert_eq!(codes(&by_code), vec!["SD-1001", "SD-1002", "SD-1003"]);
    }

    #[test]
    fn test_status_filter_and_search() {
        let pending = filter_and_sort(orders(), &table(None, Some("pending"), Some("code"), None));
        assert_eq!(codes(&pending), vec!["SD-1002", "SD-1003"]);

        let found = filter_and_sort(orders(), &table(Some("minh"), None, None, None));
        assert_eq!(codes(&found), vec!["SD-1001"]);
    }

    #[test]
    fn test_transition_errors() {
        assert_eq!(transition_error(OrderStatus::Pending, OrderStatus::Confirmed), None);
        assert_eq!(
            transition_error(OrderStatus::Pending, OrderStatus::Delivered).as_deref(),
            Some("Cannot move an order from Pending to Delivered")
        );
        assert_eq!(
            transition_error(OrderStatus::Cancelled, OrderStatus::Pending).as_deref(),
            Some("Cancelled orders can no longer change status")
        );
    }
}
