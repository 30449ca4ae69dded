//! Promotion route handlers.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use storedesk_core::{
    DiscountType, PromotionId, PromotionState, SortDirection, matches_search, paginate,
};

use crate::{
    api::{Promotion, StoreApiError},
    components::{DataTableConfig, PagerView, TableState, data_table::promotions_table_config},
    error::AppError,
    filters,
    forms::{FormErrors, PromotionFormInput},
    middleware::{RequireAuth, RequireManager, set_flash},
    models::{CurrentUser, Flash},
    state::AppState,
};

use super::{Layout, backend_form_error, parse_page, render, soft_fail};

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PromotionsQuery {
    pub q: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

/// Promotion row for the list.
#[derive(Debug, Clone)]
pub struct PromotionRow {
    pub id: String,
    pub name: String,
    pub code: String,
    pub discount: String,
    pub min_order: Option<String>,
    pub usage: String,
    pub state_label: &'static str,
    pub state_class: &'static str,
    pub start_at: String,
    pub end_at: String,
}

impl PromotionRow {
    fn new(promotion: &Promotion, layout: &Layout, now: DateTime<Utc>) -> Self {
        let state = promotion.state_at(now);
        Self {
            id: promotion.id.to_string(),
            name: promotion.name.clone(),
            code: promotion.code.clone(),
            discount: discount_label(promotion, layout),
            min_order: promotion.min_order_value.map(|v| layout.money(v)),
            usage: match promotion.usage_limit {
                Some(limit) => format!("{} / {limit}", promotion.used_count),
                None => promotion.used_count.to_string(),
            },
            state_label: state.label(),
            state_class: state.badge_class(),
            start_at: promotion.start_at.format("%b %e, %Y %H:%M").to_string(),
            end_at: promotion.end_at.format("%b %e, %Y %H:%M").to_string(),
        }
    }
}

/// "15% off (max $20.00)" or "$5.00 off".
fn discount_label(promotion: &Promotion, layout: &Layout) -> String {
    match promotion.discount_type {
        DiscountType::Percentage => {
            let base = format!("{}% off", promotion.value.normalize());
            match promotion.max_discount {
                Some(max) => format!("{base} (max {})", layout.money(max)),
                None => base,
            }
        }
        DiscountType::Fixed => format!("{} off", layout.money(promotion.value)),
    }
}

/// Promotions list page template.
#[derive(Template)]
#[template(path = "promotions/index.html")]
pub struct PromotionsIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub table: TableState,
    pub pager: PagerView,
    pub rows: Vec<PromotionRow>,
    pub error: Option<String>,
}

/// Promotion create/edit form template.
#[derive(Template)]
#[template(path = "promotions/form.html")]
pub struct PromotionFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    pub input: PromotionFormInput,
    pub errors: FormErrors,
    pub discount_types: Vec<(&'static str, &'static str)>,
    /// Set on the edit form so the delete button can post to it.
    pub delete_action: Option<String>,
}

impl PromotionFormTemplate {
    fn new(layout: Layout, promotion: Option<&PromotionId>, input: PromotionFormInput) -> Self {
        let (title, action, delete_action) = match promotion {
            Some(id) => (
                "Edit promotion".to_string(),
                format!("/promotions/{id}"),
                Some(format!("/promotions/{id}/delete")),
            ),
            None => ("New promotion".to_string(), "/promotions".to_string(), None),
        };
        Self {
            layout,
            title,
            action,
            input,
            errors: FormErrors::new(),
            discount_types: [DiscountType::Percentage, DiscountType::Fixed]
                .into_iter()
                .map(|t| (t.as_param(), t.label()))
                .collect(),
            delete_action,
        }
    }
}

fn filter_and_sort(
    promotions: Vec<Promotion>,
    table: &TableState,
    now: DateTime<Utc>,
) -> Vec<Promotion> {
    let state = PromotionState::from_param(table.filter_value("state"));
    let discount_type = DiscountType::from_param(table.filter_value("type"));

    let mut promotions: Vec<Promotion> = promotions
        .into_iter()
        .filter(|p| matches_search(&table.search, &[&p.name, &p.code]))
        .filter(|p| state.is_none_or(|s| p.state_at(now) == s))
        .filter(|p| discount_type.is_none_or(|t| p.discount_type == t))
        .collect();

    promotions.sort_by(|a, b| table.dir.apply(compare(a, b, &table.sort)));
    promotions
}

fn compare(a: &Promotion, b: &Promotion, key: &str) -> Ordering {
    let by_name = || a.name.to_lowercase().cmp(&b.name.to_lowercase());
    match key {
        "value" => a.value.cmp(&b.value).then_with(by_name),
        "end" => a.end_at.cmp(&b.end_at).then_with(by_name),
        "name" => by_name(),
        _ => a.start_at.cmp(&b.start_at).then_with(by_name),
    }
}

/// Promotions list page handler.
#[instrument(skip(user, state, session))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PromotionsQuery>,
) -> Result<Response, AppError> {
    let layout = Layout::load(&state, &session, &user, "/promotions").await?;
    let result = state
        .api()
        .list_all_promotions(&user.token, &user.store_id)
        .await;
    let (promotions, error) = soft_fail(result, "promotions")?;

    let config = promotions_table_config();
    let table = TableState::new(
        &config,
        query.q.as_deref(),
        &[
            ("state", query.state.as_deref()),
            ("type", query.discount_type.as_deref()),
        ],
        query.sort.as_deref(),
        query.dir.as_deref(),
        parse_page(query.page.as_deref()),
        ("start", SortDirection::Desc),
    );

    let now = Utc::now();
    let page = paginate(
        filter_and_sort(promotions, &table, now),
        table.page,
        state.config().page_size,
    );
    let pager = PagerView::new(&page, &table);
    let rows = page
        .items
        .iter()
        .map(|p| PromotionRow::new(p, &layout, now))
        .collect();

    Ok(render(&PromotionsIndexTemplate {
        layout,
        config,
        table,
        pager,
        rows,
        error,
    }))
}

/// New promotion form.
#[instrument(skip(user, state, session))]
pub async fn new(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let layout = Layout::load(&state, &session, &user, "/promotions").await?;
    let input = PromotionFormInput::new_defaults(Utc::now());
    Ok(render(&PromotionFormTemplate::new(layout, None, input)))
}

/// Create a promotion.
#[instrument(skip(user, state, session, input))]
pub async fn create(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<PromotionFormInput>,
) -> Result<Response, AppError> {
    let draft = match input.parse() {
        Ok(draft) => draft,
        Err(errors) => {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return form_error(&state, &session, &user, None, input, errors, status).await;
        }
    };

    match state
        .api()
        .create_promotion(&user.token, &user.store_id, &draft.into_input())
        .await
    {
        Ok(promotion) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(
                promotion_id = %promotion.id,
                code = %promotion.code,
                "Promotion created"
            );
            set_flash(
                &session,
                Flash::success(format!("Created promotion {}", promotion.code)),
            )
            .await;
            Ok(Redirect::to("/promotions").into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "promotion")?;
            form_error(&state, &session, &user, None, input, errors, status).await
        }
    }
}

/// Edit promotion form.
#[instrument(skip(user, state, session))]
pub async fn edit(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = PromotionId::new(id);
    let promotion = state
        .api()
        .get_promotion(&user.token, &user.store_id, &id)
        .await?;
    let layout = Layout::load(&state, &session, &user, "/promotions").await?;
    Ok(render(&PromotionFormTemplate::new(
        layout,
        Some(&id),
        PromotionFormInput::from_promotion(&promotion),
    )))
}

/// Update a promotion.
#[instrument(skip(user, state, session, input))]
pub async fn update(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(input): Form<PromotionFormInput>,
) -> Result<Response, AppError> {
    let id = PromotionId::new(id);
    let draft = match input.parse() {
        Ok(draft) => draft,
        Err(errors) => {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return form_error(&state, &session, &user, Some(&id), input, errors, status).await;
        }
    };

    match state
        .api()
        .update_promotion(&user.token, &user.store_id, &id, &draft.into_input())
        .await
    {
        Ok(promotion) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(promotion_id = %promotion.id, "Promotion updated");
            set_flash(
                &session,
                Flash::success(format!("Saved promotion {}", promotion.code)),
            )
            .await;
            Ok(Redirect::to("/promotions").into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "promotion")?;
            form_error(&state, &session, &user, Some(&id), input, errors, status).await
        }
    }
}

/// Delete a promotion.
#[instrument(skip(user, state, session))]
pub async fn delete(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = PromotionId::new(id);
    match state
        .api()
        .delete_promotion(&user.token, &user.store_id, &id)
        .await
    {
        Ok(()) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(promotion_id = %id, "Promotion deleted");
            set_flash(&session, Flash::success("Promotion deleted")).await;
        }
        Err(StoreApiError::Unauthorized) => return Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(promotion_id = %id, error = %e, "Failed to delete promotion");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(Redirect::to("/promotions"))
}

async fn form_error(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    promotion: Option<&PromotionId>,
    input: PromotionFormInput,
    errors: FormErrors,
    status: StatusCode,
) -> Result<Response, AppError> {
    let layout = Layout::load(state, session, user, "/promotions").await?;
    let mut template = PromotionFormTemplate::new(layout, promotion, input);
    template.errors = errors;
    Ok((status, render(&template)).into_response())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    /// A promotion running from midnight UTC on `start` to midnight on `end`.
    fn promotion(
        name: &str,
        kind: &str,
        value: &str,
        window: (&str, &str),
        active: bool,
    ) -> Promotion {
        serde_json::from_value(serde_json::json!({
            "id": name,
            "name": name,
            "code": name.to_uppercase(),
            "discountType": kind,
            "value": value,
            "startAt": format!("{}T00:00:00Z", window.0),
            "endAt": format!("{}T00:00:00Z", window.1),
            "active": active
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    fn promotions() -> Vec<Promotion> {
        vec![
            promotion("spring", "PERCENTAGE", "10", ("2024-03-01", "2024-06-01"), true),
            promotion("summer", "FIXED", "5", ("2024-06-01", "2024-09-01"), true),
            promotion("winter", "PERCENTAGE", "25", ("2023-12-01", "2024-02-01"), true),
            promotion("paused", "FIXED", "3", ("2024-03-01", "2024-06-01"), false),
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid date"))
    }

    fn table(
        state: Option<&str>,
        kind: Option<&str>,
        sort: Option<&str>,
        dir: Option<&str>,
    ) -> TableState {
        TableState::new(
            &promotions_table_config(),
            None,
            &[("state", state), ("type", kind)],
            sort,
            dir,
            None,
            ("start", SortDirection::Desc),
        )
    }

    fn names(promotions: &[Promotion]) -> Vec<&str> {
        promotions.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_state_filter_uses_derived_state() {
        let in_state = |state: &str| {
            filter_and_sort(promotions(), &table(Some(state), None, None, None), now())
        };

        assert_eq!(names(&in_state("active")), vec!["spring"]);
        assert_eq!(names(&in_state("scheduled")), vec!["summer"]);
        assert_eq!(names(&in_state("expired")), vec!["winter"]);
        assert_eq!(names(&in_state("inactive")), vec!["paused"]);
    }

    #[test]
    fn test_type_filter_and_value_sort() {
        let table = table(None, Some("fixed"), Some("value"), Some("desc"));
        let fixed = filter_and_sort(promotions(), &table, now());
        assert_eq!(names(&fixed), vec!["summer", "paused"]);
    }

    #[test]
    fn test_default_sort_latest_start_first() {
        let sorted = filter_and_sort(promotions(), &table(None, None, None, None), now());
        assert_eq!(names(&sorted), vec!["summer", "spring", "paused", "winter"]);
    }
}
