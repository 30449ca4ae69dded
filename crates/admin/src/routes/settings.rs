//! Settings route handlers.
//!
//! One page with tabs. Each tab's form posts to its own route, which
//! redirects back to the tab on success and re-renders it with errors on
//! failure.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use storedesk_core::{CurrencyCode, EmployeeRole};

use crate::{
    api::{ImageRef, Store, StoreApiError},
    error::AppError,
    filters,
    forms::{EmployeeInviteInput, FormErrors, OrderSettingsInput, PasswordInput, StoreSettingsInput},
    middleware::{RequireAuth, RequireManager, set_flash},
    models::{CurrentUser, Flash},
    state::AppState,
};

use super::{
    Layout, backend_form_error,
    employees::{EmployeeRow, invitable_roles},
    pick_tab, render, soft_fail,
};

const TABS: [&str; 5] = ["store", "orders", "password", "notifications", "employees"];

/// Settings query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    pub tab: Option<String>,
}

/// Settings page template.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub layout: Layout,
    pub tab: &'static str,
    pub load_error: Option<String>,
    pub store_input: StoreSettingsInput,
    pub store_errors: FormErrors,
    pub logo: Option<ImageRef>,
    pub currencies: Vec<(&'static str, &'static str)>,
    pub order_input: OrderSettingsInput,
    pub order_errors: FormErrors,
    pub password_errors: FormErrors,
    pub employees: Vec<EmployeeRow>,
    pub employees_error: Option<String>,
    pub invite: EmployeeInviteInput,
    pub roles: Vec<(&'static str, &'static str)>,
}

/// A form submission to show instead of the stored values.
#[derive(Default)]
struct Resubmitted {
    store: Option<(StoreSettingsInput, FormErrors)>,
    orders: Option<(OrderSettingsInput, FormErrors)>,
    password: Option<FormErrors>,
}

async fn render_settings(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    tab: &'static str,
    resubmitted: Resubmitted,
) -> Result<Response, AppError> {
    let layout = Layout::load(state, session, user, "/settings").await?;

    let (store, load_error) = match state
        .store_cache()
        .get_or_fetch(state.api(), &user.token, &user.store_id)
        .await
    {
        Ok(cached) => (Some(cached.store), None),
        Err(StoreApiError::Unauthorized) => return Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load store settings");
            (None, Some(e.user_message()))
        }
    };
    let store: Option<&Store> = store.as_deref();

    let (store_input, store_errors) = resubmitted.store.unwrap_or_else(|| {
        (
            store.map(StoreSettingsInput::from_store).unwrap_or_default(),
            FormErrors::new(),
        )
    });
    let (order_input, order_errors) = resubmitted.orders.unwrap_or_else(|| {
        (
            store
                .map(|s| OrderSettingsInput::from_settings(&s.order_settings))
                .unwrap_or_default(),
            FormErrors::new(),
        )
    });
    let logo = store
        .and_then(|s| s.logo.clone())
        .filter(|logo| logo.id.as_str() == store_input.logo_id.trim());

    let (employees, employees_error) = if tab == "employees" {
        let result = state
            .api()
            .list_all_employees(&user.token, &user.store_id)
            .await;
        let (mut employees, error) = soft_fail(result, "employees")?;
        employees.sort_by_key(|e| e.name.to_lowercase());
        (
            employees.iter().map(|e| EmployeeRow::new(e, user)).collect(),
            error,
        )
    } else {
        (vec![], None)
    };

    Ok(render(&SettingsTemplate {
        layout,
        tab,
        load_error,
        store_input,
        store_errors,
        logo,
        currencies: CurrencyCode::ALL
            .into_iter()
            .map(|c| (c.code(), c.symbol()))
            .collect(),
        order_input,
        order_errors,
        password_errors: resubmitted.password.unwrap_or_default(),
        employees,
        employees_error,
        invite: EmployeeInviteInput {
            role: EmployeeRole::Staff.as_param().to_string(),
            ..EmployeeInviteInput::default()
        },
        roles: invitable_roles(),
    }))
}

/// Settings page handler.
#[instrument(skip(user, state, session))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SettingsQuery>,
) -> Result<Response, AppError> {
    let tab = pick_tab(query.tab.as_deref(), &TABS);
    render_settings(&state, &session, &user, tab, Resubmitted::default()).await
}

/// Save the store profile.
#[instrument(skip(user, state, session, input))]
pub async fn update_store(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<StoreSettingsInput>,
) -> Result<Response, AppError> {
    let draft = match input.parse() {
        Ok(draft) => draft,
        Err(errors) => {
            let resubmitted = Resubmitted {
                store: Some((input, errors)),
                ..Resubmitted::default()
            };
            let page = render_settings(&state, &session, &user, "store", resubmitted).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state
        .api()
        .update_store(&user.token, &user.store_id, &draft.into_update())
        .await
    {
        Ok(_) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(store_id = %user.store_id, "Store profile saved");
            set_flash(&session, Flash::success("Store settings saved")).await;
            Ok(Redirect::to("/settings?tab=store").into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "store settings")?;
            let resubmitted = Resubmitted {
                store: Some((input, errors)),
                ..Resubmitted::default()
            };
            let page = render_settings(&state, &session, &user, "store", resubmitted).await?;
            Ok((status, page).into_response())
        }
    }
}

/// Save the order settings.
#[instrument(skip(user, state, session, input))]
pub async fn update_orders(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<OrderSettingsInput>,
) -> Result<Response, AppError> {
    let draft = match input.parse() {
        Ok(draft) => draft,
        Err(errors) => {
            let resubmitted = Resubmitted {
                orders: Some((input, errors)),
                ..Resubmitted::default()
            };
            let page = render_settings(&state, &session, &user, "orders", resubmitted).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state
        .api()
        .update_order_settings(&user.token, &user.store_id, &draft.into_settings())
        .await
    {
        Ok(()) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(store_id = %user.store_id, "Order settings saved");
            set_flash(&session, Flash::success("Order settings saved")).await;
            Ok(Redirect::to("/settings?tab=orders").into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "order settings")?;
            let resubmitted = Resubmitted {
                orders: Some((input, errors)),
                ..Resubmitted::default()
            };
            let page = render_settings(&state, &session, &user, "orders", resubmitted).await?;
            Ok((status, page).into_response())
        }
    }
}

/// Change the signed-in user's password. Any role may do this.
#[instrument(skip(user, state, session, input))]
pub async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<PasswordInput>,
) -> Result<Response, AppError> {
    let draft = match input.parse() {
        Ok(draft) => draft,
        Err(errors) => {
            let resubmitted = Resubmitted {
                password: Some(errors),
                ..Resubmitted::default()
            };
            let page = render_settings(&state, &session, &user, "password", resubmitted).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state
        .api()
        .change_password(&user.token, &draft.into_change())
        .await
    {
        Ok(()) => {
            tracing::info!("Password changed");
            set_flash(&session, Flash::success("Password changed")).await;
            Ok(Redirect::to("/settings?tab=password").into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "password change")?;
            let resubmitted = Resubmitted {
                password: Some(errors),
                ..Resubmitted::default()
            };
            let page = render_settings(&state, &session, &user, "password", resubmitted).await?;
            Ok((status, page).into_response())
        }
    }
}
