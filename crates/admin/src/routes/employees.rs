//! Employee route handlers.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use storedesk_core::{EmployeeId, EmployeeRole, SortDirection, matches_search, paginate};

use crate::{
    api::{Employee, StoreApiError},
    components::{DataTableConfig, PagerView, TableState, data_table::employees_table_config},
    error::AppError,
    filters,
    forms::{EmployeeInviteInput, FormErrors},
    middleware::{RequireAuth, RequireManager, set_flash},
    models::{CurrentUser, Flash},
    state::AppState,
};

use super::{Layout, backend_form_error, parse_page, render, short_date, soft_fail};

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeesQuery {
    pub q: Option<String>,
    pub role: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

/// Employee row for the list.
#[derive(Debug, Clone)]
pub struct EmployeeRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role_label: &'static str,
    pub role_class: &'static str,
    pub joined_at: String,
    /// Whether the signed-in user may remove this employee.
    pub removable: bool,
}

impl EmployeeRow {
    pub(crate) fn new(employee: &Employee, viewer: &CurrentUser) -> Self {
        Self {
            id: employee.id.to_string(),
            name: employee.name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone().unwrap_or_default(),
            role_label: employee.role.label(),
            role_class: role_class(employee.role),
            joined_at: short_date(employee.joined_at),
            removable: removal_error(employee, viewer).is_none(),
        }
    }
}

const fn role_class(role: EmployeeRole) -> &'static str {
    match role {
        EmployeeRole::Owner => "bg-purple-100 text-purple-700",
        EmployeeRole::Manager => "bg-blue-100 text-blue-700",
        EmployeeRole::Staff => "bg-gray-100 text-gray-700",
    }
}

/// Role options for the invite form.
pub(crate) fn invitable_roles() -> Vec<(&'static str, &'static str)> {
    EmployeeRole::INVITABLE
        .into_iter()
        .map(|r| (r.as_param(), r.label()))
        .collect()
}

/// Why `viewer` may not remove `employee`, if they may not.
fn removal_error(employee: &Employee, viewer: &CurrentUser) -> Option<&'static str> {
    if !viewer.can_manage() {
        Some("Only owners and managers can remove employees")
    } else if employee.role == EmployeeRole::Owner {
        Some("The store owner cannot be removed")
    } else if employee.email.eq_ignore_ascii_case(&viewer.email) {
        Some("You cannot remove yourself")
    } else {
        None
    }
}

/// Employees list page template.
#[derive(Template)]
#[template(path = "employees/index.html")]
pub struct EmployeesIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub table: TableState,
    pub pager: PagerView,
    pub rows: Vec<EmployeeRow>,
    pub error: Option<String>,
    pub invite: EmployeeInviteInput,
    pub errors: FormErrors,
    pub roles: Vec<(&'static str, &'static str)>,
}

fn filter_and_sort(employees: Vec<Employee>, table: &TableState) -> Vec<Employee> {
    let role = EmployeeRole::from_param(table.filter_value("role"));

    let mut employees: Vec<Employee> = employees
        .into_iter()
        .filter(|e| matches_search(&table.search, &[&e.name, &e.email]))
        .filter(|e| role.is_none_or(|r| e.role == r))
        .collect();

    employees.sort_by(|a, b| table.dir.apply(compare(a, b, &table.sort)));
    employees
}

fn role_rank(role: EmployeeRole) -> usize {
    EmployeeRole::ALL
        .iter()
        .position(|r| *r == role)
        .unwrap_or(EmployeeRole::ALL.len())
}

fn compare(a: &Employee, b: &Employee, key: &str) -> Ordering {
    let by_name = || a.name.to_lowercase().cmp(&b.name.to_lowercase());
    match key {
        "email" => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        "role" => role_rank(a.role).cmp(&role_rank(b.role)).then_with(by_name),
        "joined" => a.joined_at.cmp(&b.joined_at).then_with(by_name),
        _ => by_name(),
    }
}

async fn render_index(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    query: &EmployeesQuery,
    invite: EmployeeInviteInput,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let layout = Layout::load(state, session, user, "/employees").await?;
    let result = state
        .api()
        .list_all_employees(&user.token, &user.store_id)
        .await;
    let (employees, error) = soft_fail(result, "employees")?;

    let config = employees_table_config();
    let table = TableState::new(
        &config,
        query.q.as_deref(),
        &[("role", query.role.as_deref())],
        query.sort.as_deref(),
        query.dir.as_deref(),
        parse_page(query.page.as_deref()),
        ("name", SortDirection::Asc),
    );

    let page = paginate(
        filter_and_sort(employees, &table),
        table.page,
        state.config().page_size,
    );
    let pager = PagerView::new(&page, &table);
    let rows = page
        .items
        .iter()
        .map(|e| EmployeeRow::new(e, user))
        .collect();

    Ok(render(&EmployeesIndexTemplate {
        layout,
        config,
        table,
        pager,
        rows,
        error,
        invite,
        errors,
        roles: invitable_roles(),
    }))
}

/// Employees list page handler.
#[instrument(skip(user, state, session))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<EmployeesQuery>,
) -> Result<Response, AppError> {
    let invite = EmployeeInviteInput {
        role: EmployeeRole::Staff.as_param().to_string(),
        ..EmployeeInviteInput::default()
    };
    render_index(&state, &session, &user, &query, invite, FormErrors::new()).await
}

/// Invite an employee.
#[instrument(skip(user, state, session, input))]
pub async fn invite(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<EmployeeInviteInput>,
) -> Result<Response, AppError> {
    let query = EmployeesQuery::default();
    let draft = match input.parse() {
        Ok(draft) => draft,
        Err(errors) => {
            let page = render_index(&state, &session, &user, &query, input, errors).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state
        .api()
        .invite_employee(&user.token, &user.store_id, &draft.into_invite())
        .await
    {
        Ok(employee) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(employee_id = %employee.id, role = %employee.role, "Employee invited");
            set_flash(
                &session,
                Flash::success(format!("Invited {} as {}", employee.name, employee.role.label())),
            )
            .await;
            Ok(Redirect::to("/employees").into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "employee invite")?;
            let page = render_index(&state, &session, &user, &query, input, errors).await?;
            Ok((status, page).into_response())
        }
    }
}

/// Remove an employee. Owners and the signed-in user cannot be removed.
#[instrument(skip(user, state, session))]
pub async fn remove(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = EmployeeId::new(id);
    let employees = state
        .api()
        .list_all_employees(&user.token, &user.store_id)
        .await?;

    let Some(employee) = employees.iter().find(|e| e.id == id) else {
        set_flash(&session, Flash::error("That employee no longer exists")).await;
        return Ok(Redirect::to("/employees"));
    };
    if let Some(message) = removal_error(employee, &user) {
        tracing::warn!(employee_id = %id, "Refused to remove employee");
        set_flash(&session, Flash::error(message)).await;
        return Ok(Redirect::to("/employees"));
    }

    match state
        .api()
        .remove_employee(&user.token, &user.store_id, &id)
        .await
    {
        Ok(()) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(employee_id = %id, "Employee removed");
            set_flash(&session, Flash::success(format!("Removed {}", employee.name))).await;
        }
        Err(StoreApiError::Unauthorized) => return Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(employee_id = %id, error = %e, "Failed to remove employee");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(Redirect::to("/employees"))
}

#[cfg(test)]
mod tests {
    use storedesk_core::StoreId;

    use super::*;

    fn employee(name: &str, email: &str, role: &str, joined: &str) -> Employee {
        serde_json::from_value(serde_json::json!({
            "id": name,
            "name": name,
            "email": email,
            "role": role,
            "joinedAt": joined
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    fn team() -> Vec<Employee> {
        vec![
            employee("Quynh", "quynh@shop.test", "STAFF", "2024-02-01T00:00:00Z"),
            employee("Anh", "anh@shop.test", "OWNER", "2023-01-01T00:00:00Z"),
            employee("Bao", "bao@shop.test", "MANAGER", "2023-06-01T00:00:00Z"),
        ]
    }

    fn viewer(email: &str, role: EmployeeRole) -> CurrentUser {
        CurrentUser {
            token: "t".to_string(),
            store_id: StoreId::new("s1"),
            email: email.to_string(),
            name: "Viewer".to_string(),
            role,
        }
    }

    fn table(role: Option<&str>, sort: Option<&str>, dir: Option<&str>) -> TableState {
        TableState::new(
            &employees_table_config(),
            None,
            &[("role", role)],
            sort,
            dir,
            None,
            ("name", SortDirection::Asc),
        )
    }

    fn names(employees: &[Employee]) -> Vec<&str> {
        employees.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_sorting() {
        assert_eq!(
            names(&filter_and_sort(team(), &table(None, None, None))),
            vec!["Anh", "Bao", "Quynh"]
        );
        assert_eq!(
            names(&filter_and_sort(team(), &table(None, Some("role"), Some("desc")))),
            vec!["Quynh", "Bao", "Anh"]
        );
        assert_eq!(
            names(&filter_and_sort(team(), &table(None, Some("joined"), Some("desc")))),
            vec!["Quynh", "Bao", "Anh"]
        );
    }

    #[test]
    fn test_role_filter() {
        assert_eq!(
            names(&filter_and_sort(team(), &table(Some("manager"), None, None))),
            vec!["Bao"]
        );
    }

    #[test]
    fn test_removal_rules() {
        let team = team();
        let manager = viewer("bao@shop.test", EmployeeRole::Manager);
        assert_eq!(removal_error(&team[0], &manager), None);
        assert_eq!(
            removal_error(&team[1], &manager),
            Some("The store owner cannot be removed")
        );
        assert_eq!(removal_error(&team[2], &manager), Some("You cannot remove yourself"));

        let staff = viewer("quynh@shop.test", EmployeeRole::Staff);
        assert!(removal_error(&team[2], &staff).is_some());
    }
}
