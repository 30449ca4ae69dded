//! Product route handlers.
//!
//! The list is fetched whole from the backend and searched, filtered, sorted
//! and paginated here, so every combination of query parameters works even
//! though the backend only pages.

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

use storedesk_core::{
    ImageId, ProductId, ProductStatus, SortDirection, StockTier, matches_search, paginate,
};

use crate::{
    api::{ImageRef, Product, StoreApiError},
    components::{
        DataTableConfig, PagerView, TableState, data_table::products_table_config,
    },
    error::AppError,
    filters,
    forms::{FormErrors, ProductFormInput},
    middleware::{RequireAuth, RequireManager, set_flash},
    models::{CurrentUser, Flash},
    state::AppState,
};

use super::{Layout, backend_form_error, parse_page, pick_tab, render, short_date, soft_fail};

const DETAIL_TABS: [&str; 3] = ["overview", "images", "inventory"];

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub stock: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

/// Detail query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub tab: Option<String>,
}

/// Product row for the list.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub in_stock: i64,
    pub tier_label: &'static str,
    pub tier_class: &'static str,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub thumbnail: Option<String>,
    pub created_at: String,
}

impl ProductRow {
    fn new(product: &Product, layout: &Layout) -> Self {
        let tier = product.stock_tier();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: layout.money(product.price),
            sale_price: product.sale_price.map(|p| layout.money(p)),
            in_stock: product.in_stock,
            tier_label: tier.label(),
            tier_class: tier.badge_class(),
            status_label: product.status.label(),
            status_class: product.status.badge_class(),
            thumbnail: product.thumbnail().map(|image| image.url.clone()),
            created_at: short_date(product.created_at),
        }
    }
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub table: TableState,
    pub pager: PagerView,
    pub rows: Vec<ProductRow>,
    pub error: Option<String>,
}

/// Product detail template.
#[derive(Template)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub tab: &'static str,
    pub row: ProductRow,
    pub description: String,
    pub yellow_line: i64,
    pub red_line: i64,
    pub images: Vec<ImageRef>,
}

/// Product create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    pub cancel_href: String,
    pub input: ProductFormInput,
    pub errors: FormErrors,
    pub images: Vec<ImageRef>,
    pub statuses: Vec<(&'static str, &'static str)>,
}

impl ProductFormTemplate {
    fn new(layout: Layout, product: Option<&ProductId>, input: ProductFormInput) -> Self {
        let (title, action, cancel_href) = match product {
            Some(id) => (
                "Edit product".to_string(),
                format!("/products/{id}"),
                format!("/products/{id}"),
            ),
            None => (
                "New product".to_string(),
                "/products".to_string(),
                "/products".to_string(),
            ),
        };
        Self {
            layout,
            title,
            action,
            cancel_href,
            input,
            errors: FormErrors::new(),
            images: vec![],
            statuses: [ProductStatus::Active, ProductStatus::Hidden]
                .into_iter()
                .map(|s| (s.as_param(), s.label()))
                .collect(),
        }
    }
}

/// Distinct categories, sorted, for the category filter.
fn categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = products
        .iter()
        .map(|p| p.category.trim())
        .filter(|c| !c.is_empty())
        .map(ToString::to_string)
        .collect();
    categories.sort_by_key(|c| c.to_lowercase());
    categories.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    categories
}

/// Apply the table's search, filters and sort.
fn filter_and_sort(products: Vec<Product>, table: &TableState) -> Vec<Product> {
    let status = ProductStatus::from_param(table.filter_value("status"));
    let tier = StockTier::from_param(table.filter_value("stock"));
    let category = table.filter_value("category");

    let mut products: Vec<Product> = products
        .into_iter()
        .filter(|p| matches_search(&table.search, &[&p.name, &p.category]))
        .filter(|p| status.is_none_or(|s| p.status == s))
        .filter(|p| tier.is_none_or(|t| p.stock_tier() == t))
        .filter(|p| category.is_empty() || p.category.trim().eq_ignore_ascii_case(category))
        .collect();

    products.sort_by(|a, b| table.dir.apply(compare(a, b, &table.sort)));
    products
}

fn compare(a: &Product, b: &Product, key: &str) -> Ordering {
    let by_name = || a.name.to_lowercase().cmp(&b.name.to_lowercase());
    match key {
        "price" => a.effective_price().cmp(&b.effective_price()).then_with(by_name),
        "stock" => a.in_stock.cmp(&b.in_stock).then_with(by_name),
        "created" => a.created_at.cmp(&b.created_at).then_with(by_name),
        _ => by_name(),
    }
}

/// Products list page handler.
#[instrument(skip(user, state, session))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductsQuery>,
) -> Result<Response, AppError> {
    let layout = Layout::load(&state, &session, &user, "/products").await?;
    let result = state
        .api()
        .list_all_products(&user.token, &user.store_id)
        .await;
    let (products, error) = soft_fail(result, "products")?;

    let config = products_table_config(&categories(&products));
    let table = TableState::new(
        &config,
        query.q.as_deref(),
        &[
            ("status", query.status.as_deref()),
            ("stock", query.stock.as_deref()),
            ("category", query.category.as_deref()),
        ],
        query.sort.as_deref(),
        query.dir.as_deref(),
        parse_page(query.page.as_deref()),
        ("created", SortDirection::Desc),
    );

    let page = paginate(
        filter_and_sort(products, &table),
        table.page,
        state.config().page_size,
    );
    let pager = PagerView::new(&page, &table);
    let rows = page
        .items
        .iter()
        .map(|p| ProductRow::new(p, &layout))
        .collect();

    Ok(render(&ProductsIndexTemplate {
        layout,
        config,
        table,
        pager,
        rows,
        error,
    }))
}

/// New product form.
#[instrument(skip(user, state, session))]
pub async fn new(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let layout = Layout::load(&state, &session, &user, "/products").await?;
    let input = ProductFormInput {
        status: ProductStatus::Active.as_param().to_string(),
        in_stock: "0".to_string(),
        yellow_line: "10".to_string(),
        red_line: "3".to_string(),
        ..ProductFormInput::default()
    };
    Ok(render(&ProductFormTemplate::new(layout, None, input)))
}

/// Create a product.
#[instrument(skip(user, state, session, input))]
pub async fn create(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<ProductFormInput>,
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
        .create_product(&user.token, &user.store_id, &draft.into_input())
        .await
    {
        Ok(product) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(product_id = %product.id, "Product created");
            set_flash(&session, Flash::success(format!("Created {}", product.name))).await;
            Ok(Redirect::to(&format!("/products/{}", product.id)).into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "product")?;
            form_error(&state, &session, &user, None, input, errors, status).await
        }
    }
}

/// Product detail page.
#[instrument(skip(user, state, session))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, AppError> {
    let product = state
        .api()
        .get_product(&user.token, &user.store_id, &ProductId::new(id))
        .await?;
    let layout = Layout::load(&state, &session, &user, "/products").await?;

    Ok(render(&ProductShowTemplate {
        tab: pick_tab(query.tab.as_deref(), &DETAIL_TABS),
        row: ProductRow::new(&product, &layout),
        description: product.description,
        yellow_line: product.yellow_line,
        red_line: product.red_line,
        images: product.images,
        layout,
    }))
}

/// Edit product form.
#[instrument(skip(user, state, session))]
pub async fn edit(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);
    let product = state
        .api()
        .get_product(&user.token, &user.store_id, &id)
        .await?;
    let layout = Layout::load(&state, &session, &user, "/products").await?;

    let mut template =
        ProductFormTemplate::new(layout, Some(&id), ProductFormInput::from_product(&product));
    template.images = product.images;
    Ok(render(&template))
}

/// Update a product.
#[instrument(skip(user, state, session, input))]
pub async fn update(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(input): Form<ProductFormInput>,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);
    let draft = match input.parse() {
        Ok(draft) => draft,
        Err(errors) => {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return form_error(&state, &session, &user, Some(&id), input, errors, status).await;
        }
    };

    match state
        .api()
        .update_product(&user.token, &user.store_id, &id, &draft.into_input())
        .await
    {
        Ok(product) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(product_id = %product.id, "Product updated");
            set_flash(&session, Flash::success(format!("Saved {}", product.name))).await;
            Ok(Redirect::to(&format!("/products/{}", product.id)).into_response())
        }
        Err(e) => {
            let (status, errors) = backend_form_error(e, "product")?;
            form_error(&state, &session, &user, Some(&id), input, errors, status).await
        }
    }
}

/// Delete a product.
#[instrument(skip(user, state, session))]
pub async fn delete(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = ProductId::new(id);
    match state
        .api()
        .delete_product(&user.token, &user.store_id, &id)
        .await
    {
        Ok(()) => {
            state.store_cache().invalidate(&user.store_id).await;
            tracing::info!(product_id = %id, "Product deleted");
            set_flash(&session, Flash::success("Product deleted")).await;
            Ok(Redirect::to("/products"))
        }
        Err(StoreApiError::Unauthorized) => Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Failed to delete product");
            set_flash(&session, Flash::error(e.user_message())).await;
            Ok(Redirect::to(&format!("/products/{id}")))
        }
    }
}

/// Re-render the form with its errors, keeping whatever images were
/// attached and still resolvable.
async fn form_error(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    product: Option<&ProductId>,
    input: ProductFormInput,
    errors: FormErrors,
    status: StatusCode,
) -> Result<Response, AppError> {
    let layout = Layout::load(state, session, user, "/products").await?;

    let images = match product {
        Some(id) => {
            let wanted: Vec<ImageId> = input.image_id_list();
            state
                .api()
                .get_product(&user.token, &user.store_id, id)
                .await
                .map(|p| {
                    p.images
                        .into_iter()
                        .filter(|image| wanted.contains(&image.id))
                        .collect()
                })
                .unwrap_or_default()
        }
        None => vec![],
    };

    let mut template = ProductFormTemplate::new(layout, product, input);
    template.errors = errors;
    template.images = images;
    Ok((status, render(&template)).into_response())
}
