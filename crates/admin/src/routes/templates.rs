//! Template gallery handlers (read-only).

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use storedesk_core::{TemplateId, matches_search};

use crate::{
    api::Template as StoreTemplate,
    error::AppError,
    filters,
    middleware::RequireAuth,
    state::AppState,
};

use super::{Layout, pick_tab, render, short_date, soft_fail};

const DETAIL_TABS: [&str; 2] = ["overview", "preview"];

/// Gallery query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// Detail query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub tab: Option<String>,
}

/// Gallery card.
#[derive(Debug, Clone)]
pub struct TemplateCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub preview_url: Option<String>,
    pub updated_at: String,
}

impl From<&StoreTemplate> for TemplateCard {
    fn from(template: &StoreTemplate) -> Self {
        Self {
            id: template.id.to_string(),
            name: template.name.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            preview_url: template.preview_url.clone(),
            updated_at: short_date(template.updated_at),
        }
    }
}

/// Gallery page template.
#[derive(Template)]
#[template(path = "templates/index.html")]
pub struct TemplatesIndexTemplate {
    pub layout: Layout,
    pub search: String,
    pub category: String,
    pub categories: Vec<String>,
    pub cards: Vec<TemplateCard>,
    pub error: Option<String>,
}

/// Template detail page.
#[derive(Template)]
#[template(path = "templates/show.html")]
pub struct TemplateShowTemplate {
    pub layout: Layout,
    pub tab: &'static str,
    pub card: TemplateCard,
    pub subject: Option<String>,
    pub body: String,
}

fn categories(templates: &[StoreTemplate]) -> Vec<String> {
    let mut categories: Vec<String> = templates
        .iter()
        .map(|t| t.category.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

fn filter(templates: &[StoreTemplate], search: &str, category: &str) -> Vec<TemplateCard> {
    let mut matched: Vec<&StoreTemplate> = templates
        .iter()
        .filter(|t| matches_search(search, &[&t.name, &t.description]))
        .filter(|t| category.is_empty() || t.category.trim() == category)
        .collect();
    matched.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    matched.into_iter().map(TemplateCard::from).collect()
}

/// Template gallery handler.
#[instrument(skip(user, state, session))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<GalleryQuery>,
) -> Result<Response, AppError> {
    let layout = Layout::load(&state, &session, &user, "/templates").await?;
    let result = state
        .api()
        .list_all_templates(&user.token, &user.store_id)
        .await;
    let (templates, error) = soft_fail(result, "templates")?;

    let search = query.q.unwrap_or_default().trim().to_string();
    let category = query.category.unwrap_or_default().trim().to_string();

    Ok(render(&TemplatesIndexTemplate {
        layout,
        cards: filter(&templates, &search, &category),
        categories: categories(&templates),
        search,
        category,
        error,
    }))
}

/// Template detail handler.
#[instrument(skip(user, state, session))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, AppError> {
    let template = state
        .api()
        .get_template(&user.token, &user.store_id, &TemplateId::new(id))
        .await?;
    let layout = Layout::load(&state, &session, &user, "/templates").await?;

    Ok(render(&TemplateShowTemplate {
        layout,
        tab: pick_tab(query.tab.as_deref(), &DETAIL_TABS),
        card: TemplateCard::from(&template),
        subject: template.subject,
        body: template.body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, category: &str, description: &str) -> StoreTemplate {
        serde_json::from_value(serde_json::json!({
            "id": name,
            "name": name,
            "category": category,
            "description": description
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    fn gallery() -> Vec<StoreTemplate> {
        vec![
            template("Order shipped", "Email", "Sent when an order ships"),
            template("Abandoned cart", "Email", "Reminder for carts left behind"),
            template("Welcome banner", "Storefront", "Homepage hero"),
        ]
    }

    #[test]
    fn test_filter_by_category_and_search() {
        let email = filter(&gallery(), "", "Email");
        assert_eq!(
            email.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Abandoned cart", "Order shipped"]
        );

        let found = filter(&gallery(), "hero", "");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Welcome banner");
    }

    #[test]
    fn test_categories() {
        assert_eq!(categories(&gallery()), vec!["Email", "Storefront"]);
    }
}
