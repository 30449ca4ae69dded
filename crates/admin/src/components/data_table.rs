//! Data table component types.
//!
//! These types define the configuration for the list pages (products, orders,
//! promotions, employees) and the links their headers, filters and pager
//! render. All list state travels in the query string, so every view is
//! bookmarkable and the back button works.

use serde::{Deserialize, Serialize};

use storedesk_core::{
    DiscountType, EmployeeRole, OrderStatus, Page, ProductStatus, PromotionState, SortDirection,
    StockTier,
};

/// How many page links to show either side of the current page.
const PAGER_RADIUS: usize = 2;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    /// Sort key for the column (also its identifier).
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Whether the column is sortable.
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
        }
    }
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Select filter definition for a data table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFilter {
    /// Query parameter key.
    pub key: String,
    /// Display label (also the "any" option text).
    pub label: String,
    /// Available options.
    pub options: Vec<FilterOption>,
}

impl TableFilter {
    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options,
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTableConfig {
    /// Unique table identifier, also the list page path (`/{table_id}`).
    pub table_id: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Icon for empty state.
    pub empty_icon: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            filters: vec![],
            search_placeholder: "Search...".to_string(),
            empty_icon: "ph-list".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, icon: &str, title: &str, description: Option<&str>) -> Self {
        self.empty_icon = icon.to_string();
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Whether `key` names a sortable column.
    #[must_use]
    pub fn is_sortable(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.sortable && c.key == key)
    }

    /// Path of the list page.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.table_id)
    }
}

/// The list state a request asked for: search, filters, sort and page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub path: String,
    pub search: String,
    /// Active filters as `(key, value)`; blank values are dropped.
    pub filters: Vec<(String, String)>,
    pub sort: String,
    pub dir: SortDirection,
    pub page: usize,
}

impl TableState {
    /// Build the state, falling back to `default_sort` when the requested
    /// sort key is not a sortable column of `config`.
    #[must_use]
    pub fn new(
        config: &DataTableConfig,
        search: Option<&str>,
        filters: &[(&str, Option<&str>)],
        sort: Option<&str>,
        dir: Option<&str>,
        page: Option<usize>,
        default_sort: (&str, SortDirection),
    ) -> Self {
        let (sort, dir) = match sort.map(str::trim) {
            Some(key) if config.is_sortable(key) => (
                key.to_string(),
                dir.and_then(SortDirection::from_param)
                    .unwrap_or(SortDirection::Asc),
            ),
            _ => (
                default_sort.0.to_string(),
                dir.and_then(SortDirection::from_param)
                    .unwrap_or(default_sort.1),
            ),
        };

        Self {
            path: config.path(),
            search: search.map(str::trim).unwrap_or_default().to_string(),
            filters: filters
                .iter()
                .filter_map(|(key, value)| {
                    value
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(|v| ((*key).to_string(), v.to_string()))
                })
                .collect(),
            sort,
            dir,
            page: page.unwrap_or(1).max(1),
        }
    }

    /// Current value of a filter, or `""`.
    #[must_use]
    pub fn filter_value(&self, key: &str) -> &str {
        self.filters
            .iter()
            .find(|(k, _)| k == key)
            .map_or("", |(_, v)| v.as_str())
    }

    /// Whether any search or filter narrows the list.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty() || !self.filters.is_empty()
    }

    /// Link for a column header: same filters, first page, sorted by `key`,
    /// flipping the direction if the list is already sorted by it.
    #[must_use]
    pub fn sort_href(&self, key: &str) -> String {
        let dir = if self.sort == key {
            self.dir.reversed()
        } else {
            SortDirection::Asc
        };
        self.href(key, dir, 1)
    }

    /// Arrow shown next to the active sort column.
    #[must_use]
    pub fn sort_indicator(&self, key: &str) -> &'static str {
        match (self.sort == key, self.dir) {
            (false, _) => "",
            (true, SortDirection::Asc) => "▲",
            (true, SortDirection::Desc) => "▼",
        }
    }

    /// Link to page `page` with everything else unchanged.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        self.href(&self.sort, self.dir, page)
    }

    fn href(&self, sort: &str, dir: SortDirection, page: usize) -> String {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if !self.search.is_empty() {
            params.push(("q", &self.search));
        }
        for (key, value) in &self.filters {
            params.push((key, value));
        }
        let page = page.to_string();
        params.push(("sort", sort));
        params.push(("dir", dir.as_param()));
        params.push(("page", &page));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }
}

/// One numbered pager link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

/// Pager data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerView {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub first_index: usize,
    pub last_index: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub links: Vec<PagerLink>,
    pub prev_href: String,
    pub next_href: String,
}

impl PagerView {
    #[must_use]
    pub fn new<T>(page: &Page<T>, state: &TableState) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            first_index: page.first_index(),
            last_index: page.last_index(),
            has_prev: page.has_prev(),
            has_next: page.has_next(),
            links: page
                .window(PAGER_RADIUS)
                .into_iter()
                .map(|number| PagerLink {
                    number,
                    href: state.page_href(number),
                    current: number == page.page,
                })
                .collect(),
            prev_href: state.page_href(page.page.saturating_sub(1).max(1)),
            next_href: state.page_href((page.page + 1).min(page.total_pages)),
        }
    }
}

/// Build the products table configuration.
#[must_use]
pub fn products_table_config(categories: &[String]) -> DataTableConfig {
    DataTableConfig::new("products")
        .column(TableColumn::new("image", ""))
        .column(TableColumn::sortable("name", "Product"))
        .column(TableColumn::new("category", "Category"))
        .column(TableColumn::sortable("price", "Price"))
        .column(TableColumn::sortable("stock", "Stock"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::sortable("created", "Created"))
        .filter(TableFilter::select(
            "status",
            "Status",
            [ProductStatus::Active, ProductStatus::Hidden]
                .into_iter()
                .map(|s| FilterOption::new(s.as_param(), s.label()))
                .collect(),
        ))
        .filter(TableFilter::select(
            "stock",
            "Stock",
            StockTier::ALL
                .into_iter()
                .map(|t| FilterOption::new(t.as_param(), t.label()))
                .collect(),
        ))
        .filter(TableFilter::select(
            "category",
            "Category",
            categories
                .iter()
                .map(|c| FilterOption::new(c, c))
                .collect(),
        ))
        .search_placeholder("Search products by name or category...")
        .empty_state(
            "ph-package",
            "No products found",
            Some("Try adjusting your search or filters"),
        )
}

/// Build the orders table configuration.
#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    DataTableConfig::new("orders")
        .column(TableColumn::sortable("code", "Order"))
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::new("items", "Items"))
        .column(TableColumn::sortable("total", "Total"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::sortable("created", "Placed"))
        .filter(TableFilter::select(
            "status",
            "Status",
            OrderStatus::ALL
                .into_iter()
                .map(|s| FilterOption::new(s.as_param(), s.label()))
                .collect(),
        ))
        .search_placeholder("Search by order code, customer or phone...")
        .empty_state(
            "ph-receipt",
            "No orders found",
            Some("Orders placed in your store will appear here"),
        )
}

/// Build the promotions table configuration.
#[must_use]
pub fn promotions_table_config() -> DataTableConfig {
    DataTableConfig::new("promotions")
        .column(TableColumn::sortable("name", "Promotion"))
        .column(TableColumn::new("code", "Code"))
        .column(TableColumn::sortable("value", "Discount"))
        .column(TableColumn::new("usage", "Used"))
        .column(TableColumn::new("state", "State"))
        .column(TableColumn::sortable("start", "Starts"))
        .column(TableColumn::sortable("end", "Ends"))
        .filter(TableFilter::select(
            "state",
            "State",
            PromotionState::ALL
                .into_iter()
                .map(|s| FilterOption::new(s.as_param(), s.label()))
                .collect(),
        ))
        .filter(TableFilter::select(
            "type",
            "Type",
            [DiscountType::Percentage, DiscountType::Fixed]
                .into_iter()
                .map(|t| FilterOption::new(t.as_param(), t.label()))
                .collect(),
        ))
        .search_placeholder("Search promotions by name or code...")
        .empty_state(
            "ph-tag",
            "No promotions found",
            Some("Create a promotion to offer discount codes"),
        )
}

/// Build the employees table configuration.
#[must_use]
pub fn employees_table_config() -> DataTableConfig {
    DataTableConfig::new("employees")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::sortable("email", "Email"))
        .column(TableColumn::new("phone", "Phone"))
        .column(TableColumn::sortable("role", "Role"))
        .column(TableColumn::sortable("joined", "Joined"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select(
            "role",
            "Role",
            EmployeeRole::ALL
                .into_iter()
                .map(|r| FilterOption::new(r.as_param(), r.label()))
                .collect(),
        ))
        .search_placeholder("Search employees by name or email...")
        .empty_state("ph-users", "No employees found", None)
}
