//! Reusable view components.

pub mod data_table;

pub use data_table::{DataTableConfig, PagerLink, PagerView, TableState};
