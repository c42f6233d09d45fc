//! Category management for classifying transactions.
//!
//! Categories are user-defined labels with a fixed income/expense kind and a
//! display color. A category can only be deleted while no transaction
//! references it.

mod categories_page;
mod create;
mod db;
mod delete;
mod domain;
mod edit;

pub use categories_page::get_categories_page;
pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category,
    update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName, Color};
pub use edit::{get_edit_category_page, update_category_endpoint};
