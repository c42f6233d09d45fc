//! Dashboard module
//!
//! Provides an overview page showing aggregated summaries of a user's
//! finances: headline totals, month and week buckets, category breakdowns,
//! and the most recent transactions. The aggregation itself lives in
//! [aggregation] as pure functions over already-fetched rows.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod tables;
mod transaction;

pub use handlers::get_dashboard_page;
