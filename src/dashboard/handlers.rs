//! Dashboard HTTP handlers and view rendering.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserID,
    dashboard::{
        aggregation::{
            compute_category_breakdown, compute_dashboard_stats, compute_monthly_summary,
            compute_weekly_summary, month_bounds, months_before, week_bounds,
        },
        cards::stats_cards_view,
        charts::{DashboardChart, charts_script, monthly_summary_chart, weekly_summary_chart},
        tables::{category_breakdown_table, recent_transactions_table},
        transaction::{get_ledger_rows, get_ledger_rows_in_range, get_ledger_rows_since},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{Kind, get_recent_transactions},
};

/// How many months of history the monthly summary covers.
const MONTHLY_SUMMARY_MONTHS: u32 = 6;

/// How many rows the recent transactions table shows.
const RECENT_TRANSACTION_COUNT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's finances.
///
/// Each section of the page (stat cards, charts, breakdown, recent
/// transactions) is fetched and computed independently. A failure in one
/// section is logged and replaced with a fallback message; it never takes
/// down the other sections or the page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    // The no-data view only applies when the user verifiably has no
    // transactions. If even this query fails, fall through and let every
    // section render its fallback.
    match get_ledger_rows(user_id, &connection) {
        Ok(rows) if rows.is_empty() => {
            return Ok(dashboard_no_data_view(nav_bar).into_response());
        }
        _ => {}
    }

    let data = build_dashboard_data(user_id, today, &connection);

    Ok(dashboard_view(nav_bar, &data).into_response())
}

/// Holds the independently computed results for each dashboard section.
///
/// `None` means that section's fetch or computation failed (and was logged);
/// the view renders a fallback for it.
struct DashboardData {
    stats: Option<Markup>,
    monthly_chart: Option<DashboardChart>,
    weekly_chart: Option<DashboardChart>,
    breakdown: Option<Markup>,
    recent: Option<Markup>,
}

fn build_dashboard_data(user_id: UserID, today: Date, connection: &Connection) -> DashboardData {
    let stats = get_ledger_rows(user_id, connection)
        .and_then(|rows| compute_dashboard_stats(&rows, today))
        .map(|stats| stats_cards_view(&stats))
        .inspect_err(|error| tracing::error!("could not compute dashboard stats: {error}"))
        .ok();

    let monthly_chart = get_ledger_rows_since(
        user_id,
        months_before(today, MONTHLY_SUMMARY_MONTHS),
        connection,
    )
    .and_then(|rows| compute_monthly_summary(&rows))
    .map(|buckets| DashboardChart {
        id: "monthly-summary-chart",
        options: monthly_summary_chart(&buckets).to_string(),
    })
    .inspect_err(|error| tracing::error!("could not compute monthly summary: {error}"))
    .ok();

    let weekly_chart = get_ledger_rows_in_range(user_id, week_bounds(today), connection)
        .and_then(|rows| compute_weekly_summary(&rows))
        .map(|buckets| DashboardChart {
            id: "weekly-summary-chart",
            options: weekly_summary_chart(&buckets).to_string(),
        })
        .inspect_err(|error| tracing::error!("could not compute weekly summary: {error}"))
        .ok();

    let breakdown = get_ledger_rows_in_range(user_id, month_bounds(today), connection)
        .and_then(|rows| compute_category_breakdown(&rows, Kind::Expense))
        .map(|breakdown| category_breakdown_table(&breakdown))
        .inspect_err(|error| tracing::error!("could not compute category breakdown: {error}"))
        .ok();

    let recent = get_recent_transactions(user_id, RECENT_TRANSACTION_COUNT, connection)
        .map(|transactions| recent_transactions_table(&transactions))
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))
        .ok();

    DashboardData {
        stats,
        monthly_chart,
        weekly_chart,
        breakdown,
        recent,
    }
}

/// Renders the dashboard page when no transaction data exists.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Summaries and charts will show up here once you start "
                (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page.
fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let charts: Vec<DashboardChart> = [data.monthly_chart.as_ref(), data.weekly_chart.as_ref()]
        .into_iter()
        .flatten()
        .map(|chart| DashboardChart {
            id: chart.id,
            options: chart.options.clone(),
        })
        .collect();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            @match &data.stats {
                Some(stats) => { (stats) }
                None => { (section_unavailable("Summary statistics")) }
            }

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in &charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }

                    @if data.monthly_chart.is_none() {
                        (section_unavailable("Monthly summary"))
                    }

                    @if data.weekly_chart.is_none() {
                        (section_unavailable("Weekly summary"))
                    }

                    @match &data.breakdown {
                        Some(breakdown) => { (breakdown) }
                        None => { (section_unavailable("Category breakdown")) }
                    }

                    @match &data.recent {
                        Some(recent) => { (recent) }
                        None => { (section_unavailable("Recent transactions")) }
                    }
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

fn section_unavailable(title: &str) -> Markup {
    html! {
        div class="w-full bg-white dark:bg-gray-800 border border-gray-200
            dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h3 class="text-lg font-semibold mb-1" { (title) }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "This section could not be loaded. Try refreshing the page, or check the \
                server logs for details."
            }
        }
    }
}
