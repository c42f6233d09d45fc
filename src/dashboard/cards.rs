//! The stat cards at the top of the dashboard.

use maud::{Markup, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{dashboard::aggregation::DashboardStats, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200
    dark:border-gray-700 rounded-lg p-4 shadow-md";

/// Render the headline totals as a row of cards.
pub(super) fn stats_cards_view(stats: &DashboardStats) -> Markup {
    let net_balance_style = if stats.net_balance < Decimal::ZERO {
        "text-2xl font-bold text-red-600 dark:text-red-400"
    } else {
        "text-2xl font-bold text-green-600 dark:text-green-400"
    };

    html! {
        section class="w-full mx-auto mb-4" aria-label="Summary statistics"
        {
            div class="grid grid-cols-1 sm:grid-cols-2 xl:grid-cols-5 gap-4"
            {
                (stat_card("Total Income", stats.total_income, "text-2xl font-bold"))
                (stat_card("Total Expenses", stats.total_expenses, "text-2xl font-bold"))

                div class=(CARD_STYLE)
                {
                    h4 class="text-sm text-gray-600 dark:text-gray-400 mb-1" { "Net Balance" }

                    div class=(net_balance_style)
                    {
                        (format_currency(stats.net_balance.to_f64().unwrap_or(0.0)))
                    }
                }

                (stat_card("This Month's Income", stats.monthly_income, "text-2xl font-bold"))
                (stat_card("This Month's Expenses", stats.monthly_expenses, "text-2xl font-bold"))
            }
        }
    }
}

fn stat_card(label: &str, value: Decimal, value_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h4 class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (label) }

            div class=(value_style)
            {
                (format_currency(value.to_f64().unwrap_or(0.0)))
            }
        }
    }
}
