//! The dashboard's category breakdown and recent transactions tables.

use maud::{Markup, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    dashboard::aggregation::CategoryBreakdown,
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency, link,
    },
    transaction::{Kind, TransactionListRow},
};

/// Render this month's expense totals per category with their color swatches.
pub(super) fn category_breakdown_table(breakdown: &[CategoryBreakdown]) -> Markup {
    let total: Decimal = breakdown.iter().map(|entry| entry.value).sum();

    html! {
        div class="w-full bg-white dark:bg-gray-800 border border-gray-200
            dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h3 class="text-lg font-semibold mb-3" { "This Month's Expenses by Category" }

            @if breakdown.is_empty() {
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "No expenses recorded this month."
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                        }
                    }

                    tbody
                    {
                        @for entry in breakdown {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    span
                                        class="inline-block w-3 h-3 rounded-full mr-2"
                                        style=(format!("background-color: {};", entry.color))
                                    {}

                                    (entry.name)
                                }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    (format_currency(entry.value.to_f64().unwrap_or(0.0)))
                                }

                                td class=(TABLE_CELL_STYLE) { (format_share(entry.value, total)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Render the most recent transactions as a compact table.
pub(super) fn recent_transactions_table(transactions: &[TransactionListRow]) -> Markup {
    html! {
        div class="w-full bg-white dark:bg-gray-800 border border-gray-200
            dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            div class="flex justify-between items-baseline mb-3"
            {
                h3 class="text-lg font-semibold" { "Recent Transactions" }

                (link(endpoints::TRANSACTIONS_VIEW, "View all"))
            }

            @if transactions.is_empty() {
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "No transactions recorded yet."
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            (recent_transaction_row(transaction))
                        }
                    }
                }
            }
        }
    }
}

fn recent_transaction_row(transaction: &TransactionListRow) -> Markup {
    let amount = transaction.amount.to_f64().unwrap_or(0.0);
    let (amount_text, amount_style) = match transaction.kind {
        Kind::Income => (
            format!("+{}", format_currency(amount)),
            "text-green-600 dark:text-green-400",
        ),
        Kind::Expense => (
            format_currency(-amount),
            "text-red-600 dark:text-red-400",
        ),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            td class=(TABLE_CELL_STYLE) { (transaction.description) }

            td class=(TABLE_CELL_STYLE)
            {
                @match (&transaction.category_name, &transaction.category_color) {
                    (Some(name), Some(color)) => {
                        span
                            class=(CATEGORY_BADGE_STYLE)
                            style=(format!("background-color: {color};"))
                        {
                            (name)
                        }
                    }
                    _ => { span class="text-gray-400" { "Uncategorized" } }
                }
            }

            td class=(format!("{TABLE_CELL_STYLE} {amount_style}")) { (amount_text) }
        }
    }
}

/// Format an entry's share of the total as a whole percentage, e.g. "28%".
fn format_share(value: Decimal, total: Decimal) -> String {
    if total.is_zero() {
        return "0%".to_owned();
    }

    let percent = (value * Decimal::ONE_HUNDRED / total)
        .round()
        .to_i64()
        .unwrap_or(0);

    format!("{percent}%")
}

#[cfg(test)]
mod tables_tests {
    use rust_decimal::Decimal;

    use crate::dashboard::aggregation::CategoryBreakdown;

    use super::{category_breakdown_table, format_share};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn breakdown_table_shows_categories_and_shares() {
        let breakdown = vec![
            CategoryBreakdown {
                name: "Food".to_owned(),
                value: decimal("75"),
                color: "#ef4444".to_owned(),
            },
            CategoryBreakdown {
                name: "Transport".to_owned(),
                value: decimal("25"),
                color: "#3b82f6".to_owned(),
            },
        ];

        let html = category_breakdown_table(&breakdown).into_string();

        assert!(html.contains("Food"));
        assert!(html.contains("Transport"));
        assert!(html.contains("$75.00"));
        assert!(html.contains("75%"));
        assert!(html.contains("25%"));
        assert!(html.contains("background-color: #ef4444;"));
    }

    #[test]
    fn breakdown_table_shows_empty_state() {
        let html = category_breakdown_table(&[]).into_string();

        assert!(html.contains("No expenses recorded this month."));
    }

    #[test]
    fn format_share_handles_zero_total() {
        assert_eq!(format_share(decimal("0"), decimal("0")), "0%");
    }

    #[test]
    fn format_share_rounds_to_whole_percent() {
        assert_eq!(format_share(decimal("1"), decimal("3")), "33%");
        assert_eq!(format_share(decimal("2"), decimal("3")), "67%");
    }
}
