//! Chart generation for the dashboard.
//!
//! This module creates ECharts visualizations for the aggregated data:
//! - **Monthly Summary**: income and expense totals per month
//! - **This Week**: income and expense totals per day of the current week
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization
//! code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::bar,
};
use maud::PreEscaped;
use rust_decimal::prelude::ToPrimitive;

use crate::{
    dashboard::aggregation::{DailyBucket, MonthlyBucket},
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Income vs expense totals for each month bucket, as paired bars.
pub(super) fn monthly_summary_chart(buckets: &[MonthlyBucket]) -> Chart {
    let labels: Vec<String> = buckets.iter().map(|bucket| bucket.month.clone()).collect();
    let income: Vec<f64> = buckets
        .iter()
        .map(|bucket| bucket.income.to_f64().unwrap_or(0.0))
        .collect();
    let expense: Vec<f64> = buckets
        .iter()
        .map(|bucket| bucket.expense.to_f64().unwrap_or(0.0))
        .collect();

    Chart::new()
        .title(Title::new().text("Monthly Summary").subtext("Last six months"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Income")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expense),
        )
}

/// Income vs expense totals for each day of the current week.
pub(super) fn weekly_summary_chart(buckets: &[DailyBucket]) -> Chart {
    let labels: Vec<String> = buckets.iter().map(|bucket| bucket.day.to_string()).collect();
    let income: Vec<f64> = buckets
        .iter()
        .map(|bucket| bucket.income.to_f64().unwrap_or(0.0))
        .collect();
    let expense: Vec<f64> = buckets
        .iter()
        .map(|bucket| bucket.expense.to_f64().unwrap_or(0.0))
        .collect();

    Chart::new()
        .title(Title::new().text("This Week").subtext("Monday to Sunday"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Income")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expense),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod chart_tests {
    use time::macros::date;

    use crate::dashboard::aggregation::{DailyBucket, MonthlyBucket};

    use super::{monthly_summary_chart, weekly_summary_chart};

    #[test]
    fn monthly_chart_options_contain_labels_and_values() {
        let buckets = vec![
            MonthlyBucket {
                month: "2024-03".to_owned(),
                income: "100".parse().unwrap(),
                expense: "40".parse().unwrap(),
            },
            MonthlyBucket {
                month: "2024-04".to_owned(),
                income: "0".parse().unwrap(),
                expense: "25".parse().unwrap(),
            },
        ];

        let options = monthly_summary_chart(&buckets).to_string();

        assert!(options.contains("2024-03"));
        assert!(options.contains("2024-04"));
        assert!(options.contains("Income"));
        assert!(options.contains("Expenses"));
    }

    #[test]
    fn weekly_chart_options_contain_day_labels() {
        let buckets = vec![DailyBucket {
            day: date!(2024 - 03 - 25),
            income: "100".parse().unwrap(),
            expense: "0".parse().unwrap(),
        }];

        let options = weekly_summary_chart(&buckets).to_string();

        assert!(options.contains("2024-03-25"));
    }
}
