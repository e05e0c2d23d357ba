//! The budgeted vs spent chart shown on the dashboard.
//!
//! The chart is built as an ECharts configuration with `charming` and
//! initialised by an inline script once the page has loaded.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::bar,
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{dashboard::aggregation::SplitTotal, html::HeadElement};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

pub(super) fn chart_container(chart: &DashboardChart) -> Markup {
    html! {
        div
            id=(chart.id)
            class="w-full min-h-[380px] rounded dark:bg-gray-100"
        {}
    }
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Each chart follows the user's light/dark preference and resizes with the window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chart = echarts.init(document.getElementById("{}"));
                    chart.setOption({});

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    )))
}

/// A bar chart comparing each split's budget with what was spent this month.
pub(super) fn split_budget_chart(totals: &[SplitTotal]) -> Chart {
    let labels: Vec<String> = totals.iter().map(|total| total.name.clone()).collect();
    let budgeted: Vec<f64> = totals.iter().map(|total| to_f64(total.budgeted)).collect();
    let spent: Vec<f64> = totals.iter().map(|total| to_f64(total.spent)).collect();

    Chart::new()
        .title(Title::new().text("Budget vs Spent").subtext("This month"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%"))
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
        .series(bar::Bar::new().name("Budgeted").data(budgeted))
        .series(bar::Bar::new().name("Spent").data(spent))
}

// Chart values are only for display, so the loss of precision is fine.
fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
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

fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
